//! External-call accounting.
//!
//! Every stage reports how many external calls it made and a rough
//! dollar estimate; the orchestrator sums them into the response
//! metadata.

/// Estimated cost of one language model completion.
pub const LLM_CALL_COST_USD: f64 = 0.01;

/// Estimated cost of one web search call.
pub const SEARCH_CALL_COST_USD: f64 = 0.004;

/// Estimated cost of one full-content document fetch.
pub const FETCH_CALL_COST_USD: f64 = 0.001;

/// Per-stage external-call tally.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StageCost {
    pub api_calls: u32,
    pub estimated_cost_usd: f64,
}

impl StageCost {
    pub fn record(&mut self, cost_usd: f64) {
        self.api_calls += 1;
        self.estimated_cost_usd += cost_usd;
    }

    pub fn absorb(&mut self, other: StageCost) {
        self.api_calls += other.api_calls;
        self.estimated_cost_usd += other.estimated_cost_usd;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_and_absorb() {
        let mut a = StageCost::default();
        a.record(LLM_CALL_COST_USD);
        a.record(SEARCH_CALL_COST_USD);
        assert_eq!(a.api_calls, 2);

        let mut b = StageCost::default();
        b.record(FETCH_CALL_COST_USD);
        a.absorb(b);
        assert_eq!(a.api_calls, 3);
        assert!((a.estimated_cost_usd - 0.015).abs() < 1e-9);
    }
}
