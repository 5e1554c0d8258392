//! Probability normalization and confidence scoring.
//!
//! Drift in the model's probabilities is not an error: it is corrected
//! in place and recorded in the probability check so the correction is
//! auditable rather than hidden.

use foresight_common::{Outlook, ProbabilityCheck};
use tracing::debug;

/// Normalize outlook probabilities to a valid distribution.
///
/// `original_sum > 0` divides through; `original_sum == 0` assigns the
/// equal distribution 1/N, which is deliberate policy for degenerate
/// model output, not an error path. Probabilities are clamped to
/// [0, 1] and re-normalized so the clamped values still sum to 1.0.
pub fn normalize(mut outlooks: Vec<Outlook>) -> (Vec<Outlook>, ProbabilityCheck) {
    let original_sum: f64 = outlooks.iter().map(|o| o.probability).sum();

    if original_sum > 0.0 {
        for outlook in &mut outlooks {
            outlook.probability /= original_sum;
        }
    } else if !outlooks.is_empty() {
        let equal = 1.0 / outlooks.len() as f64;
        for outlook in &mut outlooks {
            outlook.probability = equal;
        }
    }

    // Clamp against model overshoot, then renormalize the clamped values.
    for outlook in &mut outlooks {
        outlook.probability = outlook.probability.clamp(0.0, 1.0);
    }
    let clamped_sum: f64 = outlooks.iter().map(|o| o.probability).sum();
    if clamped_sum > 0.0 {
        for outlook in &mut outlooks {
            outlook.probability /= clamped_sum;
        }
    }

    let sum: f64 = outlooks.iter().map(|o| o.probability).sum();
    if (original_sum - 1.0).abs() > 0.01 {
        debug!(
            "Probability drift corrected: original sum {:.4}, final {:.4}",
            original_sum, sum
        );
    }

    (
        outlooks,
        ProbabilityCheck {
            sum,
            method: "normalize".to_string(),
            original_sum,
        },
    )
}

/// Headline trust scalar: confidence weight folded with probability,
/// rounded to 2 decimals.
pub fn confidence_score(outlooks: &[Outlook]) -> f64 {
    let score: f64 = outlooks
        .iter()
        .map(|o| o.confidence.weight() * o.probability)
        .sum();
    (score * 100.0).round() / 100.0
}
