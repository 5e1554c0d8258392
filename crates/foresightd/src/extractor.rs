//! Evidence extraction - turn collected articles into grounded
//! evidence items.
//!
//! Only the top tier-bounded slice gets full-content retrieval; the
//! rest ride along as metadata-only items so traceability never shrinks
//! because of a transient tool outage.

use anyhow::Result;
use foresight_common::{EvidenceItem, Tier};
use tracing::{debug, warn};

use crate::cost::{StageCost, FETCH_CALL_COST_USD};
use crate::fetch::DocumentFetcher;
use crate::search::ArticleHit;

/// Total evidence cap across extracted and metadata-only items.
const MAX_EVIDENCE: usize = 10;

/// Snippets keep the first this-many words of extracted content.
const SNIPPET_WORDS: usize = 250;

/// Hard character ceiling applied after the word cut.
const SNIPPET_MAX_CHARS: usize = 1500;

#[derive(Debug)]
pub struct ExtractedEvidence {
    pub evidence: Vec<EvidenceItem>,
    pub cost: StageCost,
}

pub struct EvidenceExtractor<'a> {
    fetcher: Option<&'a dyn DocumentFetcher>,
}

impl<'a> EvidenceExtractor<'a> {
    pub fn new(fetcher: &'a dyn DocumentFetcher) -> Self {
        Self {
            fetcher: Some(fetcher),
        }
    }

    /// Extractor with no retrieval capability at all; every article
    /// becomes metadata-only evidence.
    pub fn without_fetcher() -> Self {
        Self { fetcher: None }
    }

    pub async fn extract(&self, articles: &[ArticleHit], tier: Tier) -> Result<ExtractedEvidence> {
        let mut cost = StageCost::default();
        let mut evidence: Vec<EvidenceItem> = Vec::new();
        let depth = tier.extract_depth();

        for (i, article) in articles.iter().take(MAX_EVIDENCE).enumerate() {
            if i < depth {
                if let Some(fetcher) = self.fetcher {
                    cost.record(FETCH_CALL_COST_USD);
                    match fetcher.fetch(&article.url).await {
                        Ok(Some(content)) => {
                            evidence.push(grounded_item(article, &content));
                            continue;
                        }
                        Ok(None) => {
                            debug!("No content for {}, keeping metadata only", article.url);
                        }
                        Err(e) => {
                            warn!("Fetch of {} errored: {}", article.url, e);
                        }
                    }
                }
            }
            // Fallback and beyond-depth path: metadata-only evidence.
            evidence.push(metadata_item(article));
        }

        Ok(ExtractedEvidence { evidence, cost })
    }
}

fn grounded_item(article: &ArticleHit, content: &str) -> EvidenceItem {
    EvidenceItem::Article {
        title: article.title.clone(),
        url: article.url.clone(),
        publisher: article.publisher.clone(),
        date: article.date.clone(),
        snippet: Some(make_snippet(content)),
        why_relevant: article
            .snippet
            .clone()
            .unwrap_or_else(|| "Direct coverage of the event".to_string()),
    }
}

fn metadata_item(article: &ArticleHit) -> EvidenceItem {
    EvidenceItem::Article {
        title: article.title.clone(),
        url: article.url.clone(),
        publisher: article.publisher.clone(),
        date: article.date.clone(),
        snippet: None,
        why_relevant: article
            .snippet
            .clone()
            .unwrap_or_else(|| "Listed source for the event".to_string()),
    }
}

/// First ~250 words of content, truncated to a fixed character ceiling.
fn make_snippet(content: &str) -> String {
    let words: Vec<&str> = content.split_whitespace().take(SNIPPET_WORDS).collect();
    let mut snippet = words.join(" ");
    if snippet.len() > SNIPPET_MAX_CHARS {
        let mut end = SNIPPET_MAX_CHARS;
        while !snippet.is_char_boundary(end) {
            end -= 1;
        }
        snippet.truncate(end);
    }
    snippet
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fakes::FakeDocumentFetcher;

    fn hits(n: usize) -> Vec<ArticleHit> {
        (0..n)
            .map(|i| ArticleHit {
                title: format!("Article {}", i),
                url: format!("https://example.org/a/{}", i),
                publisher: None,
                date: None,
                snippet: None,
                score: 0.8,
            })
            .collect()
    }

    #[tokio::test]
    async fn test_snippet_word_and_char_caps() {
        let long_words = "word ".repeat(400);
        let snippet = make_snippet(&long_words);
        assert!(snippet.split_whitespace().count() <= SNIPPET_WORDS);

        let long_chars = "superlongword".repeat(300);
        let snippet = make_snippet(&long_chars);
        assert!(snippet.len() <= SNIPPET_MAX_CHARS);
    }

    #[tokio::test]
    async fn test_depth_bounds_fetch_attempts() {
        let fetcher = FakeDocumentFetcher::always("Extracted article body text.");
        let extractor = EvidenceExtractor::new(&fetcher);

        let extracted = extractor.extract(&hits(8), Tier::Standard).await.unwrap();
        // standard depth = 3 fetches; rest metadata-only.
        assert_eq!(fetcher.call_count(), 3);
        assert_eq!(extracted.cost.api_calls, 3);
        assert_eq!(extracted.evidence.len(), 8);

        let with_snippets = extracted
            .evidence
            .iter()
            .filter(|e| matches!(e, EvidenceItem::Article { snippet: Some(_), .. }))
            .count();
        assert_eq!(with_snippets, 3);
    }

    #[tokio::test]
    async fn test_fetch_failure_falls_back_to_metadata() {
        let fetcher = FakeDocumentFetcher::unavailable();
        let extractor = EvidenceExtractor::new(&fetcher);

        let extracted = extractor.extract(&hits(2), Tier::Fast).await.unwrap();
        // Nothing dropped: both articles present, no snippets.
        assert_eq!(extracted.evidence.len(), 2);
        assert!(extracted
            .evidence
            .iter()
            .all(|e| matches!(e, EvidenceItem::Article { snippet: None, .. })));
    }

    #[tokio::test]
    async fn test_no_fetcher_capability() {
        let extractor = EvidenceExtractor::without_fetcher();
        let extracted = extractor.extract(&hits(3), Tier::Deep).await.unwrap();
        assert_eq!(extracted.evidence.len(), 3);
        assert_eq!(extracted.cost.api_calls, 0);
    }

    #[tokio::test]
    async fn test_total_evidence_cap() {
        let fetcher = FakeDocumentFetcher::always("body");
        let extractor = EvidenceExtractor::new(&fetcher);
        let extracted = extractor.extract(&hits(15), Tier::Deep).await.unwrap();
        assert_eq!(extracted.evidence.len(), MAX_EVIDENCE);
    }
}
