//! Citable evidence units backing an outlook's claims.
//!
//! Identity is the URL; an evidence pool is deduplicated by URL before
//! scenario generation. A reference the model invents is replaced by
//! the explicit unconfirmed sentinel, never silently trusted.

use serde::{Deserialize, Serialize};

/// Sentinel URL for an evidence reference that could not be resolved
/// against the request's evidence pool. The exact literal matters:
/// downstream consumers match on it.
pub const UNCONFIRMED_URL: &str = "Not confirmed by available sources.";

/// Sentinel title paired with [`UNCONFIRMED_URL`].
pub const UNCONFIRMED_TITLE: &str = "Source not available";

/// One citable unit of evidence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EvidenceItem {
    /// A news article, grounded by a snippet when extraction succeeded.
    Article {
        title: String,
        url: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        publisher: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        date: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        snippet: Option<String>,
        why_relevant: String,
    },
    /// A well-known historical analogue to the event.
    HistoricalPattern {
        title: String,
        date_range: String,
        url: String,
        why_relevant: String,
    },
}

impl EvidenceItem {
    pub fn url(&self) -> &str {
        match self {
            EvidenceItem::Article { url, .. } => url,
            EvidenceItem::HistoricalPattern { url, .. } => url,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            EvidenceItem::Article { title, .. } => title,
            EvidenceItem::HistoricalPattern { title, .. } => title,
        }
    }

    pub fn is_historical_pattern(&self) -> bool {
        matches!(self, EvidenceItem::HistoricalPattern { .. })
    }

    /// The explicit marker written in place of a fabricated citation.
    pub fn unconfirmed() -> Self {
        EvidenceItem::Article {
            title: UNCONFIRMED_TITLE.to_string(),
            url: UNCONFIRMED_URL.to_string(),
            publisher: None,
            date: None,
            snippet: None,
            why_relevant: String::new(),
        }
    }

    pub fn is_unconfirmed(&self) -> bool {
        self.url() == UNCONFIRMED_URL
    }
}
