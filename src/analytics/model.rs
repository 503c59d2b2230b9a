// SPDX-License-Identifier: MIT
//! Analytics data models — serialisable types returned by the REST API and
//! stored in snapshots.

use serde::{Deserialize, Serialize};

/// How many tweets of each sentiment bucket a keyword's sample contained.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SentimentDistribution {
    /// Tweets with polarity above the positive threshold.
    pub positive: u64,
    /// Tweets between the thresholds (including unscored ones).
    pub neutral: u64,
    /// Tweets with polarity below the negative threshold.
    pub negative: u64,
}

/// Per-keyword analytics for one run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeywordReport {
    pub keyword: String,

    /// Number of tweets collected for this keyword.
    #[serde(default)]
    pub tweet_count: u64,

    /// Mean polarity over the scored tweets, in [-1, 1]. 0.0 when nothing
    /// was scored.
    #[serde(default)]
    pub average_sentiment: f64,

    #[serde(default)]
    pub sentiment_distribution: SentimentDistribution,

    /// Set when scraping this keyword failed; the run carries on with the
    /// remaining keywords.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub error: Option<String>,
}

impl KeywordReport {
    /// Report for a keyword whose scrape failed.
    pub fn failed(keyword: &str, error: String) -> Self {
        Self {
            keyword: keyword.to_string(),
            tweet_count: 0,
            average_sentiment: 0.0,
            sentiment_distribution: SentimentDistribution::default(),
            error: Some(error),
        }
    }
}

/// One full analytics run, as stored and as served by `/last-analytics`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    /// RFC 3339 UTC timestamp of when the run completed.
    pub timestamp: String,
    pub data: Vec<KeywordReport>,
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_roundtrip_json() {
        let report = KeywordReport {
            keyword: "BTC".to_string(),
            tweet_count: 42,
            average_sentiment: 0.31,
            sentiment_distribution: SentimentDistribution {
                positive: 20,
                neutral: 15,
                negative: 7,
            },
            error: None,
        };
        let json = serde_json::to_string(&report).unwrap();
        let back: KeywordReport = serde_json::from_str(&json).unwrap();
        assert_eq!(back.keyword, "BTC");
        assert_eq!(back.tweet_count, 42);
        assert_eq!(back.sentiment_distribution.negative, 7);
    }

    #[test]
    fn successful_report_omits_error_field() {
        let report = KeywordReport {
            keyword: "ETH".to_string(),
            tweet_count: 1,
            average_sentiment: 0.0,
            sentiment_distribution: SentimentDistribution::default(),
            error: None,
        };
        let json = serde_json::to_value(&report).unwrap();
        assert!(json.get("error").is_none());
    }

    #[test]
    fn failed_report_carries_the_error() {
        let report = KeywordReport::failed("SOL", "login flow failed".to_string());
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["keyword"], "SOL");
        assert_eq!(json["error"], "login flow failed");
        assert_eq!(json["tweet_count"], 0);
    }

    #[test]
    fn snapshot_shape_matches_the_served_document() {
        let snapshot = Snapshot {
            timestamp: "2026-02-25T02:35:00+00:00".to_string(),
            data: vec![KeywordReport::failed("LINK", "x".to_string())],
        };
        let json = serde_json::to_value(&snapshot).unwrap();
        assert!(json["timestamp"].is_string());
        assert!(json["data"].is_array());
    }
}
