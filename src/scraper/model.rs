// SPDX-License-Identifier: MIT
//! Scraper data model — what a collected tweet looks like.

use serde::{Deserialize, Serialize};

/// One extracted tweet. Promoted content is filtered out before this type
/// is ever constructed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tweet {
    /// Author handle including the `@`, or `"unknown"` when the card layout
    /// hid it.
    pub handle: String,
    /// Concatenated text content. May be empty for media-only tweets;
    /// empty-content tweets are excluded from sentiment scoring.
    pub content: String,
    pub engagements: Engagements,
}

/// Engagement counters shown on the tweet card.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Engagements {
    pub replies: u64,
    pub retweets: u64,
    pub likes: u64,
}

/// Parse an engagement counter as rendered on the card.
///
/// Accepts plain digits and comma-grouped digits ("1,234"). Abbreviated
/// counts ("1.2K") and anything else parse as 0 — engagement numbers are
/// informational, not load-bearing.
pub(crate) fn parse_count(raw: &str) -> u64 {
    let cleaned = raw.trim().replace(',', "");
    if cleaned.is_empty() || !cleaned.bytes().all(|b| b.is_ascii_digit()) {
        return 0;
    }
    cleaned.parse().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_digits_parse() {
        assert_eq!(parse_count("42"), 42);
        assert_eq!(parse_count(" 7 "), 7);
    }

    #[test]
    fn comma_groups_parse() {
        assert_eq!(parse_count("1,234"), 1234);
        assert_eq!(parse_count("12,345,678"), 12_345_678);
    }

    #[test]
    fn abbreviated_and_junk_counts_are_zero() {
        assert_eq!(parse_count("1.2K"), 0);
        assert_eq!(parse_count("3M"), 0);
        assert_eq!(parse_count(""), 0);
        assert_eq!(parse_count("—"), 0);
    }
}
