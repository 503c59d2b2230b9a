// SPDX-License-Identifier: MIT
//! Analytics pipeline — scrape every configured keyword, score the tweets,
//! aggregate per-keyword reports, and persist snapshots.

pub mod model;
pub mod storage;

pub use model::{KeywordReport, SentimentDistribution, Snapshot};

use anyhow::{anyhow, Result};
use chrono::Utc;
use tracing::{info, warn};

use crate::observability::LatencyTracker;
use crate::scraper::{Tweet, TwitterSession};
use crate::sentiment::{self, Sentiment};
use crate::AppContext;

/// Run the full scrape-and-score pipeline over the configured keywords.
///
/// One browser login serves the whole run; keywords are scraped
/// sequentially through it. A keyword that fails produces an error report
/// and the run continues — only failures that prevent any scraping at all
/// (no credentials, login failure) abort the run.
///
/// Runs are serialized on `ctx.run_lock`: a scheduled run and a manual
/// `/analytics` request never race for the browser.
pub async fn run_all(ctx: &AppContext) -> Result<Vec<KeywordReport>> {
    let creds = ctx
        .config
        .credentials
        .as_ref()
        .ok_or_else(|| anyhow!("scraper credentials not configured"))?;

    let _guard = ctx.run_lock.lock().await;
    let tracker = LatencyTracker::start("analytics.run");

    let session = TwitterSession::login(&ctx.config.scraper, creds).await?;

    let mut reports = Vec::with_capacity(ctx.config.keywords.len());
    for keyword in &ctx.config.keywords {
        match session.scrape_keyword(keyword).await {
            Ok(tweets) => reports.push(score_keyword(keyword, &tweets)),
            Err(e) => {
                warn!(keyword = %keyword, err = %e, "keyword scrape failed");
                reports.push(KeywordReport::failed(keyword, e.to_string()));
            }
        }
    }

    session.close().await;
    tracker.finish();
    Ok(reports)
}

/// Run the pipeline and persist the result as a snapshot.
/// Returns the number of keyword reports stored.
pub async fn run_and_store(ctx: &AppContext) -> Result<usize> {
    let reports = run_all(ctx).await?;
    let snapshot = Snapshot {
        timestamp: Utc::now().to_rfc3339(),
        data: reports,
    };
    ctx.analytics.insert_snapshot(&snapshot).await?;
    info!(
        keywords = snapshot.data.len(),
        timestamp = %snapshot.timestamp,
        "analytics snapshot stored"
    );
    Ok(snapshot.data.len())
}

/// Aggregate one keyword's tweets into a report.
///
/// Only tweets with non-empty content are scored; the distribution counts
/// scored tweets, while `tweet_count` counts everything collected.
pub fn score_keyword(keyword: &str, tweets: &[Tweet]) -> KeywordReport {
    let polarities: Vec<f64> = tweets
        .iter()
        .filter(|t| !t.content.is_empty())
        .map(|t| sentiment::polarity(&t.content))
        .collect();

    let average = if polarities.is_empty() {
        0.0
    } else {
        polarities.iter().sum::<f64>() / polarities.len() as f64
    };

    let mut distribution = SentimentDistribution::default();
    for p in &polarities {
        match Sentiment::from_polarity(*p) {
            Sentiment::Positive => distribution.positive += 1,
            Sentiment::Neutral => distribution.neutral += 1,
            Sentiment::Negative => distribution.negative += 1,
        }
    }

    KeywordReport {
        keyword: keyword.to_string(),
        tweet_count: tweets.len() as u64,
        average_sentiment: average,
        sentiment_distribution: distribution,
        error: None,
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scraper::Engagements;

    fn tweet(content: &str) -> Tweet {
        Tweet {
            handle: "@tester".to_string(),
            content: content.to_string(),
            engagements: Engagements::default(),
        }
    }

    #[test]
    fn empty_sample_scores_zero() {
        let report = score_keyword("BTC", &[]);
        assert_eq!(report.tweet_count, 0);
        assert_eq!(report.average_sentiment, 0.0);
        assert_eq!(report.sentiment_distribution.positive, 0);
        assert!(report.error.is_none());
    }

    #[test]
    fn media_only_tweets_count_but_are_not_scored() {
        let tweets = vec![tweet(""), tweet("very bullish, huge gains")];
        let report = score_keyword("ETH", &tweets);
        assert_eq!(report.tweet_count, 2);
        let scored = report.sentiment_distribution.positive
            + report.sentiment_distribution.neutral
            + report.sentiment_distribution.negative;
        assert_eq!(scored, 1);
    }

    #[test]
    fn distribution_buckets_follow_the_thresholds() {
        let tweets = vec![
            tweet("absolutely amazing, best project, huge gains, bullish"),
            tweet("total scam, rug pull, everyone got rekt"),
            tweet("price is moving sideways in the same range"),
        ];
        let report = score_keyword("SOL", &tweets);
        assert_eq!(report.sentiment_distribution.positive, 1);
        assert_eq!(report.sentiment_distribution.negative, 1);
        assert_eq!(report.sentiment_distribution.neutral, 1);
    }

    #[test]
    fn average_is_the_mean_of_scored_tweets() {
        let tweets = vec![
            tweet("amazing fantastic excellent"),
            tweet("terrible horrible awful"),
        ];
        let report = score_keyword("BTC", &tweets);
        // One strongly positive, one strongly negative — they cancel.
        assert!(report.average_sentiment.abs() < 0.1);
    }
}
