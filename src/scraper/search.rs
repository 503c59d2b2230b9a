// SPDX-License-Identifier: MIT
//! Keyword search — the scroll-and-extract loop over live search results.

use std::collections::HashSet;
use std::time::Duration;

use chrono::Utc;
use tracing::{debug, info, warn};

use super::model::{parse_count, Engagements, Tweet};
use super::{ScrapeError, TwitterSession};
use crate::webdriver::{Element, WdError};

/// Tweet cards; `@disabled` filters the placeholder skeletons rendered
/// while a card is still loading.
const TWEET_CARD_XPATH: &str = "//article[@data-testid=\"tweet\" and not(@disabled)]";
const HANDLE_XPATH: &str = ".//span[contains(text(), \"@\")]";
const CONTENT_XPATH: &str = "(.//div[@data-testid=\"tweetText\"])[1]/span \
     | (.//div[@data-testid=\"tweetText\"])[1]/a";
const COOKIE_BANNER_XPATH: &str = "//span[text()='Refuse non-essential cookies']/../../..";
const RETRY_BUTTON_XPATH: &str = "//span[text()='Retry']/../../..";

const SCROLL_TO_BOTTOM: &str = "window.scrollTo(0, document.body.scrollHeight);";

/// Settle times, tuned against the site's lazy loading.
const RESULTS_SETTLE: Duration = Duration::from_secs(5);
const BANNER_SETTLE: Duration = Duration::from_secs(2);
const SCROLL_SETTLE: Duration = Duration::from_secs(3);

impl TwitterSession {
    /// Collect up to `max_tweets` recent tweets for `keyword`.
    ///
    /// Searches the live feed restricted to the configured window
    /// (`since:{today - N days} until:{today}`, dates in UTC), then scrolls
    /// until enough tweets are held or `max_scroll_attempts` consecutive
    /// passes surface nothing new.
    pub async fn scrape_keyword(&self, keyword: &str) -> Result<Vec<Tweet>, ScrapeError> {
        let cfg = self.config();

        let until = Utc::now().date_naive();
        let since = until - chrono::Days::new(cfg.search_window_days as u64);
        let query = format!("{keyword} since:{since} until:{until}").replace(' ', "%20");
        let url = format!("https://twitter.com/search?q={query}&src=typed_query&f=live");

        info!(keyword, since = %since, until = %until, "scraping keyword");
        self.driver().goto(&url).await?;
        tokio::time::sleep(RESULTS_SETTLE).await;

        self.dismiss_cookie_banner().await;

        let mut tweets: Vec<Tweet> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();
        let mut empty_passes = 0u32;

        while tweets.len() < cfg.max_tweets && empty_passes < cfg.max_scroll_attempts {
            let added = match self.collect_visible(&mut tweets, &mut seen).await {
                Ok(n) => n,
                Err(e) => {
                    // A single bad pass (stale cards mid-scroll) is routine;
                    // treat it like an empty pass and keep going.
                    warn!(keyword, err = %e, "tweet collection pass failed");
                    0
                }
            };

            if added == 0 {
                empty_passes += 1;
                debug!(keyword, attempt = empty_passes, "no new tweets — scrolling");
                self.click_retry_if_present().await;
                if let Err(e) = self.driver().execute(SCROLL_TO_BOTTOM).await {
                    warn!(keyword, err = %e, "scroll script failed");
                }
                tokio::time::sleep(SCROLL_SETTLE).await;
            } else {
                empty_passes = 0;
            }
        }

        info!(keyword, count = tweets.len(), "keyword scrape complete");
        Ok(tweets)
    }

    /// Extract every currently rendered card that has not been seen yet.
    /// Returns the number of tweets added.
    async fn collect_visible(
        &self,
        tweets: &mut Vec<Tweet>,
        seen: &mut HashSet<String>,
    ) -> Result<usize, WdError> {
        let max = self.config().max_tweets;
        let cards = self.driver().find_elements(TWEET_CARD_XPATH).await?;

        let mut added = 0;
        for card in &cards {
            if tweets.len() >= max {
                break;
            }
            // Element references are stable per DOM node — good dedup keys
            // across passes while the node stays rendered.
            if !seen.insert(card.id().to_string()) {
                continue;
            }
            match extract_tweet(card).await {
                Ok(Some(tweet)) => {
                    tweets.push(tweet);
                    added += 1;
                }
                Ok(None) => {} // promoted content
                Err(e) => debug!(err = %e, "card extraction failed"),
            }
        }
        Ok(added)
    }

    /// EU sessions get a consent banner over the results; refuse and move on.
    async fn dismiss_cookie_banner(&self) {
        if let Ok(button) = self.driver().find_element(COOKIE_BANNER_XPATH).await {
            if button.click().await.is_ok() {
                debug!("dismissed cookie consent banner");
                tokio::time::sleep(BANNER_SETTLE).await;
            }
        }
    }

    /// The feed sometimes replaces results with a Retry button under load.
    async fn click_retry_if_present(&self) {
        if let Ok(button) = self.driver().find_element(RETRY_BUTTON_XPATH).await {
            if button.click().await.is_ok() {
                debug!("clicked feed retry button");
                tokio::time::sleep(SCROLL_SETTLE).await;
            }
        }
    }
}

/// Pull the fields out of one tweet card.
///
/// Returns `Ok(None)` for promoted content — ads carry no `<time>` element.
async fn extract_tweet(card: &Element<'_>) -> Result<Option<Tweet>, WdError> {
    match card.find(".//time").await {
        Ok(_) => {}
        Err(WdError::NoSuchElement(_)) => return Ok(None),
        Err(e) => return Err(e),
    }

    let handle = match card.find(HANDLE_XPATH).await {
        Ok(el) => match el.text().await {
            Ok(t) if !t.is_empty() => t,
            _ => "unknown".to_string(),
        },
        Err(_) => "unknown".to_string(),
    };

    let mut content = String::new();
    for part in card.find_all(CONTENT_XPATH).await.unwrap_or_default() {
        if let Ok(text) = part.text().await {
            content.push_str(&text);
        }
    }

    let engagements = Engagements {
        replies: metric(card, "reply").await,
        retweets: metric(card, "retweet").await,
        likes: metric(card, "like").await,
    };

    Ok(Some(Tweet {
        handle,
        content,
        engagements,
    }))
}

/// Read one engagement counter off the card; anything unreadable is 0.
async fn metric(card: &Element<'_>, kind: &str) -> u64 {
    let xpath = format!(".//button[@data-testid=\"{kind}\"]//span");
    match card.find(&xpath).await {
        Ok(el) => match el.text().await {
            Ok(text) => parse_count(&text),
            Err(_) => 0,
        },
        Err(_) => 0,
    }
}
