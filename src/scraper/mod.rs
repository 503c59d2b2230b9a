// SPDX-License-Identifier: MIT
//! Keyword scraper — drives a headless Firefox through the WebDriver
//! endpoint to log in and collect recent tweets per keyword.
//!
//! Flow: [`TwitterSession::login`] opens a browser session and walks the
//! interactive login (username → optional challenge → password), then
//! requires the `auth_token` cookie as proof of success.
//! [`TwitterSession::scrape_keyword`] (see `search.rs`) runs the
//! scroll-and-extract loop on the live search page.

pub mod model;
mod search;

pub use model::{Engagements, Tweet};

use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::{Credentials, ScraperConfig};
use crate::retry::{retry_with_backoff, RetryConfig};
use crate::webdriver::{Session, SessionOptions, WdError, KEY_ENTER};

pub const LOGIN_URL: &str = "https://twitter.com/i/flow/login";

const USERNAME_XPATH: &str = "//input[@autocomplete='username']";
const PASSWORD_XPATH: &str = "//input[@autocomplete='current-password']";
const CHALLENGE_XPATH: &str = "//input[@data-testid='ocfEnterTextTextInput']";

/// Login inputs render asynchronously: poll up to 3 times, 2 s apart.
const INPUT_ATTEMPTS: u32 = 3;
const INPUT_RETRY_DELAY: Duration = Duration::from_secs(2);

/// Settle time after submitting a login step.
const STEP_SETTLE: Duration = Duration::from_secs(3);

#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error(transparent)]
    Driver(#[from] WdError),
    #[error("login flow failed: {0}")]
    Login(String),
    #[error("login rejected: no auth_token cookie was issued")]
    AuthTokenMissing,
}

/// A logged-in browser session, reused across keywords within one run.
pub struct TwitterSession {
    driver: Session,
    cfg: ScraperConfig,
}

impl TwitterSession {
    /// Open a browser session and complete the login flow.
    ///
    /// The WebDriver session is torn down on any login failure so a failed
    /// run never leaks a browser process.
    pub async fn login(cfg: &ScraperConfig, creds: &Credentials) -> Result<Self, ScrapeError> {
        info!(webdriver_url = %cfg.webdriver_url, headless = cfg.headless, "starting browser session");
        let driver = Session::new(
            &cfg.webdriver_url,
            &SessionOptions {
                headless: cfg.headless,
                user_agent: cfg.user_agent.clone(),
            },
        )
        .await?;

        let session = Self {
            driver,
            cfg: cfg.clone(),
        };

        if let Err(e) = session.login_flow(creds).await {
            warn!(err = %e, "login failed — closing browser session");
            if let Err(qe) = session.driver.quit().await {
                debug!(err = %qe, "webdriver cleanup after failed login also failed");
            }
            return Err(e);
        }

        info!(username = %creds.username, "login successful");
        Ok(session)
    }

    async fn login_flow(&self, creds: &Credentials) -> Result<(), ScrapeError> {
        // Maximize is best-effort: headless windows may refuse it.
        if let Err(e) = self.driver.maximize_window().await {
            debug!(err = %e, "window maximize not supported");
        }

        self.driver.goto(LOGIN_URL).await?;
        tokio::time::sleep(STEP_SETTLE).await;

        self.submit_input(USERNAME_XPATH, &creds.username)
            .await
            .map_err(|e| ScrapeError::Login(format!("username step: {e}")))?;

        // The "unusual activity" challenge only appears for flagged
        // accounts or logins from new locations; its absence is the
        // common case, so a single probe is enough.
        match self.driver.find_element(CHALLENGE_XPATH).await {
            Ok(input) => {
                debug!("unusual-activity challenge presented");
                input
                    .send_keys(&with_enter(&creds.username))
                    .await
                    .map_err(|e| ScrapeError::Login(format!("challenge step: {e}")))?;
                tokio::time::sleep(STEP_SETTLE).await;
            }
            Err(WdError::NoSuchElement(_)) => {}
            Err(e) => return Err(e.into()),
        }

        self.submit_input(PASSWORD_XPATH, &creds.password)
            .await
            .map_err(|e| ScrapeError::Login(format!("password step: {e}")))?;

        // The auth_token cookie is the only reliable signal that the flow
        // actually completed — the final page varies by account state.
        let cookies = self.driver.cookies().await?;
        if !cookies.iter().any(|c| c.name == "auth_token") {
            return Err(ScrapeError::AuthTokenMissing);
        }
        Ok(())
    }

    /// Poll for an input element, type into it, and submit with Enter.
    async fn submit_input(&self, xpath: &str, text: &str) -> Result<(), WdError> {
        let retry = RetryConfig::fixed(INPUT_ATTEMPTS, INPUT_RETRY_DELAY);
        let input = retry_with_backoff(&retry, || self.driver.find_element(xpath)).await?;
        input.send_keys(&with_enter(text)).await?;
        tokio::time::sleep(STEP_SETTLE).await;
        Ok(())
    }

    /// Access to the tuning knobs, used by the search loop.
    pub(crate) fn config(&self) -> &ScraperConfig {
        &self.cfg
    }

    pub(crate) fn driver(&self) -> &Session {
        &self.driver
    }

    /// Close the browser session. Failures are logged, not propagated —
    /// there is nothing useful a caller can do about them.
    pub async fn close(self) {
        if let Err(e) = self.driver.quit().await {
            warn!(err = %e, "failed to close webdriver session");
        }
    }
}

fn with_enter(text: &str) -> String {
    let mut s = String::with_capacity(text.len() + KEY_ENTER.len_utf8());
    s.push_str(text);
    s.push(KEY_ENTER);
    s
}
