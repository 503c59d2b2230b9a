// SPDX-License-Identifier: MIT
//! Minimal W3C WebDriver client.
//!
//! Speaks the wire protocol directly over HTTP with reqwest: one
//! [`Session`] per browser, JSON request/response bodies, typed protocol
//! errors. Only the endpoints the scraper needs are implemented — this is
//! not a general-purpose driver library.
//!
//! Protocol notes:
//!   * Every response wraps its result in a `value` field.
//!   * Error responses put `{ "error": <code>, "message": <text> }` inside
//!     `value`; `no such element` is surfaced as its own variant because
//!     callers poll on it.
//!   * Element references are objects keyed by [`ELEMENT_KEY`].

use serde_json::{json, Value};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// W3C element identifier key inside element reference objects.
pub const ELEMENT_KEY: &str = "element-6066-11e4-a52e-4f735466cecf";

/// WebDriver key code for Enter, appended to input text to submit a form.
pub const KEY_ENTER: char = '\u{e007}';

/// Per-command HTTP timeout. Page loads are the slowest commands; a minute
/// comfortably covers them without letting a wedged driver hang a run.
const COMMAND_TIMEOUT: Duration = Duration::from_secs(60);

// ─── Errors ───────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum WdError {
    #[error("webdriver transport error: {0}")]
    Transport(#[from] reqwest::Error),
    /// The driver reported `no such element` — the selector matched nothing.
    #[error("no such element: {0}")]
    NoSuchElement(String),
    /// Any other protocol-level error reported by the driver.
    #[error("webdriver error [{code}]: {message}")]
    Protocol { code: String, message: String },
    #[error("malformed webdriver response: {0}")]
    Malformed(String),
}

impl WdError {
    /// Parse a protocol error out of a response `value`, if it is one.
    fn from_value(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;
        let code = obj.get("error")?.as_str()?.to_string();
        let message = obj
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        Some(if code == "no such element" {
            WdError::NoSuchElement(message)
        } else {
            WdError::Protocol { code, message }
        })
    }
}

// ─── Session options ──────────────────────────────────────────────────────────

/// Options for the browser session the scraper drives.
#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// Run the browser without a visible window.
    pub headless: bool,
    /// User agent override applied via a profile preference.
    pub user_agent: String,
}

/// Build the `POST /session` capabilities document for Firefox.
fn firefox_capabilities(opts: &SessionOptions) -> Value {
    let mut args: Vec<String> = Vec::new();
    if opts.headless {
        args.push("-headless".to_string());
    }
    json!({
        "capabilities": {
            "alwaysMatch": {
                "browserName": "firefox",
                "acceptInsecureCerts": true,
                "moz:firefoxOptions": {
                    "args": args,
                    "prefs": {
                        "general.useragent.override": opts.user_agent,
                        "dom.webnotifications.enabled": false,
                        "dom.disable_open_during_load": true,
                    }
                }
            }
        }
    })
}

// ─── Session ──────────────────────────────────────────────────────────────────

/// A live WebDriver session against a geckodriver endpoint.
pub struct Session {
    http: reqwest::Client,
    base: String,
    session_id: String,
}

/// A cookie returned by the driver. Only the fields the login flow needs.
#[derive(Debug, Clone)]
pub struct Cookie {
    pub name: String,
    pub value: String,
}

impl Session {
    /// Create a new browser session via `POST /session`.
    pub async fn new(base_url: &str, opts: &SessionOptions) -> Result<Self, WdError> {
        let http = reqwest::Client::builder()
            .timeout(COMMAND_TIMEOUT)
            .build()?;
        let base = base_url.trim_end_matches('/').to_string();

        let value = raw_post(
            &http,
            &format!("{base}/session"),
            firefox_capabilities(opts),
        )
        .await?;

        let session_id = value
            .get("sessionId")
            .and_then(Value::as_str)
            .ok_or_else(|| WdError::Malformed("new session response has no sessionId".into()))?
            .to_string();

        debug!(session_id = %session_id, headless = opts.headless, "webdriver session created");
        Ok(Self {
            http,
            base,
            session_id,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/session/{}{path}", self.base, self.session_id)
    }

    async fn cmd_post(&self, path: &str, body: Value) -> Result<Value, WdError> {
        raw_post(&self.http, &self.url(path), body).await
    }

    async fn cmd_get(&self, path: &str) -> Result<Value, WdError> {
        let resp = self.http.get(self.url(path)).send().await?;
        unwrap_response(resp).await
    }

    // ─── Navigation & window ────────────────────────────────────────────────

    /// Navigate to `url` and block until the page load strategy completes.
    pub async fn goto(&self, url: &str) -> Result<(), WdError> {
        self.cmd_post("/url", json!({ "url": url })).await?;
        Ok(())
    }

    pub async fn maximize_window(&self) -> Result<(), WdError> {
        self.cmd_post("/window/maximize", json!({})).await?;
        Ok(())
    }

    /// Execute a synchronous script in the page and return its result.
    pub async fn execute(&self, script: &str) -> Result<Value, WdError> {
        self.cmd_post("/execute/sync", json!({ "script": script, "args": [] }))
            .await
    }

    // ─── Element lookup ─────────────────────────────────────────────────────

    /// Find the first element matching an XPath selector.
    pub async fn find_element(&self, xpath: &str) -> Result<Element<'_>, WdError> {
        let value = self
            .cmd_post("/element", json!({ "using": "xpath", "value": xpath }))
            .await?;
        element_from_value(self, &value)
    }

    /// Find all elements matching an XPath selector. An empty result is not
    /// an error — the driver returns an empty array.
    pub async fn find_elements(&self, xpath: &str) -> Result<Vec<Element<'_>>, WdError> {
        let value = self
            .cmd_post("/elements", json!({ "using": "xpath", "value": xpath }))
            .await?;
        elements_from_value(self, &value)
    }

    // ─── Cookies & teardown ─────────────────────────────────────────────────

    /// Return all cookies for the current browsing context.
    pub async fn cookies(&self) -> Result<Vec<Cookie>, WdError> {
        let value = self.cmd_get("/cookie").await?;
        let arr = value
            .as_array()
            .ok_or_else(|| WdError::Malformed("cookie response is not an array".into()))?;
        Ok(arr
            .iter()
            .filter_map(|c| {
                Some(Cookie {
                    name: c.get("name")?.as_str()?.to_string(),
                    value: c.get("value")?.as_str()?.to_string(),
                })
            })
            .collect())
    }

    /// End the session (`DELETE /session/{id}`), closing the browser.
    pub async fn quit(&self) -> Result<(), WdError> {
        let resp = self
            .http
            .delete(format!("{}/session/{}", self.base, self.session_id))
            .send()
            .await?;
        unwrap_response(resp).await?;
        debug!(session_id = %self.session_id, "webdriver session closed");
        Ok(())
    }
}

// ─── Element ──────────────────────────────────────────────────────────────────

/// A handle to one element inside a live session.
///
/// The handle stays valid as long as the element remains attached to the
/// DOM; a stale handle produces a `stale element reference` protocol error.
pub struct Element<'a> {
    session: &'a Session,
    id: String,
}

impl Element<'_> {
    /// The driver-assigned element reference. Stable for the lifetime of
    /// the DOM node, which makes it usable as a dedup key.
    pub fn id(&self) -> &str {
        &self.id
    }

    fn url(&self, path: &str) -> String {
        format!("/element/{}{path}", self.id)
    }

    /// The rendered text of the element.
    pub async fn text(&self) -> Result<String, WdError> {
        let value = self.session.cmd_get(&self.url("/text")).await?;
        value
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| WdError::Malformed("element text is not a string".into()))
    }

    pub async fn click(&self) -> Result<(), WdError> {
        self.session.cmd_post(&self.url("/click"), json!({})).await?;
        Ok(())
    }

    /// Type `text` into the element. Append [`KEY_ENTER`] to submit.
    pub async fn send_keys(&self, text: &str) -> Result<(), WdError> {
        self.session
            .cmd_post(&self.url("/value"), json!({ "text": text }))
            .await?;
        Ok(())
    }

    /// Find the first descendant matching an XPath selector.
    pub async fn find(&self, xpath: &str) -> Result<Element<'_>, WdError> {
        let value = self
            .session
            .cmd_post(
                &self.url("/element"),
                json!({ "using": "xpath", "value": xpath }),
            )
            .await?;
        element_from_value(self.session, &value)
    }

    /// Find all descendants matching an XPath selector.
    pub async fn find_all(&self, xpath: &str) -> Result<Vec<Element<'_>>, WdError> {
        let value = self
            .session
            .cmd_post(
                &self.url("/elements"),
                json!({ "using": "xpath", "value": xpath }),
            )
            .await?;
        elements_from_value(self.session, &value)
    }
}

// ─── Response plumbing ────────────────────────────────────────────────────────

async fn raw_post(http: &reqwest::Client, url: &str, body: Value) -> Result<Value, WdError> {
    let resp = http.post(url).json(&body).send().await?;
    unwrap_response(resp).await
}

/// Unwrap the `value` envelope and convert protocol errors.
async fn unwrap_response(resp: reqwest::Response) -> Result<Value, WdError> {
    let status = resp.status();
    let body: Value = resp.json().await?;
    let value = body
        .get("value")
        .cloned()
        .ok_or_else(|| WdError::Malformed("response has no value field".into()))?;

    if let Some(err) = WdError::from_value(&value) {
        return Err(err);
    }
    if !status.is_success() {
        return Err(WdError::Malformed(format!(
            "HTTP {status} without a webdriver error body"
        )));
    }
    Ok(value)
}

fn element_id_from_value(value: &Value) -> Result<String, WdError> {
    value
        .get(ELEMENT_KEY)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| WdError::Malformed("element reference without element key".into()))
}

fn element_from_value<'a>(session: &'a Session, value: &Value) -> Result<Element<'a>, WdError> {
    Ok(Element {
        session,
        id: element_id_from_value(value)?,
    })
}

fn elements_from_value<'a>(
    session: &'a Session,
    value: &Value,
) -> Result<Vec<Element<'a>>, WdError> {
    let arr = value
        .as_array()
        .ok_or_else(|| WdError::Malformed("elements response is not an array".into()))?;
    arr.iter()
        .map(|v| element_from_value(session, v))
        .collect()
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headless_flag_lands_in_capabilities() {
        let caps = firefox_capabilities(&SessionOptions {
            headless: true,
            user_agent: "test-ua".into(),
        });
        let args = &caps["capabilities"]["alwaysMatch"]["moz:firefoxOptions"]["args"];
        assert!(args
            .as_array()
            .unwrap()
            .iter()
            .any(|a| a == "-headless"));

        let caps = firefox_capabilities(&SessionOptions {
            headless: false,
            user_agent: "test-ua".into(),
        });
        let args = &caps["capabilities"]["alwaysMatch"]["moz:firefoxOptions"]["args"];
        assert!(args.as_array().unwrap().is_empty());
    }

    #[test]
    fn user_agent_goes_into_profile_prefs() {
        let caps = firefox_capabilities(&SessionOptions {
            headless: true,
            user_agent: "Mozilla/5.0 (Android)".into(),
        });
        let prefs = &caps["capabilities"]["alwaysMatch"]["moz:firefoxOptions"]["prefs"];
        assert_eq!(
            prefs["general.useragent.override"],
            "Mozilla/5.0 (Android)"
        );
    }

    #[test]
    fn no_such_element_is_its_own_variant() {
        let value = serde_json::json!({
            "error": "no such element",
            "message": "Unable to locate element: //input",
        });
        match WdError::from_value(&value) {
            Some(WdError::NoSuchElement(msg)) => assert!(msg.contains("//input")),
            other => panic!("expected NoSuchElement, got {other:?}"),
        }
    }

    #[test]
    fn other_protocol_errors_keep_their_code() {
        let value = serde_json::json!({
            "error": "stale element reference",
            "message": "element is no longer attached",
        });
        match WdError::from_value(&value) {
            Some(WdError::Protocol { code, .. }) => {
                assert_eq!(code, "stale element reference");
            }
            other => panic!("expected Protocol, got {other:?}"),
        }
    }

    #[test]
    fn success_values_are_not_errors() {
        assert!(WdError::from_value(&serde_json::json!(null)).is_none());
        assert!(WdError::from_value(&serde_json::json!({"sessionId": "abc"})).is_none());
        assert!(WdError::from_value(&serde_json::json!([1, 2, 3])).is_none());
    }

    #[test]
    fn element_id_extraction_uses_the_w3c_key() {
        let value = serde_json::json!({ ELEMENT_KEY: "el-123" });
        assert_eq!(element_id_from_value(&value).unwrap(), "el-123");

        let bad = serde_json::json!({ "ELEMENT": "legacy" });
        assert!(element_id_from_value(&bad).is_err());
    }
}
