// SPDX-License-Identifier: MIT
//! doctor — pre-flight checks run before the daemon starts.
//!
//! Self-contained, no AppContext required. Catches the deployment problems
//! that otherwise surface as confusing runtime failures: the port being
//! taken, an unwritable data directory, a dead WebDriver endpoint, or
//! missing credentials.

use std::time::Duration;

use crate::config::PulseConfig;
use crate::storage::Storage;

const GREEN: &str = "\x1b[32m";
const RED: &str = "\x1b[31m";
const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

/// Result of one pre-flight check.
pub struct CheckResult {
    pub name: &'static str,
    pub passed: bool,
    pub detail: String,
}

/// Run all pre-flight checks.
pub async fn run_doctor(config: &PulseConfig) -> Vec<CheckResult> {
    vec![
        check_port_available(config),
        check_data_dir_writable(config),
        check_sqlite_accessible(config).await,
        check_webdriver_reachable(config).await,
        check_credentials(config),
    ]
}

// ─── Individual checks ────────────────────────────────────────────────────────

/// Check 1: the configured port can be bound.
fn check_port_available(config: &PulseConfig) -> CheckResult {
    let bind = format!("{}:{}", config.bind_address, config.port);
    match std::net::TcpListener::bind(&bind) {
        Ok(_) => CheckResult {
            name: "REST port available",
            passed: true,
            detail: bind,
        },
        Err(e) => CheckResult {
            name: "REST port available",
            passed: false,
            detail: format!("cannot bind {bind}: {e}"),
        },
    }
}

/// Check 2: the data directory exists (or can be created) and is writable.
fn check_data_dir_writable(config: &PulseConfig) -> CheckResult {
    let name = "Data directory writable";
    if let Err(e) = std::fs::create_dir_all(&config.data_dir) {
        return CheckResult {
            name,
            passed: false,
            detail: format!("cannot create {}: {e}", config.data_dir.display()),
        };
    }
    let probe = config.data_dir.join(".doctor-probe");
    match std::fs::write(&probe, b"ok") {
        Ok(()) => {
            let _ = std::fs::remove_file(&probe);
            CheckResult {
                name,
                passed: true,
                detail: config.data_dir.display().to_string(),
            }
        }
        Err(e) => CheckResult {
            name,
            passed: false,
            detail: format!("cannot write to {}: {e}", config.data_dir.display()),
        },
    }
}

/// Check 3: the SQLite database opens and migrates.
async fn check_sqlite_accessible(config: &PulseConfig) -> CheckResult {
    let name = "SQLite accessible";
    match Storage::new(&config.data_dir).await {
        Ok(_) => CheckResult {
            name,
            passed: true,
            detail: format!("{}/pulsed.db", config.data_dir.display()),
        },
        Err(e) => CheckResult {
            name,
            passed: false,
            detail: format!("{e:#}"),
        },
    }
}

/// Check 4: the WebDriver endpoint answers its /status route.
async fn check_webdriver_reachable(config: &PulseConfig) -> CheckResult {
    let name = "WebDriver reachable";
    let url = format!(
        "{}/status",
        config.scraper.webdriver_url.trim_end_matches('/')
    );

    let client = match reqwest::Client::builder()
        .timeout(Duration::from_secs(3))
        .build()
    {
        Ok(c) => c,
        Err(e) => {
            return CheckResult {
                name,
                passed: false,
                detail: format!("http client: {e}"),
            }
        }
    };

    match client.get(&url).send().await {
        Ok(resp) => {
            let ready = resp
                .json::<serde_json::Value>()
                .await
                .ok()
                .and_then(|v| v["value"]["ready"].as_bool())
                .unwrap_or(false);
            CheckResult {
                name,
                passed: ready,
                detail: if ready {
                    format!("{url} (ready)")
                } else {
                    format!("{url} answered but reports not ready")
                },
            }
        }
        Err(e) => CheckResult {
            name,
            passed: false,
            detail: format!("{url}: {e}"),
        },
    }
}

/// Check 5: scraper credentials are configured.
fn check_credentials(config: &PulseConfig) -> CheckResult {
    let name = "Credentials configured";
    if config.credentials.is_some() {
        CheckResult {
            name,
            passed: true,
            detail: "TWITTER_MAIL / TWITTER_USERNAME / TWITTER_PASSWORD set".to_string(),
        }
    } else {
        CheckResult {
            name,
            passed: false,
            detail: "set TWITTER_MAIL, TWITTER_USERNAME and TWITTER_PASSWORD".to_string(),
        }
    }
}

// ─── Reporting ────────────────────────────────────────────────────────────────

pub fn print_doctor_results(results: &[CheckResult]) {
    println!();
    println!("{BOLD}pulsed doctor — pre-flight checks{RESET}");
    println!("{}", "─".repeat(60));

    for r in results {
        let (symbol, color) = if r.passed { ("✓", GREEN) } else { ("✗", RED) };
        println!("  {color}{symbol}{RESET}  {:<26}  {}", r.name, r.detail);
    }

    println!("{}", "─".repeat(60));

    let failed = results.iter().filter(|r| !r.passed).count();
    if failed == 0 {
        println!("{GREEN}All checks passed.{RESET}");
    } else {
        println!("{RED}{failed} check(s) failed. See above for details.{RESET}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn test_config(data_dir: PathBuf) -> PulseConfig {
        PulseConfig::new(Some(0), Some(data_dir), Some("error".to_string()), None)
    }

    #[test]
    fn data_dir_check_passes_in_a_tempdir() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = test_config(dir.path().to_path_buf());
        let result = check_data_dir_writable(&config);
        assert!(result.passed, "{}", result.detail);
    }

    #[test]
    fn data_dir_check_fails_when_parent_is_a_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, b"file").unwrap();
        let config = test_config(blocker.join("pulsed"));
        let result = check_data_dir_writable(&config);
        assert!(!result.passed);
    }

    #[tokio::test]
    async fn sqlite_check_passes_in_a_tempdir() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = test_config(dir.path().to_path_buf());
        let result = check_sqlite_accessible(&config).await;
        assert!(result.passed, "{}", result.detail);
    }
}
