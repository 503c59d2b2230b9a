// SPDX-License-Identifier: MIT
//! Sentiment scoring — pure lexicon heuristic, < 1 ms per tweet, no model
//! calls.
//!
//! [`polarity`] averages lexicon scores over the tokens of a text, with a
//! short negation window and modifier scaling. The result lands in
//! [-1, 1]; [`Sentiment::from_polarity`] buckets it at ±0.2.

mod lexicon;

use once_cell::sync::OnceCell;
use regex::Regex;
use serde::Serialize;

/// Polarity above which a text counts as positive.
pub const POSITIVE_THRESHOLD: f64 = 0.2;
/// Polarity below which a text counts as negative.
pub const NEGATIVE_THRESHOLD: f64 = -0.2;

/// A negator affects the next scored token, but only within this many
/// following tokens — "not the best" flips, "not sure where Bitcoin goes"
/// does not reach `goes`.
const NEGATION_WINDOW: u8 = 3;

static TOKEN_RE: OnceCell<Regex> = OnceCell::new();

fn token_re() -> &'static Regex {
    TOKEN_RE.get_or_init(|| Regex::new(r"[a-z']+").expect("token regex"))
}

/// Classified sentiment bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
}

impl Sentiment {
    pub fn from_polarity(polarity: f64) -> Self {
        if polarity > POSITIVE_THRESHOLD {
            Sentiment::Positive
        } else if polarity < NEGATIVE_THRESHOLD {
            Sentiment::Negative
        } else {
            Sentiment::Neutral
        }
    }
}

/// Score a text in [-1, 1]. Texts with no scored tokens are 0.0 (neutral).
///
/// This function is **pure** — no side effects, no async, no panics.
pub fn polarity(text: &str) -> f64 {
    let lower = text.to_lowercase();

    let mut sum = 0.0f64;
    let mut scored = 0u32;
    let mut negation_left = 0u8;
    let mut scale = 1.0f64;

    for m in token_re().find_iter(&lower) {
        let token = m.as_str();

        if lexicon::is_negator(token) {
            negation_left = NEGATION_WINDOW;
            continue;
        }
        if let Some(factor) = lexicon::modifier(token) {
            scale = factor;
            continue;
        }

        if let Some(base) = lexicon::score(token) {
            let mut value = base * scale;
            if negation_left > 0 {
                value = -value;
            }
            sum += value;
            scored += 1;
            negation_left = 0;
            scale = 1.0;
        } else if negation_left > 0 {
            negation_left -= 1;
            if negation_left == 0 {
                scale = 1.0;
            }
        }
    }

    if scored == 0 {
        0.0
    } else {
        (sum / f64::from(scored)).clamp(-1.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bullish_text_is_positive() {
        let p = polarity("Bitcoin looking very bullish today, huge gains incoming. LFG!");
        assert!(p > POSITIVE_THRESHOLD, "polarity was {p}");
        assert_eq!(Sentiment::from_polarity(p), Sentiment::Positive);
    }

    #[test]
    fn scam_text_is_negative() {
        let p = polarity("Total rug pull. Another scam, everyone got rekt and lost everything.");
        assert!(p < NEGATIVE_THRESHOLD, "polarity was {p}");
        assert_eq!(Sentiment::from_polarity(p), Sentiment::Negative);
    }

    #[test]
    fn plain_text_is_neutral() {
        let p = polarity("ETH is trading sideways around the same range as yesterday.");
        assert_eq!(Sentiment::from_polarity(p), Sentiment::Neutral);
    }

    #[test]
    fn empty_and_unscored_text_is_zero() {
        assert_eq!(polarity(""), 0.0);
        assert_eq!(polarity("the of and a 123 456"), 0.0);
    }

    #[test]
    fn negation_flips_the_next_scored_token() {
        let plain = polarity("this project is good");
        let negated = polarity("this project is not good");
        assert!(plain > 0.0);
        assert!(negated < 0.0);
    }

    #[test]
    fn negation_window_expires() {
        // Several unscored tokens sit between the negator and the scored
        // word — the flip must no longer apply.
        let p = polarity("not really sure about all this but bullish");
        assert!(p > 0.0, "polarity was {p}");
    }

    #[test]
    fn modifiers_scale_magnitude() {
        let plain = polarity("good");
        let strong = polarity("extremely good");
        let weak = polarity("slightly good");
        assert!(strong > plain, "{strong} <= {plain}");
        assert!(weak < plain, "{weak} >= {plain}");
    }

    #[test]
    fn result_is_clamped() {
        let p = polarity("extremely amazing extremely fantastic extremely perfect");
        assert!(p <= 1.0);
        let n = polarity("extremely terrible extremely horrible extremely worst");
        assert!(n >= -1.0);
    }

    #[test]
    fn thresholds_are_exclusive_at_the_boundary() {
        assert_eq!(Sentiment::from_polarity(0.2), Sentiment::Neutral);
        assert_eq!(Sentiment::from_polarity(-0.2), Sentiment::Neutral);
        assert_eq!(Sentiment::from_polarity(0.201), Sentiment::Positive);
        assert_eq!(Sentiment::from_polarity(-0.201), Sentiment::Negative);
        assert_eq!(Sentiment::from_polarity(0.0), Sentiment::Neutral);
    }

    #[test]
    fn case_and_punctuation_do_not_matter() {
        assert_eq!(polarity("BULLISH!!!"), polarity("bullish"));
    }
}
