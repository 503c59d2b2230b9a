// SPDX-License-Identifier: MIT
//! Polarity lexicon — word scores in [-1, 1], general English plus the
//! crypto-Twitter vocabulary the tracked keywords actually surface.

use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Words that flip the sign of the next scored token.
const NEGATORS: &[&str] = &[
    "not", "no", "never", "neither", "nor", "cannot", "can't", "won't", "don't", "doesn't",
    "didn't", "isn't", "aren't", "wasn't", "weren't", "wouldn't", "shouldn't", "couldn't",
    "ain't", "without",
];

/// Modifiers that scale the next scored token.
const MODIFIERS: &[(&str, f64)] = &[
    ("very", 1.5),
    ("extremely", 1.8),
    ("really", 1.4),
    ("so", 1.3),
    ("super", 1.5),
    ("absolutely", 1.6),
    ("totally", 1.4),
    ("incredibly", 1.7),
    ("insanely", 1.7),
    ("slightly", 0.5),
    ("somewhat", 0.6),
    ("kinda", 0.6),
    ("barely", 0.4),
    ("mildly", 0.5),
];

/// (word, polarity) pairs. Kept sorted by rough theme, not alphabetically,
/// so domain additions stay reviewable.
const WORDS: &[(&str, f64)] = &[
    // General positive
    ("good", 0.6),
    ("great", 0.8),
    ("excellent", 0.9),
    ("amazing", 0.9),
    ("awesome", 0.9),
    ("fantastic", 0.9),
    ("wonderful", 0.8),
    ("best", 0.9),
    ("better", 0.5),
    ("love", 0.7),
    ("loved", 0.7),
    ("like", 0.3),
    ("likes", 0.3),
    ("win", 0.6),
    ("winning", 0.7),
    ("winner", 0.7),
    ("happy", 0.7),
    ("glad", 0.6),
    ("excited", 0.7),
    ("exciting", 0.7),
    ("promising", 0.6),
    ("impressive", 0.7),
    ("strong", 0.5),
    ("stronger", 0.6),
    ("solid", 0.5),
    ("healthy", 0.5),
    ("confident", 0.5),
    ("success", 0.7),
    ("successful", 0.7),
    ("opportunity", 0.4),
    ("growth", 0.5),
    ("growing", 0.5),
    ("gain", 0.5),
    ("gains", 0.6),
    ("profit", 0.6),
    ("profitable", 0.7),
    ("rich", 0.5),
    ("wealth", 0.5),
    ("easy", 0.3),
    ("free", 0.3),
    ("safe", 0.4),
    ("secure", 0.4),
    ("trust", 0.4),
    ("trusted", 0.5),
    ("innovative", 0.6),
    ("revolutionary", 0.7),
    ("huge", 0.4),
    ("massive", 0.4),
    ("nice", 0.5),
    ("cool", 0.4),
    ("beautiful", 0.7),
    ("perfect", 0.9),
    ("legit", 0.5),
    ("undervalued", 0.5),
    ("up", 0.3),
    ("higher", 0.4),
    ("high", 0.3),
    ("surge", 0.6),
    ("surging", 0.7),
    ("soar", 0.7),
    ("soaring", 0.7),
    ("rally", 0.6),
    ("rallying", 0.6),
    ("recover", 0.5),
    ("recovery", 0.5),
    ("breakout", 0.6),
    ("adoption", 0.5),
    ("partnership", 0.5),
    ("upgrade", 0.5),
    ("milestone", 0.5),
    // Crypto-positive slang
    ("bullish", 0.8),
    ("bull", 0.5),
    ("moon", 0.7),
    ("mooning", 0.8),
    ("hodl", 0.4),
    ("hodling", 0.4),
    ("gm", 0.3),
    ("wagmi", 0.7),
    ("lfg", 0.7),
    ("gem", 0.6),
    ("alpha", 0.4),
    ("pump", 0.4),
    ("pumping", 0.5),
    ("ath", 0.6),
    ("diamond", 0.4),
    ("accumulate", 0.4),
    ("accumulating", 0.4),
    ("buy", 0.3),
    ("buying", 0.3),
    // General negative
    ("bad", -0.6),
    ("terrible", -0.9),
    ("horrible", -0.9),
    ("awful", -0.9),
    ("worst", -0.9),
    ("worse", -0.5),
    ("hate", -0.7),
    ("hated", -0.7),
    ("lose", -0.6),
    ("losing", -0.6),
    ("loss", -0.6),
    ("losses", -0.6),
    ("lost", -0.6),
    ("loser", -0.7),
    ("fail", -0.7),
    ("failed", -0.7),
    ("failure", -0.7),
    ("sad", -0.6),
    ("angry", -0.6),
    ("fear", -0.6),
    ("afraid", -0.6),
    ("scared", -0.6),
    ("scary", -0.5),
    ("panic", -0.7),
    ("worry", -0.5),
    ("worried", -0.5),
    ("weak", -0.5),
    ("weaker", -0.5),
    ("risky", -0.4),
    ("risk", -0.3),
    ("danger", -0.6),
    ("dangerous", -0.6),
    ("problem", -0.4),
    ("problems", -0.4),
    ("broken", -0.6),
    ("broke", -0.5),
    ("crash", -0.8),
    ("crashed", -0.8),
    ("crashing", -0.8),
    ("collapse", -0.8),
    ("collapsed", -0.8),
    ("plunge", -0.7),
    ("plunging", -0.7),
    ("tank", -0.6),
    ("tanking", -0.7),
    ("dump", -0.6),
    ("dumping", -0.6),
    ("dumped", -0.6),
    ("down", -0.3),
    ("lower", -0.4),
    ("low", -0.3),
    ("drop", -0.4),
    ("dropping", -0.5),
    ("dropped", -0.5),
    ("bleed", -0.6),
    ("bleeding", -0.6),
    ("correction", -0.4),
    ("selloff", -0.6),
    ("sell", -0.3),
    ("selling", -0.3),
    ("manipulation", -0.6),
    ("manipulated", -0.6),
    ("fraud", -0.9),
    ("fraudulent", -0.9),
    ("hack", -0.7),
    ("hacked", -0.8),
    ("exploit", -0.6),
    ("exploited", -0.7),
    ("stolen", -0.8),
    ("theft", -0.8),
    ("lawsuit", -0.5),
    ("ban", -0.5),
    ("banned", -0.6),
    ("bubble", -0.5),
    ("ponzi", -0.9),
    ("worthless", -0.9),
    ("useless", -0.7),
    ("dead", -0.6),
    ("dying", -0.6),
    ("overvalued", -0.5),
    ("expensive", -0.3),
    ("dip", -0.3),
    ("warning", -0.4),
    ("avoid", -0.5),
    ("regret", -0.6),
    ("mistake", -0.5),
    ("doubt", -0.4),
    ("uncertain", -0.4),
    ("uncertainty", -0.4),
    ("volatile", -0.3),
    ("volatility", -0.3),
    // Crypto-negative slang
    ("bearish", -0.8),
    ("bear", -0.4),
    ("rekt", -0.9),
    ("rug", -0.8),
    ("rugged", -0.9),
    ("rugpull", -0.9),
    ("scam", -0.9),
    ("scammer", -0.9),
    ("scammers", -0.9),
    ("shitcoin", -0.8),
    ("fud", -0.5),
    ("ngmi", -0.7),
    ("bagholder", -0.6),
    ("vaporware", -0.7),
    ("capitulation", -0.7),
];

static SCORES: Lazy<HashMap<&'static str, f64>> = Lazy::new(|| WORDS.iter().copied().collect());

/// Polarity for a token, if the lexicon knows it.
pub(crate) fn score(token: &str) -> Option<f64> {
    SCORES.get(token).copied()
}

pub(crate) fn is_negator(token: &str) -> bool {
    NEGATORS.contains(&token)
}

/// Scale factor for a modifier token, if it is one.
pub(crate) fn modifier(token: &str) -> Option<f64> {
    MODIFIERS
        .iter()
        .find(|(w, _)| *w == token)
        .map(|(_, factor)| *factor)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_scores_are_in_range() {
        for (word, score) in WORDS {
            assert!(
                (-1.0..=1.0).contains(score),
                "{word} has out-of-range score {score}"
            );
        }
    }

    #[test]
    fn no_duplicate_lexicon_entries() {
        assert_eq!(SCORES.len(), WORDS.len(), "duplicate word in lexicon");
    }

    #[test]
    fn negators_and_modifiers_do_not_overlap_scored_words() {
        for neg in NEGATORS {
            assert!(score(neg).is_none(), "{neg} is both negator and scored");
        }
        for (m, _) in MODIFIERS {
            assert!(score(m).is_none(), "{m} is both modifier and scored");
        }
    }
}
