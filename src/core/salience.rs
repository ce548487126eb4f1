//! Salience Extractor: scores one stimulus into four normalized signals
//!
//! Heuristics only: capitalization, exclamation and question density,
//! keyword lexicons, punctuation-only and low-diversity detection.

use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashSet;

use crate::types::{SalienceVector, Stimulus};
use crate::{
    BLANK_AMBIGUITY, EXCLAIM_SATURATION, KEYWORD_HIT_SCORE, KEYWORD_SATURATION,
    LOW_DIVERSITY_AMBIGUITY, PUNCTUATION_ONLY_AMBIGUITY, QUESTION_AMBIGUITY, QUESTION_SATURATION,
    THREAT_CAPS_WEIGHT, THREAT_EXCLAIM_WEIGHT, THREAT_KEYWORD_WEIGHT, UNSCORED_AMBIGUITY,
};

lazy_static! {
    // =========================================================================
    // Threat lexicon
    // =========================================================================
    static ref RE_THREAT: Regex = Regex::new(
        r"(?i)\b(urgent|help|now|stop|emergency|danger|drill|panic|hurt|attack|fire|alarm|scared|afraid|threat)\b"
    ).unwrap();

    // =========================================================================
    // Social / co-regulation lexicon
    // =========================================================================
    static ref RE_SOCIAL: Regex = Regex::new(
        r"(?i)\b(hey|hi|hello|thanks|thank|appreciate|checking|friend|together|you|we|us)\b"
    ).unwrap();

    // =========================================================================
    // Repair / grounding lexicon
    // =========================================================================
    static ref RE_REPAIR: Regex = Regex::new(
        r"(?i)\b(ok|okay|breathe|sorry|good|safe|calm|fine|alright|rest|easy|here)\b"
    ).unwrap();
}

/// Minimum length before character diversity is judged
const DIVERSITY_MIN_CHARS: usize = 8;

/// distinct/total below this is treated as noise
const DIVERSITY_FLOOR: f64 = 0.25;

/// Salience extractor; stateless
#[derive(Debug, Default, Clone, Copy)]
pub struct SalienceExtractor;

impl SalienceExtractor {
    /// Create new extractor
    pub fn new() -> Self {
        Self
    }

    /// Score a stimulus. Total over every input; silence is the zero vector.
    pub fn extract(&self, stimulus: Stimulus<'_>) -> SalienceVector {
        match stimulus {
            Stimulus::Silence => SalienceVector::zero(),
            Stimulus::Text(text) => self.score_text(text),
        }
    }

    fn score_text(&self, text: &str) -> SalienceVector {
        let text = text.trim();

        if text.is_empty() {
            return SalienceVector {
                ambiguity: BLANK_AMBIGUITY,
                ..SalienceVector::zero()
            };
        }

        let letters = text.chars().filter(|c| c.is_alphabetic()).count();
        let upper = text.chars().filter(|c| c.is_uppercase()).count();
        let caps_ratio = if letters >= 2 {
            upper as f64 / letters as f64
        } else {
            0.0
        };

        let exclaims = text.matches('!').count() as f64;
        let exclaim_score = (exclaims / EXCLAIM_SATURATION).min(1.0);

        let threat_hits = count_matches(&RE_THREAT, text);
        let social_hits = count_matches(&RE_SOCIAL, text);
        let repair_hits = count_matches(&RE_REPAIR, text);

        let threat = THREAT_CAPS_WEIGHT * caps_ratio
            + THREAT_EXCLAIM_WEIGHT * exclaim_score
            + THREAT_KEYWORD_WEIGHT * (threat_hits / KEYWORD_SATURATION).min(1.0);

        let social = KEYWORD_HIT_SCORE * social_hits;
        let repair = KEYWORD_HIT_SCORE * repair_hits;

        let questions = text.matches('?').count() as f64;
        let mut ambiguity = (questions / QUESTION_SATURATION).min(1.0) * QUESTION_AMBIGUITY;

        if !text.chars().any(char::is_alphanumeric) {
            ambiguity += PUNCTUATION_ONLY_AMBIGUITY;
        }
        if is_low_diversity(text) {
            ambiguity += LOW_DIVERSITY_AMBIGUITY;
        }

        let unscored = threat_hits == 0.0
            && social_hits == 0.0
            && repair_hits == 0.0
            && caps_ratio < 0.5
            && exclaims == 0.0;
        if unscored {
            ambiguity += UNSCORED_AMBIGUITY;
        }

        SalienceVector {
            threat: threat.clamp(0.0, 1.0),
            social: social.clamp(0.0, 1.0),
            ambiguity: ambiguity.clamp(0.0, 1.0),
            repair: repair.clamp(0.0, 1.0),
        }
    }
}

/// Count regex matches in text
fn count_matches(regex: &Regex, text: &str) -> f64 {
    regex.find_iter(text).count() as f64
}

/// Long runs of the same few characters ("aaaaaaaa", "!?!?!?!?")
fn is_low_diversity(text: &str) -> bool {
    let total = text.chars().count();
    if total < DIVERSITY_MIN_CHARS {
        return false;
    }
    let distinct: HashSet<char> = text.chars().flat_map(char::to_lowercase).collect();
    (distinct.len() as f64 / total as f64) < DIVERSITY_FLOOR
}

// =============================================================================
// TESTS
// =============================================================================
