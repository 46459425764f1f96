// src/copy/opener.rs
//! Opening-hook classifier: prefix/substring rules against the first
//! sentence and the whole opening passage.

use serde::Serialize;

use crate::copy::normalize::split_sentences;
use crate::copy::subject::contains_any;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum OpenerTag {
    PainFirst,
    BenefitFirst,
    Question,
    Story,
    DirectOffer,
    SocialProof,
    Personalized,
}

impl OpenerTag {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PainFirst => "pain-first",
            Self::BenefitFirst => "benefit-first",
            Self::Question => "question",
            Self::Story => "story",
            Self::DirectOffer => "direct-offer",
            Self::SocialProof => "social-proof",
            Self::Personalized => "personalized",
        }
    }
}

const QUESTION_STARTERS: &[&str] = &[
    "did ", "do ", "does ", "have ", "has ", "are ", "is ", "what ", "how ", "why ", "would ",
    "ever ",
];

const PAIN_MARKERS: &[&str] = &[
    "struggling",
    "tired of",
    "frustrat",
    "problem",
    "challenge",
    "pain",
    "costly",
    "expensive",
    "headache",
];

const BENEFIT_MARKERS: &[&str] = &[
    "free", "save", "cut", "boost", "grow", "increase", "roi", "double",
];

const STORY_STARTERS: &[&str] = &["i ", "i'", "we ", "when ", "last ", "recently", "a few "];

const SOCIAL_PROOF_MARKERS: &[&str] = &[
    "customers",
    "clients",
    "companies like",
    "teams like",
    "helped",
    "trusted by",
    "case study",
];

const PERSONALIZED_MARKERS: &[&str] = &[
    "{{",
    "noticed",
    "saw your",
    "your company",
    "your team",
    "congrats",
];

/// Classify an opening passage into one or more non-exclusive categories;
/// `direct-offer` only when nothing else matched.
pub fn classify_opener(opening: &str) -> Vec<OpenerTag> {
    let passage = opening.to_lowercase();
    let first = split_sentences(&passage)
        .into_iter()
        .next()
        .unwrap_or_default();
    let mut tags = Vec::new();

    if first.ends_with('?') || QUESTION_STARTERS.iter().any(|p| first.starts_with(p)) {
        tags.push(OpenerTag::Question);
    }
    if contains_any(&first, PAIN_MARKERS) {
        tags.push(OpenerTag::PainFirst);
    }
    if contains_any(&first, BENEFIT_MARKERS) {
        tags.push(OpenerTag::BenefitFirst);
    }
    if STORY_STARTERS.iter().any(|p| passage.starts_with(p)) {
        tags.push(OpenerTag::Story);
    }
    if contains_any(&passage, SOCIAL_PROOF_MARKERS) {
        tags.push(OpenerTag::SocialProof);
    }
    if contains_any(&passage, PERSONALIZED_MARKERS) {
        tags.push(OpenerTag::Personalized);
    }
    if tags.is_empty() {
        tags.push(OpenerTag::DirectOffer);
    }
    tags
}
