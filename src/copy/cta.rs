// src/copy/cta.rs
//! Call-to-action classifier. Unlike the subject/opener classifiers this
//! one is exclusive: first matching rule wins, and each CTA type carries a
//! commitment level.

use serde::Serialize;

use crate::copy::subject::contains_any;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum CtaKind {
    FreeOffer,
    MeetingRequest,
    SoftQuestion,
    Demo,
    InfoRequest,
    Urgent,
}

impl CtaKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::FreeOffer => "free-offer",
            Self::MeetingRequest => "meeting-request",
            Self::SoftQuestion => "soft-question",
            Self::Demo => "demo",
            Self::InfoRequest => "info-request",
            Self::Urgent => "urgent",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Commitment {
    Low,
    Medium,
    High,
}

impl Commitment {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CtaStyle {
    #[serde(rename = "type")]
    pub kind: CtaKind,
    pub commitment: Commitment,
}

const FREE_OFFER: &[&str] = &["free", "no cost", "no charge", "on us", "sample"];
const SOFT_QUESTION: &[&str] = &[
    "worth a",
    "open to",
    "interested?",
    "thoughts",
    "make sense",
    "curious",
    "any interest",
];
const INFO_REQUEST: &[&str] = &["more info", "more details", "send you", "share", "learn more"];
const DEMO: &[&str] = &["demo", "walkthrough", "show you", "see it in action"];
const MEETING_REQUEST: &[&str] = &[
    "call", "meeting", "meet", "calendar", "schedule", "15 min", "chat",
];
const URGENT: &[&str] = &["today", "right now", "asap", "this week", "limited", "before"];

/// Classify a CTA sentence. Check order is fixed: free-offer, soft-question,
/// info-request, demo, meeting-request, urgent.
pub fn classify_cta(cta: &str) -> CtaStyle {
    let lower = cta.to_lowercase();
    let rules: &[(&[&str], CtaKind, Commitment)] = &[
        (FREE_OFFER, CtaKind::FreeOffer, Commitment::Low),
        (SOFT_QUESTION, CtaKind::SoftQuestion, Commitment::Low),
        (INFO_REQUEST, CtaKind::InfoRequest, Commitment::Medium),
        (DEMO, CtaKind::Demo, Commitment::Medium),
        (MEETING_REQUEST, CtaKind::MeetingRequest, Commitment::High),
        (URGENT, CtaKind::Urgent, Commitment::High),
    ];
    for (markers, kind, commitment) in rules {
        if contains_any(&lower, markers) {
            return CtaStyle {
                kind: *kind,
                commitment: *commitment,
            };
        }
    }
    CtaStyle {
        kind: CtaKind::SoftQuestion,
        commitment: Commitment::Medium,
    }
}
