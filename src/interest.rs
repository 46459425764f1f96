// src/interest.rs
//! Interest filter: decides whether an inbound reply represents genuine
//! buying interest. Upstream already pre-filters to interested=1; this
//! removes the false positives inside that set (bounces, out-of-office,
//! opt-outs). Pure function over the reply, safe to re-run.

use metrics::counter;

use crate::models::Reply;

/// Mail-server senders that never represent a person.
const BOUNCE_SENDERS: &[&str] = &["postmaster", "mailer-daemon", "noreply@", "no-reply@"];

/// Bounce signals in the subject line.
const BOUNCE_SUBJECTS: &[&str] = &[
    "undeliverable",
    "delivery status",
    "delivery failed",
    "returned mail",
];

/// Bounce signals in the body, including bare SMTP codes.
const BOUNCE_BODIES: &[&str] = &[
    "delivery has failed",
    "message could not be delivered",
    "550 ",
    "554 ",
];

/// Out-of-office markers, checked in subject and body.
const OUT_OF_OFFICE: &[&str] = &["out of office", "automatic reply", "i am currently out"];

/// Explicit opt-out / negative responses.
const OPT_OUT: &[&str] = &[
    "unsubscribe me",
    "remove me from",
    "stop emailing me",
    "not interested",
];

/// Sequential exclusion rules, short-circuiting on the first hit. The
/// rules are independent ORs; order is for readability, not outcome.
pub fn is_real_interest(reply: &Reply) -> bool {
    let subject = reply.subject.to_lowercase();
    let body = reply.text_body.to_lowercase();
    let from = reply.from_email_address.to_lowercase();

    if reply.automated_reply {
        return false;
    }
    if contains_any(&from, BOUNCE_SENDERS) {
        return false;
    }
    if contains_any(&subject, BOUNCE_SUBJECTS) {
        return false;
    }
    if contains_any(&body, BOUNCE_BODIES) {
        return false;
    }
    if contains_any(&subject, OUT_OF_OFFICE) || contains_any(&body, OUT_OF_OFFICE) {
        return false;
    }
    if contains_any(&body, OPT_OUT) {
        return false;
    }
    true
}

/// Filter a reply batch down to genuine interest, recording how many were
/// dropped.
pub fn filter_real_interest(replies: Vec<Reply>) -> Vec<Reply> {
    let before = replies.len();
    let kept: Vec<Reply> = replies.into_iter().filter(is_real_interest).collect();
    counter!("replies_filtered_total").increment((before - kept.len()) as u64);
    kept
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| haystack.contains(n))
}
