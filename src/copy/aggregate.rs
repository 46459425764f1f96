// src/copy/aggregate.rs
//! Groups repeated copy variants across campaigns and computes
//! volume-weighted rates. Weighting is the central correctness property
//! here: merging a high-volume campaign's subject with a low-volume
//! twin must sum the volumes before dividing, never average the rates.

use std::collections::HashMap;

use serde::Serialize;

/// Key prefix length for hooks/CTAs: long enough to separate distinct
/// copy, short enough to merge variants differing only in the tail.
pub const SNIPPET_KEY_PREFIX_LEN: usize = 60;

/// One appearance of a piece of copy in one campaign, with that
/// campaign's volume counters attached.
#[derive(Debug, Clone)]
pub struct CopyOccurrence {
    pub text: String,
    pub campaign: String,
    pub sent: u64,
    pub leads_contacted: u64,
    pub interested: u64,
    pub replies: u64,
}

/// A unique piece of creative text seen across one or more campaigns.
/// Immutable once built; recreated fresh per report.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CopyVariant {
    pub text: String,
    pub campaigns: Vec<String>,
    pub appearances: usize,
    pub total_sent: u64,
    pub total_leads_contacted: u64,
    pub total_interested: u64,
    pub total_replies: u64,
    pub weighted_interest_rate: f64,
    pub weighted_reply_rate: f64,
    pub tags: Vec<String>,
}

/// Uniqueness key for subject lines: the whole text, lower-cased.
pub fn subject_key(text: &str) -> String {
    text.trim().to_lowercase()
}

/// Uniqueness key for hooks/CTAs: a fixed-length lower-cased prefix, to
/// tolerate trailing variation.
pub fn snippet_key(text: &str) -> String {
    text.trim()
        .to_lowercase()
        .chars()
        .take(SNIPPET_KEY_PREFIX_LEN)
        .collect()
}

struct Group {
    text: String,
    campaigns: Vec<String>,
    appearances: usize,
    sent: u64,
    leads_contacted: u64,
    interested: u64,
    replies: u64,
    member_interest_rates: Vec<f64>,
    member_reply_rates: Vec<f64>,
}

/// Group occurrences by `key_fn`, sum volumes, derive weighted rates, tag
/// each variant's canonical text with `tag_fn`, and rank by weighted
/// interest rate (descending, stable).
pub fn aggregate(
    occurrences: &[CopyOccurrence],
    key_fn: impl Fn(&str) -> String,
    tag_fn: impl Fn(&str) -> Vec<String>,
) -> Vec<CopyVariant> {
    let mut groups: Vec<Group> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for occ in occurrences {
        if occ.text.trim().is_empty() {
            continue;
        }
        let key = key_fn(&occ.text);
        let i = *index.entry(key).or_insert_with(|| {
            groups.push(Group {
                text: occ.text.trim().to_string(),
                campaigns: Vec::new(),
                appearances: 0,
                sent: 0,
                leads_contacted: 0,
                interested: 0,
                replies: 0,
                member_interest_rates: Vec::new(),
                member_reply_rates: Vec::new(),
            });
            groups.len() - 1
        });
        let g = &mut groups[i];
        g.appearances += 1;
        g.sent += occ.sent;
        g.leads_contacted += occ.leads_contacted;
        g.interested += occ.interested;
        g.replies += occ.replies;
        g.member_interest_rates
            .push(rate(occ.interested, occ.leads_contacted, occ.sent));
        g.member_reply_rates
            .push(rate(occ.replies, occ.leads_contacted, occ.sent));
        if !g.campaigns.contains(&occ.campaign) {
            g.campaigns.push(occ.campaign.clone());
        }
    }

    let mut variants: Vec<CopyVariant> = groups
        .into_iter()
        .map(|g| {
            let weighted_interest_rate = weighted_rate(
                g.interested,
                g.leads_contacted,
                &g.member_interest_rates,
            );
            let weighted_reply_rate =
                weighted_rate(g.replies, g.leads_contacted, &g.member_reply_rates);
            CopyVariant {
                tags: tag_fn(&g.text),
                text: g.text,
                campaigns: g.campaigns,
                appearances: g.appearances,
                total_sent: g.sent,
                total_leads_contacted: g.leads_contacted,
                total_interested: g.interested,
                total_replies: g.replies,
                weighted_interest_rate,
                weighted_reply_rate,
            }
        })
        .collect();

    variants.sort_by(|a, b| {
        b.weighted_interest_rate
            .partial_cmp(&a.weighted_interest_rate)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    variants
}

/// Per-member rate with the usual denominator fallback: leads contacted
/// when positive, emails sent otherwise, 0 when neither.
fn rate(numerator: u64, leads_contacted: u64, sent: u64) -> f64 {
    let denominator = if leads_contacted > 0 { leads_contacted } else { sent };
    if denominator == 0 {
        return 0.0;
    }
    round2(numerator as f64 / denominator as f64 * 100.0)
}

/// Volume-weighted rate over a group; falls back to the unweighted mean
/// of member rates when no leads-contacted figure exists at all.
fn weighted_rate(total: u64, total_leads_contacted: u64, member_rates: &[f64]) -> f64 {
    if total_leads_contacted > 0 {
        return round2(total as f64 / total_leads_contacted as f64 * 100.0);
    }
    if member_rates.is_empty() {
        return 0.0;
    }
    round2(member_rates.iter().sum::<f64>() / member_rates.len() as f64)
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}
