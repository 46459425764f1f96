// src/leads.rs
//! Lead deduplication: folds interest-filtered replies into one lead per
//! sender address, enriched with a derived company, industry, and campaign
//! attribution. First reply per address wins; the final list is sorted by
//! recency and capped to the authoritative interested count from campaign
//! stats.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, NaiveDateTime};
use once_cell::sync::OnceCell;
use regex::Regex;
use serde::Serialize;

use crate::models::Reply;

/// Reply previews are capped for display.
const PREVIEW_MAX_CHARS: usize = 200;

/// Campaign-name keyword to industry, first match wins.
const INDUSTRY_TABLE: &[(&str, &str)] = &[
    ("solar", "Solar"),
    ("retail", "Retail"),
    ("prepper", "Preparedness"),
    ("van life", "Outdoor/RV"),
    ("water", "Water Systems"),
    ("hotel", "Hospitality"),
    ("resort", "Hospitality"),
    ("tiny home", "Construction"),
    ("adu", "Construction"),
    ("warehouse", "Wholesale"),
    ("software", "Software"),
    ("saas", "Software"),
    ("agency", "Agency"),
];

const DEFAULT_INDUSTRY: &str = "Other";

/// One person who replied with genuine interest. Keyed by lower-cased
/// email; at most one per address per report.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Lead {
    pub id: u64,
    pub email: String,
    pub name: String,
    pub company: String,
    pub title: String,
    pub industry: String,
    pub campaign: String,
    pub campaign_id: u64,
    pub subject: String,
    pub reply_preview: String,
    pub reply_date: String,
    pub reply_id: u64,
}

/// Fold replies into unique leads. Replies are processed in upstream
/// return order; the first one seen for an address wins outright.
pub fn dedupe_leads(replies: &[Reply], campaign_names: &HashMap<u64, String>) -> Vec<Lead> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut leads = Vec::new();

    for reply in replies {
        let email = reply.from_email_address.to_lowercase();
        if email.is_empty() || !seen.insert(email.clone()) {
            continue;
        }

        let campaign_name = campaign_names
            .get(&reply.campaign_id)
            .cloned()
            .unwrap_or_else(|| "Unknown Campaign".to_string());

        let name = if reply.from_name.trim().is_empty() {
            email.split('@').next().unwrap_or_default().to_string()
        } else {
            reply.from_name.trim().to_string()
        };

        leads.push(Lead {
            id: reply.lead_id.unwrap_or(reply.id),
            name,
            company: company_from_email(&email),
            title: String::new(),
            industry: infer_industry(&campaign_name).to_string(),
            campaign: display_campaign_name(&campaign_name),
            campaign_id: reply.campaign_id,
            subject: clean_reply_subject(&reply.subject),
            reply_preview: preview(&reply.text_body),
            reply_date: reply.date_received.clone(),
            reply_id: reply.id,
            email,
        });
    }
    leads
}

/// Sort most recent first (stable), then drop the oldest entries beyond
/// the authoritative interested total.
pub fn sort_and_cap(mut leads: Vec<Lead>, total_interested: u64) -> Vec<Lead> {
    leads.sort_by_key(|l| std::cmp::Reverse(parse_reply_date(&l.reply_date)));
    leads.truncate(total_interested as usize);
    leads
}

/// Company from the email domain: the segment before the first dot,
/// first letter capitalized.
pub fn company_from_email(email: &str) -> String {
    let domain = email.split('@').nth(1).unwrap_or_default();
    let stem = domain.split('.').next().unwrap_or_default();
    let mut chars = stem.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// Fixed keyword lookup over the campaign display name.
pub fn infer_industry(campaign_name: &str) -> &'static str {
    let lower = campaign_name.to_lowercase();
    INDUSTRY_TABLE
        .iter()
        .find(|(keyword, _)| lower.contains(keyword))
        .map(|(_, industry)| *industry)
        .unwrap_or(DEFAULT_INDUSTRY)
}

/// Campaign names carry targeting suffixes ("Solar: Q3 - west"); the
/// display name is everything before the first `:` or `-`.
pub fn display_campaign_name(name: &str) -> String {
    name.split(':')
        .next()
        .unwrap_or_default()
        .split('-')
        .next()
        .unwrap_or_default()
        .trim()
        .to_string()
}

/// Strip the reply chrome ("Re:", "[External]") off a subject.
pub fn clean_reply_subject(subject: &str) -> String {
    static RE_REPLY: OnceCell<Regex> = OnceCell::new();
    static RE_EXTERNAL: OnceCell<Regex> = OnceCell::new();
    let re_reply = RE_REPLY.get_or_init(|| Regex::new(r"(?i)^re:\s*").unwrap());
    let re_external = RE_EXTERNAL.get_or_init(|| Regex::new(r"(?i)^\[external\]\s*").unwrap());

    let s = re_reply.replace(subject, "");
    let s = re_external.replace(&s, "");
    s.trim().to_string()
}

fn preview(body: &str) -> String {
    body.chars().take(PREVIEW_MAX_CHARS).collect::<String>().trim().to_string()
}

/// Lenient timestamp parsing for sort order only: RFC 3339, then a bare
/// datetime, then epoch 0 so unparseable dates sink to the end.
fn parse_reply_date(raw: &str) -> i64 {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.timestamp();
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return dt.and_utc().timestamp();
    }
    0
}
