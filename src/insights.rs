// src/insights.rs
//! Insight synthesizer: a fixed-order rule list that turns the aggregated
//! numbers into short headline/detail pairs. Every rule appends at most
//! one record; insertion order is display order.

use serde::Serialize;

use crate::report::CampaignPerformance;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightKind {
    Success,
    Warning,
    Failure,
    Info,
    NextStep,
}

#[derive(Debug, Clone, Serialize)]
pub struct Insight {
    #[serde(rename = "type")]
    pub kind: InsightKind,
    pub emoji: String,
    pub headline: String,
    pub detail: String,
}

impl Insight {
    fn new(kind: InsightKind, emoji: &str, headline: String, detail: String) -> Self {
        Self {
            kind,
            emoji: emoji.to_string(),
            headline,
            detail,
        }
    }
}

/// Campaigns replying well but converting poorly hint at a messaging
/// problem rather than a targeting problem.
const GAP_REPLY_RATE: f64 = 3.0;
const GAP_INTEREST_RATE: f64 = 2.0;
const LOW_INTEREST_RATE: f64 = 1.0;
const MEAN_INTEREST_PIVOT: f64 = 1.5;

pub fn synthesize(
    performances: &[CampaignPerformance],
    verified_interested: usize,
    total_flagged: usize,
    total_sent: u64,
    total_interested: u64,
) -> Vec<Insight> {
    let mut insights = Vec::new();

    // Top performer, when it actually converted anyone.
    if let Some(top) = performances.first() {
        if top.interest_rate > 0.0 {
            let short_name = top.name.split(':').next().unwrap_or_default().trim();
            insights.push(Insight::new(
                InsightKind::Success,
                "🏆",
                format!("\"{}\" leads at {}%", short_name, top.interest_rate),
                format!("Subject: \"{}\"", top.subject_line),
            ));
        }
    }

    // Verified vs. flagged interest.
    insights.push(Insight::new(
        InsightKind::Success,
        "📧",
        format!("{verified_interested} verified interested replies"),
        format!("Out of {total_flagged} total flagged as interested (filtered bounces/OOO)"),
    ));

    // Reply-to-interest gap.
    let gap_count = performances
        .iter()
        .filter(|c| c.reply_rate > GAP_REPLY_RATE && c.interest_rate < GAP_INTEREST_RATE)
        .count();
    if gap_count > 0 {
        insights.push(Insight::new(
            InsightKind::Warning,
            "⚠️",
            format!("{gap_count} campaigns with reply-interest gap"),
            "High replies but low interest - messaging may need refinement".to_string(),
        ));
    }

    // Too many campaigns below 1% interest.
    let low_count = performances
        .iter()
        .filter(|c| c.interest_rate < LOW_INTEREST_RATE)
        .count();
    if low_count > 2 {
        insights.push(Insight::new(
            InsightKind::Warning,
            "⚠️",
            format!("{low_count} campaigns below 1% interest"),
            "Consider A/B testing subject lines and value propositions".to_string(),
        ));
    }

    // Volume summary.
    let overall_pct = if total_sent > 0 {
        total_interested as f64 / total_sent as f64 * 100.0
    } else {
        0.0
    };
    insights.push(Insight::new(
        InsightKind::Info,
        "📊",
        format!(
            "{} emails → {} interested",
            format_thousands(total_sent),
            total_interested
        ),
        format!("{overall_pct:.2}% overall interest rate"),
    ));

    // Recommended next step.
    let mean_interest = if performances.is_empty() {
        0.0
    } else {
        performances.iter().map(|c| c.interest_rate).sum::<f64>() / performances.len() as f64
    };
    let (headline, detail) = if mean_interest < MEAN_INTEREST_PIVOT {
        (
            "Test pain-first messaging",
            "Low overall interest - try more specific, problem-focused subjects",
        )
    } else {
        (
            "Scale winning campaigns",
            "Strong interest rates - increase volume on top performers",
        )
    };
    insights.push(Insight::new(
        InsightKind::NextStep,
        "🚀",
        headline.to_string(),
        detail.to_string(),
    ));

    insights
}

fn format_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
