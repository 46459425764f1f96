// src/report.rs
//! Report composer: orchestrates the upstream client, interest filter,
//! lead deduplicator, copy pipeline and insight synthesizer into one
//! consolidated report. Only the campaign list and the first reply page
//! are required; every other sub-step owns its own fallback.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::Arc;

use chrono::{Duration, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::config::{
    AppConfig, MAX_REPLY_PAGES, MAX_SEQUENCE_CAMPAIGNS, MAX_STATS_CAMPAIGNS,
    MIN_CAMPAIGNS_FOR_BODY_ANALYSIS,
};
use crate::copy::aggregate::{aggregate, snippet_key, subject_key, CopyOccurrence, CopyVariant};
use crate::copy::cta::classify_cta;
use crate::copy::normalize::{clean_subject, extract_cta, extract_opening_hook};
use crate::copy::opener::classify_opener;
use crate::copy::subject::classify_subject;
use crate::insights::{synthesize, Insight};
use crate::interest::filter_real_interest;
use crate::leads::{dedupe_leads, display_campaign_name, sort_and_cap, Lead};
use crate::models::{Campaign, CampaignStats, RawSequenceStep, RepliesPage, SequenceStep, User};
use crate::upstream::{RequestError, Upstream};

/// Per-campaign stats are requested from this date onward.
const STATS_START_DATE: &str = "2024-01-01";

/// The default workspace display name when the user lookup fails.
const DEFAULT_WORKSPACE_NAME: &str = "EmailBison";

/// How many subject variants the legacy top/bottom views show.
const SUMMARY_PERFORMERS: usize = 5;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HeroMetrics {
    pub total_campaigns: usize,
    pub leads_contacted: u64,
    pub messages_sent: u64,
    pub avg_response_rate: f64,
    pub email_positives: u64,
}

/// A campaign projected into report form; rank 1 is the highest interest
/// rate, ties keeping input order.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignPerformance {
    pub rank: usize,
    pub id: u64,
    pub name: String,
    pub subject_line: String,
    pub reply_rate: f64,
    pub interest_rate: f64,
    pub leads_contacted: u64,
    pub emails_sent: u64,
    pub unique_replies: u64,
    pub interested: u64,
    pub bounced: u64,
    pub bounce_rate: f64,
}

/// Legacy top/bottom view, derived from the aggregated subject ranking
/// instead of being computed separately.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CopySummary {
    pub top_performers: Vec<CopyVariant>,
    pub bottom_performers: Vec<CopyVariant>,
    pub top_avg_interest: f64,
    pub bottom_avg_interest: f64,
    pub total_campaigns_analyzed: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CopyAnalysis {
    pub subjects: Vec<CopyVariant>,
    pub body: Vec<CopyVariant>,
    pub cta: Vec<CopyVariant>,
    pub summary: CopySummary,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportFilters {
    pub campaigns: Vec<String>,
    pub industries: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub workspace_name: String,
    pub cycle_number: u32,
    pub start_date: String,
    pub end_date: String,
    pub hero_metrics: HeroMetrics,
    pub campaigns: Vec<CampaignPerformance>,
    pub copy_analysis: CopyAnalysis,
    pub interested_leads: Vec<Lead>,
    pub filters: ReportFilters,
    pub insights: Vec<Insight>,
}

/// Generate a full report for the given workspace (or the configured
/// default). Errors only on the required steps; everything else degrades.
pub async fn generate_report(
    upstream: Arc<dyn Upstream>,
    config: &AppConfig,
    workspace_id: Option<u64>,
) -> Result<Report, RequestError> {
    // (a) Switch workspace context, best-effort.
    let target = workspace_id.unwrap_or(config.default_workspace_id);
    if let Err(e) = upstream
        .post_json(
            "/api/workspaces/switch-workspace",
            &json!({ "team_id": target }),
        )
        .await
    {
        warn!(error = %e, workspace = target, "workspace switch failed, continuing");
    }

    // (b) Workspace display name, best-effort.
    let workspace_name = match upstream.fetch_json("/api/users").await {
        Ok(v) => parse_object::<User>(&v)
            .and_then(|u| {
                u.workspace
                    .map(|w| w.name)
                    .or(u.team.map(|t| t.name))
                    .filter(|n| !n.is_empty())
            })
            .unwrap_or_else(|| DEFAULT_WORKSPACE_NAME.to_string()),
        Err(e) => {
            warn!(error = %e, "user lookup failed, using default workspace name");
            DEFAULT_WORKSPACE_NAME.to_string()
        }
    };

    // (c) Campaign list: required.
    let all_campaigns: Vec<Campaign> = parse_list(&upstream.fetch_json("/api/campaigns").await?);
    let qualifying: Vec<Campaign> = all_campaigns
        .iter()
        .filter(|c| c.qualifies_for_report())
        .cloned()
        .collect();

    // (d) Page through interested inbox replies.
    let all_replies = fetch_interested_replies(upstream.as_ref()).await?;
    let total_flagged = all_replies.len();

    // (e) Keep only genuine interest from this workspace's campaigns.
    let qualifying_ids: HashSet<u64> = qualifying.iter().map(|c| c.id).collect();
    let scoped: Vec<_> = all_replies
        .into_iter()
        .filter(|r| qualifying_ids.contains(&r.campaign_id))
        .collect();
    let real_replies = filter_real_interest(scoped);

    // (f) Per-campaign stats for subject lines, concurrent and bounded.
    let details = fetch_campaign_subjects(upstream.clone(), &qualifying).await;

    // (g) Copy analysis over subjects, and over bodies when enough
    // campaigns expose sequence content.
    let subject_occurrences: Vec<CopyOccurrence> = details
        .iter()
        .map(|(c, subject)| CopyOccurrence {
            text: subject.clone(),
            campaign: display_campaign_name(&c.name),
            sent: c.emails_sent,
            leads_contacted: c.total_leads_contacted,
            interested: c.interested,
            replies: c.unique_replies,
        })
        .collect();
    let subjects = aggregate(&subject_occurrences, subject_key, |text| {
        classify_subject(text)
            .into_iter()
            .map(|t| t.as_str().to_string())
            .collect()
    });

    let (body, cta) = analyze_sequence_copy(upstream.as_ref(), &qualifying).await;

    // (h) + (i): metrics, ranking, leads, insights, assembly.
    let total_sent: u64 = qualifying.iter().map(|c| c.emails_sent).sum();
    let total_leads_contacted: u64 = qualifying.iter().map(|c| c.total_leads_contacted).sum();
    let total_interested: u64 = qualifying.iter().map(|c| c.interested).sum();
    let avg_response_rate = round1(mean(
        &qualifying
            .iter()
            .map(|c| campaign_rate(c.unique_replies, c.total_leads_contacted, c.emails_sent))
            .collect::<Vec<_>>(),
    ));

    let performances = rank_performances(&details);

    let campaign_names: HashMap<u64, String> = all_campaigns
        .iter()
        .map(|c| (c.id, c.name.clone()))
        .collect();
    let leads = sort_and_cap(
        dedupe_leads(&real_replies, &campaign_names),
        total_interested,
    );

    let filter_campaigns: BTreeSet<String> = leads.iter().map(|l| l.campaign.clone()).collect();
    let filter_industries: BTreeSet<String> = leads.iter().map(|l| l.industry.clone()).collect();

    let insights = synthesize(
        &performances,
        real_replies.len(),
        total_flagged,
        total_sent,
        total_interested,
    );

    let summary = build_copy_summary(&subjects, details.len());
    let now = Utc::now();

    Ok(Report {
        workspace_name,
        cycle_number: 1,
        start_date: (now - Duration::days(30)).format("%B %-d, %Y").to_string(),
        end_date: now.format("%B %-d, %Y").to_string(),
        hero_metrics: HeroMetrics {
            total_campaigns: qualifying.len(),
            leads_contacted: total_leads_contacted,
            messages_sent: total_sent,
            avg_response_rate,
            email_positives: total_interested,
        },
        campaigns: performances,
        copy_analysis: CopyAnalysis {
            subjects,
            body,
            cta,
            summary,
        },
        interested_leads: leads,
        filters: ReportFilters {
            campaigns: filter_campaigns.into_iter().collect(),
            industries: filter_industries.into_iter().collect(),
        },
        insights,
    })
}

/// Sequential `meta.last_page`-driven pagination with a hard cap. The
/// first page is required; later pages stop the loop on failure.
async fn fetch_interested_replies(
    upstream: &dyn Upstream,
) -> Result<Vec<crate::models::Reply>, RequestError> {
    let mut replies = Vec::new();
    let mut page = 1u64;

    while page <= MAX_REPLY_PAGES {
        let path = format!("/api/replies?folder=inbox&interested=1&page={page}");
        let value = if page == 1 {
            upstream.fetch_json(&path).await?
        } else {
            match upstream.fetch_json(&path).await {
                Ok(v) => v,
                Err(e) => {
                    warn!(error = %e, page, "reply pagination stopped early");
                    break;
                }
            }
        };

        let parsed: RepliesPage = serde_json::from_value(value).unwrap_or(RepliesPage {
            data: Vec::new(),
            meta: None,
        });
        replies.extend(parsed.data);

        match parsed.meta {
            Some(meta) if page < meta.last_page => page += 1,
            _ => break,
        }
    }
    Ok(replies)
}

/// Fetch per-campaign stats concurrently (bounded), joining in input
/// order. A failed fetch substitutes the campaign's own name for its
/// subject line without affecting siblings.
async fn fetch_campaign_subjects(
    upstream: Arc<dyn Upstream>,
    qualifying: &[Campaign],
) -> Vec<(Campaign, String)> {
    let selected: Vec<Campaign> = qualifying
        .iter()
        .take(MAX_STATS_CAMPAIGNS)
        .cloned()
        .collect();
    let body = json!({
        "start_date": STATS_START_DATE,
        "end_date": Utc::now().format("%Y-%m-%d").to_string(),
    });

    let mut handles = Vec::with_capacity(selected.len());
    for campaign in &selected {
        let upstream = upstream.clone();
        let path = format!("/api/campaigns/{}/stats", campaign.id);
        let body = body.clone();
        handles.push(tokio::spawn(async move {
            upstream.post_json(&path, &body).await
        }));
    }

    let mut details = Vec::with_capacity(selected.len());
    for (campaign, handle) in selected.into_iter().zip(handles) {
        let subject = match handle.await {
            Ok(Ok(value)) => parse_object::<CampaignStats>(&value)
                .and_then(|stats| {
                    stats
                        .sequence_step_stats
                        .first()
                        .map(|s| clean_subject(&s.email_subject))
                })
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| campaign.name.clone()),
            _ => {
                warn!(campaign = campaign.id, "stats fetch failed, falling back to campaign name");
                campaign.name.clone()
            }
        };
        details.push((campaign, subject));
    }
    details
}

/// Sequence bodies are best-effort and fetched sequentially; opener/CTA
/// aggregation only runs when enough campaigns yielded real bodies.
async fn analyze_sequence_copy(
    upstream: &dyn Upstream,
    qualifying: &[Campaign],
) -> (Vec<CopyVariant>, Vec<CopyVariant>) {
    let mut hooks = Vec::new();
    let mut ctas = Vec::new();
    let mut campaigns_with_bodies = 0usize;

    for campaign in qualifying.iter().take(MAX_SEQUENCE_CAMPAIGNS) {
        let steps = fetch_sequence_steps(upstream, campaign.id).await;
        let with_bodies: Vec<&SequenceStep> =
            steps.iter().filter(|s| !s.body.trim().is_empty()).collect();
        if with_bodies.is_empty() {
            continue;
        }
        campaigns_with_bodies += 1;
        for step in with_bodies {
            let occurrence = |text: String| CopyOccurrence {
                text,
                campaign: display_campaign_name(&campaign.name),
                sent: campaign.emails_sent,
                leads_contacted: campaign.total_leads_contacted,
                interested: campaign.interested,
                replies: campaign.unique_replies,
            };
            hooks.push(occurrence(extract_opening_hook(&step.body)));
            ctas.push(occurrence(extract_cta(&step.body)));
        }
    }

    if campaigns_with_bodies < MIN_CAMPAIGNS_FOR_BODY_ANALYSIS {
        debug!(
            campaigns_with_bodies,
            "not enough sequence bodies for opener/CTA analysis"
        );
        return (Vec::new(), Vec::new());
    }

    let body = aggregate(&hooks, snippet_key, |text| {
        classify_opener(text)
            .into_iter()
            .map(|t| t.as_str().to_string())
            .collect()
    });
    let cta = aggregate(&ctas, snippet_key, |text| {
        let style = classify_cta(text);
        vec![style.kind.as_str().to_string(), style.commitment.as_str().to_string()]
    });
    (body, cta)
}

/// Ordered fallback chain over the sequence endpoints; the first one that
/// yields non-empty data wins, all through the same alias mapper.
async fn fetch_sequence_steps(upstream: &dyn Upstream, campaign_id: u64) -> Vec<SequenceStep> {
    const ENDPOINTS: [&str; 3] = ["sequence-steps", "emails", "steps"];

    for endpoint in ENDPOINTS {
        let path = format!("/api/campaigns/{campaign_id}/{endpoint}");
        match upstream.fetch_json(&path).await {
            Ok(value) => {
                let steps: Vec<SequenceStep> = parse_list::<RawSequenceStep>(&value)
                    .into_iter()
                    .map(RawSequenceStep::normalize)
                    .collect();
                if !steps.is_empty() {
                    return steps;
                }
            }
            Err(e) => {
                debug!(error = %e, campaign = campaign_id, endpoint, "sequence endpoint failed");
            }
        }
    }
    Vec::new()
}

/// Rate with the standard denominator fallback: leads contacted when
/// positive, emails sent otherwise, 0 when neither.
pub fn campaign_rate(numerator: u64, leads_contacted: u64, emails_sent: u64) -> f64 {
    let denominator = if leads_contacted > 0 {
        leads_contacted
    } else {
        emails_sent
    };
    if denominator == 0 {
        return 0.0;
    }
    round2(numerator as f64 / denominator as f64 * 100.0)
}

/// Project campaigns into ranked report rows: descending interest rate,
/// stable for ties, ranks 1..N.
pub fn rank_performances(details: &[(Campaign, String)]) -> Vec<CampaignPerformance> {
    let mut rows: Vec<CampaignPerformance> = details
        .iter()
        .map(|(c, subject)| CampaignPerformance {
            rank: 0,
            id: c.id,
            name: c.name.clone(),
            subject_line: subject.clone(),
            reply_rate: campaign_rate(c.unique_replies, c.total_leads_contacted, c.emails_sent),
            interest_rate: campaign_rate(c.interested, c.total_leads_contacted, c.emails_sent),
            leads_contacted: c.total_leads_contacted,
            emails_sent: c.emails_sent,
            unique_replies: c.unique_replies,
            interested: c.interested,
            bounced: c.bounced,
            bounce_rate: if c.emails_sent > 0 {
                round2(c.bounced as f64 / c.emails_sent as f64 * 100.0)
            } else {
                0.0
            },
        })
        .collect();

    rows.sort_by(|a, b| {
        b.interest_rate
            .partial_cmp(&a.interest_rate)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    for (i, row) in rows.iter_mut().enumerate() {
        row.rank = i + 1;
    }
    rows
}

/// First-N / last-N views over the subject ranking, so the legacy fields
/// can never diverge from the aggregation they summarize.
pub fn build_copy_summary(subjects: &[CopyVariant], campaigns_analyzed: usize) -> CopySummary {
    let top: Vec<CopyVariant> = subjects.iter().take(SUMMARY_PERFORMERS).cloned().collect();
    let bottom: Vec<CopyVariant> = subjects
        .iter()
        .rev()
        .take(SUMMARY_PERFORMERS)
        .cloned()
        .collect();
    let top_avg = round2(mean(
        &top.iter().map(|v| v.weighted_interest_rate).collect::<Vec<_>>(),
    ));
    let bottom_avg = round2(mean(
        &bottom
            .iter()
            .map(|v| v.weighted_interest_rate)
            .collect::<Vec<_>>(),
    ));
    CopySummary {
        top_performers: top,
        bottom_performers: bottom,
        top_avg_interest: top_avg,
        bottom_avg_interest: bottom_avg,
        total_campaigns_analyzed: campaigns_analyzed,
    }
}

fn parse_object<T: DeserializeOwned>(value: &Value) -> Option<T> {
    value
        .get("data")
        .and_then(|data| serde_json::from_value(data.clone()).ok())
}

fn parse_list<T: DeserializeOwned>(value: &Value) -> Vec<T> {
    value
        .get("data")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|item| serde_json::from_value(item.clone()).ok())
                .collect()
        })
        .unwrap_or_default()
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

fn round1(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}
