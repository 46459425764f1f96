// tests/report_compose.rs
//
// End-to-end composer tests against a canned upstream. Covers the
// orchestration behaviors that unit tests cannot reach: pagination,
// per-campaign fallback on stats failure, lead capping, and the
// required-step failure policy.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};

use outreach_insights::config::AppConfig;
use outreach_insights::report::generate_report;
use outreach_insights::upstream::{RequestError, Upstream};

struct StubUpstream {
    responses: HashMap<String, Value>,
    fail_paths: HashSet<String>,
}

impl StubUpstream {
    fn new() -> Self {
        Self {
            responses: HashMap::new(),
            fail_paths: HashSet::new(),
        }
    }

    fn with(mut self, path: &str, value: Value) -> Self {
        self.responses.insert(path.to_string(), value);
        self
    }

    fn failing(mut self, path: &str) -> Self {
        self.fail_paths.insert(path.to_string());
        self
    }

    fn lookup(&self, path: &str) -> Result<Value, RequestError> {
        if self.fail_paths.contains(path) {
            return Err(RequestError::Status {
                status: reqwest::StatusCode::INTERNAL_SERVER_ERROR,
            });
        }
        self.responses
            .get(path)
            .cloned()
            .ok_or(RequestError::Status {
                status: reqwest::StatusCode::NOT_FOUND,
            })
    }
}

#[async_trait]
impl Upstream for StubUpstream {
    async fn fetch_json(&self, path: &str) -> Result<Value, RequestError> {
        self.lookup(path)
    }
    async fn post_json(&self, path: &str, _body: &Value) -> Result<Value, RequestError> {
        self.lookup(path)
    }
}

fn test_config() -> AppConfig {
    AppConfig {
        api_url: "http://stub".to_string(),
        api_token: String::new(),
        default_workspace_id: 13,
        port: 0,
    }
}

fn campaign(id: u64, name: &str, status: &str, sent: u64, leads: u64, replies: u64, interested: u64) -> Value {
    json!({
        "id": id,
        "name": name,
        "status": status,
        "emails_sent": sent,
        "total_leads_contacted": leads,
        "unique_replies": replies,
        "interested": interested,
        "bounced": 0
    })
}

fn reply(id: u64, from: &str, campaign_id: u64, date: &str) -> Value {
    json!({
        "id": id,
        "subject": "Re: Water from Air",
        "text_body": "Sounds interesting, send me details.",
        "from_name": "",
        "from_email_address": from,
        "interested": true,
        "automated_reply": false,
        "campaign_id": campaign_id,
        "date_received": date
    })
}

/// Two qualifying campaigns, two reply pages, one stats failure.
fn baseline_upstream() -> StubUpstream {
    StubUpstream::new()
        .with(
            "/api/workspaces/switch-workspace",
            json!({ "data": { "id": 13, "name": "Spout" } }),
        )
        .with(
            "/api/users",
            json!({ "data": { "name": "Ops", "workspace": { "id": 13, "name": "Spout" } } }),
        )
        .with(
            "/api/campaigns",
            json!({ "data": [
                campaign(1, "Solar Installers: Q3", "Active", 500, 500, 25, 20),
                campaign(2, "Hotels - coastal", "Completed", 300, 0, 12, 9),
                campaign(3, "Draft thing", "Draft", 100, 100, 5, 5),
            ]}),
        )
        .with(
            "/api/replies?folder=inbox&interested=1&page=1",
            json!({
                "data": [
                    reply(10, "jane@acme.com", 1, "2026-07-01T10:00:00Z"),
                    reply(11, "mailer-daemon@mail.example.com", 1, "2026-07-01T11:00:00Z"),
                    reply(12, "stranger@other.com", 999, "2026-07-01T12:00:00Z"),
                ],
                "meta": { "current_page": 1, "last_page": 2 }
            }),
        )
        .with(
            "/api/replies?folder=inbox&interested=1&page=2",
            json!({
                "data": [reply(13, "bob@seaside-hotel.com", 2, "2026-07-02T09:00:00Z")],
                "meta": { "current_page": 2, "last_page": 2 }
            }),
        )
        .with(
            "/api/campaigns/1/stats",
            json!({ "data": { "sequence_step_stats": [
                { "email_subject": "{Water from Air|Free water}", "sent": 500, "unique_replies": 25, "interested": 20 }
            ]}}),
        )
        .failing("/api/campaigns/2/stats")
}

#[tokio::test]
async fn composes_a_full_report_from_canned_upstream() {
    let report = generate_report(Arc::new(baseline_upstream()), &test_config(), None)
        .await
        .expect("report");

    assert_eq!(report.workspace_name, "Spout");

    // Hero metrics over the two qualifying campaigns only.
    assert_eq!(report.hero_metrics.total_campaigns, 2);
    assert_eq!(report.hero_metrics.messages_sent, 800);
    assert_eq!(report.hero_metrics.leads_contacted, 500);
    assert_eq!(report.hero_metrics.email_positives, 29);
    // Mean of 25/500 = 5% and 12/300 = 4% per-campaign reply rates.
    assert_eq!(report.hero_metrics.avg_response_rate, 4.5);

    // Ranked by interest rate: 4% beats 3% (sent-denominator fallback).
    assert_eq!(report.campaigns.len(), 2);
    assert_eq!(report.campaigns[0].id, 1);
    assert_eq!(report.campaigns[0].rank, 1);
    assert_eq!(report.campaigns[0].interest_rate, 4.0);
    assert_eq!(report.campaigns[1].interest_rate, 3.0);

    // Spintax-cleaned subject for campaign 1; name fallback for the
    // campaign whose stats fetch failed.
    assert_eq!(report.campaigns[0].subject_line, "Water from Air");
    assert_eq!(report.campaigns[1].subject_line, "Hotels - coastal");

    // Bounce sender and out-of-workspace reply are gone; two leads stay.
    let emails: Vec<&str> = report
        .interested_leads
        .iter()
        .map(|l| l.email.as_str())
        .collect();
    assert_eq!(emails, vec!["bob@seaside-hotel.com", "jane@acme.com"]);
    assert_eq!(report.interested_leads[0].company, "Seaside-hotel");

    // Filter facets come from the surviving leads, sorted.
    assert_eq!(report.filters.campaigns, vec!["Hotels", "Solar Installers"]);
    assert_eq!(report.filters.industries, vec!["Hospitality", "Solar"]);

    // Subject aggregation produced one variant per distinct subject.
    assert_eq!(report.copy_analysis.subjects.len(), 2);
    // Too few campaigns with sequence bodies: opener/CTA analysis is off.
    assert!(report.copy_analysis.body.is_empty());
    assert!(report.copy_analysis.cta.is_empty());
    assert_eq!(report.copy_analysis.summary.total_campaigns_analyzed, 2);

    // Insights lead with the top performer and end with the next step.
    assert!(report.insights[0]
        .headline
        .contains("\"Solar Installers\" leads at 4%"));
    assert_eq!(report.insights.last().unwrap().headline, "Scale winning campaigns");
}

#[tokio::test]
async fn leads_are_capped_to_the_authoritative_interested_count() {
    let upstream = StubUpstream::new()
        .with("/api/workspaces/switch-workspace", json!({ "data": {} }))
        .with("/api/users", json!({ "data": { "name": "Ops" } }))
        .with(
            "/api/campaigns",
            json!({ "data": [campaign(1, "Water Suppliers", "Active", 100, 100, 10, 2)] }),
        )
        .with(
            "/api/replies?folder=inbox&interested=1&page=1",
            json!({
                "data": [
                    reply(1, "old@a.com", 1, "2026-06-01T10:00:00Z"),
                    reply(2, "mid@b.com", 1, "2026-06-15T10:00:00Z"),
                    reply(3, "new@c.com", 1, "2026-07-01T10:00:00Z"),
                ],
                "meta": { "current_page": 1, "last_page": 1 }
            }),
        )
        .with(
            "/api/campaigns/1/stats",
            json!({ "data": { "sequence_step_stats": [] } }),
        );

    let report = generate_report(Arc::new(upstream), &test_config(), None)
        .await
        .expect("report");

    // Three deduped leads, authoritative count 2: the oldest one drops.
    assert_eq!(report.interested_leads.len(), 2);
    assert_eq!(report.interested_leads[0].email, "new@c.com");
    assert_eq!(report.interested_leads[1].email, "mid@b.com");

    // Empty sequence_step_stats also falls back to the campaign name.
    assert_eq!(report.campaigns[0].subject_line, "Water Suppliers");
}

#[tokio::test]
async fn later_page_failure_stops_pagination_without_failing_the_report() {
    let upstream = StubUpstream::new()
        .with("/api/workspaces/switch-workspace", json!({ "data": {} }))
        .with("/api/users", json!({ "data": { "name": "Ops" } }))
        .with(
            "/api/campaigns",
            json!({ "data": [campaign(1, "Solar", "Active", 100, 100, 10, 5)] }),
        )
        .with(
            "/api/replies?folder=inbox&interested=1&page=1",
            json!({
                "data": [reply(1, "jane@acme.com", 1, "2026-07-01T10:00:00Z")],
                // Claims three pages, but page 2 will 404.
                "meta": { "current_page": 1, "last_page": 3 }
            }),
        )
        .with(
            "/api/campaigns/1/stats",
            json!({ "data": { "sequence_step_stats": [] } }),
        );

    let report = generate_report(Arc::new(upstream), &test_config(), None)
        .await
        .expect("report survives a mid-pagination failure");
    assert_eq!(report.interested_leads.len(), 1);
}

#[tokio::test]
async fn sequence_bodies_enable_opener_and_cta_analysis() {
    let campaigns = json!({ "data": [
        campaign(1, "Water Suppliers", "Active", 200, 200, 10, 8),
        campaign(2, "Hotels", "Active", 100, 100, 6, 3),
        campaign(3, "Resorts", "Active", 100, 100, 4, 2),
    ]});

    let upstream = StubUpstream::new()
        .with("/api/workspaces/switch-workspace", json!({ "data": {} }))
        .with("/api/users", json!({ "data": { "name": "Ops" } }))
        .with("/api/campaigns", campaigns)
        .with(
            "/api/replies?folder=inbox&interested=1&page=1",
            json!({ "data": [] }),
        )
        .with(
            "/api/campaigns/1/sequence-steps",
            json!({ "data": [{
                "email_subject": "S1",
                "email_body": "<p>Do you buy bottled water? We make water from air. Want a free unit?</p>"
            }]}),
        )
        // Campaign 2's primary endpoint is empty; the chain falls through
        // to /emails with its differently-named fields.
        .with("/api/campaigns/2/sequence-steps", json!({ "data": [] }))
        .with(
            "/api/campaigns/2/emails",
            json!({ "data": [{
                "subject": "S2",
                "body": "Most hotels are struggling with water costs. Happy to show you a demo."
            }]}),
        )
        .with(
            "/api/campaigns/3/sequence-steps",
            json!({ "data": [{
                "html_body": "We helped 40 resorts cut costs. Worth a chat?"
            }]}),
        );

    let report = generate_report(Arc::new(upstream), &test_config(), None)
        .await
        .expect("report");

    // Three campaigns yielded bodies, so opener/CTA analysis is on.
    assert_eq!(report.copy_analysis.body.len(), 3);
    assert_eq!(report.copy_analysis.cta.len(), 3);

    let free_offer = report
        .copy_analysis
        .cta
        .iter()
        .find(|v| v.text == "Want a free unit?")
        .expect("free-offer CTA variant");
    assert!(free_offer.tags.contains(&"free-offer".to_string()));
    assert!(free_offer.tags.contains(&"low".to_string()));

    // The highest-volume campaign's hook ranks first (8/200 = 4% beats 3% and 2%).
    assert_eq!(report.copy_analysis.body[0].text, "Do you buy bottled water?");
    assert!(report.copy_analysis.body[0]
        .tags
        .contains(&"question".to_string()));
}

#[tokio::test]
async fn missing_campaign_list_fails_the_whole_report() {
    let upstream = StubUpstream::new()
        .with("/api/workspaces/switch-workspace", json!({ "data": {} }))
        .with("/api/users", json!({ "data": { "name": "Ops" } }))
        .failing("/api/campaigns");

    let err = generate_report(Arc::new(upstream), &test_config(), None).await;
    assert!(err.is_err());
}

#[tokio::test]
async fn best_effort_steps_never_fail_the_report() {
    // Workspace switch and user lookup both down; report still builds
    // with the default workspace name.
    let upstream = StubUpstream::new()
        .failing("/api/workspaces/switch-workspace")
        .failing("/api/users")
        .with("/api/campaigns", json!({ "data": [] }))
        .with(
            "/api/replies?folder=inbox&interested=1&page=1",
            json!({ "data": [] }),
        );

    let report = generate_report(Arc::new(upstream), &test_config(), None)
        .await
        .expect("report");
    assert_eq!(report.workspace_name, "EmailBison");
    assert_eq!(report.hero_metrics.total_campaigns, 0);
    assert_eq!(report.hero_metrics.avg_response_rate, 0.0);
    assert!(report.campaigns.is_empty());
    assert!(report.interested_leads.is_empty());
    // The always-on insights still fire on an empty workspace.
    assert!(!report.insights.is_empty());
}
