// src/models.rs
//! Upstream (EmailBison) payload types. Counters default to 0 and unknown
//! enum values map to a catch-all variant: a malformed field must degrade
//! the report, never abort it.

use serde::{Deserialize, Serialize};

/// Campaign lifecycle status as reported by upstream. Unrecognized
/// status strings map to `Unknown` instead of failing the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String")]
pub enum CampaignStatus {
    Draft,
    Launching,
    Active,
    Paused,
    Stopped,
    Completed,
    Failed,
    Queued,
    Archived,
    Unknown,
}

impl From<String> for CampaignStatus {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "Draft" => Self::Draft,
            "Launching" => Self::Launching,
            "Active" => Self::Active,
            "Paused" => Self::Paused,
            "Stopped" => Self::Stopped,
            "Completed" => Self::Completed,
            "Failed" => Self::Failed,
            "Queued" => Self::Queued,
            "Archived" => Self::Archived,
            _ => Self::Unknown,
        }
    }
}

impl CampaignStatus {
    /// Statuses whose campaigns participate in reporting.
    pub fn is_reportable(self) -> bool {
        matches!(self, Self::Active | Self::Completed | Self::Launching)
    }
}

/// One outreach sequence with its lifetime counters. Counters are
/// monotonically non-decreasing snapshots; missing fields read as 0.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Campaign {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default = "default_status")]
    pub status: CampaignStatus,
    #[serde(default)]
    pub emails_sent: u64,
    #[serde(default)]
    pub total_leads_contacted: u64,
    #[serde(default)]
    pub opened: u64,
    #[serde(default)]
    pub unique_opens: u64,
    #[serde(default)]
    pub replied: u64,
    #[serde(default)]
    pub unique_replies: u64,
    #[serde(default)]
    pub bounced: u64,
    #[serde(default)]
    pub unsubscribed: u64,
    #[serde(default)]
    pub interested: u64,
}

fn default_status() -> CampaignStatus {
    CampaignStatus::Unknown
}

impl Campaign {
    /// Only campaigns that actually ran and are still relevant are reported.
    pub fn qualifies_for_report(&self) -> bool {
        self.emails_sent > 0 && self.status.is_reportable()
    }
}

/// One inbound message tied to a campaign. Read-only snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reply {
    pub id: u64,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub text_body: String,
    #[serde(default)]
    pub html_body: String,
    #[serde(default)]
    pub from_name: String,
    #[serde(default)]
    pub from_email_address: String,
    #[serde(default)]
    pub interested: bool,
    #[serde(default)]
    pub automated_reply: bool,
    #[serde(default)]
    pub campaign_id: u64,
    #[serde(default)]
    pub lead_id: Option<u64>,
    #[serde(default)]
    pub date_received: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageMeta {
    #[serde(default)]
    pub current_page: u64,
    #[serde(default)]
    pub last_page: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RepliesPage {
    #[serde(default)]
    pub data: Vec<Reply>,
    #[serde(default)]
    pub meta: Option<PageMeta>,
}

/// Per-sequence-step counters from the campaign stats endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SequenceStepStats {
    #[serde(default)]
    pub email_subject: String,
    #[serde(default)]
    pub sent: u64,
    #[serde(default)]
    pub leads_contacted: u64,
    #[serde(default)]
    pub unique_replies: u64,
    #[serde(default)]
    pub interested: u64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CampaignStats {
    #[serde(default)]
    pub sequence_step_stats: Vec<SequenceStepStats>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Team {
    #[serde(default)]
    pub id: u64,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub workspace: Option<Team>,
    #[serde(default)]
    pub team: Option<Team>,
}

/// A sequence step after alias normalization: just the copy we analyze.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceStep {
    pub subject: String,
    pub body: String,
}

/// Raw sequence-step shape. The upstream endpoints disagree on field names,
/// so every known alias is optional here and resolved in `normalize`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawSequenceStep {
    #[serde(default)]
    pub email_subject: Option<String>,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub email_body: Option<String>,
    #[serde(default)]
    pub email_body_preview: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub html_body: Option<String>,
    #[serde(default)]
    pub text_body: Option<String>,
}

impl RawSequenceStep {
    /// Resolve field aliases in priority order.
    pub fn normalize(self) -> SequenceStep {
        let subject = self.email_subject.or(self.subject).unwrap_or_default();
        let body = self
            .email_body
            .or(self.email_body_preview)
            .or(self.body)
            .or(self.html_body)
            .or(self.text_body)
            .unwrap_or_default();
        SequenceStep { subject, body }
    }
}
