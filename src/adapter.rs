//! Upstream analysis documents into canonical member metrics.
//!
//! Member records from the analysis backend carry the same metric under
//! several paths (`key_metrics.*`, top-level fields, precomputed `factors`).
//! All fallback chains are resolved here, once, so scoring code only ever
//! sees [`RawMemberMetrics`].

use serde::de::Error as _;
use serde::{Deserialize, Deserializer};

use crate::error::{Error, Result};
use crate::models::{
    DailyTrendPoint, GithubActivity, PrecomputedFactors, RawMemberMetrics, RiskLevel,
    SlackActivity,
};
use crate::normalize::incidents_per_week;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnalysisResult {
    #[serde(default)]
    pub analysis_data: Option<AnalysisData>,
    /// Analysis window in days.
    #[serde(default)]
    pub time_range: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnalysisData {
    #[serde(default)]
    pub team_analysis: Option<TeamAnalysis>,
    #[serde(default)]
    pub team_health: Option<TeamHealth>,
    #[serde(default)]
    pub metadata: Option<AnalysisMetadata>,
}

/// Either a bare member array or `{"members": [...]}`.
#[derive(Debug, Clone)]
pub enum TeamAnalysis {
    Members(Vec<MemberRecord>),
    Wrapped { members: Vec<MemberRecord> },
}

impl<'de> Deserialize<'de> for TeamAnalysis {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        // Pick the shape before parsing members so a bad member field
        // surfaces its own error.
        match serde_json::Value::deserialize(deserializer)? {
            serde_json::Value::Array(items) => {
                serde_json::from_value(serde_json::Value::Array(items))
                    .map(TeamAnalysis::Members)
                    .map_err(D::Error::custom)
            }
            serde_json::Value::Object(mut fields) => {
                let members = fields.remove("members").unwrap_or(serde_json::Value::Null);
                if members.is_null() {
                    return Err(D::Error::missing_field("members"));
                }
                serde_json::from_value(members)
                    .map(|members| TeamAnalysis::Wrapped { members })
                    .map_err(D::Error::custom)
            }
            other => Err(D::Error::custom(format!(
                "team_analysis must be an array or an object with members, got {other}"
            ))),
        }
    }
}

impl TeamAnalysis {
    pub fn members(&self) -> &[MemberRecord] {
        match self {
            TeamAnalysis::Members(members) | TeamAnalysis::Wrapped { members } => members,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TeamHealth {
    #[serde(default)]
    pub overall_score: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnalysisMetadata {
    #[serde(default)]
    pub days_analyzed: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct KeyMetrics {
    #[serde(default)]
    pub incidents_per_week: Option<f64>,
    #[serde(default)]
    pub severity_weighted_per_week: Option<f64>,
    #[serde(default)]
    pub after_hours_percentage: Option<f64>,
    #[serde(default)]
    pub weekend_percentage: Option<f64>,
    #[serde(default)]
    pub avg_response_time_minutes: Option<f64>,
}

/// One member as the backend sends it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MemberRecord {
    #[serde(default)]
    pub user_name: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub user_email: Option<String>,
    #[serde(default, deserialize_with = "crate::models::optional_lenient_count")]
    pub incident_count: Option<u32>,
    #[serde(default)]
    pub burnout_score: Option<f64>,
    #[serde(default)]
    pub risk_level: Option<String>,
    #[serde(default)]
    pub factors: Option<PrecomputedFactors>,
    #[serde(default)]
    pub key_metrics: Option<KeyMetrics>,
    #[serde(default)]
    pub after_hours_percentage: Option<f64>,
    #[serde(default)]
    pub weekend_percentage: Option<f64>,
    #[serde(default)]
    pub avg_response_time_minutes: Option<f64>,
    #[serde(default)]
    pub github_activity: Option<GithubActivity>,
    #[serde(default)]
    pub slack_activity: Option<SlackActivity>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct HistoricalTrends {
    #[serde(default)]
    pub daily_trends: Vec<DailyTrendPoint>,
}

impl AnalysisResult {
    /// Window length: the request's range, then the backend's metadata, then
    /// the caller's default.
    pub fn time_range_days(&self, default_days: f64) -> f64 {
        self.time_range
            .or_else(|| {
                self.analysis_data
                    .as_ref()
                    .and_then(|data| data.metadata.as_ref())
                    .and_then(|meta| meta.days_analyzed)
            })
            .filter(|days| days.is_finite() && *days > 0.0)
            .unwrap_or(default_days)
    }

    pub fn team_health_overall(&self) -> Option<f64> {
        self.analysis_data
            .as_ref()
            .and_then(|data| data.team_health.as_ref())
            .and_then(|health| health.overall_score)
    }

    pub fn member_records(&self) -> Result<&[MemberRecord]> {
        self.analysis_data
            .as_ref()
            .and_then(|data| data.team_analysis.as_ref())
            .map(TeamAnalysis::members)
            .ok_or(Error::MissingTeamAnalysis)
    }

    pub fn members(&self, default_days: f64) -> Result<Vec<RawMemberMetrics>> {
        let days = self.time_range_days(default_days);
        let records = self.member_records()?;
        tracing::debug!(members = records.len(), days, "resolving member records");
        Ok(records.iter().map(|record| to_metrics(record, days)).collect())
    }
}

pub fn to_metrics(record: &MemberRecord, time_range_days: f64) -> RawMemberMetrics {
    let key = record.key_metrics.clone().unwrap_or_default();
    let incident_count = record.incident_count.unwrap_or(0);

    RawMemberMetrics {
        name: record
            .user_name
            .clone()
            .or_else(|| record.name.clone())
            .or_else(|| record.user_email.clone())
            .unwrap_or_else(|| "Unknown member".to_string()),
        email: record.user_email.clone().unwrap_or_default(),
        incident_count,
        incidents_per_week: key
            .incidents_per_week
            .unwrap_or_else(|| incidents_per_week(incident_count, time_range_days)),
        severity_weighted_per_week: key.severity_weighted_per_week,
        after_hours_percentage: key.after_hours_percentage.or(record.after_hours_percentage),
        weekend_percentage: key.weekend_percentage.or(record.weekend_percentage),
        avg_response_time_minutes: key
            .avg_response_time_minutes
            .or(record.avg_response_time_minutes),
        github_activity: record.github_activity.clone(),
        slack_activity: record.slack_activity.clone(),
        burnout_score: record.burnout_score,
        risk_level: record.risk_level.as_deref().and_then(RiskLevel::parse),
        factors: record.factors.clone().unwrap_or_default(),
    }
}
