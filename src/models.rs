use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

/// Treats an explicit `null` the same as a missing field.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A non-negative count sent as an integer, a float such as `4.0`, or `null`.
pub(crate) fn lenient_count<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(optional_lenient_count(deserializer)?.unwrap_or(0))
}

pub(crate) fn optional_lenient_count<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?.map(count_from_number))
}

fn count_from_number(value: f64) -> u32 {
    if value.is_finite() && value > 0.0 {
        value.round().min(u32::MAX as f64) as u32
    } else {
        0
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GithubIndicators {
    #[serde(default, deserialize_with = "null_as_default")]
    pub excessive_commits: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub late_night_activity: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub weekend_work: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub large_prs: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GithubActivity {
    #[serde(default, deserialize_with = "lenient_count")]
    pub commits: u32,
    #[serde(default, deserialize_with = "lenient_count")]
    pub pull_requests: u32,
    #[serde(default, deserialize_with = "lenient_count")]
    pub reviews: u32,
    #[serde(default, deserialize_with = "lenient_count")]
    pub after_hours_commits: u32,
    #[serde(default, deserialize_with = "lenient_count")]
    pub weekend_commits: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub avg_pr_size: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub burnout_indicators: GithubIndicators,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SlackIndicators {
    #[serde(default, deserialize_with = "null_as_default")]
    pub excessive_messaging: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub poor_sentiment: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub late_responses: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub after_hours_activity: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SlackActivity {
    #[serde(default, deserialize_with = "lenient_count")]
    pub messages_sent: u32,
    #[serde(default, deserialize_with = "lenient_count")]
    pub channels_active: u32,
    #[serde(default, deserialize_with = "lenient_count")]
    pub after_hours_messages: u32,
    #[serde(default, deserialize_with = "lenient_count")]
    pub weekend_messages: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub avg_response_time_minutes: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub sentiment_score: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub burnout_indicators: SlackIndicators,
}

/// Factor values computed upstream, used only when the raw metric behind a
/// factor is missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PrecomputedFactors {
    pub after_hours: Option<f64>,
    pub weekend_work: Option<f64>,
    pub incident_load: Option<f64>,
    pub response_time: Option<f64>,
    pub workload: Option<f64>,
}

/// Canonical per-member metrics for one analysis run.
///
/// Optional fields stay `None` when the upstream record lacks them, so display
/// code can tell "No data" apart from a measured zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RawMemberMetrics {
    pub name: String,
    pub email: String,
    pub incident_count: u32,
    pub incidents_per_week: f64,
    pub severity_weighted_per_week: Option<f64>,
    pub after_hours_percentage: Option<f64>,
    pub weekend_percentage: Option<f64>,
    pub avg_response_time_minutes: Option<f64>,
    pub github_activity: Option<GithubActivity>,
    pub slack_activity: Option<SlackActivity>,
    pub burnout_score: Option<f64>,
    pub risk_level: Option<RiskLevel>,
    pub factors: PrecomputedFactors,
}

impl RawMemberMetrics {
    pub fn has_incidents(&self) -> bool {
        self.incident_count > 0
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct NormalizedFactors {
    pub after_hours: f64,
    pub weekend_work: f64,
    pub incident_load: f64,
    pub response_time: f64,
    pub workload: f64,
}

impl NormalizedFactors {
    pub fn get(&self, kind: FactorKind) -> f64 {
        match kind {
            FactorKind::AfterHours => self.after_hours,
            FactorKind::WeekendWork => self.weekend_work,
            FactorKind::IncidentLoad => self.incident_load,
            FactorKind::ResponseTime => self.response_time,
            FactorKind::Workload => self.workload,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FactorKind {
    AfterHours,
    WeekendWork,
    IncidentLoad,
    ResponseTime,
    Workload,
}

impl FactorKind {
    pub const ALL: [FactorKind; 5] = [
        FactorKind::AfterHours,
        FactorKind::WeekendWork,
        FactorKind::IncidentLoad,
        FactorKind::ResponseTime,
        FactorKind::Workload,
    ];

    pub fn label(self) -> &'static str {
        match self {
            FactorKind::AfterHours => "After Hours",
            FactorKind::WeekendWork => "Weekend Work",
            FactorKind::IncidentLoad => "Incident Load",
            FactorKind::ResponseTime => "Response Time",
            // radar axis name
            FactorKind::Workload => "Incident Volume",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "low" => Some(RiskLevel::Low),
            "medium" => Some(RiskLevel::Medium),
            "high" => Some(RiskLevel::High),
            "critical" => Some(RiskLevel::Critical),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
            RiskLevel::Critical => "critical",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MaslachDimensions {
    pub emotional_exhaustion: f64,
    pub depersonalization: f64,
    pub personal_accomplishment: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreSource {
    Upstream,
    Derived,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MemberBurnoutScore {
    pub score: f64,
    pub risk_level: RiskLevel,
    pub maslach_dimensions: MaslachDimensions,
    pub source: ScoreSource,
    /// Gap between an upstream score and the factor-derived one, when both exist.
    pub factor_divergence: Option<f64>,
}

/// A member with everything computed for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredMember {
    pub metrics: RawMemberMetrics,
    pub factors: NormalizedFactors,
    pub burnout: MemberBurnoutScore,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FactorSeverity {
    Good,
    Fair,
    Poor,
    Critical,
}

impl FactorSeverity {
    pub fn label(self) -> &'static str {
        match self {
            FactorSeverity::Good => "Low Risk",
            FactorSeverity::Fair => "Warning",
            FactorSeverity::Poor => "Elevated",
            FactorSeverity::Critical => "High Risk",
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            FactorSeverity::Good => "green",
            FactorSeverity::Fair => "yellow",
            FactorSeverity::Poor => "orange",
            FactorSeverity::Critical => "red",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamFactor {
    pub kind: FactorKind,
    pub name: &'static str,
    pub value: f64,
    pub severity: FactorSeverity,
    pub color: &'static str,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DailyTrendPoint {
    pub date: NaiveDate,
    #[serde(default, deserialize_with = "null_as_default")]
    pub overall_score: f64,
    #[serde(default, deserialize_with = "lenient_count")]
    pub incident_count: u32,
    #[serde(default, deserialize_with = "lenient_count")]
    pub members_at_risk: u32,
    #[serde(default, deserialize_with = "lenient_count")]
    pub total_members: u32,
    #[serde(default)]
    pub health_status: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum EventType {
    Peak,
    Valley,
    Recovery,
    Decline,
    HighVolume,
    Critical,
    Normal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Impact {
    Positive,
    Negative,
    Neutral,
}

impl EventType {
    pub fn impact(self) -> Impact {
        match self {
            EventType::Peak | EventType::Recovery => Impact::Positive,
            EventType::Valley | EventType::Decline | EventType::Critical => Impact::Negative,
            EventType::HighVolume | EventType::Normal => Impact::Neutral,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            EventType::Peak => "peak",
            EventType::Valley => "valley",
            EventType::Recovery => "recovery",
            EventType::Decline => "decline",
            EventType::HighVolume => "high-volume",
            EventType::Critical => "critical",
            EventType::Normal => "normal",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StandoutEvent {
    pub date: NaiveDate,
    pub event_type: EventType,
    pub significance: u8,
    /// Health on the 0-100 display scale.
    pub score: i64,
    pub impact: Impact,
    pub description: String,
}

impl StandoutEvent {
    pub fn is_standout(&self) -> bool {
        self.significance > 0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum TimelineEntry {
    Event(StandoutEvent),
    Current { date: NaiveDate, score: Option<f64> },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MemberBar {
    pub name: String,
    pub score: f64,
    pub risk_level: RiskLevel,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RiskDistribution {
    pub low: usize,
    pub medium: usize,
    pub high: usize,
    pub critical: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamSummary {
    pub total_members: usize,
    pub members_with_incidents: usize,
    pub average_score: Option<f64>,
    pub risk_distribution: RiskDistribution,
    pub factors: Vec<TeamFactor>,
    pub high_risk_factors: Vec<TeamFactor>,
    pub member_bars: Vec<MemberBar>,
}
