use crate::models::{
    FactorKind, MaslachDimensions, MemberBurnoutScore, NormalizedFactors, RawMemberMetrics,
    RiskLevel, ScoreSource, ScoredMember,
};
use crate::normalize::{clamp_factor, normalize_factors};

/// Upstream and factor-derived scores further apart than this get logged.
pub const DIVERGENCE_TOLERANCE: f64 = 2.0;

pub fn aggregate_member(raw: &RawMemberMetrics, normalized: &NormalizedFactors) -> MemberBurnoutScore {
    let derived = derived_score(normalized);

    let (score, source, factor_divergence) = match raw.burnout_score {
        Some(upstream) => {
            let upstream = clamp_factor(upstream);
            let gap = (upstream - derived).abs();
            if gap > DIVERGENCE_TOLERANCE {
                tracing::warn!(
                    member = %raw.name,
                    upstream,
                    derived,
                    "factor breakdown diverges from upstream burnout score"
                );
            }
            (upstream, ScoreSource::Upstream, Some(gap))
        }
        None => (derived, ScoreSource::Derived, None),
    };

    MemberBurnoutScore {
        score,
        risk_level: raw.risk_level.unwrap_or_else(|| risk_level_for(score)),
        maslach_dimensions: maslach_dimensions(score),
        source,
        factor_divergence,
    }
}

/// Normalize and aggregate one member in a single pass.
pub fn score_member(raw: &RawMemberMetrics) -> ScoredMember {
    let factors = normalize_factors(raw);
    let burnout = aggregate_member(raw, &factors);
    ScoredMember {
        metrics: raw.clone(),
        factors,
        burnout,
    }
}

/// Scores every member, highest burnout first.
pub fn score_members(members: &[RawMemberMetrics]) -> Vec<ScoredMember> {
    let mut scored: Vec<ScoredMember> = members.iter().map(score_member).collect();
    scored.sort_by(|a, b| {
        b.burnout
            .score
            .partial_cmp(&a.burnout.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    scored
}

pub fn derived_score(normalized: &NormalizedFactors) -> f64 {
    let total: f64 = FactorKind::ALL.iter().map(|kind| normalized.get(*kind)).sum();
    clamp_factor(total / FactorKind::ALL.len() as f64)
}

/// Critical is only ever reported by upstream data.
pub fn risk_level_for(score: f64) -> RiskLevel {
    if score > 7.0 {
        RiskLevel::High
    } else if score <= 3.0 {
        RiskLevel::Low
    } else {
        RiskLevel::Medium
    }
}

pub fn maslach_dimensions(score: f64) -> MaslachDimensions {
    MaslachDimensions {
        emotional_exhaustion: clamp_factor(score * 1.2),
        depersonalization: clamp_factor(score),
        personal_accomplishment: clamp_factor((10.0 - score * 0.8).max(3.0)),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityIndicator {
    ExcessiveCommits,
    LateNightCommits,
    WeekendCommits,
    LargePullRequests,
    ExcessiveMessaging,
    PoorSentiment,
    LateResponses,
    AfterHoursMessaging,
}

impl ActivityIndicator {
    pub fn label(self) -> &'static str {
        match self {
            ActivityIndicator::ExcessiveCommits => "Excessive commits",
            ActivityIndicator::LateNightCommits => "Late-night coding",
            ActivityIndicator::WeekendCommits => "Weekend commits",
            ActivityIndicator::LargePullRequests => "Large pull requests",
            ActivityIndicator::ExcessiveMessaging => "Excessive messaging",
            ActivityIndicator::PoorSentiment => "Poor sentiment",
            ActivityIndicator::LateResponses => "Late responses",
            ActivityIndicator::AfterHoursMessaging => "After-hours messaging",
        }
    }
}

/// Raised GitHub and Slack burnout flags, GitHub first.
pub fn activity_indicators(raw: &RawMemberMetrics) -> Vec<ActivityIndicator> {
    let mut raised = Vec::new();

    if let Some(github) = &raw.github_activity {
        let flags = &github.burnout_indicators;
        for (on, indicator) in [
            (flags.excessive_commits, ActivityIndicator::ExcessiveCommits),
            (flags.late_night_activity, ActivityIndicator::LateNightCommits),
            (flags.weekend_work, ActivityIndicator::WeekendCommits),
            (flags.large_prs, ActivityIndicator::LargePullRequests),
        ] {
            if on {
                raised.push(indicator);
            }
        }
    }

    if let Some(slack) = &raw.slack_activity {
        let flags = &slack.burnout_indicators;
        for (on, indicator) in [
            (flags.excessive_messaging, ActivityIndicator::ExcessiveMessaging),
            (flags.poor_sentiment, ActivityIndicator::PoorSentiment),
            (flags.late_responses, ActivityIndicator::LateResponses),
            (flags.after_hours_activity, ActivityIndicator::AfterHoursMessaging),
        ] {
            if on {
                raised.push(indicator);
            }
        }
    }

    raised
}

/// "No data" for metrics the upstream record never had.
pub fn metric_display(value: Option<f64>, suffix: &str) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{v:.1}{suffix}"),
        _ => "No data".to_string(),
    }
}
