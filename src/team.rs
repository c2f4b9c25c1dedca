use crate::models::{
    DailyTrendPoint, FactorKind, FactorSeverity, MemberBar, RawMemberMetrics, RiskDistribution,
    RiskLevel, ScoredMember, TeamFactor, TeamSummary,
};
use crate::normalize::normalize_factors;

/// Factors at or above this value are listed as high-risk. Note this is below
/// where the "Warning" band starts.
pub const HIGH_RISK_FACTOR_THRESHOLD: f64 = 2.0;

/// Team averages over members who carried at least one incident.
pub fn aggregate_team(members: &[RawMemberMetrics]) -> Vec<TeamFactor> {
    let active: Vec<_> = members
        .iter()
        .filter(|member| member.has_incidents())
        .map(normalize_factors)
        .collect();

    if active.is_empty() {
        tracing::debug!(members = members.len(), "no members with incidents, skipping team factors");
        return Vec::new();
    }

    tracing::debug!(
        included = active.len(),
        excluded = members.len() - active.len(),
        "aggregating team factors"
    );

    FactorKind::ALL
        .iter()
        .map(|&kind| {
            let mean = active.iter().map(|factors| factors.get(kind)).sum::<f64>()
                / active.len() as f64;
            team_factor(kind, round_one_decimal(mean))
        })
        .collect()
}

pub fn team_factor(kind: FactorKind, value: f64) -> TeamFactor {
    let severity = severity_for(value);
    TeamFactor {
        kind,
        name: kind.label(),
        value,
        severity,
        color: severity.color(),
    }
}

/// Bands on the 0-10 factor scale.
pub fn severity_for(value: f64) -> FactorSeverity {
    if value < 3.0 {
        FactorSeverity::Good
    } else if value < 5.0 {
        FactorSeverity::Fair
    } else if value < 7.0 {
        FactorSeverity::Poor
    } else {
        FactorSeverity::Critical
    }
}

/// Same bands on a 0-100 axis.
pub fn severity_for_percent(value: f64) -> FactorSeverity {
    if value < 30.0 {
        FactorSeverity::Good
    } else if value < 50.0 {
        FactorSeverity::Fair
    } else if value < 70.0 {
        FactorSeverity::Poor
    } else {
        FactorSeverity::Critical
    }
}

pub fn high_risk_factors(factors: &[TeamFactor]) -> Vec<TeamFactor> {
    let mut flagged: Vec<TeamFactor> = factors
        .iter()
        .filter(|factor| factor.value >= HIGH_RISK_FACTOR_THRESHOLD)
        .cloned()
        .collect();
    flagged.sort_by(|a, b| {
        b.value
            .partial_cmp(&a.value)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    flagged
}

/// Team health on a 0-100 scale: the latest daily point when a series exists,
/// otherwise the single aggregate score.
pub fn team_health_display(daily_trends: &[DailyTrendPoint], fallback_overall: Option<f64>) -> Option<f64> {
    daily_trends
        .last()
        .map(|point| point.overall_score)
        .or(fallback_overall)
        .filter(|score| score.is_finite())
        .map(|score| score * 10.0)
}

/// Copenhagen-style burnout percentage, the complement of health.
pub fn cbi_from_health(health: f64) -> f64 {
    if !health.is_finite() {
        return 0.0;
    }
    (100.0 - health * 10.0).clamp(0.0, 100.0)
}

pub fn summarize_team(scored: &[ScoredMember]) -> TeamSummary {
    let active: Vec<&ScoredMember> = scored.iter().filter(|m| m.metrics.has_incidents()).collect();

    let average_score = if active.is_empty() {
        None
    } else {
        let total: f64 = active.iter().map(|m| m.burnout.score).sum();
        Some(round_one_decimal(total / active.len() as f64))
    };

    let mut risk_distribution = RiskDistribution::default();
    for member in &active {
        match member.burnout.risk_level {
            RiskLevel::Low => risk_distribution.low += 1,
            RiskLevel::Medium => risk_distribution.medium += 1,
            RiskLevel::High => risk_distribution.high += 1,
            RiskLevel::Critical => risk_distribution.critical += 1,
        }
    }

    let mut member_bars: Vec<MemberBar> = active
        .iter()
        .map(|m| MemberBar {
            name: m.metrics.name.clone(),
            score: m.burnout.score,
            risk_level: m.burnout.risk_level,
        })
        .collect();
    member_bars.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let members: Vec<RawMemberMetrics> = scored.iter().map(|m| m.metrics.clone()).collect();
    let factors = aggregate_team(&members);
    let high_risk_factors = high_risk_factors(&factors);

    TeamSummary {
        total_members: scored.len(),
        members_with_incidents: active.len(),
        average_score,
        risk_distribution,
        factors,
        high_risk_factors,
        member_bars,
    }
}

pub fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::risk::score_members;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn member(name: &str, incidents: u32, after_hours: f64) -> RawMemberMetrics {
        RawMemberMetrics {
            name: name.to_string(),
            incident_count: incidents,
            incidents_per_week: incidents as f64 / 4.0,
            after_hours_percentage: Some(after_hours),
            weekend_percentage: Some(0.0),
            avg_response_time_minutes: Some(20.0),
            ..Default::default()
        }
    }

    fn factor_value(factors: &[TeamFactor], kind: FactorKind) -> f64 {
        factors
            .iter()
            .find(|f| f.kind == kind)
            .map(|f| f.value)
            .unwrap_or(f64::NAN)
    }

    #[test]
    fn excludes_members_without_incidents_from_means() {
        let members = vec![
            member("A", 4, 10.0),
            member("B", 4, 20.0),
            member("C", 4, 30.0),
            member("D", 0, 50.0),
            member("E", 0, 50.0),
        ];

        let factors = aggregate_team(&members);
        assert_eq!(factors.len(), 5);
        // (2 + 4 + 6) / 3
        assert_eq!(factor_value(&factors, FactorKind::AfterHours), 4.0);
        assert_eq!(factor_value(&factors, FactorKind::ResponseTime), 2.0);
    }

    #[test]
    fn team_values_round_to_one_decimal() {
        let members = vec![member("A", 1, 11.0), member("B", 1, 12.0), member("C", 1, 12.0)];
        // (2.2 + 2.4 + 2.4) / 3 = 2.333..
        assert_eq!(factor_value(&aggregate_team(&members), FactorKind::AfterHours), 2.3);
    }

    #[test]
    fn no_active_members_means_no_factors() {
        assert!(aggregate_team(&[member("A", 0, 40.0)]).is_empty());
        assert!(aggregate_team(&[]).is_empty());
    }

    #[test]
    fn severity_bands_match_edges() {
        assert_eq!(severity_for(2.9), FactorSeverity::Good);
        assert_eq!(severity_for(3.0), FactorSeverity::Fair);
        assert_eq!(severity_for(5.0), FactorSeverity::Poor);
        assert_eq!(severity_for(6.9), FactorSeverity::Poor);
        assert_eq!(severity_for(7.0), FactorSeverity::Critical);
        assert_eq!(severity_for_percent(29.0), FactorSeverity::Good);
        assert_eq!(severity_for_percent(50.0), FactorSeverity::Poor);
        assert_eq!(severity_for_percent(70.0), FactorSeverity::Critical);
        assert_eq!(FactorSeverity::Fair.color(), "yellow");
    }

    #[test]
    fn high_risk_threshold_is_pinned_at_two() {
        let factors = vec![
            team_factor(FactorKind::AfterHours, 1.9),
            team_factor(FactorKind::WeekendWork, 2.0),
            team_factor(FactorKind::IncidentLoad, 6.4),
            team_factor(FactorKind::ResponseTime, 2.5),
        ];

        let flagged: Vec<(FactorKind, f64)> = high_risk_factors(&factors)
            .iter()
            .map(|f| (f.kind, f.value))
            .collect();
        assert_eq!(
            flagged,
            vec![
                (FactorKind::IncidentLoad, 6.4),
                (FactorKind::ResponseTime, 2.5),
                (FactorKind::WeekendWork, 2.0),
            ]
        );
    }

    #[test]
    fn health_display_prefers_latest_daily_point() {
        let day = |d: u32, score: f64| DailyTrendPoint {
            date: NaiveDate::from_ymd_opt(2026, 3, d).unwrap(),
            overall_score: score,
            ..Default::default()
        };
        let trends = vec![day(1, 6.0), day(2, 7.5)];

        assert_eq!(team_health_display(&trends, Some(5.0)), Some(75.0));
        assert_eq!(team_health_display(&[], Some(5.0)), Some(50.0));
        assert_eq!(team_health_display(&[], None), None);
    }

    #[test]
    fn cbi_is_complement_of_health() {
        assert_eq!(cbi_from_health(7.5), 25.0);
        assert_eq!(cbi_from_health(12.0), 0.0);
        assert_eq!(cbi_from_health(f64::NAN), 0.0);
    }

    #[test]
    fn summary_counts_only_active_members_in_charts() {
        let mut a = member("A", 6, 40.0);
        a.burnout_score = Some(8.0);
        let mut b = member("B", 2, 10.0);
        b.burnout_score = Some(2.0);
        let mut idle = member("Idle", 0, 0.0);
        idle.burnout_score = Some(1.0);

        let summary = summarize_team(&score_members(&[a, b, idle]));
        assert_eq!(summary.total_members, 3);
        assert_eq!(summary.members_with_incidents, 2);
        assert_eq!(summary.average_score, Some(5.0));
        assert_eq!(summary.risk_distribution.high, 1);
        assert_eq!(summary.risk_distribution.low, 1);
        let names: Vec<&str> = summary.member_bars.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B"]);
    }
}
