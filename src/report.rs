use std::fmt::Write;

use chrono::NaiveDate;

use crate::models::{DailyTrendPoint, RawMemberMetrics, TimelineEntry};
use crate::risk::{self, activity_indicators, metric_display};
use crate::team::{self, cbi_from_health, team_health_display};
use crate::trends;

pub struct ReportInput<'a> {
    pub team: Option<&'a str>,
    pub time_range_days: f64,
    pub members: &'a [RawMemberMetrics],
    pub daily_trends: &'a [DailyTrendPoint],
    pub fallback_health: Option<f64>,
    pub today: NaiveDate,
}

pub fn build_report(input: &ReportInput<'_>) -> String {
    let scored = risk::score_members(input.members);
    let summary = team::summarize_team(&scored);
    let health = team_health_display(input.daily_trends, input.fallback_health);
    let timeline = trends::build_timeline(input.daily_trends, health, input.today);

    let mut output = String::new();
    let team_label = input.team.unwrap_or("all teams");

    let _ = writeln!(output, "# Burnout Early Warning Report");
    let _ = writeln!(
        output,
        "Generated for {} over the last {:.0} days (as of {})",
        team_label, input.time_range_days, input.today
    );
    let _ = writeln!(output);
    let _ = writeln!(output, "## Team Health");

    match health {
        Some(score) => {
            let _ = writeln!(
                output,
                "- Health {:.0}% (burnout {:.0}%)",
                score,
                cbi_from_health(score / 10.0)
            );
        }
        None => {
            let _ = writeln!(output, "- Health: No data");
        }
    }
    let _ = writeln!(
        output,
        "- {} members, {} with incidents",
        summary.total_members, summary.members_with_incidents
    );
    if let Some(average) = summary.average_score {
        let _ = writeln!(output, "- Average burnout score {average:.1}/10");
    }
    let dist = &summary.risk_distribution;
    let _ = writeln!(
        output,
        "- Risk mix: {} high, {} medium, {} low, {} critical",
        dist.high, dist.medium, dist.low, dist.critical
    );

    let _ = writeln!(output);
    let _ = writeln!(output, "## Burnout Factors");

    if summary.factors.is_empty() {
        let _ = writeln!(output, "No members with incidents in this window.");
    } else {
        for factor in summary.factors.iter() {
            let _ = writeln!(
                output,
                "- {}: {:.1} ({})",
                factor.name,
                factor.value,
                factor.severity.label()
            );
        }
        if !summary.high_risk_factors.is_empty() {
            let names: Vec<&str> = summary.high_risk_factors.iter().map(|f| f.name).collect();
            let _ = writeln!(output, "High risk factors: {}", names.join(", "));
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Members");

    if scored.is_empty() {
        let _ = writeln!(output, "No members in this analysis.");
    } else {
        for member in scored.iter() {
            let m = &member.metrics;
            let b = &member.burnout;
            let _ = writeln!(
                output,
                "- {} score {:.1} ({}) across {} incidents",
                m.name,
                b.score,
                b.risk_level.as_str(),
                m.incident_count
            );
            let _ = writeln!(
                output,
                "  after hours {}, weekend {}, response {}",
                metric_display(m.after_hours_percentage, "%"),
                metric_display(m.weekend_percentage, "%"),
                metric_display(m.avg_response_time_minutes, " min"),
            );
            let dims = &b.maslach_dimensions;
            let _ = writeln!(
                output,
                "  exhaustion {:.1}, depersonalization {:.1}, accomplishment {:.1}",
                dims.emotional_exhaustion, dims.depersonalization, dims.personal_accomplishment
            );
            let indicators = activity_indicators(m);
            if !indicators.is_empty() {
                let labels: Vec<&str> = indicators.iter().map(|i| i.label()).collect();
                let _ = writeln!(output, "  signals: {}", labels.join(", "));
            }
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Timeline");
    write_timeline(&mut output, &timeline);

    output
}

pub fn write_timeline(output: &mut String, timeline: &[TimelineEntry]) {
    for entry in timeline {
        match entry {
            TimelineEntry::Event(event) => {
                let _ = writeln!(
                    output,
                    "- {} [{}, {:?}] {}",
                    event.date,
                    event.event_type.as_str(),
                    event.impact,
                    event.description
                );
            }
            TimelineEntry::Current { date, score } => match score {
                Some(score) => {
                    let _ = writeln!(output, "- {date} [current] Team health {score:.0}%");
                }
                None => {
                    let _ = writeln!(output, "- {date} [current] Team health: No data");
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 2, 10).unwrap()
    }

    fn members() -> Vec<RawMemberMetrics> {
        vec![
            RawMemberMetrics {
                name: "Avery Lee".to_string(),
                incident_count: 14,
                incidents_per_week: 3.5,
                after_hours_percentage: Some(40.0),
                burnout_score: Some(7.6),
                ..Default::default()
            },
            RawMemberMetrics {
                name: "Jules Moreno".to_string(),
                ..Default::default()
            },
        ]
    }

    #[test]
    fn report_lists_sections_and_members() {
        let members = members();
        let trends: Vec<DailyTrendPoint> = [7.0, 9.5, 7.0, 6.8]
            .iter()
            .enumerate()
            .map(|(i, score)| DailyTrendPoint {
                date: today() - Duration::days(4 - i as i64),
                overall_score: *score,
                ..Default::default()
            })
            .collect();

        let report = build_report(&ReportInput {
            team: Some("platform"),
            time_range_days: 30.0,
            members: &members,
            daily_trends: &trends,
            fallback_health: None,
            today: today(),
        });

        assert!(report.contains("# Burnout Early Warning Report"));
        assert!(report.contains("Generated for platform over the last 30 days"));
        assert!(report.contains("- Health 68% (burnout 32%)"));
        assert!(report.contains("- 2 members, 1 with incidents"));
        assert!(report.contains("- Avery Lee score 7.6 (high) across 14 incidents"));
        assert!(report.contains("after hours No data, weekend No data, response No data"));
        assert!(report.contains("[peak, Positive] Team health peaked at 95%"));
        assert!(report.trim_end().ends_with("[current] Team health 68%"));
    }

    #[test]
    fn empty_inputs_still_render() {
        let report = build_report(&ReportInput {
            team: None,
            time_range_days: 30.0,
            members: &[],
            daily_trends: &[],
            fallback_health: None,
            today: today(),
        });

        assert!(report.contains("Generated for all teams"));
        assert!(report.contains("- Health: No data"));
        assert!(report.contains("No members with incidents in this window."));
        assert!(report.contains("No members in this analysis."));
        assert!(report.contains("2026-02-10 [current] Team health: No data"));
    }
}
