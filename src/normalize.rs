//! Raw activity metrics onto the shared 0-10 risk factor scale.
//!
//! Every function here is total: negative or non-finite input counts as no
//! activity, and every result lands in `[0, 10]`.

use crate::models::{NormalizedFactors, RawMemberMetrics};

pub const FACTOR_MAX: f64 = 10.0;

const AFTER_HOURS_PER_PERCENT: f64 = 0.20;
const WEEKEND_PER_PERCENT: f64 = 0.25;
const SEVERITY_MULTIPLIER: f64 = 1.5;
const WORKLOAD_WEIGHT: f64 = 0.4;
const SEVERITY_WEIGHT: f64 = 0.6;

pub fn normalize_factors(raw: &RawMemberMetrics) -> NormalizedFactors {
    let precomputed = &raw.factors;

    NormalizedFactors {
        after_hours: raw
            .after_hours_percentage
            .map(after_hours_factor)
            .or_else(|| precomputed.after_hours.map(clamp_factor))
            .unwrap_or(0.0),
        weekend_work: raw
            .weekend_percentage
            .map(weekend_factor)
            .or_else(|| precomputed.weekend_work.map(clamp_factor))
            .unwrap_or(0.0),
        incident_load: if has_incident_signal(raw) {
            incident_load_factor(
                raw.incidents_per_week,
                raw.severity_weighted_per_week.unwrap_or(0.0),
            )
        } else {
            precomputed.incident_load.map(clamp_factor).unwrap_or(0.0)
        },
        response_time: raw
            .avg_response_time_minutes
            .map(response_time_factor)
            .or_else(|| precomputed.response_time.map(clamp_factor))
            .unwrap_or(0.0),
        workload: precomputed
            .workload
            .map(clamp_factor)
            .unwrap_or_else(|| workload_score(raw.incidents_per_week)),
    }
}

fn has_incident_signal(raw: &RawMemberMetrics) -> bool {
    sanitize(raw.incidents_per_week) > 0.0 || raw.severity_weighted_per_week.is_some()
}

/// 50% of activity outside working hours saturates the factor.
pub fn after_hours_factor(percentage: f64) -> f64 {
    clamp_factor(sanitize(percentage) * AFTER_HOURS_PER_PERCENT)
}

pub fn weekend_factor(percentage: f64) -> f64 {
    clamp_factor(sanitize(percentage) * WEEKEND_PER_PERCENT)
}

/// Piecewise incident-volume curve shared by the incident load blend and the
/// "Incident Volume" radar axis.
pub fn workload_score(incidents_per_week: f64) -> f64 {
    let ip = sanitize(incidents_per_week);
    let score = if ip <= 2.0 {
        ip * 1.5
    } else if ip <= 5.0 {
        3.0 + (ip - 2.0) / 3.0 * 4.0
    } else if ip <= 8.0 {
        7.0 + (ip - 5.0) / 3.0 * 3.0
    } else {
        FACTOR_MAX
    };
    clamp_factor(score)
}

pub fn severity_score(severity_weighted_per_week: f64) -> f64 {
    clamp_factor(sanitize(severity_weighted_per_week) * SEVERITY_MULTIPLIER)
}

pub fn incident_load_factor(incidents_per_week: f64, severity_weighted_per_week: f64) -> f64 {
    clamp_factor(
        WORKLOAD_WEIGHT * workload_score(incidents_per_week)
            + SEVERITY_WEIGHT * severity_score(severity_weighted_per_week),
    )
}

pub fn response_time_factor(avg_minutes: f64) -> f64 {
    let minutes = sanitize(avg_minutes);
    if minutes <= 30.0 {
        2.0
    } else if minutes <= 60.0 {
        4.0
    } else if minutes <= 120.0 {
        6.0
    } else if minutes <= 240.0 {
        8.0
    } else if minutes <= 480.0 {
        9.0
    } else {
        10.0
    }
}

/// Incidents per week over an analysis window; zero for an empty window.
pub fn incidents_per_week(incident_count: u32, time_range_days: f64) -> f64 {
    let weeks = sanitize(time_range_days) / 7.0;
    if weeks > 0.0 {
        incident_count as f64 / weeks
    } else {
        0.0
    }
}

pub fn clamp_factor(value: f64) -> f64 {
    sanitize(value).min(FACTOR_MAX)
}

fn sanitize(value: f64) -> f64 {
    if value.is_finite() {
        value.max(0.0)
    } else if value == f64::INFINITY {
        f64::MAX
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PrecomputedFactors;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn after_hours_scales_linearly_and_caps() {
        assert!(approx(after_hours_factor(0.0), 0.0));
        assert!(approx(after_hours_factor(25.0), 5.0));
        assert!(approx(after_hours_factor(50.0), 10.0));
        assert!(approx(after_hours_factor(80.0), 10.0));
    }

    #[test]
    fn response_time_matches_band_edges() {
        assert_eq!(response_time_factor(0.0), 2.0);
        assert_eq!(response_time_factor(30.0), 2.0);
        assert_eq!(response_time_factor(31.0), 4.0);
        assert_eq!(response_time_factor(60.0), 4.0);
        assert_eq!(response_time_factor(120.0), 6.0);
        assert_eq!(response_time_factor(240.0), 8.0);
        assert_eq!(response_time_factor(480.0), 9.0);
        assert_eq!(response_time_factor(481.0), 10.0);
    }

    #[test]
    fn workload_curve_is_continuous_at_breakpoints() {
        assert!(approx(workload_score(2.0), 3.0));
        assert!(approx(workload_score(5.0), 7.0));
        assert!(approx(workload_score(8.0), 10.0));
        assert!(approx(workload_score(6.5), 8.5));
        assert!(approx(workload_score(20.0), 10.0));
    }

    #[test]
    fn incident_load_blends_volume_and_severity() {
        // 0.4 * 3.0 + 0.6 * 3.0
        assert!(approx(incident_load_factor(2.0, 2.0), 3.0));
        assert!(approx(incident_load_factor(0.0, 10.0), 6.0));
    }

    #[test]
    fn scenario_member_normalizes_as_expected() {
        let raw = RawMemberMetrics {
            name: "Sam Rivera".to_string(),
            incident_count: 40,
            incidents_per_week: 6.5,
            severity_weighted_per_week: Some(4.0),
            after_hours_percentage: Some(60.0),
            weekend_percentage: Some(10.0),
            avg_response_time_minutes: Some(45.0),
            ..Default::default()
        };

        let factors = normalize_factors(&raw);
        assert!(approx(factors.after_hours, 10.0));
        assert!(approx(factors.weekend_work, 2.5));
        assert!(approx(factors.response_time, 4.0));
        assert!(approx(factors.workload, 8.5));
        assert!(approx(factors.incident_load, 0.4 * 8.5 + 0.6 * 6.0));
    }

    #[test]
    fn falls_back_to_precomputed_factors_when_raw_missing() {
        let raw = RawMemberMetrics {
            factors: PrecomputedFactors {
                after_hours: Some(4.2),
                weekend_work: Some(12.0),
                response_time: Some(6.0),
                workload: Some(3.3),
                incident_load: None,
            },
            ..Default::default()
        };

        let factors = normalize_factors(&raw);
        assert!(approx(factors.after_hours, 4.2));
        assert!(approx(factors.weekend_work, 10.0));
        assert!(approx(factors.response_time, 6.0));
        assert!(approx(factors.workload, 3.3));
    }

    #[test]
    fn missing_everything_scores_zero() {
        let factors = normalize_factors(&RawMemberMetrics::default());
        assert_eq!(factors, NormalizedFactors::default());
    }

    #[test]
    fn garbage_input_stays_in_range() {
        assert_eq!(after_hours_factor(f64::NAN), 0.0);
        assert_eq!(after_hours_factor(-40.0), 0.0);
        assert_eq!(weekend_factor(f64::INFINITY), 10.0);
        assert_eq!(response_time_factor(f64::NAN), 2.0);
    }

    #[test]
    fn incidents_per_week_handles_empty_window() {
        assert!(approx(incidents_per_week(30, 70.0), 3.0));
        assert_eq!(incidents_per_week(30, 0.0), 0.0);
    }

    #[test]
    fn incident_load_falls_back_to_upstream_factor() {
        let mut raw = RawMemberMetrics {
            factors: PrecomputedFactors {
                incident_load: Some(12.0),
                ..Default::default()
            },
            ..Default::default()
        };
        assert_eq!(normalize_factors(&raw).incident_load, 10.0);

        raw.factors.incident_load = Some(4.5);
        assert_eq!(normalize_factors(&raw).incident_load, 4.5);

        raw.severity_weighted_per_week = Some(0.0);
        assert_eq!(normalize_factors(&raw).incident_load, 0.0);
    }
}
