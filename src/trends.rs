//! Standout-event detection over a series of daily team health scores.
//!
//! Each interior day is compared with its neighbours and classified by the
//! first matching rule, in this order: peak, valley, recovery, decline,
//! high volume, critical. Days that match nothing are normal and never reach
//! the timeline.

use chrono::NaiveDate;

use crate::models::{DailyTrendPoint, EventType, StandoutEvent, TimelineEntry};

/// Shorter series have no interior points worth comparing.
pub const MIN_POINTS: usize = 3;
pub const MAX_EVENTS: usize = 8;

const PEAK_MIN_SCORE: i64 = 75;
const PEAK_MAJOR_SCORE: i64 = 90;
const VALLEY_MAX_SCORE: i64 = 60;
const VALLEY_MAJOR_SCORE: i64 = 40;
const SWING_POINTS: i64 = 20;
const SWING_MAJOR_POINTS: i64 = 30;
const HIGH_VOLUME_INCIDENTS: u32 = 15;
const HIGH_VOLUME_MAJOR_INCIDENTS: u32 = 25;
const CRITICAL_MAX_SCORE: i64 = 45;
const CRITICAL_MEMBERS_AT_RISK: u32 = 3;

/// Health on the 0-100 display scale.
pub fn display_score(overall_score: f64) -> i64 {
    if overall_score.is_finite() {
        (overall_score * 10.0).round() as i64
    } else {
        0
    }
}

/// Classifies one interior day against its neighbours.
pub fn classify_point(
    prev: &DailyTrendPoint,
    point: &DailyTrendPoint,
    next: &DailyTrendPoint,
) -> StandoutEvent {
    let prev_score = display_score(prev.overall_score);
    let score = display_score(point.overall_score);
    let next_score = display_score(next.overall_score);
    let change = score - prev_score;

    let (event_type, significance, description) =
        if score > prev_score && score > next_score && score >= PEAK_MIN_SCORE {
            (
                EventType::Peak,
                major_if(score >= PEAK_MAJOR_SCORE),
                format!("Team health peaked at {score}%"),
            )
        } else if score < prev_score && score < next_score && score <= VALLEY_MAX_SCORE {
            (
                EventType::Valley,
                major_if(score <= VALLEY_MAJOR_SCORE),
                format!("Team health dipped to {score}%"),
            )
        } else if change >= SWING_POINTS {
            (
                EventType::Recovery,
                major_if(change >= SWING_MAJOR_POINTS),
                format!("Health recovered by {change} points to {score}%"),
            )
        } else if change <= -SWING_POINTS {
            (
                EventType::Decline,
                major_if(change <= -SWING_MAJOR_POINTS),
                format!("Health declined by {} points to {score}%", -change),
            )
        } else if point.incident_count >= HIGH_VOLUME_INCIDENTS {
            (
                EventType::HighVolume,
                major_if(point.incident_count >= HIGH_VOLUME_MAJOR_INCIDENTS),
                format!("High incident volume: {} incidents", point.incident_count),
            )
        } else if score <= CRITICAL_MAX_SCORE && point.members_at_risk >= CRITICAL_MEMBERS_AT_RISK {
            (
                EventType::Critical,
                3,
                format!(
                    "Critical day: {} members at risk with health at {score}%",
                    point.members_at_risk
                ),
            )
        } else {
            (EventType::Normal, 0, "Normal operations".to_string())
        };

    StandoutEvent {
        date: point.date,
        event_type,
        significance,
        score,
        impact: event_type.impact(),
        description,
    }
}

fn major_if(major: bool) -> u8 {
    if major {
        3
    } else {
        2
    }
}

/// Classification of every interior day, normal days included.
pub fn classify_series(points: &[DailyTrendPoint]) -> Vec<StandoutEvent> {
    if points.len() < MIN_POINTS {
        return Vec::new();
    }
    points
        .windows(3)
        .map(|window| classify_point(&window[0], &window[1], &window[2]))
        .collect()
}

/// The most significant days of the series, at most [`MAX_EVENTS`], in date
/// order. Ties on significance keep the earlier day.
pub fn detect_standout_events(points: &[DailyTrendPoint]) -> Vec<StandoutEvent> {
    if points.len() < MIN_POINTS {
        tracing::debug!(points = points.len(), "trend series too short for event detection");
        return Vec::new();
    }

    let mut events: Vec<StandoutEvent> = classify_series(points)
        .into_iter()
        .filter(StandoutEvent::is_standout)
        .collect();

    events.sort_by(|a, b| b.significance.cmp(&a.significance));
    events.truncate(MAX_EVENTS);
    events.sort_by(|a, b| a.date.cmp(&b.date));
    events
}

/// Standout events followed by a closing "Current" entry.
pub fn build_timeline(
    points: &[DailyTrendPoint],
    current_score: Option<f64>,
    today: NaiveDate,
) -> Vec<TimelineEntry> {
    let mut timeline: Vec<TimelineEntry> = detect_standout_events(points)
        .into_iter()
        .map(TimelineEntry::Event)
        .collect();
    append_current(&mut timeline, current_score, today);
    timeline
}

pub fn append_current(timeline: &mut Vec<TimelineEntry>, score: Option<f64>, date: NaiveDate) {
    if matches!(timeline.last(), Some(TimelineEntry::Current { .. })) {
        return;
    }
    timeline.push(TimelineEntry::Current { date, score });
}
