use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::adapter::{AnalysisResult, HistoricalTrends};
use crate::cache::TtlCache;
use crate::error::{Error, Result};
use crate::models::{DailyTrendPoint, PrecomputedFactors, RawMemberMetrics, RiskLevel};
use crate::normalize::incidents_per_week;

/// Reads analysis inputs from disk, keeping parsed documents for the cache TTL.
#[derive(Default)]
pub struct Loader {
    analyses: TtlCache<PathBuf, AnalysisResult>,
    trends: TtlCache<PathBuf, Vec<DailyTrendPoint>>,
}

impl Loader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load_analysis(&self, path: &Path) -> Result<AnalysisResult> {
        let key = path.to_path_buf();
        if let Some(cached) = self.analyses.get(&key) {
            tracing::debug!(path = %path.display(), "analysis served from cache");
            return Ok(cached);
        }
        let analysis: AnalysisResult = read_json(path)?;
        self.analyses.set(key, analysis.clone());
        Ok(analysis)
    }

    pub fn load_trends(&self, path: &Path) -> Result<Vec<DailyTrendPoint>> {
        let key = path.to_path_buf();
        if let Some(cached) = self.trends.get(&key) {
            return Ok(cached);
        }
        let trends: HistoricalTrends = read_json(path)?;
        tracing::debug!(points = trends.daily_trends.len(), path = %path.display(), "loaded daily trends");
        self.trends.set(key, trends.daily_trends.clone());
        Ok(trends.daily_trends)
    }

    pub fn invalidate(&self, path: &Path) {
        let key = path.to_path_buf();
        self.analyses.invalidate(&key);
        self.trends.invalidate(&key);
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = std::fs::read_to_string(path).map_err(|source| Error::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| Error::Json {
        path: path.to_path_buf(),
        source,
    })
}

#[derive(Debug, Deserialize)]
struct CsvRow {
    name: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default, deserialize_with = "crate::models::optional_lenient_count")]
    incident_count: Option<u32>,
    #[serde(default)]
    incidents_per_week: Option<f64>,
    #[serde(default)]
    severity_weighted_per_week: Option<f64>,
    #[serde(default)]
    after_hours_percentage: Option<f64>,
    #[serde(default)]
    weekend_percentage: Option<f64>,
    #[serde(default)]
    avg_response_time_minutes: Option<f64>,
    #[serde(default)]
    burnout_score: Option<f64>,
    #[serde(default)]
    risk_level: Option<String>,
}

/// Member metrics from a CSV export. Empty cells count as missing data.
pub fn import_csv(path: &Path, time_range_days: f64) -> Result<Vec<RawMemberMetrics>> {
    let csv_error = |source| Error::Csv {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = csv::Reader::from_path(path).map_err(csv_error)?;
    let mut members = Vec::new();

    for result in reader.deserialize::<CsvRow>() {
        let row = result.map_err(csv_error)?;
        let incident_count = row.incident_count.unwrap_or(0);

        members.push(RawMemberMetrics {
            name: row.name,
            email: row.email.unwrap_or_default(),
            incident_count,
            incidents_per_week: row
                .incidents_per_week
                .unwrap_or_else(|| incidents_per_week(incident_count, time_range_days)),
            severity_weighted_per_week: row.severity_weighted_per_week,
            after_hours_percentage: row.after_hours_percentage,
            weekend_percentage: row.weekend_percentage,
            avg_response_time_minutes: row.avg_response_time_minutes,
            github_activity: None,
            slack_activity: None,
            burnout_score: row.burnout_score,
            risk_level: row.risk_level.as_deref().and_then(RiskLevel::parse),
            factors: PrecomputedFactors::default(),
        });
    }

    tracing::debug!(members = members.len(), path = %path.display(), "imported member metrics");
    Ok(members)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_temp(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn loads_analysis_and_serves_repeat_reads_from_cache() {
        let file = write_temp(
            r#"{"analysis_data": {"team_analysis": [{"user_name": "Avery", "incident_count": 3}]}}"#,
        );
        let loader = Loader::new();

        let first = loader.load_analysis(file.path()).unwrap();
        std::fs::write(file.path(), "not json").unwrap();
        let second = loader.load_analysis(file.path()).unwrap();
        assert_eq!(
            first.member_records().unwrap().len(),
            second.member_records().unwrap().len()
        );

        loader.invalidate(file.path());
        assert!(matches!(
            loader.load_analysis(file.path()),
            Err(Error::Json { .. })
        ));
    }

    #[test]
    fn loads_daily_trends() {
        let file = write_temp(
            r#"{"daily_trends": [{"date": "2026-02-01", "overall_score": 7.1, "incident_count": 2}]}"#,
        );
        let trends = Loader::new().load_trends(file.path()).unwrap();
        assert_eq!(trends.len(), 1);
        assert_eq!(trends[0].incident_count, 2);
    }

    #[test]
    fn missing_file_reports_path() {
        let err = Loader::new()
            .load_trends(Path::new("/nonexistent/trends.json"))
            .unwrap_err();
        assert!(matches!(err, Error::Read { .. }));
        assert!(err.to_string().contains("/nonexistent/trends.json"));
    }

    #[test]
    fn imports_csv_with_blank_cells() {
        let file = write_temp(
            "name,email,incident_count,incidents_per_week,severity_weighted_per_week,after_hours_percentage,weekend_percentage,avg_response_time_minutes,burnout_score,risk_level\n\
             Avery Lee,avery@example.com,12,,2.5,30,,45,,high\n\
             Jules Moreno,,0,,,,,,,\n",
        );

        let members = import_csv(file.path(), 28.0).unwrap();
        assert_eq!(members.len(), 2);

        let avery = &members[0];
        assert_eq!(avery.incidents_per_week, 3.0);
        assert_eq!(avery.after_hours_percentage, Some(30.0));
        assert_eq!(avery.weekend_percentage, None);
        assert_eq!(avery.risk_level, Some(RiskLevel::High));

        let jules = &members[1];
        assert_eq!(jules.email, "");
        assert!(!jules.has_incidents());
        assert_eq!(jules.avg_response_time_minutes, None);
    }

    #[test]
    fn csv_counts_accept_float_encoding() {
        let file = write_temp("name,incident_count\nAvery Lee,6.0\nJules Moreno,\n");

        let members = import_csv(file.path(), 14.0).unwrap();
        assert_eq!(members[0].incident_count, 6);
        assert_eq!(members[0].incidents_per_week, 3.0);
        assert_eq!(members[1].incident_count, 0);
    }
}
