use crate::domain::model::Row;
use chrono::{DateTime, Duration, NaiveTime, Utc};
use serde_json::Value;

pub const TRAFFIC_COLUMNS: [&str; 4] = [
    "CPcode",
    "Average_edgeHits",
    "Average_hitsOffload",
    "ReportDataFound",
];

const NOT_AVAILABLE: &str = "N/A";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Reporting window: from midnight `start_days_ago` days back to 23:00
/// `end_days_ago` days back, both UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl ReportWindow {
    pub fn days_ago(now: DateTime<Utc>, start_days_ago: u32, end_days_ago: u32) -> Self {
        let start_day = (now - Duration::days(i64::from(start_days_ago))).date_naive();
        let end_day = (now - Duration::days(i64::from(end_days_ago))).date_naive();
        Self {
            start: start_day.and_time(NaiveTime::MIN).and_utc(),
            end: (end_day.and_time(NaiveTime::MIN) + Duration::hours(23)).and_utc(),
        }
    }

    pub fn start_param(&self) -> String {
        self.start.format(TIMESTAMP_FORMAT).to_string()
    }

    pub fn end_param(&self) -> String {
        self.end.format(TIMESTAMP_FORMAT).to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrafficAverages {
    pub edge_hits: f64,
    pub hits_offload: f64,
}

/// True when the report carries a non-empty `data` array.
pub fn has_report_data(report: &Value) -> bool {
    report
        .get("data")
        .and_then(Value::as_array)
        .is_some_and(|data| !data.is_empty())
}

/// Mean `edgeHits` and `hitsOffload` over the entries where both metrics
/// are numeric. `None` when no entry qualifies.
pub fn calculate_averages(report: &Value) -> Option<TrafficAverages> {
    let data = report.get("data")?.as_array()?;

    let samples: Vec<(f64, f64)> = data
        .iter()
        .filter_map(|entry| {
            let edge = metric(entry, "edgeHits")?;
            let offload = metric(entry, "hitsOffload")?;
            Some((edge, offload))
        })
        .collect();

    if samples.is_empty() {
        return None;
    }

    let count = samples.len() as f64;
    let (edge_total, offload_total) = samples
        .iter()
        .fold((0.0, 0.0), |(e, o), (edge, offload)| (e + edge, o + offload));

    Some(TrafficAverages {
        edge_hits: edge_total / count,
        hits_offload: offload_total / count,
    })
}

pub fn summary_row(cpcode: &str, averages: Option<&TrafficAverages>) -> Row {
    let (edge, offload, found) = match averages {
        Some(avg) => (
            format!("{:.2}", avg.edge_hits),
            format!("{:.2}", avg.hits_offload),
            "Yes",
        ),
        None => (NOT_AVAILABLE.to_string(), NOT_AVAILABLE.to_string(), "No"),
    };

    TRAFFIC_COLUMNS
        .into_iter()
        .zip([cpcode.to_string(), edge, offload, found.to_string()])
        .collect()
}

fn metric(entry: &Value, name: &str) -> Option<f64> {
    match entry.get(name)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
