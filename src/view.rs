//! Display models handed to the front-end. Every string the user can see on the
//! dashboard is formatted here, and the PDF export reuses the same formatters so
//! the two never disagree.

use serde::Serialize;

use crate::calc::{LeaderboardEntry, Report};

pub const PLACEHOLDER: &str = "--";
pub const NOT_AVAILABLE: &str = "N/A";

const STRONG_ALPHA: f64 = 0.95;
const MUTED_ALPHA: f64 = 0.6;

/// Rounds to 2 places and prints the shortest decimal, so 528.0 prints as "528".
pub fn format_number(v: f64) -> String {
    let rounded = (v * 100.0).round() / 100.0;
    if rounded == 0.0 {
        // avoid "-0"
        return "0".to_string();
    }
    format!("{}", rounded)
}

pub fn format_total(total: f64, max_total: u32) -> String {
    format!("{} / {}", format_number(total), max_total)
}

pub fn format_percent(v: f64) -> String {
    format!("{:.2}%", v)
}

pub fn format_gpa(gpa: f64) -> String {
    format!("{:.2}", gpa)
}

pub fn format_attendance(attendance: Option<f64>) -> String {
    match attendance {
        Some(a) => format!("{:.1}%", a),
        None => NOT_AVAILABLE.to_string(),
    }
}

pub fn format_leaderboard_row(entry: &LeaderboardEntry) -> String {
    format!(
        "{}. {} - {} ({:.1}%)",
        entry.rank,
        entry.display_name,
        format_number(entry.total),
        entry.average
    )
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Cards {
    pub total: String,
    pub average: String,
    pub grade: String,
    pub attendance: String,
    pub class_average: String,
}

impl Cards {
    pub fn placeholder() -> Self {
        Self {
            total: PLACEHOLDER.to_string(),
            average: PLACEHOLDER.to_string(),
            grade: PLACEHOLDER.to_string(),
            attendance: PLACEHOLDER.to_string(),
            class_average: format!("Class Avg : {}", PLACEHOLDER),
        }
    }

    pub fn for_report(report: &Report) -> Self {
        Self {
            total: format_total(report.total, report.max_total),
            average: format_percent(report.average),
            grade: format!("{}  ({})", report.grade.as_str(), format_gpa(report.gpa)),
            attendance: format_attendance(report.student.attendance_percent),
            class_average: format!("Class Avg : {}", format_percent(report.class_average)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum BarEmphasis {
    Strong,
    Muted,
}

impl BarEmphasis {
    pub fn alpha(self) -> f64 {
        match self {
            BarEmphasis::Strong => STRONG_ALPHA,
            BarEmphasis::Muted => MUTED_ALPHA,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendPoint {
    pub x: usize,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Bar {
    pub label: String,
    pub value: f64,
    pub emphasis: BarEmphasis,
    pub alpha: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Charts {
    pub trend_title: String,
    pub trend: Vec<TrendPoint>,
    pub tick_labels: Vec<String>,
    pub bar_title: String,
    pub bars: Vec<Bar>,
    pub y_min: f64,
    pub y_max: f64,
}

impl Charts {
    pub fn for_report(report: &Report) -> Self {
        let trend = report
            .subjects
            .iter()
            .enumerate()
            .map(|(i, s)| TrendPoint { x: i + 1, y: s.mark })
            .collect();
        let bars = report
            .subjects
            .iter()
            .map(|s| {
                let emphasis = if s.mark >= report.average {
                    BarEmphasis::Strong
                } else {
                    BarEmphasis::Muted
                };
                Bar {
                    label: s.subject.clone(),
                    value: s.mark,
                    emphasis,
                    alpha: emphasis.alpha(),
                }
            })
            .collect();
        Self {
            trend_title: "Performance Trend".to_string(),
            trend,
            tick_labels: report.subjects.iter().map(|s| s.subject.clone()).collect(),
            bar_title: "Marks by Subject".to_string(),
            bars,
            y_min: 0.0,
            y_max: report.max_mark as f64,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardRow {
    pub label: String,
    #[serde(flatten)]
    pub entry: LeaderboardEntry,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardView {
    pub report_id: Option<String>,
    pub export_enabled: bool,
    pub cards: Cards,
    pub charts: Option<Charts>,
    pub leaderboard: Vec<LeaderboardRow>,
}

impl DashboardView {
    pub fn empty() -> Self {
        Self {
            report_id: None,
            export_enabled: false,
            cards: Cards::placeholder(),
            charts: None,
            leaderboard: Vec::new(),
        }
    }

    pub fn for_report(report: &Report) -> Self {
        Self {
            report_id: Some(report.report_id.clone()),
            export_enabled: true,
            cards: Cards::for_report(report),
            charts: Some(Charts::for_report(report)),
            leaderboard: report
                .leaderboard
                .iter()
                .map(|e| LeaderboardRow {
                    label: format_leaderboard_row(e),
                    entry: e.clone(),
                })
                .collect(),
        }
    }

    pub fn for_state(report: Option<&Report>) -> Self {
        report.map(Self::for_report).unwrap_or_else(Self::empty)
    }
}
