use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::ops::RangeInclusive;

pub const DEFAULT_SUBJECTS: [&str; 6] = [
    "Maths",
    "Physics",
    "Chemistry",
    "English",
    "Computer",
    "History",
];

const MAX_SUBJECTS: usize = 12;

/// Session configuration. Lives in memory only; every process starts from
/// `DashboardConfig::default()`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardConfig {
    pub subjects: Vec<String>,
    pub max_mark: u32,
    pub peer_count: u32,
    pub peer_total_min: Option<u32>,
    pub peer_total_max: Option<u32>,
    pub current_student_suffix: String,
    pub margin_mm: u32,
    pub show_generated_at: bool,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            subjects: DEFAULT_SUBJECTS.iter().map(|s| s.to_string()).collect(),
            max_mark: 100,
            peer_count: 7,
            peer_total_min: None,
            peer_total_max: None,
            current_student_suffix: "(You)".to_string(),
            margin_mm: 12,
            show_generated_at: false,
        }
    }
}

impl DashboardConfig {
    pub fn subject_count(&self) -> usize {
        self.subjects.len()
    }

    pub fn max_total(&self) -> u32 {
        self.subject_count() as u32 * self.max_mark
    }

    /// Integer totals handed out to simulated peers. Defaults to 13/30..29/30 of
    /// the max total, which is 260..=580 for six subjects out of 100.
    pub fn peer_total_range(&self) -> RangeInclusive<u32> {
        let (lo, hi) = self.peer_bounds();
        lo..=hi
    }

    /// Peer bounds with the defaults filled in for unset ends. `apply_patch`
    /// keeps `lo <= hi`.
    fn peer_bounds(&self) -> (u32, u32) {
        let max_total = self.max_total();
        (
            self.peer_total_min.unwrap_or(max_total * 13 / 30),
            self.peer_total_max.unwrap_or(max_total * 29 / 30),
        )
    }

    /// Applies a partial JSON patch. The patch is validated as a whole against a
    /// copy, so a bad key leaves `self` untouched.
    pub fn apply_patch(&mut self, patch: &Map<String, Value>) -> Result<(), String> {
        let mut next = self.clone();
        for (k, v) in patch {
            match k.as_str() {
                "subjects" => {
                    next.subjects = parse_subjects(v)?;
                }
                "maxMark" => {
                    next.max_mark = parse_u32_range(v, k, 1, 1000)?;
                }
                "peerCount" => {
                    next.peer_count = parse_u32_range(v, k, 0, 50)?;
                }
                "peerTotalMin" => {
                    next.peer_total_min = parse_nullable_u32(v, k)?;
                }
                "peerTotalMax" => {
                    next.peer_total_max = parse_nullable_u32(v, k)?;
                }
                "currentStudentSuffix" => {
                    next.current_student_suffix = parse_string_max(v, k, 24)?;
                }
                "marginMm" => {
                    next.margin_mm = parse_u32_range(v, k, 5, 30)?;
                }
                "showGeneratedAt" => {
                    next.show_generated_at = v
                        .as_bool()
                        .ok_or_else(|| format!("{} must be boolean", k))?;
                }
                _ => return Err(format!("unknown setup field: {}", k)),
            }
        }

        let max_total = next.max_total();
        for (key, bound) in [
            ("peerTotalMin", next.peer_total_min),
            ("peerTotalMax", next.peer_total_max),
        ] {
            if let Some(b) = bound {
                if b > max_total {
                    return Err(format!("{} must be <= {}", key, max_total));
                }
            }
        }
        let (lo, hi) = next.peer_bounds();
        if lo > hi {
            return Err(format!(
                "peerTotalMin ({}) must be <= peerTotalMax ({})",
                lo, hi
            ));
        }

        *self = next;
        Ok(())
    }
}

fn parse_u32_range(v: &Value, key: &str, min: u32, max: u32) -> Result<u32, String> {
    let n = v
        .as_u64()
        .ok_or_else(|| format!("{} must be a non-negative integer", key))?;
    if n < min as u64 || n > max as u64 {
        return Err(format!("{} must be in {}..={}", key, min, max));
    }
    Ok(n as u32)
}

fn parse_nullable_u32(v: &Value, key: &str) -> Result<Option<u32>, String> {
    if v.is_null() {
        return Ok(None);
    }
    parse_u32_range(v, key, 0, u32::MAX).map(Some)
}

fn parse_string_max(v: &Value, key: &str, max_len: usize) -> Result<String, String> {
    let s = v.as_str().ok_or_else(|| format!("{} must be string", key))?;
    let s = s.trim();
    if s.len() > max_len {
        return Err(format!("{} length must be <= {}", key, max_len));
    }
    Ok(s.to_string())
}

fn parse_subjects(v: &Value) -> Result<Vec<String>, String> {
    let arr = v
        .as_array()
        .ok_or_else(|| "subjects must be an array".to_string())?;
    if arr.is_empty() || arr.len() > MAX_SUBJECTS {
        return Err(format!("subjects must have 1..={} entries", MAX_SUBJECTS));
    }
    let mut out: Vec<String> = Vec::with_capacity(arr.len());
    for item in arr {
        let s = parse_string_max(item, "subjects[]", 40)?;
        if s.is_empty() {
            return Err("subject names must not be empty".into());
        }
        if out.iter().any(|existing| existing.eq_ignore_ascii_case(&s)) {
            return Err(format!("duplicate subject: {}", s));
        }
        out.push(s);
    }
    Ok(out)
}
