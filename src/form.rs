use serde::Serialize;

use crate::config::DashboardConfig;

/// Raw text exactly as typed into the form.
#[derive(Debug, Clone, Default)]
pub struct FormInput {
    pub name: String,
    pub roll_number: String,
    pub class_name: String,
    pub attendance: String,
    pub marks: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentRecord {
    pub name: String,
    pub roll_number: String,
    pub class_name: String,
    pub attendance_percent: Option<f64>,
    pub marks: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FormError {
    #[error("Please fill in Name, Roll and Class.")]
    MissingInfo { missing: Vec<&'static str> },

    #[error("Please enter valid marks (0-{max_mark}) for all subjects.")]
    InvalidMarks {
        subject: String,
        raw: String,
        max_mark: u32,
    },
}

impl FormError {
    pub fn code(&self) -> &'static str {
        match self {
            FormError::MissingInfo { .. } => "missing_info",
            FormError::InvalidMarks { .. } => "invalid_input",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            FormError::MissingInfo { .. } => "Missing Info",
            FormError::InvalidMarks { .. } => "Invalid Input",
        }
    }
}

/// Lenient float parse: anything that is not a finite number is `None`.
pub fn parse_number(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Validates the form against `config`. Marks are checked first, in subject
/// order; the first bad mark stops validation. `input.marks` must already hold
/// one entry per configured subject.
pub fn validate_form(
    input: &FormInput,
    config: &DashboardConfig,
) -> Result<StudentRecord, FormError> {
    let max_mark = config.max_mark as f64;
    let mut marks: Vec<f64> = Vec::with_capacity(input.marks.len());
    for (subject, raw) in config.subjects.iter().zip(input.marks.iter()) {
        match parse_number(raw) {
            Some(m) if (0.0..=max_mark).contains(&m) => marks.push(m),
            _ => {
                return Err(FormError::InvalidMarks {
                    subject: subject.clone(),
                    raw: raw.clone(),
                    max_mark: config.max_mark,
                })
            }
        }
    }

    let name = input.name.trim();
    let roll_number = input.roll_number.trim();
    let class_name = input.class_name.trim();
    let missing: Vec<&'static str> = [
        ("name", name),
        ("roll", roll_number),
        ("className", class_name),
    ]
    .into_iter()
    .filter(|(_, v)| v.is_empty())
    .map(|(k, _)| k)
    .collect();
    if !missing.is_empty() {
        return Err(FormError::MissingInfo { missing });
    }

    Ok(StudentRecord {
        name: name.to_string(),
        roll_number: roll_number.to_string(),
        class_name: class_name.to_string(),
        attendance_percent: parse_number(&input.attendance),
        marks,
    })
}
