use crate::export::ExportError;
use crate::form::FormError;
use serde::Serialize;
use serde_json::{json, Map, Value};
use std::fmt;

/// One response line. `id` is absent only when the request line could not be
/// parsed far enough to read it.
#[derive(Debug, Serialize)]
struct Envelope<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<&'a str>,
    ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<ErrorBody<'a>>,
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    code: &'a str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<Value>,
}

fn encode(envelope: Envelope<'_>) -> Value {
    serde_json::to_value(&envelope).unwrap_or_else(|e| {
        json!({ "ok": false, "error": { "code": "internal", "message": e.to_string() } })
    })
}

pub fn ok(id: &str, result: Value) -> Value {
    encode(Envelope {
        id: Some(id),
        ok: true,
        result: Some(result),
        error: None,
    })
}

pub fn err(id: &str, code: &str, message: impl Into<String>, details: Option<Value>) -> Value {
    encode(Envelope {
        id: Some(id),
        ok: false,
        result: None,
        error: Some(ErrorBody {
            code,
            message: message.into(),
            details,
        }),
    })
}

/// Reply for a line that is not a request at all.
pub fn bad_json(message: impl Into<String>) -> Value {
    encode(Envelope {
        id: None,
        ok: false,
        result: None,
        error: Some(ErrorBody {
            code: "bad_json",
            message: message.into(),
            details: None,
        }),
    })
}

/// Errors the front-end shows in a dialog: `code` picks the handling, `title`
/// heads the dialog, `Display` is its body.
pub trait DialogError: fmt::Display {
    fn code(&self) -> &'static str;
    fn title(&self) -> &'static str;
    fn add_details(&self, _details: &mut Map<String, Value>) {}
}

/// Error envelope for a [`DialogError`]; `details.title` is always set.
pub fn dialog_err(id: &str, e: &dyn DialogError) -> Value {
    let mut details = Map::new();
    details.insert("title".into(), json!(e.title()));
    e.add_details(&mut details);
    err(id, e.code(), e.to_string(), Some(Value::Object(details)))
}

impl DialogError for FormError {
    fn code(&self) -> &'static str {
        FormError::code(self)
    }

    fn title(&self) -> &'static str {
        FormError::title(self)
    }

    fn add_details(&self, details: &mut Map<String, Value>) {
        match self {
            FormError::MissingInfo { missing } => {
                details.insert("missing".into(), json!(missing));
            }
            FormError::InvalidMarks {
                subject,
                raw,
                max_mark,
            } => {
                details.insert("subject".into(), json!(subject));
                details.insert("value".into(), json!(raw));
                details.insert("min".into(), json!(0));
                details.insert("max".into(), json!(max_mark));
            }
        }
    }
}

impl DialogError for ExportError {
    fn code(&self) -> &'static str {
        ExportError::code(self)
    }

    fn title(&self) -> &'static str {
        ExportError::title(self)
    }

    fn add_details(&self, details: &mut Map<String, Value>) {
        match self {
            ExportError::StaleReport { requested, current } => {
                details.insert("requested".into(), json!(requested));
                details.insert("current".into(), json!(current));
            }
            ExportError::Write { path, .. } => {
                details.insert("path".into(), json!(path.to_string_lossy()));
            }
            ExportError::NoReport => {}
        }
    }
}
