use crate::calc;
use crate::form::{self, FormInput};
use crate::ipc::error::{dialog_err, err, ok};
use crate::ipc::types::{AppState, Request};
use crate::view::DashboardView;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde_json::{json, Value};

/// Form fields arrive as raw text; numbers are accepted too and stringified.
fn raw_text(v: Option<&Value>) -> String {
    match v {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

fn parse_form(state: &AppState, req: &Request) -> Result<FormInput, Value> {
    let Some(marks) = req.params.get("marks").and_then(|v| v.as_array()) else {
        return Err(err(&req.id, "bad_params", "missing marks", None));
    };
    let expected = state.config.subject_count();
    if marks.len() != expected {
        return Err(err(
            &req.id,
            "bad_params",
            format!("marks must have {} entries", expected),
            Some(json!({ "subjects": state.config.subjects, "got": marks.len() })),
        ));
    }
    Ok(FormInput {
        name: raw_text(req.params.get("name")),
        roll_number: raw_text(req.params.get("roll")),
        class_name: raw_text(req.params.get("className")),
        attendance: raw_text(req.params.get("attendance")),
        marks: marks.iter().map(|v| raw_text(Some(v))).collect(),
    })
}

fn view_json(req: &Request, view: &DashboardView) -> Value {
    match serde_json::to_value(view) {
        Ok(v) => ok(&req.id, v),
        Err(e) => err(&req.id, "internal", e.to_string(), None),
    }
}

fn handle_dashboard_generate(state: &mut AppState, req: &Request) -> Value {
    let input = match parse_form(state, req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    let seed = match req.params.get("seed") {
        None | Some(Value::Null) => None,
        Some(v) => match v.as_u64() {
            Some(s) => Some(s),
            None => {
                return err(
                    &req.id,
                    "bad_params",
                    "seed must be a non-negative integer",
                    None,
                )
            }
        },
    };

    // A rejected form leaves the previous report (and export state) alone.
    let student = match form::validate_form(&input, &state.config) {
        Ok(v) => v,
        Err(e) => {
            tracing::warn!(code = e.code(), "form rejected: {}", e);
            return dialog_err(&req.id, &e);
        }
    };

    let report = match seed {
        Some(s) => calc::build_report(&mut ChaCha8Rng::seed_from_u64(s), student, &state.config),
        None => calc::build_report(&mut state.rng, student, &state.config),
    };
    tracing::info!(
        report_id = %report.report_id,
        total = report.total,
        grade = report.grade.as_str(),
        "dashboard generated"
    );
    let view = DashboardView::for_report(&report);
    state.report = Some(report);
    view_json(req, &view)
}

fn handle_dashboard_get(state: &mut AppState, req: &Request) -> Value {
    view_json(req, &DashboardView::for_state(state.report.as_ref()))
}

fn handle_dashboard_clear(state: &mut AppState, req: &Request) -> Value {
    if let Some(prev) = state.report.take() {
        tracing::info!(report_id = %prev.report_id, "dashboard cleared");
    }
    view_json(req, &DashboardView::empty())
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<Value> {
    match req.method.as_str() {
        "dashboard.generate" => Some(handle_dashboard_generate(state, req)),
        "dashboard.get" => Some(handle_dashboard_get(state, req)),
        "dashboard.clear" => Some(handle_dashboard_clear(state, req)),
        _ => None,
    }
}
