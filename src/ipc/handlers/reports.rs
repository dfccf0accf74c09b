use crate::calc::Report;
use crate::export::{self, ExportError};
use crate::ipc::error::{dialog_err, ok};
use crate::ipc::types::{AppState, Request};
use serde_json::{json, Value};
use std::path::PathBuf;

/// The report to export: the current one, optionally pinned by `reportId` so a
/// front-end never exports something other than what it shows.
fn current_report<'a>(state: &'a AppState, req: &Request) -> Result<&'a Report, ExportError> {
    let report = state.report.as_ref().ok_or(ExportError::NoReport)?;
    if let Some(requested) = req.params.get("reportId").and_then(|v| v.as_str()) {
        if requested != report.report_id {
            return Err(ExportError::StaleReport {
                requested: requested.to_string(),
                current: report.report_id.clone(),
            });
        }
    }
    Ok(report)
}

fn handle_reports_document_model(state: &mut AppState, req: &Request) -> Value {
    let report = match current_report(state, req) {
        Ok(v) => v,
        Err(e) => return dialog_err(&req.id, &e),
    };
    let ops = export::build_document(report, &state.config);
    ok(
        &req.id,
        json!({
            "reportId": report.report_id,
            "ops": ops,
        }),
    )
}

fn handle_reports_export_pdf(state: &mut AppState, req: &Request) -> Value {
    let report = match current_report(state, req) {
        Ok(v) => v,
        Err(e) => {
            tracing::warn!(code = e.code(), "export refused: {}", e);
            return dialog_err(&req.id, &e);
        }
    };

    // No path means the save dialog was cancelled.
    let path = req
        .params
        .get("path")
        .and_then(|v| v.as_str())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(PathBuf::from);
    let Some(path) = path else {
        return ok(
            &req.id,
            json!({ "saved": false, "cancelled": true, "path": null }),
        );
    };

    match export::export_report(report, &state.config, &path) {
        Ok(out) => {
            let shown = out.to_string_lossy().to_string();
            tracing::info!(report_id = %report.report_id, path = %shown, "report exported");
            ok(
                &req.id,
                json!({
                    "saved": true,
                    "cancelled": false,
                    "path": shown,
                    "message": format!("Report exported successfully to:\n{}", shown),
                }),
            )
        }
        Err(e) => {
            tracing::error!(path = %path.to_string_lossy(), "export failed: {}", e);
            dialog_err(&req.id, &e)
        }
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<Value> {
    match req.method.as_str() {
        "reports.documentModel" => Some(handle_reports_document_model(state, req)),
        "reports.exportPdf" => Some(handle_reports_export_pdf(state, req)),
        _ => None,
    }
}
