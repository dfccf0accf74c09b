use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request};
use serde_json::json;

fn config_json(state: &AppState, req: &Request) -> serde_json::Value {
    match serde_json::to_value(&state.config) {
        Ok(v) => ok(&req.id, v),
        Err(e) => err(&req.id, "internal", e.to_string(), None),
    }
}

fn handle_setup_get(state: &mut AppState, req: &Request) -> serde_json::Value {
    config_json(state, req)
}

fn handle_setup_update(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(patch_obj) = req.params.get("patch").and_then(|v| v.as_object()) else {
        return err(&req.id, "bad_params", "patch must be an object", None);
    };
    if let Err(msg) = state.config.apply_patch(patch_obj) {
        tracing::warn!(%msg, "rejected setup patch");
        return err(
            &req.id,
            "bad_params",
            msg,
            Some(json!({ "patch": req.params.get("patch") })),
        );
    }
    tracing::info!(
        subjects = state.config.subject_count(),
        max_mark = state.config.max_mark,
        peers = state.config.peer_count,
        "setup updated"
    );
    config_json(state, req)
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "setup.get" => Some(handle_setup_get(state, req)),
        "setup.update" => Some(handle_setup_update(state, req)),
        _ => None,
    }
}
