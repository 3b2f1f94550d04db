use std::collections::BTreeMap;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use super::AdminState;
use crate::engine::Rule;
use crate::observability::metrics;

/// One rule as listed by the API, hit count included.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleEntry {
    pub host: String,
    pub target: String,
    pub is_template: bool,
    pub hits: u64,
}

fn entry(state: &AdminState, rule: Rule) -> RuleEntry {
    RuleEntry {
        hits: state.engine.visits(&rule.host),
        host: rule.host,
        target: rule.target,
        is_template: rule.is_template,
    }
}

pub async fn list_rules(
    State(state): State<AdminState>,
) -> Result<Json<BTreeMap<String, RuleEntry>>, Response> {
    let rules = state
        .store
        .all()
        .map_err(|err| (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()).into_response())?;

    let mut listing = BTreeMap::new();
    for rule in rules {
        listing.insert(rule.host.clone(), entry(&state, rule));
    }
    Ok(Json(listing))
}

pub async fn get_rule(State(state): State<AdminState>, Path(host): Path<String>) -> Response {
    match state.store.get(&host) {
        Some(rule) => Json(entry(&state, rule)).into_response(),
        None => (StatusCode::NOT_FOUND, "no such rule").into_response(),
    }
}

pub async fn upsert_rule(State(state): State<AdminState>, Json(mut rule): Json<Rule>) -> Response {
    rule.host = strip_scheme(&rule.host).to_string();
    rule.target = strip_scheme(&rule.target).to_string();

    if rule.host.is_empty() {
        return (StatusCode::BAD_REQUEST, "rule host must not be empty").into_response();
    }
    if rule.is_template {
        // Reject broken templates at submission instead of failing the
        // table build afterwards.
        if let Err(err) = handlebars::Template::compile(&rule.target) {
            return (
                StatusCode::BAD_REQUEST,
                format!("invalid target template: {err}"),
            )
                .into_response();
        }
    }

    tracing::info!(
        host = %rule.host,
        target = %rule.target,
        template = rule.is_template,
        "admin rule upsert"
    );
    if let Err(err) = state.store.set(rule) {
        return (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()).into_response();
    }
    publish(&state)
}

pub async fn delete_rule(State(state): State<AdminState>, Path(host): Path<String>) -> Response {
    tracing::info!(host = %host, "admin rule delete");
    if let Err(err) = state.store.remove(&host) {
        return (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()).into_response();
    }
    publish(&state)
}

/// Rebuild the engine table from the store after a mutation.
fn publish(state: &AdminState) -> Response {
    let rules = match state.store.all() {
        Ok(rules) => rules,
        Err(err) => return (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()).into_response(),
    };

    match state.engine.reload(&rules) {
        Ok(()) => {
            metrics::record_reload("success");
            metrics::record_rule_count(state.engine.rule_count());
            StatusCode::NO_CONTENT.into_response()
        }
        Err(err) => {
            metrics::record_reload("build_failure");
            (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()).into_response()
        }
    }
}

/// Hosts and targets are stored without a scheme; pasted URLs lose theirs.
fn strip_scheme(value: &str) -> &str {
    let value = value.trim();
    for scheme in ["http://", "https://"] {
        if let Some(stripped) = value.strip_prefix(scheme) {
            return stripped;
        }
    }
    value
}
