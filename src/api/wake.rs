//! Machine diagnosis and read-only re-probe endpoints.

use crate::aggregator::{AggregatorError, MachineSummary, WakeReport};
use crate::api::{ApiError, AppState};
use crate::diagnosis::diagnose;
use crate::probe::ProbeStatus;
use axum::{
    extract::{rejection::JsonRejection, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub struct DiagnoseQuery {
    pub machine: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct WakeRequest {
    pub machine: Option<String>,
    pub service: Option<String>,
}

/// Body of `GET /wake`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosisResponse {
    pub machine: String,
    pub ip: String,
    pub host_reachable: bool,
    pub services: Vec<DiagnosedService>,
    pub all_up: bool,
    pub diagnosis: String,
    pub fix_steps: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosedService {
    pub name: String,
    pub port: u16,
    /// `up` or `slow`
    pub up: bool,
    pub status: ProbeStatus,
    pub latency: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_cmd: Option<String>,
}

impl From<MachineSummary> for DiagnosisResponse {
    fn from(summary: MachineSummary) -> Self {
        let verdict = diagnose(&summary);
        Self {
            services: summary
                .services
                .into_iter()
                .map(|check| DiagnosedService {
                    up: check.result.status.is_responding(),
                    status: check.result.status,
                    latency: check.result.latency_ms(),
                    name: check.spec.name,
                    port: check.spec.port,
                    detail: check.result.detail,
                    start_cmd: check.spec.start_cmd,
                })
                .collect(),
            machine: summary.machine,
            ip: summary.host,
            host_reachable: summary.host_reachable,
            all_up: summary.all_up,
            diagnosis: verdict.diagnosis,
            fix_steps: verdict.fix_steps,
        }
    }
}

fn require_machine(machine: Option<String>) -> Result<String, ApiError> {
    machine
        .filter(|m| !m.is_empty())
        .ok_or_else(|| AggregatorError::UnknownMachine(String::new()).into())
}

/// GET /wake?machine=ID - Probe one machine and diagnose it.
pub async fn diagnose_machine(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DiagnoseQuery>,
) -> Result<Json<DiagnosisResponse>, ApiError> {
    let machine = require_machine(query.machine)?;
    let summary = state.aggregator.check_machine(&machine).await?;
    Ok(Json(summary.into()))
}

/// POST /wake - Re-probe one service or every service of a machine.
pub async fn wake(
    State(state): State<Arc<AppState>>,
    body: Result<Json<WakeRequest>, JsonRejection>,
) -> Result<Json<WakeReport>, ApiError> {
    let Json(request) = body?;
    let machine = require_machine(request.machine)?;

    let report = state
        .aggregator
        .wake(&machine, request.service.as_deref())
        .await?;
    Ok(Json(report))
}
