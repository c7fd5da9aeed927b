use crate::server::error::EngineError;
use crate::server::export;
use crate::server::partition;
use crate::server::slice::Division;
use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::header;
use axum::response::IntoResponse;
use cohort_domain::SUBGROUPS_TAG;
use cohort_domain::division::{
    ConfirmRequest, ConfirmResponse, DivisionConfig, DivisionJob, ErrorBody, Subgroup, UndoResponse,
};
use cohort_kernel::opaque_id;
use cohort_kernel::server::ApiState;
use serde::Deserialize;
use tracing::info;

#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ExportQuery {
    /// Pending or confirmed job to render; all persisted subgroups when omitted.
    pub job_id: Option<String>,
}

fn slice(state: &ApiState) -> Result<&Division, EngineError> {
    state.try_get_slice::<Division>().map_err(|e| EngineError::Internal {
        message: e.to_string().into(),
        context: None,
    })
}

#[utoipa::path(
    post,
    path = "/groups/{group_id}/subgroups/generate",
    params(("group_id" = u64, Path, description = "Parent group")),
    request_body = DivisionConfig,
    responses(
        (status = OK, description = "Proposed partition", body = DivisionJob),
        (status = BAD_REQUEST, description = "Invalid or infeasible configuration", body = ErrorBody),
        (status = NOT_FOUND, description = "Unknown group", body = ErrorBody),
    ),
    tag = SUBGROUPS_TAG,
)]
pub(super) async fn generate_handler(
    State(state): State<ApiState>,
    group_id: Result<Path<u64>, PathRejection>,
    config: Result<Json<DivisionConfig>, JsonRejection>,
) -> Result<Json<DivisionJob>, EngineError> {
    let Path(group_id) = group_id?;
    let Json(config) = config?;
    let division = slice(&state)?;

    let members = division.roster.members(group_id)?;
    let job = partition::generate(&members, &config, division.repair_iterations, opaque_id!())?;
    info!(
        group_id,
        job_id = %job.job_id,
        groups = job.groups.len(),
        unfulfilled = job.unfulfilled_rules.len(),
        "Division generated"
    );

    division.store.save_pending(group_id, job.clone());
    Ok(Json(job))
}

#[utoipa::path(
    post,
    path = "/groups/{group_id}/subgroups/confirm",
    params(("group_id" = u64, Path, description = "Parent group")),
    request_body = ConfirmRequest,
    responses(
        (status = OK, description = "Subgroups persisted", body = ConfirmResponse),
        (status = BAD_REQUEST, description = "Job belongs to another group or holds no groups", body = ErrorBody),
        (status = NOT_FOUND, description = "Unknown or expired job", body = ErrorBody),
    ),
    tag = SUBGROUPS_TAG,
)]
pub(super) async fn confirm_handler(
    State(state): State<ApiState>,
    group_id: Result<Path<u64>, PathRejection>,
    request: Result<Json<ConfirmRequest>, JsonRejection>,
) -> Result<Json<ConfirmResponse>, EngineError> {
    let Path(group_id) = group_id?;
    let Json(request) = request?;
    let division = slice(&state)?;

    let subgroups = division.store.confirm(group_id, &request.job_id)?;
    Ok(Json(ConfirmResponse { redirect_url: division.redirect_url(group_id), subgroups }))
}

#[utoipa::path(
    post,
    path = "/groups/{group_id}/subgroups/undo",
    params(("group_id" = u64, Path, description = "Parent group")),
    responses(
        (status = OK, description = "Most recent division removed", body = UndoResponse),
        (status = BAD_REQUEST, description = "Nothing to undo", body = ErrorBody),
    ),
    tag = SUBGROUPS_TAG,
)]
pub(super) async fn undo_handler(
    State(state): State<ApiState>,
    group_id: Result<Path<u64>, PathRejection>,
) -> Result<Json<UndoResponse>, EngineError> {
    let Path(group_id) = group_id?;
    Ok(Json(slice(&state)?.store.undo(group_id)?))
}

#[utoipa::path(
    get,
    path = "/groups/{group_id}/subgroups/export",
    params(("group_id" = u64, Path, description = "Parent group"), ExportQuery),
    responses(
        (status = OK, description = "CSV attachment", content_type = "text/csv", body = String),
        (status = NOT_FOUND, description = "Nothing to export", body = ErrorBody),
    ),
    tag = SUBGROUPS_TAG,
)]
pub(super) async fn export_handler(
    State(state): State<ApiState>,
    group_id: Result<Path<u64>, PathRejection>,
    query: Result<Query<ExportQuery>, QueryRejection>,
) -> Result<impl IntoResponse, EngineError> {
    let Path(group_id) = group_id?;
    let Query(query) = query?;

    let csv = slice(&state)?.store.export(group_id, query.job_id.as_deref())?;
    let disposition = format!("attachment; filename=\"{}\"", export::filename(group_id));
    let headers = [
        (header::CONTENT_TYPE, export::CONTENT_TYPE.to_owned()),
        (header::CONTENT_DISPOSITION, disposition),
    ];
    Ok((headers, csv))
}

#[utoipa::path(
    get,
    path = "/groups/{group_id}/subgroups",
    params(("group_id" = u64, Path, description = "Parent group")),
    responses((status = OK, description = "Persisted subgroups", body = Vec<Subgroup>)),
    tag = SUBGROUPS_TAG,
)]
pub(super) async fn list_handler(
    State(state): State<ApiState>,
    group_id: Result<Path<u64>, PathRejection>,
) -> Result<Json<Vec<Subgroup>>, EngineError> {
    let Path(group_id) = group_id?;
    Ok(Json(slice(&state)?.store.subgroups(group_id)))
}
