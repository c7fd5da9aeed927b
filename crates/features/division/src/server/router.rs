use super::handlers;
use cohort_kernel::server::ApiState;
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

/// Subgroup division routes, scoped under `/groups/{group_id}/subgroups`.
pub fn division_router() -> OpenApiRouter<ApiState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::generate_handler))
        .routes(routes!(handlers::confirm_handler))
        .routes(routes!(handlers::undo_handler))
        .routes(routes!(handlers::export_handler))
        .routes(routes!(handlers::list_handler))
}
