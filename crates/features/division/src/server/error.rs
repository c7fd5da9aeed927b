use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use cohort_domain::division::ErrorBody;
use std::borrow::Cow;
use tracing::{error, warn};

/// Division engine failures. Each maps to a status code and an `{"error": "..."}` body.
#[cohort_derive::cohort_error]
pub enum EngineError {
    #[error("Invalid configuration{}: {message}", format_context(.context))]
    InvalidConfig { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// The rules cannot be honored for this population at all.
    #[error("Infeasible configuration{}: {message}", format_context(.context))]
    Infeasible { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Unknown group{}: {message}", format_context(.context))]
    UnknownGroup { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// Unknown or expired job id.
    #[error("Division job not found{}: {message}", format_context(.context))]
    JobNotFound { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Division job belongs to another group{}: {message}", format_context(.context))]
    ForeignJob { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// The preview placed nobody, so there is nothing to persist.
    #[error("Empty division{}: {message}", format_context(.context))]
    EmptyDivision { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Nothing to undo{}: {message}", format_context(.context))]
    NothingToUndo { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Nothing to export{}: {message}", format_context(.context))]
    NothingToExport { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// The roster file could not be read or parsed.
    #[error("Roster error{}: {message}", format_context(.context))]
    Roster { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Malformed request body{}: {source}", format_context(.context))]
    Body { source: JsonRejection, context: Option<Cow<'static, str>> },

    #[error("Malformed query{}: {source}", format_context(.context))]
    Query { source: QueryRejection, context: Option<Cow<'static, str>> },

    #[error("Malformed path{}: {source}", format_context(.context))]
    Path { source: PathRejection, context: Option<Cow<'static, str>> },

    #[error("Internal engine error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

impl EngineError {
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::InvalidConfig { .. }
            | Self::Infeasible { .. }
            | Self::ForeignJob { .. }
            | Self::EmptyDivision { .. }
            | Self::NothingToUndo { .. }
            | Self::Body { .. }
            | Self::Query { .. }
            | Self::Path { .. } => StatusCode::BAD_REQUEST,
            Self::UnknownGroup { .. } | Self::JobNotFound { .. } | Self::NothingToExport { .. } => {
                StatusCode::NOT_FOUND
            },
            Self::Roster { .. } | Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for EngineError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, "Division request failed");
        } else {
            warn!(%status, error = %self, "Division request rejected");
        }
        (status, Json(ErrorBody { error: self.to_string() })).into_response()
    }
}
