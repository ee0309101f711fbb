//! API error mapping, grounded on `atomic-api::error`: a thin
//! `IntoResponse` wrapper translating `workflow_engine::EngineError`
//! variants into the right status code and a structured JSON body.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_derive::Serialize;

use workflow_engine::EngineError;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("{0}")]
    BadRequest(String),

    #[error("not authorized")]
    Forbidden,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error_type: String,
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type) = match &self {
            ApiError::Engine(EngineError::TransferNotFound(_))
            | ApiError::Engine(EngineError::WorkflowInstanceNotFound(_))
            | ApiError::Engine(EngineError::StageTemplateNotFound(_)) => {
                (StatusCode::NOT_FOUND, "not_found")
            }
            ApiError::Engine(EngineError::NotAuthorized(_)) | ApiError::Forbidden => {
                (StatusCode::FORBIDDEN, "forbidden")
            }
            ApiError::Engine(EngineError::WorkflowAlreadyTerminal(_))
            | ApiError::Engine(EngineError::AssignmentAlreadyDecided(_))
            | ApiError::Engine(EngineError::RejectionNotAllowed(_))
            | ApiError::Engine(EngineError::ReasonRequired(_))
            | ApiError::Engine(EngineError::DelegationNotAllowed(_))
            | ApiError::Engine(EngineError::DelegateViaDedicatedOperation)
            | ApiError::Engine(EngineError::InvalidDelegationTarget(_, _))
            | ApiError::Engine(EngineError::RestartNotAllowed(_))
            | ApiError::Engine(EngineError::RestartRequiresTerminalInstance(_))
            | ApiError::Engine(EngineError::TemplateInUse(_)) => {
                (StatusCode::CONFLICT, "conflict")
            }
            ApiError::Engine(EngineError::MissingSecurityGroup(_))
            | ApiError::Engine(EngineError::NoWorkflowAssigned(_, _)) => {
                (StatusCode::BAD_REQUEST, "bad_request")
            }
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request"),
            ApiError::Engine(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        };

        let body = ErrorResponse {
            error_type: error_type.to_string(),
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_transfer_maps_to_404() {
        let err = ApiError::Engine(EngineError::TransferNotFound(workflow_model::TransferId(1)));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
