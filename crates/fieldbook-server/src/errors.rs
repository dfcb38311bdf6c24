use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use fieldbook_ingest::IngestError;
use fieldbook_query::QueryError;
use serde::Serialize;
use serde_json::{json, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[non_exhaustive]
pub enum ApiErrorCode {
    MissingIdentity,
    BadFile,
    NoValidRows,
    InvalidRecordId,
    RecordNotFound,
    InvalidRequestBody,
    StoreFailure,
    Internal,
}

#[derive(Debug, Clone, Serialize)]
pub struct ApiError {
    pub code: ApiErrorCode,
    pub message: String,
    pub details: Value,
}

pub(crate) fn error_json(code: ApiErrorCode, message: &str, details: Value) -> ApiError {
    ApiError {
        code,
        message: message.to_string(),
        details,
    }
}

pub(crate) fn api_error_response(status: StatusCode, err: ApiError) -> Response {
    (status, Json(json!({ "error": err }))).into_response()
}

pub(crate) fn ingest_error_response(err: &IngestError) -> Response {
    match err {
        IngestError::EmptyInput => api_error_response(
            StatusCode::BAD_REQUEST,
            error_json(ApiErrorCode::BadFile, "workbook has no data rows", json!({})),
        ),
        IngestError::NoValidRows => api_error_response(
            StatusCode::BAD_REQUEST,
            error_json(
                ApiErrorCode::NoValidRows,
                "no valid data rows found in the workbook",
                json!({}),
            ),
        ),
        IngestError::Internal(msg) => api_error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            error_json(
                ApiErrorCode::Internal,
                "failed to process the workbook",
                json!({ "message": msg }),
            ),
        ),
        IngestError::Store(store_err) => api_error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            error_json(
                ApiErrorCode::StoreFailure,
                "failed to persist the upload",
                json!({ "message": store_err.to_string() }),
            ),
        ),
    }
}

pub(crate) fn query_error_response(err: &QueryError) -> Response {
    match err {
        QueryError::InvalidId(raw) => api_error_response(
            StatusCode::BAD_REQUEST,
            error_json(
                ApiErrorCode::InvalidRecordId,
                "invalid record id",
                json!({ "id": raw }),
            ),
        ),
        QueryError::NotFound(id) => api_error_response(
            StatusCode::NOT_FOUND,
            error_json(
                ApiErrorCode::RecordNotFound,
                "record not found",
                json!({ "id": id.to_string() }),
            ),
        ),
        QueryError::Store(store_err) => api_error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            error_json(
                ApiErrorCode::StoreFailure,
                "failed to read records",
                json!({ "message": store_err.to_string() }),
            ),
        ),
    }
}
