use crate::errors::{
    api_error_response, error_json, ingest_error_response, query_error_response, ApiErrorCode,
};
use crate::AppState;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Multipart, Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::NaiveDate;
use fieldbook_ingest::{rows_from_workbook_bytes, run_ingest};
use fieldbook_query::{get_record, list_records, update_last_visit};
use serde::Deserialize;
use serde_json::json;
use std::collections::HashMap;
use tracing::{info, warn};

/// Header carrying the authenticated uploader identity. Authentication
/// itself happens upstream; this layer only requires the result.
pub(crate) const UPLOADER_ID_HEADER: &str = "x-uploader-id";

const UPLOAD_FIELD: &str = "file";

pub(crate) async fn healthz_handler() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn regions_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.registry.names().to_vec())
}

pub(crate) async fn upload_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Response {
    let uploader = match headers
        .get(UPLOADER_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|s| !s.is_empty())
    {
        Some(uploader) => uploader.to_string(),
        None => {
            return api_error_response(
                StatusCode::UNAUTHORIZED,
                error_json(
                    ApiErrorCode::MissingIdentity,
                    "missing uploader identity",
                    json!({ "header": UPLOADER_ID_HEADER }),
                ),
            )
        }
    };

    let mut upload: Option<(String, axum::body::Bytes)> = None;
    loop {
        match multipart.next_field().await {
            Ok(Some(field)) => {
                if field.name() != Some(UPLOAD_FIELD) {
                    continue;
                }
                let file_name = field.file_name().unwrap_or("upload.xlsx").to_string();
                match field.bytes().await {
                    Ok(bytes) => {
                        upload = Some((file_name, bytes));
                        break;
                    }
                    Err(err) => {
                        return api_error_response(
                            StatusCode::BAD_REQUEST,
                            error_json(
                                ApiErrorCode::BadFile,
                                "could not read uploaded file",
                                json!({ "message": err.to_string() }),
                            ),
                        )
                    }
                }
            }
            Ok(None) => break,
            Err(err) => {
                return api_error_response(
                    StatusCode::BAD_REQUEST,
                    error_json(
                        ApiErrorCode::BadFile,
                        "malformed multipart body",
                        json!({ "message": err.to_string() }),
                    ),
                )
            }
        }
    }
    let Some((file_name, bytes)) = upload else {
        return api_error_response(
            StatusCode::BAD_REQUEST,
            error_json(
                ApiErrorCode::BadFile,
                "upload is missing the file field",
                json!({ "field": UPLOAD_FIELD }),
            ),
        );
    };

    if !file_name
        .to_ascii_lowercase()
        .ends_with(&state.api.upload_extension)
    {
        return api_error_response(
            StatusCode::BAD_REQUEST,
            error_json(
                ApiErrorCode::BadFile,
                "only .xlsx files are accepted",
                json!({ "file": file_name }),
            ),
        );
    }

    let rows = match rows_from_workbook_bytes(&bytes) {
        Ok(rows) => rows,
        Err(err) => {
            warn!(file = %file_name, error = %err, "workbook extraction failed");
            return api_error_response(
                StatusCode::BAD_REQUEST,
                error_json(
                    ApiErrorCode::BadFile,
                    "could not parse the workbook",
                    json!({ "message": err.to_string() }),
                ),
            );
        }
    };
    if rows.is_empty() {
        return api_error_response(
            StatusCode::BAD_REQUEST,
            error_json(
                ApiErrorCode::BadFile,
                "workbook has no data rows",
                json!({ "file": file_name }),
            ),
        );
    }

    match run_ingest(
        state.store.as_ref(),
        &state.registry,
        &rows,
        &uploader,
        &file_name,
    ) {
        Ok(created) => {
            info!(created, file = %file_name, uploader = %uploader, "upload ingested");
            (StatusCode::CREATED, Json(json!({ "created": created }))).into_response()
        }
        Err(err) => {
            warn!(file = %file_name, error = %err, "upload rejected");
            ingest_error_response(&err)
        }
    }
}

pub(crate) async fn records_handler(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let region = params.get("region").map(String::as_str);
    match list_records(state.store.as_ref(), &state.registry, region) {
        Ok(records) => Json(records).into_response(),
        Err(err) => {
            warn!(error = %err, "record listing failed");
            query_error_response(&err)
        }
    }
}

pub(crate) async fn record_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Response {
    match get_record(state.store.as_ref(), &id) {
        Ok(record) => Json(record).into_response(),
        Err(err) => query_error_response(&err),
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct VisitUpdateBody {
    #[serde(default)]
    last_visit_date: Option<NaiveDate>,
}

pub(crate) async fn record_visit_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<VisitUpdateBody>, JsonRejection>,
) -> Response {
    let Json(body) = match body {
        Ok(body) => body,
        Err(rejection) => {
            return api_error_response(
                StatusCode::BAD_REQUEST,
                error_json(
                    ApiErrorCode::InvalidRequestBody,
                    "invalid visit update body",
                    json!({ "message": rejection.body_text() }),
                ),
            )
        }
    };
    match update_last_visit(state.store.as_ref(), &id, body.last_visit_date) {
        Ok(record) => Json(json!({
            "id": record.id,
            "last_visit_date": record.last_visit_date,
        }))
        .into_response(),
        Err(err) => query_error_response(&err),
    }
}
