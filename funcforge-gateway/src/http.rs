// SPDX-License-Identifier: Apache-2.0

//! HTTP surface of the FuncForge gateway.
//!
//! `POST /api/load` accepts a multipart form with a `code` field carrying
//! a zip archive; `GET /api/execute?functionId=<id>` runs a previously
//! loaded function. Component errors map to client-facing statuses with
//! generic messages; diagnostic detail (including captured engine output
//! on failure) goes to the log only.

use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, Multipart, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::trace::TraceLayer;

use funcforge_core::{ContainerEngine, ForgeError, FunctionId, FunctionService};

/// Multipart form field carrying the function archive.
const ARCHIVE_FIELD: &str = "code";

/// Build the gateway router around a shared function service.
pub fn router<E: ContainerEngine + 'static>(
    service: Arc<FunctionService<E>>,
    max_upload_bytes: usize,
) -> Router {
    Router::new()
        .route("/api/load", post(load_function::<E>))
        .route("/api/execute", get(execute_function::<E>))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(service)
}

/// Body returned by a successful load.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct LoadResponse {
    function_id: FunctionId,
    image_id: funcforge_core::ImageId,
}

async fn load_function<E: ContainerEngine + 'static>(
    State(service): State<Arc<FunctionService<E>>>,
    mut multipart: Multipart,
) -> Response {
    let mut archive: Option<Vec<u8>> = None;

    loop {
        match multipart.next_field().await {
            Ok(Some(field)) => {
                if field.name() != Some(ARCHIVE_FIELD) {
                    continue;
                }
                match field.bytes().await {
                    Ok(bytes) => {
                        archive = Some(bytes.to_vec());
                        break;
                    }
                    Err(err) => {
                        tracing::warn!(error = %err, "failed to read archive field");
                        return (StatusCode::BAD_REQUEST, "unable to read the zip file")
                            .into_response();
                    }
                }
            }
            Ok(None) => break,
            Err(err) => {
                tracing::warn!(error = %err, "failed to parse multipart form");
                return (StatusCode::BAD_REQUEST, "unable to parse form").into_response();
            }
        }
    }

    let Some(archive) = archive else {
        return (
            StatusCode::BAD_REQUEST,
            "missing 'code' field in multipart form",
        )
            .into_response();
    };

    match service.load(archive).await {
        Ok(receipt) => (
            StatusCode::OK,
            Json(LoadResponse {
                function_id: receipt.function_id,
                image_id: receipt.image_id,
            }),
        )
            .into_response(),
        Err(err) => error_response(&err, "load"),
    }
}

#[derive(Debug, Deserialize)]
struct ExecuteParams {
    #[serde(rename = "functionId")]
    function_id: Option<String>,
}

async fn execute_function<E: ContainerEngine + 'static>(
    State(service): State<Arc<FunctionService<E>>>,
    Query(params): Query<ExecuteParams>,
) -> Response {
    let Some(raw_id) = params.function_id.filter(|id| !id.is_empty()) else {
        return (StatusCode::BAD_REQUEST, "functionId is required").into_response();
    };

    // An identifier that does not even parse was never issued by load,
    // so it gets the same answer as any other unknown identifier.
    let Ok(function_id) = FunctionId::parse(&raw_id) else {
        return (StatusCode::NOT_FOUND, "function not found").into_response();
    };

    match service.execute(&function_id).await {
        Ok(output) => (StatusCode::OK, output).into_response(),
        Err(err) => error_response(&err, "execute"),
    }
}

/// Map a component error to a client-facing status with a generic
/// message. The underlying error is logged here and never returned.
fn error_response(err: &ForgeError, operation: &'static str) -> Response {
    let (status, message) = match err {
        ForgeError::Archive(_) => (StatusCode::BAD_REQUEST, "malformed archive upload"),
        ForgeError::Detection(_) => (
            StatusCode::BAD_REQUEST,
            "no recognized handler file in archive",
        ),
        ForgeError::FunctionNotFound(_) => (StatusCode::NOT_FOUND, "function not found"),
        _ => (StatusCode::INTERNAL_SERVER_ERROR, "internal error"),
    };

    if status.is_server_error() {
        tracing::error!(operation, error = %err, "request failed");
    } else {
        tracing::warn!(operation, error = %err, "request rejected");
    }

    (status, message).into_response()
}
