use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use uuid::Uuid;

use faultline_core::errors::{CommonErrorKind, CustomError, ErrorOptions};
use faultline_core::logging::report_error;

/// Header whose value is copied into the error trace.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Request id sent by the client, or a fresh one.
pub fn request_trace(headers: &HeaderMap) -> String {
    headers
        .get(REQUEST_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| Uuid::new_v4().to_string())
}

/// Handler error: a structured error rendered as a JSON response.
#[derive(Debug)]
pub struct ApiError(pub CustomError);

impl ApiError {
    pub fn status(&self) -> StatusCode {
        status_for_kind(self.0.kind())
    }
}

impl From<CustomError> for ApiError {
    fn from(err: CustomError) -> Self {
        ApiError(err)
    }
}

pub fn status_for_kind(kind: &CommonErrorKind) -> StatusCode {
    match kind {
        CommonErrorKind::ValidationError => StatusCode::BAD_REQUEST,
        CommonErrorKind::Unauthorized => StatusCode::UNAUTHORIZED,
        CommonErrorKind::Forbidden => StatusCode::FORBIDDEN,
        CommonErrorKind::NotFound => StatusCode::NOT_FOUND,
        CommonErrorKind::DatabaseError
        | CommonErrorKind::InternalServerError
        | CommonErrorKind::UnknownError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody<'a> {
    status_code: u16,
    error_type: &'a str,
    message: &'a str,
    module: Option<&'a str>,
    trace: Option<&'a str>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        report_error(&self.0);

        let body = ErrorBody {
            status_code: status.as_u16(),
            error_type: self.0.error_type(),
            message: self.0.message(),
            module: self.0.module(),
            trace: self.0.trace(),
        };
        (status, Json(body)).into_response()
    }
}

/// Fallback for requests no router claimed.
pub async fn route_not_found(method: Method, uri: Uri, headers: HeaderMap) -> ApiError {
    let options = ErrorOptions::default()
        .with_module("router")
        .with_trace(request_trace(&headers))
        .with_context_entry("method", method.as_str())
        .with_context_entry("path", uri.path());

    ApiError(CustomError::new(
        CommonErrorKind::NotFound,
        format!("no route for {} {}", method, uri.path()),
        options,
    ))
}
