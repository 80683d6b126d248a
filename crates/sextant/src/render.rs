//! Error to response rendering.

use http::StatusCode;
use sextant_core::{
    Error, ErrorBody, ErrorDetails, HttpError, Request, Response, INTERNAL_SERVER_ERROR_CODE,
    INTERNAL_SERVER_ERROR_MESSAGE,
};
use sextant_router::ResolveError;

/// Maps a routing failure to its application error.
pub(crate) fn resolve_error(err: &ResolveError) -> HttpError {
    match err {
        ResolveError::NotFound { .. } => HttpError::route_not_found(),
        ResolveError::MethodNotAllowed { allowed, .. } => HttpError::method_not_allowed(allowed),
        ResolveError::Conversion { param, .. } => HttpError::invalid_path_parameter(param),
    }
}

/// Renders an error as a JSON response and logs it.
///
/// Application errors keep their status, headers and payload. Faults become
/// a generic 500. Diagnostics reach the client only when `debug` is set,
/// but the log always gets them.
pub(crate) fn error_response(request: &Request, err: &Error, debug: bool) -> Response {
    let stage = request.context().stage();
    match err {
        Error::Http(http) => {
            if http.status().is_server_error() {
                tracing::error!(
                    request_id = %request.request_id(),
                    stage = %stage,
                    code = http.code(),
                    error = %http,
                    "request failed"
                );
            } else {
                tracing::warn!(
                    request_id = %request.request_id(),
                    stage = %stage,
                    code = http.code(),
                    error = %http,
                    "request rejected"
                );
            }

            let mut body = http.to_body();
            if debug {
                body = body.with_details(ErrorDetails {
                    exception: http.message().to_string(),
                    stacktrace: vec![http.to_string()],
                });
            }
            let mut response = json_body(&body, http.status());
            for (name, value) in http.headers() {
                response.headers_mut().append(name, value.clone());
            }
            response
        }
        Error::Fault(fault) => {
            let stacktrace = fault.stacktrace();
            sextant_telemetry::log_request_error!(request.request_id(), stage, fault);
            tracing::error!(
                request_id = %request.request_id(),
                kind = fault.kind(),
                method = %request.method(),
                path = request.path(),
                stacktrace = ?stacktrace,
                "fault details"
            );

            let mut body = ErrorBody::internal();
            if debug {
                body = body.with_details(ErrorDetails {
                    exception: fault.to_string(),
                    stacktrace,
                });
            }
            json_body(&body, StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

fn json_body(body: &ErrorBody, status: StatusCode) -> Response {
    match Response::json(body) {
        Ok(response) => response.with_status(status),
        Err(_) => Response::text(format!(
            "{INTERNAL_SERVER_ERROR_CODE}: {INTERNAL_SERVER_ERROR_MESSAGE}"
        ))
        .with_status(StatusCode::INTERNAL_SERVER_ERROR),
    }
}
