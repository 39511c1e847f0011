//! Error rendering for the HTTP layer.
//!
//! Every error leaves the service as an [`Envelope`] with a fixed
//! message. Source errors stay in the server logs.

use axum::{
    Json,
    extract::Request,
    http::{StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::api::dto::Envelope;
use crate::error::AppError;

impl IntoResponse for AppError {
    /// # Status Code Mapping
    /// - BadRequest → 400 BAD_REQUEST
    /// - Delivery → 500 INTERNAL_SERVER_ERROR
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            AppError::Delivery { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (status, Json(Envelope::error(self.public_message()))).into_response()
    }
}

/// Rewrap error responses produced outside the handlers (unknown route,
/// wrong method, timeouts) into the envelope format.
pub async fn global_error_handler(request: Request, next: Next) -> Response {
    let response = next.run(request).await;
    let status = response.status();

    if !(status.is_client_error() || status.is_server_error()) {
        return response;
    }

    let is_json = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.contains("application/json"));
    if is_json {
        return response;
    }

    let (mut parts, _body) = response.into_parts();
    parts.headers.remove(header::CONTENT_LENGTH);
    parts.headers.remove(header::CONTENT_TYPE);

    let envelope = Json(Envelope::error(fallback_message(status)));
    (parts, envelope).into_response()
}

fn fallback_message(status: StatusCode) -> String {
    status
        .canonical_reason()
        .map(str::to_lowercase)
        .unwrap_or_else(|| format!("http status {}", status.as_u16()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::MessengerError;
    use axum::body::to_bytes;
    use axum::{Router, body::Body, middleware, routing::get};
    use tower::ServiceExt;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_bad_request_renders_envelope() {
        let response = AppError::bad_request("unknown provider").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await,
            serde_json::json!({"status": "error", "message": "unknown provider"})
        );
    }

    #[tokio::test]
    async fn test_delivery_renders_generic_message() {
        let err = AppError::delivery(
            "pinpoint",
            MessengerError::Rejected {
                provider: "pinpoint",
                status: 400,
                body: "InvalidParameter: app id".to_string(),
            },
        );
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let json = body_json(response).await;
        assert_eq!(json["message"], "error sending message");
        assert!(!json.to_string().contains("InvalidParameter"));
    }

    #[tokio::test]
    async fn test_unknown_route_is_wrapped() {
        let app = Router::new()
            .route("/", get(|| async { "ok" }))
            .layer(middleware::from_fn(global_error_handler));
        let request = Request::builder()
            .uri("/missing")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            body_json(response).await,
            serde_json::json!({"status": "error", "message": "not found"})
        );
    }

    #[test]
    fn test_fallback_message_uses_reason_phrase() {
        assert_eq!(fallback_message(StatusCode::REQUEST_TIMEOUT), "request timeout");
        assert_eq!(
            fallback_message(StatusCode::METHOD_NOT_ALLOWED),
            "method not allowed"
        );
    }
}
