//! Webhook dispatch: one postback in, one provider call out.

use axum::{
    Json,
    body::Bytes,
    extract::{Path, State, rejection::BytesRejection},
};
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::api::doc::WEBHOOK_TAG;
use crate::api::dto::{Envelope, PostbackRequest};
use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Register webhook routes.
pub fn webhook_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new().routes(routes!(deliver))
}

/// POST /webhook/{provider} - Deliver one postback through the named messenger.
///
/// Steps run in a fixed order and stop at the first failure:
/// decode the body, look up the provider, check there is exactly one
/// recipient, push. Only fixed messages reach the caller.
#[utoipa::path(
    post,
    path = "/{provider}",
    tag = WEBHOOK_TAG,
    params(
        ("provider" = String, Path, description = "Registered messenger name, e.g. `pinpoint`")
    ),
    request_body = PostbackRequest,
    responses(
        (status = 200, description = "Message accepted by the provider", body = Envelope,
            example = json!({"status": "success"})),
        (status = 400, description = "Invalid body, unknown provider or recipient count", body = Envelope,
            example = json!({"status": "error", "message": "invalid recipients"})),
        (status = 500, description = "Provider call failed", body = Envelope,
            example = json!({"status": "error", "message": "error sending message"}))
    )
)]
async fn deliver(
    State(state): State<AppState>,
    Path(provider): Path<String>,
    body: Result<Bytes, BytesRejection>,
) -> AppResult<Json<Envelope>> {
    let postback = decode_postback(&provider, body)?;

    let Some(messenger) = state.messengers.get(&provider) else {
        tracing::debug!(provider = %provider, "Unknown provider");
        return Err(AppError::bad_request("unknown provider"));
    };

    let [recipient] = postback.recipients.as_slice() else {
        tracing::debug!(
            provider = %provider,
            recipients = postback.recipients.len(),
            "Postback must carry exactly one recipient"
        );
        return Err(AppError::bad_request("invalid recipients"));
    };

    let message = postback.to_message(recipient);
    tracing::debug!(provider = %provider, message = ?message, "Dispatching message");

    if let Err(e) = messenger.push(&message).await {
        tracing::error!(
            provider = %provider,
            subscriber = %message.subscriber.uuid,
            error = %error_chain(&e),
            "Error sending message"
        );
        return Err(AppError::delivery(provider, e));
    }

    Ok(Json(Envelope::success()))
}

fn decode_postback(
    provider: &str,
    body: Result<Bytes, BytesRejection>,
) -> AppResult<PostbackRequest> {
    let bytes = body.map_err(|e| {
        tracing::warn!(provider = %provider, error = %e, "Failed to read request body");
        AppError::bad_request("invalid body")
    })?;

    serde_json::from_slice(&bytes).map_err(|e| {
        tracing::warn!(provider = %provider, error = %e, "Failed to decode postback");
        AppError::bad_request("invalid body")
    })
}

/// `outer: inner: root` rendering of an error and its sources.
fn error_chain(error: &dyn std::error::Error) -> String {
    let mut rendered = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        rendered.push_str(": ");
        rendered.push_str(&cause.to_string());
        source = cause.source();
    }
    rendered
}
