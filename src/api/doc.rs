use utoipa::OpenApi;

pub const WEBHOOK_TAG: &str = "Webhook";
pub const HEALTH_TAG: &str = "Health";

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Postback Relay",
        description = "Relays list-manager postbacks to SMS and email providers",
    ),
    components(
        schemas(
            crate::api::dto::Envelope,
            crate::api::dto::PostbackRequest,
        )
    ),
    tags(
        (name = WEBHOOK_TAG, description = "Message delivery endpoints"),
        (name = HEALTH_TAG, description = "Health check endpoints"),
    )
)]
pub struct ApiDoc;
