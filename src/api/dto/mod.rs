//! Data Transfer Objects for API requests and responses.
//!
//! - `envelope` - the `{status, message?, data?}` response wrapper
//! - `postback` - the inbound webhook payload
//! - `health` - health check response

mod envelope;
mod health;
mod postback;

pub use envelope::{Envelope, ResponseStatus};
pub use health::{HealthResponse, HealthStatus};
pub use postback::{AttachmentDto, CampaignDto, PostbackRequest, RecipientDto};
