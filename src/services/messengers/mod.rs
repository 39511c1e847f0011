//! Delivery channels with pluggable providers.
//!
//! The core trait `Messenger` is implemented once per provider. Enabled
//! providers are collected into a `MessengerRegistry` at startup and looked
//! up by name when a postback arrives.

mod aws;
mod de;
mod error;
mod message;
mod messenger;
mod pinpoint;
mod registry;
mod ses;
mod twilio;

#[cfg(test)]
mod testing;

pub use error::MessengerError;
pub use message::{
    AttribError, Attachment, Attribs, Campaign, ContentType, Message, MimeHeader, Subscriber,
};
pub use messenger::Messenger;
pub use pinpoint::PinpointMessenger;
pub use registry::{KNOWN_MESSENGERS, MessengerRegistry};
pub use ses::SesMessenger;
pub use twilio::TwilioMessenger;
