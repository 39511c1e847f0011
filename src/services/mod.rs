//! Service layer.
//!
//! Messengers deliver postbacks to external providers and are held by the
//! application state through a [`messengers::MessengerRegistry`].

pub mod messengers;

pub use messengers::{Messenger, MessengerError, MessengerRegistry};
