//! Application state for Axum web framework.
//!
//! Contains the shared, read-only resources every handler needs.

use std::sync::Arc;

use crate::services::MessengerRegistry;

/// Application state passed to handlers through Axum's State extractor.
///
/// Cloning is cheap: the registry sits behind an `Arc` and is never
/// mutated after startup.
#[derive(Clone)]
pub struct AppState {
    /// Messengers selectable by `POST /webhook/{provider}`
    pub messengers: Arc<MessengerRegistry>,
}

impl AppState {
    pub fn new(messengers: MessengerRegistry) -> Self {
        Self {
            messengers: Arc::new(messengers),
        }
    }
}
