//! aipanel-engine: Headless engine for the AIPanel chat side panel
//!
//! This crate provides the core exchange logic for AIPanel, including:
//! - The message data model and conversation log (50-message retention cap)
//! - Reply resolution (delegated channel with simulated fallback)
//! - The exchange controller driving one turn at a time
//! - Best-effort persistence of the conversation

pub mod config;
pub mod conversation;
pub mod exchange;
pub mod message;
pub mod provider;
pub mod storage;

// Re-export commonly used types
pub use config::{ConfigError, DelegateConfig, PanelConfig};
pub use conversation::{Conversation, RETENTION_CAP};
pub use exchange::{ExchangeController, SubmitOutcome, TurnStage, ERROR_REPLY};
pub use message::{Message, Sender};
pub use provider::{
    DelegatedResponder, PanelResponder, ProviderError, ResponseProvider, SimulatedResponder,
    CANNED_REPLIES,
};
pub use storage::{FileStore, MemoryStore, MessageStore, StorageError};

/// Returns the engine version.
pub fn engine_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
