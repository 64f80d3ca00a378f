//! Core types for fbpulse: the feedback data model, the filter contract and
//! filtering engine, the storage capability, and application configuration.

mod app_config;
mod config;
pub mod feedback;
pub mod filter;
pub mod store;
#[doc(hidden)]
pub mod testutil;

use thiserror::Error;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use feedback::{
    normalize_labels, Enrichment, FeedbackRecord, FeedbackStatus, NewFeedback, Sentiment, Source,
};
pub use filter::{apply_filters, FilterSet, DEFAULT_WINDOW_DAYS};
pub use store::{FeedbackStore, MemoryStore, StoreError};

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid source channel: {0}")]
    InvalidSource(String),
    #[error("invalid sentiment: {0}")]
    InvalidSentiment(String),
    #[error("invalid status: {0}")]
    InvalidStatus(String),
    #[error("feedback body must be non-empty")]
    EmptyBody,
    #[error("urgency must be between 1 and 5, got {0}")]
    InvalidUrgency(u8),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required env var: {0}")]
    MissingEnvVar(String),
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
