//! treeloom - LLM-Powered Knowledge Tree Builder
//!
//! Collects freeform notes or document text, sends them to an external
//! LLM API, and turns the returned free-form text into a validated
//! hierarchical tree with JSON, Markdown, and SVG exports.
//!
//! ## Core Pipeline
//!
//! Prompt Builder → Retry Governor (Transport Client) → Response
//! Extractor → Tree Store. The transport performs exactly one network
//! attempt per call; the governor owns rate-limit backoff and
//! cancellation; the extractor recovers JSON from chatty model output and
//! validates it structurally.
//!
//! ## Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use treeloom::{Config, Session};
//! use treeloom::ai::{NullProgress, retry::CancelHandle};
//!
//! let session = Session::new(&Config::default(), Arc::new(NullProgress))?;
//! let id = session
//!     .generate(None, fragments, None, Vec::new(), &CancelHandle::new())
//!     .await?;
//! let markdown = session.store().to_markdown(&id);
//! ```
//!
//! ## Modules
//!
//! - [`ai`]: prompt construction, providers, transport, retry, extraction
//! - [`store`]: in-memory tree registry with exporters
//! - [`ingest`]: note splitting and document reading
//! - [`config`]: layered configuration loading
//! - [`session`]: the per-surface context object tying it all together

pub mod ai;
pub mod cli;
pub mod config;
pub mod constants;
pub mod ingest;
pub mod session;
pub mod store;
pub mod types;

// =============================================================================
// Core Re-exports
// =============================================================================

// Configuration
pub use config::{Config, ConfigLoader, LlmConfig, RetryConfig};

// Error Types
pub use types::{Result, TreeError};

// Domain Types
pub use types::{KnowledgeNode, TreeId};

// Session
pub use session::Session;

// =============================================================================
// AI Re-exports
// =============================================================================

pub use ai::{
    // Identity & requests
    ModelId,
    ModelOutcome,
    ModelRequest,
    // Progress
    NullProgress,
    ProgressEvent,
    ProgressSink,
    // Pipeline stages
    RetryGovernor,
    RetryPolicy,
    Transport,
};

// =============================================================================
// Store Re-exports
// =============================================================================

pub use store::{StoredTree, TreeStore};
