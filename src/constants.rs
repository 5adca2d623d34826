//! Global Constants
//!
//! Centralized constants for configuration and tuning.
//! All magic numbers should be defined here with documentation.

/// Retry governor constants
pub mod retry {
    /// Total attempt budget per request (first attempt included)
    pub const MAX_ATTEMPTS: u32 = 4;

    /// Exponential backoff base: wait `BACKOFF_BASE_SECS^n` seconds before
    /// attempt n+1 when the server gives no Retry-After hint
    pub const BACKOFF_BASE_SECS: u64 = 2;

    /// Upper bound on any single backoff sleep (seconds)
    pub const MAX_BACKOFF_SECS: u64 = 64;
}

/// Network constants
pub mod network {
    /// Overall request timeout (seconds)
    pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

    /// TCP connect timeout (seconds)
    pub const CONNECT_TIMEOUT_SECS: u64 = 30;
}

/// Model request constants
pub mod model {
    /// Default OpenAI-compatible endpoint
    pub const OPENAI_API_BASE: &str = "https://api.openai.com/v1";

    /// Default Gemini endpoint root
    pub const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

    /// Completion token cap sent with every request
    pub const MAX_OUTPUT_TOKENS: u32 = 4000;

    /// Gemini generation temperature
    pub const GEMINI_TEMPERATURE: f32 = 0.2;
}

/// SVG export layout constants
pub mod svg {
    /// Horizontal distance between tree levels (px)
    pub const LEVEL_SPACING: f32 = 180.0;

    /// Vertical distance between adjacent leaves (px)
    pub const LEAF_SPACING: f32 = 36.0;

    /// Padding around the drawing (px)
    pub const MARGIN: f32 = 50.0;

    /// Node circle radius (px)
    pub const NODE_RADIUS: f32 = 5.0;
}

/// Markdown export constants
pub mod markdown {
    /// Deepest heading level emitted; deeper nodes stay at this level
    pub const MAX_HEADING_LEVEL: usize = 6;
}
