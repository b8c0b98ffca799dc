//! Application-wide constants and magic numbers
//!
//! Centralizes the progress-mapping table and other hardcoded values so the
//! wire contract is tunable in one place.

/// Progress table: `step` value of a `status` event -> percent complete.
/// These exact values are part of the observable contract with the renderers.
pub mod progress {
    pub const INIT: u8 = 5;
    pub const INITIALIZED: u8 = 10;
    pub const FUNDAMENTALS_ANALYST: u8 = 15;
    pub const SENTIMENT_ANALYST: u8 = 20;
    pub const NEWS_ANALYST: u8 = 25;
    pub const TECHNICAL_ANALYST: u8 = 30;
    pub const RESEARCHER_DEBATE: u8 = 45;
    pub const TRADER: u8 = 65;
    pub const RISK_ASSESSMENT: u8 = 80;
    pub const PORTFOLIO_MANAGER: u8 = 90;
    pub const COMPLETE: u8 = 100;

    /// Coarse fallback (layers 1-4) when `step` is absent or unrecognized
    /// but the event still names a layer.
    pub const LAYER_FALLBACK: [u8; 4] = [15, 40, 65, 85];
}

/// Trading-decision constants
pub mod decision {
    /// Confidence assumed for a trader output that arrives before (or
    /// without) a `final_result` carrying the real value.
    pub const FALLBACK_CONFIDENCE: &str = "MEDIUM";
}

/// Run-report constants
pub mod report {
    /// Where transcripts and summaries land unless configured otherwise.
    pub const DEFAULT_DIR: &str = "./data";
}

/// Request defaults mirroring the backend's `AnalyzeRequest` model
pub mod request {
    pub const DEFAULT_DEBATE_THRESHOLD: f64 = 3.0;
    pub const DEFAULT_MAX_ROUNDS: u32 = 2;
}
