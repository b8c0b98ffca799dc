//! Stock Insight - streaming client for a multi-agent stock-analysis pipeline
//!
//! This library consumes the backend's NDJSON event stream and folds it into a
//! monotonically-advancing view model: per-layer agent output, a coarse
//! progress estimate, and the terminal outcome. It tolerates malformed lines,
//! out-of-order arrivals between roles, and transport failure mid-run.

pub mod bus;
pub mod client;
pub mod config;
pub mod constants;
pub mod error;
pub mod events;
pub mod model;
pub mod report;
pub mod stream;

// Re-export commonly used types
pub use bus::ModelBus;
pub use client::{AnalysisClient, AnalysisTransport, AnalyzeRequest, HttpTransport};
pub use config::AppConfig;
pub use error::StreamError;
pub use events::{AgentRole, StreamEvent};
pub use model::ViewModel;
pub use stream::aggregator::StreamAggregator;
pub use stream::splitter::{ChunkDecoder, LineSplitter};
