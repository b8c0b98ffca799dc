//! One-run streaming client: opens the analysis stream through a transport
//! seam, then drives chunk -> decode -> split -> apply until end-of-body.

use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;
use futures_util::{Stream, StreamExt};
use serde::Serialize;
use tracing::{info, warn};

use crate::bus::ModelBus;
use crate::error::StreamError;
use crate::model::ViewModel;
use crate::report::RunReporter;
use crate::stream::aggregator::StreamAggregator;
use crate::stream::splitter::{ChunkDecoder, LineSplitter};

/// Request body for one analysis run, shaped as the backend expects it.
#[derive(Clone, Debug, Serialize)]
pub struct AnalyzeRequest {
    pub symbol: String,
    pub api_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    pub debate_threshold: f64,
    pub max_rounds: u32,
}

pub type ChunkStream = Pin<Box<dyn Stream<Item = Result<Vec<u8>, StreamError>> + Send>>;

/// Transport seam: yields one run's response body as raw byte chunks.
/// Everything past the chunk boundary (decoding, framing, aggregation) is the
/// client's job, which keeps the transport swappable in tests.
#[async_trait]
pub trait AnalysisTransport: Send + Sync {
    async fn open(&self, request: &AnalyzeRequest) -> Result<ChunkStream, StreamError>;
}

/// HTTP transport: one POST per run, NDJSON response body.
pub struct HttpTransport {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpTransport {
    pub fn new(endpoint: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint,
        }
    }
}

#[async_trait]
impl AnalysisTransport for HttpTransport {
    async fn open(&self, request: &AnalyzeRequest) -> Result<ChunkStream, StreamError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StreamError::Http {
                status: status.as_u16(),
                body,
            });
        }

        Ok(Box::pin(response.bytes_stream().map(|chunk| {
            chunk.map(|bytes| bytes.to_vec()).map_err(StreamError::from)
        })))
    }
}

/// Drives one analysis run from request to terminal model. The aggregation is
/// strictly sequential with respect to chunk arrival; the only suspension
/// point is awaiting the next chunk, so no two applies ever interleave.
pub struct AnalysisClient {
    transport: Arc<dyn AnalysisTransport>,
    bus: ModelBus,
    reporter: Option<RunReporter>,
}

impl AnalysisClient {
    pub fn new(transport: Arc<dyn AnalysisTransport>, bus: ModelBus) -> Self {
        Self {
            transport,
            bus,
            reporter: None,
        }
    }

    pub fn with_reporter(mut self, reporter: RunReporter) -> Self {
        self.reporter = Some(reporter);
        self
    }

    pub fn bus(&self) -> &ModelBus {
        &self.bus
    }

    /// Consume one run's stream to end-of-body and fold it into a ViewModel.
    ///
    /// Transport failure mid-stream propagates as `Err`; the partial model
    /// published on the bus up to that point stays available for display.
    pub async fn run(&self, request: &AnalyzeRequest) -> Result<ViewModel, StreamError> {
        info!(symbol = %request.symbol, "starting analysis run");

        let mut chunks = self.transport.open(request).await?;
        let mut decoder = ChunkDecoder::new();
        let mut splitter = LineSplitter::new();
        let mut aggregator = StreamAggregator::new(self.bus.clone());
        // New run: observers see a blank model before the first event lands.
        aggregator.reset();

        while let Some(chunk) = chunks.next().await {
            let text = decoder.push(&chunk?);
            for line in splitter.feed(&text) {
                self.apply(&mut aggregator, &line);
            }
        }

        // End-of-stream: flush the decoder tail, then any unterminated record.
        let tail = decoder.finish();
        if !tail.is_empty() {
            for line in splitter.feed(&tail) {
                self.apply(&mut aggregator, &line);
            }
        }
        if let Some(residual) = splitter.finish() {
            self.apply(&mut aggregator, &residual);
        }

        let model = aggregator.into_model();
        if let Some(reporter) = &self.reporter {
            match reporter.save_summary(&request.symbol, &model) {
                Ok(path) => info!(path = %path.display(), "run summary saved"),
                Err(e) => warn!(error = %e, "failed to save run summary"),
            }
        }
        info!(
            symbol = %request.symbol,
            progress = model.progress,
            failed = model.failed(),
            "analysis run finished"
        );
        Ok(model)
    }

    fn apply(&self, aggregator: &mut StreamAggregator, line: &str) {
        if aggregator.apply_line(line) {
            if let Some(reporter) = &self.reporter {
                // Transcript is best-effort; a full disk never kills a run.
                if let Err(e) = reporter.append(line) {
                    warn!(error = %e, "transcript append failed");
                }
            }
        }
    }
}
