use std::path::PathBuf;
use std::sync::Arc;

use stock_insight::bus::ModelBus;
use stock_insight::client::{AnalysisClient, HttpTransport};
use stock_insight::config::AppConfig;
use stock_insight::error::StreamError;
use stock_insight::report::RunReporter;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<(), StreamError> {
    // Setup Logging
    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_max_level(tracing::Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    dotenvy::dotenv().ok();

    let symbol = std::env::args()
        .nth(1)
        .ok_or_else(|| StreamError::Config("usage: stock-insight <6-digit stock code>".into()))?;
    if symbol.len() != 6 || !symbol.bytes().all(|b| b.is_ascii_digit()) {
        return Err(StreamError::Config(format!(
            "invalid stock code '{}' (expected 6 digits, e.g. 600519)",
            symbol
        )));
    }

    // Load Configuration
    let config = AppConfig::load()?;
    info!("Analysis endpoint: {}", config.endpoint);
    if config.effective_api_key().is_none() {
        warn!("No API key configured (config.yaml llm.api_key or OPENAI_API_KEY); the backend may reject the run");
    }

    let bus = ModelBus::new();
    let transport = Arc::new(HttpTransport::new(config.endpoint.clone()));
    let reporter = RunReporter::new(PathBuf::from(&config.report_dir));
    info!("Run id: {}", reporter.run_id());

    let client = AnalysisClient::new(transport, bus.clone()).with_reporter(reporter);

    // Follow the read model while the run streams in.
    let mut rx = bus.subscribe();
    let progress_task = tokio::spawn(async move {
        let mut last = (0u8, 0u8);
        while rx.changed().await.is_ok() {
            let (stage, progress, status_line) = {
                let model = rx.borrow();
                (model.stage, model.progress, model.status_line.clone())
            };
            if (stage, progress) != last {
                last = (stage, progress);
                info!(
                    "[{:>3}%] layer {} | {}",
                    progress,
                    stage,
                    status_line.unwrap_or_default()
                );
            }
        }
    });

    let request = config.to_request(&symbol);
    let model = client.run(&request).await?;
    progress_task.abort();

    if let Some(error) = &model.error {
        warn!("Analysis reported an error: {}", error);
    }
    println!("{}", serde_json::to_string_pretty(&model)?);

    Ok(())
}
