//! The incremental stream-aggregation core: classify one candidate record,
//! fold it into the `ViewModel`, publish the result. One corrupt record never
//! aborts a run, and `stage`/`progress` never regress within one.

use tracing::{debug, warn};

use crate::bus::ModelBus;
use crate::constants::{decision, progress};
use crate::events::{step_stage, AgentOutputEvent, AgentRole, StatusEvent, StreamEvent};
use crate::model::ViewModel;

pub fn parse_event(raw: &str) -> Result<StreamEvent, serde_json::Error> {
    serde_json::from_str(raw)
}

/// Progress table lookup for a `status` event's `step`.
pub fn step_progress(step: &str) -> Option<u8> {
    match step {
        "init" => Some(progress::INIT),
        "initialized" => Some(progress::INITIALIZED),
        "fundamentals_analyst" => Some(progress::FUNDAMENTALS_ANALYST),
        "sentiment_analyst" => Some(progress::SENTIMENT_ANALYST),
        "news_analyst" => Some(progress::NEWS_ANALYST),
        "technical_analyst" => Some(progress::TECHNICAL_ANALYST),
        "researcher_debate" => Some(progress::RESEARCHER_DEBATE),
        "trader" => Some(progress::TRADER),
        "risk_assessment" => Some(progress::RISK_ASSESSMENT),
        "portfolio_manager" => Some(progress::PORTFOLIO_MANAGER),
        "complete" => Some(progress::COMPLETE),
        _ => None,
    }
}

/// Fallback when only a layer number is known.
pub fn layer_progress(layer: u8) -> Option<u8> {
    match layer {
        1..=4 => Some(progress::LAYER_FALLBACK[(layer - 1) as usize]),
        _ => None,
    }
}

/// Fold one event into the model. Pure with respect to everything but the
/// model itself; specified field-by-field so delivery order between a role's
/// `agent_output` and its `status`/`final_result` never matters.
pub fn reduce(model: &mut ViewModel, event: &StreamEvent) {
    match event {
        StreamEvent::Status(status) => reduce_status(model, status),
        StreamEvent::LayerStart(layer_start) => {
            // Advisory only: status text, no stage/progress movement.
            if let Some(message) = &layer_start.message {
                model.status_line = Some(message.clone());
            }
        }
        StreamEvent::AgentOutput(output) => reduce_agent_output(model, output),
        StreamEvent::DebateTriggered(debate) | StreamEvent::DebateResult(debate) => {
            // Informational; retained raw for display.
            model.debate = Some(debate.data.clone());
        }
        StreamEvent::RiskAssessment(risk) => {
            model.layer4.aggressive = risk.data.aggressive.clone();
            model.layer4.balanced = risk.data.neutral.clone();
            model.layer4.conservative = risk.data.conservative.clone();
            model.stage = model.stage.max(4);
            model.progress = model.progress.max(progress::RISK_ASSESSMENT);
        }
        StreamEvent::FinalResult(final_result) => {
            let data = &final_result.data;
            if let Some(recommendation) = &data.recommendation {
                model.layer3.action = Some(recommendation.clone());
            }
            if let Some(confidence) = &data.confidence {
                model.layer3.confidence = Some(confidence.clone());
            }
            if data.scores.is_some() {
                model.scores = data.scores.clone();
            }
            if data.position_suggestions.is_some() {
                model.position_suggestions = data.position_suggestions.clone();
            }
            // Terminal signal.
            model.progress = progress::COMPLETE;
        }
        StreamEvent::Error(error) => {
            // Partial results stay visible; the caller decides when to stop.
            model.error = Some(error.message.clone());
        }
        StreamEvent::Unknown => {
            debug!("ignoring event with unrecognized type");
        }
    }
}

fn reduce_status(model: &mut ViewModel, status: &StatusEvent) {
    if let Some(name) = &status.stock_name {
        if !name.is_empty() {
            model.stock_name = Some(name.clone());
        }
    }
    if let Some(message) = &status.message {
        model.status_line = Some(message.clone());
    }

    let candidate = status
        .step
        .as_deref()
        .and_then(step_progress)
        .or_else(|| status.layer.and_then(layer_progress));
    match candidate {
        Some(pct) => model.progress = model.progress.max(pct),
        None => debug!(
            step = ?status.step,
            layer = ?status.layer,
            "status with unrecognized step and no usable layer; progress unchanged"
        ),
    }

    if let Some(stage) = status.step.as_deref().and_then(step_stage) {
        model.stage = model.stage.max(stage);
    }
}

fn reduce_agent_output(model: &mut ViewModel, output: &AgentOutputEvent) {
    let Some(role) = AgentRole::parse(&output.role) else {
        debug!(role = %output.role, "ignoring output from unknown role");
        return;
    };
    model.stage = model.stage.max(role.layer());

    let data = &output.data;
    match role {
        AgentRole::FundamentalsAnalyst => model.layer1.fundamental = data.content.clone(),
        AgentRole::SentimentAnalyst => model.layer1.sentiment = data.content.clone(),
        AgentRole::NewsAnalyst => model.layer1.news = data.content.clone(),
        AgentRole::TechnicalAnalyst => model.layer1.technical = data.content.clone(),
        AgentRole::BullishResearcher => {
            model.layer2.bull_score = data.score;
            model.layer2.bull_view = data.content.clone();
        }
        AgentRole::BearishResearcher => {
            model.layer2.bear_score = data.score;
            model.layer2.bear_view = data.content.clone();
        }
        AgentRole::Trader => {
            model.layer3.reasoning = data.content.clone();
            // `final_result` owns action/confidence; trader output only fills
            // the gaps so the two merge the same way in either order.
            if model.layer3.action.is_none() {
                if let Some(recommendation) = data.recommendation.as_deref() {
                    if !recommendation.is_empty() {
                        model.layer3.action = Some(recommendation.to_string());
                    }
                }
            }
            if model.layer3.confidence.is_none() {
                model.layer3.confidence = Some(decision::FALLBACK_CONFIDENCE.to_string());
            }
        }
    }
}

/// Owns one run's `ViewModel`, applying candidate records and publishing the
/// updated model after each one. Single writer by construction.
pub struct StreamAggregator {
    model: ViewModel,
    bus: ModelBus,
}

impl StreamAggregator {
    pub fn new(bus: ModelBus) -> Self {
        Self {
            model: ViewModel::new(),
            bus,
        }
    }

    pub fn model(&self) -> &ViewModel {
        &self.model
    }

    pub fn into_model(self) -> ViewModel {
        self.model
    }

    /// Parse and reduce one candidate record. Returns whether the record was
    /// applied; malformed JSON is skipped with a diagnostic and leaves the
    /// model untouched.
    pub fn apply_line(&mut self, raw: &str) -> bool {
        let raw = raw.trim();
        if raw.is_empty() {
            return false;
        }
        let event = match parse_event(raw) {
            Ok(event) => event,
            Err(e) => {
                warn!(error = %e, "skipping malformed stream record");
                return false;
            }
        };
        reduce(&mut self.model, &event);
        self.bus.publish(self.model.clone());
        true
    }

    /// Reset-for-new-run: clears the model and publishes the blank state.
    pub fn reset(&mut self) {
        self.model.reset();
        self.bus.publish(self.model.clone());
    }
}
