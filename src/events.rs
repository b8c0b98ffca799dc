use serde::Deserialize;
use serde_json::Value;

/// One decoded NDJSON record from the analysis stream.
///
/// The backend tags every record with a `type` field; payload shape depends on
/// the tag. Records carry no sequence number, so ordering is whatever the
/// stream delivered. Unrecognized tags decode to `Unknown` and reduce to a
/// no-op instead of failing the run.
#[derive(Clone, Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamEvent {
    Status(StatusEvent),
    LayerStart(LayerStartEvent),
    AgentOutput(AgentOutputEvent),
    DebateTriggered(DebateEvent),
    DebateResult(DebateEvent),
    RiskAssessment(RiskAssessmentEvent),
    FinalResult(FinalResultEvent),
    Error(ErrorEvent),
    #[serde(other)]
    Unknown,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct StatusEvent {
    #[serde(default)]
    pub step: Option<String>,
    #[serde(default)]
    pub layer: Option<u8>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub stock_name: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct LayerStartEvent {
    #[serde(default)]
    pub layer: Option<u8>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct AgentOutputEvent {
    /// Raw role string; resolved through `AgentRole::parse` in the reducer so
    /// roles added by newer backends are skipped, not rejected.
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub layer: Option<u8>,
    #[serde(default)]
    pub data: AgentData,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct AgentData {
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub recommendation: Option<String>,
    #[serde(default)]
    pub position: Option<Value>,
    #[serde(default)]
    pub timestamp: Option<String>,
}

/// `debate_triggered` / `debate_result` payloads are display-only; the raw
/// value is retained without further interpretation.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct DebateEvent {
    #[serde(default)]
    pub data: Value,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct RiskAssessmentEvent {
    #[serde(default)]
    pub data: RiskData,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct RiskData {
    #[serde(default)]
    pub aggressive: Option<String>,
    /// The wire calls the middle strategy "neutral"; the view model exposes it
    /// as "balanced".
    #[serde(default)]
    pub neutral: Option<String>,
    #[serde(default)]
    pub conservative: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct FinalResultEvent {
    #[serde(default)]
    pub data: FinalData,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct FinalData {
    #[serde(default)]
    pub recommendation: Option<String>,
    #[serde(default)]
    pub confidence: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub scores: Option<Value>,
    #[serde(default)]
    pub position_suggestions: Option<Value>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct ErrorEvent {
    #[serde(default)]
    pub message: String,
}

/// Enumerated identity of one agent in the pipeline. Each role belongs to
/// exactly one of the four layers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AgentRole {
    FundamentalsAnalyst,
    SentimentAnalyst,
    NewsAnalyst,
    TechnicalAnalyst,
    BullishResearcher,
    BearishResearcher,
    Trader,
}

impl AgentRole {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "fundamentals_analyst" => Some(Self::FundamentalsAnalyst),
            "sentiment_analyst" => Some(Self::SentimentAnalyst),
            "news_analyst" => Some(Self::NewsAnalyst),
            "technical_analyst" => Some(Self::TechnicalAnalyst),
            "bullish_researcher" => Some(Self::BullishResearcher),
            "bearish_researcher" => Some(Self::BearishResearcher),
            "trader" => Some(Self::Trader),
            _ => None,
        }
    }

    /// Static role -> layer table: 1 analysts, 2 debate, 3 trader.
    pub fn layer(self) -> u8 {
        match self {
            Self::FundamentalsAnalyst
            | Self::SentimentAnalyst
            | Self::NewsAnalyst
            | Self::TechnicalAnalyst => 1,
            Self::BullishResearcher | Self::BearishResearcher => 2,
            Self::Trader => 3,
        }
    }
}

/// Stage implied by a `status` event's `step`, by role family. Steps that
/// don't belong to a role family (init, initialized, complete) imply nothing.
pub fn step_stage(step: &str) -> Option<u8> {
    if let Some(role) = AgentRole::parse(step) {
        return Some(role.layer());
    }
    match step {
        "researcher_debate" => Some(2),
        "risk_assessment" | "portfolio_manager" => Some(4),
        _ => None,
    }
}
