use serde::Serialize;
use serde_json::Value;

/// Layer 1: the four analyst reports. Absent means "not yet received",
/// never "empty result".
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalystPanel {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fundamental: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sentiment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub news: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub technical: Option<String>,
}

/// Layer 2: bull/bear researcher positions.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DebatePanel {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bull_score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bull_view: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bear_score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bear_view: Option<String>,
}

/// Layer 3: the trading decision. `final_result` owns `action` and
/// `confidence`; the trader's own output owns `reasoning` and only falls back
/// into the other two when they are still unset.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionPanel {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
}

/// Layer 4: the three risk-management position strategies.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskPanel {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aggressive: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub balanced: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conservative: Option<String>,
}

/// Accumulated state of one analysis run, owned by the aggregator and
/// mutated only through its reducer.
///
/// `stage` and `progress` are monotone within a run; everything else is
/// last-write-wins per field. Serialized camelCase so the JSON matches the
/// field names the renderers consume (`bullScore`, `bullView`, ...).
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewModel {
    /// Highest layer (1-4) that has started producing output; 0 before any.
    pub stage: u8,
    /// Best-effort completion estimate in percent.
    pub progress: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stock_name: Option<String>,
    /// Latest human-readable status message from the backend.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_line: Option<String>,
    pub layer1: AnalystPanel,
    pub layer2: DebatePanel,
    pub layer3: DecisionPanel,
    pub layer4: RiskPanel,
    /// Raw debate payload, retained for display only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debate: Option<Value>,
    /// Raw per-agent score summary from `final_result`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scores: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position_suggestions: Option<Value>,
    /// Set once a protocol-level `error` event arrives; accumulated layer
    /// data stays visible alongside it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ViewModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset-for-new-run: clears everything back to the initial state.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn failed(&self) -> bool {
        self.error.is_some()
    }

    pub fn finished(&self) -> bool {
        self.progress >= 100
    }
}
