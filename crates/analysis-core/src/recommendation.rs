use serde::{Deserialize, Serialize};

/// Aggregate scores, clamped to [0, 100].
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ScoreSet {
    pub fundamental_score: i32,
    pub technical_score: i32,
    pub overall_score: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    #[serde(rename = "Strong Buy")]
    StrongBuy,
    Buy,
    Hold,
    Reduce,
    Sell,
}

impl Action {
    pub fn rationale(&self) -> &'static str {
        match self {
            Action::StrongBuy => "Excellent fundamentals and favorable technical setup",
            Action::Buy => "Good investment opportunity with positive outlook",
            Action::Hold => "Maintain existing positions, wait for better entry",
            Action::Reduce => "Consider reducing exposure, elevated risks",
            Action::Sell => "Unfavorable outlook, consider exiting position",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::StrongBuy => "Strong Buy",
            Action::Buy => "Buy",
            Action::Hold => "Hold",
            Action::Reduce => "Reduce",
            Action::Sell => "Sell",
        }
    }
}

/// Action verdict with its fixed rationale and the score that produced it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionCall {
    pub action: Action,
    pub description: String,
    pub score: i32,
}

/// Target price range. All zero when no current price is available.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TargetPrice {
    pub low: f64,
    pub mid: f64,
    pub high: f64,
    pub upside_percent: f64,
}

impl TargetPrice {
    pub fn zero() -> Self {
        Self {
            low: 0.0,
            mid: 0.0,
            high: 0.0,
            upside_percent: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLevel {
    High,
    Moderate,
    Low,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub level: RiskLevel,
    pub score: i32,
    pub factors: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyFactors {
    pub bullish: Vec<String>,
    pub bearish: Vec<String>,
}

/// Terminal artifact of the pipeline, owned by the caller once returned.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendation {
    pub scores: ScoreSet,
    pub recommendation: ActionCall,
    pub target_price: TargetPrice,
    pub risk_assessment: RiskAssessment,
    pub key_factors: KeyFactors,
}
