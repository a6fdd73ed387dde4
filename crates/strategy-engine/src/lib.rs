//! Recommendation aggregator: combines the market snapshot, fundamental
//! profile and technical profile envelopes into one weighted verdict.

use analysis_core::{
    AgentEnvelope, FundamentalProfile, KeyFactors, MarketSnapshot, Narrator, Recommendation,
    TechnicalProfile, TickerSymbol,
};
use std::sync::Arc;

pub mod scoring;

pub use scoring::{
    action_for_score, assess_risk, bearish_factors, bullish_factors, fundamental_score,
    make_action_call, score_set, target_price, technical_score, weighted_confidence,
};

pub const AGENT_NAME: &str = "Investment Strategist";
const PERSONA: &str = "senior investment strategist who synthesizes market data, fundamental \
                       analysis, and technical analysis to provide actionable investment \
                       recommendations";

#[derive(Clone)]
pub struct StrategyAgent {
    narrator: Arc<dyn Narrator>,
}

impl StrategyAgent {
    pub fn new(narrator: Arc<dyn Narrator>) -> Self {
        Self { narrator }
    }

    /// Aggregate the three upstream envelopes. Tolerates any of them being
    /// failed or partially populated — absent inputs contribute a neutral
    /// adjustment, so this agent itself only ever reports success.
    pub async fn analyze(
        &self,
        ticker: &TickerSymbol,
        market: &AgentEnvelope<MarketSnapshot>,
        fundamental: &AgentEnvelope<FundamentalProfile>,
        technical: &AgentEnvelope<TechnicalProfile>,
    ) -> AgentEnvelope<Recommendation> {
        let market_data = market.data.as_ref();
        let fundamental_data = fundamental.data.as_ref();
        let technical_data = technical.data.as_ref();

        let scores = score_set(fundamental_data, technical_data);
        let action_call = make_action_call(&scores);
        let target = target_price(market_data, fundamental_data, technical_data);
        let risk = assess_risk(fundamental_data, technical_data);
        let key_factors = KeyFactors {
            bullish: bullish_factors(fundamental_data, technical_data),
            bearish: bearish_factors(fundamental_data, technical_data),
        };

        let prompt = format!(
            "As a senior investment strategist, provide a comprehensive investment \
             recommendation for {ticker}.\n\n\
             Based on the analysis:\n\
             - Fundamental Score: {}/100\n\
             - Technical Score: {}/100\n\
             - Overall Score: {}/100\n\n\
             Key Bullish Factors: {:?}\n\
             Key Bearish Factors: {:?}\n\n\
             Recommendation: {}\n\
             Target Price Range: ₹{} - ₹{}\n\
             Risk Level: {:?}\n\n\
             Provide:\n\
             1. Clear investment thesis\n\
             2. Key reasons for your recommendation\n\
             3. What would change your view\n\
             4. Suggested investment horizon\n\
             5. Position sizing advice based on risk\n\n\
             Be specific and actionable.",
            scores.fundamental_score,
            scores.technical_score,
            scores.overall_score,
            key_factors.bullish,
            key_factors.bearish,
            action_call.action.as_str(),
            target.low,
            target.high,
            risk.level,
        );
        let context = serde_json::json!({
            "current_price": market_data.map(|m| m.price.current_price),
            "pe_ratio": fundamental_data.and_then(|f| f.valuation.pe_ratio),
            "roe": fundamental_data.and_then(|f| f.profitability.roe),
            "trend": technical_data.map(|t| t.trend.overall_trend),
            "rsi": technical_data.and_then(|t| t.indicators.rsi.current),
        });
        let insight = self.narrator.narrate(PERSONA, &prompt, &context).await;

        let confidence =
            weighted_confidence(market.confidence, fundamental.confidence, technical.confidence);

        let recommendation = Recommendation {
            scores,
            recommendation: action_call,
            target_price: target,
            risk_assessment: risk,
            key_factors,
        };

        tracing::info!(
            ticker = %ticker,
            overall_score = recommendation.scores.overall_score,
            action = recommendation.recommendation.action.as_str(),
            "Generated recommendation"
        );

        AgentEnvelope::success(AGENT_NAME, recommendation, insight, confidence)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use analysis_core::{Action, RiskLevel};
    use async_trait::async_trait;

    struct SilentNarrator;

    #[async_trait]
    impl Narrator for SilentNarrator {
        async fn narrate(
            &self,
            _persona: &str,
            _prompt: &str,
            _context: &serde_json::Value,
        ) -> String {
            "narrative".to_string()
        }
    }

    fn agent() -> StrategyAgent {
        StrategyAgent::new(Arc::new(SilentNarrator))
    }

    #[tokio::test]
    async fn degraded_upstreams_still_produce_a_recommendation() {
        let ticker = TickerSymbol::parse("TCS").unwrap();
        let market: AgentEnvelope<MarketSnapshot> =
            AgentEnvelope::failure("Market Data Agent", "fetch failed");
        let fundamental: AgentEnvelope<FundamentalProfile> =
            AgentEnvelope::failure("Fundamental Analyst", "boom");
        let technical: AgentEnvelope<TechnicalProfile> =
            AgentEnvelope::failure("Technical Analyst", "boom");

        let envelope = agent()
            .analyze(&ticker, &market, &fundamental, &technical)
            .await;

        assert!(envelope.is_success());
        let recommendation = envelope.data.unwrap();
        assert_eq!(recommendation.scores.fundamental_score, 50);
        assert_eq!(recommendation.scores.technical_score, 50);
        assert_eq!(recommendation.recommendation.action, Action::Hold);
        assert_eq!(recommendation.target_price.mid, 0.0);
        assert_eq!(recommendation.risk_assessment.level, RiskLevel::Low);
        assert!(recommendation.key_factors.bullish.is_empty());
        // failed upstreams carry zero confidence into the blend
        assert_eq!(envelope.confidence, 0.0);
    }

    #[tokio::test]
    async fn confidence_blends_upstream_envelope_confidences() {
        let ticker = TickerSymbol::parse("TCS").unwrap();
        let mut market: AgentEnvelope<MarketSnapshot> =
            AgentEnvelope::failure("Market Data Agent", "fetch failed");
        market.confidence = 0.85;
        let mut fundamental: AgentEnvelope<FundamentalProfile> =
            AgentEnvelope::failure("Fundamental Analyst", "x");
        fundamental.confidence = 0.9;
        let mut technical: AgentEnvelope<TechnicalProfile> =
            AgentEnvelope::failure("Technical Analyst", "x");
        technical.confidence = 0.6;

        let envelope = agent()
            .analyze(&ticker, &market, &fundamental, &technical)
            .await;
        assert_eq!(envelope.confidence, 0.8);
    }
}
