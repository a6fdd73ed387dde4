use crate::envelope::AgentEnvelope;
use crate::error::AnalysisError;
use crate::symbol::TickerSymbol;
use crate::types::{Bar, CompanyFacts, HistoryRange};
use async_trait::async_trait;

/// External quote/history data source, keyed by normalized symbol.
///
/// Implementations fail with `NoData`/`InsufficientData` when the provider
/// has nothing useful for a symbol; transient connectivity failures use the
/// transient error variants so callers can retry them.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    async fn company_facts(&self, symbol: &TickerSymbol) -> Result<CompanyFacts, AnalysisError>;

    async fn price_history(
        &self,
        symbol: &TickerSymbol,
        range: HistoryRange,
    ) -> Result<Vec<Bar>, AnalysisError>;
}

/// Narrative LLM boundary: prompt + compact data context in, free text out.
///
/// Never fails. Returns a placeholder when no backend is configured and an
/// error-describing string when the call itself fails. The text is surfaced
/// to the end user, never parsed.
#[async_trait]
pub trait Narrator: Send + Sync {
    async fn narrate(&self, persona: &str, prompt: &str, context: &serde_json::Value) -> String;
}

/// Shared contract for the per-ticker analysis agents: one `analyze` call
/// producing a standard envelope. Internal errors are caught at this
/// boundary and reported through the envelope, never as `Err`.
#[async_trait]
pub trait TickerAgent: Send + Sync {
    type Profile;

    fn agent_name(&self) -> &'static str;

    async fn analyze(&self, ticker: &TickerSymbol) -> AgentEnvelope<Self::Profile>;
}
