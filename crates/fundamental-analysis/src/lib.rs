//! Fundamental profile agent: profitability, valuation, balance-sheet,
//! growth, cash-flow and dividend assessments from fixed threshold tables.
//!
//! Every metric tolerates absence — the upstream company-info mapping has no
//! schema guarantee, and a missing field degrades the category to its
//! neutral label instead of failing the agent.

use analysis_core::{
    round2, to_percent, AgentEnvelope, AnalysisError, BalanceSheetMetrics, CashFlowMetrics,
    CashFlowRating, CompanyFacts, DividendMetrics, FundamentalProfile, GrowthMetrics,
    GrowthRating, HealthRating, MarketDataProvider, Narrator, ProfitabilityMetrics,
    ProfitabilityRating, TickerAgent, TickerSymbol, ValuationMetrics, ValuationRating,
};
use async_trait::async_trait;
use std::sync::Arc;

pub const AGENT_NAME: &str = "Fundamental Analyst";
const PERSONA: &str = "expert financial analyst specializing in fundamental analysis, \
                       financial statements, and valuation metrics";

#[derive(Clone)]
pub struct FundamentalAgent {
    provider: Arc<dyn MarketDataProvider>,
    narrator: Arc<dyn Narrator>,
}

impl FundamentalAgent {
    pub fn new(provider: Arc<dyn MarketDataProvider>, narrator: Arc<dyn Narrator>) -> Self {
        Self { provider, narrator }
    }

    async fn build(
        &self,
        ticker: &TickerSymbol,
    ) -> Result<AgentEnvelope<FundamentalProfile>, AnalysisError> {
        let facts = self.provider.company_facts(ticker).await?;
        let profile = build_profile(&facts);
        let confidence = profile_confidence(&profile);

        let context = serde_json::json!({
            "pe_ratio": profile.valuation.pe_ratio,
            "pb_ratio": profile.valuation.pb_ratio,
            "roe": profile.profitability.roe,
            "debt_to_equity": profile.financial_health.debt_to_equity,
            "revenue_growth": profile.growth.revenue_growth,
            "profit_margin": profile.profitability.profit_margin,
            "current_ratio": profile.financial_health.current_ratio,
            "free_cashflow": profile.cash_flow.free_cash_flow,
            "dividend_yield": profile.dividends.dividend_yield,
        });
        let prompt = format!(
            "Analyze the fundamental health of {} based on the following key metrics.\n\n\
             Evaluate:\n\
             1. Is the company profitable and growing?\n\
             2. Is the valuation reasonable compared to growth?\n\
             3. Is the balance sheet healthy?\n\
             4. What are the key strengths and concerns?\n\n\
             Provide a clear, structured analysis suitable for an investor.",
            ticker.base()
        );
        let insight = self.narrator.narrate(PERSONA, &prompt, &context).await;

        Ok(AgentEnvelope::success(AGENT_NAME, profile, insight, confidence))
    }
}

#[async_trait]
impl TickerAgent for FundamentalAgent {
    type Profile = FundamentalProfile;

    fn agent_name(&self) -> &'static str {
        AGENT_NAME
    }

    async fn analyze(&self, ticker: &TickerSymbol) -> AgentEnvelope<FundamentalProfile> {
        match self.build(ticker).await {
            Ok(envelope) => envelope,
            Err(err) => {
                tracing::warn!(ticker = %ticker, error = %err, "Fundamental analysis failed");
                AgentEnvelope::failure(AGENT_NAME, err)
            }
        }
    }
}

pub fn build_profile(facts: &CompanyFacts) -> FundamentalProfile {
    FundamentalProfile {
        profitability: ProfitabilityMetrics {
            gross_margin: facts.gross_margins.map(to_percent),
            operating_margin: facts.operating_margins.map(to_percent),
            profit_margin: facts.profit_margins.map(to_percent),
            roe: facts.return_on_equity.map(to_percent),
            roa: facts.return_on_assets.map(to_percent),
            assessment: assess_profitability(facts.return_on_equity, facts.profit_margins),
        },
        valuation: ValuationMetrics {
            pe_ratio: facts.trailing_pe.map(round2),
            forward_pe: facts.forward_pe.map(round2),
            peg_ratio: facts.peg_ratio.map(round2),
            pb_ratio: facts.price_to_book.map(round2),
            ps_ratio: facts.price_to_sales.map(round2),
            ev_to_ebitda: facts.ev_to_ebitda.map(round2),
            assessment: assess_valuation(facts.trailing_pe, facts.peg_ratio),
        },
        financial_health: BalanceSheetMetrics {
            current_ratio: facts.current_ratio.map(round2),
            quick_ratio: facts.quick_ratio.map(round2),
            debt_to_equity: facts.debt_to_equity.map(round2),
            total_debt: facts.total_debt,
            total_cash: facts.total_cash,
            net_debt: net_debt(facts),
            assessment: assess_financial_health(facts.current_ratio, facts.debt_to_equity),
        },
        growth: GrowthMetrics {
            revenue_growth: facts.revenue_growth.map(to_percent),
            earnings_growth: facts.earnings_growth.map(to_percent),
            earnings_quarterly_growth: facts.earnings_quarterly_growth.map(to_percent),
            revenue_per_share: facts.revenue_per_share,
            assessment: assess_growth(facts.revenue_growth),
        },
        cash_flow: CashFlowMetrics {
            operating_cash_flow: facts.operating_cashflow,
            free_cash_flow: facts.free_cashflow,
            fcf_margin: fcf_margin(facts),
            assessment: match facts.free_cashflow {
                Some(fcf) if fcf > 0.0 => CashFlowRating::Positive,
                _ => CashFlowRating::NeedsAttention,
            },
        },
        dividends: DividendMetrics {
            dividend_yield: facts.dividend_yield.map(to_percent),
            payout_ratio: facts.payout_ratio.map(to_percent),
            dividend_rate: facts.dividend_rate,
            is_dividend_payer: facts.dividend_yield.is_some_and(|y| y > 0.0),
        },
    }
}

/// ROE and net margin are fractional here (0.15 = 15%).
fn assess_profitability(roe: Option<f64>, margin: Option<f64>) -> ProfitabilityRating {
    match (roe, margin) {
        (Some(r), Some(m)) if r > 0.15 && m > 0.10 => ProfitabilityRating::Strong,
        (Some(r), Some(m)) if r > 0.10 && m > 0.05 => ProfitabilityRating::Good,
        (Some(r), _) if r > 0.0 => ProfitabilityRating::Moderate,
        _ => ProfitabilityRating::Weak,
    }
}

fn assess_valuation(pe: Option<f64>, peg: Option<f64>) -> ValuationRating {
    let Some(pe) = pe else {
        return ValuationRating::Unknown;
    };
    if pe < 0.0 {
        return ValuationRating::NegativeEarnings;
    }
    if peg.is_some_and(|p| p < 1.0) {
        return ValuationRating::Undervalued;
    }
    if pe < 15.0 {
        ValuationRating::Attractive
    } else if pe < 25.0 {
        ValuationRating::Fair
    } else if pe < 40.0 {
        ValuationRating::Premium
    } else {
        ValuationRating::Expensive
    }
}

/// Debt-to-equity is a ratio (1.0 = equal debt and equity).
fn assess_financial_health(
    current_ratio: Option<f64>,
    debt_to_equity: Option<f64>,
) -> HealthRating {
    match (current_ratio, debt_to_equity) {
        (Some(cr), Some(de)) if cr > 1.5 && de < 0.5 => HealthRating::Strong,
        (Some(cr), Some(de)) if cr > 1.0 && de < 1.0 => HealthRating::Healthy,
        (Some(cr), _) if cr > 0.8 => HealthRating::Moderate,
        _ => HealthRating::NeedsAttention,
    }
}

/// Revenue growth is fractional (0.20 = 20%).
fn assess_growth(revenue_growth: Option<f64>) -> GrowthRating {
    match revenue_growth {
        Some(g) if g > 0.20 => GrowthRating::HighGrowth,
        Some(g) if g > 0.10 => GrowthRating::ModerateGrowth,
        Some(g) if g > 0.0 => GrowthRating::LowGrowth,
        Some(g) if g < 0.0 => GrowthRating::Declining,
        _ => GrowthRating::Unknown,
    }
}

fn net_debt(facts: &CompanyFacts) -> Option<f64> {
    match (facts.total_debt, facts.total_cash) {
        (Some(debt), Some(cash)) => Some(debt - cash),
        _ => None,
    }
}

fn fcf_margin(facts: &CompanyFacts) -> Option<f64> {
    match (facts.free_cashflow, facts.total_revenue) {
        (Some(fcf), Some(revenue)) if revenue > 0.0 => Some(round2(fcf / revenue * 100.0)),
        _ => None,
    }
}

/// Confidence grows with the number of assessable core categories.
pub fn profile_confidence(profile: &FundamentalProfile) -> f64 {
    let assessable = [
        profile.profitability.assessment != ProfitabilityRating::Weak
            || profile.profitability.roe.is_some(),
        profile.valuation.assessment != ValuationRating::Unknown,
        profile.financial_health.current_ratio.is_some()
            || profile.financial_health.debt_to_equity.is_some(),
        profile.growth.assessment != GrowthRating::Unknown,
    ]
    .iter()
    .filter(|&&present| present)
    .count();

    0.5 + assessable as f64 * 0.1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profitability_tiers() {
        assert_eq!(
            assess_profitability(Some(0.18), Some(0.12)),
            ProfitabilityRating::Strong
        );
        assert_eq!(
            assess_profitability(Some(0.12), Some(0.06)),
            ProfitabilityRating::Good
        );
        assert_eq!(
            assess_profitability(Some(0.05), Some(0.01)),
            ProfitabilityRating::Moderate
        );
        assert_eq!(
            assess_profitability(Some(-0.05), Some(0.2)),
            ProfitabilityRating::Weak
        );
        assert_eq!(assess_profitability(None, None), ProfitabilityRating::Weak);
        // strong margin alone is not enough without ROE
        assert_eq!(
            assess_profitability(None, Some(0.2)),
            ProfitabilityRating::Weak
        );
    }

    #[test]
    fn valuation_tiers() {
        assert_eq!(assess_valuation(None, None), ValuationRating::Unknown);
        assert_eq!(
            assess_valuation(Some(-4.0), None),
            ValuationRating::NegativeEarnings
        );
        assert_eq!(
            assess_valuation(Some(30.0), Some(0.8)),
            ValuationRating::Undervalued
        );
        assert_eq!(assess_valuation(Some(12.0), None), ValuationRating::Attractive);
        assert_eq!(assess_valuation(Some(20.0), None), ValuationRating::Fair);
        assert_eq!(assess_valuation(Some(32.0), None), ValuationRating::Premium);
        assert_eq!(assess_valuation(Some(55.0), Some(2.8)), ValuationRating::Expensive);
    }

    #[test]
    fn health_tiers_use_ratio_units() {
        assert_eq!(
            assess_financial_health(Some(2.0), Some(0.3)),
            HealthRating::Strong
        );
        assert_eq!(
            assess_financial_health(Some(1.2), Some(0.8)),
            HealthRating::Healthy
        );
        assert_eq!(
            assess_financial_health(Some(0.9), Some(2.5)),
            HealthRating::Moderate
        );
        assert_eq!(
            assess_financial_health(Some(0.5), None),
            HealthRating::NeedsAttention
        );
        assert_eq!(
            assess_financial_health(None, Some(0.2)),
            HealthRating::NeedsAttention
        );
    }

    #[test]
    fn growth_tiers() {
        assert_eq!(assess_growth(Some(0.25)), GrowthRating::HighGrowth);
        assert_eq!(assess_growth(Some(0.15)), GrowthRating::ModerateGrowth);
        assert_eq!(assess_growth(Some(0.05)), GrowthRating::LowGrowth);
        assert_eq!(assess_growth(Some(-0.08)), GrowthRating::Declining);
        assert_eq!(assess_growth(None), GrowthRating::Unknown);
        assert_eq!(assess_growth(Some(0.0)), GrowthRating::Unknown);
    }

    #[test]
    fn profile_from_rich_facts() {
        let facts = CompanyFacts {
            return_on_equity: Some(0.22),
            profit_margins: Some(0.15),
            gross_margins: Some(0.42),
            trailing_pe: Some(14.2),
            current_ratio: Some(1.8),
            debt_to_equity: Some(0.35),
            revenue_growth: Some(0.18),
            total_debt: Some(5_000.0),
            total_cash: Some(7_000.0),
            free_cashflow: Some(1_200.0),
            total_revenue: Some(24_000.0),
            dividend_yield: Some(0.012),
            ..CompanyFacts::default()
        };
        let profile = build_profile(&facts);

        assert_eq!(profile.profitability.assessment, ProfitabilityRating::Strong);
        assert_eq!(profile.profitability.roe, Some(22.0));
        assert_eq!(profile.valuation.assessment, ValuationRating::Attractive);
        assert_eq!(profile.financial_health.assessment, HealthRating::Strong);
        assert_eq!(profile.financial_health.net_debt, Some(-2_000.0));
        assert_eq!(profile.growth.assessment, GrowthRating::ModerateGrowth);
        assert_eq!(profile.cash_flow.assessment, CashFlowRating::Positive);
        assert_eq!(profile.cash_flow.fcf_margin, Some(5.0));
        assert!(profile.dividends.is_dividend_payer);

        assert_eq!(profile_confidence(&profile), 0.9);
    }

    #[test]
    fn empty_facts_degrade_not_panic() {
        let profile = build_profile(&CompanyFacts::default());
        assert_eq!(profile.profitability.assessment, ProfitabilityRating::Weak);
        assert_eq!(profile.valuation.assessment, ValuationRating::Unknown);
        assert_eq!(
            profile.financial_health.assessment,
            HealthRating::NeedsAttention
        );
        assert_eq!(profile.growth.assessment, GrowthRating::Unknown);
        assert_eq!(profile.cash_flow.assessment, CashFlowRating::NeedsAttention);
        assert!(!profile.dividends.is_dividend_payer);

        let confidence = profile_confidence(&profile);
        assert!(confidence >= 0.5 && confidence < 0.9);
    }
}
