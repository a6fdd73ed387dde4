//! Score aggregation, action mapping, target-price and risk math.
//!
//! Everything here is a pure function of the (possibly absent) upstream
//! profiles. Missing inputs contribute a neutral zero adjustment — the
//! aggregator never errors on degraded upstream data.

use analysis_core::{
    round1, round2, Action, ActionCall, FundamentalProfile, GrowthRating, HealthRating,
    MarketSnapshot, OverallTrend, ProfitabilityRating, RiskAssessment, RiskLevel, ScoreSet,
    SignalBias, TargetPrice, TechnicalProfile, ValuationRating,
};

const BASE_SCORE: i32 = 50;
const FUNDAMENTAL_WEIGHT: f64 = 0.6;
const TECHNICAL_WEIGHT: f64 = 0.4;
const SIGNAL_POINTS: i32 = 3;
const FAIR_PE_EXPANSION: f64 = 1.2;
const FAIR_PE_CAP: f64 = 40.0;

fn profitability_delta(rating: ProfitabilityRating) -> i32 {
    match rating {
        ProfitabilityRating::Strong => 20,
        ProfitabilityRating::Good => 15,
        ProfitabilityRating::Moderate => 5,
        ProfitabilityRating::Weak => -10,
    }
}

fn valuation_delta(rating: ValuationRating) -> i32 {
    match rating {
        ValuationRating::Undervalued => 20,
        ValuationRating::Attractive => 15,
        ValuationRating::Fair => 5,
        ValuationRating::Premium => -5,
        ValuationRating::Expensive => -15,
        ValuationRating::NegativeEarnings | ValuationRating::Unknown => 0,
    }
}

fn health_delta(rating: HealthRating) -> i32 {
    match rating {
        HealthRating::Strong => 15,
        HealthRating::Healthy => 10,
        HealthRating::Moderate => 0,
        HealthRating::NeedsAttention => -15,
    }
}

fn growth_delta(rating: GrowthRating) -> i32 {
    match rating {
        GrowthRating::HighGrowth => 15,
        GrowthRating::ModerateGrowth => 10,
        GrowthRating::LowGrowth => 0,
        GrowthRating::Declining => -15,
        GrowthRating::Unknown => 0,
    }
}

fn trend_delta(trend: OverallTrend) -> i32 {
    match trend {
        OverallTrend::StrongBullish => 25,
        OverallTrend::Bullish => 15,
        OverallTrend::Neutral => 0,
        OverallTrend::Bearish => -20,
    }
}

fn bias_delta(bias: SignalBias) -> i32 {
    match bias {
        SignalBias::Bullish => 15,
        SignalBias::Neutral => 0,
        SignalBias::Bearish => -15,
    }
}

pub fn fundamental_score(profile: Option<&FundamentalProfile>) -> i32 {
    let mut score = BASE_SCORE;
    if let Some(p) = profile {
        score += profitability_delta(p.profitability.assessment);
        score += valuation_delta(p.valuation.assessment);
        score += health_delta(p.financial_health.assessment);
        score += growth_delta(p.growth.assessment);
    }
    score.clamp(0, 100)
}

pub fn technical_score(profile: Option<&TechnicalProfile>) -> i32 {
    let mut score = BASE_SCORE;
    if let Some(p) = profile {
        score += trend_delta(p.trend.overall_trend);
        score += bias_delta(p.signals.overall_signal);
        score += SIGNAL_POINTS * p.signals.bullish_signals.len() as i32;
        score -= SIGNAL_POINTS * p.signals.bearish_signals.len() as i32;
    }
    score.clamp(0, 100)
}

pub fn score_set(
    fundamental: Option<&FundamentalProfile>,
    technical: Option<&TechnicalProfile>,
) -> ScoreSet {
    let fundamental_score = fundamental_score(fundamental);
    let technical_score = technical_score(technical);
    let overall_score = (fundamental_score as f64 * FUNDAMENTAL_WEIGHT
        + technical_score as f64 * TECHNICAL_WEIGHT)
        .floor() as i32;

    ScoreSet {
        fundamental_score,
        technical_score,
        overall_score,
    }
}

pub fn action_for_score(overall: i32) -> Action {
    if overall >= 75 {
        Action::StrongBuy
    } else if overall >= 60 {
        Action::Buy
    } else if overall >= 45 {
        Action::Hold
    } else if overall >= 30 {
        Action::Reduce
    } else {
        Action::Sell
    }
}

pub fn make_action_call(scores: &ScoreSet) -> ActionCall {
    let action = action_for_score(scores.overall_score);
    ActionCall {
        action,
        description: action.rationale().to_string(),
        score: scores.overall_score,
    }
}

/// Target price range. Prefers a capped fair-P/E expansion when a trailing
/// P/E and positive revenue growth are both known, otherwise anchors the
/// mid target to the nearest resistance level.
pub fn target_price(
    market: Option<&MarketSnapshot>,
    fundamental: Option<&FundamentalProfile>,
    technical: Option<&TechnicalProfile>,
) -> TargetPrice {
    let current = market.map(|m| m.price.current_price).unwrap_or(0.0);
    if current <= 0.0 {
        return TargetPrice::zero();
    }

    let resistance = technical
        .map(|t| t.support_resistance.nearest_resistance)
        .filter(|r| *r > 0.0)
        .unwrap_or(current * 1.1);

    let pe = fundamental.and_then(|f| f.valuation.pe_ratio);
    let growth = fundamental.and_then(|f| f.growth.revenue_growth);

    let mid = match (pe, growth) {
        (Some(pe), Some(growth)) if pe > 0.0 && growth > 0.0 => {
            let fair_pe = (pe * FAIR_PE_EXPANSION).min(FAIR_PE_CAP);
            current * (fair_pe / pe)
        }
        _ => resistance,
    };

    let low = current * 0.95;
    let high = (mid * 1.1).min(resistance * 1.05);
    let upside = (mid - current) / current * 100.0;

    TargetPrice {
        low: round2(low),
        mid: round2(mid),
        high: round2(high),
        upside_percent: round1(upside),
    }
}

/// Accumulate risk points in a fixed evaluation order; only matched
/// conditions appear in the factor list.
pub fn assess_risk(
    fundamental: Option<&FundamentalProfile>,
    technical: Option<&TechnicalProfile>,
) -> RiskAssessment {
    let mut score = 0;
    let mut factors = Vec::new();

    if let Some(f) = fundamental {
        if f.financial_health.debt_to_equity.is_some_and(|d| d > 1.0) {
            factors.push("High debt levels".to_string());
            score += 20;
        }
        if matches!(
            f.profitability.assessment,
            ProfitabilityRating::Weak | ProfitabilityRating::Moderate
        ) {
            factors.push("Weak profitability".to_string());
            score += 15;
        }
        if f.growth.assessment == GrowthRating::Declining {
            factors.push("Declining growth".to_string());
            score += 15;
        }
    }

    if let Some(t) = technical {
        if t.indicators.atr.volatility == analysis_core::VolatilityLevel::High {
            factors.push("High price volatility".to_string());
            score += 15;
        }
        if t.trend.overall_trend == OverallTrend::Bearish {
            factors.push("Bearish price trend".to_string());
            score += 20;
        }
    }

    let level = if score >= 50 {
        RiskLevel::High
    } else if score >= 30 {
        RiskLevel::Moderate
    } else {
        RiskLevel::Low
    };

    RiskAssessment {
        level,
        score,
        factors,
    }
}

/// Bullish factor summary: fundamental conditions in fixed priority order,
/// then up to three technical signals, capped at five total.
pub fn bullish_factors(
    fundamental: Option<&FundamentalProfile>,
    technical: Option<&TechnicalProfile>,
) -> Vec<String> {
    let mut factors = Vec::new();

    if let Some(f) = fundamental {
        if matches!(
            f.profitability.assessment,
            ProfitabilityRating::Strong | ProfitabilityRating::Good
        ) {
            factors.push("Strong profitability".to_string());
        }
        if matches!(
            f.valuation.assessment,
            ValuationRating::Undervalued | ValuationRating::Attractive
        ) {
            factors.push("Attractive valuation".to_string());
        }
        if matches!(
            f.growth.assessment,
            GrowthRating::HighGrowth | GrowthRating::ModerateGrowth
        ) {
            factors.push("Growing revenue".to_string());
        }
        if matches!(
            f.financial_health.assessment,
            HealthRating::Strong | HealthRating::Healthy
        ) {
            factors.push("Healthy balance sheet".to_string());
        }
    }

    if let Some(t) = technical {
        factors.extend(t.signals.bullish_signals.iter().take(3).cloned());
    }

    factors.truncate(5);
    factors
}

pub fn bearish_factors(
    fundamental: Option<&FundamentalProfile>,
    technical: Option<&TechnicalProfile>,
) -> Vec<String> {
    let mut factors = Vec::new();

    if let Some(f) = fundamental {
        if f.profitability.assessment == ProfitabilityRating::Weak {
            factors.push("Weak profitability".to_string());
        }
        if f.valuation.assessment == ValuationRating::Expensive {
            factors.push("Expensive valuation".to_string());
        }
        if f.growth.assessment == GrowthRating::Declining {
            factors.push("Revenue decline".to_string());
        }
        if f.financial_health.assessment == HealthRating::NeedsAttention {
            factors.push("Balance sheet concerns".to_string());
        }
    }

    if let Some(t) = technical {
        factors.extend(t.signals.bearish_signals.iter().take(3).cloned());
    }

    factors.truncate(5);
    factors
}

/// Fixed confidence blend: fundamentals dominate, technicals are secondary,
/// market-data confidence mostly reflects data availability.
pub fn weighted_confidence(market: f64, fundamental: f64, technical: f64) -> f64 {
    round2(market * 0.2 + fundamental * 0.5 + technical * 0.3)
}
