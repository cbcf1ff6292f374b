//! Processing-time and cost estimation.
//!
//! Both are pure functions of the request parameters: an additive base
//! per feature, scaled by a priority multiplier. They size user-facing
//! ETAs and internal cost accounting, not the actual work.

use crate::constants::{cost, estimation};
use crate::model::{GenerationParameters, RequestPriority, ResearchDepth};

fn depth_bonus_seconds(depth: ResearchDepth) -> u32 {
    match depth {
        ResearchDepth::Basic => estimation::DEPTH_BASIC,
        ResearchDepth::Standard => estimation::DEPTH_STANDARD,
        ResearchDepth::Comprehensive => estimation::DEPTH_COMPREHENSIVE,
        ResearchDepth::DeepDive => estimation::DEPTH_DEEP_DIVE,
    }
}

fn depth_cost(depth: ResearchDepth) -> f64 {
    match depth {
        ResearchDepth::Basic => cost::DEPTH_BASIC,
        ResearchDepth::Standard => cost::DEPTH_STANDARD,
        ResearchDepth::Comprehensive => cost::DEPTH_COMPREHENSIVE,
        ResearchDepth::DeepDive => cost::DEPTH_DEEP_DIVE,
    }
}

pub fn priority_multiplier(priority: RequestPriority) -> f64 {
    match priority {
        RequestPriority::Urgent => estimation::URGENT_MULTIPLIER,
        RequestPriority::High => estimation::HIGH_MULTIPLIER,
        RequestPriority::Normal => estimation::NORMAL_MULTIPLIER,
        RequestPriority::Low => estimation::LOW_MULTIPLIER,
    }
}

/// The multipliers as exact ratios. Going through f64 rounds
/// round(85 * 0.7) down to 59 instead of 60.
fn priority_ratio(priority: RequestPriority) -> (u64, u64) {
    match priority {
        RequestPriority::Urgent => (7, 10),
        RequestPriority::High => (17, 20),
        RequestPriority::Normal => (1, 1),
        RequestPriority::Low => (13, 10),
    }
}

/// Estimated processing time in whole seconds, rounded half-up.
pub fn estimate_processing_time(
    parameters: &GenerationParameters,
    priority: RequestPriority,
) -> u64 {
    let mut base = estimation::BASE_SECONDS
        + depth_bonus_seconds(parameters.research_depth)
        + parameters.maximum_ideas * estimation::SECONDS_PER_IDEA
        + parameters.custom_criteria.len() as u32 * estimation::SECONDS_PER_CRITERION;

    if parameters.include_backtesting {
        base += estimation::BACKTESTING_SECONDS;
    }
    if parameters.include_risk_analysis {
        base += estimation::RISK_ANALYSIS_SECONDS;
    }
    if parameters.include_esg_factors {
        base += estimation::ESG_SECONDS;
    }

    let (num, den) = priority_ratio(priority);
    (u64::from(base) * num + den / 2) / den
}

/// Estimated cost in USD, rounded to cents. Same additive shape as the
/// time estimate with per-feature dollar units.
pub fn estimate_cost(parameters: &GenerationParameters, priority: RequestPriority) -> f64 {
    let mut base = cost::BASE_COST
        + depth_cost(parameters.research_depth)
        + f64::from(parameters.maximum_ideas) * cost::COST_PER_IDEA
        + parameters.custom_criteria.len() as f64 * cost::COST_PER_CRITERION;

    if parameters.include_backtesting {
        base += cost::BACKTESTING_COST;
    }
    if parameters.include_risk_analysis {
        base += cost::RISK_ANALYSIS_COST;
    }
    if parameters.include_esg_factors {
        base += cost::ESG_COST;
    }

    (base * priority_multiplier(priority) * 100.0).round() / 100.0
}
