//! Application-wide constants and magic numbers
//!
//! This module centralizes all hardcoded values to improve maintainability
//! and make the codebase easier to tune.

/// Processing-time estimation constants (seconds)
pub mod estimation {
    /// Flat base added to every estimate
    pub const BASE_SECONDS: u32 = 30;

    /// Seconds added per requested idea
    pub const SECONDS_PER_IDEA: u32 = 5;

    /// Seconds added per custom screening criterion
    pub const SECONDS_PER_CRITERION: u32 = 10;

    /// Research depth bonuses
    pub const DEPTH_BASIC: u32 = 10;
    pub const DEPTH_STANDARD: u32 = 30;
    pub const DEPTH_COMPREHENSIVE: u32 = 60;
    pub const DEPTH_DEEP_DIVE: u32 = 120;

    /// Optional feature surcharges
    pub const BACKTESTING_SECONDS: u32 = 45;
    pub const RISK_ANALYSIS_SECONDS: u32 = 30;
    pub const ESG_SECONDS: u32 = 20;

    /// Priority multipliers applied to the additive base
    pub const URGENT_MULTIPLIER: f64 = 0.7;
    pub const HIGH_MULTIPLIER: f64 = 0.85;
    pub const NORMAL_MULTIPLIER: f64 = 1.0;
    pub const LOW_MULTIPLIER: f64 = 1.3;
}

/// Cost estimation constants (USD). Same additive shape as the
/// time estimate, different per-feature units.
pub mod cost {
    pub const BASE_COST: f64 = 0.50;

    pub const COST_PER_IDEA: f64 = 0.10;
    pub const COST_PER_CRITERION: f64 = 0.15;

    pub const DEPTH_BASIC: f64 = 0.25;
    pub const DEPTH_STANDARD: f64 = 0.75;
    pub const DEPTH_COMPREHENSIVE: f64 = 1.50;
    pub const DEPTH_DEEP_DIVE: f64 = 3.00;

    pub const BACKTESTING_COST: f64 = 0.80;
    pub const RISK_ANALYSIS_COST: f64 = 0.50;
    pub const ESG_COST: f64 = 0.35;
}

/// Lifecycle constants
pub mod lifecycle {
    /// How long a stored result stays valid
    pub const RESULT_TTL_DAYS: i64 = 7;

    /// Default orchestration deadline when config omits one
    pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

    /// History pagination defaults
    pub const DEFAULT_PAGE: usize = 1;
    pub const DEFAULT_PAGE_LIMIT: usize = 10;

    /// Upper bound on ideas per request, enforced at validation
    pub const MAX_IDEAS_PER_REQUEST: u32 = 50;

    /// Feedback rating bounds
    pub const MIN_RATING: u8 = 1;
    pub const MAX_RATING: u8 = 5;
}

/// Step names for structured tracking entries
pub mod steps {
    pub const VALIDATION: &str = "validation";
    pub const QUEUEING: &str = "queueing";
    pub const IDEA_GENERATION: &str = "idea-generation";
    pub const RESULT_STORAGE: &str = "result-storage";
    pub const CALLBACK: &str = "callback-delivery";
}
