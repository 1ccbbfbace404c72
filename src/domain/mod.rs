//! Core calculation domain: money, profitability, price trends, ranking.

pub mod money;
pub mod profit;
pub mod ranking;
pub mod trend;

pub use money::{Currency, Money};
pub use profit::{assert_profitable, compute_profit, ProfitReport};
pub use ranking::{
    rank, risk_threshold, BaseFeatures, Candidate, PriceRange, RankingConfig, RankingEngine,
    ScoredCandidate, SearchOptions,
};
pub use trend::{
    ConfidenceInterval, PriceDataPoint, PricePrediction, Recommendation, RecommendedAction,
    RiskLevel, Timeframe, Trend, TrendAnalysis, TrendAnalyzer, TrendConfig,
};
