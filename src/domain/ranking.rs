//! Weighted candidate scoring and ranking for product search.
//!
//! Each candidate is scored independently from three 0..100 base signals
//! (profitability, risk, competitiveness), boosted by query intent and
//! keyword overlap, clamped, and rounded. Scoring is data-parallel; the
//! final descending sort is stable so equal scores keep their input order.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::money::Money;
use super::trend::{RiskLevel, Trend};

/// Query terms that signal interest in trending products.
const TREND_INTENT_TERMS: &[&str] = &["trend", "trending", "popular", "hot", "トレンド", "人気", "流行"];

/// Query terms that signal a preference for low-risk products.
const SAFETY_INTENT_TERMS: &[&str] = &["safe", "low risk", "stable", "安全", "低リスク", "安定"];

/// Query terms that signal profit hunting.
const PROFIT_INTENT_TERMS: &[&str] = &["profit", "profitable", "margin", "利益", "儲け", "高利益"];

/// A product candidate offered to the ranking engine.
///
/// The three base signals are externally supplied on a 0..100 scale;
/// `competitiveness` is consumed, never computed, here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candidate {
    pub id: String,
    pub title: String,
    pub profitability_score: f64,
    pub risk_score: f64,
    pub competitiveness: f64,
    pub demand_trend: Trend,
    pub price: Money,
    #[serde(default)]
    pub category: Option<String>,
}

/// Base signals echoed back with a scored result.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct BaseFeatures {
    pub profitability_score: f64,
    pub risk_score: f64,
    pub competitiveness: f64,
}

/// A candidate with its computed score breakdown.
#[derive(Debug, Clone, Serialize)]
pub struct ScoredCandidate {
    pub id: String,
    pub title: String,
    pub base_features: BaseFeatures,
    /// Weighted combination of the base signals, before boosts.
    pub base_score: f64,
    /// Sum of the query-intent boosts that applied.
    pub intent_boost: f64,
    /// Keyword-overlap boost.
    pub keyword_boost: f64,
    /// Clamped to 0..=100 after all boosts.
    pub final_score: u8,
}

/// Inclusive price bounds for filtering.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PriceRange {
    pub min: Money,
    pub max: Money,
}

/// Caller-supplied search options.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchOptions {
    #[serde(default)]
    pub min_profitability_score: Option<f64>,
    #[serde(default)]
    pub max_risk_level: Option<RiskLevel>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub price_range: Option<PriceRange>,
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize {
    20
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            min_profitability_score: None,
            max_risk_level: None,
            category: None,
            price_range: None,
            limit: default_limit(),
        }
    }
}

impl SearchOptions {
    fn allows(&self, candidate: &Candidate) -> bool {
        if let Some(min) = self.min_profitability_score {
            if candidate.profitability_score < min {
                return false;
            }
        }
        if let Some(max_risk) = self.max_risk_level {
            if candidate.risk_score > risk_threshold(max_risk) {
                return false;
            }
        }
        if let Some(category) = &self.category {
            if candidate.category.as_deref() != Some(category.as_str()) {
                return false;
            }
        }
        if let Some(range) = &self.price_range {
            let price = candidate.price.amount();
            if price < range.min.amount() || price > range.max.amount() {
                return false;
            }
        }
        true
    }
}

/// Upper risk-score bound admitted by a risk-level filter.
#[must_use]
pub const fn risk_threshold(level: RiskLevel) -> f64 {
    match level {
        RiskLevel::Low => 30.0,
        RiskLevel::Medium => 60.0,
        RiskLevel::High => 100.0,
    }
}

/// Weights and boost values for the ranking formula. Defaults are the
/// production values.
#[derive(Debug, Clone, Deserialize)]
pub struct RankingConfig {
    #[serde(default = "default_profitability_weight")]
    pub profitability_weight: f64,
    #[serde(default = "default_risk_weight")]
    pub risk_weight: f64,
    #[serde(default = "default_competitiveness_weight")]
    pub competitiveness_weight: f64,
    #[serde(default = "default_trend_boost")]
    pub trend_boost: f64,
    #[serde(default = "default_safety_boost")]
    pub safety_boost: f64,
    #[serde(default = "default_profit_boost")]
    pub profit_boost: f64,
    #[serde(default = "default_keyword_overlap_scale")]
    pub keyword_overlap_scale: f64,
}

fn default_profitability_weight() -> f64 {
    0.4
}

fn default_risk_weight() -> f64 {
    0.3
}

fn default_competitiveness_weight() -> f64 {
    0.3
}

fn default_trend_boost() -> f64 {
    15.0
}

fn default_safety_boost() -> f64 {
    10.0
}

fn default_profit_boost() -> f64 {
    12.0
}

fn default_keyword_overlap_scale() -> f64 {
    20.0
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            profitability_weight: default_profitability_weight(),
            risk_weight: default_risk_weight(),
            competitiveness_weight: default_competitiveness_weight(),
            trend_boost: default_trend_boost(),
            safety_boost: default_safety_boost(),
            profit_boost: default_profit_boost(),
            keyword_overlap_scale: default_keyword_overlap_scale(),
        }
    }
}

/// Ranking engine combining base signals, intent boosts, and keyword
/// overlap into a ranked result page.
pub struct RankingEngine {
    config: RankingConfig,
}

impl Default for RankingEngine {
    fn default() -> Self {
        Self::new(RankingConfig::default())
    }
}

impl RankingEngine {
    #[must_use]
    pub const fn new(config: RankingConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub const fn config(&self) -> &RankingConfig {
        &self.config
    }

    /// Filter, score, sort, and truncate candidates for a query.
    ///
    /// Filters apply before scoring. Per-candidate scoring depends only on
    /// the candidate and the query, so it runs in parallel; collection
    /// preserves input order and the stable sort keeps equal scores in
    /// that order.
    #[must_use]
    pub fn rank(
        &self,
        candidates: &[Candidate],
        query: &str,
        options: &SearchOptions,
    ) -> Vec<ScoredCandidate> {
        let query_lower = query.to_lowercase();
        let terms: Vec<String> = query_lower
            .split_whitespace()
            .map(ToString::to_string)
            .collect();

        let mut scored: Vec<ScoredCandidate> = candidates
            .par_iter()
            .filter(|c| options.allows(c))
            .map(|c| self.score(c, &query_lower, &terms))
            .collect();

        debug!(
            candidates = candidates.len(),
            admitted = scored.len(),
            "ranked candidates"
        );

        scored.sort_by(|a, b| b.final_score.cmp(&a.final_score));
        scored.truncate(options.limit);
        scored
    }

    fn score(&self, candidate: &Candidate, query_lower: &str, terms: &[String]) -> ScoredCandidate {
        let base_score = candidate.profitability_score * self.config.profitability_weight
            + (100.0 - candidate.risk_score) * self.config.risk_weight
            + candidate.competitiveness * self.config.competitiveness_weight;

        let intent_boost = self.intent_boost(candidate, query_lower);
        let keyword_boost = self.keyword_boost(candidate, terms);

        let total = (base_score + intent_boost + keyword_boost).clamp(0.0, 100.0);
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let final_score = total.round() as u8;

        ScoredCandidate {
            id: candidate.id.clone(),
            title: candidate.title.clone(),
            base_features: BaseFeatures {
                profitability_score: candidate.profitability_score,
                risk_score: candidate.risk_score,
                competitiveness: candidate.competitiveness,
            },
            base_score,
            intent_boost,
            keyword_boost,
            final_score,
        }
    }

    /// Additive, independent query-intent boosts.
    fn intent_boost(&self, candidate: &Candidate, query_lower: &str) -> f64 {
        let mut boost = 0.0;

        if contains_any(query_lower, TREND_INTENT_TERMS) && candidate.demand_trend == Trend::Rising
        {
            boost += self.config.trend_boost;
        }
        if contains_any(query_lower, SAFETY_INTENT_TERMS) && candidate.risk_score < 30.0 {
            boost += self.config.safety_boost;
        }
        if contains_any(query_lower, PROFIT_INTENT_TERMS) && candidate.profitability_score > 80.0 {
            boost += self.config.profit_boost;
        }

        boost
    }

    /// Fraction of query terms found in the title, scaled.
    fn keyword_boost(&self, candidate: &Candidate, terms: &[String]) -> f64 {
        if terms.is_empty() {
            return 0.0;
        }
        let title_lower = candidate.title.to_lowercase();
        let matched = terms.iter().filter(|t| title_lower.contains(t.as_str())).count();
        matched as f64 / terms.len() as f64 * self.config.keyword_overlap_scale
    }
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| haystack.contains(n))
}

/// Convenience wrapper for one-off ranking with default tuning.
#[must_use]
pub fn rank(
    candidates: &[Candidate],
    query: &str,
    options: &SearchOptions,
) -> Vec<ScoredCandidate> {
    RankingEngine::default().rank(candidates, query, options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn candidate(id: &str, title: &str) -> Candidate {
        Candidate {
            id: id.to_string(),
            title: title.to_string(),
            profitability_score: 70.0,
            risk_score: 40.0,
            competitiveness: 60.0,
            demand_trend: Trend::Stable,
            price: Money::try_new(dec!(1000)).unwrap(),
            category: None,
        }
    }

    #[test]
    fn base_score_uses_fixed_weights() {
        let engine = RankingEngine::default();
        let scored = engine.rank(&[candidate("a", "plain item")], "", &SearchOptions::default());

        // 70*0.4 + 60*0.3 + 60*0.3 = 64
        assert_eq!(scored[0].final_score, 64);
        assert!((scored[0].base_score - 64.0).abs() < 1e-9);
    }

    #[test]
    fn trend_intent_boost_requires_rising_demand() {
        let engine = RankingEngine::default();
        let mut rising = candidate("a", "figure");
        rising.demand_trend = Trend::Rising;
        let stable = candidate("b", "figure");

        let scored = engine.rank(&[rising, stable], "trending", &SearchOptions::default());
        let a = scored.iter().find(|s| s.id == "a").unwrap();
        let b = scored.iter().find(|s| s.id == "b").unwrap();

        assert!((a.intent_boost - 15.0).abs() < 1e-9);
        assert!((b.intent_boost - 0.0).abs() < 1e-9);
    }

    #[test]
    fn boosts_are_additive_and_independent() {
        let engine = RankingEngine::default();
        let mut c = candidate("a", "item");
        c.demand_trend = Trend::Rising;
        c.risk_score = 10.0;
        c.profitability_score = 90.0;

        let scored = engine.rank(
            &[c],
            "trending safe profit",
            &SearchOptions::default(),
        );
        // 15 + 10 + 12, all three intents present and satisfied.
        assert!((scored[0].intent_boost - 37.0).abs() < 1e-9);
    }

    #[test]
    fn japanese_intent_terms_are_recognized() {
        let engine = RankingEngine::default();
        let mut c = candidate("a", "フィギュア");
        c.demand_trend = Trend::Rising;

        let scored = engine.rank(&[c], "人気 フィギュア", &SearchOptions::default());
        assert!((scored[0].intent_boost - 15.0).abs() < 1e-9);
        // One of two query terms matches the title.
        assert!((scored[0].keyword_boost - 10.0).abs() < 1e-9);
    }

    #[test]
    fn keyword_boost_scales_with_matched_fraction() {
        let engine = RankingEngine::default();
        let scored = engine.rank(
            &[candidate("a", "vintage camera lens")],
            "vintage lens",
            &SearchOptions::default(),
        );
        assert!((scored[0].keyword_boost - 20.0).abs() < 1e-9);

        let scored = engine.rank(
            &[candidate("a", "vintage camera lens")],
            "vintage tripod",
            &SearchOptions::default(),
        );
        assert!((scored[0].keyword_boost - 10.0).abs() < 1e-9);
    }

    #[test]
    fn final_score_is_clamped_to_hundred() {
        let engine = RankingEngine::default();
        let mut c = candidate("a", "high profit trending item");
        c.profitability_score = 100.0;
        c.risk_score = 0.0;
        c.competitiveness = 100.0;
        c.demand_trend = Trend::Rising;

        let scored = engine.rank(
            &[c],
            "high profit trending item",
            &SearchOptions::default(),
        );
        assert_eq!(scored[0].final_score, 100);
    }

    #[test]
    fn equal_scores_keep_input_order() {
        let engine = RankingEngine::default();
        let candidates = vec![
            candidate("first", "same item"),
            candidate("second", "same item"),
            candidate("third", "same item"),
        ];

        let scored = engine.rank(&candidates, "", &SearchOptions::default());
        let ids: Vec<&str> = scored.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["first", "second", "third"]);
    }

    #[test]
    fn reranking_sorted_output_is_idempotent() {
        let engine = RankingEngine::default();
        let mut candidates = vec![candidate("a", "x"), candidate("b", "y"), candidate("c", "z")];
        candidates[0].profitability_score = 90.0;
        candidates[2].profitability_score = 95.0;

        let first = engine.rank(&candidates, "", &SearchOptions::default());
        let order: Vec<&str> = first.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(order, vec!["c", "a", "b"]);

        // Feed the ranked order back through: nothing moves.
        let reordered: Vec<Candidate> = first
            .iter()
            .map(|s| candidates.iter().find(|c| c.id == s.id).unwrap().clone())
            .collect();
        let second = engine.rank(&reordered, "", &SearchOptions::default());
        let order2: Vec<&str> = second.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(order, order2);
    }

    #[test]
    fn min_profitability_filter_applies_before_sorting() {
        let engine = RankingEngine::default();
        let mut low = candidate("low", "item");
        low.profitability_score = 20.0;
        let high = candidate("high", "item");

        let options = SearchOptions {
            min_profitability_score: Some(50.0),
            ..SearchOptions::default()
        };
        let scored = engine.rank(&[low, high], "", &options);
        assert_eq!(scored.len(), 1);
        assert_eq!(scored[0].id, "high");
    }

    #[test]
    fn risk_filter_uses_fixed_thresholds() {
        let engine = RankingEngine::default();
        let mut risky = candidate("risky", "item");
        risky.risk_score = 45.0;
        let mut calm = candidate("calm", "item");
        calm.risk_score = 25.0;

        let options = SearchOptions {
            max_risk_level: Some(RiskLevel::Low),
            ..SearchOptions::default()
        };
        let scored = engine.rank(&[risky.clone(), calm.clone()], "", &options);
        assert_eq!(scored.len(), 1);
        assert_eq!(scored[0].id, "calm");

        let options = SearchOptions {
            max_risk_level: Some(RiskLevel::Medium),
            ..SearchOptions::default()
        };
        let scored = engine.rank(&[risky, calm], "", &options);
        assert_eq!(scored.len(), 2);
    }

    #[test]
    fn price_range_filter_is_inclusive() {
        let engine = RankingEngine::default();
        let mut cheap = candidate("cheap", "item");
        cheap.price = Money::try_new(dec!(500)).unwrap();
        let exact = candidate("exact", "item");

        let options = SearchOptions {
            price_range: Some(PriceRange {
                min: Money::try_new(dec!(1000)).unwrap(),
                max: Money::try_new(dec!(2000)).unwrap(),
            }),
            ..SearchOptions::default()
        };
        let scored = engine.rank(&[cheap, exact], "", &options);
        assert_eq!(scored.len(), 1);
        assert_eq!(scored[0].id, "exact");
    }

    #[test]
    fn results_truncate_to_limit() {
        let engine = RankingEngine::default();
        let candidates: Vec<Candidate> = (0..30)
            .map(|i| candidate(&format!("c{i}"), "item"))
            .collect();

        let scored = engine.rank(&candidates, "", &SearchOptions::default());
        assert_eq!(scored.len(), 20);

        let options = SearchOptions {
            limit: 5,
            ..SearchOptions::default()
        };
        let scored = engine.rank(&candidates, "", &options);
        assert_eq!(scored.len(), 5);
    }
}
