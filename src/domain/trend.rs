//! Price history analysis: trend classification, prediction, recommendation.
//!
//! # Analysis pipeline
//!
//! Given an ascending price series, the analyzer computes dispersion
//! statistics over the whole series, classifies the trend from a bounded
//! trailing window, emits one bounded-horizon prediction with a confidence
//! interval, and derives recommendations. The first recommendation in the
//! output is always the primary one.
//!
//! Money stays in `Decimal`; dispersion statistics (which need a square
//! root) run in `f64`, mirroring how ratio statistics are usually handled
//! in this codebase's neighborhood.
//!
//! # Failure semantics
//!
//! Fail-fast with a single error: fewer than two points is
//! [`ErrorKind::InsufficientData`], an unsorted series is
//! [`ErrorKind::InvalidProfitCalculation`], and a zero price at a division
//! site (series mean, current price, window start) is
//! [`ErrorKind::DegenerateSeries`].

use chrono::{DateTime, Duration, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::money::Money;
use crate::error::{profit_error, AppError, ErrorKind};

/// Slope damping applied to the trailing-window slope when projecting
/// forward; the horizon is long enough that extrapolating the full slope
/// overshoots.
const PREDICTION_DAMPING: Decimal = dec!(0.5);

/// Fixed probability reported with the single-point prediction.
const PREDICTION_PROBABILITY: f64 = 0.75;

/// Ratio bounds for the buy/sell recommendation band.
const BUY_BELOW_RATIO: Decimal = dec!(0.9);
const SELL_ABOVE_RATIO: Decimal = dec!(1.1);

/// Direction classification for a price series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Rising,
    Falling,
    Stable,
    Volatile,
}

/// Three-point ordinal risk attached to recommendations and used as a
/// search filter bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

/// Actionable suggestion derived from an analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendedAction {
    Buy,
    Sell,
    Hold,
    Watch,
}

/// Horizon a recommendation applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Timeframe {
    Immediate,
    ShortTerm,
    MediumTerm,
}

/// One observed price sample.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceDataPoint {
    pub timestamp: DateTime<Utc>,
    pub price: Money,
    pub source: String,
}

/// Closed interval expected to contain the predicted price.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ConfidenceInterval {
    pub lower: Money,
    pub upper: Money,
}

/// One forward-looking price estimate.
#[derive(Debug, Clone, Serialize)]
pub struct PricePrediction {
    pub target_timestamp: DateTime<Utc>,
    pub predicted_price: Money,
    pub confidence_interval: ConfidenceInterval,
    pub probability: f64,
}

/// One actionable suggestion. The first entry of
/// [`TrendAnalysis::recommendations`] is the primary one.
#[derive(Debug, Clone, Serialize)]
pub struct Recommendation {
    pub action: RecommendedAction,
    pub reason: String,
    pub risk_level: RiskLevel,
    pub timeframe: Timeframe,
    pub confidence: f64,
}

/// Output of analyzing one price series.
#[derive(Debug, Clone, Serialize)]
pub struct TrendAnalysis {
    pub trend: Trend,
    /// Magnitude of the relative change over the analysis window,
    /// independent of direction, clamped to `0..=1`.
    pub trend_strength: f64,
    /// Standard deviation as a percentage of the series mean.
    pub volatility_pct: f64,
    pub predictions: Vec<PricePrediction>,
    /// Presentation-only strings; carry no information beyond the
    /// structured fields and must not be parsed.
    pub insights: Vec<String>,
    pub recommendations: Vec<Recommendation>,
}

/// Tuning for the trend analyzer. Defaults are the production values.
#[derive(Debug, Clone, Deserialize)]
pub struct TrendConfig {
    /// Volatility above this percentage classifies the series `Volatile`
    /// regardless of slope.
    #[serde(default = "default_volatility_threshold")]
    pub volatility_threshold_pct: f64,

    /// Relative window slope beyond which the series is `Rising`/`Falling`.
    #[serde(default = "default_slope_threshold")]
    pub slope_threshold: Decimal,

    /// Trailing window length for slope classification.
    #[serde(default = "default_window_len")]
    pub window_len: usize,

    /// Days ahead for the single-point prediction.
    #[serde(default = "default_prediction_horizon_days")]
    pub prediction_horizon_days: i64,

    /// Half-width of the confidence band around the current price, in
    /// percent.
    #[serde(default = "default_confidence_band_pct")]
    pub confidence_band_pct: Decimal,
}

fn default_volatility_threshold() -> f64 {
    15.0
}

fn default_slope_threshold() -> Decimal {
    dec!(0.05)
}

fn default_window_len() -> usize {
    10
}

fn default_prediction_horizon_days() -> i64 {
    30
}

fn default_confidence_band_pct() -> Decimal {
    dec!(10)
}

impl Default for TrendConfig {
    fn default() -> Self {
        Self {
            volatility_threshold_pct: default_volatility_threshold(),
            slope_threshold: default_slope_threshold(),
            window_len: default_window_len(),
            prediction_horizon_days: default_prediction_horizon_days(),
            confidence_band_pct: default_confidence_band_pct(),
        }
    }
}

/// Price trend analyzer.
pub struct TrendAnalyzer {
    config: TrendConfig,
}

impl Default for TrendAnalyzer {
    fn default() -> Self {
        Self::new(TrendConfig::default())
    }
}

impl TrendAnalyzer {
    #[must_use]
    pub const fn new(config: TrendConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub const fn config(&self) -> &TrendConfig {
        &self.config
    }

    /// Analyze an ascending price series.
    ///
    /// # Errors
    /// - [`ErrorKind::InsufficientData`] if the series has fewer than two
    ///   points.
    /// - [`ErrorKind::InvalidProfitCalculation`] if timestamps are not
    ///   ascending.
    /// - [`ErrorKind::DegenerateSeries`] if the series mean, the current
    ///   price, or the window's first price is zero.
    pub fn analyze(&self, series: &[PriceDataPoint]) -> Result<TrendAnalysis, AppError> {
        if series.len() < 2 {
            return Err(profit_error(ErrorKind::InsufficientData)
                .with_message(format!(
                    "need at least 2 price points, got {}",
                    series.len()
                ))
                .with_context("points", series.len()));
        }

        if let Some(pos) = first_order_violation(series) {
            return Err(profit_error(ErrorKind::InvalidProfitCalculation)
                .with_message("price series is not sorted ascending by timestamp")
                .with_context("position", pos));
        }

        debug!(points = series.len(), "analyzing price series");

        let prices: Vec<Decimal> = series.iter().map(|p| p.price.amount()).collect();
        let n = Decimal::from(prices.len() as u64);
        let mean = prices.iter().sum::<Decimal>() / n;
        let current = *prices.last().unwrap_or(&Decimal::ZERO);

        let window_start = prices.len().saturating_sub(self.config.window_len.max(2));
        let window_first = prices[window_start];

        if mean.is_zero() || current.is_zero() || window_first.is_zero() {
            warn!(%mean, %current, %window_first, "degenerate price series");
            return Err(profit_error(ErrorKind::DegenerateSeries)
                .with_message("series mean, current price, and window start must be non-zero")
                .with_context("mean", mean)
                .with_context("current", current)
                .with_context("window_first", window_first));
        }

        let volatility_pct = volatility_pct(&prices, mean);
        let slope = (current - window_first) / window_first;
        let trend = self.classify(volatility_pct, slope);
        let trend_strength = slope.abs().to_f64().unwrap_or(0.0).min(1.0);

        let last_ts = series[series.len() - 1].timestamp;
        let prediction = self.predict(current, slope, last_ts)?;
        let insights = self.insights(current, mean, volatility_pct, trend);
        let recommendations = self.recommend(current, mean, trend);

        Ok(TrendAnalysis {
            trend,
            trend_strength,
            volatility_pct,
            predictions: vec![prediction],
            insights,
            recommendations,
        })
    }

    fn classify(&self, volatility_pct: f64, slope: Decimal) -> Trend {
        // Volatility dominates slope.
        if volatility_pct > self.config.volatility_threshold_pct {
            return Trend::Volatile;
        }
        if slope > self.config.slope_threshold {
            Trend::Rising
        } else if slope < -self.config.slope_threshold {
            Trend::Falling
        } else {
            Trend::Stable
        }
    }

    fn predict(
        &self,
        current: Decimal,
        slope: Decimal,
        last_ts: DateTime<Utc>,
    ) -> Result<PricePrediction, AppError> {
        let band = self.config.confidence_band_pct / Decimal::ONE_HUNDRED;
        let lower = current * (Decimal::ONE - band);
        let upper = current * (Decimal::ONE + band);

        // The raw projection can leave the band on steep windows; the
        // reported price is kept inside it so the interval invariant holds.
        let projected = current * (Decimal::ONE + slope * PREDICTION_DAMPING);
        let predicted = projected.clamp(lower, upper);

        Ok(PricePrediction {
            target_timestamp: last_ts + Duration::days(self.config.prediction_horizon_days),
            predicted_price: Money::try_new(predicted)?,
            confidence_interval: ConfidenceInterval {
                lower: Money::try_new(lower)?,
                upper: Money::try_new(upper)?,
            },
            probability: PREDICTION_PROBABILITY,
        })
    }

    fn recommend(&self, current: Decimal, mean: Decimal, trend: Trend) -> Vec<Recommendation> {
        let ratio = current / mean;

        let primary = if ratio < BUY_BELOW_RATIO {
            Recommendation {
                action: RecommendedAction::Buy,
                reason: "price below average by >10%".to_string(),
                risk_level: RiskLevel::Low,
                timeframe: Timeframe::ShortTerm,
                confidence: 0.8,
            }
        } else if ratio > SELL_ABOVE_RATIO {
            Recommendation {
                action: RecommendedAction::Sell,
                reason: "price above average by >10%".to_string(),
                risk_level: RiskLevel::Medium,
                timeframe: Timeframe::Immediate,
                confidence: 0.7,
            }
        } else {
            Recommendation {
                action: RecommendedAction::Hold,
                reason: "price near average".to_string(),
                risk_level: RiskLevel::Low,
                timeframe: Timeframe::MediumTerm,
                confidence: 0.6,
            }
        };

        let mut recommendations = vec![primary];

        if trend == Trend::Volatile {
            recommendations.push(Recommendation {
                action: RecommendedAction::Watch,
                reason: "volatility above threshold, monitor before acting".to_string(),
                risk_level: RiskLevel::High,
                timeframe: Timeframe::ShortTerm,
                confidence: 0.5,
            });
        }

        recommendations
    }

    fn insights(&self, current: Decimal, mean: Decimal, volatility_pct: f64, trend: Trend) -> Vec<String> {
        let diff_pct = (current / mean - Decimal::ONE) * Decimal::ONE_HUNDRED;
        let position = if diff_pct > Decimal::ZERO {
            format!("current price is {:.1}% above the series average", diff_pct)
        } else if diff_pct < Decimal::ZERO {
            format!("current price is {:.1}% below the series average", -diff_pct)
        } else {
            "current price matches the series average".to_string()
        };

        let volatility_bucket = if volatility_pct < 5.0 {
            "low"
        } else if volatility_pct <= self.config.volatility_threshold_pct {
            "moderate"
        } else {
            "high"
        };

        let trend_label = match trend {
            Trend::Rising => "rising",
            Trend::Falling => "falling",
            Trend::Stable => "stable",
            Trend::Volatile => "volatile",
        };

        vec![
            position,
            format!("volatility is {volatility_bucket} ({volatility_pct:.1}%)"),
            format!("trend over the trailing window is {trend_label}"),
        ]
    }
}

/// Index of the first timestamp that breaks ascending order, if any.
fn first_order_violation(series: &[PriceDataPoint]) -> Option<usize> {
    series
        .windows(2)
        .position(|w| w[1].timestamp < w[0].timestamp)
        .map(|i| i + 1)
}

/// Population standard deviation as a percentage of the mean.
///
/// Callers guarantee `mean` is non-zero.
fn volatility_pct(prices: &[Decimal], mean: Decimal) -> f64 {
    let mean_f = mean.to_f64().unwrap_or(0.0);
    let variance = prices
        .iter()
        .map(|p| {
            let d = p.to_f64().unwrap_or(0.0) - mean_f;
            d * d
        })
        .sum::<f64>()
        / prices.len() as f64;
    variance.sqrt() / mean_f * 100.0
}
