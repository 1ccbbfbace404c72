//! Subcommand implementations.

use std::fs;
use std::path::Path;
use std::process::ExitCode;

use anyhow::{bail, Context as _, Result};
use tabled::settings::Style;
use tabled::{Table, Tabled};

use super::{output, AnalyzeArgs, Cli, Commands, ProfitArgs, RankArgs, ValidateArgs};
use crate::config::EngineConfig;
use crate::domain::money::Money;
use crate::domain::profit::{assert_profitable, compute_profit};
use crate::domain::ranking::{PriceRange, RankingEngine, SearchOptions};
use crate::domain::trend::{PriceDataPoint, TrendAnalyzer};
use crate::error::AppError;
use crate::validation::{validate_form, FormKind, FormRecord};

/// Dispatch a parsed command line.
///
/// # Errors
/// Returns input and I/O errors; domain failures are reported on stderr
/// with a failure exit code instead.
pub fn run(cli: &Cli, config: &EngineConfig) -> Result<ExitCode> {
    match &cli.command {
        Commands::Profit(args) => profit(args, cli.json),
        Commands::Analyze(args) => analyze(args, config, cli.json),
        Commands::Rank(args) => rank(args, config, cli.json),
        Commands::Validate(args) => validate(args, cli.json),
    }
}

fn profit(args: &ProfitArgs, json: bool) -> Result<ExitCode> {
    let cost = Money::try_new(args.cost)?;
    let price = Money::try_new(args.price)?;
    let report = compute_profit(&cost, &price);

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(ExitCode::SUCCESS);
    }

    output::section("Profitability");
    output::key_value("profit", report.profit_display());
    output::key_value("margin", format!("{}%", report.margin_display()));
    output::key_value("roi", format!("{}%", report.roi_display()));

    if report.is_profitable() {
        output::ok("profitable");
    } else {
        output::warn("not profitable");
    }
    if let Err(e) = assert_profitable(&cost, &price) {
        output::warn(&format!("submission would be blocked: {}", e.user_message().en));
    }

    Ok(ExitCode::SUCCESS)
}

#[derive(Tabled)]
struct RecommendationRow {
    action: String,
    risk: String,
    timeframe: String,
    confidence: String,
    reason: String,
}

fn analyze(args: &AnalyzeArgs, config: &EngineConfig, json: bool) -> Result<ExitCode> {
    let series: Vec<PriceDataPoint> = read_json(&args.series)?;
    let analyzer = TrendAnalyzer::new(config.trend.clone());

    let analysis = match analyzer.analyze(&series) {
        Ok(analysis) => analysis,
        Err(e) => return Ok(report_app_error(&e, json)),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&analysis)?);
        return Ok(ExitCode::SUCCESS);
    }

    output::section("Trend");
    output::key_value("trend", format!("{:?}", analysis.trend).to_lowercase());
    output::key_value("strength", format!("{:.2}", analysis.trend_strength));
    output::key_value("volatility", format!("{:.1}%", analysis.volatility_pct));

    output::section("Prediction");
    for p in &analysis.predictions {
        output::key_value("target", p.target_timestamp.format("%Y-%m-%d").to_string());
        output::key_value("price", p.predicted_price.amount().to_string());
        output::key_value(
            "interval",
            format!(
                "{} .. {}",
                p.confidence_interval.lower.amount(),
                p.confidence_interval.upper.amount()
            ),
        );
        output::key_value("probability", format!("{:.2}", p.probability));
    }

    output::section("Insights");
    for insight in &analysis.insights {
        println!("- {insight}");
    }

    output::section("Recommendations");
    let rows: Vec<RecommendationRow> = analysis
        .recommendations
        .iter()
        .map(|r| RecommendationRow {
            action: format!("{:?}", r.action).to_lowercase(),
            risk: format!("{:?}", r.risk_level).to_lowercase(),
            timeframe: format!("{:?}", r.timeframe).to_lowercase(),
            confidence: format!("{:.2}", r.confidence),
            reason: r.reason.clone(),
        })
        .collect();
    println!("{}", Table::new(rows).with(Style::rounded()));

    Ok(ExitCode::SUCCESS)
}

#[derive(Tabled)]
struct RankRow {
    #[tabled(rename = "#")]
    position: usize,
    id: String,
    title: String,
    score: u8,
    base: String,
    boosts: String,
}

fn rank(args: &RankArgs, config: &EngineConfig, json: bool) -> Result<ExitCode> {
    let candidates = read_json(&args.candidates)?;

    let price_range = match (args.price_min, args.price_max) {
        (Some(min), Some(max)) => Some(PriceRange {
            min: Money::try_new(min)?,
            max: Money::try_new(max)?,
        }),
        (None, None) => None,
        _ => bail!("--price-min and --price-max must be given together"),
    };

    let mut options = SearchOptions {
        min_profitability_score: args.min_profitability,
        max_risk_level: args.max_risk.map(Into::into),
        category: args.category.clone(),
        price_range,
        ..SearchOptions::default()
    };
    if let Some(limit) = args.limit {
        options.limit = limit;
    }

    let engine = RankingEngine::new(config.ranking.clone());
    let scored = engine.rank(&candidates, &args.query, &options);

    if json {
        println!("{}", serde_json::to_string_pretty(&scored)?);
        return Ok(ExitCode::SUCCESS);
    }

    output::section(&format!("Results ({})", scored.len()));
    let rows: Vec<RankRow> = scored
        .iter()
        .enumerate()
        .map(|(i, s)| RankRow {
            position: i + 1,
            id: s.id.clone(),
            title: s.title.clone(),
            score: s.final_score,
            base: format!("{:.1}", s.base_score),
            boosts: format!("+{:.1}", s.intent_boost + s.keyword_boost),
        })
        .collect();
    println!("{}", Table::new(rows).with(Style::rounded()));

    Ok(ExitCode::SUCCESS)
}

fn validate(args: &ValidateArgs, json: bool) -> Result<ExitCode> {
    let raw = fs::read_to_string(&args.form)
        .with_context(|| format!("failed to read {}", args.form.display()))?;

    let record = match args.kind.map(FormKind::from) {
        Some(kind) => record_from_parts(kind, &raw)?,
        None => serde_json::from_str(&raw).context("form file must carry a \"kind\" tag")?,
    };

    let outcome = validate_form(&record);

    if json {
        let payload = serde_json::json!({
            "is_valid": outcome.is_valid(),
            "value": outcome.value(),
            "errors": outcome.errors(),
            "warnings": outcome.warnings(),
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
    } else {
        for error in outcome.errors() {
            output::error(&format!(
                "{}: {} / {}",
                error.kind().code(),
                error.user_message().en,
                error.user_message().ja
            ));
        }
        for warning in outcome.warnings() {
            output::warn(warning);
        }
        if outcome.is_valid() {
            output::ok("form is valid");
        }
    }

    Ok(if outcome.is_valid() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn record_from_parts(kind: FormKind, raw: &str) -> Result<FormRecord> {
    Ok(match kind {
        FormKind::Login => FormRecord::Login(serde_json::from_str(raw)?),
        FormKind::Register => FormRecord::Register(serde_json::from_str(raw)?),
        FormKind::Product => FormRecord::Product(serde_json::from_str(raw)?),
        FormKind::CartItem => FormRecord::CartItem(serde_json::from_str(raw)?),
    })
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("failed to parse {}", path.display()))
}

fn report_app_error(error: &AppError, json: bool) -> ExitCode {
    if json {
        eprintln!(
            "{}",
            serde_json::to_string_pretty(error).unwrap_or_else(|_| error.to_string())
        );
    } else {
        output::error(&error.to_string());
        output::error(&format!(
            "{} / {}",
            error.user_message().en,
            error.user_message().ja
        ));
    }
    ExitCode::FAILURE
}
