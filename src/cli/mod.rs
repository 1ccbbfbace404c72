//! Command-line interface definitions.

pub mod commands;
pub mod output;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use rust_decimal::Decimal;

use crate::domain::trend::RiskLevel;
use crate::validation::FormKind;

/// Sedori - decision-support calculations for reseller businesses.
#[derive(Parser, Debug)]
#[command(name = "sedori")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to an engine tuning file; defaults apply when omitted
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Emit machine-readable JSON instead of tables
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compute profit, margin, and ROI for a cost/price pair
    Profit(ProfitArgs),

    /// Analyze a JSON price series: trend, prediction, recommendations
    Analyze(AnalyzeArgs),

    /// Rank candidate products from a JSON file against a query
    Rank(RankArgs),

    /// Validate a JSON form record
    Validate(ValidateArgs),
}

/// Arguments for the `profit` subcommand.
#[derive(Parser, Debug)]
pub struct ProfitArgs {
    /// Acquisition cost
    #[arg(long, allow_negative_numbers = true)]
    pub cost: Decimal,

    /// Selling price
    #[arg(long, allow_negative_numbers = true)]
    pub price: Decimal,
}

/// Arguments for the `analyze` subcommand.
#[derive(Parser, Debug)]
pub struct AnalyzeArgs {
    /// JSON file with an ascending array of price points
    pub series: PathBuf,
}

/// Arguments for the `rank` subcommand.
#[derive(Parser, Debug)]
pub struct RankArgs {
    /// JSON file with an array of candidates
    pub candidates: PathBuf,

    /// Search query
    #[arg(short, long, default_value = "")]
    pub query: String,

    /// Maximum number of results
    #[arg(long)]
    pub limit: Option<usize>,

    /// Drop candidates below this profitability score
    #[arg(long)]
    pub min_profitability: Option<f64>,

    /// Drop candidates above this risk level
    #[arg(long, value_enum)]
    pub max_risk: Option<RiskArg>,

    /// Only keep candidates in this category
    #[arg(long)]
    pub category: Option<String>,

    /// Lower price bound
    #[arg(long)]
    pub price_min: Option<Decimal>,

    /// Upper price bound
    #[arg(long)]
    pub price_max: Option<Decimal>,
}

/// Arguments for the `validate` subcommand.
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// JSON file with the raw form fields
    pub form: PathBuf,

    /// Form kind; when omitted the file must carry a "kind" tag
    #[arg(short, long, value_enum)]
    pub kind: Option<KindArg>,
}

/// CLI-facing risk level.
#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum RiskArg {
    Low,
    Medium,
    High,
}

impl From<RiskArg> for RiskLevel {
    fn from(arg: RiskArg) -> Self {
        match arg {
            RiskArg::Low => Self::Low,
            RiskArg::Medium => Self::Medium,
            RiskArg::High => Self::High,
        }
    }
}

/// CLI-facing form kind.
#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum KindArg {
    Login,
    Register,
    Product,
    CartItem,
}

impl From<KindArg> for FormKind {
    fn from(arg: KindArg) -> Self {
        match arg {
            KindArg::Login => Self::Login,
            KindArg::Register => Self::Register,
            KindArg::Product => Self::Product,
            KindArg::CartItem => Self::CartItem,
        }
    }
}
