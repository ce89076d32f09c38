//! Run configuration.
//!
//! A run is described by one TOML file: simulation parameters, the date
//! grid, the LGM model, an optional margin model, market fixings and the
//! portfolio itself. Selected fields can be overridden from the
//! environment (`EXPOSURE_SAMPLES`, `EXPOSURE_SEED`, `EXPOSURE_THREADS`,
//! `EXPOSURE_OUTPUT_DIR`).

use pricer_core::types::{Date, DayCountConvention, Tenor};
use pricer_models::schedules::Frequency;
use serde::Deserialize;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration error type.
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    /// IO error reading the config file.
    #[error("IO error: {0}")]
    Io(String),
    /// Parse error in the config file.
    #[error("Parse error: {0}")]
    Parse(String),
    /// Every problem found by [`RunConfig::validate`].
    #[error("Validation errors: {}", .0.join("; "))]
    Validation(Vec<String>),
}

/// Close-out market handling.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MporModeConfig {
    /// Valuation date stays on the default date.
    #[default]
    Sticky,
    /// Valuation date moves to the close-out date.
    Actual,
}

/// Samples, seed and threads.
#[derive(Debug, Clone, Deserialize)]
pub struct SimulationSection {
    /// Monte Carlo samples.
    #[serde(default = "default_samples")]
    pub samples: usize,
    /// Base seed.
    #[serde(default = "default_seed")]
    pub seed: u64,
    /// Worker threads; rayon default when absent.
    pub threads: Option<usize>,
}

impl Default for SimulationSection {
    fn default() -> Self {
        Self {
            samples: default_samples(),
            seed: default_seed(),
            threads: None,
        }
    }
}

/// Valuation dates and margin period of risk.
#[derive(Debug, Clone, Deserialize)]
pub struct GridSection {
    /// Tenors from the as-of date, e.g. `"6M"`.
    pub tenors: Vec<String>,
    /// Close-out lag in calendar days; no close-out grid when absent.
    pub mpor_days: Option<u32>,
    /// Close-out market mode.
    #[serde(default)]
    pub mpor_mode: MporModeConfig,
}

/// LGM model over a flat initial curve.
#[derive(Debug, Clone, Deserialize)]
pub struct ModelSection {
    /// Mean reversion speed.
    #[serde(default = "default_mean_reversion")]
    pub mean_reversion: f64,
    /// Normal volatility.
    pub volatility: f64,
    /// Continuously compounded flat rate of the initial curve.
    pub flat_rate: f64,
}

/// Parametric VaR margin over key-rate sensitivities.
#[derive(Debug, Clone, Deserialize)]
pub struct MarginSection {
    /// Key-rate pillars in years.
    pub buckets: Vec<f64>,
    /// Bucket rate volatility in basis points per year.
    pub volatility: f64,
    /// Uniform correlation between buckets.
    #[serde(default)]
    pub correlation: f64,
    /// VaR quantile.
    #[serde(default = "default_quantile")]
    pub quantile: f64,
    /// Holding period in calendar days.
    #[serde(default = "default_holding_days")]
    pub holding_days: u32,
}

/// An interest rate index.
#[derive(Debug, Clone, Deserialize)]
pub struct IndexConfig {
    /// Index name, used by fixings and trades.
    pub name: String,
    /// Index tenor.
    pub tenor: String,
    /// Accrual day count.
    #[serde(default = "default_day_count")]
    pub day_count: String,
    /// Fixing lag in calendar days.
    #[serde(default)]
    pub fixing_days: u32,
}

/// A historical fixing.
#[derive(Debug, Clone, Deserialize)]
pub struct FixingConfig {
    /// Index name.
    pub index: String,
    /// Fixing date.
    pub date: String,
    /// Fixed rate.
    pub value: f64,
}

/// A counterparty with a flat hazard rate.
#[derive(Debug, Clone, Deserialize)]
pub struct CounterpartyConfig {
    /// Counterparty id.
    pub id: String,
    /// Flat hazard rate; survival falls back to 1 when absent.
    pub hazard_rate: Option<f64>,
    /// Loss given default.
    #[serde(default = "default_lgd")]
    pub lgd: f64,
}

/// A netting set.
#[derive(Debug, Clone, Deserialize)]
pub struct NettingSetConfig {
    /// Netting set id.
    pub id: String,
    /// Owning counterparty.
    pub counterparty: String,
    /// Current initial margin, used to scale DIM.
    pub initial_margin: Option<f64>,
}

/// Swap direction as written in the config.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DirectionConfig {
    /// Pay fixed.
    Payer,
    /// Receive fixed.
    Receiver,
}

/// Instrument terms.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ProductConfig {
    /// Fixed-for-floating swap.
    Swap {
        /// Notional.
        notional: f64,
        /// Accrual start.
        start: String,
        /// Final accrual end.
        maturity: String,
        /// Fixed rate.
        fixed_rate: f64,
        /// Pay or receive fixed.
        direction: DirectionConfig,
        /// Floating index name.
        index: String,
        /// Fixed leg frequency.
        #[serde(default = "default_fixed_frequency")]
        fixed_frequency: String,
        /// Fixed leg day count.
        #[serde(default = "default_day_count")]
        fixed_day_count: String,
        /// Floating leg frequency.
        #[serde(default = "default_floating_frequency")]
        floating_frequency: String,
        /// Spread over the index.
        #[serde(default)]
        spread: f64,
    },
    /// Zero coupon bond.
    Bond {
        /// Redemption amount.
        notional: f64,
        /// Redemption date.
        maturity: String,
        /// Held (`true`) or owed.
        #[serde(default = "default_long")]
        long: bool,
    },
}

/// A trade.
#[derive(Debug, Clone, Deserialize)]
pub struct TradeConfig {
    /// Trade id.
    pub id: String,
    /// Netting set id; the counterparty is the netting set's.
    pub netting_set: String,
    /// Instrument.
    #[serde(flatten)]
    pub product: ProductConfig,
}

/// Complete run configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct RunConfig {
    /// As-of date.
    pub asof: String,
    /// Directory receiving the exports.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// PFE confidence level.
    #[serde(default = "default_confidence")]
    pub confidence: f64,
    /// Samples, seed and threads.
    #[serde(default)]
    pub simulation: SimulationSection,
    /// Date grid.
    pub grid: GridSection,
    /// Model.
    pub model: ModelSection,
    /// Margin model; no sensitivities or DIM when absent.
    pub margin: Option<MarginSection>,
    /// Interest rate indices.
    #[serde(default)]
    pub indices: Vec<IndexConfig>,
    /// Historical fixings.
    #[serde(default)]
    pub fixings: Vec<FixingConfig>,
    /// Counterparties.
    pub counterparties: Vec<CounterpartyConfig>,
    /// Own party, for survival output only.
    pub own_party: Option<CounterpartyConfig>,
    /// Netting sets.
    pub netting_sets: Vec<NettingSetConfig>,
    /// Trades.
    pub trades: Vec<TradeConfig>,
}

fn default_samples() -> usize {
    1000
}

fn default_seed() -> u64 {
    42
}

fn default_mean_reversion() -> f64 {
    0.03
}

fn default_quantile() -> f64 {
    pricer_exposure::margin::DEFAULT_QUANTILE
}

fn default_holding_days() -> u32 {
    pricer_exposure::margin::DEFAULT_HOLDING_DAYS
}

fn default_day_count() -> String {
    "ACT/365".to_string()
}

fn default_fixed_frequency() -> String {
    "annual".to_string()
}

fn default_floating_frequency() -> String {
    "semiannual".to_string()
}

fn default_lgd() -> f64 {
    0.6
}

fn default_long() -> bool {
    true
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("output")
}

fn default_confidence() -> f64 {
    0.95
}

/// Commented example configuration printed by `sample-config`.
pub const SAMPLE_CONFIG: &str = r#"# exposure-cube run configuration
asof = "2024-01-02"
output_dir = "output"
confidence = 0.95

[simulation]
samples = 1000
seed = 42
# threads = 4

[grid]
tenors = ["1M", "3M", "6M", "1Y", "2Y", "3Y", "5Y"]
mpor_days = 14
mpor_mode = "sticky"

[model]
mean_reversion = 0.03
volatility = 0.01
flat_rate = 0.03

[margin]
buckets = [1.0, 2.0, 5.0, 10.0]
volatility = 90.0
correlation = 0.7
quantile = 0.99
holding_days = 14

[[indices]]
name = "EUR-EURIBOR-6M"
tenor = "6M"
day_count = "ACT/360"
fixing_days = 2

[[fixings]]
index = "EUR-EURIBOR-6M"
date = "2023-12-29"
value = 0.0391

[[counterparties]]
id = "BANK_A"
hazard_rate = 0.015
lgd = 0.6

[[counterparties]]
id = "CORP_B"
hazard_rate = 0.03
lgd = 0.75

[[netting_sets]]
id = "NS_BANK_A"
counterparty = "BANK_A"
initial_margin = 250000.0

[[netting_sets]]
id = "NS_CORP_B"
counterparty = "CORP_B"

[[trades]]
id = "IRS_001"
netting_set = "NS_BANK_A"
type = "swap"
notional = 10000000.0
start = "2024-01-04"
maturity = "2029-01-04"
fixed_rate = 0.029
direction = "payer"
index = "EUR-EURIBOR-6M"
fixed_day_count = "30/360"

[[trades]]
id = "IRS_002"
netting_set = "NS_BANK_A"
type = "swap"
notional = 5000000.0
start = "2024-01-04"
maturity = "2027-01-04"
fixed_rate = 0.031
direction = "receiver"
index = "EUR-EURIBOR-6M"

[[trades]]
id = "ZCB_001"
netting_set = "NS_CORP_B"
type = "bond"
notional = 1000000.0
maturity = "2026-06-30"
"#;

impl RunConfig {
    /// Loads a configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(format!("{}: {}", path.display(), e)))?;
        Self::from_toml(&content)
    }

    /// Parses a configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Applies environment variable overrides.
    pub fn with_env_override(mut self) -> Self {
        if let Some(samples) = env_parse("EXPOSURE_SAMPLES") {
            self.simulation.samples = samples;
        }
        if let Some(seed) = env_parse("EXPOSURE_SEED") {
            self.simulation.seed = seed;
        }
        if let Some(threads) = env_parse("EXPOSURE_THREADS") {
            self.simulation.threads = Some(threads);
        }
        if let Ok(dir) = std::env::var("EXPOSURE_OUTPUT_DIR") {
            self.output_dir = PathBuf::from(dir);
        }
        self
    }

    /// Checks the whole configuration, reporting every problem at once.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        check_date(&mut errors, "asof", &self.asof);
        if self.simulation.samples == 0 {
            errors.push("simulation.samples must be greater than 0".to_string());
        }
        if self.simulation.threads == Some(0) {
            errors.push("simulation.threads must be greater than 0".to_string());
        }
        if !(self.confidence > 0.0 && self.confidence < 1.0) {
            errors.push(format!("confidence {} must lie in (0, 1)", self.confidence));
        }
        if self.output_dir.as_os_str().is_empty() {
            errors.push("output_dir cannot be empty".to_string());
        }

        if self.grid.tenors.is_empty() {
            errors.push("grid.tenors cannot be empty".to_string());
        }
        for tenor in &self.grid.tenors {
            if let Err(e) = Tenor::parse(tenor) {
                errors.push(format!("grid.tenors: {}", e));
            }
        }
        if self.grid.mpor_days == Some(0) {
            errors.push("grid.mpor_days must be greater than 0".to_string());
        }

        if !(self.model.volatility.is_finite() && self.model.volatility >= 0.0) {
            errors.push(format!("model.volatility {} must be non-negative", self.model.volatility));
        }
        if !(self.model.mean_reversion.is_finite() && self.model.mean_reversion >= 0.0) {
            errors.push(format!(
                "model.mean_reversion {} must be non-negative",
                self.model.mean_reversion
            ));
        }

        if let Some(margin) = &self.margin {
            if margin.buckets.is_empty() {
                errors.push("margin.buckets cannot be empty".to_string());
            }
            let increasing = margin.buckets.windows(2).all(|w| w[1] > w[0]);
            if !increasing || margin.buckets.iter().any(|b| *b <= 0.0) {
                errors.push("margin.buckets must be positive and increasing".to_string());
            }
            if !(margin.quantile > 0.0 && margin.quantile < 1.0) {
                errors.push(format!("margin.quantile {} must lie in (0, 1)", margin.quantile));
            }
            if margin.holding_days == 0 {
                errors.push("margin.holding_days must be greater than 0".to_string());
            }
            if !(-1.0..=1.0).contains(&margin.correlation) {
                errors.push(format!(
                    "margin.correlation {} must lie in [-1, 1]",
                    margin.correlation
                ));
            }
        }

        let mut index_names = BTreeSet::new();
        for index in &self.indices {
            if !index_names.insert(index.name.as_str()) {
                errors.push(format!("duplicate index '{}'", index.name));
            }
            if let Err(e) = Tenor::parse(&index.tenor) {
                errors.push(format!("index {}: {}", index.name, e));
            }
            check_day_count(&mut errors, &index.name, &index.day_count);
        }
        for fixing in &self.fixings {
            if !index_names.contains(fixing.index.as_str()) {
                errors.push(format!("fixing references unknown index '{}'", fixing.index));
            }
            check_date(&mut errors, &format!("fixing {}", fixing.index), &fixing.date);
        }

        let mut counterparties = BTreeSet::new();
        for cp in self.counterparties.iter().chain(self.own_party.as_ref()) {
            if !counterparties.insert(cp.id.as_str()) {
                errors.push(format!("duplicate counterparty '{}'", cp.id));
            }
            if !(0.0..=1.0).contains(&cp.lgd) {
                errors.push(format!("counterparty {}: lgd {} must lie in [0, 1]", cp.id, cp.lgd));
            }
            if cp.hazard_rate.is_some_and(|h| !(h.is_finite() && h >= 0.0)) {
                errors.push(format!("counterparty {}: hazard_rate must be non-negative", cp.id));
            }
        }
        if self.counterparties.is_empty() {
            errors.push("at least one counterparty is required".to_string());
        }

        let mut netting_sets = BTreeSet::new();
        for ns in &self.netting_sets {
            if !netting_sets.insert(ns.id.as_str()) {
                errors.push(format!("duplicate netting set '{}'", ns.id));
            }
            if !self.counterparties.iter().any(|cp| cp.id == ns.counterparty) {
                errors.push(format!(
                    "netting set {} references unknown counterparty '{}'",
                    ns.id, ns.counterparty
                ));
            }
            if ns.initial_margin.is_some_and(|im| !(im.is_finite() && im >= 0.0)) {
                errors.push(format!("netting set {}: initial_margin must be non-negative", ns.id));
            }
        }

        if self.trades.is_empty() {
            errors.push("at least one trade is required".to_string());
        }
        let mut trades = BTreeSet::new();
        for trade in &self.trades {
            if !trades.insert(trade.id.as_str()) {
                errors.push(format!("duplicate trade '{}'", trade.id));
            }
            if !netting_sets.contains(trade.netting_set.as_str()) {
                errors.push(format!(
                    "trade {} references unknown netting set '{}'",
                    trade.id, trade.netting_set
                ));
            }
            match &trade.product {
                ProductConfig::Swap {
                    start,
                    maturity,
                    index,
                    fixed_frequency,
                    fixed_day_count,
                    floating_frequency,
                    ..
                } => {
                    check_date(&mut errors, &trade.id, start);
                    check_date(&mut errors, &trade.id, maturity);
                    if !index_names.contains(index.as_str()) {
                        errors.push(format!(
                            "trade {} references unknown index '{}'",
                            trade.id, index
                        ));
                    }
                    for frequency in [fixed_frequency, floating_frequency] {
                        if let Err(e) = frequency.parse::<Frequency>() {
                            errors.push(format!("trade {}: {}", trade.id, e));
                        }
                    }
                    check_day_count(&mut errors, &trade.id, fixed_day_count);
                }
                ProductConfig::Bond { maturity, .. } => {
                    check_date(&mut errors, &trade.id, maturity)
                }
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }

    /// Loads from file with environment overrides and validates.
    pub fn load_with_env_and_validate(path: &Path) -> Result<Self, ConfigError> {
        let config = Self::load(path)?.with_env_override();
        config.validate()?;
        Ok(config)
    }
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|v| v.parse().ok())
}

fn check_date(errors: &mut Vec<String>, context: &str, value: &str) {
    if let Err(e) = Date::parse(value) {
        errors.push(format!("{}: {}", context, e));
    }
}

fn check_day_count(errors: &mut Vec<String>, context: &str, value: &str) {
    if let Err(e) = value.parse::<DayCountConvention>() {
        errors.push(format!("{}: {}", context, e));
    }
}
