use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// All monetary intermediates. Wraps Decimal to prevent accidental f64 usage.
pub type Money = Decimal;

/// Rates expressed as decimals (0.05 = 5%). Never as percentages.
pub type Rate = Decimal;

/// Amounts crossing the engine boundary: integer minor currency units
/// (cents). The engine never accepts or emits floating-point currency.
pub type MinorUnits = i64;

/// The kind of income a distribution batch pays out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistributionType {
    RentalIncome,
    CapitalGain,
    ExitProceeds,
}

/// A confirmed investor stake in a property, as recorded by the investment
/// ledger.
///
/// `ownership_fraction` is fixed at confirmation time and never revised,
/// even if the property is later revalued. Exits are soft: `exited_at` is
/// appended and the position is never deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvestmentPosition {
    pub investor_id: String,
    pub property_id: String,
    pub amount_invested: MinorUnits,
    pub ownership_fraction: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exited_at: Option<NaiveDate>,
}

/// One year of an ROI projection series. Produced fresh on each request;
/// never persisted by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectionPoint {
    /// Projection year, 1-based.
    pub year: u32,
    /// Investor's share of that year's net rent.
    pub projected_income: MinorUnits,
    /// Whole-property appreciated value.
    pub projected_property_value: MinorUnits,
    /// Investor's slice of the appreciated value.
    pub investor_equity_value: MinorUnits,
}

/// Header of one income distribution. Immutable once created; cancellation
/// appends a reversing batch rather than mutating this one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistributionBatch {
    pub property_id: String,
    pub total_amount: MinorUnits,
    pub distribution_type: DistributionType,
    pub distribution_date: NaiveDate,
}

/// One investor's slice of a distribution batch. Append-only ledger entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistributionRecord {
    pub investor_id: String,
    pub allocated_amount: MinorUnits,
}

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Helper to wrap computation results with metadata
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "rust_decimal_128bit".to_string(),
        },
    }
}
