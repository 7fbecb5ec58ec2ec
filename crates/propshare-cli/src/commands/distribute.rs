use chrono::NaiveDate;
use clap::{Args, ValueEnum};
use serde_json::Value;

use propshare_core::distribution::{self, DistributionInput, PositionShare};
use propshare_core::types::DistributionType;

use crate::input;

/// Arguments for pro-rata distribution
#[derive(Args)]
pub struct DistributeArgs {
    /// Total amount to distribute, in minor currency units (cents)
    #[arg(long)]
    pub total: Option<i64>,

    /// Property identifier
    #[arg(long)]
    pub property: Option<String>,

    /// Kind of income being paid out
    #[arg(long = "type", value_enum, default_value = "rental-income")]
    pub distribution_type: DistributionKind,

    /// Distribution date (YYYY-MM-DD, defaults to today)
    #[arg(long)]
    pub date: Option<NaiveDate>,

    /// Path to JSON input file: either a full distribution request or a bare
    /// positions array combined with the flags above
    #[arg(long)]
    pub input: Option<String>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum DistributionKind {
    RentalIncome,
    CapitalGain,
    ExitProceeds,
}

impl From<DistributionKind> for DistributionType {
    fn from(kind: DistributionKind) -> Self {
        match kind {
            DistributionKind::RentalIncome => DistributionType::RentalIncome,
            DistributionKind::CapitalGain => DistributionType::CapitalGain,
            DistributionKind::ExitProceeds => DistributionType::ExitProceeds,
        }
    }
}

pub fn run(args: DistributeArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let data: Value = if let Some(ref path) = args.input {
        input::read_json_value(path)?
    } else if let Some(data) = input::read_stdin()? {
        data
    } else {
        return Err("positions are required: provide --input or pipe JSON via stdin".into());
    };

    let request: DistributionInput = if data.is_array() {
        let positions: Vec<PositionShare> = serde_json::from_value(data)?;
        DistributionInput {
            property_id: args
                .property
                .ok_or("--property is required when the input is a positions array")?,
            total_amount: args
                .total
                .ok_or("--total is required when the input is a positions array")?,
            distribution_type: args.distribution_type.into(),
            distribution_date: args
                .date
                .unwrap_or_else(|| chrono::Local::now().date_naive()),
            positions,
        }
    } else {
        serde_json::from_value(data)?
    };

    let result = distribution::allocate(&request)?;
    Ok(serde_json::to_value(result)?)
}
