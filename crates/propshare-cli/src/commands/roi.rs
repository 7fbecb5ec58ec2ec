use clap::Args;
use serde::Deserialize;
use serde_json::Value;

use propshare_core::roi::{self, RoiInput};
use propshare_core::yield_model::YieldModel;

use crate::input;

/// Arguments for ROI projection
#[derive(Args)]
pub struct RoiArgs {
    /// Amount invested, in minor currency units (cents)
    #[arg(long)]
    pub amount: Option<i64>,

    /// Property valuation, in minor currency units (cents)
    #[arg(long)]
    pub value: Option<i64>,

    /// Property category id (see `propshare categories`)
    #[arg(long)]
    pub category: Option<String>,

    /// Projection horizon in years
    #[arg(long, default_value = "10")]
    pub years: u32,

    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

/// JSON request shape for `--input` / piped stdin.
#[derive(Deserialize)]
struct RoiRequest {
    investment_amount: i64,
    property_value: i64,
    #[serde(default = "default_horizon")]
    horizon_years: u32,
    category: String,
}

fn default_horizon() -> u32 {
    10
}

pub fn run(args: RoiArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let request: RoiRequest = if let Some(ref path) = args.input {
        input::read_json(path)?
    } else if let Some(data) = input::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        RoiRequest {
            investment_amount: args
                .amount
                .ok_or("--amount is required (or provide --input)")?,
            property_value: args
                .value
                .ok_or("--value is required (or provide --input)")?,
            horizon_years: args.years,
            category: args
                .category
                .ok_or("--category is required (or provide --input)")?,
        }
    };

    let model = YieldModel::builtin();
    let category = model.get(&request.category)?;
    let result = roi::project_roi(
        &RoiInput {
            investment_amount: request.investment_amount,
            property_value: request.property_value,
            horizon_years: request.horizon_years,
        },
        category,
        model.assumptions(),
    )?;
    Ok(serde_json::to_value(result)?)
}
