use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::PropshareError;
use crate::types::{with_metadata, ComputationOutput, MinorUnits, Money, ProjectionPoint};
use crate::yield_model::{ModelAssumptions, PropertyCategory};
use crate::PropshareResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Input for an ROI projection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoiInput {
    /// Amount invested, minor currency units.
    pub investment_amount: MinorUnits,
    /// Property valuation at investment time, minor currency units.
    pub property_value: MinorUnits,
    /// Projection horizon in years (>= 1).
    pub horizon_years: u32,
}

/// Complete ROI projection output.
///
/// Amount fields are minor currency units, rounded once at this boundary;
/// every intermediate stays in exact decimal arithmetic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoiOutput {
    /// investment_amount / property_value, exact.
    pub ownership_fraction: Decimal,
    /// Whole-property gross rent, year-0 basis (no growth applied).
    pub annual_gross_rent: MinorUnits,
    /// Whole-property net rent, year-0 basis.
    pub annual_net_rent: MinorUnits,
    /// Investor's monthly income on the year-1 projection basis.
    ///
    /// Year-0 figures use uncompounded rent while this uses the year-1
    /// series, so "current" and "year 1" figures disagree slightly. That
    /// mismatch is inherited platform behavior and is kept intentionally.
    pub monthly_income: MinorUnits,
    /// Year-0 investor income as a percentage of the amount invested.
    pub roi_percent: Decimal,
    /// Year-by-year projection, years 1..=horizon.
    pub projections: Vec<ProjectionPoint>,
    /// Sum of projected income plus equity gain over the full horizon.
    pub total_return: MinorUnits,
}

// ---------------------------------------------------------------------------
// Calculation
// ---------------------------------------------------------------------------

/// Project investor income, equity value and ROI for one position.
///
/// Pure and deterministic: identical inputs always produce identical
/// outputs. The assumption set is supplied by the caller so historical
/// projections remain reproducible when assumptions are revised.
pub fn project_roi(
    input: &RoiInput,
    category: &PropertyCategory,
    assumptions: &ModelAssumptions,
) -> PropshareResult<ComputationOutput<RoiOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    validate_input(input)?;

    if input.horizon_years > 30 {
        warnings.push(format!(
            "Horizon of {} years is beyond 30 — projections this far out are speculative",
            input.horizon_years
        ));
    }

    let amount = Decimal::from(input.investment_amount);
    let value = Decimal::from(input.property_value);
    let ownership_fraction = amount / value;

    // --- Year-0 (uncompounded) figures ---
    let gross_rent_0 = value * category.base_rental_yield;
    let net_rent_0 =
        gross_rent_0 - gross_rent_0 * category.management_fee_rate - value * category.other_cost_rate;
    let roi_percent = net_rent_0 * ownership_fraction / amount * dec!(100);

    // --- Projection series, years 1..=horizon ---
    let mut growth_factor = Decimal::ONE;
    let mut cost_factor = Decimal::ONE;
    let mut appreciation_factor = Decimal::ONE;

    let mut projections = Vec::with_capacity(input.horizon_years as usize);
    let mut income_sum = Decimal::ZERO;
    let mut income_year1 = Decimal::ZERO;
    let mut equity_final = Decimal::ZERO;
    let mut warned_negative_rent = false;

    for year in 1..=input.horizon_years {
        growth_factor *= Decimal::ONE + category.annual_yield_growth_rate;
        cost_factor *= Decimal::ONE + assumptions.cost_inflation_rate;
        appreciation_factor *= Decimal::ONE + category.annual_appreciation_rate;

        let gross = gross_rent_0 * growth_factor;
        let management_fee = gross * category.management_fee_rate;
        let other_costs = value * category.other_cost_rate * cost_factor;
        let net = gross - management_fee - other_costs;
        let income = net * ownership_fraction;
        let appreciated = value * appreciation_factor;
        let equity = appreciated * ownership_fraction;

        if net <= Decimal::ZERO && !warned_negative_rent {
            warnings.push(format!(
                "Net rent turns non-positive in year {year} — running costs outgrow rent"
            ));
            warned_negative_rent = true;
        }

        if year == 1 {
            income_year1 = income;
        }
        income_sum += income;
        equity_final = equity;

        projections.push(ProjectionPoint {
            year,
            projected_income: to_minor(income, "projected_income")?,
            projected_property_value: to_minor(appreciated, "projected_property_value")?,
            investor_equity_value: to_minor(equity, "investor_equity_value")?,
        });
    }

    // Aggregate from the unrounded series; round once at the end.
    let total_return = income_sum + (equity_final - amount);

    let output = RoiOutput {
        ownership_fraction,
        annual_gross_rent: to_minor(gross_rent_0, "annual_gross_rent")?,
        annual_net_rent: to_minor(net_rent_0, "annual_net_rent")?,
        monthly_income: to_minor(income_year1 / dec!(12), "monthly_income")?,
        roi_percent,
        projections,
        total_return: to_minor(total_return, "total_return")?,
    };

    let elapsed = start.elapsed().as_micros() as u64;

    Ok(with_metadata(
        "Fractional Ownership ROI Projection",
        &(input, category, assumptions),
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Validation & rounding
// ---------------------------------------------------------------------------

fn validate_input(input: &RoiInput) -> PropshareResult<()> {
    if input.investment_amount <= 0 {
        return Err(PropshareError::InvalidInput {
            field: "investment_amount".into(),
            reason: "Investment amount must be positive".into(),
        });
    }
    if input.property_value <= 0 {
        return Err(PropshareError::InvalidInput {
            field: "property_value".into(),
            reason: "Property value must be positive".into(),
        });
    }
    if input.investment_amount > input.property_value {
        return Err(PropshareError::InvalidInput {
            field: "investment_amount".into(),
            reason: "Investment amount cannot exceed the property value".into(),
        });
    }
    if input.horizon_years < 1 {
        return Err(PropshareError::InvalidInput {
            field: "horizon_years".into(),
            reason: "Horizon must be at least 1 year".into(),
        });
    }
    Ok(())
}

/// Round an exact decimal to integer minor units at the output boundary.
fn to_minor(amount: Money, field: &str) -> PropshareResult<MinorUnits> {
    amount
        .round_dp(0)
        .to_i64()
        .ok_or_else(|| PropshareError::InvalidInput {
            field: field.into(),
            reason: "Amount exceeds the representable minor-unit range".into(),
        })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
