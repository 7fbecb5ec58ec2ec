use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::PropshareError;
use crate::types::Rate;
use crate::PropshareResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Versioned modeling assumptions shared by every projection.
///
/// Passed explicitly into `roi::project_roi` rather than read from module
/// state, so a historical projection can be reproduced by re-supplying the
/// assumption set it was made under.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelAssumptions {
    pub version: String,
    /// Annual inflation applied to property-level running costs.
    pub cost_inflation_rate: Rate,
}

impl ModelAssumptions {
    /// Assumption set v1: 3% annual cost inflation.
    pub fn v1() -> Self {
        Self {
            version: "v1".into(),
            cost_inflation_rate: dec!(0.03),
        }
    }
}

/// Band of plausible gross rental yields for a category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct YieldRange {
    pub min: Rate,
    pub max: Rate,
}

/// Immutable yield profile for one property category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropertyCategory {
    pub id: String,
    pub name: String,
    /// Gross rent as a fraction of property value in year 0.
    pub base_rental_yield: Rate,
    pub yield_range: YieldRange,
    /// Fraction of gross rent paid to the property manager.
    pub management_fee_rate: Rate,
    /// Running costs (tax, insurance, upkeep) as a fraction of value per year.
    pub other_cost_rate: Rate,
    pub annual_yield_growth_rate: Rate,
    pub annual_appreciation_rate: Rate,
}

/// Validated catalog of property categories together with the assumption
/// set they are projected under. Lookup-only after construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct YieldModel {
    // Sorted by id; get() binary-searches.
    categories: Vec<PropertyCategory>,
    assumptions: ModelAssumptions,
}

// ---------------------------------------------------------------------------
// Construction & lookup
// ---------------------------------------------------------------------------

impl YieldModel {
    /// Build a model from a category list, rejecting any category whose
    /// rates violate the configuration invariants.
    pub fn new(
        categories: Vec<PropertyCategory>,
        assumptions: ModelAssumptions,
    ) -> PropshareResult<Self> {
        if categories.is_empty() {
            return Err(PropshareError::InvalidInput {
                field: "categories".into(),
                reason: "A yield model requires at least one property category".into(),
            });
        }
        if assumptions.cost_inflation_rate < Decimal::ZERO
            || assumptions.cost_inflation_rate > Decimal::ONE
        {
            return Err(PropshareError::InvalidInput {
                field: "cost_inflation_rate".into(),
                reason: "Cost inflation rate must be between 0 and 1".into(),
            });
        }

        for category in &categories {
            validate_category(category)?;
        }

        let mut categories = categories;
        categories.sort_by(|a, b| a.id.cmp(&b.id));

        for pair in categories.windows(2) {
            if pair[0].id == pair[1].id {
                return Err(PropshareError::InvalidInput {
                    field: "categories".into(),
                    reason: format!("Duplicate category id '{}'", pair[0].id),
                });
            }
        }

        Ok(Self {
            categories,
            assumptions,
        })
    }

    /// The platform's stock catalog under assumption set v1.
    ///
    /// The catalog is already sorted and satisfies every configuration
    /// invariant (covered by `builtin_catalog_is_valid`).
    pub fn builtin() -> Self {
        Self {
            categories: builtin_categories(),
            assumptions: ModelAssumptions::v1(),
        }
    }

    /// Look up a category by id. An unknown id is an error, never a default:
    /// substituting a yield profile would misstate projected returns.
    pub fn get(&self, category_id: &str) -> PropshareResult<&PropertyCategory> {
        self.categories
            .binary_search_by(|c| c.id.as_str().cmp(category_id))
            .map(|i| &self.categories[i])
            .map_err(|_| PropshareError::UnknownCategory {
                category_id: category_id.to_string(),
            })
    }

    /// All categories in ascending id order.
    pub fn categories(&self) -> &[PropertyCategory] {
        &self.categories
    }

    pub fn assumptions(&self) -> &ModelAssumptions {
        &self.assumptions
    }
}

fn validate_category(category: &PropertyCategory) -> PropshareResult<()> {
    if category.id.trim().is_empty() {
        return Err(PropshareError::InvalidInput {
            field: "id".into(),
            reason: "Category id must not be empty".into(),
        });
    }

    let unit_interval_rates = [
        ("base_rental_yield", category.base_rental_yield),
        ("management_fee_rate", category.management_fee_rate),
        ("other_cost_rate", category.other_cost_rate),
        ("annual_yield_growth_rate", category.annual_yield_growth_rate),
        ("yield_range.min", category.yield_range.min),
        ("yield_range.max", category.yield_range.max),
    ];
    for (field, rate) in unit_interval_rates {
        if rate < Decimal::ZERO || rate > Decimal::ONE {
            return Err(PropshareError::InvalidInput {
                field: field.into(),
                reason: format!("Rate must be between 0 and 1 for category '{}'", category.id),
            });
        }
    }

    // Appreciation may theoretically exceed 100%/yr but never be negative.
    if category.annual_appreciation_rate < Decimal::ZERO {
        return Err(PropshareError::InvalidInput {
            field: "annual_appreciation_rate".into(),
            reason: format!(
                "Appreciation rate must be non-negative for category '{}'",
                category.id
            ),
        });
    }

    if category.yield_range.min > category.yield_range.max {
        return Err(PropshareError::InvalidInput {
            field: "yield_range".into(),
            reason: format!("Inverted yield range for category '{}'", category.id),
        });
    }
    if category.base_rental_yield < category.yield_range.min
        || category.base_rental_yield > category.yield_range.max
    {
        return Err(PropshareError::InvalidInput {
            field: "base_rental_yield".into(),
            reason: format!(
                "Base yield falls outside the yield range for category '{}'",
                category.id
            ),
        });
    }

    Ok(())
}

fn builtin_categories() -> Vec<PropertyCategory> {
    vec![
        PropertyCategory {
            id: "commercial".into(),
            name: "Commercial".into(),
            base_rental_yield: dec!(0.065),
            yield_range: YieldRange {
                min: dec!(0.05),
                max: dec!(0.08),
            },
            management_fee_rate: dec!(0.10),
            other_cost_rate: dec!(0.015),
            annual_yield_growth_rate: dec!(0.025),
            annual_appreciation_rate: dec!(0.03),
        },
        PropertyCategory {
            id: "industrial".into(),
            name: "Industrial / Logistics".into(),
            base_rental_yield: dec!(0.07),
            yield_range: YieldRange {
                min: dec!(0.055),
                max: dec!(0.085),
            },
            management_fee_rate: dec!(0.07),
            other_cost_rate: dec!(0.012),
            annual_yield_growth_rate: dec!(0.02),
            annual_appreciation_rate: dec!(0.025),
        },
        PropertyCategory {
            id: "mixed_use".into(),
            name: "Mixed Use".into(),
            base_rental_yield: dec!(0.055),
            yield_range: YieldRange {
                min: dec!(0.04),
                max: dec!(0.07),
            },
            management_fee_rate: dec!(0.09),
            other_cost_rate: dec!(0.013),
            annual_yield_growth_rate: dec!(0.022),
            annual_appreciation_rate: dec!(0.035),
        },
        PropertyCategory {
            id: "residential".into(),
            name: "Residential".into(),
            base_rental_yield: dec!(0.045),
            yield_range: YieldRange {
                min: dec!(0.035),
                max: dec!(0.055),
            },
            management_fee_rate: dec!(0.08),
            other_cost_rate: dec!(0.01),
            annual_yield_growth_rate: dec!(0.02),
            annual_appreciation_rate: dec!(0.04),
        },
        PropertyCategory {
            id: "vacation_rental".into(),
            name: "Vacation Rental".into(),
            base_rental_yield: dec!(0.09),
            yield_range: YieldRange {
                min: dec!(0.06),
                max: dec!(0.12),
            },
            management_fee_rate: dec!(0.18),
            other_cost_rate: dec!(0.02),
            annual_yield_growth_rate: dec!(0.03),
            annual_appreciation_rate: dec!(0.035),
        },
    ]
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
