use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::PropshareError;
use crate::types::{
    with_metadata, ComputationOutput, DistributionBatch, DistributionRecord, DistributionType,
    InvestmentPosition, MinorUnits,
};
use crate::PropshareResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Ownership snapshot the allocator consumes: one eligible position.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PositionShare {
    pub investor_id: String,
    pub ownership_fraction: Decimal,
}

impl From<&InvestmentPosition> for PositionShare {
    fn from(position: &InvestmentPosition) -> Self {
        Self {
            investor_id: position.investor_id.clone(),
            ownership_fraction: position.ownership_fraction,
        }
    }
}

/// Input for a pro-rata income distribution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DistributionInput {
    pub property_id: String,
    /// Lump amount to distribute, minor currency units.
    pub total_amount: MinorUnits,
    pub distribution_type: DistributionType,
    pub distribution_date: NaiveDate,
    pub positions: Vec<PositionShare>,
}

impl DistributionInput {
    /// Build an input from ledger positions, keeping only stakes in this
    /// property still held on the distribution date. Soft-exited positions
    /// are ineligible.
    pub fn from_ledger(
        property_id: &str,
        total_amount: MinorUnits,
        distribution_type: DistributionType,
        distribution_date: NaiveDate,
        ledger: &[InvestmentPosition],
    ) -> Self {
        let positions = ledger
            .iter()
            .filter(|p| p.property_id == property_id)
            .filter(|p| p.exited_at.is_none_or(|exited| exited > distribution_date))
            .map(PositionShare::from)
            .collect();
        Self {
            property_id: property_id.to_string(),
            total_amount,
            distribution_type,
            distribution_date,
            positions,
        }
    }
}

/// Complete distribution result: the batch header, one record per position
/// (explicit zeros included), and audit figures.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DistributionOutput {
    pub batch: DistributionBatch,
    /// Records in ascending investor id order.
    pub records: Vec<DistributionRecord>,
    /// Minor units handed out one at a time after flooring the raw shares.
    pub residual_units: MinorUnits,
    /// Sum of the input ownership fractions.
    pub coverage: Decimal,
}

// ---------------------------------------------------------------------------
// Allocation
// ---------------------------------------------------------------------------

/// Split a lump amount across investor positions pro-rata by ownership
/// fraction, using the largest-remainder method.
///
/// Raw shares are computed in exact decimal arithmetic and floored to minor
/// units; the leftover units go one at a time to the largest fractional
/// remainders, ties broken by ascending investor id. Every batch conserves
/// `total_amount` exactly — the postcondition is re-checked before the
/// result is returned, not assumed.
///
/// Pure function of its input: deciding whether a batch may be persisted
/// (double-distribution prevention) is the caller's transactional concern.
pub fn allocate(
    input: &DistributionInput,
) -> PropshareResult<ComputationOutput<DistributionOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let coverage = validate_input(input)?;

    let total = Decimal::from(input.total_amount);
    let count = input.positions.len();

    // --- Floor the exact raw shares, tracking fractional remainders ---
    let mut floors: Vec<MinorUnits> = Vec::with_capacity(count);
    let mut remainders: Vec<Decimal> = Vec::with_capacity(count);
    for position in &input.positions {
        let raw = total * position.ownership_fraction;
        let floored = raw.floor();
        let units = floored
            .to_i64()
            .ok_or_else(|| PropshareError::InvalidInput {
                field: "total_amount".into(),
                reason: "Raw share exceeds the representable minor-unit range".into(),
            })?;
        floors.push(units);
        remainders.push(raw - floored);
    }

    let floor_sum: MinorUnits = floors.iter().sum();
    let residual_units = input.total_amount - floor_sum;

    // --- Hand residual units to the largest remainders, ids as tie-break ---
    let mut order: Vec<usize> = (0..count).collect();
    order.sort_by(|&a, &b| {
        remainders[b]
            .cmp(&remainders[a])
            .then_with(|| input.positions[a].investor_id.cmp(&input.positions[b].investor_id))
    });

    // With full coverage the residual is strictly less than the position
    // count. Below full coverage the unsold share's units also land here,
    // so the pass cycles.
    for k in 0..residual_units as usize {
        floors[order[k % count]] += 1;
    }

    if coverage < Decimal::ONE {
        warnings.push(format!(
            "Ownership coverage is {coverage} (< 1): {residual_units} residual units, including \
             the unsold fraction's share, went to held positions to conserve the batch total"
        ));
    }

    // --- Emit one record per position, explicit zeros included ---
    let mut records: Vec<DistributionRecord> = input
        .positions
        .iter()
        .zip(floors.iter())
        .map(|(position, &allocated_amount)| DistributionRecord {
            investor_id: position.investor_id.clone(),
            allocated_amount,
        })
        .collect();
    records.sort_by(|a, b| a.investor_id.cmp(&b.investor_id));

    // --- Verified postcondition: exact conservation ---
    let allocated: MinorUnits = records.iter().map(|r| r.allocated_amount).sum();
    if allocated != input.total_amount {
        return Err(PropshareError::ConservationFailure {
            expected: input.total_amount,
            actual: allocated,
        });
    }

    let output = DistributionOutput {
        batch: DistributionBatch {
            property_id: input.property_id.clone(),
            total_amount: input.total_amount,
            distribution_type: input.distribution_type,
            distribution_date: input.distribution_date,
        },
        records,
        residual_units,
        coverage,
    };

    let elapsed = start.elapsed().as_micros() as u64;

    Ok(with_metadata(
        "Pro-Rata Distribution (Largest Remainder)",
        input,
        warnings,
        elapsed,
        output,
    ))
}

/// Build the reversing batch for a previously issued distribution.
///
/// Cancellation is append-only: the reversal negates every amount so the
/// ledger nets to zero without touching the original records.
pub fn reverse(
    batch: &DistributionBatch,
    records: &[DistributionRecord],
    reversal_date: NaiveDate,
) -> (DistributionBatch, Vec<DistributionRecord>) {
    let reversing_batch = DistributionBatch {
        property_id: batch.property_id.clone(),
        total_amount: -batch.total_amount,
        distribution_type: batch.distribution_type,
        distribution_date: reversal_date,
    };
    let reversing_records = records
        .iter()
        .map(|r| DistributionRecord {
            investor_id: r.investor_id.clone(),
            allocated_amount: -r.allocated_amount,
        })
        .collect();
    (reversing_batch, reversing_records)
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Check preconditions and return the ownership coverage.
fn validate_input(input: &DistributionInput) -> PropshareResult<Decimal> {
    if input.total_amount <= 0 {
        return Err(PropshareError::NothingToDistribute(
            "Total amount must be positive".into(),
        ));
    }
    if input.positions.is_empty() {
        return Err(PropshareError::NothingToDistribute(
            "No eligible investor positions".into(),
        ));
    }

    let mut coverage = Decimal::ZERO;
    for position in &input.positions {
        if position.ownership_fraction < Decimal::ZERO
            || position.ownership_fraction > Decimal::ONE
        {
            return Err(PropshareError::InvalidInput {
                field: "ownership_fraction".into(),
                reason: format!(
                    "Fraction for investor '{}' must be between 0 and 1",
                    position.investor_id
                ),
            });
        }
        coverage += position.ownership_fraction;
    }

    if coverage > Decimal::ONE {
        return Err(PropshareError::InvalidInput {
            field: "positions".into(),
            reason: format!("Ownership fractions sum to {coverage}, above 1"),
        });
    }

    let mut ids: Vec<&str> = input
        .positions
        .iter()
        .map(|p| p.investor_id.as_str())
        .collect();
    ids.sort_unstable();
    for pair in ids.windows(2) {
        if pair[0] == pair[1] {
            return Err(PropshareError::InvalidInput {
                field: "positions".into(),
                reason: format!("Duplicate position for investor '{}'", pair[0]),
            });
        }
    }

    Ok(coverage)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    fn share(investor_id: &str, fraction: Decimal) -> PositionShare {
        PositionShare {
            investor_id: investor_id.into(),
            ownership_fraction: fraction,
        }
    }

    fn input_for(total_amount: MinorUnits, positions: Vec<PositionShare>) -> DistributionInput {
        DistributionInput {
            property_id: "prop-1".into(),
            total_amount,
            distribution_type: DistributionType::RentalIncome,
            distribution_date: NaiveDate::from_ymd_opt(2026, 6, 30).unwrap(),
            positions,
        }
    }

    fn allocated_sum(output: &DistributionOutput) -> MinorUnits {
        output.records.iter().map(|r| r.allocated_amount).sum()
    }

    #[test]
    fn largest_remainder_splits_thirds() {
        let input = input_for(
            1000,
            vec![
                share("inv-a", dec!(0.333333)),
                share("inv-b", dec!(0.333333)),
                share("inv-c", dec!(0.333334)),
            ],
        );
        let output = allocate(&input).unwrap().result;

        // Raw shares 333.333 / 333.333 / 333.334; the single leftover unit
        // goes to the largest remainder.
        let amounts: Vec<MinorUnits> = output.records.iter().map(|r| r.allocated_amount).collect();
        assert_eq!(amounts, vec![333, 333, 334]);
        assert_eq!(output.residual_units, 1);
        assert_eq!(allocated_sum(&output), 1000);
    }

    #[test]
    fn remainder_ties_break_by_ascending_investor_id() {
        // Raw shares 37.5 / 37.5 / 25.0: one leftover unit, equal remainders.
        let input = input_for(
            100,
            vec![
                share("zed", dec!(0.375)),
                share("alice", dec!(0.375)),
                share("mid", dec!(0.25)),
            ],
        );
        let output = allocate(&input).unwrap().result;

        let alice = output.records.iter().find(|r| r.investor_id == "alice").unwrap();
        let zed = output.records.iter().find(|r| r.investor_id == "zed").unwrap();
        assert_eq!(alice.allocated_amount, 38);
        assert_eq!(zed.allocated_amount, 37);
        assert_eq!(allocated_sum(&output), 100);
    }

    #[test]
    fn single_residual_goes_to_largest_remainder() {
        let input = input_for(
            1007,
            vec![
                share("a", dec!(0.5)),
                share("b", dec!(0.3)),
                share("c", dec!(0.2)),
            ],
        );
        let output = allocate(&input).unwrap().result;

        // Raw 503.5 / 302.1 / 201.4 -> floors 503/302/201, leftover to "a".
        let amounts: Vec<MinorUnits> = output.records.iter().map(|r| r.allocated_amount).collect();
        assert_eq!(amounts, vec![504, 302, 201]);
    }

    #[test]
    fn zero_fraction_position_gets_explicit_zero_record() {
        let input = input_for(
            500,
            vec![share("holder", Decimal::ONE), share("watcher", Decimal::ZERO)],
        );
        let output = allocate(&input).unwrap().result;

        assert_eq!(output.records.len(), 2);
        let watcher = output
            .records
            .iter()
            .find(|r| r.investor_id == "watcher")
            .unwrap();
        assert_eq!(watcher.allocated_amount, 0);
        assert_eq!(allocated_sum(&output), 500);
    }

    #[test]
    fn records_ordered_by_investor_id() {
        let input = input_for(
            999,
            vec![
                share("charlie", dec!(0.2)),
                share("alice", dec!(0.5)),
                share("bob", dec!(0.3)),
            ],
        );
        let output = allocate(&input).unwrap().result;
        let ids: Vec<&str> = output.records.iter().map(|r| r.investor_id.as_str()).collect();
        assert_eq!(ids, vec!["alice", "bob", "charlie"]);
    }

    #[test]
    fn conserves_exactly_with_awkward_fractions() {
        // 20 positions with fractions in 256ths summing below 1;
        // conservation must hold regardless of coverage.
        let positions: Vec<PositionShare> = (1..=20)
            .map(|i| share(&format!("inv-{i:02}"), Decimal::from(i) / dec!(256)))
            .collect();
        let input = input_for(12_345, positions);
        let output = allocate(&input).unwrap().result;

        assert_eq!(allocated_sum(&output), 12_345);
        assert!(output.records.iter().all(|r| r.allocated_amount >= 0));
        assert_eq!(output.coverage, dec!(210) / dec!(256));
    }

    #[test]
    fn growing_fraction_never_loses_more_than_one_unit() {
        // Step one investor's stake upward while the other two split the
        // exact remainder 60/40. Between steps the remainder method may
        // move that investor's allocation down by at most one minor unit.
        let total = 1003;
        let steps = [dec!(0.10), dec!(0.25), dec!(0.40), dec!(0.55), dec!(0.70)];
        let mut previous: Option<MinorUnits> = None;

        for fraction in steps {
            let rest = Decimal::ONE - fraction;
            let input = input_for(
                total,
                vec![
                    share("grower", fraction),
                    share("other-1", rest * dec!(0.6)),
                    share("other-2", rest * dec!(0.4)),
                ],
            );
            let output = allocate(&input).unwrap().result;
            let grower = output
                .records
                .iter()
                .find(|r| r.investor_id == "grower")
                .unwrap()
                .allocated_amount;

            if let Some(prev) = previous {
                assert!(
                    grower >= prev - 1,
                    "allocation fell from {prev} to {grower} as the fraction grew to {fraction}"
                );
            }
            previous = Some(grower);
            assert_eq!(allocated_sum(&output), total);
        }
    }

    #[test]
    fn warns_when_coverage_below_one() {
        let input = input_for(1000, vec![share("a", dec!(0.25)), share("b", dec!(0.25))]);
        let output = allocate(&input).unwrap();

        assert!(output
            .warnings
            .iter()
            .any(|w| w.contains("coverage")), "missing coverage warning: {:?}", output.warnings);
        assert_eq!(allocated_sum(&output.result), 1000);
    }

    #[test]
    fn full_coverage_produces_no_warnings() {
        let input = input_for(1000, vec![share("a", dec!(0.6)), share("b", dec!(0.4))]);
        let output = allocate(&input).unwrap();
        assert!(output.warnings.is_empty());
        assert_eq!(output.result.residual_units, 0);
    }

    #[test]
    fn deterministic_for_identical_inputs() {
        let input = input_for(
            7919,
            vec![
                share("a", dec!(0.143)),
                share("b", dec!(0.457)),
                share("c", dec!(0.4)),
            ],
        );
        let first = allocate(&input).unwrap();
        let second = allocate(&input).unwrap();
        assert_eq!(first.result.records, second.result.records);
        assert_eq!(first.result.batch, second.result.batch);
    }

    #[test]
    fn empty_positions_is_nothing_to_distribute() {
        let input = input_for(500, vec![]);
        assert!(matches!(
            allocate(&input),
            Err(PropshareError::NothingToDistribute(_))
        ));
    }

    #[test]
    fn non_positive_total_is_nothing_to_distribute() {
        for total in [0, -100] {
            let input = input_for(total, vec![share("a", dec!(0.5))]);
            assert!(matches!(
                allocate(&input),
                Err(PropshareError::NothingToDistribute(_))
            ));
        }
    }

    #[test]
    fn rejects_fraction_outside_unit_interval() {
        let input = input_for(500, vec![share("a", dec!(1.2))]);
        assert!(matches!(
            allocate(&input),
            Err(PropshareError::InvalidInput { field, .. }) if field == "ownership_fraction"
        ));

        let input = input_for(500, vec![share("a", dec!(-0.1))]);
        assert!(allocate(&input).is_err());
    }

    #[test]
    fn rejects_fractions_summing_above_one() {
        let input = input_for(500, vec![share("a", dec!(0.7)), share("b", dec!(0.4))]);
        assert!(matches!(
            allocate(&input),
            Err(PropshareError::InvalidInput { field, .. }) if field == "positions"
        ));
    }

    #[test]
    fn rejects_duplicate_investor_ids() {
        let input = input_for(500, vec![share("a", dec!(0.3)), share("a", dec!(0.3))]);
        assert!(matches!(
            allocate(&input),
            Err(PropshareError::InvalidInput { field, .. }) if field == "positions"
        ));
    }

    #[test]
    fn batch_echoes_the_request() {
        let input = input_for(250, vec![share("a", Decimal::ONE)]);
        let output = allocate(&input).unwrap().result;
        assert_eq!(
            output.batch,
            DistributionBatch {
                property_id: "prop-1".into(),
                total_amount: 250,
                distribution_type: DistributionType::RentalIncome,
                distribution_date: NaiveDate::from_ymd_opt(2026, 6, 30).unwrap(),
            }
        );
    }

    #[test]
    fn from_ledger_filters_exited_and_foreign_positions() {
        let ledger = vec![
            InvestmentPosition {
                investor_id: "active".into(),
                property_id: "prop-1".into(),
                amount_invested: 50_000,
                ownership_fraction: dec!(0.5),
                exited_at: None,
            },
            InvestmentPosition {
                investor_id: "exited".into(),
                property_id: "prop-1".into(),
                amount_invested: 30_000,
                ownership_fraction: dec!(0.3),
                exited_at: NaiveDate::from_ymd_opt(2026, 1, 15),
            },
            InvestmentPosition {
                investor_id: "elsewhere".into(),
                property_id: "prop-2".into(),
                amount_invested: 20_000,
                ownership_fraction: dec!(0.2),
                exited_at: None,
            },
        ];
        let input = DistributionInput::from_ledger(
            "prop-1",
            1000,
            DistributionType::RentalIncome,
            NaiveDate::from_ymd_opt(2026, 6, 30).unwrap(),
            &ledger,
        );

        let ids: Vec<&str> = input.positions.iter().map(|p| p.investor_id.as_str()).collect();
        assert_eq!(ids, vec!["active"]);
    }

    #[test]
    fn from_ledger_keeps_positions_exiting_after_the_date() {
        let ledger = vec![InvestmentPosition {
            investor_id: "late-exit".into(),
            property_id: "prop-1".into(),
            amount_invested: 10_000,
            ownership_fraction: dec!(0.1),
            exited_at: NaiveDate::from_ymd_opt(2026, 12, 1),
        }];
        let input = DistributionInput::from_ledger(
            "prop-1",
            1000,
            DistributionType::ExitProceeds,
            NaiveDate::from_ymd_opt(2026, 6, 30).unwrap(),
            &ledger,
        );
        assert_eq!(input.positions.len(), 1);
    }

    #[test]
    fn reversal_negates_and_nets_to_zero() {
        let input = input_for(
            1000,
            vec![
                share("a", dec!(0.333333)),
                share("b", dec!(0.333333)),
                share("c", dec!(0.333334)),
            ],
        );
        let output = allocate(&input).unwrap().result;

        let reversal_date = NaiveDate::from_ymd_opt(2026, 7, 1).unwrap();
        let (reversing_batch, reversing_records) =
            reverse(&output.batch, &output.records, reversal_date);

        assert_eq!(reversing_batch.total_amount, -1000);
        assert_eq!(reversing_batch.distribution_date, reversal_date);

        let net: MinorUnits = output
            .records
            .iter()
            .zip(reversing_records.iter())
            .map(|(orig, rev)| {
                assert_eq!(orig.investor_id, rev.investor_id);
                orig.allocated_amount + rev.allocated_amount
            })
            .sum();
        assert_eq!(net, 0);
    }
}
