//! Discrete allocation: converts final weights and a cash budget into whole
//! share counts, never overspending.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::cmp::Ordering;
use tracing::debug;

use crate::models::{AllocationRow, AllocationTable};

use super::combiner::AllocationCandidate;
use super::error::PortfolioError;

const WEIGHT_SUM_TOLERANCE: f64 = 1e-9;

/// Hard cap on redistribution passes. Termination is provable for validated
/// input (every pass spends a positive amount), so hitting this means the
/// input slipped past validation somehow.
const MAX_REDISTRIBUTION_PASSES: usize = 10_000;

/// Allocate `budget` across the candidates as whole shares.
///
/// Phase 1 gives every candidate its proportional floor,
/// `floor(budget * weight / price)` shares. Phase 2 spends the remaining
/// residue one extra share at a time down a fixed priority order (weight
/// descending, ticker ascending on ties): each pass takes the candidates
/// priced strictly below the residue, keeps the maximal prefix whose
/// cumulative price stays strictly below it, buys one share of each, and
/// repeats until no candidate is affordable. The strict inequality means a
/// candidate priced exactly at the residue is never bought, even though it
/// would exhaust the budget precisely.
///
/// Rows come back sorted by share count descending. Guarantees
/// Σ shares·price <= budget. A budget <= 0 yields all-zero share counts,
/// not an error.
pub fn allocate(
    candidates: &[AllocationCandidate],
    budget: Decimal,
) -> Result<AllocationTable, PortfolioError> {
    validate(candidates)?;

    // Priority order is established once and never re-sorted, even as the
    // affordable subset shrinks across passes.
    let mut order: Vec<usize> = (0..candidates.len()).collect();
    order.sort_by(|&a, &b| {
        candidates[b]
            .weight
            .partial_cmp(&candidates[a].weight)
            .unwrap_or(Ordering::Equal)
            .then_with(|| candidates[a].ticker.cmp(&candidates[b].ticker))
    });

    let mut shares = vec![0u64; candidates.len()];

    if budget > Decimal::ZERO {
        // Phase 1: proportional floor allocation
        for (i, candidate) in candidates.iter().enumerate() {
            let weight = Decimal::try_from(candidate.weight).map_err(|_| {
                PortfolioError::InvalidInput(format!(
                    "weight {} for '{}' is not representable",
                    candidate.weight, candidate.ticker
                ))
            })?;
            let floored = (budget * weight / candidate.price).floor();
            shares[i] = floored.to_u64().unwrap_or(0);
        }

        let spent: Decimal = candidates
            .iter()
            .zip(&shares)
            .map(|(c, &s)| c.price * Decimal::from(s))
            .sum();
        let mut residue = budget - spent;

        // Phase 2: iterative residual redistribution
        let mut passes = 0usize;
        loop {
            let affordable: Vec<usize> = order
                .iter()
                .copied()
                .filter(|&i| candidates[i].price < residue)
                .collect();
            if affordable.is_empty() {
                break;
            }

            passes += 1;
            if passes > MAX_REDISTRIBUTION_PASSES {
                return Err(PortfolioError::RedistributionStalled { passes });
            }

            let mut cumulative = Decimal::ZERO;
            let mut pass_cost = Decimal::ZERO;
            for i in affordable {
                cumulative += candidates[i].price;
                if cumulative >= residue {
                    break;
                }
                shares[i] += 1;
                pass_cost += candidates[i].price;
            }

            // Prices are validated positive, so every pass that buys
            // anything strictly decreases the residue.
            if pass_cost <= Decimal::ZERO {
                return Err(PortfolioError::RedistributionStalled { passes });
            }
            residue -= pass_cost;

            debug!(pass = passes, residue = %residue, "redistribution pass complete");
        }
    }

    // Assemble rows in priority order, then stable-sort by share count so
    // ties keep the deterministic priority ordering.
    let mut rows: Vec<AllocationRow> = order
        .iter()
        .map(|&i| {
            let c = &candidates[i];
            AllocationRow {
                ticker: c.ticker.clone(),
                sector: c.sector.clone(),
                industry: c.industry.clone(),
                website: c.website.clone(),
                price: c.price,
                shares: shares[i],
            }
        })
        .collect();
    rows.sort_by(|a, b| b.shares.cmp(&a.shares));

    let spent: Decimal = rows.iter().map(AllocationRow::cost).sum();

    Ok(AllocationTable {
        rows,
        budget,
        spent,
        unspent: budget - spent,
    })
}

/// Boundary validation, run before any numeric work.
fn validate(candidates: &[AllocationCandidate]) -> Result<(), PortfolioError> {
    if candidates.is_empty() {
        return Err(PortfolioError::InvalidInput(
            "cannot allocate over an empty candidate set".to_string(),
        ));
    }

    let mut weight_sum = 0.0;
    for candidate in candidates {
        if candidate.price <= Decimal::ZERO {
            return Err(PortfolioError::InvalidInput(format!(
                "'{}' has a non-positive price {}",
                candidate.ticker, candidate.price
            )));
        }
        if !candidate.weight.is_finite() || candidate.weight < 0.0 {
            return Err(PortfolioError::InvalidInput(format!(
                "'{}' has an invalid final weight {}",
                candidate.ticker, candidate.weight
            )));
        }
        weight_sum += candidate.weight;
    }

    if weight_sum > 1.0 + WEIGHT_SUM_TOLERANCE {
        return Err(PortfolioError::InvalidInput(format!(
            "final weights sum to {weight_sum}, above 1"
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn candidate(ticker: &str, price: Decimal, weight: f64) -> AllocationCandidate {
        AllocationCandidate {
            ticker: ticker.to_string(),
            sector: "Tech".to_string(),
            industry: String::new(),
            website: String::new(),
            price,
            weight,
        }
    }

    fn shares_of(table: &AllocationTable, ticker: &str) -> u64 {
        table
            .rows
            .iter()
            .find(|r| r.ticker == ticker)
            .map(|r| r.shares)
            .unwrap()
    }

    #[test]
    fn test_exact_proportional_split() {
        // Floors spend the whole budget, residue 0, no redistribution
        let candidates = vec![
            candidate("A", dec!(300), 0.6),
            candidate("B", dec!(200), 0.4),
        ];

        let table = allocate(&candidates, dec!(1000)).unwrap();

        assert_eq!(shares_of(&table, "A"), 2);
        assert_eq!(shares_of(&table, "B"), 2);
        assert_eq!(table.spent, dec!(1000));
        assert_eq!(table.unspent, dec!(0));
    }

    #[test]
    fn test_residue_nothing_affordable() {
        // Residue 300 after floors; neither price is strictly below it
        let candidates = vec![
            candidate("A", dec!(300), 0.5),
            candidate("B", dec!(400), 0.5),
        ];

        let table = allocate(&candidates, dec!(1000)).unwrap();

        assert_eq!(shares_of(&table, "A"), 1);
        assert_eq!(shares_of(&table, "B"), 1);
        assert_eq!(table.unspent, dec!(300));
    }

    #[test]
    fn test_price_equal_to_residue_never_bought() {
        // Weight 0.7 of 1000 buys 2 shares at 300, then 100 residue stays;
        // a candidate priced exactly at the remaining residue is excluded
        // by the strict inequality.
        let candidates = vec![
            candidate("A", dec!(350), 0.65),
            candidate("B", dec!(300), 0.35),
        ];

        // Floors: A = floor(650/350) = 1 (350), B = floor(350/300) = 1 (300);
        // residue 350. Filter needs price < 350: only B. Buy B, residue 50.
        // Nothing priced under 50, loop ends.
        let table = allocate(&candidates, dec!(1000)).unwrap();

        assert_eq!(shares_of(&table, "A"), 1);
        assert_eq!(shares_of(&table, "B"), 2);
        assert_eq!(table.unspent, dec!(50));
    }

    #[test]
    fn test_redistribution_prefers_higher_weight() {
        let candidates = vec![
            candidate("HI", dec!(10), 0.6),
            candidate("LO", dec!(10), 0.4),
        ];

        // Floors: HI 6, LO 4, residue 0... use a budget that leaves one
        // share's worth: 105 -> HI floor(63/10)=6, LO floor(42/10)=4,
        // spent 100, residue 5. Nothing under 5. Try 115: HI 6 (69/10),
        // LO 4 (46/10), spent 100, residue 15. Pass: both priced 10 < 15,
        // prefix: HI cumulative 10 < 15, LO cumulative 20 >= 15. HI +1.
        // Residue 5, loop ends.
        let table = allocate(&candidates, dec!(115)).unwrap();

        assert_eq!(shares_of(&table, "HI"), 7);
        assert_eq!(shares_of(&table, "LO"), 4);
        assert_eq!(table.unspent, dec!(5));
    }

    #[test]
    fn test_multiple_redistribution_passes() {
        // A cheap candidate absorbs the residue over repeated passes
        let candidates = vec![
            candidate("BIG", dec!(90), 0.9),
            candidate("PENNY", dec!(2), 0.1),
        ];

        // Budget 100: BIG floor(90/90)=1, PENNY floor(10/2)=5, spent 100.
        // Budget 107: BIG 1 (96.3/90), PENNY 5 (10.7/2), spent 100,
        // residue 7. Pass 1: only PENNY < 7, +1, residue 5. Pass 2: +1,
        // residue 3. Pass 3: +1, residue 1. Loop ends.
        let table = allocate(&candidates, dec!(107)).unwrap();

        assert_eq!(shares_of(&table, "BIG"), 1);
        assert_eq!(shares_of(&table, "PENNY"), 8);
        assert_eq!(table.unspent, dec!(1));
    }

    #[test]
    fn test_never_overspends() {
        let candidates = vec![
            candidate("A", dec!(37), 0.5),
            candidate("B", dec!(113), 0.3),
            candidate("C", dec!(7), 0.2),
        ];

        for budget in [dec!(1), dec!(50), dec!(999.99), dec!(12345.67)] {
            let table = allocate(&candidates, budget).unwrap();
            assert!(table.spent <= budget, "overspent at budget {budget}");
            assert_eq!(table.spent + table.unspent, budget);
        }
    }

    #[test]
    fn test_budget_monotonicity() {
        let candidates = vec![
            candidate("A", dec!(37), 0.5),
            candidate("B", dec!(113), 0.3),
            candidate("C", dec!(7), 0.2),
        ];

        let mut previous = vec![0u64; 3];
        for budget in [dec!(100), dec!(500), dec!(1000), dec!(5000)] {
            let table = allocate(&candidates, budget).unwrap();
            let current: Vec<u64> = ["A", "B", "C"]
                .iter()
                .map(|t| shares_of(&table, t))
                .collect();
            for (prev, cur) in previous.iter().zip(&current) {
                assert!(cur >= prev, "share count decreased when budget grew");
            }
            previous = current;
        }
    }

    #[test]
    fn test_rows_sorted_by_shares_descending() {
        let candidates = vec![
            candidate("CHEAP", dec!(5), 0.3),
            candidate("DEAR", dec!(500), 0.7),
        ];

        let table = allocate(&candidates, dec!(1000)).unwrap();

        assert!(table.rows[0].shares >= table.rows[1].shares);
        assert_eq!(table.rows[0].ticker, "CHEAP");
    }

    #[test]
    fn test_zero_budget_allocates_nothing() {
        let candidates = vec![candidate("A", dec!(10), 1.0)];

        let table = allocate(&candidates, dec!(0)).unwrap();

        assert_eq!(table.total_shares(), 0);
        assert_eq!(table.spent, dec!(0));
    }

    #[test]
    fn test_non_positive_price_rejected() {
        let candidates = vec![candidate("A", dec!(0), 1.0)];
        let err = allocate(&candidates, dec!(1000)).unwrap_err();
        assert!(matches!(err, PortfolioError::InvalidInput(_)));
    }

    #[test]
    fn test_negative_weight_rejected() {
        let candidates = vec![
            candidate("A", dec!(10), 1.2),
            candidate("B", dec!(10), -0.2),
        ];
        let err = allocate(&candidates, dec!(1000)).unwrap_err();
        assert!(matches!(err, PortfolioError::InvalidInput(_)));
    }

    #[test]
    fn test_weights_above_one_rejected() {
        let candidates = vec![
            candidate("A", dec!(10), 0.8),
            candidate("B", dec!(10), 0.5),
        ];
        let err = allocate(&candidates, dec!(1000)).unwrap_err();
        assert!(matches!(err, PortfolioError::InvalidInput(_)));
    }

    #[test]
    fn test_empty_candidates_rejected() {
        let err = allocate(&[], dec!(1000)).unwrap_err();
        assert!(matches!(err, PortfolioError::InvalidInput(_)));
    }

    #[test]
    fn test_deterministic_across_runs() {
        let candidates = vec![
            candidate("A", dec!(37), 0.25),
            candidate("B", dec!(113), 0.25),
            candidate("C", dec!(7), 0.25),
            candidate("D", dec!(91), 0.25),
        ];

        let first = allocate(&candidates, dec!(2500)).unwrap();
        let second = allocate(&candidates, dec!(2500)).unwrap();

        assert_eq!(first.rows, second.rows);
    }
}
