//! Allocation output values: per-security share counts and the full plan.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// One line of the purchase plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationRow {
    pub ticker: String,
    pub sector: String,
    pub industry: String,
    pub website: String,

    /// Share price the allocation was computed at
    pub price: Decimal,

    /// Whole shares to purchase
    pub shares: u64,
}

impl AllocationRow {
    /// Cash committed to this row.
    pub fn cost(&self) -> Decimal {
        self.price * Decimal::from(self.shares)
    }
}

/// The allocation result: rows sorted by share count descending, plus the
/// run's spend aggregates. Invariant: `spent + unspent == budget` and
/// `spent <= budget`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllocationTable {
    pub rows: Vec<AllocationRow>,
    pub budget: Decimal,
    pub spent: Decimal,
    pub unspent: Decimal,
}

impl AllocationTable {
    /// Total shares purchased across all rows.
    pub fn total_shares(&self) -> u64 {
        self.rows.iter().map(|r| r.shares).sum()
    }
}

/// Full output of one pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioPlan {
    pub table: AllocationTable,

    /// Normalized sector weights the plan was built from
    pub sector_weights: BTreeMap<String, f64>,

    /// Sectors that contributed no eligible stock
    pub skipped_sectors: Vec<String>,

    /// Number of securities that entered the allocator
    pub candidate_count: usize,

    pub generated_at: DateTime<Utc>,
}

impl fmt::Display for PortfolioPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{:<8} {:<24} {:<28} {:>10} {:>7} {:>12}",
            "TICKER", "SECTOR", "INDUSTRY", "PRICE", "SHARES", "COST"
        )?;
        writeln!(f, "{}", "-".repeat(94))?;

        for row in &self.table.rows {
            writeln!(
                f,
                "{:<8} {:<24} {:<28} {:>10.2} {:>7} {:>12.2}",
                row.ticker,
                truncate(&row.sector, 22),
                truncate(&row.industry, 26),
                row.price,
                row.shares,
                row.cost(),
            )?;
        }

        writeln!(f, "{}", "-".repeat(94))?;
        writeln!(f, "Candidates:  {}", self.candidate_count)?;
        writeln!(f, "Budget:      ${:.2}", self.table.budget)?;
        writeln!(f, "Spent:       ${:.2}", self.table.spent)?;
        writeln!(f, "Unspent:     ${:.2}", self.table.unspent)?;

        if !self.skipped_sectors.is_empty() {
            writeln!(
                f,
                "Skipped sectors (no eligible stock): {}",
                self.skipped_sectors.join(", ")
            )?;
        }

        Ok(())
    }
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        s.to_string()
    } else {
        format!("{}...", &s[..max_len - 3])
    }
}
