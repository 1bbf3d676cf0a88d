//! Per-product accumulation of cart lines.

use std::collections::HashMap;

use common::DocumentId;
use domain::{CartItem, Money};

use crate::{ReportError, Result};

/// Running totals for one product.
#[derive(Debug, Clone)]
pub(crate) struct Tally {
    pub item_id: DocumentId,
    /// First line seen for the product; supplies the snapshot fields.
    pub first_line: CartItem,
    pub qty: u64,
    pub revenue: Money,
    /// Number of order lines merged (one per order, since orders merge
    /// lines per product).
    pub lines: u64,
}

/// Accumulates cart lines by product, remembering first-seen order so that
/// ties keep a stable ranking.
#[derive(Debug, Default)]
pub(crate) struct SalesTally {
    tallies: Vec<Tally>,
    index: HashMap<DocumentId, usize>,
}

impl SalesTally {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, line: &CartItem) -> Result<()> {
        let position = *self.index.entry(line.item_id).or_insert_with(|| {
            self.tallies.push(Tally {
                item_id: line.item_id,
                first_line: line.clone(),
                qty: 0,
                revenue: Money::zero(),
                lines: 0,
            });
            self.tallies.len() - 1
        });

        let tally = &mut self.tallies[position];
        tally.revenue = tally
            .revenue
            .checked_add(line.total)
            .ok_or(ReportError::RevenueOverflow {
                item_id: line.item_id,
            })?;
        tally.qty += u64::from(line.qty);
        tally.lines += 1;
        Ok(())
    }

    /// Returns the `limit` products with the highest quantity.
    pub fn top(mut self, limit: usize) -> Vec<Tally> {
        self.tallies.sort_by(|a, b| b.qty.cmp(&a.qty));
        self.tallies.truncate(limit);
        self.tallies
    }
}
