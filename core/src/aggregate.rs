//! Aggregator: grouped sums keyed by the six-field bucket key.
//!
//! Buckets live in a BTreeMap whose key order is the output order:
//! component-wise string comparison over
//!   (event_date, customer_tier, category, country, time_bucket, size_bucket)
//!
//! Every accumulator update is an integer addition, so tables built from
//! disjoint partitions of the rows merge into the same result as one
//! sequential pass.

use crate::{
    enrich::{EnrichedRow, SizeBucket, TimeBucket},
    event::CustomerTier,
    types::Cents,
    vip::CustomerDaySpend,
};
use std::{cmp::Ordering, collections::BTreeMap};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BucketKey {
    pub event_date: String,
    pub customer_tier: CustomerTier,
    pub category: String,
    pub country: String,
    pub time_bucket: TimeBucket,
    pub size_bucket: SizeBucket,
}

impl BucketKey {
    pub fn of(row: &EnrichedRow) -> Self {
        Self {
            event_date: row.event_date.clone(),
            customer_tier: row.customer_tier,
            category: row.category.clone(),
            country: row.country.clone(),
            time_bucket: row.time_bucket,
            size_bucket: row.size_bucket,
        }
    }

    /// The key as the six strings that get written out.
    pub fn fields(&self) -> [&str; 6] {
        [
            self.event_date.as_str(),
            self.customer_tier.as_str(),
            self.category.as_str(),
            self.country.as_str(),
            self.time_bucket.as_str(),
            self.size_bucket.as_str(),
        ]
    }
}

// Ordering is by rendered text, not enum declaration order.
impl Ord for BucketKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.fields().cmp(&other.fields())
    }
}

impl PartialOrd for BucketKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// The eight accumulators of one bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BucketTotals {
    pub order_count: i64,
    pub vip_customer_orders: i64,
    pub total_quantity: i64,
    pub total_net_usd_cents: Cents,
    pub total_profit_usd_cents: Cents,
    pub total_risk_adjusted_usd_cents: Cents,
    /// Same sum as total_quantity; kept separately as the item count the
    /// average price divides by.
    pub total_items: i64,
    pub heavy_item_orders: i64,
}

impl BucketTotals {
    pub fn add_row(&mut self, row: &EnrichedRow, vip: bool) {
        self.order_count += 1;
        self.vip_customer_orders += i64::from(vip);
        self.total_quantity = self.total_quantity.saturating_add(row.quantity);
        self.total_net_usd_cents = self.total_net_usd_cents.saturating_add(row.net_usd_cents);
        self.total_profit_usd_cents = self
            .total_profit_usd_cents
            .saturating_add(row.profit_usd_cents);
        self.total_risk_adjusted_usd_cents = self
            .total_risk_adjusted_usd_cents
            .saturating_add(row.risk_adjusted_usd_cents);
        self.total_items = self.total_items.saturating_add(row.quantity);
        self.heavy_item_orders += i64::from(row.heavy_item_order);
    }

    pub fn merge(&mut self, other: &BucketTotals) {
        self.order_count += other.order_count;
        self.vip_customer_orders += other.vip_customer_orders;
        self.total_quantity = self.total_quantity.saturating_add(other.total_quantity);
        self.total_net_usd_cents = self
            .total_net_usd_cents
            .saturating_add(other.total_net_usd_cents);
        self.total_profit_usd_cents = self
            .total_profit_usd_cents
            .saturating_add(other.total_profit_usd_cents);
        self.total_risk_adjusted_usd_cents = self
            .total_risk_adjusted_usd_cents
            .saturating_add(other.total_risk_adjusted_usd_cents);
        self.total_items = self.total_items.saturating_add(other.total_items);
        self.heavy_item_orders += other.heavy_item_orders;
    }
}

/// Finished buckets in output order. Read-only after aggregation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AggregateTable {
    buckets: BTreeMap<BucketKey, BucketTotals>,
}

impl AggregateTable {
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    pub fn get(&self, key: &BucketKey) -> Option<&BucketTotals> {
        self.buckets.get(key)
    }

    /// Buckets in ascending key order.
    pub fn iter(&self) -> impl Iterator<Item = (&BucketKey, &BucketTotals)> {
        self.buckets.iter()
    }

    /// Fold in a table built from a disjoint set of rows.
    pub fn merge(&mut self, other: AggregateTable) {
        for (key, totals) in other.buckets {
            self.buckets.entry(key).or_default().merge(&totals);
        }
    }
}

/// Owns and mutates the buckets for one aggregation pass.
#[derive(Debug, Default)]
pub struct Aggregator {
    table: AggregateTable,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, row: &EnrichedRow, spend: &CustomerDaySpend) {
        let vip = spend.is_vip_row(row);
        self.table
            .buckets
            .entry(BucketKey::of(row))
            .or_default()
            .add_row(row, vip);
    }

    pub fn finish(self) -> AggregateTable {
        self.table
    }

    /// One full pass. `spend` must already cover every row.
    pub fn aggregate(rows: &[EnrichedRow], spend: &CustomerDaySpend) -> AggregateTable {
        let mut aggregator = Aggregator::new();
        for row in rows {
            aggregator.add(row, spend);
        }
        aggregator.finish()
    }
}
