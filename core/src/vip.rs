//! VIP classifier: per-customer-per-day net spend.
//!
//! Built in a full pass over every enriched row. The flag for an order
//! depends on the whole day's spend, including orders enriched after it,
//! so aggregation must not start until this pass is complete.

use crate::{
    enrich::EnrichedRow,
    types::{Cents, CustomerId},
};
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct CustomerDaySpend {
    // event_date -> customer_id -> net USD cents
    totals: HashMap<String, HashMap<CustomerId, Cents>>,
    threshold_usd_cents: Cents,
}

impl CustomerDaySpend {
    pub fn from_rows(rows: &[EnrichedRow], threshold_usd_cents: Cents) -> Self {
        let mut totals: HashMap<String, HashMap<CustomerId, Cents>> = HashMap::new();
        for row in rows {
            let total = totals
                .entry(row.event_date.clone())
                .or_default()
                .entry(row.customer_id)
                .or_insert(0);
            *total = total.saturating_add(row.net_usd_cents);
        }
        Self { totals, threshold_usd_cents }
    }

    pub fn total(&self, event_date: &str, customer_id: CustomerId) -> Cents {
        self.totals
            .get(event_date)
            .and_then(|day| day.get(&customer_id))
            .copied()
            .unwrap_or(0)
    }

    pub fn is_vip(&self, event_date: &str, customer_id: CustomerId) -> bool {
        self.total(event_date, customer_id) >= self.threshold_usd_cents
    }

    pub fn is_vip_row(&self, row: &EnrichedRow) -> bool {
        self.is_vip(&row.event_date, row.customer_id)
    }

    pub fn customer_days(&self) -> usize {
        self.totals.values().map(HashMap::len).sum()
    }

    pub fn vip_customer_days(&self) -> usize {
        self.totals
            .values()
            .flat_map(HashMap::values)
            .filter(|total| **total >= self.threshold_usd_cents)
            .count()
    }
}
