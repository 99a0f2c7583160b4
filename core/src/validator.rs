//! Event validator / filter.
//!
//! Turns a RawEvent into a normalized ValidEvent, or rejects it. Rejected
//! rows take no further part in the run, not even in dedup.
//!
//! Check order (first failure is the recorded reason):
//!   event_id, status, amount_cents, quantity,
//!   customer_id, product_id, event_date, event_ts

use crate::{
    event::{CustomerTier, RawEvent, ValidEvent},
    fixed_point::{clamp, parse_int},
};
use serde::Serialize;
use std::collections::BTreeMap;

pub const DISCOUNT_BPS_BOUNDS: (i64, i64) = (0, 5_000);
pub const SHIPPING_CENTS_BOUNDS: (i64, i64) = (0, 25_000);
pub const COMPLETE_STATUS: &str = "COMPLETE";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    MissingEventId,
    StatusNotComplete,
    NonPositiveAmount,
    NonPositiveQuantity,
    NonPositiveCustomer,
    NonPositiveProduct,
    MissingEventDate,
    MissingEventTs,
}

/// Diagnostic counters. Never feed back into the data.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterStats {
    pub rows_seen: u64,
    pub rows_kept: u64,
    pub rejected: BTreeMap<RejectReason, u64>,
}

#[derive(Debug, Default)]
pub struct EventFilter {
    stats: FilterStats,
}

impl EventFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate one row. Counts it either way.
    pub fn admit(&mut self, raw: &RawEvent<'_>) -> Option<ValidEvent> {
        self.stats.rows_seen += 1;
        match validate(raw) {
            Ok(event) => {
                self.stats.rows_kept += 1;
                Some(event)
            }
            Err(reason) => {
                *self.stats.rejected.entry(reason).or_insert(0) += 1;
                None
            }
        }
    }

    pub fn stats(&self) -> &FilterStats {
        &self.stats
    }

    pub fn into_stats(self) -> FilterStats {
        self.stats
    }
}

/// Pure validation of a single row.
pub fn validate(raw: &RawEvent<'_>) -> Result<ValidEvent, RejectReason> {
    let event_id = raw.event_id.trim();
    if event_id.is_empty() {
        return Err(RejectReason::MissingEventId);
    }

    let status = raw.status.trim().to_uppercase();
    let amount_cents = parse_int(raw.amount_cents);
    let quantity = parse_int(raw.quantity);
    let customer_id = parse_int(raw.customer_id);
    let product_id = parse_int(raw.product_id);
    let event_date = raw.event_date.trim();
    let event_ts = raw.event_ts.trim();

    if status != COMPLETE_STATUS {
        return Err(RejectReason::StatusNotComplete);
    }
    if amount_cents <= 0 {
        return Err(RejectReason::NonPositiveAmount);
    }
    if quantity <= 0 {
        return Err(RejectReason::NonPositiveQuantity);
    }
    if customer_id <= 0 {
        return Err(RejectReason::NonPositiveCustomer);
    }
    if product_id <= 0 {
        return Err(RejectReason::NonPositiveProduct);
    }
    if event_date.is_empty() {
        return Err(RejectReason::MissingEventDate);
    }
    if event_ts.is_empty() {
        return Err(RejectReason::MissingEventTs);
    }

    let (discount_low, discount_high) = DISCOUNT_BPS_BOUNDS;
    let (shipping_low, shipping_high) = SHIPPING_CENTS_BOUNDS;

    Ok(ValidEvent {
        event_id: event_id.to_string(),
        event_version: parse_int(raw.event_version),
        event_ts: event_ts.to_string(),
        event_date: event_date.to_string(),
        customer_id,
        product_id,
        amount_cents,
        quantity,
        discount_bps: clamp(parse_int(raw.discount_bps), discount_low, discount_high),
        shipping_cents: clamp(parse_int(raw.shipping_cents), shipping_low, shipping_high),
        country: raw.country.trim().to_uppercase(),
        customer_tier: CustomerTier::parse(raw.customer_tier),
    })
}
