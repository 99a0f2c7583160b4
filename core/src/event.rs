//! Event records at each stage before enrichment.
//!
//! RawEvent borrows straight from the input record; ValidEvent owns its
//! normalized fields and is what the deduplicator keeps.

use crate::types::{Bps, Cents, CustomerId, EventId, ProductId};

/// Column names of the events table, in the order RawEvent reads them.
pub const EVENT_COLUMNS: [&str; 14] = [
    "event_id",
    "event_version",
    "event_ts",
    "event_date",
    "customer_id",
    "product_id",
    "amount_cents",
    "quantity",
    "discount_bps",
    "shipping_cents",
    "status",
    "country",
    "customer_tier",
    "payment_method",
];

/// One untouched input row. Every field is the raw text, possibly dirty.
#[derive(Debug, Clone, Copy, Default)]
pub struct RawEvent<'r> {
    pub event_id: &'r str,
    pub event_version: &'r str,
    pub event_ts: &'r str,
    pub event_date: &'r str,
    pub customer_id: &'r str,
    pub product_id: &'r str,
    pub amount_cents: &'r str,
    pub quantity: &'r str,
    pub discount_bps: &'r str,
    pub shipping_cents: &'r str,
    pub status: &'r str,
    pub country: &'r str,
    pub customer_tier: &'r str,
    /// Carried through for completeness; no stage reads it.
    pub payment_method: &'r str,
}

impl<'r> RawEvent<'r> {
    /// Build from fields in EVENT_COLUMNS order.
    pub fn from_fields(f: [&'r str; 14]) -> Self {
        Self {
            event_id: f[0],
            event_version: f[1],
            event_ts: f[2],
            event_date: f[3],
            customer_id: f[4],
            product_id: f[5],
            amount_cents: f[6],
            quantity: f[7],
            discount_bps: f[8],
            shipping_cents: f[9],
            status: f[10],
            country: f[11],
            customer_tier: f[12],
            payment_method: f[13],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CustomerTier {
    Bronze,
    Silver,
    Gold,
    Platinum,
    Unknown,
}

impl CustomerTier {
    /// Case-insensitive; anything outside the four known tiers is Unknown.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "bronze" => CustomerTier::Bronze,
            "silver" => CustomerTier::Silver,
            "gold" => CustomerTier::Gold,
            "platinum" => CustomerTier::Platinum,
            _ => CustomerTier::Unknown,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CustomerTier::Bronze => "bronze",
            CustomerTier::Silver => "silver",
            CustomerTier::Gold => "gold",
            CustomerTier::Platinum => "platinum",
            CustomerTier::Unknown => "unknown",
        }
    }
}

/// A row that passed validation, with every field normalized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidEvent {
    pub event_id: EventId,
    pub event_version: i64,
    pub event_ts: String,
    pub event_date: String,
    pub customer_id: CustomerId,
    pub product_id: ProductId,
    pub amount_cents: Cents,
    pub quantity: i64,
    /// Clamped to [0, 5000].
    pub discount_bps: Bps,
    /// Clamped to [0, 25000].
    pub shipping_cents: Cents,
    /// Upper-cased.
    pub country: String,
    pub customer_tier: CustomerTier,
}

impl ValidEvent {
    /// True when `self` should replace `current` as the canonical version.
    ///
    /// Version compares numerically; ties fall to a plain string compare of
    /// event_ts. Malformed timestamps can misorder under that compare and
    /// that ordering is kept as-is.
    pub fn supersedes(&self, current: &ValidEvent) -> bool {
        self.event_version > current.event_version
            || (self.event_version == current.event_version && self.event_ts > current.event_ts)
    }
}

/// The single surviving version of an event_id after dedup.
pub type CanonicalEvent = ValidEvent;
