//! Shared primitive types used across every pipeline stage.

/// Money in minor currency units. Never a float.
pub type Cents = i64;

/// Basis points: 10_000 bps = 100%.
pub type Bps = i64;

/// Parts per million, used for FX factors.
pub type Ppm = i64;

pub type EventId = String;
pub type CustomerId = i64;
pub type ProductId = i64;
