//! Enricher: dimension join plus fixed-point money and classification.
//!
//! Money path (all integer cents, every division is round_div):
//!   gross      = amount * quantity + shipping
//!   discount   = gross * discount_bps / 10_000
//!   taxable    = max(gross - discount, 0)
//!   tax        = taxable * tax_bps / 10_000
//!   net_local  = taxable + tax
//!   net_usd    = net_local * fx_to_usd_ppm / 1_000_000
//!   cost_usd   = net_usd * (10_000 - margin_bps) / 10_000
//!   profit_usd = net_usd - cost_usd
//!   risk_usd   = net_usd * risk_bps / 10_000

use crate::{
    config::PipelineConfig,
    dimension::{CountryDim, DimensionTables, ProductDim},
    event::{CanonicalEvent, CustomerTier},
    fixed_point::{apply_bps, parse_int, round_div},
    types::{Cents, CustomerId},
};

const PPM_SCALE: i64 = 1_000_000;
const BPS_SCALE: i64 = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeBucket {
    Night,
    Morning,
    Afternoon,
    Evening,
    Unknown,
}

impl TimeBucket {
    pub fn from_hour(hour: Option<u32>) -> Self {
        match hour {
            Some(0..=5) => TimeBucket::Night,
            Some(6..=11) => TimeBucket::Morning,
            Some(12..=17) => TimeBucket::Afternoon,
            Some(18..=23) => TimeBucket::Evening,
            _ => TimeBucket::Unknown,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TimeBucket::Night => "night",
            TimeBucket::Morning => "morning",
            TimeBucket::Afternoon => "afternoon",
            TimeBucket::Evening => "evening",
            TimeBucket::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SizeBucket {
    Single,
    SmallMulti,
    Bulk,
}

impl SizeBucket {
    pub fn from_quantity(quantity: i64) -> Self {
        if quantity <= 1 {
            SizeBucket::Single
        } else if quantity <= 3 {
            SizeBucket::SmallMulti
        } else {
            SizeBucket::Bulk
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SizeBucket::Single => "single",
            SizeBucket::SmallMulti => "small_multi",
            SizeBucket::Bulk => "bulk",
        }
    }
}

/// Hour of an `YYYY-MM-DDTHH...` timestamp.
///
/// Positions are characters, not bytes. Needs at least 13 characters and a
/// 'T' at position 10; the two hour characters go through the defaulting
/// parser and must land in [0, 23].
pub fn parse_event_hour(event_ts: &str) -> Option<u32> {
    let mut chars = event_ts.chars();
    if chars.clone().count() < 13 || chars.nth(10) != Some('T') {
        return None;
    }
    let hour_text: String = chars.take(2).collect();
    u32::try_from(parse_int(&hour_text))
        .ok()
        .filter(|hour| *hour <= 23)
}

/// Intermediate money amounts for one order, all in cents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OrderAmounts {
    pub gross_local: Cents,
    pub discount_local: Cents,
    pub taxable_local: Cents,
    pub tax_local: Cents,
    pub net_local: Cents,
    pub net_usd: Cents,
    pub cost_usd: Cents,
    pub profit_usd: Cents,
    pub risk_adjusted_usd: Cents,
}

impl OrderAmounts {
    pub fn compute(event: &CanonicalEvent, product: &ProductDim, country: &CountryDim) -> Self {
        let gross_local = event
            .amount_cents
            .saturating_mul(event.quantity)
            .saturating_add(event.shipping_cents);
        let discount_local = apply_bps(gross_local, event.discount_bps);
        let taxable_local = gross_local.saturating_sub(discount_local).max(0);
        let tax_local = apply_bps(taxable_local, country.tax_bps);
        let net_local = taxable_local.saturating_add(tax_local);

        let net_usd = round_div(net_local.saturating_mul(country.fx_to_usd_ppm), PPM_SCALE);
        let cost_usd = apply_bps(net_usd, BPS_SCALE - product.margin_bps);
        let profit_usd = net_usd - cost_usd;
        let risk_adjusted_usd = apply_bps(net_usd, country.risk_bps);

        Self {
            gross_local,
            discount_local,
            taxable_local,
            tax_local,
            net_local,
            net_usd,
            cost_usd,
            profit_usd,
            risk_adjusted_usd,
        }
    }
}

/// One canonical event after the dimension join.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrichedRow {
    pub event_date: String,
    pub customer_id: CustomerId,
    pub customer_tier: CustomerTier,
    pub category: String,
    pub country: String,
    pub time_bucket: TimeBucket,
    pub size_bucket: SizeBucket,
    pub quantity: i64,
    pub net_usd_cents: Cents,
    pub profit_usd_cents: Cents,
    pub risk_adjusted_usd_cents: Cents,
    pub heavy_item_order: bool,
}

pub struct Enricher<'d> {
    dims: &'d DimensionTables,
    product_fallback: ProductDim,
    country_fallback: CountryDim,
    heavy_item_threshold_grams: i64,
}

impl<'d> Enricher<'d> {
    pub fn new(dims: &'d DimensionTables, config: &PipelineConfig) -> Self {
        let product = &config.product_fallback;
        let country = &config.country_fallback;
        Self {
            dims,
            product_fallback: ProductDim {
                category: product.category.clone(),
                margin_bps: product.margin_bps,
                weight_grams: product.weight_grams,
            },
            country_fallback: CountryDim {
                fx_to_usd_ppm: country.fx_to_usd_ppm,
                risk_bps: country.risk_bps,
                tax_bps: country.tax_bps,
            },
            heavy_item_threshold_grams: config.heavy_item_threshold_grams,
        }
    }

    pub fn enrich(&self, event: &CanonicalEvent) -> EnrichedRow {
        let product = self
            .dims
            .product(event.product_id)
            .unwrap_or(&self.product_fallback);
        let country = self
            .dims
            .country(&event.country)
            .unwrap_or(&self.country_fallback);

        let amounts = OrderAmounts::compute(event, product, country);
        let shipped_grams = product.weight_grams.saturating_mul(event.quantity);

        EnrichedRow {
            event_date: event.event_date.clone(),
            customer_id: event.customer_id,
            customer_tier: event.customer_tier,
            category: product.category.clone(),
            country: event.country.clone(),
            time_bucket: TimeBucket::from_hour(parse_event_hour(&event.event_ts)),
            size_bucket: SizeBucket::from_quantity(event.quantity),
            quantity: event.quantity,
            net_usd_cents: amounts.net_usd,
            profit_usd_cents: amounts.profit_usd,
            risk_adjusted_usd_cents: amounts.risk_adjusted_usd,
            heavy_item_order: shipped_grams >= self.heavy_item_threshold_grams,
        }
    }

    /// Materialize every enriched row. Later stages need the full set
    /// before any bucket is finalized.
    pub fn enrich_all(&self, events: &[CanonicalEvent]) -> Vec<EnrichedRow> {
        events.iter().map(|event| self.enrich(event)).collect()
    }
}
