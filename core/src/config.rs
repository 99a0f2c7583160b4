use crate::{
    dimension::{
        FX_PPM_BOUNDS, MARGIN_BPS_BOUNDS, RISK_BPS_BOUNDS, TAX_BPS_BOUNDS, WEIGHT_GRAMS_BOUNDS,
    },
    error::{TransformError, TransformResult},
    types::{Bps, Cents, Ppm},
};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Product attributes used when a product_id has no dimension row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProductFallback {
    pub category: String,
    pub margin_bps: Bps,
    pub weight_grams: i64,
}

impl Default for ProductFallback {
    fn default() -> Self {
        Self {
            category: "unknown".into(),
            margin_bps: 2_500,
            weight_grams: 500,
        }
    }
}

/// Country factors used when a country has no dimension row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CountryFallback {
    pub fx_to_usd_ppm: Ppm,
    pub risk_bps: Bps,
    pub tax_bps: Bps,
}

impl Default for CountryFallback {
    fn default() -> Self {
        Self {
            fx_to_usd_ppm: 1_000_000,
            risk_bps: 10_000,
            tax_bps: 0,
        }
    }
}

/// Tunables for one transform run.
///
/// `Default` reproduces the constants shared by every implementation of the
/// transform. Changing any of them breaks byte parity with other runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    /// Net USD cents per (day, customer) at or above which orders are VIP.
    pub vip_threshold_usd_cents: Cents,
    /// weight_grams * quantity at or above which an order is heavy.
    pub heavy_item_threshold_grams: i64,
    pub product_fallback: ProductFallback,
    pub country_fallback: CountryFallback,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            vip_threshold_usd_cents: 50_000,
            heavy_item_threshold_grams: 5_000,
            product_fallback: ProductFallback::default(),
            country_fallback: CountryFallback::default(),
        }
    }
}

impl PipelineConfig {
    /// Load a JSON config file. Missing keys keep their defaults; unknown
    /// keys are an error.
    pub fn load(path: &Path) -> TransformResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| TransformError::io(path, e))?;
        let config: PipelineConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject fallbacks a real dimension row could never produce.
    pub fn validate(&self) -> TransformResult<()> {
        let checks: [(&str, i64, (i64, i64)); 5] = [
            ("product_fallback.margin_bps", self.product_fallback.margin_bps, MARGIN_BPS_BOUNDS),
            ("product_fallback.weight_grams", self.product_fallback.weight_grams, WEIGHT_GRAMS_BOUNDS),
            ("country_fallback.fx_to_usd_ppm", self.country_fallback.fx_to_usd_ppm, FX_PPM_BOUNDS),
            ("country_fallback.risk_bps", self.country_fallback.risk_bps, RISK_BPS_BOUNDS),
            ("country_fallback.tax_bps", self.country_fallback.tax_bps, TAX_BPS_BOUNDS),
        ];
        for (field, value, (low, high)) in checks {
            if value < low || value > high {
                return Err(TransformError::InvalidConfig {
                    reason: format!("{field}={value} outside [{low}, {high}]"),
                });
            }
        }
        if self.vip_threshold_usd_cents < 0 {
            return Err(TransformError::InvalidConfig {
                reason: format!(
                    "vip_threshold_usd_cents={} must be non-negative",
                    self.vip_threshold_usd_cents
                ),
            });
        }
        if self.heavy_item_threshold_grams < 0 {
            return Err(TransformError::InvalidConfig {
                reason: format!(
                    "heavy_item_threshold_grams={} must be non-negative",
                    self.heavy_item_threshold_grams
                ),
            });
        }
        if self.product_fallback.category.trim().is_empty() {
            return Err(TransformError::InvalidConfig {
                reason: "product_fallback.category must not be empty".into(),
            });
        }
        Ok(())
    }
}
