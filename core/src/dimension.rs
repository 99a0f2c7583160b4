//! Dimension loader: product and country reference tables.
//!
//! Rows with no usable key are dropped, never defaulted. Numeric fields are
//! parsed with the defaulting parser and clamped before storage. A repeated
//! key overwrites the earlier row.

use crate::{
    error::{TransformError, TransformResult},
    fixed_point::{clamp, parse_int},
    table::{self, Columns},
    types::{Bps, ProductId, Ppm},
};
use std::{collections::HashMap, io::Read, path::Path};

pub const MARGIN_BPS_BOUNDS: (i64, i64) = (0, 9_500);
pub const WEIGHT_GRAMS_BOUNDS: (i64, i64) = (1, 20_000);
pub const FX_PPM_BOUNDS: (i64, i64) = (1, 2_500_000);
pub const RISK_BPS_BOUNDS: (i64, i64) = (1, 20_000);
pub const TAX_BPS_BOUNDS: (i64, i64) = (0, 5_000);

const PRODUCT_COLUMNS: [&str; 4] = ["product_id", "category", "margin_bps", "weight_grams"];
const COUNTRY_COLUMNS: [&str; 4] = ["country", "fx_to_usd_ppm", "risk_bps", "tax_bps"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductDim {
    pub category: String,
    pub margin_bps: Bps,
    pub weight_grams: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountryDim {
    pub fx_to_usd_ppm: Ppm,
    pub risk_bps: Bps,
    pub tax_bps: Bps,
}

/// Both lookup maps for one run. Immutable once loaded.
#[derive(Debug, Default, Clone)]
pub struct DimensionTables {
    products: HashMap<ProductId, ProductDim>,
    countries: HashMap<String, CountryDim>,
}

impl DimensionTables {
    pub fn new(
        products: HashMap<ProductId, ProductDim>,
        countries: HashMap<String, CountryDim>,
    ) -> Self {
        Self { products, countries }
    }

    pub fn load(products_path: &Path, countries_path: &Path) -> TransformResult<Self> {
        let mut products_in = table::open(products_path)?;
        let products = read_products(&mut products_in)
            .map_err(|e| TransformError::csv(products_path, e))?;

        let mut countries_in = table::open(countries_path)?;
        let countries = read_countries(&mut countries_in)
            .map_err(|e| TransformError::csv(countries_path, e))?;

        Ok(Self::new(products, countries))
    }

    pub fn from_readers<P: Read, C: Read>(products: P, countries: C) -> csv::Result<Self> {
        let products = read_products(&mut table::reader(products))?;
        let countries = read_countries(&mut table::reader(countries))?;
        Ok(Self::new(products, countries))
    }

    pub fn product(&self, product_id: ProductId) -> Option<&ProductDim> {
        self.products.get(&product_id)
    }

    /// `country` must already be upper-cased.
    pub fn country(&self, country: &str) -> Option<&CountryDim> {
        self.countries.get(country)
    }

    pub fn product_count(&self) -> usize {
        self.products.len()
    }

    pub fn country_count(&self) -> usize {
        self.countries.len()
    }
}

/// Lower-cased, trimmed category; empty becomes "unknown".
pub fn normalize_category(raw: &str) -> String {
    let category = raw.trim().to_lowercase();
    if category.is_empty() {
        "unknown".into()
    } else {
        category
    }
}

fn read_products<R: Read>(input: &mut csv::Reader<R>) -> csv::Result<HashMap<ProductId, ProductDim>> {
    let columns = Columns::resolve(input.headers()?, PRODUCT_COLUMNS);
    warn_missing("product", &columns.missing(&PRODUCT_COLUMNS));

    let mut products = HashMap::new();
    let mut skipped = 0u64;
    table::for_each_record(input, |record| {
        let product_id = parse_int(columns.field(record, 0));
        if product_id <= 0 {
            skipped += 1;
            return;
        }
        let (margin_low, margin_high) = MARGIN_BPS_BOUNDS;
        let (weight_low, weight_high) = WEIGHT_GRAMS_BOUNDS;
        products.insert(
            product_id,
            ProductDim {
                category: normalize_category(columns.field(record, 1)),
                margin_bps: clamp(parse_int(columns.field(record, 2)), margin_low, margin_high),
                weight_grams: clamp(parse_int(columns.field(record, 3)), weight_low, weight_high),
            },
        );
    })?;

    log::debug!("product dimension: {} keys, {skipped} rows skipped", products.len());
    Ok(products)
}

fn read_countries<R: Read>(input: &mut csv::Reader<R>) -> csv::Result<HashMap<String, CountryDim>> {
    let columns = Columns::resolve(input.headers()?, COUNTRY_COLUMNS);
    warn_missing("country", &columns.missing(&COUNTRY_COLUMNS));

    let mut countries = HashMap::new();
    let mut skipped = 0u64;
    table::for_each_record(input, |record| {
        let country = columns.field(record, 0).trim().to_uppercase();
        if country.is_empty() {
            skipped += 1;
            return;
        }
        let (fx_low, fx_high) = FX_PPM_BOUNDS;
        let (risk_low, risk_high) = RISK_BPS_BOUNDS;
        let (tax_low, tax_high) = TAX_BPS_BOUNDS;
        countries.insert(
            country,
            CountryDim {
                fx_to_usd_ppm: clamp(parse_int(columns.field(record, 1)), fx_low, fx_high),
                risk_bps: clamp(parse_int(columns.field(record, 2)), risk_low, risk_high),
                tax_bps: clamp(parse_int(columns.field(record, 3)), tax_low, tax_high),
            },
        );
    })?;

    log::debug!("country dimension: {} keys, {skipped} rows skipped", countries.len());
    Ok(countries)
}

fn warn_missing(table: &str, missing: &[&str]) {
    if !missing.is_empty() {
        log::warn!("{table} dimension: missing columns {missing:?}, values default to empty");
    }
}
