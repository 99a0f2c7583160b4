//! Output writer: aggregate table to delimited text.
//!
//! Rows come out in bucket-key order with `\n` terminators. Fields are
//! quoted only when they contain the delimiter, a quote or a line break.
//! The average item price is derived here and never stored.

use crate::{
    aggregate::{AggregateTable, BucketKey, BucketTotals},
    error::{TransformError, TransformResult},
    fixed_point::round_div,
};
use std::{
    ffi::OsString,
    fs::{self, File},
    io::{self, Write},
    path::{Path, PathBuf},
};

pub const OUTPUT_HEADER: [&str; 14] = [
    "event_date",
    "customer_tier",
    "category",
    "country",
    "time_bucket",
    "order_size_bucket",
    "order_count",
    "vip_customer_orders",
    "total_quantity",
    "total_net_usd_cents",
    "total_profit_usd_cents",
    "total_risk_adjusted_usd_cents",
    "avg_item_price_usd_cents",
    "heavy_item_orders",
];

pub fn avg_item_price_usd_cents(totals: &BucketTotals) -> i64 {
    round_div(totals.total_net_usd_cents, totals.total_items)
}

fn metric_fields(totals: &BucketTotals) -> [String; 8] {
    [
        totals.order_count,
        totals.vip_customer_orders,
        totals.total_quantity,
        totals.total_net_usd_cents,
        totals.total_profit_usd_cents,
        totals.total_risk_adjusted_usd_cents,
        avg_item_price_usd_cents(totals),
        totals.heavy_item_orders,
    ]
    .map(|value| value.to_string())
}

fn write_row<W: Write>(
    writer: &mut csv::Writer<W>,
    key: &BucketKey,
    totals: &BucketTotals,
) -> csv::Result<()> {
    let metrics = metric_fields(totals);
    writer.write_record(
        key.fields()
            .into_iter()
            .chain(metrics.iter().map(String::as_str)),
    )
}

/// Write the header and every bucket to `out`.
pub fn write_aggregates<W: Write>(table: &AggregateTable, out: W) -> csv::Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .quote_style(csv::QuoteStyle::Necessary)
        .from_writer(out);

    writer.write_record(OUTPUT_HEADER)?;
    for (key, totals) in table.iter() {
        write_row(&mut writer, key, totals)?;
    }
    writer.flush()?;
    Ok(())
}

/// Write to `path` via a sibling `.partial` file that is renamed into
/// place only once fully flushed. Missing parent directories are created.
pub fn write_aggregates_file(table: &AggregateTable, path: &Path) -> TransformResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| TransformError::io(parent, e))?;
    }

    let partial = partial_path(path)?;
    let file = File::create(&partial).map_err(|e| TransformError::io(&partial, e))?;
    if let Err(e) = write_aggregates(table, file) {
        // The write error wins over any cleanup failure.
        let _ = fs::remove_file(&partial);
        return Err(TransformError::csv(&partial, e));
    }
    if let Err(e) = fs::rename(&partial, path) {
        let _ = fs::remove_file(&partial);
        return Err(TransformError::io(path, e));
    }
    Ok(())
}

fn partial_path(path: &Path) -> TransformResult<PathBuf> {
    let name = path.file_name().ok_or_else(|| {
        TransformError::io(
            path,
            io::Error::new(io::ErrorKind::InvalidInput, "output path has no file name"),
        )
    })?;
    let mut partial: OsString = name.to_os_string();
    partial.push(".partial");
    Ok(path.with_file_name(partial))
}
