//! The transform engine: runs every stage for one batch.
//!
//! EXECUTION ORDER (fixed, never reordered):
//!   1. Dimension loader   (products, countries)
//!   2. Validator + dedup  (single pass over the events table)
//!   3. Enricher           (materializes every enriched row)
//!   -- barrier: all rows enriched --
//!   4. VIP classifier     (full pass: per-customer-per-day spend)
//!   5. Aggregator         (second full pass, reads the VIP totals)
//!   6. Output writer      (sorted buckets)
//!
//! RULES:
//!   - Each stage owns its output until it hands it to the next stage.
//!   - No state survives between runs.
//!   - Bad field values and unknown keys never fail a run; only I/O does.

use crate::{
    aggregate::{AggregateTable, Aggregator},
    config::PipelineConfig,
    dedup::Deduplicator,
    dimension::DimensionTables,
    enrich::Enricher,
    error::{TransformError, TransformResult},
    event::{CanonicalEvent, RawEvent, EVENT_COLUMNS},
    output,
    table::{self, Columns},
    validator::{EventFilter, FilterStats},
    vip::CustomerDaySpend,
};
use serde::Serialize;
use std::{
    fs,
    io::{Read, Write},
    path::{Path, PathBuf},
};

/// Counts reported at the end of a run. Observational only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub raw_rows: u64,
    pub filtered_rows: u64,
    pub dedup_rows: u64,
    pub aggregate_rows: u64,
    pub filter: FilterStats,
}

impl RunSummary {
    /// Pretty JSON with a trailing newline.
    pub fn write_json(&self, path: &Path) -> TransformResult<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json + "\n").map_err(|e| TransformError::io(path, e))
    }
}

/// Paths for one file-based run.
#[derive(Debug, Clone)]
pub struct TransformPaths {
    pub events: PathBuf,
    pub products: PathBuf,
    pub countries: PathBuf,
    pub output: PathBuf,
}

/// Result of stages 1 through 5, before anything is written.
#[derive(Debug)]
pub struct TransformOutcome {
    pub table: AggregateTable,
    pub summary: RunSummary,
}

pub struct TransformEngine {
    config: PipelineConfig,
}

impl TransformEngine {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Full file-to-file run.
    pub fn run_files(&self, paths: &TransformPaths) -> TransformResult<RunSummary> {
        self.config.validate()?;
        let dims = DimensionTables::load(&paths.products, &paths.countries)?;
        log::info!(
            "dimensions loaded: {} products, {} countries",
            dims.product_count(),
            dims.country_count()
        );

        let mut events = table::open(&paths.events)?;
        let (canonical, filter) = read_canonical_events(&mut events)
            .map_err(|e| TransformError::csv(&paths.events, e))?;

        let outcome = self.aggregate_canonical(&dims, canonical, filter);
        output::write_aggregates_file(&outcome.table, &paths.output)?;
        log::info!(
            "wrote {} aggregate rows to {}",
            outcome.summary.aggregate_rows,
            paths.output.display()
        );
        Ok(outcome.summary)
    }

    /// Same pipeline over in-memory readers and writer.
    pub fn run<E, P, C, W>(
        &self,
        events: E,
        products: P,
        countries: C,
        out: W,
    ) -> TransformResult<RunSummary>
    where
        E: Read,
        P: Read,
        C: Read,
        W: Write,
    {
        let outcome = self.transform(events, products, countries)?;
        output::write_aggregates(&outcome.table, out)
            .map_err(|e| TransformError::csv("<output>", e))?;
        Ok(outcome.summary)
    }

    /// Stages 1 through 5 over readers; nothing is written.
    pub fn transform<E, P, C>(
        &self,
        events: E,
        products: P,
        countries: C,
    ) -> TransformResult<TransformOutcome>
    where
        E: Read,
        P: Read,
        C: Read,
    {
        self.config.validate()?;
        let dims = DimensionTables::from_readers(products, countries)
            .map_err(|e| TransformError::csv("<dimensions>", e))?;
        let (canonical, filter) = read_canonical_events(&mut table::reader(events))
            .map_err(|e| TransformError::csv("<events>", e))?;
        Ok(self.aggregate_canonical(&dims, canonical, filter))
    }

    /// Stages 3 through 5 for already-deduplicated events.
    pub fn aggregate_canonical(
        &self,
        dims: &DimensionTables,
        canonical: Vec<CanonicalEvent>,
        filter: FilterStats,
    ) -> TransformOutcome {
        let dedup_rows = canonical.len() as u64;

        let enriched = Enricher::new(dims, &self.config).enrich_all(&canonical);
        drop(canonical);

        let spend = CustomerDaySpend::from_rows(&enriched, self.config.vip_threshold_usd_cents);
        log::debug!(
            "vip: {} of {} customer-days at or above {} cents",
            spend.vip_customer_days(),
            spend.customer_days(),
            self.config.vip_threshold_usd_cents
        );

        let table = Aggregator::aggregate(&enriched, &spend);

        let summary = RunSummary {
            raw_rows: filter.rows_seen,
            filtered_rows: filter.rows_kept,
            dedup_rows,
            aggregate_rows: table.len() as u64,
            filter,
        };
        log::info!(
            "transform: raw={} filtered={} dedup={} buckets={}",
            summary.raw_rows,
            summary.filtered_rows,
            summary.dedup_rows,
            summary.aggregate_rows
        );
        TransformOutcome { table, summary }
    }
}

impl Default for TransformEngine {
    fn default() -> Self {
        Self::new(PipelineConfig::default())
    }
}

/// Stage 2: validate every row and keep one canonical version per event_id.
pub fn read_canonical_events<R: Read>(
    input: &mut csv::Reader<R>,
) -> csv::Result<(Vec<CanonicalEvent>, FilterStats)> {
    let columns = Columns::resolve(input.headers()?, EVENT_COLUMNS);
    let missing = columns.missing(&EVENT_COLUMNS);
    if !missing.is_empty() {
        log::warn!("events: missing columns {missing:?}, values default to empty");
    }

    let mut filter = EventFilter::new();
    let mut dedup = Deduplicator::new();
    table::for_each_record(input, |record| {
        let fields: [&str; 14] = std::array::from_fn(|i| columns.field(record, i));
        if let Some(event) = filter.admit(&RawEvent::from_fields(fields)) {
            dedup.offer(event);
        }
    })?;

    let stats = filter.into_stats();
    for (reason, count) in &stats.rejected {
        log::debug!("events: rejected {count} rows ({reason:?})");
    }
    Ok((dedup.into_canonical(), stats))
}
