//! Shared fixtures for the integration tests.
#![allow(dead_code)]

use etl_core::{
    engine::{RunSummary, TransformEngine},
    output::OUTPUT_HEADER,
};
use rand::{seq::SliceRandom, Rng, SeedableRng};
use rand_pcg::Pcg64Mcg;
use std::ops::Range;

pub const PRODUCTS: &str = "product_id,category,margin_bps,weight_grams\n\
1,Electronics,2500,100\n\
2,books,4000,3000\n\
3,apparel,3000,400\n";

pub const COUNTRIES: &str = "country,fx_to_usd_ppm,risk_bps,tax_bps\n\
US,1000000,10000,0\n\
GB,1260000,10200,2000\n\
IN,12000,10800,1800\n";

pub const EVENT_HEADER: &str = "event_id,event_version,event_ts,event_date,customer_id,product_id,\
amount_cents,quantity,discount_bps,shipping_cents,status,country,customer_tier,payment_method";

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// One events-table row as raw text. Defaults describe a clean order.
#[derive(Debug, Clone)]
pub struct Ev {
    pub id: String,
    pub version: String,
    pub ts: String,
    pub date: String,
    pub customer: String,
    pub product: String,
    pub amount: String,
    pub quantity: String,
    pub discount: String,
    pub shipping: String,
    pub status: String,
    pub country: String,
    pub tier: String,
    pub payment: String,
}

macro_rules! setters {
    ($($field:ident),*) => {
        $(
            pub fn $field(mut self, value: impl ToString) -> Self {
                self.$field = value.to_string();
                self
            }
        )*
    };
}

impl Ev {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.into(),
            version: "1".into(),
            ts: "2025-01-01T10:00:00".into(),
            date: "2025-01-01".into(),
            customer: "7".into(),
            product: "1".into(),
            amount: "1000".into(),
            quantity: "2".into(),
            discount: "0".into(),
            shipping: "0".into(),
            status: "COMPLETE".into(),
            country: "US".into(),
            tier: "gold".into(),
            payment: "card".into(),
        }
    }

    setters!(
        version, ts, date, customer, product, amount, quantity, discount, shipping, status,
        country, tier
    );

    pub fn line(&self) -> String {
        [
            &self.id, &self.version, &self.ts, &self.date, &self.customer, &self.product,
            &self.amount, &self.quantity, &self.discount, &self.shipping, &self.status,
            &self.country, &self.tier, &self.payment,
        ]
        .map(String::as_str)
        .join(",")
    }
}

pub fn events_csv(rows: &[Ev]) -> String {
    let mut csv = String::from(EVENT_HEADER);
    csv.push('\n');
    for row in rows {
        csv.push_str(&row.line());
        csv.push('\n');
    }
    csv
}

pub fn run_with(events: &str, products: &str, countries: &str) -> (String, RunSummary) {
    init_logging();
    let mut out = Vec::new();
    let summary = TransformEngine::default()
        .run(events.as_bytes(), products.as_bytes(), countries.as_bytes(), &mut out)
        .expect("in-memory transform");
    (String::from_utf8(out).expect("utf-8 output"), summary)
}

pub fn run(events: &str) -> (String, RunSummary) {
    run_with(events, PRODUCTS, COUNTRIES)
}

pub fn run_rows(rows: &[Ev]) -> (String, RunSummary) {
    run(&events_csv(rows))
}

/// Parsed data rows of an output table (header checked and dropped).
pub fn data_rows(output: &str) -> Vec<Vec<String>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(output.as_bytes());
    let header: Vec<String> = reader
        .headers()
        .expect("header")
        .iter()
        .map(String::from)
        .collect();
    assert_eq!(header, OUTPUT_HEADER);
    reader
        .records()
        .map(|r| r.expect("record").iter().map(String::from).collect())
        .collect()
}

pub fn col(row: &[String], name: &str) -> i64 {
    let idx = OUTPUT_HEADER
        .iter()
        .position(|h| *h == name)
        .unwrap_or_else(|| panic!("no column {name}"));
    row[idx].parse().unwrap_or_else(|_| panic!("{name} not numeric: {}", row[idx]))
}

pub fn key(row: &[String]) -> Vec<&str> {
    row[..6].iter().map(String::as_str).collect()
}

/// Deterministic dirty events in the shape of the benchmark generator:
/// repeated ids, bad numbers, odd casing, malformed timestamps.
pub fn noisy_events(seed: u64, count: usize) -> Vec<Ev> {
    let mut rng = Pcg64Mcg::seed_from_u64(seed);
    let statuses = ["COMPLETE", "COMPLETE", "COMPLETE", "complete", "PENDING", "CANCELLED", ""];
    let countries = ["US", "us", "GB", "IN", "ZZ", ""];
    let tiers = ["bronze", "Silver", "GOLD", "platinum", "diamond", ""];
    let id_space = (count / 2).max(1);

    (0..count)
        .map(|_| {
            let day = rng.gen_range(1..=3);
            let hour = rng.gen_range(0..24);
            let ts = match rng.gen_range(0..20) {
                0 => String::new(),
                1 => format!("2025-01-0{day} {hour:02}:15:00"),
                2 => "garbage".to_string(),
                _ => format!("2025-01-0{day}T{hour:02}:{:02}:00", rng.gen_range(0..60)),
            };
            let mut ev = Ev::new(&format!("E{}", rng.gen_range(0..id_space)));
            ev.version = noisy_int(&mut rng, 0..4);
            ev.ts = ts;
            ev.date = format!("2025-01-0{day}");
            ev.customer = noisy_int(&mut rng, 1..30);
            ev.product = noisy_int(&mut rng, 1..6);
            ev.amount = noisy_int(&mut rng, -100..60_000);
            ev.quantity = noisy_int(&mut rng, 0..8);
            ev.discount = noisy_int(&mut rng, -500..7_000);
            ev.shipping = noisy_int(&mut rng, -100..30_000);
            ev.status = statuses.choose(&mut rng).copied().unwrap_or("").to_string();
            ev.country = countries.choose(&mut rng).copied().unwrap_or("").to_string();
            ev.tier = tiers.choose(&mut rng).copied().unwrap_or("").to_string();
            ev
        })
        .collect()
}

/// Usually a number in `range`; sometimes empty or non-numeric.
fn noisy_int(rng: &mut Pcg64Mcg, range: Range<i64>) -> String {
    match rng.gen_range(0..40) {
        0 => String::new(),
        1 => "bad".to_string(),
        _ => rng.gen_range(range).to_string(),
    }
}

pub fn shuffled(rows: &[Ev], seed: u64) -> Vec<Ev> {
    let mut rows = rows.to_vec();
    rows.shuffle(&mut Pcg64Mcg::seed_from_u64(seed));
    rows
}

/// Drop rows whose (event_id, version, ts) repeats an earlier row. Equal
/// pairs keep whichever arrived first, so order-independence only holds
/// once such ties are gone.
pub fn without_version_ties(rows: &[Ev]) -> Vec<Ev> {
    let mut seen = std::collections::HashSet::new();
    rows.iter()
        .filter(|ev| {
            let version = ev.version.trim().parse::<i64>().unwrap_or(0);
            seen.insert((ev.id.trim().to_string(), version, ev.ts.trim().to_string()))
        })
        .cloned()
        .collect()
}
