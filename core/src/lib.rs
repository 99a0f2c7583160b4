//! Batch transform: noisy order events + two dimension tables in,
//! one sorted aggregate table out. Byte-identical output for identical
//! input is the correctness contract.

pub mod aggregate;
pub mod config;
pub mod dedup;
pub mod dimension;
pub mod engine;
pub mod enrich;
pub mod error;
pub mod event;
pub mod fixed_point;
pub mod output;
pub mod table;
pub mod types;
pub mod validator;
pub mod vip;
