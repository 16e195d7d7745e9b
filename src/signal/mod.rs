// src/signal/mod.rs
pub mod error;
pub mod gauge;
pub mod inference;
pub mod numeric;
pub mod parse;
pub mod plot;
pub mod query;
pub mod simulate;
pub mod store;
pub mod table;
pub use error::SignalError;
pub use gauge::{project, reference_resistance};
pub use inference::{infer, infer_time_unit, ColumnChoice, TimeUnit};
pub use parse::{parse_bytes, parse_path, parse_table, ParsedResult};
pub use plot::{render_overview_png, PlotStyle};
pub use query::sample_at;
pub use simulate::{synthetic_csv, SessionPlan};
pub use store::{ColumnMapping, Interpolation, Sample, SampleField, SampleStore};
pub use table::Table;
