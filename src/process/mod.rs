// src/process/mod.rs
pub mod aggregate;
pub mod filter;
pub mod normalize;
pub mod numeral;
pub mod roc_date;
pub mod shuffle;
pub mod source;
pub mod types;

pub use aggregate::{aggregate, CityAggregator};
pub use source::{SourceCode, SourceReader, SourceRow};
pub use types::{AdmittedRecord, CityAggregate, Event, NormalizedRecord, TimeSlot};
