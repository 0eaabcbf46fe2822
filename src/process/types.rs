// src/process/types.rs
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One transaction after column normalization and value parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedRecord {
    pub city: String,
    pub date: NaiveDate,
    pub district: String,
    pub building_state: String,
    pub main_use: String,
    pub floor_count: Option<u32>,
}

/// The projection of a record that passed the filter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AdmittedRecord {
    pub city: String,
    pub date: NaiveDate,
    pub district: String,
    pub building_state: String,
}

/// Field order doubles as the sort order of events inside a time slot.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Event {
    pub district: String,
    pub building_state: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSlot {
    /// Serialized as `yyyy-MM-dd`.
    pub date: NaiveDate,
    pub events: Vec<Event>,
}

/// One output record: every admitted event of a city, newest date first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CityAggregate {
    pub city: String,
    pub time_slots: Vec<TimeSlot>,
}

impl AdmittedRecord {
    pub fn event(&self) -> Event {
        Event {
            district: self.district.clone(),
            building_state: self.building_state.clone(),
        }
    }
}
