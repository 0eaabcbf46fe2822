// src/process/aggregate.rs
use crate::process::types::{AdmittedRecord, CityAggregate, Event, TimeSlot};
use chrono::NaiveDate;
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// Groups admitted records by `(city, date)` and nests the result per city.
///
/// Events collapse under set semantics and come out ordered by district,
/// then building state. Time slots come out newest first.
#[derive(Debug, Default)]
pub struct CityAggregator {
    groups: BTreeMap<(String, NaiveDate), BTreeSet<Event>>,
    records: u64,
}

impl CityAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: AdmittedRecord) {
        self.records += 1;
        let AdmittedRecord {
            city,
            date,
            district,
            building_state,
        } = record;
        self.groups.entry((city, date)).or_default().insert(Event {
            district,
            building_state,
        });
    }

    pub fn records(&self) -> u64 {
        self.records
    }

    pub fn finish(self) -> Vec<CityAggregate> {
        let groups = self.groups.len();

        let mut by_city: BTreeMap<String, Vec<TimeSlot>> = BTreeMap::new();
        for ((city, date), events) in self.groups {
            by_city.entry(city).or_default().push(TimeSlot {
                date,
                events: events.into_iter().collect(),
            });
        }

        let aggregates: Vec<CityAggregate> = by_city
            .into_iter()
            .map(|(city, mut time_slots)| {
                time_slots.sort_by(|a, b| b.date.cmp(&a.date));
                time_slots.dedup_by(|a, b| a.date == b.date);
                CityAggregate { city, time_slots }
            })
            .collect();

        debug!(
            records = self.records,
            groups,
            cities = aggregates.len(),
            "aggregated"
        );
        aggregates
    }
}

impl Extend<AdmittedRecord> for CityAggregator {
    fn extend<I: IntoIterator<Item = AdmittedRecord>>(&mut self, iter: I) {
        for record in iter {
            self.push(record);
        }
    }
}

/// One [`CityAggregate`] per city present in `records`, ordered by city name.
pub fn aggregate<I>(records: I) -> Vec<CityAggregate>
where
    I: IntoIterator<Item = AdmittedRecord>,
{
    let mut agg = CityAggregator::new();
    agg.extend(records);
    agg.finish()
}
