// src/process/filter.rs
use crate::process::types::{AdmittedRecord, NormalizedRecord};

/// 住家用: residential use.
pub const RESIDENTIAL_USE: &str = "住家用";
/// 住宅大樓: residential high-rise.
pub const HIGH_RISE: &str = "住宅大樓";
pub const MIN_FLOORS: u32 = 13;

/// Residential high-rises of at least 13 floors. An unknown floor count never qualifies.
pub fn admits(main_use: &str, building_state: &str, floor_count: Option<u32>) -> bool {
    main_use == RESIDENTIAL_USE
        && building_state.contains(HIGH_RISE)
        && floor_count.is_some_and(|n| n >= MIN_FLOORS)
}

pub fn is_admitted(record: &NormalizedRecord) -> bool {
    admits(&record.main_use, &record.building_state, record.floor_count)
}

/// Project an admitted record onto the fields the aggregation needs.
pub fn admit(record: &NormalizedRecord) -> Option<AdmittedRecord> {
    is_admitted(record).then(|| AdmittedRecord {
        city: record.city.clone(),
        date: record.date,
        district: record.district.clone(),
        building_state: record.building_state.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record(main_use: &str, building_state: &str, floor_count: Option<u32>) -> NormalizedRecord {
        NormalizedRecord {
            city: "台北市".into(),
            date: NaiveDate::from_ymd_opt(2019, 1, 1).unwrap(),
            district: "中正區".into(),
            building_state: building_state.into(),
            main_use: main_use.into(),
            floor_count,
        }
    }

    #[test]
    fn admits_residential_high_rise() {
        let r = record("住家用", "住宅大樓(11層含以上有電梯)", Some(13));
        let admitted = admit(&r).expect("should be admitted");
        assert_eq!(admitted.city, "台北市");
        assert_eq!(admitted.district, "中正區");
        assert_eq!(admitted.building_state, "住宅大樓(11層含以上有電梯)");
    }

    #[test]
    fn every_clause_is_required() {
        assert!(!is_admitted(&record("住家用", "住宅大樓A棟", Some(12))));
        assert!(!is_admitted(&record("住家用", "住宅大樓A棟", None)));
        assert!(!is_admitted(&record("住家用", "住宅大樓A棟", Some(0))));
        assert!(!is_admitted(&record("商業用", "住宅大樓A棟", Some(20))));
        assert!(!is_admitted(&record("住家用", "華廈(10層含以下有電梯)", Some(20))));
        assert!(is_admitted(&record("住家用", "住宅大樓A棟", Some(40))));
    }

    #[test]
    fn decision_ignores_other_fields_and_is_idempotent() {
        let a = record("住家用", "住宅大樓A棟", Some(15));
        let mut b = a.clone();
        b.city = "高雄市".into();
        b.district = "前金區".into();
        b.date = NaiveDate::from_ymd_opt(2011, 3, 15).unwrap();

        assert_eq!(is_admitted(&a), is_admitted(&b));
        let first = admit(&a);
        assert_eq!(first, admit(&a));
        assert_eq!(first, admit(&a.clone()));
    }
}
