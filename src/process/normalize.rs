// src/process/normalize.rs
use crate::error::LvrError;
use crate::process::{
    numeral::parse_floor_count,
    roc_date::parse_roc_date,
    source::{SourceCode, SourceRow},
    types::NormalizedRecord,
};

pub const DATE: &str = "date";
pub const DISTRICT: &str = "district";
pub const MAIN_USE: &str = "main_use";
pub const BUILDING_STATE: &str = "building_state";
pub const TOTAL_FLOOR_NUMBER: &str = "total_floor_number";

const RENAMES: &[(&str, &str)] = &[
    ("transaction_year_month_and_day", DATE),
    ("the_villages_and_towns_urban_district", DISTRICT),
];

/// `"Transaction year month and day"` → `"date"`; other names are only
/// lowercased with spaces turned into underscores.
pub fn normalize_column_name(raw: &str) -> String {
    let name = raw.trim().to_lowercase().replace(' ', "_");
    RENAMES
        .iter()
        .find(|(from, _)| *from == name)
        .map(|(_, to)| to.to_string())
        .unwrap_or(name)
}

/// The canonical column names of one source file plus its city label.
/// Built once per file and shared by all of its rows.
#[derive(Debug, Clone)]
pub struct NormalizedHeader {
    source: SourceCode,
    city: &'static str,
    columns: Vec<String>,
}

impl NormalizedHeader {
    pub fn new(source: SourceCode, headers: &[String]) -> Self {
        Self {
            source,
            city: source.city(),
            columns: headers.iter().map(|h| normalize_column_name(h)).collect(),
        }
    }

    pub fn source(&self) -> SourceCode {
        self.source
    }

    pub fn city(&self) -> &'static str {
        self.city
    }

    pub fn position(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == column)
    }

    fn require(&self, column: &str) -> Result<usize, LvrError> {
        self.position(column).ok_or_else(|| LvrError::MissingColumn {
            column: column.to_string(),
            source_name: self.source.file_name(),
        })
    }

    pub fn row<'a>(&'a self, row: SourceRow<'a>) -> NormalizedRow<'a> {
        NormalizedRow {
            header: self,
            fields: row.fields,
        }
    }
}

/// A source row viewed through its file's normalized header.
#[derive(Debug, Clone, Copy)]
pub struct NormalizedRow<'a> {
    header: &'a NormalizedHeader,
    fields: &'a [String],
}

impl<'a> NormalizedRow<'a> {
    pub fn city(&self) -> &'static str {
        self.header.city
    }

    /// Missing trailing fields of a short row read as `""`.
    fn field(&self, idx: usize) -> &'a str {
        self.fields.get(idx).map(String::as_str).unwrap_or("")
    }
}

/// Column positions of the fields a [`NormalizedRecord`] is built from.
/// Resolving them up front turns a missing column into one error per file
/// instead of one per row.
#[derive(Debug, Clone, Copy)]
pub struct RecordLayout {
    date: usize,
    district: usize,
    building_state: usize,
    main_use: usize,
    total_floor_number: usize,
}

impl RecordLayout {
    pub fn new(header: &NormalizedHeader) -> Result<Self, LvrError> {
        Ok(Self {
            date: header.require(DATE)?,
            district: header.require(DISTRICT)?,
            building_state: header.require(BUILDING_STATE)?,
            main_use: header.require(MAIN_USE)?,
            total_floor_number: header.require(TOTAL_FLOOR_NUMBER)?,
        })
    }

    /// Parse the date and floor count of one normalized row.
    /// A malformed date fails the row; a malformed floor count does not.
    pub fn parse(&self, row: &NormalizedRow<'_>) -> Result<NormalizedRecord, LvrError> {
        Ok(NormalizedRecord {
            city: row.city().to_string(),
            date: parse_roc_date(row.field(self.date))?,
            district: row.field(self.district).to_string(),
            building_state: row.field(self.building_state).to_string(),
            main_use: row.field(self.main_use).to_string(),
            floor_count: parse_floor_count(Some(row.field(self.total_floor_number))),
        })
    }
}
