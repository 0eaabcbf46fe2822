// src/process/source.rs
use crate::error::LvrError;
use anyhow::{Context, Result};
use csv::ReaderBuilder;
use once_cell::sync::Lazy;
use regex::Regex;
use std::{
    fmt,
    fs::File,
    io::{BufReader, Read},
    path::Path,
};
use tracing::debug;

/// `a_lvr_land_a.csv` → source code `a`.
static SOURCE_FILE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([a-z])_lvr_land_a\.csv$").expect("source file regex is valid"));

/// The five regional extracts the batch consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SourceCode {
    A,
    B,
    E,
    F,
    H,
}

impl SourceCode {
    pub const ALL: [SourceCode; 5] = [
        SourceCode::A,
        SourceCode::B,
        SourceCode::E,
        SourceCode::F,
        SourceCode::H,
    ];

    pub fn from_char(c: char) -> Result<Self, LvrError> {
        match c {
            'a' => Ok(SourceCode::A),
            'b' => Ok(SourceCode::B),
            'e' => Ok(SourceCode::E),
            'f' => Ok(SourceCode::F),
            'h' => Ok(SourceCode::H),
            other => Err(LvrError::Configuration(format!(
                "unknown source code {:?}",
                other
            ))),
        }
    }

    pub fn as_char(self) -> char {
        match self {
            SourceCode::A => 'a',
            SourceCode::B => 'b',
            SourceCode::E => 'e',
            SourceCode::F => 'f',
            SourceCode::H => 'h',
        }
    }

    /// City display name for this source.
    pub fn city(self) -> &'static str {
        match self {
            SourceCode::A => "台北市",
            SourceCode::B => "台中市",
            SourceCode::E => "高雄市",
            SourceCode::F => "新北市",
            SourceCode::H => "桃園市",
        }
    }

    /// Name of this source's CSV inside the season archive.
    pub fn file_name(self) -> String {
        format!("{}_lvr_land_a.csv", self.as_char())
    }

    /// Resolve the source code from a path like `tmp/unzip/a_lvr_land_a.csv`.
    pub fn from_path(path: &Path) -> Result<Self, LvrError> {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default();
        let caps = SOURCE_FILE_RE.captures(name).ok_or_else(|| {
            LvrError::Configuration(format!("not a source file name: {}", path.display()))
        })?;
        let code = caps[1].chars().next().unwrap_or_default();
        Self::from_char(code)
    }
}

impl fmt::Display for SourceCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// A single raw row, tagged with the source it was read from.
#[derive(Debug, Clone, Copy)]
pub struct SourceRow<'a> {
    pub source: SourceCode,
    pub fields: &'a [String],
}

/// Streaming reader over one source CSV. The first row is the header; short
/// rows are kept and their missing trailing fields read as empty.
pub struct SourceReader<R: Read> {
    source: SourceCode,
    headers: Vec<String>,
    rdr: csv::Reader<R>,
}

impl<R: Read> SourceReader<R> {
    pub fn new(source: SourceCode, reader: R) -> Result<Self> {
        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let headers: Vec<String> = rdr
            .headers()
            .with_context(|| format!("reading header of source {}", source))?
            .iter()
            .map(|h| h.trim_start_matches('\u{feff}').to_string())
            .collect();

        Ok(Self {
            source,
            headers,
            rdr,
        })
    }

    pub fn source(&self) -> SourceCode {
        self.source
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Feed every data row to `visit`, stopping at the first error.
    /// Returns the number of rows read.
    pub fn for_each_row<F>(&mut self, mut visit: F) -> Result<u64>
    where
        F: FnMut(SourceRow<'_>) -> Result<()>,
    {
        let Self { source, rdr, .. } = self;

        let mut count = 0;
        for (idx, result) in rdr.records().enumerate() {
            let record = result
                .with_context(|| format!("CSV parse error in source {} at record {}", source, idx))?;
            let fields: Vec<String> = record.iter().map(str::to_string).collect();
            visit(SourceRow {
                source: *source,
                fields: &fields,
            })?;
            count += 1;
        }

        debug!(source = %source, rows = count, "read source rows");
        Ok(count)
    }
}

impl SourceReader<BufReader<File>> {
    /// Open `path`, resolving the source code from its file name.
    pub fn open(path: &Path) -> Result<Self> {
        let source = SourceCode::from_path(path)?;
        let file =
            File::open(path).with_context(|| format!("Failed to open source CSV: {:?}", path))?;
        Self::new(source, BufReader::new(file))
            .with_context(|| format!("Failed to read source CSV: {:?}", path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn city_code_map() {
        let cities: Vec<_> = SourceCode::ALL.iter().map(|c| c.city()).collect();
        assert_eq!(cities, vec!["台北市", "台中市", "高雄市", "新北市", "桃園市"]);
    }

    #[test]
    fn unknown_code_is_configuration_error() {
        assert!(matches!(
            SourceCode::from_char('c'),
            Err(LvrError::Configuration(_))
        ));
    }

    #[test]
    fn code_from_path() {
        assert_eq!(
            SourceCode::from_path(Path::new("tmp/unzip/h_lvr_land_a.csv")).unwrap(),
            SourceCode::H
        );
        assert!(SourceCode::from_path(Path::new("tmp/unzip/c_lvr_land_a.csv")).is_err());
        assert!(SourceCode::from_path(Path::new("tmp/unzip/manifest.csv")).is_err());
        assert_eq!(SourceCode::E.file_name(), "e_lvr_land_a.csv");
    }

    #[test]
    fn reads_header_and_rows() -> Result<()> {
        let csv = "\u{feff}main use,building state\n住家用,住宅大樓(11層含以上有電梯)\n住家用\n";
        let mut reader = SourceReader::new(SourceCode::A, Cursor::new(csv))?;
        assert_eq!(reader.headers(), ["main use", "building state"]);

        let mut seen = Vec::new();
        let count = reader.for_each_row(|row| {
            assert_eq!(row.source, SourceCode::A);
            seen.push(row.fields.to_vec());
            Ok(())
        })?;
        assert_eq!(count, 2);
        assert_eq!(seen[1], vec!["住家用"]);
        Ok(())
    }

    #[test]
    fn open_rejects_unknown_file_name() {
        let err = SourceReader::open(Path::new("tmp/unzip/z_lvr_land_a.csv"))
            .err()
            .expect("unknown code must fail");
        assert!(matches!(
            err.downcast_ref::<LvrError>(),
            Some(LvrError::Configuration(_))
        ));
    }
}
