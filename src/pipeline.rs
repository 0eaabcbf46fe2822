// src/pipeline.rs
use crate::config::Config;
use crate::output;
use crate::session::Session;
use crate::process::{
    aggregate::aggregate,
    filter,
    normalize::{NormalizedHeader, RecordLayout},
    shuffle::SpillDir,
    source::{SourceCode, SourceReader},
    types::{AdmittedRecord, CityAggregate},
};
use anyhow::{Context, Result};
use rayon::prelude::*;
use std::{
    fs::File,
    io::Read,
    path::{Path, PathBuf},
    time::Instant,
};
use tracing::{info, instrument};

pub const APP_NAME: &str = "LvrLandProcessing";

/// Row counts of one source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SourceStats {
    pub rows: u64,
    pub admitted: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RunSummary {
    pub rows: u64,
    pub admitted: u64,
    pub cities: usize,
    pub shards: Vec<PathBuf>,
}

/// `<dir>/<code>_lvr_land_a.csv` for every source, in [`SourceCode::ALL`] order.
pub fn source_paths(dir: &Path) -> Vec<PathBuf> {
    SourceCode::ALL
        .iter()
        .map(|code| dir.join(code.file_name()))
        .collect()
}

/// Every input must be present and readable before any row is normalized.
pub fn check_sources(paths: &[PathBuf]) -> Result<()> {
    for path in paths {
        File::open(path).with_context(|| format!("source CSV is not readable: {:?}", path))?;
    }
    Ok(())
}

/// Normalize, parse and filter one source, handing each admitted record to `emit`.
pub fn admit_rows<R, F>(reader: &mut SourceReader<R>, mut emit: F) -> Result<SourceStats>
where
    R: Read,
    F: FnMut(AdmittedRecord) -> Result<()>,
{
    let header = NormalizedHeader::new(reader.source(), reader.headers());
    let layout = RecordLayout::new(&header)?;

    let mut admitted = 0;
    let rows = reader.for_each_row(|row| {
        let record = layout.parse(&header.row(row)).with_context(|| {
            format!(
                "source {} row {}",
                header.source(),
                row_preview(row.fields)
            )
        })?;
        if let Some(record) = filter::admit(&record) {
            emit(record)?;
            admitted += 1;
        }
        Ok(())
    })?;

    Ok(SourceStats { rows, admitted })
}

fn row_preview(fields: &[String]) -> String {
    fields
        .iter()
        .take(3)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(",")
}

/// Per-file stage, in memory.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub fn collect_admitted(path: &Path) -> Result<(Vec<AdmittedRecord>, SourceStats)> {
    let mut reader = SourceReader::open(path)?;
    let mut out = Vec::new();
    let stats = admit_rows(&mut reader, |record| {
        out.push(record);
        Ok(())
    })?;
    info!(rows = stats.rows, admitted = stats.admitted, "source filtered");
    Ok((out, stats))
}

/// Per-file stage, spilling admitted records into `spill`'s partitions.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub fn spill_admitted(path: &Path, spill: &SpillDir) -> Result<SourceStats> {
    let mut reader = SourceReader::open(path)?;
    let mut writer = spill.writer(reader.source())?;
    let stats = admit_rows(&mut reader, |record| writer.push(&record))?;
    writer.finish()?;
    info!(rows = stats.rows, admitted = stats.admitted, "source spilled");
    Ok(stats)
}

fn sum(stats: &[SourceStats]) -> SourceStats {
    stats.iter().fold(SourceStats::default(), |acc, s| SourceStats {
        rows: acc.rows + s.rows,
        admitted: acc.admitted + s.admitted,
    })
}

/// Run the per-file stages in parallel and aggregate their union.
/// Must be called inside a [`Session`] for the work to land on its pool.
pub fn build_aggregates(
    paths: &[PathBuf],
    spill_partitions: Option<usize>,
) -> Result<(Vec<CityAggregate>, SourceStats)> {
    match spill_partitions {
        None => {
            let per_source = paths
                .par_iter()
                .map(|p| collect_admitted(p))
                .collect::<Result<Vec<_>>>()?;
            let stats: Vec<SourceStats> = per_source.iter().map(|(_, s)| *s).collect();
            let records = per_source.into_iter().flat_map(|(records, _)| records);
            Ok((aggregate(records), sum(&stats)))
        }
        Some(partitions) => {
            let spill = SpillDir::new(partitions)?;
            let stats = paths
                .par_iter()
                .map(|p| spill_admitted(p, &spill))
                .collect::<Result<Vec<_>>>()?;
            Ok((spill.aggregate()?, sum(&stats)))
        }
    }
}

/// One batch run: read the five sources under `config.unzip_dir`, aggregate,
/// and write the shards into `config.result_dir`. Nothing is written unless
/// every stage before the output succeeded.
#[instrument(level = "info", skip_all, fields(input = %config.unzip_dir.display()))]
pub fn run(config: &Config) -> Result<RunSummary> {
    let start = Instant::now();
    let paths = source_paths(&config.unzip_dir);
    check_sources(&paths)?;

    let session = Session::start(APP_NAME, config.threads)?;
    let (aggregates, stats) =
        session.run(|| build_aggregates(&paths, config.spill_partitions))?;
    let shards = output::write_result(&aggregates, &config.result_dir, config.shards)?;
    drop(session);

    info!(
        rows = stats.rows,
        admitted = stats.admitted,
        cities = aggregates.len(),
        elapsed = ?start.elapsed(),
        "run complete"
    );
    Ok(RunSummary {
        rows: stats.rows,
        admitted: stats.admitted,
        cities: aggregates.len(),
        shards,
    })
}
