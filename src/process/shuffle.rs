// src/process/shuffle.rs
//! Out-of-core partition-by-city shuffle.
//!
//! Each per-file worker owns one [`PartitionWriter`] and appends its admitted
//! records as JSON lines to `part-{p:05}-{source}.jsonl`. Aggregation then
//! reads back one partition at a time. The partition key is the city, so a
//! city never spans two partitions and per-partition results just concatenate.

use crate::process::{
    aggregate::CityAggregator,
    source::SourceCode,
    types::{AdmittedRecord, CityAggregate},
};
use anyhow::{Context, Result};
use std::{
    fs::File,
    io::{BufRead, BufReader, BufWriter, Write},
    path::{Path, PathBuf},
};
use tempfile::TempDir;
use tracing::{debug, info, instrument};

/// Stable across runs and platforms (FNV-1a).
pub fn partition_of(city: &str, partitions: usize) -> usize {
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for b in city.bytes() {
        hash ^= u64::from(b);
        hash = hash.wrapping_mul(0x0100_0000_01b3);
    }
    (hash % partitions as u64) as usize
}

/// Temporary spill directory; removed when dropped.
#[derive(Debug)]
pub struct SpillDir {
    dir: TempDir,
    partitions: usize,
}

impl SpillDir {
    pub fn new(partitions: usize) -> Result<Self> {
        let dir = tempfile::Builder::new()
            .prefix("lvr-spill-")
            .tempdir()
            .context("creating spill directory")?;
        Ok(Self::with_dir(dir, partitions))
    }

    pub fn new_in(parent: impl AsRef<Path>, partitions: usize) -> Result<Self> {
        let parent = parent.as_ref();
        let dir = tempfile::Builder::new()
            .prefix("lvr-spill-")
            .tempdir_in(parent)
            .with_context(|| format!("creating spill directory in {:?}", parent))?;
        Ok(Self::with_dir(dir, partitions))
    }

    fn with_dir(dir: TempDir, partitions: usize) -> Self {
        Self {
            dir,
            partitions: partitions.max(1),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    fn partition_path(&self, partition: usize, source: SourceCode) -> PathBuf {
        self.dir
            .path()
            .join(format!("part-{:05}-{}.jsonl", partition, source))
    }

    /// One writer per source; workers never share a file.
    pub fn writer(&self, source: SourceCode) -> Result<PartitionWriter> {
        let mut files = Vec::with_capacity(self.partitions);
        for p in 0..self.partitions {
            let path = self.partition_path(p, source);
            let file = File::create(&path)
                .with_context(|| format!("creating spill file {:?}", path))?;
            files.push(BufWriter::new(file));
        }
        Ok(PartitionWriter {
            source,
            files,
            written: 0,
        })
    }

    /// Aggregate the spilled records, holding one partition in memory at a time.
    #[instrument(level = "info", skip(self), fields(dir = %self.path().display(), partitions = self.partitions))]
    pub fn aggregate(&self) -> Result<Vec<CityAggregate>> {
        let mut out = Vec::new();

        for p in 0..self.partitions {
            let mut agg = CityAggregator::new();

            for source in SourceCode::ALL {
                let path = self.partition_path(p, source);
                if !path.exists() {
                    continue;
                }
                let reader = BufReader::new(
                    File::open(&path).with_context(|| format!("opening spill file {:?}", path))?,
                );
                for (line_no, line) in reader.lines().enumerate() {
                    let line = line.with_context(|| format!("reading {:?}", path))?;
                    if line.is_empty() {
                        continue;
                    }
                    let record: AdmittedRecord = serde_json::from_str(&line)
                        .with_context(|| format!("decoding {:?} line {}", path, line_no + 1))?;
                    agg.push(record);
                }
            }

            debug!(partition = p, records = agg.records(), "partition loaded");
            out.extend(agg.finish());
        }

        out.sort_by(|a, b| a.city.cmp(&b.city));
        info!(cities = out.len(), "spilled partitions aggregated");
        Ok(out)
    }
}

/// Appends the admitted records of one source to its partition files.
#[derive(Debug)]
pub struct PartitionWriter {
    source: SourceCode,
    files: Vec<BufWriter<File>>,
    written: u64,
}

impl PartitionWriter {
    pub fn push(&mut self, record: &AdmittedRecord) -> Result<()> {
        let p = partition_of(&record.city, self.files.len());
        let file = &mut self.files[p];
        serde_json::to_writer(&mut *file, record)?;
        file.write_all(b"\n")?;
        self.written += 1;
        Ok(())
    }

    /// Flush every partition file and return the number of records written.
    pub fn finish(self) -> Result<u64> {
        for mut file in self.files {
            file.flush()
                .with_context(|| format!("flushing spill file of source {}", self.source))?;
        }
        Ok(self.written)
    }
}
