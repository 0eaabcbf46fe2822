// src/extract.rs
use crate::output::init_folder;
use crate::process::source::SourceCode;
use anyhow::{anyhow, Context, Result};
use std::{
    collections::HashMap,
    fs::File,
    io::{self, BufWriter, Write},
    path::{Path, PathBuf},
};
use tracing::{debug, info, instrument};
use zip::ZipArchive;

/// Extract the five `<code>_lvr_land_a.csv` entries of a season archive into
/// `unzip_dir`. The directory is only reset once all five entries are found.
/// Entries are matched by file name, so the archive may nest them in a folder. Returns the extracted paths in
/// [`SourceCode::ALL`] order.
#[instrument(level = "info", skip_all, fields(archive = %archive.as_ref().display()))]
pub fn stage_sources(archive: impl AsRef<Path>, unzip_dir: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
    let archive = archive.as_ref();
    let unzip_dir = unzip_dir.as_ref();

    let file = File::open(archive)
        .with_context(|| format!("Failed to open ZIP file: {:?}", archive))?;
    let mut zip = ZipArchive::new(file)
        .with_context(|| format!("Failed to read ZIP archive: {:?}", archive))?;

    let mut by_name: HashMap<String, usize> = HashMap::new();
    for i in 0..zip.len() {
        let entry = zip
            .by_index(i)
            .with_context(|| format!("Failed to access ZIP entry #{} in {:?}", i, archive))?;
        if entry.is_file() {
            if let Some(name) = entry.name().rsplit('/').next() {
                by_name.entry(name.to_string()).or_insert(i);
            }
        }
    }

    let entries = SourceCode::ALL
        .iter()
        .map(|source| {
            let name = source.file_name();
            by_name
                .get(&name)
                .map(|&idx| (name.clone(), idx))
                .ok_or_else(|| anyhow!("{} not found in {:?}", name, archive))
        })
        .collect::<Result<Vec<_>>>()?;

    init_folder(unzip_dir)?;

    let mut staged = Vec::with_capacity(entries.len());
    for (wanted, idx) in entries {
        let mut entry = zip
            .by_index(idx)
            .with_context(|| format!("Failed to access ZIP entry {} in {:?}", wanted, archive))?;
        let dest = unzip_dir.join(&wanted);
        let mut out = BufWriter::new(
            File::create(&dest).with_context(|| format!("creating {:?}", dest))?,
        );
        let bytes = io::copy(&mut entry, &mut out)
            .with_context(|| format!("extracting {} to {:?}", wanted, dest))?;
        out.flush()
            .with_context(|| format!("flushing {:?}", dest))?;
        debug!(file = %wanted, bytes, "staged source");
        staged.push(dest);
    }

    info!(files = staged.len(), dir = %unzip_dir.display(), "sources staged");
    Ok(staged)
}
