// src/output.rs
use crate::process::types::CityAggregate;
use anyhow::{Context, Result};
use std::{
    fs::{self, File},
    io::{self, BufWriter, Write},
    ops::Range,
    path::{Path, PathBuf},
};
use tracing::{debug, info, instrument};

/// Shard `0` is written as `result-part1.json`.
pub fn shard_file_name(index: usize) -> String {
    format!("result-part{}.json", index + 1)
}

/// Split `len` records into at most `shards` contiguous, non-empty runs.
/// Always yields at least one (possibly empty) range.
pub fn plan_shards(len: usize, shards: usize) -> Vec<Range<usize>> {
    let count = shards.max(1).min(len.max(1));
    let base = len / count;
    let extra = len % count;

    let mut ranges = Vec::with_capacity(count);
    let mut start = 0;
    for i in 0..count {
        let size = base + usize::from(i < extra);
        ranges.push(start..start + size);
        start += size;
    }
    ranges
}

/// One JSON object per line.
pub fn write_json_lines<W: Write>(mut w: W, records: &[CityAggregate]) -> Result<()> {
    for record in records {
        serde_json::to_writer(&mut w, record)?;
        w.write_all(b"\n")?;
    }
    w.flush()?;
    Ok(())
}

fn remove_dir_if_exists(dir: &Path) -> Result<()> {
    match fs::remove_dir_all(dir) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e).with_context(|| format!("clearing {:?}", dir)),
    }
}

/// Remove `dir` with everything in it and create it again empty.
pub fn init_folder(dir: &Path) -> Result<()> {
    remove_dir_if_exists(dir)?;
    fs::create_dir_all(dir).with_context(|| format!("creating {:?}", dir))
}

/// Write `aggregates` as `result-part{n}.json` shards into `result_dir`.
///
/// Shards are written to a staging directory next to `result_dir` first.
/// Once every shard is on disk the old result directory is removed and the
/// staging directory is renamed into its place in one step.
#[instrument(level = "info", skip(aggregates), fields(records = aggregates.len(), dir = %result_dir.display()))]
pub fn write_result(
    aggregates: &[CityAggregate],
    result_dir: &Path,
    shards: usize,
) -> Result<Vec<PathBuf>> {
    let parent = match result_dir.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&parent).with_context(|| format!("creating {:?}", parent))?;
    let staging = tempfile::Builder::new()
        .prefix(".result-staging-")
        .tempdir_in(&parent)
        .with_context(|| format!("creating staging directory in {:?}", parent))?;

    let plan = plan_shards(aggregates.len(), shards);
    let mut names = Vec::with_capacity(plan.len());
    for (idx, range) in plan.into_iter().enumerate() {
        let name = shard_file_name(idx);
        let path = staging.path().join(&name);
        let file = File::create(&path).with_context(|| format!("creating {:?}", path))?;
        write_json_lines(BufWriter::new(file), &aggregates[range.clone()])
            .with_context(|| format!("writing {:?}", path))?;
        debug!(shard = %name, cities = range.len(), "shard staged");
        names.push(name);
    }

    // tempdirs are created owner-only
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(staging.path(), fs::Permissions::from_mode(0o755))
            .with_context(|| format!("setting permissions of {:?}", staging.path()))?;
    }

    remove_dir_if_exists(result_dir)?;
    fs::rename(staging.path(), result_dir)
        .with_context(|| format!("moving staged shards into {:?}", result_dir))?;
    let _ = staging.keep();

    let written: Vec<PathBuf> = names.iter().map(|name| result_dir.join(name)).collect();

    info!(shards = written.len(), "result written");
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::types::{Event, TimeSlot};
    use chrono::NaiveDate;
    use tempfile::tempdir;

    fn city(name: &str) -> CityAggregate {
        CityAggregate {
            city: name.into(),
            time_slots: vec![TimeSlot {
                date: NaiveDate::from_ymd_opt(2019, 1, 1).unwrap(),
                events: vec![Event {
                    district: "中正區".into(),
                    building_state: "住宅大樓A棟".into(),
                }],
            }],
        }
    }

    #[test]
    fn shard_names_start_at_one() {
        assert_eq!(shard_file_name(0), "result-part1.json");
        assert_eq!(shard_file_name(1), "result-part2.json");
    }

    #[test]
    fn shard_plan() {
        assert_eq!(plan_shards(5, 2), vec![0..3, 3..5]);
        assert_eq!(plan_shards(4, 2), vec![0..2, 2..4]);
        assert_eq!(plan_shards(1, 2), vec![0..1]);
        assert_eq!(plan_shards(0, 2), vec![0..0]);
        assert_eq!(plan_shards(3, 0), vec![0..3]);
    }

    #[test]
    fn writes_json_line_shards() -> Result<()> {
        let scratch = tempdir()?;
        let result_dir = scratch.path().join("result");
        fs::create_dir_all(&result_dir)?;
        fs::write(result_dir.join("stale.json"), "old")?;

        let aggregates: Vec<_> = ["台中市", "台北市", "新北市", "桃園市", "高雄市"]
            .into_iter()
            .map(city)
            .collect();
        let written = write_result(&aggregates, &result_dir, 2)?;

        assert_eq!(
            written,
            vec![
                result_dir.join("result-part1.json"),
                result_dir.join("result-part2.json")
            ]
        );
        assert!(!result_dir.join("stale.json").exists());

        let part1 = fs::read_to_string(&written[0])?;
        let part2 = fs::read_to_string(&written[1])?;
        assert_eq!(part1.lines().count(), 3);
        assert_eq!(part2.lines().count(), 2);

        let first: CityAggregate = serde_json::from_str(part1.lines().next().unwrap())?;
        assert_eq!(first, aggregates[0]);

        // staging directory is gone
        let leftovers: Vec<_> = fs::read_dir(scratch.path())?
            .filter_map(|e| e.ok())
            .map(|e| e.file_name())
            .collect();
        assert_eq!(leftovers, vec![std::ffi::OsString::from("result")]);
        Ok(())
    }

    #[test]
    fn stale_shards_do_not_survive_a_rewrite() -> Result<()> {
        let scratch = tempdir()?;
        let result_dir = scratch.path().join("result");
        let aggregates: Vec<_> = ["台中市", "台北市", "新北市"].into_iter().map(city).collect();
        write_result(&aggregates, &result_dir, 3)?;

        write_result(&aggregates[..1], &result_dir, 3)?;
        let mut names: Vec<_> = fs::read_dir(&result_dir)?
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().to_string())
            .collect();
        names.sort();
        assert_eq!(names, vec!["result-part1.json"]);
        Ok(())
    }

    #[test]
    fn failed_swap_leaves_previous_output_alone() -> Result<()> {
        let scratch = tempdir()?;
        let result_dir = scratch.path().join("result");
        fs::write(&result_dir, "not a directory")?;

        assert!(write_result(&[city("台北市")], &result_dir, 2).is_err());
        assert_eq!(fs::read_to_string(&result_dir)?, "not a directory");
        let leftovers: Vec<_> = fs::read_dir(scratch.path())?
            .filter_map(|e| e.ok())
            .map(|e| e.file_name())
            .collect();
        assert_eq!(leftovers, vec![std::ffi::OsString::from("result")]);
        Ok(())
    }

    #[test]
    fn empty_result_still_writes_part_one() -> Result<()> {
        let scratch = tempdir()?;
        let result_dir = scratch.path().join("result");
        let written = write_result(&[], &result_dir, 2)?;
        assert_eq!(written, vec![result_dir.join("result-part1.json")]);
        assert_eq!(fs::read_to_string(&written[0])?, "");
        Ok(())
    }
}
