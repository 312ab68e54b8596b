//! Task execution: map with shuffle to partition files, and reduce.
//!
//! Everything here is blocking file I/O; the worker loop runs it on the
//! blocking pool.

use std::{
    fs::{self, File},
    io::{BufReader, Write},
    path::{Path, PathBuf},
};

use anyhow::{bail, Context, Result};
use mr_common::{
    app::reduce_all,
    files::{self, output_file_name, partition_file_name, StagedFile},
    kv::{partition, read_pairs, write_pairs},
    KeyValue, MapReduceApp, Task, TaskKind,
};

/// Runs `task` and returns the files it published.
pub fn execute(
    app: &dyn MapReduceApp,
    task: &Task,
    n_reduce: usize,
    n_map: usize,
    work_dir: &Path,
) -> Result<Vec<PathBuf>> {
    match task.kind {
        TaskKind::Map => {
            let source = task
                .source
                .as_deref()
                .with_context(|| format!("map task {} has no input record", task.seq))?;
            run_map_task(app, task.seq, source, n_reduce, work_dir)
        }
        TaskKind::Reduce => Ok(vec![run_reduce_task(app, task.seq, n_map, work_dir)?]),
    }
}

/// Reads `source`, maps it, and publishes one partition file per bucket.
///
/// `source` is resolved against the process's working directory, not
/// `work_dir`. Bytes that are not valid UTF-8 are replaced, never rejected.
///
/// All buckets are written to temp files before any is renamed, so an I/O
/// error leaves no new partition files behind. Buckets that received no
/// pairs still get an (empty) file, since every reduce task expects one
/// file from every map task.
pub fn run_map_task(
    app: &dyn MapReduceApp,
    map_seq: usize,
    source: &str,
    n_reduce: usize,
    work_dir: &Path,
) -> Result<Vec<PathBuf>> {
    if n_reduce == 0 {
        bail!("map task {} got a partition count of 0", map_seq);
    }

    let bytes = fs::read(source).with_context(|| format!("cannot read input {}", source))?;
    let contents = String::from_utf8_lossy(&bytes);
    let buckets = partition(app.map(source, &contents), n_reduce);

    let staged = buckets
        .iter()
        .enumerate()
        .map(|(bucket, pairs)| {
            files::stage(work_dir, &partition_file_name(map_seq, bucket), |w| {
                write_pairs(w, pairs)
            })
        })
        .collect::<Result<Vec<StagedFile>>>()?;

    staged.into_iter().map(StagedFile::commit).collect()
}

/// Reads the partition files `(0..n_map, reduce_seq)`.
pub fn read_bucket(reduce_seq: usize, n_map: usize, work_dir: &Path) -> Result<Vec<KeyValue>> {
    let mut pairs = Vec::new();
    for map_seq in 0..n_map {
        let path = work_dir.join(partition_file_name(map_seq, reduce_seq));
        let file =
            File::open(&path).with_context(|| format!("cannot open {}", path.display()))?;
        let decoded = read_pairs(BufReader::new(file))
            .with_context(|| format!("cannot decode {}", path.display()))?;
        pairs.extend(decoded);
    }
    Ok(pairs)
}

/// Groups bucket `reduce_seq` by key, reduces each group and publishes
/// `"<key> <value>"` lines in ascending key order.
pub fn run_reduce_task(
    app: &dyn MapReduceApp,
    reduce_seq: usize,
    n_map: usize,
    work_dir: &Path,
) -> Result<PathBuf> {
    let pairs = read_bucket(reduce_seq, n_map, work_dir)?;
    let reduced = reduce_all(app, pairs);

    files::publish(work_dir, &output_file_name(reduce_seq), |w| {
        for kv in &reduced {
            writeln!(w, "{} {}", kv.key, kv.value)?;
        }
        Ok(())
    })
}
