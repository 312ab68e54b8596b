//! File naming and crash-safe publication.
//!
//! Every file a task produces is first written to a hidden temp file in the
//! destination directory and then renamed over its final name. Readers see
//! either the previous complete file or the new complete file.

use std::{
    fs,
    io::{self, BufWriter, Write},
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use tempfile::NamedTempFile;

/// Intermediate file written by map task `map_seq` for bucket `bucket`.
pub fn partition_file_name(map_seq: usize, bucket: usize) -> String {
    format!("mr-{}-{}", map_seq, bucket)
}

/// Final output of reduce task `reduce_seq`.
pub fn output_file_name(reduce_seq: usize) -> String {
    format!("mr-out-{}", reduce_seq)
}

/// A fully written temp file waiting to be renamed into place.
/// Dropping it without calling [`StagedFile::commit`] removes the temp file.
#[derive(Debug)]
pub struct StagedFile {
    tmp: NamedTempFile,
    dest: PathBuf,
}

impl StagedFile {
    pub fn dest(&self) -> &Path {
        &self.dest
    }

    pub fn commit(self) -> Result<PathBuf> {
        let StagedFile { tmp, dest } = self;
        tmp.persist(&dest)
            .with_context(|| format!("cannot rename into {}", dest.display()))?;
        Ok(dest)
    }
}

/// Writes `file_name` into a temp file inside `dir` without publishing it.
pub fn stage<F>(dir: &Path, file_name: &str, write: F) -> Result<StagedFile>
where
    F: FnOnce(&mut dyn Write) -> io::Result<()>,
{
    if !dir.as_os_str().is_empty() {
        fs::create_dir_all(dir)
            .with_context(|| format!("cannot create directory {}", dir.display()))?;
    }

    // same directory as the destination so the rename never crosses filesystems
    let mut tmp = tempfile::Builder::new()
        .prefix(&format!(".{}.", file_name))
        .suffix(".tmp")
        .tempfile_in(dir)
        .with_context(|| format!("cannot create temp file in {}", dir.display()))?;

    {
        let mut writer = BufWriter::new(tmp.as_file_mut());
        write(&mut writer).with_context(|| format!("cannot write {}", file_name))?;
        writer
            .flush()
            .with_context(|| format!("cannot flush {}", file_name))?;
    }
    tmp.as_file()
        .sync_all()
        .with_context(|| format!("cannot sync {}", file_name))?;

    Ok(StagedFile {
        tmp,
        dest: dir.join(file_name),
    })
}

/// [`stage`] followed by [`StagedFile::commit`].
pub fn publish<F>(dir: &Path, file_name: &str, write: F) -> Result<PathBuf>
where
    F: FnOnce(&mut dyn Write) -> io::Result<()>,
{
    stage(dir, file_name, write)?.commit()
}
