use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};

use crate::app::{reduce_all, MapReduceApp};
use crate::files;

/// Runs the whole job in this process and writes a single output file.
///
/// Same line format as the distributed output, so the concatenation of all
/// `mr-out-*` files sorted by line equals this file sorted by line.
/// Returns the number of distinct keys written.
pub fn run(app: &dyn MapReduceApp, inputs: &[String], output: &Path) -> Result<usize> {
    let mut pairs = Vec::new();
    for input in inputs {
        let bytes = fs::read(input).with_context(|| format!("cannot read input {}", input))?;
        pairs.extend(app.map(input, &String::from_utf8_lossy(&bytes)));
    }

    let reduced = reduce_all(app, pairs);

    let dir = output
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    let name = output
        .file_name()
        .and_then(|n| n.to_str())
        .with_context(|| format!("invalid output path {}", output.display()))?;

    files::publish(&dir, name, |w| {
        for kv in &reduced {
            writeln!(w, "{} {}", kv.key, kv.value)?;
        }
        Ok(())
    })?;

    Ok(reduced.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::app_by_name;

    #[test]
    fn word_count_over_two_records() {
        let tmp = tempfile::tempdir().unwrap();
        let a = tmp.path().join("a.txt");
        let b = tmp.path().join("b.txt");
        fs::write(&a, "a b a").unwrap();
        fs::write(&b, "b c").unwrap();

        let inputs = vec![
            a.to_string_lossy().to_string(),
            b.to_string_lossy().to_string(),
        ];
        let output = tmp.path().join("mr-correct-wc.txt");
        let app = app_by_name("wc").unwrap();

        let keys = run(app.as_ref(), &inputs, &output).unwrap();

        assert_eq!(keys, 3);
        assert_eq!(fs::read_to_string(&output).unwrap(), "a 2\nb 2\nc 1\n");
    }

    #[test]
    fn non_utf8_input_is_mapped_lossily() {
        let tmp = tempfile::tempdir().unwrap();
        let input = tmp.path().join("latin1.txt");
        fs::write(&input, b"caf\xe9 bar bar").unwrap();
        let output = tmp.path().join("out.txt");
        let app = app_by_name("wc").unwrap();

        run(app.as_ref(), &[input.to_string_lossy().to_string()], &output).unwrap();

        assert_eq!(fs::read_to_string(&output).unwrap(), "bar 2\ncaf 1\n");
    }

    #[test]
    fn missing_input_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let output = tmp.path().join("out.txt");
        let app = app_by_name("wc").unwrap();

        let res = run(app.as_ref(), &["/definitely/not/here.txt".to_string()], &output);

        assert!(res.is_err());
        assert!(!output.exists());
    }
}
