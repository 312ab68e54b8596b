use anyhow::{Context, Result};
use glob::glob;

/// Expands each argument as a glob pattern, keeping argument order.
/// An argument that matches nothing is kept as a literal name.
pub fn expand(patterns: &[String]) -> Result<Vec<String>> {
    let mut inputs = Vec::new();

    for pattern in patterns {
        let mut matched = false;
        for entry in glob(pattern).with_context(|| format!("invalid input pattern {}", pattern))? {
            let path = entry.with_context(|| format!("cannot read match of {}", pattern))?;
            if path.is_file() {
                inputs.push(path.to_string_lossy().to_string());
                matched = true;
            }
        }
        if !matched {
            inputs.push(pattern.clone());
        }
    }

    Ok(inputs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn expands_patterns_in_order() {
        let tmp = tempfile::tempdir().unwrap();
        for name in ["pg-b.txt", "pg-a.txt", "notes.md"] {
            fs::write(tmp.path().join(name), "x").unwrap();
        }
        let dir = tmp.path().to_string_lossy().to_string();

        let inputs = expand(&[format!("{}/notes.md", dir), format!("{}/pg-*.txt", dir)]).unwrap();

        assert_eq!(
            inputs,
            vec![
                format!("{}/notes.md", dir),
                format!("{}/pg-a.txt", dir),
                format!("{}/pg-b.txt", dir),
            ]
        );
    }

    #[test]
    fn unmatched_argument_is_kept_verbatim() {
        let inputs = expand(&["/no/such/input-*.txt".to_string()]).unwrap();
        assert_eq!(inputs, vec!["/no/such/input-*.txt"]);
    }

    #[test]
    fn bad_pattern_is_an_error() {
        assert!(expand(&["[".to_string()]).is_err());
    }
}
