//! # Input Resolution
//!
//! Merges the inline comma-separated IP list with the optional input file into
//! one ordered, deduplicated sequence of targets. The inline list comes first;
//! duplicates keep their first occurrence.

use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::Path;

/// Resolves the target IP list from the configured sources.
///
/// File lines starting with `#` are comments; blank entries are dropped.
/// A missing file is silently skipped, but an existing file that cannot be
/// read is an error.
pub fn resolve_targets(inline: &str, file: Option<&Path>) -> io::Result<Vec<String>> {
    let mut ips: Vec<String> = inline
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();

    if let Some(path) = file {
        if path.is_file() {
            let content = fs::read_to_string(path)?;
            for line in content.lines() {
                let v = line.trim();
                if !v.is_empty() && !v.starts_with('#') {
                    ips.push(v.to_string());
                }
            }
        }
    }

    let mut seen = HashSet::new();
    ips.retain(|ip| seen.insert(ip.clone()));
    Ok(ips)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    #[test]
    fn test_dedupe_preserves_first_seen_order() {
        let ips = resolve_targets("1.1.1.1, 1.1.1.1 ,2.2.2.2", None).unwrap();
        assert_eq!(ips, vec!["1.1.1.1", "2.2.2.2"]);
    }

    #[test]
    fn test_empty_inline_list_resolves_to_nothing() {
        assert!(resolve_targets("", None).unwrap().is_empty());
        assert!(resolve_targets(" , ,", None).unwrap().is_empty());
    }

    #[test]
    fn test_missing_file_is_skipped() {
        let ips =
            resolve_targets("3.3.3.3", Some(Path::new("/nonexistent/greywire-ips.txt"))).unwrap();
        assert_eq!(ips, vec!["3.3.3.3"]);
    }

    #[test]
    fn test_file_lines_follow_inline_entries() {
        let path = env::temp_dir().join(format!("greywire-targets-{}.txt", std::process::id()));
        fs::write(&path, "# comment line\n\n 2.2.2.2 \n1.1.1.1\n3.3.3.3\n").unwrap();

        let ips = resolve_targets("1.1.1.1", Some(&path)).unwrap();
        assert_eq!(ips, vec!["1.1.1.1", "2.2.2.2", "3.3.3.3"]);

        fs::remove_file(&path).unwrap();
    }
}
