//! Params-file expansion.

use std::fs;
use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;

use crate::error::WorkError;

static FLAGFILE: OnceLock<Regex> = OnceLock::new();

fn flagfile_pattern() -> &'static Regex {
    FLAGFILE.get_or_init(|| {
        Regex::new(r"^--flagfile=((.*)-(\d+)\.params)$").expect("flagfile pattern is valid")
    })
}

/// Replace a leading `--flagfile=<base>-<N>.params` argument with the
/// lines of that file.
///
/// Relative paths resolve against `root`. Any other argument list is
/// returned unchanged.
pub fn expand_flagfile(args: &[String], root: &Path) -> Result<Vec<String>, WorkError> {
    let Some(path) = args
        .first()
        .and_then(|first| flagfile_pattern().captures(first))
        .and_then(|caps| caps.get(1))
    else {
        return Ok(args.to_vec());
    };

    let path = root.join(path.as_str());
    let content = fs::read_to_string(&path).map_err(|e| WorkError::file(&path, e))?;
    Ok(content.lines().map(str::to_string).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(args: &[&str]) -> Vec<String> {
        args.iter().map(|a| a.to_string()).collect()
    }

    #[test]
    fn test_flagfile_replaces_arguments() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("foo-3.params"),
            "--target_label\n//pkg:lib\n--classpath\na.jar\n",
        )
        .unwrap();

        let expanded = expand_flagfile(&args(&["--flagfile=foo-3.params", "ignored"]), dir.path()).unwrap();
        assert_eq!(
            expanded,
            args(&["--target_label", "//pkg:lib", "--classpath", "a.jar"])
        );
    }

    #[test]
    fn test_plain_arguments_are_kept() {
        let dir = tempfile::tempdir().unwrap();
        let plain = args(&["--target_label", "//pkg:lib"]);
        assert_eq!(expand_flagfile(&plain, dir.path()).unwrap(), plain);
        assert!(expand_flagfile(&[], dir.path()).unwrap().is_empty());
    }

    #[test]
    fn test_flagfile_must_lead() {
        let dir = tempfile::tempdir().unwrap();
        let later = args(&["--output", "--flagfile=foo-3.params"]);
        assert_eq!(expand_flagfile(&later, dir.path()).unwrap(), later);
    }

    #[test]
    fn test_non_params_flagfile_is_not_expanded() {
        let dir = tempfile::tempdir().unwrap();
        let other = args(&["--flagfile=foo.txt"]);
        assert_eq!(expand_flagfile(&other, dir.path()).unwrap(), other);
    }

    #[test]
    fn test_missing_flagfile() {
        let dir = tempfile::tempdir().unwrap();
        let err = expand_flagfile(&args(&["--flagfile=gone-1.params"]), dir.path()).unwrap_err();
        assert!(matches!(err, WorkError::File { .. }));
    }
}
