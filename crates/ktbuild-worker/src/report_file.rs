//! Reading and writing dependency report files.

use std::fs;
use std::path::Path;

use ktbuild_core::DependencyReport;
use ktbuild_proto::{decode_report, encode_report};

use crate::error::WorkError;

/// Read a binary dependency report.
pub fn read_report(path: &Path) -> Result<DependencyReport, WorkError> {
    let bytes = fs::read(path).map_err(|e| WorkError::file(path, e))?;
    decode_report(&bytes).map_err(|source| WorkError::Report {
        path: path.to_path_buf(),
        source,
    })
}

/// Write a binary dependency report, replacing any existing file.
pub fn write_report(path: &Path, report: &DependencyReport) -> Result<(), WorkError> {
    fs::write(path, encode_report(report)).map_err(|e| WorkError::file(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ktbuild_core::DependencyKind;

    #[test]
    fn test_written_report_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lib.jdeps");
        let report = DependencyReport::new("//pkg:lib")
            .with_success(true)
            .with_dependency("a.jar", DependencyKind::Explicit)
            .with_dependency("b.jar", DependencyKind::Unused);

        write_report(&path, &report).unwrap();
        assert_eq!(read_report(&path).unwrap(), report);
    }

    #[test]
    fn test_garbage_is_report_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.jdeps");
        fs::write(&path, [0xff, 0xff, 0xff]).unwrap();

        assert!(matches!(read_report(&path), Err(WorkError::Report { .. })));
    }

    #[test]
    fn test_missing_report_is_file_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_report(&dir.path().join("missing.jdeps")).unwrap_err();
        assert!(matches!(err, WorkError::File { .. }));
    }
}
