//! Archive owner resolution from jar manifests.

use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use ktbuild_core::{JarOwner, LabelResolver};
use zip::result::ZipError;
use zip::ZipArchive;

const MANIFEST_PATH: &str = "META-INF/MANIFEST.MF";
const TARGET_LABEL: &str = "Target-Label";
const INJECTING_RULE_KIND: &str = "Injecting-Rule-Kind";

/// Reads `Target-Label` and `Injecting-Rule-Kind` from jar manifests.
///
/// Relative archive paths resolve against the execution root.
#[derive(Debug, Clone)]
pub struct ManifestResolver {
    root: PathBuf,
}

impl ManifestResolver {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn read_manifest(&self, path: &Path) -> io::Result<Option<String>> {
        let file = File::open(path)?;
        let mut archive = ZipArchive::new(file).map_err(zip_error)?;
        let mut entry = match archive.by_name(MANIFEST_PATH) {
            Ok(entry) => entry,
            Err(ZipError::FileNotFound) => return Ok(None),
            Err(e) => return Err(zip_error(e)),
        };

        let mut manifest = String::new();
        entry.read_to_string(&mut manifest)?;
        Ok(Some(manifest))
    }
}

impl LabelResolver for ManifestResolver {
    fn resolve(&self, archive: &str) -> io::Result<JarOwner> {
        let owner = JarOwner::unknown(archive);
        let Some(manifest) = self.read_manifest(&self.root.join(archive))? else {
            return Ok(owner);
        };

        let attributes = main_attributes(&manifest);
        let mut owner = match find(&attributes, TARGET_LABEL) {
            Some(label) => owner.with_label(label),
            None => owner,
        };
        if let Some(kind) = find(&attributes, INJECTING_RULE_KIND) {
            owner = owner.with_rule_kind(kind);
        }
        Ok(owner)
    }
}

fn zip_error(e: ZipError) -> io::Error {
    match e {
        ZipError::Io(e) => e,
        other => io::Error::new(io::ErrorKind::InvalidData, other),
    }
}

fn find<'a>(attributes: &'a [(String, String)], name: &str) -> Option<&'a str> {
    attributes
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| value.as_str())
}

/// Parse the main section of a manifest into `(name, value)` pairs.
///
/// Lines starting with a single space continue the previous value. The main
/// section ends at the first blank line.
fn main_attributes(manifest: &str) -> Vec<(String, String)> {
    let mut attributes: Vec<(String, String)> = Vec::new();

    for line in manifest.lines() {
        if line.is_empty() {
            break;
        }
        if let Some(continuation) = line.strip_prefix(' ') {
            if let Some((_, value)) = attributes.last_mut() {
                value.push_str(continuation);
            }
            continue;
        }
        if let Some((name, value)) = line.split_once(':') {
            attributes.push((name.trim().to_string(), value.trim_start().to_string()));
        }
    }

    attributes
}
