// headers.rs - Common header resolution across input files

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::data::{read_headers, source_name, Header};
use crate::error::Result;

/// Name of the synthetic column holding each row's source file.
pub const PROVENANCE_COLUMN: &str = "filename";

/// Column names present in every input header, in first-file order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(transparent)]
pub struct CommonHeaderSet {
    names: Vec<String>,
}

impl CommonHeaderSet {
    pub fn new(names: Vec<String>) -> Self {
        Self { names }
    }

    /// Fold a sequence of headers into their ordered intersection
    pub fn from_headers<I>(headers: I) -> Self
    where
        I: IntoIterator<Item = Header>,
    {
        let mut intersection = HeaderIntersection::default();
        for file_headers in headers {
            intersection.add(file_headers);
        }
        intersection.finish()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    /// Output header line: the common names, then `filename` unless already present.
    pub fn output_header(&self) -> Vec<String> {
        let mut header = self.names.clone();
        if !self.contains(PROVENANCE_COLUMN) {
            header.push(PROVENANCE_COLUMN.to_string());
        }
        header
    }
}

/// Keep the elements of `running` that also occur in `other`, in `running`'s order.
///
/// Repeated names in `running` are kept as long as `other` has the name at all.
pub fn intersect_ordered(running: &[String], other: &[String]) -> Header {
    let other: HashSet<&str> = other.iter().map(String::as_str).collect();
    running
        .iter()
        .filter(|name| other.contains(name.as_str()))
        .cloned()
        .collect()
}

/// Running intersection fed one header at a time; the first header anchors the order.
#[derive(Debug, Default)]
pub struct HeaderIntersection {
    running: Option<Header>,
}

impl HeaderIntersection {
    pub fn add(&mut self, file_headers: Header) {
        self.running = Some(match self.running.take() {
            None => file_headers,
            Some(current) => intersect_ordered(&current, &file_headers),
        });
    }

    pub fn finish(self) -> CommonHeaderSet {
        CommonHeaderSet::new(self.running.unwrap_or_default())
    }
}

/// Read the header row of every file and compute the common header set.
///
/// Only one file's header is held at a time; data rows are never read.
pub fn resolve_common_headers<P: AsRef<Path>>(paths: &[P]) -> Result<CommonHeaderSet> {
    let mut intersection = HeaderIntersection::default();

    for path in paths {
        let path = path.as_ref();
        let file_headers = read_headers(path)?;
        debug!(file = %path.display(), columns = file_headers.len(), "resolving headers");
        intersection.add(file_headers);
    }

    let common = intersection.finish();
    if common.is_empty() {
        warn!(files = paths.len(), "input files share no columns; output holds only '{}'", PROVENANCE_COLUMN);
    } else {
        info!(files = paths.len(), columns = common.len(), "resolved common headers");
    }
    Ok(common)
}

/// One input file's header and what the merge drops from it.
#[derive(Debug, Clone, Serialize)]
pub struct FileHeader {
    pub path: PathBuf,
    pub name: String,
    pub headers: Header,
    pub dropped: Header,
}

/// Full header picture for a set of inputs: every file's own header plus the common set.
#[derive(Debug, Clone, Serialize)]
pub struct HeaderResolution {
    pub files: Vec<FileHeader>,
    pub common: CommonHeaderSet,
}

impl HeaderResolution {
    pub fn output_header(&self) -> Vec<String> {
        self.common.output_header()
    }
}

/// Like [`resolve_common_headers`], but keeps every file's header for reporting.
pub fn resolve_headers<P: AsRef<Path>>(paths: &[P]) -> Result<HeaderResolution> {
    let mut collected = Vec::with_capacity(paths.len());
    for path in paths {
        let path = path.as_ref();
        collected.push((path.to_path_buf(), read_headers(path)?));
    }

    let common = CommonHeaderSet::from_headers(collected.iter().map(|(_, h)| h.clone()));

    let files = collected
        .into_iter()
        .map(|(path, headers)| {
            let dropped = headers
                .iter()
                .filter(|name| !common.contains(name))
                .cloned()
                .collect();
            FileHeader {
                name: source_name(&path),
                path,
                headers,
                dropped,
            }
        })
        .collect();

    Ok(HeaderResolution { files, common })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MergeError;
    use std::fs;
    use tempfile::tempdir;

    fn header(names: &[&str]) -> Header {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_intersection_keeps_first_file_order() {
        let common = CommonHeaderSet::from_headers(vec![
            header(&["id", "name", "age", "city"]),
            header(&["city", "age", "id"]),
            header(&["zip", "id", "city", "age"]),
        ]);
        assert_eq!(common.names(), &["id", "age", "city"]);
    }

    #[test]
    fn test_intersection_invariant_under_permuting_later_files() {
        let first = header(&["c", "a", "b", "d"]);
        let second = header(&["a", "b", "c"]);
        let third = header(&["b", "c", "x"]);

        let one = CommonHeaderSet::from_headers(vec![first.clone(), second.clone(), third.clone()]);
        let two = CommonHeaderSet::from_headers(vec![first, third.clone(), second.clone()]);
        assert_eq!(one, two);
        assert_eq!(one.names(), &["c", "b"]);

        // Changing the first file changes the order.
        let three = CommonHeaderSet::from_headers(vec![second, third]);
        assert_eq!(three.names(), &["b", "c"]);
    }

    #[test]
    fn test_incremental_intersection_matches_batch_fold() {
        let headers = vec![
            header(&["id", "name", "age"]),
            header(&["age", "id"]),
            header(&["id", "age", "zip"]),
        ];

        let mut intersection = HeaderIntersection::default();
        for h in headers.clone() {
            intersection.add(h);
        }
        let common = intersection.finish();

        assert_eq!(common, CommonHeaderSet::from_headers(headers));
        assert_eq!(common.names(), &["id", "age"]);
        assert!(HeaderIntersection::default().finish().is_empty());
    }

    #[test]
    fn test_disjoint_headers_give_empty_set() {
        let common = CommonHeaderSet::from_headers(vec![header(&["a", "b"]), header(&["c"])]);
        assert!(common.is_empty());
        assert_eq!(common.output_header(), vec![PROVENANCE_COLUMN.to_string()]);
    }

    #[test]
    fn test_duplicate_names_follow_first_file() {
        let common =
            CommonHeaderSet::from_headers(vec![header(&["id", "x", "id"]), header(&["id"])]);
        assert_eq!(common.names(), &["id", "id"]);
    }

    #[test]
    fn test_output_header_does_not_repeat_filename() {
        let common = CommonHeaderSet::new(header(&["filename", "id"]));
        assert_eq!(common.output_header(), header(&["filename", "id"]));

        let common = CommonHeaderSet::new(header(&["id", "name"]));
        assert_eq!(common.output_header(), header(&["id", "name", "filename"]));
    }

    #[test]
    fn test_resolve_common_headers_from_files() {
        let dir = tempdir().unwrap();
        let a = dir.path().join("a.csv");
        let b = dir.path().join("b.csv");
        fs::write(&a, "id,name,age\n1,Ann,30\n").unwrap();
        fs::write(&b, "city,name,id\nRome,Bob,2\n").unwrap();

        let common = resolve_common_headers(&[&a, &b]).unwrap();
        assert_eq!(common.names(), &["id", "name"]);
    }

    #[test]
    fn test_resolve_fails_on_missing_and_empty_files() {
        let dir = tempdir().unwrap();
        let a = dir.path().join("a.csv");
        let empty = dir.path().join("empty.csv");
        let missing = dir.path().join("missing.csv");
        fs::write(&a, "id\n1\n").unwrap();
        fs::write(&empty, "").unwrap();

        assert!(matches!(
            resolve_common_headers(&[&a, &missing]),
            Err(MergeError::FileUnreadable { .. })
        ));
        assert!(matches!(
            resolve_common_headers(&[&a, &empty]),
            Err(MergeError::MalformedHeader { .. })
        ));
    }

    #[test]
    fn test_resolve_headers_reports_dropped_columns() {
        let dir = tempdir().unwrap();
        let a = dir.path().join("a.csv");
        let b = dir.path().join("b.csv");
        fs::write(&a, "id,name,age\n").unwrap();
        fs::write(&b, "id,name,city\n").unwrap();

        let resolution = resolve_headers(&[&a, &b]).unwrap();
        assert_eq!(resolution.common.names(), &["id", "name"]);
        assert_eq!(resolution.files[0].name, "a.csv");
        assert_eq!(resolution.files[0].dropped, header(&["age"]));
        assert_eq!(resolution.files[1].dropped, header(&["city"]));
        assert_eq!(resolution.output_header(), header(&["id", "name", "filename"]));
    }
}
