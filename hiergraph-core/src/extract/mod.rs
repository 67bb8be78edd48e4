//! Type extraction: source files → [`TypeRecord`]s.
//!
//! Files are parsed in parallel with one tree-sitter parser per rayon worker.
//! The collected records are re-sorted by source path so the resulting
//! universe order (and therefore name resolution) does not depend on thread
//! scheduling.

mod csharp;
mod scope;

pub use csharp::{looks_like_interface, normalize_type_name, reclassify_supertypes, CSharpExtractor};
pub use scope::ScopePath;

use rayon::prelude::*;
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::{debug, warn};

use crate::error::{HierError, HierResult, IoResultExt};
use crate::model::TypeRecord;

/// Maximum file size to parse (10 MB).
const MAX_FILE_SIZE: usize = 10_000_000;

/// Result of extracting a single file.
#[derive(Debug)]
pub enum ParseOutcome {
    /// Types declared in the file (possibly none)
    Ok(PathBuf, Vec<TypeRecord>),
    /// File could not be used (logged, skipped)
    Skipped(PathBuf, String),
}

/// Read and extract one file with an existing extractor.
pub fn extract_file(extractor: &mut CSharpExtractor, path: &Path, strict: bool) -> ParseOutcome {
    let content = match fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => return ParseOutcome::Skipped(path.to_path_buf(), format!("I/O error: {}", e)),
    };

    if content.len() > MAX_FILE_SIZE {
        return ParseOutcome::Skipped(
            path.to_path_buf(),
            format!("File too large ({} bytes, max {})", content.len(), MAX_FILE_SIZE),
        );
    }

    match extractor.extract(path, &content, strict) {
        Ok(types) => ParseOutcome::Ok(path.to_path_buf(), types),
        Err(e) => ParseOutcome::Skipped(path.to_path_buf(), e.to_string()),
    }
}

/// Extract types from in-memory source, keeping partial results on syntax
/// errors.
pub fn extract_types(path: &Path, content: &str) -> HierResult<Vec<TypeRecord>> {
    CSharpExtractor::new()?.extract(path, content, false)
}

/// Extract types from in-memory source, failing on any syntax error.
pub fn extract_types_strict(path: &Path, content: &str) -> HierResult<Vec<TypeRecord>> {
    CSharpExtractor::new()?.extract(path, content, true)
}

/// Extract every type declared in `files`.
///
/// Unreadable, oversized and (when `strict`) syntactically broken files are
/// logged and skipped. The output is ordered by file path, then by
/// declaration order within each file, and base-list entries of classes are
/// reclassified against the extracted set.
pub fn parse_sources(files: &[PathBuf], strict: bool) -> HierResult<Vec<TypeRecord>> {
    // Fail early on a broken grammar rather than once per worker.
    drop(CSharpExtractor::new()?);

    let mut per_file: Vec<(PathBuf, Vec<TypeRecord>)> = files
        .par_iter()
        .map_init(
            CSharpExtractor::new,
            |extractor, file| match extractor {
                Ok(extractor) => extract_file(extractor, file, strict),
                Err(e) => ParseOutcome::Skipped(file.clone(), e.to_string()),
            },
        )
        .filter_map(|outcome| match outcome {
            ParseOutcome::Ok(path, types) => Some((path, types)),
            ParseOutcome::Skipped(path, reason) => {
                warn!(file = %path.display(), reason = %reason, "skipping source file");
                None
            }
        })
        .collect();

    per_file.sort_by(|a, b| a.0.cmp(&b.0));

    let mut records: Vec<TypeRecord> = per_file.into_iter().flat_map(|(_, types)| types).collect();
    reclassify_supertypes(&mut records);

    debug!(files = files.len(), types = records.len(), "extraction finished");
    Ok(records)
}

/// Load previously extracted records from a JSON array of [`TypeRecord`].
pub fn load_types_json(path: &Path) -> HierResult<Vec<TypeRecord>> {
    let content = fs::read_to_string(path).with_path(path)?;
    serde_json::from_str(&content)
        .map_err(|e| HierError::parse_at(path, format!("invalid type list: {}", e), e.line()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TypeKind;
    use std::sync::atomic::{AtomicU64, Ordering};

    static TEST_COUNTER: AtomicU64 = AtomicU64::new(0);

    fn temp_dir() -> PathBuf {
        let id = TEST_COUNTER.fetch_add(1, Ordering::SeqCst);
        let dir = std::env::temp_dir().join(format!(
            "hiergraph_extract_test_{}_{}",
            std::process::id(),
            id
        ));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_extract_types_in_memory() {
        let types = extract_types(
            Path::new("Player.cs"),
            "namespace Game { public class Player : Base { } }",
        )
        .unwrap();
        assert_eq!(types.len(), 1);
        assert_eq!(types[0].full_name, "Game.Player");
    }

    #[test]
    fn test_strict_in_memory_rejects_broken_source() {
        let result = extract_types_strict(Path::new("Broken.cs"), "class {");
        assert!(result.is_err());
    }

    #[test]
    fn test_extract_file_missing() {
        let mut extractor = CSharpExtractor::new().unwrap();
        let outcome = extract_file(&mut extractor, Path::new("/nonexistent/Nope.cs"), true);
        assert!(matches!(outcome, ParseOutcome::Skipped(_, _)));
    }

    #[test]
    fn test_parse_sources_ordered_by_path() {
        let dir = temp_dir();
        fs::write(dir.join("b.cs"), "class B : A { }").unwrap();
        fs::write(dir.join("a.cs"), "class A { }").unwrap();
        fs::write(dir.join("c.cs"), "class C : B { }\nclass D : C { }").unwrap();

        let files = vec![dir.join("c.cs"), dir.join("a.cs"), dir.join("b.cs")];
        let types = parse_sources(&files, true).unwrap();
        let names: Vec<&str> = types.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B", "C", "D"]);

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_parse_sources_skips_broken_files_when_strict() {
        let dir = temp_dir();
        fs::write(dir.join("good.cs"), "class Good { }").unwrap();
        fs::write(dir.join("bad.cs"), "class Bad : { void (").unwrap();

        let files = vec![dir.join("good.cs"), dir.join("bad.cs")];
        let strict = parse_sources(&files, true).unwrap();
        assert_eq!(strict.len(), 1);
        assert_eq!(strict[0].name, "Good");

        let lenient = parse_sources(&files, false).unwrap();
        assert!(lenient.iter().any(|t| t.name == "Good"));

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_parse_sources_reclassifies_across_files() {
        let dir = temp_dir();
        fs::write(dir.join("a.cs"), "interface Damageable { }").unwrap();
        fs::write(dir.join("b.cs"), "class Crate : Damageable { }").unwrap();

        let files = vec![dir.join("a.cs"), dir.join("b.cs")];
        let types = parse_sources(&files, true).unwrap();
        let crate_type = types.iter().find(|t| t.name == "Crate").unwrap();
        assert!(crate_type.base_types.is_empty());
        assert_eq!(crate_type.interfaces, vec!["Damageable"]);
        assert_eq!(types[0].kind, TypeKind::Interface);

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_load_types_json() {
        let dir = temp_dir();
        let path = dir.join("types.json");
        fs::write(
            &path,
            r#"[{"name":"Base","fullName":"Game.Base","namespace":"Game","kind":"class"},
               {"name":"Player","fullName":"Game.Player","kind":"class","baseTypes":["Base"]}]"#,
        )
        .unwrap();
        let types = load_types_json(&path).unwrap();
        assert_eq!(types.len(), 2);
        assert_eq!(types[1].base_types, vec!["Base"]);

        fs::write(&path, "{not json").unwrap();
        assert!(matches!(load_types_json(&path), Err(HierError::Parse { .. })));

        let _ = fs::remove_dir_all(&dir);
    }
}
