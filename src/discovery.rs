//! Input discovery for the CLI.
//!
//! Expands the paths given on the command line into the list of JSX sources
//! to compile and decides where each output goes.

use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// Extensions that may contain JSX.
const SOURCE_EXTENSIONS: &[&str] = &["jsx", "tsx"];

/// Directories never descended into.
const SKIPPED_DIRS: &[&str] = &["node_modules", "target"];

fn is_skipped_dir(entry: &DirEntry) -> bool {
    if entry.depth() == 0 || !entry.file_type().is_dir() {
        return false;
    }
    let name = entry.file_name().to_string_lossy();
    name.starts_with('.') || SKIPPED_DIRS.contains(&name.as_ref())
}

pub fn is_source_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| SOURCE_EXTENSIONS.contains(&ext))
}

/// A file to compile, with the root it was found under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: PathBuf,
    pub root: PathBuf,
}

/// Files named directly are taken as-is; directories are walked.
pub fn find_sources(inputs: &[PathBuf]) -> Vec<SourceFile> {
    let mut files = Vec::new();

    for input in inputs {
        if input.is_file() {
            let root = input.parent().map(Path::to_path_buf).unwrap_or_default();
            files.push(SourceFile {
                path: input.clone(),
                root,
            });
            continue;
        }

        let walker = WalkDir::new(input)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| !is_skipped_dir(e));
        for entry in walker.flatten() {
            let path = entry.path();
            if entry.file_type().is_file() && is_source_file(path) {
                files.push(SourceFile {
                    path: path.to_path_buf(),
                    root: input.clone(),
                });
            }
        }
    }

    files.sort_by(|a, b| a.path.cmp(&b.path));
    files.dedup_by(|a, b| a.path == b.path);
    files
}

/// `.jsx` becomes `.js`, `.tsx` becomes `.ts`.
pub fn output_extension(path: &Path) -> &'static str {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("tsx") => "ts",
        _ => "js",
    }
}

/// Output location: mirrored under `out_dir` when given, next to the
/// source otherwise.
pub fn output_path(file: &SourceFile, out_dir: Option<&Path>) -> PathBuf {
    let renamed = file.path.with_extension(output_extension(&file.path));
    match out_dir {
        Some(out_dir) => {
            let relative = renamed
                .strip_prefix(&file.root)
                .map(Path::to_path_buf)
                .unwrap_or_else(|_| renamed.file_name().map(PathBuf::from).unwrap_or_default());
            out_dir.join(relative)
        }
        None => renamed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_finds_jsx_and_tsx_only() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("components")).unwrap();
        fs::create_dir_all(root.join("node_modules/pkg")).unwrap();
        fs::write(root.join("app.jsx"), "").unwrap();
        fs::write(root.join("components/Button.tsx"), "").unwrap();
        fs::write(root.join("util.js"), "").unwrap();
        fs::write(root.join("node_modules/pkg/index.jsx"), "").unwrap();

        let files = find_sources(&[root.to_path_buf()]);
        let names: Vec<String> = files
            .iter()
            .map(|f| f.path.strip_prefix(root).unwrap().to_string_lossy().replace('\\', "/"))
            .collect();
        assert_eq!(names, vec!["app.jsx", "components/Button.tsx"]);
    }

    #[test]
    fn test_output_paths() {
        let file = SourceFile {
            path: PathBuf::from("src/ui/Button.tsx"),
            root: PathBuf::from("src"),
        };
        assert_eq!(output_path(&file, None), PathBuf::from("src/ui/Button.ts"));
        assert_eq!(
            output_path(&file, Some(Path::new("dist"))),
            PathBuf::from("dist/ui/Button.ts")
        );
    }
}
