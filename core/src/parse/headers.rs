use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::symbol::ClassHeader;

static CLASS_EXTENDS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)class\s+\w+\s+extends\s+(\w+)").expect("class header regex"));

/// Base declarations that mark a root class with no parent.
const ROOT_DECLARATIONS: [&str; 4] =
    ["class array", "class class", "class hiddenfunctions", "class object"];

/// Extract a file's class header without parsing its body.
///
/// Lines accumulate into the stored documentation until `class X extends Y`
/// matches; the class name comes from the file's base name, not the matched
/// identifier, to tolerate header/file-name mismatches. A non-comment line
/// declaring one of the built-in bases yields a root class with no parent.
/// A file with neither is not a class and is skipped.
pub fn collect_header(path: &Path, text: &str) -> Option<ClassHeader> {
    let mut documentation = String::new();

    for line in text.lines() {
        documentation.push_str(line);
        documentation.push('\n');

        if let Some(captures) = CLASS_EXTENDS_RE.captures(&documentation) {
            return Some(ClassHeader {
                name: class_name_from_path(path),
                parent_name: captures[1].to_lowercase(),
                documentation,
                file: path.to_path_buf(),
            });
        }

        let trimmed = line.trim();
        let is_comment = trimmed.starts_with('*') || trimmed.starts_with('/');
        if !is_comment {
            let lower = line.to_lowercase();
            if ROOT_DECLARATIONS.iter().any(|decl| lower.contains(decl)) {
                return Some(ClassHeader {
                    name: class_name_from_path(path),
                    parent_name: String::new(),
                    documentation,
                    file: path.to_path_buf(),
                });
            }
        }
    }
    None
}

/// `.../Classes/PlayerPawn.uc` -> `PlayerPawn`.
pub fn class_name_from_path(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy())
        .map(|name| name.split('.').next().unwrap_or("").to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn extracts_parent_from_extends_clause() {
        let path = PathBuf::from("/src/Game/Classes/PlayerPawn.uc");
        let text = "/** a pawn */\nclass PlayerPawn extends Pawn\n    config(Game);\n";
        let header = collect_header(&path, text).unwrap();
        assert_eq!(header.name, "PlayerPawn");
        assert_eq!(header.parent_name, "pawn");
        assert!(header.documentation.contains("/** a pawn */"));
    }

    #[test]
    fn class_name_comes_from_file_not_header() {
        // Header identifier and file name disagree; the file wins.
        let path = PathBuf::from("/src/RenamedPawn.uc");
        let header = collect_header(&path, "class OldPawn extends Pawn;\n").unwrap();
        assert_eq!(header.name, "RenamedPawn");
    }

    #[test]
    fn extends_clause_may_span_lines() {
        let path = PathBuf::from("/src/Thing.uc");
        let header = collect_header(&path, "class Thing\n    extends Actor;\n").unwrap();
        assert_eq!(header.parent_name, "actor");
    }

    #[test]
    fn builtin_base_without_extends_is_root() {
        let path = PathBuf::from("/src/Object.uc");
        let header = collect_header(&path, "// the root\nclass Object\n    native;\n").unwrap();
        assert_eq!(header.parent_name, "");
    }

    #[test]
    fn builtin_base_inside_comment_does_not_count() {
        let path = PathBuf::from("/src/Notes.uc");
        // Only comment lines mention a base declaration.
        assert!(collect_header(&path, "// class Object is the root\n// see docs\n").is_none());
    }

    #[test]
    fn file_without_class_line_is_skipped() {
        let path = PathBuf::from("/src/Readme.uc");
        assert!(collect_header(&path, "just some text\nno declarations\n").is_none());
    }
}
