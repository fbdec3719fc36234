use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Extension of the source files the engine cares about.
pub const SOURCE_EXTENSION: &str = "uc";

/// Text encodings the engine recognizes. UnrealScript trees routinely mix
/// plain UTF-8 files with UTF-16LE files written by the native editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    Utf8,
    Utf16Le,
}

/// BOM sniff on the first two bytes: `EF BB` is UTF-8, `FF FE` is UTF-16LE,
/// anything else defaults to UTF-8.
pub fn detect_encoding(path: &Path) -> Result<Encoding> {
    let mut file =
        fs::File::open(path).with_context(|| format!("cannot open {}", path.display()))?;
    let mut bom = [0u8; 2];
    let read = file
        .read(&mut bom)
        .with_context(|| format!("cannot read {}", path.display()))?;
    Ok(sniff_bom(&bom[..read]))
}

fn sniff_bom(bom: &[u8]) -> Encoding {
    match bom {
        [0xef, 0xbb, ..] => Encoding::Utf8,
        [0xff, 0xfe, ..] => Encoding::Utf16Le,
        _ => Encoding::Utf8,
    }
}

/// Read a whole source file in its detected encoding.
pub fn read_source(path: &Path) -> Result<String> {
    let bytes = fs::read(path).with_context(|| format!("cannot read {}", path.display()))?;
    Ok(decode(&bytes))
}

fn decode(bytes: &[u8]) -> String {
    match sniff_bom(bytes) {
        Encoding::Utf16Le => {
            let payload = &bytes[2..];
            let units: Vec<u16> = payload
                .chunks_exact(2)
                .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
                .collect();
            String::from_utf16_lossy(&units)
        }
        Encoding::Utf8 => {
            let text = String::from_utf8_lossy(bytes);
            text.strip_prefix('\u{feff}').map(str::to_owned).unwrap_or_else(|| text.into_owned())
        }
    }
}

/// Recursively collect every `.uc` file under `root`. A missing directory is
/// an error: it means the workspace is misconfigured, not empty.
pub fn walk_source_files(root: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    collect_files(root, &mut files)?;
    Ok(files)
}

fn collect_files(dir: &Path, out: &mut Vec<PathBuf>) -> Result<()> {
    let entries =
        fs::read_dir(dir).with_context(|| format!("cannot read directory {}", dir.display()))?;
    for entry in entries {
        let entry = entry.with_context(|| format!("cannot read entry in {}", dir.display()))?;
        let path = entry.path();
        let kind = entry
            .file_type()
            .with_context(|| format!("cannot stat {}", path.display()))?;
        if kind.is_dir() {
            collect_files(&path, out)?;
        } else if kind.is_file()
            && path
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case(SOURCE_EXTENSION))
        {
            out.push(path);
        }
    }
    Ok(())
}
