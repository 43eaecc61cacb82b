//! File classification
//!
//! Decides whether a file is inlined as text or described by type:
//! - byte sniffing for binary content
//! - SVG is never inlined even though its bytes are text
//! - extensions from the known-type table bypass the byte check

use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Text files above this size are replaced by a placeholder (5 MiB)
pub const MAX_TEXT_FILE_SIZE: u64 = 5 * 1024 * 1024;

/// Number of leading bytes inspected by the binary sniffer
const SNIFF_LEN: usize = 8192;

/// Share of control bytes above which a non-UTF-8 sample counts as binary
const SUSPICIOUS_RATIO: f64 = 0.1;

/// Extension-derived file type label
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    Image,
    SvgImage,
    WebAssembly,
    Pdf,
    WordDocument,
    ExcelSpreadsheet,
    PowerPointPresentation,
    CompressedArchive,
    Executable,
    DynamicLinkLibrary,
    SharedObject,
    DynamicLibrary,
    Binary,
}

impl FileType {
    /// Look up the type from a path's extension (case-insensitive).
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            "jpg" | "jpeg" | "png" | "gif" | "bmp" | "webp" => FileType::Image,
            "svg" => FileType::SvgImage,
            "wasm" => FileType::WebAssembly,
            "pdf" => FileType::Pdf,
            "doc" | "docx" => FileType::WordDocument,
            "xls" | "xlsx" => FileType::ExcelSpreadsheet,
            "ppt" | "pptx" => FileType::PowerPointPresentation,
            "zip" | "rar" | "7z" => FileType::CompressedArchive,
            "exe" => FileType::Executable,
            "dll" => FileType::DynamicLinkLibrary,
            "so" => FileType::SharedObject,
            "dylib" => FileType::DynamicLibrary,
            _ => FileType::Binary,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            FileType::Image => "Image",
            FileType::SvgImage => "SVG Image",
            FileType::WebAssembly => "WebAssembly",
            FileType::Pdf => "PDF",
            FileType::WordDocument => "Word Document",
            FileType::ExcelSpreadsheet => "Excel Spreadsheet",
            FileType::PowerPointPresentation => "PowerPoint Presentation",
            FileType::CompressedArchive => "Compressed Archive",
            FileType::Executable => "Executable",
            FileType::DynamicLinkLibrary => "Dynamic-link Library",
            FileType::SharedObject => "Shared Object",
            FileType::DynamicLibrary => "Dynamic Library",
            FileType::Binary => "Binary",
        }
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// How a file should be represented in the output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    /// Bytes look like text and the file is not an SVG
    pub is_text: bool,
    /// Extension is in the known-type table (SVG included)
    pub treat_as_binary: bool,
    pub file_type: FileType,
}

impl Classification {
    /// Inline as a fenced code block
    pub fn renders_as_text(&self) -> bool {
        self.is_text && !self.treat_as_binary
    }
}

/// Classify the file at `path`.
pub fn classify(path: &Path) -> std::io::Result<Classification> {
    let file_type = FileType::from_path(path);
    let is_svg = file_type == FileType::SvgImage;
    let is_text = !is_svg && !is_binary_file(path)?;

    Ok(Classification {
        is_text,
        treat_as_binary: file_type != FileType::Binary,
        file_type,
    })
}

/// Sniff the leading bytes of a file for binary content.
pub fn is_binary_file(path: &Path) -> std::io::Result<bool> {
    let mut buffer = Vec::with_capacity(SNIFF_LEN);
    File::open(path)?
        .take(SNIFF_LEN as u64)
        .read_to_end(&mut buffer)?;
    Ok(is_binary_content(&buffer))
}

/// Binary heuristic over a byte sample.
pub fn is_binary_content(sample: &[u8]) -> bool {
    if sample.is_empty() {
        return false;
    }
    if sample.contains(&0) {
        return true;
    }

    match std::str::from_utf8(sample) {
        Ok(_) => return false,
        // Only the trailing character was cut by the sample boundary
        Err(e) if e.error_len().is_none() => return false,
        Err(_) => {}
    }

    let suspicious = sample
        .iter()
        .filter(|&&b| b < 0x20 && !matches!(b, b'\n' | b'\r' | b'\t' | 0x0c | 0x1b | 0x08))
        .count();
    suspicious as f64 / sample.len() as f64 > SUSPICIOUS_RATIO
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_file_type_table() {
        assert_eq!(FileType::from_path(Path::new("a/logo.PNG")), FileType::Image);
        assert_eq!(FileType::from_path(Path::new("icon.svg")), FileType::SvgImage);
        assert_eq!(FileType::from_path(Path::new("lib.so")), FileType::SharedObject);
        assert_eq!(FileType::from_path(Path::new("data.bin")), FileType::Binary);
        assert_eq!(FileType::from_path(Path::new("Makefile")), FileType::Binary);
    }

    #[test]
    fn test_labels() {
        assert_eq!(FileType::SvgImage.to_string(), "SVG Image");
        assert_eq!(FileType::DynamicLinkLibrary.label(), "Dynamic-link Library");
        assert_eq!(FileType::Binary.label(), "Binary");
    }

    #[test]
    fn test_is_binary_content() {
        assert!(!is_binary_content(b""));
        assert!(!is_binary_content(b"plain text\n"));
        assert!(!is_binary_content("héllo wörld".as_bytes()));
        assert!(is_binary_content(&[0x00, 0x01, 0x02, 0x03]));
        assert!(is_binary_content(&[0xFF, 0x01, 0x02, 0x03, 0x04, 0x05]));
    }

    #[test]
    fn test_is_binary_content_cut_utf8_char() {
        // "é" is two bytes; drop the last one
        let bytes = "abcé".as_bytes();
        assert!(!is_binary_content(&bytes[..bytes.len() - 1]));
    }

    #[test]
    fn test_latin1_text_is_not_binary() {
        // Invalid UTF-8 but no control bytes
        assert!(!is_binary_content(b"caf\xe9 cr\xe8me"));
    }

    #[test]
    fn test_classify_text_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("main.rs");
        fs::write(&path, "fn main() {}\n").unwrap();

        let c = classify(&path).unwrap();
        assert!(c.is_text);
        assert!(!c.treat_as_binary);
        assert!(c.renders_as_text());
        assert_eq!(c.file_type, FileType::Binary);
    }

    #[test]
    fn test_classify_svg_is_never_text() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("icon.svg");
        fs::write(&path, "<svg xmlns=\"http://www.w3.org/2000/svg\"></svg>").unwrap();

        let c = classify(&path).unwrap();
        assert!(!c.is_text);
        assert!(c.treat_as_binary);
        assert!(!c.renders_as_text());
        assert_eq!(c.file_type, FileType::SvgImage);
    }

    #[test]
    fn test_classify_typed_extension_bypasses_sniffing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("module.wasm");
        fs::write(&path, "(module)").unwrap();

        let c = classify(&path).unwrap();
        assert!(c.is_text);
        assert!(c.treat_as_binary);
        assert!(!c.renders_as_text());
    }

    #[test]
    fn test_classify_missing_file_errors() {
        assert!(classify(Path::new("/nonexistent/file.txt")).is_err());
    }
}
