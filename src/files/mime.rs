//! MIME type detection.
//!
//! Resolution order, first match wins:
//! 1. Extension table (`mime_guess`), memoized per extension
//! 2. Signature sniffing on the first [`SNIFF_LEN`] bytes
//! 3. [`DEFAULT_MIME`]

use std::path::Path;

use dashmap::DashMap;
use tokio::io::AsyncReadExt;

use crate::files::error::ServeError;

/// Fallback when neither the extension nor the content identify the file.
pub const DEFAULT_MIME: &str = "text/plain";

/// Number of leading bytes inspected when sniffing.
pub const SNIFF_LEN: usize = 20;

/// A binary signature: every `(offset, magic)` part must match.
struct Signature {
    mime: &'static str,
    parts: &'static [(usize, &'static [u8])],
}

const fn sig(mime: &'static str, parts: &'static [(usize, &'static [u8])]) -> Signature {
    Signature { mime, parts }
}

// Order matters where one signature is a prefix of another (ftyp brands).
static SIGNATURES: &[Signature] = &[
    sig("image/png", &[(0, b"\x89PNG\r\n\x1a\n")]),
    sig("image/jpeg", &[(0, b"\xff\xd8\xff")]),
    sig("image/gif", &[(0, b"GIF87a")]),
    sig("image/gif", &[(0, b"GIF89a")]),
    sig("image/webp", &[(0, b"RIFF"), (8, b"WEBP")]),
    sig("audio/wav", &[(0, b"RIFF"), (8, b"WAVE")]),
    sig("video/x-msvideo", &[(0, b"RIFF"), (8, b"AVI ")]),
    sig("image/avif", &[(4, b"ftypavif")]),
    sig("image/heic", &[(4, b"ftypheic")]),
    sig("video/quicktime", &[(4, b"ftypqt  ")]),
    sig("video/mp4", &[(4, b"ftyp")]),
    sig("image/x-icon", &[(0, b"\x00\x00\x01\x00")]),
    sig("image/tiff", &[(0, b"II*\x00")]),
    sig("image/tiff", &[(0, b"MM\x00*")]),
    sig("image/vnd.adobe.photoshop", &[(0, b"8BPS")]),
    sig("image/bmp", &[(0, b"BM")]),
    sig("application/pdf", &[(0, b"%PDF-")]),
    sig("application/zip", &[(0, b"PK\x03\x04")]),
    sig("application/gzip", &[(0, b"\x1f\x8b\x08")]),
    sig("application/x-bzip2", &[(0, b"BZh")]),
    sig("application/x-xz", &[(0, b"\xfd7zXZ\x00")]),
    sig("application/x-7z-compressed", &[(0, b"7z\xbc\xaf\x27\x1c")]),
    sig("application/x-rar-compressed", &[(0, b"Rar!\x1a\x07")]),
    sig("application/wasm", &[(0, b"\x00asm")]),
    sig("application/x-elf", &[(0, b"\x7fELF")]),
    sig("application/x-sqlite3", &[(0, b"SQLite format 3\x00")]),
    sig("audio/ogg", &[(0, b"OggS")]),
    sig("audio/x-flac", &[(0, b"fLaC")]),
    sig("audio/mpeg", &[(0, b"ID3")]),
    sig("audio/midi", &[(0, b"MThd")]),
    sig("font/woff", &[(0, b"wOFF")]),
    sig("font/woff2", &[(0, b"wOF2")]),
    sig("font/otf", &[(0, b"OTTO")]),
    sig("font/ttf", &[(0, b"\x00\x01\x00\x00\x00")]),
];

/// Match the leading bytes of a file against known binary signatures.
pub fn sniff(head: &[u8]) -> Option<&'static str> {
    SIGNATURES
        .iter()
        .find(|sig| {
            sig.parts
                .iter()
                .all(|&(offset, magic)| head.get(offset..offset + magic.len()) == Some(magic))
        })
        .map(|sig| sig.mime)
}

/// Resolves the `Content-Type` of files on disk.
///
/// Only extension-table hits are memoized; sniffed types depend on file
/// content and are recomputed per request.
#[derive(Debug, Default)]
pub struct MimeResolver {
    by_extension: DashMap<String, &'static str>,
}

impl MimeResolver {
    /// Create a resolver with an empty extension cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve the MIME type of `path`.
    ///
    /// Opens the file only when the extension is unknown. A read failure is
    /// returned as a [`ServeError`], never masked by the default type.
    pub async fn resolve(&self, path: &Path) -> Result<&'static str, ServeError> {
        if let Some(mime) = self.lookup_extension(path) {
            return Ok(mime);
        }

        let head = read_head(path).await?;
        let mime = sniff(&head).unwrap_or(DEFAULT_MIME);
        tracing::trace!(path = %path.display(), mime, "MIME resolved by content");
        Ok(mime)
    }

    /// Number of memoized extensions.
    pub fn cached_extensions(&self) -> usize {
        self.by_extension.len()
    }

    fn lookup_extension(&self, path: &Path) -> Option<&'static str> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();

        if let Some(mime) = self.by_extension.get(&ext) {
            return Some(*mime);
        }

        let mime = mime_guess::from_ext(&ext).first_raw()?;
        self.by_extension.insert(ext, mime);
        Some(mime)
    }
}

/// Read at most [`SNIFF_LEN`] bytes. The handle is dropped on every path.
async fn read_head(path: &Path) -> Result<Vec<u8>, ServeError> {
    let file = tokio::fs::File::open(path)
        .await
        .map_err(|e| ServeError::io(path, e))?;

    let mut head = Vec::with_capacity(SNIFF_LEN);
    file.take(SNIFF_LEN as u64)
        .read_to_end(&mut head)
        .await
        .map_err(|e| ServeError::io(path, e))?;

    Ok(head)
}
