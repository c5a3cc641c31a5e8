//! Loading and saving plain text files
//!
//! Documents never touch the filesystem directly; the session goes through a
//! [`FileIo`] implementation so tests can substitute failing or in-memory backends.

use anyhow::{anyhow, Context, Result};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Line ending format used in the file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineEnding {
    /// Unix/Linux/Mac format (\n)
    #[default]
    LF,
    /// Windows format (\r\n)
    CRLF,
    /// Old Mac format (\r)
    CR,
}

impl LineEnding {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LF => "\n",
            Self::CRLF => "\r\n",
            Self::CR => "\r",
        }
    }

    /// Get the display name for status bar
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::LF => "LF",
            Self::CRLF => "CRLF",
            Self::CR => "CR",
        }
    }

    /// Detect the line ending format from a sample of bytes
    ///
    /// Uses majority voting over the first 8KB: counts CRLF, LF-only and CR-only
    /// occurrences and returns the most common format. Ties go to LF.
    pub fn detect(bytes: &[u8]) -> Self {
        let sample = &bytes[..bytes.len().min(8 * 1024)];

        let mut crlf_count = 0;
        let mut lf_only_count = 0;
        let mut cr_only_count = 0;

        let mut i = 0;
        while i < sample.len() {
            match sample[i] {
                b'\r' if sample.get(i + 1) == Some(&b'\n') => {
                    crlf_count += 1;
                    i += 1;
                }
                b'\r' => cr_only_count += 1,
                b'\n' => lf_only_count += 1,
                _ => {}
            }
            i += 1;
        }

        if crlf_count > lf_only_count && crlf_count > cr_only_count {
            Self::CRLF
        } else if cr_only_count > lf_only_count && cr_only_count > crlf_count {
            Self::CR
        } else {
            Self::LF
        }
    }
}

/// Character encoding a file was decoded with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextEncoding {
    #[default]
    Utf8,
    /// Fallback for files that are not valid UTF-8. Every byte maps to the
    /// code point of the same value, so unedited bytes are written back unchanged.
    Latin1,
}

impl TextEncoding {
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Utf8 => "UTF-8",
            Self::Latin1 => "Latin-1",
        }
    }

    /// Decode file bytes, falling back to Latin-1 when they are not UTF-8
    pub fn decode(bytes: Vec<u8>) -> (String, Self) {
        match String::from_utf8(bytes) {
            Ok(text) => (text, Self::Utf8),
            Err(e) => {
                let text = e.into_bytes().into_iter().map(char::from).collect();
                (text, Self::Latin1)
            }
        }
    }

    pub fn encode(&self, text: &str) -> Result<Vec<u8>> {
        match self {
            Self::Utf8 => Ok(text.as_bytes().to_vec()),
            Self::Latin1 => text
                .chars()
                .map(|ch| {
                    u8::try_from(ch).map_err(|_| {
                        anyhow!("'{}' (U+{:04X}) cannot be saved as Latin-1", ch, ch as u32)
                    })
                })
                .collect(),
        }
    }
}

/// How a document's rows are joined back into file bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TextFormat {
    pub line_ending: LineEnding,
    /// Whether the last row is followed by a line ending
    pub trailing_newline: bool,
    pub encoding: TextEncoding,
}

/// Result of loading a file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedFile {
    pub lines: Vec<String>,
    pub format: TextFormat,
    /// File extension without the dot, if any
    pub extension: Option<String>,
}

impl LoadedFile {
    /// Split UTF-8 text into rows
    pub fn from_text(text: &str, extension: Option<String>) -> Self {
        Self::split(text, TextEncoding::Utf8, extension)
    }

    /// Decode raw file bytes and split them into rows
    pub fn from_bytes(bytes: Vec<u8>, extension: Option<String>) -> Self {
        let (text, encoding) = TextEncoding::decode(bytes);
        Self::split(&text, encoding, extension)
    }

    /// Rows end only at the detected line ending; any other `\r` stays in the
    /// row text. A row never holds `\n`, so when the detected ending would leave
    /// one behind the text is split on `\n` alone.
    fn split(text: &str, encoding: TextEncoding, extension: Option<String>) -> Self {
        let line_ending = match LineEnding::detect(text.as_bytes()) {
            LineEnding::CRLF if has_lone_lf(text) => LineEnding::LF,
            LineEnding::CR if text.contains('\n') => LineEnding::LF,
            detected => detected,
        };
        let terminator = line_ending.as_str();
        let trailing_newline = text.ends_with(terminator);
        let body = text.strip_suffix(terminator).unwrap_or(text);

        Self {
            lines: body.split(terminator).map(str::to_string).collect(),
            format: TextFormat {
                line_ending,
                trailing_newline,
                encoding,
            },
            extension,
        }
    }
}

fn has_lone_lf(text: &str) -> bool {
    let bytes = text.as_bytes();
    bytes
        .iter()
        .enumerate()
        .any(|(i, &b)| b == b'\n' && (i == 0 || bytes[i - 1] != b'\r'))
}

/// Join rows with the given format
pub fn join_lines<'a>(lines: impl IntoIterator<Item = &'a str>, format: TextFormat) -> String {
    let mut text = String::new();
    for (i, line) in lines.into_iter().enumerate() {
        if i > 0 {
            text.push_str(format.line_ending.as_str());
        }
        text.push_str(line);
    }
    if format.trailing_newline {
        text.push_str(format.line_ending.as_str());
    }
    text
}

/// File access used by the session
pub trait FileIo {
    fn load(&self, path: &Path) -> Result<LoadedFile>;

    /// Write the rows to `path`. Either the whole file is replaced or an error is returned.
    fn save(&self, path: &Path, lines: &[&str], format: TextFormat) -> Result<()>;
}

/// [`FileIo`] backed by the local filesystem
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFileIo;

impl LocalFileIo {
    pub fn new() -> Self {
        Self
    }

    /// Create a temporary file next to `dest_path` so it can be renamed over it.
    /// Falls back to the system temp directory when the directory is not writable.
    fn create_temp_file(dest_path: &Path) -> io::Result<(PathBuf, std::fs::File)> {
        let same_dir_temp = dest_path.with_extension("ember-tmp");
        match std::fs::File::create(&same_dir_temp) {
            Ok(file) => Ok((same_dir_temp, file)),
            Err(e) if e.kind() == io::ErrorKind::PermissionDenied => {
                let file_name = dest_path
                    .file_name()
                    .unwrap_or_else(|| std::ffi::OsStr::new("ember-save"));
                let temp_path = std::env::temp_dir().join(format!(
                    "{}-{}.tmp",
                    file_name.to_string_lossy(),
                    std::process::id()
                ));
                let file = std::fs::File::create(&temp_path)?;
                Ok((temp_path, file))
            }
            Err(e) => Err(e),
        }
    }
}

impl FileIo for LocalFileIo {
    fn load(&self, path: &Path) -> Result<LoadedFile> {
        let bytes =
            std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
        let extension = path
            .extension()
            .map(|ext| ext.to_string_lossy().into_owned());
        let loaded = LoadedFile::from_bytes(bytes, extension);
        if loaded.format.encoding != TextEncoding::Utf8 {
            tracing::debug!(
                "{} is not valid UTF-8, decoded as {}",
                path.display(),
                loaded.format.encoding.display_name()
            );
        }
        Ok(loaded)
    }

    fn save(&self, path: &Path, lines: &[&str], format: TextFormat) -> Result<()> {
        let text = join_lines(lines.iter().copied(), format);
        let bytes = format
            .encoding
            .encode(&text)
            .with_context(|| format!("Failed to encode {}", path.display()))?;
        let (temp_path, mut out_file) = Self::create_temp_file(path)
            .with_context(|| format!("Failed to create temporary file for {}", path.display()))?;

        let written = out_file
            .write_all(&bytes)
            .and_then(|()| out_file.sync_all());
        drop(out_file);

        if let Err(e) = written.and_then(|()| std::fs::rename(&temp_path, path)) {
            let _ = std::fs::remove_file(&temp_path);
            return Err(e).with_context(|| format!("Failed to write {}", path.display()));
        }
        tracing::debug!("Saved {} bytes to {}", bytes.len(), path.display());
        Ok(())
    }
}
