//! Text/binary classification by content sniffing.
//!
//! The sniffer walks a signature table modelled on the WHATWG MIME sniffing
//! algorithm and falls back to a plain-text check. A file counts as text only
//! when the detected media type's top-level category is `text`, so PDFs and
//! PostScript are binary even though their headers are ASCII.

use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::trace;

/// Number of leading bytes inspected per file.
pub const SNIFF_LEN: usize = 512;

pub const OCTET_STREAM: &str = "application/octet-stream";
const TEXT_PLAIN: &str = "text/plain; charset=utf-8";
const TEXT_HTML: &str = "text/html; charset=utf-8";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileClass {
    Text,
    Binary,
}

enum Signature {
    /// Case-insensitive tag prefix after leading whitespace, followed by a
    /// space or `>`.
    Html(&'static [u8]),
    Masked {
        mask: &'static [u8],
        pattern: &'static [u8],
        skip_whitespace: bool,
        media_type: &'static str,
    },
    Exact(&'static [u8], &'static str),
    Mp4,
    Text,
}

const RIFF_MASK: &[u8] = b"\xFF\xFF\xFF\xFF\x00\x00\x00\x00\xFF\xFF\xFF\xFF";

const SIGNATURES: &[Signature] = &[
    Signature::Html(b"<!DOCTYPE HTML"),
    Signature::Html(b"<HTML"),
    Signature::Html(b"<HEAD"),
    Signature::Html(b"<SCRIPT"),
    Signature::Html(b"<IFRAME"),
    Signature::Html(b"<H1"),
    Signature::Html(b"<DIV"),
    Signature::Html(b"<FONT"),
    Signature::Html(b"<TABLE"),
    Signature::Html(b"<A"),
    Signature::Html(b"<STYLE"),
    Signature::Html(b"<TITLE"),
    Signature::Html(b"<B"),
    Signature::Html(b"<BODY"),
    Signature::Html(b"<BR"),
    Signature::Html(b"<P"),
    Signature::Html(b"<!--"),
    Signature::Masked {
        mask: b"\xFF\xFF\xFF\xFF\xFF",
        pattern: b"<?xml",
        skip_whitespace: true,
        media_type: "text/xml; charset=utf-8",
    },
    Signature::Exact(b"%PDF-", "application/pdf"),
    Signature::Exact(b"%!PS-Adobe-", "application/postscript"),
    // Byte-order marks.
    Signature::Exact(b"\xFE\xFF", "text/plain; charset=utf-16be"),
    Signature::Exact(b"\xFF\xFE", "text/plain; charset=utf-16le"),
    Signature::Exact(b"\xEF\xBB\xBF", TEXT_PLAIN),
    // Images.
    Signature::Exact(b"\x00\x00\x01\x00", "image/x-icon"),
    Signature::Exact(b"\x00\x00\x02\x00", "image/x-icon"),
    Signature::Exact(b"BM", "image/bmp"),
    Signature::Exact(b"GIF87a", "image/gif"),
    Signature::Exact(b"GIF89a", "image/gif"),
    Signature::Masked {
        mask: b"\xFF\xFF\xFF\xFF\x00\x00\x00\x00\xFF\xFF\xFF\xFF\xFF\xFF",
        pattern: b"RIFF\x00\x00\x00\x00WEBPVP",
        skip_whitespace: false,
        media_type: "image/webp",
    },
    Signature::Exact(b"\x89PNG\x0D\x0A\x1A\x0A", "image/png"),
    Signature::Exact(b"\xFF\xD8\xFF", "image/jpeg"),
    // Audio and video.
    Signature::Masked {
        mask: RIFF_MASK,
        pattern: b"FORM\x00\x00\x00\x00AIFF",
        skip_whitespace: false,
        media_type: "audio/aiff",
    },
    Signature::Exact(b"ID3", "audio/mpeg"),
    Signature::Exact(b"OggS\x00", "application/ogg"),
    Signature::Exact(b"MThd\x00\x00\x00\x06", "audio/midi"),
    Signature::Masked {
        mask: RIFF_MASK,
        pattern: b"RIFF\x00\x00\x00\x00AVI ",
        skip_whitespace: false,
        media_type: "video/avi",
    },
    Signature::Masked {
        mask: RIFF_MASK,
        pattern: b"RIFF\x00\x00\x00\x00WAVE",
        skip_whitespace: false,
        media_type: "audio/wave",
    },
    Signature::Mp4,
    Signature::Exact(b"\x1A\x45\xDF\xA3", "video/webm"),
    // Fonts.
    Signature::Exact(b"\x00\x01\x00\x00", "font/ttf"),
    Signature::Exact(b"OTTO", "font/otf"),
    Signature::Exact(b"ttcf", "font/collection"),
    Signature::Exact(b"wOFF", "font/woff"),
    Signature::Exact(b"wOF2", "font/woff2"),
    // Archives and executables.
    Signature::Exact(b"\x1F\x8B\x08", "application/x-gzip"),
    Signature::Exact(b"PK\x03\x04", "application/zip"),
    Signature::Exact(b"Rar!\x1A\x07\x00", "application/x-rar-compressed"),
    Signature::Exact(b"Rar!\x1A\x07\x01\x00", "application/x-rar-compressed"),
    Signature::Exact(b"\x00\x61\x73\x6D", "application/wasm"),
    Signature::Text,
];

fn is_whitespace(b: u8) -> bool {
    matches!(b, b'\t' | b'\n' | b'\x0C' | b'\r' | b' ')
}

fn is_binary_byte(b: u8) -> bool {
    matches!(b, 0x00..=0x08 | 0x0B | 0x0E..=0x1A | 0x1C..=0x1F)
}

impl Signature {
    fn sniff(&self, data: &[u8], first_non_ws: usize) -> Option<&'static str> {
        match self {
            Signature::Html(tag) => {
                let data = &data[first_non_ws..];
                if data.len() < tag.len() + 1 {
                    return None;
                }
                let prefix_matches = tag.iter().zip(data).all(|(&t, &d)| {
                    if t.is_ascii_uppercase() {
                        d & 0xDF == t
                    } else {
                        d == t
                    }
                });
                match data[tag.len()] {
                    b' ' | b'>' if prefix_matches => Some(TEXT_HTML),
                    _ => None,
                }
            }
            Signature::Masked {
                mask,
                pattern,
                skip_whitespace,
                media_type,
            } => {
                let data = if *skip_whitespace {
                    &data[first_non_ws..]
                } else {
                    data
                };
                if data.len() < pattern.len() {
                    return None;
                }
                pattern
                    .iter()
                    .zip(mask.iter())
                    .zip(data)
                    .all(|((&p, &m), &d)| d & m == p)
                    .then_some(*media_type)
            }
            Signature::Exact(prefix, media_type) => data.starts_with(prefix).then_some(*media_type),
            Signature::Mp4 => is_mp4(data).then_some("video/mp4"),
            Signature::Text => (!data[first_non_ws..].iter().any(|&b| is_binary_byte(b)))
                .then_some(TEXT_PLAIN),
        }
    }
}

fn is_mp4(data: &[u8]) -> bool {
    if data.len() < 12 {
        return false;
    }
    let box_size = u32::from_be_bytes([data[0], data[1], data[2], data[3]]) as usize;
    if data.len() < box_size || box_size % 4 != 0 || &data[4..8] != b"ftyp" {
        return false;
    }
    // Brands start at offset 8; offset 12 holds the minor version.
    (8..box_size)
        .step_by(4)
        .filter(|&offset| offset != 12)
        .any(|offset| &data[offset..offset + 3] == b"mp4")
}

/// Detects the media type of a byte sample. Only the first [`SNIFF_LEN`]
/// bytes are considered. An empty sample has nothing to sniff and reports
/// [`OCTET_STREAM`].
pub fn sniff_media_type(sample: &[u8]) -> &'static str {
    let data = &sample[..sample.len().min(SNIFF_LEN)];
    if data.is_empty() {
        return OCTET_STREAM;
    }

    let first_non_ws = data
        .iter()
        .position(|&b| !is_whitespace(b))
        .unwrap_or(data.len());

    SIGNATURES
        .iter()
        .find_map(|signature| signature.sniff(data, first_non_ws))
        .unwrap_or(OCTET_STREAM)
}

pub fn is_text_media_type(media_type: &str) -> bool {
    media_type.split('/').next() == Some("text")
}

pub fn classify_sample(sample: &[u8]) -> FileClass {
    if is_text_media_type(sniff_media_type(sample)) {
        FileClass::Text
    } else {
        FileClass::Binary
    }
}

/// Classifies a file from its first [`SNIFF_LEN`] bytes. Any failure to open
/// or read the file classifies it as binary.
pub fn classify_file(path: &Path) -> FileClass {
    let mut sample = Vec::with_capacity(SNIFF_LEN);
    let read = File::open(path).and_then(|file| file.take(SNIFF_LEN as u64).read_to_end(&mut sample));

    match read {
        Ok(_) => classify_sample(&sample),
        Err(e) => {
            trace!("Treating {} as binary, sample read failed: {}", path.display(), e);
            FileClass::Binary
        }
    }
}

