//! Signature catalogs for filesystem and file-type identification.
//!
//! Catalogs are ordered slices, not maps: several patterns share a first byte
//! or an offset (`MZ` vs. longer magics, two TIFF byte orders, two MP3
//! framings) and matching is first-match-wins in catalog order.

use serde::Serialize;

/// Broad family of a file-type signature
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SignatureCategory {
    Filesystem,
    Executable,
    Archive,
    Document,
    Image,
    Media,
    Database,
    Encrypted,
    Script,
}

/// A magic-byte signature at a fixed offset within a candidate window
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ByteSignature {
    /// Offset of the pattern from the start of the window
    pub offset: usize,
    /// Magic bytes
    #[serde(serialize_with = "serialize_pattern")]
    pub pattern: &'static [u8],
    /// Canonical type label
    pub label: &'static str,
    pub mime_type: &'static str,
    /// Lower-case extensions (no leading dot) that are legitimate for this type
    pub known_extensions: &'static [&'static str],
    pub category: SignatureCategory,
}

impl ByteSignature {
    /// True if `data` holds this signature for a window starting at `start`
    #[inline]
    pub fn matches_at(&self, data: &[u8], start: usize) -> bool {
        let begin = start + self.offset;
        let end = begin + self.pattern.len();
        end <= data.len() && data[begin..end] == *self.pattern
    }

    /// Bytes of window required before this signature can be tested
    pub fn required_len(&self) -> usize {
        self.offset + self.pattern.len()
    }

    /// Space-separated upper-case hex of the pattern (`"4D 5A"`)
    pub fn magic_hex(&self) -> String {
        format_magic(self.pattern)
    }

    /// First known extension, or `bin` for types that declare none
    pub fn primary_extension(&self) -> &'static str {
        self.known_extensions.first().copied().unwrap_or("bin")
    }
}

/// Space-separated upper-case hex (`"4D 5A 90"`)
pub fn format_magic(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{:02X}", b))
        .collect::<Vec<_>>()
        .join(" ")
}

fn serialize_pattern<S: serde::Serializer>(pattern: &&'static [u8], s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&format_magic(pattern))
}

const fn fs(offset: usize, pattern: &'static [u8], label: &'static str, mime_type: &'static str) -> ByteSignature {
    ByteSignature {
        offset,
        pattern,
        label,
        mime_type,
        known_extensions: &[],
        category: SignatureCategory::Filesystem,
    }
}

const fn file(
    pattern: &'static [u8],
    label: &'static str,
    mime_type: &'static str,
    known_extensions: &'static [&'static str],
    category: SignatureCategory,
) -> ByteSignature {
    ByteSignature {
        offset: 0,
        pattern,
        label,
        mime_type,
        known_extensions,
        category,
    }
}

/// Volume boot record signatures, in matching order
pub static FILESYSTEM_SIGNATURES: &[ByteSignature] = &[
    fs(0x03, b"NTFS    ", "NTFS", "application/x-ntfs-volume"),
    fs(0x52, b"FAT32   ", "FAT32", "application/x-fat32-volume"),
    fs(0x36, b"FAT16   ", "FAT16", "application/x-fat16-volume"),
    fs(0x03, b"EXFAT   ", "exFAT", "application/x-exfat-volume"),
    fs(0x438, &[0x53, 0xEF], "EXT2/3/4", "application/x-ext-volume"),
];

/// File-type magic numbers, in matching order
pub static FILE_TYPE_SIGNATURES: &[ByteSignature] = &[
    // === Executables ===
    file(
        &[0x4D, 0x5A],
        "PE Executable (Windows)",
        "application/x-executable",
        &["exe", "dll", "sys", "scr", "ocx"],
        SignatureCategory::Executable,
    ),
    file(
        &[0x7F, 0x45, 0x4C, 0x46],
        "ELF Binary (Linux)",
        "application/x-elf",
        &["elf", "so", "o"],
        SignatureCategory::Executable,
    ),
    file(
        &[0xFE, 0xED, 0xFA, 0xCE],
        "Mach-O (macOS 32-bit)",
        "application/x-mach-binary",
        &["dylib"],
        SignatureCategory::Executable,
    ),
    file(
        &[0xFE, 0xED, 0xFA, 0xCF],
        "Mach-O (macOS 64-bit)",
        "application/x-mach-binary",
        &["dylib"],
        SignatureCategory::Executable,
    ),
    // === Archives ===
    file(
        &[0x50, 0x4B, 0x03, 0x04],
        "ZIP Archive",
        "application/zip",
        &["zip", "docx", "xlsx", "pptx", "jar", "apk"],
        SignatureCategory::Archive,
    ),
    file(
        &[0x52, 0x61, 0x72, 0x21, 0x1A, 0x07],
        "RAR Archive",
        "application/x-rar",
        &["rar"],
        SignatureCategory::Archive,
    ),
    file(
        &[0x37, 0x7A, 0xBC, 0xAF, 0x27, 0x1C],
        "7-Zip Archive",
        "application/x-7z-compressed",
        &["7z"],
        SignatureCategory::Archive,
    ),
    file(
        &[0x1F, 0x8B],
        "GZIP Archive",
        "application/gzip",
        &["gz", "tgz"],
        SignatureCategory::Archive,
    ),
    file(
        &[0x42, 0x5A, 0x68],
        "BZIP2 Archive",
        "application/x-bzip2",
        &["bz2"],
        SignatureCategory::Archive,
    ),
    // === Documents ===
    file(
        b"%PDF",
        "PDF Document",
        "application/pdf",
        &["pdf"],
        SignatureCategory::Document,
    ),
    file(
        b"{\\rtf",
        "RTF Document",
        "application/rtf",
        &["rtf"],
        SignatureCategory::Document,
    ),
    file(
        &[0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1],
        "OLE Compound Document",
        "application/x-ole-storage",
        &["doc", "xls", "ppt", "msg"],
        SignatureCategory::Document,
    ),
    // === Images ===
    file(
        &[0xFF, 0xD8, 0xFF],
        "JPEG Image",
        "image/jpeg",
        &["jpg", "jpeg"],
        SignatureCategory::Image,
    ),
    file(
        &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A],
        "PNG Image",
        "image/png",
        &["png"],
        SignatureCategory::Image,
    ),
    file(b"GIF8", "GIF Image", "image/gif", &["gif"], SignatureCategory::Image),
    file(b"BM", "BMP Image", "image/bmp", &["bmp"], SignatureCategory::Image),
    file(
        &[0x49, 0x49, 0x2A, 0x00],
        "TIFF Image (LE)",
        "image/tiff",
        &["tif", "tiff"],
        SignatureCategory::Image,
    ),
    file(
        &[0x4D, 0x4D, 0x00, 0x2A],
        "TIFF Image (BE)",
        "image/tiff",
        &["tif", "tiff"],
        SignatureCategory::Image,
    ),
    // === Media ===
    file(&[0xFF, 0xFB], "MP3 Audio", "audio/mpeg", &["mp3"], SignatureCategory::Media),
    file(b"ID3", "MP3 Audio (ID3)", "audio/mpeg", &["mp3"], SignatureCategory::Media),
    file(
        b"RIFF",
        "RIFF Container",
        "application/octet-stream",
        &["avi", "wav"],
        SignatureCategory::Media,
    ),
    // === Databases ===
    file(
        b"SQLite",
        "SQLite Database",
        "application/x-sqlite3",
        &["db", "sqlite", "sqlite3"],
        SignatureCategory::Database,
    ),
    // === Encryption ===
    file(
        &[0x4C, 0x55, 0x4B, 0x53, 0xBA, 0xBE],
        "LUKS Encrypted",
        "application/x-luks",
        &[],
        SignatureCategory::Encrypted,
    ),
    // === Scripts ===
    // Shebang files legitimately carry any extension (or none)
    file(
        b"#!/",
        "Shell Script",
        "text/x-shellscript",
        &[],
        SignatureCategory::Script,
    ),
];

/// Per-position lookup structure over a catalog.
///
/// Offset-0 signatures are bucketed by their first pattern byte; signatures
/// with a non-zero offset are probed separately. Both lists hold catalog
/// indices in ascending order so the lowest-index match can be chosen.
#[derive(Debug, Clone)]
pub struct SignatureIndex {
    catalog: &'static [ByteSignature],
    first_byte: Vec<Vec<usize>>,
    offset_sigs: Vec<usize>,
    max_required: usize,
}

impl SignatureIndex {
    pub fn new(catalog: &'static [ByteSignature]) -> Self {
        let mut first_byte = vec![Vec::new(); 256];
        let mut offset_sigs = Vec::new();

        for (i, sig) in catalog.iter().enumerate() {
            if sig.offset == 0 && !sig.pattern.is_empty() {
                first_byte[sig.pattern[0] as usize].push(i);
            } else {
                offset_sigs.push(i);
            }
        }

        let max_required = catalog.iter().map(|s| s.required_len()).max().unwrap_or(0);

        Self {
            catalog,
            first_byte,
            offset_sigs,
            max_required,
        }
    }

    pub fn catalog(&self) -> &'static [ByteSignature] {
        self.catalog
    }

    /// Longest window any catalog entry needs
    pub fn max_required_len(&self) -> usize {
        self.max_required
    }

    /// The first catalog entry (by catalog order) matching a window that
    /// starts at `pos` in `data`
    pub fn match_at(&self, data: &[u8], pos: usize) -> Option<&'static ByteSignature> {
        if pos >= data.len() {
            return None;
        }

        let catalog = self.catalog;
        let fast = self.first_byte[data[pos] as usize]
            .iter()
            .copied()
            .find(|&i| catalog[i].matches_at(data, pos));
        let slow = self
            .offset_sigs
            .iter()
            .copied()
            .find(|&i| catalog[i].matches_at(data, pos));

        match (fast, slow) {
            (Some(a), Some(b)) => Some(&catalog[a.min(b)]),
            (Some(i), None) | (None, Some(i)) => Some(&catalog[i]),
            (None, None) => None,
        }
    }
}
