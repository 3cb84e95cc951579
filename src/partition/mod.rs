//! MBR partition table parsing.
//!
//! Reads the classic four-slot table at offset 0x1BE of sector 0. Images
//! without a 0x55AA boot signature (raw filesystem dumps, GPT-only media
//! with a wiped protective MBR) yield an empty table rather than an error.

use serde::{Deserialize, Serialize};

use crate::error::{ForensicError, Result};
use crate::source::ByteSource;

pub const SECTOR_SIZE: usize = 512;

/// Offset of the first partition slot
pub const PARTITION_TABLE_OFFSET: usize = 0x1BE;

/// Size of one partition slot
pub const PARTITION_ENTRY_SIZE: usize = 16;

/// Little-endian value of the 55 AA boot signature at offset 510
pub const BOOT_SIGNATURE: u16 = 0xAA55;

/// Status byte marking a bootable partition
pub const ACTIVE_FLAG: u8 = 0x80;

/// MBR type codes reserved for hidden partitions
pub const HIDDEN_PARTITION_TYPES: [u8; 7] = [0x11, 0x14, 0x16, 0x17, 0x1B, 0x1C, 0x1E];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PartitionStatus {
    Active,
    Hidden,
    Inactive,
}

/// One non-empty slot of an MBR partition table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartitionEntry {
    /// Slot number, 1..=4
    pub index: u8,
    pub type_code: u8,
    /// Raw status byte
    pub status_flag: u8,
    pub start_sector: u32,
    pub size_sectors: u32,
    pub filesystem_guess: String,
    pub hidden: bool,
    pub status: PartitionStatus,
    /// Human-readable MBR type name
    pub type_name: String,
}

impl PartitionEntry {
    /// Decode a 16-byte slot; `None` for empty slots
    fn from_slot(index: u8, slot: &[u8]) -> Option<Self> {
        let status_flag = slot[0];
        let type_code = slot[4];
        let start_sector = u32::from_le_bytes([slot[8], slot[9], slot[10], slot[11]]);
        let size_sectors = u32::from_le_bytes([slot[12], slot[13], slot[14], slot[15]]);

        if type_code == 0 || size_sectors == 0 {
            return None;
        }

        let hidden = is_hidden_type(type_code);
        let status = if status_flag == ACTIVE_FLAG {
            PartitionStatus::Active
        } else if hidden {
            PartitionStatus::Hidden
        } else {
            PartitionStatus::Inactive
        };

        Some(Self {
            index,
            type_code,
            status_flag,
            start_sector,
            size_sectors,
            filesystem_guess: filesystem_for_type(type_code).to_string(),
            hidden,
            status,
            type_name: type_name(type_code),
        })
    }

    /// Last sector covered by the partition (inclusive)
    pub fn end_sector(&self) -> u64 {
        self.start_sector as u64 + self.size_sectors as u64 - 1
    }

    pub fn size_bytes(&self) -> u64 {
        self.size_sectors as u64 * SECTOR_SIZE as u64
    }

    pub fn start_offset(&self) -> u64 {
        self.start_sector as u64 * SECTOR_SIZE as u64
    }
}

pub fn is_hidden_type(type_code: u8) -> bool {
    HIDDEN_PARTITION_TYPES.contains(&type_code)
}

/// Map an MBR type code to the filesystem it normally carries
pub fn filesystem_for_type(type_code: u8) -> &'static str {
    match type_code {
        0x07 | 0x17 => "NTFS",
        0x0B | 0x0C | 0x1B | 0x1C => "FAT32",
        0x04 | 0x06 | 0x0E | 0x14 | 0x16 | 0x1E => "FAT16",
        0x83 => "EXT4",
        0x82 => "Linux Swap",
        0xEE => "GPT",
        0xEF => "EFI",
        _ => "Unknown",
    }
}

/// Full MBR type name, e.g. `Hidden FAT32 (LBA)`
pub fn type_name(type_code: u8) -> String {
    let name = match type_code {
        0x00 => "Empty",
        0x01 => "FAT12",
        0x04 => "FAT16 (<32MB)",
        0x05 => "Extended",
        0x06 => "FAT16 (>32MB)",
        0x07 => "NTFS/exFAT",
        0x0B => "FAT32 (CHS)",
        0x0C => "FAT32 (LBA)",
        0x0E => "FAT16 (LBA)",
        0x0F => "Extended (LBA)",
        0x11 => "Hidden FAT12",
        0x14 => "Hidden FAT16 (<32MB)",
        0x16 => "Hidden FAT16 (>32MB)",
        0x17 => "Hidden NTFS",
        0x1B => "Hidden FAT32",
        0x1C => "Hidden FAT32 (LBA)",
        0x1E => "Hidden FAT16 (LBA)",
        0x82 => "Linux Swap",
        0x83 => "Linux",
        0xEE => "GPT Protective",
        0xEF => "EFI System",
        other => return format!("Unknown (0x{:02x})", other),
    };
    name.to_string()
}

/// Parse the partition table of an in-memory sector 0.
///
/// Fails with [`ForensicError::TooSmall`] below 512 bytes; a missing boot
/// signature yields an empty list.
pub fn parse_mbr_sector(sector: &[u8]) -> Result<Vec<PartitionEntry>> {
    if sector.len() < SECTOR_SIZE {
        return Err(ForensicError::TooSmall {
            needed: SECTOR_SIZE as u64,
            available: sector.len() as u64,
        });
    }

    let signature = u16::from_le_bytes([sector[510], sector[511]]);
    if signature != BOOT_SIGNATURE {
        tracing::debug!(signature = %format!("{:#06x}", signature), "No MBR boot signature");
        return Ok(Vec::new());
    }

    let partitions = (0..4u8)
        .filter_map(|i| {
            let start = PARTITION_TABLE_OFFSET + i as usize * PARTITION_ENTRY_SIZE;
            PartitionEntry::from_slot(i + 1, &sector[start..start + PARTITION_ENTRY_SIZE])
        })
        .collect::<Vec<_>>();

    tracing::debug!(count = partitions.len(), "Parsed MBR partition table");
    Ok(partitions)
}

/// Read sector 0 of `image` and parse its partition table
pub fn parse_mbr(image: &dyn ByteSource) -> Result<Vec<PartitionEntry>> {
    let sector = image.read_range(0, SECTOR_SIZE)?;
    parse_mbr_sector(&sector)
}

/// Like [`parse_mbr`], but a source shorter than one sector is an empty table
pub fn partitions_or_empty(image: &dyn ByteSource) -> Result<Vec<PartitionEntry>> {
    match parse_mbr(image) {
        Err(ForensicError::TooSmall { available, .. }) => {
            tracing::debug!(available, "Image smaller than one sector, no partition table");
            Ok(Vec::new())
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MemorySource;

    fn mbr_with(slots: &[(usize, u8, u8, u32, u32)]) -> Vec<u8> {
        let mut mbr = vec![0u8; 512];
        for &(slot, status, type_code, start, size) in slots {
            let off = PARTITION_TABLE_OFFSET + slot * PARTITION_ENTRY_SIZE;
            mbr[off] = status;
            mbr[off + 4] = type_code;
            mbr[off + 8..off + 12].copy_from_slice(&start.to_le_bytes());
            mbr[off + 12..off + 16].copy_from_slice(&size.to_le_bytes());
        }
        mbr[510] = 0x55;
        mbr[511] = 0xAA;
        mbr
    }

    #[test]
    fn test_single_ntfs_partition() {
        let mbr = mbr_with(&[(0, 0x80, 0x07, 2048, 1_000_000)]);
        let parts = parse_mbr(&MemorySource::new(mbr)).unwrap();

        assert_eq!(parts.len(), 1);
        let p = &parts[0];
        assert_eq!(p.index, 1);
        assert_eq!(p.filesystem_guess, "NTFS");
        assert_eq!(p.start_sector, 2048);
        assert_eq!(p.size_sectors, 1_000_000);
        assert_eq!(p.status, PartitionStatus::Active);
        assert!(!p.hidden);
        assert_eq!(p.type_name, "NTFS/exFAT");
        assert_eq!(p.end_sector(), 2048 + 1_000_000 - 1);
        assert_eq!(p.size_bytes(), 512_000_000);
    }

    #[test]
    fn test_no_signature_is_empty() {
        let parts = parse_mbr(&MemorySource::new(vec![0u8; 512])).unwrap();
        assert!(parts.is_empty());
    }

    #[test]
    fn test_too_small() {
        let err = parse_mbr(&MemorySource::new(vec![0u8; 100])).unwrap_err();
        assert!(matches!(
            err,
            ForensicError::TooSmall {
                needed: 512,
                available: 100
            }
        ));

        let parts = partitions_or_empty(&MemorySource::new(vec![0u8; 100])).unwrap();
        assert!(parts.is_empty());
    }

    #[test]
    fn test_empty_slots_skipped_and_order_kept() {
        let mbr = mbr_with(&[
            (0, 0x00, 0x0C, 63, 4096),
            (1, 0x00, 0x00, 8192, 100), // type 0
            (2, 0x00, 0x83, 8192, 0),   // size 0
            (3, 0x00, 0x1B, 16384, 2048),
        ]);
        let parts = parse_mbr_sector(&mbr).unwrap();

        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0].index, 1);
        assert_eq!(parts[0].filesystem_guess, "FAT32");
        assert_eq!(parts[0].status, PartitionStatus::Inactive);
        assert_eq!(parts[1].index, 4);
        assert!(parts[1].hidden);
        assert_eq!(parts[1].status, PartitionStatus::Hidden);
        assert_eq!(parts[1].type_name, "Hidden FAT32");
    }

    #[test]
    fn test_active_wins_over_hidden() {
        let mbr = mbr_with(&[(0, 0x80, 0x17, 2048, 10)]);
        let parts = parse_mbr_sector(&mbr).unwrap();
        assert!(parts[0].hidden);
        assert_eq!(parts[0].status, PartitionStatus::Active);
    }

    #[test]
    fn test_type_lookups() {
        assert_eq!(filesystem_for_type(0xEE), "GPT");
        assert_eq!(filesystem_for_type(0x42), "Unknown");
        assert_eq!(type_name(0x42), "Unknown (0x42)");
        assert_eq!(type_name(0xEF), "EFI System");
        for code in HIDDEN_PARTITION_TYPES {
            assert!(is_hidden_type(code));
        }
        assert!(!is_hidden_type(0x07));
    }

    #[test]
    fn test_serializes_camel_case() {
        let mbr = mbr_with(&[(0, 0x80, 0x07, 2048, 1000)]);
        let parts = parse_mbr_sector(&mbr).unwrap();
        let json = serde_json::to_value(&parts[0]).unwrap();
        assert_eq!(json["startSector"], 2048);
        assert_eq!(json["filesystemGuess"], "NTFS");
        assert_eq!(json["status"], "ACTIVE");
    }
}
