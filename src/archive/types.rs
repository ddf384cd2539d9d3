//! Field types packed into the entry header octets.
//!
//! Every value here lives at a fixed byte position in the header and is
//! extracted arithmetically — the on-disk layout never relies on how the
//! compiler would pack a struct.

use core::fmt;

/// The eight Amiga protection flags, from the least significant bit:
/// deletable, executable, writable, readable, archived, pure, script,
/// hidden.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProtectionBits {
    raw: u8,
}

impl ProtectionBits {
    pub fn from_raw(raw: u8) -> Self {
        Self { raw }
    }

    pub fn raw(&self) -> u8 {
        self.raw
    }

    pub fn is_deletable(&self) -> bool {
        self.raw & 0x01 != 0
    }

    pub fn is_executable(&self) -> bool {
        self.raw & 0x02 != 0
    }

    pub fn is_writable(&self) -> bool {
        self.raw & 0x04 != 0
    }

    pub fn is_readable(&self) -> bool {
        self.raw & 0x08 != 0
    }

    pub fn is_archived(&self) -> bool {
        self.raw & 0x10 != 0
    }

    pub fn is_pure(&self) -> bool {
        self.raw & 0x20 != 0
    }

    pub fn is_script(&self) -> bool {
        self.raw & 0x40 != 0
    }

    pub fn is_hidden(&self) -> bool {
        self.raw & 0x80 != 0
    }
}

impl fmt::Display for ProtectionBits {
    /// The traditional eight-column listing form, `hsparwed`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let columns = [
            (self.is_hidden(), 'h'),
            (self.is_script(), 's'),
            (self.is_pure(), 'p'),
            (self.is_archived(), 'a'),
            (self.is_readable(), 'r'),
            (self.is_writable(), 'w'),
            (self.is_executable(), 'e'),
            (self.is_deletable(), 'd'),
        ];
        for (set, letter) in columns {
            f.write_fmt(format_args!("{}", if set { letter } else { '-' }))?;
        }
        Ok(())
    }
}

/// Packed archive timestamp, decoded from 32 big-endian bits.
///
/// From the least significant bit: seconds (6), minutes (6), hours (5),
/// year (6, biased 1970), month (4), day (5).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateStamp {
    raw: u32,
}

impl DateStamp {
    const SHIFT_SECONDS: u32 = 0;
    const SHIFT_MINUTES: u32 = 6;
    const SHIFT_HOURS: u32 = 12;
    const SHIFT_YEAR: u32 = 17;
    const SHIFT_MONTH: u32 = 23;
    const SHIFT_DAY: u32 = 27;

    pub fn from_raw(raw: u32) -> Self {
        Self { raw }
    }

    pub fn raw(&self) -> u32 {
        self.raw
    }

    pub fn year(&self) -> u32 {
        ((self.raw >> Self::SHIFT_YEAR) & 0x3F) + 1970
    }

    pub fn month(&self) -> u32 {
        (self.raw >> Self::SHIFT_MONTH) & 0x0F
    }

    pub fn day(&self) -> u32 {
        (self.raw >> Self::SHIFT_DAY) & 0x1F
    }

    pub fn hour(&self) -> u32 {
        (self.raw >> Self::SHIFT_HOURS) & 0x1F
    }

    pub fn minute(&self) -> u32 {
        (self.raw >> Self::SHIFT_MINUTES) & 0x3F
    }

    pub fn second(&self) -> u32 {
        (self.raw >> Self::SHIFT_SECONDS) & 0x3F
    }

    /// Seconds since the Unix epoch, treating the stamp as UTC.
    ///
    /// Out-of-range month or day fields are clamped so extraction can still
    /// restore *a* timestamp for damaged stamps.
    pub fn to_unix_seconds(&self) -> i64 {
        let year = i64::from(self.year());
        let month = i64::from(self.month()).clamp(1, 12);
        let day = i64::from(self.day()).clamp(1, 31);
        let days = days_from_civil(year, month, day);
        days * 86_400
            + i64::from(self.hour()) * 3_600
            + i64::from(self.minute()) * 60
            + i64::from(self.second())
    }
}

/// Days since 1970-01-01 for a proleptic Gregorian date.
fn days_from_civil(year: i64, month: i64, day: i64) -> i64 {
    let year = if month <= 2 { year - 1 } else { year };
    let era = year.div_euclid(400);
    let year_of_era = year - era * 400;
    let month_adjusted = if month > 2 { month - 3 } else { month + 9 };
    let day_of_year = (153 * month_adjusted + 2) / 5 + day - 1;
    let day_of_era = year_of_era * 365 + year_of_era / 4 - year_of_era / 100 + day_of_year;
    era * 146_097 + day_of_era - 719_468
}

impl fmt::Display for DateStamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
            self.year(),
            self.month(),
            self.day(),
            self.hour(),
            self.minute(),
            self.second()
        )
    }
}

/// Per-entry compression mode, the low five bits of the pack-mode octet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionMode {
    /// Mode 0: the payload is the stored bytes.
    Store,
    /// Mode 2: an LZX bit stream.
    Normal,
    /// Anything else — recorded, and rejected at decompression time.
    Unknown(u8),
}

impl CompressionMode {
    pub fn from_info_byte(info: u8) -> Self {
        match info & 0x1F {
            0 => CompressionMode::Store,
            2 => CompressionMode::Normal,
            other => CompressionMode::Unknown(other),
        }
    }
}

impl fmt::Display for CompressionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompressionMode::Store => write!(f, "store"),
            CompressionMode::Normal => write!(f, "normal"),
            CompressionMode::Unknown(mode) => write!(f, "unknown({})", mode),
        }
    }
}

/// Host system recorded by the packer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MachineType {
    MsDos,
    Windows,
    Os2,
    Amiga,
    Unix,
    Unknown(u8),
}

impl MachineType {
    pub fn from_raw(raw: u8) -> Self {
        match raw {
            0 => MachineType::MsDos,
            1 => MachineType::Windows,
            2 => MachineType::Os2,
            10 => MachineType::Amiga,
            20 => MachineType::Unix,
            other => MachineType::Unknown(other),
        }
    }
}

impl fmt::Display for MachineType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MachineType::MsDos => write!(f, "MS-DOS"),
            MachineType::Windows => write!(f, "Windows"),
            MachineType::Os2 => write!(f, "OS/2"),
            MachineType::Amiga => write!(f, "Amiga"),
            MachineType::Unix => write!(f, "Unix"),
            MachineType::Unknown(id) => write!(f, "unknown({})", id),
        }
    }
}

/// Entry header flag octet; only bit 0 (merged) is meaningful.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderFlags {
    raw: u8,
}

impl HeaderFlags {
    pub fn from_raw(raw: u8) -> Self {
        Self { raw }
    }

    pub fn raw(&self) -> u8 {
        self.raw
    }

    /// Whether the entry's bytes live in a block shared with its neighbours.
    pub fn is_merged(&self) -> bool {
        self.raw & 0x01 != 0
    }
}

/// Archive-level flag octet from the info header. Recorded only; neither
/// bit changes how entries decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ArchiveFlags {
    raw: u8,
}

impl ArchiveFlags {
    pub fn from_raw(raw: u8) -> Self {
        Self { raw }
    }

    pub fn raw(&self) -> u8 {
        self.raw
    }

    pub fn is_damage_protected(&self) -> bool {
        self.raw & 0x01 != 0
    }

    pub fn is_locked(&self) -> bool {
        self.raw & 0x02 != 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn protection_bits_positions() {
        let bits = ProtectionBits::from_raw(0b0000_1001);
        assert!(bits.is_deletable());
        assert!(bits.is_readable());
        assert!(!bits.is_writable());
        assert!(!bits.is_hidden());
        assert_eq!(bits.to_string(), "---r---d");

        let all = ProtectionBits::from_raw(0xFF);
        assert_eq!(all.to_string(), "hsparwed");
        assert_eq!(ProtectionBits::from_raw(0).to_string(), "--------");
    }

    #[test]
    fn datestamp_field_extraction() {
        // day 14, month 7, year 1995 (25 + 1970), 13:45:59.
        let raw = (14 << 27) | (7 << 23) | (25 << 17) | (13 << 12) | (45 << 6) | 59;
        let stamp = DateStamp::from_raw(raw);
        assert_eq!(stamp.day(), 14);
        assert_eq!(stamp.month(), 7);
        assert_eq!(stamp.year(), 1995);
        assert_eq!(stamp.hour(), 13);
        assert_eq!(stamp.minute(), 45);
        assert_eq!(stamp.second(), 59);
        assert_eq!(stamp.to_string(), "1995-07-14 13:45:59");
    }

    #[test]
    fn datestamp_epoch_conversion() {
        // 1970-01-01 00:00:00.
        let epoch = DateStamp::from_raw((1 << 27) | (1 << 23));
        assert_eq!(epoch.to_unix_seconds(), 0);

        // 2000-03-01 00:00:00 = 951868800 (leap-century boundary).
        let y2k = DateStamp::from_raw((1 << 27) | (3 << 23) | (30 << 17));
        assert_eq!(y2k.to_unix_seconds(), 951_868_800);
    }

    #[test]
    fn compression_mode_uses_low_five_bits() {
        assert_eq!(CompressionMode::from_info_byte(0x00), CompressionMode::Store);
        assert_eq!(CompressionMode::from_info_byte(0x02), CompressionMode::Normal);
        assert_eq!(CompressionMode::from_info_byte(0xE2), CompressionMode::Normal);
        assert_eq!(CompressionMode::from_info_byte(0x05), CompressionMode::Unknown(5));
    }

    #[test]
    fn machine_type_names() {
        assert_eq!(MachineType::from_raw(10), MachineType::Amiga);
        assert_eq!(MachineType::from_raw(20), MachineType::Unix);
        assert_eq!(MachineType::from_raw(99), MachineType::Unknown(99));
        assert_eq!(MachineType::Amiga.to_string(), "Amiga");
    }

    #[test]
    fn flags() {
        assert!(HeaderFlags::from_raw(0x01).is_merged());
        assert!(!HeaderFlags::from_raw(0x02).is_merged());
        let info = ArchiveFlags::from_raw(0x03);
        assert!(info.is_damage_protected());
        assert!(info.is_locked());
    }
}
