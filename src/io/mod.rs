//! Filesystem collaborators around the decoder core: the byte source, the
//! listing view, extraction, and terminal messaging.

pub mod display;
pub mod extract;
pub mod list;
pub mod source;

pub use display::{display_level, set_display_level};
pub use extract::{entry_output_path, extract_entry, ExtractOptions};
pub use list::list_archive;
pub use source::ArchiveFile;

#[cfg(test)]
pub(crate) mod tests {
    //! Store-mode archive fixtures shared by the io test modules.

    use crate::archive::header::ENTRY_HEADER_SIZE;
    use crate::crc::{crc32, Crc32};

    const INFO_HEADER: [u8; 10] = [0x4C, 0x5A, 0x58, 0, 0, 0, 0, 0, 0, 0];

    fn push_store_entry(bytes: &mut Vec<u8>, name: &str, payload: &[u8], date_raw: u32) {
        let mut fixed = [0u8; ENTRY_HEADER_SIZE];
        fixed[0] = 0x0F; // readable, writable, executable, deletable
        fixed[2..6].copy_from_slice(&(payload.len() as u32).to_le_bytes());
        fixed[6..10].copy_from_slice(&(payload.len() as u32).to_le_bytes());
        fixed[10] = 10;
        fixed[15] = 10;
        fixed[18..22].copy_from_slice(&date_raw.to_be_bytes());
        fixed[22..26].copy_from_slice(&crc32(payload).to_le_bytes());
        fixed[30] = name.len() as u8;

        let mut crc = Crc32::new();
        crc.update(&fixed);
        crc.update(name.as_bytes());
        fixed[26..30].copy_from_slice(&crc.sum().to_le_bytes());

        bytes.extend_from_slice(&fixed);
        bytes.extend_from_slice(name.as_bytes());
        bytes.extend_from_slice(payload);
    }

    /// A valid archive of store-mode entries.
    pub(crate) fn store_archive(entries: &[(&str, &[u8])]) -> Vec<u8> {
        let mut bytes = INFO_HEADER.to_vec();
        for (name, payload) in entries {
            push_store_entry(&mut bytes, name, payload, 0);
        }
        bytes
    }

    /// Like [`store_archive`] but with an explicit packed datestamp.
    pub(crate) fn store_archive_with(entries: &[(&str, &[u8], u32)]) -> Vec<u8> {
        let mut bytes = INFO_HEADER.to_vec();
        for (name, payload, date_raw) in entries {
            push_store_entry(&mut bytes, name, payload, *date_raw);
        }
        bytes
    }
}
