//! The archive listing (`-v` view).

use std::io::Write;

use crate::archive::{Archive, Entry};
use crate::error::{LzxError, Result};

fn write_entry_line(out: &mut dyn Write, entry: &Entry<'_>) -> std::io::Result<()> {
    // Merged entries only have an apportioned guess for their packed size;
    // mark it so the column is not mistaken for an exact figure.
    let packed = match entry.pack_size() {
        Some(size) if !entry.is_merged() => format!("{}", size),
        Some(size) => format!("{}+", size),
        None => "n/a".to_string(),
    };
    writeln!(
        out,
        "{:>9} {:>9}  {}  {}  {}",
        entry.unpack_size(),
        packed,
        entry.datestamp(),
        entry.attributes(),
        entry.name(),
    )?;
    let comment = entry.comment();
    if !comment.is_empty() {
        writeln!(out, "{:>9} comment: {}", "", comment)?;
    }
    Ok(())
}

/// Write the full listing: one line per entry, archive order, with a totals
/// footer.
pub fn list_archive(archive: &Archive<'_>, out: &mut dyn Write) -> Result<()> {
    let render = |out: &mut dyn Write| -> std::io::Result<()> {
        writeln!(out, "{:>9} {:>9}  {:19}  {:8}  Name", "Unpacked", "Packed", "Date", "Attrib")?;
        let mut total_unpacked: u64 = 0;
        for entry in archive.entries() {
            write_entry_line(out, entry)?;
            total_unpacked += entry.unpack_size();
        }
        writeln!(
            out,
            "{:>9} bytes in {} file{}",
            total_unpacked,
            archive.len(),
            if archive.len() == 1 { "" } else { "s" }
        )?;
        Ok(())
    };
    render(out).map_err(|_| LzxError::FileWriteError)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::tests::store_archive;

    #[test]
    fn listing_contains_names_sizes_and_totals() {
        let bytes = store_archive(&[("readme.txt", b"hello"), ("data.bin", b"\x00\x01")]);
        let archive = Archive::open(&bytes).unwrap();

        let mut out = Vec::new();
        list_archive(&archive, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.contains("readme.txt"));
        assert!(text.contains("data.bin"));
        assert!(text.contains("7 bytes in 2 files"));
        assert!(text.contains("----rwed"));
    }

    #[test]
    fn empty_archive_lists_zero_files() {
        let bytes = store_archive(&[]);
        let archive = Archive::open(&bytes).unwrap();
        let mut out = Vec::new();
        list_archive(&archive, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("0 bytes in 0 files"));
    }
}
