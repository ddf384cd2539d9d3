//! Binary entry point for the `unlzx` command-line tool.
//!
//! Each named archive is opened, parsed, and either listed (`-v`) or
//! extracted (`-x`, the default). Archives are processed independently: a
//! failure in one is reported and the rest still run, with the exit code
//! reflecting whether everything succeeded.

use std::io::Write;
use std::path::Path;

use anyhow::Context;
use clap::Parser;
use regex::Regex;

use lzx::cli::{Action, Args};
use lzx::displaylevel;
use lzx::io::{extract_entry, list_archive, set_display_level, ArchiveFile, ExtractOptions};
use lzx::Archive;

fn main() {
    std::process::exit(run());
}

fn run() -> i32 {
    let args = Args::parse();
    set_display_level(if args.quiet { 1 } else { 2 });

    let filter = match args.pattern.as_deref().map(Regex::new).transpose() {
        Ok(filter) => filter,
        Err(err) => {
            eprintln!("unlzx: invalid --match pattern: {}", err);
            return 2;
        }
    };

    let mut failed = 0usize;
    for path in &args.archives {
        displaylevel!(2, "\nArchive \"{}\"...\n", path.display());
        if let Err(err) = process_archive(path, &args, filter.as_ref()) {
            eprintln!("unlzx: {}: {:#}", path.display(), err);
            failed += 1;
        }
    }

    i32::from(failed > 0)
}

fn process_archive(path: &Path, args: &Args, filter: Option<&Regex>) -> anyhow::Result<()> {
    let file = ArchiveFile::open(path).context("opening archive")?;
    let archive = Archive::open(file.bytes()).context("parsing archive")?;

    match args.action() {
        Action::View => {
            let stdout = std::io::stdout();
            let mut out = stdout.lock();
            list_filtered(&archive, filter, &mut out).context("writing listing")?;
        }
        Action::Extract => extract_filtered(&archive, args, filter)?,
    }
    Ok(())
}

fn list_filtered(
    archive: &Archive<'_>,
    filter: Option<&Regex>,
    out: &mut dyn Write,
) -> lzx::Result<()> {
    match filter {
        // The plain listing carries the totals footer; a filtered view is
        // just the matching lines, so reuse isn't possible there.
        None => list_archive(archive, out),
        Some(pattern) => {
            for entry in archive.entries() {
                let name = entry.name();
                if pattern.is_match(&name) {
                    writeln!(
                        out,
                        "{:>9}  {}  {}  {}",
                        entry.unpack_size(),
                        entry.datestamp(),
                        entry.attributes(),
                        name,
                    )
                    .map_err(|_| lzx::LzxError::FileWriteError)?;
                }
            }
            Ok(())
        }
    }
}

fn extract_filtered(
    archive: &Archive<'_>,
    args: &Args,
    filter: Option<&Regex>,
) -> anyhow::Result<()> {
    let options = ExtractOptions {
        output_dir: args.output.clone(),
        overwrite: !args.keep,
        restore_datestamps: true,
        verify_crc: !args.no_verify,
    };

    let mut failures = 0usize;
    for entry in archive.entries() {
        let name = entry.name();
        if filter.map(|pattern| pattern.is_match(&name)) == Some(false) {
            continue;
        }
        match extract_entry(entry, &options) {
            Ok(written) => {
                displaylevel!(2, "  {} ({} bytes)\n", written.display(), entry.unpack_size());
            }
            Err(err) => {
                eprintln!("unlzx: {}: {}", name, err);
                failures += 1;
            }
        }
    }

    if failures > 0 {
        anyhow::bail!("{} entr{} failed to extract", failures, if failures == 1 { "y" } else { "ies" });
    }
    Ok(())
}
