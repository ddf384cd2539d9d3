//! Argument parsing for `unlzx`.

use std::path::PathBuf;

use clap::Parser;

/// What to do with each named archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    View,
    Extract,
}

#[derive(Parser, Debug)]
#[command(
    name = "unlzx",
    about = "Extract and list Amiga LZX archives",
    version
)]
pub struct Args {
    /// List archive contents instead of extracting
    #[arg(short = 'v', long = "view")]
    pub view: bool,

    /// Extract archive contents (the default)
    #[arg(short = 'x', long = "extract", conflicts_with = "view")]
    pub extract: bool,

    /// Write extracted files under DIR
    #[arg(short = 'o', long = "output", value_name = "DIR", default_value = ".")]
    pub output: PathBuf,

    /// Only process entries whose name matches the regular expression
    #[arg(short = 'm', long = "match", value_name = "REGEX")]
    pub pattern: Option<String>,

    /// Keep existing files instead of overwriting them
    #[arg(short = 'k', long = "keep")]
    pub keep: bool,

    /// Skip the data CRC check after decompression
    #[arg(long = "no-verify")]
    pub no_verify: bool,

    /// Suppress progress messages
    #[arg(short = 'q', long = "quiet")]
    pub quiet: bool,

    /// Archives to process
    #[arg(required = true, value_name = "ARCHIVE")]
    pub archives: Vec<PathBuf>,
}

impl Args {
    pub fn action(&self) -> Action {
        if self.view {
            Action::View
        } else {
            Action::Extract
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extract_is_the_default_action() {
        let args = Args::try_parse_from(["unlzx", "a.lzx"]).unwrap();
        assert_eq!(args.action(), Action::Extract);
        assert_eq!(args.archives.len(), 1);
    }

    #[test]
    fn view_flag_selects_listing() {
        let args = Args::try_parse_from(["unlzx", "-v", "a.lzx"]).unwrap();
        assert_eq!(args.action(), Action::View);
    }

    #[test]
    fn view_and_extract_conflict() {
        assert!(Args::try_parse_from(["unlzx", "-v", "-x", "a.lzx"]).is_err());
    }

    #[test]
    fn archives_are_required() {
        assert!(Args::try_parse_from(["unlzx"]).is_err());
    }

    #[test]
    fn output_dir_and_pattern() {
        let args =
            Args::try_parse_from(["unlzx", "-o", "out", "-m", r"\.txt$", "a.lzx", "b.lzx"]).unwrap();
        assert_eq!(args.output, PathBuf::from("out"));
        assert_eq!(args.pattern.as_deref(), Some(r"\.txt$"));
        assert_eq!(args.archives.len(), 2);
    }
}
