use clap::{ArgAction, Parser, ValueEnum};
use codesort_core::{DuplicatePolicy, MissingPolicy, Preferences, SymbolFormat};
use std::path::PathBuf;

/// Rename images after the barcodes and 2D symbols they contain.
#[derive(Debug, Parser)]
#[command(name = "codesort", version, about)]
pub struct Cli {
    /// Directory containing the images to rename.
    pub source: PathBuf,

    /// Directory receiving the renamed copies [default: a new "renamed"
    /// directory inside SOURCE].
    pub target: Option<PathBuf>,

    /// Only use symbols of this format (for example qr-code, code-128, ean-13).
    #[arg(long, value_name = "FORMAT")]
    pub restrict: Option<SymbolFormat>,

    /// Search harder for symbols. Slower.
    #[arg(long)]
    pub try_harder: bool,

    /// How to name images containing several symbols.
    #[arg(long, value_enum, value_name = "POLICY")]
    pub duplicates: Option<DuplicateChoice>,

    /// What to do with images without a symbol.
    #[arg(long, value_enum, value_name = "POLICY")]
    pub missing: Option<MissingChoice>,

    /// Preferences file [default: ./codesort.toml, then the user config directory].
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Write the full run result as JSON.
    #[arg(long, value_name = "PATH")]
    pub report_json: Option<PathBuf>,

    /// Write the paths of images without a symbol, one per line.
    #[arg(long, value_name = "PATH")]
    pub unresolved_list: Option<PathBuf>,

    /// More log output (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum DuplicateChoice {
    /// Name the image after the first symbol found
    #[value(name = "pick-first")]
    PickFirst,
    /// Join all symbols with "-"
    Concatenate,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum MissingChoice {
    /// Leave the image out of the target directory
    Skip,
    /// Copy the image under its original name
    Copy,
}

impl From<DuplicateChoice> for DuplicatePolicy {
    fn from(choice: DuplicateChoice) -> Self {
        match choice {
            DuplicateChoice::PickFirst => DuplicatePolicy::PickFirst,
            DuplicateChoice::Concatenate => DuplicatePolicy::Concatenate,
        }
    }
}

impl From<MissingChoice> for MissingPolicy {
    fn from(choice: MissingChoice) -> Self {
        match choice {
            MissingChoice::Skip => MissingPolicy::Skip,
            MissingChoice::Copy => MissingPolicy::Copy,
        }
    }
}

/// User-facing description of a duplicate policy.
pub fn duplicate_label(policy: DuplicatePolicy) -> &'static str {
    match policy {
        DuplicatePolicy::PickFirst => "use the first barcode",
        DuplicatePolicy::Concatenate => "concatenate all barcodes",
    }
}

/// User-facing description of a missing-barcode policy.
pub fn missing_label(policy: MissingPolicy) -> &'static str {
    match policy {
        MissingPolicy::Skip => "skip the image",
        MissingPolicy::Copy => "copy the image unchanged",
    }
}

impl Cli {
    /// Command-line flags take precedence over stored preferences.
    pub fn apply(&self, mut preferences: Preferences) -> Preferences {
        if let Some(choice) = self.duplicates {
            preferences.duplicate_policy = choice.into();
        }
        if let Some(choice) = self.missing {
            preferences.missing_policy = choice.into();
        }
        if let Some(format) = self.restrict {
            preferences.format_restriction = Some(format);
        }
        if self.try_harder {
            preferences.try_harder = true;
        }
        preferences
    }

    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("codesort").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn parses_source_only() {
        let cli = parse(&["./images"]);
        assert_eq!(cli.source, PathBuf::from("./images"));
        assert!(cli.target.is_none());
        assert!(cli.restrict.is_none());
        assert!(!cli.try_harder);
        assert_eq!(cli.log_level(), "warn");
    }

    #[test]
    fn parses_all_flags() {
        let cli = parse(&[
            "./images",
            "./sorted",
            "--restrict=QR_CODE",
            "--try-harder",
            "--duplicates=pick-first",
            "--missing",
            "copy",
            "--report-json=run.json",
            "--unresolved-list=missing.txt",
            "-vv",
        ]);
        assert_eq!(cli.target, Some(PathBuf::from("./sorted")));
        assert_eq!(cli.restrict, Some(SymbolFormat::QrCode));
        assert!(cli.try_harder);
        assert_eq!(cli.duplicates, Some(DuplicateChoice::PickFirst));
        assert_eq!(cli.missing, Some(MissingChoice::Copy));
        assert_eq!(cli.report_json, Some(PathBuf::from("run.json")));
        assert_eq!(cli.unresolved_list, Some(PathBuf::from("missing.txt")));
        assert_eq!(cli.log_level(), "debug");
    }

    #[test]
    fn rejects_unknown_format_and_missing_source() {
        assert!(Cli::try_parse_from(["codesort", "./images", "--restrict=hologram"]).is_err());
        assert!(Cli::try_parse_from(["codesort"]).is_err());
    }

    #[test]
    fn flags_override_preferences() {
        let stored = Preferences {
            duplicate_policy: DuplicatePolicy::Concatenate,
            missing_policy: MissingPolicy::Copy,
            format_restriction: Some(SymbolFormat::Ean13),
            try_harder: true,
            ..Preferences::default()
        };

        let unchanged = parse(&["./images"]).apply(stored.clone());
        assert_eq!(unchanged, stored);

        let changed = parse(&["./images", "--duplicates", "pick-first", "--missing", "skip"])
            .apply(stored);
        assert_eq!(changed.duplicate_policy, DuplicatePolicy::PickFirst);
        assert_eq!(changed.missing_policy, MissingPolicy::Skip);
        assert_eq!(changed.format_restriction, Some(SymbolFormat::Ean13));
        assert!(changed.try_harder);
    }

    #[test]
    fn labels_cover_every_policy() {
        assert_eq!(duplicate_label(DuplicatePolicy::PickFirst), "use the first barcode");
        assert_eq!(missing_label(MissingPolicy::Copy), "copy the image unchanged");
    }
}
