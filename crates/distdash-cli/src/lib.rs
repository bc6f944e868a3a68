//! Shared CLI definitions for distdash.
//!
//! Used by the main application and by the build script (manpage).

use clap::{Parser, ValueEnum};
use std::path::{Path, PathBuf};

/// File format for data files (used to bypass extension-based detection).
/// When `--format` is not specified, format is auto-detected from the file extension.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum FileFormat {
    /// Comma-separated values
    Csv,
    /// Tab-separated values
    Tsv,
    /// Pipe-separated values
    Psv,
}

impl FileFormat {
    /// Detect file format from path extension. Returns None when extension is missing or unknown.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }

    /// Parse format from extension string (e.g. "csv", "tsv").
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "csv" => Some(Self::Csv),
            "tsv" | "tab" => Some(Self::Tsv),
            "psv" => Some(Self::Psv),
            _ => None,
        }
    }

    /// Field separator implied by the format
    pub fn delimiter(&self) -> u8 {
        match self {
            Self::Csv => b',',
            Self::Tsv => b'\t',
            Self::Psv => b'|',
        }
    }
}

/// How the computed dashboard is written to stdout
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable summary, one section per dashboard view
    #[default]
    Text,
    /// The full report as pretty-printed JSON
    Json,
}

/// Command-line arguments for distdash
#[derive(Clone, Parser, Debug)]
#[command(
    name = "distdash",
    version,
    about = "District-level intervention dashboard over a single data table"
)]
pub struct Args {
    /// Path to the data file. Defaults to `dashboard.data_path` from the config, then `dashboard_data.csv`
    #[arg(value_name = "PATH")]
    pub path: Option<PathBuf>,

    /// Restrict the dashboard to this district. Use once per district; when omitted all districts are selected
    #[arg(long = "district", value_name = "NAME")]
    pub districts: Vec<String>,

    /// Select no districts at all (every view is computed over zero rows)
    #[arg(long = "no-districts", conflicts_with = "districts", action)]
    pub no_districts: bool,

    /// Drill down to a single strategic pillar
    #[arg(long = "pillar", value_name = "NAME")]
    pub pillar: Option<String>,

    /// Number of support types shown in the top support-type view (default: 15)
    #[arg(long = "top-n", value_name = "N", value_parser = parse_top_n)]
    pub top_n: Option<usize>,

    /// Output format for the computed dashboard (text, json)
    #[arg(long = "output", value_enum)]
    pub output: Option<OutputFormat>,

    /// Force file format (csv, tsv, psv).
    /// By default format is auto-detected from the file extension.
    #[arg(long = "format", value_enum)]
    pub format: Option<FileFormat>,

    /// Specify the delimiter to use when reading a delimited text file
    #[arg(long = "delimiter")]
    pub delimiter: Option<u8>,

    /// Specify that the file has no header
    #[arg(long = "no-header")]
    pub no_header: Option<bool>,

    /// Number of rows to use when inferring CSV schema (default: 1000)
    #[arg(long = "infer-schema-length", value_name = "N")]
    pub infer_schema_length: Option<usize>,

    /// Map a logical field to a literal column name. Use once per field, e.g. --column support_category=cat_of_support
    #[arg(long = "column", value_name = "FIELD=NAME")]
    pub columns: Vec<String>,

    /// Enable debug logging
    #[arg(long = "debug", action)]
    pub debug: bool,

    /// Emit logs as JSON lines on stderr
    #[arg(long = "log-json", action)]
    pub log_json: bool,

    /// Generate default configuration file at ~/.config/distdash/config.toml
    #[arg(long = "generate-config", action)]
    pub generate_config: bool,

    /// Force overwrite existing config file when using --generate-config
    #[arg(long = "force", requires = "generate_config", action)]
    pub force: bool,
}

/// `--top-n` must be at least 1, the same bound the config file enforces.
fn parse_top_n(s: &str) -> Result<usize, String> {
    match s.parse::<usize>() {
        Ok(0) => Err("must be at least 1".to_string()),
        Ok(n) => Ok(n),
        Err(e) => Err(e.to_string()),
    }
}

impl Args {
    /// Parse `--column FIELD=NAME` values. The first "=" separates field from column name;
    /// entries without "=" or with an empty side are skipped.
    pub fn column_overrides(&self) -> Vec<(String, String)> {
        self.columns
            .iter()
            .filter_map(|entry| {
                let (field, name) = entry.split_once('=')?;
                let (field, name) = (field.trim(), name.trim());
                if field.is_empty() || name.is_empty() {
                    None
                } else {
                    Some((field.to_string(), name.to_string()))
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_format_from_path() {
        assert_eq!(
            FileFormat::from_path(Path::new("dashboard_data.csv")),
            Some(FileFormat::Csv)
        );
        assert_eq!(
            FileFormat::from_path(Path::new("data.TSV")),
            Some(FileFormat::Tsv)
        );
        assert_eq!(
            FileFormat::from_path(Path::new("data.psv")),
            Some(FileFormat::Psv)
        );
        assert_eq!(FileFormat::from_path(Path::new("data.parquet")), None);
        assert_eq!(FileFormat::from_path(Path::new("data")), None);
    }

    #[test]
    fn test_file_format_delimiter() {
        assert_eq!(FileFormat::Csv.delimiter(), b',');
        assert_eq!(FileFormat::Tsv.delimiter(), b'\t');
        assert_eq!(FileFormat::Psv.delimiter(), b'|');
    }

    #[test]
    fn test_parse_districts_and_pillar() {
        let args = Args::parse_from([
            "distdash",
            "data.csv",
            "--district",
            "Raipur",
            "--district",
            "Bastar",
            "--pillar",
            "Livelihood",
        ]);
        assert_eq!(args.path, Some(PathBuf::from("data.csv")));
        assert_eq!(args.districts, vec!["Raipur", "Bastar"]);
        assert_eq!(args.pillar.as_deref(), Some("Livelihood"));
        assert!(!args.no_districts);
    }

    #[test]
    fn test_no_districts_conflicts_with_district() {
        let result =
            Args::try_parse_from(["distdash", "--no-districts", "--district", "Raipur"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_force_requires_generate_config() {
        assert!(Args::try_parse_from(["distdash", "--force"]).is_err());
        let args = Args::parse_from(["distdash", "--generate-config", "--force"]);
        assert!(args.generate_config && args.force);
    }

    #[test]
    fn test_column_overrides() {
        let args = Args::parse_from([
            "distdash",
            "--column",
            "support_category=cat=of=support",
            "--column",
            "broken",
            "--column",
            "pillar= ",
        ]);
        assert_eq!(
            args.column_overrides(),
            vec![(
                "support_category".to_string(),
                "cat=of=support".to_string()
            )]
        );
    }

    #[test]
    fn test_output_format_parse() {
        let args = Args::parse_from(["distdash", "--output", "json"]);
        assert_eq!(args.output, Some(OutputFormat::Json));
        assert_eq!(OutputFormat::default(), OutputFormat::Text);
    }

    #[test]
    fn test_top_n_must_be_positive() {
        assert!(Args::try_parse_from(["distdash", "--top-n", "0"]).is_err());
        assert!(Args::try_parse_from(["distdash", "--top-n", "many"]).is_err());
        let args = Args::parse_from(["distdash", "--top-n", "5"]);
        assert_eq!(args.top_n, Some(5));
    }
}
