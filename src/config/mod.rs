pub mod cli;
pub mod import_config;
pub mod toml_config;

#[cfg(feature = "cli")]
pub use cli_args::CliConfig;

#[cfg(feature = "cli")]
mod cli_args {
    use super::import_config::ImportConfig;
    use crate::core::source::SourceFormat;
    use crate::utils::error::{Result, SkuError};
    use clap::Parser;

    #[derive(Debug, Clone, Default, Parser)]
    #[command(name = "sku-mapper")]
    #[command(about = "Import marketplace SKU to MSKU mappings from CSV or JSON files")]
    pub struct CliConfig {
        /// File to import (CSV, TSV, TXT or JSON)
        #[arg(short, long)]
        pub input: Option<String>,

        /// Path to TOML configuration file
        #[arg(short, long)]
        pub config: Option<String>,

        /// Previous export to load into the registry before importing
        #[arg(long)]
        pub existing: Option<String>,

        /// Field delimiter: a single character, or "tab"
        #[arg(long)]
        pub delimiter: Option<String>,

        #[arg(long)]
        pub encoding: Option<String>,

        /// Force the syntax family instead of guessing from the extension
        #[arg(long)]
        pub format: Option<String>,

        #[arg(long, help = "First row is data, not headers")]
        pub no_header: bool,

        #[arg(long, help = "Keep surrounding whitespace in fields")]
        pub no_trim: bool,

        #[arg(long, help = "Treat blank lines as data rows")]
        pub keep_empty_rows: bool,

        #[arg(long, help = "Skip SKU syntax validation")]
        pub no_validate_sku: bool,

        #[arg(long, help = "Reject rows with an unterminated quote")]
        pub strict_quotes: bool,

        #[arg(long, help = "Check SKUs against their marketplace format while parsing")]
        pub check_marketplace_format: bool,

        #[arg(long, value_delimiter = ',')]
        pub required_fields: Vec<String>,

        #[arg(long)]
        pub output_path: Option<String>,

        /// csv or json
        #[arg(long)]
        pub export_format: Option<String>,

        #[arg(long, help = "Parse and validate without touching the registry")]
        pub dry_run: bool,

        #[arg(short, long, help = "Enable verbose output")]
        pub verbose: bool,

        #[arg(long, help = "Emit logs as JSON")]
        pub json_logs: bool,
    }

    impl CliConfig {
        /// 命令列旗標覆寫 TOML 或預設值
        pub fn apply_to(&self, mut config: ImportConfig) -> Result<ImportConfig> {
            if let Some(delimiter) = &self.delimiter {
                config.delimiter = parse_delimiter(delimiter)?;
            }
            if let Some(encoding) = &self.encoding {
                config.encoding = encoding.clone();
            }
            if let Some(format) = &self.format {
                config.format = Some(SourceFormat::parse(format)?);
            }
            if self.no_header {
                config.has_header_row = false;
            }
            if self.no_trim {
                config.trim_whitespace = false;
            }
            if self.keep_empty_rows {
                config.skip_empty_rows = false;
            }
            if self.no_validate_sku {
                config.validate_sku = false;
            }
            if self.strict_quotes {
                config.strict_quotes = true;
            }
            if self.check_marketplace_format {
                config.check_marketplace_format = true;
            }
            if !self.required_fields.is_empty() {
                config.required_fields = self.required_fields.clone();
            }
            Ok(config)
        }
    }

    fn parse_delimiter(value: &str) -> Result<char> {
        match value {
            "tab" | "\\t" | "\t" => return Ok('\t'),
            _ => {}
        }

        let mut chars = value.chars();
        match (chars.next(), chars.next()) {
            (Some(delimiter), None) => Ok(delimiter),
            _ => Err(SkuError::InvalidConfigValueError {
                field: "delimiter".to_string(),
                value: value.to_string(),
                reason: "Delimiter must be a single character or \"tab\"".to_string(),
            }),
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_flags_override_base_config() {
            let cli = CliConfig::parse_from([
                "sku-mapper",
                "--input",
                "upload.tsv",
                "--delimiter",
                "tab",
                "--no-header",
                "--required-fields",
                "sku,msku",
            ]);

            let config = cli.apply_to(ImportConfig::default()).unwrap();
            assert_eq!(config.delimiter, '\t');
            assert!(!config.has_header_row);
            assert!(config.trim_whitespace);
            assert_eq!(config.required_fields, vec!["sku", "msku"]);
        }

        #[test]
        fn test_unset_flags_keep_base_values() {
            let base = ImportConfig {
                delimiter: ';',
                skip_empty_rows: false,
                ..ImportConfig::default()
            };
            let config = CliConfig::parse_from(["sku-mapper"]).apply_to(base.clone()).unwrap();
            assert_eq!(config, base);
        }

        #[test]
        fn test_parse_delimiter() {
            assert_eq!(parse_delimiter(";").unwrap(), ';');
            assert_eq!(parse_delimiter("\\t").unwrap(), '\t');
            assert!(parse_delimiter(",,").is_err());
            assert!(parse_delimiter("").is_err());
        }
    }
}
