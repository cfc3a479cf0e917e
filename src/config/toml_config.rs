use crate::config::import_config::ImportConfig;
use crate::core::export::ExportFormat;
use crate::utils::error::{Result, SkuError};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const IMPORTABLE_EXTENSIONS: &[&str] = &["csv", "tsv", "txt", "json"];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub import: ImportConfig,
    pub source: Option<SourceConfig>,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    pub path: Option<String>,
    /// 先載入的既有匯出檔
    pub existing: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub path: String,
    pub format: String,
    pub filename: Option<String>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: "./output".to_string(),
            format: "csv".to_string(),
            filename: None,
        }
    }
}

impl OutputConfig {
    pub fn export_format(&self) -> Result<ExportFormat> {
        ExportFormat::parse(&self.format)
    }

    /// 預設檔名為 `mappings.<副檔名>`
    pub fn file_name(&self) -> Result<String> {
        match &self.filename {
            Some(name) => Ok(name.clone()),
            None => Ok(format!("mappings.{}", self.export_format()?.extension())),
        }
    }
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;
        Ok(toml::from_str(&processed_content)?)
    }

    /// 替換環境變數 (例如 ${IMPORT_DIR})，未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| SkuError::ConfigError {
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn source_path(&self) -> Option<&str> {
        self.source.as_ref().and_then(|source| source.path.as_deref())
    }

    pub fn existing_path(&self) -> Option<&str> {
        self.source
            .as_ref()
            .and_then(|source| source.existing.as_deref())
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.import.validate()?;

        let mut inputs = Vec::new();
        for (field, path) in [
            ("source.path", self.source_path()),
            ("source.existing", self.existing_path()),
        ] {
            if let Some(path) = path {
                validation::validate_path(field, path)?;
                inputs.push(path.to_string());
            }
        }
        validation::validate_file_extensions("source", &inputs, IMPORTABLE_EXTENSIONS)?;

        validation::validate_path("output.path", &self.output.path)?;
        validation::validate_one_of("output.format", &self.output.format, ExportFormat::SUPPORTED)?;
        if let Some(filename) = &self.output.filename {
            validation::validate_non_empty_string("output.filename", filename)?;
        }

        Ok(())
    }
}
