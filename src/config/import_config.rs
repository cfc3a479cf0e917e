use crate::core::source::{SourceFormat, SUPPORTED_ENCODINGS};
use crate::utils::error::Result;
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};

/// 單次匯入的設定，執行期間不會變動
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportConfig {
    pub encoding: String,
    pub delimiter: char,
    pub has_header_row: bool,
    pub trim_whitespace: bool,
    pub skip_empty_rows: bool,
    pub validate_sku: bool,
    /// 目前沒有比對演算法，檔案中的 msku 原樣帶入
    pub auto_match_sku: bool,
    /// 行尾仍在引號內時視為解析錯誤
    pub strict_quotes: bool,
    pub required_fields: Vec<String>,
    pub check_marketplace_format: bool,
    pub format: Option<SourceFormat>,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            encoding: "utf-8".to_string(),
            delimiter: ',',
            has_header_row: true,
            trim_whitespace: true,
            skip_empty_rows: true,
            validate_sku: true,
            auto_match_sku: true,
            strict_quotes: false,
            required_fields: Vec::new(),
            check_marketplace_format: false,
            format: None,
        }
    }
}

impl Validate for ImportConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_one_of("import.encoding", &self.encoding, SUPPORTED_ENCODINGS)?;
        validation::validate_delimiter("import.delimiter", self.delimiter)?;
        for field in &self.required_fields {
            validation::validate_non_empty_string("import.required_fields", field)?;
        }
        Ok(())
    }
}
