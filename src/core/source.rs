use crate::utils::error::{Result, SkuError};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const SUPPORTED_ENCODINGS: &[&str] = &["utf-8", "utf8", "latin1", "iso-8859-1", "ascii"];

/// 上傳檔案的語法家族
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceFormat {
    #[serde(alias = "csv", alias = "tsv", alias = "txt")]
    Delimited,
    Json,
}

impl SourceFormat {
    pub fn parse(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "delimited" | "csv" | "tsv" | "txt" => Ok(SourceFormat::Delimited),
            "json" => Ok(SourceFormat::Json),
            other => Err(SkuError::InvalidConfigValueError {
                field: "import.format".to_string(),
                value: other.to_string(),
                reason: "Supported formats: csv, tsv, txt, json".to_string(),
            }),
        }
    }

    /// 依副檔名判斷；沒有副檔名時回傳 `None`
    pub fn from_extension(path: &str) -> Result<Option<Self>> {
        let Some(extension) = Path::new(path).extension().and_then(|ext| ext.to_str()) else {
            return Ok(None);
        };

        match extension.to_ascii_lowercase().as_str() {
            "csv" | "tsv" | "txt" => Ok(Some(SourceFormat::Delimited)),
            "json" => Ok(Some(SourceFormat::Json)),
            "xls" | "xlsx" => Err(SkuError::UnsupportedFormat {
                extension: extension.to_string(),
            }),
            _ => Ok(None),
        }
    }

    pub fn sniff(text: &str) -> Self {
        match text.trim_start().chars().next() {
            Some('[') | Some('{') => SourceFormat::Json,
            _ => SourceFormat::Delimited,
        }
    }

    /// 明確宣告優先，其次副檔名，最後看內容
    pub fn resolve(explicit: Option<Self>, path: &str, text: &str) -> Result<Self> {
        if let Some(format) = explicit {
            return Ok(format);
        }
        Ok(Self::from_extension(path)?.unwrap_or_else(|| Self::sniff(text)))
    }
}

pub fn decode(bytes: &[u8], encoding: &str) -> Result<String> {
    match encoding.trim().to_ascii_lowercase().as_str() {
        "utf-8" | "utf8" => {
            let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
            String::from_utf8(bytes.to_vec()).map_err(|e| SkuError::DecodeError {
                encoding: encoding.to_string(),
                message: e.to_string(),
            })
        }
        "latin1" | "iso-8859-1" => Ok(bytes.iter().map(|&b| b as char).collect()),
        "ascii" => match bytes.iter().position(|b| !b.is_ascii()) {
            Some(offset) => Err(SkuError::DecodeError {
                encoding: encoding.to_string(),
                message: format!("non-ASCII byte 0x{:02X} at offset {}", bytes[offset], offset),
            }),
            None => Ok(bytes.iter().map(|&b| b as char).collect()),
        },
        other => Err(SkuError::InvalidConfigValueError {
            field: "import.encoding".to_string(),
            value: other.to_string(),
            reason: format!("Supported values: {}", SUPPORTED_ENCODINGS.join(", ")),
        }),
    }
}
