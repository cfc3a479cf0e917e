use crate::domain::model::SkuRecord;
use crate::utils::error::{Result, SkuError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    pub const SUPPORTED: &'static [&'static str] = &["csv", "json"];

    pub fn parse(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "json" => Ok(ExportFormat::Json),
            other => Err(SkuError::InvalidConfigValueError {
                field: "output.format".to_string(),
                value: other.to_string(),
                reason: format!("Supported formats: {}", Self::SUPPORTED.join(", ")),
            }),
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        }
    }

    pub fn render(&self, records: &[SkuRecord]) -> Result<Vec<u8>> {
        match self {
            ExportFormat::Csv => to_csv(records).map(String::into_bytes),
            ExportFormat::Json => to_json(records).map(String::into_bytes),
        }
    }
}

/// 標題列為 `sku,msku,marketplace,lastUpdated`，可直接再匯入
pub fn to_csv(records: &[SkuRecord]) -> Result<String> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());

    writer.write_record(["sku", "msku", "marketplace", "lastUpdated"])?;
    for record in records {
        writer.serialize(record)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| SkuError::IoError(e.into_error()))?;
    String::from_utf8(bytes).map_err(|e| SkuError::DecodeError {
        encoding: "utf-8".to_string(),
        message: e.to_string(),
    })
}

pub fn to_json(records: &[SkuRecord]) -> Result<String> {
    Ok(serde_json::to_string_pretty(records)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn records() -> Vec<SkuRecord> {
        vec![
            SkuRecord {
                sku: "APPLE-RED".into(),
                msku: "FRUIT-001".into(),
                marketplace: "Etsy".into(),
                last_updated: Utc.with_ymd_and_hms(2023, 4, 15, 0, 0, 0).unwrap(),
            },
            SkuRecord {
                sku: "TEE_01".into(),
                msku: "SHIRT, BLACK".into(),
                marketplace: "Local \"pop-up\"".into(),
                last_updated: Utc.with_ymd_and_hms(2023, 4, 12, 0, 0, 0).unwrap(),
            },
        ]
    }

    #[test]
    fn test_csv_export_quotes_when_needed() {
        let csv = to_csv(&records()).unwrap();
        let lines: Vec<_> = csv.lines().collect();

        assert_eq!(lines[0], "sku,msku,marketplace,lastUpdated");
        assert_eq!(lines[1], "APPLE-RED,FRUIT-001,Etsy,2023-04-15T00:00:00Z");
        assert_eq!(
            lines[2],
            r#"TEE_01,"SHIRT, BLACK","Local ""pop-up""",2023-04-12T00:00:00Z"#
        );
    }

    #[test]
    fn test_json_export_uses_camel_case() {
        let json = to_json(&records()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value[0]["lastUpdated"], "2023-04-15T00:00:00Z");
        assert_eq!(value[1]["msku"], "SHIRT, BLACK");
    }

    #[test]
    fn test_export_format_parse() {
        assert_eq!(ExportFormat::parse("JSON").unwrap(), ExportFormat::Json);
        assert_eq!(ExportFormat::parse("csv").unwrap().extension(), "csv");
        assert!(ExportFormat::parse("xlsx").is_err());
    }
}
