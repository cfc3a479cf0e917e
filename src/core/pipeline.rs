use crate::config::import_config::ImportConfig;
use crate::core::catalog::MarketplaceFormatCatalog;
use crate::core::parser::RecordParser;
use crate::core::source::{self, SourceFormat};
use crate::core::validator::ImportValidator;
use crate::domain::model::{ImportError, ImportResult, RowRecord};
use crate::utils::error::{Result, SkuError};
use serde_json::Value;

/// 解析 + 驗證的匯入管線；單列失敗只記錄，不中斷整批
#[derive(Debug, Clone)]
pub struct ImportPipeline {
    config: ImportConfig,
    parser: RecordParser,
    validator: ImportValidator,
}

impl ImportPipeline {
    pub fn new(config: ImportConfig) -> Self {
        Self::with_catalog(config, MarketplaceFormatCatalog::standard())
    }

    pub fn with_catalog(config: ImportConfig, catalog: MarketplaceFormatCatalog) -> Self {
        Self {
            parser: RecordParser::from_config(&config),
            validator: ImportValidator::new(&config, catalog),
            config,
        }
    }

    pub fn config(&self) -> &ImportConfig {
        &self.config
    }

    /// 解碼原始位元組後依語法家族分派
    pub fn run_bytes(&self, bytes: &[u8], path_hint: &str) -> Result<ImportResult> {
        let text = source::decode(bytes, &self.config.encoding)?;
        match SourceFormat::resolve(self.config.format, path_hint, &text)? {
            SourceFormat::Delimited => self.run_text(&text),
            SourceFormat::Json => self.run_json_str(&text),
        }
    }

    pub fn run_text(&self, content: &str) -> Result<ImportResult> {
        let mut lines = split_lines(content).into_iter().enumerate();

        // 沒有標題就無法對應任何欄位，標題列切分失敗（僅 strict_quotes）整批中止
        let headers = if self.config.has_header_row {
            match lines.next() {
                Some((_, line)) => Some(self.parser.split(line).map_err(|e| {
                    SkuError::StructuralError {
                        message: format!("cannot parse header row: {}", e),
                    }
                })?),
                None => Some(Vec::new()),
            }
        } else {
            None
        };

        let mut result = ImportResult::default();

        for (row, (index, line)) in lines.enumerate().map(|(i, entry)| (i + 1, entry)) {
            result.total_rows += 1;

            // 整行先去掉前後空白，`trim_whitespace` 只影響欄位本身
            let line = line.trim();
            if self.config.skip_empty_rows && line.is_empty() {
                result.skipped_rows += 1;
                continue;
            }

            let parsed = match self.parser.parse_line(line, index + 1) {
                Ok(parsed) => parsed,
                Err(e) => {
                    tracing::debug!("Row {} (line {}) failed to parse: {}", row, index + 1, e);
                    result.errors.push(ImportError {
                        row,
                        message: format!("Error parsing row: {}", e),
                        data: None,
                    });
                    result.skipped_rows += 1;
                    continue;
                }
            };

            let record = match &headers {
                Some(headers) => {
                    let mut fields = parsed.fields.into_iter();
                    let mut record = RowRecord::with_capacity(headers.len());
                    for header in headers {
                        record.insert(header.as_str(), fields.next().unwrap_or_default());
                    }
                    record
                }
                None => parsed
                    .fields
                    .into_iter()
                    .enumerate()
                    .map(|(i, value)| (format!("column{}", i), value))
                    .collect::<RowRecord>(),
            };

            self.accept_or_reject(&mut result, row, record);
        }

        Ok(self.finish(result))
    }

    pub fn run_json_str(&self, content: &str) -> Result<ImportResult> {
        let value: Value = serde_json::from_str(content).map_err(|e| SkuError::StructuralError {
            message: format!("invalid JSON: {}", e),
        })?;
        self.run_json(value)
    }

    pub fn run_json(&self, value: Value) -> Result<ImportResult> {
        let Value::Array(items) = value else {
            return Err(SkuError::StructuralError {
                message: "JSON data must be an array of objects".to_string(),
            });
        };

        let mut result = ImportResult {
            total_rows: items.len(),
            ..ImportResult::default()
        };

        for (index, item) in items.into_iter().enumerate() {
            let row = index + 1;
            match item {
                Value::Object(map) => {
                    let record = map
                        .into_iter()
                        .map(|(key, value)| (key, json_field_text(value)))
                        .collect::<RowRecord>();
                    self.accept_or_reject(&mut result, row, record);
                }
                _ => {
                    tracing::debug!("Row {} is not a JSON object", row);
                    result.errors.push(ImportError {
                        row,
                        message: "Invalid row format, expected object".to_string(),
                        data: None,
                    });
                    result.skipped_rows += 1;
                }
            }
        }

        Ok(self.finish(result))
    }

    fn accept_or_reject(&self, result: &mut ImportResult, row: usize, record: RowRecord) {
        match self.validator.validate(&record) {
            Ok(()) => {
                result.data.push(record);
                result.data_rows.push(row);
            }
            Err(e) => {
                tracing::debug!("Row {} rejected: {}", row, e);
                result.errors.push(ImportError {
                    row,
                    message: e.to_string(),
                    data: Some(record),
                });
                result.skipped_rows += 1;
            }
        }
    }

    fn finish(&self, mut result: ImportResult) -> ImportResult {
        result.processed_rows = result.data.len();
        result.success = result.errors.is_empty();

        tracing::info!(
            "Parsed {} rows: {} accepted, {} skipped, {} errors",
            result.total_rows,
            result.processed_rows,
            result.skipped_rows,
            result.errors.len()
        );
        result
    }
}

/// 結尾換行後的空片段也算一列（空白列）；每行去掉 `\r`
fn split_lines(content: &str) -> Vec<&str> {
    content
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .collect()
}

fn json_field_text(value: Value) -> String {
    match value {
        Value::String(text) => text,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn pipeline() -> ImportPipeline {
        ImportPipeline::new(ImportConfig::default())
    }

    fn assert_rows_accounted(result: &ImportResult) {
        assert_eq!(
            result.processed_rows + result.errors.len() + result.empty_rows(),
            result.total_rows
        );
    }

    #[test]
    fn test_header_row_maps_fields() {
        let result = pipeline()
            .run_text("sku,msku,marketplace\nAPPLE-RED,FRUIT-001,Amazon\nBANANA-YLW,FRUIT-002,Walmart\n")
            .unwrap();

        assert!(result.success);
        assert_eq!(result.total_rows, 3);
        assert_eq!(result.processed_rows, 2);
        assert_eq!(result.empty_rows(), 1);
        assert_eq!(result.data[0].get("sku"), Some("APPLE-RED"));
        assert_eq!(result.data[1].get("marketplace"), Some("Walmart"));
    }

    #[test]
    fn test_ragged_rows_default_to_empty_and_extra_fields_are_dropped() {
        let result = pipeline()
            .run_text("sku,msku,marketplace\nA-1,M-1\nA-2,M-2,eBay,extra")
            .unwrap();

        assert!(result.success);
        assert_eq!(result.data[0].get("marketplace"), Some(""));
        assert_eq!(result.data[1].len(), 3);
    }

    #[test]
    fn test_without_header_uses_column_keys() {
        let config = ImportConfig {
            has_header_row: false,
            ..ImportConfig::default()
        };
        let result = ImportPipeline::new(config).run_text("A-1,M-1\nA-2,M-2,x").unwrap();

        assert_eq!(result.total_rows, 2);
        assert_eq!(result.data[0].keys().collect::<Vec<_>>(), vec!["column0", "column1"]);
        assert_eq!(result.data[1].get("column2"), Some("x"));
    }

    #[test]
    fn test_empty_rows_skipped_without_error() {
        let result = pipeline().run_text("sku,msku\nA-1,M-1\n   \n\r\nA-2,M-2").unwrap();

        assert!(result.success);
        assert_eq!(result.total_rows, 4);
        assert_eq!(result.processed_rows, 2);
        assert_eq!(result.skipped_rows, 2);
        assert_eq!(result.empty_rows(), 2);
        assert_rows_accounted(&result);

        // 結尾換行留下的空片段算一列空白列
        let result = pipeline().run_text("sku,msku\nA-1,M-1\n").unwrap();
        assert_eq!(result.total_rows, 2);
        assert_eq!(result.processed_rows, 1);
        assert_eq!(result.skipped_rows, 1);
        assert!(result.errors.is_empty());
    }

    #[test]
    fn test_lines_are_trimmed_before_parsing() {
        let config = ImportConfig {
            trim_whitespace: false,
            ..ImportConfig::default()
        };
        let result = ImportPipeline::new(config)
            .run_text("sku,msku\n  A-1,M-1  \nA-2 , M-2")
            .unwrap();

        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].row, 2);
        assert_eq!(result.data[0].get("sku"), Some("A-1"));
        assert_eq!(result.data[0].get("msku"), Some("M-1"));
        assert_eq!(result.data_rows, vec![1]);
    }

    #[test]
    fn test_unterminated_quote_in_header_aborts_under_strict_quotes() {
        let config = ImportConfig {
            strict_quotes: true,
            ..ImportConfig::default()
        };
        assert!(matches!(
            ImportPipeline::new(config).run_text("\"sku,msku\nA-1,M-1"),
            Err(SkuError::StructuralError { .. })
        ));

        let result = pipeline().run_text("\"sku,msku\nA-1,M-1").unwrap();
        assert_eq!(result.processed_rows, 1);
        assert_eq!(result.data[0].get("sku,msku"), Some("A-1"));
    }

    #[test]
    fn test_invalid_sku_recorded_with_data_region_row_number() {
        let result = pipeline()
            .run_text("sku,msku\nA-1,M-1\nbad sku,M-2\n\nA-3,M-3")
            .unwrap();

        assert!(!result.success);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].row, 2);
        assert_eq!(result.errors[0].message, "Invalid SKU format");
        assert_eq!(
            result.errors[0].data.as_ref().and_then(|d| d.get("sku")),
            Some("bad sku")
        );
        assert_eq!(result.processed_rows, 2);
        assert_eq!(result.skipped_rows, 2);
        assert_eq!(result.data_rows, vec![1, 4]);
        assert_rows_accounted(&result);
    }

    #[test]
    fn test_strict_quotes_turn_into_row_errors() {
        let config = ImportConfig {
            strict_quotes: true,
            ..ImportConfig::default()
        };
        let result = ImportPipeline::new(config)
            .run_text("sku,msku\n\"A-1,M-1\nA-2,M-2")
            .unwrap();

        assert_eq!(result.errors.len(), 1);
        assert!(result.errors[0].message.starts_with("Error parsing row: "));
        assert!(result.errors[0].data.is_none());
        assert_eq!(result.processed_rows, 1);
        assert_rows_accounted(&result);
    }

    #[test]
    fn test_keeping_empty_rows_validates_them() {
        let config = ImportConfig {
            skip_empty_rows: false,
            ..ImportConfig::default()
        };
        let result = ImportPipeline::new(config).run_text("sku,msku\n\nA-1,M-1").unwrap();

        assert_eq!(result.total_rows, 2);
        assert_eq!(result.errors[0].message, "Invalid SKU format");
        assert_rows_accounted(&result);
    }

    #[test]
    fn test_empty_input() {
        let result = pipeline().run_text("").unwrap();
        assert!(result.success);
        assert_eq!(result.total_rows, 0);
    }

    #[test]
    fn test_json_array_rows() {
        let result = pipeline()
            .run_json(json!([
                {"sku": "A-1", "msku": "M-1", "qty": 3},
                "not an object",
                {"sku": "bad sku", "msku": "M-2"},
                {"msku": "M-3", "note": null}
            ]))
            .unwrap();

        assert_eq!(result.total_rows, 4);
        assert_eq!(result.processed_rows, 2);
        assert_eq!(result.skipped_rows, 2);
        assert_eq!(result.errors[0].row, 2);
        assert_eq!(result.errors[0].message, "Invalid row format, expected object");
        assert_eq!(result.errors[1].row, 3);
        assert_eq!(result.errors[1].message, "Invalid SKU format");
        assert_eq!(result.data[0].get("qty"), Some("3"));
        assert_eq!(result.data[1].get("note"), Some(""));
        assert_rows_accounted(&result);
    }

    #[test]
    fn test_json_root_must_be_array() {
        assert!(matches!(
            pipeline().run_json(json!({"sku": "A-1"})),
            Err(SkuError::StructuralError { .. })
        ));
        assert!(matches!(
            pipeline().run_json_str("[{\"sku\": "),
            Err(SkuError::StructuralError { .. })
        ));
    }

    #[test]
    fn test_run_bytes_dispatches_on_extension() {
        let json = br#"[{"sku":"A-1","msku":"M-1"}]"#;
        let result = pipeline().run_bytes(json, "upload.json").unwrap();
        assert_eq!(result.processed_rows, 1);

        let csv = b"sku;msku\nA-1;M-1";
        let config = ImportConfig {
            delimiter: ';',
            ..ImportConfig::default()
        };
        let result = ImportPipeline::new(config).run_bytes(csv, "upload.csv").unwrap();
        assert_eq!(result.data[0].get("msku"), Some("M-1"));

        assert!(matches!(
            pipeline().run_bytes(b"", "sheet.xls"),
            Err(SkuError::UnsupportedFormat { .. })
        ));
    }
}
