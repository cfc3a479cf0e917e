use crate::config::import_config::ImportConfig;
use crate::core::catalog::MarketplaceFormatCatalog;
use crate::domain::model::RowRecord;
use thiserror::Error;

pub const SKU_FIELD: &str = "sku";
pub const MSKU_FIELD: &str = "msku";
pub const MARKETPLACE_FIELD: &str = "marketplace";

/// 單列驗證失敗；訊息文字會原樣出現在匯入結果中
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Invalid SKU format")]
    InvalidSku,

    #[error("Missing required field: {field}")]
    MissingField { field: String },

    #[error("Invalid SKU format for {marketplace}")]
    MarketplaceFormat { marketplace: String },
}

/// 英數字、連字號、底線，且不可為空
pub fn is_valid_sku_syntax(sku: &str) -> bool {
    !sku.is_empty()
        && sku
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

#[derive(Debug, Clone)]
pub struct ImportValidator {
    validate_sku: bool,
    required_fields: Vec<String>,
    check_marketplace_format: bool,
    catalog: MarketplaceFormatCatalog,
}

impl ImportValidator {
    pub fn new(config: &ImportConfig, catalog: MarketplaceFormatCatalog) -> Self {
        Self {
            validate_sku: config.validate_sku,
            required_fields: config.required_fields.clone(),
            check_marketplace_format: config.check_marketplace_format,
            catalog,
        }
    }

    /// 依序檢查，回傳第一個失敗
    pub fn validate(&self, record: &RowRecord) -> Result<(), ValidationError> {
        if self.validate_sku {
            if let Some(sku) = record.get(SKU_FIELD) {
                if !is_valid_sku_syntax(sku) {
                    return Err(ValidationError::InvalidSku);
                }
            }
        }

        for field in &self.required_fields {
            let present = record
                .get(field)
                .is_some_and(|value| !value.trim().is_empty());
            if !present {
                return Err(ValidationError::MissingField {
                    field: field.clone(),
                });
            }
        }

        if self.check_marketplace_format {
            if let (Some(sku), Some(marketplace)) =
                (record.get(SKU_FIELD), record.get(MARKETPLACE_FIELD))
            {
                if !self.catalog.validate(marketplace, sku) {
                    return Err(ValidationError::MarketplaceFormat {
                        marketplace: marketplace.to_string(),
                    });
                }
            }
        }

        Ok(())
    }
}
