use crate::config::import_config::ImportConfig;
use crate::core::catalog::MarketplaceFormatCatalog;
use crate::core::pipeline::ImportPipeline;
use crate::core::registry::MappingRegistry;
use crate::core::validator::{MARKETPLACE_FIELD, MSKU_FIELD, SKU_FIELD};
use crate::core::{ImportResult, ImportSummary, MappingBatch, Pipeline, Storage};
use crate::domain::model::{NewMapping, RowRecord};
use crate::utils::error::Result;

/// 沒有標題列時依欄位位置對應：sku, msku, marketplace
const POSITIONAL_FIELDS: [(&str, &str); 3] = [
    (SKU_FIELD, "column0"),
    (MSKU_FIELD, "column1"),
    (MARKETPLACE_FIELD, "column2"),
];

/// 從儲存體讀取單一檔案並匯入註冊表
pub struct FileImportJob<S: Storage> {
    storage: S,
    path: String,
    pipeline: ImportPipeline,
    catalog: MarketplaceFormatCatalog,
}

impl<S: Storage> FileImportJob<S> {
    pub fn new(storage: S, path: impl Into<String>, config: ImportConfig) -> Self {
        let catalog = MarketplaceFormatCatalog::standard();
        Self {
            storage,
            path: path.into(),
            pipeline: ImportPipeline::with_catalog(config, catalog.clone()),
            catalog,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

#[async_trait::async_trait]
impl<S: Storage> Pipeline for FileImportJob<S> {
    async fn extract(&self) -> Result<ImportResult> {
        tracing::debug!("Reading {}", self.path);
        let bytes = self.storage.read_file(&self.path).await?;
        tracing::debug!("Read {} bytes from {}", bytes.len(), self.path);

        self.pipeline.run_bytes(&bytes, &self.path)
    }

    async fn transform(&self, parsed: &ImportResult) -> Result<MappingBatch> {
        Ok(rows_to_mappings(parsed.accepted_rows(), &self.catalog))
    }

    async fn load(
        &self,
        batch: MappingBatch,
        registry: &mut MappingRegistry,
    ) -> Result<ImportSummary> {
        Ok(registry.import_mappings(batch.mappings))
    }
}

/// 把通過驗證的資料列轉成待匯入的對應
///
/// msku 原樣帶入；marketplace 空白時以目錄偵測結果補上，偵測不到則留空。
/// 錯誤訊息的列號與解析階段的 `ImportError.row` 相同。
pub fn rows_to_mappings<'a>(
    rows: impl IntoIterator<Item = (usize, &'a RowRecord)>,
    catalog: &MarketplaceFormatCatalog,
) -> MappingBatch {
    let mut batch = MappingBatch::default();

    for (row_number, row) in rows {
        let sku = field(row, SKU_FIELD);
        let msku = field(row, MSKU_FIELD);

        let (Some(sku), Some(msku)) = (sku, msku) else {
            let missing = if sku.is_none() { SKU_FIELD } else { MSKU_FIELD };
            batch.errors.push(format!(
                "Row {}: Missing required field: {}",
                row_number, missing
            ));
            continue;
        };

        let marketplace = match field(row, MARKETPLACE_FIELD) {
            Some(marketplace) => marketplace.to_string(),
            None => catalog.detect(sku).unwrap_or_default().to_string(),
        };

        batch.mappings.push(NewMapping::new(sku, msku, marketplace));
    }

    batch
}

fn field<'a>(row: &'a RowRecord, name: &str) -> Option<&'a str> {
    let positional = POSITIONAL_FIELDS
        .iter()
        .find(|(field, _)| *field == name)
        .map(|(_, column)| *column);

    row.get(name)
        .or_else(|| positional.and_then(|column| row.get(column)))
        .map(str::trim)
        .filter(|value| !value.is_empty())
}
