use crate::core::registry::MappingRegistry;
use crate::core::{ImportReport, ImportResult, MappingBatch, Pipeline};
use crate::utils::error::Result;

pub struct ImportEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> ImportEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    pub async fn run(&self, registry: &mut MappingRegistry) -> Result<ImportReport> {
        tracing::info!("Starting import...");

        // Extract
        let parsed = self.pipeline.extract().await?;
        tracing::info!(
            "Parsed {} rows ({} accepted, {} skipped)",
            parsed.total_rows,
            parsed.processed_rows,
            parsed.skipped_rows
        );

        // Transform
        let batch = self.pipeline.transform(&parsed).await?;
        let conversion_errors = batch.errors.clone();
        if !conversion_errors.is_empty() {
            tracing::warn!("{} rows could not be converted", conversion_errors.len());
        }

        // Load
        let summary = self.pipeline.load(batch, registry).await?;
        tracing::info!("{}", summary.message());

        Ok(ImportReport {
            parse: parsed,
            conversion_errors,
            summary,
        })
    }

    /// 只解析和轉換，不寫入註冊表
    pub async fn preview(&self) -> Result<(ImportResult, MappingBatch)> {
        let parsed = self.pipeline.extract().await?;
        let batch = self.pipeline.transform(&parsed).await?;
        Ok((parsed, batch))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ImportSummary, NewMapping, RowRecord};
    use crate::utils::error::SkuError;

    struct StaticPipeline {
        rows: Vec<RowRecord>,
    }

    #[async_trait::async_trait]
    impl Pipeline for StaticPipeline {
        async fn extract(&self) -> Result<ImportResult> {
            Ok(ImportResult {
                success: true,
                total_rows: self.rows.len(),
                processed_rows: self.rows.len(),
                skipped_rows: 0,
                errors: Vec::new(),
                data: self.rows.clone(),
                data_rows: (1..=self.rows.len()).collect(),
            })
        }

        async fn transform(&self, parsed: &ImportResult) -> Result<MappingBatch> {
            Ok(MappingBatch {
                mappings: parsed
                    .data
                    .iter()
                    .map(|row| {
                        NewMapping::new(
                            row.get("sku").unwrap_or_default(),
                            row.get("msku").unwrap_or_default(),
                            "",
                        )
                    })
                    .collect(),
                errors: vec!["Row 9: Missing required field: msku".to_string()],
            })
        }

        async fn load(
            &self,
            batch: MappingBatch,
            registry: &mut MappingRegistry,
        ) -> Result<ImportSummary> {
            Ok(registry.import_mappings(batch.mappings))
        }
    }

    struct FailingPipeline;

    #[async_trait::async_trait]
    impl Pipeline for FailingPipeline {
        async fn extract(&self) -> Result<ImportResult> {
            Err(SkuError::StructuralError {
                message: "JSON data must be an array of objects".to_string(),
            })
        }

        async fn transform(&self, _parsed: &ImportResult) -> Result<MappingBatch> {
            unreachable!("extract always fails")
        }

        async fn load(
            &self,
            _batch: MappingBatch,
            _registry: &mut MappingRegistry,
        ) -> Result<ImportSummary> {
            unreachable!("extract always fails")
        }
    }

    #[tokio::test]
    async fn test_run_collects_every_stage() {
        let rows = vec![
            vec![("sku", "A-1"), ("msku", "M-1")].into_iter().collect(),
            vec![("sku", "A-1"), ("msku", "M-2")].into_iter().collect(),
        ];
        let engine = ImportEngine::new(StaticPipeline { rows });
        let mut registry = MappingRegistry::new();

        let report = engine.run(&mut registry).await.unwrap();

        assert!(report.parse.success);
        assert_eq!(report.conversion_errors.len(), 1);
        assert_eq!(report.summary.imported, 1);
        assert_eq!(report.summary.failed, 1);
        assert!(!report.success());
        assert_eq!(registry.len(), 1);
    }

    #[tokio::test]
    async fn test_preview_leaves_registry_untouched() {
        let rows = vec![vec![("sku", "A-1"), ("msku", "M-1")].into_iter().collect()];
        let engine = ImportEngine::new(StaticPipeline { rows });

        let (parsed, batch) = engine.preview().await.unwrap();
        assert_eq!(parsed.processed_rows, 1);
        assert_eq!(batch.mappings.len(), 1);
    }

    #[tokio::test]
    async fn test_structural_failure_aborts_the_run() {
        let engine = ImportEngine::new(FailingPipeline);
        let mut registry = MappingRegistry::new();

        let result = engine.run(&mut registry).await;
        assert!(matches!(result, Err(SkuError::StructuralError { .. })));
        assert!(registry.is_empty());
    }
}
