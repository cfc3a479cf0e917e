use crate::core::registry::MappingRegistry;
use crate::domain::model::{ImportResult, ImportSummary, MappingBatch, MappingEvent};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

/// 註冊表異動的訂閱者，於異動成功後同步呼叫
pub trait MappingObserver: Send + Sync {
    fn on_event(&self, event: &MappingEvent);
}

impl<F> MappingObserver for F
where
    F: Fn(&MappingEvent) + Send + Sync,
{
    fn on_event(&self, event: &MappingEvent) {
        self(event)
    }
}

/// 匯入作業的三個階段：讀取解析、轉成對應、寫入註冊表
#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<ImportResult>;
    async fn transform(&self, parsed: &ImportResult) -> Result<MappingBatch>;
    async fn load(&self, batch: MappingBatch, registry: &mut MappingRegistry)
        -> Result<ImportSummary>;
}
