use crate::core::catalog::MarketplaceFormatCatalog;
use crate::domain::model::{ImportSummary, MappingEvent, MappingUpdate, NewMapping, SkuRecord};
use crate::domain::ports::MappingObserver;
use crate::utils::error::RegistryError;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use tokio::sync::mpsc::UnboundedSender;

pub type Clock = Box<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// SKU → MSKU 對應的權威儲存
///
/// 迭代順序即插入順序，刪除不會打亂其餘項目。寫入需要 `&mut self`，
/// 多個執行環境共用時由呼叫端自行序列化。
pub struct MappingRegistry {
    records: Vec<SkuRecord>,
    index: HashMap<String, usize>,
    catalog: MarketplaceFormatCatalog,
    observers: Vec<Box<dyn MappingObserver>>,
    clock: Clock,
}

impl MappingRegistry {
    pub fn new() -> Self {
        Self::with_catalog(MarketplaceFormatCatalog::standard())
    }

    pub fn with_catalog(catalog: MarketplaceFormatCatalog) -> Self {
        Self {
            records: Vec::new(),
            index: HashMap::new(),
            catalog,
            observers: Vec::new(),
            clock: Box::new(Utc::now),
        }
    }

    pub fn with_clock(mut self, clock: impl Fn() -> DateTime<Utc> + Send + Sync + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn catalog(&self) -> &MarketplaceFormatCatalog {
        &self.catalog
    }

    /// 訂閱者依註冊順序在異動成功後同步呼叫
    pub fn subscribe(&mut self, observer: impl MappingObserver + 'static) {
        self.observers.push(Box::new(observer));
    }

    pub fn add_mapping(&mut self, mapping: NewMapping) -> Result<SkuRecord, RegistryError> {
        if !self.catalog.validate(&mapping.marketplace, &mapping.sku) {
            return Err(RegistryError::InvalidFormat {
                sku: mapping.sku,
                marketplace: mapping.marketplace,
            });
        }

        if self.index.contains_key(&mapping.sku) {
            return Err(RegistryError::DuplicateKey { sku: mapping.sku });
        }

        let record = SkuRecord {
            last_updated: self.stamp(None),
            sku: mapping.sku,
            msku: mapping.msku,
            marketplace: mapping.marketplace,
        };

        self.index.insert(record.sku.clone(), self.records.len());
        self.records.push(record.clone());

        tracing::debug!("Added mapping {} -> {}", record.sku, record.msku);
        self.notify(MappingEvent::Added(record.clone()));
        Ok(record)
    }

    pub fn update_mapping(&mut self, update: MappingUpdate) -> Result<SkuRecord, RegistryError> {
        let Some(&position) = self.index.get(&update.sku) else {
            return Err(RegistryError::NotFound { sku: update.sku });
        };

        let previous = self.records[position].last_updated;
        let last_updated = self.stamp(Some(previous));

        let record = &mut self.records[position];
        if let Some(msku) = update.msku {
            record.msku = msku;
        }
        if let Some(marketplace) = update.marketplace {
            record.marketplace = marketplace;
        }
        record.last_updated = last_updated;

        let merged = record.clone();
        tracing::debug!("Updated mapping {} -> {}", merged.sku, merged.msku);
        self.notify(MappingEvent::Updated(merged.clone()));
        Ok(merged)
    }

    pub fn remove_mapping(&mut self, sku: &str) -> Result<SkuRecord, RegistryError> {
        let Some(position) = self.index.remove(sku) else {
            return Err(RegistryError::NotFound {
                sku: sku.to_string(),
            });
        };

        let removed = self.records.remove(position);
        for shifted in &self.records[position..] {
            if let Some(slot) = self.index.get_mut(&shifted.sku) {
                *slot -= 1;
            }
        }

        tracing::debug!("Removed mapping {}", removed.sku);
        self.notify(MappingEvent::Removed(removed.clone()));
        Ok(removed)
    }

    pub fn get(&self, sku: &str) -> Option<&SkuRecord> {
        self.index.get(sku).map(|&position| &self.records[position])
    }

    pub fn get_msku(&self, sku: &str) -> Option<&str> {
        self.get(sku).map(|record| record.msku.as_str())
    }

    pub fn get_skus_for_msku(&self, msku: &str) -> Vec<SkuRecord> {
        self.records
            .iter()
            .filter(|record| record.msku == msku)
            .cloned()
            .collect()
    }

    /// sku、msku、marketplace 任一欄位包含查詢字串（不分大小寫）
    pub fn search_skus(&self, query: &str) -> Vec<SkuRecord> {
        let needle = query.to_lowercase();
        self.records
            .iter()
            .filter(|record| {
                record.sku.to_lowercase().contains(&needle)
                    || record.msku.to_lowercase().contains(&needle)
                    || record.marketplace.to_lowercase().contains(&needle)
            })
            .cloned()
            .collect()
    }

    pub fn detect_marketplace(&self, sku: &str) -> Option<&str> {
        self.catalog.detect(sku)
    }

    /// 逐筆新增，失敗不中斷
    pub fn import_mappings(&mut self, mappings: Vec<NewMapping>) -> ImportSummary {
        let mut summary = ImportSummary {
            total: mappings.len(),
            ..ImportSummary::default()
        };

        for mapping in mappings {
            let sku = mapping.sku.clone();
            match self.add_mapping(mapping) {
                Ok(_) => summary.imported += 1,
                Err(e) => {
                    tracing::warn!("Mapping for SKU {} rejected: {}", sku, e);
                    summary.failed += 1;
                    summary.errors.push(format!("SKU {}: {}", sku, e));
                }
            }
        }

        summary.success = summary.failed == 0;
        tracing::info!("{}", summary.message());
        summary
    }

    pub fn export_mappings(&self) -> Vec<SkuRecord> {
        self.records.clone()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// 時鐘沒有前進時補 1 毫秒，確保同一 SKU 的時間戳嚴格遞增
    fn stamp(&self, previous: Option<DateTime<Utc>>) -> DateTime<Utc> {
        let now = (self.clock)();
        match previous {
            Some(previous) if now <= previous => previous + Duration::milliseconds(1),
            _ => now,
        }
    }

    fn notify(&self, event: MappingEvent) {
        for observer in &self.observers {
            observer.on_event(&event);
        }
    }
}

impl Default for MappingRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MappingRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MappingRegistry")
            .field("records", &self.records)
            .field("catalog", &self.catalog)
            .field("observers", &self.observers.len())
            .finish()
    }
}

/// 把異動轉送到 channel，讓其他 task 上的持久化元件鏡像註冊表
#[derive(Debug, Clone)]
pub struct ChannelObserver {
    sender: UnboundedSender<MappingEvent>,
}

impl ChannelObserver {
    pub fn new(sender: UnboundedSender<MappingEvent>) -> Self {
        Self { sender }
    }
}

impl MappingObserver for ChannelObserver {
    fn on_event(&self, event: &MappingEvent) {
        if self.sender.send(event.clone()).is_err() {
            tracing::warn!("Dropped {} event: receiver closed", event.name());
        }
    }
}
