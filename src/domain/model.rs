use chrono::{DateTime, Utc};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

/// 註冊表中的一筆 SKU → MSKU 對應
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkuRecord {
    pub sku: String,
    pub msku: String,
    pub marketplace: String,
    pub last_updated: DateTime<Utc>,
}

/// 新增對應時由呼叫端提供的欄位，`last_updated` 一律由註冊表蓋章
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewMapping {
    pub sku: String,
    pub msku: String,
    #[serde(default)]
    pub marketplace: String,
}

impl NewMapping {
    pub fn new(
        sku: impl Into<String>,
        msku: impl Into<String>,
        marketplace: impl Into<String>,
    ) -> Self {
        Self {
            sku: sku.into(),
            msku: msku.into(),
            marketplace: marketplace.into(),
        }
    }
}

impl From<SkuRecord> for NewMapping {
    fn from(record: SkuRecord) -> Self {
        Self {
            sku: record.sku,
            msku: record.msku,
            marketplace: record.marketplace,
        }
    }
}

/// 部分更新，只有 `Some` 的欄位會覆寫
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MappingUpdate {
    pub sku: String,
    pub msku: Option<String>,
    pub marketplace: Option<String>,
}

impl MappingUpdate {
    pub fn for_sku(sku: impl Into<String>) -> Self {
        Self {
            sku: sku.into(),
            ..Self::default()
        }
    }

    pub fn msku(mut self, msku: impl Into<String>) -> Self {
        self.msku = Some(msku.into());
        self
    }

    pub fn marketplace(mut self, marketplace: impl Into<String>) -> Self {
        self.marketplace = Some(marketplace.into());
        self
    }
}

/// 解析後的一行原始欄位
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedRow {
    pub line: usize,
    pub fields: Vec<String>,
}

/// 以欄位名稱索引的資料列，保留欄位插入順序
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowRecord {
    fields: Vec<(String, String)>,
}

impl RowRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            fields: Vec::with_capacity(capacity),
        }
    }

    /// 重複的欄位名保留第一次出現的位置，值以最後一次為準
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(existing, _)| *existing == key) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, value)| value.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(key, _)| key.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RowRecord {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = RowRecord::new();
        for (key, value) in iter {
            record.insert(key, value);
        }
        record
    }
}

impl Serialize for RowRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (key, value) in &self.fields {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// 單列的匯入錯誤，`row` 從資料區第一列起算（不含標題列）
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportError {
    pub row: usize,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<RowRecord>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportResult {
    pub success: bool,
    pub total_rows: usize,
    pub processed_rows: usize,
    pub skipped_rows: usize,
    pub errors: Vec<ImportError>,
    pub data: Vec<RowRecord>,
    /// `data` 中每一筆對應的資料區列號
    #[serde(skip)]
    pub data_rows: Vec<usize>,
}

impl ImportResult {
    /// 因空白而略過的列數（錯誤列也計入 `skipped_rows`）
    pub fn empty_rows(&self) -> usize {
        self.skipped_rows.saturating_sub(self.errors.len())
    }

    /// 通過驗證的資料列與其列號；未記錄列號時以 `data` 內的位置代替
    pub fn accepted_rows(&self) -> impl Iterator<Item = (usize, &RowRecord)> {
        let numbered = self.data_rows.len() == self.data.len();
        self.data.iter().enumerate().map(move |(index, record)| {
            let row = if numbered {
                self.data_rows[index]
            } else {
                index + 1
            };
            (row, record)
        })
    }
}

/// 批次匯入註冊表的統計
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub success: bool,
    pub total: usize,
    pub imported: usize,
    pub failed: usize,
    pub errors: Vec<String>,
}

impl ImportSummary {
    pub fn message(&self) -> String {
        format!("Imported {} of {} mappings", self.imported, self.total)
    }
}

/// 通過驗證的資料列轉成的待匯入對應
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MappingBatch {
    pub mappings: Vec<NewMapping>,
    /// 缺少 sku 或 msku 而無法轉換的資料列
    pub errors: Vec<String>,
}

/// 一次檔案匯入的完整帳目：解析、轉換、寫入註冊表
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportReport {
    pub parse: ImportResult,
    pub conversion_errors: Vec<String>,
    pub summary: ImportSummary,
}

impl ImportReport {
    pub fn success(&self) -> bool {
        self.parse.success && self.conversion_errors.is_empty() && self.summary.success
    }
}

/// 註冊表異動通知
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MappingEvent {
    Added(SkuRecord),
    Updated(SkuRecord),
    Removed(SkuRecord),
}

impl MappingEvent {
    pub const ADDED: &'static str = "mapping-added";
    pub const UPDATED: &'static str = "mapping-updated";
    pub const REMOVED: &'static str = "mapping-removed";

    pub fn name(&self) -> &'static str {
        match self {
            MappingEvent::Added(_) => Self::ADDED,
            MappingEvent::Updated(_) => Self::UPDATED,
            MappingEvent::Removed(_) => Self::REMOVED,
        }
    }

    pub fn payload(&self) -> &SkuRecord {
        match self {
            MappingEvent::Added(record)
            | MappingEvent::Updated(record)
            | MappingEvent::Removed(record) => record,
        }
    }
}

impl Serialize for MappingEvent {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry("eventName", self.name())?;
        map.serialize_entry("payload", self.payload())?;
        map.end()
    }
}
