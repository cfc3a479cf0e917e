use crate::utils::error::{Result, SkuError};
use regex::Regex;

/// 內建平台格式，順序即 `detect` 的比對順序
const STANDARD_FORMATS: &[(&str, &str)] = &[
    ("Amazon", r"^[A-Z0-9]{10}$"),
    ("Walmart", r"^[A-Z]{3}\d{5}$"),
    ("eBay", r"^[A-Z]+-\d{4}$"),
    ("Shopify", r"^[A-Z]+-[A-Z0-9]+-\d{2}$"),
];

/// 各平台 SKU 格式的有序表
#[derive(Debug, Clone, Default)]
pub struct MarketplaceFormatCatalog {
    entries: Vec<(String, Regex)>,
}

impl MarketplaceFormatCatalog {
    /// 空目錄：所有平台都不檢查格式
    pub fn new() -> Self {
        Self::default()
    }

    pub fn standard() -> Self {
        let mut catalog = Self::new();
        for (marketplace, pattern) in STANDARD_FORMATS {
            catalog
                .register(marketplace, pattern)
                .expect("built-in marketplace patterns are valid");
        }
        catalog
    }

    /// 已存在的平台會原地替換，保留原本位置
    pub fn register(&mut self, marketplace: &str, pattern: &str) -> Result<()> {
        let regex = Regex::new(pattern).map_err(|e| SkuError::InvalidConfigValueError {
            field: format!("catalog.{}", marketplace),
            value: pattern.to_string(),
            reason: e.to_string(),
        })?;

        match self.entries.iter_mut().find(|(name, _)| name == marketplace) {
            Some((_, existing)) => *existing = regex,
            None => self.entries.push((marketplace.to_string(), regex)),
        }
        Ok(())
    }

    pub fn pattern(&self, marketplace: &str) -> Option<&Regex> {
        self.entries
            .iter()
            .find(|(name, _)| name == marketplace)
            .map(|(_, regex)| regex)
    }

    /// 沒有登記格式的平台一律放行
    pub fn validate(&self, marketplace: &str, sku: &str) -> bool {
        self.pattern(marketplace)
            .map_or(true, |regex| regex.is_match(sku))
    }

    pub fn detect(&self, sku: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(_, regex)| regex.is_match(sku))
            .map(|(name, _)| name.as_str())
    }

    pub fn marketplaces(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
