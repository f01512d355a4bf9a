//! 供應商目錄模型

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 供應商類別
///
/// 評估順序固定：自家農場 → 外部供應商 → 市場（最後手段）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SupplierKind {
    /// 自家農場（內部供應）
    Home,
    /// 外部供應商
    External,
    /// 批發市場
    Market,
}

impl SupplierKind {
    /// 評估優先順序（越小越先）
    pub fn evaluation_rank(self) -> u8 {
        match self {
            SupplierKind::Home => 0,
            SupplierKind::External => 1,
            SupplierKind::Market => 2,
        }
    }

    pub fn is_home(self) -> bool {
        self == SupplierKind::Home
    }
}

/// 供應商選擇結果類別
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    /// 單一供應商可完整供應
    Full,
    /// 只能部分供應（取得分最高者）
    Partial,
    /// 沒有可用供應商，以市場合成價格代替
    MarketFallback,
}

/// 供應商目錄項目（供應商 × 產品）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupplierCatalogEntry {
    /// 供應商ID
    pub supplier_id: String,

    /// 供應商名稱
    pub supplier_name: String,

    /// 供應商類別
    pub supplier_kind: SupplierKind,

    /// 產品ID
    pub product_id: String,

    /// 單價
    pub unit_price: Decimal,

    /// 可供應數量
    pub available_quantity: Decimal,

    /// 交期（天）
    pub lead_time_days: u32,

    /// 品質評分（0-10）
    pub quality_rating: Decimal,

    /// 是否可供貨
    pub is_available: bool,
}

impl SupplierCatalogEntry {
    /// 創建新的目錄項目
    pub fn new(
        supplier_id: String,
        supplier_name: String,
        supplier_kind: SupplierKind,
        product_id: String,
        unit_price: Decimal,
        available_quantity: Decimal,
    ) -> Self {
        Self {
            supplier_id,
            supplier_name,
            supplier_kind,
            product_id,
            unit_price,
            available_quantity,
            lead_time_days: 1,
            quality_rating: Decimal::from(5),
            is_available: true,
        }
    }

    /// 建構器模式：設置交期
    pub fn with_lead_time(mut self, days: u32) -> Self {
        self.lead_time_days = days;
        self
    }

    /// 建構器模式：設置品質評分
    pub fn with_quality_rating(mut self, rating: Decimal) -> Self {
        self.quality_rating = rating;
        self
    }

    /// 建構器模式：標記為暫停供貨
    pub fn unavailable(mut self) -> Self {
        self.is_available = false;
        self
    }

    /// 是否為自家農場
    pub fn is_home(&self) -> bool {
        self.supplier_kind.is_home()
    }

    /// 能否完整滿足需求量
    pub fn can_fulfill(&self, quantity: Decimal) -> bool {
        self.available_quantity >= quantity
    }
}
