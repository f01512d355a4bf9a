//! # Procurement Core
//!
//! 核心資料模型與類型定義（快照、政策、規則、記錄）

pub mod buffer;
pub mod calendar;
pub mod config;
pub mod demand;
pub mod inventory;
pub mod market;
pub mod pricing;
pub mod product;
pub mod recommendation;
pub mod supplier;

// Re-export 主要類型
pub use buffer::{BufferCombination, BufferPolicy, BufferPolicySet, SeasonalAdjustment};
pub use calendar::OrderCycleCalendar;
pub use config::{EngineConfig, MarketSupplierRef, UrgencyOffsets};
pub use demand::{AnalysisPeriod, DemandLine, OrderLine, OrderSnapshot, OrderStatus};
pub use inventory::{AdjustmentDirection, StockMovement, StockSnapshot};
pub use market::{MarketPriceObservation, PriceTrend, VolatilityTier};
pub use pricing::{
    CustomerPriceList, CustomerPriceListItem, CustomerSegment, PriceListStatus, PriceSource,
    PricingRule,
};
pub use product::{Department, Product};
pub use recommendation::{
    ProcurementRecommendation, RecommendationStatus, ShortfallRecord, UrgencyLevel,
};
pub use supplier::{MatchKind, SupplierCatalogEntry, SupplierKind};

/// 採購引擎錯誤類型
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProcureError {
    #[error("無效的數量: {0}")]
    InvalidQuantity(String),

    #[error("無效的期間: {0}")]
    InvalidPeriod(String),

    #[error("期間未對齊訂貨日: {0}")]
    PeriodNotAligned(String),

    #[error("無效的緩衝政策: {0}")]
    InvalidPolicy(String),

    #[error("無效的定價規則: {0}")]
    InvalidRule(String),

    #[error("無效的價格: {0}")]
    InvalidPrice(String),

    #[error("找不到產品: {0}")]
    ProductNotFound(String),

    #[error("沒有市場價格: {0}")]
    NoMarketPrice(String),

    #[error("不允許的狀態轉換: {0}")]
    InvalidTransition(String),

    #[error("無效的配置: {0}")]
    InvalidConfig(String),

    #[error("計算錯誤: {0}")]
    CalculationError(String),
}

pub type Result<T> = std::result::Result<T, ProcureError>;

/// 由自然鍵產生可重現的記錄 ID（相同輸入重跑得到相同 ID）
pub fn record_id(kind: &str, natural_key: &str) -> uuid::Uuid {
    uuid::Uuid::new_v5(
        &uuid::Uuid::NAMESPACE_OID,
        format!("{}:{}", kind, natural_key).as_bytes(),
    )
}
