//! 缺貨記錄與採購建議模型

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{MatchKind, ProcureError, Result, SupplierKind};

/// 緊急程度（由低到高排序）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UrgencyLevel {
    Low,
    Medium,
    High,
    Critical,
}

/// 單一產品的缺貨分析結果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShortfallRecord {
    pub product_id: String,
    pub product_name: String,

    /// 期間總訂購量
    pub ordered_quantity: Decimal,

    /// 期間總訂購金額
    pub ordered_value: Decimal,

    /// 可用庫存
    pub available_quantity: Decimal,

    /// 最低庫存
    pub minimum_stock: Decimal,

    /// 缺貨量 = max(0, 訂購量 - 可用庫存)
    pub shortfall: Decimal,

    pub urgency: UrgencyLevel,

    /// 缺貨估值
    pub estimated_shortfall_value: Decimal,
}

impl ShortfallRecord {
    /// 是否有缺貨
    pub fn has_shortfall(&self) -> bool {
        self.shortfall > Decimal::ZERO
    }
}

/// 採購建議狀態
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationStatus {
    Pending,
    Approved,
    Rejected,
}

/// 採購建議
///
/// 內含審核人員決策所需的全部資料（產品名稱、供應商名稱、成本），不需回查。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcurementRecommendation {
    pub id: Uuid,
    pub product_id: String,
    pub product_name: String,
    pub unit: String,

    /// 缺貨量
    pub shortfall_quantity: Decimal,

    /// 有效緩衝 %
    pub buffer_percentage: Decimal,

    /// 緩衝量
    pub buffer_quantity: Decimal,

    /// 建議採購量
    pub recommended_quantity: Decimal,

    pub supplier_id: String,
    pub supplier_name: String,
    pub supplier_kind: SupplierKind,
    pub match_kind: MatchKind,

    /// 該供應商可供應量
    pub fulfillable_quantity: Decimal,

    pub estimated_unit_cost: Decimal,
    pub estimated_total_cost: Decimal,
    pub lead_time_days: u32,

    pub urgency: UrgencyLevel,
    pub recommended_order_date: NaiveDate,
    pub expected_delivery_date: NaiveDate,

    pub status: RecommendationStatus,

    /// 建議原因
    pub reason: String,
}

impl ProcurementRecommendation {
    /// 核准（僅限待審）
    pub fn approve(&mut self) -> Result<()> {
        self.transition(RecommendationStatus::Approved)
    }

    /// 駁回（僅限待審）
    pub fn reject(&mut self) -> Result<()> {
        self.transition(RecommendationStatus::Rejected)
    }

    /// 是否需要向市場採購（無供應商可用）
    pub fn is_market_fallback(&self) -> bool {
        self.match_kind == MatchKind::MarketFallback
    }

    fn transition(&mut self, next: RecommendationStatus) -> Result<()> {
        if self.status != RecommendationStatus::Pending {
            return Err(ProcureError::InvalidTransition(format!(
                "採購建議 {} 狀態為 {:?}，不可轉為 {:?}",
                self.id, self.status, next
            )));
        }
        self.status = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn recommendation() -> ProcurementRecommendation {
        let date = NaiveDate::from_ymd_opt(2025, 11, 3).unwrap();
        ProcurementRecommendation {
            id: crate::record_id("recommendation", "TOMATO:2025-11-03"),
            product_id: "TOMATO".to_string(),
            product_name: "Cherry Tomatoes".to_string(),
            unit: "kg".to_string(),
            shortfall_quantity: dec!(10),
            buffer_percentage: dec!(15),
            buffer_quantity: dec!(1.5),
            recommended_quantity: dec!(11.5),
            supplier_id: "FARM".to_string(),
            supplier_name: "Home Farm".to_string(),
            supplier_kind: SupplierKind::Home,
            match_kind: MatchKind::Full,
            fulfillable_quantity: dec!(20),
            estimated_unit_cost: dec!(12),
            estimated_total_cost: dec!(138),
            lead_time_days: 0,
            urgency: UrgencyLevel::High,
            recommended_order_date: date,
            expected_delivery_date: date,
            status: RecommendationStatus::Pending,
            reason: "test".to_string(),
        }
    }

    #[test]
    fn test_urgency_ordering() {
        assert!(UrgencyLevel::Critical > UrgencyLevel::High);
        assert!(UrgencyLevel::High > UrgencyLevel::Medium);
        assert!(UrgencyLevel::Medium > UrgencyLevel::Low);
    }

    #[test]
    fn test_approve_once() {
        let mut rec = recommendation();
        rec.approve().unwrap();
        assert_eq!(rec.status, RecommendationStatus::Approved);

        assert!(matches!(rec.reject(), Err(ProcureError::InvalidTransition(_))));
        assert!(rec.approve().is_err());
    }

    #[test]
    fn test_reject_pending() {
        let mut rec = recommendation();
        rec.reject().unwrap();
        assert_eq!(rec.status, RecommendationStatus::Rejected);
        assert!(!rec.is_market_fallback());
    }
}
