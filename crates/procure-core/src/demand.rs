//! 需求模型（客戶訂單快照與彙總需求）

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{ProcureError, Result};

/// 訂單狀態
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// 草稿
    Pending,
    /// 已確認
    Confirmed,
    /// 處理中
    Processing,
    /// 已發採購單
    PoSent,
    /// 採購單已確認
    PoConfirmed,
    /// 已送達
    Delivered,
    /// 已取消
    Cancelled,
}

impl OrderStatus {
    /// 是否計入需求彙總
    pub fn is_active(self) -> bool {
        matches!(
            self,
            OrderStatus::Confirmed
                | OrderStatus::Processing
                | OrderStatus::PoSent
                | OrderStatus::PoConfirmed
        )
    }
}

/// 訂單明細
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderLine {
    pub product_id: String,
    pub quantity: Decimal,
    pub unit_price: Decimal,
}

impl OrderLine {
    pub fn new(product_id: String, quantity: Decimal, unit_price: Decimal) -> Self {
        Self {
            product_id,
            quantity,
            unit_price,
        }
    }

    /// 明細金額
    pub fn line_value(&self) -> Decimal {
        self.quantity * self.unit_price
    }
}

/// 客戶訂單快照
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderSnapshot {
    /// 訂單ID
    pub id: String,

    /// 客戶ID
    pub customer_id: String,

    /// 下單日期
    pub order_date: NaiveDate,

    /// 狀態
    pub status: OrderStatus,

    /// 明細
    pub lines: Vec<OrderLine>,
}

impl OrderSnapshot {
    /// 創建新的訂單快照（已確認狀態）
    pub fn new(id: String, customer_id: String, order_date: NaiveDate) -> Self {
        Self {
            id,
            customer_id,
            order_date,
            status: OrderStatus::Confirmed,
            lines: Vec::new(),
        }
    }

    /// 建構器模式：設置狀態
    pub fn with_status(mut self, status: OrderStatus) -> Self {
        self.status = status;
        self
    }

    /// 建構器模式：新增明細
    pub fn with_line(mut self, product_id: &str, quantity: Decimal, unit_price: Decimal) -> Self {
        self.lines
            .push(OrderLine::new(product_id.to_string(), quantity, unit_price));
        self
    }

    /// 訂單總額
    pub fn total_value(&self) -> Decimal {
        self.lines.iter().map(OrderLine::line_value).sum()
    }
}

/// 分析期間（含起訖日）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisPeriod {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl AnalysisPeriod {
    /// 創建分析期間，結束日必須晚於開始日
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if end <= start {
            return Err(ProcureError::InvalidPeriod(format!(
                "結束日 {} 必須晚於開始日 {}",
                end, start
            )));
        }
        Ok(Self { start, end })
    }

    /// 日期是否落在期間內
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    /// 期間天數
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days()
    }
}

/// 單一產品的彙總需求
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemandLine {
    pub product_id: String,

    /// 總訂購量
    pub total_quantity: Decimal,

    /// 總訂購金額
    pub total_value: Decimal,

    /// 涉及訂單數
    pub order_count: u32,
}

impl DemandLine {
    pub fn new(product_id: String) -> Self {
        Self {
            product_id,
            total_quantity: Decimal::ZERO,
            total_value: Decimal::ZERO,
            order_count: 0,
        }
    }

    /// 平均單價（無數量時為 0）
    pub fn average_unit_price(&self) -> Decimal {
        if self.total_quantity.is_zero() {
            Decimal::ZERO
        } else {
            self.total_value / self.total_quantity
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_order_snapshot_builder() {
        let order = OrderSnapshot::new("SO-1".to_string(), "BISTRO".to_string(), date(2025, 11, 3))
            .with_line("TOMATO", dec!(10), dec!(45))
            .with_line("BASIL", dec!(4), dec!(12.5));

        assert_eq!(order.lines.len(), 2);
        assert_eq!(order.total_value(), dec!(500));
        assert!(order.status.is_active());
    }

    #[test]
    fn test_active_statuses() {
        assert!(!OrderStatus::Pending.is_active());
        assert!(OrderStatus::PoSent.is_active());
        assert!(!OrderStatus::Delivered.is_active());
        assert!(!OrderStatus::Cancelled.is_active());
    }

    #[test]
    fn test_analysis_period() {
        let period = AnalysisPeriod::new(date(2025, 11, 3), date(2025, 11, 6)).unwrap();

        assert_eq!(period.days(), 3);
        assert!(period.contains(date(2025, 11, 3)));
        assert!(period.contains(date(2025, 11, 6)));
        assert!(!period.contains(date(2025, 11, 7)));

        assert!(AnalysisPeriod::new(date(2025, 11, 6), date(2025, 11, 6)).is_err());
    }

    #[test]
    fn test_average_unit_price() {
        let mut line = DemandLine::new("TOMATO".to_string());
        assert_eq!(line.average_unit_price(), Decimal::ZERO);

        line.total_quantity = dec!(4);
        line.total_value = dec!(100);
        assert_eq!(line.average_unit_price(), dec!(25));
    }
}
