//! 庫存快照與庫存異動

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{ProcureError, Result};

/// 盤點調整方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdjustmentDirection {
    Increase,
    Decrease,
}

/// 庫存異動
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "movement_type", rename_all = "snake_case")]
pub enum StockMovement {
    /// 進貨（更新平均成本）
    Receipt { quantity: Decimal, unit_cost: Decimal },
    /// 自家生產入庫
    Production { quantity: Decimal },
    /// 銷售出庫
    Sale { quantity: Decimal },
    /// 損耗報廢
    Waste { quantity: Decimal },
    /// 盤點調整
    Adjustment {
        quantity: Decimal,
        direction: AdjustmentDirection,
    },
    /// 預留（可用 → 預留）
    Reservation { quantity: Decimal },
    /// 釋放預留（預留 → 可用）
    ReservationRelease { quantity: Decimal },
}

impl StockMovement {
    /// 異動數量
    pub fn quantity(&self) -> Decimal {
        match self {
            StockMovement::Receipt { quantity, .. }
            | StockMovement::Production { quantity }
            | StockMovement::Sale { quantity }
            | StockMovement::Waste { quantity }
            | StockMovement::Adjustment { quantity, .. }
            | StockMovement::Reservation { quantity }
            | StockMovement::ReservationRelease { quantity } => *quantity,
        }
    }
}

/// 分析當下的庫存快照
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockSnapshot {
    /// 產品ID
    pub product_id: String,

    /// 可用數量
    pub available_quantity: Decimal,

    /// 已預留數量
    pub reserved_quantity: Decimal,

    /// 平均成本
    pub average_cost: Decimal,

    /// 最低庫存
    pub minimum_stock: Decimal,
}

impl StockSnapshot {
    /// 創建新的庫存快照
    pub fn new(product_id: String, available_quantity: Decimal, average_cost: Decimal) -> Self {
        Self {
            product_id,
            available_quantity,
            reserved_quantity: Decimal::ZERO,
            average_cost,
            minimum_stock: Decimal::ZERO,
        }
    }

    /// 建構器模式：設置最低庫存
    pub fn with_minimum_stock(mut self, minimum_stock: Decimal) -> Self {
        self.minimum_stock = minimum_stock;
        self
    }

    /// 檢查是否低於最低庫存
    pub fn is_below_minimum(&self) -> bool {
        self.available_quantity < self.minimum_stock
    }

    /// 庫存價值
    pub fn stock_value(&self) -> Decimal {
        self.available_quantity * self.average_cost
    }

    /// 套用單筆異動
    pub fn apply(&mut self, movement: &StockMovement) -> Result<()> {
        let quantity = movement.quantity();
        if quantity <= Decimal::ZERO {
            return Err(ProcureError::InvalidQuantity(format!(
                "{} 異動數量必須大於 0：{}",
                self.product_id, quantity
            )));
        }

        match movement {
            StockMovement::Receipt { unit_cost, .. } => self.receive(quantity, *unit_cost),
            StockMovement::Production { .. } => {
                self.available_quantity += quantity;
                Ok(())
            }
            StockMovement::Sale { .. } | StockMovement::Waste { .. } => self.issue(quantity),
            StockMovement::Adjustment { direction, .. } => match direction {
                AdjustmentDirection::Increase => {
                    self.available_quantity += quantity;
                    Ok(())
                }
                AdjustmentDirection::Decrease => self.issue(quantity),
            },
            StockMovement::Reservation { .. } => {
                self.issue(quantity)?;
                self.reserved_quantity += quantity;
                Ok(())
            }
            StockMovement::ReservationRelease { .. } => {
                if quantity > self.reserved_quantity {
                    return Err(ProcureError::InvalidQuantity(format!(
                        "釋放數量超過已預留數量：釋放 {}, 已預留 {}",
                        quantity, self.reserved_quantity
                    )));
                }
                self.reserved_quantity -= quantity;
                self.available_quantity += quantity;
                Ok(())
            }
        }
    }

    /// 依序套用多筆異動，任一筆失敗即停止
    pub fn apply_movements<'a, I>(&mut self, movements: I) -> Result<()>
    where
        I: IntoIterator<Item = &'a StockMovement>,
    {
        for movement in movements {
            self.apply(movement)?;
        }
        Ok(())
    }

    fn receive(&mut self, quantity: Decimal, unit_cost: Decimal) -> Result<()> {
        if unit_cost < Decimal::ZERO {
            return Err(ProcureError::InvalidPrice(format!(
                "{} 進貨成本不可為負：{}",
                self.product_id, unit_cost
            )));
        }

        let new_quantity = self.available_quantity + quantity;
        if self.available_quantity > Decimal::ZERO {
            self.average_cost =
                (self.stock_value() + quantity * unit_cost) / new_quantity;
        } else {
            self.average_cost = unit_cost;
        }
        self.available_quantity = new_quantity;
        Ok(())
    }

    fn issue(&mut self, quantity: Decimal) -> Result<()> {
        if quantity > self.available_quantity {
            return Err(ProcureError::InvalidQuantity(format!(
                "庫存不足：需要 {}, 可用 {}",
                quantity, self.available_quantity
            )));
        }
        self.available_quantity -= quantity;
        Ok(())
    }
}
