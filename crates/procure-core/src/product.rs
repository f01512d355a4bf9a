//! 產品與部門模型

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 產品
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    /// 產品ID
    pub id: String,

    /// 產品名稱
    pub name: String,

    /// 計量單位（kg、box、bunch...）
    pub unit: String,

    /// 基礎售價（不含稅）
    pub base_price: Decimal,

    /// 目前庫存
    pub stock_level: Decimal,

    /// 最低庫存
    pub minimum_stock: Decimal,

    /// 再訂購點
    pub reorder_level: Decimal,

    /// 所屬部門
    pub department_id: Option<String>,
}

impl Product {
    /// 創建新的產品
    pub fn new(id: String, name: String, unit: String, base_price: Decimal) -> Self {
        Self {
            id,
            name,
            unit,
            base_price,
            stock_level: Decimal::ZERO,
            minimum_stock: Decimal::ZERO,
            reorder_level: Decimal::ZERO,
            department_id: None,
        }
    }

    /// 建構器模式：設置庫存
    pub fn with_stock_level(mut self, stock_level: Decimal) -> Self {
        self.stock_level = stock_level;
        self
    }

    /// 建構器模式：設置最低庫存
    pub fn with_minimum_stock(mut self, minimum_stock: Decimal) -> Self {
        self.minimum_stock = minimum_stock;
        self
    }

    /// 建構器模式：設置再訂購點
    pub fn with_reorder_level(mut self, reorder_level: Decimal) -> Self {
        self.reorder_level = reorder_level;
        self
    }

    /// 建構器模式：設置部門
    pub fn with_department(mut self, department_id: String) -> Self {
        self.department_id = Some(department_id);
        self
    }

    /// 是否已到再訂購點
    pub fn needs_reorder(&self) -> bool {
        self.stock_level <= self.reorder_level
    }
}

/// 部門（僅用於預設加價查詢與緩衝政策預設）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Department {
    pub id: String,
    pub name: String,

    /// 部門預設加價百分比
    pub default_markup_percentage: Option<Decimal>,
}

impl Department {
    pub fn new(id: String, name: String) -> Self {
        Self {
            id,
            name,
            default_markup_percentage: None,
        }
    }

    pub fn with_default_markup(mut self, markup_percentage: Decimal) -> Self {
        self.default_markup_percentage = Some(markup_percentage);
        self
    }
}
