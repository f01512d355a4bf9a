//! 引擎配置
//!
//! 原本存在資料庫中的「營運設定」改為每次呼叫明確傳入；
//! 缺少設定時使用 `EngineConfig::default()` 中記錄的預設值。

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{
    BufferPolicy, CustomerSegment, OrderCycleCalendar, PricingRule, ProcureError, Result,
    UrgencyLevel,
};

/// 緊急程度對應的建議下單天數
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrgencyOffsets {
    pub critical_days: u32,
    pub high_days: u32,
    pub medium_days: u32,
    pub low_days: u32,
}

impl UrgencyOffsets {
    /// 取得指定緊急程度的天數
    pub fn days_for(&self, urgency: UrgencyLevel) -> u32 {
        match urgency {
            UrgencyLevel::Critical => self.critical_days,
            UrgencyLevel::High => self.high_days,
            UrgencyLevel::Medium => self.medium_days,
            UrgencyLevel::Low => self.low_days,
        }
    }
}

impl Default for UrgencyOffsets {
    fn default() -> Self {
        Self {
            critical_days: 0,
            high_days: 1,
            medium_days: 3,
            low_days: 7,
        }
    }
}

/// 市場（最後手段）供應商
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketSupplierRef {
    pub supplier_id: String,
    pub supplier_name: String,
    pub lead_time_days: u32,
}

impl Default for MarketSupplierRef {
    fn default() -> Self {
        Self {
            supplier_id: "MARKET".to_string(),
            supplier_name: "Fresh Produce Market".to_string(),
            lead_time_days: 1,
        }
    }
}

/// 採購與定價引擎配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// 系統預設緩衝政策（找不到產品/部門政策時使用）
    pub default_buffer_policy: BufferPolicy,

    /// 系統預設定價規則（找不到客群規則時使用）
    pub default_pricing_rule: PricingRule,

    /// 冷啟動時估算含稅價的增值稅率（0.15 = 15%）
    pub fallback_vat_rate: Decimal,

    /// 無供應商時市場合成單價 = 基礎價 × 此係數
    pub market_fallback_price_factor: Decimal,

    /// 市場供應商
    pub market_supplier: MarketSupplierRef,

    /// 波動性計算的回溯天數
    pub volatility_window_days: u32,

    /// 價格趨勢判定門檻（百分比）
    pub trend_threshold_percentage: Decimal,

    /// 緊急程度對應的下單天數
    pub urgency_offsets: UrgencyOffsets,

    /// 訂貨週期日曆
    pub order_cycle: OrderCycleCalendar,

    /// 價目表有效天數
    pub price_list_validity_days: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_buffer_policy: BufferPolicy::default(),
            default_pricing_rule: PricingRule::system_default(CustomerSegment::Standard),
            fallback_vat_rate: Decimal::new(15, 2),
            market_fallback_price_factor: Decimal::new(7, 1),
            market_supplier: MarketSupplierRef::default(),
            volatility_window_days: 30,
            trend_threshold_percentage: Decimal::from(5),
            urgency_offsets: UrgencyOffsets::default(),
            order_cycle: OrderCycleCalendar::default(),
            price_list_validity_days: 7,
        }
    }
}

impl EngineConfig {
    /// 從 JSON 載入配置（缺少的欄位使用預設值）
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| ProcureError::InvalidConfig(format!("JSON 解析失敗：{}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// 建構器模式：設置預設緩衝政策
    pub fn with_default_buffer_policy(mut self, policy: BufferPolicy) -> Self {
        self.default_buffer_policy = policy;
        self
    }

    /// 建構器模式：設置預設定價規則
    pub fn with_default_pricing_rule(mut self, rule: PricingRule) -> Self {
        self.default_pricing_rule = rule;
        self
    }

    /// 建構器模式：設置冷啟動增值稅率
    pub fn with_fallback_vat_rate(mut self, rate: Decimal) -> Self {
        self.fallback_vat_rate = rate;
        self
    }

    /// 建構器模式：設置波動性回溯天數
    pub fn with_volatility_window(mut self, days: u32) -> Self {
        self.volatility_window_days = days;
        self
    }

    /// 建構器模式：設置訂貨日曆
    pub fn with_order_cycle(mut self, calendar: OrderCycleCalendar) -> Self {
        self.order_cycle = calendar;
        self
    }

    /// 驗證配置
    pub fn validate(&self) -> Result<()> {
        self.default_buffer_policy.validate()?;
        self.default_pricing_rule.validate()?;

        if self.fallback_vat_rate < Decimal::ZERO {
            return Err(ProcureError::InvalidConfig(format!(
                "fallback_vat_rate 不可為負：{}",
                self.fallback_vat_rate
            )));
        }
        if self.market_fallback_price_factor <= Decimal::ZERO {
            return Err(ProcureError::InvalidConfig(format!(
                "market_fallback_price_factor 必須大於 0：{}",
                self.market_fallback_price_factor
            )));
        }
        if self.volatility_window_days == 0 {
            return Err(ProcureError::InvalidConfig(
                "volatility_window_days 必須大於 0".to_string(),
            ));
        }
        if self.price_list_validity_days == 0 {
            return Err(ProcureError::InvalidConfig(
                "price_list_validity_days 必須大於 0".to_string(),
            ));
        }

        Ok(())
    }
}
