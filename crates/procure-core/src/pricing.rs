//! 定價規則與客戶價目表模型

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{record_id, PriceTrend, ProcureError, Result, VolatilityTier};

/// 客群
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CustomerSegment {
    Premium,
    Standard,
    Budget,
    Wholesale,
    Retail,
}

/// 定價規則
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingRule {
    /// 規則ID
    pub id: String,

    /// 規則名稱
    pub name: String,

    /// 適用客群
    pub segment: CustomerSegment,

    /// 基礎加價 %
    pub base_markup_percentage: Decimal,

    /// 波動調整 %（僅在價格波動時加上）
    pub volatility_adjustment_percentage: Decimal,

    /// 最低毛利 %（下限）
    pub minimum_margin_percentage: Decimal,

    /// 趨勢倍率（乘在波動調整上）
    pub trend_multiplier: Decimal,

    /// 季節調整 %
    pub seasonal_adjustment_percentage: Decimal,

    /// 生效日
    pub effective_from: Option<NaiveDate>,

    /// 失效日（含）
    pub effective_to: Option<NaiveDate>,

    /// 是否啟用
    pub is_active: bool,
}

impl PricingRule {
    /// 創建新的定價規則；基礎加價不得低於最低毛利
    pub fn new(
        id: String,
        name: String,
        segment: CustomerSegment,
        base_markup_percentage: Decimal,
        volatility_adjustment_percentage: Decimal,
        minimum_margin_percentage: Decimal,
    ) -> Result<Self> {
        let rule = Self {
            id,
            name,
            segment,
            base_markup_percentage,
            volatility_adjustment_percentage,
            minimum_margin_percentage,
            trend_multiplier: Decimal::ONE,
            seasonal_adjustment_percentage: Decimal::ZERO,
            effective_from: None,
            effective_to: None,
            is_active: true,
        };
        rule.validate()?;
        Ok(rule)
    }

    /// 系統預設規則：加價 25%、波動 +5%、最低毛利 15%
    pub fn system_default(segment: CustomerSegment) -> Self {
        Self {
            id: "DEFAULT".to_string(),
            name: "System default".to_string(),
            segment,
            base_markup_percentage: Decimal::from(25),
            volatility_adjustment_percentage: Decimal::from(5),
            minimum_margin_percentage: Decimal::from(15),
            trend_multiplier: Decimal::ONE,
            seasonal_adjustment_percentage: Decimal::ZERO,
            effective_from: None,
            effective_to: None,
            is_active: true,
        }
    }

    /// 建構器模式：設置趨勢倍率
    pub fn with_trend_multiplier(mut self, multiplier: Decimal) -> Self {
        self.trend_multiplier = multiplier;
        self
    }

    /// 建構器模式：設置季節調整
    pub fn with_seasonal_adjustment(mut self, percentage: Decimal) -> Self {
        self.seasonal_adjustment_percentage = percentage;
        self
    }

    /// 建構器模式：設置生效期間
    pub fn with_effective_range(mut self, from: NaiveDate, to: Option<NaiveDate>) -> Self {
        self.effective_from = Some(from);
        self.effective_to = to;
        self
    }

    /// 建構器模式：覆寫基礎加價（不低於最低毛利）
    pub fn with_base_markup(mut self, percentage: Decimal) -> Self {
        self.base_markup_percentage = percentage.max(self.minimum_margin_percentage);
        self
    }

    /// 驗證規則
    pub fn validate(&self) -> Result<()> {
        if self.minimum_margin_percentage < Decimal::ZERO {
            return Err(ProcureError::InvalidRule(format!(
                "{} 最低毛利不可為負：{}",
                self.id, self.minimum_margin_percentage
            )));
        }
        if self.base_markup_percentage < self.minimum_margin_percentage {
            return Err(ProcureError::InvalidRule(format!(
                "{} 基礎加價 {}% 低於最低毛利 {}%",
                self.id, self.base_markup_percentage, self.minimum_margin_percentage
            )));
        }
        if self.trend_multiplier < Decimal::ZERO {
            return Err(ProcureError::InvalidRule(format!(
                "{} 趨勢倍率不可為負：{}",
                self.id, self.trend_multiplier
            )));
        }
        if let (Some(from), Some(to)) = (self.effective_from, self.effective_to) {
            if to < from {
                return Err(ProcureError::InvalidRule(format!(
                    "{} 失效日 {} 早於生效日 {}",
                    self.id, to, from
                )));
            }
        }
        Ok(())
    }

    /// 指定日期是否生效
    pub fn is_effective_on(&self, date: NaiveDate) -> bool {
        self.is_active
            && self.effective_from.map_or(true, |from| date >= from)
            && self.effective_to.map_or(true, |to| date <= to)
    }
}

/// 價格來源
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceSource {
    /// 市場觀測價
    MarketObservation,
    /// 冷啟動：產品基礎價 + 估算稅率
    BaseCatalogFallback,
}

/// 客戶價目表項目
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerPriceListItem {
    pub customer_id: String,
    pub product_id: String,
    pub product_name: String,

    /// 市場價快照（未稅）
    pub market_price_excl_vat: Decimal,

    /// 市場價快照（含稅）
    pub market_price_incl_vat: Decimal,

    /// 市場價觀測日期（冷啟動時為空）
    pub market_price_date: Option<NaiveDate>,

    pub volatility_tier: VolatilityTier,
    pub price_trend: PriceTrend,

    /// 計算後加價 %
    pub markup_percentage: Decimal,

    /// 客戶價（未稅）
    pub customer_price_excl_vat: Decimal,

    /// 客戶價（含稅）
    pub customer_price_incl_vat: Decimal,

    /// 上期價格
    pub previous_price: Option<Decimal>,

    /// 價格變動 %
    pub price_change_percentage: Option<Decimal>,

    /// 是否被最低毛利拉高
    pub minimum_margin_applied: bool,

    pub price_source: PriceSource,
}

/// 價目表狀態：Draft → Generated → Sent → Active → Superseded
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceListStatus {
    Draft,
    Generated,
    Sent,
    Active,
    Superseded,
}

impl PriceListStatus {
    /// 下一個合法狀態
    pub fn next(self) -> Option<PriceListStatus> {
        match self {
            PriceListStatus::Draft => Some(PriceListStatus::Generated),
            PriceListStatus::Generated => Some(PriceListStatus::Sent),
            PriceListStatus::Sent => Some(PriceListStatus::Active),
            PriceListStatus::Active => Some(PriceListStatus::Superseded),
            PriceListStatus::Superseded => None,
        }
    }
}

/// 客戶價目表
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerPriceList {
    pub id: Uuid,
    pub customer_id: String,
    pub pricing_rule_id: String,
    pub list_name: String,
    pub effective_from: NaiveDate,
    pub effective_to: NaiveDate,
    status: PriceListStatus,
    items: Vec<CustomerPriceListItem>,
    average_markup_percentage: Decimal,
    total_list_value: Decimal,
}

impl CustomerPriceList {
    /// 創建新的價目表（草稿）
    pub fn new(
        customer_id: String,
        pricing_rule_id: String,
        effective_from: NaiveDate,
        effective_to: NaiveDate,
    ) -> Self {
        let id = record_id(
            "price_list",
            &format!("{}:{}:{}", customer_id, pricing_rule_id, effective_from),
        );
        let list_name = format!("{} {} - {}", customer_id, effective_from, effective_to);
        Self {
            id,
            customer_id,
            pricing_rule_id,
            list_name,
            effective_from,
            effective_to,
            status: PriceListStatus::Draft,
            items: Vec::new(),
            average_markup_percentage: Decimal::ZERO,
            total_list_value: Decimal::ZERO,
        }
    }

    pub fn status(&self) -> PriceListStatus {
        self.status
    }

    pub fn items(&self) -> &[CustomerPriceListItem] {
        &self.items
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    pub fn average_markup_percentage(&self) -> Decimal {
        self.average_markup_percentage
    }

    /// 價目表總值（未稅客戶價合計）
    pub fn total_list_value(&self) -> Decimal {
        self.total_list_value
    }

    /// 查找產品項目
    pub fn item_for(&self, product_id: &str) -> Option<&CustomerPriceListItem> {
        self.items.iter().find(|item| item.product_id == product_id)
    }

    /// 已寄出或生效後不可再修改項目
    pub fn is_locked(&self) -> bool {
        self.status >= PriceListStatus::Sent
    }

    /// 新增項目並更新統計
    pub fn push_item(&mut self, item: CustomerPriceListItem) -> Result<()> {
        if self.is_locked() {
            return Err(ProcureError::InvalidTransition(format!(
                "價目表 {} 狀態為 {:?}，不可修改項目",
                self.id, self.status
            )));
        }
        self.items.push(item);
        self.recompute_totals();
        Ok(())
    }

    /// 狀態前進一步（不允許跳躍或倒退）
    pub fn advance_to(&mut self, next: PriceListStatus) -> Result<()> {
        if self.status.next() != Some(next) {
            return Err(ProcureError::InvalidTransition(format!(
                "價目表 {} 不可從 {:?} 轉為 {:?}",
                self.id, self.status, next
            )));
        }
        self.status = next;
        Ok(())
    }

    /// 被下一期價目表取代
    pub fn supersede(&mut self) -> Result<()> {
        self.advance_to(PriceListStatus::Superseded)
    }

    fn recompute_totals(&mut self) {
        self.total_list_value = self
            .items
            .iter()
            .map(|item| item.customer_price_excl_vat)
            .sum();

        self.average_markup_percentage = if self.items.is_empty() {
            Decimal::ZERO
        } else {
            let total_markup: Decimal = self.items.iter().map(|item| item.markup_percentage).sum();
            total_markup / Decimal::from(self.items.len())
        };
    }
}
