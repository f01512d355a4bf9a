//! 客戶價目表產生器

use chrono::{Days, NaiveDate};
use procure_calc::{CalcWarning, ItemFailure, VolatilityClassifier};
use procure_core::{
    CustomerPriceList, CustomerPriceListItem, CustomerSegment, Department, EngineConfig,
    MarketPriceObservation, PriceListStatus, PriceSource, PriceTrend, PricingRule, ProcureError,
    Product, VolatilityTier,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::PricingEngine;

/// 價目表產生請求
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceListRequest {
    pub customer_id: String,
    pub segment: CustomerSegment,

    /// 指定規則；未指定時依客群與日期查找
    pub pricing_rule_id: Option<String>,

    pub as_of_date: NaiveDate,
}

impl PriceListRequest {
    pub fn new(customer_id: String, segment: CustomerSegment, as_of_date: NaiveDate) -> Self {
        Self {
            customer_id,
            segment,
            pricing_rule_id: None,
            as_of_date,
        }
    }

    /// 建構器模式：指定定價規則
    pub fn with_pricing_rule(mut self, rule_id: String) -> Self {
        self.pricing_rule_id = Some(rule_id);
        self
    }
}

/// 價目表產生結果（多重狀態）
#[derive(Debug, Clone)]
pub struct PriceListOutcome {
    /// 狀態為 Generated 的價目表
    pub price_list: CustomerPriceList,

    /// 無法定價的產品
    pub failures: Vec<ItemFailure>,

    pub warnings: Vec<CalcWarning>,

    /// 是否走冷啟動（基礎價）路徑
    pub used_fallback: bool,
}

impl PriceListOutcome {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// 客戶價目表產生器
pub struct PriceListGenerator<'a> {
    config: &'a EngineConfig,
    products: &'a [Product],
    departments: &'a [Department],
    rules: &'a [PricingRule],
}

impl<'a> PriceListGenerator<'a> {
    /// 創建新的產生器
    pub fn new(
        config: &'a EngineConfig,
        products: &'a [Product],
        departments: &'a [Department],
        rules: &'a [PricingRule],
    ) -> Self {
        Self {
            config,
            products,
            departments,
            rules,
        }
    }

    /// 主入口：為單一客戶產生價目表
    ///
    /// `previous` 只有在狀態為 Active 且屬於同一客戶時才用來計算價格變動。
    pub fn generate(
        &self,
        request: &PriceListRequest,
        observations: &[MarketPriceObservation],
        previous: Option<&CustomerPriceList>,
    ) -> procure_core::Result<PriceListOutcome> {
        tracing::info!(
            "開始產生價目表：客戶 {}，基準日 {}，產品 {} 項，市場觀測 {} 筆",
            request.customer_id,
            request.as_of_date,
            self.products.len(),
            observations.len()
        );

        // Step 1: 決定規則與有效期間
        let explicit_rule = self.explicit_rule(request)?;
        let segment_rule =
            PricingEngine::select_rule(self.rules, request.segment, request.as_of_date);
        let list_rule_id = explicit_rule
            .or(segment_rule)
            .map_or_else(|| self.config.default_pricing_rule.id.clone(), |r| r.id.clone());

        let effective_to = self.effective_to(request.as_of_date)?;
        let mut price_list = CustomerPriceList::new(
            request.customer_id.clone(),
            list_rule_id,
            request.as_of_date,
            effective_to,
        );

        // Step 2: 判斷冷啟動
        let previous = previous.filter(|list| {
            list.status() == PriceListStatus::Active && list.customer_id == request.customer_id
        });
        let cold_start = !self
            .products
            .iter()
            .any(|p| Self::latest_observation(observations, &p.id, request.as_of_date).is_some());

        let mut failures = Vec::new();
        let mut warnings = Vec::new();

        if cold_start && !self.products.is_empty() {
            tracing::warn!(
                "客戶 {} 在 {} 前沒有任何市場價格，改用產品基礎價 + {} 稅率估算",
                request.customer_id,
                request.as_of_date,
                self.config.fallback_vat_rate
            );
            warnings.push(CalcWarning::warning(
                request.customer_id.clone(),
                "沒有市場價格，價目表以基礎價產生".to_string(),
            ));
        }

        // Step 3: 逐產品定價
        for product in self.products {
            let rule = match explicit_rule.or(segment_rule) {
                Some(rule) => rule.clone(),
                None => PricingEngine::default_rule_for(
                    product,
                    self.departments,
                    request.segment,
                    self.config,
                ),
            };

            let item = if cold_start {
                self.fallback_item(request, product, &rule)
            } else {
                self.market_item(request, product, &rule, observations)
            };

            let item = item.map(|mut item| {
                Self::apply_previous_price(&mut item, previous);
                item
            });

            match item {
                Ok(item) => {
                    tracing::debug!(
                        "產品 {}：市場價 {}，加價 {}%，客戶價 {}",
                        item.product_id,
                        item.market_price_excl_vat,
                        item.markup_percentage,
                        item.customer_price_excl_vat
                    );
                    price_list.push_item(item)?;
                }
                Err(error) => {
                    tracing::warn!("產品 {} 無法定價：{}", product.id, error);
                    failures.push(ItemFailure {
                        item_id: product.id.clone(),
                        error,
                    });
                }
            }
        }

        // Step 4: 狀態前進
        price_list.advance_to(PriceListStatus::Generated)?;

        tracing::info!(
            "價目表 {} 完成：項目 {} 項，失敗 {} 項，平均加價 {}%，總值 {}",
            price_list.id,
            price_list.item_count(),
            failures.len(),
            price_list.average_markup_percentage().round_dp(2),
            price_list.total_list_value()
        );

        Ok(PriceListOutcome {
            price_list,
            failures,
            warnings,
            used_fallback: cold_start,
        })
    }

    /// 最近一筆日期 ≤ 基準日的觀測（同日多筆取最後出現者）
    pub fn latest_observation<'o>(
        observations: &'o [MarketPriceObservation],
        product_id: &str,
        as_of: NaiveDate,
    ) -> Option<&'o MarketPriceObservation> {
        observations
            .iter()
            .filter(|o| o.product_id == product_id && o.date <= as_of)
            .max_by_key(|o| o.date)
    }

    /// 價格變動 %（上期價為 0 或不存在時為 None）
    pub fn price_change_percentage(previous: Decimal, current: Decimal) -> Option<Decimal> {
        if previous.is_zero() {
            return None;
        }
        Some(((current - previous) / previous * Decimal::ONE_HUNDRED).round_dp(2))
    }

    fn explicit_rule(
        &self,
        request: &PriceListRequest,
    ) -> procure_core::Result<Option<&'a PricingRule>> {
        let Some(rule_id) = request.pricing_rule_id.as_deref() else {
            return Ok(None);
        };

        let rule = self
            .rules
            .iter()
            .find(|r| r.id == rule_id)
            .ok_or_else(|| ProcureError::InvalidRule(format!("找不到定價規則：{}", rule_id)))?;
        rule.validate()?;
        Ok(Some(rule))
    }

    fn effective_to(&self, as_of: NaiveDate) -> procure_core::Result<NaiveDate> {
        let extra_days = self.config.price_list_validity_days.saturating_sub(1);
        as_of
            .checked_add_days(Days::new(u64::from(extra_days)))
            .ok_or_else(|| {
                ProcureError::InvalidPeriod(format!("價目表期間溢出：{} + {}", as_of, extra_days))
            })
    }

    fn market_item(
        &self,
        request: &PriceListRequest,
        product: &Product,
        rule: &PricingRule,
        observations: &[MarketPriceObservation],
    ) -> procure_core::Result<CustomerPriceListItem> {
        let observation = Self::latest_observation(observations, &product.id, request.as_of_date)
            .ok_or_else(|| {
                ProcureError::NoMarketPrice(format!(
                    "{} 在 {} 前沒有市場價格",
                    product.id, request.as_of_date
                ))
            })?;
        observation.validate()?;

        let window = self.config.volatility_window_days;
        let prices = VolatilityClassifier::window_prices(
            observations,
            &product.id,
            request.as_of_date,
            window,
        );
        let reading = VolatilityClassifier::classify(&prices);
        let trend = VolatilityClassifier::trend(&prices, self.config.trend_threshold_percentage);

        let calculation = PricingEngine::calculate(rule, observation.price_excl_vat, reading.tier)?;

        Ok(CustomerPriceListItem {
            customer_id: request.customer_id.clone(),
            product_id: product.id.clone(),
            product_name: product.name.clone(),
            market_price_excl_vat: observation.price_excl_vat,
            market_price_incl_vat: observation.price_incl_vat,
            market_price_date: Some(observation.date),
            volatility_tier: reading.tier,
            price_trend: trend,
            markup_percentage: calculation.markup_percentage,
            customer_price_excl_vat: calculation.customer_price,
            customer_price_incl_vat: PricingEngine::apply_markup(
                observation.price_incl_vat,
                calculation.markup_percentage,
            ),
            previous_price: None,
            price_change_percentage: None,
            minimum_margin_applied: calculation.minimum_margin_applied(),
            price_source: PriceSource::MarketObservation,
        })
    }

    fn fallback_item(
        &self,
        request: &PriceListRequest,
        product: &Product,
        rule: &PricingRule,
    ) -> procure_core::Result<CustomerPriceListItem> {
        let calculation = PricingEngine::calculate_base_only(rule, product.base_price)?;
        let base_incl_vat =
            (product.base_price * (Decimal::ONE + self.config.fallback_vat_rate)).round_dp(2);

        Ok(CustomerPriceListItem {
            customer_id: request.customer_id.clone(),
            product_id: product.id.clone(),
            product_name: product.name.clone(),
            market_price_excl_vat: product.base_price,
            market_price_incl_vat: base_incl_vat,
            market_price_date: None,
            volatility_tier: VolatilityTier::Stable,
            price_trend: PriceTrend::Flat,
            markup_percentage: calculation.markup_percentage,
            customer_price_excl_vat: calculation.customer_price,
            customer_price_incl_vat: PricingEngine::apply_markup(
                base_incl_vat,
                calculation.markup_percentage,
            ),
            previous_price: None,
            price_change_percentage: None,
            minimum_margin_applied: false,
            price_source: PriceSource::BaseCatalogFallback,
        })
    }

    fn apply_previous_price(
        item: &mut CustomerPriceListItem,
        previous: Option<&CustomerPriceList>,
    ) {
        let previous_price = previous
            .and_then(|list| list.item_for(&item.product_id))
            .map(|prev| prev.customer_price_excl_vat);

        item.previous_price = previous_price;
        item.price_change_percentage = previous_price
            .and_then(|prev| Self::price_change_percentage(prev, item.customer_price_excl_vat));
    }
}

/// 啟用新價目表並取代上一期
///
/// 新表必須已寄出（Sent）；上一期若為 Active 則轉為 Superseded。
/// 上一期必須屬於同一客戶，否則兩張表都不變動。
pub fn activate_price_list(
    next: &mut CustomerPriceList,
    previous: Option<&mut CustomerPriceList>,
) -> procure_core::Result<()> {
    if let Some(previous) = previous.as_deref() {
        if previous.customer_id != next.customer_id {
            return Err(ProcureError::InvalidTransition(format!(
                "價目表 {}（客戶 {}）不可取代客戶 {} 的價目表 {}",
                next.id, next.customer_id, previous.customer_id, previous.id
            )));
        }
    }

    next.advance_to(PriceListStatus::Active)?;

    if let Some(previous) = previous {
        if previous.status() == PriceListStatus::Active {
            previous.supersede()?;
            tracing::info!("價目表 {} 已被 {} 取代", previous.id, next.id);
        }
    }

    Ok(())
}
