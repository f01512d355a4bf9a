//! 定價規則引擎
//!
//! 加價 % = 基礎 + 波動調整（僅波動時）× 趨勢倍率 + 季節調整，下限為最低毛利。

use chrono::NaiveDate;
use procure_core::{
    CustomerSegment, Department, EngineConfig, ProcureError, Product, PricingRule, VolatilityTier,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 加價計算明細
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationBreakdown {
    pub base_markup: Decimal,

    /// 實際套用的波動調整（穩定時為 0）
    pub volatility_adjustment: Decimal,

    pub trend_multiplier: Decimal,
    pub seasonal_adjustment: Decimal,

    /// 套用最低毛利前的加價 %
    pub markup_before_floor: Decimal,

    pub minimum_margin: Decimal,
    pub minimum_margin_applied: bool,
}

/// 價格計算結果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceCalculation {
    pub markup_percentage: Decimal,
    pub customer_price: Decimal,

    /// 客戶價 - 市場價
    pub margin_amount: Decimal,

    pub calculation_breakdown: CalculationBreakdown,
}

impl PriceCalculation {
    /// 是否被最低毛利拉高
    pub fn minimum_margin_applied(&self) -> bool {
        self.calculation_breakdown.minimum_margin_applied
    }
}

/// 定價引擎
pub struct PricingEngine;

impl PricingEngine {
    /// 依規則與波動等級計算客戶價
    pub fn calculate(
        rule: &PricingRule,
        market_price: Decimal,
        tier: VolatilityTier,
    ) -> procure_core::Result<PriceCalculation> {
        rule.validate()?;
        Self::check_price(market_price)?;

        let volatility_adjustment = if tier.is_volatile() {
            rule.volatility_adjustment_percentage
        } else {
            Decimal::ZERO
        };

        let markup_before_floor = rule.base_markup_percentage
            + volatility_adjustment * rule.trend_multiplier
            + rule.seasonal_adjustment_percentage;

        let minimum_margin_applied = markup_before_floor < rule.minimum_margin_percentage;
        let markup_percentage = markup_before_floor.max(rule.minimum_margin_percentage);

        let customer_price = Self::apply_markup(market_price, markup_percentage);

        Ok(PriceCalculation {
            markup_percentage,
            customer_price,
            margin_amount: customer_price - market_price,
            calculation_breakdown: CalculationBreakdown {
                base_markup: rule.base_markup_percentage,
                volatility_adjustment,
                trend_multiplier: rule.trend_multiplier,
                seasonal_adjustment: rule.seasonal_adjustment_percentage,
                markup_before_floor,
                minimum_margin: rule.minimum_margin_percentage,
                minimum_margin_applied,
            },
        })
    }

    /// 只套用基礎加價（冷啟動路徑）
    pub fn calculate_base_only(
        rule: &PricingRule,
        base_price: Decimal,
    ) -> procure_core::Result<PriceCalculation> {
        rule.validate()?;
        Self::check_price(base_price)?;

        let markup_percentage = rule.base_markup_percentage;
        let customer_price = Self::apply_markup(base_price, markup_percentage);

        Ok(PriceCalculation {
            markup_percentage,
            customer_price,
            margin_amount: customer_price - base_price,
            calculation_breakdown: CalculationBreakdown {
                base_markup: markup_percentage,
                volatility_adjustment: Decimal::ZERO,
                trend_multiplier: rule.trend_multiplier,
                seasonal_adjustment: Decimal::ZERO,
                markup_before_floor: markup_percentage,
                minimum_margin: rule.minimum_margin_percentage,
                minimum_margin_applied: false,
            },
        })
    }

    /// 價格 × (1 + 加價/100)，四捨五入到分
    pub fn apply_markup(price: Decimal, markup_percentage: Decimal) -> Decimal {
        (price * (Decimal::ONE + markup_percentage / Decimal::ONE_HUNDRED)).round_dp(2)
    }

    /// 查找客群在指定日期生效的規則
    ///
    /// 多條生效時取生效日最晚者；相同時保留先出現者。
    pub fn select_rule<'r>(
        rules: &'r [PricingRule],
        segment: CustomerSegment,
        on_date: NaiveDate,
    ) -> Option<&'r PricingRule> {
        let mut selected: Option<&PricingRule> = None;

        for rule in rules
            .iter()
            .filter(|r| r.segment == segment && r.is_effective_on(on_date))
        {
            let newer =
                selected.map_or(true, |current| rule.effective_from > current.effective_from);
            if newer {
                selected = Some(rule);
            }
        }

        selected
    }

    /// 無規則適用時的預設規則
    ///
    /// 產品所屬部門有預設加價時覆寫基礎加價（不低於最低毛利）。
    pub fn default_rule_for(
        product: &Product,
        departments: &[Department],
        segment: CustomerSegment,
        config: &EngineConfig,
    ) -> PricingRule {
        let mut rule = config.default_pricing_rule.clone();
        rule.segment = segment;

        let department_markup = product.department_id.as_deref().and_then(|dept_id| {
            departments
                .iter()
                .find(|d| d.id == dept_id)
                .and_then(|d| d.default_markup_percentage)
        });

        match department_markup {
            Some(markup) => {
                tracing::debug!("產品 {} 使用部門預設加價 {}%", product.id, markup);
                rule.with_base_markup(markup)
            }
            None => rule,
        }
    }

    fn check_price(price: Decimal) -> procure_core::Result<()> {
        if price < Decimal::ZERO {
            return Err(ProcureError::InvalidPrice(format!("價格不可為負：{}", price)));
        }
        Ok(())
    }
}
