//! 緩衝量計算（需要量 → 採購量）

use chrono::{Datelike, NaiveDate};
use procure_core::{
    BufferCombination, BufferPolicy, BufferPolicySet, EngineConfig, ProcureError, Product,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 緩衝量計算結果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BufferCalculation {
    /// 需要量
    pub quantity_needed: Decimal,

    /// 合併後的損耗率（含旺季調整）
    pub total_rate: Decimal,

    /// 有效緩衝 %
    pub buffer_percentage: Decimal,

    /// 是否套用旺季倍率
    pub seasonal_applied: bool,

    /// 未取整的採購量
    pub raw_buy_quantity: Decimal,

    /// 最終採購量
    pub buy_quantity: Decimal,

    /// 緩衝量 = 採購量 - 需要量
    pub buffer_quantity: Decimal,

    /// 包裝數（有包裝規格時）
    pub packs: Option<Decimal>,
}

/// 緩衝量計算器
pub struct BufferCalculator;

impl BufferCalculator {
    /// 計算採購量
    ///
    /// 1. 合併損耗率（相加或複利）
    /// 2. 旺季時乘上倍率（不會低於基礎損耗率）
    /// 3. 採購量 = 需要量 × (1 + 損耗率)
    /// 4. 有包裝規格時向上取整到包裝倍數
    pub fn calculate(
        quantity_needed: Decimal,
        policy: &BufferPolicy,
        on_date: NaiveDate,
    ) -> procure_core::Result<BufferCalculation> {
        if quantity_needed <= Decimal::ZERO {
            return Err(ProcureError::InvalidQuantity(format!(
                "需要量必須大於 0：{}",
                quantity_needed
            )));
        }
        policy.validate()?;

        let base_rate = Self::combined_rate(policy);
        let (total_rate, seasonal_applied) =
            Self::apply_seasonal(policy, base_rate, on_date.month());

        let raw_buy_quantity = quantity_needed * (Decimal::ONE + total_rate);

        let (buy_quantity, packs) = match policy.pack_size {
            Some(pack_size) if pack_size > Decimal::ZERO => {
                let rounded = Self::round_up_to_pack(raw_buy_quantity, pack_size);
                (rounded, Some(rounded / pack_size))
            }
            _ => (raw_buy_quantity, None),
        };

        tracing::debug!(
            "緩衝計算：需要 {}, 損耗率 {}, 原始 {}, 採購 {}",
            quantity_needed,
            total_rate,
            raw_buy_quantity,
            buy_quantity
        );

        Ok(BufferCalculation {
            quantity_needed,
            total_rate,
            buffer_percentage: total_rate * Decimal::ONE_HUNDRED,
            seasonal_applied,
            raw_buy_quantity,
            buy_quantity,
            buffer_quantity: buy_quantity - quantity_needed,
            packs,
        })
    }

    /// 依產品查找政策後計算（找不到政策時使用系統預設）
    pub fn calculate_for_product(
        quantity_needed: Decimal,
        product: &Product,
        policies: &BufferPolicySet,
        config: &EngineConfig,
        on_date: NaiveDate,
    ) -> procure_core::Result<BufferCalculation> {
        let policy = policies.resolve(product, &config.default_buffer_policy);
        Self::calculate(quantity_needed, policy, on_date)
    }

    /// 合併損耗率
    pub fn combined_rate(policy: &BufferPolicy) -> Decimal {
        match policy.combination {
            BufferCombination::Additive => {
                policy.spoilage_rate + policy.waste_rate + policy.rejection_rate
            }
            BufferCombination::Multiplicative => {
                (Decimal::ONE + policy.spoilage_rate)
                    * (Decimal::ONE + policy.waste_rate)
                    * (Decimal::ONE + policy.rejection_rate)
                    - Decimal::ONE
            }
        }
    }

    /// 向上取整到包裝倍數
    pub fn round_up_to_pack(quantity: Decimal, pack_size: Decimal) -> Decimal {
        let remainder = quantity % pack_size;
        if remainder > Decimal::ZERO {
            quantity - remainder + pack_size
        } else {
            quantity
        }
    }

    fn apply_seasonal(policy: &BufferPolicy, base_rate: Decimal, month: u32) -> (Decimal, bool) {
        match &policy.seasonal {
            Some(seasonal) if seasonal.is_peak_month(month) => {
                let multiplier = seasonal.peak_multiplier.max(Decimal::ONE);
                (base_rate * multiplier, true)
            }
            _ => (base_rate, false),
        }
    }
}
