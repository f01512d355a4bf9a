//! 緩衝政策模型（損耗、加工耗損、品檢退貨、市場包裝規格）

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::{ProcureError, Product, Result};

/// 損耗率合併方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BufferCombination {
    /// 相加：spoilage + waste + rejection
    Additive,
    /// 複利：(1+s)(1+w)(1+r) - 1
    Multiplicative,
}

/// 旺季調整
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeasonalAdjustment {
    /// 旺季倍率（小於 1 時視為 1）
    pub peak_multiplier: Decimal,

    /// 旺季月份（1-12）
    pub peak_months: Vec<u32>,
}

impl SeasonalAdjustment {
    pub fn new(peak_multiplier: Decimal, peak_months: Vec<u32>) -> Self {
        Self {
            peak_multiplier,
            peak_months,
        }
    }

    /// 指定月份是否為旺季
    pub fn is_peak_month(&self, month: u32) -> bool {
        self.peak_months.contains(&month)
    }
}

/// 緩衝政策
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BufferPolicy {
    /// 腐壞率
    pub spoilage_rate: Decimal,

    /// 加工耗損率
    pub waste_rate: Decimal,

    /// 品檢退貨率
    pub rejection_rate: Decimal,

    /// 合併方式
    pub combination: BufferCombination,

    /// 市場包裝規格（例如 5kg 一箱）
    pub pack_size: Option<Decimal>,

    /// 包裝單位名稱
    pub pack_unit: Option<String>,

    /// 旺季調整
    pub seasonal: Option<SeasonalAdjustment>,
}

impl BufferPolicy {
    /// 創建新的緩衝政策（相加方式、無包裝規格）
    pub fn new(spoilage_rate: Decimal, waste_rate: Decimal, rejection_rate: Decimal) -> Self {
        Self {
            spoilage_rate,
            waste_rate,
            rejection_rate,
            combination: BufferCombination::Additive,
            pack_size: None,
            pack_unit: None,
            seasonal: None,
        }
    }

    /// 建構器模式：設置合併方式
    pub fn with_combination(mut self, combination: BufferCombination) -> Self {
        self.combination = combination;
        self
    }

    /// 建構器模式：設置包裝規格
    pub fn with_pack(mut self, pack_size: Decimal, pack_unit: String) -> Self {
        self.pack_size = Some(pack_size);
        self.pack_unit = Some(pack_unit);
        self
    }

    /// 建構器模式：設置旺季調整
    pub fn with_seasonal(mut self, seasonal: SeasonalAdjustment) -> Self {
        self.seasonal = Some(seasonal);
        self
    }

    /// 驗證政策參數
    pub fn validate(&self) -> Result<()> {
        let rates = [
            ("spoilage_rate", self.spoilage_rate),
            ("waste_rate", self.waste_rate),
            ("rejection_rate", self.rejection_rate),
        ];
        for (name, rate) in rates {
            if rate < Decimal::ZERO || rate >= Decimal::ONE {
                return Err(ProcureError::InvalidPolicy(format!(
                    "{} 必須介於 [0, 1)：{}",
                    name, rate
                )));
            }
        }

        if let Some(pack_size) = self.pack_size {
            if pack_size <= Decimal::ZERO {
                return Err(ProcureError::InvalidPolicy(format!(
                    "包裝規格必須大於 0：{}",
                    pack_size
                )));
            }
        }

        if let Some(seasonal) = &self.seasonal {
            if seasonal.peak_multiplier <= Decimal::ZERO {
                return Err(ProcureError::InvalidPolicy(format!(
                    "旺季倍率必須大於 0：{}",
                    seasonal.peak_multiplier
                )));
            }
            if let Some(month) = seasonal.peak_months.iter().find(|m| !(1..=12).contains(*m)) {
                return Err(ProcureError::InvalidPolicy(format!("無效的月份：{}", month)));
            }
        }

        Ok(())
    }

    /// 是否設有包裝規格
    pub fn has_pack_size(&self) -> bool {
        matches!(self.pack_size, Some(size) if size > Decimal::ZERO)
    }
}

impl Default for BufferPolicy {
    /// 系統預設：腐壞 10%、耗損 5%、退貨 5%，相加
    fn default() -> Self {
        Self::new(
            Decimal::new(10, 2),
            Decimal::new(5, 2),
            Decimal::new(5, 2),
        )
    }
}

/// 緩衝政策集合
///
/// 查找順序：產品 → 部門預設 → 系統預設
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BufferPolicySet {
    /// 產品專屬政策
    pub by_product: HashMap<String, BufferPolicy>,

    /// 部門預設政策
    pub by_department: HashMap<String, BufferPolicy>,
}

impl BufferPolicySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// 建構器模式：新增產品政策
    pub fn with_product_policy(mut self, product_id: String, policy: BufferPolicy) -> Self {
        self.by_product.insert(product_id, policy);
        self
    }

    /// 建構器模式：新增部門預設政策
    pub fn with_department_policy(mut self, department_id: String, policy: BufferPolicy) -> Self {
        self.by_department.insert(department_id, policy);
        self
    }

    /// 取得產品適用的政策，找不到時回傳系統預設
    pub fn resolve<'a>(
        &'a self,
        product: &Product,
        system_default: &'a BufferPolicy,
    ) -> &'a BufferPolicy {
        if let Some(policy) = self.by_product.get(&product.id) {
            return policy;
        }

        product
            .department_id
            .as_ref()
            .and_then(|dept| self.by_department.get(dept))
            .unwrap_or(system_default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    #[test]
    fn test_default_policy_is_valid() {
        let policy = BufferPolicy::default();
        assert!(policy.validate().is_ok());
        assert!(!policy.has_pack_size());
    }

    #[rstest]
    #[case(dec!(1.0), dec!(0), dec!(0))]
    #[case(dec!(-0.1), dec!(0), dec!(0))]
    #[case(dec!(0), dec!(1.5), dec!(0))]
    #[case(dec!(0), dec!(0), dec!(1))]
    fn test_rates_outside_unit_interval_rejected(
        #[case] spoilage: Decimal,
        #[case] waste: Decimal,
        #[case] rejection: Decimal,
    ) {
        let policy = BufferPolicy::new(spoilage, waste, rejection);
        assert!(matches!(policy.validate(), Err(ProcureError::InvalidPolicy(_))));
    }

    #[test]
    fn test_invalid_pack_and_season_rejected() {
        let policy = BufferPolicy::default().with_pack(dec!(0), "box".to_string());
        assert!(policy.validate().is_err());

        let policy = BufferPolicy::default()
            .with_seasonal(SeasonalAdjustment::new(dec!(1.2), vec![12, 13]));
        assert!(policy.validate().is_err());
    }

    #[test]
    fn test_resolve_order() {
        let system_default = BufferPolicy::default();
        let set = BufferPolicySet::new()
            .with_product_policy(
                "BASIL".to_string(),
                BufferPolicy::new(dec!(0.3), dec!(0), dec!(0)),
            )
            .with_department_policy(
                "HERBS".to_string(),
                BufferPolicy::new(dec!(0.2), dec!(0), dec!(0)),
            );

        let basil = Product::new("BASIL".into(), "Basil".into(), "bunch".into(), dec!(10))
            .with_department("HERBS".into());
        let mint = Product::new("MINT".into(), "Mint".into(), "bunch".into(), dec!(10))
            .with_department("HERBS".into());
        let onion = Product::new("ONION".into(), "Onion".into(), "kg".into(), dec!(10));

        assert_eq!(set.resolve(&basil, &system_default).spoilage_rate, dec!(0.3));
        assert_eq!(set.resolve(&mint, &system_default).spoilage_rate, dec!(0.2));
        assert_eq!(set.resolve(&onion, &system_default).spoilage_rate, dec!(0.10));
    }
}
