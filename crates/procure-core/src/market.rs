//! 市場價格模型

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{ProcureError, Result};

/// 市場價格觀測（只增不改的時間序列）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketPriceObservation {
    pub product_id: String,

    /// 觀測日期
    pub date: NaiveDate,

    /// 未稅價
    pub price_excl_vat: Decimal,

    /// 含稅價
    pub price_incl_vat: Decimal,

    /// 報價來源
    pub supplier_name: String,
}

impl MarketPriceObservation {
    pub fn new(
        product_id: String,
        date: NaiveDate,
        price_excl_vat: Decimal,
        price_incl_vat: Decimal,
        supplier_name: String,
    ) -> Self {
        Self {
            product_id,
            date,
            price_excl_vat,
            price_incl_vat,
            supplier_name,
        }
    }

    /// 驗證：價格非負，且含稅價不低於未稅價
    pub fn validate(&self) -> Result<()> {
        if self.price_excl_vat < Decimal::ZERO {
            return Err(ProcureError::InvalidPrice(format!(
                "{} @ {} 未稅價為負：{}",
                self.product_id, self.date, self.price_excl_vat
            )));
        }
        if self.price_incl_vat < self.price_excl_vat {
            return Err(ProcureError::InvalidPrice(format!(
                "{} @ {} 含稅價 {} 低於未稅價 {}",
                self.product_id, self.date, self.price_incl_vat, self.price_excl_vat
            )));
        }
        Ok(())
    }

    /// 隱含稅率
    pub fn implied_vat_rate(&self) -> Decimal {
        if self.price_excl_vat.is_zero() {
            Decimal::ZERO
        } else {
            self.price_incl_vat / self.price_excl_vat - Decimal::ONE
        }
    }
}

/// 價格波動等級（由低到高排序）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VolatilityTier {
    Stable,
    Volatile,
    HighlyVolatile,
    ExtremelyVolatile,
}

impl VolatilityTier {
    /// 是否需要加上波動調整
    pub fn is_volatile(self) -> bool {
        self != VolatilityTier::Stable
    }
}

/// 價格趨勢
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceTrend {
    Rising,
    Falling,
    Flat,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn observation(excl: Decimal, incl: Decimal) -> MarketPriceObservation {
        MarketPriceObservation::new(
            "TOMATO".to_string(),
            NaiveDate::from_ymd_opt(2025, 11, 3).unwrap(),
            excl,
            incl,
            "Joburg Market".to_string(),
        )
    }

    #[test]
    fn test_observation_validation() {
        assert!(observation(dec!(20), dec!(23)).validate().is_ok());
        assert!(observation(dec!(20), dec!(20)).validate().is_ok());
        assert!(observation(dec!(20), dec!(19.99)).validate().is_err());
        assert!(observation(dec!(-1), dec!(0)).validate().is_err());
    }

    #[test]
    fn test_implied_vat_rate() {
        assert_eq!(observation(dec!(20), dec!(23)).implied_vat_rate(), dec!(0.15));
        assert_eq!(observation(dec!(0), dec!(0)).implied_vat_rate(), Decimal::ZERO);
    }

    #[test]
    fn test_tier_ordering() {
        assert!(VolatilityTier::Stable < VolatilityTier::Volatile);
        assert!(VolatilityTier::HighlyVolatile < VolatilityTier::ExtremelyVolatile);
        assert!(!VolatilityTier::Stable.is_volatile());
        assert!(VolatilityTier::Volatile.is_volatile());
    }
}
