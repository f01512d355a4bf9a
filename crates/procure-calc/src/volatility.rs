//! 價格波動分級

use chrono::{Duration, NaiveDate};
use procure_core::{MarketPriceObservation, PriceTrend, VolatilityTier};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 波動分級結果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolatilityReading {
    pub tier: VolatilityTier,

    /// (最高 - 最低) / 最低 × 100
    pub volatility_percentage: Decimal,

    pub observation_count: usize,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
}

/// 價格波動分級器
pub struct VolatilityClassifier;

impl VolatilityClassifier {
    /// 依價格序列分級
    ///
    /// 少於 2 筆或最低價為 0 時視為穩定
    pub fn classify(prices: &[Decimal]) -> VolatilityReading {
        let min_price = prices.iter().copied().min();
        let max_price = prices.iter().copied().max();

        let volatility_percentage = match (min_price, max_price) {
            (Some(min), Some(max)) if prices.len() >= 2 && min > Decimal::ZERO => {
                (max - min) / min * Decimal::ONE_HUNDRED
            }
            _ => Decimal::ZERO,
        };

        VolatilityReading {
            tier: Self::tier_for(volatility_percentage),
            volatility_percentage,
            observation_count: prices.len(),
            min_price,
            max_price,
        }
    }

    /// 依回溯窗口內的市場觀測分級
    pub fn classify_window(
        observations: &[MarketPriceObservation],
        product_id: &str,
        as_of: NaiveDate,
        window_days: u32,
    ) -> VolatilityReading {
        let prices = Self::window_prices(observations, product_id, as_of, window_days);
        Self::classify(&prices)
    }

    /// 波動 % 對應等級
    pub fn tier_for(volatility_percentage: Decimal) -> VolatilityTier {
        if volatility_percentage > Decimal::from(50) {
            VolatilityTier::ExtremelyVolatile
        } else if volatility_percentage > Decimal::from(25) {
            VolatilityTier::HighlyVolatile
        } else if volatility_percentage > Decimal::from(10) {
            VolatilityTier::Volatile
        } else {
            VolatilityTier::Stable
        }
    }

    /// 價格趨勢：比較窗口內第一筆與最後一筆
    pub fn trend(prices: &[Decimal], threshold_percentage: Decimal) -> PriceTrend {
        let (first, last) = match (prices.first(), prices.last()) {
            (Some(&first), Some(&last)) if prices.len() >= 2 && first > Decimal::ZERO => {
                (first, last)
            }
            _ => return PriceTrend::Flat,
        };

        let change = (last - first) / first * Decimal::ONE_HUNDRED;
        if change > threshold_percentage {
            PriceTrend::Rising
        } else if change < -threshold_percentage {
            PriceTrend::Falling
        } else {
            PriceTrend::Flat
        }
    }

    /// 取出窗口 (as_of - window_days, as_of] 內的未稅價，依日期排序
    pub fn window_prices(
        observations: &[MarketPriceObservation],
        product_id: &str,
        as_of: NaiveDate,
        window_days: u32,
    ) -> Vec<Decimal> {
        let window_start = as_of - Duration::days(i64::from(window_days));

        let mut in_window: Vec<&MarketPriceObservation> = observations
            .iter()
            .filter(|o| o.product_id == product_id && o.date > window_start && o.date <= as_of)
            .collect();
        in_window.sort_by_key(|o| o.date);

        in_window.into_iter().map(|o| o.price_excl_vat).collect()
    }
}
