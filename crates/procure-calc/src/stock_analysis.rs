//! 缺貨分析（需求 vs 可用庫存）

use chrono::NaiveDate;
use procure_core::{
    AnalysisPeriod, DemandLine, OrderSnapshot, Product, ShortfallRecord, StockSnapshot,
    UrgencyLevel,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::DemandAggregator;

/// 缺貨分析結果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockAnalysis {
    pub period: AnalysisPeriod,
    pub records: Vec<ShortfallRecord>,
    pub products_analysed: usize,
    pub products_with_shortfall: usize,
    pub critical_count: usize,
    pub total_shortfall_value: Decimal,

    /// 無缺貨產品數 / 產品數 × 100（無產品時為 100）
    pub fulfillment_percentage: Decimal,
}

impl StockAnalysis {
    /// 有缺貨的記錄
    pub fn shortfalls(&self) -> impl Iterator<Item = &ShortfallRecord> {
        self.records.iter().filter(|r| r.has_shortfall())
    }

    /// 查找產品記錄
    pub fn record_for(&self, product_id: &str) -> Option<&ShortfallRecord> {
        self.records.iter().find(|r| r.product_id == product_id)
    }
}

/// 缺貨分析器
pub struct StockAnalyzer;

impl StockAnalyzer {
    /// 完整分析：驗證期間 → 彙總需求 → 對庫存淨額計算
    pub fn run(
        orders: &[OrderSnapshot],
        period_start: NaiveDate,
        period_end: NaiveDate,
        stock: &[StockSnapshot],
        products: &[Product],
    ) -> procure_core::Result<StockAnalysis> {
        let period = AnalysisPeriod::new(period_start, period_end)?;

        tracing::info!(
            "開始缺貨分析：期間 {} ~ {}，訂單 {} 筆，庫存 {} 筆",
            period.start,
            period.end,
            orders.len(),
            stock.len()
        );

        let demand = DemandAggregator::aggregate(orders, &period);
        let analysis = Self::analyze(&period, &demand, stock, products);

        tracing::info!(
            "缺貨分析完成：產品 {} 項，缺貨 {} 項，滿足率 {}%",
            analysis.products_analysed,
            analysis.products_with_shortfall,
            analysis.fulfillment_percentage
        );

        Ok(analysis)
    }

    /// 對彙總需求計算缺貨與緊急程度
    ///
    /// 無庫存快照時使用產品主檔的庫存；兩者皆無時視為 0。
    /// 最低庫存取快照與產品主檔兩者的較大值。
    pub fn analyze(
        period: &AnalysisPeriod,
        demand: &[DemandLine],
        stock: &[StockSnapshot],
        products: &[Product],
    ) -> StockAnalysis {
        let stock_map: HashMap<&str, &StockSnapshot> =
            stock.iter().map(|s| (s.product_id.as_str(), s)).collect();
        let product_map: HashMap<&str, &Product> =
            products.iter().map(|p| (p.id.as_str(), p)).collect();

        let mut records = Vec::with_capacity(demand.len());

        for line in demand {
            let product = product_map.get(line.product_id.as_str()).copied();
            let snapshot = stock_map.get(line.product_id.as_str()).copied();

            let (available, unit_cost) = match (snapshot, product) {
                (Some(s), _) => (s.available_quantity, s.average_cost),
                (None, Some(p)) => (p.stock_level, Decimal::ZERO),
                (None, None) => (Decimal::ZERO, Decimal::ZERO),
            };
            let minimum_stock = Self::minimum_stock(snapshot, product);

            let shortfall = Self::shortfall(line.total_quantity, available);
            let urgency = Self::classify_urgency(available, minimum_stock, shortfall);

            let unit_value = if unit_cost > Decimal::ZERO {
                unit_cost
            } else {
                line.average_unit_price()
            };

            let product_name = product
                .map(|p| p.name.clone())
                .unwrap_or_else(|| line.product_id.clone());

            tracing::debug!(
                "產品 {}：訂購 {}，可用 {}，缺貨 {}，緊急程度 {:?}",
                line.product_id,
                line.total_quantity,
                available,
                shortfall,
                urgency
            );

            records.push(ShortfallRecord {
                product_id: line.product_id.clone(),
                product_name,
                ordered_quantity: line.total_quantity,
                ordered_value: line.total_value,
                available_quantity: available,
                minimum_stock,
                shortfall,
                urgency,
                estimated_shortfall_value: shortfall * unit_value,
            });
        }

        let products_analysed = records.len();
        let products_with_shortfall = records.iter().filter(|r| r.has_shortfall()).count();
        let critical_count = records
            .iter()
            .filter(|r| r.urgency == UrgencyLevel::Critical)
            .count();
        let total_shortfall_value = records.iter().map(|r| r.estimated_shortfall_value).sum();

        StockAnalysis {
            period: *period,
            fulfillment_percentage: Self::fulfillment_percentage(
                products_analysed - products_with_shortfall,
                products_analysed,
            ),
            records,
            products_analysed,
            products_with_shortfall,
            critical_count,
            total_shortfall_value,
        }
    }

    /// 最低庫存門檻：快照未設定（為 0）時由產品主檔補上
    pub fn minimum_stock(snapshot: Option<&StockSnapshot>, product: Option<&Product>) -> Decimal {
        let from_snapshot = snapshot.map_or(Decimal::ZERO, |s| s.minimum_stock);
        let from_product = product.map_or(Decimal::ZERO, |p| p.minimum_stock);
        from_snapshot.max(from_product)
    }

    /// 缺貨量 = max(0, 訂購量 - 可用庫存)
    pub fn shortfall(ordered: Decimal, available: Decimal) -> Decimal {
        (ordered - available).max(Decimal::ZERO)
    }

    /// 緊急程度
    ///
    /// 可用 ≤ 0 → 危急；低於最低庫存 → 高；仍有缺貨 → 中；其餘 → 低
    pub fn classify_urgency(
        available: Decimal,
        minimum_stock: Decimal,
        shortfall: Decimal,
    ) -> UrgencyLevel {
        if available <= Decimal::ZERO {
            UrgencyLevel::Critical
        } else if available < minimum_stock {
            UrgencyLevel::High
        } else if shortfall > Decimal::ZERO {
            UrgencyLevel::Medium
        } else {
            UrgencyLevel::Low
        }
    }

    /// 滿足率（以產品數計算；無產品時為 100）
    pub fn fulfillment_percentage(satisfied: usize, total: usize) -> Decimal {
        if total == 0 {
            return Decimal::ONE_HUNDRED;
        }
        Decimal::from(satisfied as u64) / Decimal::from(total as u64) * Decimal::ONE_HUNDRED
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 11, d).unwrap()
    }

    fn product(id: &str, minimum: Decimal) -> Product {
        Product::new(id.to_string(), format!("{} name", id), "kg".to_string(), dec!(30))
            .with_minimum_stock(minimum)
    }

    #[test]
    fn test_run_end_to_end() {
        let orders = vec![OrderSnapshot::new("SO-1".into(), "BISTRO".into(), date(3))
            .with_line("TOMATO", dec!(20), dec!(40))
            .with_line("BASIL", dec!(5), dec!(15))
            .with_line("ONION", dec!(8), dec!(10))];

        let stock = vec![
            StockSnapshot::new("TOMATO".into(), dec!(12), dec!(25)).with_minimum_stock(dec!(5)),
            StockSnapshot::new("BASIL".into(), dec!(10), dec!(6)).with_minimum_stock(dec!(2)),
            StockSnapshot::new("ONION".into(), dec!(0), dec!(4)),
        ];
        let products = vec![product("TOMATO", dec!(5)), product("BASIL", dec!(2))];

        let analysis = StockAnalyzer::run(&orders, date(3), date(6), &stock, &products).unwrap();

        assert_eq!(analysis.products_analysed, 3);
        assert_eq!(analysis.products_with_shortfall, 2);
        assert_eq!(analysis.critical_count, 1);

        let tomato = analysis.record_for("TOMATO").unwrap();
        assert_eq!(tomato.shortfall, dec!(8));
        assert_eq!(tomato.urgency, UrgencyLevel::Medium);
        assert_eq!(tomato.estimated_shortfall_value, dec!(200));
        assert_eq!(tomato.product_name, "TOMATO name");

        let onion = analysis.record_for("ONION").unwrap();
        assert_eq!(onion.urgency, UrgencyLevel::Critical);
        assert_eq!(onion.product_name, "ONION");

        let basil = analysis.record_for("BASIL").unwrap();
        assert_eq!(basil.shortfall, Decimal::ZERO);
        assert_eq!(basil.urgency, UrgencyLevel::Low);

        // 1 / 3 產品無缺貨
        assert_eq!(analysis.fulfillment_percentage.round_dp(2), dec!(33.33));
        assert_eq!(analysis.shortfalls().count(), 2);
    }

    #[test]
    fn test_run_rejects_inverted_period() {
        let result = StockAnalyzer::run(&[], date(6), date(3), &[], &[]);
        assert!(matches!(
            result,
            Err(procure_core::ProcureError::InvalidPeriod(_))
        ));
    }

    #[test]
    fn test_falls_back_to_product_stock_level() {
        let period = AnalysisPeriod::new(date(3), date(6)).unwrap();
        let mut demand = DemandLine::new("TOMATO".to_string());
        demand.total_quantity = dec!(10);
        demand.total_value = dec!(400);

        let products = vec![product("TOMATO", dec!(8)).with_stock_level(dec!(6))];
        let analysis = StockAnalyzer::analyze(&period, &[demand], &[], &products);

        let record = &analysis.records[0];
        assert_eq!(record.available_quantity, dec!(6));
        assert_eq!(record.shortfall, dec!(4));
        assert_eq!(record.urgency, UrgencyLevel::High);
        // 無平均成本時以訂購均價估值
        assert_eq!(record.estimated_shortfall_value, dec!(160));
    }

    #[test]
    fn test_product_minimum_applies_when_snapshot_has_none() {
        let period = AnalysisPeriod::new(date(3), date(6)).unwrap();
        let mut demand = DemandLine::new("TOMATO".to_string());
        demand.total_quantity = dec!(10);
        demand.total_value = dec!(400);

        let products = vec![product("TOMATO", dec!(8))];
        let stock = vec![StockSnapshot::new("TOMATO".into(), dec!(6), dec!(25))];
        let analysis = StockAnalyzer::analyze(&period, &[demand], &stock, &products);

        let record = &analysis.records[0];
        assert_eq!(record.minimum_stock, dec!(8));
        assert_eq!(record.shortfall, dec!(4));
        assert_eq!(record.urgency, UrgencyLevel::High);
        assert_eq!(record.estimated_shortfall_value, dec!(100));
    }

    #[rstest]
    #[case(Some(dec!(3)), Some(dec!(8)), dec!(8))]
    #[case(Some(dec!(9)), Some(dec!(8)), dec!(9))]
    #[case(None, Some(dec!(8)), dec!(8))]
    #[case(Some(dec!(3)), None, dec!(3))]
    #[case(None, None, dec!(0))]
    fn test_minimum_stock_resolution(
        #[case] snapshot_minimum: Option<Decimal>,
        #[case] product_minimum: Option<Decimal>,
        #[case] expected: Decimal,
    ) {
        let snapshot = snapshot_minimum.map(|minimum| {
            StockSnapshot::new("TOMATO".into(), dec!(6), dec!(25)).with_minimum_stock(minimum)
        });
        let product = product_minimum.map(|minimum| product("TOMATO", minimum));

        assert_eq!(
            StockAnalyzer::minimum_stock(snapshot.as_ref(), product.as_ref()),
            expected
        );
    }

    #[test]
    fn test_empty_demand_is_fully_fulfilled() {
        let period = AnalysisPeriod::new(date(3), date(6)).unwrap();
        let analysis = StockAnalyzer::analyze(&period, &[], &[], &[]);

        assert_eq!(analysis.products_analysed, 0);
        assert_eq!(analysis.fulfillment_percentage, dec!(100));
    }

    #[rstest]
    #[case(dec!(0), dec!(5), dec!(10), UrgencyLevel::Critical)]
    #[case(dec!(-2), dec!(0), dec!(0), UrgencyLevel::Critical)]
    #[case(dec!(3), dec!(5), dec!(0), UrgencyLevel::High)]
    #[case(dec!(6), dec!(5), dec!(4), UrgencyLevel::Medium)]
    #[case(dec!(6), dec!(5), dec!(0), UrgencyLevel::Low)]
    fn test_classify_urgency(
        #[case] available: Decimal,
        #[case] minimum: Decimal,
        #[case] shortfall: Decimal,
        #[case] expected: UrgencyLevel,
    ) {
        assert_eq!(
            StockAnalyzer::classify_urgency(available, minimum, shortfall),
            expected
        );
    }

    proptest! {
        /// 性質：缺貨量非負，且僅在庫存足夠時為 0
        #[test]
        fn shortfall_non_negative_and_zero_iff_covered(
            ordered in 0i64..1_000_000,
            available in -1_000i64..1_000_000,
        ) {
            let ordered = Decimal::new(ordered, 2);
            let available = Decimal::new(available, 2);
            let shortfall = StockAnalyzer::shortfall(ordered, available);

            prop_assert!(shortfall >= Decimal::ZERO);
            prop_assert_eq!(shortfall.is_zero(), available >= ordered);
        }
    }
}
