//! 供應商拆單
//!
//! 單一供應商無法滿足時，依固定優先序逐一分配，直到滿足或候選用盡。

use procure_core::{ProcureError, SupplierCatalogEntry};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::SupplierRanker;

/// 單一供應商分配
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupplierAllocation {
    pub supplier_id: String,
    pub supplier_name: String,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    pub total_cost: Decimal,

    /// 是否為自家農場
    pub is_preferred: bool,
}

/// 拆單結果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupplierSplit {
    pub product_id: String,
    pub suppliers: Vec<SupplierAllocation>,

    /// 已分配總量
    pub total_quantity: Decimal,

    pub quantity_needed: Decimal,
    pub total_cost: Decimal,

    /// 自家農場供應比例 %
    #[serde(rename = "fambri_utilization")]
    pub home_utilization: Decimal,

    pub suppliers_used: usize,
    pub fully_fulfilled: bool,

    /// 未能分配的數量
    pub shortfall: Decimal,
}

impl SupplierSplit {
    /// 平均單價
    pub fn average_unit_price(&self) -> Decimal {
        if self.total_quantity.is_zero() {
            Decimal::ZERO
        } else {
            self.total_cost / self.total_quantity
        }
    }
}

/// 拆單最佳化器
pub struct SupplierSplitOptimizer;

impl SupplierSplitOptimizer {
    /// 依優先序貪婪分配
    pub fn optimize(
        product_id: &str,
        quantity_needed: Decimal,
        catalog: &[SupplierCatalogEntry],
    ) -> procure_core::Result<SupplierSplit> {
        if quantity_needed <= Decimal::ZERO {
            return Err(ProcureError::InvalidQuantity(format!(
                "{} 需要量必須大於 0：{}",
                product_id, quantity_needed
            )));
        }

        let mut remaining = quantity_needed;
        let mut suppliers = Vec::new();
        let mut total_cost = Decimal::ZERO;
        let mut home_quantity = Decimal::ZERO;

        for entry in SupplierRanker::ordered_candidates(product_id, catalog) {
            if remaining <= Decimal::ZERO {
                break;
            }
            if entry.available_quantity <= Decimal::ZERO {
                continue;
            }

            let quantity = remaining.min(entry.available_quantity);
            let cost = quantity * entry.unit_price;

            if entry.is_home() {
                home_quantity += quantity;
            }
            total_cost += cost;
            remaining -= quantity;

            suppliers.push(SupplierAllocation {
                supplier_id: entry.supplier_id.clone(),
                supplier_name: entry.supplier_name.clone(),
                quantity,
                unit_price: entry.unit_price,
                total_cost: cost,
                is_preferred: entry.is_home(),
            });
        }

        let total_quantity = quantity_needed - remaining;
        let shortfall = remaining.max(Decimal::ZERO);

        tracing::debug!(
            "產品 {} 拆單：{} 家供應商，分配 {} / {}，缺 {}",
            product_id,
            suppliers.len(),
            total_quantity,
            quantity_needed,
            shortfall
        );

        Ok(SupplierSplit {
            product_id: product_id.to_string(),
            suppliers_used: suppliers.len(),
            suppliers,
            total_quantity,
            quantity_needed,
            total_cost,
            home_utilization: home_quantity / quantity_needed * Decimal::ONE_HUNDRED,
            fully_fulfilled: shortfall.is_zero(),
            shortfall,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use procure_core::SupplierKind;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    fn entry(
        id: &str,
        kind: SupplierKind,
        price: Decimal,
        available: Decimal,
    ) -> SupplierCatalogEntry {
        SupplierCatalogEntry::new(
            id.to_string(),
            format!("{} supplier", id),
            kind,
            "SPINACH".to_string(),
            price,
            available,
        )
    }

    #[test]
    fn test_home_then_external() {
        // 自家 R12 × 3，外部 R10 × 20，需要 10 → 自家 3 (R36) + 外部 7 (R70)
        let catalog = vec![
            entry("EXT", SupplierKind::External, dec!(10), dec!(20)),
            entry("FARM", SupplierKind::Home, dec!(12), dec!(3)),
        ];

        let split = SupplierSplitOptimizer::optimize("SPINACH", dec!(10), &catalog).unwrap();

        assert_eq!(split.suppliers.len(), 2);
        assert_eq!(split.suppliers[0].supplier_id, "FARM");
        assert_eq!(split.suppliers[0].quantity, dec!(3));
        assert_eq!(split.suppliers[0].total_cost, dec!(36));
        assert!(split.suppliers[0].is_preferred);
        assert_eq!(split.suppliers[1].supplier_id, "EXT");
        assert_eq!(split.suppliers[1].quantity, dec!(7));
        assert_eq!(split.suppliers[1].total_cost, dec!(70));

        assert_eq!(split.total_cost, dec!(106));
        assert_eq!(split.home_utilization, dec!(30));
        assert!(split.fully_fulfilled);
        assert_eq!(split.shortfall, Decimal::ZERO);
        assert_eq!(split.suppliers_used, 2);
    }

    #[test]
    fn test_reports_shortfall_when_exhausted() {
        let catalog = vec![
            entry("FARM", SupplierKind::Home, dec!(12), dec!(2)),
            entry("EXT", SupplierKind::External, dec!(10), dec!(3)),
            entry("EMPTY", SupplierKind::External, dec!(8), dec!(0)),
        ];

        let split = SupplierSplitOptimizer::optimize("SPINACH", dec!(10), &catalog).unwrap();

        assert!(!split.fully_fulfilled);
        assert_eq!(split.total_quantity, dec!(5));
        assert_eq!(split.shortfall, dec!(5));
        assert_eq!(split.suppliers_used, 2);
        assert_eq!(split.home_utilization, dec!(20));
    }

    #[test]
    fn test_ties_keep_catalog_order() {
        let catalog = vec![
            entry("MKT", SupplierKind::Market, dec!(5), dec!(100)),
            entry("EXT-B", SupplierKind::External, dec!(9), dec!(4)),
            entry("EXT-A", SupplierKind::External, dec!(7), dec!(4)),
        ];

        let split = SupplierSplitOptimizer::optimize("SPINACH", dec!(10), &catalog).unwrap();
        let order: Vec<&str> = split.suppliers.iter().map(|s| s.supplier_id.as_str()).collect();

        assert_eq!(order, vec!["EXT-B", "EXT-A", "MKT"]);
        assert_eq!(split.suppliers[2].quantity, dec!(2));
    }

    #[test]
    fn test_wire_field_names() {
        let catalog = vec![entry("FARM", SupplierKind::Home, dec!(12), dec!(10))];
        let split = SupplierSplitOptimizer::optimize("SPINACH", dec!(10), &catalog).unwrap();

        let json = serde_json::to_value(&split).unwrap();
        assert!(json.get("fambri_utilization").is_some());
        assert!(json.get("fully_fulfilled").is_some());
        assert!(json["suppliers"][0].get("is_preferred").is_some());
    }

    fn catalog_strategy() -> impl Strategy<Value = Vec<SupplierCatalogEntry>> {
        prop::collection::vec((0u8..3, 1i64..5_000, 0i64..5_000), 0..8).prop_map(|rows| {
            rows.into_iter()
                .enumerate()
                .map(|(i, (kind, price, available))| {
                    let kind = match kind {
                        0 => SupplierKind::Home,
                        1 => SupplierKind::External,
                        _ => SupplierKind::Market,
                    };
                    entry(
                        &format!("S{}", i),
                        kind,
                        Decimal::new(price, 2),
                        Decimal::new(available, 1),
                    )
                })
                .collect()
        })
    }

    proptest! {
        /// 性質：分配總量不超過需要量，總可用量足夠時恰好等於需要量
        #[test]
        fn split_conserves_quantity(
            catalog in catalog_strategy(),
            needed in (1i64..10_000).prop_map(|n| Decimal::new(n, 1)),
        ) {
            let split = SupplierSplitOptimizer::optimize("SPINACH", needed, &catalog).unwrap();
            let allocated: Decimal = split.suppliers.iter().map(|s| s.quantity).sum();
            let available: Decimal = catalog.iter().map(|e| e.available_quantity).sum();

            prop_assert!(allocated <= needed);
            prop_assert_eq!(allocated, split.total_quantity);
            prop_assert_eq!(allocated + split.shortfall, needed);
            if available >= needed {
                prop_assert_eq!(allocated, needed);
                prop_assert!(split.fully_fulfilled);
            }
        }
    }
}
