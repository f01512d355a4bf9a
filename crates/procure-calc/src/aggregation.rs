//! 需求彙總

use procure_core::{AnalysisPeriod, DemandLine, OrderSnapshot};
use std::collections::{BTreeMap, BTreeSet};

/// 需求彙總器
pub struct DemandAggregator;

impl DemandAggregator {
    /// 彙總期間內有效訂單的各產品需求（依產品ID排序）
    pub fn aggregate(orders: &[OrderSnapshot], period: &AnalysisPeriod) -> Vec<DemandLine> {
        let mut grouped: BTreeMap<String, DemandLine> = BTreeMap::new();
        let mut included_orders = 0usize;

        for order in Self::orders_in_period(orders, period) {
            included_orders += 1;
            let mut products_in_order = BTreeSet::new();

            for line in &order.lines {
                let demand = grouped
                    .entry(line.product_id.clone())
                    .or_insert_with(|| DemandLine::new(line.product_id.clone()));

                demand.total_quantity += line.quantity;
                demand.total_value += line.line_value();

                if products_in_order.insert(line.product_id.as_str()) {
                    demand.order_count += 1;
                }
            }
        }

        tracing::debug!(
            "需求彙總：訂單 {} 筆（有效 {} 筆），產品 {} 項",
            orders.len(),
            included_orders,
            grouped.len()
        );

        grouped.into_values().collect()
    }

    /// 篩選期間內、狀態有效的訂單
    pub fn orders_in_period<'a>(
        orders: &'a [OrderSnapshot],
        period: &'a AnalysisPeriod,
    ) -> impl Iterator<Item = &'a OrderSnapshot> + 'a {
        orders
            .iter()
            .filter(move |order| order.status.is_active() && period.contains(order.order_date))
    }
}
