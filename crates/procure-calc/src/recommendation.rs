//! 採購建議產生器

use chrono::{Days, NaiveDate};
use procure_core::{
    record_id, BufferPolicySet, EngineConfig, MatchKind, ProcureError, ProcurementRecommendation,
    Product, RecommendationStatus, ShortfallRecord, SupplierCatalogEntry,
};
use std::collections::HashMap;

use crate::{
    BatchOutcome, BufferCalculator, CalcWarning, StockAnalysis, SupplierRanker,
};

/// 採購建議產生器
pub struct RecommendationGenerator<'a> {
    /// 引擎配置
    config: &'a EngineConfig,

    /// 緩衝政策
    policies: &'a BufferPolicySet,
}

impl<'a> RecommendationGenerator<'a> {
    /// 創建新的產生器
    pub fn new(config: &'a EngineConfig, policies: &'a BufferPolicySet) -> Self {
        Self { config, policies }
    }

    /// 由缺貨分析產生建議
    pub fn generate_from_analysis(
        &self,
        analysis: &StockAnalysis,
        products: &[Product],
        catalog: &[SupplierCatalogEntry],
        today: NaiveDate,
    ) -> BatchOutcome<ProcurementRecommendation> {
        self.generate(&analysis.records, products, catalog, today)
    }

    /// 主入口：為每個有缺貨的產品產生建議
    ///
    /// 單一產品失敗會記錄在 `failures`，不影響其他產品。
    /// 結果依緊急程度（危急優先）、建議下單日、產品ID排序。
    pub fn generate(
        &self,
        shortfalls: &[ShortfallRecord],
        products: &[Product],
        catalog: &[SupplierCatalogEntry],
        today: NaiveDate,
    ) -> BatchOutcome<ProcurementRecommendation> {
        tracing::info!(
            "開始產生採購建議：缺貨記錄 {} 筆，目錄項目 {} 筆",
            shortfalls.len(),
            catalog.len()
        );

        let product_map: HashMap<&str, &Product> =
            products.iter().map(|p| (p.id.as_str(), p)).collect();

        let mut outcome = BatchOutcome::empty();

        for record in shortfalls.iter().filter(|r| r.has_shortfall()) {
            let product = match product_map.get(record.product_id.as_str()) {
                Some(product) => *product,
                None => {
                    tracing::warn!("找不到產品 {}，略過", record.product_id);
                    outcome.add_failure(
                        &record.product_id,
                        ProcureError::ProductNotFound(record.product_id.clone()),
                    );
                    continue;
                }
            };

            match self.recommend(record, product, catalog, today) {
                Ok(recommendation) => {
                    match recommendation.match_kind {
                        MatchKind::MarketFallback => outcome.add_warning(CalcWarning::warning(
                            record.product_id.clone(),
                            format!(
                                "沒有可用供應商，改向 {} 採購（估價 {}）",
                                recommendation.supplier_name, recommendation.estimated_unit_cost
                            ),
                        )),
                        MatchKind::Partial => outcome.add_warning(CalcWarning::info(
                            record.product_id.clone(),
                            format!(
                                "{} 只能供應 {} / {}",
                                recommendation.supplier_name,
                                recommendation.fulfillable_quantity,
                                recommendation.recommended_quantity
                            ),
                        )),
                        MatchKind::Full => {}
                    }
                    outcome.successes.push(recommendation);
                }
                Err(error) => {
                    tracing::warn!("產品 {} 產生建議失敗：{}", record.product_id, error);
                    outcome.add_failure(&record.product_id, error);
                }
            }
        }

        outcome.successes.sort_by(|a, b| {
            b.urgency
                .cmp(&a.urgency)
                .then(a.recommended_order_date.cmp(&b.recommended_order_date))
                .then_with(|| a.product_id.cmp(&b.product_id))
        });

        tracing::info!(
            "採購建議完成：成功 {} 筆，失敗 {} 筆，警告 {} 筆",
            outcome.successes.len(),
            outcome.failures.len(),
            outcome.warnings.len()
        );

        outcome
    }

    /// 單一產品建議
    fn recommend(
        &self,
        record: &ShortfallRecord,
        product: &Product,
        catalog: &[SupplierCatalogEntry],
        today: NaiveDate,
    ) -> procure_core::Result<ProcurementRecommendation> {
        let buffer = BufferCalculator::calculate_for_product(
            record.shortfall,
            product,
            self.policies,
            self.config,
            today,
        )?;

        let option = SupplierRanker::rank(product, buffer.buy_quantity, catalog, self.config)?;

        let recommended_order_date = self.order_date_for(record, today)?;
        let expected_delivery_date = recommended_order_date
            .checked_add_days(Days::new(u64::from(option.lead_time_days)))
            .ok_or_else(|| {
                ProcureError::CalculationError(format!(
                    "{} 到貨日溢出：{} + {}",
                    record.product_id, recommended_order_date, option.lead_time_days
                ))
            })?;

        let mut reason = format!(
            "缺貨 {} {}（{:?}），緩衝 {}% 後建議採購 {}",
            record.shortfall,
            product.unit,
            record.urgency,
            buffer.buffer_percentage.normalize(),
            buffer.buy_quantity
        );
        // 部分滿足：預估總成本仍以建議量計算，缺口寫入理由
        if option.match_kind == MatchKind::Partial {
            reason.push_str(&format!(
                "，{} 僅能供應 {}，尚缺 {} {}",
                option.supplier_name,
                option.fulfillable_quantity.normalize(),
                (buffer.buy_quantity - option.fulfillable_quantity).normalize(),
                product.unit
            ));
        }

        Ok(ProcurementRecommendation {
            id: record_id("recommendation", &format!("{}:{}", record.product_id, today)),
            product_id: product.id.clone(),
            product_name: product.name.clone(),
            unit: product.unit.clone(),
            shortfall_quantity: record.shortfall,
            buffer_percentage: buffer.buffer_percentage,
            buffer_quantity: buffer.buffer_quantity,
            recommended_quantity: buffer.buy_quantity,
            supplier_id: option.supplier_id,
            supplier_name: option.supplier_name,
            supplier_kind: option.supplier_kind,
            match_kind: option.match_kind,
            fulfillable_quantity: option.fulfillable_quantity,
            estimated_unit_cost: option.unit_price,
            estimated_total_cost: option.unit_price * buffer.buy_quantity,
            lead_time_days: option.lead_time_days,
            urgency: record.urgency,
            recommended_order_date,
            expected_delivery_date,
            status: RecommendationStatus::Pending,
            reason,
        })
    }

    /// 建議下單日 = 今天 + 緊急程度天數
    fn order_date_for(
        &self,
        record: &ShortfallRecord,
        today: NaiveDate,
    ) -> procure_core::Result<NaiveDate> {
        let offset = self.config.urgency_offsets.days_for(record.urgency);
        today
            .checked_add_days(Days::new(u64::from(offset)))
            .ok_or_else(|| {
                ProcureError::CalculationError(format!(
                    "{} 下單日溢出：{} + {}",
                    record.product_id, today, offset
                ))
            })
    }
}
