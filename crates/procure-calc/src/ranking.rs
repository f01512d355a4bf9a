//! 供應商排序
//!
//! 評估順序固定：自家農場優先，其次外部供應商（依目錄順序），市場最後。
//! 第一個能完整供應的候選立即採用（優先序優先，而非最低價優先）。

use procure_core::{
    EngineConfig, MatchKind, ProcureError, Product, SupplierCatalogEntry, SupplierKind,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 供應商選擇結果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupplierOption {
    pub supplier_id: String,
    pub supplier_name: String,
    pub supplier_kind: SupplierKind,
    pub unit_price: Decimal,

    /// 可供應量
    pub fulfillable_quantity: Decimal,

    pub total_cost: Decimal,
    pub lead_time_days: u32,
    pub quality_rating: Decimal,
    pub priority_score: Decimal,
    pub match_kind: MatchKind,
}

impl SupplierOption {
    /// 是否為市場合成結果（呼叫端應顯示警告）
    pub fn is_fallback(&self) -> bool {
        self.match_kind == MatchKind::MarketFallback
    }

    /// 是否可完整供應
    pub fn is_full(&self) -> bool {
        self.match_kind == MatchKind::Full
    }
}

/// 供應商排序器
pub struct SupplierRanker;

impl SupplierRanker {
    /// 為產品/數量選擇供應商
    pub fn rank(
        product: &Product,
        quantity_needed: Decimal,
        catalog: &[SupplierCatalogEntry],
        config: &EngineConfig,
    ) -> procure_core::Result<SupplierOption> {
        if quantity_needed <= Decimal::ZERO {
            return Err(ProcureError::InvalidQuantity(format!(
                "{} 需要量必須大於 0：{}",
                product.id, quantity_needed
            )));
        }

        let candidates = Self::ordered_candidates(&product.id, catalog);
        let mut best_partial: Option<(&SupplierCatalogEntry, Decimal)> = None;

        for entry in candidates {
            if entry.can_fulfill(quantity_needed) {
                let score = Self::priority_score(entry, true);
                tracing::debug!(
                    "產品 {} 由 {} 完整供應（分數 {}）",
                    product.id,
                    entry.supplier_name,
                    score
                );
                return Ok(Self::option_from_entry(
                    entry,
                    quantity_needed,
                    score,
                    MatchKind::Full,
                ));
            }

            if entry.available_quantity <= Decimal::ZERO {
                continue;
            }

            let score = Self::priority_score(entry, false);
            let is_better = best_partial.map_or(true, |(_, best_score)| score > best_score);
            if is_better {
                best_partial = Some((entry, score));
            }
        }

        if let Some((entry, score)) = best_partial {
            tracing::debug!(
                "產品 {} 無供應商可完整供應，部分供應：{} ({} / {})",
                product.id,
                entry.supplier_name,
                entry.available_quantity,
                quantity_needed
            );
            return Ok(Self::option_from_entry(
                entry,
                entry.available_quantity,
                score,
                MatchKind::Partial,
            ));
        }

        tracing::warn!("產品 {} 沒有可用供應商，使用市場合成價格", product.id);
        Ok(Self::market_fallback(product, quantity_needed, config))
    }

    /// 優先分數
    ///
    /// 100×自家 + 50×可完整供應 + 10×品質 + 0.1×max(0, 100 - 單價/10)
    pub fn priority_score(entry: &SupplierCatalogEntry, can_fulfill: bool) -> Decimal {
        let home = if entry.is_home() { Decimal::from(100) } else { Decimal::ZERO };
        let fulfill = if can_fulfill { Decimal::from(50) } else { Decimal::ZERO };
        let quality = Decimal::TEN * entry.quality_rating;
        let price = (Decimal::ONE_HUNDRED - entry.unit_price / Decimal::TEN).max(Decimal::ZERO)
            * Decimal::new(1, 1);

        home + fulfill + quality + price
    }

    /// 依固定優先序排列可用候選（同類別保留目錄順序）
    pub fn ordered_candidates<'a>(
        product_id: &str,
        catalog: &'a [SupplierCatalogEntry],
    ) -> Vec<&'a SupplierCatalogEntry> {
        let mut candidates: Vec<&SupplierCatalogEntry> = catalog
            .iter()
            .filter(|entry| entry.product_id == product_id && entry.is_available)
            .collect();
        candidates.sort_by_key(|entry| entry.supplier_kind.evaluation_rank());
        candidates
    }

    fn option_from_entry(
        entry: &SupplierCatalogEntry,
        quantity: Decimal,
        priority_score: Decimal,
        match_kind: MatchKind,
    ) -> SupplierOption {
        SupplierOption {
            supplier_id: entry.supplier_id.clone(),
            supplier_name: entry.supplier_name.clone(),
            supplier_kind: entry.supplier_kind,
            unit_price: entry.unit_price,
            fulfillable_quantity: quantity,
            total_cost: entry.unit_price * quantity,
            lead_time_days: entry.lead_time_days,
            quality_rating: entry.quality_rating,
            priority_score,
            match_kind,
        }
    }

    fn market_fallback(
        product: &Product,
        quantity_needed: Decimal,
        config: &EngineConfig,
    ) -> SupplierOption {
        let unit_price = product.base_price * config.market_fallback_price_factor;
        SupplierOption {
            supplier_id: config.market_supplier.supplier_id.clone(),
            supplier_name: config.market_supplier.supplier_name.clone(),
            supplier_kind: SupplierKind::Market,
            unit_price,
            fulfillable_quantity: quantity_needed,
            total_cost: unit_price * quantity_needed,
            lead_time_days: config.market_supplier.lead_time_days,
            quality_rating: Decimal::ZERO,
            priority_score: Decimal::ZERO,
            match_kind: MatchKind::MarketFallback,
        }
    }
}
