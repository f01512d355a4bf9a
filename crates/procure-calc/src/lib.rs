//! # Procurement Calculation Engine
//!
//! 核心採購計算引擎：緩衝量、價格波動、供應商排序與拆單、缺貨分析、採購建議

pub mod aggregation;
pub mod buffer;
pub mod ranking;
pub mod recommendation;
pub mod split;
pub mod stock_analysis;
pub mod volatility;

// Re-export 主要類型
pub use aggregation::DemandAggregator;
pub use buffer::{BufferCalculation, BufferCalculator};
pub use ranking::{SupplierOption, SupplierRanker};
pub use recommendation::RecommendationGenerator;
pub use split::{SupplierAllocation, SupplierSplit, SupplierSplitOptimizer};
pub use stock_analysis::{StockAnalysis, StockAnalyzer};
pub use volatility::{VolatilityClassifier, VolatilityReading};

use procure_core::ProcureError;

/// 批次計算結果（多重狀態）
///
/// 單一項目失敗不會中止整批，失敗與成功一併回傳。
#[derive(Debug, Clone)]
pub struct BatchOutcome<T> {
    /// 成功項目
    pub successes: Vec<T>,

    /// 失敗項目
    pub failures: Vec<ItemFailure>,

    /// 警告信息
    pub warnings: Vec<CalcWarning>,
}

impl<T> BatchOutcome<T> {
    /// 創建空的批次結果
    pub fn empty() -> Self {
        Self {
            successes: Vec::new(),
            failures: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// 添加失敗項目
    pub fn add_failure(&mut self, item_id: &str, error: ProcureError) {
        self.failures.push(ItemFailure {
            item_id: item_id.to_string(),
            error,
        });
    }

    /// 添加警告
    pub fn add_warning(&mut self, warning: CalcWarning) {
        self.warnings.push(warning);
    }

    /// 是否全部成功
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

impl<T> Default for BatchOutcome<T> {
    fn default() -> Self {
        Self::empty()
    }
}

/// 批次中單一項目的失敗
#[derive(Debug, Clone, PartialEq)]
pub struct ItemFailure {
    pub item_id: String,
    pub error: ProcureError,
}

/// 計算警告
#[derive(Debug, Clone)]
pub struct CalcWarning {
    pub item_id: String,
    pub message: String,
    pub severity: WarningSeverity,
}

impl CalcWarning {
    pub fn new(item_id: String, message: String, severity: WarningSeverity) -> Self {
        Self {
            item_id,
            message,
            severity,
        }
    }

    pub fn info(item_id: String, message: String) -> Self {
        Self::new(item_id, message, WarningSeverity::Info)
    }

    pub fn warning(item_id: String, message: String) -> Self {
        Self::new(item_id, message, WarningSeverity::Warning)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningSeverity {
    Info,
    Warning,
    Error,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_outcome_collects_failures() {
        let mut outcome: BatchOutcome<u32> = BatchOutcome::empty();
        outcome.successes.push(1);
        assert!(outcome.is_complete());

        outcome.add_failure("TOMATO", ProcureError::ProductNotFound("TOMATO".to_string()));
        outcome.add_warning(CalcWarning::warning(
            "BASIL".to_string(),
            "market fallback".to_string(),
        ));

        assert!(!outcome.is_complete());
        assert_eq!(outcome.successes.len(), 1);
        assert_eq!(outcome.failures[0].item_id, "TOMATO");
        assert_eq!(outcome.warnings[0].severity, WarningSeverity::Warning);
    }
}
