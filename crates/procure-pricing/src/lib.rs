//! # Procurement Pricing
//!
//! 動態定價模組（定價規則、客戶價目表）

pub mod markup;
pub mod price_list;

// Re-export 主要類型
pub use markup::{CalculationBreakdown, PriceCalculation, PricingEngine};
pub use price_list::{activate_price_list, PriceListGenerator, PriceListOutcome, PriceListRequest};
