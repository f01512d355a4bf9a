//! # Farm Procure
//!
//! 農場採購與動態定價引擎
//!
//! - [`model`]：資料模型、配置、訂貨日曆、錯誤類型
//! - [`calc`]：緩衝量、波動分級、供應商排序與拆單、缺貨分析、採購建議
//! - [`pricing`]：定價規則引擎、客戶價目表

pub use procure_calc as calc;
pub use procure_core as model;
pub use procure_pricing as pricing;

pub use chrono::NaiveDate;
pub use rust_decimal::Decimal;

pub use procure_calc::{BatchOutcome, RecommendationGenerator, StockAnalyzer};
pub use procure_core::{EngineConfig, ProcureError, Result};
pub use procure_pricing::{PriceListGenerator, PriceListRequest, PricingEngine};
