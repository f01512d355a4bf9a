//! 每週採購與價目表示範
//!
//! ```text
//! RUST_LOG=debug cargo run --example weekly_run
//! ```

use anyhow::Context;
use farm_procure::calc::{RecommendationGenerator, StockAnalyzer, SupplierSplitOptimizer};
use farm_procure::model::*;
use farm_procure::pricing::{PriceListGenerator, PriceListRequest};
use farm_procure::NaiveDate;
use rust_decimal_macros::dec;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn date(d: u32) -> anyhow::Result<NaiveDate> {
    NaiveDate::from_ymd_opt(2025, 11, d).context("無效的日期")
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = EngineConfig::default();
    let (start, end) = (date(3)?, date(6)?);
    config
        .order_cycle
        .validate_period(start, end)
        .context("分析期間未對齊訂貨日")?;

    let products = vec![
        Product::new("TOMATO".into(), "Roma Tomato".into(), "kg".into(), dec!(30))
            .with_minimum_stock(dec!(5)),
        Product::new("SPINACH".into(), "Baby Spinach".into(), "kg".into(), dec!(20))
            .with_minimum_stock(dec!(5)),
        Product::new("ONION".into(), "Red Onion".into(), "kg".into(), dec!(10)),
    ];

    let orders = vec![
        OrderSnapshot::new("SO-1".into(), "BISTRO".into(), start)
            .with_line("TOMATO", dec!(20), dec!(40))
            .with_line("SPINACH", dec!(10), dec!(28)),
        OrderSnapshot::new("SO-2".into(), "CAFE".into(), date(4)?)
            .with_line("TOMATO", dec!(10), dec!(40))
            .with_line("ONION", dec!(15), dec!(14)),
    ];

    let mut tomato_stock =
        StockSnapshot::new("TOMATO".into(), dec!(15), dec!(25)).with_minimum_stock(dec!(5));
    tomato_stock.apply_movements(&[
        StockMovement::Receipt {
            quantity: dec!(10),
            unit_cost: dec!(22),
        },
        StockMovement::Waste {
            quantity: dec!(7),
        },
    ])?;
    let stock = vec![
        tomato_stock,
        StockSnapshot::new("SPINACH".into(), dec!(2), dec!(15)).with_minimum_stock(dec!(5)),
    ];

    let catalog = vec![
        SupplierCatalogEntry::new(
            "FARM".into(),
            "Home Farm".into(),
            SupplierKind::Home,
            "SPINACH".into(),
            dec!(12),
            dec!(3),
        ),
        SupplierCatalogEntry::new(
            "GREEN".into(),
            "Green Valley Growers".into(),
            SupplierKind::External,
            "SPINACH".into(),
            dec!(10),
            dec!(20),
        )
        .with_lead_time(2),
        SupplierCatalogEntry::new(
            "FARM".into(),
            "Home Farm".into(),
            SupplierKind::Home,
            "TOMATO".into(),
            dec!(22),
            dec!(50),
        ),
    ];

    // 缺貨分析 → 採購建議
    let analysis = StockAnalyzer::run(&orders, start, end, &stock, &products)?;
    let policies = BufferPolicySet::new().with_product_policy(
        "TOMATO".to_string(),
        BufferPolicy::new(dec!(0.10), dec!(0.05), dec!(0)).with_pack(dec!(5), "box".into()),
    );
    let outcome = RecommendationGenerator::new(&config, &policies)
        .generate_from_analysis(&analysis, &products, &catalog, start);

    for rec in &outcome.successes {
        info!(
            "{:?} {} × {} 向 {} 採購，下單 {}，預估 {}",
            rec.urgency,
            rec.product_name,
            rec.recommended_quantity,
            rec.supplier_name,
            rec.recommended_order_date,
            rec.estimated_total_cost
        );
    }
    for warning in &outcome.warnings {
        info!("警告 {}：{}", warning.item_id, warning.message);
    }

    let split = SupplierSplitOptimizer::optimize("SPINACH", dec!(10), &catalog)?;
    info!("{}", serde_json::to_string_pretty(&split)?);

    // 市場價格 → 價目表
    let observations: Vec<MarketPriceObservation> = [
        ("TOMATO", start, dec!(18)),
        ("TOMATO", end, dec!(20)),
        ("SPINACH", end, dec!(16)),
        ("ONION", end, dec!(8)),
    ]
    .into_iter()
    .map(|(product_id, observed_on, excl)| {
        MarketPriceObservation::new(
            product_id.into(),
            observed_on,
            excl,
            excl * dec!(1.15),
            "Joburg Market".into(),
        )
    })
    .collect();
    let rules = vec![PricingRule::new(
        "R-STD".into(),
        "Standard restaurants".into(),
        CustomerSegment::Standard,
        dec!(20),
        dec!(5),
        dec!(15),
    )?];

    let request = PriceListRequest::new("BISTRO".into(), CustomerSegment::Standard, end);
    let priced = PriceListGenerator::new(&config, &products, &[], &rules).generate(
        &request,
        &observations,
        None,
    )?;

    info!("{}", serde_json::to_string_pretty(&priced.price_list)?);

    Ok(())
}
