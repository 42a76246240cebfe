//! The `compare` command: fetch, rank and print.

use std::collections::HashMap;

use prixmq_core::{AppConfig, BasketItem, Comparison, ComparisonSession, ComparisonState};

use crate::backend::Backend;
use crate::basket::open_basket;

/// # Errors
///
/// Returns an error if no backend is configured or the price fetch fails.
/// The basket is left untouched either way.
pub(crate) async fn run_compare(config: &AppConfig) -> anyhow::Result<()> {
    let basket = open_basket(config);
    if basket.is_empty() {
        println!("basket is empty; add products with `basket add` or `basket scan`");
        return Ok(());
    }

    let backend = Backend::from_config(config).await?;
    let mut session = ComparisonSession::new();
    session.refresh(&backend, basket.items()).await;

    match session.state() {
        ComparisonState::Ready(comparison) => {
            print!("{}", render_comparison(comparison, basket.items()));
            Ok(())
        }
        ComparisonState::Failed(message) => {
            anyhow::bail!("could not load prices ({message}); basket unchanged, run `compare` to retry")
        }
        ComparisonState::Idle | ComparisonState::Loading => {
            anyhow::bail!("comparison did not complete")
        }
    }
}

pub(crate) fn render_comparison(comparison: &Comparison, items: &[BasketItem]) -> String {
    if comparison.is_empty() {
        return "no store has a known price for anything in your basket\n".to_string();
    }

    let names: HashMap<&str, &str> = items
        .iter()
        .map(|i| (i.product_id.as_str(), i.name.as_str()))
        .collect();

    let mut out = format!(
        "{:<6}{:<32}{:>10}{:>8}{:>8}\n",
        "RANK", "STORE", "TOTAL", "FOUND", "%"
    );
    for store in &comparison.stores {
        let result = &store.result;
        let marker = if store.is_best_offer { "  best offer" } else { "" };
        let total = format!("{:.2}", result.total_price);
        let found = format!("{}/{}", result.matched_items.len(), comparison.basket_len);
        let percent = result.completeness_percent.round_dp(0).to_string();
        out.push_str(&format!(
            "{:<6}{:<32}{total:>10}{found:>8}{percent:>8}{marker}\n",
            store.rank + 1,
            result.store_name,
        ));
        if !result.missing_product_ids.is_empty() {
            let missing: Vec<&str> = result
                .missing_product_ids
                .iter()
                .map(|id| names.get(id.as_str()).copied().unwrap_or(id.as_str()))
                .collect();
            out.push_str(&format!("      missing: {}\n", missing.join(", ")));
        }
    }

    if let Some(savings) = comparison.savings_vs_worst_complete() {
        if !savings.is_zero() {
            out.push_str(&format!(
                "complete basket: save {savings:.2} by choosing the cheapest store\n"
            ));
        }
    }
    out
}
