//! Basket editing commands.
//!
//! Every edit is persisted to `<PRIXMQ_DATA_DIR>/basket.json` before the
//! command returns. Only `scan` needs a price backend.

use clap::Subcommand;
use prixmq_core::{
    AppConfig, Barcode, Basket, BasketItem, FileStore, KeyValueStore, NewBasketProduct, ProductId,
};

use crate::backend::Backend;

#[derive(Debug, Subcommand)]
pub enum BasketCommands {
    /// List the basket contents
    Show,
    /// Add one unit of a product
    Add {
        product_id: String,
        /// Display name stored with the item
        #[arg(long)]
        name: String,
        #[arg(long)]
        photo_url: Option<String>,
    },
    /// Look up a barcode in the catalogue and add the product
    Scan { code: String },
    /// Set the quantity of an item already in the basket (0 removes it)
    Set { product_id: String, quantity: u32 },
    /// Add one unit of an item already in the basket
    Inc { product_id: String },
    /// Remove one unit; the item goes away at zero
    Dec { product_id: String },
    /// Remove an item entirely
    Remove { product_id: String },
    /// Empty the basket
    Clear {
        /// Confirm emptying the basket
        #[arg(long)]
        yes: bool,
    },
}

pub(crate) fn open_basket(config: &AppConfig) -> Basket<FileStore> {
    Basket::load(FileStore::new(&config.data_dir))
}

/// # Errors
///
/// Returns an error if the basket cannot be persisted, `clear` is not
/// confirmed, or a scanned barcode is invalid or unknown.
pub(crate) async fn run_basket(config: &AppConfig, command: BasketCommands) -> anyhow::Result<()> {
    let mut basket = open_basket(config);

    match command {
        BasketCommands::Show => {}
        BasketCommands::Scan { code } => {
            let barcode = Barcode::parse(&code)?;
            let backend = Backend::from_config(config).await?;
            let Some(product) = backend.find_product_by_barcode(&barcode.normalized()).await?
            else {
                anyhow::bail!("no product with barcode {barcode} in the catalogue");
            };
            basket.add_item(product.to_basket_product())?;
            let tag = if product.is_bqp { " [BQP]" } else { "" };
            println!("added {}{tag}", product.name);
        }
        edit => apply_edit(&mut basket, edit)?,
    }

    print!("{}", render_basket(basket.items()));
    Ok(())
}

/// Applies a local edit. `show` and `scan` are handled by [`run_basket`].
pub(crate) fn apply_edit<S: KeyValueStore>(
    basket: &mut Basket<S>,
    command: BasketCommands,
) -> anyhow::Result<()> {
    match command {
        BasketCommands::Show | BasketCommands::Scan { .. } => {}
        BasketCommands::Add {
            product_id,
            name,
            photo_url,
        } => {
            let mut product = NewBasketProduct::new(product_id, name);
            if let Some(url) = photo_url {
                product = product.with_photo_url(url);
            }
            basket.add_item(product)?;
        }
        BasketCommands::Set {
            product_id,
            quantity,
        } => {
            if let Some(id) = known_item(basket, &product_id) {
                basket.update_quantity(&id, quantity)?;
            }
        }
        BasketCommands::Inc { product_id } => {
            if let Some(id) = known_item(basket, &product_id) {
                basket.increment(&id)?;
            }
        }
        BasketCommands::Dec { product_id } => {
            if let Some(id) = known_item(basket, &product_id) {
                basket.decrement(&id)?;
            }
        }
        BasketCommands::Remove { product_id } => {
            if let Some(id) = known_item(basket, &product_id) {
                basket.remove_item(&id)?;
            }
        }
        BasketCommands::Clear { yes } => {
            if !yes {
                anyhow::bail!("refusing to clear the basket without --yes");
            }
            basket.clear()?;
        }
    }
    Ok(())
}

/// `None` (with a warning) when the product is not in the basket, so the
/// edit is skipped without rewriting the snapshot.
fn known_item<S: KeyValueStore>(basket: &Basket<S>, product_id: &str) -> Option<ProductId> {
    let id = ProductId::from(product_id);
    if basket.get(&id).is_none() {
        tracing::warn!(product_id, "product is not in the basket; nothing changed");
        return None;
    }
    Some(id)
}

pub(crate) fn render_basket(items: &[BasketItem]) -> String {
    if items.is_empty() {
        return "basket is empty\n".to_string();
    }

    let mut out = format!("{:<24}{:>5}  NAME\n", "PRODUCT", "QTY");
    for item in items {
        out.push_str(&format!(
            "{:<24}{:>5}  {}\n",
            item.product_id.as_str(),
            item.quantity,
            item.name
        ));
    }
    let units: u64 = items.iter().map(|i| u64::from(i.quantity)).sum();
    out.push_str(&format!("{} products, {units} units\n", items.len()));
    out
}
