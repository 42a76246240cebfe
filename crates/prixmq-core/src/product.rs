use serde::{Deserialize, Serialize};

use crate::basket::NewBasketProduct;
use crate::observation::ProductId;

/// A catalogue product as returned by a barcode or search lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogProduct {
    pub id: ProductId,
    pub name: String,
    pub barcode: Option<String>,
    pub photo_url: Option<String>,
    /// Part of the regulated "Bouclier Qualité Prix" basket.
    #[serde(default)]
    pub is_bqp: bool,
}

impl CatalogProduct {
    #[must_use]
    pub fn to_basket_product(&self) -> NewBasketProduct {
        NewBasketProduct {
            product_id: self.id.clone(),
            name: self.name.clone(),
            photo_url: self.photo_url.clone(),
        }
    }
}
