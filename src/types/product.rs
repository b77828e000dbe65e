use serde::{Deserialize, Serialize};

/// Identifier of a catalog product.
pub type ProductId = u64;

/// An immutable catalog entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Product {
    /// Unique product id.
    pub id: ProductId,

    /// Brand the product is sold under.
    pub brand: String,

    /// Product name.
    pub name: String,

    /// Category, stored lowercase in the shipped catalog (e.g. "skincare").
    pub category: String,

    /// Long-form description, sent to the advisor when building a routine.
    pub description: String,

    /// URL of the product image.
    pub image: String,
}

/// The document served by a catalog provider: `{"products": [...]}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CatalogDocument {
    /// Every product in the catalog.
    pub products: Vec<Product>,
}
