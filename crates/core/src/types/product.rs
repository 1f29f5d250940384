//! Catalog product as delivered by `GET /api/products`.

use serde::{Deserialize, Serialize};

use super::id::ProductId;
use super::price::Price;

/// A product (or movie) from the catalog.
///
/// The catalog is owned by the backend; the client only keeps copies. Legacy
/// Portuguese field names (`nome`, `preco`, `imagemUrl`) are accepted on input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Stable product identifier.
    pub id: ProductId,
    /// Display name.
    #[serde(alias = "nome", default)]
    pub name: String,
    /// Unit price. `None` when the backend sent a missing or non-numeric value.
    #[serde(
        alias = "preco",
        default,
        deserialize_with = "Price::deserialize_lenient"
    )]
    pub price: Option<Price>,
    /// Image URL or asset reference.
    #[serde(rename = "imageUrl", alias = "imagemUrl", default)]
    pub image_ref: Option<String>,
}

impl Product {
    /// Create a product with a known price.
    #[must_use]
    pub fn new(id: impl Into<ProductId>, name: impl Into<String>, price: Price) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            price: Some(price),
            image_ref: None,
        }
    }

    /// Unit price, treating a missing price as zero.
    #[must_use]
    pub fn unit_price(&self) -> Price {
        self.price.unwrap_or(Price::ZERO)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_legacy_names() {
        let json = r#"{"id":"1","nome":"Produto Teste 1","preco":19.99,"imagemUrl":"https://picsum.photos/seed/10/200"}"#;
        let product: Product = serde_json::from_str(json).unwrap();
        assert_eq!(product.id, ProductId::new("1"));
        assert_eq!(product.name, "Produto Teste 1");
        assert_eq!(product.price, Some(Price::from_cents(1999)));
        assert_eq!(
            product.image_ref.as_deref(),
            Some("https://picsum.photos/seed/10/200")
        );
    }

    #[test]
    fn test_deserialize_english_names_numeric_id() {
        let json = r#"{"id":7,"name":"Widget","price":"89.90"}"#;
        let product: Product = serde_json::from_str(json).unwrap();
        assert_eq!(product.id.as_str(), "7");
        assert_eq!(product.unit_price().format(), "89.90");
        assert!(product.image_ref.is_none());
    }

    #[test]
    fn test_bad_price_becomes_none() {
        for raw in [r#""n/a""#, "null", "[]", "-3"] {
            let json = format!(r#"{{"id":"1","name":"X","price":{raw}}}"#);
            let product: Product = serde_json::from_str(&json).unwrap();
            assert_eq!(product.price, None, "price {raw}");
            assert_eq!(product.unit_price(), Price::ZERO);
        }
    }

    #[test]
    fn test_missing_price_becomes_none() {
        let product: Product = serde_json::from_str(r#"{"id":"1","name":"X"}"#).unwrap();
        assert_eq!(product.price, None);
    }
}
