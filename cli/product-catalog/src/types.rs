//! Catalog record types.

use serde::{Deserialize, Serialize};

pub type ProductId = u64;

/// A single catalog item, as served by `GET /products`.
///
/// `description` and `brand` are nullable in the catalog's storage and
/// deserialize to `None` when `null` or missing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub category: String,
    #[serde(default)]
    pub brand: Option<String>,
    pub price: f64,
    pub stock_quantity: u32,
    pub sku: String,
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn deserialize_catalog_record() {
        let product: Product = serde_json::from_value(json!({
            "id": 1,
            "name": "Laptop Pro",
            "description": "A powerful laptop",
            "category": "Electronics",
            "brand": "TechCorp",
            "price": 1200.0,
            "stock_quantity": 50,
            "sku": "TC-LP-PRO-01"
        }))
        .unwrap();

        assert_eq!(product, Product {
            id: 1,
            name: "Laptop Pro".to_string(),
            description: Some("A powerful laptop".to_string()),
            category: "Electronics".to_string(),
            brand: Some("TechCorp".to_string()),
            price: 1200.0,
            stock_quantity: 50,
            sku: "TC-LP-PRO-01".to_string(),
        });
    }

    #[test]
    fn nullable_fields_are_optional() {
        let product: Product = serde_json::from_value(json!({
            "id": 7,
            "name": "widget",
            "description": null,
            "category": "tools",
            "price": 10.5,
            "stock_quantity": 0,
            "sku": "4006381333931"
        }))
        .unwrap();

        assert_eq!(product.description, None);
        assert_eq!(product.brand, None);
    }

    #[test]
    fn negative_stock_is_rejected() {
        let result = serde_json::from_value::<Product>(json!({
            "id": 7,
            "name": "widget",
            "category": "tools",
            "price": 10.5,
            "stock_quantity": -1,
            "sku": "4006381333931"
        }));

        assert!(result.is_err(), "expected an error, found: {result:?}");
    }
}
