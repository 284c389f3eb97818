//! Plain text rendering of catalog products.

use std::fmt::Display;

use product_catalog::Product;

pub const NO_PRODUCTS_MESSAGE: &str = "No products found.";
pub const DEFAULT_DESCRIPTION: &str = "<no description provided>";
pub const DEFAULT_BRAND: &str = "<no brand>";

/// Format a price with exactly two decimals.
pub fn format_price(price: f64) -> String {
    format!("${price:.2}")
}

/// A single product rendered as a card:
///
/// ```text
/// Laptop Pro
///   TechCorp - Electronics
///   A powerful laptop
///   Price: $1200.00
///   Stock: 50 units
///   SKU: TC-LP-PRO-01
/// ```
pub struct DisplayProduct<'a>(pub &'a Product);

impl DisplayProduct<'_> {
    /// The lines of the card, without line endings.
    pub fn lines(&self) -> Vec<String> {
        let product = self.0;
        let brand = product.brand.as_deref().unwrap_or(DEFAULT_BRAND);
        let description = product
            .description
            .as_deref()
            .filter(|description| !description.trim().is_empty())
            .unwrap_or(DEFAULT_DESCRIPTION);

        vec![
            product.name.clone(),
            format!("  {brand} - {}", product.category),
            format!("  {description}"),
            format!("  Price: {}", format_price(product.price)),
            format!("  Stock: {} units", product.stock_quantity),
            format!("  SKU: {}", product.sku),
        ]
    }
}

impl Display for DisplayProduct<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.lines().join("\n"))
    }
}

/// A list of product cards separated by blank lines,
/// or [NO_PRODUCTS_MESSAGE] if there are none.
pub struct DisplayProducts<'a>(pub &'a [Product]);

impl DisplayProducts<'_> {
    pub fn lines(&self) -> Vec<String> {
        if self.0.is_empty() {
            return vec![NO_PRODUCTS_MESSAGE.to_string()];
        }

        let mut lines = Vec::new();
        for (n, product) in self.0.iter().enumerate() {
            if n > 0 {
                lines.push(String::new());
            }
            lines.extend(DisplayProduct(product).lines());
        }
        lines
    }
}

impl Display for DisplayProducts<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.lines().join("\n"))
    }
}
