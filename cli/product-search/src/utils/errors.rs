/// Displays and formats a chain of errors connected via their `source` attribute.
pub fn display_chain(mut err: &dyn std::error::Error) -> String {
    let mut fmt = err.to_string();
    while let Some(source) = err.source() {
        fmt = format!("{fmt}: {source}");
        err = source;
    }

    fmt
}

#[cfg(test)]
mod tests {
    use product_catalog::{CatalogClientConfig, CatalogClientError, CatalogClient};

    use super::*;

    #[test]
    fn chain_includes_sources() {
        let err = CatalogClient::new(CatalogClientConfig {
            catalog_url: "::".to_string(),
            ..Default::default()
        })
        .unwrap_err();

        assert!(matches!(err, CatalogClientError::InvalidUrl { .. }));
        assert_eq!(
            display_chain(&err),
            "invalid catalog url '::': relative URL without a base"
        );
    }
}
