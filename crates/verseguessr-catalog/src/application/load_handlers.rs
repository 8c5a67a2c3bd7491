//! Catalog loading.

use verseguessr_core::error::GameError;
use verseguessr_core::service::VerseService;

use crate::domain::catalog::Catalog;

/// Fetches the catalog from the verse service and builds it.
///
/// Single attempt; the caller decides what "not loaded" looks like.
///
/// # Errors
///
/// Returns the service's `GameError` unchanged if the fetch fails.
pub async fn handle_load_catalog(service: &dyn VerseService) -> Result<Catalog, GameError> {
    let payload = service.fetch_catalog().await?;
    let catalog = Catalog::from(payload);
    tracing::info!(
        versions = catalog.version_names().len(),
        "catalog loaded"
    );
    Ok(catalog)
}

#[cfg(test)]
mod tests {
    use verseguessr_core::error::GameError;
    use verseguessr_test_support::{FailingVerseService, ScriptedVerseService, kjv_catalog_payload};

    use crate::application::load_handlers::handle_load_catalog;

    #[tokio::test]
    async fn test_handle_load_catalog_builds_catalog_from_payload() {
        // Arrange
        let service = ScriptedVerseService::new(kjv_catalog_payload());

        // Act
        let catalog = handle_load_catalog(&service).await.unwrap();

        // Assert
        assert_eq!(catalog.version_names(), ["KJV".to_owned()]);
        assert_eq!(catalog.chapter_count("KJV", "Genesis"), 2);
        assert_eq!(catalog.verse_count("KJV", "Genesis", 0), 31);
        assert_eq!(service.catalog_fetches(), 1);
    }

    #[tokio::test]
    async fn test_handle_load_catalog_propagates_service_error() {
        // Arrange
        let service = FailingVerseService;

        // Act
        let result = handle_load_catalog(&service).await;

        // Assert
        match result.unwrap_err() {
            GameError::Service(msg) => assert_eq!(msg, "connection refused"),
            other => panic!("expected Service, got {other:?}"),
        }
    }
}
