//! Service composition from configuration.
use std::sync::Arc;

use anyhow::{Context, Result};

use escape_content::{FileCatalog, StaticCatalog};
use escape_runtime::{
    AuditRepository, FileAuditLog, FileStatsRepository, InMemoryAuditLog, InMemoryStatsRepo,
    SharedSecretAuthorizer, StatsRepository, StatsService,
};

use crate::config::{CliConfig, StorageKind};

/// Build the stats service described by `config`.
pub fn build_service(config: &CliConfig) -> Result<StatsService> {
    let (stats, audit) = open_storage(config)?;

    let builder = StatsService::builder()
        .config(config.service.clone())
        .authorizer(SharedSecretAuthorizer::new(&config.api_key))
        .stats_repository(stats)
        .audit_repository(audit);

    let builder = match &config.catalog_path {
        Some(path) => builder.catalog(FileCatalog::new(path.clone())),
        None => builder.catalog(StaticCatalog),
    };

    builder.build().context("Failed to build stats service")
}

type Storage = (Arc<dyn StatsRepository>, Arc<dyn AuditRepository>);

fn open_storage(config: &CliConfig) -> Result<Storage> {
    match config.storage {
        StorageKind::File => {
            let stats = FileStatsRepository::new(&config.data_dir).with_context(|| {
                format!("Failed to open stats store in {}", config.data_dir.display())
            })?;
            let audit = FileAuditLog::open_or_create(&config.data_dir).with_context(|| {
                format!("Failed to open audit log in {}", config.data_dir.display())
            })?;
            tracing::info!("Using file storage at {}", config.data_dir.display());
            Ok((Arc::new(stats), Arc::new(audit)))
        }
        StorageKind::Memory => {
            tracing::info!("Using in-memory storage");
            Ok((
                Arc::new(InMemoryStatsRepo::new()),
                Arc::new(InMemoryAuditLog::new()),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use escape_runtime::{CompletionRequest, bearer};
    use escape_core::LoopId;

    #[tokio::test]
    async fn file_storage_persists_between_builds() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let config = CliConfig {
            data_dir: temp_dir.path().to_path_buf(),
            ..CliConfig::default()
        };
        let credential = bearer(&config.api_key);

        build_service(&config)
            .unwrap()
            .record_completion(
                Some(&credential),
                "alice",
                CompletionRequest::new(LoopId(1001), true),
            )
            .await
            .unwrap();

        let stats = build_service(&config)
            .unwrap()
            .fetch_stats(Some(&credential), "alice")
            .await
            .unwrap();
        assert_eq!(stats.total_escapes, 1);
    }

    #[tokio::test]
    async fn missing_catalog_file_serves_builtin_loops() {
        let config = CliConfig {
            storage: StorageKind::Memory,
            catalog_path: Some("/nonexistent/catalog.ron".into()),
            ..CliConfig::default()
        };

        let loops = build_service(&config).unwrap().loops().await.unwrap();
        assert!(!loops.is_empty());
    }
}
