use crate::config::Settings;
use crate::errors::ServiceError;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tracing::{info, warn};
use vote_ledger_core::{AutoHideModerator, Moderation, ModerationConfig, NoopModeration, VoteLedger};
use vote_ledger_repository::{InMemoryVoteRepository, PostgresVoteRepository, VoteRepository};

/// `Dependencies` holds the wired components of the vote ledger service.
///
/// It includes the repository holding items and vote records, and the
/// ledger that casts and reads votes on top of it.
pub struct Dependencies {
    pub repository: Arc<dyn VoteRepository>,
    pub ledger: Arc<VoteLedger>,
}

impl Dependencies {
    /// Creates a new `Dependencies` instance.
    ///
    /// Connects to PostgreSQL when `database_url` is set (applying the
    /// embedded migrations if `run_migrations` is on), otherwise falls back to
    /// the in-memory repository. The auto-hide moderator is only wired when
    /// the threshold is non-zero.
    ///
    /// # Returns
    ///
    /// A `Result` which is `Ok(Self)` on successful initialization or a
    /// `ServiceError` if the database cannot be reached or migrated.
    pub async fn new(settings: &Settings) -> Result<Self, ServiceError> {
        let repository: Arc<dyn VoteRepository> = match &settings.database_url {
            Some(database_url) => {
                let pool = PgPoolOptions::new()
                    .max_connections(settings.max_connections)
                    .connect(database_url)
                    .await?;
                let repository = PostgresVoteRepository::new(pool).await?;
                if settings.run_migrations {
                    repository.migrate().await?;
                    info!("Database migrations applied");
                }
                if !repository.check_tables_created().await? {
                    return Err(ServiceError::Config(
                        "vote tables are missing; enable RUN_MIGRATIONS or migrate manually".to_string(),
                    ));
                }
                info!(max_connections = settings.max_connections, "Using PostgreSQL vote repository");
                Arc::new(repository)
            }
            None => {
                warn!("DATABASE_URL not set, votes are kept in memory and lost on restart");
                Arc::new(InMemoryVoteRepository::new())
            }
        };

        Ok(Self::with_repository(repository, settings))
    }

    /// Wires the ledger on top of an already constructed repository.
    pub fn with_repository(repository: Arc<dyn VoteRepository>, settings: &Settings) -> Self {
        let config = ModerationConfig::new(settings.auto_hide_threshold);
        let moderation: Arc<dyn Moderation> = if config.is_enabled() {
            info!(threshold = config.auto_hide_threshold, "Auto-hide enabled");
            Arc::new(AutoHideModerator::new(repository.clone(), config))
        } else {
            info!("Auto-hide disabled");
            Arc::new(NoopModeration)
        };

        let ledger = Arc::new(VoteLedger::new(repository.clone(), moderation, config));

        Dependencies { repository, ledger }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_dependencies_without_database_use_memory() {
        let settings = Settings::default();

        let dependencies = Dependencies::new(&settings).await.unwrap();

        assert!(dependencies.repository.check_tables_created().await.unwrap());
        assert_eq!(dependencies.ledger.config().auto_hide_threshold, 3);
    }

    #[tokio::test]
    async fn test_dependencies_zero_threshold_disables_auto_hide() {
        let settings = Settings {
            auto_hide_threshold: 0,
            ..Settings::default()
        };

        let dependencies = Dependencies::new(&settings).await.unwrap();

        assert!(!dependencies.ledger.config().is_enabled());
    }

    #[tokio::test]
    async fn test_dependencies_new_invalid_database_url() {
        let settings = Settings {
            database_url: Some("invalid-url".to_string()),
            ..Settings::default()
        };

        let result = Dependencies::new(&settings).await;

        assert!(result.is_err());
        match result {
            Err(ServiceError::Database(_)) => {}
            Err(e) => panic!("Expected Database error, got {e:?}"),
            Ok(_) => panic!("Expected error for invalid DATABASE_URL"),
        }
    }
}
