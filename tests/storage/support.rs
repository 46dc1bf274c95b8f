use dealership::config::DatabaseConfig;
use dealership::storage::{create_pool, DbPool};
use testcontainers::runners::AsyncRunner;
use testcontainers::ContainerAsync;
use testcontainers_modules::postgres::Postgres;

/// A fresh PostgreSQL container with every migration applied.
///
/// The container is removed when this value is dropped; keep it alive for the
/// whole test.
pub struct TestDatabase {
    pub pool: DbPool,
    _container: ContainerAsync<Postgres>,
}

impl TestDatabase {
    pub async fn new(prefix: &str) -> Self {
        let container = Postgres::default().start().await.unwrap_or_else(|e| {
            panic!("Failed to start PostgreSQL container for {}: {}", prefix, e)
        });

        let host = container
            .get_host()
            .await
            .unwrap_or_else(|e| panic!("Failed to get container host for {}: {}", prefix, e));
        let port = container
            .get_host_port_ipv4(5432)
            .await
            .unwrap_or_else(|e| panic!("Failed to get container port for {}: {}", prefix, e));

        let config = DatabaseConfig {
            url: format!("postgresql://postgres:postgres@{}:{}/postgres", host, port),
            auto_migrate: true,
            max_connections: 5,
            min_connections: 1,
            ..Default::default()
        };

        let pool = create_pool(&config)
            .await
            .unwrap_or_else(|e| panic!("Failed to create test pool for {}: {}", prefix, e));

        Self { pool, _container: container }
    }
}
