//! Throwaway PostgreSQL for store-backed tests.
//!
//! One container is started per test binary; every [`TestDb`] gets its own
//! freshly migrated database inside it, so tests never share rows.

use catalog_api::{config::DatabaseConfig, database};
use sqlx::{Connection, PgConnection, PgPool};
use testcontainers::{ContainerAsync, ImageExt, runners::AsyncRunner};
use testcontainers_modules::postgres::Postgres;
use tokio::sync::OnceCell;
use uuid::Uuid;

struct SharedPostgres {
    _container: ContainerAsync<Postgres>,
    host: String,
    port: u16,
}

impl SharedPostgres {
    fn url(&self, db_name: &str) -> String {
        format!(
            "postgres://postgres:postgres@{}:{}/{db_name}",
            self.host, self.port
        )
    }
}

static POSTGRES: OnceCell<SharedPostgres> = OnceCell::const_new();

async fn start_postgres() -> SharedPostgres {
    // gen_random_uuid() needs PostgreSQL 13+
    let container = Postgres::default()
        .with_tag("16-alpine")
        .start()
        .await
        .expect("Failed to start PostgreSQL container");

    let host = container
        .get_host()
        .await
        .expect("Failed to get container host")
        .to_string();
    let port = container
        .get_host_port_ipv4(5432)
        .await
        .expect("Failed to get container port");

    SharedPostgres {
        _container: container,
        host,
        port,
    }
}

#[derive(Debug, Clone)]
pub struct TestDb {
    pub pool: PgPool,
    pub url: String,
}

impl TestDb {
    pub async fn new() -> Self {
        let postgres = POSTGRES.get_or_init(start_postgres).await;
        let name = format!("catalog_test_{}", Uuid::new_v4().simple());

        let mut admin = PgConnection::connect(&postgres.url("postgres"))
            .await
            .expect("Failed to connect to postgres database");
        sqlx::query(&format!("CREATE DATABASE \"{name}\""))
            .execute(&mut admin)
            .await
            .expect("Failed to create test database");
        admin
            .close()
            .await
            .expect("Failed to close admin connection");

        let url = postgres.url(&name);
        let pool = database::create_pool(&DatabaseConfig {
            url: url.clone(),
            max_connections: 4,
        })
        .await
        .expect("Failed to open and migrate test database");

        Self { pool, url }
    }

    pub async fn close(self) {
        database::close_pool(&self.pool).await;
    }
}
