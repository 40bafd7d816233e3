use std::str::FromStr;

use sqlx::{
	SqlitePool,
	sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};

use crate::{Result, schema};

/// Read-write pool for catalog maintenance plus a separate pool that generated filters run on.
#[derive(Clone, Debug)]
pub struct Db {
	pub pool: SqlitePool,
	pub filter_pool: SqlitePool,
}
impl Db {
	pub async fn connect(cfg: &deco_config::Sqlite) -> Result<Self> {
		let options = SqliteConnectOptions::from_str(&cfg.dsn)?.create_if_missing(true);
		let in_memory = deco_config::is_in_memory_dsn(&cfg.dsn);
		let max_connections = if in_memory { 1 } else { cfg.pool_max_conns };
		// In-memory databases vanish with their last connection, so the pool keeps one open.
		let pool = SqlitePoolOptions::new()
			.max_connections(max_connections)
			.min_connections(1)
			.idle_timeout(None)
			.max_lifetime(None)
			.connect_with(options.clone())
			.await?;
		// File databases are reopened read-only. Memory databases exist only behind the shared
		// cache name, so their filter connections get query_only at open time instead.
		let filter_options = if in_memory {
			options.pragma("query_only", "ON")
		} else {
			options.read_only(true)
		};
		let filter_pool = SqlitePoolOptions::new()
			.max_connections(max_connections)
			.min_connections(0)
			.connect_with(filter_options)
			.await?;

		Ok(Self { pool, filter_pool })
	}

	pub async fn ensure_schema(&self) -> Result<()> {
		let mut tx = self.pool.begin().await?;

		for statement in schema::render_schema() {
			sqlx::query(statement).execute(&mut *tx).await?;
		}

		tx.commit().await?;

		Ok(())
	}
}
