use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    SqlitePool,
};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

#[derive(Clone)]
pub struct Database {
    pub pool: SqlitePool,
}

impl Database {
    pub async fn new(database_url: &str) -> anyhow::Result<Self> {
        ensure_parent_dir(database_url)?;

        let connect_options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .busy_timeout(Duration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            .max_connections(10)
            .min_connections(1)
            .acquire_timeout(Duration::from_secs(30))
            .idle_timeout(Duration::from_secs(600))
            .max_lifetime(Duration::from_secs(3600))
            .connect_with(connect_options)
            .await?;

        Ok(Database { pool })
    }

    /// Single-connection in-memory database with the schema applied.
    #[cfg(test)]
    pub async fn in_memory() -> anyhow::Result<Self> {
        // every connection to :memory: is its own database, so keep exactly one alive
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await?;

        let db = Database { pool };
        db.run_migrations().await?;
        Ok(db)
    }

    pub async fn run_migrations(&self) -> anyhow::Result<()> {
        let migrations = vec![include_str!("../migrations/sqlite/001_initial.sql")];

        for (idx, migration_sql) in migrations.iter().enumerate() {
            tracing::info!("Running migration {}", idx + 1);

            for statement in migration_sql.split(';') {
                let sql = strip_comments(statement);
                if sql.is_empty() {
                    continue;
                }

                if let Err(e) = sqlx::query(&sql).execute(&self.pool).await {
                    if e.to_string().contains("already exists") {
                        tracing::debug!("Skipping existing object in migration {}: {}", idx + 1, e);
                    } else {
                        return Err(anyhow::anyhow!(
                            "Migration {} failed on `{}`: {}",
                            idx + 1,
                            sql,
                            e
                        ));
                    }
                }
            }
        }

        tracing::info!("All migrations completed");
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

fn strip_comments(statement: &str) -> String {
    statement
        .lines()
        .filter(|line| !line.trim_start().starts_with("--"))
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

/// SQLite creates the file but not its directory.
fn ensure_parent_dir(database_url: &str) -> anyhow::Result<()> {
    let Some(rest) = database_url.strip_prefix("sqlite://") else {
        return Ok(());
    };
    let file = rest.split('?').next().unwrap_or_default();
    if file.is_empty() || file.starts_with(":memory:") {
        return Ok(());
    }

    if let Some(parent) = Path::new(file).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}
