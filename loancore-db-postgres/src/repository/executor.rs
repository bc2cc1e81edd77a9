use sqlx::pool::PoolConnection;
use sqlx::{PgPool, Postgres};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Shared handle to the single connection backing one `UnitOfWorkSession`.
///
/// `sqlx::Transaction<'_, Postgres>` ties its lifetime to the borrow of the
/// connection it began on, which makes it awkward to store alongside the
/// half-dozen repository structs a session hands out. Instead we keep one
/// checked-out `PoolConnection` behind an `Arc<Mutex<_>>` and drive the
/// transaction with explicit `BEGIN`/`COMMIT`/`ROLLBACK` statements; every
/// repository clones this handle rather than borrowing a transaction.
#[derive(Clone)]
pub struct PgExecutor {
    conn: Arc<Mutex<PoolConnection<Postgres>>>,
}

impl PgExecutor {
    pub(crate) fn new(conn: PoolConnection<Postgres>) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
        }
    }

    pub(crate) async fn pooled(pool: &PgPool) -> Result<Self, sqlx::Error> {
        Ok(Self::new(pool.acquire().await?))
    }

    pub(crate) fn conn(&self) -> Arc<Mutex<PoolConnection<Postgres>>> {
        self.conn.clone()
    }
}
