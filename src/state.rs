use crate::db::{DbPool, OrmConn};

/// Shared handles cloned into every router and background task.
#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub orm: OrmConn,
}
