use sqlx::PgPool;

/// Thin handle over the shared connection pool. Entity-specific queries live
/// in sibling modules as `impl` blocks on this type; routes construct it per
/// request from the managed pool, tests substitute trait mocks instead.
#[derive(Clone)]
pub struct PostgresRepository {
    pub pool: PgPool,
}
