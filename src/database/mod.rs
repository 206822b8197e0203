/*!
 * Database module for persistent storage of projects, segments, jobs, and
 * the monthly usage ledger.
 *
 * The store is the single source of truth for the pipeline. Writes that must
 * be atomic (segment replacement, usage accumulation) run inside a
 * transaction or a single upsert statement at this layer; callers never
 * re-implement transactional behavior themselves.
 */

pub mod connection;
pub mod models;
pub mod repository;
pub mod schema;

// Re-export main types
pub use connection::DatabaseConnection;
pub use repository::Repository;
