//! # scenehub-adapter-storage-sqlite-sqlx
//!
//! `SQLite` persistence adapter using [sqlx](https://docs.rs/sqlx).
//!
//! ## Responsibilities
//! - Implement [`SceneRepository`](scenehub_app::ports::SceneRepository)
//! - Manage the `SQLite` connection pool and run embedded migrations
//! - Map scene documents to rows; the action grid is stored as JSON
//!
//! ## Dependency rule
//! Depends on `scenehub-app` (for port traits) and `scenehub-domain` (for domain types).
//! The `app` and `domain` crates must never reference this adapter.

pub mod error;
pub mod pool;
pub mod scene_repo;

pub use pool::{Config, Database};
pub use scene_repo::SqliteSceneRepository;
