//! `SQLite` implementation of [`SceneRepository`].

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};

use scenehub_app::ports::{SceneQuery, SceneRepository};
use scenehub_domain::error::{ConflictError, NotFoundError, SceneHubError};
use scenehub_domain::scene::{Column, Scene, SceneGroup};
use scenehub_domain::time::{Timestamp, now};

use crate::error::StorageError;

struct Wrapper(Scene);

fn decode_error(err: impl std::error::Error + Send + Sync + 'static) -> sqlx::Error {
    sqlx::Error::Decode(Box::new(err))
}

fn parse_timestamp(value: &str) -> Result<Timestamp, sqlx::Error> {
    chrono::DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.to_utc())
        .map_err(decode_error)
}

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let actions: String = row.try_get("actions")?;
        let actions: Vec<Column> = serde_json::from_str(&actions).map_err(decode_error)?;
        let last_executed: Option<String> = row.try_get("last_executed")?;

        Ok(Self(Scene {
            selector: row.try_get("selector")?,
            name: row.try_get("name")?,
            icon: row.try_get("icon")?,
            group: SceneGroup {
                primary: row.try_get("group_primary")?,
                secondary: row.try_get("group_secondary")?,
            },
            description: row.try_get("description")?,
            actions,
            enabled: row.try_get("enabled")?,
            last_executed: last_executed.as_deref().map(parse_timestamp).transpose()?,
        }))
    }
}

/// `SQLite`-backed scene repository.
pub struct SqliteSceneRepository {
    pool: SqlitePool,
}

impl SqliteSceneRepository {
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn not_found(selector: &str) -> SceneHubError {
    NotFoundError {
        entity: "Scene",
        id: selector.to_string(),
    }
    .into()
}

impl SceneRepository for SqliteSceneRepository {
    async fn create(&self, scene: Scene) -> Result<Scene, SceneHubError> {
        let actions = serde_json::to_string(&scene.actions).map_err(StorageError::from)?;
        let last_executed = scene.last_executed.map(|ts| ts.to_rfc3339());
        let created_at = now().to_rfc3339();

        let result = sqlx::query(
            "INSERT INTO scenes (selector, name, icon, group_primary, group_secondary, description, actions, enabled, last_executed, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&scene.selector)
        .bind(&scene.name)
        .bind(&scene.icon)
        .bind(&scene.group.primary)
        .bind(&scene.group.secondary)
        .bind(&scene.description)
        .bind(&actions)
        .bind(scene.enabled)
        .bind(&last_executed)
        .bind(&created_at)
        .bind(&created_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(scene),
            Err(sqlx::Error::Database(err)) if err.is_unique_violation() => Err(ConflictError {
                entity: "Scene",
                id: scene.selector,
            }
            .into()),
            Err(err) => Err(StorageError::from(err).into()),
        }
    }

    async fn get_by_selector(&self, selector: &str) -> Result<Option<Scene>, SceneHubError> {
        let row: Option<Wrapper> = sqlx::query_as("SELECT * FROM scenes WHERE selector = ?")
            .bind(selector)
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::from)?;
        Ok(row.map(|w| w.0))
    }

    async fn get(&self, query: SceneQuery) -> Result<Vec<Scene>, SceneHubError> {
        let rows: Vec<Wrapper> = sqlx::query_as(
            "SELECT * FROM scenes WHERE (?1 IS NULL OR instr(lower(name), lower(?1)) > 0) AND (?2 IS NULL OR enabled = ?2) ORDER BY name",
        )
        .bind(&query.search)
        .bind(query.enabled)
        .fetch_all(&self.pool)
        .await
        .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(|w| w.0).collect())
    }

    async fn update(&self, scene: Scene) -> Result<Scene, SceneHubError> {
        let actions = serde_json::to_string(&scene.actions).map_err(StorageError::from)?;
        let last_executed = scene.last_executed.map(|ts| ts.to_rfc3339());

        let result = sqlx::query(
            "UPDATE scenes SET name = ?, icon = ?, group_primary = ?, group_secondary = ?, description = ?, actions = ?, enabled = ?, last_executed = ?, updated_at = ? WHERE selector = ?",
        )
        .bind(&scene.name)
        .bind(&scene.icon)
        .bind(&scene.group.primary)
        .bind(&scene.group.secondary)
        .bind(&scene.description)
        .bind(&actions)
        .bind(scene.enabled)
        .bind(&last_executed)
        .bind(now().to_rfc3339())
        .bind(&scene.selector)
        .execute(&self.pool)
        .await
        .map_err(StorageError::from)?;

        if result.rows_affected() == 0 {
            return Err(not_found(&scene.selector));
        }
        Ok(scene)
    }

    async fn delete(&self, selector: &str) -> Result<(), SceneHubError> {
        sqlx::query("DELETE FROM scenes WHERE selector = ?")
            .bind(selector)
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;
        Ok(())
    }

    async fn touch_last_executed(&self, selector: &str, at: Timestamp) -> Result<(), SceneHubError> {
        let result = sqlx::query("UPDATE scenes SET last_executed = ? WHERE selector = ?")
            .bind(at.to_rfc3339())
            .bind(selector)
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;
        if result.rows_affected() == 0 {
            return Err(not_found(selector));
        }
        Ok(())
    }
}
