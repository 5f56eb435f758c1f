//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the ArticleStore trait.

use crate::storage::schema::initialize_schema;
use crate::storage::traits::{ArticleStore, StorageError, StorageResult};
use crate::storage::{topic_id, Article, Topic};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

const ARTICLE_COLUMNS: &str = "id, title, description, summary, link, domain, topic_id, author, \
     image, tags, assessment, score, published_at, created_at, updated_at";

/// SQLite article store
///
/// The connection sits behind a mutex so a single store can be shared by
/// every processing task of a cycle.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Opens or creates the database at `path` and initializes the schema
    pub fn new(path: &Path) -> StorageResult<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Creates an in-memory database
    pub fn new_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> StorageResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| StorageError::LockPoisoned)
    }
}

impl ArticleStore for SqliteStore {
    fn article_exists(&self, id: &str) -> StorageResult<bool> {
        let conn = self.conn()?;
        article_exists(&conn, id)
    }

    fn get_article(&self, id: &str) -> StorageResult<Option<Article>> {
        let conn = self.conn()?;
        let row = conn
            .query_row(
                &format!("SELECT {} FROM articles WHERE id = ?1", ARTICLE_COLUMNS),
                params![id],
                ArticleRow::from_row,
            )
            .optional()?;

        row.map(ArticleRow::into_article).transpose()
    }

    fn upsert_article(&self, article: &Article) -> StorageResult<bool> {
        let summary = serde_json::to_string(&article.summary)?;
        let tags = serde_json::to_string(&article.tags)?;
        let assessment = article
            .assessment
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;

        let conn = self.conn()?;
        let existed = article_exists(&conn, &article.id)?;
        conn.execute(
            &format!(
                "INSERT INTO articles ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)
                 ON CONFLICT(id) DO UPDATE SET
                    title = excluded.title,
                    description = excluded.description,
                    summary = excluded.summary,
                    link = excluded.link,
                    domain = excluded.domain,
                    topic_id = excluded.topic_id,
                    author = excluded.author,
                    image = excluded.image,
                    tags = excluded.tags,
                    assessment = excluded.assessment,
                    published_at = excluded.published_at,
                    updated_at = excluded.updated_at",
                ARTICLE_COLUMNS
            ),
            params![
                article.id,
                article.title,
                article.description,
                summary,
                article.link,
                article.domain,
                article.topic_id,
                article.author,
                article.image,
                tags,
                assessment,
                article.score,
                article.published.map(|p| p.to_rfc3339()),
                article.created.to_rfc3339(),
                Utc::now().to_rfc3339(),
            ],
        )?;

        tracing::debug!("Saved article: {}", article);
        Ok(!existed)
    }

    fn get_or_create_topic(&self, name: &str) -> StorageResult<Topic> {
        let id = topic_id(name);
        let conn = self.conn()?;

        let existing = conn
            .query_row(
                "SELECT id, name, tags, created_at FROM topics WHERE id = ?1",
                params![id],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, String>(3)?,
                    ))
                },
            )
            .optional()?;

        if let Some((id, name, tags, created_at)) = existing {
            return Ok(Topic {
                id,
                name,
                tags: serde_json::from_str(&tags)?,
                created: parse_timestamp(&created_at)?,
            });
        }

        let topic = Topic::new(name);
        conn.execute(
            "INSERT INTO topics (id, name, tags, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![
                topic.id,
                topic.name,
                serde_json::to_string(&topic.tags)?,
                topic.created.to_rfc3339()
            ],
        )?;
        tracing::info!("Created topic: {}", topic.name);

        Ok(topic)
    }

    fn count_articles(&self) -> StorageResult<u64> {
        let conn = self.conn()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM articles", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    fn count_articles_by_topic(&self) -> StorageResult<Vec<(String, u64)>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT COALESCE(t.name, 'Uncategorized') AS topic, COUNT(*)
             FROM articles a LEFT JOIN topics t ON a.topic_id = t.id
             GROUP BY topic ORDER BY topic",
        )?;

        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)? as u64))
        })?;

        let mut counts = Vec::new();
        for row in rows {
            counts.push(row?);
        }
        Ok(counts)
    }
}

fn article_exists(conn: &Connection, id: &str) -> StorageResult<bool> {
    let exists: Option<i64> = conn
        .query_row("SELECT 1 FROM articles WHERE id = ?1", params![id], |row| {
            row.get(0)
        })
        .optional()?;
    Ok(exists.is_some())
}

/// Raw column values of an `articles` row
struct ArticleRow {
    id: String,
    title: String,
    description: String,
    summary: String,
    link: String,
    domain: String,
    topic_id: Option<String>,
    author: Option<String>,
    image: String,
    tags: String,
    assessment: Option<String>,
    score: f64,
    published_at: Option<String>,
    created_at: String,
    updated_at: String,
}

impl ArticleRow {
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            title: row.get(1)?,
            description: row.get(2)?,
            summary: row.get(3)?,
            link: row.get(4)?,
            domain: row.get(5)?,
            topic_id: row.get(6)?,
            author: row.get(7)?,
            image: row.get(8)?,
            tags: row.get(9)?,
            assessment: row.get(10)?,
            score: row.get(11)?,
            published_at: row.get(12)?,
            created_at: row.get(13)?,
            updated_at: row.get(14)?,
        })
    }

    fn into_article(self) -> StorageResult<Article> {
        Ok(Article {
            id: self.id,
            title: self.title,
            description: self.description,
            summary: serde_json::from_str(&self.summary)?,
            link: self.link,
            domain: self.domain,
            topic_id: self.topic_id,
            author: self.author,
            image: self.image,
            tags: serde_json::from_str(&self.tags)?,
            assessment: self
                .assessment
                .as_deref()
                .map(serde_json::from_str)
                .transpose()?,
            score: self.score,
            published: self
                .published_at
                .as_deref()
                .map(parse_timestamp)
                .transpose()?,
            created: parse_timestamp(&self.created_at)?,
            updated: parse_timestamp(&self.updated_at)?,
        })
    }
}

fn parse_timestamp(value: &str) -> StorageResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| StorageError::InvalidTimestamp {
            value: value.to_string(),
            message: e.to_string(),
        })
}
