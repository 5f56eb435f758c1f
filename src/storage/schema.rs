//! Database schema definitions
//!
//! This module contains all SQL schema definitions for the article store.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- Article categories
CREATE TABLE IF NOT EXISTS topics (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    tags TEXT NOT NULL DEFAULT '[]',
    created_at TEXT NOT NULL
);

-- Harvested articles, keyed by feed GUID
CREATE TABLE IF NOT EXISTS articles (
    id TEXT PRIMARY KEY,
    title TEXT NOT NULL,
    description TEXT NOT NULL,
    summary TEXT NOT NULL DEFAULT '[]',
    link TEXT NOT NULL,
    domain TEXT NOT NULL,
    topic_id TEXT REFERENCES topics(id),
    author TEXT,
    image TEXT NOT NULL,
    tags TEXT NOT NULL DEFAULT '[]',
    assessment TEXT,
    score REAL NOT NULL DEFAULT 0,
    published_at TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_articles_topic ON articles(topic_id);
CREATE INDEX IF NOT EXISTS idx_articles_domain ON articles(domain);
CREATE INDEX IF NOT EXISTS idx_articles_published ON articles(published_at);
"#;

/// Initializes the database schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
