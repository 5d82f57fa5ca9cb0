use async_trait::async_trait;
use chrono::Utc;
use nb_core::{Article, ArticleRepository, Error, Result, Subscriber, SubscriberRegistry};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;
use crate::StorageBackend;

const DEFAULT_URL: &str = "sqlite://articles.db";

const MIGRATIONS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS articles (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        link TEXT NOT NULL UNIQUE,
        title TEXT NOT NULL,
        description TEXT NOT NULL,
        created_at TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS subscribers (
        chat_id TEXT PRIMARY KEY,
        subscribed_at TEXT NOT NULL
    )
    "#,
];

fn db_error(context: &'static str) -> impl Fn(sqlx::Error) -> Error {
    move |e| Error::Persistence(format!("{}: {}", context, e))
}

fn article_from_row(row: &SqliteRow) -> Result<Article> {
    let read = db_error("Failed to read article row");
    Ok(Article {
        title: row.try_get("title").map_err(&read)?,
        link: row.try_get("link").map_err(&read)?,
        description: row.try_get("description").map_err(&read)?,
    })
}

pub struct SQLiteStorage {
    pool: Arc<SqlitePool>,
}

#[async_trait]
impl StorageBackend for SQLiteStorage {
    fn get_error_message() -> &'static str {
        "SQLite database should be available (see --database-url)"
    }

    async fn connect(url: Option<&str>) -> Result<Self> {
        Self::new_with_url(url.unwrap_or(DEFAULT_URL)).await
    }
}

impl SQLiteStorage {
    pub async fn new_with_url(url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(|e| Error::Config(format!("Invalid database URL {}: {}", url, e)))?
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .map_err(db_error("Failed to connect to database"))?;

        for migration in MIGRATIONS {
            sqlx::query(migration)
                .execute(&pool)
                .await
                .map_err(db_error("Failed to run migration"))?;
        }

        Ok(Self { pool: Arc::new(pool) })
    }

    pub async fn new_with_path(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Self::new_with_url(&format!("sqlite://{}", db_path.display())).await
    }
}

#[async_trait]
impl ArticleRepository for SQLiteStorage {
    async fn insert_batch(&self, articles: &[Article]) -> Result<Vec<Article>> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("Failed to begin transaction"))?;

        let created_at = Utc::now().to_rfc3339();
        let mut inserted = Vec::new();
        for article in articles {
            let result = sqlx::query(
                r#"
                INSERT INTO articles (link, title, description, created_at)
                VALUES (?, ?, ?, ?)
                ON CONFLICT(link) DO NOTHING
                "#,
            )
            .bind(&article.link)
            .bind(&article.title)
            .bind(&article.description)
            .bind(&created_at)
            .execute(&mut *tx)
            .await
            .map_err(db_error("Failed to store article"))?;

            if result.rows_affected() > 0 {
                inserted.push(article.clone());
            }
        }

        tx.commit()
            .await
            .map_err(db_error("Failed to commit article batch"))?;

        Ok(inserted)
    }

    async fn count(&self) -> Result<u64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM articles")
            .fetch_one(&*self.pool)
            .await
            .map_err(db_error("Failed to count articles"))?;
        Ok(u64::try_from(count).unwrap_or_default())
    }

    async fn article_at(&self, offset: u64) -> Result<Option<Article>> {
        let offset = i64::try_from(offset)
            .map_err(|_| Error::Persistence(format!("Offset out of range: {}", offset)))?;

        let row = sqlx::query(
            r#"
            SELECT title, link, description FROM articles
            ORDER BY id
            LIMIT 1 OFFSET ?
            "#,
        )
        .bind(offset)
        .fetch_optional(&*self.pool)
        .await
        .map_err(db_error("Failed to fetch article"))?;

        row.as_ref().map(article_from_row).transpose()
    }

    async fn first_n(&self, limit: usize) -> Result<Vec<Article>> {
        let rows = sqlx::query(
            r#"
            SELECT title, link, description FROM articles
            ORDER BY id
            LIMIT ?
            "#,
        )
        .bind(i64::try_from(limit).unwrap_or(i64::MAX))
        .fetch_all(&*self.pool)
        .await
        .map_err(db_error("Failed to list articles"))?;

        rows.iter().map(article_from_row).collect()
    }
}

#[async_trait]
impl SubscriberRegistry for SQLiteStorage {
    async fn upsert(&self, chat_id: &str) -> Result<()> {
        sqlx::query("INSERT OR IGNORE INTO subscribers (chat_id, subscribed_at) VALUES (?, ?)")
            .bind(chat_id)
            .bind(Utc::now().to_rfc3339())
            .execute(&*self.pool)
            .await
            .map_err(db_error("Failed to store subscriber"))?;
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<Subscriber>> {
        let rows = sqlx::query("SELECT chat_id, subscribed_at FROM subscribers")
            .fetch_all(&*self.pool)
            .await
            .map_err(db_error("Failed to list subscribers"))?;

        let read = db_error("Failed to read subscriber row");
        rows.iter()
            .map(|row| {
                let subscribed_at: String = row.try_get("subscribed_at").map_err(&read)?;
                Ok(Subscriber {
                    chat_id: row.try_get("chat_id").map_err(&read)?,
                    subscribed_at: chrono::DateTime::parse_from_rfc3339(&subscribed_at)
                        .map_err(|e| Error::Persistence(format!("Failed to parse date: {}", e)))?
                        .with_timezone(&Utc),
                })
            })
            .collect()
    }
}
