//! SQLite-backed library store.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, ErrorCode, OptionalExtension};
use tracing::{debug, info};
use uuid::Uuid;

use super::{AuthorLink, LibraryStore, StoreError};
use crate::domain::{Author, Book, Category, ItemId, ListEntry, NewBook, NewVideo, Video};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS authors (
    id    TEXT PRIMARY KEY,
    name  TEXT NOT NULL,
    image TEXT
);

CREATE TABLE IF NOT EXISTS books (
    id           TEXT PRIMARY KEY,
    title        TEXT NOT NULL,
    subtitle     TEXT,
    description  TEXT,
    cover        TEXT,
    isbn13       INTEGER,
    isbn10       INTEGER,
    release_year INTEGER,
    created_at   TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS book_authors (
    book_id   TEXT NOT NULL REFERENCES books(id) ON DELETE CASCADE,
    author_id TEXT NOT NULL REFERENCES authors(id),
    position  INTEGER NOT NULL,
    PRIMARY KEY (book_id, position)
);

CREATE TABLE IF NOT EXISTS videos (
    id           TEXT PRIMARY KEY,
    title        TEXT NOT NULL,
    description  TEXT,
    image        TEXT,
    cast_members TEXT NOT NULL DEFAULT '[]',
    genres       TEXT NOT NULL DEFAULT '[]',
    release_year INTEGER,
    created_at   TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS list_entries (
    id       TEXT PRIMARY KEY,
    user_id  TEXT NOT NULL,
    book_id  TEXT REFERENCES books(id) ON DELETE CASCADE,
    video_id TEXT REFERENCES videos(id) ON DELETE CASCADE,
    category TEXT NOT NULL,
    added_at TEXT NOT NULL,
    CHECK ((category = 'book' AND book_id IS NOT NULL AND video_id IS NULL)
        OR (category = 'video' AND video_id IS NOT NULL AND book_id IS NULL))
);

CREATE INDEX IF NOT EXISTS idx_list_entries_user ON list_entries(user_id);
"#;

/// Library store on a single SQLite connection
pub struct SqliteLibrary {
    conn: Mutex<Connection>,
}

impl SqliteLibrary {
    /// Open (or create) a database file
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        info!(path = %path.display(), "Opened library database");
        Self::with_connection(conn)
    }

    /// Private in-memory database
    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn
            .lock()
            .map_err(|_| StoreError::Unavailable("connection lock poisoned".to_string()))
    }

    fn load_book(conn: &Connection, id: &ItemId) -> Result<Option<Book>, StoreError> {
        let book = conn
            .query_row(
                "SELECT id, title, subtitle, description, cover, isbn13, isbn10, release_year, created_at
                 FROM books WHERE id = ?1",
                params![id.as_str()],
                |row| {
                    Ok(Book {
                        id: ItemId::from(row.get::<_, String>(0)?),
                        title: row.get(1)?,
                        subtitle: row.get(2)?,
                        description: row.get(3)?,
                        cover: row.get(4)?,
                        isbn13: row.get(5)?,
                        isbn10: row.get(6)?,
                        release_year: row.get(7)?,
                        authors: Vec::new(),
                        created_at: parse_timestamp(8, row.get(8)?)?,
                    })
                },
            )
            .optional()?;

        let Some(mut book) = book else {
            return Ok(None);
        };

        let mut stmt = conn.prepare_cached(
            "SELECT a.id, a.name, a.image
             FROM book_authors ba JOIN authors a ON a.id = ba.author_id
             WHERE ba.book_id = ?1
             ORDER BY ba.position",
        )?;
        book.authors = stmt
            .query_map(params![id.as_str()], parse_author_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Some(book))
    }
}

fn parse_author_row(row: &rusqlite::Row) -> rusqlite::Result<Author> {
    Ok(Author {
        id: row.get(0)?,
        name: row.get(1)?,
        image: row.get(2)?,
    })
}

fn parse_timestamp(idx: usize, value: String) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(&value)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
        })
}

fn parse_string_list(idx: usize, value: String) -> rusqlite::Result<Vec<String>> {
    serde_json::from_str(&value).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

fn parse_category(idx: usize, value: String) -> rusqlite::Result<Category> {
    value.parse::<Category>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            rusqlite::types::Type::Text,
            e.into(),
        )
    })
}

fn parse_entry_row(row: &rusqlite::Row) -> rusqlite::Result<ListEntry> {
    Ok(ListEntry {
        id: row.get(0)?,
        user_id: row.get(1)?,
        item_id: ItemId::from(row.get::<_, String>(2)?),
        category: parse_category(3, row.get(3)?)?,
        added_at: parse_timestamp(4, row.get(4)?)?,
    })
}

fn is_foreign_key_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.code == ErrorCode::ConstraintViolation
                && e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY
    )
}

impl LibraryStore for SqliteLibrary {
    fn find_author(&self, id: &str) -> Result<Option<Author>, StoreError> {
        let conn = self.lock()?;
        let author = conn
            .query_row(
                "SELECT id, name, image FROM authors WHERE id = ?1",
                params![id],
                parse_author_row,
            )
            .optional()?;
        Ok(author)
    }

    fn insert_book(&self, book: &NewBook, authors: &[AuthorLink]) -> Result<Book, StoreError> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        let id = ItemId::generate();
        let created_at = Utc::now();

        tx.execute(
            "INSERT INTO books (id, title, subtitle, description, cover, isbn13, isbn10, release_year, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                id.as_str(),
                book.title,
                book.subtitle,
                book.description,
                book.cover,
                book.isbn13,
                book.isbn10,
                book.release_year,
                created_at.to_rfc3339(),
            ],
        )?;

        for (position, link) in authors.iter().enumerate() {
            let author_id = match link {
                AuthorLink::Existing(author) => author.id.clone(),
                AuthorLink::New { name, image } => {
                    let author_id = Uuid::new_v4().to_string();
                    tx.execute(
                        "INSERT INTO authors (id, name, image) VALUES (?1, ?2, ?3)",
                        params![author_id, name, image],
                    )?;
                    author_id
                }
            };

            tx.execute(
                "INSERT INTO book_authors (book_id, author_id, position) VALUES (?1, ?2, ?3)",
                params![id.as_str(), author_id, position as i64],
            )?;
        }

        let stored = Self::load_book(&tx, &id)?
            .ok_or_else(|| StoreError::Unavailable(format!("book {} vanished after insert", id)))?;
        tx.commit()?;

        debug!(book_id = %id, authors = stored.authors.len(), "Inserted book");
        Ok(stored)
    }

    fn insert_video(&self, video: &NewVideo) -> Result<Video, StoreError> {
        let conn = self.lock()?;

        let stored = Video {
            id: ItemId::generate(),
            title: video.title.clone(),
            description: video.description.clone(),
            image: video.image.clone(),
            cast_members: video.cast_members.clone(),
            genres: video.genres.clone(),
            release_year: video.release_year,
            created_at: Utc::now(),
        };

        conn.execute(
            "INSERT INTO videos (id, title, description, image, cast_members, genres, release_year, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                stored.id.as_str(),
                stored.title,
                stored.description,
                stored.image,
                serde_json::to_string(&stored.cast_members)?,
                serde_json::to_string(&stored.genres)?,
                stored.release_year,
                stored.created_at.to_rfc3339(),
            ],
        )?;

        debug!(video_id = %stored.id, "Inserted video");
        Ok(stored)
    }

    fn get_book(&self, id: &ItemId) -> Result<Option<Book>, StoreError> {
        let conn = self.lock()?;
        Self::load_book(&conn, id)
    }

    fn get_video(&self, id: &ItemId) -> Result<Option<Video>, StoreError> {
        let conn = self.lock()?;
        let video = conn
            .query_row(
                "SELECT id, title, description, image, cast_members, genres, release_year, created_at
                 FROM videos WHERE id = ?1",
                params![id.as_str()],
                |row| {
                    Ok(Video {
                        id: ItemId::from(row.get::<_, String>(0)?),
                        title: row.get(1)?,
                        description: row.get(2)?,
                        image: row.get(3)?,
                        cast_members: parse_string_list(4, row.get(4)?)?,
                        genres: parse_string_list(5, row.get(5)?)?,
                        release_year: row.get(6)?,
                        created_at: parse_timestamp(7, row.get(7)?)?,
                    })
                },
            )
            .optional()?;
        Ok(video)
    }

    fn delete_item(&self, id: &ItemId, category: Category) -> Result<bool, StoreError> {
        let conn = self.lock()?;
        let sql = match category {
            Category::Book => "DELETE FROM books WHERE id = ?1",
            Category::Video => "DELETE FROM videos WHERE id = ?1",
        };
        let deleted = conn.execute(sql, params![id.as_str()])?;
        Ok(deleted > 0)
    }

    fn add_list_entry(
        &self,
        user_id: &str,
        item_id: &ItemId,
        category: Category,
    ) -> Result<ListEntry, StoreError> {
        let conn = self.lock()?;

        let entry = ListEntry {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            item_id: item_id.clone(),
            category,
            added_at: Utc::now(),
        };
        let (book_id, video_id) = match category {
            Category::Book => (Some(item_id.as_str()), None),
            Category::Video => (None, Some(item_id.as_str())),
        };

        let result = conn.execute(
            "INSERT INTO list_entries (id, user_id, book_id, video_id, category, added_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                entry.id,
                entry.user_id,
                book_id,
                video_id,
                category.as_str(),
                entry.added_at.to_rfc3339(),
            ],
        );

        match result {
            Ok(_) => Ok(entry),
            Err(e) if is_foreign_key_violation(&e) => Err(StoreError::MissingItem {
                id: item_id.clone(),
                category,
            }),
            Err(e) => Err(e.into()),
        }
    }

    fn list_entries(&self, user_id: &str) -> Result<Vec<ListEntry>, StoreError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare_cached(
            "SELECT id, user_id, COALESCE(book_id, video_id), category, added_at
             FROM list_entries WHERE user_id = ?1
             ORDER BY rowid",
        )?;
        let entries = stmt
            .query_map(params![user_id], parse_entry_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }
}
