//! SQLite-based storage implementation
//!
//! Documents are stored as JSON next to the key columns needed for lookups
//! and cascades.

use std::sync::{Mutex, MutexGuard};

use chrono::{SecondsFormat, Utc};
use coursehub_core::{
    Course, CourseId, CourseOutline, CourseProgress, Lecture, LectureId, Module, ModuleId, Review, User, UserId,
};
use rusqlite::{params, Connection, OptionalExtension, Transaction};
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::{
    CourseStore, ProgressStore, ReviewStore, StoreResult, UserStore, REVIEW_CONFLICT,
};
use crate::error::ApiError;

/// Current schema version
const SCHEMA_VERSION: i32 = 1;

/// SQLite-based store implementing every storage trait
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

fn internal(e: impl std::fmt::Display) -> ApiError {
    ApiError::Internal(e.to_string())
}

fn encode<T: Serialize>(doc: &T) -> StoreResult<String> {
    serde_json::to_string(doc).map_err(internal)
}

fn decode<T: DeserializeOwned>(doc: &str) -> StoreResult<T> {
    serde_json::from_str(doc).map_err(internal)
}

impl SqliteStore {
    /// Open or create a SQLite database at the given path
    pub fn open(path: &str) -> Result<Self, ApiError> {
        let conn = Connection::open(path).map_err(internal)?;
        Self::from_connection(conn)
    }

    /// Open a private in-memory database
    pub fn open_in_memory() -> Result<Self, ApiError> {
        let conn = Connection::open_in_memory().map_err(internal)?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self, ApiError> {
        // Cascades rely on foreign keys
        conn.execute_batch("PRAGMA foreign_keys = ON;")
            .map_err(internal)?;

        Self::migrate(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| ApiError::Internal("connection lock poisoned".to_string()))
    }

    /// Run database migrations
    fn migrate(conn: &Connection) -> Result<(), ApiError> {
        let current_version = Self::get_schema_version(conn)?;

        if current_version < SCHEMA_VERSION {
            tracing::info!(
                current = current_version,
                target = SCHEMA_VERSION,
                "Running database migrations"
            );

            if current_version < 1 {
                Self::migrate_v1(conn)?;
            }

            conn.execute(
                "INSERT OR REPLACE INTO schema_version (version) VALUES (?1)",
                params![SCHEMA_VERSION],
            )
            .map_err(internal)?;

            tracing::info!("Database migrations complete");
        }

        Ok(())
    }

    /// Get current schema version (0 if no schema exists)
    fn get_schema_version(conn: &Connection) -> Result<i32, ApiError> {
        let table_exists: bool = conn
            .query_row(
                "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version')",
                [],
                |row| row.get(0),
            )
            .map_err(internal)?;

        if !table_exists {
            return Ok(0);
        }

        conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| {
            row.get::<_, Option<i32>>(0).map(|v| v.unwrap_or(0))
        })
        .map_err(internal)
    }

    /// Migration to version 1: initial schema
    fn migrate_v1(conn: &Connection) -> Result<(), ApiError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS schema_version (
                version INTEGER PRIMARY KEY
            );

            CREATE TABLE IF NOT EXISTS courses (
                id TEXT PRIMARY KEY,
                created_at TEXT NOT NULL,
                doc TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS modules (
                id TEXT PRIMARY KEY,
                course_id TEXT NOT NULL REFERENCES courses(id) ON DELETE CASCADE,
                doc TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_modules_course ON modules(course_id);

            CREATE TABLE IF NOT EXISTS lectures (
                id TEXT PRIMARY KEY,
                course_id TEXT NOT NULL REFERENCES courses(id) ON DELETE CASCADE,
                doc TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_lectures_course ON lectures(course_id);

            -- One ledger document per (user, course)
            CREATE TABLE IF NOT EXISTS course_progress (
                user_id TEXT NOT NULL,
                course_id TEXT NOT NULL REFERENCES courses(id) ON DELETE CASCADE,
                doc TEXT NOT NULL,
                PRIMARY KEY (user_id, course_id)
            );

            -- One review per (user, course) is enforced in insert_review
            CREATE TABLE IF NOT EXISTS reviews (
                id TEXT PRIMARY KEY,
                course_id TEXT NOT NULL REFERENCES courses(id) ON DELETE CASCADE,
                user_id TEXT NOT NULL,
                created_at TEXT NOT NULL,
                doc TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_reviews_course ON reviews(course_id);

            CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                doc TEXT NOT NULL
            );
            "#,
        )
        .map_err(internal)?;

        Ok(())
    }

    fn select_doc<T: DeserializeOwned>(
        conn: &Connection,
        sql: &str,
        key: &str,
    ) -> StoreResult<Option<T>> {
        let doc: Option<String> = conn
            .query_row(sql, params![key], |row| row.get(0))
            .optional()
            .map_err(internal)?;
        doc.as_deref().map(decode).transpose()
    }

    fn select_docs<T: DeserializeOwned>(
        conn: &Connection,
        sql: &str,
        key: &str,
    ) -> StoreResult<Vec<T>> {
        let mut stmt = conn.prepare(sql).map_err(internal)?;
        let docs = stmt
            .query_map(params![key], |row| row.get::<_, String>(0))
            .map_err(internal)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(internal)?;
        docs.iter().map(|d| decode(d)).collect()
    }

    /// Read one document inside a transaction, apply `update`, write it back
    fn modify_doc<T: Serialize + DeserializeOwned>(
        tx: &Transaction<'_>,
        table: &str,
        id: &str,
        missing: ApiError,
        update: &mut dyn FnMut(&mut T),
    ) -> StoreResult<T> {
        let select = format!("SELECT doc FROM {table} WHERE id = ?1");
        let mut doc: T = Self::select_doc(tx, &select, id)?.ok_or(missing)?;
        update(&mut doc);

        let save = format!("UPDATE {table} SET doc = ?1 WHERE id = ?2");
        tx.execute(&save, params![encode(&doc)?, id])
            .map_err(internal)?;
        Ok(doc)
    }
}

impl CourseStore for SqliteStore {
    fn insert_course(&self, course: &Course) -> StoreResult<()> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO courses (id, created_at, doc) VALUES (?1, ?2, ?3)",
            params![
                course.id.to_string(),
                course.created_at.to_rfc3339_opts(SecondsFormat::Nanos, true),
                encode(course)?
            ],
        )
        .map_err(internal)?;
        Ok(())
    }

    fn get_course(&self, id: CourseId) -> StoreResult<Option<Course>> {
        let conn = self.lock()?;
        Self::select_doc(&conn, "SELECT doc FROM courses WHERE id = ?1", &id.to_string())
    }

    fn modify_course(
        &self,
        id: CourseId,
        update: &mut dyn FnMut(&mut Course),
    ) -> StoreResult<Course> {
        let mut conn = self.lock()?;
        let tx = conn.transaction().map_err(internal)?;
        let course = Self::modify_doc::<Course>(
            &tx,
            "courses",
            &id.to_string(),
            ApiError::CourseNotFound,
            &mut |course: &mut Course| {
                update(course);
                course.updated_at = Utc::now();
            },
        )?;
        tx.commit().map_err(internal)?;
        Ok(course)
    }

    fn modify_course_with_outline(
        &self,
        id: CourseId,
        update: &mut dyn FnMut(&mut Course, &CourseOutline),
    ) -> StoreResult<Course> {
        let key = id.to_string();
        let mut conn = self.lock()?;
        let tx = conn.transaction().map_err(internal)?;

        let modules: Vec<Module> =
            Self::select_docs(&tx, "SELECT doc FROM modules WHERE course_id = ?1", &key)?;
        let lectures: Vec<Lecture> =
            Self::select_docs(&tx, "SELECT doc FROM lectures WHERE course_id = ?1", &key)?;

        let course = Self::modify_doc::<Course>(
            &tx,
            "courses",
            &key,
            ApiError::CourseNotFound,
            &mut |course: &mut Course| {
                let outline = CourseOutline::build(course, modules.clone(), lectures.clone());
                update(course, &outline);
                course.updated_at = Utc::now();
            },
        )?;
        tx.commit().map_err(internal)?;
        Ok(course)
    }

    fn list_courses(&self) -> StoreResult<Vec<Course>> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare("SELECT doc FROM courses ORDER BY created_at DESC")
            .map_err(internal)?;
        let docs = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .map_err(internal)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(internal)?;
        docs.iter().map(|d| decode(d)).collect()
    }

    fn delete_course(&self, id: CourseId) -> StoreResult<()> {
        let conn = self.lock()?;
        let rows_affected = conn
            .execute("DELETE FROM courses WHERE id = ?1", params![id.to_string()])
            .map_err(internal)?;

        if rows_affected == 0 {
            return Err(ApiError::CourseNotFound);
        }

        Ok(())
    }

    fn insert_module(&self, module: &Module) -> StoreResult<()> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO modules (id, course_id, doc) VALUES (?1, ?2, ?3)",
            params![
                module.id.to_string(),
                module.course.to_string(),
                encode(module)?
            ],
        )
        .map_err(internal)?;
        Ok(())
    }

    fn get_module(&self, id: ModuleId) -> StoreResult<Option<Module>> {
        let conn = self.lock()?;
        Self::select_doc(&conn, "SELECT doc FROM modules WHERE id = ?1", &id.to_string())
    }

    fn modify_module(
        &self,
        id: ModuleId,
        update: &mut dyn FnMut(&mut Module),
    ) -> StoreResult<Module> {
        let mut conn = self.lock()?;
        let tx = conn.transaction().map_err(internal)?;
        let module = Self::modify_doc::<Module>(&tx, "modules", &id.to_string(), ApiError::ModuleNotFound, update)?;
        tx.commit().map_err(internal)?;
        Ok(module)
    }

    fn delete_module(&self, id: ModuleId) -> StoreResult<()> {
        let conn = self.lock()?;
        conn.execute("DELETE FROM modules WHERE id = ?1", params![id.to_string()])
            .map_err(internal)?;
        Ok(())
    }

    fn list_modules(&self, course: CourseId) -> StoreResult<Vec<Module>> {
        let conn = self.lock()?;
        Self::select_docs(
            &conn,
            "SELECT doc FROM modules WHERE course_id = ?1",
            &course.to_string(),
        )
    }

    fn insert_lecture(&self, lecture: &Lecture) -> StoreResult<()> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO lectures (id, course_id, doc) VALUES (?1, ?2, ?3)",
            params![
                lecture.id.to_string(),
                lecture.course.to_string(),
                encode(lecture)?
            ],
        )
        .map_err(internal)?;
        Ok(())
    }

    fn get_lecture(&self, id: LectureId) -> StoreResult<Option<Lecture>> {
        let conn = self.lock()?;
        Self::select_doc(&conn, "SELECT doc FROM lectures WHERE id = ?1", &id.to_string())
    }

    fn modify_lecture(
        &self,
        id: LectureId,
        update: &mut dyn FnMut(&mut Lecture),
    ) -> StoreResult<Lecture> {
        let mut conn = self.lock()?;
        let tx = conn.transaction().map_err(internal)?;
        let lecture = Self::modify_doc::<Lecture>(
            &tx,
            "lectures",
            &id.to_string(),
            ApiError::LectureNotFound,
            &mut |lecture: &mut Lecture| {
                update(lecture);
                lecture.updated_at = Utc::now();
            },
        )?;
        tx.commit().map_err(internal)?;
        Ok(lecture)
    }

    fn delete_lecture(&self, id: LectureId) -> StoreResult<()> {
        let conn = self.lock()?;
        conn.execute("DELETE FROM lectures WHERE id = ?1", params![id.to_string()])
            .map_err(internal)?;
        Ok(())
    }

    fn list_lectures(&self, course: CourseId) -> StoreResult<Vec<Lecture>> {
        let conn = self.lock()?;
        Self::select_docs(
            &conn,
            "SELECT doc FROM lectures WHERE course_id = ?1",
            &course.to_string(),
        )
    }
}

impl ProgressStore for SqliteStore {
    fn get_progress(&self, user: UserId, course: CourseId) -> StoreResult<Option<CourseProgress>> {
        let conn = self.lock()?;
        let doc: Option<String> = conn
            .query_row(
                "SELECT doc FROM course_progress WHERE user_id = ?1 AND course_id = ?2",
                params![user.to_string(), course.to_string()],
                |row| row.get(0),
            )
            .optional()
            .map_err(internal)?;
        doc.as_deref().map(decode).transpose()
    }

    fn upsert_progress(
        &self,
        user: UserId,
        course: CourseId,
        update: &mut dyn FnMut(&mut CourseProgress),
    ) -> StoreResult<CourseProgress> {
        let (user_key, course_key) = (user.to_string(), course.to_string());
        let mut conn = self.lock()?;
        let tx = conn.transaction().map_err(internal)?;

        let doc: Option<String> = tx
            .query_row(
                "SELECT doc FROM course_progress WHERE user_id = ?1 AND course_id = ?2",
                params![user_key, course_key],
                |row| row.get(0),
            )
            .optional()
            .map_err(internal)?;

        let mut progress = match doc {
            Some(doc) => decode(&doc)?,
            None => CourseProgress::new(user, course),
        };
        update(&mut progress);
        progress.updated_at = Utc::now();

        tx.execute(
            "INSERT INTO course_progress (user_id, course_id, doc) VALUES (?1, ?2, ?3)
             ON CONFLICT (user_id, course_id) DO UPDATE SET doc = excluded.doc",
            params![user_key, course_key, encode(&progress)?],
        )
        .map_err(internal)?;
        tx.commit().map_err(internal)?;

        Ok(progress)
    }
}

impl ReviewStore for SqliteStore {
    fn insert_review(&self, review: &Review) -> StoreResult<()> {
        let mut conn = self.lock()?;
        let tx = conn.transaction().map_err(internal)?;

        let exists: bool = tx
            .query_row(
                "SELECT EXISTS(SELECT 1 FROM reviews WHERE course_id = ?1 AND user_id = ?2)",
                params![review.course.to_string(), review.user.to_string()],
                |row| row.get(0),
            )
            .map_err(internal)?;
        if exists {
            return Err(ApiError::Conflict(REVIEW_CONFLICT.to_string()));
        }

        tx.execute(
            "INSERT INTO reviews (id, course_id, user_id, created_at, doc) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                review.id.to_string(),
                review.course.to_string(),
                review.user.to_string(),
                review.created_at.to_rfc3339_opts(SecondsFormat::Nanos, true),
                encode(review)?
            ],
        )
        .map_err(internal)?;
        tx.commit().map_err(internal)?;
        Ok(())
    }

    fn find_review(&self, course: CourseId, user: UserId) -> StoreResult<Option<Review>> {
        let conn = self.lock()?;
        let doc: Option<String> = conn
            .query_row(
                "SELECT doc FROM reviews WHERE course_id = ?1 AND user_id = ?2",
                params![course.to_string(), user.to_string()],
                |row| row.get(0),
            )
            .optional()
            .map_err(internal)?;
        doc.as_deref().map(decode).transpose()
    }

    fn list_reviews(&self, course: CourseId) -> StoreResult<Vec<Review>> {
        let conn = self.lock()?;
        Self::select_docs(
            &conn,
            "SELECT doc FROM reviews WHERE course_id = ?1 ORDER BY created_at DESC",
            &course.to_string(),
        )
    }
}

impl UserStore for SqliteStore {
    fn insert_user(&self, user: &User) -> StoreResult<()> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO users (id, doc) VALUES (?1, ?2)",
            params![user.id.to_string(), encode(user)?],
        )
        .map_err(internal)?;
        Ok(())
    }

    fn get_user(&self, id: UserId) -> StoreResult<Option<User>> {
        let conn = self.lock()?;
        Self::select_doc(&conn, "SELECT doc FROM users WHERE id = ?1", &id.to_string())
    }

    fn add_enrolled_course(&self, user: UserId, course: CourseId) -> StoreResult<()> {
        let mut conn = self.lock()?;
        let tx = conn.transaction().map_err(internal)?;
        match Self::modify_doc::<User>(
            &tx,
            "users",
            &user.to_string(),
            ApiError::UserNotFound,
            &mut |user: &mut User| {
                user.enroll(course);
            },
        ) {
            Ok(_) | Err(ApiError::UserNotFound) => {}
            Err(e) => return Err(e),
        }
        tx.commit().map_err(internal)?;
        Ok(())
    }
}
