use std::collections::HashSet;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::pool::PoolConnection;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};

use crate::errors::{AppError, AppResult};
use crate::ids::{self, BUG_PREFIX, FIX_PREFIX};
use crate::models::{
    Bug, BugCodeFile, BugDetail, BugMedia, BugPatch, BugWebsite, ContactMessage, FixPatch,
    FixWithBug, NewBug, NewContactMessage, NewFix, SuccessfulFixed,
};
use crate::uploads::{Bucket, UploadStore};

/// Creation transactions retried after losing an identifier race to another writer.
const MAX_INSERT_ATTEMPTS: usize = 5;

const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS bugs (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        title VARCHAR(200) NOT NULL,
        description TEXT NOT NULL,
        severity VARCHAR(10) NOT NULL,
        category VARCHAR(20) NOT NULL DEFAULT 'other',
        status VARCHAR(15) NOT NULL DEFAULT 'open',
        created_at TEXT NOT NULL,
        full_name VARCHAR(100),
        email TEXT,
        phone VARCHAR(20) NOT NULL,
        splab_number VARCHAR(8) UNIQUE,
        logs TEXT NOT NULL DEFAULT '',
        tools_used TEXT NOT NULL DEFAULT ''
    )",
    "CREATE TABLE IF NOT EXISTS bug_media (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        bug_id INTEGER NOT NULL REFERENCES bugs(id) ON DELETE CASCADE,
        file TEXT NOT NULL,
        uploaded_at TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS bug_code_files (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        bug_id INTEGER NOT NULL REFERENCES bugs(id) ON DELETE CASCADE,
        file TEXT NOT NULL,
        uploaded_at TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS bug_websites (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        bug_id INTEGER NOT NULL REFERENCES bugs(id) ON DELETE CASCADE,
        url TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS successful_fixes (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        bug_id INTEGER NOT NULL REFERENCES bugs(id) ON DELETE CASCADE,
        splf_number VARCHAR(8) UNIQUE,
        description TEXT NOT NULL,
        fixed_at TEXT NOT NULL,
        evidence_media TEXT,
        evidence_code TEXT,
        category VARCHAR(20) NOT NULL DEFAULT 'other',
        full_name VARCHAR(100),
        email TEXT,
        phone VARCHAR(20) NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS contact_messages (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name VARCHAR(100) NOT NULL,
        email TEXT NOT NULL,
        phone VARCHAR(20) NOT NULL,
        subject VARCHAR(20) NOT NULL,
        message TEXT NOT NULL,
        created_at TEXT NOT NULL
    )",
    "CREATE INDEX IF NOT EXISTS idx_bugs_created_at ON bugs(created_at)",
    "CREATE INDEX IF NOT EXISTS idx_bug_media_bug ON bug_media(bug_id)",
    "CREATE INDEX IF NOT EXISTS idx_bug_code_files_bug ON bug_code_files(bug_id)",
    "CREATE INDEX IF NOT EXISTS idx_bug_websites_bug ON bug_websites(bug_id)",
    "CREATE INDEX IF NOT EXISTS idx_successful_fixes_bug ON successful_fixes(bug_id)",
    "CREATE INDEX IF NOT EXISTS idx_successful_fixes_fixed_at ON successful_fixes(fixed_at)",
];

const FIX_WITH_BUG: &str = "SELECT f.*, b.title AS bug_title, b.splab_number AS bug_splab_number
     FROM successful_fixes f JOIN bugs b ON b.id = f.bug_id";

pub async fn connect(url: &str) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(url)?
        .create_if_missing(true)
        .foreign_keys(true);
    SqlitePoolOptions::new().connect_with(options).await
}

/// A private in-memory database. A single connection keeps every query on the same database.
pub async fn connect_in_memory() -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
    SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await
}

pub async fn migrate(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    for statement in SCHEMA {
        sqlx::query(statement).execute(pool).await?;
    }
    Ok(())
}

/// A transaction opened with `BEGIN IMMEDIATE`. SQLite grants the write lock
/// before the first read, so concurrent writers wait on the busy timeout
/// instead of failing when a deferred read tries to upgrade.
///
/// Dropped while still open (the request future was cancelled), the
/// connection is detached and closed, which rolls the transaction back.
struct ImmediateTx {
    conn: Option<PoolConnection<Sqlite>>,
}

impl ImmediateTx {
    async fn begin(pool: &SqlitePool) -> Result<Self, sqlx::Error> {
        let mut conn = pool.acquire().await?;
        sqlx::query("BEGIN IMMEDIATE").execute(&mut *conn).await?;
        Ok(Self { conn: Some(conn) })
    }

    fn conn(&mut self) -> Result<&mut SqliteConnection, sqlx::Error> {
        self.conn.as_deref_mut().ok_or(sqlx::Error::PoolClosed)
    }

    /// Commits on `Ok`, rolls back on `Err`, and passes the result through.
    async fn finish<T>(mut self, result: AppResult<T>) -> AppResult<T> {
        let Some(mut conn) = self.conn.take() else {
            return result;
        };
        let statement = if result.is_ok() { "COMMIT" } else { "ROLLBACK" };
        match sqlx::query(statement).execute(&mut *conn).await {
            Ok(_) => result,
            Err(e) => {
                log::warn!("{} failed, discarding the connection: {}", statement, e);
                drop(conn.detach());
                result.and(Err(e.into()))
            }
        }
    }
}

impl Drop for ImmediateTx {
    fn drop(&mut self) {
        if let Some(conn) = self.conn.take() {
            log::warn!("write transaction abandoned mid-flight, closing its connection");
            drop(conn.detach());
        }
    }
}

/// SQLITE_BUSY and its extended codes.
const SQLITE_BUSY: i32 = 5;

/// Another writer won the identifier, or held the write lock past the busy timeout.
fn is_retryable(err: &AppError) -> bool {
    let AppError::Database(sqlx::Error::Database(db)) = err else {
        return false;
    };
    db.is_unique_violation()
        || db
            .code()
            .and_then(|code| code.parse::<i32>().ok())
            .is_some_and(|code| code & 0xff == SQLITE_BUSY)
}

async fn taken_identifiers(
    conn: &mut SqliteConnection,
    sql: &'static str,
) -> Result<HashSet<String>, sqlx::Error> {
    let ids: Vec<String> = sqlx::query_scalar(sql).fetch_all(&mut *conn).await?;
    Ok(ids.into_iter().collect())
}

async fn taken_bug_numbers(conn: &mut SqliteConnection) -> Result<HashSet<String>, sqlx::Error> {
    taken_identifiers(
        conn,
        "SELECT splab_number FROM bugs WHERE splab_number IS NOT NULL",
    )
    .await
}

async fn taken_fix_numbers(conn: &mut SqliteConnection) -> Result<HashSet<String>, sqlx::Error> {
    taken_identifiers(
        conn,
        "SELECT splf_number FROM successful_fixes WHERE splf_number IS NOT NULL",
    )
    .await
}

// === Bugs ===

#[derive(Debug, Serialize)]
pub struct CreatedBug {
    pub bug: Bug,
    pub media_files: usize,
    pub code_files: usize,
    pub websites: usize,
}

/// Writes the uploads, then the bug and all of its children in one transaction.
/// Uploaded files are removed again if the rows could not be written.
pub async fn create_bug(pool: &SqlitePool, uploads: &UploadStore, new: &NewBug) -> AppResult<CreatedBug> {
    let media = uploads.save_all(Bucket::BugMedia, &new.media_files).await?;
    let code = match uploads.save_all(Bucket::BugCode, &new.code_files).await {
        Ok(code) => code,
        Err(e) => {
            uploads.remove_all(&media).await;
            return Err(e.into());
        }
    };

    let mut attempt = 1;
    let result = loop {
        match insert_bug(pool, new, &media, &code).await {
            Err(e) if is_retryable(&e) && attempt < MAX_INSERT_ATTEMPTS => {
                log::warn!("bug insert conflicted on attempt {}, retrying: {}", attempt, e);
                attempt += 1;
            }
            other => break other,
        }
    };

    match result {
        Ok(bug) => {
            log::info!(
                "created bug {} ({:?}) with {} media, {} code files, {} websites",
                bug.id,
                bug.splab_number,
                media.len(),
                code.len(),
                new.websites.len()
            );
            Ok(CreatedBug {
                bug,
                media_files: media.len(),
                code_files: code.len(),
                websites: new.websites.len(),
            })
        }
        Err(e) => {
            uploads.remove_all(&media).await;
            uploads.remove_all(&code).await;
            Err(e)
        }
    }
}

async fn insert_bug(pool: &SqlitePool, new: &NewBug, media: &[String], code: &[String]) -> AppResult<Bug> {
    let mut tx = ImmediateTx::begin(pool).await?;
    let result = insert_bug_rows(tx.conn()?, new, media, code).await;
    tx.finish(result).await
}

async fn insert_bug_rows(
    conn: &mut SqliteConnection,
    new: &NewBug,
    media: &[String],
    code: &[String],
) -> AppResult<Bug> {
    let taken = taken_bug_numbers(conn).await?;
    let splab_number = ids::generate_unique_id(BUG_PREFIX, &mut rand::rng(), |c| taken.contains(c))?;
    let now = Utc::now();

    let bug: Bug = sqlx::query_as(
        "INSERT INTO bugs (title, description, severity, category, status, created_at,
                           full_name, email, phone, splab_number, logs, tools_used)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
         RETURNING *",
    )
    .bind(&new.title)
    .bind(&new.description)
    .bind(new.severity)
    .bind(new.category)
    .bind(new.status)
    .bind(now)
    .bind(&new.full_name)
    .bind(&new.email)
    .bind(&new.phone)
    .bind(&splab_number)
    .bind(&new.logs)
    .bind(&new.tools_used)
    .fetch_one(&mut *conn)
    .await?;

    for file in media {
        sqlx::query("INSERT INTO bug_media (bug_id, file, uploaded_at) VALUES (?, ?, ?)")
            .bind(bug.id)
            .bind(file)
            .bind(now)
            .execute(&mut *conn)
            .await?;
    }
    for file in code {
        sqlx::query("INSERT INTO bug_code_files (bug_id, file, uploaded_at) VALUES (?, ?, ?)")
            .bind(bug.id)
            .bind(file)
            .bind(now)
            .execute(&mut *conn)
            .await?;
    }
    for url in &new.websites {
        sqlx::query("INSERT INTO bug_websites (bug_id, url) VALUES (?, ?)")
            .bind(bug.id)
            .bind(url)
            .execute(&mut *conn)
            .await?;
    }

    Ok(bug)
}

pub async fn list_bugs(pool: &SqlitePool) -> Result<Vec<Bug>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM bugs ORDER BY created_at DESC, id DESC")
        .fetch_all(pool)
        .await
}

pub async fn list_bugs_by_id(pool: &SqlitePool) -> Result<Vec<Bug>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM bugs ORDER BY id").fetch_all(pool).await
}

pub async fn get_bug(pool: &SqlitePool, id: i64) -> Result<Option<Bug>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM bugs WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn bug_detail(pool: &SqlitePool, id: i64) -> Result<Option<BugDetail>, sqlx::Error> {
    let Some(bug) = get_bug(pool, id).await? else {
        return Ok(None);
    };

    let media_files: Vec<BugMedia> = sqlx::query_as("SELECT * FROM bug_media WHERE bug_id = ? ORDER BY id")
        .bind(id)
        .fetch_all(pool)
        .await?;
    let code_files: Vec<BugCodeFile> =
        sqlx::query_as("SELECT * FROM bug_code_files WHERE bug_id = ? ORDER BY id")
            .bind(id)
            .fetch_all(pool)
            .await?;
    let websites: Vec<BugWebsite> = sqlx::query_as("SELECT * FROM bug_websites WHERE bug_id = ? ORDER BY id")
        .bind(id)
        .fetch_all(pool)
        .await?;
    let successful_fixes: Vec<SuccessfulFixed> =
        sqlx::query_as("SELECT * FROM successful_fixes WHERE bug_id = ? ORDER BY id")
            .bind(id)
            .fetch_all(pool)
            .await?;

    Ok(Some(BugDetail {
        log_entries: bug.log_entries().into_iter().map(String::from).collect(),
        tools: bug.tools().into_iter().map(String::from).collect(),
        bug,
        media_files,
        code_files,
        websites,
        successful_fixes,
    }))
}

/// Applies an administrative edit. The splab number is kept, or assigned if the row never got one.
pub async fn update_bug(pool: &SqlitePool, id: i64, patch: &BugPatch) -> AppResult<Option<Bug>> {
    let mut tx = ImmediateTx::begin(pool).await?;
    let result = update_bug_row(tx.conn()?, id, patch).await;
    tx.finish(result).await
}

async fn update_bug_row(conn: &mut SqliteConnection, id: i64, patch: &BugPatch) -> AppResult<Option<Bug>> {
    let current: Option<Bug> = sqlx::query_as("SELECT * FROM bugs WHERE id = ?")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
    let Some(current) = current else {
        return Ok(None);
    };

    let taken = taken_bug_numbers(conn).await?;
    let splab_number = ids::ensure_identifier(current.splab_number, BUG_PREFIX, &mut rand::rng(), |c| {
        taken.contains(c)
    })?;

    let bug: Bug = sqlx::query_as(
        "UPDATE bugs SET
            title = COALESCE(?, title),
            description = COALESCE(?, description),
            severity = COALESCE(?, severity),
            category = COALESCE(?, category),
            status = COALESCE(?, status),
            full_name = CASE WHEN ? THEN full_name ELSE ? END,
            email = CASE WHEN ? THEN email ELSE ? END,
            phone = COALESCE(?, phone),
            logs = COALESCE(?, logs),
            tools_used = COALESCE(?, tools_used),
            splab_number = ?
         WHERE id = ?
         RETURNING *",
    )
    .bind(&patch.title)
    .bind(&patch.description)
    .bind(patch.severity)
    .bind(patch.category)
    .bind(patch.status)
    .bind(patch.full_name.is_none())
    .bind(blank_to_null(&patch.full_name))
    .bind(patch.email.is_none())
    .bind(blank_to_null(&patch.email))
    .bind(&patch.phone)
    .bind(&patch.logs)
    .bind(&patch.tools_used)
    .bind(&splab_number)
    .bind(id)
    .fetch_one(&mut *conn)
    .await?;

    log::info!("updated bug {} ({})", bug.id, splab_number);
    Ok(Some(bug))
}

/// Optional reporter and fixer columns: a blank value clears them.
fn blank_to_null(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

pub async fn delete_bug(pool: &SqlitePool, id: i64) -> Result<bool, sqlx::Error> {
    let res = sqlx::query("DELETE FROM bugs WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(res.rows_affected() > 0)
}

#[derive(Debug, Clone, Default)]
pub struct BugFilter {
    pub category: Option<String>,
    /// `Some(true)`: at least one fix. `Some(false)`: none.
    pub fixed: Option<bool>,
    pub search: Option<String>,
}

pub async fn filter_bugs(pool: &SqlitePool, filter: &BugFilter) -> Result<Vec<Bug>, sqlx::Error> {
    let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new("SELECT b.* FROM bugs b WHERE 1 = 1");
    if let Some(category) = &filter.category {
        qb.push(" AND b.category = ").push_bind(category.clone());
    }
    match filter.fixed {
        Some(true) => {
            qb.push(" AND EXISTS (SELECT 1 FROM successful_fixes f WHERE f.bug_id = b.id)");
        }
        Some(false) => {
            qb.push(" AND NOT EXISTS (SELECT 1 FROM successful_fixes f WHERE f.bug_id = b.id)");
        }
        None => {}
    }
    if let Some(search) = &filter.search {
        qb.push(" AND instr(lower(b.title), lower(")
            .push_bind(search.clone())
            .push(")) > 0");
    }
    qb.push(" ORDER BY b.id");
    qb.build_query_as::<Bug>().fetch_all(pool).await
}

#[derive(Debug, Clone, Copy)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    /// Exclusive; open-ended when `None`.
    pub end: Option<DateTime<Utc>>,
}

async fn count_rows(
    pool: &SqlitePool,
    table: &'static str,
    column: &'static str,
    window: Option<TimeWindow>,
) -> Result<i64, sqlx::Error> {
    let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(format!("SELECT COUNT(*) FROM {}", table));
    if let Some(window) = window {
        qb.push(format!(" WHERE {} >= ", column)).push_bind(window.start);
        if let Some(end) = window.end {
            qb.push(format!(" AND {} < ", column)).push_bind(end);
        }
    }
    qb.build_query_scalar::<i64>().fetch_one(pool).await
}

pub async fn count_bugs(pool: &SqlitePool, window: Option<TimeWindow>) -> Result<i64, sqlx::Error> {
    count_rows(pool, "bugs", "created_at", window).await
}

pub async fn count_fixes(pool: &SqlitePool, window: Option<TimeWindow>) -> Result<i64, sqlx::Error> {
    count_rows(pool, "successful_fixes", "fixed_at", window).await
}

// === Fixes ===

/// Sets the bug's status and records the fix. The fix category is copied from
/// the bug inside the insert statement itself.
pub async fn create_fix(pool: &SqlitePool, uploads: &UploadStore, new: &NewFix) -> AppResult<SuccessfulFixed> {
    let media = match &new.evidence_media {
        Some(file) => Some(uploads.save(Bucket::FixMedia, file).await?),
        None => None,
    };
    let code = match &new.evidence_code {
        Some(file) => match uploads.save(Bucket::FixCode, file).await {
            Ok(reference) => Some(reference),
            Err(e) => {
                uploads.remove_all(media.as_slice()).await;
                return Err(e.into());
            }
        },
        None => None,
    };

    let mut attempt = 1;
    let result = loop {
        match insert_fix(pool, new, media.as_deref(), code.as_deref()).await {
            Err(e) if is_retryable(&e) && attempt < MAX_INSERT_ATTEMPTS => {
                log::warn!("fix insert conflicted on attempt {}, retrying: {}", attempt, e);
                attempt += 1;
            }
            other => break other,
        }
    };

    match result {
        Ok(fix) => {
            log::info!(
                "recorded fix {} ({:?}) for bug {}, status now {}",
                fix.id,
                fix.splf_number,
                fix.bug_id,
                new.status
            );
            Ok(fix)
        }
        Err(e) => {
            uploads.remove_all(media.as_slice()).await;
            uploads.remove_all(code.as_slice()).await;
            Err(e)
        }
    }
}

async fn insert_fix(
    pool: &SqlitePool,
    new: &NewFix,
    media: Option<&str>,
    code: Option<&str>,
) -> AppResult<SuccessfulFixed> {
    let mut tx = ImmediateTx::begin(pool).await?;
    let result = insert_fix_row(tx.conn()?, new, media, code).await;
    tx.finish(result).await
}

async fn insert_fix_row(
    conn: &mut SqliteConnection,
    new: &NewFix,
    media: Option<&str>,
    code: Option<&str>,
) -> AppResult<SuccessfulFixed> {
    let updated = sqlx::query("UPDATE bugs SET status = ? WHERE id = ?")
        .bind(new.status)
        .bind(new.bug_id)
        .execute(&mut *conn)
        .await?;
    if updated.rows_affected() == 0 {
        return Err(AppError::not_found("Bug not found"));
    }

    let taken = taken_fix_numbers(conn).await?;
    let splf_number = ids::generate_unique_id(FIX_PREFIX, &mut rand::rng(), |c| taken.contains(c))?;

    let fix: SuccessfulFixed = sqlx::query_as(
        "INSERT INTO successful_fixes (bug_id, splf_number, description, fixed_at,
                                       evidence_media, evidence_code, category,
                                       full_name, email, phone)
         VALUES (?, ?, ?, ?, ?, ?, (SELECT category FROM bugs WHERE id = ?), ?, ?, ?)
         RETURNING *",
    )
    .bind(new.bug_id)
    .bind(&splf_number)
    .bind(&new.description)
    .bind(Utc::now())
    .bind(media)
    .bind(code)
    .bind(new.bug_id)
    .bind(&new.full_name)
    .bind(&new.email)
    .bind(&new.phone)
    .fetch_one(&mut *conn)
    .await?;

    Ok(fix)
}

/// Re-saves a fix: applies the edit and re-projects the category from its bug.
pub async fn resave_fix(pool: &SqlitePool, id: i64, patch: &FixPatch) -> AppResult<Option<SuccessfulFixed>> {
    let mut tx = ImmediateTx::begin(pool).await?;
    let result = resave_fix_row(tx.conn()?, id, patch).await;
    tx.finish(result).await
}

async fn resave_fix_row(
    conn: &mut SqliteConnection,
    id: i64,
    patch: &FixPatch,
) -> AppResult<Option<SuccessfulFixed>> {
    let current: Option<SuccessfulFixed> = sqlx::query_as("SELECT * FROM successful_fixes WHERE id = ?")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
    let Some(current) = current else {
        return Ok(None);
    };

    let taken = taken_fix_numbers(conn).await?;
    let splf_number = ids::ensure_identifier(current.splf_number, FIX_PREFIX, &mut rand::rng(), |c| {
        taken.contains(c)
    })?;

    let fix: SuccessfulFixed = sqlx::query_as(
        "UPDATE successful_fixes SET
            description = COALESCE(?, description),
            full_name = CASE WHEN ? THEN full_name ELSE ? END,
            email = CASE WHEN ? THEN email ELSE ? END,
            phone = COALESCE(?, phone),
            splf_number = ?,
            category = (SELECT b.category FROM bugs b WHERE b.id = successful_fixes.bug_id)
         WHERE id = ?
         RETURNING *",
    )
    .bind(&patch.description)
    .bind(patch.full_name.is_none())
    .bind(blank_to_null(&patch.full_name))
    .bind(patch.email.is_none())
    .bind(blank_to_null(&patch.email))
    .bind(&patch.phone)
    .bind(&splf_number)
    .bind(id)
    .fetch_one(&mut *conn)
    .await?;

    Ok(Some(fix))
}

pub async fn get_fix(pool: &SqlitePool, id: i64) -> Result<Option<FixWithBug>, sqlx::Error> {
    sqlx::query_as(&format!("{} WHERE f.id = ?", FIX_WITH_BUG))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn list_fixes(pool: &SqlitePool) -> Result<Vec<FixWithBug>, sqlx::Error> {
    sqlx::query_as(&format!("{} ORDER BY f.id", FIX_WITH_BUG))
        .fetch_all(pool)
        .await
}

// === Contact messages ===

pub async fn insert_contact(pool: &SqlitePool, new: &NewContactMessage) -> Result<ContactMessage, sqlx::Error> {
    sqlx::query_as(
        "INSERT INTO contact_messages (name, email, phone, subject, message, created_at)
         VALUES (?, ?, ?, ?, ?, ?)
         RETURNING *",
    )
    .bind(&new.name)
    .bind(&new.email)
    .bind(&new.phone)
    .bind(new.subject)
    .bind(&new.message)
    .bind(Utc::now())
    .fetch_one(pool)
    .await
}

pub async fn list_contact_messages(pool: &SqlitePool) -> Result<Vec<ContactMessage>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM contact_messages ORDER BY created_at DESC, id DESC")
        .fetch_all(pool)
        .await
}
