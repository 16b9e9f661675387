//! Record façade: the data-access calls page handlers make.
//!
//! Every function renders its statement for the database's dialect, so an
//! invalid identifier or argument fails with [`Error::Build`](crate::Error::Build)
//! before anything is sent.

use shopkeep_sql::{
    AGGREGATE_ALIAS, Aggregate, Delete, Exists, Insert, Record, Select, Update, Value,
};

use chrono::Utc;

use crate::db::Database;
use crate::{Error, Result};

/// Run a SELECT and return all rows.
pub fn select_records<D: Database>(db: &D, select: &Select) -> Result<Vec<Record>> {
    db.fetch_all(&select.build(&db.dialect())?)
}

/// Fetch one row by primary key. An absent row is `Ok(None)`.
///
/// An empty `columns` slice selects every column.
pub fn select_one_by_id<D: Database>(
    db: &D,
    table: &str,
    id_column: &str,
    id: i64,
    columns: &[&str],
) -> Result<Option<Record>> {
    let select = Select::by_id(table, id_column, id).columns(columns);
    db.fetch_one(&select.build(&db.dialect())?)
}

/// Run an aggregate and return its scalar. SQL `NULL` (e.g. `MAX` over no
/// rows) is `None`.
pub fn aggregate<D: Database>(db: &D, query: &Aggregate) -> Result<Option<Value>> {
    let row = db.fetch_one(&query.build(&db.dialect())?)?;
    Ok(row
        .and_then(|mut r| r.remove(AGGREGATE_ALIAS))
        .filter(|v| !v.is_null()))
}

/// Insert one row, dropping `exclude` columns first. Returns the new row id.
pub fn insert_record<D: Database>(
    db: &D,
    table: &str,
    data: Record,
    exclude: &[&str],
) -> Result<i64> {
    let insert = Insert::table(table).record(data).exclude(exclude);
    let id = db.insert(&insert.build(&db.dialect())?)?;
    crate::log!(debug, "record inserted", table: table, id: id);
    Ok(id)
}

/// Update one row by key. The id column is never part of the SET clause.
///
/// Returns whether a row matched.
pub fn update_record<D: Database>(
    db: &D,
    table: &str,
    data: Record,
    id_column: &str,
    id: i64,
    exclude: &[&str],
) -> Result<bool> {
    let update = Update::table(table)
        .record(data)
        .exclude(exclude)
        .by_id(id_column, id);
    Ok(db.execute(&update.build(&db.dialect())?)? > 0)
}

/// Set a single status column. Returns whether a row matched.
pub fn update_status<D: Database>(
    db: &D,
    table: &str,
    id_column: &str,
    id: i64,
    status_column: &str,
    value: impl Into<Value>,
) -> Result<bool> {
    let update = Update::status(table, id_column, id, status_column, value);
    Ok(db.execute(&update.build(&db.dialect())?)? > 0)
}

/// Whether a row with this key exists.
pub fn record_exists<D: Database>(db: &D, table: &str, id_column: &str, id: i64) -> Result<bool> {
    let exists = Exists::new(table, id_column, id);
    Ok(db.fetch_one(&exists.build(&db.dialect())?)?.is_some())
}

/// Delete one row by key. Returns the number of affected rows.
pub fn delete_by_id<D: Database>(db: &D, table: &str, id_column: &str, id: i64) -> Result<u64> {
    let delete = Delete::by_id(table, id_column, id);
    db.execute(&delete.build(&db.dialect())?)
}

// ============================================================================
// PAGING AND ROW HELPERS
// ============================================================================

/// Format of `created_at`, `updated_at` and `registration_date` values.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Current UTC time in [`TIMESTAMP_FORMAT`].
#[must_use]
pub fn current_timestamp() -> String {
    Utc::now().format(TIMESTAMP_FORMAT).to_string()
}

/// A LIMIT/OFFSET window over a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    /// Rows per page.
    pub limit: i64,
    /// Rows skipped.
    pub offset: i64,
}

impl Page {
    /// One-based page `number` of `size` rows. Numbers below 1 mean the
    /// first page.
    #[must_use]
    pub const fn number(number: i64, size: i64) -> Self {
        let index = if number < 1 { 0 } else { number - 1 };
        Self {
            limit: size,
            offset: index.saturating_mul(size),
        }
    }

    /// Apply the window to a SELECT.
    #[must_use]
    pub fn apply(self, select: Select) -> Select {
        select.limit(self.limit).offset(self.offset)
    }
}

/// Integer column that must be present.
pub(crate) fn row_int(row: &Record, table: &'static str, column: &str) -> Result<i64> {
    row.get_int(column)
        .ok_or_else(|| Error::malformed_row(table, format!("missing integer column '{column}'")))
}

/// Text column; `NULL` and missing read as empty.
pub(crate) fn row_text(row: &Record, column: &str) -> String {
    match row.get(column) {
        None | Some(Value::Null) => String::new(),
        Some(value) => value.to_string(),
    }
}

// ============================================================================
// DELETE ENTITY
// ============================================================================

/// Redirect used when the caller does not pick one.
pub const DEFAULT_REDIRECT_URL: &str = "index.php";
/// Redirect delay in seconds used when the caller does not pick one.
pub const DEFAULT_REDIRECT_DELAY: u32 = 3;
/// Title for a missing row.
pub const DEFAULT_NOT_FOUND_TITLE: &str = "Item not found";
/// Title after a delete.
pub const DEFAULT_SUCCESS_TITLE: &str = "Deleted";
/// Message after a delete.
pub const DEFAULT_SUCCESS_MESSAGE: &str = "Item was deleted successfully";
/// Message when an account tries to delete itself.
pub const CANNOT_DELETE_SELF_MESSAGE: &str = "You cannot delete your own account.";

/// Where the presentation layer should send the user next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirect {
    /// Target URL.
    pub url: String,
    /// Seconds to wait before redirecting.
    pub delay_secs: u32,
}

/// Rendering directive for the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    /// Heading.
    pub title: String,
    /// Body text, possibly empty.
    pub message: String,
    /// Optional follow-up redirect.
    pub redirect: Option<Redirect>,
}

/// Result of [`delete_entity`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// The acting account tried to delete itself. No query was executed.
    CannotDeleteSelf(Notice),
    /// The row does not exist. No DELETE was issued.
    NotFound(Notice),
    /// The DELETE was issued.
    Deleted(Notice),
}

impl DeleteOutcome {
    /// The notice to render.
    #[must_use]
    pub const fn notice(&self) -> &Notice {
        match self {
            Self::CannotDeleteSelf(n) | Self::NotFound(n) | Self::Deleted(n) => n,
        }
    }

    /// Whether the DELETE was issued.
    #[must_use]
    pub const fn is_deleted(&self) -> bool {
        matches!(self, Self::Deleted(_))
    }
}

/// Parameters for [`delete_entity`].
///
/// ```
/// use shopkeep::records::DeleteRequest;
///
/// let request = DeleteRequest::new("users", "user_id", 12)
///     .redirect("users.php?do=Manage", 3)
///     .prevent_self_delete(Some(1));
/// assert_eq!(request.id, 12);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteRequest {
    /// Table to delete from.
    pub table: String,
    /// Key column.
    pub id_column: String,
    /// Key value.
    pub id: i64,
    /// Redirect target attached to the success notice. Empty disables the
    /// redirect.
    pub redirect_url: String,
    /// Redirect delay in seconds.
    pub redirect_delay: u32,
    /// Title of the not-found notice.
    pub not_found_title: String,
    /// Title of the success notice.
    pub success_title: String,
    /// Message of the success notice.
    pub success_message: String,
    /// Id of the acting account; deleting it is refused.
    pub prevent_self_delete: Option<i64>,
}

impl DeleteRequest {
    /// Request with default notices and redirect.
    pub fn new(table: impl Into<String>, id_column: impl Into<String>, id: i64) -> Self {
        Self {
            table: table.into(),
            id_column: id_column.into(),
            id,
            redirect_url: DEFAULT_REDIRECT_URL.to_string(),
            redirect_delay: DEFAULT_REDIRECT_DELAY,
            not_found_title: DEFAULT_NOT_FOUND_TITLE.to_string(),
            success_title: DEFAULT_SUCCESS_TITLE.to_string(),
            success_message: DEFAULT_SUCCESS_MESSAGE.to_string(),
            prevent_self_delete: None,
        }
    }

    /// Set the redirect target and delay.
    pub fn redirect(mut self, url: impl Into<String>, delay_secs: u32) -> Self {
        self.redirect_url = url.into();
        self.redirect_delay = delay_secs;
        self
    }

    /// Set the not-found title.
    pub fn not_found_title(mut self, title: impl Into<String>) -> Self {
        self.not_found_title = title.into();
        self
    }

    /// Set the success title and message.
    pub fn success(mut self, title: impl Into<String>, message: impl Into<String>) -> Self {
        self.success_title = title.into();
        self.success_message = message.into();
        self
    }

    /// Refuse to delete the row whose id equals `acting_id`.
    pub fn prevent_self_delete(mut self, acting_id: Option<i64>) -> Self {
        self.prevent_self_delete = acting_id;
        self
    }

    fn success_notice(&self) -> Notice {
        Notice {
            title: self.success_title.clone(),
            message: self.success_message.clone(),
            redirect: (!self.redirect_url.is_empty()).then(|| Redirect {
                url: self.redirect_url.clone(),
                delay_secs: self.redirect_delay,
            }),
        }
    }
}

/// Delete a row after the self-delete and existence checks.
///
/// 1. `prevent_self_delete == Some(id)`: [`DeleteOutcome::CannotDeleteSelf`], no query.
/// 2. Row missing: [`DeleteOutcome::NotFound`], the DELETE is never issued.
/// 3. Otherwise the DELETE runs and [`DeleteOutcome::Deleted`] is reported
///    without re-checking the affected row count.
///
/// Only the `Deleted` notice carries the redirect.
pub fn delete_entity<D: Database>(db: &D, request: &DeleteRequest) -> Result<DeleteOutcome> {
    if request.prevent_self_delete == Some(request.id) {
        crate::log!(warn, "self delete refused", table: &request.table, id: request.id);
        return Ok(DeleteOutcome::CannotDeleteSelf(Notice {
            title: CANNOT_DELETE_SELF_MESSAGE.to_string(),
            message: String::new(),
            redirect: None,
        }));
    }

    if !record_exists(db, &request.table, &request.id_column, request.id)? {
        return Ok(DeleteOutcome::NotFound(Notice {
            title: request.not_found_title.clone(),
            message: String::new(),
            redirect: None,
        }));
    }

    delete_by_id(db, &request.table, &request.id_column, request.id)?;
    crate::log!(info, "record deleted", table: &request.table, id: request.id);

    Ok(DeleteOutcome::Deleted(request.success_notice()))
}
