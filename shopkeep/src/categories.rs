//! Category administration.
//!
//! Categories form a two-level tree: a category either has no parent or
//! points at a top-level one. `parent_id = 0` in a form means "no parent"
//! and is stored as `NULL`.

use std::collections::HashMap;

use shopkeep_sql::{Aggregate, AggregateFunc, Record, Select, SortDir, Value};

use crate::db::Database;
use crate::records::{self, DeleteOutcome, DeleteRequest, Notice, Redirect, row_int, row_text};
use crate::status::Visibility;
use crate::validation::{
    FieldRules, Rule, Submission, UniqueCheck, ValidationErrors, Validator, Violation,
};
use crate::{Error, Result};

/// Table name.
pub const TABLE: &str = "categories";
/// Primary key column.
pub const ID_COLUMN: &str = "id";
/// Where category pages return after a delete.
pub const MANAGE_URL: &str = "categories.php?do=Manage";
/// Largest accepted sort order.
pub const MAX_ORDER: i64 = 255;

/// Parent id that does not match a row.
pub const MISSING_PARENT_MESSAGE: &str = "Selected parent category does not exist.";
/// Parent id equal to the category's own id.
pub const OWN_PARENT_MESSAGE: &str = "Category cannot be its own parent.";
/// Sort order outside `0..=MAX_ORDER`.
pub const ORDER_RANGE_MESSAGE: &str = "Order must be between 0 and 255.";
/// Delete refused because children exist.
pub const HAS_SUBCATEGORIES_MESSAGE: &str =
    "This category has subcategories. Delete or move them first.";

const COLUMNS: &[&str] = &[
    "id",
    "name",
    "description",
    "parent_id",
    "order",
    "visibility",
    "created_at",
    "updated_at",
];

/// A category row with its parent's name resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    /// Primary key.
    pub id: i64,
    /// Display name, unique.
    pub name: String,
    /// Free text.
    pub description: String,
    /// Parent category, `None` for top-level ones.
    pub parent_id: Option<i64>,
    /// Name of the parent category.
    pub parent_name: Option<String>,
    /// Sort order among siblings.
    pub order: i64,
    /// Storefront visibility.
    pub visibility: Visibility,
    /// Creation time.
    pub created_at: String,
    /// Last update time.
    pub updated_at: String,
}

impl Category {
    /// Whether this is a top-level category.
    #[must_use]
    pub const fn is_top_level(&self) -> bool {
        self.parent_id.is_none()
    }

    fn from_record(row: &Record, parent_name: Option<String>) -> Result<Self> {
        let visibility = Visibility::try_from(row_int(row, TABLE, "visibility")?)
            .map_err(|e| Error::malformed_row(TABLE, e.to_string()))?;
        Ok(Self {
            id: row_int(row, TABLE, ID_COLUMN)?,
            name: row_text(row, "name"),
            description: row_text(row, "description"),
            parent_id: row.get_int("parent_id"),
            parent_name,
            order: row_int(row, TABLE, "order")?,
            visibility,
            created_at: row_text(row, "created_at"),
            updated_at: row_text(row, "updated_at"),
        })
    }
}

/// Entry of the parent selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParentOption {
    /// Category id.
    pub id: i64,
    /// Category name.
    pub name: String,
}

/// Add/edit category form as submitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryForm {
    /// Display name.
    pub name: String,
    /// Free text.
    pub description: String,
    /// Parent id; `0` means top-level.
    pub parent_id: i64,
    /// Sort order as typed. Empty means `0`.
    pub order: String,
    /// Raw visibility flag, must be `0` or `1`.
    pub visibility: i64,
}

impl Default for CategoryForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            parent_id: 0,
            order: String::new(),
            visibility: Visibility::Visible.as_i64(),
        }
    }
}

impl CategoryForm {
    /// Visible top-level category with this name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Set the description.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the parent id (`0` for none).
    #[must_use]
    pub const fn parent(mut self, parent_id: i64) -> Self {
        self.parent_id = parent_id;
        self
    }

    /// Set the sort order text.
    #[must_use]
    pub fn order(mut self, order: impl Into<String>) -> Self {
        self.order = order.into();
        self
    }

    /// Set the raw visibility flag.
    #[must_use]
    pub const fn visibility(mut self, visibility: i64) -> Self {
        self.visibility = visibility;
        self
    }

    fn parent_ref(&self) -> Option<i64> {
        (self.parent_id != 0).then_some(self.parent_id)
    }

    /// Parsed order, `None` when it is not an integer.
    fn order_value(&self) -> Option<i64> {
        let order = self.order.trim();
        if order.is_empty() {
            return Some(0);
        }
        order.parse().ok()
    }

    fn to_record(&self) -> Record {
        Record::new()
            .with("name", self.name.trim())
            .with("description", self.description.trim())
            .with("parent_id", self.parent_ref())
            .with("order", self.order_value().unwrap_or(0))
            .with("visibility", self.visibility)
    }

    fn validation_data(&self) -> Record {
        Record::new()
            .with("name", self.name.as_str())
            .with("description", self.description.as_str())
            .with("order", self.order.as_str())
    }
}

fn form_rules() -> FieldRules {
    FieldRules::new()
        .field("name", [Rule::Required, Rule::Min(2), Rule::Max(100)])
        .field("description", [Rule::Max(1000)])
        .field("order", [Rule::custom("numeric")])
}

/// Rules, uniqueness, order range, parent and visibility checks.
/// `id` is the category being edited, `None` on insert.
fn validate_form<D: Database>(
    db: &D,
    validator: &Validator,
    form: &CategoryForm,
    id: Option<i64>,
) -> Result<ValidationErrors> {
    let unique = [UniqueCheck::new("name", TABLE, ID_COLUMN).excluding(id)];
    let mut errors = validator.validate(db, &form.validation_data(), &form_rules(), &unique)?;

    // Digits too long for i64 pass `numeric` but are still out of range.
    let out_of_range = match form.order_value() {
        Some(order) => !(0..=MAX_ORDER).contains(&order),
        None => !errors.contains("order"),
    };
    if out_of_range {
        errors.push(Violation::custom("order", "range", ORDER_RANGE_MESSAGE));
    }

    if let Some(parent) = form.parent_ref() {
        if !records::record_exists(db, TABLE, ID_COLUMN, parent)? {
            errors.push(Violation::custom("parent_id", "parent", MISSING_PARENT_MESSAGE));
        }
        if id == Some(parent) {
            errors.push(Violation::custom("parent_id", "parent", OWN_PARENT_MESSAGE));
        }
    }

    if let Err(e) = Visibility::try_from(form.visibility) {
        errors.push(Violation::custom("visibility", "status", e.message));
    }
    Ok(errors)
}

/// Every category, each parent followed by its children.
///
/// Rows are grouped by `coalesce(parent_id, id)`; inside a group the
/// parent comes first, then children by order and name.
pub fn list_categories<D: Database>(db: &D) -> Result<Vec<Category>> {
    let rows = records::select_records(db, &Select::table(TABLE).columns(COLUMNS).unlimited())?;

    let names: HashMap<i64, String> = rows
        .iter()
        .filter_map(|row| Some((row.get_int(ID_COLUMN)?, row_text(row, "name"))))
        .collect();

    let mut categories = rows
        .iter()
        .map(|row| {
            let parent_name = row
                .get_int("parent_id")
                .and_then(|parent| names.get(&parent).cloned());
            Category::from_record(row, parent_name)
        })
        .collect::<Result<Vec<_>>>()?;

    categories.sort_by(|a, b| {
        let key = |c: &Category| (c.parent_id.unwrap_or(c.id), c.parent_id.is_some(), c.order);
        key(a).cmp(&key(b)).then_with(|| a.name.cmp(&b.name))
    });
    Ok(categories)
}

/// Top-level categories by name, for the parent selector.
pub fn parent_options<D: Database>(db: &D) -> Result<Vec<ParentOption>> {
    let select = Select::table(TABLE)
        .columns(&["id", "name"])
        .filter_eq("parent_id", Value::Null)
        .order_by("name", SortDir::Asc)
        .unlimited();
    records::select_records(db, &select)?
        .iter()
        .map(|row| {
            Ok(ParentOption {
                id: row_int(row, TABLE, ID_COLUMN)?,
                name: row_text(row, "name"),
            })
        })
        .collect()
}

/// One category by id.
pub fn find_category<D: Database>(db: &D, id: i64) -> Result<Option<Category>> {
    let Some(row) = records::select_one_by_id(db, TABLE, ID_COLUMN, id, COLUMNS)? else {
        return Ok(None);
    };
    let parent_name = match row.get_int("parent_id") {
        Some(parent) => records::select_one_by_id(db, TABLE, ID_COLUMN, parent, &["name"])?
            .map(|p| row_text(&p, "name")),
        None => None,
    };
    Category::from_record(&row, parent_name).map(Some)
}

/// Validate and create a category. Returns the new id.
pub fn insert_category<D: Database>(
    db: &D,
    validator: &Validator,
    form: &CategoryForm,
) -> Result<Submission<i64>> {
    let errors = validate_form(db, validator, form, None)?;
    if !errors.is_empty() {
        return Ok(Submission::Rejected(errors));
    }

    let now = records::current_timestamp();
    let row = form
        .to_record()
        .with("created_at", now.as_str())
        .with("updated_at", now);
    let id = records::insert_record(db, TABLE, row, &[ID_COLUMN])?;
    crate::log!(info, "category created", id: id, name: form.name.trim());
    Ok(Submission::Saved(id))
}

/// Validate and update a category. `created_at` is never rewritten.
pub fn update_category<D: Database>(
    db: &D,
    validator: &Validator,
    id: i64,
    form: &CategoryForm,
) -> Result<Submission<bool>> {
    let errors = validate_form(db, validator, form, Some(id))?;
    if !errors.is_empty() {
        return Ok(Submission::Rejected(errors));
    }

    let row = form
        .to_record()
        .with("updated_at", records::current_timestamp());
    let updated = records::update_record(db, TABLE, row, ID_COLUMN, id, &["created_at"])?;
    crate::log!(info, "category updated", id: id, found: updated);
    Ok(Submission::Saved(updated))
}

/// Whether any category names `id` as its parent.
pub fn has_subcategories<D: Database>(db: &D, id: i64) -> Result<bool> {
    let count = Aggregate::new(TABLE, AggregateFunc::Count, ID_COLUMN).filter_eq("parent_id", id);
    Ok(records::aggregate(db, &count)?
        .and_then(|v| v.as_int())
        .is_some_and(|n| n > 0))
}

/// Result of [`delete_category`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryDelete {
    /// Children exist; nothing was deleted.
    HasSubcategories(Notice),
    /// The regular delete flow ran.
    Outcome(DeleteOutcome),
}

impl CategoryDelete {
    /// The notice to render.
    #[must_use]
    pub const fn notice(&self) -> &Notice {
        match self {
            Self::HasSubcategories(notice) => notice,
            Self::Outcome(outcome) => outcome.notice(),
        }
    }
}

/// Delete a category that has no children.
pub fn delete_category<D: Database>(db: &D, id: i64) -> Result<CategoryDelete> {
    if has_subcategories(db, id)? {
        crate::log!(warn, "category delete refused", id: id, reason: "has subcategories");
        return Ok(CategoryDelete::HasSubcategories(Notice {
            title: HAS_SUBCATEGORIES_MESSAGE.to_string(),
            message: String::new(),
            redirect: Some(Redirect {
                url: MANAGE_URL.to_string(),
                delay_secs: records::DEFAULT_REDIRECT_DELAY,
            }),
        }));
    }

    let request = DeleteRequest::new(TABLE, ID_COLUMN, id)
        .redirect(MANAGE_URL, records::DEFAULT_REDIRECT_DELAY)
        .not_found_title("Category not found")
        .success("Category deleted", "The category was deleted successfully.");
    records::delete_entity(db, &request).map(CategoryDelete::Outcome)
}

/// Flip a category's visibility. Returns the new value, or `None` when the
/// category does not exist.
pub fn toggle_visibility<D: Database>(db: &D, id: i64) -> Result<Option<Visibility>> {
    let Some(row) = records::select_one_by_id(db, TABLE, ID_COLUMN, id, &["visibility"])? else {
        return Ok(None);
    };
    let current = Visibility::try_from(row_int(&row, TABLE, "visibility")?)
        .map_err(|e| Error::malformed_row(TABLE, e.to_string()))?;
    let next = current.toggled();
    records::update_status(db, TABLE, ID_COLUMN, id, "visibility", next)?;
    crate::log!(info, "category visibility changed", id: id, visible: next.is_set());
    Ok(Some(next))
}
