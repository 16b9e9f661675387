//! User administration: listings, dashboard figures, the add/edit forms,
//! deletion and admin login.

use shopkeep_sql::{Aggregate, Record, Select, SortDir};

use crate::db::Database;
use crate::password::{hash_password, verify_password};
use crate::records::{self, DeleteOutcome, DeleteRequest, Page, row_int, row_text};
use crate::status::{RegStatus, TrustStatus};
use crate::validation::{
    FieldRules, Rule, Submission, UniqueCheck, ValidationErrors, Validator, Violation,
};
use crate::{Error, Result};

/// Table name.
pub const TABLE: &str = "users";
/// Primary key column.
pub const ID_COLUMN: &str = "user_id";
/// Group whose members may sign in to the admin panel.
pub const ADMIN_GROUP_ID: i64 = 1;
/// Where user pages return after a delete.
pub const MANAGE_URL: &str = "users.php?do=Manage";
/// Recent users shown on the dashboard.
pub const DEFAULT_LATEST_USERS: i64 = 5;

/// Refused login: unknown email or wrong password.
pub const INVALID_CREDENTIALS_MESSAGE: &str = "Invalid email or password.";
/// Refused login: valid credentials outside the admin group.
pub const NOT_ADMIN_MESSAGE: &str = "Access denied: Admins only.";

const LIST_COLUMNS: &[&str] = &[
    "user_id",
    "username",
    "email",
    "full_name",
    "group_id",
    "trust_status",
    "reg_status",
    "registration_date",
];

/// A user row without its password hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// Primary key.
    pub id: i64,
    /// Login name.
    pub username: String,
    /// Email address, also the login key.
    pub email: String,
    /// Display name.
    pub full_name: String,
    /// Group; [`ADMIN_GROUP_ID`] marks administrators.
    pub group_id: i64,
    /// Trust flag.
    pub trust_status: TrustStatus,
    /// Registration approval.
    pub reg_status: RegStatus,
    /// When the account was created.
    pub registration_date: String,
}

impl User {
    /// Whether the user belongs to the admin group.
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        self.group_id == ADMIN_GROUP_ID
    }

    fn from_record(row: &Record) -> Result<Self> {
        let trust = row_int(row, TABLE, "trust_status")?;
        let reg = row_int(row, TABLE, "reg_status")?;
        Ok(Self {
            id: row_int(row, TABLE, ID_COLUMN)?,
            username: row_text(row, "username"),
            email: row_text(row, "email"),
            full_name: row_text(row, "full_name"),
            group_id: row_int(row, TABLE, "group_id")?,
            trust_status: TrustStatus::try_from(trust)
                .map_err(|e| Error::malformed_row(TABLE, e.to_string()))?,
            reg_status: RegStatus::try_from(reg)
                .map_err(|e| Error::malformed_row(TABLE, e.to_string()))?,
            registration_date: row_text(row, "registration_date"),
        })
    }
}

/// Dashboard entry for a recently registered user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecentUser {
    /// Login name.
    pub username: String,
    /// Email address.
    pub email: String,
    /// When the account was created.
    pub registration_date: String,
}

/// Add/edit user form as submitted.
///
/// Text fields are trimmed before they are validated or stored. The
/// password is only read by [`insert_user`]; editing a user never touches
/// the stored hash.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserForm {
    /// Login name.
    pub username: String,
    /// Email address.
    pub email: String,
    /// Display name.
    pub full_name: String,
    /// Plain-text password.
    pub password: String,
    /// Group id.
    pub group_id: i64,
    /// Raw trust flag, must be `0` or `1`.
    pub trust_status: i64,
    /// Raw registration flag, must be `0` or `1`.
    pub reg_status: i64,
}

impl UserForm {
    /// Form with a username and email; everything else defaults.
    pub fn new(username: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            email: email.into(),
            ..Self::default()
        }
    }

    /// Set the password.
    #[must_use]
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = password.into();
        self
    }

    /// Set the display name.
    #[must_use]
    pub fn full_name(mut self, full_name: impl Into<String>) -> Self {
        self.full_name = full_name.into();
        self
    }

    /// Set the group and status flags.
    #[must_use]
    pub const fn flags(mut self, group_id: i64, trust_status: i64, reg_status: i64) -> Self {
        self.group_id = group_id;
        self.trust_status = trust_status;
        self.reg_status = reg_status;
        self
    }

    /// Storable columns, password excluded.
    fn to_record(&self) -> Record {
        Record::new()
            .with("username", self.username.trim())
            .with("email", self.email.trim())
            .with("full_name", self.full_name.trim())
            .with("group_id", self.group_id)
            .with("trust_status", self.trust_status)
            .with("reg_status", self.reg_status)
    }

    fn status_errors(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        if let Err(e) = TrustStatus::try_from(self.trust_status) {
            errors.push(Violation::custom("trust_status", "status", e.message));
        }
        if let Err(e) = RegStatus::try_from(self.reg_status) {
            errors.push(Violation::custom("reg_status", "status", e.message));
        }
        errors
    }
}

fn profile_rules() -> FieldRules {
    FieldRules::new()
        .field("username", [Rule::Required, Rule::Min(4), Rule::Max(20)])
        .field("email", [Rule::Required, Rule::Email])
}

fn unique_checks(exclude_id: Option<i64>) -> [UniqueCheck; 2] {
    [
        UniqueCheck::new("username", TABLE, ID_COLUMN).excluding(exclude_id),
        UniqueCheck::new("email", TABLE, ID_COLUMN).excluding(exclude_id),
    ]
}

/// Users newest first. `None` lists everyone.
pub fn list_users<D: Database>(db: &D, page: Option<Page>) -> Result<Vec<User>> {
    let select = Select::table(TABLE)
        .columns(LIST_COLUMNS)
        .order_by(ID_COLUMN, SortDir::Desc);
    let select = match page {
        Some(page) => page.apply(select),
        None => select.unlimited(),
    };
    records::select_records(db, &select)?
        .iter()
        .map(User::from_record)
        .collect()
}

/// One user by id.
pub fn find_user<D: Database>(db: &D, id: i64) -> Result<Option<User>> {
    records::select_one_by_id(db, TABLE, ID_COLUMN, id, LIST_COLUMNS)?
        .as_ref()
        .map(User::from_record)
        .transpose()
}

/// The `limit` most recent registrations.
pub fn latest_users<D: Database>(db: &D, limit: i64) -> Result<Vec<RecentUser>> {
    let select = Select::table(TABLE)
        .columns(&["username", "email", "registration_date"])
        .order_by("registration_date", SortDir::Desc)
        .limit(limit);
    Ok(records::select_records(db, &select)?
        .iter()
        .map(|row| RecentUser {
            username: row_text(row, "username"),
            email: row_text(row, "email"),
            registration_date: row_text(row, "registration_date"),
        })
        .collect())
}

/// Number of users waiting for registration approval.
pub fn pending_count<D: Database>(db: &D) -> Result<i64> {
    let count = Aggregate::count(TABLE).filter_eq("reg_status", RegStatus::Pending);
    Ok(records::aggregate(db, &count)?
        .and_then(|v| v.as_int())
        .unwrap_or(0))
}

/// Validate and create a user. Returns the new id.
///
/// The password must pass `required` and `password_strength`; it is
/// stored salted and hashed. `registration_date` is set to now.
pub fn insert_user<D: Database>(
    db: &D,
    validator: &Validator,
    form: &UserForm,
) -> Result<Submission<i64>> {
    let rules = profile_rules().field("password", [Rule::Required, Rule::PasswordStrength]);
    let data = form.to_record().with("password", form.password.as_str());

    let mut errors = validator.validate(db, &data, &rules, &unique_checks(None))?;
    errors.merge(form.status_errors());
    if !errors.is_empty() {
        return Ok(Submission::Rejected(errors));
    }

    let row = form
        .to_record()
        .with("password", hash_password(form.password.trim()))
        .with("registration_date", records::current_timestamp());
    let id = records::insert_record(db, TABLE, row, &[ID_COLUMN])?;
    crate::log!(info, "user created", user_id: id, username: form.username.trim());
    Ok(Submission::Saved(id))
}

/// Validate and update a user's profile and flags. The password is left
/// as stored.
///
/// Uniqueness ignores the user's own row. Saves report whether the row
/// still existed.
pub fn update_user<D: Database>(
    db: &D,
    validator: &Validator,
    id: i64,
    form: &UserForm,
) -> Result<Submission<bool>> {
    let data = form.to_record();
    let mut errors = validator.validate(db, &data, &profile_rules(), &unique_checks(Some(id)))?;
    errors.merge(form.status_errors());
    if !errors.is_empty() {
        return Ok(Submission::Rejected(errors));
    }

    let updated = records::update_record(db, TABLE, data, ID_COLUMN, id, &[])?;
    crate::log!(info, "user updated", user_id: id, found: updated);
    Ok(Submission::Saved(updated))
}

/// Delete a user. `acting_user_id` is the signed-in account, which can
/// never delete itself.
pub fn delete_user<D: Database>(
    db: &D,
    id: i64,
    acting_user_id: Option<i64>,
) -> Result<DeleteOutcome> {
    let request = DeleteRequest::new(TABLE, ID_COLUMN, id)
        .redirect(MANAGE_URL, 3)
        .not_found_title("User not found")
        .success("User deleted", "The user was deleted successfully.")
        .prevent_self_delete(acting_user_id);
    records::delete_entity(db, &request)
}

/// Signed-in administrator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Account id, used for self-delete protection.
    pub user_id: i64,
    /// Login name.
    pub username: String,
    /// Group id.
    pub group_id: i64,
}

/// Result of [`authenticate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Login {
    /// Credentials match an administrator.
    Granted(Session),
    /// Unknown email or wrong password.
    InvalidCredentials,
    /// Credentials match, but the account is not an administrator.
    NotAdmin,
}

impl Login {
    /// Message for a refused login.
    #[must_use]
    pub const fn message(&self) -> Option<&'static str> {
        match self {
            Self::Granted(_) => None,
            Self::InvalidCredentials => Some(INVALID_CREDENTIALS_MESSAGE),
            Self::NotAdmin => Some(NOT_ADMIN_MESSAGE),
        }
    }
}

/// Check admin credentials by email and password.
///
/// A stored password that is not a readable hash refuses the login like a
/// wrong password would.
pub fn authenticate<D: Database>(db: &D, email: &str, password: &str) -> Result<Login> {
    let email = email.trim();
    let password = password.trim();
    if email.is_empty() || password.is_empty() {
        return Ok(Login::InvalidCredentials);
    }

    let select = Select::table(TABLE)
        .columns(&["user_id", "username", "password", "group_id"])
        .filter_eq("email", email)
        .limit(1);
    let Some(row) = db.fetch_one(&select.build(&db.dialect())?)? else {
        return Ok(Login::InvalidCredentials);
    };

    match verify_password(password, &row_text(&row, "password")) {
        Ok(true) => {},
        Ok(false) => return Ok(Login::InvalidCredentials),
        Err(Error::PasswordHash) => {
            let user_id = row_int(&row, TABLE, ID_COLUMN)?;
            crate::log!(warn, "unreadable password hash", user_id: user_id);
            return Ok(Login::InvalidCredentials);
        },
        Err(e) => return Err(e),
    }

    let session = Session {
        user_id: row_int(&row, TABLE, ID_COLUMN)?,
        username: row_text(&row, "username"),
        group_id: row_int(&row, TABLE, "group_id")?,
    };
    if session.group_id != ADMIN_GROUP_ID {
        crate::log!(warn, "non-admin login refused", user_id: session.user_id);
        return Ok(Login::NotAdmin);
    }
    Ok(Login::Granted(session))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::SqliteDatabase;

    fn db() -> SqliteDatabase {
        let db = SqliteDatabase::open_in_memory().unwrap();
        db.initialize_schema().unwrap();
        db
    }

    fn admin_form() -> UserForm {
        UserForm::new("admin", "admin@shop.test")
            .password("Secret1")
            .full_name("Site Admin")
            .flags(ADMIN_GROUP_ID, 1, 1)
    }

    #[test]
    fn test_insert_and_find() {
        let db = db();
        let validator = Validator::new();
        let id = insert_user(&db, &validator, &admin_form())
            .unwrap()
            .saved()
            .unwrap();

        let user = find_user(&db, id).unwrap().unwrap();
        assert_eq!(user.username, "admin");
        assert_eq!(user.trust_status, TrustStatus::Trusted);
        assert_eq!(user.reg_status, RegStatus::Approved);
        assert!(user.is_admin());
        assert!(!user.registration_date.is_empty());
    }

    #[test]
    fn test_password_is_hashed() {
        let db = db();
        let id = insert_user(&db, &Validator::new(), &admin_form())
            .unwrap()
            .saved()
            .unwrap();
        let row = records::select_one_by_id(&db, TABLE, ID_COLUMN, id, &["password"])
            .unwrap()
            .unwrap();
        let stored = row_text(&row, "password");
        assert_ne!(stored, "Secret1");
        assert!(verify_password("Secret1", &stored).unwrap());
    }

    #[test]
    fn test_insert_rejects_bad_form() {
        let db = db();
        let form = UserForm::new("bob", "not-an-email")
            .password("abcdef")
            .flags(0, 2, 0);
        let Submission::Rejected(errors) = insert_user(&db, &Validator::new(), &form).unwrap() else {
            panic!("expected rejection");
        };
        assert_eq!(
            errors.messages("username"),
            vec!["Username must be at least 4 characters."]
        );
        assert_eq!(errors.messages("email"), vec!["Invalid email format."]);
        assert_eq!(
            errors.messages("password"),
            vec!["Password must include upper, lower case letters and a number."]
        );
        assert_eq!(errors.messages("trust_status"), vec!["Invalid trust status."]);
        assert!(list_users(&db, None).unwrap().is_empty());
    }

    #[test]
    fn test_duplicate_username_and_email() {
        let db = db();
        let validator = Validator::new();
        insert_user(&db, &validator, &admin_form()).unwrap();

        let Submission::Rejected(errors) = insert_user(&db, &validator, &admin_form()).unwrap() else {
            panic!("expected rejection");
        };
        assert_eq!(errors.messages("username"), vec!["Username already in use."]);
        assert_eq!(errors.messages("email"), vec!["Email already in use."]);
    }

    #[test]
    fn test_update_keeps_own_values_and_password() {
        let db = db();
        let validator = Validator::new();
        let id = insert_user(&db, &validator, &admin_form())
            .unwrap()
            .saved()
            .unwrap();

        let form = admin_form().full_name("Renamed").password("");
        assert_eq!(
            update_user(&db, &validator, id, &form).unwrap(),
            Submission::Saved(true)
        );
        assert_eq!(find_user(&db, id).unwrap().unwrap().full_name, "Renamed");
        assert!(matches!(
            authenticate(&db, "admin@shop.test", "Secret1").unwrap(),
            Login::Granted(_)
        ));
    }

    #[test]
    fn test_update_rejects_taken_email() {
        let db = db();
        let validator = Validator::new();
        insert_user(&db, &validator, &admin_form()).unwrap();
        let other = insert_user(
            &db,
            &validator,
            &UserForm::new("carol", "carol@shop.test").password("Secret1"),
        )
        .unwrap()
        .saved()
        .unwrap();

        let form = UserForm::new("carol", "admin@shop.test");
        let outcome = update_user(&db, &validator, other, &form).unwrap();
        assert_eq!(
            outcome.errors().map(|e| e.messages("email")),
            Some(vec!["Email already in use.".to_string()])
        );
    }

    #[test]
    fn test_dashboard_figures() {
        let db = db();
        let validator = Validator::new();
        for (i, reg) in [0, 0, 0, 1, 1].into_iter().enumerate() {
            let form = UserForm::new(format!("user{i}"), format!("user{i}@shop.test"))
                .password("Secret1")
                .flags(0, 0, reg);
            insert_user(&db, &validator, &form).unwrap();
        }
        assert_eq!(pending_count(&db).unwrap(), 3);
        assert_eq!(latest_users(&db, 2).unwrap().len(), 2);
        assert_eq!(list_users(&db, Some(Page::number(2, 2))).unwrap().len(), 2);
        assert_eq!(list_users(&db, None).unwrap()[0].username, "user4");
    }

    #[test]
    fn test_delete_user_refuses_self() {
        let db = db();
        let id = insert_user(&db, &Validator::new(), &admin_form())
            .unwrap()
            .saved()
            .unwrap();
        assert!(matches!(
            delete_user(&db, id, Some(id)).unwrap(),
            DeleteOutcome::CannotDeleteSelf(_)
        ));
        let outcome = delete_user(&db, id, Some(id + 1)).unwrap();
        assert!(outcome.is_deleted());
        assert_eq!(
            outcome.notice().redirect.as_ref().map(|r| r.url.as_str()),
            Some(MANAGE_URL)
        );
        assert!(find_user(&db, id).unwrap().is_none());
    }

    #[test]
    fn test_authenticate() {
        let db = db();
        let validator = Validator::new();
        insert_user(&db, &validator, &admin_form()).unwrap();
        insert_user(
            &db,
            &validator,
            &UserForm::new("dave", "dave@shop.test").password("Secret1"),
        )
        .unwrap();

        let Login::Granted(session) = authenticate(&db, "admin@shop.test", "Secret1").unwrap() else {
            panic!("expected login");
        };
        assert_eq!(session.username, "admin");
        assert_eq!(
            authenticate(&db, "admin@shop.test", "wrong").unwrap(),
            Login::InvalidCredentials
        );
        assert_eq!(
            authenticate(&db, "nobody@shop.test", "Secret1").unwrap(),
            Login::InvalidCredentials
        );
        let refused = authenticate(&db, "dave@shop.test", "Secret1").unwrap();
        assert_eq!(refused, Login::NotAdmin);
        assert_eq!(refused.message(), Some("Access denied: Admins only."));
    }

    #[test]
    fn test_unreadable_hash_refuses_login() {
        let db = db();
        db.connection()
            .execute_batch(
                "INSERT INTO users (username, password, email, group_id, registration_date)
                 VALUES ('legacy', '5f4dcc3b5aa765d61d8327deb882cf99', 'legacy@shop.test', 1, '2025-01-01');",
            )
            .unwrap();
        assert_eq!(
            authenticate(&db, "legacy@shop.test", "password").unwrap(),
            Login::InvalidCredentials
        );
    }

    #[test]
    fn test_malformed_status_row() {
        let db = db();
        db.connection()
            .execute_batch(
                "INSERT INTO users (username, password, email, trust_status, registration_date)
                 VALUES ('eve', 'x', 'eve@shop.test', 7, '2025-01-01');",
            )
            .unwrap();
        assert!(matches!(list_users(&db, None), Err(Error::MalformedRow { .. })));
    }
}
