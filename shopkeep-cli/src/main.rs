//! `shopkeep` - command-line admin for the shopkeep panel.
//!
//! ```bash
//! shopkeep init
//! shopkeep users add --username alice --email alice@shop.test --password Secret1 --group 1
//! shopkeep categories add --name Books --order 2
//! shopkeep dashboard
//! ```
//!
//! Settings come from `--config <file>` and the `SHOPKEEP_*` environment
//! variables. Rejected forms print one message per line and exit with
//! status 1.

use std::fmt::Display;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use shopkeep::categories::{self, CategoryDelete, CategoryForm};
use shopkeep::db::SqliteDatabase;
use shopkeep::records::{Notice, Page};
use shopkeep::users::{self, Login, UserForm};
use shopkeep::validation::{Submission, Validator};
use shopkeep::{Config, log};

#[derive(Parser, Debug)]
#[command(author, version, about = "Admin tasks for the shopkeep e-commerce panel")]
struct Cli {
    /// TOML configuration file
    #[arg(long, short, value_name = "PATH", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create the users and categories tables if missing
    Init,
    /// Pending registrations and latest users
    Dashboard,
    /// Manage users
    #[command(subcommand)]
    Users(UsersCommand),
    /// Manage categories
    #[command(subcommand)]
    Categories(CategoriesCommand),
}

#[derive(Subcommand, Debug)]
enum UsersCommand {
    /// List users, newest first
    List {
        /// One-based page number; lists everyone when omitted
        #[arg(long)]
        page: Option<i64>,
    },
    /// Add a user
    Add {
        #[command(flatten)]
        profile: UserArgs,
        /// Plain-text password
        #[arg(long)]
        password: String,
    },
    /// Edit a user's profile and flags
    Edit {
        /// User id
        id: i64,
        #[command(flatten)]
        profile: UserArgs,
    },
    /// Delete a user
    Delete {
        /// User id
        id: i64,
        /// Id of the acting admin; deleting it is refused
        #[arg(long = "as-user", value_name = "ID")]
        acting: Option<i64>,
    },
    /// Check admin credentials
    Login {
        /// Email address
        #[arg(long)]
        email: String,
        /// Password
        #[arg(long)]
        password: String,
    },
}

#[derive(Args, Debug)]
struct UserArgs {
    /// Login name
    #[arg(long)]
    username: String,
    /// Email address
    #[arg(long)]
    email: String,
    /// Display name
    #[arg(long, default_value = "")]
    full_name: String,
    /// Group id (1 = admin)
    #[arg(long, default_value_t = 0)]
    group: i64,
    /// Trust status (0 or 1)
    #[arg(long, default_value_t = 0)]
    trust: i64,
    /// Registration status (0 = pending, 1 = approved)
    #[arg(long, default_value_t = 0)]
    reg: i64,
}

impl UserArgs {
    fn into_form(self) -> UserForm {
        UserForm::new(self.username, self.email)
            .full_name(self.full_name)
            .flags(self.group, self.trust, self.reg)
    }
}

#[derive(Subcommand, Debug)]
enum CategoriesCommand {
    /// List categories, parents followed by their children
    List,
    /// List top-level categories
    Parents,
    /// Add a category
    Add(CategoryArgs),
    /// Edit a category
    Edit {
        /// Category id
        id: i64,
        #[command(flatten)]
        fields: CategoryArgs,
    },
    /// Delete a category without subcategories
    Delete {
        /// Category id
        id: i64,
    },
    /// Show or hide a category
    Toggle {
        /// Category id
        id: i64,
    },
}

#[derive(Args, Debug)]
struct CategoryArgs {
    /// Category name
    #[arg(long)]
    name: String,
    /// Description
    #[arg(long, default_value = "")]
    description: String,
    /// Parent category id (0 = top level)
    #[arg(long, default_value_t = 0)]
    parent: i64,
    /// Sort order, 0 to 255
    #[arg(long, default_value = "0")]
    order: String,
    /// Visibility (0 = hidden, 1 = visible)
    #[arg(long, default_value_t = 1)]
    visibility: i64,
}

impl CategoryArgs {
    fn into_form(self) -> CategoryForm {
        CategoryForm::new(self.name)
            .description(self.description)
            .parent(self.parent)
            .order(self.order)
            .visibility(self.visibility)
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            log!(error, "command failed", error: format!("{err:#}"));
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        },
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    let config = Config::load(cli.config.as_deref()).context("loading configuration")?;
    log::set_min_level(config.log_level);

    let db = SqliteDatabase::open(&config.database)
        .with_context(|| format!("opening {}", config.database.display()))?;
    let validator = Validator::new();

    match cli.command {
        Command::Init => {
            db.initialize_schema()?;
            println!("schema ready in {}", config.database.display());
            Ok(ExitCode::SUCCESS)
        },
        Command::Dashboard => dashboard(&db, &config),
        Command::Users(command) => run_users(&db, &validator, &config, command),
        Command::Categories(command) => run_categories(&db, &validator, command),
    }
}

fn dashboard(db: &SqliteDatabase, config: &Config) -> Result<ExitCode> {
    println!("pending registrations: {}", users::pending_count(db)?);
    println!("latest users:");
    for user in users::latest_users(db, config.latest_users)? {
        println!("  {}  {}  {}", user.registration_date, user.username, user.email);
    }
    Ok(ExitCode::SUCCESS)
}

fn run_users(
    db: &SqliteDatabase,
    validator: &Validator,
    config: &Config,
    command: UsersCommand,
) -> Result<ExitCode> {
    match command {
        UsersCommand::List { page } => {
            let page = page.map(|n| Page::number(n, config.page_size));
            for user in users::list_users(db, page)? {
                println!(
                    "{:>5}  {:<20} {:<30} {:<8} {:<10} {}",
                    user.id,
                    user.username,
                    user.email,
                    if user.is_admin() { "admin" } else { "user" },
                    if user.trust_status.is_set() { "trusted" } else { "untrusted" },
                    if user.reg_status.is_set() { "approved" } else { "pending" },
                );
            }
            Ok(ExitCode::SUCCESS)
        },
        UsersCommand::Add { profile, password } => {
            let form = profile.into_form().password(password);
            Ok(report("user created with id", users::insert_user(db, validator, &form)?))
        },
        UsersCommand::Edit { id, profile } => {
            let saved = users::update_user(db, validator, id, &profile.into_form())?;
            Ok(report_update("user", id, saved))
        },
        UsersCommand::Delete { id, acting } => {
            let outcome = users::delete_user(db, id, acting)?;
            print_notice(outcome.notice());
            Ok(exit_code(outcome.is_deleted()))
        },
        UsersCommand::Login { email, password } => match users::authenticate(db, &email, &password)? {
            Login::Granted(session) => {
                println!("signed in as {} (id {})", session.username, session.user_id);
                Ok(ExitCode::SUCCESS)
            },
            refused => {
                eprintln!("{}", refused.message().unwrap_or_default());
                Ok(ExitCode::FAILURE)
            },
        },
    }
}

fn run_categories(
    db: &SqliteDatabase,
    validator: &Validator,
    command: CategoriesCommand,
) -> Result<ExitCode> {
    match command {
        CategoriesCommand::List => {
            for category in categories::list_categories(db)? {
                let name = match &category.parent_name {
                    Some(parent) => format!("{parent} / {}", category.name),
                    None => category.name.clone(),
                };
                println!(
                    "{:>5}  {:<40} order {:<3} {}",
                    category.id,
                    name,
                    category.order,
                    if category.visibility.is_set() { "visible" } else { "hidden" },
                );
            }
            Ok(ExitCode::SUCCESS)
        },
        CategoriesCommand::Parents => {
            for option in categories::parent_options(db)? {
                println!("{:>5}  {}", option.id, option.name);
            }
            Ok(ExitCode::SUCCESS)
        },
        CategoriesCommand::Add(fields) => {
            let form = fields.into_form();
            Ok(report(
                "category created with id",
                categories::insert_category(db, validator, &form)?,
            ))
        },
        CategoriesCommand::Edit { id, fields } => {
            let saved = categories::update_category(db, validator, id, &fields.into_form())?;
            Ok(report_update("category", id, saved))
        },
        CategoriesCommand::Delete { id } => {
            let outcome = categories::delete_category(db, id)?;
            print_notice(outcome.notice());
            let deleted = matches!(&outcome, CategoryDelete::Outcome(o) if o.is_deleted());
            Ok(exit_code(deleted))
        },
        CategoriesCommand::Toggle { id } => match categories::toggle_visibility(db, id)? {
            Some(visibility) => {
                let state = if visibility.is_set() { "visible" } else { "hidden" };
                println!("category {id} is now {state}");
                Ok(ExitCode::SUCCESS)
            },
            None => {
                eprintln!("category {id} not found");
                Ok(ExitCode::FAILURE)
            },
        },
    }
}

fn report<T: Display>(label: &str, submission: Submission<T>) -> ExitCode {
    match submission {
        Submission::Saved(value) => {
            println!("{label} {value}");
            ExitCode::SUCCESS
        },
        Submission::Rejected(errors) => {
            eprintln!("{errors}");
            ExitCode::FAILURE
        },
    }
}

fn report_update(what: &str, id: i64, submission: Submission<bool>) -> ExitCode {
    match submission {
        Submission::Saved(true) => {
            println!("{what} {id} updated");
            ExitCode::SUCCESS
        },
        Submission::Saved(false) => {
            eprintln!("{what} {id} not found");
            ExitCode::FAILURE
        },
        Submission::Rejected(errors) => {
            eprintln!("{errors}");
            ExitCode::FAILURE
        },
    }
}

fn print_notice(notice: &Notice) {
    println!("{}", notice.title);
    if !notice.message.is_empty() {
        println!("{}", notice.message);
    }
}

const fn exit_code(success: bool) -> ExitCode {
    if success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
