// src/cli/mod.rs
// CLI definition for the expense-gateway binary

use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub mod run;

pub use run::run;

#[derive(Parser)]
#[command(name = "expense-gateway")]
#[command(about = "Command-line client for the expense tracker API")]
#[command(version)]
pub struct Cli {
    /// Config file (default: ~/.expense-gateway/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Backend base URL, overrides config and environment
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Per-request timeout in milliseconds
    #[arg(long, global = true)]
    pub timeout_ms: Option<u64>,

    /// Log in as this user before running the command
    #[arg(long, global = true, env = "EXPENSE_GATEWAY_USERNAME")]
    pub login_as: Option<String>,

    /// Password for --login-as
    #[arg(long, global = true, env = "EXPENSE_GATEWAY_PASSWORD", hide_env_values = true)]
    pub login_password: Option<String>,

    /// Debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Check whether the session is logged in
    Status,

    /// Print the CSRF token (fetching it if needed)
    Csrf,

    /// Log in with --login-as/--login-password and report the session status
    Login,

    /// End the session
    Logout,

    /// Create a new (inactive) account
    Register {
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
        #[arg(long)]
        password: String,
        /// Confirmation (defaults to --password)
        #[arg(long)]
        password2: Option<String>,
    },

    /// Send a new activation link
    ResendActivation {
        #[arg(long)]
        username: String,
    },

    /// Activate an account from its activation link parameters
    Activate {
        #[arg(long)]
        uid: String,
        #[arg(long)]
        token: String,
    },

    /// Request a password reset e-mail
    ResetPassword {
        #[arg(long)]
        email: String,
    },

    /// Set a new password with a reset token
    ConfirmReset {
        #[arg(long)]
        token: String,
        #[arg(long)]
        password: String,
    },

    /// List expense categories
    Categories,

    /// Manage expenses
    Expenses {
        #[command(subcommand)]
        action: ExpenseAction,
    },

    /// Current month's totals per category
    Summary,

    /// Moderator user management
    Users {
        #[command(subcommand)]
        action: UserAction,
    },

    /// Show the resolved configuration and validation report
    Config,
}

#[derive(Subcommand)]
pub enum ExpenseAction {
    /// List expenses
    List {
        /// Group by date, newest first
        #[arg(long)]
        by_date: bool,
    },
    /// Show one expense
    Show { id: i64 },
    /// Create an expense
    Add {
        #[arg(long)]
        amount: String,
        #[arg(long)]
        category: Option<i64>,
        /// YYYY-MM-DD, defaults to today on the server
        #[arg(long)]
        date: Option<chrono::NaiveDate>,
    },
    /// Change fields of an expense
    Update {
        id: i64,
        #[arg(long)]
        amount: Option<String>,
        #[arg(long)]
        category: Option<i64>,
        #[arg(long)]
        date: Option<chrono::NaiveDate>,
    },
    /// Delete an expense
    Delete { id: i64 },
}

#[derive(Subcommand)]
pub enum UserAction {
    /// List users
    List,
    /// Show one user
    Show { id: i64 },
    /// Delete a user
    Delete { id: i64 },
}
