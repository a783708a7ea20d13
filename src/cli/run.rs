// src/cli/run.rs
// Command dispatch for the expense-gateway binary

use super::{Cli, Commands, ExpenseAction, UserAction};
use crate::api::{auth, expenses, moderator, summary};
use crate::config::GatewayConfig;
use crate::error::GatewayError;
use crate::gateway::{Session, SessionGateway};
use anyhow::{Context, Result, bail};
use serde::Serialize;
use std::time::Duration;
use tracing::warn;

/// Defaults < config file < environment < command-line flags
fn resolve_config(cli: &Cli) -> GatewayConfig {
    let mut config = GatewayConfig::load(cli.config.as_deref());
    if let Some(url) = &cli.base_url {
        config.base_url = url.clone();
    }
    if let Some(ms) = cli.timeout_ms {
        config.timeout = Duration::from_millis(ms);
    }
    config
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn login(gateway: &SessionGateway, username: &str, password: &str) -> Result<()> {
    match auth::login(gateway, username, password).await {
        Ok(_) => Ok(()),
        Err(GatewayError::Api(err)) if err.needs_activation() => bail!(
            "{}\nRun `expense-gateway resend-activation --username {}` to get a new link.",
            err.message,
            username
        ),
        Err(e) => Err(e).context("login failed"),
    }
}

pub async fn run(cli: Cli) -> Result<()> {
    let config = resolve_config(&cli);
    let validation = config.validate();

    if let Commands::Config = cli.command {
        println!("base_url:    {}", config.base_url);
        println!("timeout_ms:  {}", config.timeout.as_millis());
        println!("csrf_cookie: {}", config.csrf_cookie);
        println!("messages:    {} translations", config.messages.len());
        println!();
        println!("{}", validation.report());
        return Ok(());
    }

    if !validation.is_valid() {
        bail!("invalid configuration\n{}", validation.report());
    }
    for warning in validation.warnings() {
        warn!(key = warning.key, "{}", warning.message);
    }

    let gateway = SessionGateway::new(config, Session::new())?;

    if let Some(username) = &cli.login_as {
        let Some(password) = &cli.login_password else {
            bail!("--login-as requires --login-password (or EXPENSE_GATEWAY_PASSWORD)");
        };
        login(&gateway, username, password).await?;
    } else if let Commands::Login = cli.command {
        bail!("login needs --login-as and --login-password");
    }

    match cli.command {
        Commands::Status | Commands::Login => print_json(&auth::is_logged_in(&gateway).await?)?,
        Commands::Csrf => println!("{}", auth::csrf_token(&gateway).await?),
        Commands::Logout => print_json(&auth::logout(&gateway).await?)?,
        Commands::Register {
            username,
            email,
            first_name,
            last_name,
            password,
            password2,
        } => {
            let request = auth::RegisterRequest {
                username,
                email,
                first_name,
                last_name,
                password2: password2.unwrap_or_else(|| password.clone()),
                password,
            };
            print_json(&auth::register(&gateway, &request).await?)?;
        }
        Commands::ResendActivation { username } => {
            print_json(&auth::resend_activation(&gateway, &username).await?)?
        }
        Commands::Activate { uid, token } => {
            print_json(&auth::activate(&gateway, &uid, &token).await?)?
        }
        Commands::ResetPassword { email } => {
            print_json(&auth::reset_password(&gateway, &email).await?)?
        }
        Commands::ConfirmReset { token, password } => {
            print_json(&auth::confirm_reset_password(&gateway, &token, &password).await?)?
        }
        Commands::Categories => print_json(&expenses::categories(&gateway).await?)?,
        Commands::Expenses { action } => run_expenses(&gateway, action).await?,
        Commands::Summary => print_json(&summary::monthly(&gateway).await?)?,
        Commands::Users { action } => run_users(&gateway, action).await?,
        Commands::Config => {}
    }

    Ok(())
}

async fn run_expenses(gateway: &SessionGateway, action: ExpenseAction) -> Result<()> {
    match action {
        ExpenseAction::List { by_date } => {
            let list = expenses::list(gateway).await?;
            if by_date {
                print_json(&expenses::group_by_date(&list))
            } else {
                print_json(&list)
            }
        }
        ExpenseAction::Show { id } => print_json(&expenses::get(gateway, id).await?),
        ExpenseAction::Add { amount, category, date } => {
            let expense = expenses::NewExpense { category, amount, date };
            print_json(&expenses::create(gateway, &expense).await?)
        }
        ExpenseAction::Update {
            id,
            amount,
            category,
            date,
        } => {
            let changes = expenses::ExpenseUpdate { category, amount, date };
            if changes.is_empty() {
                bail!("nothing to update: pass --amount, --category or --date");
            }
            print_json(&expenses::update(gateway, id, &changes).await?)
        }
        ExpenseAction::Delete { id } => {
            expenses::delete(gateway, id).await?;
            println!("Deleted expense {}", id);
            Ok(())
        }
    }
}

async fn run_users(gateway: &SessionGateway, action: UserAction) -> Result<()> {
    match action {
        UserAction::List => print_json(&moderator::users(gateway).await?),
        UserAction::Show { id } => print_json(&moderator::user(gateway, id).await?),
        UserAction::Delete { id } => {
            moderator::delete_user(gateway, id).await?;
            println!("Deleted user {}", id);
            Ok(())
        }
    }
}
