//! 账号命令：login / signup / logout / whoami

use std::io::{self, IsTerminal, Write};

use colored::Colorize;

use crate::auth::claims::token_expiry;
use crate::auth::{LoginCredentials, SessionPhase, SignupCredentials};
use crate::interfaces::cli::{CliContext, CliError};
use crate::utils::validation::{validate_login, validate_signup};

fn read_password(prompt: &str) -> Result<String, CliError> {
    if !io::stdin().is_terminal() {
        return Err(CliError::CommandError(
            "No password provided. Use --password or run interactively.".to_string(),
        ));
    }

    print!("{}", prompt);
    io::stdout().flush().map_err(|e| CliError::CommandError(e.to_string()))?;
    rpassword::read_password()
        .map_err(|e| CliError::CommandError(format!("Failed to read password: {}", e)))
}

/// 交互式输入密码（带确认）
fn prompt_password_with_confirm() -> Result<(String, String), CliError> {
    let password = read_password("Password: ")?;
    let confirm = read_password("Confirm password: ")?;
    Ok((password, confirm))
}

fn session_failure(ctx: &CliContext, fallback: &str) -> CliError {
    CliError::ApiError(ctx.session.last_error().unwrap_or_else(|| fallback.to_string()))
}

pub async fn login(
    ctx: &CliContext,
    email: String,
    password: Option<String>,
    callback: Option<String>,
) -> Result<(), CliError> {
    let password = match password {
        Some(p) => p,
        None => read_password("Password: ")?,
    };
    let credentials = LoginCredentials::new(email, password);
    validate_login(&credentials)?;

    if ctx.session.login(&credentials, callback.as_deref()).await {
        let user = ctx.session.user();
        println!(
            "{} Logged in as {}",
            "✓".green().bold(),
            user.map(|u| u.email)
                .unwrap_or(credentials.email)
                .cyan()
        );
        Ok(())
    } else {
        Err(session_failure(ctx, "Login failed"))
    }
}

pub async fn signup(
    ctx: &CliContext,
    email: String,
    name: Option<String>,
    password: Option<String>,
) -> Result<(), CliError> {
    let (password, confirm) = match password {
        Some(p) => (p.clone(), p),
        None => prompt_password_with_confirm()?,
    };
    let credentials = SignupCredentials {
        email,
        password,
        name,
    };
    validate_signup(&credentials, &confirm)?;

    if ctx.session.signup(&credentials, None).await {
        println!(
            "{} Account created for {}",
            "✓".green().bold(),
            credentials.email.cyan()
        );
        Ok(())
    } else {
        Err(session_failure(ctx, "Signup failed"))
    }
}

pub fn logout(ctx: &CliContext) -> Result<(), CliError> {
    ctx.session.logout();
    ctx.links.invalidate_all();
    println!("{} Logged out", "✓".green().bold());
    Ok(())
}

pub async fn whoami(ctx: &CliContext) -> Result<(), CliError> {
    match ctx.session.restore().await {
        SessionPhase::Authenticated => {
            if let Some(user) = ctx.session.user() {
                println!("{} {}", "Email:".bold(), user.email.cyan());
                if let Some(name) = user.name {
                    println!("{} {}", "Name:".bold(), name);
                }
                println!("{} {}", "ID:".bold(), user.id.dimmed());
                println!("{} {}", "Since:".bold(), user.created_at.dimmed());
            }
            if let Some(expiry) = ctx
                .gateway
                .tokens()
                .access_token()
                .as_deref()
                .and_then(token_expiry)
            {
                println!(
                    "{} {}",
                    "Access token expires:".bold(),
                    expiry.format("%Y-%m-%d %H:%M:%S UTC").to_string().dimmed()
                );
            }
        }
        _ => println!("{} Not logged in", "ℹ".bold().blue()),
    }
    Ok(())
}
