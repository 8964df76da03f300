//! CLI interface module
//!
//! Drives the dashboard client (session, links, contact, pricing) from the
//! terminal. Tokens live under `auth.token_dir`, so a login survives between
//! invocations.

pub mod commands;

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use colored::Colorize;

use crate::auth::{AuthSession, Navigator, TokenStore};
use crate::cli::{Commands, ConfigCommands, LinkCommands};
use crate::client::{ApiGateway, ClientError, HttpTransport, MockBackend, ReqwestTransport};
use crate::config::StaticConfig;
use crate::errors::LinkdashError;
use crate::services::{ContactService, LinkService};
use crate::utils::validation::FieldErrors;

#[derive(Debug)]
pub enum CliError {
    ApiError(String),
    ValidationError(String),
    CommandError(String),
}

impl CliError {
    /// Format as simple output
    pub fn format_simple(&self) -> String {
        match self {
            CliError::ApiError(msg) => format!("API error: {}", msg),
            CliError::ValidationError(msg) => format!("Invalid input: {}", msg),
            CliError::CommandError(msg) => format!("Command error: {}", msg),
        }
    }

    /// Format as colored output
    pub fn format_colored(&self) -> String {
        match self {
            CliError::ApiError(msg) => format!("{} {}", "API error:".red().bold(), msg.white()),
            CliError::ValidationError(msg) => {
                format!("{} {}", "Invalid input:".yellow().bold(), msg.white())
            }
            CliError::CommandError(msg) => {
                format!("{} {}", "Command error:".red().bold(), msg.white())
            }
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for CliError {}

impl From<LinkdashError> for CliError {
    fn from(err: LinkdashError) -> Self {
        match err {
            LinkdashError::Validation(msg) => CliError::ValidationError(msg),
            other => CliError::ApiError(other.message().to_string()),
        }
    }
}

impl From<ClientError> for CliError {
    fn from(err: ClientError) -> Self {
        CliError::from(LinkdashError::from(err))
    }
}

impl From<FieldErrors> for CliError {
    fn from(errors: FieldErrors) -> Self {
        CliError::ValidationError(errors.to_string())
    }
}

/// Prints forced navigations instead of following them
#[derive(Debug, Default)]
pub struct TerminalNavigator;

impl Navigator for TerminalNavigator {
    fn navigate(&self, target: &str) {
        println!("{} {}", "→".bold().blue(), target.cyan());
    }
}

/// Everything a command needs, wired against either the configured API or
/// the in-memory backend
pub struct CliContext {
    pub config: StaticConfig,
    pub gateway: Arc<ApiGateway>,
    pub session: AuthSession,
    pub links: LinkService,
    pub contact: ContactService,
}

impl CliContext {
    pub fn build(config: &StaticConfig, mock: bool) -> Result<Self, CliError> {
        let transport: Arc<dyn HttpTransport> = if mock {
            Arc::new(
                MockBackend::new(&config.api.mock_secret)
                    .with_site_base_url(config.site.base_url.clone()),
            )
        } else {
            Arc::new(
                ReqwestTransport::new(
                    config.api.base_url.clone(),
                    Duration::from_secs(config.api.timeout_secs),
                )
                .map_err(|e| CliError::CommandError(format!("Failed to build HTTP client: {}", e)))?,
            )
        };

        let tokens = Arc::new(TokenStore::from_config(&config.auth, &config.site));
        let gateway = Arc::new(ApiGateway::new(
            transport,
            tokens,
            Arc::new(TerminalNavigator),
            config.auth.login_path.clone(),
        ));

        Ok(Self {
            config: config.clone(),
            session: AuthSession::new(gateway.clone(), &config.auth),
            links: LinkService::new(gateway.clone(), &config.links),
            contact: ContactService::new(gateway.clone()),
            gateway,
        })
    }

    /// Fail early when no session is stored
    pub fn require_login(&self) -> Result<(), CliError> {
        if self.gateway.tokens().is_authenticated() {
            Ok(())
        } else {
            Err(CliError::CommandError(
                "Not logged in. Run `linkdash login <email>` first".to_string(),
            ))
        }
    }
}

/// Run a CLI command from clap-parsed input
pub async fn run_cli_command(
    cmd: Commands,
    config: &StaticConfig,
    mock: bool,
) -> Result<(), CliError> {
    // 不需要后端的命令
    match cmd {
        Commands::Config {
            action: ConfigCommands::Generate { output_file, force },
        } => return commands::config_generate(output_file, force).await,
        Commands::Pricing { country, detect } => {
            return commands::show_pricing(&config.country, country, detect).await;
        }
        Commands::Serve => {
            return Err(CliError::CommandError(
                "serve is handled by the server runtime".to_string(),
            ));
        }
        _ => {}
    }

    let ctx = CliContext::build(config, mock)?;

    match cmd {
        Commands::Login {
            email,
            password,
            callback,
        } => commands::login(&ctx, email, password, callback).await,
        Commands::Signup {
            email,
            name,
            password,
        } => commands::signup(&ctx, email, name, password).await,
        Commands::Logout => commands::logout(&ctx),
        Commands::Whoami => commands::whoami(&ctx).await,
        Commands::Links { action } => {
            ctx.require_login()?;
            match action {
                LinkCommands::List { page, limit } => {
                    commands::list_links(&ctx, page, limit.unwrap_or(ctx.links.page_size())).await
                }
                LinkCommands::Create {
                    url,
                    slug,
                    domain,
                    description,
                    expires_in_days,
                } => {
                    commands::create_link(&ctx, url, slug, domain, description, expires_in_days)
                        .await
                }
                LinkCommands::Update {
                    key,
                    url,
                    slug,
                    description,
                } => commands::update_link(&ctx, key, url, slug, description).await,
                LinkCommands::Delete { key } => commands::delete_link(&ctx, key).await,
                LinkCommands::Stats { key, period } => {
                    commands::link_stats(&ctx, key, period).await
                }
                LinkCommands::Qr { key } => commands::qr_code(&ctx, key).await,
            }
        }
        Commands::Domains => {
            ctx.require_login()?;
            commands::list_domains(&ctx).await
        }
        Commands::Contact {
            name,
            email,
            subject,
            message,
        } => commands::send_contact(&ctx, name, email, subject, message).await,
        Commands::Config { .. } | Commands::Pricing { .. } | Commands::Serve => {
            unreachable!("handled above")
        }
    }
}
