use clap::Parser;

use linkdash::cli::{Cli, Commands};
use linkdash::config::{get_config, init_config_from};
use linkdash::system::init_logging;

#[cfg(feature = "cli")]
use linkdash::interfaces::cli::run_cli_command;

#[cfg(feature = "server")]
async fn serve(config: &linkdash::config::StaticConfig) -> anyhow::Result<()> {
    linkdash::runtime::run_server(config).await
}

#[cfg(not(feature = "server"))]
async fn serve(_config: &linkdash::config::StaticConfig) -> anyhow::Result<()> {
    anyhow::bail!("Server support was not compiled in")
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    dotenvy::dotenv().ok();

    init_config_from(&cli.config);
    let config = get_config();

    let is_server = matches!(cli.command, None | Some(Commands::Serve));

    // CLI 模式下只输出警告以上的日志，避免干扰命令输出
    let mut logging = config.logging.clone();
    if !is_server && logging.file.is_none() {
        logging.level = "warn".to_string();
    }
    let _guard = init_logging(&logging)?;

    match cli.command {
        None | Some(Commands::Serve) => serve(&config).await,
        #[cfg(feature = "cli")]
        Some(cmd) => {
            if let Err(e) = run_cli_command(cmd, &config, cli.mock).await {
                eprintln!("{}", e.format_colored());
                std::process::exit(1);
            }
            Ok(())
        }
        #[cfg(not(feature = "cli"))]
        Some(_) => anyhow::bail!("CLI support was not compiled in"),
    }
}
