//! Command-line interface definitions using clap
//!
//! This module defines the CLI structure for linkdash using clap's derive macros.

use clap::{Parser, Subcommand};

/// Linkdash - edge front server and dashboard client for a URL shortener
#[derive(Parser)]
#[command(name = "linkdash")]
#[command(version)]
#[command(about = "Edge front server and dashboard client for a URL shortener", long_about = None)]
pub struct Cli {
    /// Path to the TOML configuration file
    #[arg(long, short = 'c', global = true, default_value = "config.toml")]
    pub config: String,

    /// Talk to the built-in in-memory backend instead of the configured API
    #[arg(long, global = true)]
    pub mock: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Start the edge front server (default)
    Serve,

    /// Log in and store the session tokens
    Login {
        email: String,

        /// Password (prompted when omitted)
        #[arg(long)]
        password: Option<String>,

        /// Where to go after a successful login
        #[arg(long)]
        callback: Option<String>,
    },

    /// Create an account
    Signup {
        email: String,

        #[arg(long)]
        name: Option<String>,

        /// Password (prompted twice when omitted)
        #[arg(long)]
        password: Option<String>,
    },

    /// Clear the stored session
    Logout,

    /// Show the signed-in user
    Whoami,

    /// Manage short links
    Links {
        #[command(subcommand)]
        action: LinkCommands,
    },

    /// List available short link domains
    Domains,

    /// Send a message through the contact form
    Contact {
        #[arg(long)]
        name: String,

        #[arg(long)]
        email: String,

        #[arg(long)]
        subject: String,

        #[arg(long)]
        message: String,
    },

    /// Show pricing plans
    Pricing {
        /// ISO country code (e.g. NG)
        #[arg(long)]
        country: Option<String>,

        /// Detect the country from the public IP
        #[arg(long)]
        detect: bool,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

/// Short link subcommands
#[derive(Subcommand)]
pub enum LinkCommands {
    /// List links
    List {
        #[arg(long, default_value_t = 1)]
        page: u32,

        /// Page size (defaults to links.page_size)
        #[arg(long)]
        limit: Option<u32>,
    },

    /// Shorten a URL
    Create {
        url: String,

        #[arg(long)]
        slug: Option<String>,

        #[arg(long)]
        domain: Option<String>,

        #[arg(long)]
        description: Option<String>,

        /// Expire after this many days
        #[arg(long)]
        expires_in_days: Option<u32>,
    },

    /// Update a link (by id or short code)
    Update {
        key: String,

        #[arg(long)]
        url: Option<String>,

        #[arg(long)]
        slug: Option<String>,

        #[arg(long)]
        description: Option<String>,
    },

    /// Delete a link (by id or short code)
    Delete { key: String },

    /// Click statistics of a link
    Stats {
        key: String,

        /// day, week, month or all
        #[arg(long, default_value = "all")]
        period: String,
    },

    /// QR code of a link
    Qr { key: String },
}

/// Config subcommands
#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Generate a sample configuration file
    Generate {
        /// Output file path
        output_file: Option<String>,

        /// Overwrite an existing file without asking
        #[arg(long)]
        force: bool,
    },
}
