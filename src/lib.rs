//! Linkdash - edge front server and dashboard client for a URL shortener
//!
//! This library provides the session token lifecycle, the authenticated API
//! client, the dashboard services and the edge server that guards routes
//! and resolves short codes.
//!
//! # Features
//! - **server**: Edge front server (default)
//! - **cli**: Command-line dashboard client (default)
//!
//! # Architecture
//! - `auth`: Token pair storage (local file + cookie) and the session state machine
//! - `client`: API gateway with refresh-and-retry, HTTP transport, in-memory mock backend
//! - `services`: Link management, contact form, pricing, country detection
//! - `api`: Edge route guard, short-code probe and site pages
//! - `interfaces`: Command-line interface
//! - `config`: Configuration management
//! - `runtime`: Server execution mode
//! - `system`: Logging

pub mod api;
pub mod auth;
pub mod cli;
pub mod client;
pub mod config;
pub mod errors;
pub mod interfaces;
pub mod models;
pub mod runtime;
pub mod services;
pub mod system;
pub mod utils;
