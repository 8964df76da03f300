//! Contact form and pricing commands

use colored::Colorize;

use crate::config::CountryConfig;
use crate::interfaces::cli::{CliContext, CliError};
use crate::models::ContactForm;
use crate::services::{CountryDetector, format_price, pricing_for_country};

pub async fn send_contact(
    ctx: &CliContext,
    name: String,
    email: String,
    subject: String,
    message: String,
) -> Result<(), CliError> {
    let form = ContactForm {
        full_name: name,
        email,
        subject,
        message,
    };
    ctx.contact.submit(&form).await?;
    println!(
        "{} Message sent. We'll get back to you soon.",
        "✓".green().bold()
    );
    Ok(())
}

pub async fn show_pricing(
    country_config: &CountryConfig,
    country: Option<String>,
    detect: bool,
) -> Result<(), CliError> {
    let country = match country {
        Some(code) => Some(code),
        None if detect => CountryDetector::new(country_config).detect().await,
        None => None,
    };
    let pricing = pricing_for_country(country.as_deref());

    println!(
        "{} {} ({})",
        "Pricing".bold().green(),
        pricing.currency.as_ref(),
        pricing.symbol
    );
    for plan in &pricing.plans {
        let badge = if plan.popular {
            " ★ Most popular".yellow().to_string()
        } else {
            String::new()
        };
        println!();
        println!("  {}{}", plan.name.bold(), badge);
        println!("  {}", plan.description.dimmed());
        println!(
            "  {} / month · {} lifetime",
            format_price(plan.monthly_price.in_currency(pricing.currency), pricing.currency).cyan(),
            format_price(plan.lifetime_price.in_currency(pricing.currency), pricing.currency).cyan()
        );
        for feature in plan.features {
            println!("    {} {}", "✓".green(), feature);
        }
    }
    Ok(())
}
