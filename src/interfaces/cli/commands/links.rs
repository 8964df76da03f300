//! Short link management commands

use chrono::Utc;
use colored::Colorize;

use crate::interfaces::cli::{CliContext, CliError};
use crate::models::{CreateLinkRequest, ShortLink, UpdateLinkRequest};
use crate::services::StatsPeriod;

fn print_link(link: &ShortLink, short_url: &str) {
    let mut info_parts = vec![format!(
        "{} -> {}",
        short_url.cyan(),
        link.original_url.blue().underline()
    )];

    if let Some(expires_at) = link.expires_at {
        let label = if link.is_expired(Utc::now()) {
            "expired"
        } else {
            "expires"
        };
        info_parts.push(
            format!("({}: {})", label, expires_at.format("%Y-%m-%d %H:%M:%S UTC"))
                .dimmed()
                .yellow()
                .to_string(),
        );
    }

    if link.clicks > 0 {
        info_parts.push(
            format!("(clicks: {})", link.clicks)
                .dimmed()
                .cyan()
                .to_string(),
        );
    }

    println!("  {}", info_parts.join(" "));
    if let Some(description) = &link.description {
        println!("    {}", description.dimmed());
    }
}

pub async fn list_links(ctx: &CliContext, page: u32, limit: u32) -> Result<(), CliError> {
    let result = ctx.links.list_links(page, limit).await?;

    if result.links.is_empty() {
        println!("{} No short links found", "ℹ".bold().blue());
        return Ok(());
    }

    println!("{}", "Short link list:".bold().green());
    println!();
    for link in &result.links {
        print_link(link, &ctx.config.site.short_url(&link.short_code));
    }
    println!();
    println!(
        "{} Page {} · {} of {} short links",
        "ℹ".bold().blue(),
        page.max(1),
        result.links.len().to_string().green(),
        result.total.to_string().green()
    );
    Ok(())
}

pub async fn create_link(
    ctx: &CliContext,
    url: String,
    slug: Option<String>,
    domain: Option<String>,
    description: Option<String>,
    expires_in_days: Option<u32>,
) -> Result<(), CliError> {
    let request = CreateLinkRequest {
        custom_slug: slug.filter(|s| !s.is_empty()),
        domain,
        description,
        expiration_days: expires_in_days,
        expires_at: expires_in_days.map(|d| Utc::now() + chrono::Duration::days(i64::from(d))),
        ..CreateLinkRequest::new(url)
    };

    let link = ctx.links.create_link(&request).await?;
    println!("{} Short link created", "✓".green().bold());
    print_link(&link, &ctx.config.site.short_url(&link.short_code));
    Ok(())
}

pub async fn update_link(
    ctx: &CliContext,
    key: String,
    url: Option<String>,
    slug: Option<String>,
    description: Option<String>,
) -> Result<(), CliError> {
    let request = UpdateLinkRequest {
        original_url: url,
        custom_slug: slug,
        description,
        expires_at: None,
    };
    if request.is_empty() {
        return Err(CliError::ValidationError(
            "Nothing to update. Pass --url, --slug or --description".to_string(),
        ));
    }

    let link = ctx.links.update_link(&key, &request).await?;
    println!("{} Short link updated", "✓".green().bold());
    print_link(&link, &ctx.config.site.short_url(&link.short_code));
    Ok(())
}

pub async fn delete_link(ctx: &CliContext, key: String) -> Result<(), CliError> {
    ctx.links.delete_link(&key).await?;
    println!("{} Deleted short link {}", "✓".green().bold(), key.cyan());
    Ok(())
}

pub async fn link_stats(ctx: &CliContext, key: String, period: String) -> Result<(), CliError> {
    let period: StatsPeriod = period
        .parse()
        .map_err(|_| CliError::ValidationError(format!("Unknown period: {}", period)))?;
    let stats = ctx.links.link_stats(&key).await?;

    println!("{} {}", "Statistics for".bold().green(), key.cyan());
    println!("  {} {}", "Total clicks:".bold(), stats.total_clicks);

    let series = period.filter(&stats.clicks_by_day, Utc::now());
    println!("  {} ({})", "Clicks by day".bold(), period.as_ref());
    if series.is_empty() {
        println!("    {}", "no clicks in this period".dimmed());
    }
    for day in &series {
        println!("    {} {}", day.date.dimmed(), day.clicks);
    }

    if !stats.referrers.is_empty() {
        println!("  {}", "Referrers".bold());
        for r in &stats.referrers {
            println!("    {} {}", r.source, r.count.to_string().cyan());
        }
    }
    for (title, rows) in [("Browsers", &stats.browsers), ("Countries", &stats.countries)] {
        if rows.is_empty() {
            continue;
        }
        println!("  {}", title.bold());
        for row in rows {
            println!("    {} {}", row.name, row.count.to_string().cyan());
        }
    }
    Ok(())
}

pub async fn qr_code(ctx: &CliContext, key: String) -> Result<(), CliError> {
    let qr = ctx.links.qr_code(&key).await?;
    println!("{} {}", "Short URL:".bold(), qr.short_url.cyan());
    println!("{} {}", "QR code:".bold(), qr.qr_code);
    Ok(())
}

pub async fn list_domains(ctx: &CliContext) -> Result<(), CliError> {
    let domains = ctx.links.domains().await?;
    println!("{}", "Available domains:".bold().green());
    for domain in domains {
        println!("  {}", domain.cyan());
    }
    Ok(())
}
