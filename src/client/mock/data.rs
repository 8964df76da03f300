//! Seed data of the in-memory backend

use chrono::{DateTime, Duration, Utc};

use crate::auth::tokens::UserSummary;
use crate::models::{DailyClicks, LinkStats, NamedCount, ReferrerCount, ShortLink};

pub const DEMO_USER_ID: &str = "user-1";
pub const DEMO_EMAIL: &str = "demo@example.com";
pub const DEMO_PASSWORD: &str = "password";
pub const DEMO_NAME: &str = "Demo User";

pub const DOMAINS: [&str; 3] = ["short.ly", "s.id", "link.me"];

pub fn demo_user(now: DateTime<Utc>) -> UserSummary {
    UserSummary {
        id: DEMO_USER_ID.to_string(),
        email: DEMO_EMAIL.to_string(),
        name: Some(DEMO_NAME.to_string()),
        created_at: now.to_rfc3339(),
    }
}

struct Seed {
    id: &'static str,
    url: &'static str,
    code: &'static str,
    slug: Option<&'static str>,
    domain: &'static str,
    days_ago: i64,
    clicks: u64,
    description: Option<&'static str>,
}

const SEEDS: [Seed; 5] = [
    Seed {
        id: "link-1",
        url: "https://example.com/very/long/url/that/needs/to/be/shortened/for/better/sharing",
        code: "abc123",
        slug: Some("example"),
        domain: "short.ly",
        days_ago: 0,
        clicks: 42,
        description: Some("Example website homepage"),
    },
    Seed {
        id: "link-2",
        url: "https://docs.google.com/document/d/1234567890abcdefghijklmnopqrstuvwxyz",
        code: "def456",
        slug: None,
        domain: "short.ly",
        days_ago: 1,
        clicks: 17,
        description: None,
    },
    Seed {
        id: "link-3",
        url: "https://github.com/vercel/next.js",
        code: "ghi789",
        slug: None,
        domain: "s.id",
        days_ago: 2,
        clicks: 128,
        description: Some("Next.js GitHub repository"),
    },
    Seed {
        id: "link-4",
        url: "https://tailwindcss.com/docs/installation",
        code: "jkl012",
        slug: None,
        domain: "short.ly",
        days_ago: 3,
        clicks: 5,
        description: Some("Tailwind CSS installation guide"),
    },
    Seed {
        id: "link-5",
        url: "https://react-query.tanstack.com/overview",
        code: "mno345",
        slug: None,
        domain: "s.id",
        days_ago: 4,
        clicks: 73,
        description: None,
    },
];

/// Seed links, newest first
pub fn seed_links(now: DateTime<Utc>) -> Vec<ShortLink> {
    SEEDS
        .iter()
        .map(|s| ShortLink {
            id: s.id.to_string(),
            original_url: s.url.to_string(),
            short_code: s.code.to_string(),
            custom_slug: s.slug.map(String::from),
            domain: Some(s.domain.to_string()),
            description: s.description.map(String::from),
            expires_at: None,
            expiration_days: None,
            created_at: now - Duration::days(s.days_ago),
            user_id: Some(DEMO_USER_ID.to_string()),
            clicks: s.clicks,
            qr_code: None,
        })
        .collect()
}

fn days(clicks: [u64; 4]) -> Vec<DailyClicks> {
    clicks
        .iter()
        .enumerate()
        .map(|(i, &clicks)| DailyClicks {
            date: format!("2023-05-0{}", i + 1),
            clicks,
        })
        .collect()
}

fn referrers(items: &[(&str, u64)]) -> Vec<ReferrerCount> {
    items
        .iter()
        .map(|&(source, count)| ReferrerCount {
            source: source.to_string(),
            count,
        })
        .collect()
}

fn named(items: &[(&str, u64)]) -> Vec<NamedCount> {
    items
        .iter()
        .map(|&(name, count)| NamedCount {
            name: name.to_string(),
            count,
        })
        .collect()
}

/// Seed stats keyed by link id
pub fn seed_stats() -> Vec<(String, LinkStats)> {
    vec![
        (
            "link-1".to_string(),
            LinkStats {
                total_clicks: 42,
                clicks_by_day: days([10, 15, 7, 10]),
                referrers: referrers(&[("Direct", 20), ("Twitter", 12), ("Facebook", 8), ("LinkedIn", 2)]),
                browsers: named(&[("Chrome", 25), ("Firefox", 10), ("Safari", 5), ("Edge", 2)]),
                countries: named(&[
                    ("United States", 20),
                    ("United Kingdom", 8),
                    ("Germany", 7),
                    ("Canada", 5),
                    ("Other", 2),
                ]),
            },
        ),
        (
            "link-2".to_string(),
            LinkStats {
                total_clicks: 17,
                clicks_by_day: days([5, 3, 4, 5]),
                referrers: referrers(&[("Direct", 10), ("Google", 7)]),
                browsers: named(&[("Chrome", 12), ("Firefox", 3), ("Safari", 2)]),
                countries: named(&[("United States", 8), ("Canada", 5), ("France", 4)]),
            },
        ),
        (
            "link-3".to_string(),
            LinkStats {
                total_clicks: 128,
                clicks_by_day: days([30, 42, 28, 28]),
                referrers: referrers(&[("GitHub", 50), ("Twitter", 30), ("Direct", 28), ("Reddit", 20)]),
                browsers: named(&[("Chrome", 80), ("Firefox", 30), ("Safari", 15), ("Edge", 3)]),
                countries: named(&[
                    ("United States", 45),
                    ("India", 25),
                    ("Germany", 20),
                    ("United Kingdom", 18),
                    ("Other", 20),
                ]),
            },
        ),
    ]
}
