//! Pricing plans and regional currency selection

use serde::Serialize;
use strum::{AsRefStr, EnumIter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, EnumIter, AsRefStr)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Usd,
    Ngn,
}

impl Currency {
    pub fn symbol(self) -> &'static str {
        match self {
            Currency::Usd => "$",
            Currency::Ngn => "₦",
        }
    }

    /// NGN for Nigeria, USD everywhere else
    pub fn for_country(country_code: Option<&str>) -> Self {
        match country_code {
            Some(code) if code.trim().eq_ignore_ascii_case("NG") => Currency::Ngn,
            _ => Currency::Usd,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Price {
    pub usd: u64,
    pub ngn: u64,
}

impl Price {
    pub fn in_currency(&self, currency: Currency) -> u64 {
        match currency {
            Currency::Usd => self.usd,
            Currency::Ngn => self.ngn,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingPlan {
    pub name: &'static str,
    pub description: &'static str,
    pub features: &'static [&'static str],
    pub monthly_price: Price,
    pub lifetime_price: Price,
    pub cta: &'static str,
    pub popular: bool,
}

pub const FREE_PLAN: PricingPlan = PricingPlan {
    name: "Free",
    description: "For individuals and small projects",
    features: &[
        "Up to 10 shortened URLs",
        "Basic analytics",
        "Standard support",
        "No custom domains",
    ],
    monthly_price: Price { usd: 0, ngn: 0 },
    lifetime_price: Price { usd: 0, ngn: 0 },
    cta: "Get Started",
    popular: false,
};

pub const PRO_PLAN: PricingPlan = PricingPlan {
    name: "Pro",
    description: "For professionals and businesses",
    features: &[
        "Up to 50 shortened URLs",
        "Advanced analytics",
        "Priority support",
        "Custom branded domains",
        "QR code generation",
        "Regular updates",
    ],
    monthly_price: Price { usd: 7, ngn: 5000 },
    lifetime_price: Price { usd: 50, ngn: 45000 },
    cta: "Upgrade to Pro",
    popular: true,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegionalPricing {
    pub currency: Currency,
    pub symbol: &'static str,
    pub plans: Vec<PricingPlan>,
}

pub fn pricing_for_country(country_code: Option<&str>) -> RegionalPricing {
    let currency = Currency::for_country(country_code);
    RegionalPricing {
        currency,
        symbol: currency.symbol(),
        plans: vec![FREE_PLAN, PRO_PLAN],
    }
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// `$7`, `₦45,000`
pub fn format_price(price: u64, currency: Currency) -> String {
    match currency {
        Currency::Usd => format!("${}", price),
        Currency::Ngn => format!("₦{}", group_thousands(price)),
    }
}
