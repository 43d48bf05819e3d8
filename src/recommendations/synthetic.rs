// src/recommendations/synthetic.rs
//! Locally generated listings, used when the listings source is down or
//! returns nothing.

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use reqwest::Url;
use std::collections::HashSet;
use uuid::Uuid;

use super::keywords::significant_words;
use crate::types::{JobListing, JobType, MAX_MATCH_SCORE};

pub const SYNTHETIC_COUNT: usize = 6;
pub const SYNTHETIC_SOURCE: &str = "synthetic";

const UNAPPLIED_PREFERENCE: f64 = 0.8;

const BASE_SCORE: u32 = 70;
const KEYWORD_BONUS: u32 = 8;
const ROLE_BONUS: u32 = 7;
const LOCATION_BONUS: u32 = 5;
const NOVELTY_BONUS: u32 = 4;
const OVERLAP_BONUS_PER_WORD: u32 = 2;
const OVERLAP_BONUS_MAX: u32 = 6;

const TITLE_TEMPLATES: [&str; 6] = [
    "{role}",
    "Senior {role}",
    "Junior {role}",
    "Lead {role}",
    "Staff {role}",
    "{role} II",
];

struct CountryProfile {
    code: &'static str,
    default_location: &'static str,
    currency: &'static str,
    companies: &'static [&'static str],
}

const COUNTRIES: [CountryProfile; 6] = [
    CountryProfile {
        code: "us",
        default_location: "New York, NY",
        currency: "$",
        companies: &[
            "Stripe", "Airbnb", "Datadog", "Cloudflare", "Shopify", "Twilio", "Snowflake",
            "HashiCorp",
        ],
    },
    CountryProfile {
        code: "gb",
        default_location: "London",
        currency: "£",
        companies: &[
            "Monzo", "Revolut", "Deliveroo", "Wise", "Ocado Technology", "Darktrace",
            "Starling Bank",
        ],
    },
    CountryProfile {
        code: "de",
        default_location: "Berlin",
        currency: "€",
        companies: &[
            "SAP", "Zalando", "N26", "Delivery Hero", "Celonis", "Personio", "HelloFresh",
        ],
    },
    CountryProfile {
        code: "ca",
        default_location: "Toronto, ON",
        currency: "CA$",
        companies: &[
            "Wealthsimple", "Lightspeed", "Clio", "Hootsuite", "Cohere", "Faire",
        ],
    },
    CountryProfile {
        code: "in",
        default_location: "Bengaluru",
        currency: "₹",
        companies: &[
            "Flipkart", "Razorpay", "Zerodha", "Freshworks", "Swiggy", "Postman", "Zoho",
        ],
    },
    CountryProfile {
        code: "au",
        default_location: "Sydney",
        currency: "A$",
        companies: &["Atlassian", "Canva", "Afterpay", "SafetyCulture", "Culture Amp"],
    },
];

fn country_profile(country: &str) -> &'static CountryProfile {
    let code = match country.trim().to_lowercase().as_str() {
        "uk" => "gb".to_string(),
        other => other.to_string(),
    };
    COUNTRIES
        .iter()
        .find(|profile| profile.code == code)
        .unwrap_or(&COUNTRIES[0])
}

/// Everything the generator knows about the user.
#[derive(Debug, Clone, Default)]
pub struct SyntheticInput {
    pub roles: Vec<String>,
    pub keywords: Vec<String>,
    pub location: Option<String>,
    pub country: String,
    /// Lower-cased company names the user already applied to.
    pub applied_companies: HashSet<String>,
    pub past_positions: Vec<String>,
    pub fallback_role: String,
}

impl SyntheticInput {
    fn role_candidates(&self) -> Vec<String> {
        let roles: Vec<String> = self
            .roles
            .iter()
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty())
            .collect();
        if !roles.is_empty() {
            return roles;
        }
        if !self.keywords.is_empty() {
            return self.keywords.iter().map(|k| title_case(k)).collect();
        }
        vec![title_case(&self.fallback_role)]
    }

    fn has_applied_to(&self, company: &str) -> bool {
        self.applied_companies.contains(&company.to_lowercase())
    }
}

fn title_case(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Heuristic relevance of a generated listing, capped at [`MAX_MATCH_SCORE`].
pub fn score_listing(title: &str, company: &str, location: &str, input: &SyntheticInput) -> u8 {
    let title_lower = title.to_lowercase();
    let mut score = BASE_SCORE;

    if input
        .keywords
        .iter()
        .any(|keyword| title_lower.contains(&keyword.to_lowercase()))
    {
        score += KEYWORD_BONUS;
    }

    if input
        .roles
        .iter()
        .map(|role| role.trim().to_lowercase())
        .any(|role| !role.is_empty() && title_lower.contains(&role))
    {
        score += ROLE_BONUS;
    }

    if let Some(wanted) = input.location.as_deref() {
        let wanted = wanted.trim().to_lowercase();
        if !wanted.is_empty() && location.to_lowercase().contains(&wanted) {
            score += LOCATION_BONUS;
        }
    }

    if !input.has_applied_to(company) {
        score += NOVELTY_BONUS;
    }

    let past_words: HashSet<String> = input
        .past_positions
        .iter()
        .flat_map(|p| significant_words(p).collect::<Vec<_>>())
        .collect();
    let title_words: HashSet<String> = significant_words(title).collect();
    let overlap = title_words.intersection(&past_words).count() as u32;
    score += (overlap * OVERLAP_BONUS_PER_WORD).min(OVERLAP_BONUS_MAX);

    score.min(u32::from(MAX_MATCH_SCORE)) as u8
}

fn pick<'a, T, R: Rng + ?Sized>(items: &'a [T], rng: &mut R) -> &'a T {
    &items[rng.random_range(0..items.len())]
}

fn pick_company<R: Rng + ?Sized>(
    profile: &CountryProfile,
    input: &SyntheticInput,
    rng: &mut R,
) -> &'static str {
    let unapplied: Vec<&'static str> = profile
        .companies
        .iter()
        .copied()
        .filter(|c| !input.has_applied_to(c))
        .collect();

    if !unapplied.is_empty() && rng.random_bool(UNAPPLIED_PREFERENCE) {
        *pick(&unapplied, rng)
    } else {
        *pick(profile.companies, rng)
    }
}

fn search_url(title: &str, location: &str) -> String {
    Url::parse_with_params(
        "https://www.linkedin.com/jobs/search/",
        &[("keywords", title), ("location", location)],
    )
    .map(|url| url.to_string())
    .unwrap_or_else(|_| "https://www.linkedin.com/jobs/search/".to_string())
}

/// Generate [`SYNTHETIC_COUNT`] listings sorted by descending match.
pub fn generate<R: Rng + ?Sized>(
    input: &SyntheticInput,
    rng: &mut R,
    now: DateTime<Utc>,
) -> Vec<JobListing> {
    let profile = country_profile(&input.country);
    let roles = input.role_candidates();
    let location = input
        .location
        .as_deref()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .unwrap_or(profile.default_location)
        .to_string();

    let mut listings: Vec<JobListing> = (0..SYNTHETIC_COUNT)
        .map(|_| {
            let role = pick(&roles, rng);
            let template = pick(&TITLE_TEMPLATES, rng);
            let title = template.replace("{role}", role);
            let company = pick_company(profile, input, rng);

            let job_type = match rng.random_range(0..5) {
                3 => JobType::Contract,
                4 => JobType::PartTime,
                _ => JobType::FullTime,
            };
            let salary = if rng.random_bool(0.7) {
                let low: u32 = rng.random_range(60..=140);
                let high = low + rng.random_range(20..=40);
                Some(format!(
                    "{cur}{low}k - {cur}{high}k",
                    cur = profile.currency,
                    low = low,
                    high = high
                ))
            } else {
                None
            };

            JobListing {
                id: format!("{}-{}", SYNTHETIC_SOURCE, Uuid::new_v4()),
                match_score: score_listing(&title, company, &location, input),
                url: search_url(&title, &location),
                title,
                company: company.to_string(),
                location: location.clone(),
                salary,
                job_type,
                posted: now - Duration::days(rng.random_range(0..14)),
                source: SYNTHETIC_SOURCE.to_string(),
            }
        })
        .collect();

    listings.sort_by(|a, b| b.match_score.cmp(&a.match_score));
    listings
}
