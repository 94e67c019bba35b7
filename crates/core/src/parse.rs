//! Raw job API records to [`JobPosting`].
//!
//! Records are parsed one at a time; a malformed record is logged and skipped
//! so the rest of the page survives.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use sha2::{Digest, Sha256};

use crate::model::{JobPosting, SalaryRange};

const SNIPPET_CHARS: usize = 200;

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("record is not an object")]
    NotAnObject,

    #[error("missing field: {0}")]
    MissingField(&'static str),

    #[error("invalid record: {0}")]
    Invalid(String),
}

#[derive(Debug, Deserialize)]
struct Named {
    #[serde(default)]
    display_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Labelled {
    #[serde(default)]
    label: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawJobRecord {
    #[serde(default)]
    id: Option<serde_json::Value>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    company: Option<Named>,
    #[serde(default)]
    location: Option<Named>,
    #[serde(default)]
    salary_min: Option<f64>,
    #[serde(default)]
    salary_max: Option<f64>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    redirect_url: Option<String>,
    #[serde(default)]
    created: Option<String>,
    #[serde(default)]
    contract_type: Option<String>,
    #[serde(default)]
    category: Option<Labelled>,
}

/// Values the parser needs besides the record itself.
#[derive(Debug, Clone)]
pub struct ParseContext {
    pub source: String,
    pub country: String,
    pub now: DateTime<Utc>,
}

/// Parse one record.
pub fn parse_record(value: &serde_json::Value, ctx: &ParseContext) -> Result<JobPosting, ParseError> {
    if !value.is_object() {
        return Err(ParseError::NotAnObject);
    }
    let raw: RawJobRecord = serde_json::from_value(value.clone()).map_err(|e| ParseError::Invalid(e.to_string()))?;

    let title = raw
        .title
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .ok_or(ParseError::MissingField("title"))?;
    let company = raw
        .company
        .and_then(|c| c.display_name)
        .unwrap_or_else(|| "Unknown company".to_string());
    let location = raw
        .location
        .and_then(|l| l.display_name)
        .unwrap_or_else(|| "Location not specified".to_string());

    let id = match raw.id {
        Some(serde_json::Value::String(s)) if !s.trim().is_empty() => s,
        Some(serde_json::Value::Number(n)) => n.to_string(),
        _ => fallback_id(&title, &company, raw.redirect_url.as_deref()),
    };

    let posted_date = raw
        .created
        .as_deref()
        .and_then(|c| DateTime::parse_from_rfc3339(c).ok())
        .map(|d| d.with_timezone(&Utc));

    let symbol = currency_symbol(&ctx.country);
    let salary = SalaryRange {
        min: raw.salary_min,
        max: raw.salary_max,
        display: salary_display(raw.salary_min, raw.salary_max, symbol),
    };

    Ok(JobPosting {
        id,
        title,
        company,
        location,
        salary,
        description_snippet: snippet(raw.description.as_deref().unwrap_or_default()),
        url: raw.redirect_url,
        posted_label: posted_label(posted_date, ctx.now),
        posted_date,
        source: ctx.source.clone(),
        contract_type: raw.contract_type,
        category: raw.category.and_then(|c| c.label),
    })
}

/// Parse a page of records, skipping the malformed ones.
pub fn parse_records(records: &[serde_json::Value], ctx: &ParseContext) -> Vec<JobPosting> {
    records
        .iter()
        .enumerate()
        .filter_map(|(index, record)| match parse_record(record, ctx) {
            Ok(job) => Some(job),
            Err(e) => {
                tracing::warn!(index, error = %e, source = %ctx.source, "skipping malformed job record");
                None
            }
        })
        .collect()
}

/// Stable id for records the API sent without one.
fn fallback_id(title: &str, company: &str, url: Option<&str>) -> String {
    let mut hasher = Sha256::new();
    hasher.update(title.as_bytes());
    hasher.update(b"\n");
    hasher.update(company.as_bytes());
    hasher.update(b"\n");
    hasher.update(url.unwrap_or_default().as_bytes());
    let digest = hex::encode(hasher.finalize());
    format!("gen-{}", &digest[..16])
}

pub fn currency_symbol(country: &str) -> &'static str {
    match country.to_ascii_lowercase().as_str() {
        "gb" => "£",
        "us" | "ca" | "au" | "nz" | "sg" => "$",
        "de" | "fr" | "nl" | "it" | "es" | "at" | "be" => "€",
        "in" => "₹",
        _ => "",
    }
}

fn format_amount(amount: f64, symbol: &str) -> String {
    let digits = (amount.max(0.0).round() as u64).to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("{symbol}{grouped}")
}

pub fn salary_display(min: Option<f64>, max: Option<f64>, symbol: &str) -> String {
    match (min, max) {
        (Some(min), Some(max)) if (min - max).abs() < 0.5 => format_amount(min, symbol),
        (Some(min), Some(max)) => format!("{} - {}", format_amount(min, symbol), format_amount(max, symbol)),
        (Some(min), None) => format!("{}+", format_amount(min, symbol)),
        (None, Some(max)) => format!("Up to {}", format_amount(max, symbol)),
        (None, None) => "Salary not specified".to_string(),
    }
}

/// Human-readable age of a posting.
pub fn posted_label(posted: Option<DateTime<Utc>>, now: DateTime<Utc>) -> String {
    let Some(posted) = posted else {
        return "recently".to_string();
    };
    let days = (now - posted).num_days().max(0);
    match days {
        0 => "today".to_string(),
        1 => "1 day ago".to_string(),
        2..=6 => format!("{days} days ago"),
        7..=13 => "1 week ago".to_string(),
        14..=29 => format!("{} weeks ago", days / 7),
        _ => "over a month ago".to_string(),
    }
}

fn snippet(description: &str) -> String {
    let description = description.trim();
    if description.chars().count() <= SNIPPET_CHARS {
        return description.to_string();
    }
    let cut: String = description.chars().take(SNIPPET_CHARS).collect();
    format!("{}...", cut.trim_end())
}
