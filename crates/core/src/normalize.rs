//! Canonical search terms and cache keys.
//!
//! Input is lowercased and trimmed, then matched against ordered alias tables
//! by substring containment; the first entry whose needle occurs wins. Every
//! canonical value matches its own entry first, so normalizing twice changes
//! nothing.

/// `(needle, canonical)` pairs for job titles. Order matters.
const TITLE_ALIASES: &[(&str, &str)] = &[
    ("software engineer", "software engineer"),
    ("software developer", "software engineer"),
    ("software dev", "software engineer"),
    ("frontend", "frontend developer"),
    ("front end", "frontend developer"),
    ("front-end", "frontend developer"),
    ("backend", "backend developer"),
    ("back end", "backend developer"),
    ("back-end", "backend developer"),
    ("full stack", "full stack developer"),
    ("fullstack", "full stack developer"),
    ("full-stack", "full stack developer"),
    ("data scientist", "data scientist"),
    ("data science", "data scientist"),
    ("data analyst", "data analyst"),
    ("data analytics", "data analyst"),
    ("data engineer", "data engineer"),
    ("machine learning", "machine learning engineer"),
    ("ml engineer", "machine learning engineer"),
    ("devops", "devops engineer"),
    ("site reliability", "devops engineer"),
    ("product manager", "product manager"),
    ("product owner", "product manager"),
    ("project manager", "project manager"),
    ("ux designer", "ux designer"),
    ("ui designer", "ux designer"),
    ("ui/ux", "ux designer"),
    ("ux/ui", "ux designer"),
    ("nurse", "nurse"),
    ("teacher", "teacher"),
    ("accountant", "accountant"),
    ("accounting", "accountant"),
    ("marketing manager", "marketing manager"),
    ("digital marketing", "marketing manager"),
    ("sales", "sales representative"),
    ("developer", "software engineer"),
    ("programmer", "software engineer"),
];

/// `(needle, canonical)` pairs for locations. Order matters.
const LOCATION_ALIASES: &[(&str, &str)] = &[
    ("new york", "new york"),
    ("nyc", "new york"),
    ("manhattan", "new york"),
    ("brooklyn", "new york"),
    ("san francisco", "san francisco"),
    ("bay area", "san francisco"),
    ("los angeles", "los angeles"),
    ("washington", "washington dc"),
    ("seattle", "seattle"),
    ("boston", "boston"),
    ("chicago", "chicago"),
    ("austin", "austin"),
    ("london", "london"),
    ("manchester", "manchester"),
    ("remote", "remote"),
    ("work from home", "remote"),
    ("anywhere", "remote"),
];

/// Separator between the canonical parts of a cache key.
pub const KEY_DELIMITER: char = '|';

fn resolve(input: &str, aliases: &[(&str, &'static str)]) -> String {
    let lowered = input.trim().to_lowercase();
    aliases
        .iter()
        .find(|(needle, _)| lowered.contains(needle))
        .map(|(_, canonical)| (*canonical).to_string())
        .unwrap_or(lowered)
}

/// Canonicalize a job-title search term.
pub fn normalize(term: &str) -> String {
    resolve(term, TITLE_ALIASES)
}

/// Canonicalize a location.
pub fn normalize_location(location: &str) -> String {
    resolve(location, LOCATION_ALIASES)
}

/// Build the cache key for a search page from raw or canonical inputs.
pub fn cache_key(term: &str, location: &str, page: u32) -> String {
    format!("{}{KEY_DELIMITER}{}{KEY_DELIMITER}{page}", normalize(term), normalize_location(location))
}

/// [`cache_key`] scoped to the country the results were fetched for.
pub fn country_cache_key(country: &str, term: &str, location: &str, page: u32) -> String {
    format!("{}{KEY_DELIMITER}{}", country.trim().to_lowercase(), cache_key(term, location, page))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lowercase_and_trim() {
        assert_eq!(normalize("  Plumber  "), "plumber");
        assert_eq!(normalize_location(" Leeds "), "leeds");
    }

    #[test]
    fn test_title_aliases() {
        assert_eq!(normalize("Senior Software Developer"), "software engineer");
        assert_eq!(normalize("React Front-End Engineer"), "frontend developer");
        assert_eq!(normalize("Java Developer"), "software engineer");
        assert_eq!(normalize("Registered Nurse"), "nurse");
        assert_eq!(normalize("Inside Sales"), "sales representative");
    }

    #[test]
    fn test_first_match_wins() {
        // "frontend developer" also contains "developer"
        assert_eq!(normalize("frontend developer"), "frontend developer");
        assert_eq!(normalize("full stack developer"), "full stack developer");
    }

    #[test]
    fn test_location_aliases() {
        assert_eq!(normalize_location("NYC"), "new york");
        assert_eq!(normalize_location("Brooklyn, NY"), "new york");
        assert_eq!(normalize_location("SF Bay Area"), "san francisco");
        assert_eq!(normalize_location("Work From Home"), "remote");
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize_location("   "), "");
    }

    #[test]
    fn test_normalize_idempotent_for_canonicals() {
        for (_, canonical) in TITLE_ALIASES {
            assert_eq!(normalize(canonical), *canonical, "title {canonical}");
        }
        for (_, canonical) in LOCATION_ALIASES {
            assert_eq!(normalize_location(canonical), *canonical, "location {canonical}");
        }
    }

    #[test]
    fn test_normalize_idempotent_for_arbitrary_input() {
        let inputs = ["  Golang DEV ", "Chef", "Backend Engineer (Rust)", "", "Data Science Lead", "  Ux/Ui  "];
        for input in inputs {
            let once = normalize(input);
            assert_eq!(normalize(&once), once, "input {input:?}");
        }
        for input in ["Greater London", "  Austin, TX", "Paris", "anywhere in EU"] {
            let once = normalize_location(input);
            assert_eq!(normalize_location(&once), once, "input {input:?}");
        }
    }

    #[test]
    fn test_cache_key_deterministic() {
        let a = cache_key("Software Developer", "NYC", 0);
        let b = cache_key("software engineer", "new york", 0);
        assert_eq!(a, b);
        assert_eq!(a, "software engineer|new york|0");
        assert_ne!(a, cache_key("software engineer", "new york", 1));
    }

    #[test]
    fn test_country_cache_key_separates_countries() {
        let gb = country_cache_key("GB", "Chef", "Paris", 2);
        assert_eq!(gb, "gb|chef|paris|2");
        assert_ne!(gb, country_cache_key("fr", "Chef", "Paris", 2));
    }
}
