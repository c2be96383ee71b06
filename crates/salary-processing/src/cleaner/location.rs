//! Location to country-code resolution.
//!
//! Locations are free text such as `"berlin, germany"` or `"austin, tx"`. They
//! are matched against an ordered table; the first matching entry decides the
//! ISO code. Full U.S. state names come first, then cities, then two-letter
//! state abbreviations, so `"paris, texas"` is American while `"berlin, de"` and
//! `"toronto, on, ca"` keep their city. Abbreviations are only matched as whole
//! comma/period-delimited segments.

use once_cell::sync::Lazy;
use regex::Regex;

/// Location value that never carries geographic information.
pub const FULLY_REMOTE: &str = "fully remote";

/// How a table entry recognizes a location.
#[derive(Debug)]
pub enum Matcher {
    /// Whole segment bounded by start/end of text, commas or periods.
    Delimited(Regex),
    /// Plain substring anywhere in the text.
    Substring(&'static str),
}

impl Matcher {
    fn delimited(phrases: &[&str]) -> Self {
        let alternatives = phrases
            .iter()
            .map(|p| regex::escape(p))
            .collect::<Vec<_>>()
            .join("|");
        let pattern = format!(r"(?:^|[,.])\s*(?:{})\s*(?:[,.]|$)", alternatives);
        Self::Delimited(Regex::new(&pattern).expect("Invalid regex: delimited location"))
    }

    pub fn is_match(&self, location: &str) -> bool {
        match self {
            Self::Delimited(regex) => regex.is_match(location),
            Self::Substring(phrase) => location.contains(phrase),
        }
    }
}

/// One entry of the ordered country table.
#[derive(Debug)]
pub struct CountryPattern {
    pub matcher: Matcher,
    pub code: &'static str,
}

const US_STATE_NAMES: &[&str] = &[
    "alabama", "alaska", "arizona", "arkansas", "california", "colorado", "connecticut",
    "delaware", "florida", "georgia", "hawaii", "idaho", "illinois", "indiana", "iowa",
    "kansas", "kentucky", "louisiana", "maine", "maryland", "massachusetts", "michigan",
    "minnesota", "mississippi", "missouri", "montana", "nebraska", "nevada", "new hampshire",
    "new jersey", "new mexico", "new york", "north carolina", "north dakota", "ohio",
    "oklahoma", "oregon", "pennsylvania", "rhode island", "south carolina", "south dakota",
    "tennessee", "texas", "utah", "vermont", "virginia", "washington", "west virginia",
    "wisconsin", "wyoming", "district of columbia",
];

const US_STATE_CODES: &[&str] = &[
    "al", "ak", "az", "ar", "ca", "co", "ct", "de", "fl", "ga", "hi", "id", "il", "in", "ia",
    "ks", "ky", "la", "me", "md", "ma", "mi", "mn", "ms", "mo", "mt", "ne", "nv", "nh", "nj",
    "nm", "ny", "nc", "nd", "oh", "ok", "or", "pa", "ri", "sc", "sd", "tn", "tx", "ut", "vt",
    "va", "wa", "wv", "wi", "wy", "dc",
];

/// Cities, checked before state abbreviations.
const CITIES: &[(&str, &str)] = &[
    // U.S. cities ("indianapolis" must win over "india")
    ("indianapolis", "US"),
    ("new york", "US"),
    ("san francisco", "US"),
    ("san jose", "US"),
    ("san diego", "US"),
    ("los angeles", "US"),
    ("seattle", "US"),
    ("chicago", "US"),
    ("boston", "US"),
    ("austin", "US"),
    ("dallas", "US"),
    ("houston", "US"),
    ("denver", "US"),
    ("atlanta", "US"),
    ("miami", "US"),
    ("philadelphia", "US"),
    // other cities
    ("berlin", "DE"),
    ("munich", "DE"),
    ("münchen", "DE"),
    ("hamburg", "DE"),
    ("frankfurt", "DE"),
    ("cologne", "DE"),
    ("köln", "DE"),
    ("stuttgart", "DE"),
    ("düsseldorf", "DE"),
    ("paris", "FR"),
    ("lyon", "FR"),
    ("toulouse", "FR"),
    ("london", "GB"),
    ("manchester", "GB"),
    ("edinburgh", "GB"),
    ("amsterdam", "NL"),
    ("rotterdam", "NL"),
    ("madrid", "ES"),
    ("barcelona", "ES"),
    ("milan", "IT"),
    ("zurich", "CH"),
    ("zürich", "CH"),
    ("geneva", "CH"),
    ("vienna", "AT"),
    ("wien", "AT"),
    ("brussels", "BE"),
    ("warsaw", "PL"),
    ("krakow", "PL"),
    ("kraków", "PL"),
    ("lisbon", "PT"),
    ("dublin", "IE"),
    ("stockholm", "SE"),
    ("copenhagen", "DK"),
    ("oslo", "NO"),
    ("helsinki", "FI"),
    ("prague", "CZ"),
    ("bangalore", "IN"),
    ("bengaluru", "IN"),
    ("hyderabad", "IN"),
    ("pune", "IN"),
    ("mumbai", "IN"),
    ("toronto", "CA"),
    ("vancouver", "CA"),
    ("montreal", "CA"),
    ("sydney", "AU"),
    ("melbourne", "AU"),
    ("singapore", "SG"),
    ("medellín", "CO"),
    ("medellin", "CO"),
    ("bogotá", "CO"),
    ("bogota", "CO"),
];

/// Regions then countries, checked after every city and state.
const REGIONS_AND_COUNTRIES: &[(&str, &str)] = &[
    // regions
    ("bavaria", "DE"),
    ("bayern", "DE"),
    ("île-de-france", "FR"),
    ("catalonia", "ES"),
    ("lombardy", "IT"),
    ("flanders", "BE"),
    ("wallonia", "BE"),
    ("ontario", "CA"),
    ("quebec", "CA"),
    ("british columbia", "CA"),
    ("new south wales", "AU"),
    ("england", "GB"),
    ("scotland", "GB"),
    ("wales", "GB"),
    // countries
    ("germany", "DE"),
    ("deutschland", "DE"),
    ("france", "FR"),
    ("united kingdom", "GB"),
    ("netherlands", "NL"),
    ("holland", "NL"),
    ("spain", "ES"),
    ("italy", "IT"),
    ("switzerland", "CH"),
    ("austria", "AT"),
    ("belgium", "BE"),
    ("poland", "PL"),
    ("portugal", "PT"),
    ("ireland", "IE"),
    ("sweden", "SE"),
    ("denmark", "DK"),
    ("norway", "NO"),
    ("finland", "FI"),
    ("czech republic", "CZ"),
    ("czechia", "CZ"),
    ("luxembourg", "LU"),
    ("greece", "GR"),
    ("romania", "RO"),
    ("hungary", "HU"),
    ("india", "IN"),
    ("canada", "CA"),
    ("australia", "AU"),
    ("colombia", "CO"),
    ("united states", "US"),
];

fn substrings(
    table: &'static [(&'static str, &'static str)],
) -> impl Iterator<Item = CountryPattern> {
    table.iter().map(|&(phrase, code)| CountryPattern {
        matcher: Matcher::Substring(phrase),
        code,
    })
}

static COUNTRY_PATTERNS: Lazy<Vec<CountryPattern>> = Lazy::new(|| {
    let mut patterns = Vec::with_capacity(CITIES.len() + REGIONS_AND_COUNTRIES.len() + 4);
    patterns.push(CountryPattern {
        matcher: Matcher::delimited(US_STATE_NAMES),
        code: "US",
    });
    patterns.extend(substrings(CITIES));
    patterns.push(CountryPattern {
        matcher: Matcher::delimited(US_STATE_CODES),
        code: "US",
    });
    patterns.extend(substrings(REGIONS_AND_COUNTRIES));
    patterns.push(CountryPattern {
        matcher: Matcher::delimited(&["usa", "us"]),
        code: "US",
    });
    patterns.push(CountryPattern {
        matcher: Matcher::delimited(&["uk"]),
        code: "GB",
    });
    patterns
});

/// The ordered country table.
pub fn country_patterns() -> &'static [CountryPattern] {
    &COUNTRY_PATTERNS
}

/// Result of resolving one row's location.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationOutcome {
    /// Location matched a table entry.
    Country(&'static str),
    /// Location only repeats the work status; it carries no place.
    StatusCollision,
    /// Location present but matched nothing.
    Unresolved,
    /// No location given.
    Missing,
}

impl LocationOutcome {
    pub fn country_code(&self) -> Option<&'static str> {
        match self {
            Self::Country(code) => Some(*code),
            _ => None,
        }
    }

    /// Whether the location text survives into the cleaned table.
    pub fn keeps_location(&self) -> bool {
        matches!(self, Self::Country(_) | Self::Unresolved)
    }
}

/// Resolve a normalized (lower-cased, trimmed) location.
pub fn resolve_location(location: Option<&str>, status: Option<&str>) -> LocationOutcome {
    let Some(location) = location.map(str::trim).filter(|l| !l.is_empty()) else {
        return LocationOutcome::Missing;
    };

    if location == FULLY_REMOTE || status.is_some_and(|s| s.trim() == location) {
        return LocationOutcome::StatusCollision;
    }

    country_patterns()
        .iter()
        .find(|p| p.matcher.is_match(location))
        .map_or(LocationOutcome::Unresolved, |p| LocationOutcome::Country(p.code))
}
