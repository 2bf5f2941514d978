//! Regional endpoint resolution.
//!
//! Token and data endpoints are partitioned by region; a token minted against
//! the wrong accounts host fails authentication. The mapping is an explicit
//! enumeration resolved once at startup, not string matching at call time.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    Us,
    Eu,
    In,
    Au,
    Jp,
}

impl Region {
    /// Derive the region from the configured CRM base URL. Unknown suffixes
    /// resolve to the international (.com) region.
    pub fn from_base_url(base_url: &str) -> Self {
        let host = base_url
            .trim_end_matches('/')
            .trim_start_matches("https://")
            .trim_start_matches("http://");
        if host.ends_with(".com.au") {
            Region::Au
        } else if host.ends_with(".eu") {
            Region::Eu
        } else if host.ends_with(".in") {
            Region::In
        } else if host.ends_with(".jp") {
            Region::Jp
        } else {
            Region::Us
        }
    }

    pub fn accounts_base(&self) -> &'static str {
        match self {
            Region::Us => "https://accounts.zoho.com",
            Region::Eu => "https://accounts.zoho.eu",
            Region::In => "https://accounts.zoho.in",
            Region::Au => "https://accounts.zoho.com.au",
            Region::Jp => "https://accounts.zoho.jp",
        }
    }

    pub fn token_url(&self) -> String {
        format!("{}/oauth/v2/token", self.accounts_base())
    }
}
