/// Public Open-Elevation instance
pub const DEFAULT_ELEVATION_URL: &str = "https://api.open-elevation.com";

/// Lookup endpoint, relative to the service root
pub const ELEVATION_LOOKUP_PATH: &str = "/api/v1/lookup";

pub const DEFAULT_USER_AGENT: &str = concat!("rsroads/", env!("CARGO_PKG_VERSION"));

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
