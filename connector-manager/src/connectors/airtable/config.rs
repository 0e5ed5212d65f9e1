pub const BASE_URL: &str = "https://api.airtable.com";
pub const AUTH_URL: &str = "https://airtable.com/oauth2/v1/authorize";
pub const TOKEN_URL: &str = "https://airtable.com/oauth2/v1/token";
pub const SCOPES: &[&str] = &[
    "data.records:read",
    "data.records:write",
    "data.recordComments:read",
    "data.recordComments:write",
    "schema.bases:read",
    "schema.bases:write",
];

/// Bases returned per load
pub const PAGE_SIZE: usize = 20;
