pub const BASE_URL: &str = "https://api.notion.com";
pub const AUTH_URL: &str = "https://api.notion.com/v1/oauth/authorize";
pub const TOKEN_URL: &str = "https://api.notion.com/v1/oauth/token";

/// Notion pins behaviour to a dated API version header
pub const NOTION_VERSION: &str = "2022-06-28";

/// Pages and databases returned per load
pub const PAGE_SIZE: usize = 20;
