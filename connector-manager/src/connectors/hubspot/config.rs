pub const BASE_URL: &str = "https://api.hubapi.com";
pub const AUTH_URL: &str = "https://app.hubspot.com/oauth/authorize";
pub const TOKEN_URL: &str = "https://api.hubapi.com/oauth/v1/token";
pub const SCOPES: &[&str] = &["crm.objects.contacts.read", "oauth"];

/// Contacts requested per load
pub const PAGE_SIZE: usize = 20;

/// Contact properties requested from the CRM API
pub const CONTACT_PROPERTIES: &[&str] = &[
    "firstname",
    "lastname",
    "email",
    "phone",
    "company",
    "lifecycle_stage",
    "jobtitle",
];
