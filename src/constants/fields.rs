// Key tokens that must all be present for a candidate to count as a proxy entry
pub const REQUIRED_KEY_TOKENS: [&str; 3] = ["name:", "server:", "port:"];

// The field inserted into non-compliant entries
pub const SKIP_CERT_VERIFY_KEY: &str = "skip-cert-verify";
pub const SKIP_CERT_VERIFY_TOKEN: &str = "skip-cert-verify:";
pub const SKIP_CERT_VERIFY_FIELD: &str = "skip-cert-verify: true";

// Line that opens the section scanned for block-syntax entries
pub const PROXIES_SECTION_HEADER: &str = "proxies:";

pub const TOOL_NAME: &str = "err_x509";
pub const TOOL_VERSION: &str = env!("CARGO_PKG_VERSION");
