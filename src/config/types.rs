use serde::Deserialize;

/// Main configuration structure for Bible-Sync
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub database: DatabaseConfig,
    pub identifiers: IdentifierConfig,
    pub http: HttpConfig,
    pub gateway: GatewayConfig,
    pub toba: TobaConfig,
    pub lock: LockConfig,
}

/// Database location
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: "./bible.db".to_string(),
        }
    }
}

/// Identifier generation settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct IdentifierConfig {
    /// Node id embedded in every numeric id (0..=1023)
    #[serde(rename = "node-id")]
    pub node_id: u16,

    /// Minimum length of the short alphanumeric code
    #[serde(rename = "min-length")]
    pub min_length: u8,
}

impl Default for IdentifierConfig {
    fn default() -> Self {
        Self {
            node_id: 1,
            min_length: 10,
        }
    }
}

/// Outbound HTTP settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    #[serde(rename = "user-agent")]
    pub user_agent: String,

    /// Whole-request timeout (seconds)
    #[serde(rename = "timeout-secs")]
    pub timeout_secs: u64,

    #[serde(rename = "connect-timeout-secs")]
    pub connect_timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: format!("bible-sync/{}", env!("CARGO_PKG_VERSION")),
            timeout_secs: 30,
            connect_timeout_secs: 10,
        }
    }
}

/// Settings for the Bible Gateway source
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// The single language code kept from the version index
    #[serde(rename = "language-code")]
    pub language_code: String,

    /// Allow-list of version codes
    pub versions: Vec<String>,

    /// Chapters requested per passage fetch
    #[serde(rename = "chapters-per-request")]
    pub chapters_per_request: u32,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.biblegateway.com".to_string(),
            language_code: "EN".to_string(),
            versions: vec!["KJ21".to_string(), "ERV".to_string()],
            chapters_per_request: 20,
        }
    }
}

/// Settings for the Alkitab Toba source
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TobaConfig {
    #[serde(rename = "base-url")]
    pub base_url: String,

    #[serde(rename = "language-name")]
    pub language_name: String,

    #[serde(rename = "language-code")]
    pub language_code: String,

    #[serde(rename = "version-name")]
    pub version_name: String,

    #[serde(rename = "version-code")]
    pub version_code: String,

    #[serde(rename = "version-slug")]
    pub version_slug: String,

    /// Path fragment identifying old testament book links
    #[serde(rename = "old-testament-fragment")]
    pub old_testament_fragment: String,

    /// Path fragment identifying new testament book links
    #[serde(rename = "new-testament-fragment")]
    pub new_testament_fragment: String,
}

impl Default for TobaConfig {
    fn default() -> Self {
        Self {
            base_url: "https://alkitabtoba.wordpress.com/".to_string(),
            language_name: "Bahasa Batak Toba".to_string(),
            language_code: "BBC".to_string(),
            version_name: "Bahasa Batak Toba".to_string(),
            version_code: "BBC".to_string(),
            version_slug: "Bahasa-Batak-Toba".to_string(),
            old_testament_fragment: "1-padan-na-robi".to_string(),
            new_testament_fragment: "2-padan-na-imbaru".to_string(),
        }
    }
}

/// Single-flight lock settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LockConfig {
    /// Age after which a lock left behind by a dead run may be taken over
    #[serde(rename = "stale-after-secs")]
    pub stale_after_secs: u64,
}

impl Default for LockConfig {
    fn default() -> Self {
        Self {
            stale_after_secs: 6 * 60 * 60,
        }
    }
}
