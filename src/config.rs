use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;

/// Every reaction the web UI offers for selection
pub const ALL_EMOJIS: &[&str] = &[
    "❤️", "👍", "👎", "🔥", "🥰", "👏", "😁", "🤔", "🤯", "😱", "🤬", "😢", "🎉", "🤩", "🤮",
    "💩", "🙏", "👌", "🕊", "🤡", "🥱", "🥴", "😍", "🐳", "❤‍🔥", "🌚", "🌭", "💯", "🤣", "⚡",
    "🍌", "🏆", "💔", "🤨", "😐", "🍓", "🍾", "💋", "🖕", "😈", "😴", "😭", "🤓", "👻", "👨‍💻",
    "👀", "🎃", "🙈", "😇", "😨", "🤝", "✍", "🤗", "🫡", "🎅", "🎄", "☃", "💅", "🤪", "🗿",
    "🆒", "💘", "🙉", "🦄", "😘", "💊", "🙊", "😎", "👾", "🤷‍♂", "🤷", "🤷‍♀", "😡", "🤍", "💜",
    "💙", "💚", "💛", "🧡", "🖤", "🤎", "❤", "♥", "💕", "💞", "💓", "💗", "💖", "💝", "👍🏻",
    "👍🏼", "👍🏽", "👍🏾", "👍🏿", "❣️", "♥️",
];

/// Hearts and thumbs-up variants counted by default
pub const DEFAULT_TARGET_EMOJIS: &[&str] = &[
    "❤️", "👍", "🤍", "💜", "💙", "💚", "💛", "🧡", "🖤", "🤎", "❤", "♥", "💕", "💞", "💓", "💗",
    "💖", "💘", "💝", "👍🏻", "👍🏼", "👍🏽", "👍🏾", "👍🏿", "🙏", "🔥", "💯", "❣️", "♥️",
];

/// Default configuration file looked up in the working directory
pub const CONFIG_FILE: &str = "config.toml";

pub fn default_target_emojis() -> Vec<String> {
    DEFAULT_TARGET_EMOJIS.iter().map(|e| (*e).to_string()).collect()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TelegramConfig {
    pub api_id: Option<i64>,
    pub api_hash: Option<String>,
    /// Session file of the user client; resolved to an absolute path on load
    pub session_name: String,
    pub bot_token: String,
    /// Base URL of the user-session gateway
    pub gateway_url: String,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            api_id: None,
            api_hash: None,
            session_name: "telegram_session".to_string(),
            bot_token: String::new(),
            gateway_url: "http://127.0.0.1:8081".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ProxyKind {
    #[default]
    Http,
    Socks4,
    Socks5,
}

impl ProxyKind {
    pub fn scheme(self) -> &'static str {
        match self {
            Self::Http => "http",
            Self::Socks4 => "socks4",
            Self::Socks5 => "socks5",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProxyConfig {
    pub enabled: bool,
    #[serde(rename = "type")]
    pub kind: ProxyKind,
    pub host: String,
    pub port: u16,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            kind: ProxyKind::Http,
            host: "127.0.0.1".to_string(),
            port: 7890,
        }
    }
}

impl ProxyConfig {
    /// The HTTP client speaks HTTP and SOCKS5 proxies only
    pub fn validate(&self) -> crate::Result<()> {
        if self.enabled && self.kind == ProxyKind::Socks4 {
            return Err(crate::ChanRankError::Config(
                "proxy type SOCKS4 is not supported, use SOCKS5 or HTTP".to_string(),
            ));
        }
        Ok(())
    }

    /// Proxy URL for HTTP clients, `None` when disabled
    pub fn url(&self) -> Option<String> {
        self.enabled
            .then(|| format!("{}://{}:{}", self.kind.scheme(), self.host, self.port))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub phone: String,
    pub code: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    pub channel: String,
    pub start_date: String,
    pub end_date: String,
    pub target_emojis: Vec<String>,
    /// Entries shown by the console ranking
    pub top_n: usize,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            channel: String::new(),
            start_date: String::new(),
            end_date: String::new(),
            target_emojis: default_target_emojis(),
            top_n: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub dir: PathBuf,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("cache"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WebConfig {
    pub host: String,
    pub port: u16,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8501,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub telegram: TelegramConfig,
    pub proxy: ProxyConfig,
    pub auth: AuthConfig,
    pub analyzer: AnalyzerConfig,
    pub cache: CacheConfig,
    pub logging: LoggingConfig,
    pub web: WebConfig,
}

impl AppConfig {
    /// Parse configuration from a TOML string, without env overrides
    pub fn from_toml_str(content: &str) -> crate::Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.proxy.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file, without env overrides
    pub fn from_file<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Load `config.toml` from the working directory (defaults when absent),
    /// then apply environment overrides.
    ///
    /// Precedence: environment variable > file value > built-in default.
    pub fn load() -> crate::Result<Self> {
        Self::load_from(Path::new(CONFIG_FILE))
    }

    pub fn load_from(path: &Path) -> crate::Result<Self> {
        let mut config = if path.exists() {
            Self::from_file(path)?
        } else {
            tracing::debug!("{} not found, using built-in defaults", path.display());
            Self::default()
        };

        config.apply_overrides(|key| std::env::var(key).ok())?;

        let base_dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
        config.resolve_session_path(&base_dir);
        Ok(config)
    }

    /// Apply overrides from a variable lookup. Empty values are ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> crate::Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(raw) = get("TELEGRAM_API_ID") {
            let api_id = raw.trim().parse::<i64>().map_err(|e| {
                crate::ChanRankError::Config(format!("TELEGRAM_API_ID must be numeric: {e}"))
            })?;
            self.telegram.api_id = Some(api_id);
        }
        if let Some(v) = get("TELEGRAM_API_HASH") {
            self.telegram.api_hash = Some(v);
        }
        if let Some(v) = get("TELEGRAM_BOT_TOKEN") {
            self.telegram.bot_token = v;
        }
        if let Some(v) = get("TELEGRAM_GATEWAY_URL") {
            self.telegram.gateway_url = v;
        }
        if let Some(v) = get("TELEGRAM_PHONE") {
            self.auth.phone = v;
        }
        if let Some(v) = get("TELEGRAM_CODE") {
            self.auth.code = v;
        }
        if let Some(v) = get("TELEGRAM_PASSWORD") {
            self.auth.password = v;
        }
        if let Some(v) = get("TELEGRAM_CHANNEL") {
            self.analyzer.channel = v;
        }
        if let Some(v) = get("START_DATE") {
            self.analyzer.start_date = v;
        }
        if let Some(v) = get("END_DATE") {
            self.analyzer.end_date = v;
        }
        if let Some(v) = get("TARGET_EMOJIS") {
            self.analyzer.target_emojis = parse_emoji_list(&v);
        }
        if let Some(v) = get("CHANRANK_CACHE_DIR") {
            self.cache.dir = PathBuf::from(v);
        }
        if let Some(v) = get("CHANRANK_LOG_LEVEL") {
            self.logging.level = v;
        }
        Ok(())
    }

    /// Make `session_name` absolute relative to `base_dir`
    pub fn resolve_session_path(&mut self, base_dir: &Path) {
        let session = Path::new(&self.telegram.session_name);
        if session.is_absolute() {
            return;
        }
        let base = std::fs::canonicalize(base_dir).unwrap_or_else(|_| base_dir.to_path_buf());
        let base = if base.is_absolute() {
            base
        } else {
            std::env::current_dir()
                .map(|cwd| cwd.join(&base))
                .unwrap_or(base)
        };
        self.telegram.session_name = base.join(session).to_string_lossy().into_owned();
    }

    /// Get cache directory
    pub fn cache_dir(&self) -> &Path {
        &self.cache.dir
    }

    /// Get configured target emojis
    pub fn target_emojis(&self) -> &[String] {
        &self.analyzer.target_emojis
    }

    /// Get gateway base URL
    pub fn gateway_url(&self) -> &str {
        &self.telegram.gateway_url
    }

    pub fn has_bot_token(&self) -> bool {
        !self.telegram.bot_token.trim().is_empty()
    }
}

/// Split a comma separated emoji list, dropping blanks
pub fn parse_emoji_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
