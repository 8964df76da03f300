use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumIter};

/// Cookie SameSite 策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, EnumIter, AsRefStr)]
#[serde(rename_all = "PascalCase")]
#[strum(serialize_all = "PascalCase")]
pub enum SameSitePolicy {
    #[default]
    Strict,
    Lax,
    None,
}

impl std::fmt::Display for SameSitePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_ref())
    }
}

impl std::str::FromStr for SameSitePolicy {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "strict" => Ok(Self::Strict),
            "lax" => Ok(Self::Lax),
            "none" => Ok(Self::None),
            _ => Err(format!(
                "Invalid SameSite policy: '{}'. Valid: Strict, Lax, None",
                s
            )),
        }
    }
}

/// 短链接 API 的端点风格
///
/// - `Links`: `/links`, `/links/{id}`
/// - `Url`: `/url/user/urls`, `/url/shorten`, `/url/{code}`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, EnumIter, AsRefStr)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ApiStyle {
    #[default]
    Links,
    Url,
}

/// 静态配置（从 TOML 加载，启动时使用）
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StaticConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub site: SiteConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub guard: GuardConfig,
    #[serde(default)]
    pub links: LinksConfig,
    #[serde(default)]
    pub country: CountryConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl StaticConfig {
    /// 从默认路径 `config.toml` 和环境变量加载配置
    pub fn load() -> Self {
        Self::load_from("config.toml")
    }

    /// 从指定 TOML 文件和环境变量加载配置
    ///
    /// 优先级：ENV > TOML > 默认值
    /// ENV 前缀：LD，分隔符：__
    /// 示例：LD__API__BASE_URL=https://api.example.com
    pub fn load_from(path: &str) -> Self {
        use config::{Config, Environment, File};

        let builder = Config::builder()
            .add_source(File::with_name(path).required(false))
            .add_source(
                Environment::with_prefix("LD")
                    .separator("__")
                    .try_parsing(true),
            );

        match builder.build() {
            Ok(settings) => match settings.try_deserialize::<StaticConfig>() {
                Ok(config) => {
                    if std::path::Path::new(path).exists() {
                        eprintln!("[INFO] Configuration loaded from: {}", path);
                    }
                    config
                }
                Err(e) => {
                    eprintln!("[ERROR] Failed to deserialize config: {}", e);
                    Self::default()
                }
            },
            Err(e) => {
                eprintln!("[ERROR] Failed to build config: {}", e);
                Self::default()
            }
        }
    }

    /// 生成示例 TOML 配置文件
    pub fn generate_sample_config() -> String {
        toml::to_string_pretty(&Self::default())
            .unwrap_or_else(|e| format!("Error generating sample config: {}", e))
    }

    /// 保存配置到 TOML 文件
    pub fn save_to_file<P: AsRef<std::path::Path>>(
        &self,
        path: P,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let content = toml::to_string_pretty(self)?;

        if let Some(parent) = path.as_ref().parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, content)?;
        Ok(())
    }
}

/// 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_server_host")]
    pub host: String,
    #[serde(default = "default_server_port")]
    pub port: u16,
    #[serde(default = "default_cpu_count")]
    pub cpu_count: usize,
}

/// 后端 API 配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_api_base_url")]
    pub base_url: String,
    #[serde(default = "default_api_timeout")]
    pub timeout_secs: u64,
    /// Mock 后端签发 JWT 使用的密钥
    #[serde(default = "default_mock_secret")]
    pub mock_secret: String,
}

/// 站点配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    #[serde(default = "default_site_base_url")]
    pub base_url: String,
    /// `development` 或 `production`
    #[serde(default = "default_environment")]
    pub environment: String,
}

impl SiteConfig {
    pub fn is_production(&self) -> bool {
        self.environment.eq_ignore_ascii_case("production")
    }

    /// 拼接短链接的完整地址
    pub fn short_url(&self, short_code: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), short_code)
    }
}

/// 会话令牌与认证路由配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// 本地持久化存储使用的键
    #[serde(default = "default_token_key")]
    pub storage_key: String,
    #[serde(default = "default_token_key")]
    pub cookie_name: String,
    #[serde(default = "default_cookie_max_age_days")]
    pub cookie_max_age_days: i64,
    #[serde(default)]
    pub cookie_same_site: SameSitePolicy,
    /// 未设置时在 production 环境下自动启用
    #[serde(default)]
    pub cookie_secure: Option<bool>,
    /// CLI 保存令牌文件的目录
    #[serde(default = "default_token_dir")]
    pub token_dir: String,
    #[serde(default = "default_login_path")]
    pub login_path: String,
    #[serde(default = "default_signup_path")]
    pub signup_path: String,
    #[serde(default = "default_redirect")]
    pub default_redirect: String,
}

impl AuthConfig {
    pub fn cookie_secure(&self, site: &SiteConfig) -> bool {
        self.cookie_secure.unwrap_or_else(|| site.is_production())
    }
}

/// 边缘路由守卫配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuardConfig {
    #[serde(default = "default_protected_routes")]
    pub protected_routes: Vec<String>,
    #[serde(default = "default_auth_routes")]
    pub auth_routes: Vec<String>,
    #[serde(default = "default_bypass_prefixes")]
    pub bypass_prefixes: Vec<String>,
    #[serde(default = "default_bypass_exact")]
    pub bypass_exact: Vec<String>,
    /// 短码跳转查询的后端地址
    #[serde(default = "default_redirect_base_url")]
    pub redirect_base_url: String,
    #[serde(default = "default_probe_timeout_ms")]
    pub probe_timeout_ms: u64,
}

/// 链接管理配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinksConfig {
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    #[serde(default = "default_links_cache_ttl")]
    pub cache_ttl_secs: u64,
    #[serde(default = "default_links_cache_capacity")]
    pub cache_capacity: u64,
    #[serde(default)]
    pub api_style: ApiStyle,
}

/// 访客国家检测配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CountryConfig {
    #[serde(default = "default_country_lookup_url")]
    pub lookup_url: String,
    #[serde(default = "default_country_timeout")]
    pub timeout_secs: u64,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default = "default_max_backups")]
    pub max_backups: u32,
    #[serde(default = "default_enable_rotation")]
    pub enable_rotation: bool,
}

// ============================================================
// Default value functions for static config
// ============================================================

fn default_server_host() -> String {
    "127.0.0.1".to_string()
}

fn default_server_port() -> u16 {
    3000
}

fn default_cpu_count() -> usize {
    num_cpus::get()
}

fn default_api_base_url() -> String {
    "http://localhost:4000/api".to_string()
}

fn default_api_timeout() -> u64 {
    10
}

fn default_mock_secret() -> String {
    "linkdash-mock-secret".to_string()
}

fn default_site_base_url() -> String {
    "https://capp.to".to_string()
}

fn default_environment() -> String {
    "development".to_string()
}

fn default_token_key() -> String {
    "auth_tokens".to_string()
}

fn default_cookie_max_age_days() -> i64 {
    7
}

fn default_token_dir() -> String {
    ".linkdash".to_string()
}

fn default_login_path() -> String {
    "/login".to_string()
}

fn default_signup_path() -> String {
    "/signup".to_string()
}

fn default_redirect() -> String {
    "/dashboard".to_string()
}

fn default_protected_routes() -> Vec<String> {
    vec!["/dashboard".to_string(), "/settings".to_string()]
}

fn default_auth_routes() -> Vec<String> {
    vec!["/login".to_string(), "/signup".to_string()]
}

fn default_bypass_prefixes() -> Vec<String> {
    vec!["/_next".to_string(), "/static".to_string()]
}

fn default_bypass_exact() -> Vec<String> {
    vec!["/favicon.ico".to_string(), "/sitemap.xml".to_string()]
}

fn default_redirect_base_url() -> String {
    "http://localhost:4000".to_string()
}

fn default_probe_timeout_ms() -> u64 {
    3000
}

fn default_page_size() -> u32 {
    10
}

fn default_links_cache_ttl() -> u64 {
    300
}

fn default_links_cache_capacity() -> u64 {
    1000
}

fn default_country_lookup_url() -> String {
    "https://ipinfo.io/json".to_string()
}

fn default_country_timeout() -> u64 {
    3
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

fn default_max_backups() -> u32 {
    5
}

fn default_enable_rotation() -> bool {
    true
}

// ============================================================
// Default implementations
// ============================================================

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_server_host(),
            port: default_server_port(),
            cpu_count: default_cpu_count(),
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_api_base_url(),
            timeout_secs: default_api_timeout(),
            mock_secret: default_mock_secret(),
        }
    }
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: default_site_base_url(),
            environment: default_environment(),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            storage_key: default_token_key(),
            cookie_name: default_token_key(),
            cookie_max_age_days: default_cookie_max_age_days(),
            cookie_same_site: SameSitePolicy::default(),
            cookie_secure: None,
            token_dir: default_token_dir(),
            login_path: default_login_path(),
            signup_path: default_signup_path(),
            default_redirect: default_redirect(),
        }
    }
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            protected_routes: default_protected_routes(),
            auth_routes: default_auth_routes(),
            bypass_prefixes: default_bypass_prefixes(),
            bypass_exact: default_bypass_exact(),
            redirect_base_url: default_redirect_base_url(),
            probe_timeout_ms: default_probe_timeout_ms(),
        }
    }
}

impl Default for LinksConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            cache_ttl_secs: default_links_cache_ttl(),
            cache_capacity: default_links_cache_capacity(),
            api_style: ApiStyle::default(),
        }
    }
}

impl Default for CountryConfig {
    fn default() -> Self {
        Self {
            lookup_url: default_country_lookup_url(),
            timeout_secs: default_country_timeout(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            file: None,
            max_backups: default_max_backups(),
            enable_rotation: default_enable_rotation(),
        }
    }
}
