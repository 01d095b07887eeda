use std::path::Path;

use serde::{Deserialize, Serialize};

/// Polygon WMATIC, the token contributions default to.
pub const DEFAULT_CURRENCY: &str = "0x9c3C9283D3e44854697Cd22D3Faa240Cfb032889";

/// Configuration for a local VMS workspace.
///
/// This struct holds settings that control how posts are published and how
/// the local post store is loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Versions", into = "Versions")]
pub struct Config {
    /// Application identifier stamped on every published post.
    app_id: String,

    /// Locale stamped on every published post.
    locale: String,

    /// Token address used for new causes when none is given.
    default_currency: String,

    /// Display symbol of [`Config::default_currency`].
    default_currency_symbol: String,

    /// VHR goal assumed for a profile that has never published one.
    default_vhr_goal: u32,

    /// Whether the post store may contain files that are not valid posts.
    ///
    /// When `false` (the default), loading fails on the first unreadable
    /// file. When `true`, such files are skipped and logged.
    pub allow_unrecognised: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            app_id: default_app_id(),
            locale: default_locale(),
            default_currency: DEFAULT_CURRENCY.to_string(),
            default_currency_symbol: default_currency_symbol(),
            default_vhr_goal: default_vhr_goal(),
            allow_unrecognised: false,
        }
    }
}

impl Config {
    /// Loads the configuration from a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or if the TOML content is
    /// invalid.
    pub fn load(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file: {e}"))?;
        toml::from_str(&content).map_err(|e| format!("Failed to parse config file: {e}"))
    }

    /// Saves the configuration to a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be serialized to TOML or if
    /// the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), String> {
        let content =
            toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize config: {e}"))?;
        std::fs::write(path, content).map_err(|e| format!("Failed to write config file: {e}"))
    }

    /// The application identifier stamped on posts.
    #[must_use]
    pub fn app_id(&self) -> &str {
        &self.app_id
    }

    /// The locale stamped on posts.
    #[must_use]
    pub fn locale(&self) -> &str {
        &self.locale
    }

    /// Token address used for new causes when none is given.
    #[must_use]
    pub fn default_currency(&self) -> &str {
        &self.default_currency
    }

    /// How to display the token at `currency`: the configured symbol for the
    /// default currency, the address itself for anything else.
    #[must_use]
    pub fn currency_label<'a>(&'a self, currency: &'a str) -> &'a str {
        if currency.eq_ignore_ascii_case(&self.default_currency) {
            &self.default_currency_symbol
        } else {
            currency
        }
    }

    /// VHR goal assumed when a profile has not published one.
    #[must_use]
    pub const fn default_vhr_goal(&self) -> u32 {
        self.default_vhr_goal
    }

    /// Sets the default VHR goal.
    pub const fn set_default_vhr_goal(&mut self, goal: u32) {
        self.default_vhr_goal = goal;
    }
}

fn default_app_id() -> String {
    "BCharity".to_string()
}

fn default_locale() -> String {
    "en".to_string()
}

fn default_currency() -> String {
    DEFAULT_CURRENCY.to_string()
}

fn default_currency_symbol() -> String {
    "WMATIC".to_string()
}

const fn default_vhr_goal() -> u32 {
    600
}

/// The serialized versions of the configuration.
/// This allows for future changes to the configuration format and to the domain
/// type without breaking compatibility.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "_version")]
enum Versions {
    #[serde(rename = "1")]
    V1 {
        #[serde(default = "default_app_id")]
        app_id: String,

        #[serde(default = "default_locale")]
        locale: String,

        #[serde(default = "default_currency")]
        default_currency: String,

        #[serde(default = "default_currency_symbol")]
        default_currency_symbol: String,

        /// Hours; the dashboards fell back to 600 before goals existed.
        #[serde(default = "default_vhr_goal")]
        default_vhr_goal: u32,

        #[serde(default)]
        allow_unrecognised: bool,
    },
}

impl From<Versions> for Config {
    fn from(versions: Versions) -> Self {
        match versions {
            Versions::V1 {
                app_id,
                locale,
                default_currency,
                default_currency_symbol,
                default_vhr_goal,
                allow_unrecognised,
            } => Self {
                app_id,
                locale,
                default_currency,
                default_currency_symbol,
                default_vhr_goal,
                allow_unrecognised,
            },
        }
    }
}

impl From<Config> for Versions {
    fn from(config: Config) -> Self {
        Self::V1 {
            app_id: config.app_id,
            locale: config.locale,
            default_currency: config.default_currency,
            default_currency_symbol: config.default_currency_symbol,
            default_vhr_goal: config.default_vhr_goal,
            allow_unrecognised: config.allow_unrecognised,
        }
    }
}
