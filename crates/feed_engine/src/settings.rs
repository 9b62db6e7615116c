use std::fs;
use std::path::{Path, PathBuf};

use feed_logging::{feed_info, feed_warn};
use serde::{Deserialize, Serialize};

use crate::fetch::FetchSettings;
use crate::filter::ContentFilter;

pub const DEFAULT_BASE_URL: &str = "https://old.reddit.com";
pub const DEFAULT_APP_SCHEME: &str = "feed";
pub const DEFAULT_TRACKING_LIST_URL: &str =
    "https://raw.githubusercontent.com/DandelionSprout/adfilt/master/LegitimateURLShortener.txt";

/// User-facing configuration for the scraping pipeline.
///
/// Every field has a default, so a settings file only needs the values it changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedSettings {
    pub base_url: String,
    /// Scheme used to route in-body links back into the application.
    pub app_scheme: String,
    pub redirect_to_private_sites: bool,
    /// When off, raw URLs shown as link text are replaced by their private equivalents.
    pub show_original_url: bool,
    pub remove_tracking_params: bool,
    pub include_over_18: bool,
    pub page_limit: Option<u32>,
    pub banned_subreddits: Vec<String>,
    pub banned_authors: Vec<String>,
    pub banned_keywords: Vec<String>,
    pub tracking_list_url: String,
    pub tracking_cache_path: PathBuf,
    pub user_agent: String,
    pub redirect_limit: usize,
}

impl Default for FeedSettings {
    fn default() -> Self {
        let fetch = FetchSettings::default();
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            app_scheme: DEFAULT_APP_SCHEME.to_string(),
            redirect_to_private_sites: true,
            show_original_url: false,
            remove_tracking_params: true,
            include_over_18: false,
            page_limit: None,
            banned_subreddits: Vec::new(),
            banned_authors: Vec::new(),
            banned_keywords: Vec::new(),
            tracking_list_url: DEFAULT_TRACKING_LIST_URL.to_string(),
            tracking_cache_path: PathBuf::from("tracking_params.txt"),
            user_agent: fetch.user_agent,
            redirect_limit: fetch.redirect_limit,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("failed to read settings from {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse settings from {path:?}: {message}")]
    Parse { path: PathBuf, message: String },
}

impl FeedSettings {
    /// Load settings from a RON file. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let content = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                feed_info!("No settings at {:?}, using defaults", path);
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(SettingsError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        Self::from_ron(&content).map_err(|message| {
            feed_warn!("Rejected settings file {:?}: {}", path, message);
            SettingsError::Parse {
                path: path.to_path_buf(),
                message,
            }
        })
    }

    pub fn from_ron(content: &str) -> Result<Self, String> {
        ron::from_str(content).map_err(|err| err.to_string())
    }

    pub fn to_ron(&self) -> Result<String, String> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::new()).map_err(|err| err.to_string())
    }

    pub fn fetch_settings(&self) -> FetchSettings {
        FetchSettings {
            user_agent: self.user_agent.clone(),
            redirect_limit: self.redirect_limit,
            ..FetchSettings::default()
        }
    }

    pub fn content_filter(&self) -> ContentFilter {
        ContentFilter::new(
            &self.banned_subreddits,
            &self.banned_authors,
            &self.banned_keywords,
        )
    }
}
