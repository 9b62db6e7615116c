//! Remotely maintained list of tracking query parameters.
//!
//! The list is read from a local cache file first and downloaded when the
//! cache is missing. Readers always get a complete snapshot: a refresh swaps
//! the in-memory list only after the new one is parsed and persisted.
use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use feed_logging::{feed_debug, feed_info, feed_warn};
use url::Url;

use crate::fetch::{fetch_html, Fetcher, ReqwestFetcher};
use crate::persist::{AtomicFileWriter, PersistError};
use crate::settings::{FeedSettings, DEFAULT_TRACKING_LIST_URL};
use crate::FetchError;

const REMOVE_PARAM_PREFIX: &str = "$removeparam=";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackingListConfig {
    pub source_url: String,
    pub cache_path: PathBuf,
}

impl TrackingListConfig {
    pub fn from_settings(settings: &FeedSettings) -> Self {
        Self {
            source_url: settings.tracking_list_url.clone(),
            cache_path: settings.tracking_cache_path.clone(),
        }
    }
}

impl Default for TrackingListConfig {
    fn default() -> Self {
        Self {
            source_url: DEFAULT_TRACKING_LIST_URL.to_string(),
            cache_path: PathBuf::from("tracking_params.txt"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TrackingListError {
    #[error("tracking list download failed: {0}")]
    Download(#[from] FetchError),
    #[error("tracking list cache unavailable: {0}")]
    Persist(#[from] PersistError),
    #[error("tracking list contained no parameters")]
    Empty,
}

/// Observable load state of a [`TrackingParams`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackingStatus {
    Unloaded,
    Loading,
    Loaded(usize),
}

#[derive(Debug)]
enum TrackingState {
    Unloaded,
    /// A refresh is running; `stale` keeps serving the previous list meanwhile.
    Loading { stale: Option<Arc<Vec<String>>> },
    Loaded(Arc<Vec<String>>),
}

pub struct TrackingParams {
    config: TrackingListConfig,
    fetcher: Arc<dyn Fetcher>,
    state: RwLock<TrackingState>,
    refresh: tokio::sync::Mutex<()>,
}

impl TrackingParams {
    /// An empty, unloaded list. Call [`Self::initialize`] for the usual startup path.
    pub fn new(config: TrackingListConfig, fetcher: Arc<dyn Fetcher>) -> Self {
        Self {
            config,
            fetcher,
            state: RwLock::new(TrackingState::Unloaded),
            refresh: tokio::sync::Mutex::new(()),
        }
    }

    /// A list that starts loaded with the given parameter names.
    pub fn preloaded(entries: Vec<String>) -> Self {
        let params = Self::new(
            TrackingListConfig::default(),
            Arc::new(ReqwestFetcher::default()),
        );
        *params.write_state() = TrackingState::Loaded(Arc::new(entries));
        params
    }

    /// Load from the cache file, or start a background download when it is missing.
    ///
    /// Returns immediately in both cases; until a download lands the list is
    /// empty, which makes removal a no-op.
    pub async fn initialize(config: TrackingListConfig, fetcher: Arc<dyn Fetcher>) -> Arc<Self> {
        let params = Arc::new(Self::new(config, fetcher));
        match params.load_from_cache() {
            Ok(count) => {
                feed_info!("Loaded {} tracking parameters from cache", count);
            }
            Err(err) => {
                feed_info!("Tracking list cache miss ({}), downloading", err);
                *params.write_state() = TrackingState::Loading { stale: None };
                let background = params.clone();
                tokio::spawn(async move {
                    if let Err(err) = background.update_tracking_list().await {
                        feed_warn!("Background tracking list download failed: {}", err);
                    }
                });
            }
        }
        params
    }

    pub fn config(&self) -> &TrackingListConfig {
        &self.config
    }

    /// Replace the in-memory list with the cache file content.
    pub fn load_from_cache(&self) -> Result<usize, TrackingListError> {
        let content = fs::read_to_string(&self.config.cache_path).map_err(PersistError::from)?;
        let entries = parse_tracking_list(&content);
        if entries.is_empty() {
            return Err(TrackingListError::Empty);
        }
        let count = entries.len();
        *self.write_state() = TrackingState::Loaded(Arc::new(entries));
        Ok(count)
    }

    /// Download the list, replace the cache file, then swap the in-memory list.
    ///
    /// On any failure the previous list stays in effect. Concurrent calls run
    /// one after another. An unload that lands while the download runs wins:
    /// the cache file is still replaced but the list stays unloaded.
    pub async fn update_tracking_list(&self) -> Result<usize, TrackingListError> {
        let _refresh = self.refresh.lock().await;
        let previous = self.begin_loading();
        let result = self.download_and_persist().await;

        let mut state = self.write_state();
        if let TrackingState::Unloaded = *state {
            feed_debug!("Tracking list was unloaded during refresh; keeping it unloaded");
            return result.map(|entries| entries.len());
        }
        match result {
            Ok(entries) => {
                let count = entries.len();
                *state = TrackingState::Loaded(Arc::new(entries));
                feed_info!("Tracking list updated with {} parameters", count);
                Ok(count)
            }
            Err(err) => {
                *state = match previous {
                    Some(list) => TrackingState::Loaded(list),
                    None => TrackingState::Unloaded,
                };
                Err(err)
            }
        }
    }

    /// Drop the in-memory list. The cache file is left alone.
    pub fn unload_tracking_list(&self) {
        *self.write_state() = TrackingState::Unloaded;
        feed_debug!("Tracking list unloaded");
    }

    pub fn status(&self) -> TrackingStatus {
        match &*self.read_state() {
            TrackingState::Unloaded => TrackingStatus::Unloaded,
            TrackingState::Loading { .. } => TrackingStatus::Loading,
            TrackingState::Loaded(list) => TrackingStatus::Loaded(list.len()),
        }
    }

    /// The list currently in effect; empty while nothing is loaded.
    pub fn snapshot(&self) -> Arc<Vec<String>> {
        match &*self.read_state() {
            TrackingState::Loaded(list) => list.clone(),
            TrackingState::Loading { stale: Some(list) } => list.clone(),
            TrackingState::Loading { stale: None } | TrackingState::Unloaded => {
                Arc::new(Vec::new())
            }
        }
    }

    fn begin_loading(&self) -> Option<Arc<Vec<String>>> {
        let mut state = self.write_state();
        let previous = match &*state {
            TrackingState::Loaded(list) => Some(list.clone()),
            TrackingState::Loading { stale } => stale.clone(),
            TrackingState::Unloaded => None,
        };
        *state = TrackingState::Loading {
            stale: previous.clone(),
        };
        previous
    }

    async fn download_and_persist(&self) -> Result<Vec<String>, TrackingListError> {
        let content = fetch_html(self.fetcher.as_ref(), &self.config.source_url).await?;
        let entries = parse_tracking_list(&content);
        if entries.is_empty() {
            return Err(TrackingListError::Empty);
        }
        AtomicFileWriter::new(self.config.cache_path.clone()).write(&content)?;
        Ok(entries)
    }

    fn read_state(&self) -> RwLockReadGuard<'_, TrackingState> {
        self.state.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, TrackingState> {
        self.state.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Parse `$removeparam=<name>` lines. Blank lines, `!` comments and other rules are skipped.
pub fn parse_tracking_list(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.contains('!'))
        .filter_map(|line| line.strip_prefix(REMOVE_PARAM_PREFIX))
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

/// Strips blocklisted query parameters from URLs.
#[derive(Clone)]
pub struct TrackingParamRemover {
    params: Arc<TrackingParams>,
    enabled: bool,
}

impl TrackingParamRemover {
    pub fn new(params: Arc<TrackingParams>, enabled: bool) -> Self {
        Self { params, enabled }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn params(&self) -> &Arc<TrackingParams> {
        &self.params
    }

    /// Remove every query parameter whose name is on the list, ignoring case.
    ///
    /// Surviving parameters keep their order; the `?` goes away with the last
    /// one. Anything that is not a valid URL comes back unchanged.
    pub fn clean(&self, url: &str) -> String {
        if !self.enabled {
            return url.to_string();
        }
        let list = self.params.snapshot();
        if list.is_empty() {
            return url.to_string();
        }
        let Ok(mut parsed) = Url::parse(url) else {
            return url.to_string();
        };
        let Some(query) = parsed.query() else {
            return url.to_string();
        };

        let segments: Vec<&str> = query.split('&').collect();
        let kept: Vec<&str> = segments
            .iter()
            .copied()
            .filter(|segment| {
                let name = segment.split('=').next().unwrap_or(segment);
                !list.iter().any(|blocked| blocked.eq_ignore_ascii_case(name))
            })
            .collect();

        if kept.len() == segments.len() {
            return url.to_string();
        }
        let kept = kept.join("&");
        if kept.is_empty() {
            parsed.set_query(None);
        } else {
            parsed.set_query(Some(&kept));
        }
        parsed.into()
    }
}

#[cfg(test)]
mod tests {
    use super::parse_tracking_list;

    #[test]
    fn list_format_is_filtered_and_stripped() {
        let content = "! Title: shortener list\n\n$removeparam=utm_source\n  $removeparam=fbclid  \n||example.com^$removeparam=ref\n$removeparam=\n! $removeparam=commented\n";
        assert_eq!(
            parse_tracking_list(content),
            vec!["utm_source".to_string(), "fbclid".to_string()]
        );
    }
}
