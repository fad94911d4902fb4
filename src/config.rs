//! Configuration types for conversion and upload.
//!
//! Conversion knobs live in [`ConversionConfig`]; everything the remote
//! upload needs (endpoint, credential, batching) lives in [`UploadConfig`].
//! Both are built through a builder whose `build()` validates the result.

use crate::error::PaperError;
use crate::progress::UploadProgressCallback;
use chrono::Datelike;
use std::fmt;
use std::sync::Arc;

/// Environment variables consulted for the store endpoint, in order.
pub const URL_ENV_VARS: [&str; 2] = ["NEXT_PUBLIC_SUPABASE_URL", "SUPABASE_URL"];

/// Environment variable holding the privileged (service-role) key.
pub const SERVICE_KEY_ENV_VAR: &str = "SUPABASE_SERVICE_ROLE_KEY";

/// Questions inserted per remote call.
pub const DEFAULT_BATCH_SIZE: usize = 50;

/// Shared progress callback handle.
pub type ProgressCallback = Arc<dyn UploadProgressCallback>;

/// Configuration for a DOCX-to-JSON conversion.
///
/// # Example
/// ```rust
/// use paper_docx2json::ConversionConfig;
///
/// let config = ConversionConfig::builder()
///     .fallback_slug("cat-2023-slot-2")
///     .reference_year(2023)
///     .build()
///     .unwrap();
/// assert_eq!(config.current_year(), 2023);
/// ```
#[derive(Debug, Clone)]
pub struct ConversionConfig {
    /// Slug used when the metadata table has neither `slug` nor `paper_slug`.
    /// Default: `cat-2024`.
    pub fallback_slug: String,

    /// Title used when the metadata table has neither `title` nor
    /// `paper_title`. Default: `CAT 2024`.
    pub fallback_title: String,

    /// Year used when the metadata has no parseable year. `None` (the
    /// default) means the current calendar year at conversion time.
    pub reference_year: Option<i32>,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            fallback_slug: "cat-2024".to_string(),
            fallback_title: "CAT 2024".to_string(),
            reference_year: None,
        }
    }
}

impl ConversionConfig {
    /// Create a new builder for `ConversionConfig`.
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder {
            config: Self::default(),
        }
    }

    /// The year to stamp on papers that do not declare one.
    pub fn current_year(&self) -> i32 {
        self.reference_year
            .unwrap_or_else(|| chrono::Local::now().year())
    }
}

/// Builder for [`ConversionConfig`].
#[derive(Debug)]
pub struct ConversionConfigBuilder {
    config: ConversionConfig,
}

impl ConversionConfigBuilder {
    pub fn fallback_slug(mut self, slug: impl Into<String>) -> Self {
        self.config.fallback_slug = slug.into();
        self
    }

    pub fn fallback_title(mut self, title: impl Into<String>) -> Self {
        self.config.fallback_title = title.into();
        self
    }

    pub fn reference_year(mut self, year: i32) -> Self {
        self.config.reference_year = Some(year);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ConversionConfig, PaperError> {
        let c = &self.config;
        if c.fallback_slug.trim().is_empty() {
            return Err(PaperError::InvalidConfig(
                "Fallback slug must not be empty".into(),
            ));
        }
        if c.fallback_title.trim().is_empty() {
            return Err(PaperError::InvalidConfig(
                "Fallback title must not be empty".into(),
            ));
        }
        Ok(self.config)
    }
}

/// Configuration for pushing a converted document to the remote store.
#[derive(Clone)]
pub struct UploadConfig {
    /// Base endpoint of the store, e.g. `https://xyz.supabase.co`.
    pub base_url: String,

    /// Privileged access credential sent as `apikey` and bearer token.
    pub service_key: String,

    /// Questions per insert call. Default: 50.
    pub batch_size: usize,

    /// Mark the paper published after its questions are replaced. Default: false.
    pub publish: bool,

    /// Per-request HTTP timeout in seconds. Default: 30.
    pub timeout_secs: u64,

    /// Optional progress callback for upload events.
    pub progress_callback: Option<ProgressCallback>,
}

impl fmt::Debug for UploadConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadConfig")
            .field("base_url", &self.base_url)
            .field("service_key", &"<redacted>")
            .field("batch_size", &self.batch_size)
            .field("publish", &self.publish)
            .field("timeout_secs", &self.timeout_secs)
            .field(
                "progress_callback",
                &self
                    .progress_callback
                    .as_ref()
                    .map(|_| "<dyn UploadProgressCallback>"),
            )
            .finish()
    }
}

impl UploadConfig {
    /// Create a builder for the given endpoint and credential.
    pub fn builder(
        base_url: impl Into<String>,
        service_key: impl Into<String>,
    ) -> UploadConfigBuilder {
        UploadConfigBuilder {
            config: UploadConfig {
                base_url: base_url.into(),
                service_key: service_key.into(),
                batch_size: DEFAULT_BATCH_SIZE,
                publish: false,
                timeout_secs: 30,
                progress_callback: None,
            },
        }
    }

    /// Create a builder from the process environment.
    ///
    /// Fails with [`PaperError::MissingEnv`] before anything touches the
    /// network when either value is absent or empty.
    pub fn from_env() -> Result<UploadConfigBuilder, PaperError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Like [`UploadConfig::from_env`] but reads variables through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<UploadConfigBuilder, PaperError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = URL_ENV_VARS
            .iter()
            .filter_map(|name| lookup(name))
            .find(|v| !v.trim().is_empty())
            .ok_or_else(|| PaperError::MissingEnv {
                var: URL_ENV_VARS.join(" or "),
            })?;
        let service_key = lookup(SERVICE_KEY_ENV_VAR)
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| PaperError::MissingEnv {
                var: SERVICE_KEY_ENV_VAR.to_string(),
            })?;
        Ok(Self::builder(base_url.trim(), service_key.trim()))
    }
}

/// Builder for [`UploadConfig`].
#[derive(Debug)]
pub struct UploadConfigBuilder {
    config: UploadConfig,
}

impl UploadConfigBuilder {
    pub fn batch_size(mut self, n: usize) -> Self {
        self.config.batch_size = n.max(1);
        self
    }

    pub fn publish(mut self, v: bool) -> Self {
        self.config.publish = v;
        self
    }

    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.config.timeout_secs = secs;
        self
    }

    /// Attach a progress callback for upload events.
    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<UploadConfig, PaperError> {
        let c = &self.config;
        if !(c.base_url.starts_with("http://") || c.base_url.starts_with("https://")) {
            return Err(PaperError::InvalidConfig(format!(
                "Store URL must be http(s), got '{}'",
                c.base_url
            )));
        }
        if c.batch_size == 0 {
            return Err(PaperError::InvalidConfig("Batch size must be ≥ 1".into()));
        }
        if c.timeout_secs == 0 {
            return Err(PaperError::InvalidConfig("Timeout must be ≥ 1s".into()));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn conversion_defaults() {
        let c = ConversionConfig::default();
        assert_eq!(c.fallback_slug, "cat-2024");
        assert_eq!(c.fallback_title, "CAT 2024");
        assert!(c.reference_year.is_none());
    }

    #[test]
    fn empty_fallback_slug_is_rejected() {
        let err = ConversionConfig::builder().fallback_slug("  ").build();
        assert!(matches!(err, Err(PaperError::InvalidConfig(_))));
    }

    #[test]
    fn upload_config_from_env_prefers_public_url() {
        let cfg = UploadConfig::from_lookup(env(&[
            ("NEXT_PUBLIC_SUPABASE_URL", "https://public.example"),
            ("SUPABASE_URL", "https://private.example"),
            ("SUPABASE_SERVICE_ROLE_KEY", "secret"),
        ]))
        .unwrap()
        .build()
        .unwrap();
        assert_eq!(cfg.base_url, "https://public.example");
        assert_eq!(cfg.batch_size, DEFAULT_BATCH_SIZE);
    }

    #[test]
    fn upload_config_falls_back_to_plain_url() {
        let cfg = UploadConfig::from_lookup(env(&[
            ("NEXT_PUBLIC_SUPABASE_URL", ""),
            ("SUPABASE_URL", "https://private.example"),
            ("SUPABASE_SERVICE_ROLE_KEY", "secret"),
        ]))
        .unwrap()
        .build()
        .unwrap();
        assert_eq!(cfg.base_url, "https://private.example");
    }

    #[test]
    fn missing_key_fails_fast() {
        let err = UploadConfig::from_lookup(env(&[("SUPABASE_URL", "https://x.example")]))
            .unwrap_err();
        match err {
            PaperError::MissingEnv { var } => assert_eq!(var, SERVICE_KEY_ENV_VAR),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn missing_url_fails_fast() {
        let err = UploadConfig::from_lookup(env(&[("SUPABASE_SERVICE_ROLE_KEY", "k")]))
            .unwrap_err();
        assert!(matches!(err, PaperError::MissingEnv { .. }));
    }

    #[test]
    fn debug_redacts_service_key() {
        let cfg = UploadConfig::builder("https://x.example", "super-secret")
            .build()
            .unwrap();
        let dbg = format!("{cfg:?}");
        assert!(!dbg.contains("super-secret"));
        assert!(dbg.contains("<redacted>"));
    }

    #[test]
    fn non_http_url_is_rejected() {
        let err = UploadConfig::builder("ftp://x", "k").build();
        assert!(matches!(err, Err(PaperError::InvalidConfig(_))));
    }
}
