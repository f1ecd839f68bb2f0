use thiserror::Error;

/// Failures surfaced by the scene engine.
///
/// `AssetLoadFailure` is produced by backends when a background image cannot be
/// fetched or decoded. The scene builder recovers from it by falling back to the
/// theme's solid color, so callers of [`crate::Stage`] never see it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BiomeError {
    #[error("unknown theme key: {0:?}")]
    UnknownThemeKey(String),

    #[error("failed to load asset {url}: {reason}")]
    AssetLoadFailure { url: String, reason: String },

    #[error("render backend resource acquisition failed: {0}")]
    ResourceAcquisitionFailure(String),
}

impl BiomeError {
    pub fn asset(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::AssetLoadFailure {
            url: url.into(),
            reason: reason.into(),
        }
    }

    pub fn acquisition(reason: impl Into<String>) -> Self {
        Self::ResourceAcquisitionFailure(reason.into())
    }
}
