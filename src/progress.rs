//! Progress-callback trait for per-stage conversion events.
//!
//! Inject an [`Arc<dyn ConversionProgressCallback>`] via
//! [`crate::config::ConversionConfigBuilder::progress_callback`] to observe
//! the per-invocation state machine:
//!
//! ```text
//! Idle → Loading → Decoding → Rasterizing → Encoding → Downloaded
//!           └──────────┴───────────┴────────────┴──▶ Failed
//! ```
//!
//! # Example
//!
//! ```rust
//! use imgconv::{ConversionConfig, ConversionProgressCallback, ConversionStage};
//! use std::sync::Arc;
//!
//! struct Printer;
//!
//! impl ConversionProgressCallback for Printer {
//!     fn on_stage(&self, stage: ConversionStage) {
//!         eprintln!("→ {stage}");
//!     }
//! }
//!
//! let config = ConversionConfig::builder()
//!     .progress_callback(Arc::new(Printer) as Arc<dyn ConversionProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Where a conversion currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConversionStage {
    #[default]
    Idle,
    Loading,
    Decoding,
    Rasterizing,
    Encoding,
    Downloaded,
    Failed,
}

impl ConversionStage {
    /// `true` for `Downloaded` and `Failed`.
    pub fn is_terminal(self) -> bool {
        matches!(self, ConversionStage::Downloaded | ConversionStage::Failed)
    }
}

impl fmt::Display for ConversionStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ConversionStage::Idle => "idle",
            ConversionStage::Loading => "loading",
            ConversionStage::Decoding => "decoding",
            ConversionStage::Rasterizing => "rasterizing",
            ConversionStage::Encoding => "encoding",
            ConversionStage::Downloaded => "downloaded",
            ConversionStage::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Called by the pipeline as a conversion advances.
///
/// All methods default to no-ops so callers only override what they need.
/// Must be `Send + Sync`: independent conversions may share one callback.
pub trait ConversionProgressCallback: Send + Sync {
    /// Called once before loading starts.
    ///
    /// # Arguments
    /// * `file_name` — display name of the selected file
    /// * `format`    — target format token (`png`, `webp`, `jpeg`)
    fn on_conversion_start(&self, file_name: &str, format: &str) {
        let _ = (file_name, format);
    }

    /// Called on every state-machine transition, terminal ones included.
    fn on_stage(&self, stage: ConversionStage) {
        let _ = stage;
    }

    /// Called after the download artifact is ready.
    ///
    /// # Arguments
    /// * `download_name` — e.g. `img.webp`
    /// * `bytes`         — encoded size
    fn on_conversion_complete(&self, download_name: &str, bytes: usize) {
        let _ = (download_name, bytes);
    }

    /// Called when the pipeline fails.
    ///
    /// # Arguments
    /// * `stage` — the stage that was running
    /// * `error` — detailed (not user-facing) error description
    fn on_conversion_error(&self, stage: ConversionStage, error: &str) {
        let _ = (stage, error);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl ConversionProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ConversionConfig`].
pub type ProgressCallback = Arc<dyn ConversionProgressCallback>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        stages: Mutex<Vec<ConversionStage>>,
    }

    impl ConversionProgressCallback for Recorder {
        fn on_stage(&self, stage: ConversionStage) {
            self.stages.lock().unwrap().push(stage);
        }
    }

    #[test]
    fn noop_callback_does_not_panic() {
        let cb = NoopProgressCallback;
        cb.on_conversion_start("a.png", "webp");
        cb.on_stage(ConversionStage::Loading);
        cb.on_conversion_complete("img.webp", 10);
        cb.on_conversion_error(ConversionStage::Decoding, "bad");
    }

    #[test]
    fn arc_dyn_callback_records() {
        let rec = Arc::new(Recorder::default());
        let cb: ProgressCallback = rec.clone();
        cb.on_stage(ConversionStage::Loading);
        cb.on_stage(ConversionStage::Failed);
        assert_eq!(
            *rec.stages.lock().unwrap(),
            vec![ConversionStage::Loading, ConversionStage::Failed]
        );
    }

    #[test]
    fn terminal_stages() {
        assert!(ConversionStage::Downloaded.is_terminal());
        assert!(ConversionStage::Failed.is_terminal());
        assert!(!ConversionStage::Encoding.is_terminal());
        assert_eq!(ConversionStage::default(), ConversionStage::Idle);
        assert_eq!(ConversionStage::Rasterizing.to_string(), "rasterizing");
    }
}
