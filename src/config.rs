//! Engine configuration
//!
//! Typed tuning knobs that a backend turns into engine startup arguments.
//! The defaults reproduce the invocation proven out for live IPTV transport:
//! a 3 second network cache, clock jitter correction and clock
//! synchronization disabled so multicast timestamp noise does not stall the
//! pipeline, and all desktop-oriented chrome (title overlays, snapshot
//! previews) switched off.

use serde::{Deserialize, Serialize};

/// Tuning applied when the engine instance is created.
///
/// Rendered to argument strings by [`engine_args`](EngineConfig::engine_args);
/// backends pass those to the underlying engine verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Network stream cache in milliseconds
    pub network_caching_ms: u32,
    /// Overlay the media title when playback starts
    pub show_video_title: bool,
    /// Let the engine talk to Xlib directly (unsafe with most GUI toolkits)
    pub use_xlib: bool,
    /// Generate snapshot preview thumbnails
    pub snapshot_previews: bool,
    /// Suppress engine-side console output
    pub quiet: bool,
    /// Let the engine correct for input clock jitter
    pub clock_jitter_correction: bool,
    /// Let the engine resynchronize against the input clock
    pub clock_synchronization: bool,
    /// Additional arguments appended after the rendered flags
    pub extra_args: Vec<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::live_stream()
    }
}

impl EngineConfig {
    /// Configuration for live IPTV streams (the default).
    ///
    /// Generous network caching, no clock correction, no desktop chrome.
    pub fn live_stream() -> Self {
        Self {
            network_caching_ms: 3000,
            show_video_title: false,
            use_xlib: false,
            snapshot_previews: false,
            quiet: true,
            clock_jitter_correction: false,
            clock_synchronization: false,
            extra_args: Vec::new(),
        }
    }

    /// Configuration for local file playback: a small cache is enough and
    /// the engine's own clock handling can stay on.
    pub fn local_file() -> Self {
        Self {
            network_caching_ms: 300,
            clock_jitter_correction: true,
            clock_synchronization: true,
            ..Self::live_stream()
        }
    }

    /// Render the startup argument list handed to the engine backend.
    pub fn engine_args(&self) -> Vec<String> {
        let mut args = Vec::new();
        if !self.show_video_title {
            args.push("--no-video-title-show".to_string());
        }
        if !self.use_xlib {
            args.push("--no-xlib".to_string());
        }
        if !self.snapshot_previews {
            args.push("--no-snapshot-preview".to_string());
        }
        if self.quiet {
            args.push("--quiet".to_string());
        }
        args.push(format!("--network-caching={}", self.network_caching_ms));
        if !self.clock_jitter_correction {
            args.push("--clock-jitter=0".to_string());
        }
        if !self.clock_synchronization {
            args.push("--clock-synchro=0".to_string());
        }
        args.extend(self.extra_args.iter().cloned());
        args
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_live_stream_args_match_proven_invocation() {
        let args = EngineConfig::live_stream().engine_args();
        assert_eq!(
            args,
            vec![
                "--no-video-title-show",
                "--no-xlib",
                "--no-snapshot-preview",
                "--quiet",
                "--network-caching=3000",
                "--clock-jitter=0",
                "--clock-synchro=0",
            ]
        );
    }

    #[test]
    fn test_local_file_preset_relaxes_caching() {
        let config = EngineConfig::local_file();
        assert_eq!(config.network_caching_ms, 300);
        let args = config.engine_args();
        assert!(args.contains(&"--network-caching=300".to_string()));
        assert!(!args.iter().any(|a| a.starts_with("--clock-jitter")));
        assert!(!args.iter().any(|a| a.starts_with("--clock-synchro")));
    }

    #[test]
    fn test_extra_args_appended_last() {
        let mut config = EngineConfig::live_stream();
        config.extra_args.push("--verbose=2".to_string());
        let args = config.engine_args();
        assert_eq!(args.last().map(String::as_str), Some("--verbose=2"));
    }
}
