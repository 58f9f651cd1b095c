//! Command line arguments shared by the demos
//!
//! Binaries extend [`CommonArgs`] with their own flags:
//!
//! ```ignore
//! use app::cli::CommonArgs;
//! use clap::Parser;
//!
//! #[derive(Parser)]
//! struct DemoArgs {
//!     #[command(flatten)]
//!     common: CommonArgs,
//!
//!     #[arg(long)]
//!     seed: Option<u64>,
//! }
//!
//! let args = DemoArgs::parse();
//! let config = args.common.apply_to(AppConfig::new("Demo"));
//! ```

use clap::Args;
use std::path::PathBuf;

/// Common command line arguments
///
/// Use `#[command(flatten)]` to include these in your own argument struct.
#[derive(Args, Debug, Clone, Default)]
pub struct CommonArgs {
    /// Run N frames, save a screenshot of the last one, then exit
    #[arg(long, value_name = "FRAMES")]
    pub debug: Option<u64>,

    /// Where the debug screenshot is written
    #[arg(long, value_name = "PATH", requires = "debug")]
    pub screenshot: Option<PathBuf>,

    /// Load demo configuration from a TOML file
    #[arg(long, short = 'c', value_name = "PATH")]
    pub config: Option<PathBuf>,
}

impl CommonArgs {
    /// Apply the common arguments to an AppConfig
    pub fn apply_to(&self, mut config: crate::AppConfig) -> crate::AppConfig {
        if let Some(frames) = self.debug {
            config = config.with_debug_mode(frames);
            if let (Some(debug), Some(path)) = (config.debug_mode.as_mut(), &self.screenshot) {
                debug.output_path = path.clone();
            }
        }
        config
    }

    /// Get the config path if specified
    pub fn config_path(&self) -> Option<&PathBuf> {
        self.config.as_ref()
    }

    /// Check if debug mode is enabled
    pub fn is_debug(&self) -> bool {
        self.debug.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AppConfig;
    use clap::Parser;

    #[derive(Parser)]
    struct TestArgs {
        #[command(flatten)]
        common: CommonArgs,
    }

    #[test]
    fn test_no_args() {
        let args = TestArgs::parse_from(["test"]);
        assert!(args.common.debug.is_none());
        assert!(args.common.screenshot.is_none());
        assert!(args.common.config.is_none());
        assert!(!args.common.is_debug());
    }

    #[test]
    fn test_debug_arg() {
        let args = TestArgs::parse_from(["test", "--debug", "100"]);
        assert_eq!(args.common.debug, Some(100));
        assert!(args.common.is_debug());
    }

    #[test]
    fn test_config_short_arg() {
        let args = TestArgs::parse_from(["test", "-c", "demo.toml"]);
        assert_eq!(args.common.config_path(), Some(&PathBuf::from("demo.toml")));
    }

    #[test]
    fn test_screenshot_requires_debug() {
        let result = TestArgs::try_parse_from(["test", "--screenshot", "out.png"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_apply_to_sets_debug_mode() {
        let args = TestArgs::parse_from(["test", "--debug", "5", "--screenshot", "shot.png"]);
        let config = args.common.apply_to(AppConfig::new("Test"));
        let debug = config.debug_mode.expect("debug mode set");
        assert_eq!(debug.frames, 5);
        assert_eq!(debug.output_path, PathBuf::from("shot.png"));
    }

    #[test]
    fn test_apply_to_without_debug() {
        let args = TestArgs::parse_from(["test"]);
        let base = AppConfig::new("Test").with_size(640, 480);
        let config = args.common.apply_to(base);
        assert!(config.debug_mode.is_none());
        assert_eq!((config.width, config.height), (640, 480));
    }
}
