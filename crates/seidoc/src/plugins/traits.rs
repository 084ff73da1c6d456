//! Base plugin trait definition.
//!
//! Every external capability the pipeline delegates to (OCR engine, page
//! rasterizer, entity recognizer) implements `Plugin` for identification and
//! lifecycle management.

use crate::Result;

/// Base trait that all plugins must implement.
///
/// All plugins must be `Send + Sync`: a single handle is shared across
/// concurrent pipeline invocations.
///
/// # Example
///
/// ```rust
/// use seidoc::plugins::Plugin;
/// use seidoc::Result;
///
/// struct NoopPlugin;
///
/// impl Plugin for NoopPlugin {
///     fn name(&self) -> &str {
///         "noop"
///     }
///
///     fn version(&self) -> String {
///         "1.0.0".to_string()
///     }
///
///     fn initialize(&self) -> Result<()> {
///         Ok(())
///     }
///
///     fn shutdown(&self) -> Result<()> {
///         Ok(())
///     }
/// }
/// ```
pub trait Plugin: Send + Sync {
    /// Unique, lowercase, hyphenated identifier (e.g. `tesseract-cli`).
    fn name(&self) -> &str;

    /// Semantic version of this plugin.
    fn version(&self) -> String;

    /// Called once before first use. Check for binaries, models, etc. here.
    fn initialize(&self) -> Result<()>;

    fn shutdown(&self) -> Result<()>;

    fn description(&self) -> &str {
        ""
    }

    fn author(&self) -> &str {
        ""
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};

    struct TestPlugin {
        initialized: AtomicBool,
    }

    impl Plugin for TestPlugin {
        fn name(&self) -> &str {
            "test-plugin"
        }

        fn version(&self) -> String {
            "0.1.0".to_string()
        }

        fn initialize(&self) -> Result<()> {
            self.initialized.store(true, Ordering::Release);
            Ok(())
        }

        fn shutdown(&self) -> Result<()> {
            self.initialized.store(false, Ordering::Release);
            Ok(())
        }
    }

    #[test]
    fn test_plugin_lifecycle() {
        let plugin = TestPlugin {
            initialized: AtomicBool::new(false),
        };
        plugin.initialize().unwrap();
        assert!(plugin.initialized.load(Ordering::Acquire));
        plugin.shutdown().unwrap();
        assert!(!plugin.initialized.load(Ordering::Acquire));
    }

    #[test]
    fn test_plugin_default_metadata() {
        let plugin = TestPlugin {
            initialized: AtomicBool::new(false),
        };
        assert_eq!(plugin.name(), "test-plugin");
        assert_eq!(plugin.description(), "");
        assert_eq!(plugin.author(), "");
    }
}
