//! Tool configuration.
//!
//! Consolidates configuration from four tiers with field-by-field merging:
//! 1. **Defaults** - Built into the binary
//! 2. **Project** - `$CWD/location-merge/config.yaml`
//! 3. **User** - `~/.location-merge/config.yaml`
//! 4. **Environment** - Variables listed below
//!
//! ## Environment Variables
//! - `LOCATION_MERGE_CONFIG_PATH` - Explicit config file (replaces tiers 2 and 3)
//! - `LOCATION_MERGE_ARRAY_STRATEGY` - Array strategy override
//! - `LOCATION_MERGE_USER_DIR` - User config dir (default: `~/.location-merge`)
//! - `LOCATION_MERGE_PROJECT_DIR` - Project config dir (default: `./location-merge`)

mod loader;
mod types;
pub mod watcher;

pub use loader::{CONFIG_FILE_NAME, ConfigLoader, ConfigPaths, ConfigTier};
pub use types::*;
