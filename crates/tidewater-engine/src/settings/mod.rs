//! User-tunable wave and scene parameters and their persistence.
//!
//! Values are stored as numeric strings under fixed keys. Anything missing or
//! unparsable reads as the documented default; no error ever leaves this module
//! for a malformed value.

mod params;
mod store;

pub use params::{SceneParams, SettingKey, Settings, WaveParams};
pub use store::{JsonFileStore, MemoryStore, SettingsStore};
