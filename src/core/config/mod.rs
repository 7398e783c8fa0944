pub mod data;
pub mod defaults;
pub mod io;
pub mod orchestrator;
pub mod printing;

pub use data::{BackendConfig, OverlaySettings, Settings};
pub use io::StoreUnavailable;
pub use orchestrator::{ConfigStore, FileSettingsStore, MemorySettingsStore, SettingsStore};
