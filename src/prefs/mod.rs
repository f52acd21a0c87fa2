pub mod store;

pub use store::{Settings, SettingsError};
