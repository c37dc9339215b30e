pub mod client;
pub mod locale;
pub mod manifest;
pub mod models;

pub use client::{MetadataSource, SteamError, SteampoweredClient};
pub use locale::StoreLocale;
pub use manifest::AppManifest;
pub use models::ApplicationInfo;
