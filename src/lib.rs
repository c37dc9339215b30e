// Library exports for the binary and integration tests

pub mod app_context;
pub mod cache;
pub mod config;
pub mod fs_util;
pub mod import;
pub mod launch;
pub mod library;
pub mod library_context;
pub mod rich_text;
pub mod sandbox;
pub mod settings;
pub mod steam;

pub use app_context::AppContext;

// Test support (only available with test-utils feature)
#[cfg(feature = "test-utils")]
pub mod test_support;
