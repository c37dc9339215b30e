use std::path::{Path, PathBuf};
use tracing::info;

/// Asks the user to grant a directory
pub trait AccessPrompt: Send + Sync {
    /// Show a picker opened at `directory`. `None` when cancelled.
    fn pick_directory(&self, directory: &Path) -> Option<PathBuf>;
}

/// Native folder dialog. Must be driven from the main thread.
#[derive(Debug, Default, Clone, Copy)]
pub struct DialogPrompt;

impl AccessPrompt for DialogPrompt {
    fn pick_directory(&self, directory: &Path) -> Option<PathBuf> {
        info!("DialogPrompt: Asking for access to {}", directory.display());
        let title = format!(
            "Phoenix needs access to {}. Select it to continue.",
            directory.display()
        );
        rfd::FileDialog::new()
            .set_title(title)
            .set_directory(directory)
            .pick_folder()
    }
}
