mod bookmarks;
mod broker;
mod prompt;
mod scope;

pub use bookmarks::{BookmarkError, Bookmarks, PathBookmarks, ResolvedBookmark};
pub use broker::{AccessGrant, SandboxAccessBroker, BOOKMARKS_KEY};
pub use prompt::{AccessPrompt, DialogPrompt};
pub use scope::AccessScope;
