// # Import Module
//
// Brings installed Steam games into the catalog:
//
// - **AppManifest** (in `steam`): flat view of an `.acf` manifest
// - **steam_parser**: Turns a manifest plus store details into a `Game`
// - **artwork**: Finds the artwork Steam already cached locally
// - **Throttle**: Spaces out store requests
// - **ImportSchedule**: Automatic import preferences
// - **SteamImporter**: Orchestrates the import workflow
//
// Public API:
// - `SteamImporter`: `prepare` on the main thread, then `run` on the runtime
// - `ImportReport`: What a run did
// - `ImportProgress`: Progress updates

mod artwork;
mod schedule;
mod service;
mod steam_parser;
mod throttle;
mod types;

pub use artwork::{library_cache_dir, resolve_local_artwork};
pub use schedule::{ImportInterval, ImportSchedule, ENABLED_KEY, INTERVAL_KEY, LAST_DATE_KEY};
pub use service::{ImportSource, SteamImporter};
pub use steam_parser::{apply_details, game_from_manifest, parse_release_date, UNKNOWN_GAME_NAME};
pub use throttle::Throttle;
pub use types::{CancellationFlag, ImportError, ImportProgress, ImportReport};
