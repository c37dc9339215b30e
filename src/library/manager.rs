use crate::library::models::{Game, Library};
use crate::library::store::LibraryStore;
use crate::library::LibraryError;
use std::collections::HashSet;
use tracing::{error, info};
use uuid::Uuid;

/// Owner of the in-memory catalog
///
/// Handles:
/// - Loading and persisting through the [`LibraryStore`]
/// - Catalog mutations (add, edit, soft delete, restore)
/// - Query methods for library browsing
///
/// Every mutation goes through `&mut self`; share it with
/// [`crate::library_context::SharedLibrary`] to serialize writers.
#[derive(Debug)]
pub struct LibraryManager {
    store: LibraryStore,
    library: Library,
}

impl LibraryManager {
    /// Load the catalog from the store
    pub fn open(store: LibraryStore) -> Result<Self, LibraryError> {
        let library = store.load()?;
        info!(
            "LibraryManager: Opened catalog with {} games",
            library.games.len()
        );
        Ok(LibraryManager { store, library })
    }

    /// Manage an already loaded catalog
    pub fn new(store: LibraryStore, library: Library) -> Self {
        LibraryManager { store, library }
    }

    pub fn library(&self) -> &Library {
        &self.library
    }

    pub fn games(&self) -> &[Game] {
        &self.library.games
    }

    pub fn game(&self, id: Uuid) -> Option<&Game> {
        self.library.game(id)
    }

    /// Append a game. Ids must stay unique.
    pub fn add(&mut self, game: Game) -> Result<(), LibraryError> {
        if self.library.contains(game.id()) {
            return Err(LibraryError::DuplicateId(game.id()));
        }
        self.library.games.push(game);
        Ok(())
    }

    /// Apply an edit to one game. Returns false when the id is unknown.
    pub fn modify(&mut self, id: Uuid, transform: impl FnOnce(&mut Game)) -> bool {
        match self.library.games.iter_mut().find(|game| game.id() == id) {
            Some(game) => {
                transform(game);
                true
            }
            None => false,
        }
    }

    /// Hide a game. Games are never hard-deleted by the user.
    pub fn soft_delete(&mut self, id: Uuid) -> bool {
        self.modify(id, |game| game.is_deleted = true)
    }

    pub fn restore(&mut self, id: Uuid) -> bool {
        self.modify(id, |game| game.is_deleted = false)
    }

    /// Drop every imported Steam game, hidden ones included
    pub fn remove_steam_games(&mut self) -> usize {
        let before = self.library.games.len();
        self.library.games.retain(|game| !game.is_steam());
        let removed = before - self.library.games.len();
        info!("LibraryManager: Removed {} Steam games", removed);
        removed
    }

    /// Whether any game, hidden or not, was imported from this Steam app
    pub fn contains_steam_app(&self, appid: u64) -> bool {
        self.library
            .games
            .iter()
            .any(|game| game.steam_appid() == Some(appid))
    }

    /// All Steam app ids present in the catalog
    pub fn steam_appids(&self) -> HashSet<u64> {
        self.library
            .games
            .iter()
            .filter_map(Game::steam_appid)
            .collect()
    }

    /// Visible Steam games whose name matches `filter`, sorted by name
    pub fn steam_games(&self, filter: &str) -> Vec<&Game> {
        self.visible(filter, true)
    }

    /// Visible non-Steam games whose name matches `filter`, sorted by name
    pub fn other_games(&self, filter: &str) -> Vec<&Game> {
        self.visible(filter, false)
    }

    /// Soft-deleted games, sorted by name
    pub fn hidden_games(&self) -> Vec<&Game> {
        let mut games: Vec<&Game> = self
            .library
            .games
            .iter()
            .filter(|game| game.is_deleted)
            .collect();
        games.sort_by(|a, b| a.name.cmp(&b.name));
        games
    }

    fn visible(&self, filter: &str, steam: bool) -> Vec<&Game> {
        let filter = filter.trim().to_lowercase();
        let mut games: Vec<&Game> = self
            .library
            .games
            .iter()
            .filter(|game| !game.is_deleted && game.is_steam() == steam)
            .filter(|game| filter.is_empty() || game.name.to_lowercase().contains(&filter))
            .collect();
        games.sort_by(|a, b| a.name.cmp(&b.name));
        games
    }

    /// Re-read the catalog from disk.
    ///
    /// On failure the in-memory catalog keeps its previous value.
    pub fn reload(&mut self) -> Result<(), LibraryError> {
        match self.store.load() {
            Ok(library) => {
                self.library = library;
                Ok(())
            }
            Err(e) => {
                error!("LibraryManager: Could not reload catalog: {}", e);
                Err(e)
            }
        }
    }

    pub fn persist(&self) -> Result<(), LibraryError> {
        self.store.save(&self.library).map_err(|e| {
            error!("LibraryManager: Could not write catalog: {}", e);
            e
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::library::models::{Profile, SteamMetadata};
    use tempfile::TempDir;

    fn steam_game(name: &str, appid: u64) -> Game {
        let mut game = Game::new(name);
        game.profiles
            .push(Profile::new("Steam", format!("open steam://run/{}", appid)));
        game.steam = Some(SteamMetadata { appid });
        game
    }

    fn manager(temp_dir: &TempDir) -> LibraryManager {
        LibraryManager::open(LibraryStore::new(temp_dir.path().join("games.json"))).unwrap()
    }

    #[test]
    fn test_add_rejects_duplicate_ids() {
        let temp_dir = TempDir::new().unwrap();
        let mut manager = manager(&temp_dir);
        let game = Game::new("Portal");

        manager.add(game.clone()).unwrap();
        assert!(matches!(
            manager.add(game),
            Err(LibraryError::DuplicateId(_))
        ));
        assert_eq!(manager.games().len(), 1);
    }

    #[test]
    fn test_soft_delete_and_restore() {
        let temp_dir = TempDir::new().unwrap();
        let mut manager = manager(&temp_dir);
        let game = steam_game("Portal", 400);
        let id = game.id();
        manager.add(game).unwrap();

        assert!(manager.soft_delete(id));
        assert!(manager.steam_games("").is_empty());
        assert_eq!(manager.hidden_games().len(), 1);
        // Hidden games still count for dedup
        assert!(manager.contains_steam_app(400));

        assert!(manager.restore(id));
        assert_eq!(manager.steam_games("").len(), 1);
        assert!(!manager.restore(Uuid::new_v4()));
    }

    #[test]
    fn test_filters_split_steam_and_other() {
        let temp_dir = TempDir::new().unwrap();
        let mut manager = manager(&temp_dir);
        manager.add(steam_game("Team Fortress 2", 440)).unwrap();
        manager.add(steam_game("Portal", 400)).unwrap();
        manager.add(Game::new("Doom")).unwrap();

        let names: Vec<_> = manager.steam_games("").iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, vec!["Portal", "Team Fortress 2"]);

        let names: Vec<_> = manager
            .steam_games("fortress")
            .iter()
            .map(|g| g.name.as_str())
            .collect();
        assert_eq!(names, vec!["Team Fortress 2"]);

        assert_eq!(manager.other_games("").len(), 1);
        assert_eq!(manager.steam_appids(), HashSet::from([440, 400]));

        assert_eq!(manager.remove_steam_games(), 2);
        assert_eq!(manager.games().len(), 1);
    }

    #[test]
    fn test_failed_reload_keeps_previous_catalog() {
        let temp_dir = TempDir::new().unwrap();
        let mut manager = manager(&temp_dir);
        manager.add(steam_game("Portal", 400)).unwrap();
        manager.persist().unwrap();

        std::fs::write(
            temp_dir.path().join("games.json"),
            br#"{"format": 1, "games": []}"#,
        )
        .unwrap();

        assert!(matches!(
            manager.reload(),
            Err(LibraryError::UnsupportedFormat(1))
        ));
        assert_eq!(manager.games().len(), 1);
        assert_eq!(manager.games()[0].name, "Portal");
    }

    #[test]
    fn test_persist_then_reload() {
        let temp_dir = TempDir::new().unwrap();
        let mut manager = manager(&temp_dir);
        let game = steam_game("Portal", 400);
        let id = game.id();
        manager.add(game).unwrap();
        manager.modify(id, |game| game.developer = Some(Some("Valve".to_string())));
        manager.persist().unwrap();

        let reopened = LibraryManager::open(LibraryStore::new(
            temp_dir.path().join("games.json"),
        ))
        .unwrap();
        assert_eq!(reopened.library(), manager.library());
    }
}
