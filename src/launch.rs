use crate::library::{Game, Profile};
use crate::library_context::SharedLibrary;
use chrono::Utc;
use std::process::{ExitStatus, Stdio};
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tracing::{info, warn};
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum LaunchError {
    #[error("Game '{0}' cannot be launched: it has no name or no default command")]
    InvalidGame(String),
    #[error("No game with id {0}")]
    NoSuchGame(Uuid),
    #[error("Game has no profile {0}")]
    NoSuchProfile(Uuid),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Run a game's default profile
pub async fn launch(game: &Game) -> Result<ExitStatus, LaunchError> {
    if game.is_invalid() {
        return Err(LaunchError::InvalidGame(game.name.clone()));
    }
    let profile = game
        .default_profile()
        .ok_or_else(|| LaunchError::InvalidGame(game.name.clone()))?;
    run_profile(game, profile).await
}

/// Run a specific profile of a game
pub async fn launch_profile(game: &Game, profile_id: Uuid) -> Result<ExitStatus, LaunchError> {
    if game.is_invalid() {
        return Err(LaunchError::InvalidGame(game.name.clone()));
    }
    let profile = game
        .profiles
        .iter()
        .find(|profile| profile.id == profile_id)
        .ok_or(LaunchError::NoSuchProfile(profile_id))?;
    run_profile(game, profile).await
}

/// Launch a catalog game by id and record when it was played
pub async fn launch_in_library(
    library: &SharedLibrary,
    id: Uuid,
) -> Result<ExitStatus, LaunchError> {
    let game = library
        .read()
        .await
        .game(id)
        .cloned()
        .ok_or(LaunchError::NoSuchGame(id))?;

    let status = launch(&game).await?;

    let mut manager = library.write().await;
    manager.modify(id, |game| game.last_played = Some(Utc::now()));
    if let Err(e) = manager.persist() {
        warn!("Launcher: Could not record last played time: {}", e);
    }
    Ok(status)
}

async fn run_profile(game: &Game, profile: &Profile) -> Result<ExitStatus, LaunchError> {
    if profile.command.trim().is_empty() {
        return Err(LaunchError::InvalidGame(game.name.clone()));
    }

    let shell = std::env::var("SHELL")
        .ok()
        .filter(|shell| !shell.is_empty())
        .unwrap_or_else(|| "/bin/sh".to_string());

    info!(
        "Launcher: Starting '{}' with profile '{}'",
        game.name, profile.name
    );

    let mut child = Command::new(&shell)
        .arg("-c")
        .arg(&profile.command)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()?;

    let stdout = child.stdout.take().map(|out| forward(out, game.name.clone(), false));
    let stderr = child.stderr.take().map(|err| forward(err, game.name.clone(), true));

    let status = child.wait().await?;
    for task in [stdout, stderr].into_iter().flatten() {
        let _ = task.await;
    }

    info!("Launcher: '{}' exited with {}", game.name, status);
    Ok(status)
}

fn forward<R>(stream: R, name: String, is_error: bool) -> tokio::task::JoinHandle<()>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut lines = BufReader::new(stream).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            if is_error {
                warn!("[{}] {}", name, line);
            } else {
                info!("[{}] {}", name, line);
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::library::{LibraryManager, LibraryStore};
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_invalid_game_is_refused() {
        let game = Game::new("Portal");
        assert!(matches!(
            launch(&game).await,
            Err(LaunchError::InvalidGame(_))
        ));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_launch_runs_command() {
        let temp_dir = TempDir::new().unwrap();
        let marker = temp_dir.path().join("launched");
        let mut game = Game::new("Marker");
        game.profiles.push(Profile::new(
            "Default",
            format!("touch '{}'", marker.display()),
        ));

        let status = launch(&game).await.unwrap();
        assert!(status.success());
        assert!(marker.exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_launch_in_library_records_last_played() {
        let temp_dir = TempDir::new().unwrap();
        let store = LibraryStore::new(temp_dir.path().join("games.json"));
        let mut manager = LibraryManager::open(store).unwrap();
        let mut game = Game::new("Echo");
        game.profiles.push(Profile::new("Default", "echo hello"));
        let id = game.id();
        manager.add(game).unwrap();
        let library = SharedLibrary::new(manager);

        launch_in_library(&library, id).await.unwrap();
        assert!(library.read().await.game(id).unwrap().last_played.is_some());

        assert!(matches!(
            launch_in_library(&library, Uuid::new_v4()).await,
            Err(LaunchError::NoSuchGame(_))
        ));
    }

    #[tokio::test]
    async fn test_unknown_profile() {
        let mut game = Game::new("Portal");
        game.profiles.push(Profile::new("Default", "true"));
        assert!(matches!(
            launch_profile(&game, Uuid::new_v4()).await,
            Err(LaunchError::NoSuchProfile(_))
        ));
    }
}
