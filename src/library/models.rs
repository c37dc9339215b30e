use crate::rich_text::RichText;
use chrono::{DateTime, NaiveDate, Utc};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The catalog format written by this version
pub const CURRENT_FORMAT: i64 = 0;

/// Launch configuration for a game
///
/// The first profile of a game is its default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    /// Display name, e.g. "Steam"
    pub name: String,
    /// Shell command that launches this profile
    pub command: String,
}

impl Profile {
    pub fn new(name: impl Into<String>, command: impl Into<String>) -> Self {
        Profile {
            id: Uuid::new_v4(),
            name: name.into(),
            command: command.into(),
        }
    }
}

/// Marks a game as imported from Steam
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SteamMetadata {
    /// Steam's numeric application id, used for import deduplication
    pub appid: u64,
}

/// Kinds of artwork a game can carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtworkKind {
    Banner,
    Header,
    Icon,
    Library,
    Logo,
}

impl ArtworkKind {
    pub const ALL: [ArtworkKind; 5] = [
        ArtworkKind::Banner,
        ArtworkKind::Header,
        ArtworkKind::Icon,
        ArtworkKind::Library,
        ArtworkKind::Logo,
    ];

    /// Folder holding this kind inside the image cache
    pub fn folder(&self) -> &'static str {
        match self {
            ArtworkKind::Banner => "banners",
            ArtworkKind::Header => "header",
            ArtworkKind::Icon => "icon",
            ArtworkKind::Library => "library",
            ArtworkKind::Logo => "logo",
        }
    }

    pub fn from_name(name: &str) -> Option<ArtworkKind> {
        match name.to_ascii_lowercase().as_str() {
            "banner" | "banners" => Some(ArtworkKind::Banner),
            "header" => Some(ArtworkKind::Header),
            "icon" => Some(ArtworkKind::Icon),
            "library" => Some(ArtworkKind::Library),
            "logo" => Some(ArtworkKind::Logo),
            _ => None,
        }
    }
}

/// A game in the catalog
///
/// Optional metadata fields are `Option<Option<T>>` so the catalog file keeps
/// three distinct states: key omitted (`None`), explicit `null`
/// (`Some(None)`), and a value (`Some(Some(v))`, possibly an empty string).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Game {
    id: Uuid,

    /// Launch profiles, the first one is the default
    #[serde(default)]
    pub profiles: Vec<Profile>,

    #[serde(default)]
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none", with = "tristate")]
    pub rating: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "tristate")]
    pub release_date: Option<Option<NaiveDate>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_played: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "tristate")]
    pub developer: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "tristate")]
    pub summary: Option<Option<RichText>>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "tristate")]
    pub details: Option<Option<RichText>>,
    /// Comma or newline separated genres
    #[serde(default, skip_serializing_if = "Option::is_none", with = "tristate")]
    pub genre: Option<Option<String>>,
    /// Comma or newline separated store categories
    #[serde(default, skip_serializing_if = "Option::is_none", with = "tristate")]
    pub feature: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "tristate")]
    pub publisher: Option<Option<String>>,

    // Externally owned artwork. When absent the cached copy is used.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub banner: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub library: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub steam: Option<SteamMetadata>,

    #[serde(default)]
    pub is_deleted: bool,
}

impl Game {
    /// A new game with a freshly generated id and no metadata
    pub fn new(name: impl Into<String>) -> Self {
        Game {
            id: Uuid::new_v4(),
            profiles: Vec::new(),
            name: name.into(),
            rating: None,
            release_date: None,
            last_played: None,
            developer: None,
            summary: None,
            details: None,
            genre: None,
            feature: None,
            publisher: None,
            banner: None,
            header: None,
            icon: None,
            library: None,
            logo: None,
            steam: None,
            is_deleted: false,
        }
    }

    /// Stable identity, fixed at creation
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// The default launch profile
    pub fn default_profile(&self) -> Option<&Profile> {
        self.profiles.first()
    }

    /// A game without a usable default command or without a name cannot launch
    pub fn is_invalid(&self) -> bool {
        self.default_profile()
            .map(|profile| profile.command.trim().is_empty())
            .unwrap_or(true)
            || self.name.is_empty()
    }

    pub fn is_steam(&self) -> bool {
        self.steam.is_some()
    }

    pub fn steam_appid(&self) -> Option<u64> {
        self.steam.map(|steam| steam.appid)
    }

    pub fn genres(&self) -> Vec<&str> {
        split_list(flatten(&self.genre))
    }

    pub fn features(&self) -> Vec<&str> {
        split_list(flatten(&self.feature))
    }

    /// Rating as a percentage, when it parses as a number
    pub fn rating_percent(&self) -> Option<f32> {
        flatten(&self.rating).and_then(|rating| rating.trim().parse::<f32>().ok())
    }

    /// Externally owned artwork URL for a kind
    pub fn artwork_url(&self, kind: ArtworkKind) -> Option<Url> {
        let raw = match kind {
            ArtworkKind::Banner => &self.banner,
            ArtworkKind::Header => &self.header,
            ArtworkKind::Icon => &self.icon,
            ArtworkKind::Library => &self.library,
            ArtworkKind::Logo => &self.logo,
        };
        raw.as_deref().and_then(|url| Url::parse(url).ok())
    }

    pub fn set_artwork_url(&mut self, kind: ArtworkKind, url: Option<Url>) {
        let value = url.map(|url| url.to_string());
        match kind {
            ArtworkKind::Banner => self.banner = value,
            ArtworkKind::Header => self.header = value,
            ArtworkKind::Icon => self.icon = value,
            ArtworkKind::Library => self.library = value,
            ArtworkKind::Logo => self.logo = value,
        }
    }
}

/// The set value of a three-state field, if any
pub fn flatten<T>(field: &Option<Option<T>>) -> Option<&T> {
    field.as_ref().and_then(|value| value.as_ref())
}

fn split_list(value: Option<&String>) -> Vec<&str> {
    value
        .map(|value| {
            value
                .split([',', '\n'])
                .map(str::trim)
                .filter(|item| !item.is_empty())
                .collect()
        })
        .unwrap_or_default()
}

/// The catalog: every game plus the on-disk format version
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Library {
    /// Format version, used to migrate the file as it evolves
    #[serde(default)]
    pub format: i64,
    #[serde(default)]
    pub games: Vec<Game>,
}

impl Default for Library {
    fn default() -> Self {
        Library {
            format: CURRENT_FORMAT,
            games: Vec::new(),
        }
    }
}

impl Library {
    pub fn game(&self, id: Uuid) -> Option<&Game> {
        self.games.iter().find(|game| game.id() == id)
    }

    pub fn contains(&self, id: Uuid) -> bool {
        self.game(id).is_some()
    }
}

/// Serde adapter keeping "absent" and "null" apart for `Option<Option<T>>`.
///
/// Pair with `#[serde(default, skip_serializing_if = "Option::is_none")]` so
/// absent stays absent on the way out.
mod tristate {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S, T>(value: &Option<Option<T>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
        T: Serialize,
    {
        match value {
            Some(inner) => inner.serialize(serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
    where
        D: Deserializer<'de>,
        T: Deserialize<'de>,
    {
        Option::<T>::deserialize(deserializer).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_games() {
        let mut game = Game::new("Portal");
        assert!(game.is_invalid(), "no profiles");

        game.profiles.push(Profile::new("Default", ""));
        assert!(game.is_invalid(), "empty default command");

        game.profiles[0].command = "open steam://run/400".to_string();
        assert!(!game.is_invalid());

        game.name.clear();
        assert!(game.is_invalid(), "empty name");
    }

    #[test]
    fn test_only_default_profile_matters() {
        let mut game = Game::new("Portal");
        game.profiles.push(Profile::new("Broken", ""));
        game.profiles.push(Profile::new("Works", "echo hi"));
        assert!(game.is_invalid());
    }

    #[test]
    fn test_tristate_fields_round_trip() {
        let json = r#"{
            "id": "6f1c9f0e-1b7a-4a53-9c57-5d8f3c2d7e11",
            "name": "Portal",
            "developer": null,
            "publisher": "",
            "genre": "Puzzle, Action"
        }"#;
        let game: Game = serde_json::from_str(json).unwrap();

        assert_eq!(game.developer, Some(None));
        assert_eq!(game.publisher, Some(Some(String::new())));
        assert_eq!(game.rating, None);
        assert_eq!(game.genres(), vec!["Puzzle", "Action"]);

        let value = serde_json::to_value(&game).unwrap();
        let object = value.as_object().unwrap();
        assert!(object["developer"].is_null());
        assert_eq!(object["publisher"], "");
        assert!(!object.contains_key("rating"));
        assert!(!object.contains_key("steam"));

        let again: Game = serde_json::from_value(value).unwrap();
        assert_eq!(again, game);
    }

    #[test]
    fn test_artwork_urls() {
        let mut game = Game::new("Portal");
        let url = Url::parse("file:///tmp/400_icon.jpg").unwrap();
        game.set_artwork_url(ArtworkKind::Icon, Some(url.clone()));
        assert_eq!(game.artwork_url(ArtworkKind::Icon), Some(url));
        assert_eq!(game.artwork_url(ArtworkKind::Logo), None);

        game.logo = Some("not a url".to_string());
        assert_eq!(game.artwork_url(ArtworkKind::Logo), None);
    }

    #[test]
    fn test_artwork_kind_folders() {
        let folders: Vec<_> = ArtworkKind::ALL.iter().map(|kind| kind.folder()).collect();
        assert_eq!(folders, vec!["banners", "header", "icon", "library", "logo"]);
        assert_eq!(ArtworkKind::from_name("Icon"), Some(ArtworkKind::Icon));
        assert_eq!(ArtworkKind::from_name("poster"), None);
    }

    #[test]
    fn test_rating_percent() {
        let mut game = Game::new("Portal");
        assert_eq!(game.rating_percent(), None);
        game.rating = Some(Some("92".to_string()));
        assert_eq!(game.rating_percent(), Some(92.0));
    }
}
