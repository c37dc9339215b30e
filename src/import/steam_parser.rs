use crate::library::{Game, Profile, SteamMetadata};
use crate::rich_text::RichText;
use crate::steam::{AppManifest, ApplicationInfo};
use chrono::NaiveDate;

/// Name given to games whose manifest has none
pub const UNKNOWN_GAME_NAME: &str = "Unknown Steam Game";

/// Date layouts used by the store, depending on the requested region
const DATE_FORMATS: &[&str] = &["%d %b, %Y", "%b %d, %Y", "%d %B, %Y", "%B %d, %Y", "%Y-%m-%d"];

/// Build a catalog entry for a Steam app from its manifest alone
pub fn game_from_manifest(appid: u64, manifest: &AppManifest) -> Game {
    let name = manifest
        .name()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .unwrap_or(UNKNOWN_GAME_NAME);

    let mut game = Game::new(name);
    game.profiles
        .push(Profile::new("Steam", format!("open steam://run/{}", appid)));
    game.steam = Some(SteamMetadata { appid });
    game.is_deleted = false;
    game
}

/// Fill in metadata from the store. Fields the store leaves out stay unset.
pub fn apply_details(game: &mut Game, info: &ApplicationInfo) {
    if !info.categories.is_empty() {
        game.feature = Some(Some(join(info.categories.iter().map(|c| c.description.as_str()))));
    }
    if !info.genres.is_empty() {
        game.genre = Some(Some(join(info.genres.iter().map(|g| g.description.as_str()))));
    }

    if let Some(html) = &info.short_description {
        game.summary = Some(Some(RichText::from_html(html)));
    }
    if let Some(html) = &info.detailed_description {
        game.details = Some(Some(RichText::from_html(html)));
    }

    if !info.developers.is_empty() {
        game.developer = Some(Some(info.developers.join(",")));
    }
    if !info.publishers.is_empty() {
        game.publisher = Some(Some(info.publishers.join(",")));
    }

    if let Some(date) = info
        .release_date
        .as_ref()
        .and_then(|release| parse_release_date(&release.date))
    {
        game.release_date = Some(Some(date));
    }
}

/// Parse a store release date such as `10 Oct, 2007` or `Oct 10, 2007`.
///
/// Month-only and year-only dates resolve to the first day of the period.
/// Placeholders like `Coming soon` or `To be announced` yield `None`.
pub fn parse_release_date(date: &str) -> Option<NaiveDate> {
    let date = date.trim();
    if date.is_empty() {
        return None;
    }

    if let Some(parsed) = DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(date, format).ok())
    {
        return Some(parsed);
    }

    // "Oct 2007" or "October 2007"
    let first_of_month = format!("1 {}", date.replace(',', ""));
    if let Ok(parsed) = NaiveDate::parse_from_str(&first_of_month, "%d %b %Y") {
        return Some(parsed);
    }

    match date.parse::<i32>() {
        Ok(year) if (1970..=9999).contains(&year) => NaiveDate::from_ymd_opt(year, 1, 1),
        _ => None,
    }
}

fn join<'a>(items: impl Iterator<Item = &'a str>) -> String {
    items.collect::<Vec<_>>().join(",")
}
