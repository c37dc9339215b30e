use serde::{Deserialize, Deserializer};

/// One entry of an `appdetails` response
#[derive(Debug, Clone, Deserialize)]
pub struct ApplicationDetails {
    #[serde(default)]
    pub success: bool,
    pub data: Option<ApplicationInfo>,
}

/// Store page data for an application.
///
/// The store omits fields freely depending on the application type and the
/// region, so almost everything is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ApplicationInfo {
    /// One of `game`, `dlc`, `demo`, `advertising`, `mod` or `video`
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub name: String,
    pub steam_appid: u64,
    #[serde(deserialize_with = "lenient_u32")]
    pub required_age: u32,
    pub is_free: bool,
    pub controller_support: Option<String>,
    pub dlc: Vec<u64>,

    /// HTML
    pub detailed_description: Option<String>,
    /// HTML
    pub about_the_game: Option<String>,
    /// HTML
    pub short_description: Option<String>,
    /// HTML list of supported languages
    pub supported_languages: Option<String>,

    pub fullgame: Option<FullGame>,
    pub header_image: Option<String>,
    pub capsule_image: Option<String>,
    pub capsule_imagev5: Option<String>,
    pub website: Option<String>,

    pub pc_requirements: Requirements,
    pub mac_requirements: Requirements,
    pub linux_requirements: Requirements,

    pub legal_notice: Option<String>,
    pub developers: Vec<String>,
    pub publishers: Vec<String>,
    pub demos: Vec<Demo>,
    /// Absent for free applications
    pub price_overview: Option<PriceOverview>,
    pub packages: Vec<u64>,
    pub package_groups: Vec<PackageGroup>,
    pub platforms: Platforms,
    pub metacritic: Option<Metacritic>,
    pub categories: Vec<Category>,
    pub genres: Vec<Genre>,
    pub screenshots: Vec<Screenshot>,
    pub movies: Vec<Movie>,
    pub recommendations: Option<Total>,
    pub achievements: Option<Achievements>,
    pub release_date: Option<ReleaseDate>,
    pub support_info: Option<SupportInfo>,
    pub background: Option<String>,
    pub background_raw: Option<String>,
    pub content_descriptors: Option<ContentDescriptors>,
    pub reviews: Option<String>,
}

/// System requirements in HTML.
///
/// The store sends `[]` instead of an object when there are none.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Requirements {
    pub minimum: Option<String>,
    pub recommended: Option<String>,
}

impl<'de> Deserialize<'de> for Requirements {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        struct Object {
            minimum: Option<String>,
            recommended: Option<String>,
        }

        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Shape {
            Object(Object),
            Array(Vec<serde_json::Value>),
        }

        Ok(match Option::<Shape>::deserialize(deserializer)? {
            Some(Shape::Object(object)) => Requirements {
                minimum: object.minimum,
                recommended: object.recommended,
            },
            Some(Shape::Array(_)) | None => Requirements::default(),
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FullGame {
    pub appid: Option<String>,
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Demo {
    pub appid: Option<u64>,
    pub description: String,
}

/// Prices are in cents of `currency`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PriceOverview {
    pub currency: String,
    pub initial: i64,
    #[serde(rename = "final")]
    pub final_price: i64,
    pub discount_percent: i64,
    pub initial_formatted: String,
    pub final_formatted: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PackageGroup {
    pub name: String,
    pub title: String,
    pub description: String,
    pub selection_text: String,
    pub save_text: String,
    /// 0 shows subscriptions as separate blocks, 1 as a picker
    pub display_type: serde_json::Value,
    pub is_recurring_subscription: String,
    pub subs: Vec<Subscription>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Subscription {
    pub packageid: u64,
    pub percent_savings_text: String,
    pub percent_savings: i64,
    pub option_text: String,
    pub option_description: String,
    pub can_get_free_license: String,
    pub is_free_license: bool,
    pub price_in_cents_with_discount: i64,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(default)]
pub struct Platforms {
    pub windows: bool,
    pub mac: bool,
    pub linux: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Metacritic {
    pub score: u32,
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Category {
    pub id: u64,
    pub description: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Genre {
    /// Numeric id sent as a string
    pub id: String,
    pub description: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Screenshot {
    pub id: u64,
    pub path_thumbnail: String,
    pub path_full: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Movie {
    pub id: u64,
    pub name: String,
    pub thumbnail: String,
    pub webm: Option<MovieSources>,
    pub mp4: Option<MovieSources>,
    pub highlight: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MovieSources {
    #[serde(rename = "480")]
    pub low: Option<String>,
    pub max: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(default)]
pub struct Total {
    pub total: u64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Achievements {
    pub total: u64,
    pub highlighted: Vec<HighlightedAchievement>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct HighlightedAchievement {
    pub name: String,
    pub path: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ReleaseDate {
    /// Not released yet
    pub coming_soon: bool,
    /// Store formatted date, empty when unannounced
    pub date: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SupportInfo {
    pub url: String,
    pub email: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ContentDescriptors {
    pub ids: Vec<u64>,
    pub notes: Option<String>,
}

/// Accepts `18`, `"18"` and `"18+"`. Anything else reads as 0.
fn lenient_u32<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Number(number) => number.as_u64().unwrap_or(0) as u32,
        serde_json::Value::String(text) => text
            .trim()
            .trim_end_matches('+')
            .parse()
            .unwrap_or(0),
        _ => 0,
    })
}
