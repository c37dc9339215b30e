use chardetng::EncodingDetector;
use regex::Regex;
use std::collections::HashMap;
use std::path::Path;
use std::sync::OnceLock;
use tracing::warn;

/// Flat key/value view of a Steam `.acf` application manifest.
///
/// The format is nested (`"AppState" { ... }`) but only the `"key" "value"`
/// pairs matter, so nesting is ignored and later keys overwrite earlier ones.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppManifest {
    values: HashMap<String, String>,
}

fn pair_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#""([^"]+?)"\s*"([^"]*)""#).expect("manifest pattern is valid")
    })
}

impl AppManifest {
    pub fn parse(contents: &str) -> Self {
        let values = pair_pattern()
            .captures_iter(contents)
            .map(|captures| (captures[1].to_string(), captures[2].to_string()))
            .collect();
        AppManifest { values }
    }

    /// Read a manifest file, detecting its text encoding
    pub async fn read(path: &Path) -> std::io::Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        Ok(Self::parse(&decode_text(&bytes, path)))
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn appid(&self) -> Option<u64> {
        self.get("appid")?.trim().parse().ok()
    }

    pub fn name(&self) -> Option<&str> {
        self.get("name")
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Decode manifest bytes, falling back to encoding detection when not UTF-8
fn decode_text(bytes: &[u8], path: &Path) -> String {
    if let Ok(text) = std::str::from_utf8(bytes) {
        return text.to_string();
    }

    let mut detector = EncodingDetector::new();
    detector.feed(bytes, true);
    let encoding = detector.guess(None, true);

    let (decoded, _, had_errors) = encoding.decode(bytes);
    if had_errors {
        warn!(
            "AppManifest: Decoding errors in {} with encoding {}",
            path.display(),
            encoding.name()
        );
    }
    decoded.into_owned()
}
