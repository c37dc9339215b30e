/// Region and language sent to the store so prices and text come back localized
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreLocale {
    /// Two letter country code, e.g. `CA`
    pub region: Option<String>,
    /// Store language name, e.g. `french`
    pub language: Option<String>,
}

impl StoreLocale {
    /// Locale of the current process, from `LC_ALL`, `LC_MESSAGES` or `LANG`
    pub fn from_env() -> Self {
        ["LC_ALL", "LC_MESSAGES", "LANG"]
            .iter()
            .filter_map(|var| std::env::var(var).ok())
            .find(|value| !value.trim().is_empty())
            .map(|value| Self::parse(&value))
            .unwrap_or_default()
    }

    /// Parse a POSIX locale name such as `fr_CA.UTF-8` or `pt_BR@euro`
    pub fn parse(locale: &str) -> Self {
        let name = locale
            .split(['.', '@'])
            .next()
            .unwrap_or_default()
            .trim();
        if name.is_empty() || name == "C" || name == "POSIX" {
            return Self::default();
        }

        let mut parts = name.split(['_', '-']);
        let language_code = parts.next().unwrap_or_default().to_ascii_lowercase();
        let region = parts
            .next()
            .filter(|region| region.len() == 2 && region.chars().all(|c| c.is_ascii_alphabetic()))
            .map(|region| region.to_ascii_uppercase());

        StoreLocale {
            language: store_language(&language_code, region.as_deref()).map(str::to_string),
            region,
        }
    }
}

/// Language names understood by the store's `l` parameter
fn store_language(code: &str, region: Option<&str>) -> Option<&'static str> {
    let name = match (code, region) {
        ("pt", Some("BR")) => "brazilian",
        ("pt", _) => "portuguese",
        ("zh", Some("TW" | "HK" | "MO")) => "tchinese",
        ("zh", _) => "schinese",
        ("es", Some("ES")) | ("es", None) => "spanish",
        ("es", _) => "latam",
        ("en", _) => "english",
        ("fr", _) => "french",
        ("de", _) => "german",
        ("it", _) => "italian",
        ("ja", _) => "japanese",
        ("ko", _) => "koreana",
        ("ru", _) => "russian",
        ("pl", _) => "polish",
        ("nl", _) => "dutch",
        ("sv", _) => "swedish",
        ("da", _) => "danish",
        ("fi", _) => "finnish",
        ("nb" | "no" | "nn", _) => "norwegian",
        ("tr", _) => "turkish",
        ("uk", _) => "ukrainian",
        ("cs", _) => "czech",
        ("hu", _) => "hungarian",
        ("ro", _) => "romanian",
        ("el", _) => "greek",
        ("bg", _) => "bulgarian",
        ("th", _) => "thai",
        ("vi", _) => "vietnamese",
        ("ar", _) => "arabic",
        _ => return None,
    };
    Some(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_posix_locales() {
        assert_eq!(
            StoreLocale::parse("fr_CA.UTF-8"),
            StoreLocale {
                region: Some("CA".to_string()),
                language: Some("french".to_string()),
            }
        );
        assert_eq!(
            StoreLocale::parse("pt_BR"),
            StoreLocale {
                region: Some("BR".to_string()),
                language: Some("brazilian".to_string()),
            }
        );
        assert_eq!(
            StoreLocale::parse("zh_TW.UTF-8").language.as_deref(),
            Some("tchinese")
        );
        assert_eq!(StoreLocale::parse("ko_KR").language.as_deref(), Some("koreana"));
    }

    #[test]
    fn test_language_without_region() {
        let locale = StoreLocale::parse("de");
        assert_eq!(locale.region, None);
        assert_eq!(locale.language.as_deref(), Some("german"));
    }

    #[test]
    fn test_neutral_locales() {
        assert_eq!(StoreLocale::parse("C"), StoreLocale::default());
        assert_eq!(StoreLocale::parse("POSIX"), StoreLocale::default());
        assert_eq!(StoreLocale::parse("C.UTF-8"), StoreLocale::default());
        assert_eq!(StoreLocale::parse(""), StoreLocale::default());
    }

    #[test]
    fn test_unknown_language_keeps_region() {
        let locale = StoreLocale::parse("xx_US");
        assert_eq!(locale.region.as_deref(), Some("US"));
        assert_eq!(locale.language, None);
    }
}
