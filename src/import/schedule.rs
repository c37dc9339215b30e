use crate::settings::{SettingsError, SettingsExt, SettingsStore};
use chrono::{DateTime, Utc};
use tracing::warn;

pub const ENABLED_KEY: &str = "steam.import.enabled";
pub const INTERVAL_KEY: &str = "steam.import.interval";
pub const LAST_DATE_KEY: &str = "steam.import.last_date";

/// How often automatic imports run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImportInterval {
    Hourly,
    #[default]
    Daily,
    Weekly,
    Monthly,
}

impl ImportInterval {
    pub const ALL: [ImportInterval; 4] = [
        ImportInterval::Hourly,
        ImportInterval::Daily,
        ImportInterval::Weekly,
        ImportInterval::Monthly,
    ];

    pub fn seconds(&self) -> i64 {
        match self {
            ImportInterval::Hourly => 3_600,
            ImportInterval::Daily => 86_400,
            ImportInterval::Weekly => 604_800,
            ImportInterval::Monthly => 2_629_800,
        }
    }

    pub fn from_seconds(seconds: i64) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|interval| interval.seconds() == seconds)
    }

    pub fn name(&self) -> &'static str {
        match self {
            ImportInterval::Hourly => "hourly",
            ImportInterval::Daily => "daily",
            ImportInterval::Weekly => "weekly",
            ImportInterval::Monthly => "monthly",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|interval| interval.name().eq_ignore_ascii_case(name))
    }
}

/// Automatic import preferences
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ImportSchedule {
    pub enabled: bool,
    pub interval: ImportInterval,
    pub last_import: Option<DateTime<Utc>>,
}

impl ImportSchedule {
    pub fn load(settings: &dyn SettingsStore) -> Self {
        let interval = match settings.get::<i64>(INTERVAL_KEY) {
            Some(seconds) => ImportInterval::from_seconds(seconds).unwrap_or_else(|| {
                warn!("ImportSchedule: Unknown interval {}s, using daily", seconds);
                ImportInterval::default()
            }),
            None => ImportInterval::default(),
        };

        ImportSchedule {
            enabled: settings.get(ENABLED_KEY).unwrap_or(false),
            interval,
            last_import: settings.get(LAST_DATE_KEY),
        }
    }

    /// Save the preferences. The last import time is only written by
    /// [`ImportSchedule::record_import`].
    pub fn save(&self, settings: &dyn SettingsStore) -> Result<(), SettingsError> {
        settings.set(ENABLED_KEY, &self.enabled)?;
        settings.set(INTERVAL_KEY, &self.interval.seconds())
    }

    /// Whether an automatic import should run now.
    ///
    /// Never due before the first manual import.
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        match (self.enabled, self.last_import) {
            (true, Some(last_import)) => (now - last_import).num_seconds() > self.interval.seconds(),
            _ => false,
        }
    }

    pub fn record_import(
        settings: &dyn SettingsStore,
        at: DateTime<Utc>,
    ) -> Result<(), SettingsError> {
        settings.set(LAST_DATE_KEY, &at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::MemorySettings;
    use chrono::Duration;

    #[test]
    fn test_defaults() {
        let schedule = ImportSchedule::load(&MemorySettings::new());
        assert!(!schedule.enabled);
        assert_eq!(schedule.interval, ImportInterval::Daily);
        assert_eq!(schedule.last_import, None);
    }

    #[test]
    fn test_save_and_record_then_load() {
        let settings = MemorySettings::new();
        let now = Utc::now();
        ImportSchedule {
            enabled: true,
            interval: ImportInterval::Weekly,
            last_import: None,
        }
        .save(&settings)
        .unwrap();
        ImportSchedule::record_import(&settings, now).unwrap();

        let schedule = ImportSchedule::load(&settings);
        assert!(schedule.enabled);
        assert_eq!(schedule.interval, ImportInterval::Weekly);
        assert_eq!(schedule.last_import, Some(now));
    }

    #[test]
    fn test_is_due() {
        let now = Utc::now();
        let mut schedule = ImportSchedule {
            enabled: true,
            interval: ImportInterval::Hourly,
            last_import: None,
        };
        assert!(!schedule.is_due(now), "never imported");

        schedule.last_import = Some(now - Duration::minutes(30));
        assert!(!schedule.is_due(now));

        schedule.last_import = Some(now - Duration::hours(2));
        assert!(schedule.is_due(now));

        schedule.enabled = false;
        assert!(!schedule.is_due(now));
    }

    #[test]
    fn test_interval_presets() {
        assert_eq!(ImportInterval::from_seconds(2_629_800), Some(ImportInterval::Monthly));
        assert_eq!(ImportInterval::from_seconds(42), None);
        assert_eq!(ImportInterval::from_name("Weekly"), Some(ImportInterval::Weekly));
    }
}
