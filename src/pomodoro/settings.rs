use log::warn;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::pomodoro::{
    DEFAULT_LONG_BREAK_MINUTES, DEFAULT_POMODORO_MINUTES, DEFAULT_SHORT_BREAK_MINUTES,
    LONG_BREAK_MINUTES_RANGE, Mode, POMODORO_MINUTES_RANGE, SHORT_BREAK_MINUTES_RANGE,
};
use crate::error::{StorageReadError, ValidationError};
use crate::storage::Storage;
use crate::storage::storage::{SETTINGS_KEY, THEME_KEY};

/// Interval lengths in whole minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Durations {
    pub pomodoro: u32,
    pub short_break: u32,
    pub long_break: u32,
}

impl Default for Durations {
    fn default() -> Self {
        Self {
            pomodoro: DEFAULT_POMODORO_MINUTES,
            short_break: DEFAULT_SHORT_BREAK_MINUTES,
            long_break: DEFAULT_LONG_BREAK_MINUTES,
        }
    }
}

fn check_range(
    field: &'static str,
    value: u32,
    (min, max): (u32, u32),
) -> Result<(), ValidationError> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(ValidationError::OutOfRange {
            field,
            value,
            min,
            max,
        })
    }
}

impl Durations {
    pub fn minutes(&self, mode: Mode) -> u32 {
        match mode {
            Mode::Focus => self.pomodoro,
            Mode::ShortBreak => self.short_break,
            Mode::LongBreak => self.long_break,
        }
    }

    pub fn seconds(&self, mode: Mode) -> u32 {
        self.minutes(mode) * 60
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        check_range("pomodoro", self.pomodoro, POMODORO_MINUTES_RANGE)?;
        check_range("shortBreak", self.short_break, SHORT_BREAK_MINUTES_RANGE)?;
        check_range("longBreak", self.long_break, LONG_BREAK_MINUTES_RANGE)?;
        Ok(())
    }

    fn read(storage: &impl Storage) -> Result<Option<Self>, StorageReadError> {
        let Some(raw) = storage.get(SETTINGS_KEY) else {
            return Ok(None);
        };
        let durations: Durations =
            serde_json::from_str(&raw).map_err(|source| StorageReadError::Malformed {
                key: SETTINGS_KEY,
                source,
            })?;
        durations
            .validate()
            .map_err(|source| StorageReadError::Invalid {
                key: SETTINGS_KEY,
                source,
            })?;
        Ok(Some(durations))
    }

    /// Stored durations, or the defaults when absent or unusable.
    pub fn load(storage: &impl Storage) -> Self {
        match Self::read(storage) {
            Ok(Some(durations)) => durations,
            Ok(None) => Self::default(),
            Err(e) => {
                warn!("Ignoring stored settings: {}", e);
                Self::default()
            }
        }
    }

    pub fn save(&self, storage: &mut impl Storage) {
        match serde_json::to_string(self) {
            Ok(json) => storage.set(SETTINGS_KEY, &json),
            Err(e) => warn!("Failed to encode settings: {}", e),
        }
    }
}

/// Visual theme name. Carried through storage and display only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Theme(String);

impl Theme {
    pub fn new(name: &str) -> Result<Self, ValidationError> {
        let name = name.trim().to_lowercase();
        if name.is_empty() {
            return Err(ValidationError::EmptyTheme);
        }
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The stored theme is kept as a bare string, not JSON.
    pub fn load(storage: &impl Storage) -> Self {
        storage
            .get(THEME_KEY)
            .and_then(|raw| Self::new(&raw).ok())
            .unwrap_or_default()
    }

    pub fn save(&self, storage: &mut impl Storage) {
        storage.set(THEME_KEY, &self.0);
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self("default".to_string())
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Theme {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<Theme> for String {
    fn from(theme: Theme) -> Self {
        theme.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    fn durations(pomodoro: u32, short_break: u32, long_break: u32) -> Durations {
        Durations {
            pomodoro,
            short_break,
            long_break,
        }
    }

    #[test]
    fn accepts_bounds() {
        assert!(durations(1, 1, 1).validate().is_ok());
        assert!(durations(60, 30, 60).validate().is_ok());
    }

    #[test]
    fn rejects_short_break_outside_range() {
        for bad in [0, 31] {
            let err = durations(25, bad, 15).validate().unwrap_err();
            assert_eq!(
                err,
                ValidationError::OutOfRange {
                    field: "shortBreak",
                    value: bad,
                    min: 1,
                    max: 30
                }
            );
        }
        assert!(durations(61, 5, 15).validate().is_err());
        assert!(durations(25, 5, 0).validate().is_err());
    }

    #[test]
    fn serializes_with_camel_case_keys() {
        let json = serde_json::to_string(&Durations::default()).unwrap();
        assert_eq!(json, r#"{"pomodoro":25,"shortBreak":5,"longBreak":15}"#);
    }

    #[test]
    fn load_falls_back_to_defaults() {
        let mut storage = MemoryStorage::new();
        assert_eq!(Durations::load(&storage), Durations::default());

        storage.set(SETTINGS_KEY, "{broken");
        assert_eq!(Durations::load(&storage), Durations::default());

        storage.set(SETTINGS_KEY, r#"{"pomodoro":25,"shortBreak":45,"longBreak":15}"#);
        assert_eq!(Durations::load(&storage), Durations::default());

        storage.set(SETTINGS_KEY, r#"{"pomodoro":50,"shortBreak":10,"longBreak":30}"#);
        assert_eq!(Durations::load(&storage), durations(50, 10, 30));
    }

    #[test]
    fn theme_is_normalized_and_restored() {
        let mut storage = MemoryStorage::new();
        assert_eq!(Theme::load(&storage), Theme::default());

        Theme::new("  Dark ").unwrap().save(&mut storage);
        assert_eq!(storage.get(THEME_KEY).as_deref(), Some("dark"));
        assert_eq!(Theme::load(&storage).as_str(), "dark");

        storage.set(THEME_KEY, "   ");
        assert_eq!(Theme::load(&storage), Theme::default());
        assert_eq!(Theme::new(""), Err(ValidationError::EmptyTheme));
    }
}
