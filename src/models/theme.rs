use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::collections::BTreeMap;

use super::defaults::theme_default;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ThemeKey {
    PrimaryColor,
    SecondaryColor,
    AccentColor,
    FontFamily,
}

impl ThemeKey {
    pub const ALL: [ThemeKey; 4] = [
        ThemeKey::PrimaryColor,
        ThemeKey::SecondaryColor,
        ThemeKey::AccentColor,
        ThemeKey::FontFamily,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ThemeKey::PrimaryColor => "primaryColor",
            ThemeKey::SecondaryColor => "secondaryColor",
            ThemeKey::AccentColor => "accentColor",
            ThemeKey::FontFamily => "fontFamily",
        }
    }

    pub fn parse(key: &str) -> Option<ThemeKey> {
        ThemeKey::ALL.into_iter().find(|k| k.as_str() == key)
    }

    pub fn default_value(&self) -> &'static str {
        theme_default(*self)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ThemeSetting {
    pub id: String,
    pub key: String,
    pub value: String,
    pub updated_at: i64,
}

/// Fully populated theme; every key always has a value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Theme {
    pub primary_color: String,
    pub secondary_color: String,
    pub accent_color: String,
    pub font_family: String,
}

impl Default for Theme {
    fn default() -> Self {
        Theme {
            primary_color: ThemeKey::PrimaryColor.default_value().to_string(),
            secondary_color: ThemeKey::SecondaryColor.default_value().to_string(),
            accent_color: ThemeKey::AccentColor.default_value().to_string(),
            font_family: ThemeKey::FontFamily.default_value().to_string(),
        }
    }
}

impl Theme {
    pub fn get(&self, key: ThemeKey) -> &str {
        match key {
            ThemeKey::PrimaryColor => &self.primary_color,
            ThemeKey::SecondaryColor => &self.secondary_color,
            ThemeKey::AccentColor => &self.accent_color,
            ThemeKey::FontFamily => &self.font_family,
        }
    }

    pub fn set(&mut self, key: ThemeKey, value: impl Into<String>) {
        let slot = match key {
            ThemeKey::PrimaryColor => &mut self.primary_color,
            ThemeKey::SecondaryColor => &mut self.secondary_color,
            ThemeKey::AccentColor => &mut self.accent_color,
            ThemeKey::FontFamily => &mut self.font_family,
        };
        *slot = value.into();
    }

    pub fn entries(&self) -> Vec<(ThemeKey, String)> {
        ThemeKey::ALL
            .into_iter()
            .map(|key| (key, self.get(key).to_string()))
            .collect()
    }
}

/// Partial theme update keyed by the wire names (`primaryColor`, ...).
#[derive(Debug, Deserialize)]
pub struct ThemeForm {
    #[serde(flatten)]
    pub values: BTreeMap<String, String>,
}
