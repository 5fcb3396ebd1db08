use serde::{Deserialize, Serialize};

/// Dashboard colour scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    /// Dark background.
    Dark,
    /// Light background.
    #[default]
    Light,
}

impl Theme {
    /// Interpret a persisted value. Only `"dark"` selects the dark theme.
    #[must_use]
    pub fn from_stored(value: Option<&str>) -> Self {
        match value {
            Some("dark") => Self::Dark,
            _ => Self::Light,
        }
    }

    /// Value written to the persistence store.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Dark => "dark",
            Self::Light => "light",
        }
    }

    /// True for [`Theme::Dark`].
    #[must_use]
    pub const fn is_dark(self) -> bool {
        matches!(self, Self::Dark)
    }

    /// Chart background colour.
    #[must_use]
    pub const fn background(self) -> &'static str {
        match self {
            Self::Dark => "#2c2c2c",
            Self::Light => "#fafafa",
        }
    }

    /// Axis and label text colour.
    #[must_use]
    pub const fn text(self) -> &'static str {
        match self {
            Self::Dark => "#e0e0e0",
            Self::Light => "#333333",
        }
    }

    /// Grid line colour.
    #[must_use]
    pub const fn grid(self) -> &'static str {
        match self {
            Self::Dark => "#555",
            Self::Light => "rgba(197, 203, 206, 0.5)",
        }
    }

    /// Price and time scale border colour.
    #[must_use]
    pub const fn border(self) -> &'static str {
        match self {
            Self::Dark => "#555",
            Self::Light => "rgba(197, 203, 206, 0.8)",
        }
    }

    /// Confidence marker colour.
    #[must_use]
    pub const fn marker(self) -> &'static str {
        match self {
            Self::Dark => "white",
            Self::Light => "black",
        }
    }
}
