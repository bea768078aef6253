//! Cosmetic preferences. Neither value changes behavior, only presentation.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use crate::error::AppError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Template {
    #[default]
    Default,
    School,
    Birthday,
}

impl Template {
    pub fn as_str(&self) -> &'static str {
        match self {
            Template::Default => "default",
            Template::School => "school",
            Template::Birthday => "birthday",
        }
    }
}

impl Display for Template {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Template {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "default" => Ok(Template::Default),
            "school" => Ok(Template::School),
            "birthday" => Ok(Template::Birthday),
            other => Err(AppError::InvalidInput(format!(
                "Unknown template '{}'. Must be: default, school, or birthday",
                other
            ))),
        }
    }
}

/// Accessibility text-size flag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextSize {
    #[default]
    Normal,
    Large,
}

impl TextSize {
    pub fn toggled(self) -> Self {
        match self {
            TextSize::Normal => TextSize::Large,
            TextSize::Large => TextSize::Normal,
        }
    }

    pub fn is_large(self) -> bool {
        self == TextSize::Large
    }
}
