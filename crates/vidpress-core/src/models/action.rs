use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use crate::error::AppError;

/// Processing mode requested from the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Compress,
    Convert,
    Trim,
}

impl Action {
    pub const ALL: [Action; 3] = [Action::Compress, Action::Convert, Action::Trim];

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Compress => "compress",
            Action::Convert => "convert",
            Action::Trim => "trim",
        }
    }

    /// Present participle used in announcements ("Compressing your video").
    pub fn progressive(&self) -> &'static str {
        match self {
            Action::Compress => "Compressing",
            Action::Convert => "Converting",
            Action::Trim => "Trimming",
        }
    }
}

impl Display for Action {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Action {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "compress" => Ok(Action::Compress),
            "convert" => Ok(Action::Convert),
            "trim" => Ok(Action::Trim),
            other => Err(AppError::InvalidInput(format!(
                "Unknown action '{}'. Must be: compress, convert, or trim",
                other
            ))),
        }
    }
}
