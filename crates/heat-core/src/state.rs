//! Three-way classification of a temperature.

use std::fmt;

use serde::{Deserialize, Serialize};

/// How worried to be about an identifier right now.
///
/// `Warning` usually warrants friction (a CAPTCHA, a slower path);
/// `Critical` warrants cutting the identifier off.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum HeatState {
    Safe,
    Warning,
    Critical,
}

impl HeatState {
    pub fn as_str(&self) -> &'static str {
        match self {
            HeatState::Safe => "safe",
            HeatState::Warning => "warning",
            HeatState::Critical => "critical",
        }
    }
}

impl fmt::Display for HeatState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
