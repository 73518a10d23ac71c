use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The signed-in user shown on the profile screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub name: String,
    pub email: String,
    pub logged_in_at: DateTime<Utc>,
}

impl Profile {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            logged_in_at: Utc::now(),
        }
    }

    /// Avatar letter: the first character of the name.
    pub fn initial(&self) -> Option<char> {
        self.name.trim().chars().next()
    }
}
