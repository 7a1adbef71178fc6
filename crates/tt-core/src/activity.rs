//! Activities: the named things time is tracked against.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Activity names may only contain ASCII letters, digits, `_` and `-`.
static NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9a-zA-Z_-]+$").expect("static regex is valid"));

/// Name reserved by the storage layer.
const RESERVED_NAME: &str = "index";

/// Activity name validation errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("activity name is not valid: it cannot be empty")]
    EmptyName,

    #[error("activity name is not valid: 'index' is a reserved keyword")]
    ReservedName,

    #[error(
        "activity name is not valid: '{name}' must only contain alphanumeric characters, '_' or '-'"
    )]
    InvalidCharacters { name: String },
}

/// Stable storage handle for an activity.
///
/// Logs reference activities through this id, never through the mutable name,
/// so renaming keeps history attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActivityId(i64);

impl ActivityId {
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for ActivityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An activity registered by the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activity {
    /// Unset until the activity has been stored.
    pub id: Option<ActivityId>,
    pub name: String,
    pub alias: Option<String>,
    pub description: Option<String>,
}

impl Activity {
    /// Creates an unsaved activity. The name is not validated here.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            alias: None,
            description: None,
        }
    }

    /// Sets the alias, lowercased. Blank aliases are treated as absent.
    #[must_use]
    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = non_blank(alias.into()).map(|alias| alias.to_lowercase());
        self
    }

    /// Sets the description. Blank descriptions are treated as absent.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = non_blank(description.into());
        self
    }

    #[must_use]
    pub fn with_id(mut self, id: ActivityId) -> Self {
        self.id = Some(id);
        self
    }

    pub const fn has_alias(&self) -> bool {
        self.alias.is_some()
    }

    pub const fn has_description(&self) -> bool {
        self.description.is_some()
    }

    /// Validates the name and canonicalizes it to lowercase.
    pub fn validate_name(&mut self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyName);
        }
        let lowered = self.name.to_lowercase();
        if lowered == RESERVED_NAME {
            return Err(ValidationError::ReservedName);
        }
        if !NAME_RE.is_match(&self.name) {
            return Err(ValidationError::InvalidCharacters {
                name: self.name.clone(),
            });
        }
        self.name = lowered;
        Ok(())
    }
}

impl fmt::Display for Activity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Name: {}", self.name)?;
        if let Some(alias) = &self.alias {
            write!(f, "\n Alias: {alias}")?;
        }
        if let Some(description) = &self.description {
            write!(f, "\n Description: {description}")?;
        }
        Ok(())
    }
}

/// Partial update of an activity's mutable fields.
///
/// Aliases are not updatable; delete and re-add the activity instead.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActivityUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
}

impl ActivityUpdate {
    pub const fn is_noop(&self) -> bool {
        self.name.is_none() && self.description.is_none()
    }

    /// Merges the update into `activity`. The result still needs
    /// [`Activity::validate_name`] before it is stored.
    #[must_use]
    pub fn apply(&self, mut activity: Activity) -> Activity {
        if let Some(name) = &self.name {
            activity.name.clone_from(name);
        }
        if let Some(description) = &self.description {
            activity.description = non_blank(description.clone());
        }
        activity
    }
}

fn non_blank(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}
