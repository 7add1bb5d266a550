//! Placeholder style registry.
//!
//! | Style      | Placeholder   | Arguments |
//! |------------|---------------|-----------|
//! | `qmark`    | `?`           | ordered   |
//! | `numeric`  | `:1`          | ordered   |
//! | `named`    | `:name`       | named     |
//! | `format`   | `%s`          | ordered   |
//! | `pyformat` | `%(name)s`    | named     |
//! | `auto`     | any of above  | source only |

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::PstyleError;
use crate::value::ArgFamily;

/// A placeholder convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Style {
    Qmark,
    Numeric,
    Named,
    Format,
    Pyformat,
    /// Detect each placeholder from its own syntax. Source only.
    Auto,
}

impl Style {
    /// Styles that can be converted to.
    pub const TARGETS: [Style; 5] = [
        Style::Qmark,
        Style::Numeric,
        Style::Named,
        Style::Format,
        Style::Pyformat,
    ];

    /// Every style, `auto` last.
    pub const ALL: [Style; 6] = [
        Style::Qmark,
        Style::Numeric,
        Style::Named,
        Style::Format,
        Style::Pyformat,
        Style::Auto,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Style::Qmark => "qmark",
            Style::Numeric => "numeric",
            Style::Named => "named",
            Style::Format => "format",
            Style::Pyformat => "pyformat",
            Style::Auto => "auto",
        }
    }

    /// Argument container family, `None` for `auto`.
    pub fn family(self) -> Option<ArgFamily> {
        match self {
            Style::Qmark | Style::Numeric | Style::Format => Some(ArgFamily::Ordered),
            Style::Named | Style::Pyformat => Some(ArgFamily::Named),
            Style::Auto => None,
        }
    }

    pub fn is_target(self) -> bool {
        self != Style::Auto
    }

    /// Sample placeholder, for help output.
    pub fn example(self) -> &'static str {
        match self {
            Style::Qmark => "?",
            Style::Numeric => ":1",
            Style::Named => ":name",
            Style::Format => "%s",
            Style::Pyformat => "%(name)s",
            Style::Auto => "? :1 :name %s %(name)s",
        }
    }
}

impl fmt::Display for Style {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Style {
    type Err = PstyleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Style::ALL
            .into_iter()
            .find(|style| style.name() == wanted)
            .ok_or_else(|| PstyleError::UnknownStyle(s.to_string()))
    }
}
