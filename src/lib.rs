//! # pstyle: SQL placeholder style converter
//!
//! Database drivers disagree on how a statement marks its parameters.
//! pstyle rewrites SQL text and its arguments from one convention to
//! another, so code can be written once and run against any driver.
//!
//! ## Quick Example
//!
//! ```
//! use pstyle::{args, convert, kwargs, Style};
//!
//! let out = convert(
//!     Style::Qmark,
//!     Style::Named,
//!     "select * from users where id=? and active=?",
//!     args![42, true],
//! )
//! .unwrap();
//!
//! assert_eq!(out.sql, "SELECT * FROM users WHERE id=:arg0 AND active=:arg1");
//! assert_eq!(out.args, kwargs! { "arg0" => 42, "arg1" => true });
//! ```
//!
//! ## Styles
//!
//! | Style      | Placeholder | Arguments   |
//! |------------|-------------|-------------|
//! | `qmark`    | `?`         | ordered     |
//! | `numeric`  | `:1`        | ordered     |
//! | `named`    | `:name`     | named       |
//! | `format`   | `%s`        | ordered     |
//! | `pyformat` | `%(name)s`  | named       |
//! | `auto`     | any         | source only |
//!
//! Placeholders inside string literals and comments are never touched.
//! [`engine::StyledDb`] applies the conversion in front of a database.

pub mod config;
pub mod engine;
pub mod error;
pub mod parser;
pub mod rules;
pub mod style;
pub mod transpiler;
pub mod value;

pub mod prelude {
    pub use crate::engine::{Backend, StyledDb};
    pub use crate::error::*;
    pub use crate::style::Style;
    pub use crate::transpiler::{Converted, convert, convert_opt};
    pub use crate::value::{ArgFamily, Args, Value};
    pub use crate::{args, kwargs};
}

pub use error::{PstyleError, PstyleResult};
pub use style::Style;
pub use transpiler::{Converted, convert, convert_opt};
pub use value::{ArgFamily, Args, Value};
