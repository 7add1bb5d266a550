//! Per-pair placeholder rewrite rules.
//!
//! A [`Rule`] rewrites one placeholder token from its source style into its
//! target style. It works in two halves:
//!
//! - **extract**: read the bound value (and its key, if the source is keyed)
//!   out of the source arguments;
//! - **emit**: record the value in the target accumulator and render the
//!   target placeholder text.
//!
//! Only the pairs in [`DIRECT_RULES`] exist. Everything else is routed
//! through the qmark pivot by the transpiler.

use crate::error::{PstyleError, PstyleResult};
use crate::parser::Token;
use crate::style::Style;
use crate::value::{ArgFamily, Args, IndexMap, Value};

/// Style pairs with a direct rewrite rule.
pub const DIRECT_RULES: &[(Style, Style)] = &[
    (Style::Numeric, Style::Qmark),
    (Style::Qmark, Style::Numeric),
    (Style::Named, Style::Qmark),
    (Style::Qmark, Style::Named),
    (Style::Qmark, Style::Pyformat),
    (Style::Format, Style::Qmark),
    (Style::Qmark, Style::Format),
    (Style::Pyformat, Style::Named),
    (Style::Named, Style::Pyformat),
    (Style::Pyformat, Style::Qmark),
    (Style::Auto, Style::Qmark),
    (Style::Auto, Style::Named),
];

/// A direct rewrite from one style to another.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rule {
    pub source: Style,
    pub target: Style,
}

impl Rule {
    /// Look up the direct rule for a pair.
    pub fn direct(source: Style, target: Style) -> Option<Rule> {
        DIRECT_RULES
            .iter()
            .any(|&(s, t)| s == source && t == target)
            .then_some(Rule { source, target })
    }

    /// Accumulator for this rule's target.
    pub fn accumulator(&self) -> Accumulator {
        match self.target.family() {
            Some(ArgFamily::Named) => Accumulator::Named(IndexMap::new()),
            _ => Accumulator::Ordered(Vec::new()),
        }
    }

    /// Rewrite one placeholder token, recording its binding in `acc`.
    ///
    /// Placeholders written in some other style are returned unchanged.
    pub fn rewrite(&self, token: &Token, args: &Args, acc: &mut Accumulator) -> PstyleResult<String> {
        match extract(self.source, &token.text, args, acc.len())? {
            Some(binding) => Ok(emit(self.target, binding, acc)),
            None => Ok(token.text.clone()),
        }
    }
}

/// Target arguments under construction.
#[derive(Debug, Clone, PartialEq)]
pub enum Accumulator {
    Ordered(Vec<Value>),
    Named(IndexMap<String, Value>),
}

impl Accumulator {
    pub fn len(&self) -> usize {
        match self {
            Accumulator::Ordered(values) => values.len(),
            Accumulator::Named(map) => map.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Freeze into the final argument container.
    pub fn finish(self) -> Args {
        match self {
            Accumulator::Ordered(values) => Args::Ordered(values),
            Accumulator::Named(map) => Args::Named(map),
        }
    }
}

/// A value pulled out of the source arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct Binding {
    /// Key to preserve when both sides are keyed.
    pub key: Option<String>,
    pub value: Value,
}

impl Binding {
    fn positional(value: Value) -> Self {
        Self { key: None, value }
    }
}

/// Extract the binding for `placeholder` under the `source` style.
///
/// `position` is the running count of bindings already made. Returns `None`
/// when the placeholder is not written in `source` syntax.
pub fn extract(
    source: Style,
    placeholder: &str,
    args: &Args,
    position: usize,
) -> PstyleResult<Option<Binding>> {
    let binding = match source {
        Style::Qmark => {
            if placeholder != "?" {
                return Ok(None);
            }
            Binding::positional(by_position(placeholder, args, position)?)
        }
        Style::Format => {
            if !placeholder.starts_with('%') {
                return Ok(None);
            }
            Binding::positional(by_position(placeholder, args, position)?)
        }
        Style::Numeric => {
            let Some(rest) = placeholder.strip_prefix(':') else {
                return Ok(None);
            };
            let index = rest
                .parse::<usize>()
                .map_err(|_| PstyleError::MalformedPlaceholder(placeholder.to_string()))?;
            Binding::positional(by_index(placeholder, args, index)?)
        }
        Style::Named => {
            let Some(rest) = placeholder.strip_prefix(':') else {
                return Ok(None);
            };
            match args {
                Args::Named(map) => by_key(placeholder, map, rest)?,
                // Ordered arguments turn `:N` into a 1-origin index.
                Args::Ordered(_) => {
                    let index = rest
                        .parse::<usize>()
                        .map_err(|_| PstyleError::MalformedPlaceholder(placeholder.to_string()))?;
                    Binding::positional(by_index(placeholder, args, index)?)
                }
            }
        }
        Style::Pyformat => {
            if let Some(name) = pyformat_key(placeholder) {
                by_key(placeholder, expect_named(placeholder, args)?, name)?
            } else if placeholder.starts_with('%') {
                Binding::positional(by_position(placeholder, args, position)?)
            } else {
                return Ok(None);
            }
        }
        Style::Auto => return detect(placeholder, args, position),
    };
    Ok(Some(binding))
}

/// Decide the style of a single placeholder from its own syntax.
///
/// Priority: `%(name)s`, then `:N`, then `:name`, then `%…`, then `?`.
fn detect(placeholder: &str, args: &Args, position: usize) -> PstyleResult<Option<Binding>> {
    if let Some(name) = pyformat_key(placeholder) {
        return by_key(placeholder, expect_named(placeholder, args)?, name).map(Some);
    }
    if let Some(rest) = placeholder.strip_prefix(':') {
        if let Ok(index) = rest.parse::<usize>() {
            return Ok(Some(Binding::positional(by_index(placeholder, args, index)?)));
        }
        return match args {
            Args::Named(map) => by_key(placeholder, map, rest).map(Some),
            Args::Ordered(_) => Err(PstyleError::MalformedPlaceholder(placeholder.to_string())),
        };
    }
    if placeholder.starts_with('%') || placeholder == "?" {
        return Ok(Some(Binding::positional(by_position(placeholder, args, position)?)));
    }
    Ok(None)
}

/// Record `binding` in `acc` and render the `target` placeholder.
///
/// Unkeyed bindings going into a keyed target get the name `arg<N>`, where N
/// is the number of entries already present. An existing key is kept as is.
pub fn emit(target: Style, binding: Binding, acc: &mut Accumulator) -> String {
    match acc {
        Accumulator::Ordered(values) => {
            values.push(binding.value);
            match target {
                Style::Numeric => format!(":{}", values.len()),
                Style::Format => "%s".to_string(),
                _ => "?".to_string(),
            }
        }
        Accumulator::Named(map) => {
            let key = binding.key.unwrap_or_else(|| format!("arg{}", map.len()));
            let rendered = match target {
                Style::Pyformat => format!("%({})s", key),
                _ => format!(":{}", key),
            };
            map.entry(key).or_insert(binding.value);
            rendered
        }
    }
}

/// `%(name)s` → `name`.
fn pyformat_key(placeholder: &str) -> Option<&str> {
    placeholder.strip_prefix("%(")?.strip_suffix(")s")
}

/// Value consumed in occurrence order (0-origin).
fn by_position(placeholder: &str, args: &Args, position: usize) -> PstyleResult<Value> {
    match args {
        Args::Ordered(values) => values
            .get(position)
            .cloned()
            .ok_or_else(|| PstyleError::out_of_range(placeholder, position + 1, values.len())),
        Args::Named(_) => Err(PstyleError::shape(placeholder, ArgFamily::Ordered)),
    }
}

/// Value addressed by an explicit 1-origin index.
fn by_index(placeholder: &str, args: &Args, index: usize) -> PstyleResult<Value> {
    match args {
        Args::Ordered(values) => index
            .checked_sub(1)
            .and_then(|i| values.get(i))
            .cloned()
            .ok_or_else(|| PstyleError::out_of_range(placeholder, index, values.len())),
        Args::Named(_) => Err(PstyleError::shape(placeholder, ArgFamily::Ordered)),
    }
}

fn by_key(placeholder: &str, map: &IndexMap<String, Value>, key: &str) -> PstyleResult<Binding> {
    map.get(key)
        .cloned()
        .map(|value| Binding {
            key: Some(key.to_string()),
            value,
        })
        .ok_or_else(|| PstyleError::missing_key(placeholder, key))
}

fn expect_named<'a>(placeholder: &str, args: &'a Args) -> PstyleResult<&'a IndexMap<String, Value>> {
    match args {
        Args::Named(map) => Ok(map),
        Args::Ordered(_) => Err(PstyleError::shape(placeholder, ArgFamily::Named)),
    }
}
