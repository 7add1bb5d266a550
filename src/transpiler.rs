//! Placeholder style transpiler.
//!
//! Rewrites SQL text and its arguments from one placeholder style to
//! another. A conversion either:
//!
//! 1. returns its input unchanged (same style on both sides),
//! 2. applies one direct [`Rule`] over the whole text, or
//! 3. goes through the qmark pivot: `source → qmark → target`.
//!
//! # Example
//!
//! ```
//! use pstyle::{args, convert, Style};
//!
//! let out = convert(Style::Format, Style::Numeric, "select * from t where id=%s", args![10]).unwrap();
//! assert_eq!(out.sql, "SELECT * FROM t WHERE id=:1");
//! assert_eq!(out.args, args![10]);
//! ```

use tracing::debug;

use crate::error::{PstyleError, PstyleResult};
use crate::parser;
use crate::rules::{Accumulator, Rule};
use crate::style::Style;
use crate::value::Args;

/// Result of a conversion.
#[derive(Debug, Clone, PartialEq)]
pub struct Converted {
    /// The rewritten SQL.
    pub sql: String,
    /// Arguments shaped for the target style.
    pub args: Args,
}

impl Converted {
    pub fn into_parts(self) -> (String, Args) {
        (self.sql, self.args)
    }
}

/// How a pair of styles is converted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversionPath {
    /// Same style, nothing to do.
    Identity,
    /// One rule over the whole text.
    Direct(Rule),
    /// Into qmark, then out of it.
    Pivot(Rule, Rule),
}

/// Pick the conversion path for a pair of styles.
pub fn resolve(from: Style, to: Style) -> PstyleResult<ConversionPath> {
    if !to.is_target() {
        return Err(PstyleError::Unsupported { from, to });
    }
    if from == to {
        return Ok(ConversionPath::Identity);
    }
    if let Some(rule) = Rule::direct(from, to) {
        return Ok(ConversionPath::Direct(rule));
    }
    match (Rule::direct(from, Style::Qmark), Rule::direct(Style::Qmark, to)) {
        (Some(first), Some(second)) => Ok(ConversionPath::Pivot(first, second)),
        _ => Err(PstyleError::Unsupported { from, to }),
    }
}

/// Convert `sql` and `args` from one style to another, normalizing keywords.
pub fn convert(from: Style, to: Style, sql: &str, args: Args) -> PstyleResult<Converted> {
    convert_opt(from, to, sql, args, true)
}

/// Convert `sql` and `args` from one style to another.
///
/// With `normalize` set, SQL keywords outside placeholders are upper-cased;
/// otherwise non-placeholder text is kept byte-for-byte. Through the qmark
/// pivot the intermediate text is always normalized.
pub fn convert_opt(
    from: Style,
    to: Style,
    sql: &str,
    args: Args,
    normalize: bool,
) -> PstyleResult<Converted> {
    match resolve(from, to)? {
        ConversionPath::Identity => Ok(Converted {
            sql: sql.to_string(),
            args,
        }),
        ConversionPath::Direct(rule) => {
            debug!("direct: {} to {}", from, to);
            apply(rule, sql, &args, normalize)
        }
        ConversionPath::Pivot(first, second) => {
            let pivot = apply(first, sql, &args, true)?;
            debug!("pivot: sql={:?}, args={}", pivot.sql, pivot.args);
            apply(second, &pivot.sql, &pivot.args, normalize)
        }
    }
}

/// Run one rule over every token of every statement.
fn apply(rule: Rule, sql: &str, args: &Args, normalize: bool) -> PstyleResult<Converted> {
    let statements = parser::tokenize(sql)?;
    let (out, acc) = statements
        .iter()
        .flat_map(|stmt| stmt.tokens.iter())
        .try_fold(
            (String::with_capacity(sql.len()), rule.accumulator()),
            |(mut out, mut acc): (String, Accumulator), token| {
                if token.is_placeholder() {
                    out.push_str(&rule.rewrite(token, args, &mut acc)?);
                } else if normalize {
                    out.push_str(&token.normalized());
                } else {
                    out.push_str(&token.text);
                }
                Ok::<_, PstyleError>((out, acc))
            },
        )?;
    let converted = Converted {
        sql: out,
        args: acc.finish(),
    };
    debug!(
        "{} to {}: {:?} -> {:?}, args={}",
        rule.source, rule.target, sql, converted.sql, converted.args
    );
    Ok(converted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::ArgFamily;
    use crate::{args, kwargs};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_resolve_paths() {
        assert_eq!(resolve(Style::Named, Style::Named).unwrap(), ConversionPath::Identity);
        assert_eq!(
            resolve(Style::Qmark, Style::Format).unwrap(),
            ConversionPath::Direct(Rule { source: Style::Qmark, target: Style::Format })
        );
        assert_eq!(
            resolve(Style::Format, Style::Numeric).unwrap(),
            ConversionPath::Pivot(
                Rule { source: Style::Format, target: Style::Qmark },
                Rule { source: Style::Qmark, target: Style::Numeric },
            )
        );
    }

    #[test]
    fn test_every_concrete_pair_resolves() {
        for from in Style::ALL {
            for to in Style::TARGETS {
                assert!(resolve(from, to).is_ok(), "{} to {}", from, to);
            }
        }
    }

    #[test]
    fn test_auto_target_unsupported() {
        for from in Style::ALL {
            assert!(matches!(
                resolve(from, Style::Auto),
                Err(PstyleError::Unsupported { to: Style::Auto, .. })
            ));
        }
        let err = convert(Style::Qmark, Style::Auto, "SELECT * from t WHERE val=?", args!["hello"]);
        assert!(matches!(err, Err(PstyleError::Unsupported { .. })));
    }

    #[test]
    fn test_identity_returns_input_untouched() {
        // Not even tokenized: lower-case keywords and a wrong-shaped container survive.
        let out = convert(Style::Qmark, Style::Qmark, "select ?", kwargs! { "a" => 1 }).unwrap();
        assert_eq!(out.sql, "select ?");
        assert_eq!(out.args, kwargs! { "a" => 1 });
    }

    #[test]
    fn test_format_to_numeric() {
        let out = convert(Style::Format, Style::Numeric, "SELECT * FROM t WHERE id=%s", args![10]).unwrap();
        assert_eq!(out.sql, "SELECT * FROM t WHERE id=:1");
        assert_eq!(out.args, args![10]);
    }

    #[test]
    fn test_qmark_to_pyformat_numbering() {
        let out = convert(Style::Qmark, Style::Pyformat, "SELECT * FROM t WHERE id=? AND v=?", args![100, "x"]).unwrap();
        assert_eq!(out.sql, "SELECT * FROM t WHERE id=%(arg0)s AND v=%(arg1)s");
        assert_eq!(out.args, kwargs! { "arg0" => 100, "arg1" => "x" });
    }

    #[test]
    fn test_repeated_named_key() {
        let out = convert(Style::Named, Style::Qmark, "SELECT * FROM t WHERE id=:name OR id2=:name", kwargs! { "name" => 7 }).unwrap();
        assert_eq!(out.sql, "SELECT * FROM t WHERE id=? OR id2=?");
        assert_eq!(out.args, args![7, 7]);
    }

    #[test]
    fn test_normalize_flag() {
        let sql = "select * from tbl1 where id=%s";
        let kept = convert_opt(Style::Format, Style::Qmark, sql, args![10], false).unwrap();
        assert_eq!(kept.sql, "select * from tbl1 where id=?");
        let normalized = convert_opt(Style::Format, Style::Qmark, sql, args![10], true).unwrap();
        assert_eq!(normalized.sql, "SELECT * FROM tbl1 WHERE id=?");
    }

    #[test]
    fn test_pivot_always_normalizes_intermediate() {
        let sql = "select * from tbl1 where id=%s";
        let out = convert_opt(Style::Format, Style::Numeric, sql, args![10], false).unwrap();
        assert_eq!(out.sql, "SELECT * FROM tbl1 WHERE id=:1");
    }

    #[test]
    fn test_no_placeholders_gives_empty_target_container() {
        let sql = "SELECT c1+c2 FROM T GROUP BY c1+c2";
        for to in [Style::Qmark, Style::Numeric, Style::Format] {
            let out = convert(Style::Named, to, sql, kwargs! {}).unwrap();
            assert_eq!(out.sql, sql);
            assert_eq!(out.args, Args::empty(ArgFamily::Ordered));
        }
        for to in [Style::Named, Style::Pyformat] {
            let out = convert(Style::Qmark, to, sql, args![]).unwrap();
            assert_eq!(out.sql, sql);
            assert_eq!(out.args, Args::empty(ArgFamily::Named));
        }
    }

    #[test]
    fn test_order_across_statements() {
        let out = convert(Style::Format, Style::Numeric, "UPDATE t SET a=%s; DELETE FROM t WHERE b=%s;", args![1, 2]).unwrap();
        assert_eq!(out.sql, "UPDATE t SET a=:1; DELETE FROM t WHERE b=:2;");
        assert_eq!(out.args, args![1, 2]);
    }

    #[test]
    fn test_round_trip_through_named() {
        let sql = "INSERT INTO t (a, b, c) VALUES (?, ?, ?)";
        let original = args![1, "two", 3.5];
        let named = convert(Style::Qmark, Style::Named, sql, original.clone()).unwrap();
        assert_eq!(named.sql, "INSERT INTO t (a, b, c) VALUES (:arg0, :arg1, :arg2)");
        let back = convert(Style::Named, Style::Qmark, &named.sql, named.args).unwrap();
        assert_eq!(back.sql, sql);
        assert_eq!(back.args, original);
    }

    #[test]
    fn test_auto_mixed_styles() {
        let out = convert(Style::Auto, Style::Qmark, "SELECT * FROM tbl1 WHERE id=? and val=%s", args![10, "hello"]).unwrap();
        assert_eq!(out.sql, "SELECT * FROM tbl1 WHERE id=? AND val=?");
        assert_eq!(out.args, args![10, "hello"]);
    }

    #[test]
    fn test_binding_error_stops_conversion() {
        let err = convert(Style::Qmark, Style::Format, "SELECT ?, ?", args![1]).unwrap_err();
        assert!(err.is_binding());
    }

    #[test]
    fn test_placeholders_in_literals_untouched() {
        let out = convert(Style::Qmark, Style::Numeric, "SELECT '?' AS q, ? -- why?\n", args![1]).unwrap();
        assert_eq!(out.sql, "SELECT '?' AS q, :1 -- why?\n");
        assert_eq!(out.args, args![1]);
    }
}
