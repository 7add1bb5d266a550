//! SQL token classifier using nom.
//!
//! Splits SQL text into statements and classified tokens. Only as much SQL
//! is understood as is needed to find placeholders safely:
//!
//! ```text
//! SELECT * FROM t WHERE name = '?' AND id = ? -- really?
//!                              ─┬─         ┬  ──────┬────
//!                               │          │        └── comment, opaque
//!                               │          └── placeholder
//!                               └── quoted literal, opaque
//! ```
//!
//! Concatenating the text of every token reproduces the input exactly.

use nom::{
    branch::alt,
    bytes::complete::{tag, take_until, take_while1},
    character::complete::{anychar, char, digit1, line_ending, multispace1, not_line_ending},
    combinator::{map, opt, recognize, rest},
    sequence::{delimited, pair, tuple},
    IResult,
};

use crate::error::{PstyleError, PstyleResult};

/// Token classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Whitespace,
    Comment,
    /// Quoted literal or quoted identifier.
    Quoted,
    Number,
    /// Keyword or identifier.
    Word,
    Placeholder,
    Punctuation,
    Operator,
}

/// A classified piece of SQL text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.kind == TokenKind::Placeholder
    }

    pub fn is_keyword(&self) -> bool {
        self.kind == TokenKind::Word && is_keyword(&self.text)
    }

    /// Canonical rendering: keywords upper-cased, everything else verbatim.
    pub fn normalized(&self) -> String {
        if self.is_keyword() {
            self.text.to_ascii_uppercase()
        } else {
            self.text.clone()
        }
    }
}

/// One statement, including its terminating `;` if any.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Statement {
    pub tokens: Vec<Token>,
}

impl Statement {
    pub fn placeholders(&self) -> impl Iterator<Item = &Token> {
        self.tokens.iter().filter(|t| t.is_placeholder())
    }

    /// The statement text exactly as written.
    pub fn text(&self) -> String {
        self.tokens.iter().map(|t| t.text.as_str()).collect()
    }

    fn is_trivia(&self) -> bool {
        self.tokens
            .iter()
            .all(|t| matches!(t.kind, TokenKind::Whitespace | TokenKind::Comment))
    }
}

/// Keywords rendered upper-case by [`Token::normalized`].
const KEYWORDS: &[&str] = &[
    "ADD", "ALL", "ALTER", "AND", "ANY", "AS", "ASC", "BEGIN", "BETWEEN", "BY", "CASCADE",
    "CASE", "CHECK", "COLUMN", "COMMIT", "CONSTRAINT", "CREATE", "CROSS", "DATABASE", "DEFAULT",
    "DELETE", "DESC", "DISTINCT", "DROP", "ELSE", "END", "ESCAPE", "EXCEPT", "EXISTS", "FALSE",
    "FETCH", "FOR", "FOREIGN", "FROM", "FULL", "GRANT", "GROUP", "HAVING", "IF", "ILIKE", "IN",
    "INDEX", "INNER", "INSERT", "INTERSECT", "INTO", "IS", "JOIN", "KEY", "LEFT", "LIKE",
    "LIMIT", "NATURAL", "NOT", "NULL", "OFFSET", "ON", "OR", "ORDER", "OUTER", "OVER",
    "PARTITION", "PRIMARY", "REFERENCES", "REPLACE", "RETURNING", "REVOKE", "RIGHT",
    "ROLLBACK", "SELECT", "SET", "SOME", "TABLE", "THEN", "TO", "TRANSACTION", "TRUE",
    "TRUNCATE", "UNION", "UNIQUE", "UPDATE", "USING", "VALUES", "VIEW", "WHEN", "WHERE",
    "WITH",
];

fn is_keyword(word: &str) -> bool {
    KEYWORDS.iter().any(|k| k.eq_ignore_ascii_case(word))
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Tokenize SQL text into statements.
///
/// # Example
///
/// ```
/// use pstyle::parser::tokenize;
///
/// let stmts = tokenize("SELECT ?; SELECT :id").unwrap();
/// assert_eq!(stmts.len(), 2);
/// assert_eq!(stmts[1].placeholders().next().unwrap().text, ":id");
/// ```
pub fn tokenize(sql: &str) -> PstyleResult<Vec<Statement>> {
    let mut statements = Vec::new();
    let mut current = Statement::default();
    let mut input = sql;
    let mut prev: Option<char> = None;

    while !input.is_empty() {
        let (remaining, token) = match next_token(input, prev) {
            Ok(ok) => ok,
            Err(e) => {
                return Err(PstyleError::parse(
                    sql.len() - input.len(),
                    format!("Tokenize failed: {:?}", e),
                ));
            }
        };
        prev = token.text.chars().last();
        let ends_statement = token.kind == TokenKind::Punctuation && token.text == ";";
        current.tokens.push(token);
        if ends_statement {
            statements.push(std::mem::take(&mut current));
        }
        input = remaining;
    }

    if !current.tokens.is_empty() {
        match statements.last_mut() {
            Some(last) if current.is_trivia() => last.tokens.append(&mut current.tokens),
            _ => statements.push(current),
        }
    }

    Ok(statements)
}

/// Parse one token. `prev` is the last character of the previous token.
fn next_token(input: &str, prev: Option<char>) -> IResult<&str, Token> {
    // `:name` and `$name` only start a placeholder on a word boundary.
    if prev.is_some_and(is_word_char) && (input.starts_with(':') || input.starts_with('$')) {
        return map(alt((tag("::"), recognize(anychar))), |s: &str| {
            Token::new(TokenKind::Punctuation, s)
        })(input);
    }

    alt((
        map(multispace1, |s: &str| Token::new(TokenKind::Whitespace, s)),
        map(parse_comment, |s| Token::new(TokenKind::Comment, s)),
        map(parse_quoted, |s| Token::new(TokenKind::Quoted, s)),
        map(parse_placeholder, |s| Token::new(TokenKind::Placeholder, s)),
        map(tag("::"), |s: &str| Token::new(TokenKind::Punctuation, s)),
        map(parse_number, |s| Token::new(TokenKind::Number, s)),
        map(take_while1(is_word_char), |s: &str| {
            Token::new(TokenKind::Word, s)
        }),
        map(parse_operator, |s| Token::new(TokenKind::Operator, s)),
        map(recognize(anychar), |s: &str| {
            Token::new(TokenKind::Punctuation, s)
        }),
    ))(input)
}

/// Parse a comment: `-- ...`, `# ...` (to end of line) or `/* ... */`.
fn parse_comment(input: &str) -> IResult<&str, &str> {
    alt((
        recognize(tuple((
            alt((tag("--"), tag("# "))),
            not_line_ending,
            opt(line_ending),
        ))),
        recognize(delimited(tag("/*"), take_until("*/"), tag("*/"))),
        // Unterminated block comment swallows the rest.
        recognize(pair(tag("/*"), rest)),
    ))(input)
}

/// Parse a quoted literal or identifier.
fn parse_quoted(input: &str) -> IResult<&str, &str> {
    match input.chars().next() {
        Some(quote @ ('\'' | '"' | '`')) => quoted(input, quote),
        _ => Err(nom::Err::Error(nom::error::Error::new(
            input,
            nom::error::ErrorKind::Char,
        ))),
    }
}

/// Quoted run opened and closed by `quote`. A doubled quote or a backslash escape stays inside.
fn quoted(input: &str, quote: char) -> IResult<&str, &str> {
    let body = &input[quote.len_utf8()..];
    let mut chars = body.char_indices();
    while let Some((i, c)) = chars.next() {
        if c == '\\' {
            chars.next();
        } else if c == quote {
            if body[i + c.len_utf8()..].starts_with(quote) {
                chars.next();
            } else {
                let end = input.len() - body.len() + i + c.len_utf8();
                return Ok((&input[end..], &input[..end]));
            }
        }
    }
    Err(nom::Err::Error(nom::error::Error::new(
        input,
        nom::error::ErrorKind::Char,
    )))
}

/// Parse a placeholder: `?`, `%s`, `%(name)s`, `:word`, `$word`.
fn parse_placeholder(input: &str) -> IResult<&str, &str> {
    alt((
        tag("?"),
        recognize(tuple((tag("%("), take_while1(is_word_char), tag(")s")))),
        tag("%s"),
        recognize(pair(
            alt((char(':'), char('$'))),
            take_while1(is_word_char),
        )),
    ))(input)
}

/// Parse a number: digits with an optional fraction, not running into a word.
fn parse_number(input: &str) -> IResult<&str, &str> {
    let (remaining, number) =
        recognize(pair(digit1::<&str, nom::error::Error<&str>>, opt(pair(char('.'), digit1))))(
            input,
        )?;
    if remaining.starts_with(is_word_char) {
        // `1abc` is a word, not a number.
        return Err(nom::Err::Error(nom::error::Error::new(
            input,
            nom::error::ErrorKind::Digit,
        )));
    }
    Ok((remaining, number))
}

/// Parse a comparison or arithmetic operator.
fn parse_operator(input: &str) -> IResult<&str, &str> {
    alt((
        tag("<>"),
        tag("<="),
        tag(">="),
        tag("!="),
        tag("||"),
        recognize(nom::character::complete::one_of("=<>+-*/%|&^~!")),
    ))(input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn kinds(sql: &str) -> Vec<(TokenKind, String)> {
        tokenize(sql)
            .unwrap()
            .into_iter()
            .flat_map(|s| s.tokens)
            .map(|t| (t.kind, t.text))
            .collect()
    }

    fn placeholders(sql: &str) -> Vec<String> {
        tokenize(sql)
            .unwrap()
            .iter()
            .flat_map(|s| s.placeholders().map(|t| t.text.clone()).collect::<Vec<_>>())
            .collect()
    }

    #[test]
    fn test_simple_select() {
        let tokens = kinds("SELECT * FROM t WHERE id=?");
        assert_eq!(
            tokens,
            vec![
                (TokenKind::Word, "SELECT".to_string()),
                (TokenKind::Whitespace, " ".to_string()),
                (TokenKind::Operator, "*".to_string()),
                (TokenKind::Whitespace, " ".to_string()),
                (TokenKind::Word, "FROM".to_string()),
                (TokenKind::Whitespace, " ".to_string()),
                (TokenKind::Word, "t".to_string()),
                (TokenKind::Whitespace, " ".to_string()),
                (TokenKind::Word, "WHERE".to_string()),
                (TokenKind::Whitespace, " ".to_string()),
                (TokenKind::Word, "id".to_string()),
                (TokenKind::Operator, "=".to_string()),
                (TokenKind::Placeholder, "?".to_string()),
            ]
        );
    }

    #[test]
    fn test_all_placeholder_syntaxes() {
        assert_eq!(
            placeholders("a=? b=:1 c=:name d=%s e=%(key)s f=$1"),
            vec!["?", ":1", ":name", "%s", "%(key)s", "$1"]
        );
    }

    #[test]
    fn test_quoted_and_comments_are_opaque() {
        let sql = "SELECT '?', \"%s\", `:x`, 'it''s ?' -- where id=?\n/* :y */ FROM t";
        assert!(placeholders(sql).is_empty());
    }

    #[test]
    fn test_cast_is_not_placeholder() {
        assert_eq!(placeholders("SELECT x::int, :v"), vec![":v"]);
    }

    #[test]
    fn test_colon_after_word_is_not_placeholder() {
        assert!(placeholders("SELECT a:b").is_empty());
    }

    #[test]
    fn test_modulo_is_operator() {
        assert!(placeholders("SELECT a % b, a %d").is_empty());
    }

    #[test]
    fn test_statement_split() {
        let stmts = tokenize("SELECT ?; SELECT ?;  -- done\n").unwrap();
        assert_eq!(stmts.len(), 2);
        assert_eq!(stmts[0].text(), "SELECT ?;");
        assert_eq!(stmts[1].text(), " SELECT ?;  -- done\n");
    }

    #[test]
    fn test_lossless() {
        let sql = "insert into t (a, b) values (%s, 'x''y'); /* c */ select 1.5e, \"q\" # c\n";
        let joined: String = tokenize(sql).unwrap().iter().map(|s| s.text()).collect();
        assert_eq!(joined, sql);
    }

    #[test]
    fn test_unterminated_quote_is_tolerated() {
        let sql = "SELECT 'abc WHERE id=?";
        let joined: String = tokenize(sql).unwrap().iter().map(|s| s.text()).collect();
        assert_eq!(joined, sql);
    }

    #[test]
    fn test_normalized_keywords() {
        let rendered: String = tokenize("select total from tbl1 where id=? group by c1")
            .unwrap()
            .iter()
            .flat_map(|s| s.tokens.iter().map(|t| t.normalized()).collect::<Vec<_>>())
            .collect();
        assert_eq!(rendered, "SELECT total FROM tbl1 WHERE id=? GROUP BY c1");
    }

    #[test]
    fn test_empty_input() {
        assert!(tokenize("").unwrap().is_empty());
    }
}
