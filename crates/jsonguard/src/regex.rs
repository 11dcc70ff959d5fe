use core::fmt;

use crate::options::PatternOptions;

/// Anchored literal that needs no regex engine.
#[derive(Debug, PartialEq)]
enum Literal {
    /// `^prefix`
    Prefix(String),
    /// `^exact$`
    Exact(String),
}

/// Recognize `^literal` and `^literal$` patterns.
///
/// The body may hold ASCII alphanumerics, `-`, `_`, `/` and the escapes `\/`, `\-`, `\_`,
/// `\$`, `\.`. Anything else needs a real engine.
fn literal_of(pattern: &str) -> Option<Literal> {
    let mut chars = pattern.strip_prefix('^')?.chars();
    let mut literal = String::new();
    loop {
        match chars.next() {
            None => return Some(Literal::Prefix(literal)),
            Some('$') => {
                return chars.next().is_none().then_some(Literal::Exact(literal));
            }
            Some('\\') => match chars.next()? {
                c @ ('/' | '-' | '_' | '$' | '.') => literal.push(c),
                _ => return None,
            },
            Some(c) if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '/') => {
                literal.push(c);
            }
            Some(_) => return None,
        }
    }
}

/// Rewrite ECMA-262 shorthand classes into their ASCII-only equivalents.
///
/// Inside a character class only `\d` and `\w` are expanded; `\D` and `\W` there keep the
/// engine's Unicode meaning.
fn translate_ecma(pattern: &str) -> String {
    let mut output = String::with_capacity(pattern.len() + 8);
    let mut in_class = false;
    let mut chars = pattern.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                let Some(next) = chars.next() else {
                    output.push('\\');
                    break;
                };
                match (next, in_class) {
                    ('d', false) => output.push_str("[0-9]"),
                    ('D', false) => output.push_str("[^0-9]"),
                    ('w', false) => output.push_str("[a-zA-Z0-9_]"),
                    ('W', false) => output.push_str("[^a-zA-Z0-9_]"),
                    ('d', true) => output.push_str("0-9"),
                    ('w', true) => output.push_str("a-zA-Z0-9_"),
                    (other, _) => {
                        output.push('\\');
                        output.push(other);
                    }
                }
            }
            '[' if !in_class => {
                in_class = true;
                output.push(c);
            }
            ']' if in_class => {
                in_class = false;
                output.push(c);
            }
            _ => output.push(c),
        }
    }
    output
}

/// A compiled `pattern` or `patternProperties` regular expression.
pub(crate) struct Pattern {
    original: String,
    matcher: Matcher,
}

enum Matcher {
    Literal(Literal),
    Fancy(Box<fancy_regex::Regex>),
    Standard(Box<regex::Regex>),
}

impl Pattern {
    /// Compile `pattern` with the configured engine.
    ///
    /// The error is the engine's description of why the pattern is invalid.
    pub(crate) fn new(pattern: &str, options: &PatternOptions) -> Result<Pattern, String> {
        let matcher = match literal_of(pattern) {
            Some(literal) => Matcher::Literal(literal),
            None => Matcher::compile(&translate_ecma(pattern), options)?,
        };
        Ok(Pattern {
            original: pattern.to_string(),
            matcher,
        })
    }

    /// Unanchored search for the pattern in `text`.
    ///
    /// Fails only when the backtracking engine exceeds its limits.
    pub(crate) fn is_match(&self, text: &str) -> Result<bool, fancy_regex::Error> {
        match &self.matcher {
            Matcher::Literal(Literal::Prefix(prefix)) => Ok(text.starts_with(prefix.as_str())),
            Matcher::Literal(Literal::Exact(exact)) => Ok(text == exact),
            Matcher::Fancy(regex) => regex.is_match(text),
            Matcher::Standard(regex) => Ok(regex.is_match(text)),
        }
    }

    /// The pattern as written in the schema.
    pub(crate) fn as_str(&self) -> &str {
        &self.original
    }
}

impl Matcher {
    fn compile(translated: &str, options: &PatternOptions) -> Result<Matcher, String> {
        match *options {
            PatternOptions::FancyRegex {
                backtrack_limit,
                size_limit,
                dfa_size_limit,
            } => {
                let mut builder = fancy_regex::RegexBuilder::new(translated);
                if let Some(limit) = backtrack_limit {
                    builder.backtrack_limit(limit);
                }
                if let Some(limit) = size_limit {
                    builder.delegate_size_limit(limit);
                }
                if let Some(limit) = dfa_size_limit {
                    builder.delegate_dfa_size_limit(limit);
                }
                builder
                    .build()
                    .map(|regex| Matcher::Fancy(Box::new(regex)))
                    .map_err(|error| error.to_string())
            }
            PatternOptions::Regex {
                size_limit,
                dfa_size_limit,
            } => {
                let mut builder = regex::RegexBuilder::new(translated);
                if let Some(limit) = size_limit {
                    builder.size_limit(limit);
                }
                if let Some(limit) = dfa_size_limit {
                    builder.dfa_size_limit(limit);
                }
                builder
                    .build()
                    .map(|regex| Matcher::Standard(Box::new(regex)))
                    .map_err(|error| error.to_string())
            }
        }
    }
}

impl fmt::Debug for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Pattern").field(&self.original).finish()
    }
}
