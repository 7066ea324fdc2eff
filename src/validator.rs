//! Qualified-identifier grammar.
//!
//! Every field, relation and projection that reaches a translator has been
//! checked against this grammar: dot-separated segments, each matching
//! `[A-Za-z_][A-Za-z0-9_]*`. Projections may additionally end in `.*`, and
//! a projection list may be the single literal `*`.

use nom::{
    IResult,
    bytes::complete::{tag, take_while},
    character::complete::{char, satisfy},
    combinator::{all_consuming, opt, recognize},
    multi::separated_list1,
    sequence::{pair, tuple},
};

use crate::error::{UqlError, UqlResult};

/// Which star forms a name may take.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NameRules {
    /// Accept the bare `*`.
    pub allow_star: bool,
    /// Accept `segment.*` (only as the final segment).
    pub allow_trailing_star: bool,
}

impl NameRules {
    /// Plain identifiers only: fields, relations, sort keys.
    pub const STRICT: NameRules = NameRules {
        allow_star: false,
        allow_trailing_star: false,
    };

    /// Projection entries: `table.*` is fine, a bare `*` is handled by the caller.
    pub const PROJECTION: NameRules = NameRules {
        allow_star: false,
        allow_trailing_star: true,
    };
}

/// A validated dotted name, split into its segments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QualifiedName<'a> {
    pub segments: Vec<&'a str>,
    pub trailing_star: bool,
}

impl<'a> QualifiedName<'a> {
    /// Parse `name` under `rules`.
    ///
    /// A bare `*` (when allowed) yields no segments and `trailing_star == true`.
    pub fn parse(name: &'a str, rules: NameRules) -> UqlResult<Self> {
        if name == "*" {
            if rules.allow_star {
                return Ok(Self {
                    segments: Vec::new(),
                    trailing_star: true,
                });
            }
            return Err(UqlError::invalid_field(name, "'*' is not allowed here"));
        }

        match all_consuming(qualified)(name) {
            Ok((_, (segments, star))) => {
                if star && !rules.allow_trailing_star {
                    return Err(UqlError::invalid_field(
                        name,
                        "a trailing '.*' is not allowed here",
                    ));
                }
                Ok(Self {
                    segments,
                    trailing_star: star,
                })
            }
            Err(_) => Err(UqlError::invalid_field(
                name,
                "expected dot-separated segments matching [A-Za-z_][A-Za-z0-9_]*",
            )),
        }
    }

    /// Render the name with each segment passed through `quote`.
    pub fn render(&self, quote: impl Fn(&str) -> String) -> String {
        let mut out = self
            .segments
            .iter()
            .map(|s| quote(s))
            .collect::<Vec<_>>()
            .join(".");
        if self.trailing_star {
            if out.is_empty() {
                out.push('*');
            } else {
                out.push_str(".*");
            }
        }
        out
    }
}

fn segment(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        satisfy(|c| c.is_ascii_alphabetic() || c == '_'),
        take_while(|c: char| c.is_ascii_alphanumeric() || c == '_'),
    ))(input)
}

fn qualified(input: &str) -> IResult<&str, (Vec<&str>, bool)> {
    let (rest, (segments, star)) =
        tuple((separated_list1(char('.'), segment), opt(tag(".*"))))(input)?;
    Ok((rest, (segments, star.is_some())))
}

/// Validate a dotted identifier under `rules`.
pub fn validate_qualified_name(name: &str, rules: NameRules) -> UqlResult<()> {
    QualifiedName::parse(name, rules).map(|_| ())
}
