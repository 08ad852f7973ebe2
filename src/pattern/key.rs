/*!
# Augmented Key Parser

Object keys in a pattern carry a small constraint grammar after the key
name, separated by ASCII whitespace:

```text
key        = name [ constraint ]
constraint = ["not"] operator [quantifier]
operator   = ">" | ">=" | "<" | "<=" | "==" | "!=" |
             "regex" | "in" | "contain" | "is" | "match"
quantifier = "all" | "any" | "one"
```

A bare name is a projecting key; a bare name ending in `?` is an optional
projecting key. Anything else must parse as a constraint:

```rust
use mqlite::pattern::key::{parse_key, Op, Quantifier};

let key = parse_key("age not >= any").expect("valid key");
assert_eq!(key.name, "age");

let spec = key.constraint.expect("constrained key");
assert!(spec.negate);
assert_eq!(spec.op, Op::MoreOrEqual);
assert_eq!(spec.quantifier, Some(Quantifier::Any));
```

## Errors

Malformed keys produce a [`KeyError`]:

```rust
use mqlite::pattern::key::{parse_key, KeyError};

assert!(matches!(parse_key("age !"), Err(KeyError::UnknownOperator { .. })));
assert!(matches!(parse_key("age not"), Err(KeyError::InvalidSyntax { .. })));
```
*/
use std::error::Error;
use std::fmt;

/// Constraint operators recognized in augmented keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    /// `>`
    MoreThan,
    /// `>=`
    MoreOrEqual,
    /// `<`
    LessThan,
    /// `<=`
    LessOrEqual,
    /// `==`
    EqualTo,
    /// `!=`
    NotEqualTo,
    /// `regex`: unanchored regular expression search over strings
    Regex,
    /// `in`: membership of the data in the given collection
    In,
    /// `contain`: membership of the given value in the data
    Contain,
    /// `is`: type test by name
    Is,
    /// `match`: recursive sub-pattern test
    Match,
}

impl Op {
    fn from_token(token: &str) -> Option<Self> {
        match token {
            ">" => Some(Op::MoreThan),
            ">=" => Some(Op::MoreOrEqual),
            "<" => Some(Op::LessThan),
            "<=" => Some(Op::LessOrEqual),
            "==" => Some(Op::EqualTo),
            "!=" => Some(Op::NotEqualTo),
            "regex" => Some(Op::Regex),
            "in" => Some(Op::In),
            "contain" => Some(Op::Contain),
            "is" => Some(Op::Is),
            "match" => Some(Op::Match),
            _ => None,
        }
    }

    /// The token form of this operator.
    pub fn as_str(&self) -> &'static str {
        match self {
            Op::MoreThan => ">",
            Op::MoreOrEqual => ">=",
            Op::LessThan => "<",
            Op::LessOrEqual => "<=",
            Op::EqualTo => "==",
            Op::NotEqualTo => "!=",
            Op::Regex => "regex",
            Op::In => "in",
            Op::Contain => "contain",
            Op::Is => "is",
            Op::Match => "match",
        }
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Quantifier suffix lifting a constraint over a list of values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quantifier {
    /// Every value must satisfy the constraint
    All,
    /// At least one value must satisfy the constraint
    Any,
    /// Exactly one value must satisfy the constraint
    One,
}

impl Quantifier {
    fn from_token(token: &str) -> Option<Self> {
        match token {
            "all" => Some(Quantifier::All),
            "any" => Some(Quantifier::Any),
            "one" => Some(Quantifier::One),
            _ => None,
        }
    }

    /// The token form of this quantifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            Quantifier::All => "all",
            Quantifier::Any => "any",
            Quantifier::One => "one",
        }
    }
}

impl fmt::Display for Quantifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parsed augmented key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Key {
    /// The data key this entry addresses
    pub name: String,
    /// Whether a missing data key is tolerated (bare name ending in `?`)
    pub optional: bool,
    /// The constraint expression, if any tokens followed the name
    pub constraint: Option<ConstraintSpec>,
}

/// The constraint expression of an augmented key: `[not] <op> [quantifier]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConstraintSpec {
    /// The operator to apply
    pub op: Op,
    /// Whether the result is negated (`not` prefix)
    pub negate: bool,
    /// Optional quantifier suffix
    pub quantifier: Option<Quantifier>,
}

/// Errors from parsing an augmented key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyError {
    /// The key does not follow the `name [not] <op> [quantifier]` shape.
    InvalidSyntax {
        /// The raw key
        key: String,
        /// What was wrong with it
        reason: &'static str,
    },
    /// The token in operator position is not a recognized operator.
    UnknownOperator {
        /// The raw key
        key: String,
        /// The offending token
        token: String,
    },
}

impl Error for KeyError {}

impl fmt::Display for KeyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidSyntax { key, reason } => {
                write!(f, "invalid key {key:?}: {reason}")
            }
            Self::UnknownOperator { key, token } => {
                write!(f, "invalid key {key:?}: unknown operator {token:?}")
            }
        }
    }
}

/// Parse a raw object key into a [`Key`].
///
/// # Errors
///
/// Returns a [`KeyError`] when the tokens after the name do not form a
/// valid constraint expression.
pub fn parse_key(raw: &str) -> Result<Key, KeyError> {
    let invalid = |reason| KeyError::InvalidSyntax {
        key: raw.to_string(),
        reason,
    };

    let mut tokens = raw.split_ascii_whitespace();
    let Some(name) = tokens.next() else {
        return Err(invalid("empty key"));
    };

    let Some(second) = tokens.next() else {
        // bare name, possibly marked optional
        if let Some(stripped) = name.strip_suffix('?') {
            if stripped.is_empty() {
                return Err(invalid("optional marker without a key name"));
            }
            return Ok(Key {
                name: stripped.to_string(),
                optional: true,
                constraint: None,
            });
        }
        return Ok(Key {
            name: name.to_string(),
            optional: false,
            constraint: None,
        });
    };

    let negate = second == "not";
    let op_token = if negate {
        tokens.next().ok_or_else(|| invalid("expected an operator after \"not\""))?
    } else {
        second
    };
    let op = Op::from_token(op_token).ok_or_else(|| KeyError::UnknownOperator {
        key: raw.to_string(),
        token: op_token.to_string(),
    })?;

    let quantifier = match tokens.next() {
        None => None,
        Some(token) => Some(Quantifier::from_token(token).ok_or_else(|| {
            invalid("expected \"all\", \"any\" or \"one\" after the operator")
        })?),
    };

    if tokens.next().is_some() {
        return Err(invalid("unexpected tokens after the quantifier"));
    }

    Ok(Key {
        name: name.to_string(),
        optional: false,
        constraint: Some(ConstraintSpec {
            op,
            negate,
            quantifier,
        }),
    })
}
