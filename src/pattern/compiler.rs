/*!
# Pattern Compiler

Converts a pattern JSON tree into a [`Matcher`] tree.

The mapping follows the pattern language: `null` matches anything,
scalars match themselves, arrays match arrays element-wise and objects
dispatch per key — projecting keys, constraint keys, directives
(`__limit__`, `__sort__`, `__order__`) and the `*` wildcard.

```rust
use mqlite::pattern::compiler::compile;
use mqlite::pattern::Matcher;
use mqlite::value::Value;

let query: Value = r#"[{"name": null, "age >": 30}]"#.try_into().unwrap();
let matcher = compile(&query).expect("valid pattern");
assert!(matches!(matcher, Matcher::Array(_)));
```

## Errors

Compilation fails on malformed keys, unrecognized operators, invalid
directive arguments and invalid operands (a non-string regex, an unknown
type name for `is`). Errors carry the path of the offending key:

```rust
use mqlite::pattern::compiler::{compile, CompileErrorKind};
use mqlite::value::Value;

let query: Value = r#"[{"age !": 1}]"#.try_into().unwrap();
let err = compile(&query).unwrap_err();
assert_eq!(err.path(), "$[0].\"age !\"");
assert!(matches!(err.kind(), CompileErrorKind::UnknownOperator { .. }));
```
*/
use regex::Regex;
use std::error::Error;
use std::fmt;

use crate::pattern::ast::{
    Constraint, Directive, Field, Matcher, ObjectMatcher, Order, Predicate,
    TypeTag, WildcardKeys,
};
use crate::pattern::key::{parse_key, ConstraintSpec, KeyError, Op, Quantifier};
use crate::value::{Map, Value};

/// An error produced while compiling a pattern, tagged with the path of
/// the offending key.
#[derive(Debug)]
pub struct CompileError {
    path: String,
    kind: CompileErrorKind,
}

impl CompileError {
    /// Path of the offending key, e.g. `$[0]."age !"`.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// What went wrong.
    pub fn kind(&self) -> &CompileErrorKind {
        &self.kind
    }
}

impl Error for CompileError {}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "at {}: {}", self.path, self.kind)
    }
}

/// The kinds of pattern compilation errors.
#[derive(Debug)]
pub enum CompileErrorKind {
    /// Malformed augmented key.
    InvalidKeySyntax {
        /// The raw key
        key: String,
        /// What was wrong with it
        reason: &'static str,
    },
    /// Operator token not in the recognized set.
    UnknownOperator {
        /// The raw key
        key: String,
        /// The offending token
        token: String,
    },
    /// Directive argument of the wrong shape.
    InvalidDirectiveValue {
        /// The directive key (`__limit__`, `__sort__`, `__order__` or `*`)
        directive: &'static str,
        /// What the directive expects
        expected: &'static str,
    },
    /// The `regex` operand does not compile as a regular expression.
    BadRegex {
        /// The pattern source
        pattern: String,
        /// The regex engine's diagnostic
        error: regex::Error,
    },
    /// A quantified constraint needs an array of values on the right.
    QuantifierExpectsArray {
        /// The quantifier in question
        quantifier: Quantifier,
    },
    /// Operator applied to an operand it cannot use.
    InvalidOperand {
        /// The operator
        op: Op,
        /// What the operator expects
        expected: &'static str,
    },
}

impl fmt::Display for CompileErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidKeySyntax { key, reason } => {
                write!(f, "invalid key {key:?}: {reason}")
            }
            Self::UnknownOperator { key, token } => {
                write!(f, "invalid key {key:?}: unknown operator {token:?}")
            }
            Self::InvalidDirectiveValue {
                directive,
                expected,
            } => {
                write!(f, "{directive}: expected {expected}")
            }
            Self::BadRegex { pattern, error } => {
                write!(f, "invalid regex {pattern:?}: {error}")
            }
            Self::QuantifierExpectsArray { quantifier } => {
                write!(f, "{quantifier}: expected an array of values")
            }
            Self::InvalidOperand { op, expected } => {
                write!(f, "{op}: expected {expected}")
            }
        }
    }
}

impl From<KeyError> for CompileErrorKind {
    fn from(err: KeyError) -> Self {
        match err {
            KeyError::InvalidSyntax { key, reason } => {
                CompileErrorKind::InvalidKeySyntax { key, reason }
            }
            KeyError::UnknownOperator { key, token } => {
                CompileErrorKind::UnknownOperator { key, token }
            }
        }
    }
}

/// One segment of the key path used in diagnostics.
enum Seg<'a> {
    Key(&'a str),
    Index(usize),
}

fn render_path(segments: &[Seg<'_>]) -> String {
    let mut rendered = String::from("$");
    for segment in segments {
        match segment {
            Seg::Index(i) => {
                rendered.push_str(&format!("[{i}]"));
            }
            Seg::Key(key) => {
                if key.chars().all(|c| c.is_alphanumeric() || c == '_') && !key.is_empty() {
                    rendered.push('.');
                    rendered.push_str(key);
                } else {
                    rendered.push_str(&format!(".{key:?}"));
                }
            }
        }
    }
    rendered
}

fn err(segments: &[Seg<'_>], kind: CompileErrorKind) -> CompileError {
    CompileError {
        path: render_path(segments),
        kind,
    }
}

/// Compile a pattern value into a [`Matcher`] tree.
///
/// # Errors
///
/// Returns a [`CompileError`] describing the offending key and what was
/// wrong with it.
pub fn compile(query: &Value) -> Result<Matcher, CompileError> {
    compile_value(query, &mut Vec::new())
}

fn compile_value<'a>(
    query: &'a Value,
    path: &mut Vec<Seg<'a>>,
) -> Result<Matcher, CompileError> {
    match query {
        // a null pattern matches anything
        Value::Null => Ok(Matcher::Any),
        // scalars match themselves
        Value::Bool(_) | Value::Number(_) | Value::String(_) => {
            Ok(Matcher::Equal(query.clone()))
        }
        Value::Array(items) => {
            // an empty pattern matches only an empty array
            if items.is_empty() {
                return Ok(Matcher::Equal(query.clone()));
            }
            let mut matchers = Vec::with_capacity(items.len());
            for (i, item) in items.iter().enumerate() {
                path.push(Seg::Index(i));
                matchers.push(compile_value(item, path)?);
                path.pop();
            }
            Ok(Matcher::Array(matchers))
        }
        Value::Object(entries) => {
            // an empty pattern matches only an empty object
            if entries.is_empty() {
                return Ok(Matcher::Equal(query.clone()));
            }
            compile_object(entries, path)
        }
    }
}

fn compile_object<'a>(
    entries: &'a Map,
    path: &mut Vec<Seg<'a>>,
) -> Result<Matcher, CompileError> {
    // an explicit __order__ takes precedence over a "-" sort prefix
    let explicit_order = entries.contains_key("__order__");

    let mut fields = Vec::new();
    let mut directives = Vec::new();

    for (raw_key, sub_value) in entries {
        path.push(Seg::Key(raw_key));
        match raw_key.as_str() {
            "*" => {
                fields.push(Field::Wildcard(compile_wildcard(sub_value, path)?));
            }
            "__limit__" => {
                let limit = match sub_value {
                    Value::Number(n) => n.as_u64(),
                    _ => None,
                };
                let Some(limit) = limit else {
                    return Err(err(
                        path,
                        CompileErrorKind::InvalidDirectiveValue {
                            directive: "__limit__",
                            expected: "a non-negative integer",
                        },
                    ));
                };
                directives.push(Directive::Limit(limit as usize));
            }
            "__sort__" => {
                let Value::String(key) = sub_value else {
                    return Err(err(
                        path,
                        CompileErrorKind::InvalidDirectiveValue {
                            directive: "__sort__",
                            expected: "a key name string",
                        },
                    ));
                };
                let directive = match key.strip_prefix('-') {
                    Some(stripped) => Directive::Sort {
                        key: stripped.to_string(),
                        reverse: !explicit_order,
                    },
                    None => Directive::Sort {
                        key: key.clone(),
                        reverse: false,
                    },
                };
                directives.push(directive);
            }
            "__order__" => {
                let order = match sub_value {
                    Value::String(name) => Order::from_name(name),
                    _ => None,
                };
                let Some(order) = order else {
                    return Err(err(
                        path,
                        CompileErrorKind::InvalidDirectiveValue {
                            directive: "__order__",
                            expected:
                                "\"ascending\", \"reverse\" or \"random\"",
                        },
                    ));
                };
                directives.push(Directive::Order(order));
            }
            _ => {
                let key = parse_key(raw_key)
                    .map_err(|e| err(path, e.into()))?;
                match key.constraint {
                    None => {
                        let matcher = compile_value(sub_value, path)?;
                        fields.push(Field::Project {
                            name: key.name,
                            optional: key.optional,
                            matcher,
                        });
                    }
                    Some(spec) => {
                        let constraint =
                            compile_constraint(spec, sub_value, path)?;
                        fields.push(Field::Constrain {
                            name: key.name,
                            constraint,
                        });
                    }
                }
            }
        }
        path.pop();
    }

    Ok(Matcher::Object(ObjectMatcher { fields, directives }))
}

fn compile_wildcard(
    value: &Value,
    path: &[Seg<'_>],
) -> Result<WildcardKeys, CompileError> {
    let invalid = || {
        err(
            path,
            CompileErrorKind::InvalidDirectiveValue {
                directive: "*",
                expected: "\"*\" (all keys) or a list of key names",
            },
        )
    };
    match value {
        Value::String(s) if s == "*" => Ok(WildcardKeys::All),
        Value::Array(items) => {
            let mut names = Vec::with_capacity(items.len());
            for item in items {
                let Value::String(name) = item else {
                    return Err(invalid());
                };
                names.push(name.clone());
            }
            Ok(WildcardKeys::Named(names))
        }
        _ => Err(invalid()),
    }
}

fn compile_constraint<'a>(
    spec: ConstraintSpec,
    value: &'a Value,
    path: &mut Vec<Seg<'a>>,
) -> Result<Constraint, CompileError> {
    let inner = match spec.quantifier {
        // quantifiers fold one predicate per right-hand element
        Some(quantifier) => {
            let Value::Array(items) = value else {
                return Err(err(
                    path,
                    CompileErrorKind::QuantifierExpectsArray { quantifier },
                ));
            };
            let predicates = items
                .iter()
                .map(|item| compile_predicate(spec.op, item, path))
                .collect::<Result<Vec<_>, _>>()?;
            Constraint::Quantified(quantifier, predicates)
        }
        None => Constraint::Single(compile_predicate(spec.op, value, path)?),
    };

    Ok(if spec.negate {
        Constraint::Not(Box::new(inner))
    } else {
        inner
    })
}

fn compile_predicate<'a>(
    op: Op,
    value: &'a Value,
    path: &mut Vec<Seg<'a>>,
) -> Result<Predicate, CompileError> {
    let predicate = match op {
        Op::MoreThan => Predicate::MoreThan(value.clone()),
        Op::MoreOrEqual => Predicate::MoreOrEqual(value.clone()),
        Op::LessThan => Predicate::LessThan(value.clone()),
        Op::LessOrEqual => Predicate::LessOrEqual(value.clone()),
        Op::EqualTo => Predicate::EqualTo(value.clone()),
        Op::NotEqualTo => Predicate::NotEqualTo(value.clone()),
        Op::Regex => {
            let Value::String(pattern) = value else {
                return Err(err(
                    path,
                    CompileErrorKind::InvalidOperand {
                        op,
                        expected: "a pattern string",
                    },
                ));
            };
            let regex = Regex::new(pattern).map_err(|error| {
                err(
                    path,
                    CompileErrorKind::BadRegex {
                        pattern: pattern.clone(),
                        error,
                    },
                )
            })?;
            Predicate::Regex(regex)
        }
        Op::In => Predicate::In(value.clone()),
        Op::Contain => Predicate::Contain(value.clone()),
        Op::Is => {
            let tag = match value {
                Value::String(name) => TypeTag::from_name(name),
                _ => None,
            };
            let Some(tag) = tag else {
                return Err(err(
                    path,
                    CompileErrorKind::InvalidOperand {
                        op,
                        expected: "one of null, bool, number, integer, \
                                   float, string, array or object",
                    },
                ));
            };
            Predicate::Is(tag)
        }
        // the sub-pattern compiles once, here
        Op::Match => Predicate::Match(Box::new(compile_value(value, path)?)),
    };
    Ok(predicate)
}
