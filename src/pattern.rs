/*!
# JSON Pattern Matching

The pattern language is itself JSON: `null` matches anything, scalars
match themselves, arrays match arrays and objects match objects key by
key. Object keys carry a small constraint grammar after the name
(`"age >"`, `"hobbies contain any"`, `"name not regex"`), special
`__limit__` / `__sort__` / `__order__` keys reshape list results, and the
`*` key copies data keys into the projection.

Matching happens in two stages: a pattern compiles once into a
[`Matcher`] tree, which can then be evaluated against any number of data
values.

```rust
use mqlite::pattern::Pattern;
use mqlite::value::Value;

let data: Value = r#"[
    {"name": "Anna", "age": 25},
    {"name": "John", "age": 35}
]"#
.try_into()
.expect("valid JSON");

let pattern: Pattern = r#"[{"name": null, "age >": 30}]"#
    .parse()
    .expect("valid pattern");

let result = pattern.matches(&data).expect("match");
assert_eq!(serde_json::to_string(&result).unwrap(), r#"[{"name":"John"}]"#);
```

## See Also

- [`compiler::compile`]: the pattern-tree to matcher-tree compiler.
- [`Matcher::matches`]: evaluation of a compiled matcher.
*/

pub mod ast;
pub mod compiler;
pub mod eval;
pub mod key;

use rand::Rng;
use std::error::Error;
use std::fmt;
use std::str::FromStr;

use crate::value::Value;

// Re-exports
pub use ast::{
    Constraint, Directive, Field, Matcher, ObjectMatcher, Order, Predicate,
    TypeTag, WildcardKeys,
};
pub use compiler::{compile, CompileError, CompileErrorKind};
pub use key::{parse_key, Key, KeyError, Op, Quantifier};

/// A pattern compiled from JSON text, ready to match data values.
///
/// This is the front door for callers that hold the pattern as text; use
/// [`compile`] directly when the pattern is already a parsed [`Value`].
#[derive(Debug, Clone)]
pub struct Pattern {
    matcher: Matcher,
}

impl Pattern {
    /// Compile an already-parsed pattern value.
    ///
    /// # Errors
    ///
    /// Returns a [`CompileError`] describing the offending key.
    pub fn compile(query: &Value) -> Result<Self, CompileError> {
        Ok(Self {
            matcher: compile(query)?,
        })
    }

    /// The compiled matcher tree.
    pub fn matcher(&self) -> &Matcher {
        &self.matcher
    }

    /// Match `data`, returning the projection on success.
    pub fn matches(&self, data: &Value) -> Option<Value> {
        self.matcher.matches(data)
    }

    /// Match `data` with a caller-provided rng (see
    /// [`Matcher::matches_with`]).
    pub fn matches_with<R: Rng + ?Sized>(
        &self,
        data: &Value,
        rng: &mut R,
    ) -> Option<Value> {
        self.matcher.matches_with(data, rng)
    }
}

/// Errors from parsing pattern text into a [`Pattern`].
#[derive(Debug)]
pub enum PatternError {
    /// The pattern text is not valid JSON.
    Json(serde_json::Error),
    /// The pattern JSON does not compile.
    Compile(CompileError),
}

impl Error for PatternError {}

impl fmt::Display for PatternError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json(err) => write!(f, "pattern is not valid JSON: {err}"),
            Self::Compile(err) => err.fmt(f),
        }
    }
}

impl From<serde_json::Error> for PatternError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err)
    }
}

impl From<CompileError> for PatternError {
    fn from(err: CompileError) -> Self {
        Self::Compile(err)
    }
}

impl FromStr for Pattern {
    type Err = PatternError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let query: Value = serde_json::from_str(text)?;
        Ok(Self::compile(&query)?)
    }
}
