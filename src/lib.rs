/*!
# MQLite

Pattern match JSON like you query Freebase, using a simple MQL dialect.

A pattern is itself a JSON document whose object keys may carry
constraints and directives. Matching a pattern against data yields a
projection: a new JSON value containing only the parts of the data the
pattern selected, with keys in pattern declaration order.

```rust
use mqlite::{Pattern, Value};

let data: Value = r#"[
    {"name": "Anna", "age": 25, "hobbies": ["reading", "chess"]},
    {"name": "John", "age": 35, "hobbies": ["reading", "painting"]}
]"#
.try_into()
.expect("valid JSON");

let pattern: Pattern = r#"[{"name": null, "age >": 30}]"#
    .parse()
    .expect("valid pattern");

let result = pattern.matches(&data).expect("match");
assert_eq!(serde_json::to_string(&result).unwrap(), r#"[{"name":"John"}]"#);
```
*/

pub mod commands;
pub mod format;
pub mod pattern;
pub mod value;

// Re-exports
pub use pattern::{compile, CompileError, Matcher, Pattern, PatternError};
pub use value::Value;
