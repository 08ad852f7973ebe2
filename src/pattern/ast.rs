/*!
# Matcher Tree

Defines the intermediate representation a pattern compiles into: a tree of
matchers that project data, constraints that gate matching without
projecting, and directives that reshape collected results.

The tree is built once by the compiler, is immutable during evaluation and
can be reused across any number of evaluations.
*/
use regex::Regex;

use crate::pattern::key::Quantifier;
use crate::value::Value;

/// A compiled pattern node. Each node either yields a projection of the
/// data it was applied to, or reports no match.
#[derive(Debug, Clone)]
pub enum Matcher {
    /// Matches any value and projects it unchanged (a `null` literal in
    /// the pattern).
    Any,
    /// Matches values deep-equal to the literal.
    Equal(Value),
    /// Matches arrays. Each element matcher must find at least one
    /// matching element; a single object matcher instead collects a
    /// projection per matching element.
    Array(Vec<Matcher>),
    /// Matches objects field by field.
    Object(ObjectMatcher),
}

/// The object form of a pattern: an ordered field list plus the
/// directives declared alongside it.
#[derive(Debug, Clone)]
pub struct ObjectMatcher {
    /// Projecting fields, constraints and wildcards, in declaration order
    pub fields: Vec<Field>,
    /// Directives in declaration order, applied when this matcher is
    /// replicated over a list of records
    pub directives: Vec<Directive>,
}

/// One entry of an [`ObjectMatcher`].
#[derive(Debug, Clone)]
pub enum Field {
    /// A key whose projection contributes to the result.
    Project {
        /// Data key to look up
        name: String,
        /// Whether a missing key is tolerated instead of failing the match
        optional: bool,
        /// Matcher applied to the key's value
        matcher: Matcher,
    },
    /// A predicate on a key; contributes nothing to the result.
    Constrain {
        /// Data key to look up (must be present)
        name: String,
        /// Predicate applied to the key's value
        constraint: Constraint,
    },
    /// The `*` key: copies data keys into the result.
    Wildcard(WildcardKeys),
}

/// Which data keys a wildcard field copies.
#[derive(Debug, Clone)]
pub enum WildcardKeys {
    /// `"*": "*"` — every key not already projected
    All,
    /// `"*": ["a", "b"]` — the named keys, where present
    Named(Vec<String>),
}

/// A compiled constraint expression.
#[derive(Debug, Clone)]
pub enum Constraint {
    /// A single predicate.
    Single(Predicate),
    /// One predicate per element of the right-hand array, folded by the
    /// quantifier.
    Quantified(Quantifier, Vec<Predicate>),
    /// Logical negation (`not` prefix).
    Not(Box<Constraint>),
}

/// A single compiled predicate over a data value.
#[derive(Debug, Clone)]
pub enum Predicate {
    /// `>`
    MoreThan(Value),
    /// `>=`
    MoreOrEqual(Value),
    /// `<`
    LessThan(Value),
    /// `<=`
    LessOrEqual(Value),
    /// `==`
    EqualTo(Value),
    /// `!=`
    NotEqualTo(Value),
    /// `regex`: unanchored search over a string
    Regex(Regex),
    /// `in`: the data appears in the given array (or substring of a
    /// string)
    In(Value),
    /// `contain`: the given value appears in the data array (or substring
    /// of the data string)
    Contain(Value),
    /// `is`: type test
    Is(TypeTag),
    /// `match`: the compiled sub-pattern matches the data
    Match(Box<Matcher>),
}

/// Type names accepted by the `is` operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeTag {
    /// `null`
    Null,
    /// `bool` / `boolean`
    Bool,
    /// `number` (integer or float)
    Number,
    /// `integer`
    Integer,
    /// `float`
    Float,
    /// `string`
    String,
    /// `array`
    Array,
    /// `object`
    Object,
}

impl TypeTag {
    /// Resolve a type name used by the `is` operator.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "null" => Some(TypeTag::Null),
            "bool" | "boolean" => Some(TypeTag::Bool),
            "number" => Some(TypeTag::Number),
            "integer" => Some(TypeTag::Integer),
            "float" => Some(TypeTag::Float),
            "string" => Some(TypeTag::String),
            "array" => Some(TypeTag::Array),
            "object" => Some(TypeTag::Object),
            _ => None,
        }
    }
}

/// A directive declared inside an object pattern. Directives reshape the
/// list of results collected when the object is matched over a list of
/// records; they are applied in declaration order.
#[derive(Debug, Clone)]
pub enum Directive {
    /// `__limit__`: keep the first N results.
    Limit(usize),
    /// `__sort__`: stable sort by the value under `key` in each result.
    Sort {
        /// Result key to sort by
        key: String,
        /// Reverse after sorting (a `-` prefix on the key)
        reverse: bool,
    },
    /// `__order__`: reorder the results.
    Order(Order),
}

/// Argument of the `__order__` directive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    /// Keep the current order.
    Ascending,
    /// Reverse the current order.
    Reverse,
    /// Shuffle uniformly.
    Random,
}

impl Order {
    /// Resolve an `__order__` argument.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "ascending" => Some(Order::Ascending),
            "reverse" => Some(Order::Reverse),
            "random" => Some(Order::Random),
            _ => None,
        }
    }
}
