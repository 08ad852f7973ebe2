/*!
# Pattern Evaluator

Applies a compiled [`Matcher`] tree to a data value, producing either a
projection (a newly-allocated value containing only the parts of the data
the pattern selected, in pattern declaration order) or no match.

Evaluation is total: operators applied to values of the wrong type simply
fail the predicate, so patterns stay robust against heterogeneous data.
The only source of nondeterminism is the `random` order directive, which
draws from a caller-provided rng via [`Matcher::matches_with`].
*/
use rand::seq::SliceRandom;
use rand::Rng;
use std::cmp::Ordering;

use crate::pattern::ast::{
    Constraint, Directive, Field, Matcher, ObjectMatcher, Order, Predicate,
    TypeTag, WildcardKeys,
};
use crate::pattern::key::Quantifier;
use crate::value::{Map, Value};

impl Matcher {
    /// Match `data` against this matcher, returning the projection on
    /// success. Uses the thread rng for the `random` order directive.
    pub fn matches(&self, data: &Value) -> Option<Value> {
        self.matches_with(data, &mut rand::rng())
    }

    /// Match `data` with a caller-provided rng, so results involving the
    /// `random` order directive are reproducible.
    pub fn matches_with<R: Rng + ?Sized>(
        &self,
        data: &Value,
        rng: &mut R,
    ) -> Option<Value> {
        eval(self, data, rng)
    }
}

fn eval<R: Rng + ?Sized>(
    matcher: &Matcher,
    data: &Value,
    rng: &mut R,
) -> Option<Value> {
    match matcher {
        Matcher::Any => Some(data.clone()),
        Matcher::Equal(value) => (value == data).then(|| data.clone()),
        Matcher::Array(matchers) => eval_array(matchers, data, rng),
        Matcher::Object(object) => eval_object(object, data, rng),
    }
}

fn eval_array<R: Rng + ?Sized>(
    matchers: &[Matcher],
    data: &Value,
    rng: &mut R,
) -> Option<Value> {
    let Value::Array(items) = data else {
        return None;
    };

    // A single object matcher walks the whole list, collecting one
    // projection per matching record. Directives declared inside the
    // object apply to the collected list, and an empty list is still a
    // match.
    if let [Matcher::Object(object)] = matchers {
        let mut results: Vec<Value> = items
            .iter()
            .filter_map(|item| eval_object(object, item, rng))
            .collect();
        apply_directives(&object.directives, &mut results, rng);
        return Some(Value::Array(results));
    }

    // Otherwise every element matcher takes the first element it matches.
    let mut results = Vec::with_capacity(matchers.len());
    for matcher in matchers {
        let hit = items.iter().find_map(|item| eval(matcher, item, rng))?;
        results.push(hit);
    }
    Some(Value::Array(results))
}

fn eval_object<R: Rng + ?Sized>(
    object: &ObjectMatcher,
    data: &Value,
    rng: &mut R,
) -> Option<Value> {
    let Value::Object(map) = data else {
        return None;
    };

    let mut result = Map::new();
    for field in &object.fields {
        match field {
            Field::Project {
                name,
                optional,
                matcher,
            } => match map.get(name) {
                Some(value) => {
                    let projected = eval(matcher, value, rng)?;
                    result.insert(name.clone(), projected);
                }
                None if *optional => {}
                None => return None,
            },
            Field::Constrain { name, constraint } => {
                // a constraint on a missing key fails, negated or not
                let value = map.get(name)?;
                if !test_constraint(constraint, value, rng) {
                    return None;
                }
            }
            Field::Wildcard(WildcardKeys::All) => {
                for (key, value) in map {
                    if !result.contains_key(key) {
                        result.insert(key.clone(), value.clone());
                    }
                }
            }
            Field::Wildcard(WildcardKeys::Named(names)) => {
                for name in names {
                    if let Some(value) = map.get(name)
                        && !result.contains_key(name)
                    {
                        result.insert(name.clone(), value.clone());
                    }
                }
            }
        }
    }

    Some(Value::Object(result))
}

fn test_constraint<R: Rng + ?Sized>(
    constraint: &Constraint,
    data: &Value,
    rng: &mut R,
) -> bool {
    match constraint {
        Constraint::Single(predicate) => test_predicate(predicate, data, rng),
        Constraint::Quantified(quantifier, predicates) => match quantifier {
            Quantifier::All => predicates
                .iter()
                .all(|predicate| test_predicate(predicate, data, rng)),
            Quantifier::Any => predicates
                .iter()
                .any(|predicate| test_predicate(predicate, data, rng)),
            Quantifier::One => {
                predicates
                    .iter()
                    .filter(|predicate| test_predicate(predicate, data, rng))
                    .count()
                    == 1
            }
        },
        Constraint::Not(inner) => !test_constraint(inner, data, rng),
    }
}

fn test_predicate<R: Rng + ?Sized>(
    predicate: &Predicate,
    data: &Value,
    rng: &mut R,
) -> bool {
    match predicate {
        Predicate::MoreThan(value) => {
            data.scalar_cmp(value) == Some(Ordering::Greater)
        }
        Predicate::MoreOrEqual(value) => matches!(
            data.scalar_cmp(value),
            Some(Ordering::Greater | Ordering::Equal)
        ),
        Predicate::LessThan(value) => {
            data.scalar_cmp(value) == Some(Ordering::Less)
        }
        Predicate::LessOrEqual(value) => matches!(
            data.scalar_cmp(value),
            Some(Ordering::Less | Ordering::Equal)
        ),
        Predicate::EqualTo(value) => data == value,
        Predicate::NotEqualTo(value) => data != value,
        Predicate::Regex(regex) => {
            matches!(data, Value::String(s) if regex.is_match(s))
        }
        Predicate::In(value) => match (data, value) {
            (_, Value::Array(items)) => items.iter().any(|item| item == data),
            (Value::String(needle), Value::String(haystack)) => {
                haystack.contains(needle.as_str())
            }
            _ => false,
        },
        Predicate::Contain(value) => match (data, value) {
            (Value::Array(items), _) => items.iter().any(|item| item == value),
            (Value::String(haystack), Value::String(needle)) => {
                haystack.contains(needle.as_str())
            }
            _ => false,
        },
        Predicate::Is(tag) => type_matches(*tag, data),
        Predicate::Match(matcher) => eval(matcher, data, rng).is_some(),
    }
}

fn type_matches(tag: TypeTag, data: &Value) -> bool {
    match tag {
        TypeTag::Null => matches!(data, Value::Null),
        TypeTag::Bool => matches!(data, Value::Bool(_)),
        TypeTag::Number => matches!(data, Value::Number(_)),
        TypeTag::Integer => matches!(
            data,
            Value::Number(n) if n.as_i64().is_some() || n.as_u64().is_some()
        ),
        TypeTag::Float => matches!(data, Value::Number(n) if n.is_f64()),
        TypeTag::String => matches!(data, Value::String(_)),
        TypeTag::Array => matches!(data, Value::Array(_)),
        TypeTag::Object => matches!(data, Value::Object(_)),
    }
}

fn apply_directives<R: Rng + ?Sized>(
    directives: &[Directive],
    results: &mut Vec<Value>,
    rng: &mut R,
) {
    for directive in directives {
        match directive {
            Directive::Limit(n) => results.truncate(*n),
            Directive::Sort { key, reverse } => {
                results.sort_by(|a, b| {
                    sort_value(a, key).total_cmp(sort_value(b, key))
                });
                if *reverse {
                    results.reverse();
                }
            }
            Directive::Order(Order::Ascending) => {}
            Directive::Order(Order::Reverse) => results.reverse(),
            Directive::Order(Order::Random) => results.shuffle(rng),
        }
    }
}

/// The value a result sorts by: results missing the sort key order first.
fn sort_value<'a>(result: &'a Value, key: &str) -> &'a Value {
    match result {
        Value::Object(map) => map.get(key).unwrap_or(&Value::Null),
        _ => &Value::Null,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::pattern::compiler::compile;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn v(text: &str) -> Value {
        text.try_into().expect("hardcoded test json")
    }

    fn compiled(text: &str) -> Matcher {
        compile(&v(text)).expect("hardcoded test pattern")
    }

    /// Serialize a projection so assertions also check key order.
    fn text(value: &Value) -> String {
        serde_json::to_string(value).expect("serialize")
    }

    /// The three-record students dataset used throughout these tests:
    /// Anna (25, reading/chess/swimming), James (23, chess/football/
    /// basketball, no grades) and John (35, reading/swimming/painting).
    fn students() -> Value {
        v(r#"[
            {
                "name": "Anna",
                "age": 25,
                "student": true,
                "grades": { "chemistry": "A", "math": "C" },
                "hobbies": ["reading", "chess", "swimming"]
            },
            {
                "name": "James",
                "age": 23,
                "student": false,
                "hobbies": ["chess", "football", "basketball"]
            },
            {
                "name": "John",
                "age": 35,
                "student": true,
                "grades": { "chemistry": "C", "english": "A" },
                "hobbies": ["reading", "swimming", "painting"]
            }
        ]"#)
    }

    fn check_students(pattern: &str) -> Option<Value> {
        compiled(pattern).matches(&students())
    }

    fn students_text(pattern: &str) -> String {
        text(&check_students(pattern).expect("expected a match"))
    }

    // ======================================================================
    // Scalar and structural matching
    // ======================================================================

    #[test]
    fn null_pattern_projects_data_unchanged() {
        let data = students();
        let result = compiled("null").matches(&data).unwrap();
        assert_eq!(result, data);
        assert_eq!(text(&result), text(&data));
    }

    #[test]
    fn scalars_match_themselves() {
        assert_eq!(compiled("42").matches(&v("42")), Some(v("42")));
        assert_eq!(compiled("42").matches(&v("43")), None);
        assert_eq!(compiled("\"a\"").matches(&v("\"a\"")), Some(v("\"a\"")));
        assert_eq!(compiled("true").matches(&v("true")), Some(v("true")));
    }

    #[test]
    fn integer_patterns_match_float_data() {
        assert_eq!(compiled("1").matches(&v("1.0")), Some(v("1.0")));
        assert_eq!(compiled("1.0").matches(&v("1")), Some(v("1")));
    }

    #[test]
    fn booleans_do_not_match_numbers() {
        assert_eq!(compiled("true").matches(&v("1")), None);
        assert_eq!(compiled("1").matches(&v("true")), None);
    }

    #[test]
    fn empty_object_pattern_matches_only_empty_objects() {
        assert_eq!(compiled("{}").matches(&v("{}")), Some(v("{}")));
        assert_eq!(compiled("{}").matches(&v(r#"{"a": 1}"#)), None);
        assert_eq!(compiled("{}").matches(&v("5")), None);
    }

    #[test]
    fn empty_array_pattern_matches_only_empty_arrays() {
        assert_eq!(compiled("[]").matches(&v("[]")), Some(v("[]")));
        assert_eq!(compiled("[]").matches(&v("[1]")), None);
    }

    #[test]
    fn list_of_literals_takes_first_matching_elements() {
        let data = v(r#"["reading", "chess", "swimming"]"#);
        assert_eq!(
            compiled(r#"["chess", "reading"]"#).matches(&data),
            Some(v(r#"["chess", "reading"]"#))
        );
        // a repeated literal is satisfied by the same data element
        assert_eq!(
            compiled(r#"["reading", "reading"]"#).matches(&data),
            Some(v(r#"["reading", "reading"]"#))
        );
        assert_eq!(compiled(r#"["painting"]"#).matches(&data), None);
    }

    #[test]
    fn array_pattern_rejects_non_arrays() {
        assert_eq!(compiled(r#"["a"]"#).matches(&v("\"a\"")), None);
    }

    #[test]
    fn object_pattern_rejects_non_objects() {
        assert_eq!(compiled(r#"{"a": null}"#).matches(&v("[1]")), None);
    }

    // ======================================================================
    // Object projection
    // ======================================================================

    #[test]
    fn project_single_key() {
        assert_eq!(
            students_text(r#"[{"name": null}]"#),
            r#"[{"name":"Anna"},{"name":"James"},{"name":"John"}]"#
        );
    }

    #[test]
    fn project_with_literal_equality() {
        assert_eq!(
            students_text(r#"[{"name": null, "student": true}]"#),
            r#"[{"name":"Anna","student":true},{"name":"John","student":true}]"#
        );
    }

    #[test]
    fn output_keys_follow_pattern_declaration_order() {
        assert_eq!(
            students_text(r#"[{"age": null, "name regex": "^A", "name": null}]"#),
            r#"[{"age":25,"name":"Anna"}]"#
        );
    }

    #[test]
    fn missing_key_fails_the_record() {
        assert_eq!(
            students_text(r#"[{"name": null, "grades": null}]"#),
            r#"[{"name":"Anna","grades":{"chemistry":"A","math":"C"}},{"name":"John","grades":{"chemistry":"C","english":"A"}}]"#
        );
    }

    #[test]
    fn optional_keys_are_omitted_when_missing() {
        assert_eq!(
            students_text(r#"[{"name": null, "grades?": {"chemistry": null}}]"#),
            r#"[{"name":"Anna","grades":{"chemistry":"A"}},{"name":"James"},{"name":"John","grades":{"chemistry":"C"}}]"#
        );
    }

    #[test]
    fn constraints_only_project_empty_objects() {
        assert_eq!(students_text(r#"[{"age >": 0}]"#), "[{},{},{}]");
    }

    #[test]
    fn multiple_list_matchers_take_first_match() {
        assert_eq!(
            students_text(r#"[{"name": null}, {"age": 23, "name": null}]"#),
            r#"[{"name":"Anna"},{"age":23,"name":"James"}]"#
        );
    }

    #[test]
    fn recursive_objects_with_wildcards() {
        assert_eq!(
            students_text(
                r#"[{"grades": {"chemistry in": ["A", "B"], "*": "*"}, "*": ["name"]}]"#
            ),
            r#"[{"grades":{"chemistry":"A","math":"C"},"name":"Anna"}]"#
        );
    }

    #[test]
    fn wildcard_all_copies_remaining_keys_in_data_order() {
        assert_eq!(
            students_text(r#"[{"age >": 25, "*": "*"}]"#),
            r#"[{"name":"John","age":35,"student":true,"grades":{"chemistry":"C","english":"A"},"hobbies":["reading","swimming","painting"]}]"#
        );
    }

    #[test]
    fn wildcard_named_skips_missing_keys() {
        assert_eq!(
            students_text(r#"[{"*": ["name", "nickname"]}]"#),
            r#"[{"name":"Anna"},{"name":"James"},{"name":"John"}]"#
        );
    }

    #[test]
    fn wildcard_does_not_duplicate_projected_keys() {
        assert_eq!(
            students_text(r#"[{"name": null, "*": ["name", "age"]}]"#),
            r#"[{"name":"Anna","age":25},{"name":"James","age":23},{"name":"John","age":35}]"#
        );
    }

    // ======================================================================
    // Constraints and operators
    // ======================================================================

    #[test]
    fn comparison_constraints() {
        assert_eq!(
            students_text(r#"[{"name": null, "age >": 25}]"#),
            r#"[{"name":"John"}]"#
        );
        assert_eq!(
            students_text(r#"[{"name": null, "age <=": 23}]"#),
            r#"[{"name":"James"}]"#
        );
    }

    #[test]
    fn multiple_constraints_on_one_key_combine() {
        assert_eq!(
            students_text(r#"[{"age": null, "age >": 20, "age <": 30, "age !=": 25}]"#),
            r#"[{"age":23}]"#
        );
    }

    #[test]
    fn string_comparisons_are_lexicographic() {
        assert_eq!(
            students_text(r#"[{"name >=": "James", "name": null}]"#),
            r#"[{"name":"James"},{"name":"John"}]"#
        );
    }

    #[test]
    fn comparison_type_mismatch_is_no_match() {
        assert_eq!(students_text(r#"[{"name >": 5}]"#), "[]");
        assert_eq!(students_text(r#"[{"student <": true}]"#), "[]");
    }

    #[test]
    fn regex_uses_unanchored_search() {
        assert_eq!(
            students_text(r#"[{"name regex": "ame", "name": null}]"#),
            r#"[{"name":"James"}]"#
        );
        assert_eq!(
            students_text(r#"[{"name regex": "^A", "name": null}]"#),
            r#"[{"name":"Anna"}]"#
        );
    }

    #[test]
    fn regex_on_non_strings_is_no_match() {
        assert_eq!(students_text(r#"[{"age regex": "5"}]"#), "[]");
    }

    #[test]
    fn in_constraint_over_arrays() {
        assert_eq!(
            students_text(r#"[{"name": null, "age in": [23, 25]}]"#),
            r#"[{"name":"Anna"},{"name":"James"}]"#
        );
    }

    #[test]
    fn in_constraint_over_strings_is_substring() {
        assert_eq!(
            students_text(r#"[{"name in": "Johnson", "name": null}]"#),
            r#"[{"name":"John"}]"#
        );
    }

    #[test]
    fn contain_constraint_over_arrays() {
        assert_eq!(
            students_text(r#"[{"name": null, "hobbies contain": "chess"}]"#),
            r#"[{"name":"Anna"},{"name":"James"}]"#
        );
    }

    #[test]
    fn contain_constraint_over_strings_is_substring() {
        assert_eq!(
            students_text(r#"[{"name contain": "oh", "name": null}]"#),
            r#"[{"name":"John"}]"#
        );
    }

    #[test]
    fn negated_constraints() {
        assert_eq!(
            students_text(
                r#"[{"name": null, "age !=": 25, "hobbies not contain": "chess"}]"#
            ),
            r#"[{"name":"John"}]"#
        );
    }

    #[test]
    fn constraint_on_missing_key_fails_even_negated() {
        assert_eq!(
            students_text(r#"[{"name": null, "grades not ==": "x"}]"#),
            r#"[{"name":"Anna"},{"name":"John"}]"#
        );
    }

    #[test]
    fn type_tests() {
        assert_eq!(
            students_text(
                r#"[{"name is": "string", "age is": "integer", "name": null}]"#
            ),
            r#"[{"name":"Anna"},{"name":"James"},{"name":"John"}]"#
        );
        assert_eq!(
            students_text(r#"[{"grades is": "object", "name": null}]"#),
            r#"[{"name":"Anna"},{"name":"John"}]"#
        );

        let data = v(r#"{"x": 2.5}"#);
        assert!(compiled(r#"{"x is": "float"}"#).matches(&data).is_some());
        assert!(compiled(r#"{"x is": "number"}"#).matches(&data).is_some());
        assert!(compiled(r#"{"x is": "integer"}"#).matches(&data).is_none());
    }

    #[test]
    fn bool_never_equals_number() {
        // `student != 1` holds for every record since booleans and numbers
        // are distinct types
        assert_eq!(
            students_text(r#"[{"age": null, "age <": 30, "student !=": 1}]"#),
            r#"[{"age":25},{"age":23}]"#
        );
    }

    #[test]
    fn constrained_star_key_addresses_a_literal_key() {
        // no record has a key literally named "*"
        assert_eq!(students_text(r#"[{"* ==": "*"}]"#), "[]");
        let data = v(r#"{"*": "*"}"#);
        assert_eq!(compiled(r#"{"* ==": "*"}"#).matches(&data), Some(v("{}")));
    }

    #[test]
    fn negation_duality() {
        let cases = [
            (r#"{"age >": 25}"#, r#"{"age not >": 25}"#),
            (r#"{"name regex": "^A"}"#, r#"{"name not regex": "^A"}"#),
            (
                r#"{"hobbies contain": "chess"}"#,
                r#"{"hobbies not contain": "chess"}"#,
            ),
            (r#"{"age in": [23, 25]}"#, r#"{"age not in": [23, 25]}"#),
            (r#"{"age is": "number"}"#, r#"{"age not is": "number"}"#),
            (
                r#"{"grades match": {"math": null}}"#,
                r#"{"grades not match": {"math": null}}"#,
            ),
        ];
        let Value::Array(records) = students() else {
            unreachable!();
        };
        for (positive, negative) in cases {
            let pos = compiled(positive);
            let neg = compiled(negative);
            for record in records.iter().filter(|record| {
                // both sides need the key present
                matches!(record, Value::Object(map) if map.contains_key("grades"))
            }) {
                assert!(
                    pos.matches(record).is_some() ^ neg.matches(record).is_some(),
                    "pattern {positive} vs {negative} on {record:?}"
                );
            }
        }
    }

    // ======================================================================
    // Quantifiers
    // ======================================================================

    #[test]
    fn contain_any_quantifier() {
        assert_eq!(
            students_text(
                r#"[{"name": null, "hobbies contain any": ["reading", "painting"]}]"#
            ),
            r#"[{"name":"Anna"},{"name":"John"}]"#
        );
    }

    #[test]
    fn contain_one_quantifier() {
        assert_eq!(
            students_text(
                r#"[{"name": null, "hobbies contain one": ["swimming", "painting"]}]"#
            ),
            r#"[{"name":"Anna"}]"#
        );
    }

    #[test]
    fn contain_all_and_equal_one_quantifiers() {
        assert_eq!(
            students_text(
                r#"[{"hobbies contain all": ["chess", "football"], "hobbies": null, "name == one": ["Anna", "James"]}]"#
            ),
            r#"[{"hobbies":["chess","football","basketball"]}]"#
        );
    }

    #[test]
    fn in_any_quantifier_over_strings() {
        assert_eq!(
            students_text(
                r#"[{"name in any": ["John", "Beth", "Anna"], "*": ["name"]}]"#
            ),
            r#"[{"name":"Anna"},{"name":"John"}]"#
        );
    }

    #[test]
    fn negated_quantified_constraint() {
        assert_eq!(
            students_text(
                r#"[{"hobbies not contain any": ["chess", "basketball", "football"], "name": null}]"#
            ),
            r#"[{"name":"John"}]"#
        );
    }

    #[test]
    fn match_any_quantifier() {
        assert_eq!(
            students_text(r#"[{"name match any": ["James", "Anna"], "name": null}]"#),
            r#"[{"name":"Anna"},{"name":"James"}]"#
        );
    }

    // ======================================================================
    // The match operator
    // ======================================================================

    #[test]
    fn match_with_array_argument() {
        assert_eq!(
            students_text(r#"[{"hobbies match": ["basketball"], "name": null}]"#),
            r#"[{"name":"James"}]"#
        );
    }

    #[test]
    fn match_constrains_without_projecting() {
        assert_eq!(
            students_text(
                r#"[{"name": null, "grades match": {"chemistry": "A"}, "grades": {"math": null}}]"#
            ),
            r#"[{"name":"Anna","grades":{"math":"C"}}]"#
        );
    }

    #[test]
    fn match_agrees_with_projection_on_the_verdict() {
        let as_constraint = compiled(r#"{"grades match": {"chemistry": "A"}}"#);
        let as_projection = compiled(r#"{"grades": {"chemistry": "A"}}"#);
        let Value::Array(records) = students() else {
            unreachable!();
        };
        for record in &records {
            assert_eq!(
                as_constraint.matches(record).is_some(),
                as_projection.matches(record).is_some(),
                "record: {record:?}"
            );
        }
    }

    // ======================================================================
    // Directives
    // ======================================================================

    #[test]
    fn sort_directive() {
        assert_eq!(
            students_text(r#"[{"age": null, "__sort__": "age"}]"#),
            r#"[{"age":23},{"age":25},{"age":35}]"#
        );
    }

    #[test]
    fn sort_before_limit() {
        assert_eq!(
            students_text(
                r#"[{"hobbies": null, "age": null, "__sort__": "age", "__limit__": 1}]"#
            ),
            r#"[{"hobbies":["chess","football","basketball"],"age":23}]"#
        );
    }

    #[test]
    fn limit_before_sort() {
        // directives apply in declaration order, so the limit wins here
        assert_eq!(
            students_text(r#"[{"age": null, "__limit__": 1, "__sort__": "age"}]"#),
            r#"[{"age":25}]"#
        );
    }

    #[test]
    fn limit_zero_empties_the_results() {
        assert_eq!(students_text(r#"[{"name": null, "__limit__": 0}]"#), "[]");
    }

    #[test]
    fn order_reverse() {
        assert_eq!(
            students_text(r#"[{"name": null, "__order__": "reverse"}]"#),
            r#"[{"name":"John"},{"name":"James"},{"name":"Anna"}]"#
        );
    }

    #[test]
    fn sort_then_reverse_order() {
        assert_eq!(
            students_text(
                r#"[{"name": null, "age": null, "__sort__": "age", "__order__": "reverse"}]"#
            ),
            r#"[{"name":"John","age":35},{"name":"Anna","age":25},{"name":"James","age":23}]"#
        );
    }

    #[test]
    fn sort_dash_prefix_reverses() {
        assert_eq!(
            students_text(r#"[{"age": null, "__sort__": "-age"}]"#),
            r#"[{"age":35},{"age":25},{"age":23}]"#
        );
    }

    #[test]
    fn explicit_order_overrides_sort_dash_prefix() {
        assert_eq!(
            students_text(
                r#"[{"age": null, "__sort__": "-age", "__order__": "ascending"}]"#
            ),
            r#"[{"age":23},{"age":25},{"age":35}]"#
        );
    }

    #[test]
    fn sort_treats_missing_keys_as_null() {
        let data = v(r#"[{"a": 1}, {"b": 2}, {"a": 0}]"#);
        let matcher = compiled(r#"[{"a?": null, "b?": null, "__sort__": "a"}]"#);
        assert_eq!(
            text(&matcher.matches(&data).unwrap()),
            r#"[{"b":2},{"a":0},{"a":1}]"#
        );
    }

    #[test]
    fn order_random_is_seed_deterministic() {
        let matcher = compiled(r#"[{"name": null, "__order__": "random"}]"#);
        let mut rng = StdRng::seed_from_u64(7);
        let first = matcher.matches_with(&students(), &mut rng).unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        let second = matcher.matches_with(&students(), &mut rng).unwrap();
        assert_eq!(first, second);

        let Value::Array(items) = &first else {
            panic!("expected an array result");
        };
        assert_eq!(items.len(), 3);
        for name in ["Anna", "James", "John"] {
            let expected = v(&format!(r#"{{"name": "{name}"}}"#));
            assert!(items.contains(&expected), "missing {name}");
        }
    }

    #[test]
    fn directives_are_ignored_outside_list_context() {
        let data = v(r#"{"name": "Anna"}"#);
        let matcher = compiled(r#"{"name": null, "__limit__": 0}"#);
        assert_eq!(matcher.matches(&data), Some(v(r#"{"name": "Anna"}"#)));
    }

    #[test]
    fn empty_record_collection_is_still_a_match() {
        assert_eq!(students_text(r#"[{"name": "Zoe"}]"#), "[]");
    }

    // ======================================================================
    // Resource behavior
    // ======================================================================

    #[test]
    fn matches_deeply_nested_structures() {
        let depth = 100;
        let pattern_text =
            format!("{}null{}", r#"{"a":"#.repeat(depth), "}".repeat(depth));
        let data_text =
            format!("{}42{}", r#"{"a":"#.repeat(depth), "}".repeat(depth));
        let result = compiled(&pattern_text).matches(&v(&data_text));
        assert_eq!(result, Some(v(&data_text)));
    }

    #[test]
    fn matcher_is_reusable_across_evaluations() {
        let matcher = compiled(r#"[{"name": null}]"#);
        let data = students();
        let first = matcher.matches(&data).unwrap();
        let second = matcher.matches(&data).unwrap();
        assert_eq!(first, second);
        // data is untouched
        assert_eq!(data, students());
    }
}
