use docfilter::{
    ConvertError, Error, Field, FieldEntry, Fields, Operator, Parser, PrimitiveError, Primitives,
    SortDirection, Symbol, TypeConverter, Value, convert,
};
use serde::Serialize;
use serde_json::json;
use std::{collections::BTreeSet, sync::Arc};

///
/// Bson
///
/// In-memory stand-in for driver-constructed values.
///

#[derive(Clone, Debug, PartialEq, Serialize)]
enum Bson {
    Regex { pattern: String, options: String },
    ObjectId(String),
}

#[derive(Debug, Default)]
struct TestPrimitives {
    forbidden_sort_fields: BTreeSet<String>,
}

impl Primitives for TestPrimitives {
    type Value = Bson;
    type SortKey = (String, i32);

    fn regex(&self, pattern: &str, options: &str) -> Result<Bson, PrimitiveError> {
        Ok(Bson::Regex {
            pattern: pattern.to_string(),
            options: options.to_string(),
        })
    }

    fn object_id(&self, hex: &str) -> Result<Bson, PrimitiveError> {
        Ok(Bson::ObjectId(hex.to_string()))
    }

    fn sort_key(
        &self,
        field: &str,
        direction: SortDirection,
    ) -> Result<(String, i32), PrimitiveError> {
        if self.forbidden_sort_fields.contains(field) {
            return Err(PrimitiveError::new(format!("unsortable field: {field}")));
        }

        Ok((field.to_string(), direction.as_i32()))
    }
}

fn parser() -> Parser<TestPrimitives> {
    Parser::with_primitives(Arc::new(TestPrimitives::default()))
}

fn strict_parser() -> Parser<TestPrimitives> {
    let primitives = Arc::new(TestPrimitives {
        forbidden_sort_fields: BTreeSet::from(["forbidden".to_string()]),
    });

    Parser::with_primitives(primitives)
        .fields(
            Fields::new()
                .with(
                    "required",
                    Field::new().required().converter(convert::boolean::<Bson>),
                )
                .with("count", Field::new().converter(convert::integer::<Bson>))
                .with("forbidden", Field::new()),
        )
        .strict(true)
}

fn regex(pattern: &str, options: &str) -> Value<Bson> {
    Value::Primitive(Bson::Regex {
        pattern: pattern.to_string(),
        options: options.to_string(),
    })
}

#[test]
fn normal_request() {
    let (query, errors) = strict_parser().parse(vec![
        ("required__exists", "true"),
        ("__sort", "-required"),
    ]);

    assert!(errors.is_empty(), "unexpected errors: {errors}");
    assert_eq!(query.limit, 0);
    assert_eq!(query.skip, 0);
    assert_eq!(query.sort, vec![("required".to_string(), -1)]);
    assert_eq!(
        serde_json::to_value(&query.filter).unwrap(),
        json!({ "required": { "$exists": true } })
    );
}

#[test]
fn conversion_chain_end_to_end() {
    let (query, errors) = parser().parse(vec![
        ("flag", "yes"),
        ("count", "123"),
        ("ratio", "1.5"),
        ("since", "2021-01-01"),
        ("name", "hello"),
        ("id", "123456789012"),
    ]);

    assert!(errors.is_empty(), "unexpected errors: {errors}");
    assert_eq!(
        query.filter.get("id"),
        Some(&FieldEntry::Scalar(Value::Primitive(Bson::ObjectId(
            "123456789012".to_string()
        ))))
    );
    assert_eq!(
        query.filter.get("flag"),
        Some(&FieldEntry::Scalar(Value::Bool(true)))
    );
    assert_eq!(
        query.filter.get("count"),
        Some(&FieldEntry::Scalar(Value::Int(123)))
    );
    assert_eq!(
        query.filter.get("ratio"),
        Some(&FieldEntry::Scalar(Value::Double(1.5)))
    );
    assert_eq!(
        query.filter.get("name"),
        Some(&FieldEntry::Scalar(Value::String("hello".to_string())))
    );
    assert!(matches!(
        query.filter.get("since"),
        Some(&FieldEntry::Scalar(Value::Date(_)))
    ));
}

#[test]
fn in_with_single_value_is_bare_equality() {
    let (query, errors) = parser().parse(vec![("field__in", "a")]);

    assert!(errors.is_empty());
    assert_eq!(
        serde_json::to_value(&query.filter).unwrap(),
        json!({ "field": "a" })
    );
}

#[test]
fn in_splits_a_comma_joined_value() {
    let (query, errors) = parser().parse(vec![("field__in", "a,b")]);

    assert!(errors.is_empty());
    assert_eq!(
        serde_json::to_value(&query.filter).unwrap(),
        json!({ "field": { "$in": ["a", "b"] } })
    );
}

#[test]
fn bracket_key_is_in() {
    let (query, errors) = parser().parse(vec![("field[]", "a"), ("field[]", "b")]);

    assert!(errors.is_empty());
    assert_eq!(
        serde_json::to_value(&query.filter).unwrap(),
        json!({ "field": { "$in": ["a", "b"] } })
    );
}

#[test]
fn bracket_key_never_splits() {
    let (query, errors) = parser().parse(vec![("field[]", "a,b")]);

    assert!(errors.is_empty());
    assert_eq!(
        serde_json::to_value(&query.filter).unwrap(),
        json!({ "field": "a,b" })
    );
}

#[test]
fn rein_and_bracket_rein_merge() {
    let (query, errors) = parser().parse(vec![("field__rein", "a"), ("field__re[]", "b")]);

    assert!(errors.is_empty());
    assert_eq!(
        query.filter.get("field"),
        Some(&FieldEntry::Operators(
            [(
                Symbol::In,
                Value::Array(vec![regex("a", ""), regex("b", "")])
            )]
            .into_iter()
            .collect()
        ))
    );
}

#[test]
fn nested_bracket_paths_merge_into_dotted_fields() {
    let (query, errors) = parser().parse(vec![
        ("field1[nested][nested2][]", "a"),
        ("field1[nested][nested2][]", "b"),
        ("field1.nested.nested2[]", "c"),
    ]);

    assert!(errors.is_empty());
    assert_eq!(
        serde_json::to_value(&query.filter).unwrap(),
        json!({ "field1.nested.nested2": { "$in": ["a", "b", "c"] } })
    );
}

#[test]
fn pattern_operators_synthesize_regexes() {
    let (query, errors) = parser().parse(vec![
        ("a__re", "[0-9]*"),
        ("b__isw", "^"),
        ("c__icoin", "$,x"),
    ]);

    assert!(errors.is_empty(), "unexpected errors: {errors}");

    // re passes the pattern through verbatim
    assert_eq!(
        query.filter.get("a"),
        Some(&FieldEntry::Scalar(regex("[0-9]*", "")))
    );

    // sw anchors the escaped value
    assert_eq!(
        query.filter.get("b"),
        Some(&FieldEntry::Scalar(regex("^\\^", "i")))
    );

    // icoin splits, escapes each element and keeps the array
    assert_eq!(
        query.filter.get("c"),
        Some(&FieldEntry::Operators(
            [(
                Symbol::In,
                Value::Array(vec![regex("\\$", "i"), regex("x", "i")])
            )]
            .into_iter()
            .collect()
        ))
    );
}

#[test]
fn strict_mode_rejects_unspecified_fields() {
    let (query, errors) = strict_parser().parse(vec![("required", "yes"), ("other", "1")]);

    assert_eq!(
        serde_json::to_value(&query.filter).unwrap(),
        json!({ "required": true })
    );
    assert_eq!(errors.len(), 1);
    assert_eq!(
        errors[0],
        Error::NoFieldSpec {
            field: "other".to_string()
        }
    );
}

#[test]
fn missing_required_field_is_reported() {
    let (query, errors) = strict_parser().parse(vec![("count", "5")]);

    assert!(query.filter.contains_key("count"));
    assert_eq!(
        errors[0],
        Error::MissingField {
            field: "required".to_string()
        }
    );
}

#[test]
fn unconvertible_required_field_reports_both_problems() {
    let (query, errors) = strict_parser().parse(vec![("required", "nope")]);

    assert!(query.filter.is_empty());
    assert_eq!(errors.len(), 2);
    assert!(errors[0].is_convert());
    assert_eq!(
        errors[1],
        Error::MissingField {
            field: "required".to_string()
        }
    );
}

#[test]
fn exists_bypasses_the_field_converter() {
    // count is configured with the integer converter; exists still coerces
    // through boolean
    let (query, errors) = strict_parser().parse(vec![
        ("required", "yes"),
        ("count__exists", "yes"),
    ]);

    assert!(errors.is_empty(), "unexpected errors: {errors}");
    assert_eq!(
        serde_json::to_value(&query.filter).unwrap(),
        json!({ "required": true, "count": { "$exists": true } })
    );
}

#[test]
fn chain_without_text_surfaces_no_match() {
    let converter: TypeConverter<TestPrimitives> = TypeConverter::new(
        convert::boolean::<Bson>,
        None,
        vec![Box::new(convert::integer::<Bson>)],
    );
    let (query, errors) = Parser::new(converter).parse(vec![("name", "hello")]);

    assert!(query.filter.is_empty());
    assert_eq!(
        errors[0],
        Error::Convert {
            field: "name".to_string(),
            operator: Operator::Eq,
            source: ConvertError::NoMatch {
                value: "hello".to_string()
            },
        }
    );
}

#[test]
fn field_override_replaces_the_chain() {
    // the count override parses integers only; "true" is not downgraded to bool
    let (query, errors) =
        strict_parser().parse(vec![("required", "yes"), ("count", "true")]);

    assert!(!query.filter.contains_key("count"));
    assert_eq!(errors.len(), 1);
    assert!(errors[0].is_convert());
}

#[test]
fn directives_do_not_become_filter_fields() {
    let (query, errors) = strict_parser().parse(vec![
        ("required", "yes"),
        ("__limit", "25"),
        ("__skip", "75"),
        ("__sort", "required"),
    ]);

    assert!(errors.is_empty(), "unexpected errors: {errors}");
    assert_eq!(query.filter.len(), 1);
    assert_eq!(query.limit, 25);
    assert_eq!(query.skip, 75);
    assert_eq!(query.sort, vec![("required".to_string(), 1)]);
}

#[test]
fn sort_tokens_flatten_across_repeats() {
    let (query, errors) = parser().parse(vec![
        ("__sort", "a,b,-c"),
        ("__sort", "d"),
        ("__sort", "+e,f"),
    ]);

    assert!(errors.is_empty());
    assert_eq!(
        query.sort,
        vec![
            ("a".to_string(), 1),
            ("b".to_string(), 1),
            ("c".to_string(), -1),
            ("d".to_string(), 1),
            ("e".to_string(), 1),
            ("f".to_string(), 1),
        ]
    );
}

#[test]
fn strict_sort_keeps_the_entry_and_reports() {
    let (query, errors) = strict_parser().parse(vec![("required", "no"), ("__sort", "field")]);

    assert_eq!(query.sort.len(), 1);
    assert_eq!(
        errors[0],
        Error::NoSortField {
            field: "field".to_string()
        }
    );
}

#[test]
fn rejected_sort_key_is_dropped() {
    let (query, errors) =
        strict_parser().parse(vec![("required", "no"), ("__sort", "-forbidden")]);

    assert!(query.sort.is_empty());
    assert_eq!(
        errors[0],
        Error::NoSortField {
            field: "forbidden".to_string()
        }
    );
}

#[test]
fn bad_pagination_is_collected_but_the_rest_compiles() {
    let (query, errors) = strict_parser().parse(vec![
        ("required", "yes"),
        ("__skip", "required"),
        ("__limit", "10"),
    ]);

    assert_eq!(query.limit, 10);
    assert_eq!(query.skip, 0);
    assert_eq!(
        serde_json::to_value(&query.filter).unwrap(),
        json!({ "required": true })
    );
    assert_eq!(errors.len(), 1);
    assert!(matches!(errors[0], Error::Directive { name: "skip", .. }));
}

#[test]
fn pattern_conversion_without_primitives_is_an_error() {
    let parser: Parser<TestPrimitives> = Parser::new(TypeConverter::with_defaults(None));
    let (query, errors) = parser.parse(vec![("name__co", "x")]);

    assert!(query.filter.is_empty());
    assert_eq!(errors.len(), 1);
    assert!(errors[0].is_convert());
}

#[test]
fn ranges_combine_under_one_field() {
    let (query, errors) = parser().parse(vec![
        ("age__gte", "18"),
        ("age__lt", "65"),
        ("age__ne", "42"),
    ]);

    assert!(errors.is_empty());
    assert_eq!(
        serde_json::to_value(&query.filter).unwrap(),
        json!({ "age": { "$gte": 18, "$lt": 65, "$ne": 42 } })
    );
}

#[test]
fn eqa_compiles_to_an_equality_array() {
    let (query, errors) = parser().parse(vec![("tags__eqa", "a,b"), ("lone__eqa", "x")]);

    assert!(errors.is_empty());
    assert_eq!(
        serde_json::to_value(&query.filter).unwrap(),
        json!({
            "lone": { "$eq": ["x"] },
            "tags": { "$eq": ["a", "b"] },
        })
    );
}

#[test]
fn nin_keeps_array_semantics_for_a_lone_value() {
    let (query, errors) = parser().parse(vec![("tag__nin", "x")]);

    assert!(errors.is_empty());
    assert_eq!(
        serde_json::to_value(&query.filter).unwrap(),
        json!({ "tag": { "$nin": ["x"] } })
    );
}

#[test]
fn unknown_operator_is_collected_and_skipped() {
    let (query, errors) = parser().parse(vec![("name__icon", "x"), ("age", "3")]);

    assert_eq!(query.filter.len(), 1);
    assert_eq!(
        errors[0],
        Error::UnknownOperator {
            operator: "icon".to_string()
        }
    );
}

#[test]
fn too_many_values_for_a_single_value_operator() {
    let (query, errors) = parser().parse(vec![("age__gt", "1"), ("age__gt", "2")]);

    assert!(query.filter.is_empty());
    assert_eq!(errors.len(), 1);
    assert!(errors[0].is_convert());
}
