//! MongoDB-style JSON filters and options.
//!
//! ```json
//! { "age": { "$gte": 18, "$lt": 65 }, "$or": [{ "status": "active" }, { "vip": true }] }
//! { "sort": { "age": -1, "name": "asc" }, "limit": 10, "skip": 20, "fields": ["name"] }
//! ```
//!
//! Object key order is preserved (`serde_json` `preserve_order`), so several
//! operators on one field, or several fields in one object, become an `$and`
//! in the order they were written.

use serde_json::{Map, Value as Json};

use super::error::{QueryError, QueryResult};
use super::filter::{FieldOperator, FilterNode, LogicalKind};
use super::options::{QueryOptions, SortDirection};
use crate::value::Value;

/// Parse a filter from JSON text.
pub fn parse_filter_str(input: &str) -> QueryResult<FilterNode> {
    let json: Json = serde_json::from_str(input).map_err(|e| QueryError::invalid_json(e.to_string()))?;
    parse_filter(&json)
}

/// Parse a filter document.
pub fn parse_filter(json: &Json) -> QueryResult<FilterNode> {
    let object = json
        .as_object()
        .ok_or_else(|| QueryError::invalid_json(format!("filter must be an object, got {}", json_kind(json))))?;
    parse_document(object)
}

fn parse_document(object: &Map<String, Json>) -> QueryResult<FilterNode> {
    let mut nodes = Vec::with_capacity(object.len());
    for (key, value) in object {
        let node = match key.as_str() {
            "$and" => FilterNode::and(parse_filter_list(key, value)?),
            "$or" => FilterNode::or(parse_filter_list(key, value)?),
            "$nor" => FilterNode::nor(parse_filter_list(key, value)?),
            "$not" => FilterNode::not(parse_filter(value)?),
            op if op.starts_with('$') => {
                return Err(QueryError::invalid_json(format!("unknown top-level operator '{}'", op)));
            }
            field => parse_field(field, value)?,
        };
        nodes.push(node);
    }
    Ok(combine(nodes))
}

fn parse_filter_list(key: &str, value: &Json) -> QueryResult<Vec<FilterNode>> {
    let items = value
        .as_array()
        .ok_or_else(|| QueryError::invalid_json(format!("{} expects an array of filters", key)))?;
    items.iter().map(parse_filter).collect()
}

/// One field's condition: bare equality or an operator object.
fn parse_field(field: &str, value: &Json) -> QueryResult<FilterNode> {
    match value.as_object() {
        Some(ops) if is_operator_object(ops) => parse_operators(field, ops),
        _ => Ok(FilterNode::eq(field, Value::from(value.clone()))),
    }
}

fn is_operator_object(object: &Map<String, Json>) -> bool {
    !object.is_empty() && object.keys().all(|k| k.starts_with('$'))
}

fn parse_operators(field: &str, ops: &Map<String, Json>) -> QueryResult<FilterNode> {
    let mut nodes = Vec::with_capacity(ops.len());
    for (op, arg) in ops {
        let node = if op == "$not" {
            let inner = arg
                .as_object()
                .filter(|o| is_operator_object(o))
                .ok_or_else(|| QueryError::invalid_json(format!("$not on '{}' expects an operator object", field)))?;
            FilterNode::not(parse_operators(field, inner)?)
        } else {
            FilterNode::field(field, parse_operator(field, op, arg)?)
        };
        nodes.push(node);
    }
    Ok(combine(nodes))
}

fn parse_operator(field: &str, op: &str, arg: &Json) -> QueryResult<FieldOperator> {
    let operator = match op {
        "$eq" => FieldOperator::Eq(Value::from(arg.clone())),
        "$ne" => FieldOperator::Ne(Value::from(arg.clone())),
        "$gt" => FieldOperator::Gt(Value::from(arg.clone())),
        "$gte" => FieldOperator::Gte(Value::from(arg.clone())),
        "$lt" => FieldOperator::Lt(Value::from(arg.clone())),
        "$lte" => FieldOperator::Lte(Value::from(arg.clone())),
        "$in" => FieldOperator::In(expect_values(field, op, arg)?),
        "$nin" => FieldOperator::NotIn(expect_values(field, op, arg)?),
        "$all" => FieldOperator::All(expect_values(field, op, arg)?),
        "$like" => FieldOperator::Like(expect_string(field, op, arg)?),
        "$ilike" => FieldOperator::ILike(expect_string(field, op, arg)?),
        "$startsWith" => FieldOperator::StartsWith(expect_string(field, op, arg)?),
        "$endsWith" => FieldOperator::EndsWith(expect_string(field, op, arg)?),
        "$contains" => FieldOperator::Contains(expect_string(field, op, arg)?),
        "$size" => FieldOperator::Size(
            arg.as_i64()
                .ok_or_else(|| operand_error(field, op, "an integer", arg))?,
        ),
        "$exists" => FieldOperator::Exists(
            arg.as_bool()
                .ok_or_else(|| operand_error(field, op, "a boolean", arg))?,
        ),
        "$elemMatch" => FieldOperator::ElemMatch(Box::new(parse_elem_match(field, arg)?)),
        other => {
            return Err(QueryError::invalid_json(format!(
                "unknown operator '{}' on field '{}'",
                other, field
            )));
        }
    };
    Ok(operator)
}

/// `$elemMatch` takes either a sub-document filter or, for scalar arrays, an
/// operator object applied to the element itself.
fn parse_elem_match(field: &str, arg: &Json) -> QueryResult<FilterNode> {
    let object = arg
        .as_object()
        .ok_or_else(|| operand_error(field, "$elemMatch", "an object", arg))?;
    let element_ops = is_operator_object(object)
        && !object
            .keys()
            .any(|k| matches!(k.as_str(), "$and" | "$or" | "$nor" | "$not"));
    if element_ops {
        parse_operators("", object)
    } else {
        parse_document(object)
    }
}

fn expect_values(field: &str, op: &str, arg: &Json) -> QueryResult<Vec<Value>> {
    let items = arg
        .as_array()
        .ok_or_else(|| operand_error(field, op, "an array", arg))?;
    Ok(items.iter().cloned().map(Value::from).collect())
}

fn expect_string(field: &str, op: &str, arg: &Json) -> QueryResult<String> {
    arg.as_str()
        .map(str::to_string)
        .ok_or_else(|| operand_error(field, op, "a string", arg))
}

fn operand_error(field: &str, op: &str, expected: &str, got: &Json) -> QueryError {
    QueryError::invalid_json(format!(
        "{} on '{}' expects {}, got {}",
        op,
        field,
        expected,
        json_kind(got)
    ))
}

fn json_kind(json: &Json) -> &'static str {
    match json {
        Json::Null => "null",
        Json::Bool(_) => "boolean",
        Json::Number(_) => "number",
        Json::String(_) => "string",
        Json::Array(_) => "array",
        Json::Object(_) => "object",
    }
}

/// Zero nodes match everything, one stands alone, more are AND-ed.
fn combine(mut nodes: Vec<FilterNode>) -> FilterNode {
    match nodes.len() {
        0 => FilterNode::Empty,
        1 => nodes.remove(0),
        _ => FilterNode::Logical {
            kind: LogicalKind::And,
            operands: nodes,
        },
    }
}

/// Parse options from JSON text.
pub fn parse_options_str(input: &str) -> QueryResult<QueryOptions> {
    let json: Json = serde_json::from_str(input).map_err(|e| QueryError::InvalidOptions {
        reason: format!("invalid JSON: {}", e),
    })?;
    parse_options(&json)
}

/// Parse `{sort, limit, skip, fields}`.
pub fn parse_options(json: &Json) -> QueryResult<QueryOptions> {
    let object = json.as_object().ok_or_else(|| invalid_options("options must be an object"))?;
    let mut options = QueryOptions::new();

    for (key, value) in object {
        match key.as_str() {
            "sort" => {
                let sort = value
                    .as_object()
                    .ok_or_else(|| invalid_options("sort must be an object of field to direction"))?;
                for (field, direction) in sort {
                    options = options.sort_by(field.as_str(), parse_direction(field, direction)?);
                }
            }
            "limit" => {
                options.limit = Some(
                    value
                        .as_u64()
                        .ok_or_else(|| invalid_options("limit must be a non-negative integer"))?,
                );
            }
            "skip" => {
                options.skip = Some(
                    value
                        .as_u64()
                        .ok_or_else(|| invalid_options("skip must be a non-negative integer"))?,
                );
            }
            "fields" => {
                let fields = value
                    .as_array()
                    .and_then(|items| items.iter().map(|f| f.as_str().map(str::to_string)).collect::<Option<Vec<_>>>())
                    .ok_or_else(|| invalid_options("fields must be an array of strings"))?;
                options = options.with_projection(fields);
            }
            other => return Err(invalid_options(&format!("unknown option '{}'", other))),
        }
    }
    Ok(options)
}

fn parse_direction(field: &str, json: &Json) -> QueryResult<SortDirection> {
    match json {
        Json::Number(n) if n.as_i64() == Some(1) => Ok(SortDirection::Asc),
        Json::Number(n) if n.as_i64() == Some(-1) => Ok(SortDirection::Desc),
        Json::String(s) if s.eq_ignore_ascii_case("asc") => Ok(SortDirection::Asc),
        Json::String(s) if s.eq_ignore_ascii_case("desc") => Ok(SortDirection::Desc),
        _ => Err(invalid_options(&format!(
            "sort direction for '{}' must be 1, -1, \"asc\" or \"desc\"",
            field
        ))),
    }
}

fn invalid_options(reason: &str) -> QueryError {
    QueryError::InvalidOptions {
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    fn test_empty_object_is_empty_filter() {
        assert_eq!(parse_filter(&json!({})).unwrap(), FilterNode::Empty);
    }

    #[rstest]
    fn test_bare_equality() {
        assert_eq!(
            parse_filter(&json!({"status": "active"})).unwrap(),
            FilterNode::eq("status", "active")
        );
    }

    #[rstest]
    fn test_object_value_without_operators_is_equality() {
        let node = parse_filter(&json!({"meta": {"a": 1}})).unwrap();
        assert_eq!(node, FilterNode::eq("meta", Value::Json(json!({"a": 1}))));
    }

    #[rstest]
    fn test_multiple_operators_keep_key_order() {
        let node = parse_filter(&json!({"age": {"$gte": 18, "$lt": 65}})).unwrap();
        assert_eq!(
            node,
            FilterNode::and(vec![FilterNode::gte("age", 18i64), FilterNode::lt("age", 65i64)])
        );
    }

    #[rstest]
    fn test_multiple_fields_are_anded() {
        let node = parse_filter(&json!({"b": 1, "a": 2})).unwrap();
        assert_eq!(
            node,
            FilterNode::and(vec![FilterNode::eq("b", 1i64), FilterNode::eq("a", 2i64)])
        );
    }

    #[rstest]
    fn test_logical_operators() {
        let node = parse_filter(&json!({"$nor": [{"status": "inactive"}, {"active": false}]})).unwrap();
        assert_eq!(
            node,
            FilterNode::nor(vec![
                FilterNode::eq("status", "inactive"),
                FilterNode::eq("active", false)
            ])
        );
        let node = parse_filter(&json!({"$not": {"a": 1}})).unwrap();
        assert_eq!(node, FilterNode::not(FilterNode::eq("a", 1i64)));
    }

    #[rstest]
    fn test_field_level_not() {
        let node = parse_filter(&json!({"age": {"$not": {"$gt": 5}}})).unwrap();
        assert_eq!(node, FilterNode::not(FilterNode::gt("age", 5i64)));
    }

    #[rstest]
    #[case(json!({"tags": {"$in": ["a", "b"]}}), FilterNode::in_list("tags", ["a", "b"]))]
    #[case(json!({"tags": {"$nin": []}}), FilterNode::not_in("tags", Vec::<Value>::new()))]
    #[case(json!({"tags": {"$all": ["x"]}}), FilterNode::all("tags", ["x"]))]
    #[case(json!({"tags": {"$size": 3}}), FilterNode::size("tags", 3))]
    #[case(json!({"email": {"$exists": false}}), FilterNode::exists("email", false))]
    #[case(json!({"name": {"$startsWith": "An"}}), FilterNode::field("name", FieldOperator::StartsWith("An".into())))]
    #[case(json!({"name": {"$ilike": "an%"}}), FilterNode::field("name", FieldOperator::ILike("an%".into())))]
    fn test_field_operators(#[case] input: Json, #[case] expected: FilterNode) {
        assert_eq!(parse_filter(&input).unwrap(), expected);
    }

    #[rstest]
    fn test_elem_match_subdocument() {
        let node = parse_filter(&json!({"items": {"$elemMatch": {"sku": "x", "qty": {"$gt": 2}}}})).unwrap();
        assert_eq!(
            node,
            FilterNode::elem_match(
                "items",
                FilterNode::and(vec![FilterNode::eq("sku", "x"), FilterNode::gt("qty", 2i64)])
            )
        );
    }

    #[rstest]
    fn test_elem_match_scalar() {
        let node = parse_filter(&json!({"scores": {"$elemMatch": {"$gte": 80}}})).unwrap();
        assert_eq!(node, FilterNode::elem_match("scores", FilterNode::gte("", 80i64)));
    }

    #[rstest]
    #[case(json!([1, 2]))]
    #[case(json!({"$where": "1"}))]
    #[case(json!({"a": {"$regex": "x"}}))]
    #[case(json!({"a": {"$in": 3}}))]
    #[case(json!({"a": {"$size": "3"}}))]
    #[case(json!({"a": {"$exists": 1}}))]
    #[case(json!({"$and": {"a": 1}}))]
    fn test_invalid_filters(#[case] input: Json) {
        assert!(matches!(parse_filter(&input), Err(QueryError::InvalidFilterJson { .. })));
    }

    #[rstest]
    fn test_invalid_filter_text() {
        assert!(matches!(parse_filter_str("{age:"), Err(QueryError::InvalidFilterJson { .. })));
    }

    #[rstest]
    fn test_parse_options() {
        let options = parse_options(&json!({
            "sort": {"age": -1, "name": "asc"},
            "limit": 10,
            "skip": 20,
            "fields": ["name"]
        }))
        .unwrap();
        assert_eq!(options.sort()[0].field, "age");
        assert_eq!(options.sort()[0].direction, SortDirection::Desc);
        assert_eq!(options.sort()[1].direction, SortDirection::Asc);
        assert_eq!(options.limit, Some(10));
        assert_eq!(options.skip, Some(20));
        assert_eq!(options.projection, Some(vec!["name".to_string()]));
    }

    #[rstest]
    #[case(json!({"limit": -1}))]
    #[case(json!({"sort": {"a": 2}}))]
    #[case(json!({"fields": [1]}))]
    #[case(json!({"page": 1}))]
    fn test_invalid_options(#[case] input: Json) {
        assert!(matches!(parse_options(&input), Err(QueryError::InvalidOptions { .. })));
    }
}
