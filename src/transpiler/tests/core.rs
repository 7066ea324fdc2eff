//! Core SQL transpiler tests (SELECT assembly, default dialect).

use pretty_assertions::assert_eq;
use serde_json::{Value, json};

use crate::ast::builders::Where;
use crate::ast::{Condition, Operator, OrderBy, Query};
use crate::error::UqlError;
use crate::transpiler::{Dialect, ToSql};

fn users() -> Query {
    Query::new("users")
}

#[test]
fn test_simple_select() {
    assert_eq!(users().to_sql().unwrap(), "SELECT * FROM \"users\";");
}

#[test]
fn test_must_and_must_not() {
    let q = users()
        .select(["id", "name"])
        .must(Where::field("age").gt(30).unwrap())
        .must_not(Where::field("status").eq("inactive").unwrap());
    assert_eq!(
        q.to_sql().unwrap(),
        "SELECT \"id\", \"name\" FROM \"users\" WHERE (\"age\" > 30) AND (NOT (\"status\" = 'inactive'));"
    );
}

#[test]
fn test_select_from_json() {
    let q = Query::from_json(&json!({
        "select": ["id"],
        "from": "users",
        "where": {
            "must": [{"age": {"gte": 18}}, {"country": "NZ"}],
            "must_not": [{"banned": true}]
        },
        "orderBy": [{"field": "id", "order": "DESC"}],
        "limit": 10,
        "offset": 20
    }))
    .unwrap();
    assert_eq!(
        q.to_sql().unwrap(),
        "SELECT \"id\" FROM \"users\" WHERE (\"age\" >= 18 AND \"country\" = 'NZ') \
         AND (NOT (\"banned\" = TRUE)) ORDER BY \"id\" DESC LIMIT 10 OFFSET 20;"
    );
}

#[test]
fn test_null_checks() {
    let q = users()
        .must(Where::field("deleted_at").is_null().unwrap())
        .must(Where::field("email").is_not_null().unwrap())
        .must(Where::field("phone").exists().unwrap())
        .must(Where::field("fax").not_exists().unwrap());
    assert_eq!(
        q.to_sql().unwrap(),
        "SELECT * FROM \"users\" WHERE (\"deleted_at\" IS NULL AND \"email\" IS NOT NULL \
         AND \"phone\" IS NOT NULL AND \"fax\" IS NULL);"
    );
}

#[test]
fn test_qualified_names_are_quoted_per_segment() {
    let q = Query::new("app.users")
        .select(["users.*", "orders.total"])
        .must(Where::field("app.users.id").eq(1).unwrap());
    assert_eq!(
        q.to_sql().unwrap(),
        "SELECT \"users\".*, \"orders\".\"total\" FROM \"app\".\"users\" \
         WHERE (\"app\".\"users\".\"id\" = 1);"
    );
}

#[test]
fn test_invalid_identifiers_are_rejected() {
    let err = Query::new("users; DROP TABLE x").to_sql().unwrap_err();
    assert!(matches!(err, UqlError::InvalidField { .. }));

    let err = users().select(["name\""]).to_sql().unwrap_err();
    assert!(matches!(err, UqlError::InvalidField { .. }));
}

#[test]
fn test_string_literals_are_escaped() {
    let q = users().must(Where::field("name").eq("O'Brien").unwrap());
    assert_eq!(
        q.to_sql().unwrap(),
        "SELECT * FROM \"users\" WHERE (\"name\" = 'O''Brien');"
    );
}

#[test]
fn test_like_family_escapes_wildcards() {
    let q = Query::new("products").must(Where::field("name").contains("50%_off").unwrap());
    assert_eq!(
        q.to_sql().unwrap(),
        r#"SELECT * FROM "products" WHERE ("name" LIKE '%50\%\_off%' ESCAPE '\');"#
    );

    let q = Query::new("products")
        .must(Where::field("sku").starts_with("AB").unwrap())
        .must(Where::field("sku").ends_with("Z").unwrap())
        .must(Where::field("title").not_contains("x").unwrap());
    assert_eq!(
        q.to_sql().unwrap(),
        r#"SELECT * FROM "products" WHERE ("sku" LIKE 'AB%' ESCAPE '\' AND "sku" LIKE '%Z' ESCAPE '\' AND "title" NOT LIKE '%x%' ESCAPE '\');"#
    );
}

#[test]
fn test_case_insensitive_operators() {
    let q = users()
        .must(Where::field("name").icontains("ann").unwrap())
        .must(Where::field("email").ilike("%@EXAMPLE.com").unwrap());
    assert_eq!(
        q.to_sql().unwrap(),
        r#"SELECT * FROM "users" WHERE ("name" ILIKE '%ann%' ESCAPE '\' AND "email" ILIKE '%@EXAMPLE.com');"#
    );
}

#[test]
fn test_membership_and_range() {
    let q = users()
        .must(Where::field("role").is_in(["admin", "owner"]).unwrap())
        .must(Where::field("id").not_in([1, 2]).unwrap())
        .must(Where::field("age").between(18, 65).unwrap());
    assert_eq!(
        q.to_sql().unwrap(),
        "SELECT * FROM \"users\" WHERE (\"role\" IN ('admin', 'owner') AND \"id\" NOT IN (1, 2) \
         AND \"age\" BETWEEN 18 AND 65);"
    );
}

#[test]
fn test_nested_boolean_expressions() {
    let either = Where::or([
        Where::field("a").eq(1).unwrap(),
        Where::field("b").eq(2).unwrap(),
    ])
    .unwrap();
    let negated = Where::not(Where::field("c").lt(3).unwrap());
    let q = users().must(either).must(negated);
    assert_eq!(
        q.to_sql().unwrap(),
        "SELECT * FROM \"users\" WHERE ((\"a\" = 1 OR \"b\" = 2) AND NOT (\"c\" < 3));"
    );
}

#[test]
fn test_operator_sugar_builds_the_same_tree() {
    let sugar = Where::field("a").eq(1).unwrap() & Where::field("b").eq(2).unwrap();
    let explicit = Where::and([
        Where::field("a").eq(1).unwrap(),
        Where::field("b").eq(2).unwrap(),
    ])
    .unwrap();
    assert_eq!(
        users().must(sugar).to_sql().unwrap(),
        users().must(explicit).to_sql().unwrap()
    );
}

#[test]
fn test_order_and_pagination() {
    let q = users()
        .order_by(OrderBy::desc("created_at"))
        .order_by(OrderBy::asc("id"))
        .limit(10)
        .offset(20);
    assert_eq!(
        q.to_sql().unwrap(),
        "SELECT * FROM \"users\" ORDER BY \"created_at\" DESC, \"id\" ASC LIMIT 10 OFFSET 20;"
    );
}

#[test]
fn test_zero_offset_is_omitted() {
    let q = users().limit(10).offset(0);
    assert_eq!(q.to_sql().unwrap(), "SELECT * FROM \"users\" LIMIT 10;");

    let q = users().offset(7);
    assert_eq!(q.to_sql().unwrap(), "SELECT * FROM \"users\" OFFSET 7;");
}

#[test]
fn test_parameterized_postgres() {
    let q = users()
        .must(Where::field("age").gt(30).unwrap())
        .must(Where::field("status").is_in(["a", "b"]).unwrap())
        .must(Where::field("deleted_at").is_null().unwrap())
        .must_not(Where::field("name").contains("x").unwrap());
    let (sql, params) = q.to_sql_parameterized(Dialect::Postgres).unwrap();
    assert_eq!(
        sql,
        r#"SELECT * FROM "users" WHERE ("age" > $1 AND "status" IN ($2, $3) AND "deleted_at" IS NULL) AND (NOT ("name" LIKE $4 ESCAPE '\'));"#
    );
    assert_eq!(
        params,
        vec![json!(30), json!("a"), json!("b"), json!("%x%")]
    );
}

#[test]
fn test_parameterized_without_filter_has_no_params() {
    let (sql, params) = users().limit(5).to_sql_parameterized(Dialect::Postgres).unwrap();
    assert_eq!(sql, "SELECT * FROM \"users\" LIMIT 5;");
    assert!(params.is_empty());
}

#[test]
fn test_object_values_render_as_json_text() {
    let q = Query::new("events").must(Where::field("payload").eq(json!({"k": "v"})).unwrap());
    assert_eq!(
        q.to_sql().unwrap(),
        r#"SELECT * FROM "events" WHERE ("payload" = '{"k":"v"}');"#
    );
}

#[test]
fn test_empty_list_is_an_error() {
    let q = users().must(Where::field("id").is_in(Vec::<i64>::new()).unwrap());
    let err = q.to_sql().unwrap_err();
    assert!(matches!(
        err,
        UqlError::EmptyList { ref operator, ref field } if operator == "in" && field == "id"
    ));
}

#[test]
fn test_output_is_deterministic() {
    let q = users()
        .select(["id", "name"])
        .must(Where::field("tags").array_overlap(["a", "b"]).unwrap())
        .must(Condition::new("score", Operator::Lte, Value::from(9.5)).unwrap().into())
        .order_by(OrderBy::asc("id"))
        .limit(3);
    let first = q.to_sql().unwrap();
    for _ in 0..5 {
        assert_eq!(q.to_sql().unwrap(), first);
    }
}
