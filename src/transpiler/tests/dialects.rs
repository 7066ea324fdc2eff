//! SQL dialect tests (MySQL, MariaDB, SQL Server, Oracle, PostgreSQL hooks).

use pretty_assertions::assert_eq;
use serde_json::json;

use crate::ast::builders::Where;
use crate::ast::{OrderBy, Query};
use crate::transpiler::{Dialect, ToSql};

fn users() -> Query {
    Query::new("users")
}

#[test]
fn test_mysql_dialect() {
    let q = users()
        .must(Where::field("active").eq(true).unwrap())
        .must(Where::field("path").eq(r"C:\tmp").unwrap());
    assert_eq!(
        q.to_sql_with_dialect(Dialect::MySQL).unwrap(),
        r"SELECT * FROM `users` WHERE (`active` = 1 AND `path` = 'C:\\tmp');"
    );
}

#[test]
fn test_mysql_like_doubles_the_escape_backslash() {
    let q = users().must(Where::field("name").contains("50%").unwrap());
    assert_eq!(
        q.to_sql_with_dialect(Dialect::MySQL).unwrap(),
        r"SELECT * FROM `users` WHERE (`name` LIKE '%50\\%%' ESCAPE '\\');"
    );
}

#[test]
fn test_mysql_pagination() {
    assert_eq!(
        users().limit(10).offset(20).to_sql_with_dialect(Dialect::MySQL).unwrap(),
        "SELECT * FROM `users` LIMIT 20, 10;"
    );
    assert_eq!(
        users().offset(5).to_sql_with_dialect(Dialect::MySQL).unwrap(),
        "SELECT * FROM `users` LIMIT 5, 18446744073709551615;"
    );
    assert_eq!(
        users().limit(3).to_sql_with_dialect(Dialect::MySQL).unwrap(),
        "SELECT * FROM `users` LIMIT 3;"
    );
}

#[test]
fn test_mysql_case_insensitive_and_regex() {
    let q = users()
        .must(Where::field("name").ilike("a%").unwrap())
        .must(Where::field("code").regex("^[A-Z]+$").unwrap());
    assert_eq!(
        q.to_sql_with_dialect(Dialect::MySQL).unwrap(),
        "SELECT * FROM `users` WHERE (LOWER(`name`) LIKE LOWER('a%') AND `code` REGEXP '^[A-Z]+$');"
    );
}

#[test]
fn test_mysql_json_arrays() {
    let q = users()
        .must(Where::field("tags").array_contains("x").unwrap())
        .must(Where::field("tags").array_overlap(["a", "b"]).unwrap())
        .must(Where::field("tags").array_contained(["a"]).unwrap());
    assert_eq!(
        q.to_sql_with_dialect(Dialect::MySQL).unwrap(),
        "SELECT * FROM `users` WHERE (JSON_CONTAINS(`tags`, JSON_ARRAY('x')) \
         AND JSON_OVERLAPS(`tags`, JSON_ARRAY('a', 'b')) \
         AND JSON_CONTAINS(JSON_ARRAY('a'), `tags`));"
    );
}

#[test]
fn test_mysql_geo() {
    let shape = json!({"type": "Point", "coordinates": [1, 2]});
    let q = Query::new("places").must(Where::field("loc").geo_within(shape).unwrap());
    assert_eq!(
        q.to_sql_with_dialect(Dialect::MySQL).unwrap(),
        r#"SELECT * FROM `places` WHERE (ST_Within(`loc`, ST_GeomFromGeoJSON('{"type":"Point","coordinates":[1,2]}')));"#
    );
}

#[test]
fn test_mariadb_matches_mysql_surface() {
    let q = users()
        .must(Where::field("tags").array_overlap(["a"]).unwrap())
        .limit(10)
        .offset(5);
    assert_eq!(
        q.to_sql_with_dialect(Dialect::MariaDB).unwrap(),
        "SELECT * FROM `users` WHERE (JSON_OVERLAPS(`tags`, JSON_ARRAY('a'))) LIMIT 5, 10;"
    );
    let (sql, params) = users()
        .must(Where::field("id").eq(7).unwrap())
        .to_sql_parameterized(Dialect::MariaDB)
        .unwrap();
    assert_eq!(sql, "SELECT * FROM `users` WHERE (`id` = ?);");
    assert_eq!(params, vec![json!(7)]);
}

#[test]
fn test_sqlserver_dialect() {
    assert_eq!(
        users().limit(10).offset(5).to_sql_with_dialect(Dialect::SqlServer).unwrap(),
        "SELECT * FROM [users] ORDER BY (SELECT NULL) OFFSET 5 ROWS FETCH NEXT 10 ROWS ONLY;"
    );
    assert_eq!(
        users()
            .order_by(OrderBy::asc("id"))
            .limit(10)
            .to_sql_with_dialect(Dialect::SqlServer)
            .unwrap(),
        "SELECT * FROM [users] ORDER BY [id] ASC OFFSET 0 ROWS FETCH NEXT 10 ROWS ONLY;"
    );
    assert_eq!(
        Query::new("dbo.users").select(["u.id"]).to_sql_with_dialect(Dialect::SqlServer).unwrap(),
        "SELECT [u].[id] FROM [dbo].[users];"
    );
}

#[test]
fn test_sqlserver_parameterized() {
    let q = users()
        .must(Where::field("active").eq(true).unwrap())
        .must(Where::field("age").between(18, 30).unwrap());
    let (sql, params) = q.to_sql_parameterized(Dialect::SqlServer).unwrap();
    assert_eq!(
        sql,
        "SELECT * FROM [users] WHERE ([active] = @p1 AND [age] BETWEEN @p2 AND @p3);"
    );
    assert_eq!(params, vec![json!(true), json!(18), json!(30)]);
}

#[test]
fn test_sqlserver_has_no_regex() {
    let q = users().must(Where::field("name").regex("^a").unwrap());
    let err = q.to_sql_with_dialect(Dialect::SqlServer).unwrap_err();
    assert!(err.is_unsupported());
    assert!(err.to_string().contains("SQL Server"));
}

#[test]
fn test_oracle_dialect() {
    assert_eq!(
        users().limit(10).to_sql_with_dialect(Dialect::Oracle).unwrap(),
        "SELECT * FROM \"users\" FETCH FIRST 10 ROWS ONLY;"
    );
    assert_eq!(
        users().limit(10).offset(5).to_sql_with_dialect(Dialect::Oracle).unwrap(),
        "SELECT * FROM \"users\" OFFSET 5 ROWS FETCH NEXT 10 ROWS ONLY;"
    );
    assert_eq!(
        users().offset(5).to_sql_with_dialect(Dialect::Oracle).unwrap(),
        "SELECT * FROM \"users\" OFFSET 5 ROWS;"
    );

    let q = users().must(Where::field("name").regex("^a").unwrap());
    assert_eq!(
        q.to_sql_with_dialect(Dialect::Oracle).unwrap(),
        "SELECT * FROM \"users\" WHERE (REGEXP_LIKE(\"name\", '^a'));"
    );
}

#[test]
fn test_oracle_positional_binds() {
    let q = users()
        .must(Where::field("a").eq(1).unwrap())
        .must(Where::field("b").eq("x").unwrap());
    let (sql, _) = q.to_sql_parameterized(Dialect::Oracle).unwrap();
    assert_eq!(sql, "SELECT * FROM \"users\" WHERE (\"a\" = :1 AND \"b\" = :2);");
}

#[test]
fn test_postgres_array_operators() {
    let q = users()
        .must(Where::field("tags").array_contains("x").unwrap())
        .must(Where::field("tags").array_overlap(["a", "b"]).unwrap())
        .must(Where::field("tags").array_contained(["a"]).unwrap());
    assert_eq!(
        q.to_sql().unwrap(),
        "SELECT * FROM \"users\" WHERE ('x' = ANY(\"tags\") AND \"tags\" && ARRAY['a', 'b'] \
         AND \"tags\" <@ ARRAY['a']);"
    );
}

#[test]
fn test_postgres_regex() {
    let q = users().must(Where::field("name").regex("^a.*z$").unwrap());
    assert_eq!(
        q.to_sql().unwrap(),
        "SELECT * FROM \"users\" WHERE (\"name\" ~ '^a.*z$');"
    );
}

#[test]
fn test_geo_is_unsupported_outside_mysql_family() {
    let shape = json!({"type": "Point", "coordinates": [0, 0]});
    let q = Query::new("places").must(Where::field("loc").geo_intersects(shape).unwrap());
    for dialect in [Dialect::Postgres, Dialect::SqlServer, Dialect::Oracle] {
        let err = q.to_sql_with_dialect(dialect).unwrap_err();
        assert!(err.is_unsupported(), "{dialect} should reject geo");
    }
    assert!(q.to_sql_with_dialect(Dialect::MariaDB).is_ok());
}

#[test]
fn test_arrays_unsupported_in_sqlserver_and_oracle() {
    let q = users().must(Where::field("tags").array_contains("x").unwrap());
    assert!(q.to_sql_with_dialect(Dialect::SqlServer).unwrap_err().is_unsupported());
    assert!(q.to_sql_with_dialect(Dialect::Oracle).unwrap_err().is_unsupported());
}

#[test]
fn test_every_dialect_handles_the_common_query() {
    let q = users()
        .select(["id"])
        .must(Where::field("age").gte(21).unwrap())
        .must_not(Where::field("state").eq("void").unwrap())
        .order_by(OrderBy::desc("id"))
        .limit(5);
    for dialect in Dialect::ALL {
        let sql = q.to_sql_with_dialect(dialect).unwrap();
        assert!(sql.starts_with("SELECT "), "{dialect}: {sql}");
        assert!(sql.ends_with(';'), "{dialect}: {sql}");
        assert!(sql.contains("NOT ("), "{dialect}: {sql}");
    }
}

#[test]
fn test_dialect_from_str() {
    assert_eq!("pg".parse::<Dialect>().unwrap(), Dialect::Postgres);
    assert_eq!("MSSQL".parse::<Dialect>().unwrap(), Dialect::SqlServer);
    assert_eq!("mariadb".parse::<Dialect>().unwrap(), Dialect::MariaDB);
    assert!("sqlite".parse::<Dialect>().is_err());
}

#[test]
fn test_every_dialect_quotes_each_name_segment() {
    let q = Query::new("app.sales.orders")
        .select(["sales.orders.total"])
        .must(Where::field("app.sales.orders.id").eq(7).unwrap());
    for dialect in Dialect::ALL {
        let (open, close) = match dialect {
            Dialect::Postgres | Dialect::Oracle => ("\"", "\""),
            Dialect::MySQL | Dialect::MariaDB => ("`", "`"),
            Dialect::SqlServer => ("[", "]"),
        };
        let q3 = |a: &str, b: &str, c: &str| {
            format!("{open}{a}{close}.{open}{b}{close}.{open}{c}{close}")
        };
        let sql = q.to_sql_with_dialect(dialect).unwrap();
        let expected_from = format!("FROM {}", q3("app", "sales", "orders"));
        let expected_select = format!("SELECT {}", q3("sales", "orders", "total"));
        let expected_where = format!("{}.{open}id{close} = 7", q3("app", "sales", "orders"));
        assert!(sql.starts_with(&expected_select), "{dialect}: {sql}");
        assert!(sql.contains(&expected_from), "{dialect}: {sql}");
        assert!(sql.contains(&expected_where), "{dialect}: {sql}");
    }
}
