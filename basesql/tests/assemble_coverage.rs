//! Behaviour coverage for clause assembly across dialects.

use basesql::{
    DatabaseType, Error, FilterCondition, Identifier, QueryDefinition, QueryOverrides,
    QueryRequest, SearchColumnType, SearchOperator, SortDir, SqlEngine, Value,
};
use indexmap::IndexMap;

fn engine(db: DatabaseType) -> SqlEngine {
    SqlEngine::new(db)
}

fn users() -> QueryRequest {
    QueryRequest::new("SELECT * FROM users")
}

// =============================================================================
// WHERE COMPOSITION
// =============================================================================

mod where_tests {
    use super::*;

    #[test]
    fn test_filter_and_search_groups() {
        let request = users()
            .filter("status", FilterCondition::eq("A"))
            .search_column("name", SearchOperator::Cont, SearchColumnType::String)
            .search("foo")
            .unpaginated();

        let query = engine(DatabaseType::Postgres).assemble(&request).unwrap();

        assert_eq!(
            query.statement,
            "SELECT * FROM users WHERE status = :status_eq AND (name LIKE :name_cont)"
        );
        let expected: IndexMap<String, Value> = IndexMap::from([
            ("status_eq".to_string(), Value::from("A")),
            ("name_cont".to_string(), Value::from("%foo%")),
        ]);
        assert_eq!(query.parameters, expected);
    }

    #[test]
    fn test_search_group_is_or_joined() {
        let request = users()
            .search_column("name", SearchOperator::Cont, SearchColumnType::String)
            .search_column("email", SearchOperator::Start, SearchColumnType::String)
            .search_column("age", SearchOperator::Eq, SearchColumnType::Number)
            .search("42")
            .unpaginated();

        let query = engine(DatabaseType::MySql).assemble(&request).unwrap();

        assert_eq!(
            query.statement,
            "SELECT * FROM users WHERE (name LIKE :name_cont OR email LIKE :email_start \
             OR age = :age_eq)"
        );
        assert_eq!(query.parameters["name_cont"], Value::from("%42%"));
        assert_eq!(query.parameters["email_start"], Value::from("42%"));
        assert_eq!(query.parameters["age_eq"], Value::Int(42));
    }

    #[test]
    fn test_filter_only() {
        let request = users()
            .filter("a", FilterCondition::eq(1))
            .filter("b", FilterCondition::new(SearchOperator::NotEq, 2))
            .unpaginated();

        let query = engine(DatabaseType::Postgres).assemble(&request).unwrap();
        assert_eq!(
            query.statement,
            "SELECT * FROM users WHERE a = :a_eq AND b <> :b_not_eq"
        );
    }

    #[test]
    fn test_multiple_conditions_on_one_field() {
        let request = users()
            .filter(
                "age",
                FilterCondition::new(SearchOperator::Gteq, 18).with_type(SearchColumnType::Number),
            )
            .filter(
                "age",
                FilterCondition::new(SearchOperator::Lt, 65).with_type(SearchColumnType::Number),
            )
            .unpaginated();

        let query = engine(DatabaseType::Postgres).assemble(&request).unwrap();
        assert_eq!(
            query.statement,
            "SELECT * FROM users WHERE age >= :age_gteq AND age < :age_lt"
        );
        assert_eq!(query.parameters.len(), 2);
    }

    #[test]
    fn test_base_statement_with_where() {
        let request = QueryRequest::new("SELECT * FROM users WHERE tenant_id = :tenant")
            .param("tenant", 7)
            .filter("status", FilterCondition::eq("A"))
            .unpaginated();

        let query = engine(DatabaseType::Postgres).assemble(&request).unwrap();
        assert_eq!(
            query.statement,
            "SELECT * FROM users WHERE tenant_id = :tenant AND status = :status_eq"
        );
        assert_eq!(query.parameters["tenant"], Value::Int(7));
    }

    #[test]
    fn test_where_inside_subquery_is_not_top_level() {
        let request =
            QueryRequest::new("SELECT * FROM (SELECT * FROM users WHERE active = 1) u")
                .filter("u.status", FilterCondition::eq("A"))
                .unpaginated();

        let query = engine(DatabaseType::MySql).assemble(&request).unwrap();
        assert_eq!(
            query.statement,
            "SELECT * FROM (SELECT * FROM users WHERE active = 1) u WHERE u.status = :u_status_eq"
        );
    }

    #[test]
    fn test_empty_search_term_omits_group() {
        let request = users()
            .filter("status", FilterCondition::eq("A"))
            .search_column("name", SearchOperator::Cont, SearchColumnType::String)
            .search("")
            .unpaginated();

        let query = engine(DatabaseType::Postgres).assemble(&request).unwrap();
        assert_eq!(query.statement, "SELECT * FROM users WHERE status = :status_eq");
        assert!(!query.parameters.contains_key("name_cont"));
    }

    #[test]
    fn test_control_characters_in_statement() {
        let request = QueryRequest::new("SELECT *\nFROM users\r\n\tWHERE active = 1\n").unpaginated();
        let query = engine(DatabaseType::Postgres).assemble(&request).unwrap();
        assert_eq!(query.statement, "SELECT * FROM users   WHERE active = 1");
    }
}

// =============================================================================
// OPERATOR BINDINGS
// =============================================================================

mod binding_tests {
    use super::*;

    #[test]
    fn test_null_family_never_binds() {
        let mut request = users().unpaginated();
        for (i, op) in [
            SearchOperator::Null,
            SearchOperator::NotNull,
            SearchOperator::Blank,
            SearchOperator::Empty,
            SearchOperator::NotEmpty,
            SearchOperator::Present,
        ]
        .into_iter()
        .enumerate()
        {
            request = request
                .filter(format!("c{i}"), FilterCondition::check(op))
                .filter(format!("c{i}"), FilterCondition::new(op, "ignored"));
        }

        let query = engine(DatabaseType::MsSql).assemble(&request).unwrap();
        assert!(query.parameters.is_empty());
        assert!(query.statement.contains("c0 IS NULL AND c0 IS NULL"));
        assert!(
            query
                .statement
                .contains("(c5 IS NOT NULL OR c5 <> ' ')")
        );
    }

    #[test]
    fn test_search_term_keeps_leading_number() {
        let request = users()
            .search_column("age", SearchOperator::Eq, SearchColumnType::Number)
            .search_column("price", SearchOperator::Eq, SearchColumnType::Float)
            .search("25 years")
            .unpaginated();
        let query = engine(DatabaseType::MySql).assemble(&request).unwrap();
        assert_eq!(query.parameters["age_eq"], Value::Int(25));
        assert_eq!(query.parameters["price_eq"], Value::Float(25.0));

        let request = users()
            .search_column("price", SearchOperator::Eq, SearchColumnType::Float)
            .search("9.5kg")
            .unpaginated();
        let query = engine(DatabaseType::MySql).assemble(&request).unwrap();
        assert_eq!(query.parameters["price_eq"], Value::Float(9.5));

        let request = users()
            .search_column("age", SearchOperator::Eq, SearchColumnType::Number)
            .search("abc")
            .unpaginated();
        let query = engine(DatabaseType::MySql).assemble(&request).unwrap();
        assert_eq!(query.parameters["age_eq"], Value::Int(0));
    }

    #[test]
    fn test_in_operator_binds_sequence() {
        let request = users()
            .filter("status", FilterCondition::new(SearchOperator::In, "A,B"))
            .filter(
                "id",
                FilterCondition::new(SearchOperator::NotIn, vec![1i64, 2, 3])
                    .with_type(SearchColumnType::Number),
            )
            .unpaginated();

        let query = engine(DatabaseType::Postgres).assemble(&request).unwrap();
        assert_eq!(
            query.statement,
            "SELECT * FROM users WHERE status IN (:status_in) AND NOT (id IN (:id_not_in))"
        );
        assert_eq!(query.parameters["status_in"], Value::from(vec!["A", "B"]));
        assert_eq!(query.parameters["id_not_in"], Value::from(vec![1i64, 2, 3]));
    }

    #[test]
    fn test_boolean_shorthands() {
        let request = users()
            .filter("active", FilterCondition::check(SearchOperator::True))
            .filter("banned", FilterCondition::check(SearchOperator::False))
            .unpaginated();

        let query = engine(DatabaseType::MySql).assemble(&request).unwrap();
        assert_eq!(
            query.statement,
            "SELECT * FROM users WHERE active = :active_true AND banned = :banned_false"
        );
        assert_eq!(query.parameters["active_true"], Value::Bool(true));
        assert_eq!(query.parameters["banned_false"], Value::Bool(false));
    }

    #[test]
    fn test_negated_case_insensitive_match() {
        let request = users()
            .filter("name", FilterCondition::new(SearchOperator::NotICont, "bot"))
            .unpaginated();

        let pg = engine(DatabaseType::Postgres).assemble(&request).unwrap();
        assert_eq!(
            pg.statement,
            "SELECT * FROM users WHERE NOT (name ILIKE :name_not_i_cont)"
        );
        assert_eq!(pg.parameters["name_not_i_cont"], Value::from("%bot%"));

        let my = engine(DatabaseType::MySql).assemble(&request).unwrap();
        assert_eq!(
            my.statement,
            "SELECT * FROM users WHERE NOT (LOWER(name) LIKE LOWER(:name_not_i_cont))"
        );
    }

    #[test]
    fn test_dotted_column_parameter_names() {
        let request = users()
            .filter(
                "u.created_at",
                FilterCondition::new(SearchOperator::Gteq, "2024-01-01")
                    .with_type(SearchColumnType::Date),
            )
            .unpaginated();

        let query = engine(DatabaseType::Postgres).assemble(&request).unwrap();
        assert_eq!(
            query.statement,
            "SELECT * FROM users WHERE u.created_at >= :u_created_at_gteq"
        );
        assert_eq!(
            query.parameters["u_created_at_gteq"],
            Value::from("2024-01-01")
        );
    }

    #[test]
    fn test_lenient_numeric_coercion() {
        let request = users()
            .filter(
                "age",
                FilterCondition::eq("not a number").with_type(SearchColumnType::Number),
            )
            .filter(
                "score",
                FilterCondition::new(SearchOperator::Gt, "x").with_type(SearchColumnType::Float),
            )
            .unpaginated();

        let query = engine(DatabaseType::Postgres).assemble(&request).unwrap();
        assert_eq!(query.parameters["age_eq"], Value::Int(0));
        assert_eq!(query.parameters["score_gt"], Value::Float(0.0));
    }
}

// =============================================================================
// GROUP / ORDER / PAGINATION / COUNT
// =============================================================================

mod clause_tests {
    use super::*;

    #[test]
    fn test_full_statement_and_count() {
        let request = QueryRequest::new("SELECT status, COUNT(*) AS n FROM users")
            .filter("active", FilterCondition::eq(1))
            .group_by("status")
            .order_by("n", SortDir::Desc)
            .order_by("status", SortDir::Asc)
            .paginate(2, 50);

        let query = engine(DatabaseType::Postgres).assemble(&request).unwrap();
        assert_eq!(
            query.statement,
            "SELECT status, COUNT(*) AS n FROM users WHERE active = :active_eq \
             GROUP BY status ORDER BY n DESC, status ASC LIMIT 50 OFFSET 50"
        );
        assert_eq!(
            query.count_statement,
            "SELECT COUNT(*) TOTALROWS FROM (SELECT status, COUNT(*) AS n FROM users \
             WHERE active = :active_eq GROUP BY status) TABCOUNT"
        );
    }

    #[test]
    fn test_mssql_pagination() {
        let request = users().order_by("id", SortDir::Asc).paginate(2, 50);
        let query = engine(DatabaseType::MsSql).assemble(&request).unwrap();
        assert_eq!(
            query.statement,
            "SELECT * FROM users ORDER BY id ASC OFFSET 50 ROWS FETCH NEXT 50 ROWS ONLY"
        );
        assert_eq!(
            query.count_statement,
            "SELECT COUNT(*) TOTALROWS FROM (SELECT * FROM users) TABCOUNT"
        );
    }

    #[test]
    fn test_zero_page_or_size_disables_pagination() {
        for db in [DatabaseType::MySql, DatabaseType::Postgres, DatabaseType::MsSql] {
            for (page, per_page) in [(0, 50), (3, 0)] {
                let query = engine(db)
                    .assemble(&users().paginate(page, per_page))
                    .unwrap();
                assert_eq!(query.statement, "SELECT * FROM users");

                let meta = query.metadata(999);
                assert_eq!(
                    (meta.page, meta.per_page, meta.total_pages, meta.total_rows),
                    (0, 0, 1, 999)
                );
            }
        }
    }

    #[test]
    fn test_default_paging() {
        let query = engine(DatabaseType::MySql).assemble(&users()).unwrap();
        assert_eq!(query.statement, "SELECT * FROM users LIMIT 50 OFFSET 0");
        assert_eq!((query.page, query.per_page), (1, 50));
    }

    #[test]
    fn test_engine_metadata() {
        let meta = engine(DatabaseType::Postgres).metadata(2, 50, 125);
        assert_eq!(meta.total_pages, 3);
        assert_eq!(meta.total_rows, 125);
    }
}

// =============================================================================
// IDENTIFIER SHORTHAND
// =============================================================================

mod identifier_tests {
    use super::*;

    fn composite(pairs: &[(&str, i64)]) -> Identifier {
        let fields: IndexMap<String, Value> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), Value::Int(*v)))
            .collect();
        Identifier::from(fields)
    }

    #[test]
    fn test_composite_key_lookup() {
        let request = users()
            .primary_key(["a", "b"])
            .search_column("name", SearchOperator::Cont, SearchColumnType::String)
            .search("foo")
            .paginate(4, 10)
            .id(composite(&[("a", 1), ("b", 2)]));

        let query = engine(DatabaseType::Postgres).assemble(&request).unwrap();
        assert_eq!(
            query.statement,
            "SELECT * FROM users WHERE a = :a_eq AND b = :b_eq"
        );
        assert_eq!(query.parameters["a_eq"], Value::Int(1));
        assert_eq!(query.parameters["b_eq"], Value::Int(2));
        assert_eq!((query.page, query.per_page), (0, 0));
    }

    #[test]
    fn test_partial_composite_key_is_an_error() {
        let request = users().primary_key(["a", "b"]).id(composite(&[("a", 1)]));
        let err = engine(DatabaseType::Postgres).assemble(&request).unwrap_err();
        assert!(matches!(
            err,
            Error::PrimaryKeyMismatch {
                expected: 2,
                actual: 1
            }
        ));
    }

    #[test]
    fn test_identifier_replaces_filters() {
        let request = users()
            .filter("status", FilterCondition::eq("A"))
            .id("abc");

        let query = engine(DatabaseType::MySql).assemble(&request).unwrap();
        assert_eq!(query.statement, "SELECT * FROM users WHERE id = :id_eq");
        assert!(!query.parameters.contains_key("status_eq"));
        assert_eq!(query.parameters["id_eq"], Value::from("abc"));
    }

    #[test]
    fn test_blank_identifier_is_ignored() {
        let request = users().filter("status", FilterCondition::eq("A")).id("");
        let query = engine(DatabaseType::MySql).assemble(&request).unwrap();
        assert_eq!(
            query.statement,
            "SELECT * FROM users WHERE status = :status_eq LIMIT 50 OFFSET 0"
        );
    }

    #[test]
    fn test_zero_identifier_is_a_real_id() {
        let query = engine(DatabaseType::Postgres)
            .assemble(&users().id(0i64))
            .unwrap();
        assert_eq!(query.statement, "SELECT * FROM users WHERE id = :id_eq");
        assert_eq!(query.parameters["id_eq"], Value::Int(0));
    }

    #[test]
    fn test_identifier_without_primary_key_keeps_request() {
        let request = users()
            .primary_key(Vec::<String>::new())
            .filter("status", FilterCondition::eq("A"))
            .id(composite(&[("a", 1)]));

        let query = engine(DatabaseType::Postgres).assemble(&request).unwrap();
        assert_eq!(
            query.statement,
            "SELECT * FROM users WHERE status = :status_eq LIMIT 50 OFFSET 0"
        );
        assert!(!query.parameters.contains_key("a_eq"));
        assert_eq!((query.page, query.per_page), (1, 50));
    }
}

// =============================================================================
// DEFINITIONS AND OVERRIDES
// =============================================================================

mod definition_tests {
    use super::*;

    #[test]
    fn test_assemble_with_overrides() {
        let definition = QueryDefinition::new("SELECT * FROM users")
            .search_column("name", SearchOperator::ICont, SearchColumnType::String)
            .order_by("name", SortDir::Asc)
            .per_page(20);

        let overrides: QueryOverrides = serde_json::from_str(
            r#"{
                "searchTerm": "ana",
                "filter": {"status": {"op": "in", "value": ["A", "B"]}},
                "page": 2
            }"#,
        )
        .unwrap();

        let query = engine(DatabaseType::Postgres)
            .assemble_with(&definition, overrides)
            .unwrap();

        assert_eq!(
            query.statement,
            "SELECT * FROM users WHERE status IN (:status_in) AND (name ILIKE :name_i_cont) \
             ORDER BY name ASC LIMIT 20 OFFSET 20"
        );
        assert_eq!(query.parameters["name_i_cont"], Value::from("%ana%"));
    }

    #[test]
    fn test_unknown_operator_in_payload_is_rejected() {
        let result: Result<QueryOverrides, _> =
            serde_json::from_str(r#"{"filter": {"status": {"op": "between", "value": 1}}}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_unsupported_dialect_tag() {
        let err = SqlEngine::from_tag("oracle").unwrap_err();
        assert!(matches!(err, Error::UnsupportedDatabase(ref tag) if tag == "oracle"));
        assert_eq!(err.to_string(), "Not supported database 'oracle'");
    }
}
