//! Snapshot tests for assembled statements.
//!
//! These tests use insta inline snapshots to capture the generated SQL per
//! dialect and detect unexpected changes in query output.
//!
//! Update snapshots: cargo insta review

use basesql::{
    DatabaseType, FilterCondition, ParameterStyle, QueryRequest, SearchColumnType,
    SearchOperator, SortDir, SqlEngine, convert_parameter_style,
};
use insta::assert_snapshot;

fn listing() -> QueryRequest {
    QueryRequest::new("SELECT u.id, u.name, u.email FROM users u")
        .filter("u.status", FilterCondition::new(SearchOperator::In, "active,pending"))
        .filter("u.deleted_at", FilterCondition::check(SearchOperator::Null))
        .search_column("u.name", SearchOperator::ICont, SearchColumnType::String)
        .search_column("u.email", SearchOperator::Start, SearchColumnType::String)
        .search("ann")
        .order_by("u.name", SortDir::Asc)
        .paginate(3, 25)
}

fn assemble(db: DatabaseType, request: &QueryRequest) -> basesql::AssembledQuery {
    SqlEngine::new(db).assemble(request).unwrap()
}

// =============================================================================
// Listing Snapshots
// =============================================================================

#[test]
fn snapshot_listing_postgres() {
    let query = assemble(DatabaseType::Postgres, &listing());
    assert_snapshot!(query.statement, @"SELECT u.id, u.name, u.email FROM users u WHERE u.status IN (:u_status_in) AND u.deleted_at IS NULL AND (u.name ILIKE :u_name_i_cont OR u.email LIKE :u_email_start) ORDER BY u.name ASC LIMIT 25 OFFSET 50");
}

#[test]
fn snapshot_listing_mysql() {
    let query = assemble(DatabaseType::MySql, &listing());
    assert_snapshot!(query.statement, @"SELECT u.id, u.name, u.email FROM users u WHERE u.status IN (:u_status_in) AND u.deleted_at IS NULL AND (LOWER(u.name) LIKE LOWER(:u_name_i_cont) OR u.email LIKE :u_email_start) ORDER BY u.name ASC LIMIT 25 OFFSET 50");
}

#[test]
fn snapshot_listing_mssql() {
    let query = assemble(DatabaseType::MsSql, &listing());
    assert_snapshot!(query.statement, @"SELECT u.id, u.name, u.email FROM users u WHERE u.status IN (:u_status_in) AND u.deleted_at IS NULL AND (u.name COLLATE Latin1_General_CI_AI LIKE :u_name_i_cont OR u.email LIKE :u_email_start) ORDER BY u.name ASC OFFSET 50 ROWS FETCH NEXT 25 ROWS ONLY");
}

#[test]
fn snapshot_listing_count() {
    let query = assemble(DatabaseType::Postgres, &listing());
    assert_snapshot!(query.count_statement, @"SELECT COUNT(*) TOTALROWS FROM (SELECT u.id, u.name, u.email FROM users u WHERE u.status IN (:u_status_in) AND u.deleted_at IS NULL AND (u.name ILIKE :u_name_i_cont OR u.email LIKE :u_email_start)) TABCOUNT");
}

// =============================================================================
// Grouping Snapshots
// =============================================================================

#[test]
fn snapshot_grouped_report() {
    let request = QueryRequest::new("SELECT o.status, SUM(o.total) AS revenue FROM orders o WHERE o.tenant_id = :tenant")
        .param("tenant", 4)
        .filter(
            "o.created_at",
            FilterCondition::new(SearchOperator::Gteq, "2024-01-01").with_type(SearchColumnType::Date),
        )
        .filter(
            "o.created_at",
            FilterCondition::new(SearchOperator::Lt, "2025-01-01").with_type(SearchColumnType::Date),
        )
        .group_by("o.status")
        .order_by("revenue", SortDir::Desc)
        .unpaginated();

    let query = assemble(DatabaseType::MySql, &request);
    assert_snapshot!(query.statement, @"SELECT o.status, SUM(o.total) AS revenue FROM orders o WHERE o.tenant_id = :tenant AND o.created_at >= :o_created_at_gteq AND o.created_at < :o_created_at_lt GROUP BY o.status ORDER BY revenue DESC");
    assert_snapshot!(query.count_statement, @"SELECT COUNT(*) TOTALROWS FROM (SELECT o.status, SUM(o.total) AS revenue FROM orders o WHERE o.tenant_id = :tenant AND o.created_at >= :o_created_at_gteq AND o.created_at < :o_created_at_lt GROUP BY o.status) TABCOUNT");
}

// =============================================================================
// Parameter Style Snapshots
// =============================================================================

#[test]
fn snapshot_listing_positional() {
    let query = assemble(DatabaseType::Postgres, &listing());
    let converted =
        convert_parameter_style(&query.statement, &query.parameters, ParameterStyle::Positional)
            .unwrap();
    assert_snapshot!(converted.sql, @"SELECT u.id, u.name, u.email FROM users u WHERE u.status IN ($1) AND u.deleted_at IS NULL AND (u.name ILIKE $2 OR u.email LIKE $3) ORDER BY u.name ASC LIMIT 25 OFFSET 50");
}

#[test]
fn snapshot_listing_question() {
    let query = assemble(DatabaseType::MySql, &listing());
    let converted =
        convert_parameter_style(&query.count_statement, &query.parameters, ParameterStyle::Question)
            .unwrap();
    assert_snapshot!(converted.sql, @"SELECT COUNT(*) TOTALROWS FROM (SELECT u.id, u.name, u.email FROM users u WHERE u.status IN (?) AND u.deleted_at IS NULL AND (LOWER(u.name) LIKE LOWER(?) OR u.email LIKE ?)) TABCOUNT");
}
