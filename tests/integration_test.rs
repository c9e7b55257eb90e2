use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashSet;
use std::sync::Arc;
use vibefilter::catalog::{InMemoryCatalog, InMemoryListStore};
use vibefilter::query::parser::MAX_NESTING_DEPTH;
use vibefilter::{
    cast, parse_between, FilterConfig, FilterError, FilterRequest, FilterSession, LogicalType,
    Table, Value,
};

const USER: &str = "u1";
const DATASET: &str = "people";

fn session_with(table: Table, lists: InMemoryListStore) -> FilterSession {
    let catalog = Arc::new(InMemoryCatalog::new());
    catalog.register(DATASET, table);
    FilterSession::in_memory(catalog, Arc::new(lists), FilterConfig::default())
}

fn people() -> Table {
    Table::from_json_str(
        r#"[{"age": 25, "city": "NYC"}, {"age": 31, "city": "LA"}, {"age": 17, "city": "SF"}]"#,
    )
    .unwrap()
}

/// Random ages in 0..60, roughly one in ten missing
fn random_ages(rng: &mut StdRng, rows: usize) -> Table {
    let mut table = Table::new(["id", "age"]).unwrap();
    for id in 0..rows {
        let age = if rng.gen_bool(0.1) {
            Value::Null
        } else {
            Value::Integer(rng.gen_range(0..60))
        };
        table.push_row(vec![Value::Integer(id as i64), age]).unwrap();
    }
    table
}

async fn matching_ids(session: &FilterSession, query: &str) -> HashSet<usize> {
    let request = FilterRequest::new(USER, DATASET, query).with_page(0, 1000);
    let result = session.filter(&request).await.unwrap();
    assert!(!result.has_more);
    result.row_indices.into_iter().collect()
}

#[tokio::test]
async fn test_end_to_end_example() {
    let session = session_with(people(), InMemoryListStore::new());
    let request = FilterRequest::new(USER, DATASET, "(#{age} >= {18} and #{city} in {['NYC','LA']})");

    let result = session.filter(&request).await.unwrap();
    assert_eq!(result.row_indices, vec![0, 1]);
    assert_eq!(result.total_count, 2);
    assert_eq!(
        result.records()[1]["city"],
        serde_json::Value::String("LA".to_string())
    );
}

#[tokio::test]
async fn test_between_and_not_between_are_complements() {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    let table = random_ages(&mut rng, 300);
    let rows = table.len();
    let session = session_with(table, InMemoryListStore::new());

    let inside = matching_ids(&session, "#{age} between {18,30}").await;
    let outside = matching_ids(&session, "#{age} notBetween {18,30}").await;

    assert!(inside.is_disjoint(&outside));
    assert_eq!(inside.len() + outside.len(), rows);
}

#[tokio::test]
async fn test_in_ignores_quoting_style() {
    let session = session_with(people(), InMemoryListStore::new());

    let expected: HashSet<usize> = [0, 1].into_iter().collect();
    for query in [
        "#{city} in {['NYC','LA']}",
        r#"#{city} in {["NYC", "LA"]}"#,
        "#{city} in {(NYC, LA)}",
        "#{city} in {['NYC', \"LA\"]}",
    ] {
        assert_eq!(matching_ids(&session, query).await, expected, "{}", query);
    }

    let rest = matching_ids(&session, "#{city} not in {['NYC','LA']}").await;
    assert_eq!(rest, [2].into_iter().collect());
}

#[tokio::test]
async fn test_pagination_partitions_matches() {
    let mut rng = StdRng::seed_from_u64(42);
    let session = session_with(random_ages(&mut rng, 137), InMemoryListStore::new());
    let query = "#{age} >= {10}";

    let mut seen = Vec::new();
    let mut offset = 0;
    loop {
        let request = FilterRequest::new(USER, DATASET, query).with_page(offset, 10);
        let page = session.filter(&request).await.unwrap();
        assert!(page.page.len() <= 10);
        seen.extend(page.row_indices.iter().copied());
        offset += 10;
        if !page.has_more {
            assert_eq!(seen.len(), page.total_count);
            break;
        }
        assert_eq!(page.page.len(), 10);
    }

    let all = matching_ids(&session, query).await;
    let mut expected: Vec<usize> = all.into_iter().collect();
    expected.sort_unstable();
    assert_eq!(seen, expected);
}

#[tokio::test]
async fn test_user_lists() {
    let lists = InMemoryListStore::new();
    lists.insert(
        USER,
        "coasts",
        vec![Value::String("NYC".into()), Value::String("SF".into())],
    );
    let session = session_with(people(), lists);

    assert_eq!(
        matching_ids(&session, "#{city} inUserList {coasts}").await,
        [0, 2].into_iter().collect()
    );
    assert_eq!(
        matching_ids(&session, "#{city} notInUserList {'coasts'}").await,
        [1].into_iter().collect()
    );

    let request = FilterRequest::new(USER, DATASET, "#{city} inUserList {inland}");
    assert_eq!(
        session.filter(&request).await.unwrap_err(),
        FilterError::ListNotFound {
            user_id: USER.to_string(),
            list_name: "inland".to_string(),
        }
    );
}

#[tokio::test]
async fn test_nested_groups_and_precedence() {
    let session = session_with(people(), InMemoryListStore::new());

    // `and` binds tighter than `or`
    assert_eq!(
        matching_ids(&session, "#{city} = {SF} or #{age} > {30} and #{city} = {NYC}").await,
        [2].into_iter().collect()
    );
    assert_eq!(
        matching_ids(&session, "((#{city} = {SF} or #{age} > {30})) and #{city} != {NYC}").await,
        [1, 2].into_iter().collect()
    );
}

#[tokio::test]
async fn test_compile_errors() {
    let session = session_with(people(), InMemoryListStore::new());

    let err = session.compile(USER, DATASET, "#{age} >= {18} and #{city}").await.unwrap_err();
    assert!(matches!(err, FilterError::QuerySyntax { offset: 19, .. }), "{:?}", err);

    let err = session.compile(USER, DATASET, "#{height} > {2}").await.unwrap_err();
    assert_eq!(
        err,
        FilterError::UnknownColumn {
            column: "height".to_string(),
            offset: 0
        }
    );

    let err = session.compile(USER, DATASET, "#{age} contains {1}").await.unwrap_err();
    assert!(matches!(err, FilterError::UnsupportedOperatorForType { .. }));

    let err = session.compile(USER, DATASET, "#{age} between {12}").await.unwrap_err();
    assert!(matches!(err, FilterError::InvalidBetweenValueCount { count: 1, .. }));
}

#[tokio::test]
async fn test_long_chains_evaluate() {
    let session = session_with(people(), InMemoryListStore::new());

    let query = vec!["#{city} = {SF}"; 3000].join(" or ");
    assert_eq!(session.count(USER, DATASET, &query).await.unwrap(), 1);

    let query = vec!["#{age} > {0} and #{city} != {NYC}"; 1500].join(" or ");
    assert_eq!(
        matching_ids(&session, &query).await,
        [1, 2].into_iter().collect()
    );

    let query = vec!["#{age} notNull"; 3000].join(" and ");
    assert_eq!(session.count(USER, DATASET, &query).await.unwrap(), 3);
}

#[tokio::test]
async fn test_deep_nesting_is_a_syntax_error() {
    let session = session_with(people(), InMemoryListStore::new());
    let nested = |depth: usize| {
        format!(
            "{}#{{city}} = {{SF}}{}",
            "(".repeat(depth),
            ")".repeat(depth)
        )
    };

    assert_eq!(
        session
            .count(USER, DATASET, &nested(MAX_NESTING_DEPTH))
            .await
            .unwrap(),
        1
    );

    let request = FilterRequest::new(USER, DATASET, nested(500));
    assert_eq!(
        session.filter(&request).await.unwrap_err(),
        FilterError::QuerySyntax {
            offset: MAX_NESTING_DEPTH,
            message: "nesting too deep".to_string(),
        }
    );
}

#[tokio::test]
async fn test_braces_inside_quoted_literals() {
    let table = Table::from_json_str(r#"[{"s": "a}b"}, {"s": "x"}, {"s": "c"}]"#).unwrap();
    let session = session_with(table, InMemoryListStore::new());

    assert_eq!(
        matching_ids(&session, "#{s} = {'a}b'}").await,
        [0].into_iter().collect()
    );
    assert_eq!(
        matching_ids(&session, "#{s} in {'a}b', x}").await,
        [0, 1].into_iter().collect()
    );
}

#[tokio::test]
async fn test_between_count_checked_before_list_lookup() {
    let session = session_with(people(), InMemoryListStore::new());
    let err = session
        .compile(USER, DATASET, "#{city} inUserList {missing} and #{age} between {1}")
        .await
        .unwrap_err();
    assert!(matches!(err, FilterError::InvalidBetweenValueCount { count: 1, .. }));
}

#[test]
fn test_cast_and_between_contracts() {
    assert_eq!(cast("42", LogicalType::Integer), Value::Integer(42));
    assert_eq!(cast("abc", LogicalType::Integer), Value::String("abc".to_string()));

    assert_eq!(
        parse_between("12,14", LogicalType::Integer).unwrap(),
        (Value::Integer(12), Value::Integer(14))
    );
    assert!(matches!(
        parse_between("12", LogicalType::Integer),
        Err(FilterError::InvalidBetweenValueCount { .. })
    ));
}
