use resumatch_core::db::open_db_in_memory;
use resumatch_core::{
    CallContext, CancelToken, Employment, ErrorKind, Experience, NoopObserver, SearchCriteria,
    SearchLimits, VacancySearch, VacancySearchRequest, VacancySearchService, VacancySummary,
};
use rusqlite::Connection;
use std::sync::Arc;

fn seeded() -> Connection {
    let conn = open_db_in_memory().unwrap();
    conn.execute_batch(
        "INSERT INTO employer (id, company_name) VALUES (1, 'Acme'), (2, 'Gopher Labs');
         INSERT INTO specialization (id, name) VALUES (1, 'Backend'), (2, 'Data');
         INSERT INTO vacancy
             (id, employer_id, specialization_id, title, employment, experience,
              salary_from, salary_to, created_at, updated_at)
         VALUES
             (1, 1, 1, 'Go developer', 'full_time', '1_3_years', 150000, 200000, 1000, 1000),
             (2, 2, 2, 'Data analyst', 'part_time', 'no_experience', 80000, NULL, 2000, 2000),
             (3, 1, NULL, 'Python engineer', 'contract', '3_6_years', NULL, NULL, 3000, 3000),
             (4, 1, 1, 'Rust developer', 'full_time', '6_plus_years', 300000, 350000, 3000, 3000);",
    )
    .unwrap();
    conn
}

fn search(conn: &Connection, criteria: SearchCriteria) -> Vec<VacancySummary> {
    VacancySearch::new(conn)
        .search(&CallContext::new(), &criteria)
        .unwrap()
}

fn ids(summaries: &[VacancySummary]) -> Vec<i64> {
    summaries.iter().map(|summary| summary.id).collect()
}

#[test]
fn empty_criteria_returns_everything_newest_first() {
    let conn = seeded();

    let found = search(&conn, SearchCriteria::default());

    assert_eq!(ids(&found), vec![4, 3, 2, 1]);
}

#[test]
fn free_text_matches_title_and_company_case_insensitively() {
    let conn = seeded();

    let found = search(
        &conn,
        SearchCriteria {
            free_text: Some("go".to_string()),
            ..SearchCriteria::default()
        },
    );

    assert_eq!(ids(&found), vec![2, 1]);
}

#[test]
fn free_text_matches_cyrillic_case_insensitively() {
    let conn = seeded();
    conn.execute_batch(
        "INSERT INTO employer (id, company_name) VALUES (3, 'Яндекс');
         INSERT INTO specialization (id, name) VALUES (3, 'Бэкенд');
         INSERT INTO vacancy (id, employer_id, specialization_id, title, employment, experience, updated_at)
         VALUES (5, 3, 3, 'Разработчик Go', 'full_time', '1_3_years', 4000);",
    )
    .unwrap();

    for query in ["Разработчик", "разработчик", "РАЗРАБОТЧИК", "яндекс", "бэкенд"] {
        let found = search(
            &conn,
            SearchCriteria {
                free_text: Some(query.to_string()),
                ..SearchCriteria::default()
            },
        );
        assert_eq!(ids(&found), vec![5], "query {query}");
    }
}

#[test]
fn free_text_matches_specialization_name() {
    let conn = seeded();

    let found = search(
        &conn,
        SearchCriteria {
            free_text: Some("BACKEND".to_string()),
            ..SearchCriteria::default()
        },
    );

    assert_eq!(ids(&found), vec![4, 1]);
}

#[test]
fn wildcard_characters_match_literally() {
    let conn = seeded();

    let found = search(
        &conn,
        SearchCriteria {
            free_text: Some("%".to_string()),
            ..SearchCriteria::default()
        },
    );

    assert!(found.is_empty());
}

#[test]
fn salary_floor_excludes_missing_and_lower_salaries() {
    let conn = seeded();

    let found = search(
        &conn,
        SearchCriteria {
            min_value: Some(100_000),
            ..SearchCriteria::default()
        },
    );

    assert_eq!(ids(&found), vec![4, 1]);
}

#[test]
fn pagination_returns_second_record() {
    let conn = seeded();

    let found = search(
        &conn,
        SearchCriteria {
            limit: 1,
            offset: 1,
            ..SearchCriteria::default()
        },
    );

    assert_eq!(ids(&found), vec![3]);
}

#[test]
fn filters_combine_with_and() {
    let conn = seeded();

    let found = search(
        &conn,
        SearchCriteria {
            category_ids: Some(vec![1]),
            employment_types: Some(vec![Employment::FullTime]),
            experience_levels: Some(vec![Experience::OneToThreeYears, Experience::NoMatter]),
            ..SearchCriteria::default()
        },
    );

    assert_eq!(ids(&found), vec![1]);
    let summary = &found[0];
    assert_eq!(summary.company_name, "Acme");
    assert_eq!(summary.specialization.as_deref(), Some("Backend"));
    assert_eq!(summary.salary_from, Some(150_000));
    assert_eq!(summary.experience, Experience::OneToThreeYears);
}

#[test]
fn vacancy_without_specialization_is_returned() {
    let conn = seeded();

    let found = search(
        &conn,
        SearchCriteria {
            employment_types: Some(vec![Employment::Contract]),
            ..SearchCriteria::default()
        },
    );

    assert_eq!(ids(&found), vec![3]);
    assert_eq!(found[0].specialization, None);
    assert_eq!(found[0].salary_from, None);
}

#[test]
fn limits_apply_default_and_cap() {
    let conn = seeded();
    let limits = SearchLimits {
        default_limit: 2,
        max_limit: 3,
    };
    let search = VacancySearch::with_options(&conn, limits, Arc::new(NoopObserver));
    let ctx = CallContext::new();

    let page = search.search(&ctx, &SearchCriteria::default()).unwrap();
    assert_eq!(page.len(), 2);

    let capped = search
        .search(
            &ctx,
            &SearchCriteria {
                limit: 50,
                ..SearchCriteria::default()
            },
        )
        .unwrap();
    assert_eq!(capped.len(), 3);
}

#[test]
fn unmappable_row_fails_the_whole_search() {
    let conn = seeded();
    conn.execute_batch(
        "PRAGMA ignore_check_constraints = ON;
         INSERT INTO vacancy (id, employer_id, title, employment, experience, updated_at)
         VALUES (5, 1, 'Broken', 'remote', 'no_matter', 500);
         PRAGMA ignore_check_constraints = OFF;",
    )
    .unwrap();

    let err = VacancySearch::new(&conn)
        .search(&CallContext::new(), &SearchCriteria::default())
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Internal);
}

#[test]
fn cancelled_search_is_internal() {
    let conn = seeded();
    let token = CancelToken::new();
    token.cancel();

    let err = VacancySearch::new(&conn)
        .search(
            &CallContext::new().with_cancel_token(token),
            &SearchCriteria::default(),
        )
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Internal);
}

#[test]
fn service_resolves_specialization_names_without_creating_them() {
    let conn = seeded();
    let service = VacancySearchService::new(&conn);
    let ctx = CallContext::new();

    let found = service
        .search(
            &ctx,
            &VacancySearchRequest {
                specializations: vec!["Backend".to_string()],
                ..VacancySearchRequest::default()
            },
        )
        .unwrap();
    assert_eq!(ids(&found), vec![4, 1]);

    let none = service
        .search(
            &ctx,
            &VacancySearchRequest {
                specializations: vec!["Astronomy".to_string()],
                ..VacancySearchRequest::default()
            },
        )
        .unwrap();
    assert!(none.is_empty());

    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM specialization;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 2);
}

#[test]
fn service_parses_enum_filters_and_rejects_bad_input() {
    let conn = seeded();
    let service = VacancySearchService::new(&conn);
    let ctx = CallContext::new();

    let found = service
        .search(
            &ctx,
            &VacancySearchRequest {
                query: Some("developer".to_string()),
                employment: vec!["full_time".to_string()],
                experience: vec!["6_plus_years".to_string()],
                ..VacancySearchRequest::default()
            },
        )
        .unwrap();
    assert_eq!(ids(&found), vec![4]);

    let unknown = service
        .search(
            &ctx,
            &VacancySearchRequest {
                employment: vec!["remote".to_string()],
                ..VacancySearchRequest::default()
            },
        )
        .unwrap_err();
    assert_eq!(unknown.kind(), ErrorKind::BadRequest);

    let negative = service
        .search(
            &ctx,
            &VacancySearchRequest {
                min_salary: Some(-1),
                ..VacancySearchRequest::default()
            },
        )
        .unwrap_err();
    assert_eq!(negative.kind(), ErrorKind::BadRequest);
}
