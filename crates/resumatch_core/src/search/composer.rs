//! Builds the vacancy search statement from criteria.
//!
//! # Invariants
//! - Fragments appear in a fixed order: free text, specialization, salary
//!   floor, employment, experience.
//! - Placeholders are numbered in argument order; `LIMIT` and `OFFSET` are
//!   always the last two arguments.
//! - Identical criteria compose to byte-identical SQL and equal arguments.
//! - Free text is compared after Unicode lowercasing on both sides, so the
//!   statement needs a connection from `db::open_db*`.

use crate::db::{placeholder_list, FOLD_CASE_FUNCTION};
use crate::search::criteria::SearchCriteria;
use rusqlite::types::Value;

const SELECT_SUMMARY: &str = "SELECT v.id, v.title, v.employer_id, e.company_name, \
s.name AS specialization, v.employment, v.experience, v.salary_from, v.salary_to, \
v.created_at, v.updated_at \
FROM vacancy v \
JOIN employer e ON e.id = v.employer_id \
LEFT JOIN specialization s ON s.id = v.specialization_id";

/// Columns free text is matched against, in placeholder order.
const TEXT_COLUMNS: [&str; 3] = ["v.title", "s.name", "e.company_name"];

/// SQL text plus positional arguments, ready to execute.
#[derive(Debug, Clone, PartialEq)]
pub struct ComposedQuery {
    pub sql: String,
    pub args: Vec<Value>,
}

/// Composes the search statement for `criteria`.
///
/// `criteria.limit` is used as given; callers normalize it first.
pub fn compose(criteria: &SearchCriteria) -> ComposedQuery {
    let mut args: Vec<Value> = Vec::new();
    let mut fragments: Vec<String> = Vec::new();

    if let Some(text) = criteria.text_filter() {
        let pattern = format!("%{}%", escape_like(&text.to_lowercase()));
        let first = args.len() + 1;
        let matches = TEXT_COLUMNS
            .iter()
            .enumerate()
            .map(|(offset, column)| {
                format!(
                    "{FOLD_CASE_FUNCTION}({column}) LIKE ?{} ESCAPE '\\'",
                    first + offset
                )
            })
            .collect::<Vec<_>>()
            .join(" OR ");
        fragments.push(format!("({matches})"));
        for _ in TEXT_COLUMNS {
            args.push(Value::Text(pattern.clone()));
        }
    }

    if let Some(ids) = criteria.category_filter() {
        push_in_list(
            &mut fragments,
            &mut args,
            "v.specialization_id",
            ids.iter().map(|id| Value::Integer(*id)),
        );
    }

    if let Some(floor) = criteria.min_value {
        args.push(Value::Integer(floor));
        fragments.push(format!("v.salary_from >= ?{}", args.len()));
    }

    if let Some(values) = criteria.employment_filter() {
        push_in_list(
            &mut fragments,
            &mut args,
            "v.employment",
            values.iter().map(|value| Value::Text(value.as_str().to_string())),
        );
    }

    if let Some(values) = criteria.experience_filter() {
        push_in_list(
            &mut fragments,
            &mut args,
            "v.experience",
            values.iter().map(|value| Value::Text(value.as_str().to_string())),
        );
    }

    let mut sql = String::from(SELECT_SUMMARY);
    if !fragments.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&fragments.join(" AND "));
    }

    let limit_index = args.len() + 1;
    sql.push_str(&format!(
        " ORDER BY v.updated_at DESC, v.id DESC LIMIT ?{} OFFSET ?{};",
        limit_index,
        limit_index + 1
    ));
    args.push(Value::Integer(i64::from(criteria.limit)));
    args.push(Value::Integer(i64::from(criteria.offset)));

    ComposedQuery { sql, args }
}

fn push_in_list(
    fragments: &mut Vec<String>,
    args: &mut Vec<Value>,
    column: &str,
    values: impl ExactSizeIterator<Item = Value>,
) {
    let first = args.len() + 1;
    let count = values.len();
    args.extend(values);
    fragments.push(format!("{column} IN ({})", placeholder_list(first, count)));
}

/// Escapes `LIKE` wildcards so user text matches literally under
/// `ESCAPE '\'`.
fn escape_like(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}
