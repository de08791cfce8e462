//! Request-scoped vacancy filter criteria.

use crate::model::lookup::LookupId;
use crate::model::vacancy::{Employment, Experience};
use serde::Deserialize;

/// Optional filters plus a pagination window.
///
/// `None`, an empty list and blank free text all mean "no filter".
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SearchCriteria {
    /// Matched case-insensitively against title, specialization name and
    /// company name. `%`, `_` and `\` match literally.
    pub free_text: Option<String>,
    /// Specialization ids.
    pub category_ids: Option<Vec<LookupId>>,
    /// Lower bound on `salary_from`, inclusive.
    pub min_value: Option<i64>,
    pub employment_types: Option<Vec<Employment>>,
    pub experience_levels: Option<Vec<Experience>>,
    pub limit: u32,
    pub offset: u32,
}

impl SearchCriteria {
    /// Trimmed free text, or `None` when absent or blank.
    pub fn text_filter(&self) -> Option<&str> {
        self.free_text
            .as_deref()
            .map(str::trim)
            .filter(|text| !text.is_empty())
    }

    pub fn category_filter(&self) -> Option<&[LookupId]> {
        non_empty(self.category_ids.as_deref())
    }

    pub fn employment_filter(&self) -> Option<&[Employment]> {
        non_empty(self.employment_types.as_deref())
    }

    pub fn experience_filter(&self) -> Option<&[Experience]> {
        non_empty(self.experience_levels.as_deref())
    }
}

fn non_empty<T>(values: Option<&[T]>) -> Option<&[T]> {
    values.filter(|values| !values.is_empty())
}
