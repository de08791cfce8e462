//! Vacancy search values and the summary projection search returns.
//!
//! # Invariants
//! - Wire names (`as_str`) match the values allowed by the `vacancy` table
//!   `CHECK` constraints.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Row id of a vacancy.
pub type VacancyId = i64;

/// A string did not name a known enumerated value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownValueError {
    pub field: &'static str,
    pub value: String,
}

impl Display for UnknownValueError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown {} value `{}`", self.field, self.value)
    }
}

impl Error for UnknownValueError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Employment {
    FullTime,
    PartTime,
    Contract,
    Internship,
    Freelance,
    Watch,
}

impl Employment {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::FullTime => "full_time",
            Self::PartTime => "part_time",
            Self::Contract => "contract",
            Self::Internship => "internship",
            Self::Freelance => "freelance",
            Self::Watch => "watch",
        }
    }
}

impl FromStr for Employment {
    type Err = UnknownValueError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "full_time" => Ok(Self::FullTime),
            "part_time" => Ok(Self::PartTime),
            "contract" => Ok(Self::Contract),
            "internship" => Ok(Self::Internship),
            "freelance" => Ok(Self::Freelance),
            "watch" => Ok(Self::Watch),
            other => Err(UnknownValueError {
                field: "employment",
                value: other.to_string(),
            }),
        }
    }
}

/// Required experience band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Experience {
    #[serde(rename = "no_matter")]
    NoMatter,
    #[serde(rename = "no_experience")]
    NoExperience,
    #[serde(rename = "1_3_years")]
    OneToThreeYears,
    #[serde(rename = "3_6_years")]
    ThreeToSixYears,
    #[serde(rename = "6_plus_years")]
    SixPlusYears,
}

impl Experience {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NoMatter => "no_matter",
            Self::NoExperience => "no_experience",
            Self::OneToThreeYears => "1_3_years",
            Self::ThreeToSixYears => "3_6_years",
            Self::SixPlusYears => "6_plus_years",
        }
    }
}

impl FromStr for Experience {
    type Err = UnknownValueError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "no_matter" => Ok(Self::NoMatter),
            "no_experience" => Ok(Self::NoExperience),
            "1_3_years" => Ok(Self::OneToThreeYears),
            "3_6_years" => Ok(Self::ThreeToSixYears),
            "6_plus_years" => Ok(Self::SixPlusYears),
            other => Err(UnknownValueError {
                field: "experience",
                value: other.to_string(),
            }),
        }
    }
}

/// Read model returned by vacancy search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VacancySummary {
    pub id: VacancyId,
    pub title: String,
    pub employer_id: i64,
    pub company_name: String,
    /// Specialization name, when the vacancy has one.
    pub specialization: Option<String>,
    pub employment: Employment,
    pub experience: Experience,
    pub salary_from: Option<i64>,
    pub salary_to: Option<i64>,
    /// Epoch milliseconds.
    pub created_at: i64,
    /// Epoch milliseconds. Search orders by this, newest first.
    pub updated_at: i64,
}
