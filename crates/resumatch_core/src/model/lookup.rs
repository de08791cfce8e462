//! Name-keyed dictionary entities (skills, specializations, cities).

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Store-assigned dictionary row id. Immutable once created.
pub type LookupId = i64;

/// Which dictionary table a name belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LookupKind {
    Skill,
    Specialization,
    City,
}

impl LookupKind {
    pub const ALL: [LookupKind; 3] = [Self::Skill, Self::Specialization, Self::City];

    /// Backing table name.
    pub fn table(self) -> &'static str {
        match self {
            Self::Skill => "skill",
            Self::Specialization => "specialization",
            Self::City => "city",
        }
    }
}

impl Display for LookupKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.table())
    }
}

/// One dictionary row. `name` is unique within its kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupEntity {
    pub id: LookupId,
    pub name: String,
}
