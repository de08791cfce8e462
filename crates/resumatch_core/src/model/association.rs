//! Many-to-many join tables between owning records and dictionaries.

use crate::model::lookup::{LookupId, LookupKind};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Row id of an owning record (resume or vacancy).
pub type OwnerId = i64;

/// Which join table an edge lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssociationKind {
    ResumeSkill,
    ResumeSpecialization,
    VacancySkill,
    VacancyCity,
}

impl AssociationKind {
    pub const ALL: [AssociationKind; 4] = [
        Self::ResumeSkill,
        Self::ResumeSpecialization,
        Self::VacancySkill,
        Self::VacancyCity,
    ];

    pub fn table(self) -> &'static str {
        match self {
            Self::ResumeSkill => "resume_skill",
            Self::ResumeSpecialization => "resume_specialization",
            Self::VacancySkill => "vacancy_skill",
            Self::VacancyCity => "vacancy_city",
        }
    }

    pub fn owner_column(self) -> &'static str {
        match self {
            Self::ResumeSkill | Self::ResumeSpecialization => "resume_id",
            Self::VacancySkill | Self::VacancyCity => "vacancy_id",
        }
    }

    pub fn lookup_column(self) -> &'static str {
        match self {
            Self::ResumeSkill | Self::VacancySkill => "skill_id",
            Self::ResumeSpecialization => "specialization_id",
            Self::VacancyCity => "city_id",
        }
    }

    /// Dictionary the lookup side of the edge points into.
    pub fn lookup_kind(self) -> LookupKind {
        match self {
            Self::ResumeSkill | Self::VacancySkill => LookupKind::Skill,
            Self::ResumeSpecialization => LookupKind::Specialization,
            Self::VacancyCity => LookupKind::City,
        }
    }
}

impl Display for AssociationKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.table())
    }
}

/// One join-table row. The pair is unique.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AssociationEdge {
    pub owner_id: OwnerId,
    pub lookup_id: LookupId,
}
