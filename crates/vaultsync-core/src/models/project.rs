//! Projects and their columns

use crate::time::Instant;

/// Project kind as reported upstream
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectKind {
    Task,
    Note,
    Other(String),
}

impl ProjectKind {
    pub fn from_raw(raw: Option<&str>) -> Self {
        match raw {
            None | Some("TASK") => ProjectKind::Task,
            Some("NOTE") => ProjectKind::Note,
            Some(other) => ProjectKind::Other(other.to_string()),
        }
    }
}

/// A project (list) owning an ordered set of columns
#[derive(Debug, Clone)]
pub struct Project {
    pub id: String,
    pub name: String,
    pub kind: ProjectKind,
    /// Columns in declaration order
    pub columns: Vec<Column>,
}

impl Project {
    /// The synthetic inbox project injected ahead of the fetched ones
    pub fn inbox(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind: ProjectKind::Task,
            columns: Vec::new(),
        }
    }
}

/// A kanban column (section) inside exactly one project
#[derive(Debug, Clone)]
pub struct Column {
    pub id: String,
    pub name: String,
    pub project_id: String,
    pub created: Option<Instant>,
    pub modified: Option<Instant>,
    pub sort_order: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_kind_from_raw() {
        assert_eq!(ProjectKind::from_raw(Some("TASK")), ProjectKind::Task);
        assert_eq!(ProjectKind::from_raw(Some("NOTE")), ProjectKind::Note);
        assert_eq!(ProjectKind::from_raw(None), ProjectKind::Task);
        assert_eq!(
            ProjectKind::from_raw(Some("CALENDAR")),
            ProjectKind::Other("CALENDAR".to_string())
        );
    }
}
