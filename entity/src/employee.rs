use serde::{Deserialize, Serialize};

/// Label shown for employees whose department is blank.
pub const FALLBACK_DEPARTMENT: &str = "General";

/// A stored employee. `id` is assigned by the remote store.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Employee {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub department: String,
    /// Minor currency units.
    #[serde(default)]
    pub salary: i64,
}

impl Employee {
    pub fn new(id: i64, fields: NewEmployee) -> Self {
        Self {
            id,
            name: fields.name,
            department: fields.department,
            salary: fields.salary,
        }
    }

    pub fn department_label(&self) -> &str {
        if self.department.is_empty() {
            FALLBACK_DEPARTMENT
        } else {
            &self.department
        }
    }
}

/// Create payload; the store assigns the id.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct NewEmployee {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub department: String,
    #[serde(default)]
    pub salary: i64,
}

impl NewEmployee {
    pub fn with_id(self, id: i64) -> Employee {
        Employee::new(id, self)
    }
}
