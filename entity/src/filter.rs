use serde::{Deserialize, Serialize};

/// Server-side list filter. Blank fields are not sent.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct EmployeeFilter {
    pub id: Option<String>,
    pub name: Option<String>,
    pub department: Option<String>,
    pub salary: Option<String>,
}

impl EmployeeFilter {
    pub fn is_empty(&self) -> bool {
        self.query_pairs().is_empty()
    }

    /// Query parameters in the casing the employee API expects.
    pub fn query_pairs(&self) -> Vec<(&'static str, &str)> {
        [
            ("Id", &self.id),
            ("Name", &self.name),
            ("Department", &self.department),
            ("Salary", &self.salary),
        ]
        .into_iter()
        .filter_map(|(key, value)| {
            value
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(|v| (key, v))
        })
        .collect()
    }

    /// Rebuild a filter from `Id`/`Name`/`Department`/`Salary` query parameters.
    pub fn from_query_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let mut filter = Self::default();
        for (key, value) in pairs {
            let value = value.trim();
            if value.is_empty() {
                continue;
            }
            let slot = match key {
                "Id" => &mut filter.id,
                "Name" => &mut filter.name,
                "Department" => &mut filter.department,
                "Salary" => &mut filter.salary,
                _ => continue,
            };
            *slot = Some(value.to_string());
        }
        filter
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_fields_are_dropped() {
        let filter = EmployeeFilter {
            id: Some("  ".into()),
            name: Some(" Jo ".into()),
            department: None,
            salary: Some("500000".into()),
        };
        assert_eq!(
            filter.query_pairs(),
            vec![("Name", "Jo"), ("Salary", "500000")]
        );
        assert!(!filter.is_empty());
        assert!(EmployeeFilter::default().is_empty());
    }

    #[test]
    fn parses_known_query_keys_only() {
        let filter = EmployeeFilter::from_query_pairs([
            ("Department", "HR"),
            ("page", "2"),
            ("Id", ""),
        ]);
        assert_eq!(filter.department.as_deref(), Some("HR"));
        assert_eq!(filter.id, None);
        assert_eq!(filter.query_pairs(), vec![("Department", "HR")]);
    }
}
