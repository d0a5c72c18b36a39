//! Process-local employee store implementing the API contract.
//!
//! Backs the development server and offline tests.

use std::{
    collections::BTreeMap,
    sync::{Mutex, MutexGuard},
};

use anyhow::anyhow;
use entity::{Employee, EmployeeFilter, NewEmployee};

use crate::{ApiError, ApiResult, EmployeeApi};

#[derive(Debug)]
struct Store {
    next_id: i64,
    rows: BTreeMap<i64, Employee>,
}

#[derive(Debug)]
pub struct InMemoryEmployeeApi {
    store: Mutex<Store>,
}

impl Default for InMemoryEmployeeApi {
    fn default() -> Self {
        Self {
            store: Mutex::new(Store {
                next_id: 1,
                rows: BTreeMap::new(),
            }),
        }
    }
}

impl InMemoryEmployeeApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with `seed`, ids assigned in order.
    pub fn seeded(seed: impl IntoIterator<Item = NewEmployee>) -> Self {
        let api = Self::default();
        if let Ok(mut store) = api.store.lock() {
            for fields in seed {
                store.insert(fields);
            }
        }
        api
    }

    fn lock(&self) -> ApiResult<MutexGuard<'_, Store>> {
        self.store
            .lock()
            .map_err(|_| ApiError::internal(anyhow!("employee store lock poisoned")))
    }

    pub fn list_matching(&self, filter: &EmployeeFilter) -> ApiResult<Vec<Employee>> {
        let store = self.lock()?;
        Ok(store
            .rows
            .values()
            .filter(|employee| filter_accepts(filter, employee))
            .cloned()
            .collect())
    }

    pub fn insert(&self, fields: NewEmployee) -> ApiResult<Employee> {
        Ok(self.lock()?.insert(fields))
    }

    pub fn replace(&self, employee: Employee) -> ApiResult<Employee> {
        let mut store = self.lock()?;
        let slot = store.rows.get_mut(&employee.id).ok_or(ApiError::NotFound)?;
        *slot = employee.clone();
        Ok(employee)
    }

    pub fn remove(&self, id: i64) -> ApiResult<()> {
        self.lock()?
            .rows
            .remove(&id)
            .map(|_| ())
            .ok_or(ApiError::NotFound)
    }
}

impl Store {
    fn insert(&mut self, fields: NewEmployee) -> Employee {
        let employee = fields.with_id(self.next_id);
        self.next_id += 1;
        self.rows.insert(employee.id, employee.clone());
        employee
    }
}

/// `Id`/`Salary` compare exactly, `Name`/`Department` are case-insensitive substrings.
fn filter_accepts(filter: &EmployeeFilter, employee: &Employee) -> bool {
    filter.query_pairs().into_iter().all(|(key, value)| match key {
        "Id" => value.parse::<i64>().is_ok_and(|id| id == employee.id),
        "Salary" => value.parse::<i64>().is_ok_and(|s| s == employee.salary),
        "Name" => contains_ignore_case(&employee.name, value),
        "Department" => contains_ignore_case(&employee.department, value),
        _ => true,
    })
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

impl EmployeeApi for InMemoryEmployeeApi {
    async fn list(&self, filter: &EmployeeFilter) -> ApiResult<Vec<Employee>> {
        self.list_matching(filter)
    }

    async fn create(&self, employee: &NewEmployee) -> ApiResult<Employee> {
        self.insert(employee.clone())
    }

    async fn update(&self, employee: &Employee) -> ApiResult<Employee> {
        self.replace(employee.clone())
    }

    async fn delete(&self, id: i64) -> ApiResult<()> {
        self.remove(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hire(name: &str, department: &str, salary: i64) -> NewEmployee {
        NewEmployee {
            name: name.into(),
            department: department.into(),
            salary,
        }
    }

    fn staff() -> InMemoryEmployeeApi {
        InMemoryEmployeeApi::seeded([
            hire("John Doe", "IT", 600_000),
            hire("Jane Smith", "HR", 550_000),
            hire("Johnny Bravo", "it", 1_200_000),
        ])
    }

    #[tokio::test]
    async fn ids_are_assigned_sequentially() {
        let api = staff();
        let created = api.create(&hire("Mira", "Ops", 10)).await.unwrap();
        assert_eq!(created.id, 4);
        assert_eq!(api.list(&EmployeeFilter::default()).await.unwrap().len(), 4);
    }

    #[tokio::test]
    async fn filters_combine() {
        let api = staff();
        let filter = EmployeeFilter {
            name: Some("john".into()),
            department: Some("IT".into()),
            ..Default::default()
        };
        let names: Vec<_> = api
            .list(&filter)
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.name)
            .collect();
        assert_eq!(names, vec!["John Doe", "Johnny Bravo"]);

        let filter = EmployeeFilter {
            salary: Some("550000".into()),
            ..Default::default()
        };
        assert_eq!(api.list(&filter).await.unwrap()[0].id, 2);

        let filter = EmployeeFilter {
            id: Some("abc".into()),
            ..Default::default()
        };
        assert!(api.list(&filter).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn update_and_delete_require_existing_ids() {
        let api = staff();
        let ghost = hire("Ghost", "None", 0).with_id(99);
        assert!(matches!(api.update(&ghost).await, Err(ApiError::NotFound)));
        assert!(matches!(api.delete(99).await, Err(ApiError::NotFound)));

        let promoted = hire("Jane Smith", "HR", 900_000).with_id(2);
        assert_eq!(api.update(&promoted).await.unwrap().salary, 900_000);
        api.delete(2).await.unwrap();
        assert!(matches!(api.delete(2).await, Err(ApiError::NotFound)));
    }
}
