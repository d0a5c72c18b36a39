//! Console state over the remote employee collection.
//!
//! The collection is replaced wholesale on every reload and handed out as an
//! `Arc` snapshot, so a caller holding an older snapshot never sees it change.

use std::sync::Arc;

use entity::{Employee, EmployeeFilter, NewEmployee};
use platform_api::{ApiError, ApiResult, EmployeeApi};
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::{
    HrResult,
    analytics::{AnalyticsView, aggregate},
    export,
    import::{ImportOutcome, ImportPlan},
    notify::{Notice, Notifier, Severity},
};

pub const ROWS_PER_PAGE_OPTIONS: [usize; 3] = [5, 10, 25];
pub const DEFAULT_ROWS_PER_PAGE: usize = 5;

pub struct Roster<A> {
    api: Arc<A>,
    notifier: Arc<dyn Notifier>,
    employees: Arc<Vec<Employee>>,
    filter: EmployeeFilter,
    selected: Vec<i64>,
    page: usize,
    rows_per_page: usize,
}

impl<A: EmployeeApi + 'static> Roster<A> {
    pub fn new(api: Arc<A>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            api,
            notifier,
            employees: Arc::new(Vec::new()),
            filter: EmployeeFilter::default(),
            selected: Vec::new(),
            page: 0,
            rows_per_page: DEFAULT_ROWS_PER_PAGE,
        }
    }

    /// Fetch with `filter` and replace the collection.
    ///
    /// On failure the collection is cleared rather than left stale.
    pub async fn load(&mut self, filter: &EmployeeFilter) -> ApiResult<usize> {
        match self.api.list(filter).await {
            Ok(employees) => {
                debug!(count = employees.len(), "employee collection reloaded");
                self.employees = Arc::new(employees);
                self.selected.clear();
                Ok(self.employees.len())
            }
            Err(err) => {
                warn!(error = %err, "failed to load employees");
                self.notifier.error("Failed to load employees");
                self.employees = Arc::new(Vec::new());
                self.selected.clear();
                Err(err)
            }
        }
    }

    pub async fn search(&mut self, filter: EmployeeFilter) -> ApiResult<usize> {
        self.filter = filter;
        self.page = 0;
        self.notifier.info("Search filters applied");
        let filter = self.filter.clone();
        self.load(&filter).await
    }

    pub async fn clear_filters(&mut self) -> ApiResult<usize> {
        self.filter = EmployeeFilter::default();
        self.page = 0;
        self.notifier.info("Filters cleared");
        self.load(&EmployeeFilter::default()).await
    }

    async fn reload(&mut self) {
        let filter = self.filter.clone();
        // Failures are already reported by `load`.
        let _ = self.load(&filter).await;
    }

    pub async fn add(&mut self, employee: NewEmployee) -> ApiResult<Employee> {
        let created = self.api.create(&employee).await;
        match &created {
            Ok(saved) => {
                info!(id = saved.id, "employee created");
                self.notifier.success("Employee added successfully");
                self.reload().await;
            }
            Err(err) => {
                warn!(error = %err, "failed to create employee");
                self.notifier.error("Failed to save employee");
            }
        }
        created
    }

    pub async fn edit(&mut self, employee: Employee) -> ApiResult<Employee> {
        let updated = self.api.update(&employee).await;
        match &updated {
            Ok(saved) => {
                info!(id = saved.id, "employee updated");
                self.notifier.success("Employee updated successfully");
                self.reload().await;
            }
            Err(err) => {
                warn!(id = employee.id, error = %err, "failed to update employee");
                self.notifier.error("Failed to save employee");
            }
        }
        updated
    }

    /// Delete every id concurrently, then reload with the current filter.
    ///
    /// There is no atomicity across the set: on partial failure some records
    /// are gone and the first error is returned.
    pub async fn delete(&mut self, ids: &[i64]) -> ApiResult<usize> {
        if ids.is_empty() {
            return Ok(0);
        }
        let mut tasks = JoinSet::new();
        for &id in ids {
            let api = Arc::clone(&self.api);
            tasks.spawn(async move { api.delete(id).await.map_err(|err| (id, err)) });
        }

        let mut first_error = None;
        while let Some(joined) = tasks.join_next().await {
            let failure = match joined {
                Ok(Ok(())) => continue,
                Ok(Err((id, err))) => {
                    warn!(id, error = %err, "delete failed");
                    err
                }
                Err(join_err) => ApiError::internal(anyhow::Error::new(join_err)),
            };
            first_error.get_or_insert(failure);
        }

        let result = match first_error {
            None => {
                self.notifier.success(&format!(
                    "{} Employee(s) deleted successfully",
                    ids.len()
                ));
                Ok(ids.len())
            }
            Some(err) => {
                self.notifier.error("Delete operation faced issues");
                Err(err)
            }
        };
        self.reload().await;
        result
    }

    pub async fn delete_selected(&mut self) -> ApiResult<usize> {
        let ids = self.selected.clone();
        self.delete(&ids).await
    }

    /// Run a CSV import, report the tally, and reload the full collection.
    pub async fn import_csv(&mut self, text: &str) -> HrResult<ImportOutcome> {
        let plan = ImportPlan::parse(text)?;
        if plan.is_empty() {
            return Ok(ImportOutcome::default());
        }
        let outcome = plan.execute(self.api.as_ref()).await;
        let severity = if outcome.success_count > 0 {
            Severity::Success
        } else {
            Severity::Error
        };
        self.notifier.notify(Notice::new(severity, outcome.to_string()));

        self.filter = EmployeeFilter::default();
        self.reload().await;
        Ok(outcome)
    }

    pub fn export_csv(&self) -> HrResult<String> {
        let csv = export::export_csv(&self.employees)?;
        self.notifier.success("Export download started");
        Ok(csv)
    }

    pub fn analytics(&self) -> AnalyticsView {
        aggregate(&self.employees)
    }
}

/// Snapshot, selection and pagination; no API access needed.
impl<A> Roster<A> {
    pub fn employees(&self) -> Arc<Vec<Employee>> {
        Arc::clone(&self.employees)
    }

    /// Filter applied by the last search.
    pub fn filter(&self) -> &EmployeeFilter {
        &self.filter
    }

    pub fn selected(&self) -> &[i64] {
        &self.selected
    }

    pub fn is_selected(&self, id: i64) -> bool {
        self.selected.contains(&id)
    }

    pub fn toggle(&mut self, id: i64) {
        match self.selected.iter().position(|&s| s == id) {
            Some(at) => {
                self.selected.remove(at);
            }
            None => self.selected.push(id),
        }
    }

    /// Select every employee in the collection, not just the visible page.
    pub fn select_all(&mut self, checked: bool) {
        self.selected = if checked {
            self.employees.iter().map(|e| e.id).collect()
        } else {
            Vec::new()
        };
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn set_page(&mut self, page: usize) {
        self.page = page;
    }

    pub fn rows_per_page(&self) -> usize {
        self.rows_per_page
    }

    /// Changing the page size returns to the first page. Zero is ignored.
    pub fn set_rows_per_page(&mut self, rows: usize) {
        if rows == 0 {
            return;
        }
        self.rows_per_page = rows;
        self.page = 0;
    }

    pub fn page_count(&self) -> usize {
        self.employees.len().div_ceil(self.rows_per_page)
    }

    pub fn page_rows(&self) -> &[Employee] {
        let start = self.page.saturating_mul(self.rows_per_page);
        let end = start.saturating_add(self.rows_per_page);
        let len = self.employees.len();
        &self.employees[start.min(len)..end.min(len)]
    }
}
