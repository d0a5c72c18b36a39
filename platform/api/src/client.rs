//! reqwest-backed client for the remote employee API.

use std::time::Duration;

use entity::{Employee, EmployeeFilter, NewEmployee};
use reqwest::{Client, Response};
use tracing::{debug, instrument};

use crate::{ApiError, ApiResult, EmployeeApi};

pub const DEFAULT_BASE_URL: &str = "http://localhost:5000/api";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Where the employee API lives and how long to wait for it.
#[derive(Clone, Debug)]
pub struct ApiSettings {
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl ApiSettings {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[derive(Clone, Debug)]
pub struct HttpEmployeeApi {
    http: Client,
    base_url: String,
}

impl HttpEmployeeApi {
    pub fn new(settings: &ApiSettings) -> ApiResult<Self> {
        let http = Client::builder()
            .user_agent(concat!("employee-console/", env!("CARGO_PKG_VERSION")))
            .timeout(settings.timeout)
            .build()?;
        Ok(Self {
            http,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn collection_url(&self) -> String {
        format!("{}/employees", self.base_url)
    }

    fn item_url(&self, id: i64) -> String {
        format!("{}/employees/{}", self.base_url, id)
    }
}

async fn ensure_success(response: Response) -> ApiResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    debug!(status = status.as_u16(), "employee api rejected request");
    Err(ApiError::from_status(status.as_u16(), body))
}

impl EmployeeApi for HttpEmployeeApi {
    #[instrument(name = "employee_api.list", skip_all, fields(filtered = !filter.is_empty()))]
    async fn list(&self, filter: &EmployeeFilter) -> ApiResult<Vec<Employee>> {
        let response = self
            .http
            .get(self.collection_url())
            .query(&filter.query_pairs())
            .send()
            .await?;
        // A null body is treated as an empty collection.
        let employees = ensure_success(response)
            .await?
            .json::<Option<Vec<Employee>>>()
            .await?;
        Ok(employees.unwrap_or_default())
    }

    #[instrument(name = "employee_api.create", skip_all)]
    async fn create(&self, employee: &NewEmployee) -> ApiResult<Employee> {
        let response = self
            .http
            .post(self.collection_url())
            .json(employee)
            .send()
            .await?;
        Ok(ensure_success(response).await?.json().await?)
    }

    #[instrument(name = "employee_api.update", skip_all, fields(id = employee.id))]
    async fn update(&self, employee: &Employee) -> ApiResult<Employee> {
        let response = self
            .http
            .put(self.item_url(employee.id))
            .json(employee)
            .send()
            .await?;
        Ok(ensure_success(response).await?.json().await?)
    }

    #[instrument(name = "employee_api.delete", skip(self))]
    async fn delete(&self, id: i64) -> ApiResult<()> {
        let response = self.http.delete(self.item_url(id)).send().await?;
        ensure_success(response).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slash_is_normalised() {
        let api = HttpEmployeeApi::new(&ApiSettings::new("http://hr.local/api/")).unwrap();
        assert_eq!(api.base_url(), "http://hr.local/api");
        assert_eq!(api.collection_url(), "http://hr.local/api/employees");
        assert_eq!(api.item_url(7), "http://hr.local/api/employees/7");
    }

    #[tokio::test]
    async fn unreachable_server_is_a_transport_error() {
        let settings =
            ApiSettings::new("http://127.0.0.1:9").with_timeout(Duration::from_millis(500));
        let api = HttpEmployeeApi::new(&settings).unwrap();
        let err = api.delete(1).await.unwrap_err();
        assert_eq!(err.code(), "TRANSPORT");
    }
}
