use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use platform_api::ApiSettings;
use products_hr::roster::{DEFAULT_ROWS_PER_PAGE, ROWS_PER_PAGE_OPTIONS};

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub api: ApiSettings,
    pub rows_per_page: usize,
    pub cors_allowed_origins: Vec<String>,
    pub log_filter: Option<String>,
    pub otlp_endpoint: Option<String>,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let mut api = ApiSettings::default();
        if let Some(base_url) = var("EMPLOYEE_API_URL") {
            api.base_url = base_url;
        }
        if let Some(raw) = var("EMPLOYEE_API_TIMEOUT_SECS") {
            let secs = raw
                .parse::<u64>()
                .with_context(|| format!("invalid EMPLOYEE_API_TIMEOUT_SECS {raw:?}"))?;
            api.timeout = Duration::from_secs(secs);
        }

        let rows_per_page = match var("ROWS_PER_PAGE") {
            Some(raw) => parse_rows_per_page(&raw)?,
            None => DEFAULT_ROWS_PER_PAGE,
        };

        let cors_allowed_origins = var("CORS_ALLOWED_ORIGINS")
            .unwrap_or_else(|| "http://localhost:5173".into())
            .split(',')
            .filter_map(|s| {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    None
                } else {
                    Some(trimmed.to_string())
                }
            })
            .collect::<Vec<_>>();

        Ok(Self {
            api,
            rows_per_page,
            cors_allowed_origins,
            log_filter: var("LOG_FILTER"),
            otlp_endpoint: var("OTLP_ENDPOINT"),
        })
    }
}

pub fn parse_rows_per_page(raw: &str) -> Result<usize> {
    let rows = raw
        .trim()
        .parse::<usize>()
        .with_context(|| format!("invalid rows per page {raw:?}"))?;
    if ROWS_PER_PAGE_OPTIONS.contains(&rows) {
        Ok(rows)
    } else {
        Err(anyhow!(
            "rows per page must be one of {:?}, got {}",
            ROWS_PER_PAGE_OPTIONS,
            rows
        ))
    }
}
