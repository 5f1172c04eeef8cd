pub mod types;

use std::sync::atomic::{AtomicU64, Ordering};

use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::debug;

use types::*;

pub const DEFAULT_BASE_URL: &str = "https://api.xlitecore.xdialnetworks.com/api/v1";

/// Fixed page size used when fanning out dashboard page fetches.
const DASHBOARD_PAGE_SIZE: u32 = 50;

#[derive(Debug, Error)]
pub enum ApiError {
    /// 401/403. The only recovery is logging in again.
    #[error("authentication failed ({status}): {message}")]
    Auth { status: u16, message: String },

    #[error("request failed ({status}): {message}")]
    Status { status: u16, message: String },

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// A newer fetch was started before this one finished joining; its
    /// results must not overwrite the newer ones.
    #[error("fetch superseded by a newer request")]
    Superseded,
}

impl ApiError {
    pub fn is_auth(&self) -> bool {
        matches!(self, ApiError::Auth { .. })
    }
}

/// Monotonic fetch generation. Merged multi-page fetches are tagged when
/// they start; a merge is only valid while no newer fetch has begun.
#[derive(Debug, Default)]
pub struct FetchGeneration(AtomicU64);

impl FetchGeneration {
    pub fn begin(&self) -> u64 {
        self.0.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn is_current(&self, generation: u64) -> bool {
        self.0.load(Ordering::SeqCst) == generation
    }
}

pub struct ApiClient {
    base_url: String,
    token: Option<String>,
    client: reqwest::blocking::Client,
    generation: FetchGeneration,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, token: Option<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token,
            client: reqwest::blocking::Client::new(),
            generation: FetchGeneration::default(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn check(&self, resp: reqwest::blocking::Response) -> Result<reqwest::blocking::Response, ApiError> {
        let status = resp.status();
        if status.as_u16() == 401 || status.as_u16() == 403 {
            let message = resp.text().unwrap_or_default();
            return Err(ApiError::Auth {
                status: status.as_u16(),
                message,
            });
        }
        if !status.is_success() {
            let message = resp.text().unwrap_or_default();
            return Err(ApiError::Status {
                status: status.as_u16(),
                message,
            });
        }
        Ok(resp)
    }

    fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ApiError> {
        debug!(path, "GET");
        let mut req = self
            .client
            .get(self.url(path))
            .query(query)
            .header("accept", "application/json");
        if let Some(ref token) = self.token {
            req = req.bearer_auth(token);
        }
        let resp = self.check(req.send()?)?;
        Ok(resp.json()?)
    }

    /// `POST /auth/login`. The only endpoint besides the public integration
    /// form that works without a token.
    pub fn login(&self, username: &str, password: &str) -> Result<LoginResponse, ApiError> {
        let body = serde_json::json!({ "username": username, "password": password });
        let resp = self
            .client
            .post(self.url("/auth/login"))
            .header("accept", "application/json")
            .json(&body)
            .send()?;
        let resp = self.check(resp)?;
        Ok(resp.json()?)
    }

    /// Fetch a single dashboard page.
    pub fn dashboard_page(
        &self,
        campaign_id: &str,
        start_date: &str,
        end_date: Option<&str>,
        page: u32,
        page_size: u32,
    ) -> Result<DashboardResponse, ApiError> {
        let mut query = vec![
            ("start_date", start_date.to_string()),
            ("page", page.to_string()),
            ("page_size", page_size.to_string()),
        ];
        // The API treats end_date == start_date as a single-day query anyway.
        if let Some(end) = end_date.filter(|e| *e != start_date) {
            query.insert(1, ("end_date", end.to_string()));
        }
        self.get_json(&format!("/campaigns/{campaign_id}/dashboard"), &query)
    }

    /// Fetch every dashboard page and merge them into one response.
    ///
    /// Page 1 is fetched first for pagination info; remaining pages are
    /// fetched concurrently and joined. Any page failure fails the whole
    /// fetch. The merge is generation-tagged so a superseded fetch cannot
    /// deliver stale results.
    pub fn fetch_dashboard(
        &self,
        campaign_id: &str,
        start_date: &str,
        end_date: Option<&str>,
    ) -> Result<DashboardResponse, ApiError> {
        let generation = self.generation.begin();

        let first = self.dashboard_page(campaign_id, start_date, end_date, 1, DASHBOARD_PAGE_SIZE)?;
        let total_pages = first.pagination.total_pages.max(1);
        if total_pages == 1 {
            return self.finish_merge(generation, first, Vec::new());
        }

        debug!(total_pages, "fanning out dashboard page fetches");
        let pages: Result<Vec<DashboardResponse>, ApiError> = std::thread::scope(|scope| {
            let handles: Vec<_> = (2..=total_pages)
                .map(|page| {
                    scope.spawn(move || {
                        self.dashboard_page(
                            campaign_id,
                            start_date,
                            end_date,
                            page,
                            DASHBOARD_PAGE_SIZE,
                        )
                    })
                })
                .collect();
            handles
                .into_iter()
                .map(|h| h.join().expect("page fetch thread panicked"))
                .collect()
        });

        self.finish_merge(generation, first, pages?)
    }

    fn finish_merge(
        &self,
        generation: u64,
        first: DashboardResponse,
        rest: Vec<DashboardResponse>,
    ) -> Result<DashboardResponse, ApiError> {
        if !self.generation.is_current(generation) {
            return Err(ApiError::Superseded);
        }
        Ok(merge_dashboard_pages(first, rest))
    }

    pub fn client_campaigns(&self, client_id: &str) -> Result<ClientCampaignsResponse, ApiError> {
        self.get_json(&format!("/client/campaigns/{client_id}"), &[])
    }

    pub fn recordings(
        &self,
        campaign_id: &str,
        date: &str,
        page: u32,
        page_size: u32,
        sort_by: &str,
        sort_dir: &str,
    ) -> Result<RecordingsResponse, ApiError> {
        self.get_json(
            &format!("/recordings/campaign/{campaign_id}"),
            &[
                ("date", date.to_string()),
                ("page", page.to_string()),
                ("page_size", page_size.to_string()),
                ("sort_by", sort_by.to_string()),
                ("sort_dir", sort_dir.to_string()),
            ],
        )
    }

    pub fn export_options(&self, campaign_id: &str) -> Result<ExportOptionsResponse, ApiError> {
        self.get_json(&format!("/export/{campaign_id}/options"), &[])
    }

    /// `POST /export/{id}/download` — returns the CSV body as text.
    pub fn export_download(
        &self,
        campaign_id: &str,
        request: &ExportRequest,
    ) -> Result<String, ApiError> {
        debug!(campaign_id, "POST export download");
        let mut req = self
            .client
            .post(self.url(&format!("/export/{campaign_id}/download")))
            .header("Accept", "text/csv")
            .json(request);
        if let Some(ref token) = self.token {
            req = req.bearer_auth(token);
        }
        let resp = self.check(req.send()?)?;
        Ok(resp.text()?)
    }

    pub fn integration_form(&self) -> Result<IntegrationFormConfig, ApiError> {
        self.get_json("/integration/form", &[])
    }

    pub fn integration_request(
        &self,
        payload: &serde_json::Value,
    ) -> Result<serde_json::Value, ApiError> {
        let resp = self
            .client
            .post(self.url("/integration/request"))
            .header("accept", "application/json")
            .json(payload)
            .send()?;
        let resp = self.check(resp)?;
        Ok(resp.json()?)
    }
}

/// Combine page 1 with the fanned-out remainder. Pagination is rewritten to
/// describe the merged result: everything now lives in one logical page.
pub fn merge_dashboard_pages(
    mut first: DashboardResponse,
    rest: Vec<DashboardResponse>,
) -> DashboardResponse {
    for page in rest {
        first.calls.extend(page.calls);
    }
    first.pagination = Pagination {
        total_pages: 1,
        total_records: first.calls.len() as u64,
        current_page: 1,
    };
    first
}
