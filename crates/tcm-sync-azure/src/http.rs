// crates/tcm-sync-azure/src/http.rs
// ============================================================================
// Module: Azure DevOps HTTP Client
// Description: Blocking REST implementation of the remote operations.
// Purpose: Issue authenticated, bounded requests against one project.
// Dependencies: reqwest, serde, serde_json, url, crate::{api, patch, wire}
// ============================================================================

//! ## Overview
//! [`HttpAzureDevopsApi`] maps each [`AzureDevopsApi`] method to one REST
//! call (two or more for paginated suite listings). Requests authenticate with
//! a personal access token over basic auth, redirects are disabled, and
//! response bodies are read under a fixed byte limit. Plan listings follow the
//! `x-ms-continuationtoken` response header.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Read;
use std::time::Duration;

use reqwest::Method;
use reqwest::blocking::Client;
use reqwest::blocking::Response;
use reqwest::header::ACCEPT;
use reqwest::header::CONTENT_TYPE;
use reqwest::redirect::Policy;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tcm_sync_core::PlanId;
use tcm_sync_core::RunId;
use tcm_sync_core::SuiteId;
use tcm_sync_core::WorkItemId;
use url::Url;

use crate::api::ApiError;
use crate::api::AzureDevopsApi;
use crate::api::Page;
use crate::patch::PatchOperation;
use crate::wire::CreatePlanRequest;
use crate::wire::CreateRunRequest;
use crate::wire::CreateSuiteRequest;
use crate::wire::IdReference;
use crate::wire::ListResponse;
use crate::wire::RunResultRecord;
use crate::wire::SuiteTestCaseRequest;
use crate::wire::TestPlanRecord;
use crate::wire::TestPointRecord;
use crate::wire::TestRunRecord;
use crate::wire::TestSuiteRecord;
use crate::wire::UpdateRunRequest;
use crate::wire::WorkItem;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// API version of the work item tracking endpoints.
pub const WIT_API_VERSION: &str = "6.0";
/// API version of the test plan and suite endpoints.
pub const TEST_PLAN_API_VERSION: &str = "6.1-preview.1";
/// API version of the test point and suite membership endpoints.
pub const SUITE_ENTRY_API_VERSION: &str = "6.1-preview.2";
/// API version of the test run endpoints.
pub const TEST_RUN_API_VERSION: &str = "6.0";
/// Response header carrying the next-page token.
pub const CONTINUATION_HEADER: &str = "x-ms-continuationtoken";
/// Maximum accepted response body size.
pub const MAX_RESPONSE_BYTES: usize = 16 * 1024 * 1024;
/// Maximum number of error-body characters kept in [`ApiError::Status`].
const MAX_ERROR_BODY_CHARS: usize = 512;
/// JSON media type.
const JSON: &str = "application/json";
/// JSON-patch media type required by work item writes.
const JSON_PATCH: &str = "application/json-patch+json";

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// Connection settings for [`HttpAzureDevopsApi`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpApiConfig {
    /// Organization URL (for example `https://dev.azure.com/org`).
    pub service_url: String,
    /// Personal access token.
    pub access_token: String,
    /// Project name.
    pub project: String,
    /// Request timeout in milliseconds.
    pub timeout_ms: u64,
    /// User agent for outbound requests.
    pub user_agent: String,
}

impl HttpApiConfig {
    /// Creates a configuration with default timeout and user agent.
    #[must_use]
    pub fn new(
        service_url: impl Into<String>,
        access_token: impl Into<String>,
        project: impl Into<String>,
    ) -> Self {
        Self {
            service_url: service_url.into(),
            access_token: access_token.into(),
            project: project.into(),
            timeout_ms: 30_000,
            user_agent: concat!("tcm-sync/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

// ============================================================================
// SECTION: HTTP Client
// ============================================================================

/// Blocking REST client for one Azure DevOps project.
#[derive(Debug, Clone)]
pub struct HttpAzureDevopsApi {
    /// HTTP client used for all requests.
    client: Client,
    /// Organization base URL.
    base: Url,
    /// Project name (first path segment of every endpoint).
    project: String,
    /// Personal access token.
    access_token: String,
}

/// Request body paired with its media type.
type Body = (&'static str, Vec<u8>);

impl HttpAzureDevopsApi {
    /// Builds a client from connection settings.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Client`] when the URL is invalid or the HTTP client
    /// cannot be constructed.
    pub fn new(config: HttpApiConfig) -> Result<Self, ApiError> {
        let base = Url::parse(&config.service_url)
            .map_err(|err| ApiError::Client(format!("invalid service url: {err}")))?;
        match base.scheme() {
            "http" | "https" => {}
            scheme => return Err(ApiError::Client(format!("unsupported url scheme: {scheme}"))),
        }
        if base.cannot_be_a_base() {
            return Err(ApiError::Client("service url cannot be a base".to_string()));
        }
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .user_agent(config.user_agent)
            .redirect(Policy::none())
            .build()
            .map_err(|err| ApiError::Client(format!("http client build failed: {err}")))?;
        Ok(Self {
            client,
            base,
            project: config.project,
            access_token: config.access_token,
        })
    }

    /// Builds `{base}/{project}/_apis/{segments}?api-version=...`.
    fn endpoint(&self, segments: &[&str], api_version: &str) -> Result<Url, ApiError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| ApiError::Client("service url cannot be a base".to_string()))?
            .pop_if_empty()
            .push(&self.project)
            .push("_apis")
            .extend(segments);
        url.set_query(None);
        url.query_pairs_mut().append_pair("api-version", api_version);
        Ok(url)
    }

    /// Sends a request and fails on non-success statuses.
    fn execute(&self, method: Method, url: Url, body: Option<Body>) -> Result<Response, ApiError> {
        let mut request = self
            .client
            .request(method, url)
            .basic_auth("", Some(&self.access_token))
            .header(ACCEPT, JSON);
        if let Some((content_type, bytes)) = body {
            request = request.header(CONTENT_TYPE, content_type).body(bytes);
        }
        let response = request.send().map_err(|err| ApiError::Request(err.to_string()))?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = read_body(response)
            .map(|bytes| {
                String::from_utf8_lossy(&bytes)
                    .chars()
                    .take(MAX_ERROR_BODY_CHARS)
                    .collect::<String>()
            })
            .unwrap_or_default();
        Err(ApiError::Status {
            status: status.as_u16(),
            body,
        })
    }

    /// Sends a request and decodes a JSON response.
    fn fetch<T>(&self, method: Method, url: Url, body: Option<Body>) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
    {
        decode(self.execute(method, url, body)?)
    }

    /// Fetches one page of a continuation-token listing.
    fn fetch_page<T>(
        &self,
        mut url: Url,
        continuation_token: Option<&str>,
    ) -> Result<Page<T>, ApiError>
    where
        T: DeserializeOwned,
    {
        if let Some(token) = continuation_token {
            url.query_pairs_mut().append_pair("continuationToken", token);
        }
        let response = self.execute(Method::GET, url, None)?;
        let continuation_token = response
            .headers()
            .get(CONTINUATION_HEADER)
            .and_then(|value| value.to_str().ok())
            .filter(|value| !value.is_empty())
            .map(str::to_string);
        let list: ListResponse<T> = decode(response)?;
        Ok(Page {
            items: list.value,
            continuation_token,
        })
    }
}

impl AzureDevopsApi for HttpAzureDevopsApi {
    fn get_work_item(&self, id: WorkItemId) -> Result<Option<WorkItem>, ApiError> {
        let mut url = self.endpoint(&["wit", "workitems", &id.to_string()], WIT_API_VERSION)?;
        url.query_pairs_mut().append_pair("$expand", "relations");
        match self.fetch(Method::GET, url, None) {
            Ok(item) => Ok(Some(item)),
            Err(err) if err.is_not_found() => Ok(None),
            Err(err) => Err(err),
        }
    }

    fn create_work_item(
        &self,
        work_item_type: &str,
        document: &[PatchOperation],
    ) -> Result<WorkItem, ApiError> {
        let type_segment = format!("${work_item_type}");
        let url = self.endpoint(&["wit", "workitems", &type_segment], WIT_API_VERSION)?;
        self.fetch(Method::POST, url, Some((JSON_PATCH, encode(document)?)))
    }

    fn update_work_item(
        &self,
        id: WorkItemId,
        document: &[PatchOperation],
    ) -> Result<WorkItem, ApiError> {
        let url = self.endpoint(&["wit", "workitems", &id.to_string()], WIT_API_VERSION)?;
        self.fetch(Method::PATCH, url, Some((JSON_PATCH, encode(document)?)))
    }

    fn list_test_plans(
        &self,
        continuation_token: Option<&str>,
    ) -> Result<Page<TestPlanRecord>, ApiError> {
        let url = self.endpoint(&["testplan", "plans"], TEST_PLAN_API_VERSION)?;
        self.fetch_page(url, continuation_token)
    }

    fn create_test_plan(&self, name: &str) -> Result<TestPlanRecord, ApiError> {
        let url = self.endpoint(&["testplan", "plans"], TEST_PLAN_API_VERSION)?;
        let request = CreatePlanRequest {
            name: name.to_string(),
        };
        self.fetch(Method::POST, url, Some((JSON, encode(&request)?)))
    }

    fn list_test_suites(&self, plan: PlanId) -> Result<Vec<TestSuiteRecord>, ApiError> {
        let plan = plan.to_string();
        let mut suites = Vec::new();
        let mut token: Option<String> = None;
        loop {
            let url =
                self.endpoint(&["testplan", "Plans", &plan, "suites"], TEST_PLAN_API_VERSION)?;
            let page = self.fetch_page(url, token.as_deref())?;
            suites.extend(page.items);
            match page.continuation_token {
                Some(next) => token = Some(next),
                None => return Ok(suites),
            }
        }
    }

    fn create_test_suite(
        &self,
        plan: PlanId,
        request: &CreateSuiteRequest,
    ) -> Result<TestSuiteRecord, ApiError> {
        let url = self
            .endpoint(&["testplan", "Plans", &plan.to_string(), "suites"], TEST_PLAN_API_VERSION)?;
        self.fetch(Method::POST, url, Some((JSON, encode(request)?)))
    }

    fn list_test_points(
        &self,
        plan: PlanId,
        suite: SuiteId,
        test_case: WorkItemId,
    ) -> Result<Vec<TestPointRecord>, ApiError> {
        let mut url = self.endpoint(
            &["testplan", "Plans", &plan.to_string(), "Suites", &suite.to_string(), "TestPoint"],
            SUITE_ENTRY_API_VERSION,
        )?;
        url.query_pairs_mut().append_pair("testCaseId", &test_case.to_string());
        let list: ListResponse<TestPointRecord> = self.fetch(Method::GET, url, None)?;
        Ok(list.value)
    }

    fn add_test_case_to_suite(
        &self,
        plan: PlanId,
        suite: SuiteId,
        test_case: WorkItemId,
    ) -> Result<(), ApiError> {
        let url = self.endpoint(
            &["testplan", "Plans", &plan.to_string(), "Suites", &suite.to_string(), "TestCase"],
            SUITE_ENTRY_API_VERSION,
        )?;
        let body = [SuiteTestCaseRequest {
            work_item: IdReference::new(test_case.get()),
        }];
        self.execute(Method::POST, url, Some((JSON, encode(&body)?)))?;
        Ok(())
    }

    fn remove_test_case_from_suite(
        &self,
        plan: PlanId,
        suite: SuiteId,
        test_case: WorkItemId,
    ) -> Result<bool, ApiError> {
        let mut url = self.endpoint(
            &["testplan", "Plans", &plan.to_string(), "Suites", &suite.to_string(), "TestCase"],
            SUITE_ENTRY_API_VERSION,
        )?;
        url.query_pairs_mut().append_pair("testCaseIds", &test_case.to_string());
        match self.execute(Method::DELETE, url, None) {
            Ok(_) => Ok(true),
            Err(err) if err.is_not_found() => Ok(false),
            Err(err) => Err(err),
        }
    }

    fn create_test_run(&self, request: &CreateRunRequest) -> Result<TestRunRecord, ApiError> {
        let url = self.endpoint(&["test", "runs"], TEST_RUN_API_VERSION)?;
        self.fetch(Method::POST, url, Some((JSON, encode(request)?)))
    }

    fn add_test_results(&self, run: RunId, results: &[RunResultRecord]) -> Result<(), ApiError> {
        let url =
            self.endpoint(&["test", "Runs", &run.to_string(), "results"], TEST_RUN_API_VERSION)?;
        self.execute(Method::POST, url, Some((JSON, encode(results)?)))?;
        Ok(())
    }

    fn update_test_run_state(&self, run: RunId, state: &str) -> Result<(), ApiError> {
        let url = self.endpoint(&["test", "runs", &run.to_string()], TEST_RUN_API_VERSION)?;
        let request = UpdateRunRequest {
            state: state.to_string(),
        };
        self.execute(Method::PATCH, url, Some((JSON, encode(&request)?)))?;
        Ok(())
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Serializes a request body.
fn encode<B>(body: &B) -> Result<Vec<u8>, ApiError>
where
    B: Serialize + ?Sized,
{
    serde_json::to_vec(body)
        .map_err(|err| ApiError::Client(format!("request encode failed: {err}")))
}

/// Decodes a JSON response body.
fn decode<T>(response: Response) -> Result<T, ApiError>
where
    T: DeserializeOwned,
{
    let bytes = read_body(response)?;
    serde_json::from_slice(&bytes).map_err(|err| ApiError::Decode(err.to_string()))
}

/// Reads a response body, failing when it exceeds [`MAX_RESPONSE_BYTES`].
fn read_body(response: Response) -> Result<Vec<u8>, ApiError> {
    let limit = u64::try_from(MAX_RESPONSE_BYTES).unwrap_or(u64::MAX).saturating_add(1);
    let mut bytes = Vec::new();
    response
        .take(limit)
        .read_to_end(&mut bytes)
        .map_err(|err| ApiError::Request(format!("response read failed: {err}")))?;
    if bytes.len() > MAX_RESPONSE_BYTES {
        return Err(ApiError::Decode(format!("response exceeds {MAX_RESPONSE_BYTES} bytes")));
    }
    Ok(bytes)
}
