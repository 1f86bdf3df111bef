// crates/tcm-sync-azure/tests/common/mod.rs
// ============================================================================
// Module: Common Test Utilities
// Description: In-memory Azure DevOps double and loopback HTTP helpers.
// Purpose: Record every remote write for adapter and run-context assertions.
// Dependencies: tcm-sync-azure, tcm-sync-core, tiny_http
// ============================================================================

//! ## Overview
//! [`FakeAzureDevops`] keeps work items, plans, suites, points, and runs in
//! memory and logs each write as a short label. [`spawn_server`] serves
//! scripted responses over loopback HTTP and captures the requests.

#![allow(dead_code, reason = "Shared test helpers may be unused in some cases.")]

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::mpsc;
use std::thread;

use serde_json::Value;
use tcm_sync_azure::ApiError;
use tcm_sync_azure::AzureDevopsApi;
use tcm_sync_azure::AzureDevopsClient;
use tcm_sync_azure::AzureDevopsOptions;
use tcm_sync_azure::Page;
use tcm_sync_azure::PatchOp;
use tcm_sync_azure::PatchOperation;
use tcm_sync_azure::wire::CreateRunRequest;
use tcm_sync_azure::wire::CreateSuiteRequest;
use tcm_sync_azure::wire::IdReference;
use tcm_sync_azure::wire::Link;
use tcm_sync_azure::wire::RunResultRecord;
use tcm_sync_azure::wire::TestPlanRecord;
use tcm_sync_azure::wire::TestPointRecord;
use tcm_sync_azure::wire::TestRunRecord;
use tcm_sync_azure::wire::TestSuiteRecord;
use tcm_sync_azure::wire::WorkItem;
use tcm_sync_azure::wire::WorkItemLinks;
use tcm_sync_azure::wire::WorkItemRelation;
use tcm_sync_core::MemoryEventSink;
use tcm_sync_core::PlanId;
use tcm_sync_core::RunId;
use tcm_sync_core::SuiteId;
use tcm_sync_core::WorkItemId;
use tiny_http::Header;
use tiny_http::Response;
use tiny_http::Server;

// ============================================================================
// SECTION: Fake State
// ============================================================================

/// Mutable state behind [`FakeAzureDevops`].
#[derive(Debug, Default)]
pub struct FakeState {
    /// Next id handed out for any created entity.
    pub next_id: u64,
    /// Work items by id.
    pub work_items: BTreeMap<u64, WorkItem>,
    /// Patch documents applied by `update_work_item`.
    pub updates: Vec<(u64, Vec<PatchOperation>)>,
    /// Patch documents sent to `create_work_item`.
    pub creates: Vec<Vec<PatchOperation>>,
    /// Plans in listing order.
    pub plans: Vec<TestPlanRecord>,
    /// Plans returned per listing page.
    pub plan_page_size: usize,
    /// Number of plan listing calls.
    pub plan_list_calls: usize,
    /// Suites per plan.
    pub suites: BTreeMap<u64, Vec<TestSuiteRecord>>,
    /// Points keyed by (suite, test case).
    pub points: BTreeMap<(u64, u64), u64>,
    /// When set, adding a case to a suite creates no point.
    pub suppress_points: bool,
    /// Run states by id.
    pub runs: BTreeMap<u64, String>,
    /// Submitted results by run.
    pub results: BTreeMap<u64, Vec<RunResultRecord>>,
    /// When set, result submission fails with status 500.
    pub fail_results: bool,
    /// Labels of every write call, in order.
    pub writes: Vec<String>,
}

impl FakeState {
    /// Returns a fresh id.
    fn allocate(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

// ============================================================================
// SECTION: Fake Azure DevOps
// ============================================================================

/// In-memory [`AzureDevopsApi`] implementation.
#[derive(Debug)]
pub struct FakeAzureDevops {
    /// Shared mutable state.
    pub state: RefCell<FakeState>,
}

impl Default for FakeAzureDevops {
    fn default() -> Self {
        Self::starting_at(100)
    }
}

impl FakeAzureDevops {
    /// Creates a fake whose first allocated id is `first_id`.
    pub fn starting_at(first_id: u64) -> Self {
        Self {
            state: RefCell::new(FakeState {
                next_id: first_id - 1,
                plan_page_size: 1,
                ..FakeState::default()
            }),
        }
    }

    /// Seeds a work item with a type and title.
    pub fn seed_work_item(&self, id: u64, work_item_type: &str, title: &str) {
        let mut item = WorkItem {
            id,
            rev: 1,
            url: work_item_url(id),
            ..WorkItem::default()
        };
        item.fields.insert("System.WorkItemType".to_string(), Value::from(work_item_type));
        item.fields.insert("System.Title".to_string(), Value::from(title));
        self.state.borrow_mut().work_items.insert(id, item);
    }

    /// Seeds a requirement work item with a self link.
    pub fn seed_requirement(&self, id: u64) {
        self.seed_work_item(id, "User Story", &format!("Story {id}"));
        let mut state = self.state.borrow_mut();
        if let Some(item) = state.work_items.get_mut(&id) {
            item.links = Some(WorkItemLinks {
                self_link: Some(Link {
                    href: requirement_link(id),
                }),
            });
        }
    }

    /// Seeds a plan with its root suite.
    pub fn seed_plan(&self, name: &str) -> (u64, u64) {
        let mut state = self.state.borrow_mut();
        let plan = state.allocate();
        let root = state.allocate();
        state.plans.push(TestPlanRecord {
            id: plan,
            name: name.to_string(),
            root_suite: IdReference {
                id: root,
                name: Some(name.to_string()),
            },
        });
        state.suites.insert(
            plan,
            vec![TestSuiteRecord {
                id: root,
                name: name.to_string(),
                suite_type: Some("staticTestSuite".to_string()),
                parent_suite: None,
                requirement_id: None,
            }],
        );
        (plan, root)
    }

    /// Seeds a requirement suite under a plan.
    pub fn seed_requirement_suite(&self, plan: u64, parent: u64, requirement: u64) -> u64 {
        let mut state = self.state.borrow_mut();
        let id = state.allocate();
        state.suites.entry(plan).or_default().push(TestSuiteRecord {
            id,
            name: format!("{requirement} : Story"),
            suite_type: Some("requirementTestSuite".to_string()),
            parent_suite: Some(IdReference::new(parent)),
            requirement_id: Some(requirement),
        });
        id
    }

    /// Places a test case in a suite with a point.
    pub fn seed_point(&self, suite: u64, test_case: u64) -> u64 {
        let mut state = self.state.borrow_mut();
        let point = state.allocate();
        state.points.insert((suite, test_case), point);
        point
    }

    /// Returns the labels of every write call.
    pub fn writes(&self) -> Vec<String> {
        self.state.borrow().writes.clone()
    }

    /// Returns the number of writes whose label starts with `prefix`.
    pub fn count_writes(&self, prefix: &str) -> usize {
        self.state.borrow().writes.iter().filter(|label| label.starts_with(prefix)).count()
    }

    /// Returns whether a test case is a member of a suite.
    pub fn is_member(&self, suite: u64, test_case: u64) -> bool {
        self.state.borrow().points.contains_key(&(suite, test_case))
    }
}

impl AzureDevopsApi for FakeAzureDevops {
    fn get_work_item(&self, id: WorkItemId) -> Result<Option<WorkItem>, ApiError> {
        Ok(self.state.borrow().work_items.get(&id.get()).cloned())
    }

    fn create_work_item(
        &self,
        work_item_type: &str,
        document: &[PatchOperation],
    ) -> Result<WorkItem, ApiError> {
        let mut state = self.state.borrow_mut();
        let id = state.allocate();
        let mut item = WorkItem {
            id,
            rev: 1,
            url: work_item_url(id),
            ..WorkItem::default()
        };
        item.fields.insert("System.WorkItemType".to_string(), Value::from(work_item_type));
        apply(&mut item, document);
        state.work_items.insert(id, item.clone());
        state.creates.push(document.to_vec());
        state.writes.push(format!("create_work_item #{id}"));
        Ok(item)
    }

    fn update_work_item(
        &self,
        id: WorkItemId,
        document: &[PatchOperation],
    ) -> Result<WorkItem, ApiError> {
        let mut state = self.state.borrow_mut();
        let Some(item) = state.work_items.get_mut(&id.get()) else {
            return Err(not_found());
        };
        apply(item, document);
        item.rev += 1;
        let item = item.clone();
        state.updates.push((id.get(), document.to_vec()));
        state.writes.push(format!("update_work_item #{id}"));
        Ok(item)
    }

    fn list_test_plans(
        &self,
        continuation_token: Option<&str>,
    ) -> Result<Page<TestPlanRecord>, ApiError> {
        let mut state = self.state.borrow_mut();
        state.plan_list_calls += 1;
        let start = continuation_token.map_or(0, |token| token.parse::<usize>().unwrap());
        let end = (start + state.plan_page_size).min(state.plans.len());
        let items = state.plans[start..end].to_vec();
        let continuation_token = (end < state.plans.len()).then(|| end.to_string());
        Ok(Page {
            items,
            continuation_token,
        })
    }

    fn create_test_plan(&self, name: &str) -> Result<TestPlanRecord, ApiError> {
        let (plan, _) = self.seed_plan(name);
        let mut state = self.state.borrow_mut();
        state.writes.push(format!("create_test_plan #{plan}"));
        Ok(state.plans.iter().find(|record| record.id == plan).cloned().unwrap())
    }

    fn list_test_suites(&self, plan: PlanId) -> Result<Vec<TestSuiteRecord>, ApiError> {
        Ok(self.state.borrow().suites.get(&plan.get()).cloned().unwrap_or_default())
    }

    fn create_test_suite(
        &self,
        plan: PlanId,
        request: &CreateSuiteRequest,
    ) -> Result<TestSuiteRecord, ApiError> {
        let mut state = self.state.borrow_mut();
        let id = state.allocate();
        let record = TestSuiteRecord {
            id,
            name: format!("{} : Story", request.requirement_id),
            suite_type: Some(request.suite_type.to_string()),
            parent_suite: Some(request.parent_suite.clone()),
            requirement_id: Some(request.requirement_id),
        };
        state.suites.entry(plan.get()).or_default().push(record.clone());
        state.writes.push(format!("create_test_suite #{id}"));
        Ok(record)
    }

    fn list_test_points(
        &self,
        _plan: PlanId,
        suite: SuiteId,
        test_case: WorkItemId,
    ) -> Result<Vec<TestPointRecord>, ApiError> {
        let state = self.state.borrow();
        Ok(state
            .points
            .get(&(suite.get(), test_case.get()))
            .map(|point| {
                vec![TestPointRecord {
                    id: *point,
                    test_case_reference: Some(IdReference::new(test_case.get())),
                }]
            })
            .unwrap_or_default())
    }

    fn add_test_case_to_suite(
        &self,
        _plan: PlanId,
        suite: SuiteId,
        test_case: WorkItemId,
    ) -> Result<(), ApiError> {
        let mut state = self.state.borrow_mut();
        if !state.suppress_points {
            let point = state.allocate();
            state.points.insert((suite.get(), test_case.get()), point);
        }
        state.writes.push(format!("add_test_case_to_suite #{test_case} -> #{suite}"));
        Ok(())
    }

    fn remove_test_case_from_suite(
        &self,
        _plan: PlanId,
        suite: SuiteId,
        test_case: WorkItemId,
    ) -> Result<bool, ApiError> {
        let mut state = self.state.borrow_mut();
        let removed = state.points.remove(&(suite.get(), test_case.get())).is_some();
        state.writes.push(format!("remove_test_case_from_suite #{test_case} <- #{suite}"));
        Ok(removed)
    }

    fn create_test_run(&self, request: &CreateRunRequest) -> Result<TestRunRecord, ApiError> {
        let mut state = self.state.borrow_mut();
        let id = state.allocate();
        state.runs.insert(id, request.state.to_string());
        state.writes.push(format!("create_test_run #{id}"));
        Ok(TestRunRecord {
            id,
            name: request.name.clone(),
            state: request.state.to_string(),
        })
    }

    fn add_test_results(&self, run: RunId, results: &[RunResultRecord]) -> Result<(), ApiError> {
        let mut state = self.state.borrow_mut();
        if state.fail_results {
            return Err(ApiError::Status {
                status: 500,
                body: "results rejected".to_string(),
            });
        }
        state.results.entry(run.get()).or_default().extend(results.iter().cloned());
        state.writes.push(format!("add_test_results #{run}"));
        Ok(())
    }

    fn update_test_run_state(&self, run: RunId, state_label: &str) -> Result<(), ApiError> {
        let mut state = self.state.borrow_mut();
        state.runs.insert(run.get(), state_label.to_string());
        state.writes.push(format!("update_test_run_state #{run} {state_label}"));
        Ok(())
    }
}

/// Applies a patch document to a work item snapshot.
fn apply(item: &mut WorkItem, document: &[PatchOperation]) {
    for operation in document {
        if let Some(field) = operation.field_name() {
            item.fields.insert(field.to_string(), operation.value.clone());
        } else if operation.op == PatchOp::Add && operation.path == "/relations/-" {
            item.relations.push(WorkItemRelation {
                rel: operation.value["rel"].as_str().unwrap().to_string(),
                url: operation.value["url"].as_str().unwrap().to_string(),
            });
        }
    }
}

/// Builds a 404 status error.
fn not_found() -> ApiError {
    ApiError::Status {
        status: 404,
        body: "not found".to_string(),
    }
}

/// Returns the REST URL of a fake work item.
pub fn work_item_url(id: u64) -> String {
    format!("https://fake.invalid/_apis/wit/workItems/{id}")
}

/// Returns the self link of a fake requirement.
pub fn requirement_link(id: u64) -> String {
    format!("https://fake.invalid/_apis/wit/workItems/{id}?self")
}

// ============================================================================
// SECTION: Adapter Builders
// ============================================================================

/// Creates an adapter over `api` with default options for plan "Regression".
pub fn adapter(api: FakeAzureDevops) -> (AzureDevopsClient<FakeAzureDevops>, Arc<MemoryEventSink>) {
    adapter_with(api, AzureDevopsOptions::new("Regression", "1234"))
}

/// Creates an adapter with explicit options.
pub fn adapter_with(
    api: FakeAzureDevops,
    options: AzureDevopsOptions,
) -> (AzureDevopsClient<FakeAzureDevops>, Arc<MemoryEventSink>) {
    let sink = Arc::new(MemoryEventSink::new());
    (AzureDevopsClient::new(api, options, sink.clone()), sink)
}

// ============================================================================
// SECTION: Loopback Server
// ============================================================================

/// Request observed by the loopback server.
#[derive(Debug, Clone)]
pub struct CapturedRequest {
    /// HTTP method.
    pub method: String,
    /// Request target (path and query).
    pub url: String,
    /// Authorization header.
    pub authorization: Option<String>,
    /// Content-Type header.
    pub content_type: Option<String>,
    /// Request body.
    pub body: String,
}

/// Scripted response served by the loopback server.
#[derive(Debug, Clone)]
pub struct Scripted {
    /// Status code.
    pub status: u16,
    /// Response body.
    pub body: String,
    /// Extra headers.
    pub headers: Vec<(String, String)>,
}

impl Scripted {
    /// Creates a JSON response.
    pub fn json(status: u16, body: &str) -> Self {
        Self {
            status,
            body: body.to_string(),
            headers: Vec::new(),
        }
    }

    /// Adds a header.
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }
}

/// Serves `responses` in order and reports each request.
pub fn spawn_server(
    responses: Vec<Scripted>,
) -> (String, mpsc::Receiver<CapturedRequest>, thread::JoinHandle<()>) {
    let server = Server::http("127.0.0.1:0").unwrap();
    let addr = server.server_addr().to_ip().unwrap();
    let url = format!("http://{addr}/org");
    let (sender, receiver) = mpsc::channel();

    let handle = thread::spawn(move || {
        for scripted in responses {
            let Ok(mut request) = server.recv() else {
                return;
            };
            let header = |name: &'static str| {
                request
                    .headers()
                    .iter()
                    .find(|header| header.field.equiv(name))
                    .map(|header| header.value.as_str().to_string())
            };
            let authorization = header("Authorization");
            let content_type = header("Content-Type");
            let mut body = String::new();
            std::io::Read::read_to_string(request.as_reader(), &mut body).unwrap();
            sender
                .send(CapturedRequest {
                    method: request.method().to_string(),
                    url: request.url().to_string(),
                    authorization,
                    content_type,
                    body,
                })
                .unwrap();
            let mut response =
                Response::from_string(scripted.body).with_status_code(scripted.status).with_header(
                    Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..]).unwrap(),
                );
            for (name, value) in scripted.headers {
                let header = Header::from_bytes(name.as_bytes(), value.as_bytes()).unwrap();
                response = response.with_header(header);
            }
            let _ = request.respond(response);
        }
    });

    (url, receiver, handle)
}
