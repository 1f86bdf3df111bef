// crates/tcm-sync-azure/tests/http_api.rs
// ============================================================================
// Module: HTTP Client Tests
// Description: Loopback tests for the REST client.
// Purpose: Validate authentication, endpoint layout, paging, and error mapping.
// Dependencies: tcm-sync-azure, tcm-sync-core, tiny_http
// ============================================================================

//! ## Overview
//! Runs [`tcm_sync_azure::HttpAzureDevopsApi`] against a local `tiny_http`
//! server with scripted responses.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

mod common;

use serde_json::Value;
use tcm_sync_azure::ApiError;
use tcm_sync_azure::AzureDevopsApi;
use tcm_sync_azure::HttpApiConfig;
use tcm_sync_azure::HttpAzureDevopsApi;
use tcm_sync_azure::PatchOp;
use tcm_sync_azure::PatchOperation;
use tcm_sync_core::PlanId;
use tcm_sync_core::RunId;
use tcm_sync_core::SuiteId;
use tcm_sync_core::WorkItemId;

use crate::common::Scripted;
use crate::common::spawn_server;

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Builds a client for the loopback organization URL.
fn client(url: &str) -> HttpAzureDevopsApi {
    HttpAzureDevopsApi::new(HttpApiConfig::new(url, "pat", "Project")).unwrap()
}

/// Wraps items in the list envelope.
fn list(items: &str) -> String {
    format!(r#"{{"count":1,"value":[{items}]}}"#)
}

// ============================================================================
// SECTION: Work Items
// ============================================================================

/// Tests get work item authenticates and expands relations.
#[test]
fn get_work_item_authenticates_and_expands_relations() {
    let body = concat!(
        r#"{"id":42,"rev":5,"#,
        r#""fields":{"System.WorkItemType":"Test Case","System.Title":"Login"},"#,
        r#""relations":[{"rel":"Microsoft.VSTS.Common.TestedBy-Reverse","#,
        r#""url":"https://dev.invalid/7"}]}"#,
    );
    let (url, requests, handle) = spawn_server(vec![Scripted::json(200, body)]);

    let item = client(&url).get_work_item(WorkItemId::from_raw(42).unwrap()).unwrap().unwrap();

    handle.join().unwrap();
    let request = requests.recv().unwrap();
    assert_eq!(request.method, "GET");
    assert!(request.url.starts_with("/org/Project/_apis/wit/workitems/42?"));
    assert!(request.url.contains("api-version=6.0"));
    assert!(request.url.contains("%24expand=relations"));
    assert_eq!(request.authorization.as_deref(), Some("Basic OnBhdA=="));
    assert_eq!(item.rev, 5);
    assert_eq!(item.title(), Some("Login"));
    assert!(item.has_relation("Microsoft.VSTS.Common.TestedBy-Reverse", "https://dev.invalid/7"));
}

/// Tests missing work item is none.
#[test]
fn missing_work_item_is_none() {
    let (url, _requests, handle) = spawn_server(vec![Scripted::json(404, r#"{"message":"gone"}"#)]);

    let item = client(&url).get_work_item(WorkItemId::from_raw(7).unwrap()).unwrap();

    handle.join().unwrap();
    assert!(item.is_none());
}

/// Tests create work item posts json patch.
#[test]
fn create_work_item_posts_json_patch() {
    let (url, requests, handle) = spawn_server(vec![Scripted::json(
        200,
        r#"{"id":42,"rev":1,"fields":{"System.WorkItemType":"Test Case"}}"#,
    )]);
    let document = vec![PatchOperation::field(PatchOp::Add, "System.Title", "Login")];

    let item = client(&url).create_work_item("Test Case", &document).unwrap();

    handle.join().unwrap();
    let request = requests.recv().unwrap();
    assert_eq!(request.method, "POST");
    assert!(request.url.starts_with("/org/Project/_apis/wit/workitems/$Test%20Case?"));
    assert_eq!(request.content_type.as_deref(), Some("application/json-patch+json"));
    let sent: Value = serde_json::from_str(&request.body).unwrap();
    assert_eq!(
        sent,
        serde_json::json!([{"op": "add", "path": "/fields/System.Title", "value": "Login"}])
    );
    assert_eq!(item.id, 42);
}

/// Tests server error maps to status.
#[test]
fn server_error_maps_to_status() {
    let (url, _requests, handle) = spawn_server(vec![Scripted::json(500, "boom")]);

    let err = client(&url).update_work_item(WorkItemId::from_raw(42).unwrap(), &[]).unwrap_err();

    handle.join().unwrap();
    assert!(matches!(err, ApiError::Status { status: 500, ref body } if body == "boom"));
}

/// Tests invalid service url is rejected.
#[test]
fn invalid_service_url_is_rejected() {
    let err = HttpAzureDevopsApi::new(HttpApiConfig::new("ftp://dev.invalid/org", "pat", "Project"))
        .unwrap_err();

    assert!(matches!(err, ApiError::Client(_)));
}

// ============================================================================
// SECTION: Test Plans
// ============================================================================

/// Tests plan listing follows continuation header.
#[test]
fn plan_listing_follows_continuation_header() {
    let (url, requests, handle) = spawn_server(vec![
        Scripted::json(200, &list(r#"{"id":1,"name":"Smoke","rootSuite":{"id":2}}"#))
            .with_header("x-ms-continuationtoken", "abc"),
        Scripted::json(200, &list(r#"{"id":3,"name":"Regression","rootSuite":{"id":4}}"#)),
    ]);
    let api = client(&url);

    let first = api.list_test_plans(None).unwrap();
    let second = api.list_test_plans(first.continuation_token.as_deref()).unwrap();

    handle.join().unwrap();
    assert_eq!(first.continuation_token.as_deref(), Some("abc"));
    assert_eq!(second.continuation_token, None);
    assert_eq!(second.items[0].root_suite.id, 4);
    let _ = requests.recv().unwrap();
    let follow_up = requests.recv().unwrap();
    assert!(follow_up.url.starts_with("/org/Project/_apis/testplan/plans?"));
    assert!(follow_up.url.contains("continuationToken=abc"));
}

/// Tests suite membership removal treats 404 as absent.
#[test]
fn suite_membership_removal_treats_404_as_absent() {
    let (url, requests, handle) = spawn_server(vec![Scripted::json(404, "{}")]);

    let removed = client(&url)
        .remove_test_case_from_suite(
            PlanId::from_raw(1).unwrap(),
            SuiteId::from_raw(2).unwrap(),
            WorkItemId::from_raw(42).unwrap(),
        )
        .unwrap();

    handle.join().unwrap();
    let request = requests.recv().unwrap();
    assert_eq!(request.method, "DELETE");
    assert!(request.url.starts_with("/org/Project/_apis/testplan/Plans/1/Suites/2/TestCase?"));
    assert!(request.url.contains("testCaseIds=42"));
    assert!(!removed);
}

/// Tests add test case to suite posts work item reference.
#[test]
fn add_test_case_to_suite_posts_work_item_reference() {
    let (url, requests, handle) = spawn_server(vec![Scripted::json(200, "[]")]);

    client(&url)
        .add_test_case_to_suite(
            PlanId::from_raw(1).unwrap(),
            SuiteId::from_raw(2).unwrap(),
            WorkItemId::from_raw(42).unwrap(),
        )
        .unwrap();

    handle.join().unwrap();
    let request = requests.recv().unwrap();
    let sent: Value = serde_json::from_str(&request.body).unwrap();
    assert_eq!(sent, serde_json::json!([{"workItem":{"id":42}}]));
    assert!(request.url.contains("api-version=6.1-preview.2"));
}

// ============================================================================
// SECTION: Test Runs
// ============================================================================

/// Tests run state update patches run.
#[test]
fn run_state_update_patches_run() {
    let (url, requests, handle) = spawn_server(vec![Scripted::json(200, r#"{"id":9}"#)]);

    client(&url).update_test_run_state(RunId::from_raw(9).unwrap(), "Completed").unwrap();

    handle.join().unwrap();
    let request = requests.recv().unwrap();
    assert_eq!(request.method, "PATCH");
    assert!(request.url.starts_with("/org/Project/_apis/test/runs/9?"));
    let sent: Value = serde_json::from_str(&request.body).unwrap();
    assert_eq!(sent, serde_json::json!({"state":"Completed"}));
}
