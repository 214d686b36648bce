//! End-to-end tests for the HRIS API.
//!
//! This suite drives the router the way a client would:
//! - Statutory deduction computation per kind
//! - Salary grades
//! - Semi-monthly payslip assembly
//! - Leave approval chains, credits and terminal rejection
//! - Overtime requests
//! - Shift toggling and duplicate punch reconciliation
//! - Error cases

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use serde_json::{Value, json};
use std::str::FromStr;
use tower::ServiceExt;

use hris_core::api::{AppState, create_router};
use hris_core::config::ConfigLoader;
use hris_core::models::{
    BiometricDetail, Department, Employee, Job, LeaveApprover, Role, Shift,
};
use hris_core::repository::{DirectoryRepository, InMemoryStore};

// =============================================================================
// Test Helpers
// =============================================================================

fn person(id: &str, department: &str, role: Role, rank: Option<&str>) -> Employee {
    Employee {
        id: id.to_string(),
        name: id.to_string(),
        department_id: Some(department.to_string()),
        role,
        rank: rank.map(str::to_string),
        mp2_enrolled: false,
    }
}

fn seeded_store() -> InMemoryStore {
    let store = InMemoryStore::new();
    store.insert_department(Department {
        id: "it".to_string(),
        name: "IT".to_string(),
    });
    store.insert_job(Job {
        code: "ADM".to_string(),
        title: "Administrative Aide".to_string(),
        salary_grade: 1,
        department_ids: vec!["it".to_string()],
        is_active: true,
    });
    for employee in [
        person("emp_001", "it", Role::Employee, Some("ADM-2")),
        person("head_001", "it", Role::DepartmentHead, None),
        person("dir_001", "it", Role::Director, None),
        person("pres_001", "it", Role::President, None),
        person("hr_001", "it", Role::Hr, None),
    ] {
        store.insert_employee(employee);
    }
    store.save_leave_approver(LeaveApprover {
        department_id: "it".to_string(),
        department_approver: Some("head_001".to_string()),
        director_approver: Some("dir_001".to_string()),
        president_approver: Some("pres_001".to_string()),
        hr_approver: Some("hr_001".to_string()),
    });
    for (id, start, end, active) in [("day", 9, 17, true), ("retired", 7, 15, false)] {
        store.insert_shift(Shift {
            id: id.to_string(),
            description: id.to_string(),
            start_time: NaiveTime::from_hms_opt(start, 0, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(end, 0, 0).unwrap(),
            is_active: active,
        });
    }
    store.insert_biometric_detail(BiometricDetail {
        user_id: "emp_001".to_string(),
        user_id_in_device: 17,
    });
    store
}

fn create_router_for_test() -> Router {
    let config = ConfigLoader::load("./config/payroll")
        .expect("Failed to load config")
        .into_store(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap())
        .unwrap();
    create_router(AppState::new(config, seeded_store()))
}

/// Normalize decimal string by removing trailing zeros after decimal point
fn normalize_decimal(s: &str) -> String {
    Decimal::from_str(s).unwrap().normalize().to_string()
}

fn assert_amount(value: &Value, expected: &str) {
    let actual = value.as_str().unwrap_or_else(|| panic!("not a decimal string: {}", value));
    assert_eq!(
        normalize_decimal(actual),
        normalize_decimal(expected),
        "Expected {}, got {}",
        expected,
        actual
    );
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: Value = serde_json::from_slice(&body_bytes).unwrap();
    (status, json)
}

async fn post(router: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    send(
        router,
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await
}

async fn get(router: &Router, uri: &str) -> (StatusCode, Value) {
    send(router, Request::builder().uri(uri).body(Body::empty()).unwrap()).await
}

async fn compute(router: &Router, kind: &str, salary: &str) -> Value {
    let (status, json) = post(
        router,
        "/deductions/compute",
        json!({ "kind": kind, "salary": salary }),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{}", json);
    json
}

// =============================================================================
// Deductions
// =============================================================================

#[tokio::test]
async fn test_sss_counts_full_brackets() {
    let router = create_router_for_test();
    // (6000 - 5250) / 500 = 1 full bracket: 250 + 25
    let json = compute(&router, "SSS", "6000").await;
    assert_amount(&json["amount"], "275");
    assert_eq!(json["audit_step"]["rule_id"], "sss_tiered_contribution");
}

#[tokio::test]
async fn test_sss_clamps_outside_compensation_range() {
    let router = create_router_for_test();
    assert_amount(&compute(&router, "SSS", "3000").await["amount"], "250");
    assert_amount(&compute(&router, "SSS", "40000").await["amount"], "1750");
}

#[tokio::test]
async fn test_philhealth_employee_share() {
    let router = create_router_for_test();
    // 20000 × 5% / 2
    assert_amount(&compute(&router, "PHILHEALTH", "20000").await["amount"], "500");
    assert_amount(&compute(&router, "PHILHEALTH", "500000").await["amount"], "2500");
}

#[tokio::test]
async fn test_tax_bracket_lookup() {
    let router = create_router_for_test();
    assert_amount(&compute(&router, "TAX", "10000").await["amount"], "0");
    // 937.50 + (20000 - 16667) × 20%
    assert_amount(&compute(&router, "TAX", "20000").await["amount"], "1604.10");
}

#[tokio::test]
async fn test_pagibig_is_half_of_fixed_amount() {
    let router = create_router_for_test();
    assert_amount(&compute(&router, "PAG-IBIG", "99999").await["amount"], "100");
}

#[tokio::test]
async fn test_unknown_deduction_kind_is_rejected() {
    let router = create_router_for_test();
    let (status, json) = post(
        &router,
        "/deductions/compute",
        json!({ "kind": "GSIS", "salary": "1000" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "MALFORMED_JSON");
}

// =============================================================================
// Salary grades
// =============================================================================

#[tokio::test]
async fn test_grade_one_is_minimum_wage() {
    let router = create_router_for_test();
    let (status, json) = get(&router, "/salary-grades/1").await;
    assert_eq!(status, StatusCode::OK);
    assert_amount(&json["basic_salary"], "13000");
    assert_eq!(json["steps"].as_array().unwrap().len(), 8);
    assert_eq!(json["steps"][0]["label"], "STEP 1");
}

#[tokio::test]
async fn test_grade_two_compounds_once() {
    let router = create_router_for_test();
    let (_, json) = get(&router, "/salary-grades/2").await;
    assert_amount(&json["basic_salary"], "14040");
}

// =============================================================================
// Payslips
// =============================================================================

#[tokio::test]
async fn test_second_half_payslip_charges_statutory_deductions() {
    let router = create_router_for_test();
    let (status, json) = post(
        &router,
        "/payslips",
        json!({ "user_id": "emp_001", "month": 3, "year": 2025, "period": "2ND" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{}", json);

    let breakdown = &json["breakdown"];
    assert_amount(&breakdown["basic_salary"], "7020");
    let deductions = breakdown["deductions"].as_array().unwrap();
    let names: Vec<&str> = deductions.iter().map(|d| d["name"].as_str().unwrap()).collect();
    assert_eq!(names, vec!["SSS", "PHILHEALTH", "PAG-IBIG", "TAX"]);
    assert_amount(&deductions[0]["amount"], "675");
    assert_amount(&deductions[1]["amount"], "351");
    assert_amount(&deductions[2]["amount"], "100");
    assert_amount(&deductions[3]["amount"], "0");
    assert_amount(&breakdown["net_salary"], "5894");

    assert_amount(&json["payslip"]["salary"], "14040");
    assert_amount(&json["payslip"]["net_salary"], "5894");
}

#[tokio::test]
async fn test_first_half_payslip_has_no_statutory_deductions() {
    let router = create_router_for_test();
    let (_, json) = post(
        &router,
        "/payslips",
        json!({ "user_id": "emp_001", "month": 3, "year": 2025, "period": "1ST" }),
    )
    .await;
    assert!(json["breakdown"]["deductions"].as_array().unwrap().is_empty());
    assert_amount(&json["breakdown"]["net_salary"], "7020");
}

#[tokio::test]
async fn test_payslip_is_created_once_per_period() {
    let router = create_router_for_test();
    let body = json!({ "user_id": "emp_001", "month": 4, "year": 2025, "period": "1ST" });
    let (_, first) = post(&router, "/payslips", body.clone()).await;
    let (_, second) = post(&router, "/payslips", body).await;
    assert_eq!(first["payslip"]["id"], second["payslip"]["id"]);
}

#[tokio::test]
async fn test_payslip_for_unknown_user_is_not_found() {
    let router = create_router_for_test();
    let (status, json) = post(
        &router,
        "/payslips",
        json!({ "user_id": "ghost", "month": 3, "year": 2025, "period": "1ST" }),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["code"], "NOT_FOUND");
}

// =============================================================================
// Leave approval
// =============================================================================

async fn file_leave(router: &Router, user: &str, leave_type: &str) -> Value {
    let (status, json) = post(
        router,
        "/leaves",
        json!({ "user_id": user, "date": "2025-03-10", "leave_type": leave_type }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", json);
    json
}

async fn respond(router: &Router, leave: &Value, responder: &str, decision: &str) -> (StatusCode, Value) {
    let uri = format!("/leaves/{}/response", leave["id"].as_str().unwrap());
    post(router, &uri, json!({ "responder": responder, "decision": decision })).await
}

#[tokio::test]
async fn test_leave_routes_through_head_then_hr() {
    let router = create_router_for_test();
    let leave = file_leave(&router, "emp_001", "PA").await;
    assert_eq!(leave["first_approver"]["approver"], "head_001");
    assert_eq!(leave["second_approver"]["approver"], "hr_001");

    let (status, _) = respond(&router, &leave, "head_001", "APPROVE").await;
    assert_eq!(status, StatusCode::OK);
    let (status, json) = respond(&router, &leave, "hr_001", "APPROVE").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["first_approver"]["status"], "APPROVED");
    assert_eq!(json["second_approver"]["status"], "APPROVED");
    assert_eq!(json["credit_consumed"], true);
}

#[tokio::test]
async fn test_president_leave_has_single_hr_slot() {
    let router = create_router_for_test();
    let leave = file_leave(&router, "pres_001", "UN").await;
    assert_eq!(leave["first_approver"]["approver"], "hr_001");
    assert!(leave["second_approver"].is_null());
}

#[tokio::test]
async fn test_non_approver_cannot_respond() {
    let router = create_router_for_test();
    let leave = file_leave(&router, "emp_001", "UN").await;
    let (status, json) = respond(&router, &leave, "dir_001", "APPROVE").await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(json["code"], "UNAUTHORIZED_APPROVER");
}

#[tokio::test]
async fn test_rejection_is_terminal() {
    let router = create_router_for_test();
    let leave = file_leave(&router, "emp_001", "UN").await;
    let (status, _) = respond(&router, &leave, "head_001", "REJECT").await;
    assert_eq!(status, StatusCode::OK);

    let (status, json) = respond(&router, &leave, "hr_001", "APPROVE").await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["code"], "REQUEST_ALREADY_RESOLVED");
}

#[tokio::test]
async fn test_invalid_decision_value() {
    let router = create_router_for_test();
    let leave = file_leave(&router, "emp_001", "UN").await;
    let (status, json) = respond(&router, &leave, "head_001", "MAYBE").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "INVALID_DECISION");
}

// =============================================================================
// Overtime
// =============================================================================

#[tokio::test]
async fn test_overtime_goes_to_chosen_department_head() {
    let router = create_router_for_test();
    let (status, overtime) = post(
        &router,
        "/overtime",
        json!({ "user_id": "emp_001", "approver": "head_001", "date": "2025-03-11" }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(overtime["status"], "PENDING");

    let uri = format!("/overtime/{}/response", overtime["id"].as_str().unwrap());
    let (status, _) = post(&router, &uri, json!({ "responder": "hr_001", "decision": "APPROVE" })).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, json) = post(&router, &uri, json!({ "responder": "head_001", "decision": "APPROVE" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "APPROVED");
}

#[tokio::test]
async fn test_overtime_approver_must_be_candidate() {
    let router = create_router_for_test();
    let (status, json) = post(
        &router,
        "/overtime",
        json!({ "user_id": "emp_001", "approver": "dir_001", "date": "2025-03-11" }),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(json["code"], "UNAUTHORIZED_APPROVER");
}

// =============================================================================
// Shifts and attendance
// =============================================================================

fn toggle_body(shift: &str) -> Value {
    json!({
        "department_id": "it",
        "date": "2025-03-03",
        "user_id": "emp_001",
        "shift_id": shift
    })
}

#[tokio::test]
async fn test_toggle_twice_unlinks() {
    let router = create_router_for_test();
    let (_, first) = post(&router, "/shifts/toggle", toggle_body("day")).await;
    assert_eq!(first["outcome"], "linked");
    let (_, second) = post(&router, "/shifts/toggle", toggle_body("day")).await;
    assert_eq!(second["outcome"], "unlinked");
}

#[tokio::test]
async fn test_inactive_shift_cannot_be_linked() {
    let router = create_router_for_test();
    let (status, json) = post(&router, "/shifts/toggle", toggle_body("retired")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "INACTIVE_SHIFT");
}

#[tokio::test]
async fn test_duplicate_clock_in_keeps_nearest_to_shift_start() {
    let router = create_router_for_test();
    post(&router, "/shifts/toggle", toggle_body("day")).await;

    let (status, kept) = post(
        &router,
        "/attendance/punches",
        json!({ "device_user_id": 17, "timestamp": "2025-03-03T08:58:00", "punch_code": 0 }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(kept["user_id"], "emp_001");
    assert_eq!(kept["punch"], "IN");
    let (_, dropped) = post(
        &router,
        "/attendance/punches",
        json!({ "device_user_id": 17, "timestamp": "2025-03-03T09:15:00", "punch_code": 0 }),
    )
    .await;

    let (status, report) = post(
        &router,
        "/attendance/reconcile",
        json!({ "user_id": "emp_001", "date": "2025-03-03" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["shift_id"], "day");
    assert_eq!(report["removed"], json!([dropped["id"]]));
}

#[tokio::test]
async fn test_unmapped_device_id_is_stored_as_orphan() {
    let router = create_router_for_test();
    let (status, json) = post(
        &router,
        "/attendance/punches",
        json!({ "device_user_id": 404, "timestamp": "2025-03-03T08:00:00", "punch_code": 1 }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(json["user_id"].is_null());
    assert_eq!(json["user_id_from_device"], 404);
}

#[tokio::test]
async fn test_unknown_punch_code_is_rejected() {
    let router = create_router_for_test();
    let (status, json) = post(
        &router,
        "/attendance/punches",
        json!({ "device_user_id": 17, "timestamp": "2025-03-03T08:00:00", "punch_code": 2 }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "INVALID_PUNCH");
}

// =============================================================================
// Request errors
// =============================================================================

#[tokio::test]
async fn test_missing_content_type() {
    let router = create_router_for_test();
    let (status, json) = send(
        &router,
        Request::builder()
            .method("POST")
            .uri("/leaves")
            .body(Body::from("{}"))
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "MISSING_CONTENT_TYPE");
}

#[tokio::test]
async fn test_missing_field_is_validation_error() {
    let router = create_router_for_test();
    let (status, json) = post(&router, "/leaves", json!({ "user_id": "emp_001" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "VALIDATION_ERROR");
}
