//! API integration tests
//!
//! These exercise a running server (cargo run) against a scratch database.
//! Run with: cargo test -- --ignored

use reqwest::Client;
use serde_json::{json, Value};

const BASE_URL: &str = "http://localhost:8080/api/v1";

async fn submit_request(client: &Client, quantity: i32, required_date: &str) -> Value {
    let response = client
        .post(format!("{}/requests", BASE_URL))
        .json(&json!({
            "customer_id": 1,
            "employee_id": 2,
            "location_id": 1,
            "purpose": "site maintenance",
            "required_date": required_date,
            "items": [
                {
                    "item_description": "Cordless drill",
                    "quantity_requested": quantity
                }
            ]
        }))
        .send()
        .await
        .expect("Failed to submit request");
    assert_eq!(response.status(), 201);
    response.json().await.expect("Failed to parse request")
}

async fn first_item_id(client: &Client, request_id: i64) -> i64 {
    let detail: Value = client
        .get(format!("{}/requests/{}", BASE_URL, request_id))
        .send()
        .await
        .expect("Failed to fetch request detail")
        .json()
        .await
        .expect("Failed to parse request detail");
    detail["items"][0]["id"].as_i64().expect("No item id")
}

async fn approve(client: &Client, request_id: i64, item_id: i64, quantity: i32) {
    let response = client
        .post(format!("{}/requests/{}/approve", BASE_URL, request_id))
        .json(&json!({
            "admin_id": 9,
            "approvals": [{ "borrowing_item_id": item_id, "quantity_approved": quantity }]
        }))
        .send()
        .await
        .expect("Failed to approve");
    assert_eq!(response.status(), 200);
}

async fn borrow(client: &Client, request_id: i64, item_id: i64, quantity: i32) {
    let response = client
        .post(format!("{}/requests/{}/borrow", BASE_URL, request_id))
        .json(&json!({
            "employee_id": 2,
            "lines": [{ "borrowing_item_id": item_id, "quantity": quantity }]
        }))
        .send()
        .await
        .expect("Failed to borrow");
    assert_eq!(response.status(), 201);
}

async fn return_items(
    client: &Client,
    request_id: i64,
    item_id: i64,
    quantity: i32,
    condition: &str,
) -> reqwest::Response {
    client
        .post(format!("{}/requests/{}/return", BASE_URL, request_id))
        .json(&json!({
            "employee_id": 3,
            "lines": [{
                "borrowing_item_id": item_id,
                "quantity": quantity,
                "condition_status": condition
            }]
        }))
        .send()
        .await
        .expect("Failed to send return")
}

#[tokio::test]
#[ignore]
async fn test_health_check() {
    let client = Client::new();

    let response = client
        .get(format!("{}/health", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
#[ignore]
async fn test_item_type_crud() {
    let client = Client::new();

    let response = client
        .post(format!("{}/item-types", BASE_URL))
        .json(&json!({ "name": "Pallet jack", "unit": "pcs", "estimated_value": 450.0 }))
        .send()
        .await
        .expect("Failed to create item type");
    assert_eq!(response.status(), 201);
    let created: Value = response.json().await.expect("Failed to parse response");
    let id = created["id"].as_i64().expect("No id");

    let response = client
        .put(format!("{}/item-types/{}", BASE_URL, id))
        .json(&json!({ "name": "Pallet jack (manual)" }))
        .send()
        .await
        .expect("Failed to update item type");
    assert_eq!(response.status(), 200);
    let updated: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(updated["name"], "Pallet jack (manual)");
    // Omitted fields survive a partial update
    assert_eq!(updated["unit"], "pcs");
    assert_eq!(updated["estimated_value"], "450.00");

    let response = client
        .delete(format!("{}/item-types/{}", BASE_URL, id))
        .send()
        .await
        .expect("Failed to delete item type");
    assert_eq!(response.status(), 204);
}

#[tokio::test]
#[ignore]
async fn test_negative_estimated_value_rejected() {
    let client = Client::new();

    let response = client
        .post(format!("{}/item-types", BASE_URL))
        .json(&json!({ "name": "Broken", "estimated_value": -1.0 }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 400);
}

/// Scenario A: request 10, approve 8, borrow 8, return 5 then 3, close.
#[tokio::test]
#[ignore]
async fn test_full_lifecycle_with_partial_approval() {
    let client = Client::new();

    let request = submit_request(&client, 10, "2099-06-01T00:00:00Z").await;
    let request_id = request["id"].as_i64().unwrap();
    assert_eq!(request["status"], "pending");

    let item_id = first_item_id(&client, request_id).await;
    approve(&client, request_id, item_id, 8).await;
    borrow(&client, request_id, item_id, 8).await;

    let first: Value = return_items(&client, request_id, item_id, 5, "good")
        .await
        .json()
        .await
        .expect("Failed to parse return");
    assert_eq!(first["transaction_type"], "partial_return");

    let second: Value = return_items(&client, request_id, item_id, 3, "good")
        .await
        .json()
        .await
        .expect("Failed to parse return");
    assert_eq!(second["transaction_type"], "return");

    let balances: Value = client
        .get(format!("{}/requests/{}/outstanding", BASE_URL, request_id))
        .send()
        .await
        .expect("Failed to fetch balances")
        .json()
        .await
        .expect("Failed to parse balances");
    assert_eq!(balances[0]["quantity_borrowed"], 8);
    assert_eq!(balances[0]["quantity_returned"], 8);

    let response = client
        .post(format!("{}/requests/{}/close", BASE_URL, request_id))
        .send()
        .await
        .expect("Failed to close");
    assert_eq!(response.status(), 200);
    let closed: Value = response.json().await.expect("Failed to parse close");
    assert_eq!(closed["status"], "returned");
}

/// Scenario B: over-return is rejected and leaves state untouched.
#[tokio::test]
#[ignore]
async fn test_over_return_rejected() {
    let client = Client::new();

    let request = submit_request(&client, 10, "2099-06-01T00:00:00Z").await;
    let request_id = request["id"].as_i64().unwrap();
    let item_id = first_item_id(&client, request_id).await;
    approve(&client, request_id, item_id, 8).await;
    borrow(&client, request_id, item_id, 8).await;

    let response = return_items(&client, request_id, item_id, 5, "good").await;
    assert_eq!(response.status(), 201);

    // 5 already back, returning 6 more would make 11 > 8 borrowed
    let response = return_items(&client, request_id, item_id, 6, "good").await;
    assert_eq!(response.status(), 422);

    let balances: Value = client
        .get(format!("{}/requests/{}/outstanding", BASE_URL, request_id))
        .send()
        .await
        .expect("Failed to fetch balances")
        .json()
        .await
        .expect("Failed to parse balances");
    assert_eq!(balances[0]["quantity_returned"], 5);

    // Read projection is stable across calls with no writes between
    let again: Value = client
        .get(format!("{}/requests/{}/outstanding", BASE_URL, request_id))
        .send()
        .await
        .expect("Failed to fetch balances")
        .json()
        .await
        .expect("Failed to parse balances");
    assert_eq!(balances, again);
}

/// Scenario C: past-due request with outstanding items is overdue until
/// fully returned.
#[tokio::test]
#[ignore]
async fn test_overdue_derivation() {
    let client = Client::new();

    let request = submit_request(&client, 4, "2020-01-01T00:00:00Z").await;
    let request_id = request["id"].as_i64().unwrap();
    let item_id = first_item_id(&client, request_id).await;
    approve(&client, request_id, item_id, 4).await;
    borrow(&client, request_id, item_id, 4).await;
    return_items(&client, request_id, item_id, 1, "good").await;

    let overdue: Value = client
        .get(format!("{}/requests/overdue", BASE_URL))
        .send()
        .await
        .expect("Failed to fetch overdue list")
        .json()
        .await
        .expect("Failed to parse overdue list");
    let ids: Vec<i64> = overdue
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["id"].as_i64().unwrap())
        .collect();
    assert!(ids.contains(&request_id));

    return_items(&client, request_id, item_id, 3, "good").await;

    let overdue: Value = client
        .get(format!("{}/requests/overdue", BASE_URL))
        .send()
        .await
        .expect("Failed to fetch overdue list")
        .json()
        .await
        .expect("Failed to parse overdue list");
    let ids: Vec<i64> = overdue
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["id"].as_i64().unwrap())
        .collect();
    assert!(!ids.contains(&request_id));
}

/// Scenario D: one damage report per return item, and the report locks the
/// return item against update and delete.
#[tokio::test]
#[ignore]
async fn test_damage_report_lock() {
    let client = Client::new();

    let request = submit_request(&client, 2, "2099-06-01T00:00:00Z").await;
    let request_id = request["id"].as_i64().unwrap();
    let item_id = first_item_id(&client, request_id).await;
    approve(&client, request_id, item_id, 2).await;
    borrow(&client, request_id, item_id, 2).await;

    let returned: Value = return_items(&client, request_id, item_id, 2, "damaged")
        .await
        .json()
        .await
        .expect("Failed to parse return");
    let return_item_id = returned["return_items"][0]["id"].as_i64().unwrap();

    let report = json!({
        "employee_id": 3,
        "damage_type": "mechanical",
        "damage_description": "Chuck no longer locks",
        "repair_cost": 35.0
    });

    let response = client
        .post(format!("{}/return-items/{}/damage-report", BASE_URL, return_item_id))
        .json(&report)
        .send()
        .await
        .expect("Failed to file report");
    assert_eq!(response.status(), 201);

    // Second filing violates the one-report rule
    let response = client
        .post(format!("{}/return-items/{}/damage-report", BASE_URL, return_item_id))
        .json(&report)
        .send()
        .await
        .expect("Failed to send duplicate report");
    assert_eq!(response.status(), 409);

    // The report locks the return item
    let response = client
        .put(format!("{}/return-items/{}", BASE_URL, return_item_id))
        .json(&json!({ "quantity_returned": 1 }))
        .send()
        .await
        .expect("Failed to send update");
    assert_eq!(response.status(), 409);

    let response = client
        .delete(format!("{}/return-items/{}", BASE_URL, return_item_id))
        .send()
        .await
        .expect("Failed to send delete");
    assert_eq!(response.status(), 409);
}

#[tokio::test]
#[ignore]
async fn test_damage_report_requires_damaged_or_lost() {
    let client = Client::new();

    let request = submit_request(&client, 1, "2099-06-01T00:00:00Z").await;
    let request_id = request["id"].as_i64().unwrap();
    let item_id = first_item_id(&client, request_id).await;
    approve(&client, request_id, item_id, 1).await;
    borrow(&client, request_id, item_id, 1).await;

    let returned: Value = return_items(&client, request_id, item_id, 1, "good")
        .await
        .json()
        .await
        .expect("Failed to parse return");
    let return_item_id = returned["return_items"][0]["id"].as_i64().unwrap();

    let response = client
        .post(format!("{}/return-items/{}/damage-report", BASE_URL, return_item_id))
        .json(&json!({
            "employee_id": 3,
            "damage_type": "surface",
            "damage_description": "Scratched"
        }))
        .send()
        .await
        .expect("Failed to send report");
    assert_eq!(response.status(), 422);
}

#[tokio::test]
#[ignore]
async fn test_state_machine_legality() {
    let client = Client::new();

    let request = submit_request(&client, 3, "2099-06-01T00:00:00Z").await;
    let request_id = request["id"].as_i64().unwrap();
    let item_id = first_item_id(&client, request_id).await;

    // Borrow before approval is illegal
    let response = client
        .post(format!("{}/requests/{}/borrow", BASE_URL, request_id))
        .json(&json!({
            "employee_id": 2,
            "lines": [{ "borrowing_item_id": item_id, "quantity": 1 }]
        }))
        .send()
        .await
        .expect("Failed to send borrow");
    assert_eq!(response.status(), 409);

    // Return before borrow is illegal
    let response = return_items(&client, request_id, item_id, 1, "good").await;
    assert_eq!(response.status(), 409);

    approve(&client, request_id, item_id, 3).await;

    // Second approval is illegal
    let response = client
        .post(format!("{}/requests/{}/approve", BASE_URL, request_id))
        .json(&json!({ "admin_id": 9 }))
        .send()
        .await
        .expect("Failed to send approve");
    assert_eq!(response.status(), 409);

    // Rejection after approval is illegal
    let response = client
        .post(format!("{}/requests/{}/reject", BASE_URL, request_id))
        .json(&json!({ "admin_id": 9, "reason": "too late" }))
        .send()
        .await
        .expect("Failed to send reject");
    assert_eq!(response.status(), 409);

    // Close with everything still out is illegal
    borrow(&client, request_id, item_id, 3).await;
    let response = client
        .post(format!("{}/requests/{}/close", BASE_URL, request_id))
        .send()
        .await
        .expect("Failed to send close");
    assert_eq!(response.status(), 422);
}

#[tokio::test]
#[ignore]
async fn test_borrow_capped_by_approved_quantity() {
    let client = Client::new();

    let request = submit_request(&client, 10, "2099-06-01T00:00:00Z").await;
    let request_id = request["id"].as_i64().unwrap();
    let item_id = first_item_id(&client, request_id).await;
    approve(&client, request_id, item_id, 8).await;

    let response = client
        .post(format!("{}/requests/{}/borrow", BASE_URL, request_id))
        .json(&json!({
            "employee_id": 2,
            "lines": [{ "borrowing_item_id": item_id, "quantity": 9 }]
        }))
        .send()
        .await
        .expect("Failed to send borrow");
    assert_eq!(response.status(), 422);
}

/// Repeated lines for one item count as their sum, both for the approved
/// cap and for the recorded borrowed quantity.
#[tokio::test]
#[ignore]
async fn test_duplicate_borrow_lines_summed() {
    let client = Client::new();

    let request = submit_request(&client, 10, "2099-06-01T00:00:00Z").await;
    let request_id = request["id"].as_i64().unwrap();
    let item_id = first_item_id(&client, request_id).await;
    approve(&client, request_id, item_id, 8).await;

    // 5 + 4 = 9 > 8 approved, even though each line alone is within the cap
    let response = client
        .post(format!("{}/requests/{}/borrow", BASE_URL, request_id))
        .json(&json!({
            "employee_id": 2,
            "lines": [
                { "borrowing_item_id": item_id, "quantity": 5 },
                { "borrowing_item_id": item_id, "quantity": 4 }
            ]
        }))
        .send()
        .await
        .expect("Failed to send borrow");
    assert_eq!(response.status(), 422);

    // 5 + 3 = 8 fits and is recorded as the total
    let response = client
        .post(format!("{}/requests/{}/borrow", BASE_URL, request_id))
        .json(&json!({
            "employee_id": 2,
            "lines": [
                { "borrowing_item_id": item_id, "quantity": 5 },
                { "borrowing_item_id": item_id, "quantity": 3 }
            ]
        }))
        .send()
        .await
        .expect("Failed to send borrow");
    assert_eq!(response.status(), 201);

    let balances: Value = client
        .get(format!("{}/requests/{}/outstanding", BASE_URL, request_id))
        .send()
        .await
        .expect("Failed to fetch balances")
        .json()
        .await
        .expect("Failed to parse balances");
    assert_eq!(balances[0]["quantity_borrowed"], 8);
}

/// A condition corrected to good closes the door on damage reports.
#[tokio::test]
#[ignore]
async fn test_condition_change_blocks_damage_report() {
    let client = Client::new();

    let request = submit_request(&client, 2, "2099-06-01T00:00:00Z").await;
    let request_id = request["id"].as_i64().unwrap();
    let item_id = first_item_id(&client, request_id).await;
    approve(&client, request_id, item_id, 2).await;
    borrow(&client, request_id, item_id, 2).await;

    let returned: Value = return_items(&client, request_id, item_id, 2, "damaged")
        .await
        .json()
        .await
        .expect("Failed to parse return");
    let return_item_id = returned["return_items"][0]["id"].as_i64().unwrap();

    let response = client
        .put(format!("{}/return-items/{}", BASE_URL, return_item_id))
        .json(&json!({ "condition_status": "good" }))
        .send()
        .await
        .expect("Failed to send update");
    assert_eq!(response.status(), 200);

    let response = client
        .post(format!("{}/return-items/{}/damage-report", BASE_URL, return_item_id))
        .json(&json!({
            "employee_id": 3,
            "damage_type": "mechanical",
            "damage_description": "Bent frame"
        }))
        .send()
        .await
        .expect("Failed to send report");
    assert_eq!(response.status(), 422);
}

#[tokio::test]
#[ignore]
async fn test_approval_above_requested_rejected() {
    let client = Client::new();

    let request = submit_request(&client, 5, "2099-06-01T00:00:00Z").await;
    let request_id = request["id"].as_i64().unwrap();
    let item_id = first_item_id(&client, request_id).await;

    let response = client
        .post(format!("{}/requests/{}/approve", BASE_URL, request_id))
        .json(&json!({
            "admin_id": 9,
            "approvals": [{ "borrowing_item_id": item_id, "quantity_approved": 6 }]
        }))
        .send()
        .await
        .expect("Failed to send approve");
    assert_eq!(response.status(), 400);
}

#[tokio::test]
#[ignore]
async fn test_delete_request_with_history_rejected() {
    let client = Client::new();

    let request = submit_request(&client, 1, "2099-06-01T00:00:00Z").await;
    let request_id = request["id"].as_i64().unwrap();
    let item_id = first_item_id(&client, request_id).await;
    approve(&client, request_id, item_id, 1).await;
    borrow(&client, request_id, item_id, 1).await;

    let response = client
        .delete(format!("{}/requests/{}", BASE_URL, request_id))
        .send()
        .await
        .expect("Failed to send delete");
    assert_eq!(response.status(), 409);
}

#[tokio::test]
#[ignore]
async fn test_list_requests_with_status_filter() {
    let client = Client::new();

    let request = submit_request(&client, 1, "2099-06-01T00:00:00Z").await;
    let request_id = request["id"].as_i64().unwrap();

    let body: Value = client
        .get(format!("{}/requests?status=pending&per_page=100", BASE_URL))
        .send()
        .await
        .expect("Failed to list requests")
        .json()
        .await
        .expect("Failed to parse list");
    assert!(body["items"].is_array());
    assert!(body["total"].is_number());
    let ids: Vec<i64> = body["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["id"].as_i64().unwrap())
        .collect();
    assert!(ids.contains(&request_id));

    let response = client
        .get(format!("{}/requests?status=bogus", BASE_URL))
        .send()
        .await
        .expect("Failed to list requests");
    assert_eq!(response.status(), 400);
}
