//! API integration tests
//!
//! These run against a live server seeded with `scripts/seed.sql`. The
//! scenarios share the seeded fixtures, so run them serially:
//! `cargo test -- --ignored --test-threads=1`

use reqwest::Client;
use serde_json::{json, Value};

const BASE_URL: &str = "http://localhost:8080/api/v1";
const STAFF_ID: &str = "00000000-0000-0000-0000-000000000001";

async fn get_json(client: &Client, path: &str) -> Value {
    client
        .get(format!("{}{}", BASE_URL, path))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response")
}

/// Find a seeded item by inventory code
async fn find_item(client: &Client, code: &str) -> Value {
    let items = get_json(client, "/items").await;
    items
        .as_array()
        .expect("items response is not an array")
        .iter()
        .find(|i| i["code"] == code)
        .unwrap_or_else(|| panic!("seed item {} not found", code))
        .clone()
}

async fn create_loan(client: &Client, lines: Value) -> reqwest::Response {
    client
        .post(format!("{}/loans", BASE_URL))
        .json(&json!({
            "borrower_type": "Estudiante",
            "borrower_identifier": "RU-12345",
            "borrower_name": "Ana Quispe",
            "due_date": "2099-01-01T00:00:00Z",
            "issued_by": STAFF_ID,
            "lines": lines
        }))
        .send()
        .await
        .expect("Failed to send request")
}

async fn return_all_lines(client: &Client, loan: &Value) {
    let decisions: Vec<Value> = loan["lines"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|l| l["returned"] == false)
        .map(|l| json!({ "line_id": l["id"], "condition": "Disponible" }))
        .collect();

    let response = client
        .post(format!("{}/loans/{}/return", BASE_URL, loan["id"]))
        .json(&json!({ "received_by": STAFF_ID, "decisions": decisions }))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());
}

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored --test-threads=1
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
async fn test_item_loan_exhausts_availability() {
    // Scenario: an item has stock 1; a loan takes it to 0 and a second
    // loan for the same item is rejected with a conflict.
    let client = Client::new();
    let item = find_item(&client, "EQ-0001").await;
    let item_id = item["id"].clone();

    let before = get_json(&client, &format!("/availability?item_id={}", item_id)).await;
    assert_eq!(before["total"], 1);
    assert_eq!(before["available"], 1, "item must start unborrowed");

    let response = create_loan(&client, json!([{ "item_id": item_id, "quantity": 1 }])).await;
    assert_eq!(response.status(), 201);
    let loan: Value = response.json().await.unwrap();
    assert_eq!(loan["status"], "Vigente");

    let during = get_json(&client, &format!("/availability?item_id={}", item_id)).await;
    assert_eq!(during["available"], 0);

    let second = create_loan(&client, json!([{ "item_id": item_id, "quantity": 1 }])).await;
    assert_eq!(second.status(), 409);

    return_all_lines(&client, &loan).await;

    let after = get_json(&client, &format!("/availability?item_id={}", item_id)).await;
    assert_eq!(after["available"], 1);
}

#[tokio::test]
#[ignore]
async fn test_part_availability_subtracts_outstanding() {
    // Scenario: part pool of 5 with an active loan line for 2 -> available 3.
    let client = Client::new();
    let item = find_item(&client, "EQ-0002").await;
    let details = get_json(&client, &format!("/items/{}", item["id"])).await;
    let part_id = details["parts"][0]["id"].clone();

    let response = create_loan(&client, json!([{ "part_id": part_id, "quantity": 2 }])).await;
    assert_eq!(response.status(), 201);
    let loan: Value = response.json().await.unwrap();

    let availability = get_json(&client, &format!("/availability?part_id={}", part_id)).await;
    assert_eq!(availability["total"], 5);
    assert_eq!(availability["outstanding"], 2);
    assert_eq!(availability["available"], 3);

    return_all_lines(&client, &loan).await;
}

#[tokio::test]
#[ignore]
async fn test_partial_then_damaged_return_closes_loan_with_incident() {
    // Scenario: loan with 2 lines; the first clean return leaves the loan
    // open, the second (damaged) closes it and files exactly one incident.
    let client = Client::new();
    let item = find_item(&client, "EQ-0001").await;
    let kit = find_item(&client, "EQ-0002").await;
    let details = get_json(&client, &format!("/items/{}", kit["id"])).await;
    let part_id = details["parts"][0]["id"].clone();

    let response = create_loan(
        &client,
        json!([
            { "item_id": item["id"], "quantity": 1 },
            { "part_id": part_id, "quantity": 1 }
        ]),
    )
    .await;
    assert_eq!(response.status(), 201);
    let loan: Value = response.json().await.unwrap();
    let lines = loan["lines"].as_array().unwrap();
    let item_line = lines.iter().find(|l| !l["item"].is_null()).unwrap();
    let part_line = lines.iter().find(|l| !l["part"].is_null()).unwrap();

    let incidents_before = get_json(&client, &format!("/incidents?item_id={}", kit["id"]))
        .await
        .as_array()
        .unwrap()
        .len();

    // First return: clean, loan stays open.
    let response = client
        .post(format!("{}/loans/{}/return", BASE_URL, loan["id"]))
        .json(&json!({
            "received_by": STAFF_ID,
            "decisions": [{ "line_id": item_line["id"], "condition": "Disponible" }]
        }))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());
    let partial: Value = response.json().await.unwrap();
    assert_eq!(partial["status"], "Vigente");
    assert!(partial["returned_date"].is_null());

    // Second return: damaged, loan closes and one incident is filed.
    let response = client
        .post(format!("{}/loans/{}/return", BASE_URL, loan["id"]))
        .json(&json!({
            "received_by": STAFF_ID,
            "decisions": [{
                "line_id": part_line["id"],
                "condition": "Dañado",
                "notes": "bent pin"
            }]
        }))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());
    let closed: Value = response.json().await.unwrap();
    assert_eq!(closed["status"], "Devuelto");
    assert!(!closed["returned_date"].is_null());

    let incidents = get_json(&client, &format!("/incidents?item_id={}", kit["id"])).await;
    let incidents = incidents.as_array().unwrap();
    assert_eq!(incidents.len(), incidents_before + 1);
    assert_eq!(incidents[0]["kind"], "Dañado");
    assert!(incidents[0]["description"]
        .as_str()
        .unwrap()
        .contains("bent pin"));
}

#[tokio::test]
#[ignore]
async fn test_unknown_issuing_user_is_rejected() {
    // Scenario: an issuing user absent from the user store is a stale
    // session, rejected with 403 and no loan persisted.
    let client = Client::new();
    let item = find_item(&client, "EQ-0001").await;
    let loans_before = get_json(&client, "/loans").await.as_array().unwrap().len();

    let response = client
        .post(format!("{}/loans", BASE_URL))
        .json(&json!({
            "borrower_type": "Externo",
            "borrower_identifier": "CI-445566",
            "borrower_name": "Luis Mamani",
            "due_date": "2099-01-01T00:00:00Z",
            "issued_by": "ffffffff-ffff-ffff-ffff-ffffffffffff",
            "lines": [{ "item_id": item["id"], "quantity": 1 }]
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 403);

    let loans_after = get_json(&client, "/loans").await.as_array().unwrap().len();
    assert_eq!(loans_after, loans_before);
}

#[tokio::test]
#[ignore]
async fn test_return_of_foreign_line_is_all_or_nothing() {
    // Scenario: a decision referencing a line from another loan fails the
    // whole batch with 404 and mutates nothing.
    let client = Client::new();
    let item = find_item(&client, "EQ-0002").await;
    let details = get_json(&client, &format!("/items/{}", item["id"])).await;
    let part_id = details["parts"][0]["id"].clone();

    let first = create_loan(&client, json!([{ "part_id": part_id, "quantity": 1 }])).await;
    let first: Value = first.json().await.unwrap();
    let second = create_loan(&client, json!([{ "part_id": part_id, "quantity": 1 }])).await;
    let second: Value = second.json().await.unwrap();
    let foreign_line = second["lines"][0]["id"].clone();
    let own_line = first["lines"][0]["id"].clone();

    let response = client
        .post(format!("{}/loans/{}/return", BASE_URL, first["id"]))
        .json(&json!({
            "received_by": STAFF_ID,
            "decisions": [
                { "line_id": own_line, "condition": "Disponible" },
                { "line_id": foreign_line, "condition": "Disponible" }
            ]
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 404);

    // The batch rolled back: the loan's own line is still outstanding.
    let reread = get_json(&client, &format!("/loans/{}", first["id"])).await;
    assert_eq!(reread["status"], "Vigente");
    assert_eq!(reread["lines"][0]["returned"], false);

    return_all_lines(&client, &first).await;
    return_all_lines(&client, &second).await;
}

#[tokio::test]
#[ignore]
async fn test_returned_line_cannot_be_returned_again() {
    let client = Client::new();
    let item = find_item(&client, "EQ-0002").await;
    let details = get_json(&client, &format!("/items/{}", item["id"])).await;
    let part_id = details["parts"][0]["id"].clone();

    let loan = create_loan(&client, json!([{ "part_id": part_id, "quantity": 1 }])).await;
    let loan: Value = loan.json().await.unwrap();
    return_all_lines(&client, &loan).await;

    let response = client
        .post(format!("{}/loans/{}/return", BASE_URL, loan["id"]))
        .json(&json!({
            "received_by": STAFF_ID,
            "decisions": [{ "line_id": loan["lines"][0]["id"], "condition": "Perdido" }]
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 404);
}

#[tokio::test]
#[ignore]
async fn test_stats_track_active_loan_count() {
    let client = Client::new();
    let item = find_item(&client, "EQ-0002").await;
    let details = get_json(&client, &format!("/items/{}", item["id"])).await;
    let part_id = details["parts"][0]["id"].clone();

    let before = get_json(&client, "/stats").await;
    let active_before = before["loans"]["active"].as_i64().unwrap();
    let overdue_before = before["loans"]["overdue"].as_i64().unwrap();

    let loan = create_loan(&client, json!([{ "part_id": part_id, "quantity": 1 }])).await;
    assert_eq!(loan.status(), 201);
    let loan: Value = loan.json().await.unwrap();

    let during = get_json(&client, "/stats").await;
    assert_eq!(during["loans"]["active"].as_i64().unwrap(), active_before + 1);
    // Due in 2099, so the new loan must not count as overdue.
    assert_eq!(during["loans"]["overdue"].as_i64().unwrap(), overdue_before);

    return_all_lines(&client, &loan).await;

    let after = get_json(&client, "/stats").await;
    assert_eq!(after["loans"]["active"].as_i64().unwrap(), active_before);
}

#[tokio::test]
#[ignore]
async fn test_malformed_loan_requests_are_rejected() {
    let client = Client::new();

    // No lines at all.
    let response = create_loan(&client, json!([])).await;
    assert_eq!(response.status(), 400);

    // A line referencing both an item and a part.
    let response =
        create_loan(&client, json!([{ "item_id": 1, "part_id": 1, "quantity": 1 }])).await;
    assert_eq!(response.status(), 400);

    // An unrecognized return condition label.
    let response = client
        .post(format!("{}/loans/1/return", BASE_URL))
        .json(&json!({
            "received_by": STAFF_ID,
            "decisions": [{ "line_id": 1, "condition": "Roto" }]
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 422);
}
