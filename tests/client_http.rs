//! ApiClient against an in-process axum server speaking the dashboard API

use axum::{
    extract::{Path, RawQuery, State},
    http::StatusCode,
    routing::{get, patch, post},
    Json, Router,
};
use chrono::{TimeZone, Utc};
use home_dashboard::{ApiClient, ApiError, ClientConfig, HomeApi};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use std::time::Duration;

const STAMP: &str = "2024-03-01T09:30:00";

#[derive(Default)]
struct Backend {
    next_id: i64,
    appliances: Vec<(i64, String, Option<u32>)>,
    tasks: Vec<FakeTask>,
    readings: Vec<(i64, f64, String)>,
    last_clear_query: Option<String>,
}

#[derive(Clone)]
struct FakeTask {
    id: i64,
    appliance_id: i64,
    due: String,
    completed: bool,
    completed_at: Option<String>,
}

impl Backend {
    fn id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn appliance_json(&self, id: i64) -> Option<Value> {
        self.appliances.iter().find(|a| a.0 == id).map(|(id, name, interval)| {
            json!({
                "id": id,
                "name": name,
                "cleaning_interval_days": interval,
                "created_at": STAMP,
            })
        })
    }
}

impl FakeTask {
    fn to_json(&self) -> Value {
        json!({
            "id": self.id,
            "appliance_id": self.appliance_id,
            "due_date": self.due,
            "completed": self.completed,
            "completed_at": self.completed_at,
        })
    }
}

type Shared = Arc<Mutex<Backend>>;
type Reply = Result<Json<Value>, (StatusCode, String)>;

fn not_found() -> (StatusCode, String) {
    (StatusCode::NOT_FOUND, r#"{"detail":"Not found"}"#.to_string())
}

fn reading_json(reading: &(i64, f64, String)) -> Value {
    json!({
        "id": reading.0,
        "recorded_at": STAMP,
        "value_c": reading.1,
        "room": reading.2,
    })
}

async fn dashboard(State(state): State<Shared>) -> Json<Value> {
    let b = state.lock().unwrap();
    let due: Vec<Value> = b
        .tasks
        .iter()
        .filter(|t| !t.completed)
        .map(|t| {
            let mut task = t.to_json();
            task["appliance"] = b.appliance_json(t.appliance_id).unwrap_or(Value::Null);
            task
        })
        .collect();

    let mut by_room = serde_json::Map::new();
    for r in &b.readings {
        by_room
            .entry(r.2.clone())
            .or_insert_with(|| Value::Array(Vec::new()))
            .as_array_mut()
            .unwrap()
            .push(reading_json(r));
    }

    Json(json!({
        "due_tasks": due,
        "recent_temps": b.readings.iter().map(reading_json).collect::<Vec<_>>(),
        "recent_temps_by_room": by_room,
    }))
}

async fn list_appliances(State(state): State<Shared>) -> Json<Value> {
    let b = state.lock().unwrap();
    let list: Vec<Value> = b
        .appliances
        .iter()
        .filter_map(|a| b.appliance_json(a.0))
        .collect();
    Json(Value::Array(list))
}

async fn create_appliance(State(state): State<Shared>, Json(body): Json<Value>) -> Reply {
    let name = body["name"].as_str().unwrap_or_default().to_string();
    if name == "explode" {
        return Err((StatusCode::INTERNAL_SERVER_ERROR, "database locked".to_string()));
    }
    let interval = body["cleaning_interval_days"].as_u64().map(|d| d as u32);

    let mut b = state.lock().unwrap();
    let id = b.id();
    b.appliances.push((id, name, interval));
    if interval.is_some() {
        let task_id = b.id();
        b.tasks.push(FakeTask {
            id: task_id,
            appliance_id: id,
            due: "2023-01-01".to_string(),
            completed: false,
            completed_at: None,
        });
    }
    Ok(Json(b.appliance_json(id).unwrap()))
}

async fn update_interval(
    State(state): State<Shared>,
    Path(id): Path<i64>,
    Json(body): Json<Value>,
) -> Reply {
    let mut b = state.lock().unwrap();
    let appliance = b.appliances.iter_mut().find(|a| a.0 == id).ok_or_else(not_found)?;
    appliance.2 = body["cleaning_interval_days"].as_u64().map(|d| d as u32);
    Ok(Json(b.appliance_json(id).unwrap()))
}

async fn bulk_delete(State(state): State<Shared>, Json(body): Json<Value>) -> Json<Value> {
    let ids: Vec<i64> = body["ids"]
        .as_array()
        .map(|ids| ids.iter().filter_map(Value::as_i64).collect())
        .unwrap_or_default();
    let mut b = state.lock().unwrap();
    let before = b.appliances.len();
    b.appliances.retain(|a| !ids.contains(&a.0));
    b.tasks.retain(|t| !ids.contains(&t.appliance_id));
    Json(json!({ "deleted": before - b.appliances.len() }))
}

async fn list_tasks(State(state): State<Shared>, Path(id): Path<i64>) -> Reply {
    let b = state.lock().unwrap();
    b.appliance_json(id).ok_or_else(not_found)?;
    let tasks: Vec<Value> = b
        .tasks
        .iter()
        .filter(|t| t.appliance_id == id)
        .map(FakeTask::to_json)
        .collect();
    Ok(Json(Value::Array(tasks)))
}

async fn complete_task(
    State(state): State<Shared>,
    Path(id): Path<i64>,
    Json(body): Json<Value>,
) -> Reply {
    let mut b = state.lock().unwrap();
    let task = b.tasks.iter_mut().find(|t| t.id == id).ok_or_else(not_found)?;
    if body["completed"].as_bool() == Some(true) && !task.completed {
        task.completed = true;
        task.completed_at = Some("2024-03-02T08:00:00.123456".to_string());
    }
    Ok(Json(task.to_json()))
}

async fn add_temperature(State(state): State<Shared>, Json(body): Json<Value>) -> Json<Value> {
    let mut b = state.lock().unwrap();
    let id = b.id();
    let reading = (
        id,
        body["value_c"].as_f64().unwrap_or_default(),
        body["room"].as_str().unwrap_or("default").to_string(),
    );
    let out = reading_json(&reading);
    b.readings.push(reading);
    Json(out)
}

async fn clear_temperatures(State(state): State<Shared>, RawQuery(query): RawQuery) -> Json<Value> {
    let mut b = state.lock().unwrap();
    let room = query
        .as_deref()
        .and_then(|q| q.strip_prefix("room="))
        .map(|r| urlencoding::decode(r).unwrap().into_owned());
    b.last_clear_query = query;

    let before = b.readings.len();
    match room {
        Some(room) => b.readings.retain(|r| r.2 != room),
        None => b.readings.clear(),
    }
    Json(json!({ "deleted": before - b.readings.len() }))
}

async fn spawn_server() -> (ApiClient, Shared) {
    let state: Shared = Arc::new(Mutex::new(Backend::default()));

    let app = Router::new()
        .route("/api/dashboard", get(dashboard))
        .route("/api/appliances/", get(list_appliances).post(create_appliance))
        .route("/api/appliances/bulk-delete", post(bulk_delete))
        .route("/api/appliances/:id/interval", patch(update_interval))
        .route("/api/appliances/:id/tasks", get(list_tasks))
        .route("/api/tasks/:id", patch(complete_task))
        .route(
            "/api/temperature/",
            post(add_temperature).delete(clear_temperatures),
        )
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let client = ApiClient::new(ClientConfig {
        base_url: format!("http://{}/", addr),
        request_timeout: Some(Duration::from_secs(5)),
    })
    .unwrap();
    (client, state)
}

#[tokio::test]
async fn test_create_list_and_naive_timestamps() {
    let (client, _state) = spawn_server().await;

    let created = client.create_appliance("Dishwasher", Some(30)).await.unwrap();
    assert_eq!(created.name, "Dishwasher");
    assert_eq!(created.cleaning_interval_days, Some(30));
    assert_eq!(
        created.created_at,
        Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap()
    );

    client.create_appliance("Cat Fountain", None).await.unwrap();
    let list = client.list_appliances().await.unwrap();
    assert_eq!(list.len(), 2);
    assert_eq!(list[1].cleaning_interval_days, None);
}

#[tokio::test]
async fn test_update_interval_and_unknown_id() {
    let (client, _state) = spawn_server().await;
    let a = client.create_appliance("Washer", None).await.unwrap();

    let updated = client.update_interval(a.id, Some(7)).await.unwrap();
    assert_eq!(updated.cleaning_interval_days, Some(7));
    let cleared = client.update_interval(a.id, None).await.unwrap();
    assert_eq!(cleared.cleaning_interval_days, None);

    let err = client.update_interval(999, Some(7)).await.unwrap_err();
    assert_eq!(err.status(), Some(404));
    assert_eq!(err.to_string(), r#"HTTP 404: {"detail":"Not found"}"#);
}

#[tokio::test]
async fn test_server_error_carries_status_and_body() {
    let (client, _state) = spawn_server().await;
    let err = client.create_appliance("explode", None).await.unwrap_err();
    assert!(matches!(err, ApiError::Status { status: 500, .. }));
    assert_eq!(err.to_string(), "HTTP 500: database locked");
}

#[tokio::test]
async fn test_bulk_delete_counts() {
    let (client, _state) = spawn_server().await;
    let a = client.create_appliance("A", None).await.unwrap();
    let b = client.create_appliance("B", None).await.unwrap();
    client.create_appliance("C", None).await.unwrap();

    assert_eq!(client.bulk_delete(&[a.id, b.id, 404]).await.unwrap(), 2);
    assert_eq!(client.list_appliances().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_tasks_and_idempotent_completion() {
    let (client, _state) = spawn_server().await;
    let a = client.create_appliance("Humidifier", Some(7)).await.unwrap();

    let tasks = client.list_tasks(a.id).await.unwrap();
    assert_eq!(tasks.len(), 1);
    assert!(tasks[0].is_overdue(Utc::now()));

    let done = client.complete_task(tasks[0].id).await.unwrap();
    assert!(done.completed);
    let stamped = done.completed_at.unwrap();

    let again = client.complete_task(tasks[0].id).await.unwrap();
    assert!(again.completed);
    assert_eq!(again.completed_at, Some(stamped));
    assert!(!again.is_overdue(Utc::now()));

    assert_eq!(client.list_tasks(999).await.unwrap_err().status(), Some(404));
}

#[tokio::test]
async fn test_dashboard_groups_rooms() {
    let (client, _state) = spawn_server().await;
    let a = client.create_appliance("Humidifier", Some(7)).await.unwrap();
    for (value, room) in [(18.0, "kitchen"), (20.0, "kitchen"), (19.0, "kitchen"), (21.5, "office")] {
        client.add_temperature(value, room).await.unwrap();
    }

    let snapshot = client.dashboard().await.unwrap();
    assert_eq!(snapshot.due_tasks.len(), 1);
    assert_eq!(snapshot.due_tasks[0].appliance.id, a.id);
    assert_eq!(snapshot.recent_temps.len(), 4);

    let rooms: Vec<&str> = snapshot.recent_temps_by_room.keys().map(String::as_str).collect();
    assert_eq!(rooms, vec!["kitchen", "office"]);
    let kitchen: Vec<f64> = snapshot.recent_temps_by_room["kitchen"]
        .iter()
        .map(|r| r.value_c)
        .collect();
    assert_eq!(kitchen, vec![18.0, 20.0, 19.0]);
}

#[tokio::test]
async fn test_clear_by_room_then_all() {
    let (client, state) = spawn_server().await;
    client.add_temperature(20.0, "living room").await.unwrap();
    client.add_temperature(21.0, "living room").await.unwrap();
    client.add_temperature(18.0, "kitchen").await.unwrap();

    assert_eq!(client.clear_temperatures(Some("living room")).await.unwrap(), 2);
    assert_eq!(
        state.lock().unwrap().last_clear_query.as_deref(),
        Some("room=living%20room")
    );

    assert_eq!(client.clear_temperatures(None).await.unwrap(), 1);
    assert_eq!(state.lock().unwrap().last_clear_query, None);
    assert!(client.dashboard().await.unwrap().recent_temps.is_empty());
}

#[tokio::test]
async fn test_unreachable_server_is_transport_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = ApiClient::with_base_url(format!("http://{}", addr)).unwrap();
    let err = client.dashboard().await.unwrap_err();
    assert!(matches!(err, ApiError::Transport(_)));
    assert_eq!(err.status(), None);
    assert!(err.to_string().starts_with("Request failed"));
}
