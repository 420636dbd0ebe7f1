//! In-process fake of the simulation server.
//!
//! Implements just enough of the HTTP surface to exercise the store:
//! state, turn and day advance, generic actions, negotiation, lifecycle,
//! and the auxiliary reports. Individual responses can be delayed so
//! tests can force overlapping requests to resolve out of order.

#![allow(dead_code)]

use std::collections::{BTreeMap, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use laundromat_client::{ClientConfig, Store};
use serde::Deserialize;
use serde_json::{Value, json};
use tokio::net::TcpListener;

const DAYS: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

/// Mutable server-side game.
#[derive(Debug, Clone)]
pub struct World {
    pub week: u32,
    pub day_index: usize,
    pub balance: f64,
    pub price: f64,
    pub credit_score: u32,
    pub scenario: Option<String>,
    pub events: Vec<String>,
    pub messages: Vec<Value>,
    pub calendar: Vec<Value>,
    pub next_calendar_id: u32,
}

impl World {
    fn fresh(credit_score: u32) -> Self {
        Self {
            week: 1,
            day_index: 0,
            balance: 1000.0,
            price: 4.0,
            credit_score,
            scenario: None,
            events: vec!["Grand opening".to_owned()],
            messages: vec![
                json!({"id": "m1", "sender_id": "ai_rival", "recipient_id": "p1", "channel": "dm",
                       "intent": "threat", "week": 1, "day": "Monday", "content": "Watch your back", "is_read": false}),
                json!({"id": "m2", "sender_id": "system", "recipient_id": "p1", "channel": "system",
                       "intent": "announcement", "week": 1, "day": "Monday", "content": "Welcome", "is_read": true}),
                json!({"id": "m3", "sender_id": "ai_budget", "recipient_id": "all", "channel": "public",
                       "intent": "dilemma", "week": 1, "day": "Monday", "content": "Join the co-op?", "is_read": false,
                       "attachments": [{"id": "yes", "label": "Join"}, {"id": "no", "label": "Decline"}]}),
            ],
            calendar: Vec::new(),
            next_calendar_id: 1,
        }
    }

    fn state_json(&self) -> Value {
        json!({
            "week": self.week,
            "day": DAYS.get(self.day_index).copied().unwrap_or("Monday"),
            "season": "Spring",
            "laundromats": {
                "p1": {
                    "id": "p1", "name": "Suds City", "balance": self.balance, "price": self.price,
                    "machines": 10, "broken_machines": 1, "inventory": {"detergent": 30},
                    "tickets": [{"id": "t1", "description": "Dryer too hot", "status": "open"}],
                    "social_score": {"total_score": 55.0, "components": {"cleanliness": 30.0, "community": 25.0}},
                    "revenue_streams": {"wash": {"category": "core", "weekly_revenue": 800, "active": true}}
                },
                "ai_rival": {
                    "id": "ai_rival", "name": "Rival Rinse", "balance": 900.0, "price": 3.75,
                    "machines": 8, "social_score": 48.0
                },
                "ai_budget": {
                    "id": "ai_budget", "name": "Budget Bubbles", "balance": 400.0, "price": 2.5,
                    "machines": 4, "social_score": 30.0
                }
            },
            "events": self.events,
            "market": {
                "vendors": [{"id": "v_bulk", "name": "BulkSoap", "prices": {"detergent": 2.0}}],
                "supply_chain_events": [{"description": "Truckers strike", "weeks_remaining": 2}]
            },
            "messages": self.messages,
            "customer_thoughts": ["Nice and clean"],
            "ai_thoughts": {"ai_rival": {"thought": "Undercut the player", "actions": ["SET_PRICE"]}}
        })
    }
}

/// Shared fake-server state.
#[derive(Debug)]
pub struct FakeSim {
    world: Mutex<World>,
    hits: Mutex<BTreeMap<&'static str, u32>>,
    state_delays: Mutex<VecDeque<Duration>>,
    credit_delays: Mutex<VecDeque<Duration>>,
    next_turn_delay: Mutex<Duration>,
    actions: Mutex<Vec<Value>>,
    pub corrupt_state: AtomicBool,
    pub fail_next_turn: AtomicBool,
    pub fail_credit: AtomicBool,
}

impl FakeSim {
    fn new() -> Self {
        Self {
            world: Mutex::new(World::fresh(700)),
            hits: Mutex::new(BTreeMap::new()),
            state_delays: Mutex::new(VecDeque::new()),
            credit_delays: Mutex::new(VecDeque::new()),
            next_turn_delay: Mutex::new(Duration::ZERO),
            actions: Mutex::new(Vec::new()),
            corrupt_state: AtomicBool::new(false),
            fail_next_turn: AtomicBool::new(false),
            fail_credit: AtomicBool::new(false),
        }
    }

    /// Run `f` against the server-side world.
    pub fn with_world<R>(&self, f: impl FnOnce(&mut World) -> R) -> R {
        f(&mut self.world.lock().unwrap())
    }

    /// How many times `route` was hit.
    pub fn hits(&self, route: &str) -> u32 {
        self.hits.lock().unwrap().get(route).copied().unwrap_or(0)
    }

    /// Delay the next `GET /state` response by `delay`.
    pub fn delay_next_state(&self, delay: Duration) {
        self.state_delays.lock().unwrap().push_back(delay);
    }

    /// Delay the next `GET /credit` response by `delay`.
    pub fn delay_next_credit(&self, delay: Duration) {
        self.credit_delays.lock().unwrap().push_back(delay);
    }

    /// Delay every `POST /next_turn` response by `delay`.
    pub fn set_next_turn_delay(&self, delay: Duration) {
        *self.next_turn_delay.lock().unwrap() = delay;
    }

    /// Every action envelope received, in order.
    pub fn actions(&self) -> Vec<Value> {
        self.actions.lock().unwrap().clone()
    }

    fn hit(&self, route: &'static str) {
        *self.hits.lock().unwrap().entry(route).or_insert(0) += 1;
    }
}

/// A running fake server.
pub struct FakeServer {
    pub sim: Arc<FakeSim>,
    pub url: String,
}

impl FakeServer {
    /// A store pointed at this server for player `p1`.
    pub fn store(&self) -> Store {
        store_for(&self.url)
    }
}

/// Bind an ephemeral port and serve the fake simulation on it.
pub async fn start() -> FakeServer {
    let sim = Arc::new(FakeSim::new());
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = router(Arc::clone(&sim));
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    FakeServer {
        sim,
        url: format!("http://{addr}"),
    }
}

/// A store for player `p1` against `url`.
pub fn store_for(url: &str) -> Store {
    let config = ClientConfig {
        server_url: url.to_owned(),
        ..ClientConfig::default()
    };
    Store::new(&config).unwrap()
}

/// A URL on which nothing is listening.
pub async fn dead_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

/// Poll `condition` every 5 ms for up to 2 s.
pub async fn wait_until(mut condition: impl FnMut() -> bool) {
    for _ in 0..400 {
        if condition() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("condition not met within 2s");
}

// ---------------------------------------------------------------------------
// Routes
// ---------------------------------------------------------------------------

fn router(sim: Arc<FakeSim>) -> Router {
    Router::new()
        .route("/state", get(get_state))
        .route("/next_turn", post(next_turn))
        .route("/next_day", post(next_day))
        .route("/action", post(action))
        .route("/negotiate", post(negotiate))
        .route("/negotiate/chat", post(negotiate_chat))
        .route("/negotiate/history/{vendor}/{agent}", get(negotiation_history))
        .route("/reset", post(reset))
        .route("/start_scenario", post(start_scenario))
        .route("/credit/{agent}", get(credit))
        .route("/zone/{agent}", get(zone))
        .route("/calendar/{agent}", get(calendar).post(add_calendar_entry))
        .route(
            "/calendar/{agent}/{id}",
            put(update_calendar_entry).delete(remove_calendar_entry),
        )
        .with_state(sim)
}

fn rejection(status: StatusCode, detail: &str) -> Response {
    (status, Json(json!({"detail": detail}))).into_response()
}

#[derive(Deserialize)]
struct AgentQuery {
    agent_id: String,
}

async fn get_state(State(sim): State<Arc<FakeSim>>, Query(q): Query<AgentQuery>) -> Response {
    sim.hit("state");
    if q.agent_id != "p1" {
        return rejection(StatusCode::NOT_FOUND, "Unknown agent");
    }
    let delay = sim.state_delays.lock().unwrap().pop_front().unwrap_or_default();
    let body = sim.with_world(|w| w.state_json());
    tokio::time::sleep(delay).await;
    if sim.corrupt_state.load(Ordering::SeqCst) {
        return (StatusCode::OK, "{\"week\": ").into_response();
    }
    Json(body).into_response()
}

async fn next_turn(State(sim): State<Arc<FakeSim>>) -> Response {
    sim.hit("next_turn");
    let delay = *sim.next_turn_delay.lock().unwrap();
    tokio::time::sleep(delay).await;
    if sim.fail_next_turn.load(Ordering::SeqCst) {
        return rejection(StatusCode::INTERNAL_SERVER_ERROR, "Simulation crashed");
    }
    sim.with_world(|w| {
        w.week += 1;
        w.day_index = 0;
        w.balance += 250.5;
    });
    Json(json!({"status": "ok"})).into_response()
}

async fn next_day(State(sim): State<Arc<FakeSim>>) -> Response {
    sim.hit("next_day");
    let body = sim.with_world(|w| {
        w.day_index += 1;
        if w.day_index == DAYS.len() {
            w.day_index = 0;
            w.week += 1;
        }
        w.state_json()
    });
    Json(body).into_response()
}

async fn action(State(sim): State<Arc<FakeSim>>, Json(envelope): Json<Value>) -> Response {
    sim.hit("action");
    sim.actions.lock().unwrap().push(envelope.clone());
    let action_type = envelope["action_type"].as_str().unwrap_or_default().to_owned();
    let params = &envelope["parameters"];
    match action_type.as_str() {
        "SET_PRICE" => {
            let price = params["price"].as_f64().unwrap_or(0.0);
            if price <= 0.0 {
                return rejection(StatusCode::BAD_REQUEST, "Price must be positive");
            }
            sim.with_world(|w| w.price = price);
        }
        "SEND_MESSAGE" => sim.with_world(|w| {
            let id = format!("m{}", w.messages.len() + 1);
            w.messages.push(json!({
                "id": id, "sender_id": "p1", "recipient_id": params["recipient_id"],
                "channel": params["channel"], "intent": params["intent"],
                "week": w.week, "day": "Monday", "content": params["content"], "is_read": true
            }));
        }),
        "SKIP_WEEK" => {
            return Json(json!({"success": false, "message": "Not allowed this week"}))
                .into_response();
        }
        other => {
            return rejection(StatusCode::BAD_REQUEST, &format!("Unknown action type: {other}"));
        }
    }
    Json(json!({"success": true})).into_response()
}

async fn negotiate(State(sim): State<Arc<FakeSim>>, Json(body): Json<Value>) -> Response {
    sim.hit("negotiate");
    if body["vendor_id"] != "v_bulk" {
        return rejection(StatusCode::NOT_FOUND, "Unknown vendor");
    }
    let item = body["item"].as_str().unwrap_or_default().to_owned();
    sim.with_world(|w| w.events.push(format!("Negotiated with v_bulk for {item}")));
    Json(json!({"accepted": true, "offered_price": 1.8, "message": "You drive a hard bargain"}))
        .into_response()
}

async fn negotiate_chat(State(sim): State<Arc<FakeSim>>, Json(body): Json<Value>) -> Response {
    sim.hit("negotiate_chat");
    let pitch = body["message"].as_str().unwrap_or_default();
    Json(json!({
        "vendor_response": format!("You said '{pitch}'. I can do 1.90."),
        "offered_price": 1.9,
        "accepted": false
    }))
    .into_response()
}

#[derive(Deserialize)]
struct ItemQuery {
    item: String,
}

async fn negotiation_history(
    State(sim): State<Arc<FakeSim>>,
    Path((vendor, agent)): Path<(String, String)>,
    Query(q): Query<ItemQuery>,
) -> Response {
    sim.hit("negotiation_history");
    if vendor != "v_bulk" || agent != "p1" {
        return rejection(StatusCode::NOT_FOUND, "No history");
    }
    Json(json!([
        {"speaker": "player", "message": format!("Cheaper {}?", q.item)},
        {"speaker": "vendor", "message": "Maybe", "offered_price": 1.95, "week": 1}
    ]))
    .into_response()
}

async fn reset(State(sim): State<Arc<FakeSim>>) -> Response {
    sim.hit("reset");
    sim.with_world(|w| *w = World::fresh(500));
    Json(json!({})).into_response()
}

async fn start_scenario(State(sim): State<Arc<FakeSim>>, Json(body): Json<Value>) -> Response {
    sim.hit("start_scenario");
    let name = body["scenario_name"].as_str().unwrap_or_default().to_owned();
    if name != "heatwave" {
        return rejection(StatusCode::NOT_FOUND, &format!("Unknown scenario: {name}"));
    }
    sim.with_world(|w| {
        *w = World::fresh(650);
        w.events.push(format!("Scenario {name} loaded"));
        w.scenario = Some(name);
    });
    Json(json!({"status": "started"})).into_response()
}

async fn credit(State(sim): State<Arc<FakeSim>>, Path(agent): Path<String>) -> Response {
    sim.hit("credit");
    if agent != "p1" {
        return rejection(StatusCode::NOT_FOUND, "Unknown agent");
    }
    if sim.fail_credit.load(Ordering::SeqCst) {
        return rejection(StatusCode::SERVICE_UNAVAILABLE, "Credit bureau offline");
    }
    let delay = sim.credit_delays.lock().unwrap().pop_front().unwrap_or_default();
    let score = sim.with_world(|w| w.credit_score);
    tokio::time::sleep(delay).await;
    Json(json!({"score": score, "rating": "A", "credit_limit": 5000, "outstanding_debt": 0, "loans": []}))
        .into_response()
}

async fn zone(State(sim): State<Arc<FakeSim>>, Path(_agent): Path<String>) -> Response {
    sim.hit("zone");
    Json(json!({"name": "Downtown", "description": "Busy", "foot_traffic": 1.2, "rent": 300,
                "competitors": ["ai_rival"]}))
    .into_response()
}

async fn calendar(State(sim): State<Arc<FakeSim>>, Path(_agent): Path<String>) -> Response {
    sim.hit("calendar");
    let entries = sim.with_world(|w| w.calendar.clone());
    Json(json!({"scheduled_actions": entries})).into_response()
}

async fn add_calendar_entry(
    State(sim): State<Arc<FakeSim>>,
    Path(_agent): Path<String>,
    Json(mut entry): Json<Value>,
) -> Response {
    sim.hit("calendar_add");
    let id = sim.with_world(|w| {
        let id = format!("c{}", w.next_calendar_id);
        w.next_calendar_id += 1;
        entry["id"] = json!(id);
        w.calendar.push(entry);
        id
    });
    Json(json!({"id": id})).into_response()
}

async fn update_calendar_entry(
    State(sim): State<Arc<FakeSim>>,
    Path((_agent, id)): Path<(String, String)>,
    Json(mut entry): Json<Value>,
) -> Response {
    sim.hit("calendar_update");
    let found = sim.with_world(|w| {
        let slot = w.calendar.iter_mut().find(|e| e["id"] == id.as_str());
        match slot {
            Some(existing) => {
                entry["id"] = json!(id);
                *existing = entry;
                true
            }
            None => false,
        }
    });
    if found {
        Json(json!({})).into_response()
    } else {
        rejection(StatusCode::NOT_FOUND, "No such entry")
    }
}

async fn remove_calendar_entry(
    State(sim): State<Arc<FakeSim>>,
    Path((_agent, id)): Path<(String, String)>,
) -> Response {
    sim.hit("calendar_remove");
    let removed = sim.with_world(|w| {
        let before = w.calendar.len();
        w.calendar.retain(|e| e["id"] != id.as_str());
        before != w.calendar.len()
    });
    if removed {
        StatusCode::NO_CONTENT.into_response()
    } else {
        rejection(StatusCode::NOT_FOUND, "No such entry")
    }
}
