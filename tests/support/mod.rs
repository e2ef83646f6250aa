#![allow(dead_code)]

use std::collections::BTreeMap;
use std::io::{BufRead, BufReader, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;

use serde_json::{Map, Value, json};

#[derive(Debug, Default)]
pub struct Store {
    pub teams: Vec<Value>,
    pub players: Vec<Value>,
    pub next_id: u64,
    /// Answer PUT with an empty 204, the way the C# backend does.
    pub empty_updates: bool,
    pub requests: Vec<String>,
}

pub struct FakeBackend {
    pub base_url: String,
    pub store: Arc<Mutex<Store>>,
}

impl FakeBackend {
    pub fn start() -> Self {
        Self::with_store(Store {
            next_id: 100,
            ..Store::default()
        })
    }

    pub fn with_store(store: Store) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind fake backend");
        let addr = listener.local_addr().expect("local addr");
        let store = Arc::new(Mutex::new(store));
        let shared = Arc::clone(&store);
        thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(stream) = stream else {
                    continue;
                };
                let store = Arc::clone(&shared);
                thread::spawn(move || {
                    let _ = serve(stream, &store);
                });
            }
        });
        Self {
            base_url: format!("http://{addr}/api"),
            store,
        }
    }

    pub fn seed_team(&self, team: Value) {
        self.store.lock().expect("store lock").teams.push(team);
    }

    pub fn seed_player(&self, player: Value) {
        self.store.lock().expect("store lock").players.push(player);
    }

    pub fn requests(&self) -> Vec<String> {
        self.store.lock().expect("store lock").requests.clone()
    }
}

/// Base URL of a port nothing listens on.
pub fn dead_base_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);
    format!("http://{addr}/api")
}

struct Request {
    method: String,
    path: String,
    query: BTreeMap<String, String>,
    body: Option<Value>,
}

fn serve(stream: TcpStream, store: &Mutex<Store>) -> std::io::Result<()> {
    let mut reader = BufReader::new(stream.try_clone()?);
    let mut request_line = String::new();
    reader.read_line(&mut request_line)?;
    let mut parts = request_line.split_whitespace();
    let method = parts.next().unwrap_or_default().to_string();
    let target = parts.next().unwrap_or_default().to_string();

    let mut content_length = 0usize;
    loop {
        let mut line = String::new();
        if reader.read_line(&mut line)? == 0 || line == "\r\n" || line == "\n" {
            break;
        }
        if let Some((name, value)) = line.split_once(':') {
            if name.trim().eq_ignore_ascii_case("content-length") {
                content_length = value.trim().parse().unwrap_or(0);
            }
        }
    }
    let mut body = vec![0u8; content_length];
    reader.read_exact(&mut body)?;

    let (path, query) = match target.split_once('?') {
        Some((path, query)) => (path.to_string(), parse_query(query)),
        None => (target.clone(), BTreeMap::new()),
    };
    let request = Request {
        method,
        path,
        query,
        body: serde_json::from_slice(&body).ok(),
    };

    let (status, payload) = {
        let mut store = store.lock().expect("store lock");
        store.requests.push(format!("{} {}", request.method, target));
        route(&mut store, &request)
    };
    respond(stream, status, payload)
}

fn parse_query(query: &str) -> BTreeMap<String, String> {
    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn respond(mut stream: TcpStream, status: u16, payload: Option<Value>) -> std::io::Result<()> {
    let reason = match status {
        200 => "OK",
        201 => "Created",
        204 => "No Content",
        400 => "Bad Request",
        404 => "Not Found",
        _ => "Internal Server Error",
    };
    let body = payload.map(|v| v.to_string()).unwrap_or_default();
    write!(
        stream,
        "HTTP/1.1 {status} {reason}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    )?;
    stream.flush()
}

fn route(store: &mut Store, req: &Request) -> (u16, Option<Value>) {
    if req.path.starts_with("/broken") {
        return (500, Some(json!({ "error": "boom" })));
    }
    let segments: Vec<&str> = req
        .path
        .trim_matches('/')
        .split('/')
        .filter(|s| !s.is_empty())
        .collect();
    match (req.method.as_str(), segments.as_slice()) {
        ("GET", ["api", "teams"]) => {
            let teams: Vec<Value> = store
                .teams
                .iter()
                .filter(|t| query_matches(t, &req.query, &["country", "league"]))
                .cloned()
                .collect();
            (200, Some(Value::Array(teams)))
        }
        ("GET", ["api", "players"]) => {
            let players: Vec<Value> = store
                .players
                .iter()
                .filter(|p| query_matches(p, &req.query, &["team_id", "position"]))
                .cloned()
                .collect();
            (200, Some(Value::Array(players)))
        }
        ("POST", ["api", "teams"]) => create(store, req, true),
        ("POST", ["api", "players"]) => create(store, req, false),
        ("GET", ["api", "teams", id]) => fetch(&store.teams, id),
        ("GET", ["api", "players", id]) => fetch(&store.players, id),
        ("PUT", ["api", "teams", id]) => update(store, req, id, true),
        ("PUT", ["api", "players", id]) => update(store, req, id, false),
        ("DELETE", ["api", "teams", id]) => {
            let outcome = remove(&mut store.teams, id);
            if outcome.0 == 204 {
                store
                    .players
                    .retain(|p| p.get("team_id").map(value_key).as_deref() != Some(*id));
            }
            outcome
        }
        ("DELETE", ["api", "players", id]) => remove(&mut store.players, id),
        ("GET", ["api", "reports", "team-composition"]) => composition(store, req),
        _ => (404, Some(json!({ "error": "Not found" }))),
    }
}

fn value_key(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn query_matches(record: &Value, query: &BTreeMap<String, String>, keys: &[&str]) -> bool {
    keys.iter().all(|key| match query.get(*key) {
        Some(want) => record.get(*key).map(value_key).as_deref() == Some(want.as_str()),
        None => true,
    })
}

fn find<'a>(records: &'a [Value], id: &str) -> Option<&'a Value> {
    records
        .iter()
        .find(|r| r.get("id").map(value_key).as_deref() == Some(id))
}

fn fetch(records: &[Value], id: &str) -> (u16, Option<Value>) {
    match find(records, id) {
        Some(record) => (200, Some(record.clone())),
        None => (404, Some(json!({ "error": "Not found" }))),
    }
}

fn create(store: &mut Store, req: &Request, team: bool) -> (u16, Option<Value>) {
    let Some(Value::Object(body)) = req.body.clone() else {
        return (400, Some(json!({ "error": "Invalid JSON" })));
    };
    if team && body.get("name").and_then(Value::as_str).is_none_or(str::is_empty) {
        return (400, Some(json!({ "error": "Team name is required" })));
    }
    store.next_id += 1;
    let mut record = body;
    record.insert("id".to_string(), json!(store.next_id));
    let record = Value::Object(record);
    if team {
        store.teams.push(record.clone());
    } else {
        store.players.push(record.clone());
    }
    (201, Some(record))
}

fn update(store: &mut Store, req: &Request, id: &str, team: bool) -> (u16, Option<Value>) {
    let Some(Value::Object(body)) = req.body.clone() else {
        return (400, Some(json!({ "error": "Invalid JSON" })));
    };
    let empty = store.empty_updates;
    let records = if team {
        &mut store.teams
    } else {
        &mut store.players
    };
    let Some(record) = records
        .iter_mut()
        .find(|r| r.get("id").map(value_key).as_deref() == Some(id))
    else {
        return (404, Some(json!({ "error": "Not found" })));
    };
    if let Value::Object(fields) = record {
        merge(fields, body);
    }
    if empty {
        (204, None)
    } else {
        (200, Some(record.clone()))
    }
}

fn merge(fields: &mut Map<String, Value>, body: Map<String, Value>) {
    for (key, value) in body {
        if key != "id" {
            fields.insert(key, value);
        }
    }
}

fn remove(records: &mut Vec<Value>, id: &str) -> (u16, Option<Value>) {
    let before = records.len();
    records.retain(|r| r.get("id").map(value_key).as_deref() != Some(id));
    if records.len() == before {
        (404, Some(json!({ "error": "Not found" })))
    } else {
        (204, None)
    }
}

fn composition(store: &Store, req: &Request) -> (u16, Option<Value>) {
    let Some(team_id) = req.query.get("team_id") else {
        return (400, Some(json!({ "error": "team_id is required" })));
    };
    let Some(team) = find(&store.teams, team_id) else {
        return (404, Some(json!({ "error": "Team not found" })));
    };
    let roster: Vec<&Value> = store
        .players
        .iter()
        .filter(|p| p.get("team_id").map(value_key).as_deref() == Some(team_id.as_str()))
        .collect();

    let mut positions = Map::new();
    let mut nationalities = Map::new();
    let mut rating_sum = 0.0;
    let mut total_value = 0.0;
    for player in &roster {
        for (key, bucket) in [("position", &mut positions), ("nationality", &mut nationalities)] {
            if let Some(name) = player.get(key).and_then(Value::as_str).filter(|s| !s.is_empty()) {
                let count = bucket.get(name).and_then(Value::as_u64).unwrap_or(0);
                bucket.insert(name.to_string(), json!(count + 1));
            }
        }
        rating_sum += player.get("rating").and_then(Value::as_f64).unwrap_or(0.0);
        total_value += player.get("player_value").and_then(Value::as_f64).unwrap_or(0.0);
    }
    let average_rating = if roster.is_empty() {
        0.0
    } else {
        rating_sum / roster.len() as f64
    };
    let injured: Vec<Value> = roster
        .iter()
        .filter(|p| p.get("is_injured").and_then(Value::as_bool).unwrap_or(false))
        .map(|p| (*p).clone())
        .collect();

    (
        200,
        Some(json!({
            "team": team,
            "total_players": roster.len(),
            "positions": positions,
            "nationalities": nationalities,
            "average_rating": average_rating,
            "total_value": total_value,
            "injured_players": injured,
        })),
    )
}
