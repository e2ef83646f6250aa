use reqwest::Method;
use reqwest::blocking::{Client, RequestBuilder};
use serde::Serialize;
use serde_json::Value;

use crate::config::{BackendType, Config, Endpoints};
use crate::error::{ApiError, ApiResult};
use crate::http_client::http_client;
use crate::model::{Player, PlayerPayload, Team, TeamPayload};
use crate::normalize::{
    attach_team_names, normalize_player, normalize_players, normalize_team, normalize_teams,
};
use crate::reports::ReportKind;

const USER_AGENT: &str = concat!("soccer_desk/", env!("CARGO_PKG_VERSION"));
const SNIPPET_CHARS: usize = 220;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TeamQuery {
    pub country: Option<String>,
    pub league: Option<String>,
}

impl TeamQuery {
    fn pairs(&self) -> Vec<(&'static str, String)> {
        let mut out = Vec::new();
        if let Some(country) = self.country.as_ref() {
            out.push(("country", country.clone()));
        }
        if let Some(league) = self.league.as_ref() {
            out.push(("league", league.clone()));
        }
        out
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlayerQuery {
    pub team_id: Option<u32>,
    pub position: Option<String>,
    pub injured: Option<bool>,
}

impl PlayerQuery {
    fn pairs(&self) -> Vec<(&'static str, String)> {
        let mut out = Vec::new();
        if let Some(team_id) = self.team_id {
            out.push(("team_id", team_id.to_string()));
        }
        if let Some(position) = self.position.as_ref() {
            out.push(("position", position.clone()));
        }
        if let Some(injured) = self.injured {
            out.push(("injured", injured.to_string()));
        }
        out
    }
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    endpoints: Endpoints,
    backend: BackendType,
}

impl ApiClient {
    pub fn new(config: &Config) -> ApiResult<Self> {
        Ok(Self::with_client(http_client()?.clone(), config))
    }

    pub fn with_client(client: Client, config: &Config) -> Self {
        Self {
            client,
            endpoints: config.endpoints(),
            backend: config.backend_type,
        }
    }

    pub fn http(&self) -> &Client {
        &self.client
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    pub fn backend(&self) -> BackendType {
        self.backend
    }

    pub fn list_teams(&self) -> ApiResult<Vec<Team>> {
        self.list_teams_where(&TeamQuery::default())
    }

    pub fn list_teams_where(&self, query: &TeamQuery) -> ApiResult<Vec<Team>> {
        let req = self.request(Method::GET, &self.endpoints.teams).query(&query.pairs());
        let raw = send_json(req)?;
        normalize_teams(&raw)
    }

    pub fn get_team(&self, id: u32) -> ApiResult<Team> {
        let raw = send_json(self.request(Method::GET, &self.endpoints.team(id)))?;
        expect_record(&raw, "team").map(normalize_team)
    }

    pub fn create_team(&self, payload: &TeamPayload) -> ApiResult<Team> {
        let raw = self.send_body(Method::POST, &self.endpoints.teams, payload)?;
        expect_record(&raw, "team").map(normalize_team)
    }

    pub fn update_team(&self, id: u32, payload: &TeamPayload) -> ApiResult<Team> {
        let raw = self.send_body(Method::PUT, &self.endpoints.team(id), payload)?;
        if raw.is_null() {
            return self.get_team(id);
        }
        expect_record(&raw, "team").map(normalize_team)
    }

    pub fn delete_team(&self, id: u32) -> ApiResult<()> {
        send_json(self.request(Method::DELETE, &self.endpoints.team(id))).map(|_| ())
    }

    pub fn list_players(&self) -> ApiResult<Vec<Player>> {
        self.list_players_where(&PlayerQuery::default())
    }

    pub fn list_players_where(&self, query: &PlayerQuery) -> ApiResult<Vec<Player>> {
        let req = self.request(Method::GET, &self.endpoints.players).query(&query.pairs());
        let raw = send_json(req)?;
        normalize_players(&raw)
    }

    pub fn get_player(&self, id: u32) -> ApiResult<Player> {
        let raw = send_json(self.request(Method::GET, &self.endpoints.player(id)))?;
        expect_record(&raw, "player").map(normalize_player)
    }

    pub fn create_player(&self, payload: &PlayerPayload) -> ApiResult<Player> {
        let raw = self.send_body(Method::POST, &self.endpoints.players, payload)?;
        expect_record(&raw, "player").map(normalize_player)
    }

    pub fn update_player(&self, id: u32, payload: &PlayerPayload) -> ApiResult<Player> {
        let raw = self.send_body(Method::PUT, &self.endpoints.player(id), payload)?;
        if raw.is_null() {
            return self.get_player(id);
        }
        expect_record(&raw, "player").map(normalize_player)
    }

    pub fn delete_player(&self, id: u32) -> ApiResult<()> {
        send_json(self.request(Method::DELETE, &self.endpoints.player(id))).map(|_| ())
    }

    /// Players get their team names filled in from the team list.
    pub fn list_teams_and_players(&self) -> ApiResult<(Vec<Team>, Vec<Player>)> {
        let (teams, players) = rayon::join(|| self.list_teams(), || self.list_players());
        let teams = teams?;
        let mut players = players?;
        attach_team_names(&mut players, &teams);
        Ok((teams, players))
    }

    pub fn report(&self, kind: ReportKind, team_id: u32) -> ApiResult<Value> {
        let raw = send_json(self.request(Method::GET, &self.endpoints.report(kind, team_id)))?;
        if raw.is_null() {
            return Err(ApiError::Decode(format!("empty {} response", kind.slug())));
        }
        Ok(raw)
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        self.client
            .request(method, url)
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .header(reqwest::header::ACCEPT, "application/json")
    }

    fn send_body<T: Serialize>(&self, method: Method, url: &str, body: &T) -> ApiResult<Value> {
        send_json(self.request(method, url).json(body))
    }
}

// An empty 2xx body reads as `Value::Null`.
fn send_json(req: RequestBuilder) -> ApiResult<Value> {
    let resp = req.send()?;
    let status = resp.status();
    let body = resp.text()?;
    if !status.is_success() {
        return Err(ApiError::Http {
            status: status.as_u16(),
            body: snippet(&body),
        });
    }
    if body.trim().is_empty() {
        return Ok(Value::Null);
    }
    Ok(serde_json::from_str(&body)?)
}

fn expect_record<'a>(raw: &'a Value, what: &str) -> ApiResult<&'a Value> {
    if raw.is_object() {
        Ok(raw)
    } else {
        Err(ApiError::Decode(format!("expected a {what} object")))
    }
}

fn snippet(body: &str) -> String {
    body.trim()
        .replace(['\n', '\r'], " ")
        .chars()
        .take(SNIPPET_CHARS)
        .collect()
}
