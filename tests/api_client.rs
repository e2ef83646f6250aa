mod support;

use std::time::Duration;

use serde_json::json;

use soccer_desk::api::{ApiClient, PlayerQuery, TeamQuery};
use soccer_desk::config::{BackendType, Config, test_connection};
use soccer_desk::error::ApiError;
use soccer_desk::http_client::build_http_client;
use soccer_desk::model::{PlayerPayload, TeamPayload};
use soccer_desk::provider::Worker;
use soccer_desk::reports::{Report, ReportKind, ReportSource, fetch_report};
use soccer_desk::reports_view::ReportRequest;
use soccer_desk::state::{Delta, LoadTarget, ProviderCommand};

use support::{FakeBackend, Store, dead_base_url};

fn client_for(base_url: &str) -> ApiClient {
    let http = build_http_client(Duration::from_secs(5)).expect("http client");
    ApiClient::with_client(
        http,
        &Config {
            backend_type: BackendType::Python,
            api_base_url: base_url.to_string(),
        },
    )
}

fn team_payload(name: &str) -> TeamPayload {
    TeamPayload {
        id: None,
        name: name.to_string(),
        established_year: Some(1900),
        home_stadium: "Home Ground".to_string(),
        club_colors: "Red".to_string(),
        country: "England".to_string(),
        league: "Premier League".to_string(),
        current_season_position: None,
        team_value: 1_000_000.0,
        description: String::new(),
        wikipedia_link: String::new(),
    }
}

fn player_payload(name: &str, team_id: u32, position: &str) -> PlayerPayload {
    PlayerPayload {
        full_name: name.to_string(),
        date_of_birth: None,
        nationality: "England".to_string(),
        position: position.to_string(),
        jersey_number: Some(7),
        height: None,
        weight: None,
        contract_start: None,
        contract_end: None,
        salary: 0.0,
        player_value: 2_000_000.0,
        team_id: Some(team_id),
        photo_url: String::new(),
        is_injured: false,
        injury_details: None,
        rating: Some(7),
    }
}

#[test]
fn created_team_shows_up_in_list() {
    let backend = FakeBackend::start();
    let api = client_for(&backend.base_url);

    let created = api.create_team(&team_payload("Alpha FC")).expect("create");
    assert!(created.id > 0);
    assert_eq!(created.name, "Alpha FC");

    let teams = api.list_teams().expect("list");
    assert_eq!(teams.len(), 1);
    assert_eq!(teams[0].name, "Alpha FC");
    assert_eq!(teams[0].id, created.id);
}

#[test]
fn list_filters_are_sent_as_query_params() {
    let backend = FakeBackend::start();
    backend.seed_team(json!({ "id": 1, "name": "A", "country": "England", "league": "PL" }));
    backend.seed_team(json!({ "id": 2, "name": "B", "country": "Spain", "league": "Liga" }));
    backend.seed_player(json!({ "id": 5, "full_name": "P", "team_id": 2, "position": "Forward" }));
    let api = client_for(&backend.base_url);

    let spanish = api
        .list_teams_where(&TeamQuery {
            country: Some("Spain".to_string()),
            league: None,
        })
        .expect("list");
    assert_eq!(spanish.len(), 1);
    assert_eq!(spanish[0].id, 2);

    let players = api
        .list_players_where(&PlayerQuery {
            team_id: Some(2),
            ..PlayerQuery::default()
        })
        .expect("list");
    assert_eq!(players.len(), 1);
    assert!(
        backend
            .requests()
            .iter()
            .any(|r| r == "GET /api/players?team_id=2")
    );
}

#[test]
fn empty_update_response_falls_back_to_get() {
    let backend = FakeBackend::with_store(Store {
        next_id: 10,
        empty_updates: true,
        ..Store::default()
    });
    let api = client_for(&backend.base_url);
    let created = api.create_team(&team_payload("Before")).expect("create");

    let updated = api
        .update_team(created.id, &team_payload("After"))
        .expect("update");
    assert_eq!(updated.name, "After");
    let requests = backend.requests();
    assert_eq!(
        requests.last().map(String::as_str),
        Some(format!("GET /api/teams/{}", created.id).as_str())
    );
}

#[test]
fn deleting_a_team_without_players_removes_it() {
    let backend = FakeBackend::start();
    let api = client_for(&backend.base_url);
    let team = api.create_team(&team_payload("Solo")).expect("create");

    api.delete_team(team.id).expect("delete");
    assert!(api.list_teams().expect("list").is_empty());
    let err = api.get_team(team.id).expect_err("gone");
    assert_eq!(err.status(), Some(404));
}

#[test]
fn backend_rejection_keeps_status_and_body() {
    let backend = FakeBackend::start();
    let api = client_for(&backend.base_url);

    let err = api.create_team(&team_payload("")).expect_err("nameless team");
    match err {
        ApiError::Http { status, body } => {
            assert_eq!(status, 400);
            assert!(body.contains("Team name is required"));
        }
        other => panic!("expected http error, got {other:?}"),
    }
}

#[test]
fn deleting_a_team_removes_its_players() {
    let backend = FakeBackend::start();
    let api = client_for(&backend.base_url);
    let team = api.create_team(&team_payload("Busy")).expect("create");
    api.create_player(&player_payload("Kai", team.id, "Forward"))
        .expect("player");

    api.delete_team(team.id).expect("delete");
    assert!(api.list_teams().expect("teams").is_empty());
    assert!(backend.store.lock().expect("store lock").players.is_empty());
}

#[test]
fn players_get_team_names_from_parallel_fetch() {
    let backend = FakeBackend::start();
    let api = client_for(&backend.base_url);
    let team = api.create_team(&team_payload("Alpha FC")).expect("create");
    api.create_player(&player_payload("Kai", team.id, "Forward"))
        .expect("player");

    let (teams, players) = api.list_teams_and_players().expect("both lists");
    assert_eq!(teams.len(), 1);
    assert_eq!(players[0].team_name, "Alpha FC");
}

#[test]
fn empty_team_composition_from_both_sources() {
    let backend = FakeBackend::start();
    let api = client_for(&backend.base_url);
    let team = api.create_team(&team_payload("Empty XI")).expect("create");

    let server = fetch_report(&api, ReportKind::TeamComposition, team.id, ReportSource::Server)
        .expect("server report");
    let Report::Composition(ref composition) = server else {
        panic!("expected composition");
    };
    assert_eq!(composition.total_players, 0);
    assert!(composition.positions.is_empty());
    assert!(composition.nationalities.is_empty());

    let client = fetch_report(&api, ReportKind::TeamComposition, team.id, ReportSource::Client)
        .expect("client report");
    assert_eq!(server.render().summary, client.render().summary);
    assert!(
        server
            .render()
            .summary
            .iter()
            .any(|l| l == "No injured players")
    );
}

#[test]
fn client_report_for_unknown_team_is_a_validation_error() {
    let backend = FakeBackend::start();
    let api = client_for(&backend.base_url);
    api.create_team(&team_payload("Only")).expect("create");

    let err = fetch_report(&api, ReportKind::InjuryReport, 9999, ReportSource::Client)
        .expect_err("unknown team");
    assert_eq!(
        err.to_string(),
        "Team with ID 9999 not found in the list of 1 teams"
    );
}

#[test]
fn unreachable_backend_is_a_network_error() {
    let api = client_for(&dead_base_url());
    let err = api.list_teams().expect_err("nothing listening");
    assert!(err.is_network(), "got {err:?}");
}

#[test]
fn connection_test_messages() {
    let backend = FakeBackend::start();
    backend.seed_team(json!({ "id": 1, "name": "A" }));
    backend.seed_team(json!({ "id": 2, "name": "B" }));
    let http = build_http_client(Duration::from_secs(5)).expect("http client");

    let ok = test_connection(&http, &backend.base_url);
    assert!(ok.success);
    assert_eq!(ok.message, "Connected successfully. Found 2 teams.");

    let broken = backend.base_url.replace("/api", "/broken/api");
    let failed = test_connection(&http, &broken);
    assert!(!failed.success);
    assert_eq!(failed.message, "Connection failed: 500 Internal Server Error");

    let invalid = test_connection(&http, "not a url");
    assert_eq!(invalid.message, "Invalid URL format");

    let down = test_connection(&http, &dead_base_url());
    assert!(down.message.starts_with("Connection error:"));
}

#[test]
fn worker_answers_each_command_with_one_delta() {
    let backend = FakeBackend::start();
    let api = client_for(&backend.base_url);
    let team = api.create_team(&team_payload("Alpha FC")).expect("create");
    let mut worker = Worker::with_client(api);

    let deltas = worker.handle(ProviderCommand::LoadTeams { generation: 3 });
    assert!(matches!(
        deltas.as_slice(),
        [Delta::TeamsLoaded { generation: 3, teams }] if teams.len() == 1
    ));

    let deltas = worker.handle(ProviderCommand::RunReport(ReportRequest {
        generation: 1,
        kind: ReportKind::PlayerPerformance,
        team_id: team.id,
        source: ReportSource::Client,
    }));
    match deltas.as_slice() {
        [Delta::ReportFailed { generation: 1, error }] => {
            assert_eq!(
                *error,
                ApiError::Validation("No players found for this team".to_string())
            );
        }
        other => panic!("unexpected deltas {other:?}"),
    }

    let deltas = worker.handle(ProviderCommand::DeleteTeam { id: 4242 });
    assert!(matches!(deltas.as_slice(), [Delta::MutationFailed { .. }]));
}

#[test]
fn worker_reports_load_failure_against_dead_backend() {
    let mut worker = Worker::with_client(client_for(&dead_base_url()));
    let deltas = worker.handle(ProviderCommand::LoadPlayers { generation: 8 });
    assert!(matches!(
        deltas.as_slice(),
        [Delta::LoadFailed {
            target: LoadTarget::Players,
            generation: 8,
            ..
        }]
    ));
}
