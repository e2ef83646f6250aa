use std::fs;
use std::path::PathBuf;

use serde_json::Value;

use soccer_desk::model::{Player, Team};
use soccer_desk::normalize::{normalize_players, normalize_teams};
use soccer_desk::players_view::{PlayerFilter, PlayerFilterOptions, filter_players};
use soccer_desk::teams_view::{TeamFilter, TeamFilterOptions, filter_teams};

fn read_fixture(name: &str) -> Value {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    let raw = fs::read_to_string(path).expect("fixture file should be readable");
    serde_json::from_str(&raw).expect("fixture should be valid json")
}

fn teams() -> Vec<Team> {
    normalize_teams(&read_fixture("teams_snake.json")).expect("teams")
}

fn players() -> Vec<Player> {
    let mut players = normalize_players(&read_fixture("players_snake.json")).expect("players");
    players.extend(normalize_players(&read_fixture("players_mixed.json")).expect("mixed"));
    players
}

fn ids<T>(items: &[&T], id: impl Fn(&T) -> u32) -> Vec<u32> {
    items.iter().map(|item| id(*item)).collect()
}

#[test]
fn team_search_is_case_insensitive_substring() {
    let teams = teams();
    let filter = TeamFilter {
        search: "  beta ".to_string(),
        ..TeamFilter::default()
    };
    assert_eq!(ids(&filter_teams(&teams, &filter), |t| t.id), [2]);
}

#[test]
fn empty_team_filter_keeps_everything() {
    let teams = teams();
    let filter = TeamFilter::default();
    assert!(filter.is_empty());
    assert_eq!(filter_teams(&teams, &filter).len(), teams.len());
}

#[test]
fn team_filtering_is_idempotent() {
    let teams = teams();
    let filter = TeamFilter {
        country: Some("England".to_string()),
        ..TeamFilter::default()
    };
    let once: Vec<Team> = filter_teams(&teams, &filter).into_iter().cloned().collect();
    let twice: Vec<Team> = filter_teams(&once, &filter).into_iter().cloned().collect();
    assert_eq!(once, twice);
}

#[test]
fn player_criteria_commute() {
    let players = players();
    let by_team = PlayerFilter {
        team_id: Some(1),
        ..PlayerFilter::default()
    };
    let by_injury = PlayerFilter {
        injured: Some(true),
        ..PlayerFilter::default()
    };
    let both = PlayerFilter {
        team_id: Some(1),
        injured: Some(true),
        ..PlayerFilter::default()
    };

    let team_first: Vec<Player> = filter_players(&players, &by_team).into_iter().cloned().collect();
    let a = filter_players(&team_first, &by_injury);
    let injury_first: Vec<Player> =
        filter_players(&players, &by_injury).into_iter().cloned().collect();
    let b = filter_players(&injury_first, &by_team);
    let combined = filter_players(&players, &both);

    assert_eq!(ids(&a, |p| p.id), [11]);
    assert_eq!(ids(&a, |p| p.id), ids(&b, |p| p.id));
    assert_eq!(ids(&a, |p| p.id), ids(&combined, |p| p.id));
}

#[test]
fn healthy_filter_excludes_injured() {
    let players = players();
    let filter = PlayerFilter {
        injured: Some(false),
        ..PlayerFilter::default()
    };
    let out = filter_players(&players, &filter);
    assert!(out.iter().all(|p| !p.is_injured));
    assert!(!out.is_empty());
}

#[test]
fn position_filter_matches_exactly() {
    let players = players();
    let filter = PlayerFilter {
        position: Some("Forward".to_string()),
        ..PlayerFilter::default()
    };
    assert_eq!(ids(&filter_players(&players, &filter), |p| p.id), [11, 30]);
}

#[test]
fn filter_options_derive_from_loaded_data() {
    let teams = teams();
    let options = TeamFilterOptions::from_teams(&teams);
    assert_eq!(options.countries, ["England", "Spain"]);
    assert_eq!(options.leagues, ["La Liga", "Premier League"]);

    let options = PlayerFilterOptions::from_lists(&teams, &players());
    assert_eq!(
        options.positions,
        ["Goalkeeper", "Defender", "Midfielder", "Forward", "Winger"]
    );
    assert_eq!(options.team_name(2), Some("Beta United"));
    assert_eq!(options.team_name(9), None);
}
