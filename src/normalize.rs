use std::collections::HashMap;

use serde_json::Value;

use crate::error::{ApiError, ApiResult};
use crate::model::{Player, Team};

const ID: &[&str] = &["id", "Id", "ID"];

const TEAM_NAME: &[&str] = &["name", "team_name", "teamName", "Name"];
const TEAM_COUNTRY: &[&str] = &["country", "Country"];
const TEAM_LEAGUE: &[&str] = &["league", "League"];
const TEAM_ESTABLISHED: &[&str] = &["established_year", "establishedYear", "EstablishedYear"];
const TEAM_STADIUM: &[&str] = &["home_stadium", "homeStadium", "HomeStadium"];
const TEAM_COLORS: &[&str] = &["club_colors", "clubColors", "ClubColors"];
const TEAM_POSITION: &[&str] = &[
    "current_season_position",
    "currentSeasonPosition",
    "CurrentSeasonPosition",
];
const TEAM_VALUE: &[&str] = &["team_value", "teamValue", "TeamValue"];
const TEAM_DESCRIPTION: &[&str] = &["description", "Description"];
const TEAM_WIKI: &[&str] = &["wikipedia_link", "wikipediaLink", "WikipediaLink"];
const TEAM_LOGO: &[&str] = &["logo_url", "logoUrl", "LogoUrl"];

const PLAYER_NAME: &[&str] = &["full_name", "fullName", "FullName", "name", "Name"];
const PLAYER_DOB: &[&str] = &["date_of_birth", "dateOfBirth", "DateOfBirth"];
const PLAYER_NATIONALITY: &[&str] = &["nationality", "Nationality"];
const PLAYER_POSITION: &[&str] = &["position", "Position"];
const PLAYER_JERSEY: &[&str] = &["jersey_number", "jerseyNumber", "JerseyNumber"];
const PLAYER_HEIGHT: &[&str] = &["height", "Height"];
const PLAYER_WEIGHT: &[&str] = &["weight", "Weight"];
const PLAYER_TEAM_ID: &[&str] = &["team_id", "teamId", "TeamId", "team_ID"];
const PLAYER_TEAM_NAME: &[&str] = &["team_name", "teamName", "TeamName"];
const PLAYER_VALUE: &[&str] = &["player_value", "playerValue", "PlayerValue"];
const PLAYER_INJURED: &[&str] = &["is_injured", "isInjured", "IsInjured"];
const PLAYER_INJURY_DETAILS: &[&str] = &["injury_details", "injuryDetails", "InjuryDetails"];
const PLAYER_RATING: &[&str] = &[
    "rating",
    "Rating",
    "player_rating",
    "performance_rating",
];
const PLAYER_CONTRACT_START: &[&str] = &["contract_start", "contractStart", "ContractStart"];
const PLAYER_CONTRACT_END: &[&str] = &["contract_end", "contractEnd", "ContractEnd"];
const PLAYER_SALARY: &[&str] = &["salary", "Salary"];
const PLAYER_PHOTO: &[&str] = &["photo_url", "photoUrl", "PhotoUrl"];

pub fn normalize_team(value: &Value) -> Team {
    Team {
        id: pick_u32(value, ID).unwrap_or_default(),
        name: pick_string(value, TEAM_NAME).unwrap_or_default(),
        country: pick_string(value, TEAM_COUNTRY).unwrap_or_default(),
        league: pick_string(value, TEAM_LEAGUE).unwrap_or_default(),
        established_year: pick_i64(value, TEAM_ESTABLISHED).and_then(|y| i32::try_from(y).ok()),
        home_stadium: pick_string(value, TEAM_STADIUM).unwrap_or_default(),
        club_colors: pick_string(value, TEAM_COLORS).unwrap_or_default(),
        current_season_position: pick_u32(value, TEAM_POSITION),
        team_value: pick_f64(value, TEAM_VALUE).unwrap_or_default().max(0.0),
        description: pick_string(value, TEAM_DESCRIPTION).unwrap_or_default(),
        wikipedia_link: pick_string(value, TEAM_WIKI).unwrap_or_default(),
        logo_url: pick_string(value, TEAM_LOGO).unwrap_or_default(),
    }
}

pub fn normalize_player(value: &Value) -> Player {
    let is_injured = pick_bool(value, PLAYER_INJURED).unwrap_or(false);
    let injury_details = if is_injured {
        pick_string(value, PLAYER_INJURY_DETAILS).filter(|s| !s.is_empty())
    } else {
        None
    };

    Player {
        id: pick_u32(value, ID).unwrap_or_default(),
        full_name: pick_string(value, PLAYER_NAME).unwrap_or_default(),
        date_of_birth: pick_string(value, PLAYER_DOB).unwrap_or_default(),
        nationality: pick_string(value, PLAYER_NATIONALITY).unwrap_or_default(),
        position: pick_string(value, PLAYER_POSITION).unwrap_or_default(),
        jersey_number: pick_u32(value, PLAYER_JERSEY),
        height: pick_f64(value, PLAYER_HEIGHT),
        weight: pick_f64(value, PLAYER_WEIGHT),
        team_id: pick_u32(value, PLAYER_TEAM_ID),
        team_name: pick_string(value, PLAYER_TEAM_NAME).unwrap_or_default(),
        player_value: pick_f64(value, PLAYER_VALUE).unwrap_or_default(),
        is_injured,
        injury_details,
        rating: pick_f64(value, PLAYER_RATING).unwrap_or_default(),
        contract_start: pick_string(value, PLAYER_CONTRACT_START).filter(|s| !s.is_empty()),
        contract_end: pick_string(value, PLAYER_CONTRACT_END).filter(|s| !s.is_empty()),
        salary: pick_f64(value, PLAYER_SALARY).unwrap_or_default(),
        photo_url: pick_string(value, PLAYER_PHOTO).unwrap_or_default(),
    }
}

pub fn normalize_teams(value: &Value) -> ApiResult<Vec<Team>> {
    let items = expect_array(value, "team list")?;
    Ok(items
        .iter()
        .filter(|v| v.is_object())
        .map(normalize_team)
        .collect())
}

pub fn normalize_players(value: &Value) -> ApiResult<Vec<Player>> {
    let items = expect_array(value, "player list")?;
    Ok(items
        .iter()
        .filter(|v| v.is_object())
        .map(normalize_player)
        .collect())
}

// Keyed by the string form of the id so "7" and 7 land on the same team.
pub fn attach_team_names(players: &mut [Player], teams: &[Team]) {
    let names: HashMap<String, &str> = teams
        .iter()
        .map(|t| (t.id.to_string(), t.name.as_str()))
        .collect();
    for player in players.iter_mut() {
        if !player.team_name.is_empty() {
            continue;
        }
        let Some(team_id) = player.team_id else {
            continue;
        };
        if let Some(name) = names.get(&team_id.to_string()) {
            player.team_name = (*name).to_string();
        }
    }
}

fn expect_array<'a>(value: &'a Value, what: &str) -> ApiResult<&'a Vec<Value>> {
    value
        .as_array()
        .ok_or_else(|| ApiError::Decode(format!("expected a JSON array for {what}")))
}

pub(crate) fn pick_value<'a>(value: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| value.get(*key))
        .find(|v| !v.is_null())
}

pub(crate) fn pick_string(value: &Value, keys: &[&str]) -> Option<String> {
    for key in keys {
        if let Some(v) = value.get(*key) {
            if let Some(s) = as_string(v) {
                return Some(s);
            }
        }
    }
    None
}

pub(crate) fn pick_f64(value: &Value, keys: &[&str]) -> Option<f64> {
    for key in keys {
        if let Some(v) = value.get(*key) {
            if let Some(num) = as_f64(v) {
                return Some(num);
            }
        }
    }
    None
}

pub(crate) fn pick_i64(value: &Value, keys: &[&str]) -> Option<i64> {
    for key in keys {
        if let Some(v) = value.get(*key) {
            if let Some(num) = v.as_i64() {
                return Some(num);
            }
            if let Some(num) = as_f64(v).filter(|n| n.fract() == 0.0) {
                return Some(num as i64);
            }
        }
    }
    None
}

pub(crate) fn pick_u32(value: &Value, keys: &[&str]) -> Option<u32> {
    for key in keys {
        if let Some(v) = value.get(*key) {
            if let Some(num) = v.as_u64() {
                if let Ok(num) = u32::try_from(num) {
                    return Some(num);
                }
            }
            if let Some(s) = v.as_str() {
                if let Ok(num) = s.trim().parse::<u32>() {
                    return Some(num);
                }
            }
            if let Some(num) = v.as_f64().filter(|n| n.fract() == 0.0 && *n >= 0.0) {
                if num <= u32::MAX as f64 {
                    return Some(num as u32);
                }
            }
        }
    }
    None
}

pub(crate) fn pick_bool(value: &Value, keys: &[&str]) -> Option<bool> {
    for key in keys {
        if let Some(v) = value.get(*key) {
            match v {
                Value::Bool(b) => return Some(*b),
                Value::Number(n) => return Some(n.as_f64().is_some_and(|n| n != 0.0)),
                Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
                    "true" | "1" | "yes" => return Some(true),
                    "false" | "0" | "no" => return Some(false),
                    _ => {}
                },
                _ => {}
            }
        }
    }
    None
}

fn as_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64().filter(|n| n.is_finite()),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn first_present_alias_wins() {
        let raw = json!({ "full_name": "A", "fullName": "B" });
        assert_eq!(pick_string(&raw, PLAYER_NAME).as_deref(), Some("A"));
    }

    #[test]
    fn null_alias_falls_through_to_next() {
        let raw = json!({ "player_value": null, "playerValue": 12.5 });
        assert_eq!(pick_f64(&raw, PLAYER_VALUE), Some(12.5));
    }

    #[test]
    fn numeric_strings_are_coerced() {
        let raw = json!({ "team_id": "7", "rating": "81" });
        let player = normalize_player(&raw);
        assert_eq!(player.team_id, Some(7));
        assert_eq!(player.rating, 81.0);
    }

    #[test]
    fn negative_team_value_clamps_to_zero() {
        let team = normalize_team(&json!({ "id": 1, "team_value": -5 }));
        assert_eq!(team.team_value, 0.0);
    }

    #[test]
    fn pick_value_skips_nulls() {
        let raw = json!({ "id": null, "Id": 4 });
        assert_eq!(pick_value(&raw, ID), Some(&json!(4)));
    }
}
