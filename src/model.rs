use serde::{Deserialize, Serialize};

/// Canonical in-memory team record. Built only by `normalize::normalize_team`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Team {
    pub id: u32,
    pub name: String,
    pub country: String,
    pub league: String,
    pub established_year: Option<i32>,
    pub home_stadium: String,
    pub club_colors: String,
    pub current_season_position: Option<u32>,
    pub team_value: f64,
    pub description: String,
    pub wikipedia_link: String,
    pub logo_url: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Player {
    pub id: u32,
    pub full_name: String,
    pub date_of_birth: String,
    pub nationality: String,
    pub position: String,
    pub jersey_number: Option<u32>,
    pub height: Option<f64>,
    pub weight: Option<f64>,
    pub team_id: Option<u32>,
    // Resolved from the team list when the backend does not join it.
    pub team_name: String,
    pub player_value: f64,
    pub is_injured: bool,
    pub injury_details: Option<String>,
    pub rating: f64,
    pub contract_start: Option<String>,
    pub contract_end: Option<String>,
    pub salary: f64,
    pub photo_url: String,
}

/// Body for `POST /teams` and `PUT /teams/{id}`, using the backend's field names.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<u32>,
    pub name: String,
    pub established_year: Option<i32>,
    pub home_stadium: String,
    pub club_colors: String,
    pub country: String,
    pub league: String,
    pub current_season_position: Option<u32>,
    pub team_value: f64,
    pub description: String,
    pub wikipedia_link: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerPayload {
    pub full_name: String,
    pub date_of_birth: Option<String>,
    pub nationality: String,
    pub position: String,
    pub jersey_number: Option<u32>,
    pub height: Option<f64>,
    pub weight: Option<f64>,
    pub contract_start: Option<String>,
    pub contract_end: Option<String>,
    pub salary: f64,
    pub player_value: f64,
    pub team_id: Option<u32>,
    pub photo_url: String,
    pub is_injured: bool,
    pub injury_details: Option<String>,
    pub rating: Option<i64>,
}

impl Team {
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            "Unknown team"
        } else {
            &self.name
        }
    }
}

impl Player {
    pub fn display_name(&self) -> &str {
        if self.full_name.is_empty() {
            "Unknown"
        } else {
            &self.full_name
        }
    }

    pub fn belongs_to(&self, team_id: u32) -> bool {
        self.team_id == Some(team_id)
    }
}
