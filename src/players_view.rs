use crate::error::{ApiError, ApiResult};
use crate::form::{
    ChoiceOption, FieldKind, Form, FormField, fmt_amount, fmt_opt, parse_decimal, parse_flag,
    parse_int, text_or_none,
};
use crate::model::{Player, PlayerPayload, Team};
use crate::view::{Generation, ViewStatus, clamp_index, cycle_option, step_next, step_prev, unique_sorted};

pub const STANDARD_POSITIONS: [&str; 4] = ["Goalkeeper", "Defender", "Midfielder", "Forward"];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlayerFilter {
    pub search: String,
    pub team_id: Option<u32>,
    pub position: Option<String>,
    pub injured: Option<bool>,
}

impl PlayerFilter {
    pub fn matches(&self, player: &Player) -> bool {
        let needle = self.search.trim().to_lowercase();
        if !needle.is_empty() && !player.full_name.to_lowercase().contains(&needle) {
            return false;
        }
        if let Some(team_id) = self.team_id {
            if !player.belongs_to(team_id) {
                return false;
            }
        }
        if let Some(position) = self.position.as_deref() {
            if player.position != position {
                return false;
            }
        }
        if let Some(injured) = self.injured {
            if player.is_injured != injured {
                return false;
            }
        }
        true
    }
}

pub fn filter_players<'a>(players: &'a [Player], filter: &PlayerFilter) -> Vec<&'a Player> {
    players.iter().filter(|p| filter.matches(p)).collect()
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlayerFilterOptions {
    pub teams: Vec<(u32, String)>,
    pub positions: Vec<String>,
}

impl PlayerFilterOptions {
    pub fn from_lists(teams: &[Team], players: &[Player]) -> Self {
        let mut positions: Vec<&str> = STANDARD_POSITIONS.to_vec();
        positions.extend(players.iter().map(|p| p.position.as_str()));
        let mut positions = unique_sorted(positions.into_iter());
        // Standard positions first, in pitch order.
        positions.sort_by_key(|p| {
            STANDARD_POSITIONS
                .iter()
                .position(|s| *s == p.as_str())
                .unwrap_or(STANDARD_POSITIONS.len())
        });
        Self {
            teams: teams.iter().map(|t| (t.id, t.name.clone())).collect(),
            positions,
        }
    }

    pub fn team_name(&self, id: u32) -> Option<&str> {
        self.teams
            .iter()
            .find(|(team_id, _)| *team_id == id)
            .map(|(_, name)| name.as_str())
    }
}

#[derive(Debug, Clone, Default)]
pub struct PlayersView {
    pub players: Vec<Player>,
    pub teams: Vec<Team>,
    pub options: PlayerFilterOptions,
    pub filter: PlayerFilter,
    pub selected: usize,
    pub status: ViewStatus,
    pub editor: Option<Form>,
    pub last_error: Option<String>,
    generation: Generation,
}

impl PlayersView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn generation(&self) -> u64 {
        self.generation.current()
    }

    pub fn begin_load(&mut self) -> u64 {
        self.status = ViewStatus::Loading;
        self.generation.bump()
    }

    pub fn finish_load(&mut self, generation: u64, teams: Vec<Team>, players: Vec<Player>) -> bool {
        if !self.generation.is_current(generation) {
            return false;
        }
        self.options = PlayerFilterOptions::from_lists(&teams, &players);
        self.teams = teams;
        self.players = players;
        self.status = ViewStatus::Loaded;
        self.last_error = None;
        if let Some(team_id) = self.filter.team_id {
            if self.options.team_name(team_id).is_none() {
                self.filter.team_id = None;
            }
        }
        self.clamp_selection();
        true
    }

    pub fn fail_load(&mut self, generation: u64, message: impl Into<String>) -> bool {
        if !self.generation.is_current(generation) {
            return false;
        }
        self.status = ViewStatus::Error;
        self.last_error = Some(message.into());
        true
    }

    pub fn visible(&self) -> Vec<&Player> {
        filter_players(&self.players, &self.filter)
    }

    pub fn selected_player(&self) -> Option<&Player> {
        self.visible().get(self.selected).copied()
    }

    pub fn select_next(&mut self) {
        self.selected = step_next(self.selected, self.visible().len());
    }

    pub fn select_prev(&mut self) {
        self.selected = step_prev(self.selected, self.visible().len());
    }

    pub fn clamp_selection(&mut self) {
        self.selected = clamp_index(self.selected, self.visible().len());
    }

    pub fn set_search(&mut self, search: impl Into<String>) {
        self.filter.search = search.into();
        self.clamp_selection();
    }

    pub fn cycle_team(&mut self, forward: bool) {
        let ids: Vec<String> = self.options.teams.iter().map(|(id, _)| id.to_string()).collect();
        let current = self.filter.team_id.map(|id| id.to_string());
        self.filter.team_id = cycle_option(current.as_deref(), &ids, forward)
            .and_then(|id| id.parse::<u32>().ok());
        self.clamp_selection();
    }

    pub fn cycle_position(&mut self, forward: bool) {
        self.filter.position =
            cycle_option(self.filter.position.as_deref(), &self.options.positions, forward);
        self.clamp_selection();
    }

    /// Any -> injured -> healthy -> any.
    pub fn cycle_injured(&mut self) {
        self.filter.injured = match self.filter.injured {
            None => Some(true),
            Some(true) => Some(false),
            Some(false) => None,
        };
        self.clamp_selection();
    }

    pub fn clear_filter(&mut self) {
        self.filter = PlayerFilter::default();
        self.clamp_selection();
    }

    pub fn open_editor(&mut self, id: Option<u32>) {
        let player = id.and_then(|id| self.players.iter().find(|p| p.id == id));
        self.editor = Some(player_form(player, &self.teams));
    }

    pub fn close_editor(&mut self) {
        self.editor = None;
        if self.status == ViewStatus::Saving {
            self.status = ViewStatus::Idle;
        }
    }

    pub fn begin_save(&mut self) -> ApiResult<(Option<u32>, PlayerPayload)> {
        let form = self
            .editor
            .as_ref()
            .ok_or_else(|| ApiError::Validation("No player form is open".to_string()))?;
        let payload = player_payload(form)?;
        self.status = ViewStatus::Saving;
        Ok((form.record_id, payload))
    }

    pub fn save_failed(&mut self, message: impl Into<String>) {
        self.status = ViewStatus::Error;
        self.last_error = Some(message.into());
    }
}

pub fn player_form(player: Option<&Player>, teams: &[Team]) -> Form {
    let (title, id) = match player {
        Some(p) => ("Edit Player", Some(p.id)),
        None => ("Add Player", None),
    };
    let blank = Player::default();
    let p = player.unwrap_or(&blank);

    let mut positions = vec![ChoiceOption::new("", "-")];
    positions.extend(STANDARD_POSITIONS.iter().map(|s| ChoiceOption::new(*s, *s)));
    if !p.position.is_empty() && !STANDARD_POSITIONS.contains(&p.position.as_str()) {
        positions.push(ChoiceOption::new(p.position.clone(), p.position.clone()));
    }
    let mut team_choices = vec![ChoiceOption::new("", "No team")];
    team_choices.extend(
        teams
            .iter()
            .map(|t| ChoiceOption::new(t.id.to_string(), t.display_name())),
    );
    // Date inputs only keep the calendar part.
    let dob: String = p.date_of_birth.chars().take(10).collect();

    Form::new(
        title,
        id,
        vec![
            FormField::new("full_name", "Full Name", FieldKind::Text)
                .with_value(p.full_name.clone()),
            FormField::new("date_of_birth", "Date of Birth", FieldKind::Text).with_value(dob),
            FormField::new("nationality", "Nationality", FieldKind::Text)
                .with_value(p.nationality.clone()),
            FormField::new("position", "Position", FieldKind::Choice(positions))
                .with_value(p.position.clone()),
            FormField::new("jersey_number", "Jersey", FieldKind::Integer)
                .with_value(fmt_opt(p.jersey_number)),
            FormField::new("height", "Height (cm)", FieldKind::Decimal)
                .with_value(fmt_opt(p.height)),
            FormField::new("weight", "Weight (kg)", FieldKind::Decimal)
                .with_value(fmt_opt(p.weight)),
            FormField::new("team_id", "Team", FieldKind::Choice(team_choices))
                .with_value(fmt_opt(p.team_id)),
            FormField::new("player_value", "Value", FieldKind::Decimal)
                .with_value(fmt_amount(p.player_value)),
            FormField::new("salary", "Salary", FieldKind::Decimal).with_value(fmt_amount(p.salary)),
            FormField::new("contract_start", "Contract Start", FieldKind::Text)
                .with_value(p.contract_start.clone().unwrap_or_default()),
            FormField::new("contract_end", "Contract End", FieldKind::Text)
                .with_value(p.contract_end.clone().unwrap_or_default()),
            FormField::new("photo_url", "Photo URL", FieldKind::Text)
                .with_value(p.photo_url.clone()),
            FormField::new("rating", "Rating", FieldKind::Integer)
                .with_value(format_rating_input(p.rating)),
            FormField::new("is_injured", "Injured", FieldKind::Flag)
                .with_value(p.is_injured.to_string()),
            FormField::new("injury_details", "Injury Details", FieldKind::Text)
                .with_value(p.injury_details.clone().unwrap_or_default())
                .shown_when("is_injured"),
        ],
    )
}

fn format_rating_input(rating: f64) -> String {
    if rating == 0.0 {
        String::new()
    } else {
        format!("{}", rating.round() as i64)
    }
}

pub fn player_payload(form: &Form) -> ApiResult<PlayerPayload> {
    let full_name = form.value("full_name").trim().to_string();
    if full_name.is_empty() {
        return Err(ApiError::Validation("Player name is required".to_string()));
    }
    let is_injured = parse_flag(form.value("is_injured"));
    let injury_details = if is_injured {
        form.shown_value("injury_details").and_then(text_or_none)
    } else {
        None
    };
    Ok(PlayerPayload {
        full_name,
        date_of_birth: text_or_none(form.value("date_of_birth")),
        nationality: form.value("nationality").trim().to_string(),
        position: form.value("position").trim().to_string(),
        jersey_number: parse_int(form.value("jersey_number")).and_then(|n| u32::try_from(n).ok()),
        height: parse_decimal(form.value("height")),
        weight: parse_decimal(form.value("weight")),
        contract_start: text_or_none(form.value("contract_start")),
        contract_end: text_or_none(form.value("contract_end")),
        salary: parse_decimal(form.value("salary")).unwrap_or(0.0),
        player_value: parse_decimal(form.value("player_value")).unwrap_or(0.0),
        team_id: parse_int(form.value("team_id")).and_then(|id| u32::try_from(id).ok()),
        photo_url: form.value("photo_url").trim().to_string(),
        is_injured,
        injury_details,
        rating: parse_int(form.value("rating")),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn injury_details_dropped_when_not_injured() {
        let mut form = player_form(None, &[]);
        form.set("full_name", "Kai");
        form.set("injury_details", "knee");
        let payload = player_payload(&form).expect("payload");
        assert!(!payload.is_injured);
        assert_eq!(payload.injury_details, None);

        form.set("is_injured", "true");
        let payload = player_payload(&form).expect("payload");
        assert_eq!(payload.injury_details.as_deref(), Some("knee"));
    }

    #[test]
    fn positions_keep_pitch_order() {
        let players = vec![Player {
            position: "Winger".into(),
            ..Player::default()
        }];
        let opts = PlayerFilterOptions::from_lists(&[], &players);
        assert_eq!(
            opts.positions,
            vec!["Goalkeeper", "Defender", "Midfielder", "Forward", "Winger"]
        );
    }

    #[test]
    fn team_picker_lists_known_teams() {
        let teams = vec![Team {
            id: 3,
            name: "Gamma".into(),
            ..Team::default()
        }];
        let form = player_form(None, &teams);
        let field = form
            .fields
            .iter()
            .find(|f| f.key == "team_id")
            .expect("team field");
        let FieldKind::Choice(options) = &field.kind else {
            panic!("team field is a choice");
        };
        assert_eq!(options.len(), 2);
        assert_eq!(options[1].value, "3");
    }
}
