use crate::error::{ApiError, ApiResult};
use crate::form::{FieldKind, Form, FormField, fmt_amount, fmt_opt, parse_decimal, parse_int};
use crate::model::{Team, TeamPayload};
use crate::view::{Generation, ViewStatus, clamp_index, cycle_option, step_next, step_prev, unique_sorted};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TeamFilter {
    pub search: String,
    pub country: Option<String>,
    pub league: Option<String>,
}

impl TeamFilter {
    /// Name substring (case-insensitive) AND country AND league.
    pub fn matches(&self, team: &Team) -> bool {
        let needle = self.search.trim().to_lowercase();
        if !needle.is_empty() && !team.name.to_lowercase().contains(&needle) {
            return false;
        }
        if let Some(country) = self.country.as_deref() {
            if team.country != country {
                return false;
            }
        }
        if let Some(league) = self.league.as_deref() {
            if team.league != league {
                return false;
            }
        }
        true
    }

    pub fn is_empty(&self) -> bool {
        self.search.trim().is_empty() && self.country.is_none() && self.league.is_none()
    }
}

pub fn filter_teams<'a>(teams: &'a [Team], filter: &TeamFilter) -> Vec<&'a Team> {
    teams.iter().filter(|t| filter.matches(t)).collect()
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TeamFilterOptions {
    pub countries: Vec<String>,
    pub leagues: Vec<String>,
}

impl TeamFilterOptions {
    pub fn from_teams(teams: &[Team]) -> Self {
        Self {
            countries: unique_sorted(teams.iter().map(|t| t.country.as_str())),
            leagues: unique_sorted(teams.iter().map(|t| t.league.as_str())),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct TeamsView {
    pub teams: Vec<Team>,
    pub options: TeamFilterOptions,
    pub filter: TeamFilter,
    pub selected: usize,
    pub status: ViewStatus,
    pub editor: Option<Form>,
    pub last_error: Option<String>,
    generation: Generation,
}

impl TeamsView {
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

    pub fn finish_load(&mut self, generation: u64, teams: Vec<Team>) -> bool {
        if !self.generation.is_current(generation) {
            return false;
        }
        self.options = TeamFilterOptions::from_teams(&teams);
        self.teams = teams;
        self.status = ViewStatus::Loaded;
        self.last_error = None;
        if self.filter.country.as_ref().is_some_and(|c| !self.options.countries.contains(c)) {
            self.filter.country = None;
        }
        if self.filter.league.as_ref().is_some_and(|l| !self.options.leagues.contains(l)) {
            self.filter.league = None;
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

    pub fn visible(&self) -> Vec<&Team> {
        filter_teams(&self.teams, &self.filter)
    }

    pub fn selected_team(&self) -> Option<&Team> {
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

    pub fn cycle_country(&mut self, forward: bool) {
        self.filter.country =
            cycle_option(self.filter.country.as_deref(), &self.options.countries, forward);
        self.clamp_selection();
    }

    pub fn cycle_league(&mut self, forward: bool) {
        self.filter.league =
            cycle_option(self.filter.league.as_deref(), &self.options.leagues, forward);
        self.clamp_selection();
    }

    pub fn clear_filter(&mut self) {
        self.filter = TeamFilter::default();
        self.clamp_selection();
    }

    /// Known id fills the form from the cache; unknown or absent id opens a
    /// blank form.
    pub fn open_editor(&mut self, id: Option<u32>) {
        let team = id.and_then(|id| self.teams.iter().find(|t| t.id == id));
        self.editor = Some(team_form(team));
    }

    pub fn close_editor(&mut self) {
        self.editor = None;
        if self.status == ViewStatus::Saving {
            self.status = ViewStatus::Idle;
        }
    }

    pub fn begin_save(&mut self) -> ApiResult<(Option<u32>, TeamPayload)> {
        let form = self
            .editor
            .as_ref()
            .ok_or_else(|| ApiError::Validation("No team form is open".to_string()))?;
        let payload = team_payload(form)?;
        self.status = ViewStatus::Saving;
        Ok((form.record_id, payload))
    }

    pub fn save_failed(&mut self, message: impl Into<String>) {
        self.status = ViewStatus::Error;
        self.last_error = Some(message.into());
    }
}

pub fn team_form(team: Option<&Team>) -> Form {
    let (title, id) = match team {
        Some(t) => ("Edit Team", Some(t.id)),
        None => ("Add Team", None),
    };
    let blank = Team::default();
    let t = team.unwrap_or(&blank);
    Form::new(
        title,
        id,
        vec![
            FormField::new("name", "Name", FieldKind::Text).with_value(t.name.clone()),
            FormField::new("established_year", "Established", FieldKind::Integer)
                .with_value(fmt_opt(t.established_year)),
            FormField::new("home_stadium", "Stadium", FieldKind::Text)
                .with_value(t.home_stadium.clone()),
            FormField::new("club_colors", "Colors", FieldKind::Text)
                .with_value(t.club_colors.clone()),
            FormField::new("country", "Country", FieldKind::Text).with_value(t.country.clone()),
            FormField::new("league", "League", FieldKind::Text).with_value(t.league.clone()),
            FormField::new("current_season_position", "League Position", FieldKind::Integer)
                .with_value(fmt_opt(t.current_season_position)),
            FormField::new("team_value", "Team Value", FieldKind::Decimal)
                .with_value(fmt_amount(t.team_value)),
            FormField::new("description", "Description", FieldKind::Text)
                .with_value(t.description.clone()),
            FormField::new("wikipedia_link", "Wikipedia", FieldKind::Text)
                .with_value(t.wikipedia_link.clone()),
        ],
    )
}

/// Numeric coercion only; a blank name is the one rejection.
pub fn team_payload(form: &Form) -> ApiResult<TeamPayload> {
    let name = form.value("name").trim().to_string();
    if name.is_empty() {
        return Err(ApiError::Validation("Team name is required".to_string()));
    }
    Ok(TeamPayload {
        id: form.record_id,
        name,
        established_year: parse_int(form.value("established_year"))
            .and_then(|y| i32::try_from(y).ok()),
        home_stadium: form.value("home_stadium").trim().to_string(),
        club_colors: form.value("club_colors").trim().to_string(),
        country: form.value("country").trim().to_string(),
        league: form.value("league").trim().to_string(),
        current_season_position: parse_int(form.value("current_season_position"))
            .and_then(|p| u32::try_from(p).ok()),
        team_value: parse_decimal(form.value("team_value"))
            .unwrap_or(0.0)
            .max(0.0),
        description: form.value("description").trim().to_string(),
        wikipedia_link: form.value("wikipedia_link").trim().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn team(id: u32, name: &str) -> Team {
        Team {
            id,
            name: name.to_string(),
            ..Team::default()
        }
    }

    #[test]
    fn unknown_id_opens_blank_form() {
        let mut view = TeamsView::new();
        let generation = view.begin_load();
        view.finish_load(generation, vec![team(1, "Alpha")]);
        view.open_editor(Some(99));
        let form = view.editor.as_ref().expect("editor open");
        assert_eq!(form.record_id, None);
        assert_eq!(form.value("name"), "");
    }

    #[test]
    fn blank_name_is_rejected() {
        let form = team_form(None);
        assert!(matches!(team_payload(&form), Err(ApiError::Validation(_))));
    }

    #[test]
    fn junk_numbers_become_absent() {
        let mut form = team_form(None);
        form.set("name", "Alpha FC");
        form.set("established_year", "");
        form.set("team_value", "abc");
        let payload = team_payload(&form).expect("valid payload");
        assert_eq!(payload.established_year, None);
        assert_eq!(payload.team_value, 0.0);
    }
}
