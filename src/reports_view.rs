use std::path::PathBuf;

use crate::error::{ApiError, ApiResult};
use crate::model::Team;
use crate::reports::{RenderedReport, Report, ReportKind, ReportSource};
use crate::view::{Generation, ViewStatus, step_next, step_prev};

const NO_TEAM: &str = "Please select a team for the report.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRequest {
    pub generation: u64,
    pub kind: ReportKind,
    pub team_id: u32,
    pub source: ReportSource,
}

#[derive(Debug, Clone)]
pub struct ReportsView {
    pub teams: Vec<Team>,
    pub team_index: Option<usize>,
    pub kind: ReportKind,
    pub source: ReportSource,
    pub status: ViewStatus,
    pub report: Option<Report>,
    pub rendered: Option<RenderedReport>,
    pub last_error: Option<String>,
    pub last_export: Option<PathBuf>,
    teams_generation: Generation,
    run_generation: Generation,
}

impl Default for ReportsView {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportsView {
    pub fn new() -> Self {
        let kind = ReportKind::TeamComposition;
        Self {
            teams: Vec::new(),
            team_index: None,
            kind,
            source: kind.default_source(),
            status: ViewStatus::Idle,
            report: None,
            rendered: None,
            last_error: None,
            last_export: None,
            teams_generation: Generation::default(),
            run_generation: Generation::default(),
        }
    }

    pub fn begin_teams_load(&mut self) -> u64 {
        self.teams_generation.bump()
    }

    /// Keeps the picked team when it is still in the new list.
    pub fn finish_teams_load(&mut self, generation: u64, teams: Vec<Team>) -> bool {
        if !self.teams_generation.is_current(generation) {
            return false;
        }
        let keep = self.selected_team_id();
        self.teams = teams;
        self.team_index = keep.and_then(|id| self.teams.iter().position(|t| t.id == id));
        true
    }

    /// False once a newer team list load has been issued.
    pub fn is_latest_teams_load(&self, generation: u64) -> bool {
        self.teams_generation.is_current(generation)
    }

    pub fn selected_team(&self) -> Option<&Team> {
        self.team_index.and_then(|idx| self.teams.get(idx))
    }

    pub fn selected_team_id(&self) -> Option<u32> {
        self.selected_team().map(|t| t.id)
    }

    pub fn select_team_next(&mut self) {
        if self.teams.is_empty() {
            self.team_index = None;
            return;
        }
        self.team_index = Some(match self.team_index {
            None => 0,
            Some(idx) => step_next(idx, self.teams.len()),
        });
        self.clear_result();
    }

    pub fn select_team_prev(&mut self) {
        if self.teams.is_empty() {
            self.team_index = None;
            return;
        }
        self.team_index = Some(match self.team_index {
            None => self.teams.len() - 1,
            Some(idx) => step_prev(idx, self.teams.len()),
        });
        self.clear_result();
    }

    /// Switching kind resets the source to that kind's default.
    pub fn cycle_kind(&mut self) {
        self.set_kind(self.kind.next());
    }

    pub fn set_kind(&mut self, kind: ReportKind) {
        self.kind = kind;
        self.source = kind.default_source();
        self.clear_result();
    }

    pub fn toggle_source(&mut self) {
        self.source = self.source.toggle();
    }

    pub fn clear_result(&mut self) {
        self.report = None;
        self.rendered = None;
        self.last_error = None;
    }

    pub fn begin_run(&mut self) -> ApiResult<ReportRequest> {
        let team_id = self
            .selected_team_id()
            .ok_or_else(|| ApiError::Validation(NO_TEAM.to_string()))?;
        self.status = ViewStatus::Loading;
        Ok(ReportRequest {
            generation: self.run_generation.bump(),
            kind: self.kind,
            team_id,
            source: self.source,
        })
    }

    pub fn finish_run(&mut self, generation: u64, report: Report) -> bool {
        if !self.run_generation.is_current(generation) {
            return false;
        }
        self.rendered = Some(report.render());
        self.report = Some(report);
        self.status = ViewStatus::Loaded;
        self.last_error = None;
        true
    }

    pub fn fail_run(&mut self, generation: u64, message: impl Into<String>) -> bool {
        if !self.run_generation.is_current(generation) {
            return false;
        }
        self.report = None;
        self.rendered = None;
        self.status = ViewStatus::Error;
        self.last_error = Some(message.into());
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_without_team_is_rejected() {
        let mut view = ReportsView::new();
        let err = view.begin_run().expect_err("no team picked");
        assert_eq!(err, ApiError::Validation(NO_TEAM.to_string()));
        assert_eq!(view.status, ViewStatus::Idle);
    }

    #[test]
    fn kind_switch_restores_default_source() {
        let mut view = ReportsView::new();
        assert_eq!(view.source, ReportSource::Server);
        view.toggle_source();
        view.cycle_kind();
        assert_eq!(view.kind, ReportKind::PlayerPerformance);
        assert_eq!(view.source, ReportSource::Client);
    }

    #[test]
    fn reload_keeps_picked_team() {
        let mut view = ReportsView::new();
        let teams = |ids: &[u32]| {
            ids.iter()
                .map(|id| Team {
                    id: *id,
                    ..Team::default()
                })
                .collect::<Vec<_>>()
        };
        let generation = view.begin_teams_load();
        view.finish_teams_load(generation, teams(&[1, 2, 3]));
        view.select_team_next();
        view.select_team_next();
        assert_eq!(view.selected_team_id(), Some(2));

        let generation = view.begin_teams_load();
        view.finish_teams_load(generation, teams(&[5, 2]));
        assert_eq!(view.selected_team_id(), Some(2));
    }
}
