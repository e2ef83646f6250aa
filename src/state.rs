use std::collections::VecDeque;
use std::path::PathBuf;

use chrono::NaiveDate;

use crate::config::{Config, ConnectionStatus};
use crate::dashboard::{DashboardSummary, DashboardView};
use crate::error::ApiError;
use crate::model::{Player, PlayerPayload, Team, TeamPayload};
use crate::players_view::PlayersView;
use crate::reports::{RenderedReport, Report, report_failure_message};
use crate::reports_view::{ReportRequest, ReportsView};
use crate::settings_view::SettingsView;
use crate::teams_view::TeamsView;
use crate::view::ViewStatus;

const MAX_LOGS: usize = 200;
const NO_DATA: &str = "No data to export";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Dashboard,
    Teams,
    Players,
    Reports,
    Settings,
}

impl Section {
    pub const ALL: [Section; 5] = [
        Section::Dashboard,
        Section::Teams,
        Section::Players,
        Section::Reports,
        Section::Settings,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Section::Dashboard => "Dashboard",
            Section::Teams => "Teams",
            Section::Players => "Players",
            Section::Reports => "Reports",
            Section::Settings => "Settings",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmAction {
    DeleteTeam(u32),
    DeletePlayer(u32),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Popup {
    Alert(String),
    Confirm {
        message: String,
        action: ConfirmAction,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputTarget {
    TeamSearch,
    PlayerSearch,
    SettingsUrl,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Xlsx,
}

impl ExportFormat {
    pub fn label(self) -> &'static str {
        match self {
            ExportFormat::Csv => "CSV",
            ExportFormat::Xlsx => "XLSX",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadTarget {
    Dashboard,
    Teams,
    Players,
    ReportTeams,
}

impl LoadTarget {
    fn label(self) -> &'static str {
        match self {
            LoadTarget::Dashboard => "dashboard",
            LoadTarget::Teams => "teams",
            LoadTarget::Players => "players",
            LoadTarget::ReportTeams => "report teams",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    Team,
    Player,
}

#[derive(Debug, Clone)]
pub enum ProviderCommand {
    LoadDashboard,
    LoadTeams {
        generation: u64,
    },
    LoadPlayers {
        generation: u64,
    },
    LoadReportTeams {
        generation: u64,
    },
    SaveTeam {
        id: Option<u32>,
        payload: TeamPayload,
    },
    DeleteTeam {
        id: u32,
    },
    SavePlayer {
        id: Option<u32>,
        payload: PlayerPayload,
    },
    DeletePlayer {
        id: u32,
    },
    RunReport(ReportRequest),
    TestConnection {
        base_url: String,
    },
    Export {
        report: RenderedReport,
        format: ExportFormat,
        dir: PathBuf,
        date: NaiveDate,
    },
    Reconfigure(Config),
}

impl ProviderCommand {
    /// Commands answered by exactly one terminal delta hold the loading
    /// indicator until that delta arrives.
    pub fn holds_loading(&self) -> bool {
        !matches!(self, ProviderCommand::Reconfigure(_))
    }
}

#[derive(Debug, Clone)]
pub enum Delta {
    DashboardLoaded(DashboardSummary),
    TeamsLoaded {
        generation: u64,
        teams: Vec<Team>,
    },
    PlayersLoaded {
        generation: u64,
        teams: Vec<Team>,
        players: Vec<Player>,
    },
    ReportTeamsLoaded {
        generation: u64,
        teams: Vec<Team>,
    },
    LoadFailed {
        target: LoadTarget,
        generation: u64,
        message: String,
    },
    TeamSaved(Team),
    TeamDeleted(u32),
    PlayerSaved(Player),
    PlayerDeleted(u32),
    MutationFailed {
        entity: Entity,
        what: String,
        message: String,
    },
    ReportReady {
        generation: u64,
        report: Report,
    },
    ReportFailed {
        generation: u64,
        error: ApiError,
    },
    ConnectionTested(ConnectionStatus),
    Exported(PathBuf),
    ExportFailed(String),
    Log(String),
}

impl Delta {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Delta::Log(_))
    }
}

#[derive(Debug, Clone)]
pub struct AppState {
    pub section: Section,
    pub config: Config,
    pub dashboard: DashboardView,
    pub teams: TeamsView,
    pub players: PlayersView,
    pub reports: ReportsView,
    pub settings: SettingsView,
    pub loading: usize,
    pub logs: VecDeque<String>,
    pub popup: Option<Popup>,
    pub help_overlay: bool,
    pub input: Option<InputTarget>,
    pub export_dir: PathBuf,
    outbox: Vec<ProviderCommand>,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            section: Section::Dashboard,
            settings: SettingsView::from_config(&config),
            config,
            dashboard: DashboardView::default(),
            teams: TeamsView::new(),
            players: PlayersView::new(),
            reports: ReportsView::new(),
            loading: 0,
            logs: VecDeque::new(),
            popup: None,
            help_overlay: false,
            input: None,
            export_dir: PathBuf::from("."),
            outbox: Vec::new(),
        }
    }

    pub fn is_loading(&self) -> bool {
        self.loading > 0
    }

    pub fn push_log(&mut self, msg: impl Into<String>) {
        self.logs.push_back(msg.into());
        while self.logs.len() > MAX_LOGS {
            self.logs.pop_front();
        }
    }

    pub fn alert(&mut self, msg: impl Into<String>) {
        self.popup = Some(Popup::Alert(msg.into()));
    }

    pub fn request(&mut self, cmd: ProviderCommand) {
        if cmd.holds_loading() {
            self.loading += 1;
        }
        self.outbox.push(cmd);
    }

    pub fn take_outbox(&mut self) -> Vec<ProviderCommand> {
        std::mem::take(&mut self.outbox)
    }

    /// Returns a command that never reached the provider; its terminal
    /// delta will not arrive, so the loading hold is released here.
    pub fn command_dropped(&mut self, cmd: &ProviderCommand) {
        if cmd.holds_loading() {
            self.loading = self.loading.saturating_sub(1);
        }
    }

    pub fn switch_section(&mut self, section: Section) {
        self.section = section;
        self.input = None;
        self.load_section();
    }

    pub fn load_section(&mut self) {
        match self.section {
            Section::Dashboard => self.request(ProviderCommand::LoadDashboard),
            Section::Teams => self.reload_teams(),
            Section::Players => self.reload_players(),
            Section::Reports => {
                let generation = self.reports.begin_teams_load();
                self.request(ProviderCommand::LoadReportTeams { generation });
            }
            Section::Settings => {
                let config = self.config.clone();
                self.settings.reset(&config);
            }
        }
    }

    fn reload_teams(&mut self) {
        let generation = self.teams.begin_load();
        self.request(ProviderCommand::LoadTeams { generation });
    }

    fn reload_players(&mut self) {
        let generation = self.players.begin_load();
        self.request(ProviderCommand::LoadPlayers { generation });
    }

    pub fn editor_open(&self) -> bool {
        match self.section {
            Section::Teams => self.teams.editor.is_some(),
            Section::Players => self.players.editor.is_some(),
            _ => false,
        }
    }

    pub fn open_editor(&mut self, existing: bool) {
        match self.section {
            Section::Teams => {
                let id = if existing {
                    self.teams.selected_team().map(|t| t.id)
                } else {
                    None
                };
                self.teams.open_editor(id);
            }
            Section::Players => {
                let id = if existing {
                    self.players.selected_player().map(|p| p.id)
                } else {
                    None
                };
                self.players.open_editor(id);
            }
            _ => {}
        }
    }

    pub fn close_editor(&mut self) {
        match self.section {
            Section::Teams => self.teams.close_editor(),
            Section::Players => self.players.close_editor(),
            _ => {}
        }
    }

    pub fn save_editor(&mut self) {
        let cmd = match self.section {
            Section::Teams => self
                .teams
                .begin_save()
                .map(|(id, payload)| ProviderCommand::SaveTeam { id, payload }),
            Section::Players => self
                .players
                .begin_save()
                .map(|(id, payload)| ProviderCommand::SavePlayer { id, payload }),
            _ => return,
        };
        match cmd {
            Ok(cmd) => self.request(cmd),
            Err(err) => self.alert(err.to_string()),
        }
    }

    pub fn request_delete(&mut self) {
        let popup = match self.section {
            Section::Teams => self.teams.selected_team().map(|t| Popup::Confirm {
                message: format!("Delete team {}? (y/n)", t.display_name()),
                action: ConfirmAction::DeleteTeam(t.id),
            }),
            Section::Players => self.players.selected_player().map(|p| Popup::Confirm {
                message: format!("Delete player {}? (y/n)", p.display_name()),
                action: ConfirmAction::DeletePlayer(p.id),
            }),
            _ => None,
        };
        match popup {
            Some(popup) => self.popup = Some(popup),
            None => self.push_log("[INFO] Nothing selected to delete"),
        }
    }

    /// Answers the open popup; `accept` only matters for confirmations.
    pub fn resolve_popup(&mut self, accept: bool) {
        let Some(popup) = self.popup.take() else {
            return;
        };
        let Popup::Confirm { action, .. } = popup else {
            return;
        };
        if !accept {
            return;
        }
        match action {
            ConfirmAction::DeleteTeam(id) => {
                self.teams.status = ViewStatus::Saving;
                self.request(ProviderCommand::DeleteTeam { id });
            }
            ConfirmAction::DeletePlayer(id) => {
                self.players.status = ViewStatus::Saving;
                self.request(ProviderCommand::DeletePlayer { id });
            }
        }
    }

    pub fn run_report(&mut self) {
        match self.reports.begin_run() {
            Ok(req) => {
                self.push_log(format!(
                    "[INFO] Generating {} ({}) for team {}",
                    req.kind.label(),
                    req.source.label(),
                    req.team_id
                ));
                self.request(ProviderCommand::RunReport(req));
            }
            Err(err) => self.alert(err.to_string()),
        }
    }

    pub fn export_report(&mut self, format: ExportFormat, date: NaiveDate) {
        let Some(report) = self.reports.rendered.clone() else {
            self.alert(NO_DATA);
            return;
        };
        if report.tables.is_empty() {
            self.alert(NO_DATA);
            return;
        }
        let dir = self.export_dir.clone();
        self.request(ProviderCommand::Export {
            report,
            format,
            dir,
            date,
        });
    }

    pub fn test_connection(&mut self) {
        self.settings.testing = true;
        self.settings.connection = None;
        let base_url = self.settings.draft_url.clone();
        self.request(ProviderCommand::TestConnection { base_url });
    }

    pub fn config_saved(&mut self, config: Config) {
        self.push_log(format!(
            "[INFO] API settings saved: {} at {}",
            config.backend_type.label(),
            config.api_base_url
        ));
        self.settings.reset(&config);
        self.config = config.clone();
        self.request(ProviderCommand::Reconfigure(config));
    }
}

pub fn apply_delta(state: &mut AppState, delta: Delta) {
    if delta.is_terminal() {
        state.loading = state.loading.saturating_sub(1);
    }
    match delta {
        Delta::DashboardLoaded(summary) => {
            state.dashboard.summary = Some(summary);
            state.dashboard.last_error = None;
        }
        Delta::TeamsLoaded { generation, teams } => {
            let count = teams.len();
            if state.teams.finish_load(generation, teams) {
                state.push_log(format!("[INFO] Loaded {count} teams"));
            }
        }
        Delta::PlayersLoaded {
            generation,
            teams,
            players,
        } => {
            let count = players.len();
            if state.players.finish_load(generation, teams, players) {
                state.push_log(format!("[INFO] Loaded {count} players"));
            }
        }
        Delta::ReportTeamsLoaded { generation, teams } => {
            state.reports.finish_teams_load(generation, teams);
        }
        Delta::LoadFailed {
            target,
            generation,
            message,
        } => {
            let current = match target {
                LoadTarget::Dashboard => {
                    state.dashboard.last_error = Some(message.clone());
                    true
                }
                LoadTarget::Teams => state.teams.fail_load(generation, message.clone()),
                LoadTarget::Players => state.players.fail_load(generation, message.clone()),
                LoadTarget::ReportTeams => {
                    let current = state.reports.is_latest_teams_load(generation);
                    if current {
                        state.alert("Failed to load teams. Please check the console for details.");
                    }
                    current
                }
            };
            if current {
                state.push_log(format!(
                    "[ERROR] Loading {} failed: {message}",
                    target.label()
                ));
            }
        }
        Delta::TeamSaved(team) => {
            state.teams.close_editor();
            state.push_log(format!("[INFO] Saved team {}", team.display_name()));
            state.reload_teams();
        }
        Delta::TeamDeleted(id) => {
            state.push_log(format!("[INFO] Deleted team {id}"));
            state.reload_teams();
        }
        Delta::PlayerSaved(player) => {
            state.players.close_editor();
            state.push_log(format!("[INFO] Saved player {}", player.display_name()));
            state.reload_players();
        }
        Delta::PlayerDeleted(id) => {
            state.push_log(format!("[INFO] Deleted player {id}"));
            state.reload_players();
        }
        Delta::MutationFailed {
            entity,
            what,
            message,
        } => {
            match entity {
                Entity::Team => state.teams.save_failed(message.clone()),
                Entity::Player => state.players.save_failed(message.clone()),
            }
            state.push_log(format!("[ERROR] Failed to {what}: {message}"));
        }
        Delta::ReportReady { generation, report } => {
            if state.reports.finish_run(generation, report) {
                let heading = state
                    .reports
                    .rendered
                    .as_ref()
                    .map(|r| r.heading.clone())
                    .unwrap_or_default();
                state.push_log(format!("[INFO] Report ready: {heading}"));
            }
        }
        Delta::ReportFailed { generation, error } => {
            let message = report_failure_message(&error);
            if state.reports.fail_run(generation, message.clone()) {
                state.push_log(format!("[ERROR] {message}"));
                state.alert(message);
            }
        }
        Delta::ConnectionTested(status) => {
            let level = if status.success { "INFO" } else { "WARN" };
            state.push_log(format!("[{level}] {}", status.message));
            state.settings.testing = false;
            state.settings.connection = Some(status);
        }
        Delta::Exported(path) => {
            state.push_log(format!("[INFO] Exported report to {}", path.display()));
            state.reports.last_export = Some(path);
        }
        Delta::ExportFailed(message) => {
            state.push_log(format!("[ERROR] Export failed: {message}"));
            state.alert(message);
        }
        Delta::Log(msg) => state.push_log(msg),
    }
}
