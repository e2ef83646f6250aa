use std::sync::mpsc::{Receiver, Sender};
use std::thread::{self, JoinHandle};

use crate::api::ApiClient;
use crate::config::{Config, ConnectionStatus, test_connection};
use crate::dashboard::DashboardSummary;
use crate::error::{ApiError, ApiResult};
use crate::export::{write_csv, write_xlsx};
use crate::reports::fetch_report;
use crate::state::{Delta, Entity, ExportFormat, LoadTarget, ProviderCommand};

pub fn spawn_provider(
    config: Config,
    tx: Sender<Delta>,
    cmd_rx: Receiver<ProviderCommand>,
) -> JoinHandle<()> {
    thread::spawn(move || {
        let mut worker = Worker::new(&config);
        if let Err(err) = worker.client() {
            let _ = tx.send(Delta::Log(format!("[WARN] API client unavailable: {err}")));
        }
        while let Ok(cmd) = cmd_rx.recv() {
            for delta in worker.handle(cmd) {
                if tx.send(delta).is_err() {
                    return;
                }
            }
        }
    })
}

pub struct Worker {
    api: ApiResult<ApiClient>,
}

impl Worker {
    pub fn new(config: &Config) -> Self {
        Self {
            api: ApiClient::new(config),
        }
    }

    pub fn with_client(api: ApiClient) -> Self {
        Self { api: Ok(api) }
    }

    fn client(&self) -> ApiResult<&ApiClient> {
        self.api.as_ref().map_err(Clone::clone)
    }

    pub fn handle(&mut self, cmd: ProviderCommand) -> Vec<Delta> {
        match cmd {
            ProviderCommand::Reconfigure(config) => {
                self.api = ApiClient::new(&config);
                let line = match &self.api {
                    Ok(api) => format!("[INFO] Using API at {}", api.endpoints().base),
                    Err(err) => format!("[WARN] API client unavailable: {err}"),
                };
                vec![Delta::Log(line)]
            }
            ProviderCommand::LoadDashboard => {
                let result = self
                    .client()
                    .and_then(|api| api.list_teams_and_players())
                    .map(|(teams, players)| DashboardSummary::from_lists(&teams, &players));
                vec![match result {
                    Ok(summary) => Delta::DashboardLoaded(summary),
                    Err(err) => load_failed(LoadTarget::Dashboard, 0, &err),
                }]
            }
            ProviderCommand::LoadTeams { generation } => {
                vec![match self.client().and_then(|api| api.list_teams()) {
                    Ok(teams) => Delta::TeamsLoaded { generation, teams },
                    Err(err) => load_failed(LoadTarget::Teams, generation, &err),
                }]
            }
            ProviderCommand::LoadPlayers { generation } => {
                vec![match self.client().and_then(|api| api.list_teams_and_players()) {
                    Ok((teams, players)) => Delta::PlayersLoaded {
                        generation,
                        teams,
                        players,
                    },
                    Err(err) => load_failed(LoadTarget::Players, generation, &err),
                }]
            }
            ProviderCommand::LoadReportTeams { generation } => {
                vec![match self.client().and_then(|api| api.list_teams()) {
                    Ok(teams) => Delta::ReportTeamsLoaded { generation, teams },
                    Err(err) => load_failed(LoadTarget::ReportTeams, generation, &err),
                }]
            }
            ProviderCommand::SaveTeam { id, payload } => {
                let result = self.client().and_then(|api| match id {
                    Some(id) => api.update_team(id, &payload),
                    None => api.create_team(&payload),
                });
                vec![match result {
                    Ok(team) => Delta::TeamSaved(team),
                    Err(err) => mutation_failed(Entity::Team, "save team", &err),
                }]
            }
            ProviderCommand::DeleteTeam { id } => {
                vec![match self.client().and_then(|api| api.delete_team(id)) {
                    Ok(()) => Delta::TeamDeleted(id),
                    Err(err) => mutation_failed(Entity::Team, "delete team", &err),
                }]
            }
            ProviderCommand::SavePlayer { id, payload } => {
                let result = self.client().and_then(|api| match id {
                    Some(id) => api.update_player(id, &payload),
                    None => api.create_player(&payload),
                });
                vec![match result {
                    Ok(player) => Delta::PlayerSaved(player),
                    Err(err) => mutation_failed(Entity::Player, "save player", &err),
                }]
            }
            ProviderCommand::DeletePlayer { id } => {
                vec![match self.client().and_then(|api| api.delete_player(id)) {
                    Ok(()) => Delta::PlayerDeleted(id),
                    Err(err) => mutation_failed(Entity::Player, "delete player", &err),
                }]
            }
            ProviderCommand::RunReport(req) => {
                let result = self
                    .client()
                    .and_then(|api| fetch_report(api, req.kind, req.team_id, req.source));
                vec![match result {
                    Ok(report) => Delta::ReportReady {
                        generation: req.generation,
                        report,
                    },
                    Err(error) => Delta::ReportFailed {
                        generation: req.generation,
                        error,
                    },
                }]
            }
            ProviderCommand::TestConnection { base_url } => {
                let status = match self.client() {
                    Ok(api) => test_connection(api.http(), &base_url),
                    Err(err) => ConnectionStatus {
                        success: false,
                        message: format!("Connection error: {err}"),
                    },
                };
                vec![Delta::ConnectionTested(status)]
            }
            ProviderCommand::Export {
                report,
                format,
                dir,
                date,
            } => {
                let result = match format {
                    ExportFormat::Csv => write_csv(&report, &dir, date),
                    ExportFormat::Xlsx => write_xlsx(&report, &dir, date),
                };
                vec![match result {
                    Ok(path) => Delta::Exported(path),
                    Err(err) => Delta::ExportFailed(format!("{err:#}")),
                }]
            }
        }
    }
}

fn load_failed(target: LoadTarget, generation: u64, err: &ApiError) -> Delta {
    Delta::LoadFailed {
        target,
        generation,
        message: err.to_string(),
    }
}

fn mutation_failed(entity: Entity, what: &str, err: &ApiError) -> Delta {
    Delta::MutationFailed {
        entity,
        what: what.to_string(),
        message: err.to_string(),
    }
}
