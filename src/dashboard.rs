use crate::model::{Player, Team};
use crate::reports::format_money;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DashboardSummary {
    pub team_count: usize,
    pub player_count: usize,
    pub injured_count: usize,
    pub average_value: f64,
}

impl DashboardSummary {
    pub fn from_lists(teams: &[Team], players: &[Player]) -> Self {
        let total_value: f64 = players.iter().map(|p| p.player_value).sum();
        let average_value = if players.is_empty() {
            0.0
        } else {
            total_value / players.len() as f64
        };
        Self {
            team_count: teams.len(),
            player_count: players.len(),
            injured_count: players.iter().filter(|p| p.is_injured).count(),
            average_value,
        }
    }

    /// Average rounded to cents for display.
    pub fn average_value_text(&self) -> String {
        format_money((self.average_value * 100.0).round() / 100.0)
    }
}

#[derive(Debug, Clone, Default)]
pub struct DashboardView {
    pub summary: Option<DashboardSummary>,
    pub last_error: Option<String>,
}
