use std::collections::BTreeMap;

use serde_json::Value;

use crate::api::ApiClient;
use crate::error::{ApiError, ApiResult};
use crate::model::{Player, Team};
use crate::normalize::{normalize_player, normalize_team, pick_f64, pick_u32, pick_value};

const NO_PLAYERS: &str = "No players found for this team";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReportKind {
    TeamComposition,
    PlayerPerformance,
    ValueReport,
    InjuryReport,
}

impl ReportKind {
    pub const ALL: [ReportKind; 4] = [
        ReportKind::TeamComposition,
        ReportKind::PlayerPerformance,
        ReportKind::ValueReport,
        ReportKind::InjuryReport,
    ];

    pub fn slug(self) -> &'static str {
        match self {
            ReportKind::TeamComposition => "team-composition",
            ReportKind::PlayerPerformance => "player-performance",
            ReportKind::ValueReport => "value-report",
            ReportKind::InjuryReport => "injury-report",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ReportKind::TeamComposition => "Team Composition",
            ReportKind::PlayerPerformance => "Player Performance",
            ReportKind::ValueReport => "Value Report",
            ReportKind::InjuryReport => "Injury Report",
        }
    }

    pub fn from_slug(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        Self::ALL.into_iter().find(|kind| kind.slug() == raw)
    }

    pub fn default_source(self) -> ReportSource {
        match self {
            ReportKind::TeamComposition => ReportSource::Server,
            _ => ReportSource::Client,
        }
    }

    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|k| *k == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportSource {
    Client,
    Server,
}

impl ReportSource {
    pub fn label(self) -> &'static str {
        match self {
            ReportSource::Client => "client",
            ReportSource::Server => "server",
        }
    }

    pub fn toggle(self) -> Self {
        match self {
            ReportSource::Client => ReportSource::Server,
            ReportSource::Server => ReportSource::Client,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TeamComposition {
    pub team: Team,
    pub total_players: usize,
    pub positions: BTreeMap<String, usize>,
    pub nationalities: BTreeMap<String, usize>,
    pub average_rating: f64,
    pub total_value: f64,
    pub injured_players: Vec<Player>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlayerPerformance {
    pub team: Team,
    pub players: Vec<Player>,
    pub highest_rated: Option<Player>,
    pub lowest_rated: Option<Player>,
    pub average_rating: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValueReport {
    pub team: Team,
    pub players: Vec<Player>,
    pub total_value: f64,
    pub most_valuable: Option<Player>,
    pub least_valuable: Option<Player>,
    pub average_value: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InjuryReport {
    pub team: Team,
    pub total_players: usize,
    pub injured_players: Vec<Player>,
    pub injury_rate: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Report {
    Composition(TeamComposition),
    Performance(PlayerPerformance),
    Value(ValueReport),
    Injury(InjuryReport),
}

impl Report {
    pub fn kind(&self) -> ReportKind {
        match self {
            Report::Composition(_) => ReportKind::TeamComposition,
            Report::Performance(_) => ReportKind::PlayerPerformance,
            Report::Value(_) => ReportKind::ValueReport,
            Report::Injury(_) => ReportKind::InjuryReport,
        }
    }

    pub fn team(&self) -> &Team {
        match self {
            Report::Composition(r) => &r.team,
            Report::Performance(r) => &r.team,
            Report::Value(r) => &r.team,
            Report::Injury(r) => &r.team,
        }
    }

    pub fn render(&self) -> RenderedReport {
        match self {
            Report::Composition(r) => render_composition(r),
            Report::Performance(r) => render_performance(r),
            Report::Value(r) => render_value(r),
            Report::Injury(r) => render_injury(r),
        }
    }
}

/// One table of a rendered report; also the unit of export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportTable {
    pub title: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl ReportTable {
    fn new(title: &str, headers: &[&str]) -> Self {
        Self {
            title: title.to_string(),
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedReport {
    pub kind: ReportKind,
    pub team_name: String,
    pub heading: String,
    pub summary: Vec<String>,
    pub tables: Vec<ReportTable>,
}

impl RenderedReport {
    pub fn first_table(&self) -> Option<&ReportTable> {
        self.tables.first()
    }
}

pub fn find_team(teams: &[Team], team_id: u32) -> ApiResult<&Team> {
    teams.iter().find(|t| t.id == team_id).ok_or_else(|| {
        ApiError::Validation(format!(
            "Team with ID {team_id} not found in the list of {} teams",
            teams.len()
        ))
    })
}

fn team_players(team: &Team, players: &[Player]) -> Vec<Player> {
    players
        .iter()
        .filter(|p| p.belongs_to(team.id))
        .cloned()
        .collect()
}

fn mean(total: f64, count: usize) -> f64 {
    if count == 0 { 0.0 } else { total / count as f64 }
}

pub fn compute_composition(team: &Team, players: &[Player]) -> TeamComposition {
    let roster = team_players(team, players);
    let mut positions = BTreeMap::new();
    let mut nationalities = BTreeMap::new();
    let mut rating_sum = 0.0;
    let mut total_value = 0.0;
    for player in &roster {
        if !player.position.is_empty() {
            *positions.entry(player.position.clone()).or_insert(0) += 1;
        }
        if !player.nationality.is_empty() {
            *nationalities.entry(player.nationality.clone()).or_insert(0) += 1;
        }
        rating_sum += player.rating;
        total_value += player.player_value;
    }
    TeamComposition {
        team: team.clone(),
        total_players: roster.len(),
        positions,
        nationalities,
        average_rating: mean(rating_sum, roster.len()),
        total_value,
        injured_players: roster.iter().filter(|p| p.is_injured).cloned().collect(),
    }
}

pub fn compute_performance(team: &Team, players: &[Player]) -> ApiResult<PlayerPerformance> {
    let mut roster = team_players(team, players);
    if roster.is_empty() {
        return Err(ApiError::Validation(NO_PLAYERS.to_string()));
    }
    // Stable: equal ratings keep their list order.
    roster.sort_by(|a, b| b.rating.total_cmp(&a.rating));
    let total: f64 = roster.iter().map(|p| p.rating).sum();
    Ok(PlayerPerformance {
        team: team.clone(),
        highest_rated: roster.first().cloned(),
        lowest_rated: roster.last().cloned(),
        average_rating: mean(total, roster.len()),
        players: roster,
    })
}

pub fn compute_value(team: &Team, players: &[Player]) -> ApiResult<ValueReport> {
    let mut roster = team_players(team, players);
    if roster.is_empty() {
        return Err(ApiError::Validation(NO_PLAYERS.to_string()));
    }
    roster.sort_by(|a, b| b.player_value.total_cmp(&a.player_value));
    let total_value: f64 = roster.iter().map(|p| p.player_value).sum();
    Ok(ValueReport {
        team: team.clone(),
        most_valuable: roster.first().cloned(),
        least_valuable: roster.last().cloned(),
        average_value: mean(total_value, roster.len()),
        total_value,
        players: roster,
    })
}

pub fn compute_injury(team: &Team, players: &[Player]) -> InjuryReport {
    let roster = team_players(team, players);
    let injured_players: Vec<Player> = roster.iter().filter(|p| p.is_injured).cloned().collect();
    let injury_rate = if roster.is_empty() {
        0.0
    } else {
        injured_players.len() as f64 / roster.len() as f64 * 100.0
    };
    InjuryReport {
        team: team.clone(),
        total_players: roster.len(),
        injured_players,
        injury_rate,
    }
}

pub fn compute_report(kind: ReportKind, team: &Team, players: &[Player]) -> ApiResult<Report> {
    Ok(match kind {
        ReportKind::TeamComposition => Report::Composition(compute_composition(team, players)),
        ReportKind::PlayerPerformance => Report::Performance(compute_performance(team, players)?),
        ReportKind::ValueReport => Report::Value(compute_value(team, players)?),
        ReportKind::InjuryReport => Report::Injury(compute_injury(team, players)),
    })
}

pub fn fetch_report(
    api: &ApiClient,
    kind: ReportKind,
    team_id: u32,
    source: ReportSource,
) -> ApiResult<Report> {
    match source {
        ReportSource::Server => {
            let raw = api.report(kind, team_id)?;
            decode_report(kind, &raw)
        }
        ReportSource::Client => {
            let (teams, players) = api.list_teams_and_players()?;
            let team = find_team(&teams, team_id)?;
            compute_report(kind, team, &players)
        }
    }
}

pub fn report_failure_message(err: &ApiError) -> String {
    let detail = if err.is_network() {
        "Could not connect to the server. Please check if the backend service is running."
            .to_string()
    } else {
        err.to_string()
    };
    format!("Failed to generate report. {detail}")
}

// Backend report bodies. The Python backend answers snake_case, the C#
// one camelCase; players inside go through the normal record normalizer.

pub fn decode_report(kind: ReportKind, raw: &Value) -> ApiResult<Report> {
    if !raw.is_object() {
        return Err(ApiError::Decode(format!("{} body is not an object", kind.slug())));
    }
    let team = pick_value(raw, &["team", "Team"])
        .filter(|v| v.is_object())
        .map(normalize_team)
        .ok_or_else(|| ApiError::Decode(format!("{} body has no team", kind.slug())))?;

    Ok(match kind {
        ReportKind::TeamComposition => Report::Composition(TeamComposition {
            team,
            total_players: count_field(raw, &["total_players", "totalPlayers"]),
            positions: count_map(raw, &["positions", "Positions"]),
            nationalities: count_map(raw, &["nationalities", "Nationalities"]),
            average_rating: pick_f64(raw, &["average_rating", "averageRating"]).unwrap_or(0.0),
            total_value: pick_f64(raw, &["total_value", "totalValue"]).unwrap_or(0.0),
            injured_players: player_list(raw, &["injured_players", "injuredPlayers"]),
        }),
        ReportKind::PlayerPerformance => Report::Performance(PlayerPerformance {
            team,
            players: roster_list(raw)?,
            highest_rated: player_field(raw, &["highest_rated", "highestRated"]),
            lowest_rated: player_field(raw, &["lowest_rated", "lowestRated"]),
            average_rating: pick_f64(raw, &["average_rating", "averageRating"]).unwrap_or(0.0),
        }),
        ReportKind::ValueReport => Report::Value(ValueReport {
            team,
            players: roster_list(raw)?,
            total_value: pick_f64(raw, &["total_value", "totalValue"]).unwrap_or(0.0),
            most_valuable: player_field(raw, &["most_valuable", "mostValuable"]),
            least_valuable: player_field(raw, &["least_valuable", "leastValuable"]),
            average_value: pick_f64(raw, &["average_value", "averageValue"]).unwrap_or(0.0),
        }),
        ReportKind::InjuryReport => {
            let injured_players = player_list(raw, &["injured_players", "injuredPlayers"]);
            Report::Injury(InjuryReport {
                team,
                total_players: count_field(raw, &["total_players", "totalPlayers"]),
                injury_rate: pick_f64(raw, &["injury_rate", "injuryRate"]).unwrap_or(0.0),
                injured_players,
            })
        }
    })
}

fn count_field(raw: &Value, keys: &[&str]) -> usize {
    pick_u32(raw, keys).unwrap_or(0) as usize
}

fn count_map(raw: &Value, keys: &[&str]) -> BTreeMap<String, usize> {
    let Some(obj) = pick_value(raw, keys).and_then(Value::as_object) else {
        return BTreeMap::new();
    };
    obj.iter()
        .filter_map(|(name, count)| {
            let count = count.as_u64().or_else(|| count.as_f64().map(|c| c.max(0.0) as u64))?;
            Some((name.clone(), count as usize))
        })
        .collect()
}

fn player_list(raw: &Value, keys: &[&str]) -> Vec<Player> {
    pick_value(raw, keys)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter(|v| v.is_object())
                .map(normalize_player)
                .collect()
        })
        .unwrap_or_default()
}

fn roster_list(raw: &Value) -> ApiResult<Vec<Player>> {
    let roster = player_list(raw, &["players", "Players"]);
    if roster.is_empty() {
        return Err(ApiError::Validation(NO_PLAYERS.to_string()));
    }
    Ok(roster)
}

fn player_field(raw: &Value, keys: &[&str]) -> Option<Player> {
    pick_value(raw, keys)
        .filter(|v| v.is_object())
        .map(normalize_player)
}

// Rendering.

pub fn percentage(count: usize, total: usize) -> String {
    if total == 0 {
        "0%".to_string()
    } else {
        format!("{:.1}%", count as f64 / total as f64 * 100.0)
    }
}

/// `$1,234,567`, or `$1,234.50` when there is a fractional part.
pub fn format_money(value: f64) -> String {
    let sign = if value < 0.0 { "-" } else { "" };
    let abs = value.abs();
    let text = if abs.fract() == 0.0 {
        format!("{abs:.0}")
    } else {
        format!("{abs:.2}")
    };
    let (whole, frac) = match text.split_once('.') {
        Some((w, f)) => (w, Some(f)),
        None => (text.as_str(), None),
    };
    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    match frac {
        Some(f) => format!("{sign}${grouped}.{f}"),
        None => format!("{sign}${grouped}"),
    }
}

fn format_rating(rating: f64) -> String {
    if rating.fract() == 0.0 {
        format!("{rating:.0}")
    } else {
        format!("{rating:.1}")
    }
}

fn name_with(player: Option<&Player>, detail: impl Fn(&Player) -> String) -> String {
    match player {
        Some(p) => format!("{} ({})", p.display_name(), detail(p)),
        None => "None".to_string(),
    }
}

fn render_composition(r: &TeamComposition) -> RenderedReport {
    let mut positions = ReportTable::new("Position Distribution", &["Position", "Count", "Percentage"]);
    for (position, count) in &r.positions {
        positions.rows.push(vec![
            position.clone(),
            count.to_string(),
            percentage(*count, r.total_players),
        ]);
    }
    let mut nationalities =
        ReportTable::new("Nationality Distribution", &["Country", "Count", "Percentage"]);
    for (country, count) in &r.nationalities {
        nationalities.rows.push(vec![
            country.clone(),
            count.to_string(),
            percentage(*count, r.total_players),
        ]);
    }

    let mut summary = vec![
        format!("Total Players: {}", r.total_players),
        format!("Average Player Rating: {:.1}", r.average_rating),
        format!("Total Team Value: {}", format_money(r.total_value)),
        format!("Injured Players ({})", r.injured_players.len()),
    ];
    let mut tables = vec![positions, nationalities];
    if r.injured_players.is_empty() {
        summary.push("No injured players".to_string());
    } else {
        let mut injured = ReportTable::new("Injured Players", &["Name", "Position", "Value"]);
        for p in &r.injured_players {
            injured.rows.push(vec![
                p.display_name().to_string(),
                p.position.clone(),
                format_money(p.player_value),
            ]);
        }
        tables.push(injured);
    }

    RenderedReport {
        kind: ReportKind::TeamComposition,
        team_name: r.team.name.clone(),
        heading: format!("{} Team Composition Report", r.team.display_name()),
        summary,
        tables,
    }
}

fn render_performance(r: &PlayerPerformance) -> RenderedReport {
    let mut ratings = ReportTable::new("Player Ratings", &["Name", "Position", "Rating"]);
    for p in &r.players {
        ratings.rows.push(vec![
            p.display_name().to_string(),
            p.position.clone(),
            format_rating(p.rating),
        ]);
    }
    RenderedReport {
        kind: ReportKind::PlayerPerformance,
        team_name: r.team.name.clone(),
        heading: format!("{} Player Performance Report", r.team.display_name()),
        summary: vec![
            format!("Average Player Rating: {:.1}", r.average_rating),
            format!(
                "Highest Rated Player: {}",
                name_with(r.highest_rated.as_ref(), |p| format_rating(p.rating))
            ),
            format!(
                "Lowest Rated Player: {}",
                name_with(r.lowest_rated.as_ref(), |p| format_rating(p.rating))
            ),
        ],
        tables: vec![ratings],
    }
}

fn render_value(r: &ValueReport) -> RenderedReport {
    let mut values = ReportTable::new("Player Values", &["Name", "Position", "Value"]);
    for p in &r.players {
        values.rows.push(vec![
            p.display_name().to_string(),
            p.position.clone(),
            format_money(p.player_value),
        ]);
    }
    RenderedReport {
        kind: ReportKind::ValueReport,
        team_name: r.team.name.clone(),
        heading: format!("{} Value Report", r.team.display_name()),
        summary: vec![
            format!("Total Team Value: {}", format_money(r.total_value)),
            format!(
                "Average Player Value: {}",
                format_money((r.average_value * 100.0).round() / 100.0)
            ),
            format!(
                "Most Valuable Player: {}",
                name_with(r.most_valuable.as_ref(), |p| format_money(p.player_value))
            ),
            format!(
                "Least Valuable Player: {}",
                name_with(r.least_valuable.as_ref(), |p| format_money(p.player_value))
            ),
        ],
        tables: vec![values],
    }
}

fn render_injury(r: &InjuryReport) -> RenderedReport {
    let mut summary = vec![
        format!("Total Players: {}", r.total_players),
        format!("Injured Players: {}", r.injured_players.len()),
        format!("Injury Rate: {:.1}%", r.injury_rate),
    ];
    let mut tables = Vec::new();
    if r.injured_players.is_empty() {
        summary.push("No injured players".to_string());
    } else {
        let mut injured =
            ReportTable::new("Injured Players", &["Name", "Position", "Value", "Rating"]);
        for p in &r.injured_players {
            injured.rows.push(vec![
                p.display_name().to_string(),
                p.position.clone(),
                format_money(p.player_value),
                format_rating(p.rating),
            ]);
        }
        tables.push(injured);
    }
    RenderedReport {
        kind: ReportKind::InjuryReport,
        team_name: r.team.name.clone(),
        heading: format!("{} Injury Report", r.team.display_name()),
        summary,
        tables,
    }
}
