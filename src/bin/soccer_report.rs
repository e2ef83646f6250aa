use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};

use soccer_desk::api::ApiClient;
use soccer_desk::config::ConfigStore;
use soccer_desk::export::{write_csv, write_xlsx};
use soccer_desk::reports::{ReportKind, ReportSource, ReportTable, fetch_report};

const USAGE: &str = "usage: soccer_report <composition|performance|value|injury> <team_id> \
[--server|--client] [--csv DIR] [--xlsx DIR]";

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let kind = args
        .first()
        .and_then(|raw| parse_kind(raw))
        .ok_or_else(|| anyhow!(USAGE))?;
    let team_id = args
        .get(1)
        .and_then(|raw| raw.parse::<u32>().ok())
        .ok_or_else(|| anyhow!(USAGE))?;
    let source = parse_source_arg(&args).unwrap_or_else(|| kind.default_source());

    let config = ConfigStore::from_env().load().with_env_overrides();
    let api = ApiClient::new(&config).context("build api client")?;
    let report = fetch_report(&api, kind, team_id, source)
        .with_context(|| format!("{} for team {team_id}", kind.label()))?;
    let rendered = report.render();

    println!("{}", rendered.heading);
    println!("Source: {} ({})", source.label(), config.api_base_url);
    for line in &rendered.summary {
        println!("  {line}");
    }
    for table in &rendered.tables {
        println!();
        print_table(table);
    }

    let today = chrono::Local::now().date_naive();
    if let Some(dir) = parse_dir_arg(&args, "--csv") {
        let path = write_csv(&rendered, &dir, today)?;
        println!("CSV: {}", path.display());
    }
    if let Some(dir) = parse_dir_arg(&args, "--xlsx") {
        let path = write_xlsx(&rendered, &dir, today)?;
        println!("XLSX: {}", path.display());
    }

    Ok(())
}

fn parse_kind(raw: &str) -> Option<ReportKind> {
    let key = raw.trim().to_ascii_lowercase();
    if key.is_empty() {
        return None;
    }
    ReportKind::from_slug(&key).or_else(|| {
        ReportKind::ALL
            .into_iter()
            .find(|kind| kind.slug().split('-').any(|part| part == key))
    })
}

fn parse_source_arg(args: &[String]) -> Option<ReportSource> {
    args.iter().find_map(|arg| match arg.as_str() {
        "--server" => Some(ReportSource::Server),
        "--client" => Some(ReportSource::Client),
        _ => None,
    })
}

fn parse_dir_arg(args: &[String], flag: &str) -> Option<PathBuf> {
    for (idx, arg) in args.iter().enumerate() {
        if arg == flag {
            return args.get(idx + 1).map(PathBuf::from);
        }
        if let Some(rest) = arg.strip_prefix(flag)
            && let Some(value) = rest.strip_prefix('=')
        {
            return Some(PathBuf::from(value));
        }
    }
    None
}

fn print_table(table: &ReportTable) {
    println!("{}", table.title);
    let mut widths = table.headers.iter().map(|h| h.len()).collect::<Vec<_>>();
    for row in &table.rows {
        for (idx, cell) in row.iter().enumerate() {
            if let Some(width) = widths.get_mut(idx) {
                *width = (*width).max(cell.chars().count());
            }
        }
    }
    let line = |cells: &[String]| {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{cell:<width$}"))
            .collect::<Vec<_>>()
            .join("  ")
    };
    println!("  {}", line(&table.headers));
    for row in &table.rows {
        println!("  {}", line(row));
    }
}
