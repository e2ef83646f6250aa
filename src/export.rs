use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use rust_xlsxwriter::{Workbook, Worksheet};

use crate::error::{ApiError, ApiResult};
use crate::reports::{ReportKind, ReportTable, RenderedReport};

const NO_DATA: &str = "No data to export";
const SHEET_NAME_MAX: usize = 31;

pub fn csv_field(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

fn csv_line(cells: &[String]) -> String {
    let mut line = cells
        .iter()
        .map(|c| csv_field(c))
        .collect::<Vec<_>>()
        .join(",");
    line.push_str("\r\n");
    line
}

/// Title line, blank line, header row, then data rows of the first table.
pub fn report_to_csv(report: &RenderedReport) -> ApiResult<String> {
    let table = report
        .first_table()
        .ok_or_else(|| ApiError::Validation(NO_DATA.to_string()))?;
    let mut out = String::new();
    out.push_str(&csv_field(&format!(
        "{} - {}",
        report.team_name,
        report.kind.label()
    )));
    out.push_str("\r\n\r\n");
    out.push_str(&csv_line(&table.headers));
    for row in &table.rows {
        out.push_str(&csv_line(row));
    }
    Ok(out)
}

/// `{kind}_{team}_{date}` plus extension; path separators in the team name
/// become underscores.
pub fn export_file_name(kind: ReportKind, team_name: &str, date: NaiveDate, ext: &str) -> String {
    let team: String = team_name
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    format!("{}_{}_{}.{ext}", kind.slug(), team, date.format("%Y-%m-%d"))
}

pub fn write_csv(report: &RenderedReport, dir: &Path, date: NaiveDate) -> Result<PathBuf> {
    let body = report_to_csv(report)?;
    fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;
    let path = dir.join(export_file_name(report.kind, &report.team_name, date, "csv"));
    fs::write(&path, body).with_context(|| format!("write {}", path.display()))?;
    Ok(path)
}

pub fn write_xlsx(report: &RenderedReport, dir: &Path, date: NaiveDate) -> Result<PathBuf> {
    if report.tables.is_empty() {
        return Err(ApiError::Validation(NO_DATA.to_string()).into());
    }
    fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;
    let path = dir.join(export_file_name(report.kind, &report.team_name, date, "xlsx"));

    let mut summary_rows = vec![vec![report.heading.clone()]];
    summary_rows.extend(report.summary.iter().map(|line| vec![line.clone()]));

    let mut workbook = Workbook::new();
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Summary")?;
        write_rows(sheet, &summary_rows)?;
    }
    for table in &report.tables {
        let sheet = workbook.add_worksheet();
        sheet.set_name(sheet_name(&table.title))?;
        write_rows(sheet, &table_rows(table))?;
    }
    workbook
        .save(&path)
        .with_context(|| format!("failed writing workbook to {}", path.display()))?;
    Ok(path)
}

fn table_rows(table: &ReportTable) -> Vec<Vec<String>> {
    let mut rows = Vec::with_capacity(table.rows.len() + 1);
    rows.push(table.headers.clone());
    rows.extend(table.rows.iter().cloned());
    rows
}

fn sheet_name(title: &str) -> String {
    let cleaned: String = title
        .chars()
        .filter(|c| !matches!(c, '[' | ']' | ':' | '*' | '?' | '/' | '\\'))
        .take(SHEET_NAME_MAX)
        .collect();
    if cleaned.trim().is_empty() {
        "Table".to_string()
    } else {
        cleaned
    }
}

fn write_rows(worksheet: &mut Worksheet, rows: &[Vec<String>]) -> Result<()> {
    for (row_idx, row) in rows.iter().enumerate() {
        for (col_idx, value) in row.iter().enumerate() {
            worksheet
                .write_string(row_idx as u32, col_idx as u16, value)
                .with_context(|| format!("write cell ({row_idx},{col_idx})"))?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quotes_are_doubled() {
        assert_eq!(csv_field(r#"The "Reds""#), r#""The ""Reds""""#);
        assert_eq!(csv_field(""), "\"\"");
    }

    #[test]
    fn sheet_names_fit_excel_limits() {
        assert_eq!(sheet_name("Injured Players"), "Injured Players");
        assert_eq!(sheet_name("a/b"), "ab");
        assert_eq!(sheet_name(&"x".repeat(40)).len(), SHEET_NAME_MAX);
        assert_eq!(sheet_name("??"), "Table");
    }
}
