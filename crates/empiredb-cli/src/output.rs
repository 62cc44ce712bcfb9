//! Styled terminal output.

use colored::Colorize;
use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table, presets::UTF8_FULL};
use empiredb_check::ModelIssue;

pub fn print_header(title: &str) {
    println!();
    println!("{}", title.bold().cyan());
    println!("{}", "─".repeat(title.chars().count().max(40)).bright_black());
}

pub fn print_success(msg: &str) {
    println!("  {} {}", "✓".green().bold(), msg);
}

pub fn print_warning(msg: &str) {
    println!("  {} {}", "⚠".yellow().bold(), msg);
}

fn header(titles: &[&str]) -> Vec<Cell> {
    titles
        .iter()
        .map(|t| Cell::new(t).add_attribute(Attribute::Bold).fg(Color::Cyan))
        .collect()
}

fn styled_table(titles: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header(titles));
    table
}

pub fn issues_table(issues: &[ModelIssue]) -> Table {
    let mut table = styled_table(&["Kind", "Object", "Difference"]);
    for issue in issues {
        table.add_row(vec![
            Cell::new(issue.kind()).fg(Color::Yellow),
            Cell::new(issue.object()).fg(Color::White),
            Cell::new(issue.detail()),
        ]);
    }
    table
}

/// One row per phrase; phrases the dialect lacks are shown greyed out.
pub fn phrases_table<'a>(rows: impl IntoIterator<Item = (&'a str, Option<&'a str>)>) -> Table {
    let mut table = styled_table(&["Phrase", "Template"]);
    for (name, template) in rows {
        let template = match template {
            Some(t) => Cell::new(t),
            None => Cell::new("(not supported)").fg(Color::DarkGrey),
        };
        table.add_row(vec![Cell::new(name).fg(Color::Yellow), template]);
    }
    table
}

pub fn features_table<'a>(rows: impl IntoIterator<Item = (&'a str, bool)>) -> Table {
    let mut table = styled_table(&["Feature", "Supported"]);
    for (name, supported) in rows {
        let cell = if supported {
            Cell::new("yes").fg(Color::Green)
        } else {
            Cell::new("no").fg(Color::Red)
        };
        table.add_row(vec![Cell::new(name), cell]);
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issues_table_lists_each_issue() {
        let issues = vec![ModelIssue::ColumnSizeMismatch {
            table: "EMPLOYEES".into(),
            column: "NAME".into(),
            expected: 40,
            found: 20,
        }];
        let table = issues_table(&issues);
        assert_eq!(table.row_iter().count(), 1);
        let rendered = table.to_string();
        assert!(rendered.contains("EMPLOYEES.NAME"));
        assert!(rendered.contains("column_size_mismatch"));
    }

    #[test]
    fn unsupported_phrases_are_marked() {
        let table = phrases_table([("SQL_FUNC_STRAGG", None), ("SQL_FUNC_UPPER", Some("upper(?)"))]);
        let rendered = table.to_string();
        assert!(rendered.contains("(not supported)"));
        assert!(rendered.contains("upper(?)"));
    }
}
