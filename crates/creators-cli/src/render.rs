//! Plain-text rendering of API records for the terminal.

use creators_core::models::{Breadcrumb, Entity, Identity, Page};
use creators_core::utils::{format_optional, format_timestamp, truncate_string};

/// Descriptions are cut to keep table rows on one line
const DESCRIPTION_WIDTH: usize = 40;

/// Spaces between table columns
const COLUMN_GAP: usize = 2;

/// A record that can be shown as a table row or a detail block.
pub trait Row {
    const HEADERS: &'static [&'static str];

    fn cells(&self) -> Vec<String>;

    fn details(&self) -> Vec<(&'static str, String)>;
}

/// Formatted stamp time, or the raw text when it does not parse
fn breadcrumb_time(crumb: &Breadcrumb) -> String {
    crumb
        .time()
        .map(|at| format_timestamp(&at))
        .unwrap_or_else(|| crumb.at_time.clone())
}

fn breadcrumb_detail(crumb: &Breadcrumb) -> String {
    format!(
        "{} by {} from {} ({})",
        breadcrumb_time(crumb),
        crumb.by_user,
        crumb.from_ip,
        crumb.correlation_id
    )
}

impl Row for Entity {
    const HEADERS: &'static [&'static str] = &["ID", "NAME", "STATUS", "DESCRIPTION", "SAVED"];

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.name.clone(),
            format_optional(self.status.map(|s| s.as_str()), "-"),
            truncate_string(self.description.as_deref().unwrap_or(""), DESCRIPTION_WIDTH),
            breadcrumb_time(&self.saved),
        ]
    }

    fn details(&self) -> Vec<(&'static str, String)> {
        vec![
            ("ID", self.id.clone()),
            ("Name", self.name.clone()),
            ("Description", format_optional(self.description.as_deref(), "-")),
            ("Status", format_optional(self.status.map(|s| s.as_str()), "-")),
            ("Created", breadcrumb_detail(&self.created)),
            ("Saved", breadcrumb_detail(&self.saved)),
        ]
    }
}

impl Row for Identity {
    const HEADERS: &'static [&'static str] = &["ID", "NAME", "STATUS", "DESCRIPTION"];

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.name.clone(),
            format_optional(self.status.as_deref(), "-"),
            truncate_string(self.description.as_deref().unwrap_or(""), DESCRIPTION_WIDTH),
        ]
    }

    fn details(&self) -> Vec<(&'static str, String)> {
        vec![
            ("ID", self.id.clone()),
            ("Name", self.name.clone()),
            ("Description", format_optional(self.description.as_deref(), "-")),
            ("Status", format_optional(self.status.as_deref(), "-")),
        ]
    }
}

/// Render rows as an aligned table with a header line
pub fn table<R: Row>(rows: &[R]) -> String {
    if rows.is_empty() {
        return "No results.".to_string();
    }

    let cells: Vec<Vec<String>> = rows.iter().map(R::cells).collect();
    let mut widths: Vec<usize> = R::HEADERS.iter().map(|h| h.len()).collect();
    for row in &cells {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let format_line = |values: Vec<&str>| -> String {
        let last = values.len().saturating_sub(1);
        values
            .iter()
            .enumerate()
            .map(|(i, value)| {
                if i == last {
                    value.to_string()
                } else {
                    let pad = widths[i] + COLUMN_GAP - value.chars().count();
                    format!("{}{}", value, " ".repeat(pad))
                }
            })
            .collect::<String>()
            .trim_end()
            .to_string()
    };

    let mut lines = vec![format_line(R::HEADERS.to_vec())];
    for row in &cells {
        lines.push(format_line(row.iter().map(String::as_str).collect()));
    }
    lines.join("\n")
}

/// Render one record as labelled lines
pub fn details<R: Row>(record: &R) -> String {
    let fields = record.details();
    let label_width = fields.iter().map(|(label, _)| label.len()).max().unwrap_or(0);
    fields
        .iter()
        .map(|(label, value)| format!("{:<width$}  {}", format!("{}:", label), value, width = label_width + 1))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Hint for fetching the next page, when there is one
pub fn page_footer<T>(page: &Page<T>) -> Option<String> {
    page.next_after()
        .map(|cursor| format!("More results available: --after {}", cursor))
}
