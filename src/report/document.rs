//! The printable report document.
//!
//! [ReportDocument] is the content model a PDF backend can map one-to-one:
//! a title, the period and a list of titled tables. All table contents are
//! taken from an already-built [FinancialReport], so the printed numbers
//! equal the CSV and JSON numbers.

use super::{FinancialReport, TOP_EXPENSE_COUNT, money, top_expenses};

/// A table in the printable document.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportTable {
    /// The column headers. Empty for label/value tables.
    pub columns: Vec<String>,
    /// The table body, one cell vector per row.
    pub rows: Vec<Vec<String>>,
}

/// A titled section of the printable document.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportSection {
    /// The section heading.
    pub heading: String,
    /// The section's table.
    pub table: ReportTable,
}

/// The complete printable document.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportDocument {
    /// The document title.
    pub title: String,
    /// The report period as "start to end".
    pub period: String,
    /// The document sections, in print order.
    pub sections: Vec<ReportSection>,
}

impl ReportDocument {
    /// Lay out a report as a printable document.
    ///
    /// Sections: the summary, expenses by category, income by category and
    /// the five largest expenses of the period.
    pub fn from_report(report: &FinancialReport) -> Self {
        let summary = ReportSection {
            heading: "Summary".to_string(),
            table: ReportTable {
                columns: Vec::new(),
                rows: vec![
                    vec!["Income".to_string(), money(report.summary.income)],
                    vec!["Expenses".to_string(), money(report.summary.expenses)],
                    vec!["Net Balance".to_string(), money(report.summary.net)],
                    vec!["Savings".to_string(), money(report.summary.savings)],
                    vec![
                        "Investments".to_string(),
                        money(report.summary.investments),
                    ],
                    vec![
                        "Total Wealth".to_string(),
                        money(report.summary.total_wealth),
                    ],
                ],
            },
        };

        let expense_categories = ReportSection {
            heading: "Expenses by Category".to_string(),
            table: category_table(&report.expenses_by_category),
        };

        let income_categories = ReportSection {
            heading: "Income by Category".to_string(),
            table: category_table(&report.income_by_category),
        };

        let top = ReportSection {
            heading: "Top Expenses".to_string(),
            table: ReportTable {
                columns: vec![
                    "Date".to_string(),
                    "Category".to_string(),
                    "Amount".to_string(),
                ],
                rows: top_expenses(&report.expenses, TOP_EXPENSE_COUNT)
                    .iter()
                    .map(|expense| {
                        vec![
                            expense.date.to_string(),
                            expense.effective_category().to_string(),
                            money(expense.amount),
                        ]
                    })
                    .collect(),
            },
        };

        Self {
            title: "Xpenzy Financial Report".to_string(),
            period: report.period.clone(),
            sections: vec![summary, expense_categories, income_categories, top],
        }
    }

    /// Render the document as plain text with aligned table columns.
    pub fn render_text(&self) -> String {
        let mut text = String::new();

        text.push_str(&self.title);
        text.push('\n');
        text.push_str("Period: ");
        text.push_str(&self.period);
        text.push('\n');

        for section in &self.sections {
            text.push('\n');
            text.push_str(&section.heading);
            text.push('\n');
            text.push_str(&"-".repeat(section.heading.len()));
            text.push('\n');
            text.push_str(&render_table(&section.table));
        }

        text
    }
}

fn category_table(groups: &[super::CategorySum]) -> ReportTable {
    ReportTable {
        columns: vec![
            "Category".to_string(),
            "Amount".to_string(),
            "Share".to_string(),
        ],
        rows: groups
            .iter()
            .map(|group| {
                vec![
                    group.category.clone(),
                    money(group.amount),
                    format!("{:.1}%", group.share_percent),
                ]
            })
            .collect(),
    }
}

fn render_table(table: &ReportTable) -> String {
    let mut widths: Vec<usize> = table.columns.iter().map(String::len).collect();

    for row in &table.rows {
        for (index, cell) in row.iter().enumerate() {
            if index >= widths.len() {
                widths.push(cell.len());
            } else if cell.len() > widths[index] {
                widths[index] = cell.len();
            }
        }
    }

    let mut lines = Vec::new();

    if !table.columns.is_empty() {
        lines.push(render_row(&table.columns, &widths));
    }

    for row in &table.rows {
        lines.push(render_row(row, &widths));
    }

    if lines.is_empty() {
        return String::new();
    }

    lines.join("\n") + "\n"
}

fn render_row(cells: &[String], widths: &[usize]) -> String {
    let mut rendered = String::new();

    for (index, cell) in cells.iter().enumerate() {
        if index > 0 {
            rendered.push_str("  ");
        }

        // The last cell is left unpadded so lines carry no trailing spaces.
        if index + 1 == cells.len() {
            rendered.push_str(cell);
        } else {
            rendered.push_str(&format!("{cell:<width$}", width = widths[index]));
        }
    }

    rendered
}
