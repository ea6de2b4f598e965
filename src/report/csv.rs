//! The CSV report export.
//!
//! The layout is fixed: a title row, a period row, a blank row, a summary
//! section, a blank row and then one row per expense category. Amounts are
//! written with two decimals.

use std::io::Write;

use csv::WriterBuilder;

use crate::Error;

use super::{FinancialReport, money};

/// Write a report in the CSV export layout.
///
/// # Errors
///
/// Returns [Error::CsvExportError] if a row cannot be written and
/// [Error::IoError] if the underlying writer cannot be flushed.
pub fn write_csv<W: Write>(report: &FinancialReport, writer: W) -> Result<(), Error> {
    // Rows vary between one and two fields, which the writer rejects
    // without the flexible flag.
    let mut rows = WriterBuilder::new().flexible(true).from_writer(writer);

    write_row(&mut rows, &["Xpenzy Financial Report"])?;
    write_row(&mut rows, &["Period", &report.period])?;
    write_row(&mut rows, &[""])?;

    write_row(&mut rows, &["Summary"])?;
    write_row(&mut rows, &["Income", &money(report.summary.income)])?;
    write_row(&mut rows, &["Expenses", &money(report.summary.expenses)])?;
    write_row(&mut rows, &["Net Balance", &money(report.summary.net)])?;
    write_row(&mut rows, &["Savings", &money(report.summary.savings)])?;
    write_row(&mut rows, &["Investments", &money(report.summary.investments)])?;
    write_row(&mut rows, &[""])?;

    write_row(&mut rows, &["Expenses by Category"])?;

    for group in &report.expenses_by_category {
        write_row(&mut rows, &[&group.category, &money(group.amount)])?;
    }

    rows.flush()
        .map_err(|error| Error::IoError(error.to_string()))
}

/// Render a report as a CSV string.
///
/// # Errors
///
/// Returns the same errors as [write_csv].
pub fn csv_string(report: &FinancialReport) -> Result<String, Error> {
    let mut buffer = Vec::new();
    write_csv(report, &mut buffer)?;

    String::from_utf8(buffer).map_err(|error| Error::CsvExportError(error.to_string()))
}

fn write_row<W: Write>(rows: &mut csv::Writer<W>, row: &[&str]) -> Result<(), Error> {
    rows.write_record(row)
        .map_err(|error| Error::CsvExportError(error.to_string()))
}

#[cfg(test)]
mod csv_export_tests {
    use std::io::{Read, Seek};

    use time::macros::date;

    use crate::{
        DateRange,
        entry::{ExpenseEntry, IncomeEntry, PaymentMode},
        report::FinancialReport,
    };

    use super::{csv_string, write_csv};

    fn get_test_report() -> FinancialReport {
        let range = DateRange::new(date!(2024 - 12 - 01), date!(2024 - 12 - 31))
            .expect("could not create range");

        let income = [IncomeEntry::build(
            5000.0,
            date!(2024 - 12 - 15),
            "Salary".to_string(),
            PaymentMode::NetBanking,
        )
        .finalize(1)
        .expect("could not build entry")];

        let expenses = [
            ExpenseEntry::build(
                2000.0,
                date!(2024 - 12 - 05),
                "Rent".to_string(),
                PaymentMode::Upi,
            )
            .finalize(1)
            .expect("could not build entry"),
            ExpenseEntry::build(
                1000.0,
                date!(2024 - 12 - 10),
                "Food".to_string(),
                PaymentMode::Cash,
            )
            .finalize(2)
            .expect("could not build entry"),
        ];

        FinancialReport::build(&income, &expenses, &[], &[], &range)
    }

    #[test]
    fn the_layout_matches_the_export_format() {
        let report = get_test_report();

        let csv = csv_string(&report).expect("could not render CSV");

        let expected = "\
Xpenzy Financial Report
Period,2024-12-01 to 2024-12-31

Summary
Income,5000.00
Expenses,3000.00
Net Balance,2000.00
Savings,0.00
Investments,0.00

Expenses by Category
Rent,2000.00
Food,1000.00
";

        assert_eq!(csv, expected);
    }

    #[test]
    fn the_export_writes_to_a_file() {
        let report = get_test_report();

        let mut file = tempfile::tempfile().expect("could not create temporary file");
        write_csv(&report, &mut file).expect("could not write CSV");

        file.rewind().expect("could not rewind file");

        let mut contents = String::new();
        file.read_to_string(&mut contents)
            .expect("could not read file");

        assert!(contents.starts_with("Xpenzy Financial Report"));
        assert!(contents.contains("Expenses by Category"));
    }
}
