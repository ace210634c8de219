//! Printable quotation report
//!
//! Renders a ledger's line items and total as a Markdown document (title,
//! date, item table with a totals row, fixed notes) or as CSV rows.

use chrono::{Local, NaiveDate};
use tabled::{builder::Builder, settings::Style};
use thiserror::Error;

use crate::core::config::{DEFAULT_CURRENCY, DEFAULT_VALIDITY_DAYS};
use crate::core::ledger::LineItem;

pub const REPORT_TITLE: &str = "Rubber Joint Quotation";

pub const HEADER: [&str; 7] = [
    "No.",
    "Sphere",
    "Flange",
    "Flange Qty",
    "Joint Qty",
    "Unit Price",
    "Subtotal",
];

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("report is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Presentation settings for a report
#[derive(Debug, Clone)]
pub struct ReportOptions {
    pub company: Option<String>,
    pub currency: String,
    pub validity_days: u32,
    pub date: NaiveDate,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            company: None,
            currency: DEFAULT_CURRENCY.to_string(),
            validity_days: DEFAULT_VALIDITY_DAYS,
            date: Local::now().date_naive(),
        }
    }
}

impl ReportOptions {
    /// The three disclaimer lines printed under the table
    pub fn notes(&self) -> [String; 3] {
        [
            format!("Prices are in {}.", self.currency),
            format!(
                "This quotation is valid for {} days.",
                self.validity_days
            ),
            "Please contact us with any questions.".to_string(),
        ]
    }
}

fn item_row(position: usize, item: &LineItem) -> [String; 7] {
    [
        (position + 1).to_string(),
        item.sphere_label(),
        item.flange_label(),
        item.flange_quantity.to_string(),
        item.joint_quantity.to_string(),
        format!("{:.2}", item.joint_price),
        format!("{:.2}", item.total_price),
    ]
}

fn total_row(total: f64) -> [String; 7] {
    [
        String::new(),
        String::new(),
        String::new(),
        String::new(),
        String::new(),
        "Total".to_string(),
        format!("{:.2}", total),
    ]
}

/// Markdown quotation document
pub fn render_markdown(items: &[LineItem], total: f64, options: &ReportOptions) -> String {
    let mut output = String::new();
    output.push_str(&format!("# {}\n\n", REPORT_TITLE));
    if let Some(company) = &options.company {
        output.push_str(&format!("**{}**\n\n", company));
    }
    output.push_str(&format!("Date: {}\n\n", options.date.format("%Y-%m-%d")));

    let mut builder = Builder::default();
    builder.push_record(HEADER);
    for (i, item) in items.iter().enumerate() {
        builder.push_record(item_row(i, item));
    }
    builder.push_record(total_row(total));
    output.push_str(&builder.build().with(Style::markdown()).to_string());

    output.push_str("\n\nNotes:\n\n");
    for (i, note) in options.notes().iter().enumerate() {
        output.push_str(&format!("{}. {}\n", i + 1, note));
    }
    output
}

/// The same table as CSV, header and totals row included
pub fn render_csv(items: &[LineItem], total: f64) -> Result<String, ReportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(HEADER)?;
    for (i, item) in items.iter().enumerate() {
        writer.write_record(item_row(i, item))?;
    }
    writer.write_record(total_row(total))?;
    let bytes = writer.into_inner().map_err(|e| e.into_error())?;
    Ok(String::from_utf8(bytes)?)
}
