//! Shared helper functions for CLI commands

use console::{pad_str, style, Alignment, Term};
use dialoguer::{theme::ColorfulTheme, Confirm};
use miette::{IntoDiagnostic, Result};
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tabled::{builder::Builder, settings::Style};

use crate::cli::OutputFormat;

/// Escape a string for CSV output
///
/// Handles commas, quotes, and newlines according to RFC 4180.
pub fn escape_csv(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

/// Format a price with two decimals
pub fn format_price(price: f64) -> String {
    format!("{:.2}", price)
}

/// Trim a name typed on the command line
pub fn clean_name(raw: &str) -> String {
    raw.trim().to_string()
}

/// Parse a price argument. Empty input means 0.0; the value must be finite.
pub fn parse_price(raw: &str) -> std::result::Result<f64, String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(0.0);
    }
    match trimmed.parse::<f64>() {
        Ok(price) if price.is_finite() => Ok(price),
        _ => Err(format!("price must be a valid number, got '{}'", raw)),
    }
}

/// Append `.json` unless the path already ends with it
pub fn with_json_extension(path: &Path) -> PathBuf {
    if path.extension().is_some_and(|e| e == "json") {
        path.to_path_buf()
    } else {
        let mut raw = path.as_os_str().to_owned();
        raw.push(".json");
        PathBuf::from(raw)
    }
}

/// Ask a yes/no question, defaulting to no.
///
/// `assume_yes` skips the prompt. Without a terminal the question cannot be
/// asked, so the caller must pass `--yes`.
pub fn confirm(prompt: &str, assume_yes: bool) -> Result<bool> {
    if assume_yes {
        return Ok(true);
    }
    if !Term::stderr().is_term() {
        return Err(miette::miette!("{} Re-run with --yes to confirm.", prompt));
    }
    Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt(prompt)
        .default(false)
        .interact()
        .into_diagnostic()
}

/// Render rows as text in a tabular output format.
///
/// JSON and YAML are structured formats and handled by the callers; they
/// fall back to the aligned table here.
pub fn render_rows(format: OutputFormat, headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut out = String::new();
    match format {
        OutputFormat::Tsv => {
            out.push_str(&headers.join("\t"));
            out.push('\n');
            for row in rows {
                out.push_str(&row.join("\t"));
                out.push('\n');
            }
        }
        OutputFormat::Csv => {
            let escaped: Vec<String> = headers.iter().map(|h| escape_csv(h)).collect();
            out.push_str(&escaped.join(","));
            out.push('\n');
            for row in rows {
                let escaped: Vec<String> = row.iter().map(|c| escape_csv(c)).collect();
                out.push_str(&escaped.join(","));
                out.push('\n');
            }
        }
        OutputFormat::Md => {
            let mut builder = Builder::default();
            builder.push_record(headers.iter().map(|h| h.to_string()));
            for row in rows {
                builder.push_record(row.clone());
            }
            out.push_str(&builder.build().with(Style::markdown()).to_string());
            out.push('\n');
        }
        OutputFormat::Auto | OutputFormat::Json | OutputFormat::Yaml => {
            let widths: Vec<usize> = headers
                .iter()
                .enumerate()
                .map(|(i, h)| {
                    rows.iter()
                        .filter_map(|r| r.get(i))
                        .map(|c| console::measure_text_width(c))
                        .chain(std::iter::once(h.len()))
                        .max()
                        .unwrap_or(0)
                })
                .collect();

            let header_line: Vec<String> = headers
                .iter()
                .zip(&widths)
                .map(|(h, w)| style(pad_str(h, *w, Alignment::Left, None)).bold().to_string())
                .collect();
            out.push_str(header_line.join("  ").trim_end());
            out.push('\n');
            let rule_width = widths.iter().sum::<usize>() + 2 * widths.len().saturating_sub(1);
            out.push_str(&"-".repeat(rule_width));
            out.push('\n');
            for row in rows {
                let cells: Vec<String> = row
                    .iter()
                    .zip(&widths)
                    .map(|(c, w)| pad_str(c, *w, Alignment::Left, None).into_owned())
                    .collect();
                out.push_str(cells.join("  ").trim_end());
                out.push('\n');
            }
        }
    }
    out
}

/// Print a listing in the requested format
pub fn emit<T: Serialize + ?Sized>(
    format: OutputFormat,
    value: &T,
    headers: &[&str],
    rows: &[Vec<String>],
) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(value).into_diagnostic()?);
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yml::to_string(&value).into_diagnostic()?);
        }
        other => print!("{}", render_rows(other, headers, rows)),
    }
    Ok(())
}

/// Write content to a file, or to stdout when no path is given
pub fn write_output(content: &str, output_path: Option<&Path>) -> Result<()> {
    match output_path {
        Some(path) => {
            let file = File::create(path).into_diagnostic()?;
            let mut writer = BufWriter::new(file);
            writer.write_all(content.as_bytes()).into_diagnostic()?;
            writer.flush().into_diagnostic()?;
        }
        None => {
            print!("{}", content);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_csv() {
        assert_eq!(escape_csv("simple"), "simple");
        assert_eq!(escape_csv("with,comma"), "\"with,comma\"");
        assert_eq!(escape_csv("with\"quote"), "\"with\"\"quote\"");
        assert_eq!(escape_csv("with\nnewline"), "\"with\nnewline\"");
    }

    #[test]
    fn test_parse_price() {
        assert_eq!(parse_price("120.5"), Ok(120.5));
        assert_eq!(parse_price(" 7 "), Ok(7.0));
        assert_eq!(parse_price(""), Ok(0.0));
        assert_eq!(parse_price("-3"), Ok(-3.0));
        assert!(parse_price("abc").is_err());
        assert!(parse_price("NaN").is_err());
        assert!(parse_price("inf").is_err());
    }

    #[test]
    fn test_with_json_extension() {
        assert_eq!(with_json_extension(Path::new("q")), PathBuf::from("q.json"));
        assert_eq!(with_json_extension(Path::new("q.json")), PathBuf::from("q.json"));
        assert_eq!(
            with_json_extension(Path::new("out/q.txt")),
            PathBuf::from("out/q.txt.json")
        );
    }

    #[test]
    fn test_render_rows_tsv_and_csv() {
        let rows = vec![vec!["DN50".to_string(), "a,b".to_string()]];
        let tsv = render_rows(OutputFormat::Tsv, &["MODEL", "NOTE"], &rows);
        assert_eq!(tsv, "MODEL\tNOTE\nDN50\ta,b\n");

        let csv = render_rows(OutputFormat::Csv, &["MODEL", "NOTE"], &rows);
        assert_eq!(csv, "MODEL,NOTE\nDN50,\"a,b\"\n");
    }

    #[test]
    fn test_render_rows_auto_aligns_columns() {
        let rows = vec![
            vec!["S1".to_string(), "1.00".to_string()],
            vec!["LONG-MODEL".to_string(), "2.00".to_string()],
        ];
        let table = render_rows(OutputFormat::Auto, &["MODEL", "PRICE"], &rows);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[2], "S1          1.00");
        assert_eq!(lines[3], "LONG-MODEL  2.00");
    }

    #[test]
    fn test_confirm_assume_yes() {
        assert!(confirm("Really?", true).unwrap());
    }

    #[test]
    fn test_format_price() {
        assert_eq!(format_price(180.0), "180.00");
        assert_eq!(format_price(12.256), "12.26");
    }
}
