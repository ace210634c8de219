//! `rjq catalog` command - whole-catalog view, export and import

use clap::Subcommand;
use console::style;
use miette::Result;
use serde::Serialize;
use std::path::PathBuf;

use crate::cli::helpers::{confirm, emit, format_price, with_json_extension};
use crate::cli::{Context, OutputFormat};
use crate::core::FamilyKind;

#[derive(Subcommand, Debug)]
pub enum CatalogCommands {
    /// Show every model of both families with its price
    Show,

    /// Write the catalog to a JSON file
    Export(ExportArgs),

    /// Replace the catalog with the contents of a JSON file
    Import(ImportArgs),
}

#[derive(clap::Args, Debug)]
pub struct ExportArgs {
    /// Destination file (`.json` is appended if missing)
    pub path: PathBuf,
}

#[derive(clap::Args, Debug)]
pub struct ImportArgs {
    /// Catalog file to import
    pub path: PathBuf,

    /// Skip the confirmation prompt
    #[arg(long, short = 'y')]
    pub yes: bool,
}

#[derive(Serialize)]
struct CatalogRow<'a> {
    family: String,
    #[serde(rename = "type")]
    category: &'a str,
    model: &'a str,
    price: f64,
}

pub fn run(cmd: CatalogCommands, ctx: &Context) -> Result<()> {
    match cmd {
        CatalogCommands::Show => run_show(ctx),
        CatalogCommands::Export(args) => run_export(args, ctx),
        CatalogCommands::Import(args) => run_import(args, ctx),
    }
}

fn run_show(ctx: &Context) -> Result<()> {
    let catalog = ctx.open_catalog();
    let format = ctx.format_or(OutputFormat::Auto);

    let mut rows = Vec::new();
    for kind in FamilyKind::ALL {
        let family = catalog.family(kind);
        for category in family.categories() {
            for entry in family.entries(category) {
                rows.push(CatalogRow {
                    family: kind.to_string(),
                    category,
                    model: &entry.model,
                    price: entry.price,
                });
            }
        }
    }

    if rows.is_empty() && format == OutputFormat::Auto {
        println!("The catalog is empty.");
        return Ok(());
    }

    let table: Vec<Vec<String>> = rows
        .iter()
        .map(|r| {
            vec![
                r.family.clone(),
                r.category.to_string(),
                r.model.to_string(),
                format_price(r.price),
            ]
        })
        .collect();
    emit(format, &rows, &["FAMILY", "TYPE", "MODEL", "PRICE"], &table)?;

    if format == OutputFormat::Auto && !ctx.quiet() {
        println!();
        println!(
            "{} sphere type(s), {} flange type(s), {} model(s)",
            style(catalog.spheres().category_count()).cyan(),
            style(catalog.flanges().category_count()).cyan(),
            style(catalog.spheres().model_count() + catalog.flanges().model_count()).cyan()
        );
    }
    Ok(())
}

fn run_export(args: ExportArgs, ctx: &Context) -> Result<()> {
    let path = with_json_extension(&args.path);
    let catalog = ctx.open_catalog();
    catalog
        .export(&path)
        .map_err(|e| miette::miette!("{}", e))?;

    if !ctx.quiet() {
        println!(
            "{} Exported catalog to {}",
            style("✓").green(),
            style(path.display()).cyan()
        );
    }
    Ok(())
}

fn run_import(args: ImportArgs, ctx: &Context) -> Result<()> {
    if !args.path.exists() {
        return Err(miette::miette!(
            "Catalog file not found: {}",
            args.path.display()
        ));
    }

    let prompt = "Importing replaces all current catalog data. Continue?";
    if !confirm(prompt, args.yes)? {
        println!("Cancelled.");
        return Ok(());
    }

    let mut catalog = ctx.open_catalog();
    catalog
        .import(&args.path)
        .map_err(|e| miette::miette!("{}", e))?;
    let (spheres, flanges) = (
        catalog.spheres().category_count(),
        catalog.flanges().category_count(),
    );
    catalog.close().map_err(|e| miette::miette!("{}", e))?;

    if !ctx.quiet() {
        println!(
            "{} Imported {} sphere type(s) and {} flange type(s) from {}",
            style("✓").green(),
            spheres,
            flanges,
            style(args.path.display()).cyan()
        );
    }
    Ok(())
}
