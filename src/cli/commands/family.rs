//! `rjq sphere` / `rjq flange` commands - catalog family maintenance
//!
//! Both families share one command tree; the top-level command picks the
//! [`FamilyKind`] it operates on.

use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};
use serde::Serialize;

use crate::cli::helpers::{clean_name, confirm, emit, format_price, parse_price};
use crate::cli::{Context, OutputFormat};
use crate::core::{Catalog, CatalogEntry, FamilyKind};

#[derive(Subcommand, Debug)]
pub enum FamilyCommands {
    /// Manage categories (types)
    #[command(subcommand)]
    Type(TypeCommands),

    /// Manage priced models within a category
    #[command(subcommand)]
    Model(ModelCommands),

    /// List categories, or the models of one category
    List(ListArgs),

    /// Look up the unit price of a model
    Price(PriceArgs),
}

#[derive(Subcommand, Debug)]
pub enum TypeCommands {
    /// Add an empty category
    Add(TypeAddArgs),

    /// Delete a category and all of its models
    Rm(TypeRmArgs),
}

#[derive(Subcommand, Debug)]
pub enum ModelCommands {
    /// Add a model to a category
    Add(ModelAddArgs),

    /// Delete a model from a category
    Rm(ModelRmArgs),
}

#[derive(clap::Args, Debug)]
pub struct TypeAddArgs {
    /// Category name
    pub name: String,
}

#[derive(clap::Args, Debug)]
pub struct TypeRmArgs {
    /// Category name
    pub name: String,

    /// Skip the confirmation prompt
    #[arg(long, short = 'y')]
    pub yes: bool,
}

#[derive(clap::Args, Debug)]
pub struct ModelAddArgs {
    /// Category the model belongs to
    pub category: String,

    /// Model name
    pub model: String,

    /// Unit price (empty means 0)
    #[arg(long, short = 'p', default_value = "0", value_parser = parse_price, allow_negative_numbers = true)]
    pub price: f64,
}

#[derive(clap::Args, Debug)]
pub struct ModelRmArgs {
    /// Category the model belongs to
    pub category: String,

    /// Model name
    pub model: String,

    /// Skip the confirmation prompt
    #[arg(long, short = 'y')]
    pub yes: bool,
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Category to list models for (omit to list categories)
    pub category: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct PriceArgs {
    /// Category name
    pub category: String,

    /// Model name
    pub model: String,
}

#[derive(Serialize)]
struct CategorySummary<'a> {
    name: &'a str,
    models: usize,
}

#[derive(Serialize)]
struct PriceQuote<'a> {
    category: &'a str,
    model: &'a str,
    price: f64,
}

/// Run a family subcommand against the catalog in the data directory
pub fn run(cmd: FamilyCommands, kind: FamilyKind, ctx: &Context) -> Result<()> {
    match cmd {
        FamilyCommands::Type(TypeCommands::Add(args)) => run_type_add(args, kind, ctx),
        FamilyCommands::Type(TypeCommands::Rm(args)) => run_type_rm(args, kind, ctx),
        FamilyCommands::Model(ModelCommands::Add(args)) => run_model_add(args, kind, ctx),
        FamilyCommands::Model(ModelCommands::Rm(args)) => run_model_rm(args, kind, ctx),
        FamilyCommands::List(args) => run_list(args, kind, ctx),
        FamilyCommands::Price(args) => run_price(args, kind, ctx),
    }
}

fn run_type_add(args: TypeAddArgs, kind: FamilyKind, ctx: &Context) -> Result<()> {
    let name = clean_name(&args.name);
    let mut catalog = ctx.open_catalog();
    catalog
        .add_category(kind, &name)
        .map_err(|e| miette::miette!("{}", e))?;
    finish(catalog)?;

    if !ctx.quiet() {
        println!(
            "{} Added {} type {}",
            style("✓").green(),
            kind,
            style(&name).cyan()
        );
    }
    Ok(())
}

fn run_type_rm(args: TypeRmArgs, kind: FamilyKind, ctx: &Context) -> Result<()> {
    let name = clean_name(&args.name);
    let mut catalog = ctx.open_catalog();

    let model_count = catalog.family(kind).entries(&name).len();
    if catalog.family(kind).contains_category(&name) {
        let prompt = format!(
            "Delete {} type '{}' and its {} model(s)?",
            kind, name, model_count
        );
        if !confirm(&prompt, args.yes)? {
            println!("Cancelled.");
            return Ok(());
        }
    }

    catalog
        .delete_category(kind, &name)
        .map_err(|e| miette::miette!("{}", e))?;
    finish(catalog)?;

    if !ctx.quiet() {
        println!(
            "{} Deleted {} type {} ({} model(s) removed)",
            style("✓").green(),
            kind,
            style(&name).cyan(),
            model_count
        );
    }
    Ok(())
}

fn run_model_add(args: ModelAddArgs, kind: FamilyKind, ctx: &Context) -> Result<()> {
    let category = clean_name(&args.category);
    let model = clean_name(&args.model);
    let mut catalog = ctx.open_catalog();
    catalog
        .add_model(kind, &category, &model, args.price)
        .map_err(|e| miette::miette!("{}", e))?;
    finish(catalog)?;

    if !ctx.quiet() {
        println!(
            "{} Added {} model {} to {} at {}",
            style("✓").green(),
            kind,
            style(&model).cyan(),
            style(&category).cyan(),
            style(format_price(args.price)).yellow()
        );
    }
    Ok(())
}

fn run_model_rm(args: ModelRmArgs, kind: FamilyKind, ctx: &Context) -> Result<()> {
    let category = clean_name(&args.category);
    let model = clean_name(&args.model);
    let mut catalog = ctx.open_catalog();

    if catalog.family(kind).contains_model(&category, &model) {
        let prompt = format!("Delete {} model '{}' from '{}'?", kind, model, category);
        if !confirm(&prompt, args.yes)? {
            println!("Cancelled.");
            return Ok(());
        }
    }

    catalog
        .delete_model(kind, &category, &model)
        .map_err(|e| miette::miette!("{}", e))?;
    finish(catalog)?;

    if !ctx.quiet() {
        println!(
            "{} Deleted {} model {} from {}",
            style("✓").green(),
            kind,
            style(&model).cyan(),
            style(&category).cyan()
        );
    }
    Ok(())
}

fn run_list(args: ListArgs, kind: FamilyKind, ctx: &Context) -> Result<()> {
    let catalog = ctx.open_catalog();
    let family = catalog.family(kind);
    let format = ctx.format_or(OutputFormat::Auto);

    match args.category {
        None => {
            let summary: Vec<CategorySummary> = family
                .categories()
                .map(|name| CategorySummary {
                    name,
                    models: family.entries(name).len(),
                })
                .collect();

            if summary.is_empty() && format == OutputFormat::Auto {
                println!("No {} types defined.", kind);
                return Ok(());
            }
            let rows: Vec<Vec<String>> = summary
                .iter()
                .map(|c| vec![c.name.to_string(), c.models.to_string()])
                .collect();
            emit(format, &summary, &["TYPE", "MODELS"], &rows)
        }
        Some(category) => {
            let category = clean_name(&category);
            if !family.contains_category(&category) {
                return Err(miette::miette!(
                    "{} type '{}' does not exist",
                    kind,
                    category
                ));
            }
            let entries: &[CatalogEntry] = family.entries(&category);
            if entries.is_empty() && format == OutputFormat::Auto {
                println!("No models in {} type '{}'.", kind, category);
                return Ok(());
            }
            let rows: Vec<Vec<String>> = entries
                .iter()
                .map(|e| vec![e.model.clone(), format_price(e.price)])
                .collect();
            emit(format, entries, &["MODEL", "PRICE"], &rows)
        }
    }
}

fn run_price(args: PriceArgs, kind: FamilyKind, ctx: &Context) -> Result<()> {
    let category = clean_name(&args.category);
    let model = clean_name(&args.model);
    let catalog = ctx.open_catalog();

    if !catalog.family(kind).contains_model(&category, &model) && !ctx.quiet() {
        eprintln!(
            "{} {} model '{}' in '{}' is not in the catalog; price defaults to 0",
            style("!").yellow(),
            kind,
            model,
            category
        );
    }
    let price = catalog.price(kind, &category, &model);

    match ctx.format_or(OutputFormat::Auto) {
        OutputFormat::Json => {
            let quote = PriceQuote {
                category: &category,
                model: &model,
                price,
            };
            println!("{}", serde_json::to_string_pretty(&quote).into_diagnostic()?);
        }
        OutputFormat::Yaml => {
            let quote = PriceQuote {
                category: &category,
                model: &model,
                price,
            };
            print!("{}", serde_yml::to_string(&quote).into_diagnostic()?);
        }
        _ => println!("{}", format_price(price)),
    }
    Ok(())
}

/// End-of-command save
fn finish(catalog: Catalog) -> Result<()> {
    catalog.close().map_err(|e| miette::miette!("{}", e))
}
