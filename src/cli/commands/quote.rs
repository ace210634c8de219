//! `rjq quote` command - quotation building, pricing and reports
//!
//! The working quotation lives in a JSON file (`--file`, default
//! `quotation.json`). Every subcommand loads it, applies one operation and
//! writes it back; a missing file is an empty quotation.

use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::cli::helpers::{
    clean_name, confirm, emit, format_price, with_json_extension, write_output,
};
use crate::cli::{Context, OutputFormat};
use crate::core::{Catalog, FamilyKind, JointSpec, Ledger, LedgerError, LineItem, Selection};
use crate::report::{self, ReportOptions, HEADER};

const DEFAULT_QUOTATION_FILE: &str = "quotation.json";

#[derive(Subcommand, Debug)]
pub enum QuoteCommands {
    /// Price one joint without adding it
    Price(PriceArgs),

    /// Add a joint line to the quotation
    Add(AddArgs),

    /// List quotation lines and the total
    List(FileArgs),

    /// Remove a line by its number (as shown by `list`)
    Rm(RmArgs),

    /// Remove all lines
    Clear(ClearArgs),

    /// Save the quotation to another file
    Save(SaveArgs),

    /// Replace the quotation with a saved one
    Load(LoadArgs),

    /// Render a printable quotation
    Report(ReportArgs),
}

#[derive(clap::Args, Debug)]
pub struct FileArgs {
    /// Working quotation file
    #[arg(long, default_value = DEFAULT_QUOTATION_FILE)]
    pub file: PathBuf,
}

#[derive(clap::Args, Debug)]
pub struct JointArgs {
    /// Sphere type (category)
    #[arg(long)]
    pub sphere_type: String,

    /// Sphere model
    #[arg(long)]
    pub sphere_model: String,

    /// Flange type (category)
    #[arg(long)]
    pub flange_type: String,

    /// Flange model
    #[arg(long)]
    pub flange_model: String,

    /// Flanges per joint (a joint has one at each end)
    #[arg(long, default_value_t = 2, value_parser = clap::value_parser!(u32).range(1..))]
    pub flange_qty: u32,
}

#[derive(clap::Args, Debug)]
pub struct PriceArgs {
    #[command(flatten)]
    pub joint: JointArgs,
}

#[derive(clap::Args, Debug)]
pub struct AddArgs {
    #[command(flatten)]
    pub joint: JointArgs,

    /// Number of joints
    #[arg(long, short = 'n', default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    pub qty: u32,

    #[command(flatten)]
    pub file: FileArgs,
}

#[derive(clap::Args, Debug)]
pub struct RmArgs {
    /// Line number (1-based)
    pub number: usize,

    #[command(flatten)]
    pub file: FileArgs,
}

#[derive(clap::Args, Debug)]
pub struct ClearArgs {
    /// Skip the confirmation prompt
    #[arg(long, short = 'y')]
    pub yes: bool,

    #[command(flatten)]
    pub file: FileArgs,
}

#[derive(clap::Args, Debug)]
pub struct SaveArgs {
    /// Destination file (`.json` is appended if missing)
    pub dest: PathBuf,

    #[command(flatten)]
    pub file: FileArgs,
}

#[derive(clap::Args, Debug)]
pub struct LoadArgs {
    /// Saved quotation to load
    pub source: PathBuf,

    /// Skip the confirmation prompt
    #[arg(long, short = 'y')]
    pub yes: bool,

    #[command(flatten)]
    pub file: FileArgs,
}

#[derive(clap::Args, Debug)]
pub struct ReportArgs {
    /// Emit CSV rows instead of a Markdown document
    #[arg(long)]
    pub csv: bool,

    /// Write the report to a file instead of stdout
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,

    #[command(flatten)]
    pub file: FileArgs,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JointQuote {
    sphere: String,
    flange: String,
    sphere_price: f64,
    flange_price: f64,
    flange_quantity: u32,
    joint_price: f64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct QuotationView<'a> {
    quotation_items: &'a [LineItem],
    total_price: f64,
}

pub fn run(cmd: QuoteCommands, ctx: &Context) -> Result<()> {
    match cmd {
        QuoteCommands::Price(args) => run_price(args, ctx),
        QuoteCommands::Add(args) => run_add(args, ctx),
        QuoteCommands::List(args) => run_list(args, ctx),
        QuoteCommands::Rm(args) => run_rm(args, ctx),
        QuoteCommands::Clear(args) => run_clear(args, ctx),
        QuoteCommands::Save(args) => run_save(args, ctx),
        QuoteCommands::Load(args) => run_load(args, ctx),
        QuoteCommands::Report(args) => run_report(args, ctx),
    }
}

fn run_price(args: PriceArgs, ctx: &Context) -> Result<()> {
    let catalog = ctx.open_catalog();
    let spec = joint_spec(&args.joint, &catalog, ctx)?;
    let ledger = Ledger::new(&catalog);
    let joint_price = ledger.price_joint(&spec);

    let quote = JointQuote {
        sphere: spec.sphere.to_string(),
        flange: spec.flange.to_string(),
        sphere_price: catalog.sphere_price(&spec.sphere.category, &spec.sphere.model),
        flange_price: catalog.flange_price(&spec.flange.category, &spec.flange.model),
        flange_quantity: spec.flange_qty,
        joint_price,
    };

    match ctx.format_or(OutputFormat::Auto) {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&quote).into_diagnostic()?);
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yml::to_string(&quote).into_diagnostic()?);
        }
        _ if ctx.quiet() => println!("{}", format_price(joint_price)),
        _ => {
            println!(
                "{} {}  {}",
                style(format!("{:<8}", "Sphere")).bold(),
                quote.sphere,
                format_price(quote.sphere_price)
            );
            println!(
                "{} {}  {} x {}",
                style(format!("{:<8}", "Flange")).bold(),
                quote.flange,
                format_price(quote.flange_price),
                quote.flange_quantity
            );
            println!(
                "{} {}",
                style(format!("{:<8}", "Joint")).bold(),
                style(format_price(joint_price)).yellow()
            );
        }
    }
    Ok(())
}

fn run_add(args: AddArgs, ctx: &Context) -> Result<()> {
    let catalog = ctx.open_catalog();
    let spec = joint_spec(&args.joint, &catalog, ctx)?;
    let path = &args.file.file;
    let mut ledger = open_ledger(&catalog, path)?;

    let line_total = ledger.add_item(spec, args.qty);
    save_ledger(&ledger, path)?;

    if !ctx.quiet() {
        let item = ledger
            .items()
            .last()
            .ok_or_else(|| miette::miette!("quotation line was not recorded"))?;
        println!(
            "{} Added line {}: {} + {} x {} = {} x {} = {}",
            style("✓").green(),
            ledger.len(),
            style(item.sphere_label()).cyan(),
            style(item.flange_label()).cyan(),
            item.flange_quantity,
            format_price(item.joint_price),
            item.joint_quantity,
            style(format_price(line_total)).yellow()
        );
        println!("   Quotation total: {}", style(format_price(ledger.total())).yellow());
    }
    Ok(())
}

fn run_list(args: FileArgs, ctx: &Context) -> Result<()> {
    let catalog = Catalog::in_memory();
    let ledger = open_ledger(&catalog, &args.file)?;
    let format = ctx.format_or(OutputFormat::Auto);

    if ledger.is_empty() && format == OutputFormat::Auto {
        println!("The quotation is empty.");
        return Ok(());
    }

    let rows: Vec<Vec<String>> = ledger
        .items()
        .iter()
        .enumerate()
        .map(|(i, item)| {
            vec![
                (i + 1).to_string(),
                item.sphere_label(),
                item.flange_label(),
                item.flange_quantity.to_string(),
                item.joint_quantity.to_string(),
                format_price(item.joint_price),
                format_price(item.total_price),
            ]
        })
        .collect();
    let view = QuotationView {
        quotation_items: ledger.items(),
        total_price: ledger.total(),
    };
    emit(format, &view, &HEADER, &rows)?;

    if format == OutputFormat::Auto {
        println!();
        println!(
            "{} line(s), total {}",
            ledger.len(),
            style(format_price(ledger.total())).yellow().bold()
        );
    }
    Ok(())
}

fn run_rm(args: RmArgs, ctx: &Context) -> Result<()> {
    let catalog = Catalog::in_memory();
    let path = &args.file.file;
    let mut ledger = open_ledger(&catalog, path)?;

    let index = args
        .number
        .checked_sub(1)
        .ok_or_else(|| miette::miette!("line numbers start at 1"))?;
    let removed = ledger.delete_item(index).map_err(|e| match e {
        LedgerError::IndexOutOfRange { len, .. } => {
            miette::miette!("no line {} in the quotation ({} line(s))", args.number, len)
        }
    })?;
    save_ledger(&ledger, path)?;

    if !ctx.quiet() {
        println!(
            "{} Removed line {} ({} + {}); total {}",
            style("✓").green(),
            args.number,
            removed.sphere_label(),
            removed.flange_label(),
            style(format_price(ledger.total())).yellow()
        );
    }
    Ok(())
}

fn run_clear(args: ClearArgs, ctx: &Context) -> Result<()> {
    let catalog = Catalog::in_memory();
    let path = &args.file.file;
    let mut ledger = open_ledger(&catalog, path)?;

    if ledger.is_empty() {
        if !ctx.quiet() {
            println!("The quotation is already empty.");
        }
        return Ok(());
    }

    let prompt = format!("Remove all {} line(s) from the quotation?", ledger.len());
    if !confirm(&prompt, args.yes)? {
        println!("Cancelled.");
        return Ok(());
    }

    ledger.clear();
    save_ledger(&ledger, path)?;
    if !ctx.quiet() {
        println!("{} Cleared the quotation", style("✓").green());
    }
    Ok(())
}

fn run_save(args: SaveArgs, ctx: &Context) -> Result<()> {
    let catalog = Catalog::in_memory();
    let ledger = open_ledger(&catalog, &args.file.file)?;
    let dest = with_json_extension(&args.dest);
    save_ledger(&ledger, &dest)?;

    if !ctx.quiet() {
        println!(
            "{} Saved {} line(s) to {}",
            style("✓").green(),
            ledger.len(),
            style(dest.display()).cyan()
        );
    }
    Ok(())
}

fn run_load(args: LoadArgs, ctx: &Context) -> Result<()> {
    if !args.source.exists() {
        return Err(miette::miette!(
            "Quotation file not found: {}",
            args.source.display()
        ));
    }

    let catalog = Catalog::in_memory();
    let path = &args.file.file;
    let current = open_ledger(&catalog, path)?;
    if !current.is_empty() {
        let prompt = format!(
            "Replace the current quotation ({} line(s))?",
            current.len()
        );
        if !confirm(&prompt, args.yes)? {
            println!("Cancelled.");
            return Ok(());
        }
    }

    // Load into a fresh ledger so a bad file leaves the working one untouched.
    let mut loaded = Ledger::new(&catalog);
    loaded
        .load(&args.source)
        .map_err(|e| miette::miette!("{}", e))?;
    save_ledger(&loaded, path)?;

    if !ctx.quiet() {
        println!(
            "{} Loaded {} line(s) from {}; total {}",
            style("✓").green(),
            loaded.len(),
            style(args.source.display()).cyan(),
            style(format_price(loaded.total())).yellow()
        );
    }
    Ok(())
}

fn run_report(args: ReportArgs, ctx: &Context) -> Result<()> {
    let catalog = Catalog::in_memory();
    let ledger = open_ledger(&catalog, &args.file.file)?;
    if ledger.is_empty() {
        return Err(miette::miette!(
            "quotation is empty; add lines with 'rjq quote add' first"
        ));
    }

    let content = if args.csv {
        report::render_csv(ledger.items(), ledger.total()).map_err(|e| miette::miette!("{}", e))?
    } else {
        let options = ReportOptions {
            company: ctx.config.company.clone(),
            currency: ctx.config.currency().to_string(),
            validity_days: ctx.config.validity_days(),
            ..ReportOptions::default()
        };
        report::render_markdown(ledger.items(), ledger.total(), &options)
    };
    write_output(&content, args.output.as_deref())?;

    if let Some(path) = &args.output {
        if !ctx.quiet() {
            println!(
                "{} Wrote report to {}",
                style("✓").green(),
                style(path.display()).cyan()
            );
        }
    }
    Ok(())
}

/// Trim the selection, check it against the catalog and apply the flange bound
fn joint_spec(args: &JointArgs, catalog: &Catalog, ctx: &Context) -> Result<JointSpec> {
    let sphere = Selection::new(clean_name(&args.sphere_type), clean_name(&args.sphere_model));
    let flange = Selection::new(clean_name(&args.flange_type), clean_name(&args.flange_model));
    check_selection(catalog, FamilyKind::Sphere, &sphere)?;
    check_selection(catalog, FamilyKind::Flange, &flange)?;

    if let Some(limit) = ctx.config.flange_limit() {
        if args.flange_qty > limit {
            return Err(miette::miette!(
                "flange quantity {} exceeds the limit of {} per joint (config key 'max_flange_quantity')",
                args.flange_qty,
                limit
            ));
        }
    }

    Ok(JointSpec {
        sphere,
        flange,
        flange_qty: args.flange_qty,
    })
}

fn check_selection(catalog: &Catalog, kind: FamilyKind, selection: &Selection) -> Result<()> {
    let family = catalog.family(kind);
    if !family.contains_category(&selection.category) {
        return Err(miette::miette!(
            "{} type '{}' does not exist",
            kind,
            selection.category
        ));
    }
    if !family.contains_model(&selection.category, &selection.model) {
        return Err(miette::miette!(
            "{} model '{}' does not exist in type '{}'",
            kind,
            selection.model,
            selection.category
        ));
    }
    Ok(())
}

/// The working quotation at `path`, or an empty one if the file is absent
fn open_ledger<'c>(catalog: &'c Catalog, path: &Path) -> Result<Ledger<'c>> {
    let mut ledger = Ledger::new(catalog);
    if path.exists() {
        ledger.load(path).map_err(|e| miette::miette!("{}", e))?;
    }
    Ok(ledger)
}

fn save_ledger(ledger: &Ledger<'_>, path: &Path) -> Result<()> {
    ledger.save(path).map_err(|e| miette::miette!("{}", e))
}
