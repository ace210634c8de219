use clap::Parser;
use miette::Result;
use rjq::cli::{commands, Cli, Commands, Context, GlobalOpts};
use rjq::core::FamilyKind;

fn main() -> Result<()> {
    // Terminate quietly on a closed pipe (`rjq catalog show | head`).
    #[cfg(unix)]
    {
        unsafe {
            libc::signal(libc::SIGPIPE, libc::SIG_DFL);
        }
    }
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .tab_width(4)
                .build(),
        )
    }))?;

    let cli = Cli::parse();
    let global = cli.global;

    match cli.command {
        // Completions touch neither the data directory nor the log files.
        Commands::Completions(args) => commands::completions::run(args),
        Commands::Sphere(cmd) => {
            session(global, |ctx| commands::family::run(cmd, FamilyKind::Sphere, ctx))
        }
        Commands::Flange(cmd) => {
            session(global, |ctx| commands::family::run(cmd, FamilyKind::Flange, ctx))
        }
        Commands::Catalog(cmd) => session(global, |ctx| commands::catalog::run(cmd, ctx)),
        Commands::Quote(cmd) => session(global, |ctx| commands::quote::run(cmd, ctx)),
        Commands::Config(cmd) => session(global, |ctx| commands::config::run(cmd, ctx)),
    }
}

/// Resolve the context, start file logging, then run one command
fn session(global: GlobalOpts, command: impl FnOnce(&Context) -> Result<()>) -> Result<()> {
    let ctx = Context::new(global)?;
    let logger = match rjq::logging::init_logging(
        ctx.config.log_level(),
        &ctx.data_dir.log_dir(),
        ctx.global.verbose,
    ) {
        Ok(handle) => Some(handle),
        Err(e) => {
            eprintln!("warning: file logging disabled: {}", e);
            None
        }
    };

    if let Some(problem) = &ctx.config_problem {
        if logger.is_some() {
            log::warn!(
                "event=config_load module=config status=error detail=\"using defaults\" error={}",
                problem
            );
        } else {
            eprintln!("warning: config file ignored, using defaults: {}", problem);
        }
    }

    command(&ctx)
}
