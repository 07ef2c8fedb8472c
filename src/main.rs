use clap::Parser;
use env_logger::Env;
use miette::Result;

use cabest::cli::{Cli, Commands};

fn main() -> Result<()> {
    // Reset SIGPIPE to default behavior (terminate silently) for proper Unix piping.
    // Without this, piping to `head`, `grep -q`, etc. causes a panic on broken pipe.
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

    // Default level depends on --verbose / --quiet (overridden by RUST_LOG)
    let env = if global.verbose {
        Env::default().default_filter_or("debug")
    } else if global.quiet {
        Env::default().default_filter_or("error")
    } else {
        Env::default().default_filter_or("warn")
    };
    env_logger::Builder::from_env(env)
        .format_timestamp(None)
        .init();

    match cli.command {
        Commands::Init(args) => cabest::cli::commands::init::run(args, &global),
        Commands::Eval(args) => cabest::cli::commands::eval::run(args, &global),
        Commands::Resolve(args) => cabest::cli::commands::resolve::run(args, &global),
        Commands::Price(args) => cabest::cli::commands::price::run(args, &global),
        Commands::Weigh(args) => cabest::cli::commands::weigh::run(args, &global),
        Commands::Nest(args) => cabest::cli::commands::nest::run(args, &global),
        Commands::Export(args) => cabest::cli::commands::export::run(args, &global),
        Commands::Completions(args) => cabest::cli::commands::completions::run(args),
    }
}
