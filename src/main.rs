use clap::Parser;
use miette::Result;
use partcost::cli::{Cli, Commands};

fn main() -> Result<()> {
    // Reset SIGPIPE so piping into `head` ends quietly instead of panicking
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
    partcost::cli::logging::init(&global);

    match cli.command {
        Commands::Init(args) => partcost::cli::commands::init::run(args),
        Commands::Quantities(args) => partcost::cli::commands::quantities::run(args, &global),
        Commands::Summary(args) => partcost::cli::commands::summary::run(args, &global),
        Commands::Cost(args) => partcost::cli::commands::cost::run(args, &global),
        Commands::Price(args) => partcost::cli::commands::price::run(args, &global),
        Commands::Rules => partcost::cli::commands::rules::run(&global),
        Commands::Config(cmd) => partcost::cli::commands::config::run(cmd, &global),
        Commands::Completions(args) => partcost::cli::commands::completions::run(args),
    }
}
