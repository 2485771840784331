mod commands;
mod terminal;

use commands::{CommandLine, Commands, animate, render, sweep};
use terminal::{logging, print};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let commands = CommandLine::parse_args();

    logging::init_logging(commands.verbose);

    match commands.command {
        Commands::Sweep(args) => {
            print::header("starting sweep");
            sweep::sweep(args).await
        }
        Commands::Render(args) => {
            print::header("starting imager");
            render::render(args)
        }
        Commands::Animate(args) => {
            print::header("starting animator");
            animate::animate(args)
        }
    }
}
