use clap::Parser;
use nova_drv::{init_logging, run, Cli};

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    if let Err(e) = run(&cli) {
        eprintln!("error: {}", e.report());
        std::process::exit(1);
    }
}
