use clap::Parser;

use sipswp::api::{Cli, Command, run_command, run_http_server};

#[tokio::main]
async fn main() {
    sipswp::init_tracing();
    let cli = Cli::parse();

    if let Command::Serve { port } = cli.command {
        if let Err(e) = run_http_server(port).await {
            eprintln!("Server error: {e}");
            std::process::exit(1);
        }
        return;
    }

    match run_command(cli.command) {
        Ok(output) => println!("{output}"),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}
