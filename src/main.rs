use clap::Parser;
use pendu::{
    init_logging, spawn_event_reader, App, Console, HttpApi, Interrupted, TerminalGuard,
};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Base URL of the Pendu server.
    #[arg(long, default_value = "http://127.0.0.1:8000")]
    server: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging();

    let guard = TerminalGuard::new()?;
    let events = spawn_event_reader();
    let mut app = App::new(Box::new(HttpApi::new(&cli.server)), Console::stdout(events));
    let result = app.run().await;
    drop(guard);

    match result {
        Ok(()) => Ok(()),
        Err(err) if err.is::<Interrupted>() => Ok(()),
        Err(err) => {
            eprintln!("Session ended with an error: {}", err);
            Err(err)
        }
    }
}
