mod config;
mod main_lib;
mod menu;

use config::Config;
use main_lib::{build_ledger, init_tracing};
use menu::Menu;

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();
    let config = Config::from_env();
    let mut ledger = build_ledger(&config)?;

    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    Menu::new(&mut ledger, stdin.lock(), stdout.lock()).run()?;

    tracing::info!("Exiting with balance {}", ledger.balance());
    Ok(())
}
