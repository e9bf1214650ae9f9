use anyhow::Result;
use log::info;
use std::io::{stdin, stdout};
use tictactoe::board::Board;
use tictactoe::config::Config;
use tictactoe::players::Side;
use tictactoe::strategy::StrategyCache;

fn main() -> Result<()> {
    env_logger::init();
    let config = Config::from_env()?;
    info!("using {:?}", config);

    let cache = StrategyCache::new();
    // every fresh game's hard players read this table
    cache.get_or_build(&Board::new(), Side::Cross);

    let stdin = stdin();
    tictactoe::run(&mut stdin.lock(), &mut stdout(), &config, &cache)?;
    Ok(())
}
