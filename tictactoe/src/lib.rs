use crate::board::{Board, Coord, Move};
use crate::command::Command;
use crate::config::Config;
use crate::outcome::Outcome;
use crate::players::{Player, PlayerKind, Side};
use crate::strategy::StrategyCache;
use log::{debug, info, warn};
use std::io::{BufRead, Write};

pub mod board;
pub mod command;
pub mod config;
pub mod error;
pub mod outcome;
pub mod players;
pub mod strategy;

pub use error::{Error, Result};

/// One game: the board, both players, whose turn it is and every move
/// played since the starting position.
#[derive(Debug)]
pub struct Game {
    pub board: Board,
    players: [Player; 2],
    current_turn: Side,
    status: Outcome,
    history: Vec<Move>,
}

impl Game {
    pub fn new(x_player: Player, o_player: Player) -> Self {
        Self::from_position(x_player, o_player, Board::new(), Side::Cross)
    }

    fn from_position(x_player: Player, o_player: Player, board: Board, current_turn: Side) -> Self {
        assert_eq!(x_player.side(), Side::Cross, "first player must play X");
        assert_eq!(o_player.side(), Side::Nought, "second player must play O");
        let mut game = Game {
            board,
            players: [x_player, o_player],
            current_turn,
            status: Outcome::NotStarted,
            history: Vec::new(),
        };
        game.check_field();
        game
    }

    /// Fresh game from the empty board. Hard players share the cached table
    /// rooted at the empty board.
    pub fn start(x: PlayerKind, o: PlayerKind, config: &Config, cache: &StrategyCache) -> Self {
        let board = Board::new();
        let (x_player, o_player) = spawn_players(x, o, &board, Side::Cross, config, cache);
        Self::new(x_player, o_player)
    }

    /// Game continuing from a flattened board. Its history starts empty, so
    /// hard players get a table rooted at this position.
    pub fn load_from_save(
        x: PlayerKind,
        o: PlayerKind,
        encoding: &str,
        config: &Config,
        cache: &StrategyCache,
    ) -> Result<Self> {
        let (board, side) = Board::decode(encoding)?;
        let (x_player, o_player) = spawn_players(x, o, &board, side, config, cache);
        Ok(Self::from_position(x_player, o_player, board, side))
    }

    pub fn status(&self) -> Outcome {
        self.status
    }

    pub fn current_turn(&self) -> Side {
        self.current_turn
    }

    pub fn history(&self) -> &[Move] {
        &self.history
    }

    pub fn current_player(&self) -> &Player {
        &self.players[player_index(self.current_turn)]
    }

    pub fn cell_available(&self, coord: Coord) -> bool {
        self.board.cell_available(coord)
    }

    /// Places the current side's mark, records it and passes the turn.
    pub fn make_move(&mut self, coord: Coord) -> Result<()> {
        self.board.apply_move(coord, self.current_turn)?;
        self.history.push(coord.to_index());
        self.current_turn = self.current_turn.other();
        Ok(())
    }

    pub fn check_field(&mut self) -> Outcome {
        self.status = self.board.outcome();
        self.status
    }

    /// Asks the current player for one move, applies it and draws the board.
    pub fn step<R: BufRead, W: Write>(&mut self, input: &mut R, output: &mut W) -> Result<Outcome> {
        let side = self.current_turn;
        let coord = self.players[player_index(side)].choose_move(
            &self.board,
            &self.history,
            input,
            output,
        )?;
        if let Err(err) = self.make_move(coord) {
            panic!("{side:?} player chose {coord} after validation: {err}");
        }
        debug!("{:?} played {} (history {:?})", side, coord, self.history);
        let status = self.check_field();
        writeln!(output, "{}", self.board)?;
        Ok(status)
    }

    pub fn play<R: BufRead, W: Write>(&mut self, input: &mut R, output: &mut W) -> Result<Outcome> {
        info!(
            "game started from {} with {:?} to move",
            self.board.encode(),
            self.current_turn
        );
        writeln!(output, "{}", self.board)?;
        while self.status == Outcome::InProgress {
            self.step(input, output)?;
        }
        writeln!(output, "{}", self.status)?;
        info!("game finished: {} after {} moves", self.status, self.history.len());
        Ok(self.status)
    }
}

fn player_index(side: Side) -> usize {
    match side {
        Side::Cross => 0,
        Side::Nought => 1,
    }
}

fn spawn_players(
    x: PlayerKind,
    o: PlayerKind,
    root: &Board,
    to_move: Side,
    config: &Config,
    cache: &StrategyCache,
) -> (Player, Player) {
    let spawn = |side: Side, kind: PlayerKind| {
        Player::spawn(side, kind, config.rng_for(side), || {
            cache.get_or_build(root, to_move)
        })
    };
    (spawn(Side::Cross, x), spawn(Side::Nought, o))
}

/// Command loop: plays one game per `start`/`resume` until `exit` or the
/// input runs out.
pub fn run<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    config: &Config,
    cache: &StrategyCache,
) -> Result<()> {
    loop {
        write!(output, "Input command: ")?;
        output.flush()?;
        let Some(line) = players::read_line_lossy(input)? else {
            return Ok(());
        };
        let mut game = match line.parse::<Command>() {
            Ok(Command::Exit) => return Ok(()),
            Ok(Command::Start { x, o }) => Game::start(x, o, config, cache),
            Ok(Command::Resume { x, o, encoding }) => {
                match Game::load_from_save(x, o, &encoding, config, cache) {
                    Ok(game) => game,
                    Err(err) => {
                        writeln!(output, "{err}")?;
                        continue;
                    }
                }
            }
            Ok(Command::Dump) => {
                dump_strategy(output, config, cache)?;
                continue;
            }
            Err(err) => {
                writeln!(output, "{err}")?;
                continue;
            }
        };
        match game.play(input, output) {
            Ok(_) => {}
            Err(Error::InputClosed) => {
                warn!("input closed in the middle of a game");
                return Ok(());
            }
            Err(err) => return Err(err),
        }
    }
}

fn dump_strategy<W: Write>(output: &mut W, config: &Config, cache: &StrategyCache) -> Result<()> {
    let table = cache.get_or_build(&Board::new(), Side::Cross);
    writeln!(output, "{}", table.draw_points_grid())?;
    match strategy::strategy_to_disk(&config.archive_dir, &table) {
        Ok((json, pickle)) => writeln!(
            output,
            "Strategy saved to {} and {}",
            json.display(),
            pickle.display()
        )?,
        Err(err) => writeln!(output, "Failed to save strategy: {err:#}")?,
    }
    Ok(())
}
