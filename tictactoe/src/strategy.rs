use crate::board::{Board, Cell, Coord, Move};
use crate::config::DRAW_POINTS;
use crate::outcome::Outcome;
use crate::players::Side;
use chrono::offset::Local;
use itertools::Itertools;
use log::info;
use ndarray::prelude::*;
use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::fs::File;
use std::io::{prelude::*, BufReader, BufWriter};
use std::marker::PhantomData;
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StrategyNode {
    /// Leaf score, or the sum of the next ply's points.
    pub points: i32,
    pub next: Option<StrategyTable>,
}

/// Every continuation from one position, keyed by move in row-major order.
///
/// Internal points are the plain sum of the children's points, not a
/// minimax value. The hard tier depends on exactly these numbers.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StrategyTable {
    #[serde(serialize_with = "serialize_moves")]
    #[serde(deserialize_with = "deserialize_moves")]
    moves: Vec<(Move, StrategyNode)>,
}

impl Deref for StrategyTable {
    type Target = [(Move, StrategyNode)];
    fn deref(&self) -> &Self::Target {
        &self.moves
    }
}

impl StrategyTable {
    /// Enumerates every game reachable from `board` with `side` to move.
    pub fn build(board: &Board, side: Side) -> Self {
        let started = Instant::now();
        let mut scratch = board.clone();
        let table = if board.outcome() == Outcome::InProgress {
            Self::generate(&mut scratch, side)
        } else {
            Self::default()
        };
        debug_assert_eq!(&scratch, board);
        info!(
            "built strategy table for {} ({:?} to move): {} nodes, total points {}, {:?}",
            board.encode(),
            side,
            table.node_count(),
            table.total_points(),
            started.elapsed()
        );
        table
    }

    fn generate(scratch: &mut Board, side: Side) -> Self {
        let mut moves = Vec::with_capacity(scratch.count_empty());
        for mv in scratch.empty_cells() {
            scratch.set_cell(mv, Cell::Mark(side));
            let node = match scratch.outcome() {
                outcome if outcome == side.wins() => StrategyNode {
                    points: side.points(),
                    next: None,
                },
                Outcome::Draw => StrategyNode {
                    points: DRAW_POINTS,
                    next: None,
                },
                Outcome::InProgress => {
                    let next = Self::generate(scratch, side.other());
                    StrategyNode {
                        points: next.total_points(),
                        next: Some(next),
                    }
                }
                other => unreachable!("placing {:?} at {:?} produced {}", side, mv, other),
            };
            scratch.set_cell(mv, Cell::Empty);
            moves.push((mv, node));
        }
        StrategyTable { moves }
    }

    pub fn get(&self, mv: &Move) -> Option<&StrategyNode> {
        self.moves
            .binary_search_by_key(mv, |(key, _)| *key)
            .ok()
            .map(|idx| &self.moves[idx].1)
    }

    pub fn total_points(&self) -> i32 {
        self.moves.iter().map(|(_, node)| node.points).sum()
    }

    pub fn node_count(&self) -> usize {
        self.moves
            .iter()
            .map(|(_, node)| 1 + node.next.as_ref().map_or(0, |next| next.node_count()))
            .sum()
    }

    /// Follows `history` down the tree. A history that leaves the tree means
    /// the caller's move bookkeeping is broken, so this panics.
    pub fn descend(&self, history: &[Move]) -> &StrategyTable {
        history.iter().enumerate().fold(self, |table, (ply, mv)| {
            let node = table
                .get(mv)
                .unwrap_or_else(|| panic!("move {mv:?} at ply {ply} is not in the strategy table"));
            node.next
                .as_ref()
                .unwrap_or_else(|| panic!("history continues past a finished game at ply {ply}"))
        })
    }

    /// Best continuation after `history`: highest points for X, lowest for
    /// O, earliest in row-major order on ties.
    pub fn optimal_move(&self, history: &[Move], side: Side) -> Coord {
        let (mv, _) = self
            .descend(history)
            .iter()
            .reduce(|best, entry| {
                if side.prefers(entry.1.points, best.1.points) {
                    entry
                } else {
                    best
                }
            })
            .unwrap_or_else(|| panic!("no moves left after history {history:?}"));
        Coord::from_index(*mv)
    }

    /// Top-level points laid out on the grid.
    pub fn points_grid(&self) -> Array2<Option<i32>> {
        let mut grid = Array::from_elem((3, 3), None);
        for ((i, j), node) in self.iter() {
            grid[[*i, *j]] = Some(node.points);
        }
        grid
    }

    pub fn draw_points_grid(&self) -> String {
        self.points_grid()
            .rows()
            .into_iter()
            .map(|row| {
                row.iter()
                    .map(|points| match points {
                        Some(points) => format!("{points:>7}"),
                        None => format!("{:>7}", "-"),
                    })
                    .join("")
            })
            .join("\n")
    }
}

/// Strategy tables shared between games, built on first request per root
/// position and never modified afterwards.
#[derive(Debug, Default)]
pub struct StrategyCache {
    tables: Mutex<HashMap<(String, Side), Arc<StrategyTable>>>,
}

impl StrategyCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_build(&self, board: &Board, side: Side) -> Arc<StrategyTable> {
        let mut tables = self.tables.lock().unwrap_or_else(PoisonError::into_inner);
        tables
            .entry((board.encode(), side))
            .or_insert_with(|| Arc::new(StrategyTable::build(board, side)))
            .clone()
    }

    pub fn len(&self) -> usize {
        self.tables.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn serialize_moves<S>(moves: &[(Move, StrategyNode)], serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let mut map = serializer.serialize_map(Some(moves.len()))?;
    for (k, v) in moves {
        let key_str = format!("({}, {})", k.0, k.1);
        map.serialize_entry(&key_str, v)?;
    }
    map.end()
}

fn deserialize_moves<'de, D>(deserializer: D) -> Result<Vec<(Move, StrategyNode)>, D::Error>
where
    D: Deserializer<'de>,
{
    struct MovesVisitor {
        marker: PhantomData<fn() -> Vec<(Move, StrategyNode)>>,
    }
    impl<'de> Visitor<'de> for MovesVisitor {
        type Value = Vec<(Move, StrategyNode)>;
        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a map from \"(i, j)\" moves to strategy nodes")
        }
        fn visit_map<M>(self, mut access: M) -> Result<Self::Value, M::Error>
        where
            M: MapAccess<'de>,
        {
            let mut moves = Vec::with_capacity(access.size_hint().unwrap_or(0));
            while let Some((key, value)) = access.next_entry::<String, StrategyNode>()? {
                let k: Move = key
                    .chars()
                    .filter_map(|r| r.to_digit(10))
                    .map(|d| d as usize)
                    .collect_tuple()
                    .filter(|&(i, j)| i < 3 && j < 3)
                    .ok_or_else(|| de::Error::custom(format!("invalid move key '{key}'")))?;
                moves.push((k, value));
            }
            moves.sort_by_key(|(k, _)| *k);
            Ok(moves)
        }
    }
    deserializer.deserialize_map(MovesVisitor {
        marker: PhantomData,
    })
}

/// Writes dated JSON and pickle copies of `table` into `dir`.
pub fn strategy_to_disk(
    dir: &Path,
    table: &StrategyTable,
) -> Result<(PathBuf, PathBuf), anyhow::Error> {
    std::fs::create_dir_all(dir)?;
    let today = Local::now().date_naive();
    let json_path = dir.join(format!("strategy-{today}.json"));
    let pickle_path = dir.join(format!("strategy-{today}.pickle"));

    let mut json_file = BufWriter::new(File::create(&json_path)?);
    serde_json::to_writer(&mut json_file, table)?;
    json_file.flush()?;

    let mut pickle_file = BufWriter::new(File::create(&pickle_path)?);
    serde_pickle::to_writer(&mut pickle_file, table, serde_pickle::SerOptions::new())?;
    pickle_file.flush()?;

    info!(
        "saved strategy table ({} nodes) to {} and {}",
        table.node_count(),
        json_path.display(),
        pickle_path.display()
    );
    Ok((json_path, pickle_path))
}

pub fn strategy_from_disk_json(file: &Path) -> Result<StrategyTable, anyhow::Error> {
    let reader = BufReader::new(File::open(file)?);
    let decoded: StrategyTable = serde_json::from_reader(reader)?;
    Ok(decoded)
}

pub fn strategy_from_disk_pickle(file: &Path) -> Result<StrategyTable, anyhow::Error> {
    let mut reader = BufReader::new(File::open(file)?);
    let mut buf: Vec<u8> = vec![];
    reader.read_to_end(&mut buf)?;
    let decoded: StrategyTable = serde_pickle::from_slice(&buf, serde_pickle::DeOptions::new())?;
    Ok(decoded)
}
