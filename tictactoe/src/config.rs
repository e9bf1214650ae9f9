use crate::players::Side;
use anyhow::Context;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

pub const WIN_POINTS: i32 = 5;
pub const DRAW_POINTS: i32 = -3;

/// Environment variable naming an optional JSON config file.
pub const CONFIG_ENV: &str = "TICTACTOE_CONFIG";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Seed for the computer players' random choices.
    pub seed: Option<u64>,
    /// Where `dump` writes strategy tables.
    pub archive_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            seed: None,
            archive_dir: PathBuf::from("./strategy_archive/"),
        }
    }
}

impl Config {
    pub fn from_file(path: &Path) -> Result<Self, anyhow::Error> {
        let file = File::open(path)
            .with_context(|| format!("opening config file {}", path.display()))?;
        let config = serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("parsing config file {}", path.display()))?;
        Ok(config)
    }

    /// Reads the file named by `TICTACTOE_CONFIG`, or the defaults.
    pub fn from_env() -> Result<Self, anyhow::Error> {
        match std::env::var_os(CONFIG_ENV) {
            Some(path) => Self::from_file(Path::new(&path)),
            None => Ok(Config::default()),
        }
    }

    pub fn rng_for(&self, side: Side) -> StdRng {
        match self.seed {
            Some(seed) => {
                let offset = match side {
                    Side::Cross => 0,
                    Side::Nought => 1,
                };
                StdRng::seed_from_u64(seed.wrapping_add(offset))
            }
            None => StdRng::from_entropy(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;
    use std::io::Write;

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "seed": 42 }}"#).unwrap();
        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.archive_dir, Config::default().archive_dir);
    }

    #[test]
    fn unreadable_config_is_an_error() {
        assert!(Config::from_file(Path::new("/nonexistent/tictactoe.json")).is_err());
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        assert!(Config::from_file(file.path()).is_err());
    }

    #[test]
    fn seeded_rngs_are_reproducible_per_side() {
        let config = Config {
            seed: Some(3),
            ..Config::default()
        };
        let a: u64 = config.rng_for(Side::Cross).gen();
        let b: u64 = config.rng_for(Side::Cross).gen();
        let c: u64 = config.rng_for(Side::Nought).gen();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
