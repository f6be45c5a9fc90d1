// Command-line flags.

use clap::{ArgAction, Parser};
use log::LevelFilter;

/// Live camera feed where each row lags by its row index in frames.
#[derive(Debug, Parser, Clone)]
#[command(name = "row-shear", version)]
pub struct Config {
    /// Camera device index (0 = default camera)
    #[arg(long, default_value_t = 0)]
    pub camera: u32,

    /// Requested frame width in pixels
    #[arg(long, default_value_t = 640)]
    pub width: u32,

    /// Requested frame height in pixels
    #[arg(long, default_value_t = 480)]
    pub height: u32,

    /// Requested frame rate
    #[arg(long, default_value_t = 30)]
    pub fps: u32,

    /// Window title
    #[arg(long, default_value = "Row Shear")]
    pub title: String,

    /// Failed camera frames in a row before giving up
    #[arg(long, default_value_t = 30)]
    pub max_missed_frames: u32,

    /// Start with the delay effect off
    #[arg(long)]
    pub bypass: bool,

    /// Incremental verbosity (`-v`, `-vv`)
    #[arg(short, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Config {
    /// Log level picked by `-v`; `RUST_LOG` still wins when set.
    pub fn log_level(&self) -> LevelFilter {
        match self.verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }
}

/// Set up `env_logger` at the configured level.
pub fn init_logging(cfg: &Config) {
    env_logger::Builder::new()
        .filter_level(cfg.log_level())
        .parse_default_env()
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_sensor_stream() {
        let cfg = Config::try_parse_from(["row-shear"]).unwrap();
        assert_eq!((cfg.camera, cfg.width, cfg.height, cfg.fps), (0, 640, 480, 30));
        assert!(!cfg.bypass);
        assert_eq!(cfg.max_missed_frames, 30);
        assert_eq!(cfg.log_level(), LevelFilter::Info);
    }

    #[test]
    fn verbosity_counts_up() {
        let cfg = Config::try_parse_from(["row-shear", "-v"]).unwrap();
        assert_eq!(cfg.log_level(), LevelFilter::Debug);
        let cfg = Config::try_parse_from(["row-shear", "-vvv"]).unwrap();
        assert_eq!(cfg.log_level(), LevelFilter::Trace);
    }

    #[test]
    fn flags_override_defaults() {
        let cfg = Config::try_parse_from([
            "row-shear", "--camera", "2", "--width", "1280", "--height", "960", "--bypass",
        ])
        .unwrap();
        assert_eq!((cfg.camera, cfg.width, cfg.height), (2, 1280, 960));
        assert!(cfg.bypass);
    }

    #[test]
    fn rejects_non_numeric_size() {
        assert!(Config::try_parse_from(["row-shear", "--width", "wide"]).is_err());
    }
}
