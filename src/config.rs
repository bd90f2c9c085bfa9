use std::path::PathBuf;

use chipvm::Quirks;
use clap::Parser;
use minifb::Scale;

use crate::timer::DEFAULT_CYCLES_PER_SECOND;

#[derive(Parser, Debug)]
#[command(version, about = "CHIP-8 interpreter", long_about = None)]
pub struct Config {
    /// Path to the program to run
    pub rom: PathBuf,

    #[arg(long, default_value_t = DEFAULT_CYCLES_PER_SECOND, help = "Instructions per second, also the timer rate")]
    pub hz: u32,

    #[arg(short, long, default_value_t = 16, value_parser = parse_scale, help = "Window scale: 1, 2, 4, 8, 16 or 32")]
    pub scale: u8,

    #[arg(long, help = "Seed for the random number opcode")]
    pub seed: Option<u64>,

    #[arg(long, help = "Store the pressed key in VX when FX0A completes")]
    pub capture_key: bool,
}

fn parse_scale(s: &str) -> Result<u8, String> {
    match s.parse::<u8>() {
        Ok(n @ (1 | 2 | 4 | 8 | 16 | 32)) => Ok(n),
        _ => Err(format!("{s} is not one of 1, 2, 4, 8, 16, 32")),
    }
}

impl Config {
    pub fn window_scale(&self) -> Scale {
        match self.scale {
            1 => Scale::X1,
            2 => Scale::X2,
            4 => Scale::X4,
            8 => Scale::X8,
            32 => Scale::X32,
            _ => Scale::X16,
        }
    }

    pub fn quirks(&self) -> Quirks {
        Quirks {
            capture_key_on_wait: self.capture_key,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = Config::try_parse_from(["chipvm", "pong.ch8"]).unwrap();
        assert_eq!(config.rom, PathBuf::from("pong.ch8"));
        assert_eq!(config.hz, 60);
        assert!(matches!(config.window_scale(), Scale::X16));
        assert_eq!(config.seed, None);
        assert_eq!(config.quirks(), Quirks::default());
    }

    #[test]
    fn overrides() {
        let config = Config::try_parse_from([
            "chipvm",
            "--hz",
            "500",
            "-s",
            "8",
            "--seed",
            "42",
            "--capture-key",
            "game.ch8",
        ])
        .unwrap();
        assert_eq!(config.hz, 500);
        assert!(matches!(config.window_scale(), Scale::X8));
        assert_eq!(config.seed, Some(42));
        assert!(config.quirks().capture_key_on_wait);
    }

    #[test]
    fn rejects_odd_scale() {
        assert!(Config::try_parse_from(["chipvm", "-s", "3", "game.ch8"]).is_err());
        assert!(Config::try_parse_from(["chipvm"]).is_err());
    }
}
