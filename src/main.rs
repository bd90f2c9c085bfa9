// Host loop for the chipvm interpreter core.
//
// Each iteration: latch the held keys, run one cycle, present the screen if the cycle
// drew, then sleep until the next tick. Timers inside the core count cycles, so --hz is
// also the timer rate (60 matches the original hardware).

use anyhow::Context;
use chipvm::Emulator;
use clap::Parser;
use rand::{rngs::StdRng, SeedableRng};

use config::Config;
use timer::Cadence;
use window::Screen;

mod config;
mod timer;
mod window;

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let config = Config::parse();

    let rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let mut emu = Emulator::with_rng(rng).with_quirks(config.quirks());
    emu.load_program_file(&config.rom)
        .with_context(|| format!("loading {}", config.rom.display()))?;
    log::info!("running {} at {} Hz", config.rom.display(), config.hz);

    let mut screen = Screen::new(config.window_scale()).context("opening window")?;
    let mut cadence = Cadence::new(config.hz);

    while screen.is_running() {
        screen.read_keys(emu.keys_mut());

        if let Err(anomaly) = emu.step() {
            log::warn!("{anomaly}");
        }

        if emu.redraw() {
            screen
                .present(emu.frame_buffer())
                .context("presenting frame")?;
        } else {
            screen.pump();
        }

        cadence.wait();
    }

    Ok(())
}
