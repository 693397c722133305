//! Startup and teardown of a meter run.

use crate::audio::{self, AudioInput, InputSelection};
use crate::colors::Palette;
use crate::config::{MeterConfig, OutputMode};
use crate::control::{self, KeyControl, LineControl};
use crate::display;
use crate::dump;
use crate::error::Result;
use crate::meter::{signal, MeterProcessor, MeterSnapshot, MeterState, Notifier, SharedMeter};
use crate::render::{AnsiRenderer, ScreenRenderer};
use rtrb::{Producer, RingBuffer};
use std::io::{self, BufReader, IsTerminal};
use std::sync::Arc;
use tracing::{debug, info};

/// Readings buffered between the audio thread and the dump writer
const READING_QUEUE_LEN: usize = 4096;

/// Move a processor for `input` into its stream and start it.
fn start(
    config: &MeterConfig,
    input: InputSelection,
    state: MeterState,
    shared: &Arc<SharedMeter>,
    ready: Notifier,
    readings: Option<Producer<MeterSnapshot>>,
) -> Result<AudioInput> {
    let processor = MeterProcessor::new(
        state,
        input.channels(),
        Arc::clone(shared),
        ready.clone(),
        readings,
    );
    info!(
        client = %config.client_name,
        device = input.device_name(),
        sample_rate = shared.sample_rate(),
        mode = ?config.mode,
        "starting meter"
    );
    input.start(processor, ready)
}

/// Open the input, run the selected output mode until it ends, then close
/// everything down. Startup failures are returned before any output.
pub fn run(config: &MeterConfig) -> Result<()> {
    config.validate()?;

    let input = audio::select_input(config)?;
    let state = MeterState::new(input.sample_rate())?;
    let shared = Arc::new(SharedMeter::new(state.snapshot()));
    let (ready, waiter) = signal(READING_QUEUE_LEN);

    let palette = Palette::new(config.color, config.bold);
    let period = config.refresh_period();

    match config.mode {
        OutputMode::Dump => {
            let (producer, mut readings) = RingBuffer::new(READING_QUEUE_LEN);
            let _audio = start(config, input, state, &shared, ready, Some(producer))?;

            control::forward_resets(BufReader::new(io::stdin()), Arc::clone(&shared))?;
            let mut out = io::stdout().lock();
            match dump::run(&mut out, &waiter, &mut readings) {
                Ok(lines) => info!(lines, "dump finished"),
                Err(e) if e.kind() == io::ErrorKind::BrokenPipe => {
                    debug!("stdout closed, stopping dump");
                }
                Err(e) => return Err(e.into()),
            }
        }
        OutputMode::Ansi => {
            let _audio = start(config, input, state, &shared, ready, None)?;

            let stdin = io::stdin();
            let echoed = stdin.is_terminal();
            let mut renderer = AnsiRenderer::new(io::stdout(), palette, config.verbose, echoed);
            let mut control = LineControl::spawn(BufReader::new(stdin))?;
            display::run(&mut renderer, &mut control, &shared, &waiter, period)?;
        }
        OutputMode::Screen => {
            let _audio = start(config, input, state, &shared, ready, None)?;

            let mut renderer = ScreenRenderer::new(palette, config.verbose)?;
            display::run(&mut renderer, &mut KeyControl, &shared, &waiter, period)?;
        }
    }

    info!("meter stopped");
    Ok(())
}
