//! Interactive meter loop.

use crate::control::{Control, ControlInput};
use crate::meter::{SharedMeter, Waiter};
use crate::render::Renderer;
use std::io;
use tracing::warn;
use std::time::Duration;

/// Redraw the meter once per `period` until the control input asks to quit
/// or the audio input goes away (`ready` closed).
///
/// Each iteration makes exactly one bounded wait on `control`; the reading is
/// taken fresh after the wait, so audio blocks between frames are skipped.
pub fn run<R, C>(
    renderer: &mut R,
    control: &mut C,
    shared: &SharedMeter,
    ready: &Waiter,
    period: Duration,
) -> io::Result<()>
where
    R: Renderer + ?Sized,
    C: ControlInput + ?Sized,
{
    renderer.begin()?;

    loop {
        match control.wait(period)? {
            Control::Quit => break,
            Control::Reset => {
                shared.request_reset();
                renderer.on_reset()?;
            }
            Control::Help => renderer.toggle_help(),
            Control::Idle => {}
        }

        if ready.is_closed() {
            warn!("audio input lost, leaving display");
            break;
        }

        renderer.draw(&shared.snapshot())?;
    }

    renderer.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meter::{signal, MeterSnapshot};
    use std::collections::VecDeque;

    struct Scripted(VecDeque<Control>);

    impl ControlInput for Scripted {
        fn wait(&mut self, _timeout: Duration) -> io::Result<Control> {
            Ok(self.0.pop_front().unwrap_or(Control::Quit))
        }
    }

    #[derive(Default)]
    struct Recorder {
        begun: bool,
        frames: Vec<MeterSnapshot>,
        resets: usize,
        help: bool,
        finished: bool,
    }

    impl Renderer for Recorder {
        fn begin(&mut self) -> io::Result<()> {
            self.begun = true;
            Ok(())
        }

        fn draw(&mut self, snap: &MeterSnapshot) -> io::Result<()> {
            self.frames.push(*snap);
            Ok(())
        }

        fn on_reset(&mut self) -> io::Result<()> {
            self.resets += 1;
            Ok(())
        }

        fn toggle_help(&mut self) {
            self.help = !self.help;
        }

        fn finish(&mut self) -> io::Result<()> {
            self.finished = true;
            Ok(())
        }
    }

    #[test]
    fn draws_once_per_wait_until_quit() {
        let shared = SharedMeter::new(MeterSnapshot::silent(48_000));
        let mut control = Scripted(VecDeque::from([Control::Idle, Control::Idle, Control::Idle]));
        let mut renderer = Recorder::default();
        let (_ready, waiter) = signal(4);

        run(&mut renderer, &mut control, &shared, &waiter, Duration::from_millis(1)).unwrap();

        assert!(renderer.begun);
        assert!(renderer.finished);
        assert_eq!(renderer.frames.len(), 3);
    }

    #[test]
    fn reset_is_requested_not_applied() {
        let shared = SharedMeter::new(MeterSnapshot {
            overs: 9,
            ..MeterSnapshot::silent(48_000)
        });
        let mut control = Scripted(VecDeque::from([Control::Reset, Control::Help]));
        let mut renderer = Recorder::default();
        let (_ready, waiter) = signal(4);

        run(&mut renderer, &mut control, &shared, &waiter, Duration::from_millis(1)).unwrap();

        assert_eq!(renderer.resets, 1);
        assert!(renderer.help);
        // The audio callback applies the reset; the consumer only flags it
        assert_eq!(renderer.frames[0].overs, 9);
        assert!(shared.take_reset());
    }

    #[test]
    fn lost_input_ends_the_loop() {
        let shared = SharedMeter::new(MeterSnapshot::silent(48_000));
        let mut control = Scripted(VecDeque::from(vec![Control::Idle; 1000]));
        let mut renderer = Recorder::default();
        let (ready, waiter) = signal(4);

        ready.post();
        ready.close();
        run(&mut renderer, &mut control, &shared, &waiter, Duration::from_millis(1)).unwrap();

        assert!(renderer.frames.is_empty());
        assert!(renderer.finished);
        assert_eq!(control.0.len(), 999);
    }
}
