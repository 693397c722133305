mod app;
mod audio;
mod colors;
mod config;
mod control;
mod display;
mod dump;
mod error;
mod help;
mod logging;
mod meter;
mod render;
mod settings;
mod terminal;

use clap::Parser;
use config::{MeterConfig, OutputMode, DEFAULT_CLIENT_NAME, DEFAULT_REFRESH_RATE};
use settings::Settings;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "k20")]
#[command(version)]
#[command(about = "Real-time K-20 loudness meter: RMS, peak, held peak and overs", long_about = None)]
struct Cli {
    /// Client name, also used for the debug log file
    #[arg(short, long)]
    name: Option<String>,

    /// Print one numeric line per audio block instead of a bar graph
    #[arg(short, long)]
    dump: bool,

    /// Display refreshes per second
    #[arg(short, long)]
    refresh_rate: Option<f32>,

    /// Show numeric readings next to the bar
    #[arg(short, long)]
    verbose: bool,

    /// Disable colors
    #[arg(short = 'C', long)]
    no_color: bool,

    /// Disable bold text
    #[arg(short = 'B', long)]
    no_bold: bool,

    /// Redraw the bar in place with ANSI escapes instead of taking over the screen
    #[arg(short, long)]
    ansi: bool,

    /// Meter the system output (PulseAudio/PipeWire monitor source)
    #[arg(long)]
    monitor: bool,

    /// List input devices and exit
    #[arg(long)]
    list: bool,

    /// Write a debug log to /tmp/<name>.log
    #[arg(long)]
    debug: bool,

    /// Input device(s) to meter
    #[arg(value_name = "SOURCE")]
    sources: Vec<String>,
}

impl Cli {
    /// Merge flags over the settings file
    fn into_config(self, settings: Settings) -> MeterConfig {
        let meter = settings.meter;

        let mode = if self.dump {
            OutputMode::Dump
        } else if self.ansi {
            OutputMode::Ansi
        } else {
            OutputMode::Screen
        };

        MeterConfig {
            client_name: self
                .name
                .or(meter.name)
                .unwrap_or_else(|| DEFAULT_CLIENT_NAME.to_string()),
            mode,
            refresh_rate: self
                .refresh_rate
                .or(meter.refresh_rate)
                .unwrap_or(DEFAULT_REFRESH_RATE),
            verbose: self.verbose || meter.verbose.unwrap_or(false),
            color: !self.no_color && meter.color.unwrap_or(true),
            bold: !self.no_bold && meter.bold.unwrap_or(true),
            sources: self.sources,
            monitor: self.monitor,
            debug: self.debug,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let list = cli.list;
    let config = cli.into_config(Settings::load());

    match logging::init(config.debug, &config.client_name) {
        Ok(Some(path)) => tracing::info!(path = %path.display(), "debug logging enabled"),
        Ok(None) => {}
        Err(e) => eprintln!("k20: warning: could not open debug log: {e}"),
    }

    let result = if list {
        audio::list_devices().map(|names| {
            for name in names {
                println!("{name}");
            }
        })
    } else {
        app::run(&config)
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "startup failed");
            eprintln!("k20: {e}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use settings::MeterSettings;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("k20").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn defaults_to_full_screen() {
        let config = parse(&[]).into_config(Settings::default());
        assert_eq!(config.mode, OutputMode::Screen);
        assert_eq!(config.client_name, DEFAULT_CLIENT_NAME);
        assert_eq!(config.refresh_rate, DEFAULT_REFRESH_RATE);
        assert!(config.color && config.bold);
        assert!(config.sources.is_empty());
    }

    #[test]
    fn dump_wins_over_ansi() {
        let config = parse(&["-d", "-a"]).into_config(Settings::default());
        assert_eq!(config.mode, OutputMode::Dump);
        let config = parse(&["--ansi"]).into_config(Settings::default());
        assert_eq!(config.mode, OutputMode::Ansi);
    }

    #[test]
    fn flags_override_settings() {
        let settings = Settings {
            meter: MeterSettings {
                name: Some("mixbus".to_string()),
                refresh_rate: Some(60.0),
                color: Some(true),
                bold: Some(false),
                verbose: Some(true),
            },
        };
        let config = parse(&["-n", "desk", "-r", "10", "-C", "in_1"]).into_config(settings);
        assert_eq!(config.client_name, "desk");
        assert_eq!(config.refresh_rate, 10.0);
        assert!(!config.color);
        assert!(!config.bold);
        assert!(config.verbose);
        assert_eq!(config.sources, vec!["in_1".to_string()]);
    }

    #[test]
    fn rejects_unknown_flags() {
        assert!(Cli::try_parse_from(["k20", "--bogus"]).is_err());
        assert!(Cli::try_parse_from(["k20", "-r", "fast"]).is_err());
    }
}
