use crate::style;
use amalgam::error::{Error, Result};
use env_logger::{Builder, Env};
use log::{Level, LevelFilter};
use std::io::Write;

/// Installs the stderr logger. `RUST_LOG` applies unless `-v` was given,
/// which raises the level to debug (`-v`) or trace (`-vv`).
pub fn init(verbose: u8) -> Result<()> {
    let mut builder = Builder::from_env(Env::default().default_filter_or("info"));

    match verbose {
        0 => {}
        1 => {
            builder.filter_level(LevelFilter::Debug);
        }
        _ => {
            builder.filter_level(LevelFilter::Trace);
        }
    }

    builder
        .format(|buf, record| {
            let s = style::theme();
            let level = record.level();

            let (level_text, style_ref) = match level {
                Level::Error => ("ERROR ", &s.error),
                Level::Warn => ("WARN  ", &s.warning),
                Level::Info => ("", &s.info),
                Level::Debug => ("DEBUG ", &s.highlight),
                Level::Trace => ("TRACE ", &s.info),
            };

            write!(buf, "{}", style_ref.apply_to(level_text))?;

            if level != Level::Info {
                write!(buf, "[{}] ", record.target())?;
            }

            writeln!(buf, "{}", record.args())
        })
        .try_init()
        .map_err(|e| Error::Logger(format!("Failed to initialize logger: {}", e)))
}
