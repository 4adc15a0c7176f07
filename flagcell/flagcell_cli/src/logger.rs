use chrono::Local;
use fern::{Dispatch, InitError};
use log::LevelFilter;

/// Route log records to stderr so report output on stdout stays parseable.
pub fn setup(level: LevelFilter) -> Result<(), InitError> {
    Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "{time}[{level}]({target}) {message}",
                time = Local::now().format("[%H:%M:%S%.3f]"),
                level = record.level(),
                target = record.target(),
                message = message
            ))
        })
        .level(level)
        .chain(std::io::stderr())
        .apply()?;
    Ok(())
}
