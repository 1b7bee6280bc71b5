use log::{debug, LevelFilter};

/// Install `env_logger` with `default_level` unless `RUST_LOG` says otherwise.
///
/// Only the first call installs a logger; later calls return `false`.
pub fn init_logging(default_level: LevelFilter) -> bool {
    let installed = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(default_level.as_str()),
    )
    .format_timestamp_millis()
    .try_init()
    .is_ok();

    if installed {
        debug!("Logging initialized at default level {}", default_level);
    }
    installed
}
