use tracing_subscriber::{fmt, EnvFilter};

/// `RUST_LOG` wins when set; otherwise `-q` gives errors only, the default is
/// warnings, and each `-v` raises the level by one.
pub fn initialize_logger(verbosity: u8, quiet: bool) {
    let level = if quiet {
        "error"
    } else {
        match verbosity {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    };
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("pathclip={}", level)));

    let subscriber = fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set global logger: {}", e);
    }
}
