/// Parsed command-line arguments.
#[derive(Debug, Default, PartialEq)]
pub struct CliArgs {
    /// Path to configuration file, if provided via `--config-path` or `-c`.
    pub config_path: Option<String>,
    /// Whether help was requested.
    pub help_requested: bool,
}

impl CliArgs {
    /// Parse command-line arguments.
    ///
    /// Supported flags:
    /// - `--config-path <path>`, `--config-path=<path>` or `-c <path>`
    /// - `--help` or `-h`: print usage and exit
    pub fn parse() -> Self {
        Self::from_args(std::env::args().skip(1))
    }

    fn from_args(args: impl IntoIterator<Item = String>) -> Self {
        let mut parsed = Self::default();
        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--help" | "-h" => parsed.help_requested = true,
                "--config-path" | "-c" => parsed.config_path = args.next(),
                other => {
                    if let Some(path) = other.strip_prefix("--config-path=") {
                        parsed.config_path = Some(path.to_string());
                    }
                }
            }
        }
        parsed
    }

    /// Print usage information to stderr.
    pub fn print_help() {
        eprintln!(
            "Usage: chamba-backend [--config-path PATH] [--help]\n\n\
             --config-path, -c    Path to configuration file (overrides CHAMBA_CONFIG_PATH env var)"
        );
    }
}
