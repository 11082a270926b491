//! Logging setup for the CLI.

/// Shared logging args.
#[derive(clap::Args, Debug)]
pub struct LogArgs {
    /// Silence all log output.
    #[arg(long, short = 'q')]
    pub quiet: bool,

    /// Increase log verbosity (repeatable).
    #[arg(long, short = 'v', action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl LogArgs {
    /// Initialize stderr logging.
    ///
    /// ## Arguments
    /// * `base_verbosity` - the verbosity level applied before any `-v`
    ///   flags (2 = warn, 3 = info).
    pub fn setup_logging(
        &self,
        base_verbosity: usize,
    ) -> Result<(), Box<dyn std::error::Error>> {
        stderrlog::new()
            .quiet(self.quiet)
            .verbosity(base_verbosity + self.verbose as usize)
            .init()?;
        Ok(())
    }
}
