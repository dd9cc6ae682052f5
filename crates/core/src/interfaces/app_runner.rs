use super::AppState;

/// Drives the application's startup.
pub trait AppRunner {
    /// Start the application; any unhandled startup failure is returned.
    fn start(&mut self) -> anyhow::Result<()>;

    /// State of the application as of the last completed `start`.
    fn state(&self) -> &AppState;
}
