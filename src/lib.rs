/// High-level command line app
mod app;
/// Definition of command-line args
mod args;
/// Built-in calculators
pub mod catalog;
/// Classifier metrics used by the metrics calculator
pub mod metrics;
/// Interpreted command-line settings
mod settings;
/// Text UI
mod ui;

// exported for tests:
pub use app::{App, Page, PageState};
pub use args::Args;
pub use settings::{Edit, EditValue, Settings};

pub use eval;
pub use graph;
pub use syntax;

/// Run the command-line app.
pub fn run() -> Result<(), anyhow::Error> {
    use clap::Parser;
    let args = Args::parse();

    // INTERPRET SETTINGS ///////////////
    let settings: Settings = args.try_into()?;

    let log_level = match settings.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    simple_logging::log_to_stderr(log_level);

    // RUN THE THING /////////////////
    let app = App::new(settings);
    app.run()?;

    Ok(())
}
