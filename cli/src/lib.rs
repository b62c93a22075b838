pub mod cli;
pub mod logging;
pub mod observer;

use human_panic::{Metadata, setup_panic};
use miette::GraphicalReportHandler;

/// Fancy diagnostics for fatal errors and a crash report for panics.
pub fn install_hooks() {
    miette::set_hook(Box::new(|_| {
        Box::new(
            GraphicalReportHandler::new()
                .with_theme(miette::GraphicalTheme::unicode())
                .with_context_lines(5),
        )
    }))
    .ok(); // Ignore if already set

    setup_panic!(
        Metadata::new(env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
            .homepage(env!("CARGO_PKG_HOMEPAGE"))
            .support("Please open an issue on github. Attach the outputs of the above referenced report file.")
            .authors(env!("CARGO_PKG_AUTHORS"))
    );
}
