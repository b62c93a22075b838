use tracing::level_filters::LevelFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Log lines go through the indicatif writer so they never tear a spinner.
pub fn init(level: tracing::Level) {
    let indicatif_layer = tracing_indicatif::IndicatifLayer::new();

    let layer = tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(indicatif_layer.get_stderr_writer())
                .with_file(false)
                .with_line_number(false),
        )
        .with(indicatif_layer)
        .with(LevelFilter::from_level(level));

    if let Err(err) = layer.try_init() {
        eprintln!("unable to initialize logging: {err}");
    }
}
