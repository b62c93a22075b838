pub use insta::{assert_snapshot, assert_yaml_snapshot, with_settings};
use tracing::Level;

pub mod backend;

pub use backend::MockBackend;

#[macro_export]
macro_rules! insta_test {
    ($f: expr) => {
        #[cfg(not(target_os = "windows"))]
        $crate::with_settings!({filters => vec![
            (r"\d+ ms", "[elapsed]"),
        ]}, {
            ($f)()
        })
    };
}

pub fn logging() {
    use std::sync::Once;

    static ONCE: Once = Once::new();

    ONCE.call_once(|| {
        tracing_subscriber::fmt()
            .with_max_level(Level::TRACE)
            .with_test_writer()
            .init();
    });
}

/// A base URL nothing listens on.
pub const UNREACHABLE_URL: &str = "http://127.0.0.1:1";
