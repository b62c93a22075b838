pub mod colors {
    use console::Style;

    pub fn prefix() -> Style {
        Style::new().cyan().bold()
    }

    pub fn success() -> Style {
        Style::new().green().bold()
    }

    pub fn error() -> Style {
        Style::new().red().bold()
    }
}

pub mod templates {
    use indicatif::ProgressStyle;

    pub fn spinner() -> ProgressStyle {
        ProgressStyle::with_template("{prefix:>12.magenta.bold} {spinner} {wide_msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
    }
}

pub mod prefixes {
    pub const CHECKING: &str = "Checking";
    pub const VERIFYING: &str = "Verifying";
    pub const PASSED: &str = "Passed";
    pub const FAILED: &str = "Failed";
    pub const FINISHED: &str = "Finished";
}
