use clap::Parser;
use ecosort_cli::cli::SmokeCli;
use std::process::ExitCode;

fn main() -> ExitCode {
    ecosort_cli::install_hooks();

    let cli = SmokeCli::parse();
    ecosort_cli::logging::init(cli.log_level.clone().into());

    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(err) => {
            eprintln!("unable to start runtime: {err}");
            return ExitCode::FAILURE;
        },
    };

    match rt.block_on(cli.run()) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{:?}", miette::Report::new(e));
            ExitCode::FAILURE
        },
    }
}
