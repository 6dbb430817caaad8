use std::process::ExitCode;

fn main() -> ExitCode {
    laconic_cli::run()
}
