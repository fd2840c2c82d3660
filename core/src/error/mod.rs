mod cli_error;
mod install_error;
mod parse_error;
mod runner_error;

pub use cli_error::CliError;
pub use install_error::InstallError;
pub use parse_error::ParseError;
pub use runner_error::RunnerError;
