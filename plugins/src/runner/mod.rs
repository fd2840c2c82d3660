pub mod replay;
pub mod speedtest;

pub use replay::ReplayRunnerPlugin;
pub use speedtest::SpeedtestRunnerPlugin;
