pub mod archive;
pub mod ookla;

pub use archive::ArchiveKind;
pub use ookla::OoklaInstaller;
