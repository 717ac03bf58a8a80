pub mod create;
pub mod daemon;
pub mod health;
pub mod init;
pub mod read;
pub mod version;

pub use create::Create;
pub use daemon::Daemon;
pub use health::Health;
pub use init::Init;
pub use read::Read;
pub use version::Version;
