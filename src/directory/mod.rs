pub mod entry;
pub mod error;
pub mod file;
pub mod ports;
pub mod types;

pub use entry::{DirectoryEntry, member_id_from_dn};
pub use error::{DirectoryError, DirectoryErrorKind};
pub use file::FileDirectory;
pub use ports::DirectoryPort;
pub use types::{Group, Principal};
