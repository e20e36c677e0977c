pub mod error;
pub mod log;
pub mod path;
pub mod subprocess;

// Re-export core types at crate root for convenience
pub use bstr::{BStr, BString, ByteSlice};
pub use error::UtilError;
pub use log::LogSink;
pub use path::{file_url, WcPath};
pub use subprocess::{CommandOutput, Invocation, ProcessRunner, SystemRunner};

pub type Result<T> = std::result::Result<T, UtilError>;
