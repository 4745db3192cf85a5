//! Control channel commands, one function per operation.

pub mod ai;
pub mod capture;
pub mod conversations;
pub mod files;
pub mod settings;
pub mod window;

pub use ai::*;
pub use capture::*;
pub use conversations::*;
pub use files::*;
pub use settings::*;
pub use window::*;
