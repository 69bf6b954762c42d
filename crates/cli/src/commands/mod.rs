pub mod blocks;
pub mod functions;
pub mod import;
pub mod project;
pub mod runs;
pub mod util;

pub use blocks::*;
pub use functions::*;
pub use import::*;
pub use project::*;
pub use runs::*;
pub use util::*;
