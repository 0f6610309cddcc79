//! Concrete output destinations

pub mod console;
pub mod counting;
pub mod file;
pub mod rotating_file;
pub mod stream;
pub mod string;

pub use console::{ConsoleSink, ConsoleTarget};
pub use counting::CountingSink;
pub use file::{FileMode, FileSink};
pub use rotating_file::{RotatingFileSink, RotationContext, RotationTrigger};
pub use stream::StreamSink;
pub use string::StringSink;
