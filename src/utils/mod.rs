pub mod debug;

pub use self::debug::log_buffer::{drain, drain_lines};
pub use self::debug::logger::init as init_logger;
