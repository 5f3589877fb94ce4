pub mod io;
pub mod log;
