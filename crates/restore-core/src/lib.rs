pub mod consts;
pub mod error;
pub mod float;
pub mod frame;
pub mod io;
pub mod pipeline;
pub mod psf;
pub mod restoration;
