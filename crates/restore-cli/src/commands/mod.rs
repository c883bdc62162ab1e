pub mod config;
pub mod deconvolve;
pub mod info;
pub mod run;
