//! Everything that touches the terminal, the disk or the network for the binary.
mod app;
mod effects;
mod persistence;
mod picker;

pub(crate) use app::run;
