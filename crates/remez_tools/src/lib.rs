#![forbid(unsafe_code)]

pub mod route_cli;
