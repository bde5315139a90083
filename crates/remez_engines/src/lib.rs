#![forbid(unsafe_code)]

pub mod daterange;
pub mod normalize;
pub mod numword;
pub mod orgunit;
pub mod reference;
pub mod route;
pub mod topic;
