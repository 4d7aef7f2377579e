use crate::cli::run;

mod acquire;
mod burn;
pub mod cli;
mod config;
pub mod domain;
pub mod http;
mod media;
mod pipeline;
mod resolve;
mod retry;
pub mod storage;

fn main() {
    std::process::exit(run());
}
