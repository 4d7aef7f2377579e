pub mod client;

pub use client::{HttpFetcher, PageFetcher};
