//! Pipeline orchestration and configuration.
//!
//! # Example
//!
//! ```rust,no_run
//! use seidoc::core::config::PipelineConfig;
//! use seidoc::core::pipeline::Pipeline;
//!
//! # async fn example() -> seidoc::Result<()> {
//! let pipeline = Pipeline::new(PipelineConfig::discover()?.unwrap_or_default());
//! let record = pipeline.extract_file("SEI 253511234562023.pdf").await?;
//! println!("{}", record);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod pipeline;

pub use config::{OcrConfig, PipelineConfig};
pub use pipeline::Pipeline;
