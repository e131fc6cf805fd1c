//! # housekeeping-sink
//!
//! Output sinks for verdict records.
//!
//! ## Overview
//!
//! Both sinks implement [`VerdictSink`](housekeeping_core::traits::VerdictSink).
//! A sink receives each record once; it never buffers across calls or retries
//! a failed write.
//!
//! - [`JsonLinesSink`] writes one compact JSON object per line to any
//!   `io::Write` (stdout in production).
//! - [`InMemorySink`] collects records for tests and embedding.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use housekeeping_sink::JsonLinesSink;
//! use housekeeping_core::traits::VerdictSink;
//!
//! let sink = JsonLinesSink::stdout();
//! sink.emit(&record)?;
//! ```

pub mod json_lines;
pub mod memory;

pub use json_lines::JsonLinesSink;
pub use memory::InMemorySink;
