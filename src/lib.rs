//! Library for decoding LAS/LAZ point clouds into flat buffers.
//!
//! A whole file held in memory is decoded in one synchronous call into a single
//! allocation: little-endian `f32` XYZ positions, optionally followed by RGB
//! channels packed as little-endian `u16` pairs. Header metadata (bounds, scale,
//! offset, point count) is returned next to the buffer.
//!
//! ```no_run
//! use lidar_decode::{decode, DecodeOptions};
//!
//! let bytes = std::fs::read("autzen.laz")?;
//! let mut progress = |done: u64, total: u64| println!("{done}/{total}");
//! let cloud = decode(&bytes, &DecodeOptions::default(), &mut progress)?;
//! println!("{} points, bounds {:?}", cloud.point_count, cloud.bounds);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod bounds;
mod buffer;
mod color;
mod decoder;
mod error;
mod options;
mod progress;
mod session;
mod staging;
mod transform;
mod vlr;

pub use bounds::Bounds;
pub use buffer::{
    precompute_sizes, BufferSizes, ColorSizeReport, OutputBuffer, POSITION_BYTES_PER_POINT,
};
pub use color::{normalize, pack, unpack, COLOR_BYTES_PER_POINT};
pub use decoder::{decode, decode_into, decode_with, ColorSlot, DecodedCloud, OutputSlots};
pub use error::{Error, Result};
pub use options::{DecodeOptions, MAX_BUFFER_BYTES_DEFAULT};
pub use progress::{NoProgress, ProgressSink, PROGRESS_INTERVAL};
pub use session::{LasStream, PointStream, RawPointRecord, StreamHeader};
pub use staging::StagedInput;
pub use transform::{transform, AxisTransforms};
