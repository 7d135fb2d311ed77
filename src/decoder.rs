//! Bulk decode of a LAS/LAZ file held in memory.

use crate::buffer::{precompute_sizes, OutputBuffer};
use crate::color;
use crate::options::DecodeOptions;
use crate::progress::{ProgressReporter, ProgressSink};
use crate::session::{LasStream, PointStream, StreamHeader};
use crate::staging::StagedInput;
use crate::transform::AxisTransforms;
use crate::{Error, Result};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use std::time::{Duration, Instant};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Stage {
    Idle,
    Staged,
    SessionOpen,
    Sizing,
    Decoding,
    Finalizing,
    Success,
    Failed,
}

fn enter(stage: Stage) {
    log::trace!("decode stage: {:?}", stage);
}

/// Output of a successful decode.
#[derive(Clone, Debug)]
pub struct DecodedCloud {
    /// Positions, then colors if requested
    pub buffer: OutputBuffer,
    /// `[min_x, min_y, min_z, max_x, max_y, max_z]` from the header
    pub bounds: [f32; 6],
    pub scale: [f32; 3],
    pub offset: [f32; 3],
    /// Points declared by the header; the buffer is sized for this many
    pub point_count: u64,
    /// Points actually decoded, a prefix of the buffer
    pub decoded_points: u64,
    /// Whether the buffer carries a color section
    pub has_color: bool,
    pub decode_time: Duration,
}

impl DecodedCloud {
    fn new(header: &StreamHeader, buffer: OutputBuffer, decoded_points: u64) -> DecodedCloud {
        DecodedCloud {
            has_color: buffer.has_color(),
            buffer,
            bounds: header.bounds.to_f32_array(),
            scale: header.scale.map(|s| s as f32),
            offset: header.offset.map(|o| o as f32),
            point_count: header.point_count,
            decoded_points,
            decode_time: Duration::ZERO,
        }
    }

    /// Whether the stream ended before every declared point was decoded.
    pub fn is_truncated(&self) -> bool {
        self.decoded_points < self.point_count
    }

    /// Fails with [Error::DecodeTruncated] if points are missing.
    pub fn check_complete(&self) -> Result<()> {
        if self.is_truncated() {
            Err(Error::DecodeTruncated {
                decoded: self.decoded_points,
                declared: self.point_count,
            })
        } else {
            Ok(())
        }
    }

    /// Positions of the decoded points only.
    pub fn decoded_positions(&self) -> Vec<f32> {
        let mut positions = self.buffer.positions();
        positions.truncate(self.decoded_points as usize * 3);
        positions
    }
}

/// Decodes `input` with the LAS/LAZ backend.
///
/// The input is staged under [DecodeOptions::staging_dir] for the duration of
/// the call. A truncated stream is not an error: the result is sized for the
/// declared point count and [DecodedCloud::decoded_points] tells how many
/// points are valid.
pub fn decode(
    input: &[u8],
    options: &DecodeOptions,
    progress: &mut dyn ProgressSink,
) -> Result<DecodedCloud> {
    decode_with(input, options, progress, |path| LasStream::open(path))
}

/// Like [decode], with the stream opened by `open`.
pub fn decode_with<S, F>(
    input: &[u8],
    options: &DecodeOptions,
    progress: &mut dyn ProgressSink,
    open: F,
) -> Result<DecodedCloud>
where
    S: PointStream,
    F: FnOnce(&Path) -> Result<S>,
{
    let started = Instant::now();
    let result = panic::catch_unwind(AssertUnwindSafe(|| run(input, options, progress, open)))
        .unwrap_or_else(|payload| Err(Error::BackendPanicked(panic_message(payload))));
    match result {
        Ok(mut cloud) => {
            cloud.decode_time = started.elapsed();
            enter(Stage::Success);
            log::debug!(
                "decoded {} of {} points in {:?}",
                cloud.decoded_points,
                cloud.point_count,
                cloud.decode_time
            );
            Ok(cloud)
        }
        Err(e) => {
            enter(Stage::Failed);
            log::error!("point cloud decode failed: {}", e);
            Err(e)
        }
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

fn run<S, F>(
    input: &[u8],
    options: &DecodeOptions,
    progress: &mut dyn ProgressSink,
    open: F,
) -> Result<DecodedCloud>
where
    S: PointStream,
    F: FnOnce(&Path) -> Result<S>,
{
    enter(Stage::Idle);
    if input.is_empty() {
        return Err(Error::InvalidArguments("input is empty"));
    }

    let staged = StagedInput::create(input, &options.staging_dir)
        .map_err(|e| Error::OpenFailed(Box::new(e.into())))?;
    enter(Stage::Staged);

    let mut stream = open(staged.path()).map_err(|e| Error::OpenFailed(Box::new(e)))?;
    enter(Stage::SessionOpen);

    let result = decode_stream(&mut stream, options, progress);
    if let Err(e) = &result {
        if let Some(backend) = stream.last_error() {
            log::error!("{}: {}", e, backend);
        }
    }

    enter(Stage::Finalizing);
    stream.close();
    if let Err(e) = staged.remove() {
        log::warn!("staged input not removed: {}", e);
    }
    result
}

fn decode_stream<S: PointStream>(
    stream: &mut S,
    options: &DecodeOptions,
    progress: &mut dyn ProgressSink,
) -> Result<DecodedCloud> {
    let header = stream.header().clone();
    if header.point_count == 0 {
        return Err(Error::EmptyStream);
    }
    if !header.bounds.is_ordered() {
        log::warn!("header bounds are not ordered: {:?}", header.bounds);
    }
    if options.want_color && !header.has_color {
        log::debug!(
            "point format {} has no color, color channels will be zero",
            header.point_format
        );
    }

    enter(Stage::Sizing);
    let sizes = precompute_sizes(header.point_count, options.want_color, options.color_size)?;
    let mut buffer = OutputBuffer::allocate(sizes, options.max_buffer_bytes)?;

    enter(Stage::Decoding);
    let transforms = AxisTransforms::from_header(&header);
    let mut reporter =
        ProgressReporter::new(progress, options.progress_interval, header.point_count);
    let mut decoded = 0u64;
    while decoded < header.point_count && stream.advance() {
        let record = stream.record();
        // fits: the sizes above were computed from the same count
        let index = decoded as usize;
        buffer.write_position(index, transforms.apply(record));
        if options.want_color {
            buffer.write_color(index, color::pack(record.color));
        }
        decoded += 1;
        reporter.point_done(decoded);
    }

    if decoded < header.point_count {
        log::warn!(
            "stream ended after {} of {} points: {}",
            decoded,
            header.point_count,
            stream.last_error().unwrap_or("end of stream")
        );
    }
    Ok(DecodedCloud::new(&header, buffer, decoded))
}

/// Destination of the color section inside the returned buffer.
#[derive(Debug)]
pub struct ColorSlot<'a> {
    pub offset: &'a mut usize,
    pub size: &'a mut usize,
}

/// Caller-provided destinations for the scalar results of [decode_into].
///
/// `size` and `bounds` are required. Providing `color` requests colors.
#[derive(Debug, Default)]
pub struct OutputSlots<'a> {
    pub size: Option<&'a mut usize>,
    pub bounds: Option<&'a mut [f32; 6]>,
    pub color: Option<ColorSlot<'a>>,
    pub scale: Option<&'a mut [f32; 3]>,
    pub offset: Option<&'a mut [f32; 3]>,
    pub point_count: Option<&'a mut u64>,
    pub decoded_points: Option<&'a mut u64>,
}

impl OutputSlots<'_> {
    fn check(&self) -> Result<()> {
        if self.size.is_none() {
            return Err(Error::InvalidArguments("missing size output"));
        }
        if self.bounds.is_none() {
            return Err(Error::InvalidArguments("missing bounds output"));
        }
        Ok(())
    }

    fn clear(&mut self) {
        if let Some(size) = self.size.as_deref_mut() {
            *size = 0;
        }
        if let Some(color) = self.color.as_mut() {
            *color.offset = 0;
            *color.size = 0;
        }
        if let Some(count) = self.point_count.as_deref_mut() {
            *count = 0;
        }
        if let Some(count) = self.decoded_points.as_deref_mut() {
            *count = 0;
        }
    }

    fn fill(&mut self, cloud: &DecodedCloud) {
        if let Some(size) = self.size.as_deref_mut() {
            *size = cloud.buffer.position_bytes();
        }
        if let Some(bounds) = self.bounds.as_deref_mut() {
            *bounds = cloud.bounds;
        }
        if let Some(color) = self.color.as_mut() {
            *color.offset = cloud.buffer.position_bytes();
            *color.size = cloud.buffer.color_bytes();
        }
        if let Some(scale) = self.scale.as_deref_mut() {
            *scale = cloud.scale;
        }
        if let Some(offset) = self.offset.as_deref_mut() {
            *offset = cloud.offset;
        }
        if let Some(count) = self.point_count.as_deref_mut() {
            *count = cloud.point_count;
        }
        if let Some(count) = self.decoded_points.as_deref_mut() {
            *count = cloud.decoded_points;
        }
    }
}

/// Decodes `input` and writes the scalar results into `slots`.
///
/// Returns the output buffer, or `None` on failure with the size slots zeroed.
/// A missing or empty input and missing required slots are rejected before any
/// staging happens.
pub fn decode_into(
    input: Option<&[u8]>,
    mut slots: OutputSlots<'_>,
    options: &DecodeOptions,
    progress: &mut dyn ProgressSink,
) -> Option<OutputBuffer> {
    let checked = slots.check().and_then(|()| match input {
        Some(bytes) if !bytes.is_empty() => Ok(bytes),
        _ => Err(Error::InvalidArguments("input is missing or empty")),
    });
    let input = match checked {
        Ok(input) => input,
        Err(e) => {
            log::error!("point cloud decode rejected: {}", e);
            slots.clear();
            return None;
        }
    };

    let options = options.clone().with_color(slots.color.is_some());
    match decode(input, &options, progress) {
        Ok(cloud) => {
            slots.fill(&cloud);
            Some(cloud.buffer)
        }
        Err(_) => {
            slots.clear();
            None
        }
    }
}
