use crate::buffer::ColorSizeReport;
use crate::progress::PROGRESS_INTERVAL;
use std::path::PathBuf;

/// Default cap on the output buffer: 512 MiB.
pub const MAX_BUFFER_BYTES_DEFAULT: usize = 512 * 1024 * 1024;

/// Settings for a decode call.
#[derive(Clone, Debug)]
pub struct DecodeOptions {
    /// Extract RGB next to the positions
    pub want_color: bool,
    /// Largest output buffer that may be allocated, `None` for no limit
    pub max_buffer_bytes: Option<usize>,
    /// Points between two progress reports, 0 disables reporting
    pub progress_interval: u64,
    /// Directory the input is staged in
    pub staging_dir: PathBuf,
    /// How the color section size is reported
    pub color_size: ColorSizeReport,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        DecodeOptions {
            want_color: true,
            max_buffer_bytes: Some(MAX_BUFFER_BYTES_DEFAULT),
            progress_interval: PROGRESS_INTERVAL,
            staging_dir: std::env::temp_dir(),
            color_size: ColorSizeReport::default(),
        }
    }
}

impl DecodeOptions {
    pub fn with_color(mut self, want_color: bool) -> Self {
        self.want_color = want_color;
        self
    }

    pub fn with_max_buffer_bytes(mut self, limit: Option<usize>) -> Self {
        self.max_buffer_bytes = limit;
        self
    }

    pub fn with_progress_interval(mut self, interval: u64) -> Self {
        self.progress_interval = interval;
        self
    }

    pub fn with_staging_dir<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        self.staging_dir = dir.into();
        self
    }

    pub fn with_color_size(mut self, color_size: ColorSizeReport) -> Self {
        self.color_size = color_size;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let options = DecodeOptions::default();
        assert!(options.want_color);
        assert_eq!(options.max_buffer_bytes, Some(MAX_BUFFER_BYTES_DEFAULT));
        assert_eq!(options.progress_interval, 1_000_000);
        assert_eq!(options.color_size, ColorSizeReport::Actual);
    }

    #[test]
    fn setters_chain() {
        let options = DecodeOptions::default()
            .with_color(false)
            .with_max_buffer_bytes(None)
            .with_progress_interval(10)
            .with_staging_dir("/var/tmp")
            .with_color_size(ColorSizeReport::Legacy);
        assert!(!options.want_color);
        assert_eq!(options.max_buffer_bytes, None);
        assert_eq!(options.progress_interval, 10);
        assert_eq!(options.staging_dir, PathBuf::from("/var/tmp"));
        assert_eq!(options.color_size, ColorSizeReport::Legacy);
    }
}
