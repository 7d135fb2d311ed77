use thiserror::Error;

/// crate specific Result type
pub type Result<T> = std::result::Result<T, Error>;

/// crate specific Error enum
#[derive(Error, Debug)]
pub enum Error {
    /// The input was empty or a required output slot was missing
    #[error("invalid arguments: {}", .0)]
    InvalidArguments(&'static str),

    /// The staged input could not be opened as a point cloud container
    #[error("failed to open point cloud stream: {}", .0)]
    OpenFailed(#[source] Box<Error>),

    /// The header declares zero point records
    #[error("the point cloud declares no points")]
    EmptyStream,

    /// The output buffer could not be obtained
    #[error("could not allocate {} bytes for the output buffer", .requested)]
    AllocFailed {
        /// Number of bytes requested, saturated at `u64::MAX` on overflow
        requested: u64,
    },

    /// The output buffer would exceed the configured limit
    #[error("output buffer of {} bytes exceeds the limit of {} bytes", .requested, .limit)]
    BufferLimitExceeded {
        /// Number of bytes requested
        requested: u64,
        /// Configured maximum
        limit: u64,
    },

    /// The stream ended before every declared point was decoded
    #[error("decoded {} of {} declared points", .decoded, .declared)]
    DecodeTruncated {
        /// Points actually decoded
        decoded: u64,
        /// Points declared by the header
        declared: u64,
    },

    /// The header's point record length is shorter than its point format requires
    #[error("point format {} needs {} bytes per record, header declares {}", .format, .required, .declared)]
    InvalidRecordLength {
        /// Point data record format id
        format: u8,
        /// Bytes the format needs
        required: u16,
        /// Bytes the header declares
        declared: u16,
    },

    /// The point backend panicked while decoding, usually on corrupt data
    #[error("point cloud backend panicked: {}", .0)]
    BackendPanicked(String),

    /// The laszip vlr was not found, the points cannot be decompressed.
    #[error("laszip vlr not found")]
    LasZipVlrNotFound,

    /// [las::Error]
    #[error(transparent)]
    Las(#[from] las::Error),

    /// [laz::LasZipError]
    #[error(transparent)]
    LasZip(#[from] laz::LasZipError),

    /// [std::io::Error]
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether this error aborts a decode call.
    ///
    /// A truncated stream still yields a buffer, every other failure does not.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Error::DecodeTruncated { .. })
    }

    /// Whether this error is an allocation failure, including the configured limit.
    pub fn is_alloc_failure(&self) -> bool {
        matches!(
            self,
            Error::AllocFailed { .. } | Error::BufferLimitExceeded { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncation_is_not_fatal() {
        let truncated = Error::DecodeTruncated {
            decoded: 3,
            declared: 10,
        };
        assert!(!truncated.is_fatal());
        assert!(Error::EmptyStream.is_fatal());
        assert!(Error::InvalidArguments("empty input").is_fatal());
        assert!(Error::BackendPanicked("overflow".into()).is_fatal());
    }

    #[test]
    fn open_failure_keeps_backend_message() {
        let err = Error::OpenFailed(Box::new(Error::LasZipVlrNotFound));
        assert_eq!(
            err.to_string(),
            "failed to open point cloud stream: laszip vlr not found"
        );
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn limit_counts_as_alloc_failure() {
        let err = Error::BufferLimitExceeded {
            requested: 10,
            limit: 5,
        };
        assert!(err.is_alloc_failure());
        assert!(Error::AllocFailed { requested: 1 }.is_alloc_failure());
        assert!(!Error::EmptyStream.is_alloc_failure());
    }
}
