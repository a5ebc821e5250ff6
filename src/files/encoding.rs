//! Content-encoding negotiation and streaming compression.

use std::fmt;

use async_compression::tokio::bufread::{GzipEncoder, ZlibEncoder};
use axum::body::Body;
use futures_util::TryStreamExt;
use tokio::io::{AsyncRead, BufReader};
use tokio_util::io::ReaderStream;

/// Transport encoding selected for a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Encoding {
    #[default]
    Identity,
    Gzip,
    /// zlib-wrapped deflate, as HTTP defines `deflate`.
    Deflate,
}

impl Encoding {
    /// Pick an encoding from a raw `Accept-Encoding` value.
    ///
    /// Plain substring checks in fixed order: gzip, then deflate, then
    /// identity. Quality values are ignored, so `gzip;q=0` still selects
    /// gzip. A missing header selects identity.
    pub fn negotiate(accept_encoding: Option<&str>) -> Self {
        match accept_encoding {
            Some(h) if h.contains("gzip") => Encoding::Gzip,
            Some(h) if h.contains("deflate") => Encoding::Deflate,
            _ => Encoding::Identity,
        }
    }

    /// The `Content-Encoding` header value.
    pub fn as_str(&self) -> &'static str {
        match self {
            Encoding::Identity => "identity",
            Encoding::Gzip => "gzip",
            Encoding::Deflate => "deflate",
        }
    }

    /// Whether the encoded length is known up front, i.e. whether
    /// `Content-Length` may be sent.
    pub fn preserves_length(&self) -> bool {
        matches!(self, Encoding::Identity)
    }

    /// Stream `reader` through this encoding into a response body.
    ///
    /// The body pulls from the reader on demand; dropping it drops the
    /// reader (and any file handle it owns).
    pub fn encode<R>(self, reader: R) -> Body
    where
        R: AsyncRead + Send + Unpin + 'static,
    {
        match self {
            Encoding::Identity => stream_body(reader),
            Encoding::Gzip => stream_body(GzipEncoder::new(BufReader::new(reader))),
            Encoding::Deflate => stream_body(ZlibEncoder::new(BufReader::new(reader))),
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn stream_body<R>(reader: R) -> Body
where
    R: AsyncRead + Send + Unpin + 'static,
{
    // Headers are already on the wire when this fires; the connection is
    // aborted by hyper once the error surfaces.
    let stream = ReaderStream::new(reader).inspect_err(|e| {
        tracing::warn!(error = %e, "Response body stream failed");
    });
    Body::from_stream(stream)
}
