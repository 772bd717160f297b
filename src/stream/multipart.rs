//! `multipart/x-mixed-replace` framing
//!
//! Each part on the wire is exactly:
//!
//! ```text
//! --frame\r\n
//! Content-Type: image/jpeg\r\n
//! \r\n
//! <jpeg bytes>\r\n
//! ```

use bytes::{BufMut, Bytes, BytesMut};

/// Boundary token separating parts
pub const BOUNDARY: &str = "frame";

/// Response content type announcing the boundary
pub const CONTENT_TYPE: &str = "multipart/x-mixed-replace; boundary=frame";

const PART_HEADER: &[u8] = b"--frame\r\nContent-Type: image/jpeg\r\n\r\n";
const PART_TRAILER: &[u8] = b"\r\n";

/// Wrap one JPEG image into a multipart part
pub fn encode_part(jpeg: &[u8]) -> Bytes {
    let mut buf = BytesMut::with_capacity(PART_HEADER.len() + jpeg.len() + PART_TRAILER.len());
    buf.put_slice(PART_HEADER);
    buf.put_slice(jpeg);
    buf.put_slice(PART_TRAILER);
    buf.freeze()
}

/// Bytes added around each JPEG
pub const fn framing_overhead() -> usize {
    PART_HEADER.len() + PART_TRAILER.len()
}
