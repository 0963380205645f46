//! Image payload sniffing.
//!
//! Accepts only byte streams whose leading bytes match a known image
//! signature. No decoding is attempted.

const JPEG: &[u8] = &[0xFF, 0xD8, 0xFF];
const PNG: &[u8] = &[0x89, b'P', b'N', b'G'];
const GIF: &[u8] = b"GIF8"; // covers GIF87a and GIF89a
const ICO: &[u8] = &[0x00, 0x00, 0x01, 0x00];

/// Image format detected from leading magic bytes. `None` for empty or
/// unrecognized input.
pub fn sniff_image_format(bytes: &[u8]) -> Option<&'static str> {
    // TODO: enforce MAX_IMAGE_DIMENSION / MAX_IMAGE_SIZE_MB; needs a
    // per-format header parse, not just signature sniffing.
    if bytes.starts_with(JPEG) {
        Some("jpeg")
    } else if bytes.starts_with(PNG) {
        Some("png")
    } else if bytes.starts_with(GIF) {
        Some("gif")
    } else if bytes.starts_with(ICO) {
        Some("ico")
    } else {
        None
    }
}

/// Byte stream is non-empty and carries a recognized image signature.
pub fn is_supported_image(bytes: &[u8]) -> bool {
    !bytes.is_empty() && sniff_image_format(bytes).is_some()
}
