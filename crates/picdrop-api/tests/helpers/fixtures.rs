//! Test fixtures: small image blobs with real signatures.

/// A JPEG-framed blob of exactly `len` bytes (SOI/APP0 header, filler, EOI).
pub fn create_test_jpeg(len: usize) -> Vec<u8> {
    let header: [u8; 20] = [
        0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F', 0x00, 0x01, 0x01, 0x00, 0x00,
        0x01, 0x00, 0x01, 0x00, 0x00,
    ];
    assert!(len >= header.len() + 2, "jpeg fixture too small");

    let mut jpeg = header.to_vec();
    // Deterministic, non-repeating filler so byte-for-byte comparisons are meaningful.
    let filler = len - header.len() - 2;
    jpeg.extend((0..filler).map(|i| (i.wrapping_mul(31) % 251) as u8));
    jpeg.extend_from_slice(&[0xFF, 0xD9]);
    jpeg
}

/// Minimal valid 1x1 PNG bytes.
pub fn create_minimal_png() -> Vec<u8> {
    vec![
        0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44,
        0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x02, 0x00, 0x00, 0x00, 0x90,
        0x77, 0x53, 0xDE, 0x00, 0x00, 0x00, 0x0C, 0x49, 0x44, 0x41, 0x54, 0x08, 0xD7, 0x63, 0xF8,
        0x00, 0x00, 0x00, 0x00, 0x01, 0x00, 0x01, 0x00, 0x18, 0xDD, 0x8D, 0x89, 0x00, 0x00, 0x00,
        0x00, 0x49, 0x45, 0x4E, 0x44, 0xAE, 0x42, 0x60, 0x82,
    ]
}
