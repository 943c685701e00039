use red_vision::PixelBuffer;

/// An RGB buffer split into a left half of `left` and a right half of `right`.
pub fn split_rgb(width: usize, height: usize, left: [u8; 3], right: [u8; 3]) -> PixelBuffer {
    assert!(width > 0 && height > 0, "image dimensions must be positive");

    let mut data = Vec::with_capacity(width * height * 3);
    for _ in 0..height {
        for x in 0..width {
            let color = if x < width / 2 { left } else { right };
            data.extend_from_slice(&color);
        }
    }
    PixelBuffer::new(height, width, 3, data).expect("shape matches data")
}
