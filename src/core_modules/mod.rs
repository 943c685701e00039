pub mod pixel;
pub mod pixel_buffer;
pub mod redness_detector;
pub mod test_image_generator;
pub mod threshold_filter;
pub mod utils;
