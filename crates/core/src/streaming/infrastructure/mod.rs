pub mod annotating_jpeg_encoder;
pub mod channel_publisher;
pub mod json_line_publisher;
