pub mod detection_debouncer;
pub mod encoded_frame;
pub mod event_publisher;
pub mod frame_encoder;
pub mod frame_throttle;
pub mod quality;
