pub mod capture;
pub mod detection;
pub mod pipeline;
pub mod shared;
pub mod streaming;
pub mod video;
