pub mod infrastructure;
pub mod stream_faces_use_case;
