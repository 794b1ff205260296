pub mod capture_faces_use_case;
pub mod capture_request;
