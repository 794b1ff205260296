pub mod image_dir_source;
pub mod image_file_writer;
