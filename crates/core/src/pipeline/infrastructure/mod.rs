pub mod threaded_stream_runner;
