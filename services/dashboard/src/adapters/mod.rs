pub mod file_cache;
pub mod http;

pub use file_cache::FileCache;
pub use http::{HttpCourseResource, HttpStudentResource};
