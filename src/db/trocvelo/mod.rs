pub mod announcements_archive;
pub mod lib_api;
