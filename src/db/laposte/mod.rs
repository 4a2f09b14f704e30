pub mod communes_archive;
