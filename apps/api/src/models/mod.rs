pub mod fragment;
pub mod job;
pub mod profile;
pub mod selection;
