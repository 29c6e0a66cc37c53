pub mod client;
pub mod demo;
pub mod playback;
pub mod request;
pub mod submission;
