//! HTTP Response domain types

mod capture;

pub use capture::ResponseCapture;
