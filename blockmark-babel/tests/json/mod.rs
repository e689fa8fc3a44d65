//! JSON format tests
//!
//! The editor save format in, markdown out, and back.

mod documents;
