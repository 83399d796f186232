//! Integration tests live under `[[test]]` targets; this crate has no library code.
