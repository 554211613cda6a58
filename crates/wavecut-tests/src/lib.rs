//! Integration test crate for Wavecut.
//!
//! This crate exists solely to hold cross-crate integration tests.
//! It depends on every wavecut crate to verify they work together.

#[cfg(test)]
mod editing;

#[cfg(test)]
mod envelope;

#[cfg(test)]
mod media;

#[cfg(test)]
mod worker;

#[cfg(test)]
mod support;
