//! Shared types for the Enigma rotor-cipher simulator.
//!
//! - [`alphabet`] -- the ordered symbol set and its index mapping
//! - [`permutation`] -- bijections over alphabet indices, parsed from cycle notation
//! - [`error`] -- the [`EnigmaError`] type used across the workspace

pub mod alphabet;
pub mod error;
pub mod permutation;

pub use alphabet::Alphabet;
pub use error::EnigmaError;
pub use permutation::Permutation;
