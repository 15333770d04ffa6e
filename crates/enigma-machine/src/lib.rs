//! Enigma rotor machine engine.
//!
//! - [`rotor`] -- rotors: wiring, position, ring offset, notches
//! - [`catalog`] -- the named set of rotors a machine may be loaded with
//! - [`machine`] -- slots, stepping, plugboard and symbol conversion
//! - [`config`] -- the text grammar describing a machine and its rotors
//! - [`setting`] -- the `*` line selecting rotors, positions, rings and plugboard
//!
//! ```
//! use enigma_machine::{parse_config, parse_setting, MachineOptions};
//!
//! let config = "ABCD 4 3
//!     X R (AC) (BD)
//!     P MB (ABC)
//!     Q MC (AD) (BC)
//!     S MD (ABCD)";
//! let mut machine = parse_config(config)?.build(MachineOptions::default())?;
//! parse_setting("* X P Q S AAA", 1, machine.num_slots())?.apply(&mut machine)?;
//! assert_eq!(machine.convert_str("ABCD")?, "BADC");
//! # Ok::<(), enigma_core::EnigmaError>(())
//! ```

pub mod catalog;
pub mod config;
pub mod machine;
pub mod rotor;
pub mod setting;

pub use catalog::{RotorCatalog, RotorId};
pub use config::{MachineConfig, parse_config};
pub use machine::{Machine, MachineOptions};
pub use rotor::{Rotor, RotorKind};
pub use setting::{Setting, parse_setting};
