// Machine: slot sequence, plugboard, stepping and the signal path.
//
// Slot 0 holds the reflector, slots 1..(slots - moving) hold fixed rotors and
// the trailing `moving` slots hold moving rotors; slot `slots - 1` is the fast
// rotor. Each keystroke first steps the rotors, then sends the signal through
// plugboard -> rotors right to left -> reflector -> rotors left to right ->
// plugboard.

use std::sync::Arc;

use enigma_core::{Alphabet, EnigmaError, Permutation};
use tracing::debug;

use crate::catalog::{RotorCatalog, RotorId};
use crate::rotor::{Rotor, RotorKind};

/// Diagnostic options for a [`Machine`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MachineOptions {
    /// Emit a `debug` event on the `enigma::signal` target for every
    /// converted symbol, showing the rotor window and each stage of the
    /// signal path.
    pub trace: bool,
}

/// A complete Enigma machine.
#[derive(Debug, Clone)]
pub struct Machine {
    alphabet: Arc<Alphabet>,
    num_slots: usize,
    num_moving: usize,
    catalog: RotorCatalog,
    /// Rotor occupying each slot; empty until `insert_rotors` succeeds.
    slots: Vec<RotorId>,
    plugboard: Permutation,
    options: MachineOptions,
}

impl Machine {
    /// A machine over `alphabet` with `num_slots` slots, of which the last
    /// `num_moving` hold moving rotors. Requires `1 < num_slots` and
    /// `num_moving < num_slots`. Every rotor in `catalog` must be wired over
    /// an alphabet of the same size.
    pub fn new(
        alphabet: Arc<Alphabet>,
        num_slots: usize,
        num_moving: usize,
        catalog: RotorCatalog,
    ) -> Result<Self, EnigmaError> {
        Self::with_options(
            alphabet,
            num_slots,
            num_moving,
            catalog,
            MachineOptions::default(),
        )
    }

    /// Like [`Machine::new`], with explicit diagnostic options.
    pub fn with_options(
        alphabet: Arc<Alphabet>,
        num_slots: usize,
        num_moving: usize,
        catalog: RotorCatalog,
        options: MachineOptions,
    ) -> Result<Self, EnigmaError> {
        if num_slots <= 1 || num_moving >= num_slots {
            return Err(EnigmaError::InvalidSlotCounts {
                slots: num_slots,
                moving: num_moving,
            });
        }
        if let Some(rotor) = catalog.iter().find(|r| r.size() != alphabet.size()) {
            return Err(EnigmaError::SizeMismatch {
                expected: alphabet.size(),
                actual: rotor.size(),
            });
        }

        let plugboard = Permutation::identity(alphabet.clone());
        Ok(Self {
            alphabet,
            num_slots,
            num_moving,
            catalog,
            slots: Vec::with_capacity(num_slots),
            plugboard,
            options,
        })
    }

    /// Number of rotor slots.
    pub fn num_slots(&self) -> usize {
        self.num_slots
    }

    /// Number of pawls, and thus of moving rotors.
    pub fn num_moving(&self) -> usize {
        self.num_moving
    }

    pub fn alphabet(&self) -> &Arc<Alphabet> {
        &self.alphabet
    }

    pub fn catalog(&self) -> &RotorCatalog {
        &self.catalog
    }

    pub fn plugboard(&self) -> &Permutation {
        &self.plugboard
    }

    pub fn options(&self) -> MachineOptions {
        self.options
    }

    /// Returns `true` once rotors have been inserted into every slot.
    pub fn is_configured(&self) -> bool {
        self.slots.len() == self.num_slots
    }

    /// Rotor in slot `k` (slot 0 is the reflector, the last slot is the fast
    /// rotor), or `None` if `k` is out of range or no rotors are inserted.
    pub fn rotor(&self, k: usize) -> Option<&Rotor> {
        self.slots.get(k).map(|&id| self.catalog.get(id))
    }

    /// The rotor window: the positions of slots `1..num_slots` as symbols.
    pub fn settings(&self) -> String {
        self.slots
            .iter()
            .skip(1)
            .map(|&id| self.alphabet.to_char(self.catalog.get(id).setting()))
            .collect()
    }

    /// Load the rotors named `names` into the slots, left to right
    /// (`names[0]` is the reflector).
    ///
    /// The whole lineup is resolved and checked against the slot banding
    /// before anything changes; on error the previous lineup stays in place.
    pub fn insert_rotors<S: AsRef<str>>(&mut self, names: &[S]) -> Result<(), EnigmaError> {
        if names.len() != self.num_slots {
            return Err(EnigmaError::SlotCount {
                expected: self.num_slots,
                actual: names.len(),
            });
        }

        let mut candidate = Vec::with_capacity(self.num_slots);
        for name in names {
            let name = name.as_ref();
            let id = self
                .catalog
                .find(name)
                .ok_or_else(|| EnigmaError::RotorNotFound(name.to_string()))?;
            if candidate.contains(&id) {
                return Err(EnigmaError::RepeatedRotor(name.to_string()));
            }
            candidate.push(id);
        }
        self.check_banding(&candidate)?;

        let lineup: Vec<&str> = names.iter().map(|n| n.as_ref()).collect();
        debug!(rotors = ?lineup, "inserted rotors");
        self.slots = candidate;
        Ok(())
    }

    /// Check that slot 0 is a reflector, the middle band fixed and the
    /// trailing `num_moving` slots moving.
    fn check_banding(&self, candidate: &[RotorId]) -> Result<(), EnigmaError> {
        let first_moving = self.num_slots - self.num_moving;
        for (slot, &id) in candidate.iter().enumerate() {
            let rotor = self.catalog.get(id);
            let (fits, expected) = match slot {
                0 => (rotor.reflecting(), "reflector"),
                s if s < first_moving => (matches!(rotor.kind(), RotorKind::Fixed), "fixed rotor"),
                _ => (rotor.rotates(), "moving rotor"),
            };
            if !fits {
                return Err(EnigmaError::SlotComposition {
                    slot,
                    rotor: rotor.name().to_string(),
                    expected,
                });
            }
        }
        Ok(())
    }

    /// Set the positions of slots `1..num_slots` from `setting`, whose first
    /// symbol belongs to the leftmost rotor after the reflector.
    pub fn set_rotors(&mut self, setting: &str) -> Result<(), EnigmaError> {
        let indices = self.parse_window(setting)?;
        for (&id, index) in self.slots[1..].iter().zip(indices) {
            self.catalog.get_mut(id).set(index)?;
        }
        Ok(())
    }

    /// Set the ring offsets of slots `1..num_slots` from `setting`.
    pub fn set_ring(&mut self, setting: &str) -> Result<(), EnigmaError> {
        let indices = self.parse_window(setting)?;
        for (&id, index) in self.slots[1..].iter().zip(indices) {
            self.catalog.get_mut(id).set_ring(index)?;
        }
        Ok(())
    }

    /// Return the ring offsets of slots `1..num_slots` to 0.
    pub fn reset_ring(&mut self) -> Result<(), EnigmaError> {
        if !self.is_configured() {
            return Err(EnigmaError::NotConfigured);
        }
        for &id in &self.slots[1..] {
            self.catalog.get_mut(id).set_ring(0)?;
        }
        Ok(())
    }

    /// Map a `num_slots - 1` symbol setting string to indices, touching
    /// nothing on error.
    fn parse_window(&self, setting: &str) -> Result<Vec<usize>, EnigmaError> {
        if !self.is_configured() {
            return Err(EnigmaError::NotConfigured);
        }
        self.window_indices(setting)
    }

    /// Check the length and symbols of a window setting without requiring
    /// rotors to be inserted.
    pub(crate) fn window_indices(&self, setting: &str) -> Result<Vec<usize>, EnigmaError> {
        let expected = self.num_slots - 1;
        let actual = setting.chars().count();
        if actual != expected {
            return Err(EnigmaError::SettingLength {
                setting: setting.to_string(),
                expected,
                actual,
            });
        }
        setting.chars().map(|ch| self.alphabet.index_of(ch)).collect()
    }

    /// Replace the plugboard. Any permutation of my alphabet is accepted.
    pub fn set_plugboard(&mut self, plugboard: Permutation) -> Result<(), EnigmaError> {
        if plugboard.size() != self.alphabet.size() {
            return Err(EnigmaError::SizeMismatch {
                expected: self.alphabet.size(),
                actual: plugboard.size(),
            });
        }
        self.plugboard = plugboard;
        Ok(())
    }

    /// Convert the symbol with index `c` (taken modulo the alphabet size),
    /// after first advancing the rotors.
    pub fn convert(&mut self, c: usize) -> usize {
        let c = self.plugboard.wrap(c as isize);
        self.advance_rotors();

        let mut trace = self.options.trace.then(|| {
            let mut line = format!("[{}] {}", self.settings(), self.alphabet.to_char(c));
            line.reserve(4 * (2 * self.slots.len() + 2));
            line
        });

        let mut c = self.plugboard.permute(c as isize);
        self.record(&mut trace, c);

        for &id in self.slots.iter().rev() {
            c = self.catalog.get(id).convert_forward(c);
            self.record(&mut trace, c);
        }
        for &id in self.slots.iter().skip(1) {
            c = self.catalog.get(id).convert_backward(c);
            self.record(&mut trace, c);
        }

        c = self.plugboard.permute(c as isize);
        self.record(&mut trace, c);
        if let Some(line) = trace {
            debug!(target: "enigma::signal", "{line}");
        }
        c
    }

    /// Append ` -> <symbol>` to the trace line, if one is being built.
    fn record(&self, trace: &mut Option<String>, c: usize) {
        if let Some(line) = trace {
            line.push_str(" -> ");
            line.push(self.alphabet.to_char(c));
        }
    }

    /// Step the rotors for one keystroke.
    ///
    /// The fast rotor always advances. Scanning right to left, a moving rotor
    /// advances together with its right neighbour when that neighbour sits at
    /// a notch. Notches are read before anything moves, which produces the
    /// double step of the middle rotor.
    fn advance_rotors(&mut self) {
        let n = self.slots.len();
        if n == 0 {
            return;
        }

        let mut advance = vec![false; n];
        advance[n - 1] = true;
        for i in (0..n - 1).rev() {
            let left = self.catalog.get(self.slots[i]);
            let right = self.catalog.get(self.slots[i + 1]);
            if left.rotates() && right.at_notch() {
                advance[i] = true;
                advance[i + 1] = true;
            }
        }

        for (&id, step) in self.slots.iter().zip(advance) {
            if step {
                self.catalog.get_mut(id).advance();
            }
        }
    }

    /// Convert every non-whitespace symbol of `msg` in order.
    ///
    /// Whitespace is dropped from the output. The message is checked against
    /// the alphabet before any rotor moves.
    pub fn convert_str(&mut self, msg: &str) -> Result<String, EnigmaError> {
        let indices = msg
            .chars()
            .filter(|ch| !ch.is_whitespace())
            .map(|ch| self.alphabet.index_of(ch))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(indices
            .into_iter()
            .map(|c| {
                let out = self.convert(c);
                self.alphabet.to_char(out)
            })
            .collect())
    }
}
