// Rotors: a permutation with a rotational position and a ring offset.
//
// The three historical rotor variants are one struct with a closed
// `RotorKind` tag. Whether a rotor steps or reflects is decided by matching
// on the tag, and `Machine` checks slot banding from it.

use std::sync::Arc;

use enigma_core::{Alphabet, EnigmaError, Permutation};

/// What a rotor can do in the machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RotorKind {
    /// Turn-around point of the signal path. Never moves; its permutation
    /// is a derangement.
    Reflector,
    /// Never moves.
    Fixed,
    /// Advances with a pawl. `notches` holds the positions (as alphabet
    /// indices, sorted and unique) at which the rotor to its left is allowed
    /// to advance.
    Moving { notches: Vec<usize> },
}

/// A single rotor: named wiring plus mutable position and ring setting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rotor {
    name: String,
    permutation: Permutation,
    kind: RotorKind,
    /// Current position, `0..size()`.
    position: usize,
    /// Ring offset, `0..size()`.
    ring: usize,
}

impl Rotor {
    /// A moving rotor whose notches sit at the symbols in `notches`.
    pub fn moving(
        name: impl Into<String>,
        permutation: Permutation,
        notches: &str,
    ) -> Result<Self, EnigmaError> {
        let alphabet = permutation.alphabet().clone();
        let mut indices = notches
            .chars()
            .map(|ch| alphabet.index_of(ch))
            .collect::<Result<Vec<_>, _>>()?;
        indices.sort_unstable();
        indices.dedup();
        Ok(Self::with_kind(
            name.into(),
            permutation,
            RotorKind::Moving { notches: indices },
        ))
    }

    /// A rotor that never moves.
    pub fn fixed(name: impl Into<String>, permutation: Permutation) -> Self {
        Self::with_kind(name.into(), permutation, RotorKind::Fixed)
    }

    /// A reflector. Fails unless `permutation` has no fixed points.
    pub fn reflector(
        name: impl Into<String>,
        permutation: Permutation,
    ) -> Result<Self, EnigmaError> {
        let name = name.into();
        if !permutation.derangement() {
            return Err(EnigmaError::NotADerangement(name));
        }
        Ok(Self::with_kind(name, permutation, RotorKind::Reflector))
    }

    fn with_kind(name: String, permutation: Permutation, kind: RotorKind) -> Self {
        Self {
            name,
            permutation,
            kind,
            position: 0,
            ring: 0,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn alphabet(&self) -> &Arc<Alphabet> {
        self.permutation.alphabet()
    }

    pub fn permutation(&self) -> &Permutation {
        &self.permutation
    }

    pub fn kind(&self) -> &RotorKind {
        &self.kind
    }

    /// Size of my alphabet.
    pub fn size(&self) -> usize {
        self.permutation.size()
    }

    /// Returns `true` if I have a ratchet and can move.
    pub fn rotates(&self) -> bool {
        matches!(self.kind, RotorKind::Moving { .. })
    }

    /// Returns `true` if I am a reflector.
    pub fn reflecting(&self) -> bool {
        matches!(self.kind, RotorKind::Reflector)
    }

    /// Current position.
    pub fn setting(&self) -> usize {
        self.position
    }

    /// Current ring offset.
    pub fn ring(&self) -> usize {
        self.ring
    }

    /// Set my position to `position`.
    ///
    /// Moving and fixed rotors take `position` modulo my size, matching the
    /// index forms of [`Permutation`]. A reflector only accepts exactly 0.
    pub fn set(&mut self, position: usize) -> Result<(), EnigmaError> {
        self.position = self.checked_offset(position)?;
        Ok(())
    }

    /// Set my position to the index of `ch`.
    pub fn set_char(&mut self, ch: char) -> Result<(), EnigmaError> {
        let position = self.alphabet().index_of(ch)?;
        self.set(position)
    }

    /// Set my ring offset to `ring`, wrapped like [`Rotor::set`].
    ///
    /// A reflector only accepts exactly 0.
    pub fn set_ring(&mut self, ring: usize) -> Result<(), EnigmaError> {
        self.ring = self.checked_offset(ring)?;
        Ok(())
    }

    /// Set my ring offset to the index of `ch`.
    pub fn set_ring_char(&mut self, ch: char) -> Result<(), EnigmaError> {
        let ring = self.alphabet().index_of(ch)?;
        self.set_ring(ring)
    }

    fn checked_offset(&self, offset: usize) -> Result<usize, EnigmaError> {
        match self.kind {
            RotorKind::Reflector if offset != 0 => Err(EnigmaError::ReflectorPosition {
                rotor: self.name.clone(),
                position: offset,
            }),
            _ => Ok(offset % self.size()),
        }
    }

    /// Notch positions; empty for reflectors and fixed rotors.
    pub fn notches(&self) -> &[usize] {
        match &self.kind {
            RotorKind::Moving { notches } => notches.as_slice(),
            RotorKind::Reflector | RotorKind::Fixed => &[],
        }
    }

    /// Returns `true` if I am positioned to let the rotor on my left advance.
    pub fn at_notch(&self) -> bool {
        match &self.kind {
            RotorKind::Moving { notches } => notches.binary_search(&self.position).is_ok(),
            RotorKind::Reflector | RotorKind::Fixed => false,
        }
    }

    /// Advance one position if I can move.
    pub fn advance(&mut self) {
        if let RotorKind::Moving { .. } = self.kind {
            self.position = (self.position + 1) % self.size();
        }
    }

    /// Convert contact `p` entering from the right through my wiring.
    ///
    /// The offset `position - ring` is added before the permutation and
    /// removed after it.
    #[inline]
    pub fn convert_forward(&self, p: usize) -> usize {
        let shift = self.position as isize - self.ring as isize;
        let result = self.permutation.permute(p as isize + shift);
        self.permutation.wrap(result as isize - shift)
    }

    /// Convert contact `e` entering from the left through my inverse wiring.
    #[inline]
    pub fn convert_backward(&self, e: usize) -> usize {
        let shift = self.position as isize - self.ring as isize;
        let result = self.permutation.invert(e as isize + shift);
        self.permutation.wrap(result as isize - shift)
    }
}

impl std::fmt::Display for Rotor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Rotor {}", self.name)
    }
}
