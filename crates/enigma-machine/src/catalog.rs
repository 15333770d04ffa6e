// Rotor catalog: every rotor available to a machine, addressed by id or name.
//
// Rotors live in one arena `Vec`; machine slots refer to them by `RotorId`,
// so a rotor is shared between the catalog and the slot array without
// reference counting. Only the rotor's position and ring change while it
// sits in a slot.

use hashbrown::HashMap;

use enigma_core::EnigmaError;

use crate::rotor::Rotor;

/// Index of a rotor within its [`RotorCatalog`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RotorId(pub usize);

/// The set of rotors a machine can be loaded with.
#[derive(Debug, Clone, Default)]
pub struct RotorCatalog {
    rotors: Vec<Rotor>,
    by_name: HashMap<String, RotorId>,
}

impl RotorCatalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog from `rotors`, rejecting duplicate names.
    pub fn from_rotors(rotors: impl IntoIterator<Item = Rotor>) -> Result<Self, EnigmaError> {
        let mut catalog = Self::new();
        for rotor in rotors {
            catalog.insert(rotor)?;
        }
        Ok(catalog)
    }

    /// Add `rotor` and return its id.
    pub fn insert(&mut self, rotor: Rotor) -> Result<RotorId, EnigmaError> {
        if self.by_name.contains_key(rotor.name()) {
            return Err(EnigmaError::DuplicateRotor(rotor.name().to_string()));
        }
        let id = RotorId(self.rotors.len());
        self.by_name.insert(rotor.name().to_string(), id);
        self.rotors.push(rotor);
        Ok(id)
    }

    /// Look up a rotor id by name.
    pub fn find(&self, name: &str) -> Option<RotorId> {
        self.by_name.get(name).copied()
    }

    /// The rotor with id `id`.
    ///
    /// # Panics
    /// Panics if `id` was not handed out by this catalog.
    pub fn get(&self, id: RotorId) -> &Rotor {
        &self.rotors[id.0]
    }

    pub(crate) fn get_mut(&mut self, id: RotorId) -> &mut Rotor {
        &mut self.rotors[id.0]
    }

    /// Number of rotors.
    pub fn len(&self) -> usize {
        self.rotors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rotors.is_empty()
    }

    /// Rotors in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Rotor> {
        self.rotors.iter()
    }
}
