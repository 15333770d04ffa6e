// Error type shared by every Enigma crate.
//
// All variants describe caller-input faults: a bad alphabet, a bad cycle
// string, a rotor lineup that does not fit the machine, or malformed
// configuration text. None of them indicate an engine bug.

/// Errors produced while building or driving an Enigma machine.
#[derive(Debug, thiserror::Error)]
pub enum EnigmaError {
    // -- Alphabet -----------------------------------------------------------
    /// The alphabet contains one of the reserved characters `*`, `(`, `)`
    /// or a whitespace character.
    #[error("alphabet cannot contain reserved character {0:?}")]
    ReservedSymbol(char),

    /// The alphabet lists the same symbol twice.
    #[error("alphabet contains duplicate symbol {0:?}")]
    DuplicateSymbol(char),

    /// The alphabet has no symbols.
    #[error("alphabet must contain at least one symbol")]
    EmptyAlphabet,

    // -- Permutation --------------------------------------------------------
    /// A symbol was used that is not part of the bound alphabet.
    #[error("symbol {0:?} is not in the alphabet")]
    SymbolNotInAlphabet(char),

    /// A symbol appears in more than one cycle, or twice in one cycle.
    #[error("symbol {0:?} is repeated in the cycle list")]
    RepeatedCycleSymbol(char),

    /// A permutation was supplied for a different alphabet size.
    #[error("permutation size {actual} does not match alphabet size {expected}")]
    SizeMismatch { expected: usize, actual: usize },

    // -- Rotor construction -------------------------------------------------
    /// A reflector was built from a permutation with a fixed point.
    #[error("reflector {0} needs a derangement (a permutation with no fixed points)")]
    NotADerangement(String),

    /// A reflector was asked to move away from position 0.
    #[error("reflector {rotor} has only one position, cannot set it to {position}")]
    ReflectorPosition { rotor: String, position: usize },

    /// Two rotors in one catalog share a name.
    #[error("duplicate rotor name {0} in catalog")]
    DuplicateRotor(String),

    // -- Machine ------------------------------------------------------------
    /// Slot counts violate `1 < slots` and `moving < slots`.
    #[error("invalid machine shape: {slots} slots with {moving} moving rotors")]
    InvalidSlotCounts { slots: usize, moving: usize },

    /// A rotor was inserted into a slot its kind does not allow.
    #[error("slot {slot} needs a {expected}, but rotor {rotor} is not one")]
    SlotComposition {
        slot: usize,
        rotor: String,
        expected: &'static str,
    },

    /// A rotor name is not present in the catalog.
    #[error("rotor {0} is not in the catalog")]
    RotorNotFound(String),

    /// The same rotor was named for more than one slot.
    #[error("rotor {0} is named for more than one slot")]
    RepeatedRotor(String),

    /// The number of rotor names does not match the slot count.
    #[error("expected {expected} rotor names, got {actual}")]
    SlotCount { expected: usize, actual: usize },

    /// A position or ring setting has the wrong length.
    #[error("setting {setting:?} has length {actual}, expected {expected}")]
    SettingLength {
        setting: String,
        expected: usize,
        actual: usize,
    },

    /// Rotor state was touched before any rotors were inserted.
    #[error("no rotors have been inserted into the machine")]
    NotConfigured,

    // -- Text grammar -------------------------------------------------------
    /// Malformed configuration or setting text.
    #[error("line {line}: {message}")]
    Grammar { line: usize, message: String },

    /// Reading or writing a stream failed.
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

impl EnigmaError {
    /// Shorthand for a [`EnigmaError::Grammar`] error.
    pub fn grammar(line: usize, message: impl Into<String>) -> Self {
        EnigmaError::Grammar {
            line,
            message: message.into(),
        }
    }

    /// Shorthand for an [`EnigmaError::Io`] error with context.
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        EnigmaError::Io {
            context: context.into(),
            source,
        }
    }
}
