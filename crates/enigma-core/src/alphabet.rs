// Alphabet: ordered, duplicate-free symbol set with symbol <-> index mapping.

use hashbrown::HashMap;

use crate::error::EnigmaError;

/// Characters that carry meaning in configuration and setting text and so
/// can never be symbols.
pub const RESERVED_SYMBOLS: &[char] = &['*', '(', ')'];

/// The alphabet used when none is given: the 26 upper-case Latin letters.
pub const DEFAULT_SYMBOLS: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// An ordered set of encodable symbols.
///
/// The K-th symbol has index K. Symbols are single `char`s; whitespace and
/// the [`RESERVED_SYMBOLS`] are rejected because every text format the
/// simulator reads uses them as separators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alphabet {
    symbols: Vec<char>,
    index: HashMap<char, usize>,
}

impl Alphabet {
    /// Build an alphabet from the characters of `chars`, in order.
    pub fn new(chars: &str) -> Result<Self, EnigmaError> {
        let symbols: Vec<char> = chars.chars().collect();
        if symbols.is_empty() {
            return Err(EnigmaError::EmptyAlphabet);
        }

        let mut index = HashMap::with_capacity(symbols.len());
        for (i, &ch) in symbols.iter().enumerate() {
            if RESERVED_SYMBOLS.contains(&ch) || ch.is_whitespace() {
                return Err(EnigmaError::ReservedSymbol(ch));
            }
            if index.insert(ch, i).is_some() {
                return Err(EnigmaError::DuplicateSymbol(ch));
            }
        }

        Ok(Self { symbols, index })
    }

    /// Number of symbols.
    #[inline]
    pub fn size(&self) -> usize {
        self.symbols.len()
    }

    /// Returns `true` if `ch` is one of my symbols.
    #[inline]
    pub fn contains(&self, ch: char) -> bool {
        self.index.contains_key(&ch)
    }

    /// Symbol number `index`.
    ///
    /// # Panics
    /// Panics if `index >= size()`.
    #[inline]
    pub fn to_char(&self, index: usize) -> char {
        self.symbols[index]
    }

    /// Index of `ch`, or `None` if it is not a member.
    #[inline]
    pub fn to_index(&self, ch: char) -> Option<usize> {
        self.index.get(&ch).copied()
    }

    /// Index of `ch`, failing with [`EnigmaError::SymbolNotInAlphabet`].
    pub fn index_of(&self, ch: char) -> Result<usize, EnigmaError> {
        self.to_index(ch).ok_or(EnigmaError::SymbolNotInAlphabet(ch))
    }

    /// All symbols in index order.
    pub fn symbols(&self) -> &[char] {
        &self.symbols
    }
}

impl Default for Alphabet {
    fn default() -> Self {
        let symbols: Vec<char> = DEFAULT_SYMBOLS.chars().collect();
        let index = symbols.iter().enumerate().map(|(i, &ch)| (ch, i)).collect();
        Self { symbols, index }
    }
}

impl std::fmt::Display for Alphabet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for ch in &self.symbols {
            write!(f, "{ch}")?;
        }
        Ok(())
    }
}
