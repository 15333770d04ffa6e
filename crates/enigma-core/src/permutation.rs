// Permutation: a bijection over alphabet indices, built from cycle notation.

use std::sync::Arc;

use crate::alphabet::Alphabet;
use crate::error::EnigmaError;

/// A permutation of `0..alphabet.size()`.
///
/// Stored as two parallel tables that are kept mutual inverses:
/// `inverse[forward[i]] == i` for every index. Index arguments may be any
/// signed offset; they are reduced modulo the size first, so callers can add
/// and subtract rotor offsets without bounds checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Permutation {
    alphabet: Arc<Alphabet>,
    forward: Vec<usize>,
    inverse: Vec<usize>,
}

impl Permutation {
    /// Parse `cycles`, a string of the form `"(cccc) (cc) ..."` where each `c`
    /// is a symbol of `alphabet`.
    ///
    /// `(c0 c1 ... cm)` maps `c0 -> c1 -> ... -> cm -> c0`. Whitespace is
    /// ignored and symbols that appear in no cycle map to themselves.
    /// Characters outside parentheses carry no meaning and are skipped; an
    /// unterminated final cycle is dropped. Bracket balance is the job of the
    /// text grammar, not of this constructor.
    pub fn new(cycles: &str, alphabet: Arc<Alphabet>) -> Result<Self, EnigmaError> {
        let size = alphabet.size();
        let mut forward: Vec<usize> = (0..size).collect();
        let mut seen = vec![false; size];
        let mut cycle: Vec<usize> = Vec::new();
        let mut inside = false;

        for ch in cycles.chars() {
            if ch.is_whitespace() {
                continue;
            }
            match ch {
                '(' => inside = true,
                ')' => {
                    inside = false;
                    add_cycle(&mut forward, &cycle);
                    cycle.clear();
                }
                _ if inside => {
                    let index = alphabet.index_of(ch)?;
                    if std::mem::replace(&mut seen[index], true) {
                        return Err(EnigmaError::RepeatedCycleSymbol(ch));
                    }
                    cycle.push(index);
                }
                _ => {}
            }
        }

        Ok(Self::from_forward(forward, alphabet))
    }

    /// The identity permutation over `alphabet`.
    pub fn identity(alphabet: Arc<Alphabet>) -> Self {
        let forward = (0..alphabet.size()).collect();
        Self::from_forward(forward, alphabet)
    }

    fn from_forward(forward: Vec<usize>, alphabet: Arc<Alphabet>) -> Self {
        let mut inverse = vec![0; forward.len()];
        for (i, &f) in forward.iter().enumerate() {
            inverse[f] = i;
        }
        Self {
            alphabet,
            forward,
            inverse,
        }
    }

    /// Reduce `p` modulo my size into `0..size()`.
    #[inline]
    pub fn wrap(&self, p: isize) -> usize {
        p.rem_euclid(self.size() as isize) as usize
    }

    /// Size of the alphabet I permute.
    #[inline]
    pub fn size(&self) -> usize {
        self.forward.len()
    }

    /// Apply the permutation to `p` (taken modulo the size).
    #[inline]
    pub fn permute(&self, p: isize) -> usize {
        self.forward[self.wrap(p)]
    }

    /// Apply the inverse permutation to `c` (taken modulo the size).
    #[inline]
    pub fn invert(&self, c: isize) -> usize {
        self.inverse[self.wrap(c)]
    }

    /// Apply the permutation to a symbol of my alphabet.
    pub fn permute_char(&self, p: char) -> Result<char, EnigmaError> {
        let index = self.alphabet.index_of(p)?;
        Ok(self.alphabet.to_char(self.forward[index]))
    }

    /// Apply the inverse permutation to a symbol of my alphabet.
    pub fn invert_char(&self, c: char) -> Result<char, EnigmaError> {
        let index = self.alphabet.index_of(c)?;
        Ok(self.alphabet.to_char(self.inverse[index]))
    }

    /// Returns `true` if no index maps to itself.
    pub fn derangement(&self) -> bool {
        self.forward.iter().enumerate().all(|(i, &f)| i != f)
    }

    /// The alphabet this permutation was built over.
    pub fn alphabet(&self) -> &Arc<Alphabet> {
        &self.alphabet
    }
}

/// Chain `cycle[0] -> cycle[1] -> ... -> cycle[last] -> cycle[0]`.
fn add_cycle(forward: &mut [usize], cycle: &[usize]) {
    for (i, &from) in cycle.iter().enumerate() {
        forward[from] = cycle[(i + 1) % cycle.len()];
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NAVY_I: &str = "(AELTPHQXRU) (BKNW) (CMOY) (DFG) (IV) (JZ) (S)";
    const NAVY_B: &str = "(AE) (BN) (CK) (DQ) (FU) (GY) (HW) (IJ) (LO) (MP) (RX) (SZ) (TV)";

    fn az() -> Arc<Alphabet> {
        Arc::new(Alphabet::default())
    }

    /// Check that `p` maps each symbol of `from` to the same-index symbol of `to`.
    fn check_perm(p: &Permutation, from: &str, to: &str) {
        let alpha = p.alphabet().clone();
        for (c, e) in from.chars().zip(to.chars()) {
            let ci = alpha.to_index(c).unwrap();
            let ei = alpha.to_index(e).unwrap();
            assert_eq!(p.permute_char(c).unwrap(), e, "wrong translation of {c}");
            assert_eq!(p.invert_char(e).unwrap(), c, "wrong inverse of {e}");
            assert_eq!(p.permute(ci as isize), ei, "wrong translation of index {ci}");
            assert_eq!(p.invert(ei as isize), ci, "wrong inverse of index {ei}");
        }
    }

    #[test]
    fn empty_cycles_are_identity() {
        let p = Permutation::new("", az()).unwrap();
        check_perm(&p, "ABCDEFGHIJKLMNOPQRSTUVWXYZ", "ABCDEFGHIJKLMNOPQRSTUVWXYZ");
        assert_eq!(p, Permutation::identity(az()));
        assert!(!p.derangement());
    }

    #[test]
    fn navy_rotor_i_wiring() {
        let p = Permutation::new(NAVY_I, az()).unwrap();
        check_perm(&p, "ABCDEFGHIJKLMNOPQRSTUVWXYZ", "EKMFLGDQVZNTOWYHXUSPAIBRCJ");
        assert!(!p.derangement()); // S is a fixed point
    }

    #[test]
    fn reflector_wiring_is_derangement() {
        let p = Permutation::new(NAVY_B, az()).unwrap();
        assert!(p.derangement());
        for i in 0..26 {
            assert_eq!(p.permute(p.permute(i) as isize), i as usize);
        }
    }

    #[test]
    fn bijection_holds_for_every_index() {
        for cycles in [NAVY_I, NAVY_B, "(ABCDEFGHIJKLMNOPQRSTUVWXYZ)", "(AZ)", ""] {
            let p = Permutation::new(cycles, az()).unwrap();
            for i in 0..p.size() as isize {
                assert_eq!(p.invert(p.permute(i) as isize), i as usize, "{cycles}");
                assert_eq!(p.permute(p.invert(i) as isize), i as usize, "{cycles}");
            }
        }
    }

    #[test]
    fn indices_wrap_modulo_size() {
        let alpha = Arc::new(Alphabet::new("ABCD").unwrap());
        let p = Permutation::new("(BACD)", alpha).unwrap();
        assert_eq!(p.size(), 4);
        assert_eq!(p.wrap(-1), 3);
        assert_eq!(p.wrap(-9), 3);
        assert_eq!(p.wrap(6), 2);
        assert_eq!(p.permute(0), 2);
        assert_eq!(p.permute(4), 2);
        assert_eq!(p.permute(-3), 0); // index 1 (B) -> A
        assert_eq!(p.invert(-4), 1);
        assert_eq!(p.invert(7), 2); // D <- C
    }

    #[test]
    fn whitespace_and_adjacent_groups() {
        let alpha = Arc::new(Alphabet::new("ABCDEF").unwrap());
        let spaced = Permutation::new(" ( A B ) ( C  D E )", alpha.clone()).unwrap();
        let packed = Permutation::new("(AB)(CDE)", alpha).unwrap();
        assert_eq!(spaced, packed);
        check_perm(&packed, "ABCDEF", "BADECF");
    }

    #[test]
    fn singleton_cycle_is_fixed_point() {
        let alpha = Arc::new(Alphabet::new("ABC").unwrap());
        let p = Permutation::new("(A) (BC)", alpha).unwrap();
        check_perm(&p, "ABC", "ACB");
    }

    #[test]
    fn unterminated_cycle_is_dropped() {
        let alpha = Arc::new(Alphabet::new("ABCD").unwrap());
        let p = Permutation::new("(AB) (CD", alpha).unwrap();
        check_perm(&p, "ABCD", "BACD");
    }

    #[test]
    fn symbol_outside_alphabet_in_cycles() {
        let alpha = Arc::new(Alphabet::new("ABCD").unwrap());
        let err = Permutation::new("(AE)", alpha).unwrap_err();
        assert!(matches!(err, EnigmaError::SymbolNotInAlphabet('E')));
    }

    #[test]
    fn repeated_symbol_in_cycles() {
        let err = Permutation::new("(AB) (BC)", az()).unwrap_err();
        assert!(matches!(err, EnigmaError::RepeatedCycleSymbol('B')));
        let err = Permutation::new("(ABA)", az()).unwrap_err();
        assert!(matches!(err, EnigmaError::RepeatedCycleSymbol('A')));
    }

    #[test]
    fn symbol_forms_reject_foreign_symbols() {
        let p = Permutation::new(NAVY_I, az()).unwrap();
        assert!(matches!(
            p.permute_char('a'),
            Err(EnigmaError::SymbolNotInAlphabet('a'))
        ));
        assert!(matches!(
            p.invert_char('1'),
            Err(EnigmaError::SymbolNotInAlphabet('1'))
        ));
    }
}
