// Configuration block parsing.
//
// A configuration describes the alphabet, the slot counts and every rotor
// available to the machine:
//
//   <alphabet> <slots> <moving>
//   <name> <type><notches> (cycle) (cycle) ...
//   ...
//
// The type is `R` (reflector), `N` (fixed) or `M` followed by the notch
// symbols (moving). A rotor's cycles may run over several lines; a cycle
// group may be split by whitespace.

use std::sync::Arc;

use enigma_core::{Alphabet, EnigmaError, Permutation};

use crate::catalog::RotorCatalog;
use crate::machine::{Machine, MachineOptions};
use crate::rotor::Rotor;

/// Everything read from a configuration block, ready to build a [`Machine`].
#[derive(Debug, Clone)]
pub struct MachineConfig {
    pub alphabet: Arc<Alphabet>,
    pub num_slots: usize,
    pub num_moving: usize,
    pub catalog: RotorCatalog,
}

impl MachineConfig {
    /// Build the machine this configuration describes.
    pub fn build(self, options: MachineOptions) -> Result<Machine, EnigmaError> {
        Machine::with_options(
            self.alphabet,
            self.num_slots,
            self.num_moving,
            self.catalog,
            options,
        )
    }
}

/// A whitespace-separated token and the 1-based line it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Token<'a> {
    line: usize,
    text: &'a str,
}

/// Cursor over the tokens of a configuration block.
struct Tokens<'a> {
    tokens: Vec<Token<'a>>,
    pos: usize,
    last_line: usize,
}

impl<'a> Tokens<'a> {
    fn new(text: &'a str) -> Self {
        let tokens: Vec<Token<'a>> = text
            .lines()
            .enumerate()
            .flat_map(|(i, line)| {
                line.split_whitespace()
                    .map(move |text| Token { line: i + 1, text })
            })
            .collect();
        let last_line = tokens.last().map_or(1, |t| t.line);
        Self {
            tokens,
            pos: 0,
            last_line,
        }
    }

    fn peek(&self) -> Option<Token<'a>> {
        self.tokens.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<Token<'a>> {
        let token = self.peek();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    /// Next token, or a grammar error naming what was `expected`.
    fn require(&mut self, expected: &str) -> Result<Token<'a>, EnigmaError> {
        self.bump().ok_or_else(|| {
            EnigmaError::grammar(
                self.last_line,
                format!("configuration truncated: expected {expected}"),
            )
        })
    }

    /// Line number of the token most recently returned.
    fn line(&self) -> usize {
        self.pos
            .checked_sub(1)
            .and_then(|i| self.tokens.get(i))
            .map_or(self.last_line, |t| t.line)
    }
}

/// Parse a configuration block.
pub fn parse_config(text: &str) -> Result<MachineConfig, EnigmaError> {
    let mut tokens = Tokens::new(text);

    let alphabet_token = tokens.require("alphabet")?;
    let alphabet = Arc::new(Alphabet::new(alphabet_token.text)?);
    let num_slots = parse_count(tokens.require("number of rotor slots")?, "rotor slots")?;
    let num_moving = parse_count(tokens.require("number of pawls")?, "pawls")?;

    let mut catalog = RotorCatalog::new();
    while tokens.peek().is_some() {
        let rotor = parse_rotor(&mut tokens, &alphabet)?;
        catalog.insert(rotor)?;
    }

    Ok(MachineConfig {
        alphabet,
        num_slots,
        num_moving,
        catalog,
    })
}

fn parse_count(token: Token<'_>, what: &str) -> Result<usize, EnigmaError> {
    token.text.parse().map_err(|_| {
        EnigmaError::grammar(
            token.line,
            format!("expected number of {what}, found {:?}", token.text),
        )
    })
}

/// Parse `<name> <type> (cycle)...` starting at the cursor.
fn parse_rotor(tokens: &mut Tokens<'_>, alphabet: &Arc<Alphabet>) -> Result<Rotor, EnigmaError> {
    let name = tokens.require("rotor name")?;
    if name.text.starts_with('(') {
        return Err(EnigmaError::grammar(
            name.line,
            format!("expected rotor name, found cycle {:?}", name.text),
        ));
    }
    let tag = tokens.require(&format!("type of rotor {}", name.text))?;

    let mut cycles = String::new();
    let mut scan = CycleScan::default();
    while let Some(token) = tokens.peek() {
        if !scan.is_open() && !token.text.starts_with('(') {
            break;
        }
        tokens.bump();
        scan.feed(token.text, token.line)?;
        cycles.push_str(token.text);
        cycles.push(' ');
    }
    if scan.is_open() {
        return Err(EnigmaError::grammar(
            tokens.line(),
            format!("unclosed cycle in rotor {}", name.text),
        ));
    }

    let permutation = Permutation::new(&cycles, alphabet.clone())?;
    let mut tag_chars = tag.text.chars();
    match (tag_chars.next(), tag_chars.as_str()) {
        (Some('R'), "") => Rotor::reflector(name.text, permutation),
        (Some('N'), "") => Ok(Rotor::fixed(name.text, permutation)),
        (Some('M'), notches) => {
            if let Some(bad) = notches.chars().find(|&ch| !alphabet.contains(ch)) {
                return Err(EnigmaError::grammar(
                    tag.line,
                    format!("notch {bad:?} of rotor {} is not in the alphabet", name.text),
                ));
            }
            Rotor::moving(name.text, permutation, notches)
        }
        _ => Err(EnigmaError::grammar(
            tag.line,
            format!("unknown type {:?} for rotor {}", tag.text, name.text),
        )),
    }
}

/// Bracket state carried across the tokens of one rotor's cycles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct CycleScan {
    open: bool,
    group_len: usize,
}

impl CycleScan {
    /// Inside an unclosed group.
    pub(crate) fn is_open(&self) -> bool {
        self.open
    }

    /// Check the bracket structure of one token of cycle text.
    ///
    /// Cycles may not nest, may not be empty, and no symbol may sit outside
    /// a cycle.
    pub(crate) fn feed(&mut self, text: &str, line: usize) -> Result<(), EnigmaError> {
        for ch in text.chars() {
            match (ch, self.open) {
                ('(', false) => {
                    self.open = true;
                    self.group_len = 0;
                }
                ('(', true) => {
                    return Err(EnigmaError::grammar(line, format!("nested cycle in {text:?}")));
                }
                (')', false) => {
                    return Err(EnigmaError::grammar(line, format!("unbalanced ')' in {text:?}")));
                }
                (')', true) => {
                    if self.group_len == 0 {
                        return Err(EnigmaError::grammar(line, format!("empty cycle in {text:?}")));
                    }
                    self.open = false;
                }
                (_, false) => {
                    return Err(EnigmaError::grammar(
                        line,
                        format!("symbol {ch:?} outside of a cycle in {text:?}"),
                    ));
                }
                (_, true) => self.group_len += 1,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SMALL: &str = "ABCD 4 3
X R (AC) (BD)
P MB (ABC)
Q MC (AD)
     (BC)
S MD (ABCD)
F N
";

    #[test]
    fn parse_small_config() {
        let config = parse_config(SMALL).unwrap();
        assert_eq!(config.alphabet.to_string(), "ABCD");
        assert_eq!(config.num_slots, 4);
        assert_eq!(config.num_moving, 3);
        assert_eq!(config.catalog.len(), 5);

        let q = config.catalog.get(config.catalog.find("Q").unwrap());
        assert!(q.rotates());
        assert_eq!(q.notches(), &[2]);
        // Cycles continue on the next line.
        assert_eq!(q.permutation().permute(1), 2);
        assert_eq!(q.permutation().permute(0), 3);

        let f = config.catalog.get(config.catalog.find("F").unwrap());
        assert!(!f.rotates() && !f.reflecting());
        assert_eq!(f.permutation().permute(2), 2);

        let x = config.catalog.get(config.catalog.find("X").unwrap());
        assert!(x.reflecting());
    }

    #[test]
    fn build_machine_from_config() {
        let mut machine = parse_config(SMALL)
            .unwrap()
            .build(MachineOptions::default())
            .unwrap();
        machine.insert_rotors(&["X", "P", "Q", "S"]).unwrap();
        machine.set_rotors("AAA").unwrap();
        assert_eq!(machine.convert_str("ABCD DCBA AABB").unwrap(), "BADCCDABDDCC");
    }

    #[test]
    fn split_and_packed_cycle_groups() {
        let config = parse_config("ABCDEF 2 1\nR R (A B)(C D) ( E F )\nM M (ABC)").unwrap();
        let r = config.catalog.get(config.catalog.find("R").unwrap());
        assert!(r.reflecting());
        assert_eq!(r.permutation().permute(4), 5);
        let m = config.catalog.get(config.catalog.find("M").unwrap());
        assert!(m.notches().is_empty());
    }

    #[test]
    fn rotor_without_cycles_is_identity() {
        let config = parse_config("ABC 2 1 N N M MA").unwrap();
        assert_eq!(config.catalog.len(), 2);
        let m = config.catalog.get(config.catalog.find("M").unwrap());
        assert_eq!(m.notches(), &[0]);
    }

    fn grammar_line(result: Result<MachineConfig, EnigmaError>) -> usize {
        match result {
            Err(EnigmaError::Grammar { line, .. }) => line,
            other => panic!("expected grammar error, got {other:?}"),
        }
    }

    #[test]
    fn reject_missing_header_fields() {
        assert_eq!(grammar_line(parse_config("")), 1);
        assert_eq!(grammar_line(parse_config("ABC")), 1);
        assert_eq!(grammar_line(parse_config("ABC 3")), 1);
        assert_eq!(grammar_line(parse_config("ABC\nx 1")), 2);
        assert_eq!(grammar_line(parse_config("ABC 3 -1")), 1);
    }

    #[test]
    fn reject_bad_alphabet() {
        assert!(matches!(
            parse_config("AB(C 3 1"),
            Err(EnigmaError::ReservedSymbol('('))
        ));
    }

    #[test]
    fn reject_truncated_rotor() {
        assert_eq!(grammar_line(parse_config("ABCD 2 1\nR R (AB)(CD)\nM")), 3);
    }

    #[test]
    fn reject_unknown_type() {
        assert_eq!(grammar_line(parse_config("ABC 2 1\nR X (AB)")), 2);
        assert_eq!(grammar_line(parse_config("ABC 2 1\nR RR (AB)")), 2);
    }

    #[test]
    fn reject_bad_notch() {
        assert_eq!(grammar_line(parse_config("ABC 2 1\nM MZ (AB)")), 2);
    }

    #[test]
    fn reject_malformed_cycles() {
        for text in [
            "ABCD 2 1\nR R (AB",
            "ABCD 2 1\nR R (AB))",
            "ABCD 2 1\nR R (A(B)",
            "ABCD 2 1\nR R ()",
            "ABCD 2 1\nR R (AB)C",
        ] {
            assert_eq!(grammar_line(parse_config(text)), 2, "{text:?}");
        }
    }

    #[test]
    fn reject_cycle_symbol_outside_alphabet() {
        assert!(matches!(
            parse_config("ABC 2 1\nR R (AZ)"),
            Err(EnigmaError::SymbolNotInAlphabet('Z'))
        ));
    }

    #[test]
    fn reject_reflector_with_fixed_point() {
        assert!(matches!(
            parse_config("ABC 2 1\nR R (AB)"),
            Err(EnigmaError::NotADerangement(_))
        ));
    }

    #[test]
    fn reject_duplicate_rotor() {
        assert!(matches!(
            parse_config("ABCD 2 1\nX R (AB)(CD)\nX N"),
            Err(EnigmaError::DuplicateRotor(_))
        ));
    }

    #[test]
    fn bad_slot_counts_surface_on_build() {
        let config = parse_config("ABCD 1 0\nX R (AB)(CD)").unwrap();
        assert!(matches!(
            config.build(MachineOptions::default()),
            Err(EnigmaError::InvalidSlotCounts { slots: 1, moving: 0 })
        ));
    }

    #[test]
    fn cycle_scan_carries_state_across_tokens() {
        let mut scan = CycleScan::default();
        scan.feed("(AB)", 1).unwrap();
        assert!(!scan.is_open());
        scan.feed("(A", 1).unwrap();
        assert!(scan.is_open());
        // The group already holds A, so a lone ')' closes it.
        scan.feed(")", 1).unwrap();
        assert!(!scan.is_open());
        scan.feed("(", 1).unwrap();
        assert!(matches!(
            scan.feed(")", 4),
            Err(EnigmaError::Grammar { line: 4, .. })
        ));
    }
}
