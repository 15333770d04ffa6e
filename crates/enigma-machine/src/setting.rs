// Setting lines: `* <reflector> <rotor>... <positions> [<rings>] [(cycle)...]`.

use enigma_core::{EnigmaError, Permutation};
use tracing::debug;

use crate::config::CycleScan;
use crate::machine::Machine;

/// One parsed setting line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Setting {
    /// Rotor names, reflector first.
    pub rotors: Vec<String>,
    /// Initial positions of slots `1..`, one symbol per slot.
    pub positions: String,
    /// Ring offsets of slots `1..`, if given.
    pub rings: Option<String>,
    /// Plugboard cycles, possibly empty.
    pub plugboard: String,
}

/// Parse a setting line for a machine with `num_slots` slots. `line_no`
/// is reported in grammar errors.
pub fn parse_setting(line: &str, line_no: usize, num_slots: usize) -> Result<Setting, EnigmaError> {
    let body = line
        .trim_start()
        .strip_prefix('*')
        .ok_or_else(|| EnigmaError::grammar(line_no, "setting line must start with '*'"))?;
    let mut tokens = body.split_whitespace().peekable();

    let rotors: Vec<String> = tokens
        .by_ref()
        .take(num_slots)
        .map(str::to_string)
        .collect();
    if rotors.len() != num_slots {
        return Err(EnigmaError::grammar(
            line_no,
            format!("expected {num_slots} rotor names, found {}", rotors.len()),
        ));
    }
    if let Some(bad) = rotors.iter().find(|name| name.starts_with('(')) {
        return Err(EnigmaError::grammar(
            line_no,
            format!("expected rotor name, found cycle {bad:?}"),
        ));
    }

    let positions = match tokens.next() {
        Some(token) if !token.starts_with('(') => token.to_string(),
        _ => {
            return Err(EnigmaError::grammar(line_no, "missing initial rotor positions"));
        }
    };
    let rings = tokens
        .next_if(|token| !token.starts_with('('))
        .map(str::to_string);

    let mut scan = CycleScan::default();
    let mut plugboard = String::new();
    for token in tokens {
        scan.feed(token, line_no)?;
        if !plugboard.is_empty() {
            plugboard.push(' ');
        }
        plugboard.push_str(token);
    }
    if scan.is_open() {
        return Err(EnigmaError::grammar(line_no, "unclosed plugboard cycle"));
    }

    Ok(Setting {
        rotors,
        positions,
        rings,
        plugboard,
    })
}

impl Setting {
    /// Load this setting into `machine`.
    ///
    /// Symbols and lengths are checked before the lineup is replaced, so on
    /// error the machine keeps its previous configuration.
    pub fn apply(&self, machine: &mut Machine) -> Result<(), EnigmaError> {
        let plugboard = Permutation::new(&self.plugboard, machine.alphabet().clone())?;
        machine.window_indices(&self.positions)?;
        if let Some(rings) = &self.rings {
            machine.window_indices(rings)?;
        }

        machine.insert_rotors(self.rotors.as_slice())?;
        machine.set_rotors(&self.positions)?;
        match &self.rings {
            Some(rings) => machine.set_ring(rings)?,
            None => machine.reset_ring()?,
        }
        machine.set_plugboard(plugboard)?;
        debug!(
            positions = %self.positions,
            rings = self.rings.as_deref().unwrap_or("-"),
            plugboard = %self.plugboard,
            "applied setting"
        );
        Ok(())
    }
}
