// enigma-cli: stream processing behind the `enigma` binary.
//
// Input is a sequence of lines. A line whose first non-blank character is
// `*` reconfigures the machine; every other line is a message, converted
// with the current configuration and written in groups of five symbols.

use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use enigma_core::EnigmaError;
use enigma_machine::{Machine, MachineOptions, parse_config, parse_setting};
use tracing::debug;

/// Symbols per output group.
pub const GROUP_WIDTH: usize = 5;

/// Split `text` into groups of `width` symbols separated by single spaces.
/// The last group may be shorter. `width` of 0 leaves `text` as it is.
pub fn group_output(text: &str, width: usize) -> String {
    if width == 0 {
        return text.to_string();
    }
    let mut out = String::with_capacity(text.len() + text.len() / width);
    for (i, ch) in text.chars().enumerate() {
        if i > 0 && i % width == 0 {
            out.push(' ');
        }
        out.push(ch);
    }
    out
}

/// Read the configuration file at `path` and build a machine from it.
pub fn load_machine(path: &Path, options: MachineOptions) -> Result<Machine, EnigmaError> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| EnigmaError::io(format!("could not read {}", path.display()), e))?;
    let machine = parse_config(&text)?.build(options)?;
    debug!(
        path = %path.display(),
        rotors = machine.catalog().len(),
        slots = machine.num_slots(),
        "loaded configuration"
    );
    Ok(machine)
}

/// Process every line of `input`, writing converted messages to `output`.
///
/// A message before the first setting line fails with
/// [`EnigmaError::NotConfigured`]; an input without lines is a grammar error.
pub fn process<R: BufRead, W: Write>(
    machine: &mut Machine,
    input: R,
    mut output: W,
) -> Result<(), EnigmaError> {
    let mut seen_setting = false;
    let mut line_count = 0usize;

    for (i, line) in input.lines().enumerate() {
        let line = line.map_err(|e| EnigmaError::io("could not read input", e))?;
        let line_no = i + 1;
        line_count = line_no;

        if line.trim_start().starts_with('*') {
            let setting = parse_setting(&line, line_no, machine.num_slots())?;
            setting.apply(machine)?;
            debug!(line = line_no, rotors = ?setting.rotors, "new setting");
            seen_setting = true;
            continue;
        }
        if !seen_setting {
            return Err(EnigmaError::NotConfigured);
        }

        let converted = machine.convert_str(&line)?;
        writeln!(output, "{}", group_output(&converted, GROUP_WIDTH))
            .map_err(|e| EnigmaError::io("could not write output", e))?;
    }

    if line_count == 0 {
        return Err(EnigmaError::grammar(1, "empty input: expected a setting line"));
    }
    output
        .flush()
        .map_err(|e| EnigmaError::io("could not write output", e))
}

/// Open `path` for reading, or standard input when `None`.
pub fn open_input(path: Option<&Path>) -> Result<Box<dyn BufRead>, EnigmaError> {
    match path {
        Some(path) => {
            let file = File::open(path)
                .map_err(|e| EnigmaError::io(format!("could not open {}", path.display()), e))?;
            Ok(Box::new(BufReader::new(file)))
        }
        None => Ok(Box::new(io::stdin().lock())),
    }
}

/// Open `path` for writing, or standard output when `None`.
pub fn open_output(path: Option<&Path>) -> Result<Box<dyn Write>, EnigmaError> {
    match path {
        Some(path) => {
            let file = File::create(path)
                .map_err(|e| EnigmaError::io(format!("could not create {}", path.display()), e))?;
            Ok(Box::new(BufWriter::new(file)))
        }
        None => Ok(Box::new(BufWriter::new(io::stdout().lock()))),
    }
}

/// Load `config`, then convert `input` (default stdin) into `output`
/// (default stdout).
pub fn run(
    config: &Path,
    input: Option<&Path>,
    output: Option<&Path>,
    options: MachineOptions,
) -> Result<(), EnigmaError> {
    let mut machine = load_machine(config, options)?;
    let input = open_input(input)?;
    let output = open_output(output)?;
    process(&mut machine, input, output)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SMALL: &str = "ABCD 4 3
X R (AC) (BD)
P MB (ABC)
Q MC (AD) (BC)
S MD (ABCD)
";

    fn small() -> Machine {
        parse_config(SMALL)
            .unwrap()
            .build(MachineOptions::default())
            .unwrap()
    }

    fn run_str(machine: &mut Machine, input: &str) -> Result<String, EnigmaError> {
        let mut out = Vec::new();
        process(machine, input.as_bytes(), &mut out)?;
        Ok(String::from_utf8(out).unwrap())
    }

    #[test]
    fn group_output_in_fives() {
        assert_eq!(group_output("", 5), "");
        assert_eq!(group_output("ABC", 5), "ABC");
        assert_eq!(group_output("ABCDE", 5), "ABCDE");
        assert_eq!(group_output("ABCDEF", 5), "ABCDE F");
        assert_eq!(group_output("ABCDEFGHIJKL", 5), "ABCDE FGHIJ KL");
        assert_eq!(group_output("ABCD", 2), "AB CD");
        assert_eq!(group_output("ABCD", 0), "ABCD");
    }

    #[test]
    fn process_converts_messages() {
        let mut machine = small();
        let out = run_str(&mut machine, "* X P Q S AAA\nABCD DCBA AABB\n").unwrap();
        assert_eq!(out, "BADCC DABDD CC\n");
    }

    #[test]
    fn empty_message_gives_empty_line() {
        let mut machine = small();
        let out = run_str(&mut machine, "* X P Q S AAA\n\n   \nABCD\n").unwrap();
        assert_eq!(out, "\n\nBADC\n");
    }

    #[test]
    fn setting_line_resets_machine() {
        let mut machine = small();
        let out = run_str(&mut machine, "* X P Q S AAA\nABCD\n  * X P Q S AAA\nABCD\n").unwrap();
        assert_eq!(out, "BADC\nBADC\n");
    }

    #[test]
    fn message_before_setting() {
        let mut machine = small();
        assert!(matches!(
            run_str(&mut machine, "ABCD\n* X P Q S AAA\n"),
            Err(EnigmaError::NotConfigured)
        ));
    }

    #[test]
    fn empty_input() {
        let mut machine = small();
        assert!(matches!(
            run_str(&mut machine, ""),
            Err(EnigmaError::Grammar { line: 1, .. })
        ));
    }

    #[test]
    fn bad_setting_reports_line() {
        let mut machine = small();
        assert!(matches!(
            run_str(&mut machine, "* X P Q S AAA\nABCD\n* X P Q\n"),
            Err(EnigmaError::Grammar { line: 3, .. })
        ));
    }

    #[test]
    fn foreign_symbol_in_message() {
        let mut machine = small();
        assert!(matches!(
            run_str(&mut machine, "* X P Q S AAA\nABXD\n"),
            Err(EnigmaError::SymbolNotInAlphabet('X'))
        ));
    }

    #[test]
    fn missing_config_file() {
        let err = load_machine(Path::new("/nonexistent/enigma.conf"), MachineOptions::default())
            .unwrap_err();
        assert!(matches!(err, EnigmaError::Io { .. }));
        assert!(err.to_string().starts_with("could not read /nonexistent/enigma.conf"));
    }
}
