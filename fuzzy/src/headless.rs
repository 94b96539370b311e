//! Headless mode for interactive evaluation.
//!
//! A simple line-oriented protocol over any reader and writer, designed for
//! scripting and for driving an area from another program:
//! - `NAME=VALUE ...` lines update inputs and re-evaluate
//! - Lines starting with `#` are commands (inputs, clear, rules, check, help, quit)
//! - Output lines are tagged `[OUTPUT]`, `[INPUTS]`, `[ERROR]` and so on

use crate::commands::{parse_assignment, write_issues, write_rules};
use fuzzy_core::validate::check_snapshot;
use fuzzy_core::{AreaSnapshot, InferenceEngine};
use std::collections::HashMap;
use std::io::{self, BufRead, Write};
use tracing::debug;

/// State of one headless session: an area, an engine and the current inputs.
pub struct HeadlessSession<'a> {
    snapshot: &'a AreaSnapshot,
    engine: InferenceEngine,
    inputs: HashMap<String, f64>,
}

/// Whether the session should keep reading lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

impl<'a> HeadlessSession<'a> {
    pub fn new(snapshot: &'a AreaSnapshot, engine: InferenceEngine) -> Self {
        Self {
            snapshot,
            engine,
            inputs: HashMap::new(),
        }
    }

    pub fn inputs(&self) -> &HashMap<String, f64> {
        &self.inputs
    }

    /// Handle one line of input.
    pub fn handle_line(&mut self, line: &str, out: &mut impl Write) -> io::Result<Flow> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(Flow::Continue);
        }

        if let Some(command) = line.strip_prefix('#') {
            return self.handle_command(command.trim(), out);
        }

        let mut updates = Vec::new();
        for item in line.split_whitespace() {
            match parse_assignment(item) {
                Ok(update) => updates.push(update),
                Err(e) => {
                    writeln!(out, "[ERROR] {e}")?;
                    return Ok(Flow::Continue);
                }
            }
        }
        for (name, value) in updates {
            if self.snapshot.variable_by_name(&name).is_none() {
                writeln!(out, "[WARN] {name} is not a variable of this area")?;
            }
            self.inputs.insert(name, value);
        }

        self.evaluate(out)?;
        Ok(Flow::Continue)
    }

    fn handle_command(&mut self, command: &str, out: &mut impl Write) -> io::Result<Flow> {
        debug!(command, "Headless command");
        match command {
            "quit" | "exit" => {
                writeln!(out, "Goodbye!")?;
                return Ok(Flow::Quit);
            }
            "inputs" => {
                writeln!(out, "[INPUTS]")?;
                let mut names: Vec<_> = self.inputs.iter().collect();
                names.sort_by(|a, b| a.0.cmp(b.0));
                for (name, value) in names {
                    writeln!(out, "  {name} = {value}")?;
                }
            }
            "clear" => {
                self.inputs.clear();
                writeln!(out, "[CLEARED]")?;
            }
            "rules" => {
                writeln!(out, "[RULES]")?;
                write_rules(out, self.snapshot)?;
            }
            "check" => {
                writeln!(out, "[CHECK]")?;
                write_issues(out, &check_snapshot(self.snapshot))?;
            }
            "help" => write_help(out)?,
            _ => writeln!(out, "[ERROR] Unknown command. Type #help for help.")?,
        }
        Ok(Flow::Continue)
    }

    fn evaluate(&self, out: &mut impl Write) -> io::Result<()> {
        match self.engine.evaluate_snapshot(self.snapshot, &self.inputs) {
            Ok(result) => {
                for (name, value) in &result.crisp_outputs {
                    writeln!(out, "[OUTPUT] {name} = {value:.4}")?;
                }
                if result.crisp_outputs.is_empty() {
                    writeln!(out, "[OUTPUT] (no outputs)")?;
                }
            }
            Err(e) => writeln!(out, "[ERROR] {e}")?,
        }
        Ok(())
    }
}

fn write_help(out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "[HELP]")?;
    writeln!(out, "  NAME=VALUE ... - Set inputs and evaluate")?;
    writeln!(out, "  #inputs        - Show current inputs")?;
    writeln!(out, "  #clear         - Forget all inputs")?;
    writeln!(out, "  #rules         - List the rules")?;
    writeln!(out, "  #check         - Validate the area")?;
    writeln!(out, "  #help          - Show this help")?;
    writeln!(out, "  #quit          - Exit")
}

/// Run a headless session until `#quit` or end of input.
pub fn run_headless<R: BufRead, W: Write>(
    snapshot: &AreaSnapshot,
    engine: InferenceEngine,
    input: R,
    mut out: W,
) -> io::Result<()> {
    let mut session = HeadlessSession::new(snapshot, engine);

    writeln!(out, "=== Fuzzy Headless Mode ===")?;
    writeln!(out, "Area: {}", snapshot.area.name)?;
    let names = |vars: Vec<&str>| vars.join(", ");
    writeln!(
        out,
        "Inputs: {}",
        names(snapshot.inputs().map(|v| v.name.as_str()).collect())
    )?;
    writeln!(
        out,
        "Outputs: {}",
        names(snapshot.outputs().map(|v| v.name.as_str()).collect())
    )?;
    writeln!(out)?;
    write_help(&mut out)?;
    writeln!(out)?;
    out.flush()?;

    for line in input.lines() {
        let flow = session.handle_line(&line?, &mut out)?;
        out.flush()?;
        if flow == Flow::Quit {
            break;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use fuzzy_core::testing::fan_controller;

    fn run(session: &mut HeadlessSession<'_>, line: &str) -> (Flow, String) {
        let mut out = Vec::new();
        let flow = session.handle_line(line, &mut out).unwrap();
        (flow, String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_assignments_evaluate() {
        let area = fan_controller();
        let mut session = HeadlessSession::new(&area, InferenceEngine::default());
        let (flow, text) = run(&mut session, "Temperature=80");
        assert_eq!(flow, Flow::Continue);
        assert_eq!(text, "[OUTPUT] FanSpeed = 83.3333\n");
        assert_eq!(session.inputs()["Temperature"], 80.0);
    }

    #[test]
    fn test_bad_line_changes_nothing() {
        let area = fan_controller();
        let mut session = HeadlessSession::new(&area, InferenceEngine::default());
        let (_, text) = run(&mut session, "Temperature=30 Humidity");
        assert!(text.starts_with("[ERROR]"));
        assert!(session.inputs().is_empty());
    }

    #[test]
    fn test_unknown_variable_warns() {
        let area = fan_controller();
        let mut session = HeadlessSession::new(&area, InferenceEngine::default());
        let (_, text) = run(&mut session, "Pressure=3");
        assert!(text.contains("[WARN] Pressure"));
        assert!(text.contains("[OUTPUT] FanSpeed = 0.0000"));
    }

    #[test]
    fn test_commands() {
        let area = fan_controller();
        let mut session = HeadlessSession::new(&area, InferenceEngine::default());
        run(&mut session, "Temperature=10");

        let (_, text) = run(&mut session, "#inputs");
        assert!(text.contains("Temperature = 10"));

        let (_, text) = run(&mut session, "#clear");
        assert_eq!(text, "[CLEARED]\n");
        assert!(session.inputs().is_empty());

        let (_, text) = run(&mut session, "#rules");
        assert!(text.contains("IF Temperature IS Hot THEN FanSpeed IS High"));

        let (_, text) = run(&mut session, "#check");
        assert!(text.contains("No issues found"));

        let (_, text) = run(&mut session, "#dance");
        assert!(text.starts_with("[ERROR] Unknown command"));

        let (flow, _) = run(&mut session, "#quit");
        assert_eq!(flow, Flow::Quit);
    }
}
