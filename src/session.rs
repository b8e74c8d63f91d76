//! Sequential command loop: read a line, run it through the facade, report.
//!
//! The input may start with a bare integer line giving the number of
//! commands to process; without it every non-blank line is a command.

use std::io::{BufRead, Lines, Write};

use serde::Serialize;
use tracing::info;

use crate::command::Command;
use crate::config::OutputFormat;
use crate::error::{Error, Result};
use crate::facade::{CommandFacade, Outcome};

/// Non-blank command lines of a stream, honouring an optional count header.
pub struct CommandLines<R> {
    lines: Lines<R>,
    line_no: usize,
    header_checked: bool,
    remaining: Option<usize>,
}

impl<R: BufRead> CommandLines<R> {
    pub fn new(reader: R) -> Self {
        CommandLines {
            lines: reader.lines(),
            line_no: 0,
            header_checked: false,
            remaining: None,
        }
    }
}

impl<R: BufRead> Iterator for CommandLines<R> {
    /// 1-based physical line number and the line text
    type Item = Result<(usize, String)>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.remaining == Some(0) {
                return None;
            }
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(e) => return Some(Err(Error::Io(e))),
            };
            self.line_no += 1;

            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            if !self.header_checked {
                self.header_checked = true;
                if trimmed.bytes().all(|b| b.is_ascii_digit()) {
                    if let Ok(count) = trimmed.parse::<usize>() {
                        self.remaining = Some(count);
                        continue;
                    }
                }
            }
            if let Some(remaining) = self.remaining.as_mut() {
                *remaining -= 1;
            }
            return Some(Ok((self.line_no, trimmed.to_string())));
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub processed: usize,
    pub applied: usize,
    pub rejected: usize,
}

#[derive(Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
enum Report<'a> {
    Ok { line: usize, outcome: &'a Outcome },
    Error { line: usize, error: String },
}

/// Human rendering of a rejected command.
///
/// Unknown verbs print the bare ` No such command!` line, leading space
/// included; every other rejection is `Error: <message>.`.
pub fn render_error(error: &Error) -> String {
    match error {
        Error::UnknownCommand(_) => " No such command!".to_string(),
        _ => format!("Error: {}.", error),
    }
}

fn write_report<W: Write>(
    writer: &mut W,
    format: OutputFormat,
    line: usize,
    result: &Result<Outcome>,
) -> Result<()> {
    match format {
        OutputFormat::Human => match result {
            Ok(outcome) => writeln!(writer, "{}", outcome)?,
            Err(e) => writeln!(writer, "{}", render_error(e))?,
        },
        OutputFormat::Json => {
            let report = match result {
                Ok(outcome) => Report::Ok { line, outcome },
                Err(e) => Report::Error {
                    line,
                    error: e.to_string(),
                },
            };
            let json = serde_json::to_string(&report)
                .map_err(|e| Error::Output(format!("Failed to serialize JSON: {}", e)))?;
            writeln!(writer, "{}", json)?;
        }
    }
    Ok(())
}

/// Runs a command stream against one facade.
pub struct Session<'a> {
    facade: &'a mut CommandFacade,
    format: OutputFormat,
}

impl<'a> Session<'a> {
    pub fn new(facade: &'a mut CommandFacade, format: OutputFormat) -> Self {
        Session { facade, format }
    }

    /// Execute one line and write its report.
    pub fn process_line<W: Write>(
        &mut self,
        line_no: usize,
        line: &str,
        writer: &mut W,
    ) -> Result<bool> {
        let result = match Command::parse(line).and_then(|command| self.facade.execute(&command)) {
            Err(e) if !e.is_recoverable() => return Err(e),
            other => other,
        };
        if let Err(e) = &result {
            info!(line = line_no, error = %e, "command rejected");
        }
        write_report(writer, self.format, line_no, &result)?;
        Ok(result.is_ok())
    }

    /// Process every command of `reader`, writing one report per command.
    ///
    /// Rejected commands are reported and skipped; only I/O and output
    /// failures end the run early.
    pub fn run<R: BufRead, W: Write>(&mut self, reader: R, mut writer: W) -> Result<RunSummary> {
        let mut summary = RunSummary::default();

        for entry in CommandLines::new(reader) {
            let (line_no, line) = entry?;
            summary.processed += 1;
            if self.process_line(line_no, &line, &mut writer)? {
                summary.applied += 1;
            } else {
                summary.rejected += 1;
            }
        }
        writer.flush()?;

        info!(
            processed = summary.processed,
            applied = summary.applied,
            rejected = summary.rejected,
            accounts = self.facade.ledger().len(),
            "session finished"
        );
        Ok(summary)
    }
}

/// Parse a stream without executing it. Returns every line that fails to parse.
pub fn check<R: BufRead>(reader: R) -> Result<Vec<(usize, Error)>> {
    let mut problems = Vec::new();
    for entry in CommandLines::new(reader) {
        let (line_no, line) = entry?;
        if let Err(e) = Command::parse(&line) {
            problems.push((line_no, e));
        }
    }
    Ok(problems)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(input: &str, format: OutputFormat) -> (String, RunSummary) {
        let mut facade = CommandFacade::new();
        let mut out = Vec::new();
        let summary = Session::new(&mut facade, format)
            .run(input.as_bytes(), &mut out)
            .unwrap();
        (String::from_utf8(out).unwrap(), summary)
    }

    #[test]
    fn test_count_header_limits_commands() {
        let input = "2\nCreate Account Savings Alice 100\nDeposit Alice 50\nView Alice\n";
        let (out, summary) = run(input, OutputFormat::Human);

        assert_eq!(summary.processed, 2);
        assert_eq!(out.lines().count(), 2);
        assert!(!out.contains("Alice's Account"));
    }

    #[test]
    fn test_without_header_all_lines_run() {
        let input = "Create Account Savings Alice 100\n\nDeposit Alice 50\nView Alice\n";
        let (out, summary) = run(input, OutputFormat::Human);

        assert_eq!(summary, RunSummary { processed: 3, applied: 3, rejected: 0 });
        assert_eq!(
            out.lines().last().unwrap(),
            "Alice's Account: Type: Savings, Balance: $150.000, State: Active, Transactions: [Initial Deposit $100.000, Deposit $50.000]."
        );
    }

    #[test]
    fn test_rejections_are_reported_and_skipped() {
        let input = "Deposit Ghost 5\nFly away\nCreate Account Checking Bob 10\nWithdraw Bob 20\n";
        let (out, summary) = run(input, OutputFormat::Human);

        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "Error: Account Ghost does not exist.");
        assert_eq!(lines[1], " No such command!");
        assert_eq!(lines[3], "Error: Insufficient funds for Bob.");
        assert_eq!(summary, RunSummary { processed: 4, applied: 1, rejected: 3 });
    }

    #[test]
    fn test_out_of_range_amounts_do_not_stop_the_run() {
        let tiny = format!("0.{}1", "0".repeat(39));
        let input = format!(
            "Create Account Savings A 100\nWithdraw A 99999999999999999\nDeposit A {}\n",
            tiny
        );
        let (out, summary) = run(&input, OutputFormat::Human);

        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[1], "Error: Amount 99999999999999999 is out of range.");
        assert_eq!(lines[2], "A successfully deposited $0.000. New Balance: $100.000.");
        assert_eq!(summary, RunSummary { processed: 3, applied: 2, rejected: 1 });
    }

    #[test]
    fn test_json_reports() {
        let input = "Create Account Checking Bob 100\nWithdraw Bob 40\nView Carol\n";
        let (out, _) = run(input, OutputFormat::Json);
        let reports: Vec<serde_json::Value> = out
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();

        assert_eq!(reports[0]["status"], "ok");
        assert_eq!(reports[0]["outcome"]["kind"], "created");
        assert_eq!(reports[1]["outcome"]["net"], "39.200");
        assert_eq!(reports[2]["status"], "error");
        assert_eq!(reports[2]["line"], 3);
        assert_eq!(reports[2]["error"], "Account Carol does not exist");
    }

    #[test]
    fn test_line_numbers_count_blank_lines_and_header() {
        let lines: Vec<(usize, String)> = CommandLines::new("3\n\nView A\n  \nView B\n".as_bytes())
            .map(|r| r.unwrap())
            .collect();
        assert_eq!(lines, vec![(3, "View A".to_string()), (5, "View B".to_string())]);
    }

    #[test]
    fn test_check_reports_parse_errors_only() {
        let input = "Deposit Ghost 5\nDeposit Ghost five\nJump\n";
        let problems = check(input.as_bytes()).unwrap();

        assert_eq!(problems.len(), 2);
        assert_eq!(problems[0].0, 2);
        assert!(matches!(problems[1].1, Error::UnknownCommand(_)));
    }

    #[test]
    fn test_unknown_verb_keeps_name_outside_human_output() {
        let (out, _) = run("Fly away\n", OutputFormat::Json);
        let report: serde_json::Value = serde_json::from_str(out.trim()).unwrap();
        assert_eq!(report["error"], "No such command Fly");

        let error = Error::UnknownCommand("Fly".to_string());
        assert_eq!(render_error(&error), " No such command!");
        assert_eq!(
            render_error(&Error::AccountInactive("Bob".to_string())),
            "Error: Account Bob is inactive."
        );
    }
}
