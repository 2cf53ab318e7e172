//! Rich output formatting for CLI

use std::fmt::Write as _;

use comfy_table::{Table, modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL};
use owo_colors::OwoColorize;
use serde_json::Value;

use crate::cli::OutputFormat;
use crate::error::{CliError, CliResult};
use crate::output::Output;

/// Format and display output based on format preference
pub struct Formatter {
    format: OutputFormat,
    colored: bool,
}

impl Formatter {
    #[must_use]
    pub fn new(format: OutputFormat, colored: bool) -> Self {
        Self { format, colored }
    }

    /// Print a command result to stdout
    pub fn display(&self, output: &Output) -> CliResult<()> {
        println!("{}", self.render(output)?);
        Ok(())
    }

    /// Render a command result in the configured format
    pub fn render(&self, output: &Output) -> CliResult<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(&output.to_json())?),
            OutputFormat::Table => Ok(render_table(output)),
            OutputFormat::Human => Ok(self.render_human(output)),
        }
    }

    /// Display error with suggestions
    pub fn display_error(&self, error: &CliError) {
        let suggestions = error.suggestions();
        if self.colored {
            eprintln!(
                "{} ({}): {}",
                "Error".bright_red().bold(),
                error.category(),
                error
            );
            if !suggestions.is_empty() {
                eprintln!("\n{}", "Suggestions:".bright_yellow().bold());
                for suggestion in suggestions {
                    eprintln!("  {} {}", "•".bright_blue(), suggestion);
                }
            }
        } else {
            eprintln!("Error ({}): {error}", error.category());
            if !suggestions.is_empty() {
                eprintln!("\nSuggestions:");
                for suggestion in suggestions {
                    eprintln!("  • {suggestion}");
                }
            }
        }
    }

    fn render_human(&self, output: &Output) -> String {
        let mut out = String::new();
        match output {
            Output::Names { title, names } => {
                if names.is_empty() {
                    return self.info(&format!("No {}", title.to_lowercase()));
                }
                self.push_header(&mut out, title);
                for name in names {
                    let _ = writeln!(out, "{}", self.item(name));
                }
                self.push_footer(&mut out, &format!("Total: {}", names.len()));
            }
            Output::Count { label, count } => {
                out.push_str(&self.key_value(label, &count.to_string()));
            }
            Output::Flag { label, value } => {
                let answer = if *value { "yes" } else { "no" };
                out.push_str(&self.key_value(label, answer));
            }
            Output::Pairs { title, pairs, .. } => {
                if pairs.is_empty() {
                    return self.info(&format!("No {}", title.to_lowercase()));
                }
                self.push_header(&mut out, title);
                for (key, value) in pairs {
                    let _ = writeln!(out, "{}", self.key_value(key, value));
                }
                self.push_footer(&mut out, &format!("Total: {}", pairs.len()));
            }
            Output::Tuples(tuples) => {
                if tuples.is_empty() {
                    return self.info("No tuples");
                }
                for members in tuples {
                    let line = members
                        .iter()
                        .map(member_summary)
                        .collect::<Vec<_>>()
                        .join(" | ");
                    let _ = writeln!(out, "{}", self.item(&line));
                }
                self.push_footer(&mut out, &format!("Total: {} tuples", tuples.len()));
            }
        }
        out.trim_end().to_string()
    }

    fn push_header(&self, out: &mut String, text: &str) {
        if self.colored {
            let _ = writeln!(out, "{}", text.bright_cyan().bold());
            let _ = writeln!(out, "{}", "=".repeat(text.len()).bright_cyan());
        } else {
            let _ = writeln!(out, "{text}");
            let _ = writeln!(out, "{}", "=".repeat(text.len()));
        }
    }

    fn push_footer(&self, out: &mut String, text: &str) {
        if self.colored {
            let _ = write!(out, "\n{}", text.bright_black());
        } else {
            let _ = write!(out, "\n{text}");
        }
    }

    fn info(&self, text: &str) -> String {
        if self.colored {
            text.bright_blue().to_string()
        } else {
            text.to_string()
        }
    }

    fn item(&self, text: &str) -> String {
        if self.colored {
            format!("  {} {}", "•".bright_blue(), text.bright_green())
        } else {
            format!("  • {text}")
        }
    }

    fn key_value(&self, key: &str, value: &str) -> String {
        if self.colored {
            format!("{}: {}", key.bright_green().bold(), value)
        } else {
            format!("{key}: {value}")
        }
    }
}

fn render_table(output: &Output) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL).apply_modifier(UTF8_ROUND_CORNERS);

    match output {
        Output::Names { names, .. } => {
            table.set_header(vec!["Name"]);
            for name in names {
                table.add_row(vec![name]);
            }
        }
        Output::Count { label, count } => {
            table.set_header(vec![label.as_str()]);
            table.add_row(vec![count.to_string()]);
        }
        Output::Flag { label, value } => {
            table.set_header(vec![label.as_str()]);
            table.add_row(vec![value.to_string()]);
        }
        Output::Pairs { headers, pairs, .. } => {
            table.set_header(headers.to_vec());
            for (key, value) in pairs {
                table.add_row(vec![key, value]);
            }
        }
        Output::Tuples(tuples) => {
            let width = tuples.iter().map(Vec::len).max().unwrap_or(0);
            table.set_header(
                (1..=width)
                    .map(|position| format!("Member {position}"))
                    .collect::<Vec<_>>(),
            );
            for members in tuples {
                table.add_row(members.iter().map(member_summary).collect::<Vec<_>>());
            }
        }
    }

    table.to_string()
}

/// One-line rendering of a member object: its name first, then the other
/// fields as compact JSON
fn member_summary(member: &Value) -> String {
    let Value::Object(fields) = member else {
        return member.to_string();
    };
    let name = fields.get("Name").and_then(Value::as_str);
    let rest = fields
        .iter()
        .filter(|(key, _)| key.as_str() != "Name")
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>();
    match (name, rest.is_empty()) {
        (Some(name), true) => name.to_string(),
        (Some(name), false) => format!("{name} ({})", rest.join(", ")),
        (None, _) => rest.join(", "),
    }
}
