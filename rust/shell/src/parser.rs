//! Command line tokenization and redirection extraction.

use crate::error::ShellError;

/// How redirected stdout is written to its target file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectMode {
    /// `>` — replace the target's contents.
    Overwrite,
    /// `>>` — append to the target.
    Append,
}

/// One `> file` / `>> file` pair from a command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirection {
    pub mode: RedirectMode,
    pub target: String,
}

/// A parsed command: name, arguments, redirections in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCommand {
    pub name: String,
    pub args: Vec<String>,
    pub redirections: Vec<Redirection>,
}

/// Parse a command line. Returns `Ok(None)` for a blank line.
pub fn parse_command_line(line: &str) -> Result<Option<ParsedCommand>, ShellError> {
    let tokens = tokenize(line);
    if tokens.is_empty() {
        return Ok(None);
    }

    let mut words = Vec::new();
    let mut redirections = Vec::new();
    let mut iter = tokens.into_iter();
    while let Some(token) = iter.next() {
        let mode = match token.as_str() {
            ">" => Some(RedirectMode::Overwrite),
            ">>" => Some(RedirectMode::Append),
            _ => None,
        };
        match mode {
            Some(mode) => {
                let target = iter.next().ok_or_else(ShellError::missing_redirection_target)?;
                redirections.push(Redirection { mode, target });
            }
            None => words.push(token),
        }
    }

    if words.is_empty() {
        return Err(ShellError::Syntax {
            message: "missing command".to_string(),
        });
    }

    let name = words.remove(0);
    Ok(Some(ParsedCommand {
        name,
        args: words,
        redirections,
    }))
}

/// Split a line on whitespace, keeping `"…"` and `'…'` quoted spans
/// together with the quotes stripped. An unclosed quote runs to the
/// end of the line.
#[must_use]
pub fn tokenize(line: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_token = false;
    let mut quote: Option<char> = None;

    for character in line.chars() {
        match quote {
            Some(open) => {
                if character == open {
                    quote = None;
                } else {
                    current.push(character);
                }
            }
            None => match character {
                '"' | '\'' => {
                    quote = Some(character);
                    in_token = true;
                }
                c if c.is_whitespace() => {
                    if in_token {
                        tokens.push(std::mem::take(&mut current));
                        in_token = false;
                    }
                }
                c => {
                    current.push(c);
                    in_token = true;
                }
            },
        }
    }
    if in_token {
        tokens.push(current);
    }
    tokens
}
