/*!
# Output Formatting

Serializes match results with the formatting knobs the CLI exposes:
indentation width, ASCII-only escaping, key sorting, newline style and
optional syntax highlighting for terminal output.
*/
use anyhow::Context as _;
use colored::Colorize;
use std::io::{self, ErrorKind, Write};

use crate::value::Value;

/// Newline style used between indented lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Newline {
    /// `\r\n`
    Dos,
    /// `\r`
    Mac,
    /// `\n`
    Unix,
    /// The platform convention
    #[default]
    System,
}

impl Newline {
    /// The byte sequence for this newline style.
    pub fn as_str(&self) -> &'static str {
        match self {
            Newline::Dos => "\r\n",
            Newline::Mac => "\r",
            Newline::Unix => "\n",
            Newline::System => {
                if cfg!(windows) {
                    "\r\n"
                } else {
                    "\n"
                }
            }
        }
    }
}

/// A configurable JSON writer.
#[derive(Debug, Clone)]
pub struct Formatter {
    /// Escape non-ASCII characters as `\uXXXX`
    pub ascii: bool,
    /// Spaces of indentation per level; `None` writes compact JSON
    pub indent: Option<usize>,
    /// Sort object keys lexicographically instead of insertion order
    pub sort_keys: bool,
    /// Newline style for indented output
    pub newline: Newline,
    /// Colorize output (terminals only)
    pub color: bool,
}

impl Default for Formatter {
    fn default() -> Self {
        Self {
            ascii: false,
            indent: Some(4),
            sort_keys: false,
            newline: Newline::System,
            color: false,
        }
    }
}

impl Formatter {
    /// Serialize `value` and print it to stdout, followed by a newline.
    /// Silently returns `Ok(())` on broken pipe so that piping to tools
    /// like `less` or `head` exits cleanly.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to stdout fails.
    pub fn print(&self, value: &Value) -> anyhow::Result<()> {
        let stdout = io::stdout();
        let mut writer = stdout.lock();

        let result = (|| -> io::Result<()> {
            self.write(&mut writer, value)?;
            writer.write_all(self.newline.as_str().as_bytes())?;
            writer.flush()
        })();

        match result {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::BrokenPipe => Ok(()),
            Err(err) => Err(err).context("write JSON to stdout"),
        }
    }

    /// Serialize `value` into `writer` using the formatter settings.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to `writer` fails.
    pub fn write<W: Write>(
        &self,
        writer: &mut W,
        value: &Value,
    ) -> io::Result<()> {
        self.write_value(writer, value, 0)
    }

    fn write_value<W: Write>(
        &self,
        writer: &mut W,
        value: &Value,
        depth: usize,
    ) -> io::Result<()> {
        match value {
            Value::Null => {
                if self.color {
                    write!(writer, "{}", "null".red().dimmed())
                } else {
                    write!(writer, "null")
                }
            }
            Value::Bool(b) => {
                if self.color {
                    write!(writer, "{}", b.to_string().yellow().bold())
                } else {
                    write!(writer, "{b}")
                }
            }
            Value::Number(n) => {
                if self.color {
                    write!(writer, "{}", n.to_string().yellow())
                } else {
                    write!(writer, "{n}")
                }
            }
            Value::String(s) => self.write_string(writer, s, false),
            Value::Array(items) => {
                write!(writer, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(writer, ",")?;
                    }
                    self.write_break(writer, depth + 1)?;
                    self.write_value(writer, item, depth + 1)?;
                }
                if !items.is_empty() {
                    self.write_break(writer, depth)?;
                }
                write!(writer, "]")
            }
            Value::Object(map) => {
                let mut entries: Vec<(&String, &Value)> = map.iter().collect();
                if self.sort_keys {
                    entries.sort_by(|a, b| a.0.cmp(b.0));
                }

                write!(writer, "{{")?;
                for (i, (key, item)) in entries.iter().enumerate() {
                    if i > 0 {
                        write!(writer, ",")?;
                    }
                    self.write_break(writer, depth + 1)?;
                    self.write_string(writer, key, true)?;
                    if self.indent.is_some() {
                        write!(writer, ": ")?;
                    } else {
                        write!(writer, ":")?;
                    }
                    self.write_value(writer, item, depth + 1)?;
                }
                if !entries.is_empty() {
                    self.write_break(writer, depth)?;
                }
                write!(writer, "}}")
            }
        }
    }

    /// Break the line and indent to `depth` when indenting is on.
    fn write_break<W: Write>(
        &self,
        writer: &mut W,
        depth: usize,
    ) -> io::Result<()> {
        if let Some(step) = self.indent {
            write!(writer, "{}", self.newline.as_str())?;
            write!(writer, "{:width$}", "", width = depth * step)?;
        }
        Ok(())
    }

    fn write_string<W: Write>(
        &self,
        writer: &mut W,
        s: &str,
        is_key: bool,
    ) -> io::Result<()> {
        let mut escaped = String::with_capacity(s.len() + 2);
        escaped.push('"');
        for c in s.chars() {
            match c {
                '"' => escaped.push_str("\\\""),
                '\\' => escaped.push_str("\\\\"),
                '\n' => escaped.push_str("\\n"),
                '\r' => escaped.push_str("\\r"),
                '\t' => escaped.push_str("\\t"),
                '\u{08}' => escaped.push_str("\\b"),
                '\u{0c}' => escaped.push_str("\\f"),
                c if (c as u32) < 0x20 => {
                    escaped.push_str(&format!("\\u{:04x}", c as u32));
                }
                c if self.ascii && !c.is_ascii() => {
                    // non-BMP characters escape as surrogate pairs
                    let mut units = [0u16; 2];
                    for unit in c.encode_utf16(&mut units) {
                        escaped.push_str(&format!("\\u{unit:04x}"));
                    }
                }
                c => escaped.push(c),
            }
        }
        escaped.push('"');

        if self.color {
            let painted = if is_key {
                escaped.cyan()
            } else {
                escaped.green()
            };
            write!(writer, "{painted}")
        } else {
            write!(writer, "{escaped}")
        }
    }
}
