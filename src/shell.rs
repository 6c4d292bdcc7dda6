//! Output sink used by help rendering and dispatch reports.
//!
//! The engine never prints directly; everything goes through a `Shell`.
//! `BasicShell` writes to the terminal, `CaptureShell` keeps output in memory.

use console::{measure_text_width, style, truncate_str};
use terminal_size::{Width, terminal_size};

/// Fallback width when the terminal size cannot be detected.
pub const DEFAULT_WIDTH: usize = 80;

/// Minimal output contract consumed by the engine.
pub trait Shell {
    /// Print one line to standard output.
    fn say(&mut self, line: &str);

    /// Print an empty line.
    fn blank(&mut self) {
        self.say("");
    }

    /// Print rows as aligned columns.
    fn print_table(&mut self, rows: &[Vec<String>], indent: usize, truncate: bool);

    /// Print text wrapped to the shell width.
    fn print_wrapped(&mut self, text: &str, indent: usize);

    /// Print one line to the error stream.
    fn error(&mut self, line: &str);
}

/// Render rows as left-aligned columns separated by two spaces.
///
/// The last column is never padded and trailing blanks are dropped. With
/// `max_width`, each line is cut to that width with a trailing `...`.
pub fn render_table(rows: &[Vec<String>], indent: usize, max_width: Option<usize>) -> Vec<String> {
    let columns = rows.iter().map(Vec::len).max().unwrap_or(0);
    let mut widths = vec![0; columns];
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(measure_text_width(cell));
        }
    }

    rows.iter()
        .map(|row| {
            let mut line = " ".repeat(indent);
            for (i, cell) in row.iter().enumerate() {
                line.push_str(cell);
                if i + 1 < row.len() {
                    let pad = widths[i] - measure_text_width(cell) + 2;
                    line.push_str(&" ".repeat(pad));
                }
            }
            let line = line.trim_end().to_string();
            match max_width {
                Some(width) if measure_text_width(&line) > width => {
                    truncate_str(&line, width, "...").into_owned()
                }
                _ => line,
            }
        })
        .collect()
}

/// Wrap `text` to `width` columns, indenting every line by `indent`.
pub fn render_wrapped(text: &str, indent: usize, width: usize) -> Vec<String> {
    let prefix = " ".repeat(indent);
    let options = textwrap::Options::new(width.max(indent + 10))
        .initial_indent(&prefix)
        .subsequent_indent(&prefix);

    text.split("\n\n")
        .enumerate()
        .flat_map(|(i, paragraph)| {
            let mut lines = Vec::new();
            if i > 0 {
                lines.push(String::new());
            }
            let joined = paragraph.split_whitespace().collect::<Vec<_>>().join(" ");
            lines.extend(textwrap::wrap(&joined, &options).into_iter().map(|l| l.into_owned()));
            lines
        })
        .collect()
}

/// Terminal-backed shell writing to stdout and stderr.
#[derive(Debug, Clone)]
pub struct BasicShell {
    width: Option<usize>,
    color: bool,
}

impl BasicShell {
    /// Create a shell; `width` overrides terminal detection.
    pub fn new(width: Option<usize>, color: bool) -> Self {
        Self { width, color }
    }

    /// Configured width, else the detected terminal width, else 80.
    pub fn width(&self) -> usize {
        self.width
            .or_else(|| terminal_size().map(|(Width(w), _)| w as usize))
            .unwrap_or(DEFAULT_WIDTH)
    }
}

impl Default for BasicShell {
    fn default() -> Self {
        Self::new(None, true)
    }
}

impl Shell for BasicShell {
    fn say(&mut self, line: &str) {
        println!("{}", line);
    }

    fn print_table(&mut self, rows: &[Vec<String>], indent: usize, truncate: bool) {
        let max_width = truncate.then(|| self.width());
        for line in render_table(rows, indent, max_width) {
            println!("{}", line);
        }
    }

    fn print_wrapped(&mut self, text: &str, indent: usize) {
        for line in render_wrapped(text, indent, self.width()) {
            println!("{}", line);
        }
    }

    fn error(&mut self, line: &str) {
        if self.color {
            eprintln!("{}", style(line).red());
        } else {
            eprintln!("{}", line);
        }
    }
}

/// In-memory shell that records everything written to it.
#[derive(Debug, Clone)]
pub struct CaptureShell {
    width: usize,
    out: Vec<String>,
    err: Vec<String>,
}

impl CaptureShell {
    pub fn new() -> Self {
        Self::with_width(DEFAULT_WIDTH)
    }

    pub fn with_width(width: usize) -> Self {
        Self {
            width,
            out: Vec::new(),
            err: Vec::new(),
        }
    }

    /// Everything said so far, one line per entry, newline terminated.
    pub fn output(&self) -> String {
        join_lines(&self.out)
    }

    /// Everything written to the error stream so far.
    pub fn errors(&self) -> String {
        join_lines(&self.err)
    }

    pub fn lines(&self) -> &[String] {
        &self.out
    }

    pub fn clear(&mut self) {
        self.out.clear();
        self.err.clear();
    }
}

impl Default for CaptureShell {
    fn default() -> Self {
        Self::new()
    }
}

impl Shell for CaptureShell {
    fn say(&mut self, line: &str) {
        self.out.push(line.to_string());
    }

    fn print_table(&mut self, rows: &[Vec<String>], indent: usize, truncate: bool) {
        let max_width = truncate.then_some(self.width);
        self.out.extend(render_table(rows, indent, max_width));
    }

    fn print_wrapped(&mut self, text: &str, indent: usize) {
        self.out.extend(render_wrapped(text, indent, self.width));
    }

    fn error(&mut self, line: &str) {
        self.err.push(line.to_string());
    }
}

fn join_lines(lines: &[String]) -> String {
    lines.iter().map(|l| format!("{}\n", l)).collect()
}
