//! Console input and output
//!
//! All shell text goes through [`Console`] so commands never print
//! directly. Styling is applied only when stdout is a terminal; piped
//! output stays plain with textual prefixes instead. The reading side
//! is the [`LineReader`] port, letting tests script a session.

use std::io::{self, Write};

use crossterm::style::Stylize;
use crossterm::tty::IsTty;

/// Writer side of the shell
pub struct Console {
    out: Box<dyn Write>,
    err: Box<dyn Write>,
    styled: bool,
    verbose: bool,
    tracing: bool,
}

impl Console {
    /// Console on the process stdio, styled when stdout is a terminal
    pub fn stdio() -> Self {
        let styled = io::stdout().is_tty();
        Self {
            out: Box::new(io::stdout()),
            err: Box::new(io::stderr()),
            styled,
            verbose: false,
            tracing: false,
        }
    }

    /// Unstyled console over arbitrary writers
    pub fn with_writers(out: Box<dyn Write>, err: Box<dyn Write>) -> Self {
        Self {
            out,
            err,
            styled: false,
            verbose: false,
            tracing: false,
        }
    }

    pub fn set_verbose(&mut self, on: bool) {
        self.verbose = on;
    }

    pub fn set_tracing(&mut self, on: bool) {
        self.tracing = on;
    }

    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    pub fn is_tracing(&self) -> bool {
        self.tracing
    }

    /// Plain line on stdout
    pub fn info(&mut self, message: &str) {
        let _ = writeln!(self.out, "{}", message);
    }

    /// Emphasized line on stdout
    pub fn bold_info(&mut self, message: &str) {
        if self.styled {
            let _ = writeln!(self.out, "{}", message.bold());
        } else {
            let _ = writeln!(self.out, "{}", message);
        }
    }

    /// Success line on stdout
    pub fn bold_green(&mut self, message: &str) {
        if self.styled {
            let _ = writeln!(self.out, "{}", message.green().bold());
        } else {
            let _ = writeln!(self.out, "{}", message);
        }
    }

    /// Error line on stderr
    pub fn error(&mut self, message: &str) {
        let line = format!("Error: {}", message);
        if self.styled {
            let _ = writeln!(self.err, "{}", line.red().bold());
        } else {
            let _ = writeln!(self.err, "{}", line);
        }
    }

    /// Warning line on stderr
    pub fn warn(&mut self, message: &str) {
        let line = format!("Warning: {}", message);
        if self.styled {
            let _ = writeln!(self.err, "{}", line.yellow());
        } else {
            let _ = writeln!(self.err, "{}", line);
        }
    }

    /// Progress detail, shown only in verbose mode
    pub fn verbose(&mut self, message: &str) {
        if self.verbose {
            let _ = writeln!(self.out, "{}", message);
        }
    }

    /// Diagnostic detail, shown only when tracing is on
    pub fn trace(&mut self, message: &str) {
        if !self.tracing {
            return;
        }
        let line = format!("[trace] {}", message);
        if self.styled {
            let _ = writeln!(self.err, "{}", line.dim());
        } else {
            let _ = writeln!(self.err, "{}", line);
        }
    }

    /// Clears the screen and homes the cursor
    pub fn clear_screen(&mut self) {
        use crossterm::cursor::MoveTo;
        use crossterm::terminal::{Clear, ClearType};

        let _ = crossterm::execute!(self.out, Clear(ClearType::All), MoveTo(0, 0));
    }

    /// Reads a line without echoing it. Falls back to a plain read when
    /// stdin is not a terminal.
    pub fn read_secret(&mut self, prompt: &str) -> io::Result<String> {
        use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
        use crossterm::terminal;

        if !io::stdin().is_tty() {
            let mut line = String::new();
            io::stdin().read_line(&mut line)?;
            return Ok(line.trim_end_matches(['\r', '\n']).to_string());
        }

        write!(self.out, "{}", prompt)?;
        self.out.flush()?;

        terminal::enable_raw_mode()?;
        let mut secret = String::new();
        let outcome = loop {
            match event::read() {
                Ok(Event::Key(key)) if key.kind != KeyEventKind::Release => match key.code {
                    KeyCode::Enter => break Ok(std::mem::take(&mut secret)),
                    KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                        break Err(io::Error::new(io::ErrorKind::Interrupted, "cancelled"));
                    }
                    KeyCode::Char(c) => {
                        secret.push(c);
                        let _ = write!(self.out, "*");
                        let _ = self.out.flush();
                    }
                    KeyCode::Backspace => {
                        if secret.pop().is_some() {
                            let _ = write!(self.out, "\u{8} \u{8}");
                            let _ = self.out.flush();
                        }
                    }
                    _ => {}
                },
                Ok(_) => {}
                Err(e) => break Err(e),
            }
        };
        let _ = terminal::disable_raw_mode();
        let _ = writeln!(self.out);
        outcome
    }
}

/// Reader side of the shell
pub trait LineReader {
    /// Prompts and reads one line; `None` means end of input
    fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>>;
}

/// Interactive reader on process stdin
pub struct StdinReader;

impl LineReader for StdinReader {
    fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>> {
        let mut out = io::stdout();
        write!(out, "{}", prompt)?;
        out.flush()?;

        let mut line = String::new();
        if io::stdin().read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }
}

/// Reader fed from a fixed list of lines
#[cfg(test)]
pub struct ScriptedReader {
    lines: std::collections::VecDeque<String>,
}

#[cfg(test)]
impl ScriptedReader {
    pub fn new(lines: &[&str]) -> Self {
        Self {
            lines: lines.iter().map(|l| l.to_string()).collect(),
        }
    }
}

#[cfg(test)]
impl LineReader for ScriptedReader {
    fn read_line(&mut self, _prompt: &str) -> io::Result<Option<String>> {
        Ok(self.lines.pop_front())
    }
}

/// Cloneable in-memory writer used to capture console channels in tests
#[cfg(test)]
#[derive(Clone, Default)]
pub struct SharedBuf(std::rc::Rc<std::cell::RefCell<Vec<u8>>>);

#[cfg(test)]
impl SharedBuf {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.borrow()).to_string()
    }
}

#[cfg(test)]
impl Write for SharedBuf {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn captured() -> (Console, SharedBuf, SharedBuf) {
        let out = SharedBuf::default();
        let err = SharedBuf::default();
        let console = Console::with_writers(Box::new(out.clone()), Box::new(err.clone()));
        (console, out, err)
    }

    #[test]
    fn info_goes_to_stdout() {
        let (mut console, out, err) = captured();
        console.info("hello");
        assert_eq!(out.contents(), "hello\n");
        assert_eq!(err.contents(), "");
    }

    #[test]
    fn errors_and_warnings_go_to_stderr_with_prefixes() {
        let (mut console, out, err) = captured();
        console.error("broke");
        console.warn("wobbly");
        assert_eq!(out.contents(), "");
        assert_eq!(err.contents(), "Error: broke\nWarning: wobbly\n");
    }

    #[test]
    fn verbose_is_gated() {
        let (mut console, out, _err) = captured();
        console.verbose("quiet");
        console.set_verbose(true);
        console.verbose("loud");
        assert_eq!(out.contents(), "loud\n");
    }

    #[test]
    fn trace_is_gated_on_tracing() {
        let (mut console, _out, err) = captured();
        console.trace("hidden");
        console.set_tracing(true);
        console.trace("shown");
        assert_eq!(err.contents(), "[trace] shown\n");
    }

    #[test]
    fn scripted_reader_drains_and_ends() {
        let mut reader = ScriptedReader::new(&["help", "quit"]);
        assert_eq!(reader.read_line("> ").unwrap(), Some("help".to_string()));
        assert_eq!(reader.read_line("> ").unwrap(), Some("quit".to_string()));
        assert_eq!(reader.read_line("> ").unwrap(), None);
    }
}
