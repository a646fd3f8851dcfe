//! Operator console used for the enrollment ID handoff.

use crate::Result;
use std::collections::VecDeque;
use std::io::{self, Read, Write};

/// Where the operator reads messages and types keys.
pub trait OperatorConsole {
    /// Shows `text` to the operator verbatim.
    fn show(&mut self, text: &str) -> Result<()>;

    /// Blocks for the next key. `None` means input is closed.
    fn read_key(&mut self) -> Result<Option<u8>>;
}

impl<C: OperatorConsole + ?Sized> OperatorConsole for &mut C {
    fn show(&mut self, text: &str) -> Result<()> {
        (**self).show(text)
    }

    fn read_key(&mut self) -> Result<Option<u8>> {
        (**self).read_key()
    }
}

/// Console on the process stdin/stdout.
#[derive(Debug, Default)]
pub struct StdConsole;

impl StdConsole {
    pub fn new() -> Self {
        Self
    }
}

impl OperatorConsole for StdConsole {
    fn show(&mut self, text: &str) -> Result<()> {
        let mut out = io::stdout().lock();
        out.write_all(text.as_bytes())?;
        out.flush()?;
        Ok(())
    }

    fn read_key(&mut self) -> Result<Option<u8>> {
        let mut byte = [0u8; 1];
        loop {
            match io::stdin().lock().read(&mut byte) {
                Ok(0) => return Ok(None),
                Ok(_) => return Ok(Some(byte[0])),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
    }
}

/// Console fed from a fixed key sequence, recording everything shown.
#[derive(Debug, Default, Clone)]
pub struct ScriptedConsole {
    keys: VecDeque<u8>,
    transcript: String,
}

impl ScriptedConsole {
    /// Creates a console that will type `keys` in order, then close input.
    pub fn new(keys: impl AsRef<[u8]>) -> Self {
        Self {
            keys: keys.as_ref().iter().copied().collect(),
            transcript: String::new(),
        }
    }

    /// Returns everything shown so far.
    pub fn transcript(&self) -> &str {
        &self.transcript
    }

    /// Returns the number of keys not yet read.
    pub fn remaining_keys(&self) -> usize {
        self.keys.len()
    }
}

impl OperatorConsole for ScriptedConsole {
    fn show(&mut self, text: &str) -> Result<()> {
        self.transcript.push_str(text);
        Ok(())
    }

    fn read_key(&mut self) -> Result<Option<u8>> {
        Ok(self.keys.pop_front())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scripted_console() {
        let mut console = ScriptedConsole::new("xc");
        console.show("hello ").unwrap();
        console.show("world").unwrap();
        assert_eq!(console.transcript(), "hello world");
        assert_eq!(console.read_key().unwrap(), Some(b'x'));
        assert_eq!(console.remaining_keys(), 1);
        assert_eq!(console.read_key().unwrap(), Some(b'c'));
        assert_eq!(console.read_key().unwrap(), None);
    }

    fn show_and_read(mut console: impl OperatorConsole) -> Option<u8> {
        console.show("shown").unwrap();
        console.read_key().unwrap()
    }

    #[test]
    fn test_borrowed_console_records_into_owner() {
        let mut console = ScriptedConsole::new("c");
        assert_eq!(show_and_read(&mut console), Some(b'c'));
        assert_eq!(console.transcript(), "shown");
        assert_eq!(console.remaining_keys(), 0);
    }
}
