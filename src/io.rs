//! Byte-stream console used for diagnostics.

use libc::{STDIN_FILENO, STDOUT_FILENO, c_void};

use crate::error::EndOfFile;

/// Minimal console: single bytes in, bytes, strings and integers out.
pub trait Console {
  /// Reads the next byte, or fails once the input is exhausted.
  fn read_char(&mut self) -> Result<u8, EndOfFile>;

  fn write_char(
    &mut self,
    c: u8,
  ) -> Result<(), EndOfFile>;

  fn write_string(
    &mut self,
    s: &str,
  ) -> Result<(), EndOfFile> {
    for &byte in s.as_bytes() {
      self.write_char(byte)?;
    }
    Ok(())
  }

  /// Writes `n` in decimal, without any padding.
  fn write_int(
    &mut self,
    n: i64,
  ) -> Result<(), EndOfFile> {
    self.write_string(&n.to_string())
  }
}

/// Console on the process' standard input and output file descriptors.
///
/// Writes go straight to `write(2)` without buffering.
#[derive(Debug, Default, Clone, Copy)]
pub struct Stdio;

impl Console for Stdio {
  fn read_char(&mut self) -> Result<u8, EndOfFile> {
    let mut buf = [0u8; 1];
    let read = unsafe { libc::read(STDIN_FILENO, buf.as_mut_ptr().cast::<c_void>(), 1) };
    if read > 0 { Ok(buf[0]) } else { Err(EndOfFile) }
  }

  fn write_char(
    &mut self,
    c: u8,
  ) -> Result<(), EndOfFile> {
    write_all(&[c])
  }

  fn write_string(
    &mut self,
    s: &str,
  ) -> Result<(), EndOfFile> {
    write_all(s.as_bytes())
  }
}

fn write_all(mut bytes: &[u8]) -> Result<(), EndOfFile> {
  while !bytes.is_empty() {
    let written = unsafe { libc::write(STDOUT_FILENO, bytes.as_ptr().cast::<c_void>(), bytes.len()) };
    if written <= 0 {
      return Err(EndOfFile);
    }
    bytes = &bytes[written as usize..];
  }
  Ok(())
}

/// In-memory console: reads from a fixed input, collects all output.
#[derive(Debug, Default, Clone)]
pub struct MemoryConsole {
  input: Vec<u8>,
  position: usize,
  output: Vec<u8>,
}

impl MemoryConsole {
  pub fn new(input: impl Into<Vec<u8>>) -> Self {
    Self {
      input: input.into(),
      position: 0,
      output: Vec::new(),
    }
  }

  pub fn output(&self) -> &[u8] {
    &self.output
  }

  /// Output collected so far, lossily decoded as UTF-8.
  pub fn output_string(&self) -> String {
    String::from_utf8_lossy(&self.output).into_owned()
  }
}

impl Console for MemoryConsole {
  fn read_char(&mut self) -> Result<u8, EndOfFile> {
    let byte = *self.input.get(self.position).ok_or(EndOfFile)?;
    self.position += 1;
    Ok(byte)
  }

  fn write_char(
    &mut self,
    c: u8,
  ) -> Result<(), EndOfFile> {
    self.output.push(c);
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_memory_console_read() {
    let mut console = MemoryConsole::new("ab");

    assert_eq!(console.read_char(), Ok(b'a'));
    assert_eq!(console.read_char(), Ok(b'b'));
    assert_eq!(console.read_char(), Err(EndOfFile));
    assert_eq!(console.read_char(), Err(EndOfFile));
  }

  #[test]
  fn test_memory_console_write() {
    let mut console = MemoryConsole::default();

    console.write_char(b'>').unwrap();
    console.write_string(" size ").unwrap();
    console.write_int(-42).unwrap();
    console.write_string("").unwrap();
    console.write_int(0).unwrap();

    assert_eq!(console.output(), b"> size -420");
    assert_eq!(console.output_string(), "> size -420");
  }

  #[test]
  fn test_stdio_write() {
    let mut console = Stdio;

    assert_eq!(console.write_string(""), Ok(()));
    assert_eq!(console.write_string("stdio console test\n"), Ok(()));
  }
}
