//! The device contract for the `[0x700, 0x7FF]` memory window.

/// A memory-mapped peripheral occupying an inclusive address range.
/// Dispatch is first-match-wins over the device list; reads/writes outside
/// every device's range return 0 and are silently dropped, respectively.
pub trait Device {
    /// Inclusive `[start, end]` address range this device responds to.
    fn range(&self) -> (u32, u32);

    fn contains(&self, address: u32) -> bool {
        let (start, end) = self.range();
        (start..=end).contains(&address)
    }

    fn read(&mut self, address: u32) -> u16;

    fn write(&mut self, address: u32, value: u16);
}

/// A sample TTY: low nibble `0xd` prints a sign-extended decimal, `0xe`
/// prints an unsigned decimal, `0xf` prints/reads one ASCII character.
/// Output is collected rather than written to a real terminal, so it can
/// be inspected by host drivers and tests alike.
pub struct Tty {
    start: u32,
    end: u32,
    output: String,
    input: std::collections::VecDeque<u8>,
}

impl Tty {
    pub fn new(start: u32, end: u32) -> Self {
        Self { start, end, output: String::new(), input: std::collections::VecDeque::new() }
    }

    pub fn output(&self) -> &str {
        &self.output
    }

    /// Queues bytes to be returned by subsequent character reads, for
    /// driving the device from a test or a non-interactive host.
    pub fn feed_input(&mut self, bytes: &[u8]) {
        self.input.extend(bytes);
    }
}

impl Device for Tty {
    fn range(&self) -> (u32, u32) {
        (self.start, self.end)
    }

    fn read(&mut self, address: u32) -> u16 {
        match address & 0xf {
            0xf => self.input.pop_front().unwrap_or(0) as u16,
            _ => 0,
        }
    }

    fn write(&mut self, address: u32, value: u16) {
        match address & 0xf {
            0xd => {
                let signed = if value & 0x800 != 0 {
                    (value as i32 & 0x7ff) - 0x800
                } else {
                    value as i32
                };
                self.output.push_str(&signed.to_string());
            }
            0xe => self.output.push_str(&value.to_string()),
            0xf => {
                if let Some(c) = char::from_u32((value & 0x7f) as u32) {
                    self.output.push(c);
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsigned_print_writes_decimal() {
        let mut tty = Tty::new(0x700, 0x7ff);
        tty.write(0x70e, 42);
        assert_eq!(tty.output(), "42");
    }

    #[test]
    fn signed_print_sign_extends_from_bit_eleven() {
        let mut tty = Tty::new(0x700, 0x7ff);
        tty.write(0x70d, 0xfff);
        assert_eq!(tty.output(), "-1");
    }

    #[test]
    fn char_print_writes_ascii() {
        let mut tty = Tty::new(0x700, 0x7ff);
        tty.write(0x70f, b'A' as u16);
        assert_eq!(tty.output(), "A");
    }

    #[test]
    fn char_read_drains_queued_input() {
        let mut tty = Tty::new(0x700, 0x7ff);
        tty.feed_input(b"hi");
        assert_eq!(tty.read(0x70f), b'h' as u16);
        assert_eq!(tty.read(0x70f), b'i' as u16);
        assert_eq!(tty.read(0x70f), 0);
    }
}
