//! Maps a machine-selector name to a concrete device assembly.

use td12_emu::Device;

use crate::device::LiveTty;

/// Builds the device list for `name`. `"basic"` is the only machine
/// currently defined: one TTY spanning the whole device window.
pub fn devices_for(name: &str) -> Result<Vec<Box<dyn Device>>, String> {
    match name {
        "basic" => Ok(vec![Box::new(LiveTty::new(0x700, 0x7ff))]),
        other => Err(format!("unknown machine '{other}'")),
    }
}
