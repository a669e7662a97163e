//! Human-readable status lines

use console::Style;
use std::io::{self, Write};

use super::address::Addresses;

const TITLE: &str = r#"  ____             __ _      _     _    ____ _     ___
 / ___| __ _ _ __ / _(_) ___| | __| |  / ___| |   |_ _|
| |  _ / _` | '__| |_| |/ _ \ |/ _` | | |   | |    | |
| |_| | (_| | |  |  _| |  __/ | (_| | | |___| |___ | |
 \____|\__,_|_|  |_| |_|\___|_|\__,_|  \____|_____|___|
"#;

/// Title and startup phase, written before the engine starts
pub fn write_starting(out: &mut dyn Write) -> io::Result<()> {
    let badge = Style::new().black().on_blue();
    writeln!(out, "{}", TITLE)?;
    writeln!(out, "{}  Starting development server...", badge.apply_to(" INFO "))?;
    out.flush()
}

/// Reachable addresses, written once the engine reports ready
pub fn write_ready(out: &mut dyn Write, addresses: &Addresses) -> io::Result<()> {
    let cyan = Style::new().cyan();
    writeln!(out)?;
    writeln!(out, "  App running at:")?;
    writeln!(out, "  - Local:   {}", cyan.apply_to(&addresses.local))?;
    writeln!(out, "  - Network: {}", cyan.apply_to(&addresses.network))?;
    writeln!(out)?;
    out.flush()
}
