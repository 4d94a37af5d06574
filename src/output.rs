// SPDX-License-Identifier: MIT OR Apache-2.0

//! Output helpers shared by the CLI commands.

use anyhow::Result;
use serde::Serialize;

/// Print a value as JSON to stdout, pretty unless compact is requested.
pub fn print_json<T: Serialize>(value: &T, compact: bool) -> Result<()> {
    let rendered = if compact {
        serde_json::to_string(value)?
    } else {
        serde_json::to_string_pretty(value)?
    };
    println!("{rendered}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compact_json_has_no_newlines() {
        let value = vec![1, 2, 3];
        assert_eq!(serde_json::to_string(&value).unwrap(), "[1,2,3]");
        // print_json itself just writes; shape is what matters here.
        assert!(print_json(&value, true).is_ok());
    }
}
