use fpdiff::{decode_bits, format_single};

use crate::cli::{EXIT_FAILURE, EXIT_SUCCESS};
use crate::terminal;

/// Decode each bit pattern; fails if any pattern is invalid.
pub fn cmd_decode(patterns: &[String]) -> i32 {
    let mut exit_code = EXIT_SUCCESS;
    for pattern in patterns {
        match decode_bits(pattern) {
            Ok(value) => println!("{pattern}: {} = {value:e}", format_single(value)),
            Err(err) => {
                terminal::error(&err.to_string());
                exit_code = EXIT_FAILURE;
            }
        }
    }
    exit_code
}
