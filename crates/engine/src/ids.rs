use infraviz_stack_store::unix_ms_now;
use std::fmt::Write;

/// Opaque 10-character lowercase hex token identifying a stack.
///
/// Generated fresh per create call and reused by the caller for every
/// subsequent update/deploy referencing the same stack.
pub fn new_stack_id() -> String {
    let mut bytes = [0u8; 5];
    match getrandom::getrandom(&mut bytes) {
        Ok(()) => hex_encode_lower(&bytes),
        Err(err) => {
            log::warn!("getrandom unavailable ({err}); deriving stack id from clock");
            format!("{:010x}", unix_ms_now() & 0xff_ffff_ffff)
        }
    }
}

fn hex_encode_lower(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len().saturating_mul(2));
    for b in bytes {
        let _ = write!(out, "{b:02x}");
    }
    out
}
