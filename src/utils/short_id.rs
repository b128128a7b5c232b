use rand::RngCore;

pub const SHORT_ID_BYTES: usize = 6;

/// 12 lowercase hex characters from the thread-local CSPRNG.
pub fn generate_short_id() -> String {
    let mut bytes = [0u8; SHORT_ID_BYTES];
    rand::rng().fill_bytes(&mut bytes);
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

#[cfg(test)]
pub fn is_short_id(value: &str) -> bool {
    value.len() == SHORT_ID_BYTES * 2
        && value
            .bytes()
            .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
}
