use rand::{Rng, RngCore};

const CODE_MIN: u32 = 100_000;
const CODE_MAX: u32 = 999_999;
const RESET_TOKEN_BYTES: usize = 32;

/// Six ASCII digits, uniform over [100000, 999999].
pub fn generate_verification_code() -> String {
    rand::rng().random_range(CODE_MIN..=CODE_MAX).to_string()
}

/// 256 bits from the thread-local CSPRNG, hex encoded (64 chars).
pub fn generate_reset_token() -> String {
    let mut bytes = [0u8; RESET_TOKEN_BYTES];
    rand::rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}
