use rand::Rng;

pub const CODE_LENGTH: usize = 16;
const CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

pub struct RedemptionCodeService;

impl RedemptionCodeService {
    pub fn generate_code() -> String {
        let mut rng = rand::thread_rng();
        (0..CODE_LENGTH)
            .map(|_| char::from(CODE_ALPHABET[rng.gen_range(0..CODE_ALPHABET.len())]))
            .collect()
    }

    pub fn generate_codes(count: usize) -> Vec<String> {
        (0..count).map(|_| Self::generate_code()).collect()
    }

    /// Codes are matched case-insensitively; storage is uppercase.
    pub fn normalize(code: &str) -> String {
        code.trim().to_uppercase()
    }

    pub fn is_well_formed(code: &str) -> bool {
        code.len() == CODE_LENGTH && code.bytes().all(|b| CODE_ALPHABET.contains(&b))
    }
}
