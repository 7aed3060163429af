//! Redemption voucher codes and typed policy failures.
//!
//! Codes are short human-transcribable strings ("CVT-XXXX-XXXX") drawn from
//! an alphabet without ambiguous characters (no 0/O, 1/I/L). Global
//! uniqueness is enforced by the database unique constraint; the repository
//! retries generation on collision.

use rand::Rng;

/// Prefix for all redemption codes.
pub const CODE_PREFIX: &str = "CVT";

/// Characters used in voucher codes. Excludes 0/O and 1/I/L.
const CODE_ALPHABET: &[u8] = b"23456789ABCDEFGHJKMNPQRSTUVWXYZ";

/// Number of random groups in a code.
const CODE_GROUPS: usize = 2;

/// Characters per group.
const CODE_GROUP_LEN: usize = 4;

/// Typed policy failures for `Redeem`.
///
/// These are expected outcomes surfaced to the caller, not system failures;
/// none of them leaves any mutation behind.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RedemptionError {
    #[error("insufficient points: balance {balance}, item costs {cost}")]
    InsufficientPoints { balance: i64, cost: i64 },

    #[error("reward item is out of stock")]
    OutOfStock,
}

/// Typed policy failures for `ValidateVoucher`.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum VoucherValidationError {
    #[error("voucher code has already been used")]
    AlreadyUsed,

    #[error("unknown voucher code")]
    UnknownCode,
}

/// Generate a fresh redemption code, e.g. `CVT-7K3M-Q2XF`.
pub fn generate_code() -> String {
    let mut rng = rand::rng();
    let mut code = String::with_capacity(CODE_PREFIX.len() + CODE_GROUPS * (CODE_GROUP_LEN + 1));
    code.push_str(CODE_PREFIX);
    for _ in 0..CODE_GROUPS {
        code.push('-');
        for _ in 0..CODE_GROUP_LEN {
            let idx = rng.random_range(0..CODE_ALPHABET.len());
            code.push(CODE_ALPHABET[idx] as char);
        }
    }
    code
}

/// Whether a string has the shape of a redemption code.
///
/// Shape only; existence and status are checked against the database.
pub fn is_well_formed_code(code: &str) -> bool {
    let mut parts = code.split('-');
    if parts.next() != Some(CODE_PREFIX) {
        return false;
    }
    let groups: Vec<&str> = parts.collect();
    groups.len() == CODE_GROUPS
        && groups.iter().all(|g| {
            g.len() == CODE_GROUP_LEN && g.bytes().all(|b| CODE_ALPHABET.contains(&b))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_codes_are_well_formed() {
        for _ in 0..100 {
            let code = generate_code();
            assert!(is_well_formed_code(&code), "bad code: {code}");
        }
    }

    #[test]
    fn generated_codes_avoid_ambiguous_characters() {
        for _ in 0..100 {
            let code = generate_code();
            for c in ['0', 'O', '1', 'I', 'L'] {
                assert!(
                    !code[CODE_PREFIX.len()..].contains(c),
                    "code {code} contains ambiguous char {c}"
                );
            }
        }
    }

    #[test]
    fn malformed_codes_rejected() {
        assert!(!is_well_formed_code(""));
        assert!(!is_well_formed_code("CVT"));
        assert!(!is_well_formed_code("CVT-ABCD"));
        assert!(!is_well_formed_code("XYZ-ABCD-EFGH"));
        assert!(!is_well_formed_code("CVT-AB-CDEFGH"));
        assert!(!is_well_formed_code("CVT-ABC0-EFGH")); // ambiguous '0'
        assert!(!is_well_formed_code("cvt-abcd-efgh")); // lowercase
    }

    #[test]
    fn well_formed_code_accepted() {
        assert!(is_well_formed_code("CVT-7K3M-Q2XF"));
    }

    #[test]
    fn error_messages_are_user_facing() {
        let err = RedemptionError::InsufficientPoints {
            balance: 40,
            cost: 50,
        };
        assert_eq!(
            err.to_string(),
            "insufficient points: balance 40, item costs 50"
        );
        assert_eq!(
            VoucherValidationError::AlreadyUsed.to_string(),
            "voucher code has already been used"
        );
    }
}
