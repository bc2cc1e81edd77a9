use chrono::{DateTime, Utc};
use rand::Rng;

const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const SUFFIX_LEN: usize = 9;

/// Generates a receipt number of the form `RCP-{epoch millis}-{9 char
/// base36}`. The timestamp component sorts receipts roughly in issue
/// order; the random suffix is what actually guarantees uniqueness — the
/// storage layer still carries a unique index on `receipt_number`, and a
/// collision there is treated as transient and retried with a freshly
/// generated number.
pub fn generate_receipt_number(now: DateTime<Utc>) -> String {
    let millis = now.timestamp_millis();
    let mut rng = rand::thread_rng();
    let suffix: String = (0..SUFFIX_LEN)
        .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
        .collect();
    format!("RCP-{millis}-{suffix}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn produces_the_expected_shape() {
        let receipt = generate_receipt_number(Utc::now());
        let parts: Vec<&str> = receipt.splitn(3, '-').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "RCP");
        assert!(parts[1].parse::<i64>().is_ok());
        assert_eq!(parts[2].len(), SUFFIX_LEN);
        assert!(parts[2].chars().all(|c| c.is_ascii_alphanumeric() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn two_calls_differ() {
        let a = generate_receipt_number(Utc::now());
        let b = generate_receipt_number(Utc::now());
        assert_ne!(a, b);
    }
}
