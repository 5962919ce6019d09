//! Verification-code generation and expiry timestamps.

use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use rand::{distributions::Alphanumeric, Rng};

/// Wire format for grant code expiries. Fixed for interoperability with
/// already-stored data; do not change.
pub const EXPIRY_FORMAT: &str = "%Y/%m/%d %H:%M:%S";

/// How long a verification code stays valid.
pub const CODE_TTL_MINUTES: i64 = 5;

const SECURE_CODE_LEN: usize = 8;

/// Code-generation strategy for a grant.
///
/// Both strategies are deliberately explicit: the single-assignment
/// enrollment path (and password reset) issue high-entropy codes, while
/// the batch path issues the classic six-digit numeric codes.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CodeGenerator {
    /// Random alphanumeric code.
    Secure,
    /// Numeric code in `100000..=999999`.
    SixDigit,
}

impl CodeGenerator {
    /// Produce a fresh one-time code.
    pub fn generate(&self) -> String {
        let mut rng = rand::thread_rng();
        match self {
            CodeGenerator::Secure => (&mut rng)
                .sample_iter(&Alphanumeric)
                .take(SECURE_CODE_LEN)
                .map(char::from)
                .collect(),
            CodeGenerator::SixDigit => rng.gen_range(100_000..=999_999).to_string(),
        }
    }
}

/// The expiry timestamp for a code issued at `now`.
pub fn expiry_timestamp(now: DateTime<Utc>) -> String {
    (now + Duration::minutes(CODE_TTL_MINUTES))
        .format(EXPIRY_FORMAT)
        .to_string()
}

/// Parse a stored expiry. `None` for anything that does not match the
/// fixed format, including the empty string of a consumed code; callers
/// treat that as "no expiry".
pub fn parse_expiry(raw: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw, EXPIRY_FORMAT).ok()
}
