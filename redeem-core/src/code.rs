//! Redemption code model and the guessability filter

use std::fmt::{self, Write as _};
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{RedeemError, Result};

/// Digits allowed in a code (zero is excluded).
pub const DIGITS: &[u8] = b"123456789";

/// Letters allowed in a code.
pub const LETTERS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Code length: digit-letter-digit-letter-digit.
pub const CODE_LEN: usize = 5;

/// A 5-character redemption code in digit-letter-digit-letter-digit form
/// over digits `1-9` and uppercase `A-Z`.
///
/// Codes are immutable once constructed; every constructor validates the
/// pattern, so a `Code` value is always well-formed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Code([u8; CODE_LEN]);

impl Code {
    /// Parse and validate a code from text.
    pub fn new(text: &str) -> Result<Self> {
        let bytes = text.as_bytes();
        if bytes.len() != CODE_LEN {
            return Err(RedeemError::InvalidCode {
                text: text.to_string(),
                reason: "length must be 5 characters",
            });
        }

        let mut buf = [0u8; CODE_LEN];
        buf.copy_from_slice(bytes);
        for (i, &b) in buf.iter().enumerate() {
            if i % 2 == 0 {
                if !(b'1'..=b'9').contains(&b) {
                    return Err(RedeemError::InvalidCode {
                        text: text.to_string(),
                        reason: "positions 1, 3 and 5 must be digits 1-9",
                    });
                }
            } else if !b.is_ascii_uppercase() {
                return Err(RedeemError::InvalidCode {
                    text: text.to_string(),
                    reason: "positions 2 and 4 must be letters A-Z",
                });
            }
        }
        Ok(Self(buf))
    }

    /// Draw one random candidate code from the full pattern space.
    pub fn sample<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut buf = [0u8; CODE_LEN];
        for (i, slot) in buf.iter_mut().enumerate() {
            let alphabet = if i % 2 == 0 { DIGITS } else { LETTERS };
            *slot = alphabet[rng.gen_range(0..alphabet.len())];
        }
        Self(buf)
    }

    /// Raw ASCII bytes of the code.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Whether the code is too memorable to issue.
    ///
    /// A code is easy when any of these holds:
    /// 1. all three digits are equal,
    /// 2. both letters are equal,
    /// 3. the digits form a step-1 ascending or descending run.
    pub fn is_easy(&self) -> bool {
        let d = [self.0[0] - b'0', self.0[2] - b'0', self.0[4] - b'0'];
        let (x1, x2) = (self.0[1], self.0[3]);

        if d[0] == d[1] && d[1] == d[2] {
            return true;
        }
        if x1 == x2 {
            return true;
        }
        let ascending = d[1] == d[0] + 1 && d[2] == d[1] + 1;
        let descending = d[0] == d[1] + 1 && d[1] == d[2] + 1;
        ascending || descending
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &b in &self.0 {
            f.write_char(b as char)?;
        }
        Ok(())
    }
}

impl FromStr for Code {
    type Err = RedeemError;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl TryFrom<String> for Code {
    type Error = RedeemError;

    fn try_from(s: String) -> Result<Self> {
        Self::new(&s)
    }
}

impl From<Code> for String {
    fn from(code: Code) -> Self {
        code.to_string()
    }
}
