//! Validation of scanned or hand-typed retail barcodes (EAN-8, UPC-A,
//! EAN-13).

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BarcodeError {
    #[error("barcode is empty")]
    Empty,

    #[error("barcode contains a non-digit character: {0:?}")]
    NonDigit(char),

    #[error("barcode has {0} digits; expected 8, 12 or 13")]
    InvalidLength(usize),

    #[error("barcode check digit is {found}, expected {expected}")]
    Checksum { expected: u8, found: u8 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BarcodeFormat {
    Ean8,
    UpcA,
    Ean13,
}

impl std::fmt::Display for BarcodeFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BarcodeFormat::Ean8 => write!(f, "EAN-8"),
            BarcodeFormat::UpcA => write!(f, "UPC-A"),
            BarcodeFormat::Ean13 => write!(f, "EAN-13"),
        }
    }
}

/// A barcode whose GS1 check digit has been verified.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Barcode {
    digits: String,
}

impl Barcode {
    /// Parses `code`, ignoring surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns [`BarcodeError`] for empty input, non-digits, unsupported
    /// lengths, or a wrong check digit.
    pub fn parse(code: &str) -> Result<Self, BarcodeError> {
        let code = code.trim();
        if code.is_empty() {
            return Err(BarcodeError::Empty);
        }

        let mut digits = Vec::with_capacity(code.len());
        for c in code.chars() {
            let d = c.to_digit(10).ok_or(BarcodeError::NonDigit(c))?;
            // to_digit(10) is always < 10
            digits.push(u8::try_from(d).unwrap_or(0));
        }

        if !matches!(digits.len(), 8 | 12 | 13) {
            return Err(BarcodeError::InvalidLength(digits.len()));
        }

        let Some((&found, body)) = digits.split_last() else {
            return Err(BarcodeError::Empty);
        };
        let expected = check_digit(body);
        if expected != found {
            return Err(BarcodeError::Checksum { expected, found });
        }

        Ok(Self {
            digits: code.to_string(),
        })
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.digits
    }

    #[must_use]
    pub fn format(&self) -> BarcodeFormat {
        match self.digits.len() {
            8 => BarcodeFormat::Ean8,
            12 => BarcodeFormat::UpcA,
            _ => BarcodeFormat::Ean13,
        }
    }

    /// The 13-digit form used as the product lookup key; UPC-A gains a
    /// leading zero, EAN-8 is returned unchanged.
    #[must_use]
    pub fn normalized(&self) -> String {
        match self.format() {
            BarcodeFormat::UpcA => format!("0{}", self.digits),
            BarcodeFormat::Ean8 | BarcodeFormat::Ean13 => self.digits.clone(),
        }
    }
}

impl std::fmt::Display for Barcode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.digits)
    }
}

/// GS1 mod-10: weights 3,1,3,… from the rightmost body digit.
fn check_digit(body: &[u8]) -> u8 {
    let sum: u32 = body
        .iter()
        .rev()
        .enumerate()
        .map(|(i, &d)| u32::from(d) * if i % 2 == 0 { 3 } else { 1 })
        .sum();
    u8::try_from((10 - sum % 10) % 10).unwrap_or(0)
}
