// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Brazilian taxpayer identifier (CPF/CNPJ) validation.
//!
//! Both identifiers end in two check digits computed from weighted sums
//! modulo 11. Everything in this module is pure: no I/O, no panics, and
//! malformed input simply fails validation.

use serde::{Deserialize, Serialize};

/// Number of digits in a CPF (individual taxpayer id).
const CPF_LENGTH: usize = 11;

/// Number of digits in a CNPJ (company taxpayer id).
const CNPJ_LENGTH: usize = 14;

/// Weights for the first CNPJ check digit.
const CNPJ_FIRST_WEIGHTS: [u32; 12] = [5, 4, 3, 2, 9, 8, 7, 6, 5, 4, 3, 2];

/// Weights for the second CNPJ check digit.
const CNPJ_SECOND_WEIGHTS: [u32; 13] = [6, 5, 4, 3, 2, 9, 8, 7, 6, 5, 4, 3, 2];

/// Placeholder numbers with matching check digits that are never issued.
const KNOWN_PLACEHOLDERS: [&str; 3] = ["12345678909", "98765432100", "12345678000195"];

/// The kind of taxpayer identifier, decided by digit count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaxIdKind {
    /// Cadastro de Pessoas Físicas (11 digits).
    Cpf,
    /// Cadastro Nacional da Pessoa Jurídica (14 digits).
    Cnpj,
}

impl TaxIdKind {
    /// Returns the short display name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Cpf => "CPF",
            Self::Cnpj => "CNPJ",
        }
    }
}

impl std::fmt::Display for TaxIdKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Strips every non-digit character from a document string.
///
/// `"111.444.777-35"` becomes `"11144477735"`.
#[must_use]
pub fn normalize_tax_id(document: &str) -> String {
    document.chars().filter(char::is_ascii_digit).collect()
}

/// Classifies a document by its digit count.
///
/// This does not validate check digits; it only tells which algorithm
/// would apply.
#[must_use]
pub fn tax_id_kind(document: &str) -> Option<TaxIdKind> {
    match normalize_tax_id(document).len() {
        CPF_LENGTH => Some(TaxIdKind::Cpf),
        CNPJ_LENGTH => Some(TaxIdKind::Cnpj),
        _ => None,
    }
}

/// Validates a CPF or CNPJ.
///
/// Punctuation is ignored. Eleven digits are checked as a CPF, fourteen as a
/// CNPJ; any other length is invalid. Strings made of a single repeated digit
/// are invalid even when their check digits happen to match.
///
/// # Arguments
///
/// * `document` - Free-form input, digits plus optional punctuation
///
/// # Returns
///
/// `true` only if both check digits are correct.
#[must_use]
pub fn is_valid_tax_id(document: &str) -> bool {
    let normalized: String = normalize_tax_id(document);
    let digits: Vec<u32> = normalized.chars().filter_map(|c| c.to_digit(10)).collect();

    if digits.windows(2).all(|pair| pair[0] == pair[1]) {
        return false;
    }

    if KNOWN_PLACEHOLDERS.contains(&normalized.as_str()) {
        return false;
    }

    match digits.len() {
        CPF_LENGTH => is_valid_cpf_digits(&digits),
        CNPJ_LENGTH => is_valid_cnpj_digits(&digits),
        _ => false,
    }
}

/// Formats a valid CPF/CNPJ with its canonical punctuation.
///
/// Returns `None` when the document does not validate.
#[must_use]
pub fn format_tax_id(document: &str) -> Option<String> {
    if !is_valid_tax_id(document) {
        return None;
    }

    let d: String = normalize_tax_id(document);
    match d.len() {
        CPF_LENGTH => Some(format!(
            "{}.{}.{}-{}",
            &d[0..3],
            &d[3..6],
            &d[6..9],
            &d[9..11]
        )),
        CNPJ_LENGTH => Some(format!(
            "{}.{}.{}/{}-{}",
            &d[0..2],
            &d[2..5],
            &d[5..8],
            &d[8..12],
            &d[12..14]
        )),
        _ => None,
    }
}

/// Maps a weighted-sum remainder to a check digit.
///
/// Remainders 0 and 1 give 0, anything else gives `11 - remainder`.
const fn check_digit_from_remainder(remainder: u32) -> u32 {
    if remainder < 2 { 0 } else { 11 - remainder }
}

/// Computes a CPF check digit over `digits` using descending weights
/// that start at `digits.len() + 1` and end at 2.
fn cpf_check_digit(digits: &[u32]) -> u32 {
    let first_weight: u32 = u32::try_from(digits.len() + 1).unwrap_or(u32::MAX);
    let sum: u32 = digits
        .iter()
        .zip((2..=first_weight).rev())
        .map(|(digit, weight)| digit * weight)
        .sum();
    check_digit_from_remainder(sum % 11)
}

fn cnpj_check_digit(digits: &[u32], weights: &[u32]) -> u32 {
    let sum: u32 = digits
        .iter()
        .zip(weights)
        .map(|(digit, weight)| digit * weight)
        .sum();
    check_digit_from_remainder(sum % 11)
}

fn is_valid_cpf_digits(digits: &[u32]) -> bool {
    let first: u32 = cpf_check_digit(&digits[..9]);
    if digits[9] != first {
        return false;
    }
    let second: u32 = cpf_check_digit(&digits[..10]);
    digits[10] == second
}

fn is_valid_cnpj_digits(digits: &[u32]) -> bool {
    let first: u32 = cnpj_check_digit(&digits[..12], &CNPJ_FIRST_WEIGHTS);
    if digits[12] != first {
        return false;
    }
    let second: u32 = cnpj_check_digit(&digits[..13], &CNPJ_SECOND_WEIGHTS);
    digits[13] == second
}
