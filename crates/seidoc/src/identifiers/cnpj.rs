//! CNPJ (Cadastro Nacional da Pessoa Jurídica) check-digit validation and formatting.

use super::{all_same, digits_of};

pub const CNPJ_LEN: usize = 14;
const BASE_LEN: usize = 12;

/// Weight cycle applied from the rightmost digit leftwards.
const WEIGHTS: [u32; 8] = [2, 3, 4, 5, 6, 7, 8, 9];

/// Validate a CNPJ in any punctuation. Non-digits are ignored.
pub fn validate_cnpj(input: &str) -> bool {
    let digits = digits_of(input);
    if digits.len() != CNPJ_LEN || all_same(&digits) {
        return false;
    }

    match cnpj_check_digits(&digits[..BASE_LEN]) {
        Some([first, second]) => digits[BASE_LEN] == first && digits[BASE_LEN + 1] == second,
        None => false,
    }
}

/// Both check digits for a 12-digit base, or `None` when the base is not 12 digits.
pub fn cnpj_check_digits(base: &[u8]) -> Option<[u8; 2]> {
    if base.len() != BASE_LEN || base.iter().any(|d| *d > 9) {
        return None;
    }

    let first = check_digit(base);
    let mut extended = base.to_vec();
    extended.push(first);
    let second = check_digit(&extended);
    Some([first, second])
}

fn check_digit(digits: &[u8]) -> u8 {
    let sum: u32 = digits
        .iter()
        .rev()
        .zip(WEIGHTS.iter().cycle())
        .map(|(d, w)| u32::from(*d) * w)
        .sum();

    match sum % 11 {
        remainder if remainder < 2 => 0,
        remainder => (11 - remainder) as u8,
    }
}

/// `NN.NNN.NNN/NNNN-NN` when the input has exactly 14 digits, otherwise the input unchanged.
pub fn format_cnpj(input: &str) -> String {
    let digits: String = input.chars().filter(char::is_ascii_digit).collect();
    if digits.len() != CNPJ_LEN {
        return input.to_string();
    }
    format!(
        "{}.{}.{}/{}-{}",
        &digits[0..2],
        &digits[2..5],
        &digits[5..8],
        &digits[8..12],
        &digits[12..14]
    )
}
