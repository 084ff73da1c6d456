//! CPF (Cadastro de Pessoas Físicas) check-digit validation and formatting.

use super::{all_same, digits_of};

pub const CPF_LEN: usize = 11;

/// Validate a CPF in any punctuation. Non-digits are ignored.
pub fn validate_cpf(input: &str) -> bool {
    let digits = digits_of(input);
    if digits.len() != CPF_LEN || all_same(&digits) {
        return false;
    }

    (9..CPF_LEN).all(|position| check_digit(&digits[..position]) == digits[position])
}

/// Weights run from `len + 1` down to 2 over the preceding digits.
fn check_digit(preceding: &[u8]) -> u8 {
    let weight_start = preceding.len() as u32 + 1;
    let sum: u32 = preceding
        .iter()
        .enumerate()
        .map(|(j, d)| u32::from(*d) * (weight_start - j as u32))
        .sum();

    match (sum * 10) % 11 {
        10 => 0,
        remainder => remainder as u8,
    }
}

/// `NNN.NNN.NNN-NN` when the input has exactly 11 digits, otherwise the input unchanged.
pub fn format_cpf(input: &str) -> String {
    let digits: String = input.chars().filter(char::is_ascii_digit).collect();
    if digits.len() != CPF_LEN {
        return input.to_string();
    }
    format!("{}.{}.{}-{}", &digits[0..3], &digits[3..6], &digits[6..9], &digits[9..11])
}
