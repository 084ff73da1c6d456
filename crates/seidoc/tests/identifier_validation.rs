//! Checksum and process-number behavior across the public identifier API.

use seidoc::identifiers::{cnpj_check_digits, format_cnpj, format_cpf};
use seidoc::{NationalIdentifier, ProcessIdentifier, validate_cnpj, validate_cpf};

fn replace_digit(digits: &str, position: usize, replacement: char) -> String {
    digits
        .chars()
        .enumerate()
        .map(|(i, c)| if i == position { replacement } else { c })
        .collect()
}

#[test]
fn test_cpf_rejects_every_single_digit_change() {
    let valid = "52998224725";
    assert!(validate_cpf(valid));

    for position in 0..valid.len() {
        for replacement in '0'..='9' {
            let candidate = replace_digit(valid, position, replacement);
            if candidate == valid {
                continue;
            }
            assert!(!validate_cpf(&candidate), "{} should be rejected", candidate);
        }
    }
}

#[test]
fn test_cnpj_rejects_every_single_digit_change() {
    let valid = "11222333000181";
    assert!(validate_cnpj(valid));

    for position in 0..valid.len() {
        for replacement in '0'..='9' {
            let candidate = replace_digit(valid, position, replacement);
            if candidate == valid {
                continue;
            }
            assert!(!validate_cnpj(&candidate), "{} should be rejected", candidate);
        }
    }
}

#[test]
fn test_repeated_digits_are_rejected() {
    for d in '0'..='9' {
        let cpf: String = std::iter::repeat_n(d, 11).collect();
        let cnpj: String = std::iter::repeat_n(d, 14).collect();
        assert!(!validate_cpf(&cpf), "{}", cpf);
        assert!(!validate_cnpj(&cnpj), "{}", cnpj);
    }
}

#[test]
fn test_computed_check_digits_validate() {
    let bases = ["112223330001", "045678900001", "000000000001", "999999990001", "123456780001"];
    let expected = [
        "11222333000181",
        "04567890000179",
        "00000000000191",
        "99999999000191",
        "12345678000195",
    ];

    for (base, expected) in bases.iter().zip(expected) {
        let digits: Vec<u8> = base.bytes().map(|b| b - b'0').collect();
        let [first, second] = cnpj_check_digits(&digits).unwrap();
        let full = format!("{}{}{}", base, first, second);
        assert_eq!(full, expected);
        assert!(validate_cnpj(&full));
        assert!(validate_cnpj(&format_cnpj(&full)));
    }
}

#[test]
fn test_check_digits_need_twelve_digit_base() {
    assert!(cnpj_check_digits(&[1, 2, 3]).is_none());
    assert!(cnpj_check_digits(&[1; 13]).is_none());
    assert!(cnpj_check_digits(&[10, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1]).is_none());
}

#[test]
fn test_punctuation_is_ignored() {
    assert!(validate_cpf("529.982.247-25"));
    assert!(validate_cpf("529 982 247 25"));
    assert!(validate_cnpj("11.222.333/0001-81"));
    assert!(!validate_cpf("529.982.247-2"));
    assert!(!validate_cnpj(""));
}

#[test]
fn test_national_identifier_only_from_valid_input() {
    let cpf = NationalIdentifier::cpf("52998224725").unwrap();
    assert_eq!(cpf.formatted(), "529.982.247-25");
    assert_eq!(cpf.to_string(), "CPF: 529.982.247-25");
    assert_eq!(format_cpf("52998224725"), "529.982.247-25");

    assert!(NationalIdentifier::cpf("111.444.777-36").is_none());
    assert!(NationalIdentifier::cnpj("11.222.333/0001-80").is_none());

    let cnpj = NationalIdentifier::cnpj("11222333000181").unwrap();
    assert_eq!(cnpj.digits(), "11222333000181");
    assert_eq!(cnpj.to_string(), "CNPJ: 11.222.333/0001-81");
}

#[test]
fn test_process_identifier_needs_exactly_fifteen_digits() {
    assert_eq!(
        ProcessIdentifier::from_filename("SEI 253511234562023.pdf").as_str(),
        "25351.123456/2023-3"
    );
    assert_eq!(
        ProcessIdentifier::from_filename("/tmp/downloads/SEI253511234562023.pdf").as_str(),
        "25351.123456/2023-3"
    );
    assert_eq!(
        ProcessIdentifier::from_filename("SEI 25351123456202.pdf").as_str(),
        "25351123456202"
    );
    assert_eq!(
        ProcessIdentifier::from_filename("SEI 2535112345620231.pdf").as_str(),
        "2535112345620231"
    );
    assert_eq!(ProcessIdentifier::from_filename("notificacao.pdf").as_str(), "notificacao");
}
