//! CPF (Cadastro de Pessoas Físicas) helpers.
//!
//! A CPF is eleven digits; the last two are check digits computed with a
//! mod-11 weighted sum over the preceding digits. Input may carry the usual
//! `XXX.XXX.XXX-XX` punctuation.

/// Strips every non-digit character.
pub fn clean(cpf: &str) -> String {
    cpf.chars().filter(char::is_ascii_digit).collect()
}

pub fn is_valid(cpf: &str) -> bool {
    let digits: Vec<u32> = clean(cpf).chars().filter_map(|c| c.to_digit(10)).collect();

    if digits.len() != 11 {
        return false;
    }

    if digits.iter().all(|d| *d == digits[0]) {
        return false;
    }

    check_digit(&digits[..9]) == digits[9] && check_digit(&digits[..10]) == digits[10]
}

/// Formats as `XXX.XXX.XXX-XX`. Inputs that do not hold exactly eleven digits
/// are returned cleaned but unformatted.
pub fn format(cpf: &str) -> String {
    let digits = clean(cpf);
    if digits.len() != 11 {
        return digits;
    }
    format!(
        "{}.{}.{}-{}",
        &digits[0..3],
        &digits[3..6],
        &digits[6..9],
        &digits[9..11]
    )
}

fn check_digit(digits: &[u32]) -> u32 {
    let weight_start = digits.len() as u32 + 1;
    let sum: u32 = digits
        .iter()
        .enumerate()
        .map(|(i, d)| d * (weight_start - i as u32))
        .sum();
    match sum % 11 {
        r if r < 2 => 0,
        r => 11 - r,
    }
}
