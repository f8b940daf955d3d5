use num::bigint::BigInt;
use num::{Integer, One, Signed, Zero};
use util::ParseEnumError;

/// Encode a signed integer as tape cells: a sign cell (`0` for non-negative,
/// `1` for negative) followed by the magnitude bits least-significant first.
/// Zero encodes as the single cell `0`.
pub fn encode_int(value: &BigInt) -> String {
    let mut cells = String::new();
    cells.push(if value.is_negative() { '1' } else { '0' });

    let two = BigInt::one() + BigInt::one();
    let mut magnitude = value.abs();
    while !magnitude.is_zero() {
        let (quotient, remainder) = magnitude.div_rem(&two);
        cells.push(if remainder.is_zero() { '0' } else { '1' });
        magnitude = quotient;
    }

    cells
}

/// Inverse of [`encode_int`](fn.encode_int.html).
pub fn decode_int(cells: &str) -> Result<BigInt, ParseEnumError> {
    let chars: Vec<char> = cells.chars().collect();
    let negative = match chars.first() {
        Some('0') => false,
        Some('1') => true,
        _ => return Err(ParseEnumError::new(cells, "integer cells")),
    };

    let two = BigInt::one() + BigInt::one();
    let mut value = BigInt::zero();
    for &c in chars[1..].iter().rev() {
        value = value * two.clone();
        match c {
            '0' => {}
            '1' => value = value + BigInt::one(),
            _ => return Err(ParseEnumError::new(cells, "integer cells")),
        }
    }

    if negative {
        value = -value;
    }
    Ok(value)
}

/// Encode a sequence of integers as an input tape: values separated by a
/// single blank cell.
pub fn encode_input(values: &[BigInt]) -> String {
    values
        .iter()
        .map(encode_int)
        .collect::<Vec<String>>()
        .join("_")
}

/// Decode an output tape window into the integers it holds.
pub fn decode_output(cells: &str) -> Result<Vec<BigInt>, ParseEnumError> {
    cells
        .split('_')
        .filter(|chunk| !chunk.is_empty())
        .map(decode_int)
        .collect()
}
