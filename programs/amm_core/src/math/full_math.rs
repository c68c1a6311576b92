//! Full-precision `mulDiv`.
//!
//! Generalizes the teacher's `mul_fixed`/`div_fixed` pair (which split a `u128`
//! multiply into four `u64` limb products to avoid overflow, then divided through a
//! `U256` intermediate) up one width class: here the multiply is two `U256`
//! operands, so the intermediate has to be the full 512 bits a `U256 * U256`
//! product can occupy, not just double the width of one operand. `U512` is the only
//! place in this crate that sees a magnitude wider than 256 bits.
use crate::error::PoolError;
use primitive_types::{U256, U512};

fn widen(x: U256) -> U512 {
    let mut bytes = [0u8; 32];
    x.to_big_endian(&mut bytes);
    let mut wide = [0u8; 64];
    wide[32..].copy_from_slice(&bytes);
    U512::from_big_endian(&wide)
}

/// Narrows a `U512` back to `U256`, failing if it does not fit.
fn narrow(x: U512) -> Result<U256, PoolError> {
    let mut wide = [0u8; 64];
    x.to_big_endian(&mut wide);
    if wide[..32].iter().any(|&b| b != 0) {
        return Err(PoolError::MathOverflow);
    }
    Ok(U256::from_big_endian(&wide[32..]))
}

/// Returns `floor(a * b / denominator)`, computing `a * b` as if in 512 bits so the
/// intermediate product can never overflow regardless of how close `a` and `b` each
/// come to `U256::MAX`.
///
/// Fails with [`PoolError::DivisionByZero`] if `denominator` is zero, or
/// [`PoolError::MathOverflow`] if the mathematical result does not fit in 256 bits.
pub fn mul_div(a: U256, b: U256, denominator: U256) -> Result<U256, PoolError> {
    if denominator.is_zero() {
        return Err(PoolError::DivisionByZero);
    }
    let product = widen(a) * widen(b);
    narrow(product / widen(denominator))
}

/// As [`mul_div`], but rounds up instead of down: the result equals `mul_div(a, b,
/// denominator) + 1` whenever `a * b` is not an exact multiple of `denominator`,
/// and `mul_div(a, b, denominator)` otherwise.
///
/// Fails with [`PoolError::MathOverflow`] if the rounded-up result would not fit in
/// 256 bits, even when the unrounded quotient does.
pub fn mul_div_rounding_up(a: U256, b: U256, denominator: U256) -> Result<U256, PoolError> {
    if denominator.is_zero() {
        return Err(PoolError::DivisionByZero);
    }
    let product = widen(a) * widen(b);
    let denom = widen(denominator);
    let quotient = product / denom;
    let remainder = product % denom;
    if remainder.is_zero() {
        narrow(quotient)
    } else {
        narrow(quotient)?
            .checked_add(U256::one())
            .ok_or(PoolError::MathOverflow)
    }
}

/// Ceiling division of two plain `U256` values, no intermediate widening needed
/// since neither operand is itself a product.
pub fn div_rounding_up(numerator: U256, denominator: U256) -> Result<U256, PoolError> {
    if denominator.is_zero() {
        return Err(PoolError::DivisionByZero);
    }
    let quotient = numerator / denominator;
    let remainder = numerator % denominator;
    if remainder.is_zero() {
        Ok(quotient)
    } else {
        quotient.checked_add(U256::one()).ok_or(PoolError::MathOverflow)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn mul_div_matches_simple_cases() {
        assert_eq!(mul_div(U256::from(10), U256::from(3), U256::from(4)).unwrap(), U256::from(7));
        assert_eq!(
            mul_div_rounding_up(U256::from(10), U256::from(3), U256::from(4)).unwrap(),
            U256::from(8)
        );
    }

    #[test]
    fn mul_div_rejects_division_by_zero() {
        assert_eq!(
            mul_div(U256::one(), U256::one(), U256::zero()).unwrap_err(),
            PoolError::DivisionByZero
        );
    }

    #[test]
    fn mul_div_overflow_is_detected() {
        let max = U256::MAX;
        assert_eq!(mul_div(max, max, U256::one()).unwrap_err(), PoolError::MathOverflow);
    }

    #[test]
    fn mul_div_rounding_up_overflow_at_boundary() {
        // a*b == 2*U256::MAX + 1, so a*b/2 floors to exactly U256::MAX with remainder
        // 1 — mul_div succeeds, but mul_div_rounding_up must add 1 to U256::MAX, which
        // does not fit in 256 bits.
        let denom = U256::from(2);
        let a = U256::from(535006138814359u64);
        let b = U256::from_dec_str("432862656469423142931042426214547535783388063929571229938474969")
            .unwrap();

        assert_eq!(mul_div(a, b, denom).unwrap(), U256::MAX);
        assert_eq!(mul_div_rounding_up(a, b, denom).unwrap_err(), PoolError::MathOverflow);
    }

    proptest! {
        #[test]
        fn mul_div_distributes_the_remainder(a in any::<u128>(), b in any::<u128>(), d in 1u128..=u128::MAX) {
            let (a, b, d) = (U256::from(a), U256::from(b), U256::from(d));
            if let Ok(q) = mul_div(a, b, d) {
                // mulDiv(a,b,d)*d + ((a*b) mod d) == a*b, checked in the wide domain.
                let product = widen(a) * widen(b);
                let remainder = product % widen(d);
                prop_assert_eq!(widen(q) * widen(d) + remainder, product);
            }
        }

        #[test]
        fn rounding_up_is_floor_or_floor_plus_one(a in any::<u64>(), b in any::<u64>(), d in 1u64..=u64::MAX) {
            let (a, b, d) = (U256::from(a), U256::from(b), U256::from(d));
            let floor = mul_div(a, b, d).unwrap();
            let ceil = mul_div_rounding_up(a, b, d).unwrap();
            prop_assert!(ceil == floor || ceil == floor + U256::one());
        }
    }
}
