//! 256-bit word arithmetic
//!
//! Everything wraps modulo 2^256. Division and modulo by zero yield zero.
//! Signed operations read words as two's complement.

use primitive_types::U512;

pub use evmb_primitives::Word;

/// Word for a boolean result
pub fn from_bool(value: bool) -> Word {
    if value {
        Word::one()
    } else {
        Word::zero()
    }
}

/// Word as usize, `None` when it does not fit
pub fn to_usize(value: Word) -> Option<usize> {
    if value.bits() > 64 {
        return None;
    }
    usize::try_from(value.low_u64()).ok()
}

/// Word as usize, clamped to `usize::MAX`
pub fn to_usize_saturated(value: Word) -> usize {
    to_usize(value).unwrap_or(usize::MAX)
}

/// Word as i64 gas amount, clamped to `i64::MAX`
pub fn to_gas_saturated(value: Word) -> i64 {
    if value.bits() > 63 {
        return i64::MAX;
    }
    value.low_u64() as i64
}

// ==================== Unsigned arithmetic ====================

/// Wrapping addition
pub fn add(a: Word, b: Word) -> Word {
    a.overflowing_add(b).0
}

/// Wrapping subtraction
pub fn sub(a: Word, b: Word) -> Word {
    a.overflowing_sub(b).0
}

/// Wrapping multiplication
pub fn mul(a: Word, b: Word) -> Word {
    a.overflowing_mul(b).0
}

/// Division, zero on division by zero
pub fn div(a: Word, b: Word) -> Word {
    if b.is_zero() {
        return Word::zero();
    }
    a / b
}

/// Modulo, zero on modulo by zero
pub fn rem(a: Word, b: Word) -> Word {
    if b.is_zero() {
        return Word::zero();
    }
    a % b
}

/// (a + b) % n with a 512-bit intermediate
pub fn addmod(a: Word, b: Word, n: Word) -> Word {
    if n.is_zero() {
        return Word::zero();
    }
    truncate((U512::from(a) + U512::from(b)) % U512::from(n))
}

/// (a * b) % n with a 512-bit intermediate
pub fn mulmod(a: Word, b: Word, n: Word) -> Word {
    if n.is_zero() {
        return Word::zero();
    }
    truncate(a.full_mul(b) % U512::from(n))
}

/// base^exponent mod 2^256
pub fn exp(base: Word, exponent: Word) -> Word {
    base.overflowing_pow(exponent).0
}

// ==================== Signed arithmetic ====================

/// Signed division; `MIN / -1` wraps to `MIN`
pub fn sdiv(a: Word, b: Word) -> Word {
    if b.is_zero() {
        return Word::zero();
    }
    let a_neg = is_negative(a);
    let b_neg = is_negative(b);
    let quotient = abs(a) / abs(b);
    if a_neg != b_neg {
        negate(quotient)
    } else {
        quotient
    }
}

/// Signed modulo; the result takes the sign of the dividend
pub fn smod(a: Word, b: Word) -> Word {
    if b.is_zero() {
        return Word::zero();
    }
    let remainder = abs(a) % abs(b);
    if is_negative(a) {
        negate(remainder)
    } else {
        remainder
    }
}

/// Sign-extend `x` from byte `b` (0 = least significant)
pub fn signextend(b: Word, x: Word) -> Word {
    if b >= Word::from(31u32) {
        return x;
    }
    let sign_bit = b.low_u64() as usize * 8 + 7;
    let mask = (Word::one() << sign_bit) - Word::one();
    if x.bit(sign_bit) {
        x | !mask
    } else {
        x & mask
    }
}

/// Signed less than
pub fn slt(a: Word, b: Word) -> bool {
    match (is_negative(a), is_negative(b)) {
        (true, false) => true,
        (false, true) => false,
        _ => a < b,
    }
}

/// Signed greater than
pub fn sgt(a: Word, b: Word) -> bool {
    slt(b, a)
}

// ==================== Bitwise ====================

/// Byte `i` of `x`, counting from the most significant
pub fn byte(i: Word, x: Word) -> Word {
    if i >= Word::from(32u32) {
        return Word::zero();
    }
    Word::from(x.byte(31 - i.low_u64() as usize))
}

/// value << shift
pub fn shl(shift: Word, value: Word) -> Word {
    if shift >= Word::from(256u32) {
        return Word::zero();
    }
    value << shift.low_u64() as usize
}

/// Logical value >> shift
pub fn shr(shift: Word, value: Word) -> Word {
    if shift >= Word::from(256u32) {
        return Word::zero();
    }
    value >> shift.low_u64() as usize
}

/// Arithmetic value >> shift
pub fn sar(shift: Word, value: Word) -> Word {
    let negative = is_negative(value);
    if shift >= Word::from(256u32) {
        return if negative { Word::MAX } else { Word::zero() };
    }
    let shift = shift.low_u64() as usize;
    if negative {
        !((!value) >> shift)
    } else {
        value >> shift
    }
}

// ==================== Internal helpers ====================

fn is_negative(value: Word) -> bool {
    value.bit(255)
}

fn negate(value: Word) -> Word {
    (!value).overflowing_add(Word::one()).0
}

fn abs(value: Word) -> Word {
    if is_negative(value) {
        negate(value)
    } else {
        value
    }
}

fn truncate(value: U512) -> Word {
    let mut bytes = [0u8; 64];
    value.to_big_endian(&mut bytes);
    Word::from_big_endian(&bytes[32..])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn neg(n: u64) -> Word {
        negate(Word::from(n))
    }

    #[test]
    fn test_add_wraps() {
        assert_eq!(add(Word::MAX, Word::one()), Word::zero());
        assert_eq!(sub(Word::zero(), Word::one()), Word::MAX);
        assert_eq!(mul(Word::MAX, Word::from(2u32)), Word::MAX - Word::one());
    }

    #[test]
    fn test_division_by_zero_is_zero() {
        let a = Word::from(10u32);
        assert_eq!(div(a, Word::zero()), Word::zero());
        assert_eq!(rem(a, Word::zero()), Word::zero());
        assert_eq!(sdiv(a, Word::zero()), Word::zero());
        assert_eq!(smod(a, Word::zero()), Word::zero());
        assert_eq!(addmod(a, a, Word::zero()), Word::zero());
        assert_eq!(mulmod(a, a, Word::zero()), Word::zero());
    }

    #[test]
    fn test_sdiv() {
        assert_eq!(sdiv(neg(10), Word::from(3u32)), neg(3));
        assert_eq!(sdiv(neg(10), neg(3)), Word::from(3u32));
        let min = Word::one() << 255usize;
        assert_eq!(sdiv(min, Word::MAX), min);
    }

    #[test]
    fn test_smod_sign_of_dividend() {
        assert_eq!(smod(neg(10), Word::from(3u32)), neg(1));
        assert_eq!(smod(Word::from(10u32), neg(3)), Word::one());
    }

    #[test]
    fn test_addmod_512bit() {
        // (MAX + MAX) % MAX = 0, (MAX + 2) % 2 = 1
        assert_eq!(addmod(Word::MAX, Word::MAX, Word::MAX), Word::zero());
        assert_eq!(addmod(Word::MAX, Word::from(2u32), Word::from(2u32)), Word::one());
    }

    #[test]
    fn test_mulmod_512bit() {
        // (MAX * MAX) % 12 where MAX = 2^256 - 1 ≡ 3 (mod 12), 3 * 3 = 9
        assert_eq!(mulmod(Word::MAX, Word::MAX, Word::from(12u32)), Word::from(9u32));
        assert_eq!(mulmod(Word::from(5u32), Word::from(7u32), Word::from(6u32)), Word::from(5u32));
    }

    #[test]
    fn test_exp() {
        assert_eq!(exp(Word::from(2u32), Word::from(10u32)), Word::from(1024u32));
        assert_eq!(exp(Word::from(2u32), Word::from(256u32)), Word::zero());
        assert_eq!(exp(Word::zero(), Word::zero()), Word::one());
    }

    #[test]
    fn test_signextend() {
        assert_eq!(signextend(Word::zero(), Word::from(0xffu32)), Word::MAX);
        assert_eq!(signextend(Word::zero(), Word::from(0x7fu32)), Word::from(0x7fu32));
        assert_eq!(signextend(Word::one(), Word::from(0x0180u32)), Word::from(0x0180u32));
        assert_eq!(signextend(Word::from(31u32), Word::from(0xffu32)), Word::from(0xffu32));
    }

    #[test]
    fn test_slt_sgt() {
        assert!(slt(neg(1), Word::one()));
        assert!(!slt(Word::one(), neg(1)));
        assert!(sgt(Word::from(2u32), Word::one()));
        assert!(slt(neg(2), neg(1)));
    }

    #[test]
    fn test_byte() {
        let x = Word::from(0x1122u32);
        assert_eq!(byte(Word::from(31u32), x), Word::from(0x22u32));
        assert_eq!(byte(Word::from(30u32), x), Word::from(0x11u32));
        assert_eq!(byte(Word::from(32u32), x), Word::zero());
    }

    #[test]
    fn test_shifts() {
        assert_eq!(shl(Word::one(), Word::one()), Word::from(2u32));
        assert_eq!(shl(Word::from(256u32), Word::one()), Word::zero());
        assert_eq!(shr(Word::from(4u32), Word::from(0xffu32)), Word::from(0xfu32));
        assert_eq!(sar(Word::from(4u32), neg(16)), neg(1));
        assert_eq!(sar(Word::from(300u32), neg(16)), Word::MAX);
        assert_eq!(sar(Word::one(), Word::from(4u32)), Word::from(2u32));
    }

    #[test]
    fn test_to_usize() {
        assert_eq!(to_usize(Word::from(42u32)), Some(42));
        assert_eq!(to_usize(Word::MAX), None);
        assert_eq!(to_usize_saturated(Word::MAX), usize::MAX);
        assert_eq!(to_gas_saturated(Word::MAX), i64::MAX);
        assert_eq!(to_gas_saturated(Word::from(7u32)), 7);
    }
}
