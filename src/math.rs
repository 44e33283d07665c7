/// Returns the unbiased IEEE-754 binary exponent of `x`.
///
/// Subnormal numbers and zero return -1023.
#[inline(always)]
pub fn binary_exponent(x: f64) -> i32 {
    #[allow(clippy::cast_possible_truncation)]
    let biased = ((x.to_bits() >> 52) & 0x7ff) as i32;
    biased - 1023
}

/// Returns `2^e`, or 0 / infinity outside the representable range.
#[inline(always)]
pub fn pow2(e: i32) -> f64 {
    if e > 1023 {
        f64::INFINITY
    } else if e >= -1022 {
        #[allow(clippy::cast_sign_loss)]
        f64::from_bits(((e + 1023) as u64) << 52)
    } else if e >= -1074 {
        f64::from_bits(1 << (e + 1074))
    } else {
        0.0
    }
}

/// Returns the exponent that brings the largest of the values close to 1.
///
/// Returns 0 if no value is positive and finite.
#[inline(always)]
pub fn scale_exponent<I>(values: I) -> i32
where
    I: IntoIterator<Item = f64>,
{
    let max = values.into_iter().fold(0.0, |acc: f64, x| acc.max(x));
    if max > 0.0 && max.is_finite() {
        binary_exponent(max)
    } else {
        0
    }
}

#[cfg(all(test, feature = "std"))]
#[inline(always)]
pub fn logsumexp(a: f64, b: f64) -> f64 {
    if a == f64::NEG_INFINITY && b == f64::NEG_INFINITY {
        return f64::NEG_INFINITY;
    }
    if a > b {
        a + (b - a).exp().ln_1p()
    } else {
        b + (a - b).exp().ln_1p()
    }
}
