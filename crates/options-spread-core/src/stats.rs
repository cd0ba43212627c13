//! Standard normal distribution over `Decimal`, plus the transcendental
//! helpers it needs. Shared by the pricing engine and the probability model.
//!
//! Everything here is a pure function over all-real input (ln: positive
//! input only; callers validate before calling). No f64 in the computation
//! path.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// 1 / sqrt(2*pi)
const INV_SQRT_TWO_PI: Decimal = dec!(0.3989422804014327);

/// Taylor-series exp(x). Arguments are halved until |x| <= 2, then the
/// partial sums are squared back up, so the 24-term series stays accurate
/// for the exponents option pricing produces.
pub fn exp_decimal(x: Decimal) -> Decimal {
    let two = dec!(2);

    let mut halvings = 0u32;
    let mut arg = x;
    while arg > two || arg < -two {
        arg /= two;
        halvings += 1;
    }

    let mut sum = Decimal::ONE;
    let mut term = Decimal::ONE;
    for n in 1u32..=24 {
        term = term * arg / Decimal::from(n);
        sum += term;
    }

    for _ in 0..halvings {
        sum *= sum;
    }
    sum
}

/// Newton's method square root. Non-positive input collapses to zero.
pub fn sqrt_decimal(x: Decimal) -> Decimal {
    if x <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    if x == Decimal::ONE {
        return Decimal::ONE;
    }

    let two = dec!(2);
    let mut guess = if x > dec!(100) {
        dec!(10)
    } else if x < dec!(0.01) {
        dec!(0.1)
    } else {
        x / two
    };
    for _ in 0..25 {
        guess = (guess + x / guess) / two;
    }
    guess
}

/// Natural log via Newton iteration on exp(y) = x.
///
/// Callers must pass positive x; non-positive input saturates to a large
/// negative value instead of panicking.
pub fn ln_decimal(x: Decimal) -> Decimal {
    const E: Decimal = dec!(2.718281828459045);

    if x <= Decimal::ZERO {
        return dec!(-999);
    }
    if x == Decimal::ONE {
        return Decimal::ZERO;
    }

    // Pull out whole powers of e so Newton starts near the answer.
    let mut shift = Decimal::ZERO;
    let mut v = x;
    while v > E {
        v /= E;
        shift += Decimal::ONE;
    }
    while v < Decimal::ONE / E {
        v *= E;
        shift -= Decimal::ONE;
    }

    // y_{n+1} = y_n - 1 + v / exp(y_n)
    let mut y = v - Decimal::ONE;
    for _ in 0..30 {
        let ey = exp_decimal(y);
        if ey == Decimal::ZERO {
            break;
        }
        y = y - Decimal::ONE + v / ey;
    }
    shift + y
}

/// Standard normal density phi(x).
pub fn norm_pdf(x: Decimal) -> Decimal {
    INV_SQRT_TWO_PI * exp_decimal(-(x * x) / dec!(2))
}

/// Standard normal CDF via the Abramowitz & Stegun 26.2.17 rational
/// approximation (|error| < 7.5e-8). Negative x goes through the symmetry
/// Phi(x) = 1 - Phi(-x); Phi(0) is exactly 1/2.
pub fn norm_cdf(x: Decimal) -> Decimal {
    const B1: Decimal = dec!(0.319381530);
    const B2: Decimal = dec!(-0.356563782);
    const B3: Decimal = dec!(1.781477937);
    const B4: Decimal = dec!(-1.821255978);
    const B5: Decimal = dec!(1.330274429);
    const P: Decimal = dec!(0.2316419);

    if x.is_zero() {
        return dec!(0.5);
    }

    let abs_x = x.abs();
    let t = Decimal::ONE / (Decimal::ONE + P * abs_x);
    let poly = t * (B1 + t * (B2 + t * (B3 + t * (B4 + t * B5))));
    let upper_tail = Decimal::ONE - norm_pdf(abs_x) * poly;

    if x < Decimal::ZERO {
        Decimal::ONE - upper_tail
    } else {
        upper_tail
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: Decimal, b: Decimal, tol: Decimal) -> bool {
        (a - b).abs() < tol
    }

    #[test]
    fn test_exp_decimal_known_values() {
        assert!(approx_eq(exp_decimal(dec!(0)), dec!(1), dec!(0.0000001)));
        assert!(approx_eq(
            exp_decimal(dec!(1)),
            dec!(2.718281828459045),
            dec!(0.000001)
        ));
        assert!(approx_eq(
            exp_decimal(dec!(-0.05)),
            dec!(0.951229424500714),
            dec!(0.000001)
        ));
        // range reduction path
        assert!(approx_eq(
            exp_decimal(dec!(5)),
            dec!(148.4131591025766),
            dec!(0.001)
        ));
    }

    #[test]
    fn test_sqrt_decimal_known_values() {
        assert!(approx_eq(sqrt_decimal(dec!(4)), dec!(2), dec!(0.0000001)));
        assert!(approx_eq(
            sqrt_decimal(dec!(2)),
            dec!(1.414213562373095),
            dec!(0.000001)
        ));
        // a typical 30-day year fraction
        assert!(approx_eq(
            sqrt_decimal(dec!(0.0821917808)),
            dec!(0.2866911940),
            dec!(0.000001)
        ));
        assert_eq!(sqrt_decimal(dec!(0)), Decimal::ZERO);
    }

    #[test]
    fn test_ln_decimal_known_values() {
        assert!(approx_eq(ln_decimal(dec!(1)), dec!(0), dec!(0.0000001)));
        assert!(approx_eq(
            ln_decimal(dec!(2.718281828459045)),
            dec!(1),
            dec!(0.000001)
        ));
        assert!(approx_eq(
            ln_decimal(dec!(0.9)),
            dec!(-0.105360515657826),
            dec!(0.000001)
        ));
        assert!(approx_eq(
            ln_decimal(dec!(40)),
            dec!(3.688879454113936),
            dec!(0.000001)
        ));
    }

    #[test]
    fn test_norm_pdf_symmetric_with_known_peak() {
        assert!(approx_eq(
            norm_pdf(dec!(0)),
            dec!(0.3989422804014327),
            dec!(0.0000001)
        ));
        assert_eq!(norm_pdf(dec!(1.3)), norm_pdf(dec!(-1.3)));
    }

    #[test]
    fn test_norm_cdf_at_zero_is_half() {
        assert_eq!(norm_cdf(dec!(0)), dec!(0.5));
    }

    #[test]
    fn test_norm_cdf_reference_values() {
        // reference values to 1e-6 absolute
        let cases = [
            (dec!(0.5), dec!(0.691462461)),
            (dec!(1), dec!(0.841344746)),
            (dec!(1.96), dec!(0.975002105)),
            (dec!(-0.5), dec!(0.308537539)),
            (dec!(-1), dec!(0.158655254)),
            (dec!(-2), dec!(0.022750132)),
        ];
        for (x, expected) in cases {
            assert!(
                approx_eq(norm_cdf(x), expected, dec!(0.000001)),
                "Phi({x}) = {} not within 1e-6 of {expected}",
                norm_cdf(x)
            );
        }
    }

    #[test]
    fn test_norm_cdf_tails() {
        assert!(norm_cdf(dec!(5)) > dec!(0.999999));
        assert!(norm_cdf(dec!(-5)) < dec!(0.000001));
    }

    #[test]
    fn test_norm_cdf_monotone_non_decreasing() {
        let mut x = dec!(-4);
        let mut prev = norm_cdf(x);
        while x < dec!(4) {
            x += dec!(0.125);
            let curr = norm_cdf(x);
            assert!(curr >= prev, "CDF decreased between {} and {x}", x - dec!(0.125));
            prev = curr;
        }
    }

    #[test]
    fn test_norm_cdf_complement_symmetry() {
        for x in [dec!(0.3), dec!(1.1), dec!(2.7)] {
            assert!(approx_eq(
                norm_cdf(x) + norm_cdf(-x),
                Decimal::ONE,
                dec!(0.0000000001)
            ));
        }
    }
}
