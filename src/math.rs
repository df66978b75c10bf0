//! Fixed point helpers for the hinting interpreter.
//!
//! Values on the interpreter stack are raw 26.6 (and occasionally 2.14)
//! bit patterns stored in `i32`, so most helpers operate on plain integers
//! and lean on [`Fixed`] for the 64-bit intermediate cases.

use font_types::{Fixed, Point};

/// Largest multiple of 64 that is less than or equal to `x`.
pub(crate) fn floor(x: i32) -> i32 {
    x & !63
}

/// Nearest multiple of 64 to `x`.
pub(crate) fn round(x: i32) -> i32 {
    floor(x + 32)
}

/// Smallest multiple of 64 that is greater than or equal to `x`.
pub(crate) fn ceil(x: i32) -> i32 {
    floor(x + 63)
}

/// Floor `x` to a multiple of the power of two `n`.
pub(crate) fn floor_pad(x: i32, n: i32) -> i32 {
    x & !(n - 1)
}

/// Round `x` to the nearest multiple of the power of two `n`.
pub(crate) fn round_pad(x: i32, n: i32) -> i32 {
    floor_pad(x + n / 2, n)
}

/// 16.16 fixed point multiplication with rounding.
#[inline(always)]
pub(crate) fn mul(a: i32, b: i32) -> i32 {
    (Fixed::from_bits(a) * Fixed::from_bits(b)).to_bits()
}

/// 16.16 fixed point division with rounding.
pub(crate) fn div(a: i32, b: i32) -> i32 {
    (Fixed::from_bits(a) / Fixed::from_bits(b)).to_bits()
}

/// Computes `a * b / c` with a 64-bit intermediate and rounding.
pub(crate) fn mul_div(a: i32, b: i32, c: i32) -> i32 {
    Fixed::from_bits(a)
        .mul_div(Fixed::from_bits(b), Fixed::from_bits(c))
        .to_bits()
}

/// Computes `a * b / c` with a 64-bit intermediate, truncating the result.
pub(crate) fn mul_div_no_round(a: i32, b: i32, c: i32) -> i32 {
    let negative = ((a < 0) as u32 + (b < 0) as u32 + (c < 0) as u32) & 1 == 1;
    let (a, b, c) = (
        a.unsigned_abs() as i64,
        b.unsigned_abs() as i64,
        c.unsigned_abs() as i64,
    );
    let q = if c != 0 { a * b / c } else { 0x7FFFFFFF };
    if negative {
        -(q as i32)
    } else {
        q as i32
    }
}

/// 2.14 fixed point multiplication with rounding.
pub(crate) fn mul14(a: i32, b: i32) -> i32 {
    let prod = a as i64 * b as i64;
    ((prod + 0x2000 + (prod >> 63)) >> 14) as i32
}

/// Dot product of two 2.14 vectors, yielding 2.14.
pub(crate) fn dot14(ax: i32, ay: i32, bx: i32, by: i32) -> i32 {
    let sum = ax as i64 * bx as i64 + ay as i64 * by as i64;
    ((sum + 0x2000 + (sum >> 63)) >> 14) as i32
}

/// Normalizes the vector `(x, y)` to unit length in 2.14 fixed point.
///
/// The all-integer Newton iteration tolerates component magnitudes spanning
/// the full 32-bit range. A zero input vector yields a zero result; callers
/// treat that as success.
pub(crate) fn normalize14(x: i32, y: i32) -> Point<i32> {
    use core::num::Wrapping;
    const ZERO: Wrapping<u32> = Wrapping(0);
    let mut x_sign = Wrapping(1i32);
    let mut y_sign = Wrapping(1i32);
    let mut ax = Wrapping(x as u32);
    let mut ay = Wrapping(y as u32);
    if x < 0 {
        ax = ZERO - ax;
        x_sign = -x_sign;
    }
    if y < 0 {
        ay = ZERO - ay;
        y_sign = -y_sign;
    }
    // Axis aligned vectors snap straight to a signed unit axis.
    if ax == ZERO {
        let y14 = if ay.0 > 0 {
            (y_sign * Wrapping(0x10000) / Wrapping(4)).0
        } else {
            0
        };
        return Point::new(x / 4, y14);
    }
    if ay == ZERO {
        return Point::new((x_sign * Wrapping(0x10000) / Wrapping(4)).0, y / 4);
    }
    let approx_len =
        |a: Wrapping<u32>, b: Wrapping<u32>| if a > b { a + (b >> 1) } else { b + (a >> 1) };
    // Rebalance so that the approximate length sits in the range where the
    // iteration below converges without overflowing.
    let mut hypot = approx_len(ax, ay);
    let zeros = hypot.0.leading_zeros() as usize;
    let mut norm_shift = zeros as i32 - 15;
    if hypot >= (Wrapping(0xAAAAAAAAu32) >> zeros) {
        norm_shift -= 1;
    }
    if norm_shift > 0 {
        let s = norm_shift as usize;
        ax <<= s;
        ay <<= s;
        hypot = approx_len(ax, ay);
    } else {
        let s = (-norm_shift) as usize;
        ax >>= s;
        ay >>= s;
        hypot >>= s;
    }
    let sx = Wrapping(ax.0 as i32);
    let sy = Wrapping(ay.0 as i32);
    let mut correction = Wrapping(0x10000) - Wrapping(hypot.0 as i32);
    let mut nx;
    let mut ny;
    loop {
        nx = Wrapping((sx + ((sx * correction) >> 16)).0 as u32);
        ny = Wrapping((sy + ((sy * correction) >> 16)).0 as u32);
        // Error of the squared length, scaled back into correction units.
        let mut delta = Wrapping(-((nx * nx + ny * ny).0 as i32)) / Wrapping(0x200);
        delta = delta * ((Wrapping(0x10000) + correction) >> 8) / Wrapping(0x10000);
        correction += delta;
        if delta <= Wrapping(0) {
            break;
        }
    }
    Point::new(
        (Wrapping(nx.0 as i32) * x_sign / Wrapping(4)).0,
        (Wrapping(ny.0 as i32) * y_sign / Wrapping(4)).0,
    )
}
