//! Bit-level primitives for Morton (Z-order) codes.
//!
//! A code interleaves two axis integers with x on the even bit positions and
//! y on the odd ones: `[.. y1 x1 y0 x0]`. The spreading ladders below are the
//! classic "binary magic numbers" sequence; each stage doubles the gap
//! between the bits of the previous one.

const B: [u64; 5] = [
    0x5555555555555555,
    0x3333333333333333,
    0x0F0F0F0F0F0F0F0F,
    0x00FF00FF00FF00FF,
    0x0000FFFF0000FFFF,
];
const S: [u32; 5] = [1, 2, 4, 8, 16];

const DB: [u64; 6] = [
    0x5555555555555555,
    0x3333333333333333,
    0x0F0F0F0F0F0F0F0F,
    0x00FF00FF00FF00FF,
    0x0000FFFF0000FFFF,
    0x00000000FFFFFFFF,
];
const DS: [u32; 6] = [0, 1, 2, 4, 8, 16];

/// Bits belonging to the x axis.
pub const X_MASK: u64 = 0x5555555555555555;
/// Bits belonging to the y axis.
pub const Y_MASK: u64 = 0xAAAAAAAAAAAAAAAA;

/// Interleave the low 32 bits of `x` and `y` into one 64-bit code.
#[inline]
pub fn interleave64(x: u32, y: u32) -> u64 {
    let mut x = x as u64;
    let mut y = y as u64;

    x = (x | (x << S[4])) & B[4];
    y = (y | (y << S[4])) & B[4];

    x = (x | (x << S[3])) & B[3];
    y = (y | (y << S[3])) & B[3];

    x = (x | (x << S[2])) & B[2];
    y = (y | (y << S[2])) & B[2];

    x = (x | (x << S[1])) & B[1];
    y = (y | (y << S[1])) & B[1];

    x = (x | (x << S[0])) & B[0];
    y = (y | (y << S[0])) & B[0];

    x | (y << 1)
}

/// Split a code produced by [`interleave64`] back into `(x, y)`.
#[inline]
pub fn deinterleave64(interleaved: u64) -> (u32, u32) {
    let mut x = interleaved;
    let mut y = interleaved >> 1;

    x = (x | (x >> DS[0])) & DB[0];
    y = (y | (y >> DS[0])) & DB[0];

    x = (x | (x >> DS[1])) & DB[1];
    y = (y | (y >> DS[1])) & DB[1];

    x = (x | (x >> DS[2])) & DB[2];
    y = (y | (y >> DS[2])) & DB[2];

    x = (x | (x >> DS[3])) & DB[3];
    y = (y | (y >> DS[3])) & DB[3];

    x = (x | (x >> DS[4])) & DB[4];
    y = (y | (y >> DS[4])) & DB[4];

    x = (x | (x >> DS[5])) & DB[5];
    y = (y | (y >> DS[5])) & DB[5];

    (x as u32, y as u32)
}

/// Move a `step`-precision code one cell along x (`d > 0` east, `d < 0` west).
///
/// The y bits are left untouched and the carry never leaves the x sub-word,
/// so moving past the plane edge wraps to the opposite side.
///
/// `step` must be in `1..=32`.
#[inline]
pub fn move_x(bits: u64, step: u8, d: i8) -> u64 {
    debug_assert!((1..=32).contains(&step));
    if d == 0 {
        return bits;
    }

    let shift = 64 - u32::from(step) * 2;
    let mut x = bits & X_MASK;
    let y = bits & Y_MASK;
    let zz = Y_MASK >> shift;

    if d > 0 {
        x = x.wrapping_add(zz.wrapping_add(1));
    } else {
        x |= zz;
        x = x.wrapping_sub(zz.wrapping_add(1));
    }

    x &= X_MASK >> shift;
    x | y
}

/// Move a `step`-precision code one cell along y (`d > 0` north, `d < 0` south).
///
/// `step` must be in `1..=32`.
#[inline]
pub fn move_y(bits: u64, step: u8, d: i8) -> u64 {
    debug_assert!((1..=32).contains(&step));
    if d == 0 {
        return bits;
    }

    let shift = 64 - u32::from(step) * 2;
    let x = bits & X_MASK;
    let mut y = bits & Y_MASK;
    let zz = X_MASK >> shift;

    if d > 0 {
        y = y.wrapping_add(zz.wrapping_add(1));
    } else {
        y |= zz;
        y = y.wrapping_sub(zz.wrapping_add(1));
    }

    y &= Y_MASK >> shift;
    x | y
}
