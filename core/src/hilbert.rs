//! Hilbert curve mapping between linear offsets and grid coordinates.
//!
//! The curve walks a `side x side` grid so that consecutive offsets always land on
//! neighbouring cells, which keeps addresses of the same subnet clustered in the picture.
//! Offset `0` is the top-left cell and the last offset ends in the top-right cell.

use ipmap_common::error::{ConfigError, MappingError};

const MAX_SIDE: u32 = 1 << 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HilbertMapper {
    side: u32,
}

impl HilbertMapper {
    pub fn new(side: u32) -> Result<Self, ConfigError> {
        if side == 0 || !side.is_power_of_two() || side > MAX_SIDE {
            return Err(ConfigError::InvalidCurveSide(side.into()));
        }
        Ok(Self { side })
    }

    pub fn side(&self) -> u32 {
        self.side
    }

    /// Number of cells on the curve, `side * side`.
    pub fn cells(&self) -> u64 {
        u64::from(self.side) * u64::from(self.side)
    }

    /// Converts a distance along the curve into `(x, y)`.
    pub fn map(&self, offset: u64) -> Result<(u32, u32), MappingError> {
        if offset >= self.cells() {
            return Err(MappingError::OffsetOutOfRange {
                offset,
                side: self.side,
            });
        }
        let (x, y) = d2xy(u64::from(self.side), offset);
        Ok((x as u32, y as u32))
    }

    /// Converts `(x, y)` back into a distance along the curve.
    pub fn index(&self, x: u32, y: u32) -> Result<u64, MappingError> {
        if x >= self.side || y >= self.side {
            return Err(MappingError::CoordinateOutOfRange {
                x,
                y,
                side: self.side,
            });
        }
        Ok(xy2d(u64::from(self.side), u64::from(x), u64::from(y)))
    }
}

#[inline(always)]
fn rot(n: u64, x: &mut u64, y: &mut u64, rx: u64, ry: u64) {
    if ry == 0 {
        if rx == 1 {
            *x = n - 1 - *x;
            *y = n - 1 - *y;
        }
        std::mem::swap(x, y);
    }
}

fn d2xy(n: u64, d: u64) -> (u64, u64) {
    let mut x = 0u64;
    let mut y = 0u64;
    let mut s = 1u64;
    let mut t = d;

    while s < n {
        let rx = 1 & (t / 2);
        let ry = 1 & (t ^ rx);

        rot(s, &mut x, &mut y, rx, ry);

        x += s * rx;
        y += s * ry;
        t /= 4;
        s *= 2;
    }

    (x, y)
}

fn xy2d(n: u64, mut x: u64, mut y: u64) -> u64 {
    let mut d = 0u64;
    let mut s = n / 2;

    while s > 0 {
        let rx = u64::from((x & s) > 0);
        let ry = u64::from((y & s) > 0);
        d += s * s * ((3 * rx) ^ ry);
        // Fold back into the lower quadrant before rotating.
        x &= s - 1;
        y &= s - 1;
        rot(s, &mut x, &mut y, rx, ry);
        s /= 2;
    }

    d
}
