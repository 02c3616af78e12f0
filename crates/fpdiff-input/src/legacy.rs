//! Knuth subtractive generator.
//!
//! Bit-compatible with the seeded `Random(int)` of the classic managed
//! runtimes, so a seed reproduces the exact sample set that runtime produced.
//! Table arithmetic wraps on overflow, as the unchecked original does.

const MBIG: i32 = i32::MAX;
const MSEED: i32 = 161_803_398;
const TABLE_LEN: usize = 56;

/// Seeded subtractive pseudo-random generator.
#[derive(Clone, Debug)]
pub struct LegacyRandom {
    table: [i32; TABLE_LEN],
    next: usize,
    next_p: usize,
}

impl LegacyRandom {
    /// Create a generator from a seed.
    ///
    /// Negative seeds use their absolute value; `i32::MIN` maps to `i32::MAX`.
    #[must_use]
    pub fn new(seed: i32) -> Self {
        let subtraction = if seed == i32::MIN { MBIG } else { seed.abs() };
        let mut table = [0i32; TABLE_LEN];

        let mut mj = MSEED - subtraction;
        table[55] = mj;
        let mut mk = 1i32;
        for i in 1..55 {
            let ii = (21 * i) % 55;
            table[ii] = mk;
            mk = mj.wrapping_sub(mk);
            if mk < 0 {
                mk += MBIG;
            }
            mj = table[ii];
        }

        for _ in 1..5 {
            for i in 1..TABLE_LEN {
                table[i] = table[i].wrapping_sub(table[1 + (i + 30) % 55]);
                if table[i] < 0 {
                    table[i] += MBIG;
                }
            }
        }

        Self {
            table,
            next: 0,
            next_p: 21,
        }
    }

    /// Next raw sample in `[0, i32::MAX)`.
    pub fn next_sample(&mut self) -> i32 {
        let mut next = self.next + 1;
        if next >= TABLE_LEN {
            next = 1;
        }
        let mut next_p = self.next_p + 1;
        if next_p >= TABLE_LEN {
            next_p = 1;
        }

        let mut value = self.table[next].wrapping_sub(self.table[next_p]);
        if value == MBIG {
            value -= 1;
        }
        if value < 0 {
            value += MBIG;
        }

        self.table[next] = value;
        self.next = next;
        self.next_p = next_p;
        value
    }

    /// Next double in `[0, 1)`.
    pub fn next_f64(&mut self) -> f64 {
        f64::from(self.next_sample()) * (1.0 / f64::from(MBIG))
    }

    /// Next double narrowed to single precision (round-to-nearest).
    ///
    /// Can return exactly `1.0` when the double lies within half an ulp of it.
    #[allow(clippy::cast_possible_truncation)]
    pub fn next_f32(&mut self) -> f32 {
        self.next_f64() as f32
    }
}

impl Iterator for LegacyRandom {
    type Item = f32;

    fn next(&mut self) -> Option<f32> {
        Some(self.next_f32())
    }
}
