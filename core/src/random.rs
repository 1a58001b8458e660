pub const PUZZLE_SEED: u32 = 0x5EED_2520;

/// One round of the splitmix32 finalizer; the base of every seeded choice.
pub fn splitmix32(mut value: u32) -> u32 {
    value = value.wrapping_add(0x9E37_79B9);
    let mut z = value;
    z = (z ^ (z >> 16)).wrapping_mul(0x85EB_CA6B);
    z = (z ^ (z >> 13)).wrapping_mul(0xC2B2_AE35);
    z ^ (z >> 16)
}

/// Uniform value in `[0, 1)` from the top 24 bits of a mixed seed.
pub fn rand_unit(seed: u32, salt: u32) -> f32 {
    let mixed = splitmix32(seed ^ salt);
    let top = mixed >> 8;
    top as f32 / ((1u32 << 24) as f32)
}

/// Uniform value in `[min, max)`.
pub fn rand_range(seed: u32, salt: u32, min: f32, max: f32) -> f32 {
    min + (max - min) * rand_unit(seed, salt)
}

pub fn edge_seed(base: u32, orientation: u32, col: u32, row: u32) -> u32 {
    base ^ orientation.wrapping_mul(0x9E37_79B9)
        ^ row.wrapping_mul(0x85EB_CA6B)
        ^ col.wrapping_mul(0xC2B2_AE35)
}

pub fn scatter_seed(base: u32, cols: usize, rows: usize) -> u32 {
    let grid = ((cols as u32) << 16) ^ (rows as u32);
    base ^ grid ^ 0x5CA7_7EED
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_stays_in_half_open_range() {
        for salt in 0..512 {
            let value = rand_unit(PUZZLE_SEED, salt);
            assert!((0.0..1.0).contains(&value), "salt {salt} gave {value}");
        }
    }

    #[test]
    fn edge_seeds_differ_by_orientation() {
        assert_ne!(edge_seed(7, 0, 1, 1), edge_seed(7, 1, 1, 1));
        assert_eq!(edge_seed(7, 1, 3, 2), edge_seed(7, 1, 3, 2));
    }
}
