//! Space-efficient bitmap for tracking initialized ticks.
//!
//! Grounded on `tick_bitmap.rs`'s `position`/`is_initialized`/`flip_tick`/
//! `next_initialized_tick_in_direction` shape (256-bit words, one bit per
//! tick-spacing-compressed tick, keyed by word index in a `HashMap`), dropping the
//! Anchor `AnchorSerialize`/`U256Wrapper` plumbing this crate has no on-chain
//! account to serialize into, and using `primitive_types::U256` directly.
//!
//! Fixes one bug along the way: the teacher computes `word_pos = tick / WORD_SIZE`
//! and `bit_pos = tick % WORD_SIZE` with plain integer division, which truncates
//! toward zero and gives the wrong word/bit pair for negative ticks (e.g. tick -5
//! truncates to word 0, bit -5, rather than word -1, bit 251). Rust's arithmetic
//! right shift and bitwise AND on a two's-complement `i32` give the mathematically
//! correct floor-division decomposition directly, so `position` here uses `>> 8`/
//! `& 0xFF` instead of `/`/`%`.
use crate::error::PoolError;
use primitive_types::U256;
use std::collections::HashMap;

/// Bits per bitmap word.
pub const WORD_SIZE: i32 = 256;

/// Splits a tick-spacing-compressed tick into its word index and the bit position
/// within that word. `compressed >> 8` floors toward negative infinity and
/// `compressed & 0xFF` yields the low 8 bits of the two's-complement
/// representation, so `word_pos * 256 + bit_pos == compressed` holds for every
/// `compressed`, positive or negative.
fn position(compressed: i32) -> (i16, u8) {
    let word_pos = (compressed >> 8) as i16;
    let bit_pos = (compressed & 0xFF) as u8;
    (word_pos, bit_pos)
}

/// Maps word index to a 256-bit word, one bit per compressed tick. Absent entries
/// are implicitly all-zero (no initialized ticks in that word).
#[derive(Debug, Default)]
pub struct TickBitmap {
    words: HashMap<i16, U256>,
}

impl TickBitmap {
    pub fn new() -> Self {
        Self { words: HashMap::new() }
    }

    /// Flips the bit for `tick` (which must be a multiple of `tick_spacing`),
    /// marking it initialized if it was clear or vice versa. Callers only invoke
    /// this when [`crate::tick::TickInfo::update`] reports a flip, so there is no
    /// separate `initialized: bool` parameter — every call here is a toggle.
    pub fn flip_tick(&mut self, tick: i32, tick_spacing: i32) -> Result<(), PoolError> {
        if tick % tick_spacing != 0 {
            return Err(PoolError::TickNotSpaced);
        }
        let compressed = tick / tick_spacing;
        let (word_pos, bit_pos) = position(compressed);
        let word = self.words.entry(word_pos).or_insert_with(U256::zero);
        *word ^= U256::one() << bit_pos;
        Ok(())
    }

    /// Returns the raw 256-bit word at `word_pos`, or all-zero if nothing has been
    /// flipped into it yet. Exposed read-only for callers that want to inspect the
    /// bitmap directly rather than probing one tick at a time.
    pub fn word(&self, word_pos: i16) -> U256 {
        self.words.get(&word_pos).copied().unwrap_or_default()
    }

    pub fn is_initialized(&self, tick: i32, tick_spacing: i32) -> bool {
        if tick % tick_spacing != 0 {
            return false;
        }
        let compressed = tick / tick_spacing;
        let (word_pos, bit_pos) = position(compressed);
        match self.words.get(&word_pos) {
            Some(word) => (*word & (U256::one() << bit_pos)) != U256::zero(),
            None => false,
        }
    }

    /// Finds the next initialized tick within the same word as `tick`, searching
    /// toward zero (`lte = true`, i.e. less-than-or-equal, used when the swap price
    /// is falling) or away from it (`lte = false`, used when it is rising).
    ///
    /// Unlike [`flip_tick`], `tick` need not itself be a multiple of `tick_spacing`
    /// — the swap loop calls this with the pool's *current* tick, which tracks the
    /// current price and is almost never spacing-aligned. `compress` uses
    /// `div_euclid` (floor division, not truncation) so the compressed tick is
    /// correct for negative `tick` too, mirroring the teacher's own
    /// `tick / tickSpacing` decompression one level up from `position`'s bit split.
    ///
    /// Returns `(next_tick, initialized)`. When no initialized tick exists in the
    /// word, `next_tick` is the word's boundary tick (one past the end in the
    /// search direction) and `initialized` is `false` — the caller advances to that
    /// boundary and the swap loop tries again from there, exactly as
    /// `next_initialized_tick_in_direction`'s multi-word traversal does in the
    /// teacher, just split into a single-word step here per §4.6.
    pub fn next_initialized_tick_within_one_word(
        &self,
        tick: i32,
        tick_spacing: i32,
        lte: bool,
    ) -> Result<(i32, bool), PoolError> {
        let compressed = tick.div_euclid(tick_spacing);

        if lte {
            let (word_pos, bit_pos) = position(compressed);
            let word = self.words.get(&word_pos).copied().unwrap_or_default();

            let mask = if bit_pos == 0 {
                U256::one()
            } else {
                (U256::one() << (bit_pos as u32 + 1)) - U256::one()
            };
            let masked = word & mask;
            if masked.is_zero() {
                let next_compressed = compressed - bit_pos as i32;
                Ok((next_compressed * tick_spacing, false))
            } else {
                let msb = 255 - masked.leading_zeros() as i32;
                let next_compressed = compressed - (bit_pos as i32 - msb);
                Ok((next_compressed * tick_spacing, true))
            }
        } else {
            // Per §4.6 the search starts strictly above `tick`, at `compressed(t)+1` —
            // which may fall in the next word entirely when `bit_pos == 255` — not at
            // `compressed(t)` itself. Reusing `tick`'s own word/bit (as the `lte` branch
            // does, by design, since `lte` is inclusive of `tick`) would report `tick`
            // itself as the "next" initialized tick whenever `tick` is already
            // initialized, which is exactly the case every time the swap loop crosses a
            // tick going up.
            let compressed_start = compressed + 1;
            let (word_pos, bit_pos) = position(compressed_start);
            let word = self.words.get(&word_pos).copied().unwrap_or_default();

            let mask = !((U256::one() << bit_pos) - U256::one());
            let masked = word & mask;
            if masked.is_zero() {
                let next_compressed = compressed_start + (255 - bit_pos as i32);
                Ok((next_compressed * tick_spacing, false))
            } else {
                let lsb = masked.trailing_zeros() as i32;
                let next_compressed = compressed_start + (lsb - bit_pos as i32);
                Ok((next_compressed * tick_spacing, true))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position_floors_correctly_for_negative_compressed_ticks() {
        assert_eq!(position(-5), (-1, 251));
        assert_eq!(position(5), (0, 5));
        assert_eq!(position(-256), (-1, 0));
        assert_eq!(position(-257), (-2, 255));
    }

    #[test]
    fn flip_tick_rejects_misaligned_tick() {
        let mut bitmap = TickBitmap::new();
        assert_eq!(bitmap.flip_tick(7, 10).unwrap_err(), PoolError::TickNotSpaced);
    }

    #[test]
    fn flip_tick_then_is_initialized_round_trips() {
        let mut bitmap = TickBitmap::new();
        assert!(!bitmap.is_initialized(-100, 10));
        bitmap.flip_tick(-100, 10).unwrap();
        assert!(bitmap.is_initialized(-100, 10));
        bitmap.flip_tick(-100, 10).unwrap();
        assert!(!bitmap.is_initialized(-100, 10));
    }

    #[test]
    fn next_initialized_tick_within_one_word_finds_set_bit_searching_up() {
        let mut bitmap = TickBitmap::new();
        bitmap.flip_tick(50, 10).unwrap(); // compressed tick 5
        let (next, found) = bitmap.next_initialized_tick_within_one_word(0, 10, false).unwrap();
        assert!(found);
        assert_eq!(next, 50);
    }

    #[test]
    fn next_initialized_tick_within_one_word_finds_set_bit_searching_down() {
        let mut bitmap = TickBitmap::new();
        bitmap.flip_tick(-50, 10).unwrap();
        let (next, found) = bitmap.next_initialized_tick_within_one_word(0, 10, true).unwrap();
        assert!(found);
        assert_eq!(next, -50);
    }

    #[test]
    fn next_initialized_tick_within_one_word_reports_boundary_when_empty() {
        let bitmap = TickBitmap::new();
        let (next, found) = bitmap.next_initialized_tick_within_one_word(0, 1, false).unwrap();
        assert!(!found);
        assert_eq!(next, 255);

        let (next, found) = bitmap.next_initialized_tick_within_one_word(0, 1, true).unwrap();
        assert!(!found);
        assert_eq!(next, 0);
    }

    #[test]
    fn accepts_unaligned_current_tick_during_a_swap() {
        // The swap loop's current tick tracks the price and is rarely a multiple of
        // tick_spacing; searching from it must not require alignment.
        let mut bitmap = TickBitmap::new();
        bitmap.flip_tick(50, 10).unwrap();
        let (next, found) = bitmap.next_initialized_tick_within_one_word(3, 10, false).unwrap();
        assert!(found);
        assert_eq!(next, 50);
    }

    #[test]
    fn finds_self_when_tick_itself_is_initialized_searching_lte() {
        let mut bitmap = TickBitmap::new();
        bitmap.flip_tick(30, 10).unwrap();
        let (next, found) = bitmap.next_initialized_tick_within_one_word(30, 10, true).unwrap();
        assert!(found);
        assert_eq!(next, 30);
    }

    /// Regression: searching `!lte` from a tick that is itself initialized must skip
    /// past it to the next strictly-greater initialized tick, not report itself again
    /// — this is exactly what happens every time the swap loop crosses a tick going up
    /// (`pool.rs` sets `tick_current := tick_next` for `zero_for_one == false`, then
    /// re-enters the bitmap search from that same tick on the next iteration).
    #[test]
    fn does_not_find_self_when_tick_itself_is_initialized_searching_gt() {
        let mut bitmap = TickBitmap::new();
        bitmap.flip_tick(10, 10).unwrap();
        bitmap.flip_tick(30, 10).unwrap();
        let (next, found) = bitmap.next_initialized_tick_within_one_word(10, 10, false).unwrap();
        assert!(found);
        assert_eq!(next, 30);
    }
}
