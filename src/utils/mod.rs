mod player_bit_set;
pub use self::player_bit_set::{ActivePlayerBitSetIter, PlayerBitSet};
