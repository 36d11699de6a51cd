//! Generation 1 and 2 bag and party data.
//!
//! Game Boy saves store these unencrypted inside the main checksummed
//! region. Generation 2 keeps a second copy of each inside the region of
//! its second checksum; both copies are written on every edit.

pub mod bag;
pub mod party;

use crate::error::CoreError;
use crate::game::{Game, Generation};
use crate::{gen1, gen2};

/// Rewrites the checksums that cover bag and party data.
///
/// Gen1 box banks are left alone; an edit here never touches them.
pub(crate) fn recompute_checksums(buffer: &mut [u8], game: Game) -> Result<(), CoreError> {
    match game.generation() {
        Generation::One => {
            gen1::recompute(buffer, gen1::banks(game.japanese)[0])?;
        }
        Generation::Two => {
            gen2::recompute_save(buffer, game.variant, game.japanese)?;
        }
        Generation::Three => {
            return Err(CoreError::unsupported(format!(
                "{game} does not store Game Boy bag or party data"
            )));
        }
    }
    Ok(())
}
