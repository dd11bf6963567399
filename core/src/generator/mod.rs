use crate::*;
pub use random::*;

mod random;

/// Seam for board generation strategies; consumed by value since a
/// generator is a one-shot recipe.
pub trait FieldGenerator {
    fn generate(self, config: &BoardConfig) -> Result<HexField>;
}
