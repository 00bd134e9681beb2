use crate::project::Misc;
use crate::text::Text;

/// A reusable clip of notes that can be placed on the playlist. Identity is
/// the position in the project's pattern list; on disk pattern indices are
/// 1-based.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Pattern {
    /// `None` renders as "Pattern {index + 1}".
    pub name: Option<Text>,
    pub misc: Misc,
}
