use crate::file::PlaylistItem;
use crate::project::Misc;
use crate::text::Text;

/// A timeline of placed clips referencing patterns or channels.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Arrangement {
    /// `None` renders as "Arrangement {index}".
    pub name: Option<Text>,
    pub items: Vec<PlaylistItem>,
    pub tracks: Vec<ArrangementTrack>,
    pub misc: Misc,
}

/// A track (row) of the arrangement.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ArrangementTrack {
    /// `None` renders as "Track {index}".
    pub name: Option<Text>,
    pub misc: Misc,
}
