/*!
`flp_file` reads and writes FL Studio project files and performs three-way
merges of their playlist arrangements.

The file is a pair of chunks: a fixed header (`FLhd`) and a data chunk
(`FLdt`) holding a flat stream of tagged events. A stateful interpreter lifts
the stream into a [`Project`] model; the serializer emits events back in the
canonical order so that, for files whose events are all understood, a
load/save round-trip is byte-identical. The [`diff`] and [`merge`] modules
compare and combine arrangements clip by clip.

```no_run
use flp_file::Project;

let project = Project::load("song.flp").unwrap();
for arrangement in &project.arrangements {
    println!("{} items", arrangement.items.len());
}
```
!*/

#[macro_use]
mod error;

mod byte_iter;

pub mod constants;
pub mod diagnostics;
pub mod diff;
pub mod file;
pub mod merge;
pub mod project;
pub mod text;
pub mod vlq;

pub use crate::error::{Error, Result};
pub use crate::project::Project;
pub use crate::text::Text;
