pub mod model;
pub mod snapshot;

pub use model::{ScriptLine, ScriptShareState};
pub use snapshot::{build_snapshot, ActorLine, ReaderLine, SceneSnapshot};
