//! Backend commands queued from UI to backend worker.

use shared::{GenerationId, RenderOptions};

pub enum BackendCommand {
    Encode {
        id: GenerationId,
        text: String,
        options: RenderOptions,
    },
    Shutdown,
}
