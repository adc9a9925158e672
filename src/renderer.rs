//! The renderer connection: the out-of-process surface a runner talks to in
//! order to actually show a coroutine's eDOM to a user. This crate treats
//! it exactly like the fetcher and timers — a capability trait, never a
//! concrete transport — because the interpreter core doesn't care whether
//! the renderer is a GUI window, a terminal, or a headless recorder.

use crate::edom::EdomOp;
use crate::error::HvmlError;

/// A request the interpreter sends to a renderer connection: window/page
/// lifecycle and the eDOM mutations `<update>`/`<iterate>`/`<archetype>`
/// produce via the matching [`EdomOp`].
#[derive(Debug, Clone)]
pub enum RendererRequest {
    CreatePage { title: String },
    DestroyPage,
    Mutate(EdomOp),
}

/// The capability a runner needs to talk to a renderer connection.
pub trait Renderer {
    fn send_request(&mut self, request: RendererRequest) -> Result<(), HvmlError>;
}

/// A `Renderer` that just records every request, for tests and embedders
/// that don't attach a real UI.
#[derive(Default)]
pub struct RecordingRenderer {
    pub sent: Vec<RendererRequest>,
}

impl Renderer for RecordingRenderer {
    fn send_request(&mut self, request: RendererRequest) -> Result<(), HvmlError> {
        self.sent.push(request);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vdom::ElementId;

    #[test]
    fn recording_renderer_collects_requests() {
        let mut renderer = RecordingRenderer::default();
        renderer
            .send_request(RendererRequest::CreatePage {
                title: "demo".into(),
            })
            .unwrap();
        renderer
            .send_request(RendererRequest::Mutate(EdomOp::Clear {
                target: ElementId(0),
            }))
            .unwrap();
        assert_eq!(renderer.sent.len(), 2);
    }
}
