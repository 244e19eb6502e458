use crate::message::BoardEvent;
use crate::shape::Shape;

/// The seam toward the presentation layer: callbacks a participant's view
/// registers against pushed board events.
pub trait BoardView {
    fn shape_added(&mut self, shape: &Shape);
    fn cleared(&mut self);
    fn participants_changed(&mut self, names: &[String]);
    fn kicked(&mut self, reason: &str);

    /// Routes one pushed event to the matching callback.
    fn apply(&mut self, event: &BoardEvent) {
        match event {
            BoardEvent::ShapeAdded(shape) => self.shape_added(shape),
            BoardEvent::Cleared => self.cleared(),
            BoardEvent::ParticipantsChanged(names) => self.participants_changed(names),
            BoardEvent::Kicked { reason } => self.kicked(reason),
            BoardEvent::Ping => {}
        }
    }
}
