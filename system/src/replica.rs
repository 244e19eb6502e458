use crate::canvas::CanvasState;
use crate::shape::Shape;
use crate::traits::BoardView;

/// Client-side mirror of the shared board, seeded from the join snapshot
/// and kept current by applying pushed events in delivery order.
pub struct ClientReplica {
    canvas: CanvasState,
    participants: Vec<String>,
    kicked_reason: Option<String>,
}

impl ClientReplica {
    pub fn new() -> Self {
        Self::from_join(Vec::new(), Vec::new())
    }

    pub fn from_join(shapes: Vec<Shape>, participants: Vec<String>) -> Self {
        let mut canvas = CanvasState::new();
        for shape in shapes {
            canvas.append(shape);
        }
        Self {
            canvas,
            participants,
            kicked_reason: None,
        }
    }

    pub fn shapes(&self) -> &[Shape] {
        self.canvas.shapes()
    }

    pub fn participants(&self) -> &[String] {
        &self.participants
    }

    pub fn kicked_reason(&self) -> Option<&str> {
        self.kicked_reason.as_deref()
    }
}

impl BoardView for ClientReplica {
    fn shape_added(&mut self, shape: &Shape) {
        self.canvas.append(shape.clone());
    }

    fn cleared(&mut self) {
        self.canvas.clear();
    }

    fn participants_changed(&mut self, names: &[String]) {
        self.participants = names.to_vec();
    }

    fn kicked(&mut self, reason: &str) {
        log::warn!("removed from the board: {}", reason);
        self.kicked_reason = Some(reason.to_owned());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::BoardEvent;
    use crate::shape::{Color, ShapeStyle};
    use euclid::default::{Point2D, Rect, Size2D};

    fn rect(x: f32) -> Shape {
        Shape::Rectangle {
            bounds: Rect::new(Point2D::new(x, x), Size2D::new(10.0, 10.0)),
            style: ShapeStyle {
                color: Color::default(),
                filled: true,
            },
        }
    }

    #[test]
    fn it_mirrors_events_in_delivery_order() {
        let mut replica = ClientReplica::new();
        replica.apply(&BoardEvent::ShapeAdded(rect(1.0)));
        replica.apply(&BoardEvent::ShapeAdded(rect(2.0)));
        assert_eq!(replica.shapes(), &[rect(1.0), rect(2.0)]);

        replica.apply(&BoardEvent::Cleared);
        assert!(replica.shapes().is_empty());

        replica.apply(&BoardEvent::ShapeAdded(rect(3.0)));
        replica.apply(&BoardEvent::Ping);
        assert_eq!(replica.shapes(), &[rect(3.0)]);
    }

    #[test]
    fn it_tracks_membership_and_kicks() {
        let mut replica = ClientReplica::from_join(vec![rect(1.0)], vec!["alice".to_owned()]);
        assert_eq!(replica.shapes(), &[rect(1.0)]);

        replica.apply(&BoardEvent::ParticipantsChanged(vec![
            "alice".to_owned(),
            "bob".to_owned(),
        ]));
        assert_eq!(replica.participants(), &["alice", "bob"]);

        assert_eq!(replica.kicked_reason(), None);
        replica.apply(&BoardEvent::Kicked {
            reason: "closing time".to_owned(),
        });
        assert_eq!(replica.kicked_reason(), Some("closing time"));
    }
}
