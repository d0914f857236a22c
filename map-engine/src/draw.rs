//! Interactive draw sessions fed by pointer vertices.

use std::collections::HashMap;

use map_core::{Coordinate, DrawShape, EngineError, EngineResult, Geometry, HandleId};

/// Minimum vertices before a session of each shape can finish.
const fn min_vertices(shape: DrawShape) -> usize {
    match shape {
        DrawShape::Point => 1,
        DrawShape::LineString => 2,
        DrawShape::Polygon => 3,
    }
}

/// One in-progress sketch.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawSession {
    shape: DrawShape,
    vertices: Vec<Coordinate>,
    finished: bool,
}

impl DrawSession {
    fn new(shape: DrawShape) -> Self {
        Self {
            shape,
            vertices: Vec::new(),
            finished: false,
        }
    }

    /// Shape being drawn.
    #[must_use]
    pub const fn shape(&self) -> DrawShape {
        self.shape
    }

    /// Vertices placed so far.
    #[must_use]
    pub fn vertices(&self) -> &[Coordinate] {
        &self.vertices
    }

    /// Whether the session already emitted its geometry.
    #[must_use]
    pub const fn is_finished(&self) -> bool {
        self.finished
    }
}

/// All live draw sessions, keyed by handle.
#[derive(Debug, Default)]
pub struct DrawSessions {
    next: u64,
    sessions: HashMap<HandleId, DrawSession>,
}

impl DrawSessions {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a session and issue a fresh handle. Handles are never reused.
    pub fn begin(&mut self, shape: DrawShape) -> HandleId {
        self.next += 1;
        let handle = HandleId::new(self.next);
        self.sessions.insert(handle, DrawSession::new(shape));
        handle
    }

    /// Look up a session.
    #[must_use]
    pub fn get(&self, handle: HandleId) -> Option<&DrawSession> {
        self.sessions.get(&handle)
    }

    fn get_mut(&mut self, handle: HandleId) -> EngineResult<&mut DrawSession> {
        self.sessions
            .get_mut(&handle)
            .ok_or(EngineError::UnknownHandle(handle))
    }

    /// Place a vertex. Returns the vertex count.
    ///
    /// # Errors
    ///
    /// Returns an error for unknown or finished sessions, or a second vertex
    /// on a point session.
    pub fn add_vertex(&mut self, handle: HandleId, coordinate: Coordinate) -> EngineResult<usize> {
        let session = self.get_mut(handle)?;
        if session.finished {
            return Err(EngineError::IncompleteGeometry(format!(
                "session {handle} already finished"
            )));
        }
        if session.shape == DrawShape::Point && !session.vertices.is_empty() {
            return Err(EngineError::UnsupportedShape(format!(
                "point session {handle} takes a single vertex"
            )));
        }
        session.vertices.push(coordinate);
        Ok(session.vertices.len())
    }

    /// Close the sketch and produce its geometry. A session finishes once.
    ///
    /// # Errors
    ///
    /// Returns an error for unknown or already finished sessions, or when
    /// there are too few vertices for the shape.
    pub fn finish(&mut self, handle: HandleId) -> EngineResult<Geometry> {
        let session = self.get_mut(handle)?;
        if session.finished {
            return Err(EngineError::IncompleteGeometry(format!(
                "session {handle} already finished"
            )));
        }
        let needed = min_vertices(session.shape);
        if session.vertices.len() < needed {
            return Err(EngineError::IncompleteGeometry(format!(
                "{:?} needs {needed} vertices, has {}",
                session.shape,
                session.vertices.len()
            )));
        }

        session.finished = true;
        let vertices = session.vertices.clone();
        let geometry = match session.shape {
            DrawShape::Point => Geometry::point(vertices[0]),
            DrawShape::LineString => Geometry::line_string(vertices),
            DrawShape::Polygon => Geometry::polygon(vertices),
        };
        Ok(geometry)
    }

    /// Drop a session, finished or not.
    ///
    /// # Errors
    ///
    /// Returns an error if the handle is unknown.
    pub fn release(&mut self, handle: HandleId) -> EngineResult<DrawSession> {
        self.sessions
            .remove(&handle)
            .ok_or(EngineError::UnknownHandle(handle))
    }

    /// Number of live sessions.
    #[must_use]
    pub fn live(&self) -> usize {
        self.sessions.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(x: f64, y: f64) -> Coordinate {
        Coordinate::new(x, y)
    }

    #[test]
    fn test_handles_are_unique() {
        let mut sessions = DrawSessions::new();
        let a = sessions.begin(DrawShape::Point);
        let b = sessions.begin(DrawShape::Point);
        assert_ne!(a, b);
        sessions.release(a).expect("release");
        let c = sessions.begin(DrawShape::Point);
        assert_ne!(a, c);
    }

    #[test]
    fn test_line_needs_two_vertices() {
        let mut sessions = DrawSessions::new();
        let h = sessions.begin(DrawShape::LineString);
        sessions.add_vertex(h, c(0.0, 0.0)).expect("vertex");
        assert!(matches!(sessions.finish(h), Err(EngineError::IncompleteGeometry(_))));
        sessions.add_vertex(h, c(1.0, 0.0)).expect("vertex");
        let geometry = sessions.finish(h).expect("finish");
        assert_eq!(geometry, Geometry::line_string(vec![c(0.0, 0.0), c(1.0, 0.0)]));
    }

    #[test]
    fn test_polygon_closing_vertex_dropped() {
        let mut sessions = DrawSessions::new();
        let h = sessions.begin(DrawShape::Polygon);
        for v in [c(0.0, 0.0), c(1.0, 0.0), c(1.0, 1.0), c(0.0, 0.0)] {
            sessions.add_vertex(h, v).expect("vertex");
        }
        match sessions.finish(h).expect("finish") {
            Geometry::Polygon { ring } => assert_eq!(ring.len(), 3),
            other => panic!("Expected polygon, got {other:?}"),
        }
    }

    #[test]
    fn test_finish_only_once() {
        let mut sessions = DrawSessions::new();
        let h = sessions.begin(DrawShape::Point);
        sessions.add_vertex(h, c(5.0, 5.0)).expect("vertex");
        sessions.finish(h).expect("first finish");
        assert!(sessions.finish(h).is_err());
        assert!(sessions.add_vertex(h, c(6.0, 6.0)).is_err());
    }

    #[test]
    fn test_point_takes_single_vertex() {
        let mut sessions = DrawSessions::new();
        let h = sessions.begin(DrawShape::Point);
        sessions.add_vertex(h, c(0.0, 0.0)).expect("vertex");
        assert!(matches!(
            sessions.add_vertex(h, c(1.0, 1.0)),
            Err(EngineError::UnsupportedShape(_))
        ));
    }

    #[test]
    fn test_release_unknown_handle() {
        let mut sessions = DrawSessions::new();
        assert!(matches!(
            sessions.release(HandleId::new(99)),
            Err(EngineError::UnknownHandle(_))
        ));
    }

    #[test]
    fn test_release_discards_partial_sketch() {
        let mut sessions = DrawSessions::new();
        let h = sessions.begin(DrawShape::LineString);
        sessions.add_vertex(h, c(0.0, 0.0)).expect("vertex");
        let dropped = sessions.release(h).expect("release");
        assert_eq!(dropped.vertices().len(), 1);
        assert!(!dropped.is_finished());
        assert_eq!(sessions.live(), 0);
    }
}
