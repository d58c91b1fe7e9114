//! The owned scene graph behind the drawing surface.
//!
//! Every frame is painted from a [`CanvasState`]; pointer handlers only ever
//! call the operations below. Nothing here knows about egui.

use itertools::Itertools;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::geometry::{distance_to_segment, Point};
use crate::model::{Connection, ConnectionId, ElementType, Icon, IconId};
use crate::params::IconParams;

const HISTORY_LIMIT: usize = 50;

#[derive(Debug, Error, PartialEq)]
pub enum CanvasError {
    #[error("no icon with id {0}")]
    UnknownIcon(IconId),
    #[error("no connection {0}")]
    UnknownConnection(ConnectionId),
    #[error("connection {connection} has no vertex {index}")]
    UnknownVertex {
        connection: ConnectionId,
        index: usize,
    },
}

type Snapshot = (Vec<Icon>, Vec<Connection>);

#[derive(Debug, Default)]
pub struct CanvasState {
    icons: Vec<Icon>,
    connections: Vec<Connection>,
    pending_endpoint: Option<IconId>,
    awaiting_params: Option<IconId>,
    next_connection_id: u64,
    undo_stack: Vec<Snapshot>,
    redo_stack: Vec<Snapshot>,
}

impl CanvasState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn icons(&self) -> &[Icon] {
        &self.icons
    }

    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    pub fn icon(&self, id: &IconId) -> Option<&Icon> {
        self.icons.iter().find(|icon| &icon.id == id)
    }

    pub fn connection(&self, id: ConnectionId) -> Option<&Connection> {
        self.connections.iter().find(|conn| conn.id == id)
    }

    /// First endpoint of a connection being drawn, if one was clicked.
    pub fn pending_endpoint(&self) -> Option<&IconId> {
        self.pending_endpoint.as_ref()
    }

    /// Icon whose parameter dialog is open.
    pub fn awaiting_params(&self) -> Option<&IconId> {
        self.awaiting_params.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.icons.is_empty() && self.connections.is_empty()
    }

    pub fn place_icon(&mut self, element: ElementType, position: Point) -> IconId {
        self.record_snapshot();
        let id = self.fresh_icon_id(element);
        self.icons.push(Icon {
            id: id.clone(),
            element,
            position,
            params: None,
        });
        self.awaiting_params = Some(id.clone());
        info!(icon = %id, x = position.x, y = position.y, "placed icon");
        id
    }

    fn fresh_icon_id(&self, element: ElementType) -> IconId {
        let millis = chrono::Utc::now().timestamp_millis();
        (0u32..)
            .map(|n| IconId::new(element, millis, n))
            .find(|candidate| self.icon(candidate).is_none())
            .unwrap_or_else(|| IconId::new(element, millis, u32::MAX))
    }

    /// Stores a record on the icon. A changed record is its own undo step,
    /// except the first record of an icon placed in the latest step.
    pub fn commit_params(&mut self, id: &IconId, params: IconParams) -> Result<(), CanvasError> {
        let current = self.icon(id).ok_or_else(|| CanvasError::UnknownIcon(id.clone()))?;
        let changed = current.params.as_ref() != Some(&params);
        let just_placed = current.params.is_none()
            && self
                .undo_stack
                .last()
                .is_some_and(|(icons, _)| icons.iter().all(|icon| &icon.id != id));
        if changed && !just_placed {
            self.record_snapshot();
        }

        let icon = self
            .icons
            .iter_mut()
            .find(|icon| &icon.id == id)
            .ok_or_else(|| CanvasError::UnknownIcon(id.clone()))?;
        if params.element() != icon.element {
            warn!(icon = %id, "parameters for {:?} stored on a {:?}", params.element(), icon.element);
        }
        icon.params = Some(params);
        if self.awaiting_params.as_ref() == Some(id) {
            self.awaiting_params = None;
        }
        info!(icon = %id, "committed parameters");
        Ok(())
    }

    /// Closes the parameter dialog without touching the record.
    pub fn dismiss_params(&mut self) {
        self.awaiting_params = None;
    }

    /// Re-opens the parameter dialog for an existing icon.
    pub fn edit_params(&mut self, id: &IconId) -> Result<(), CanvasError> {
        if self.icon(id).is_none() {
            return Err(CanvasError::UnknownIcon(id.clone()));
        }
        self.awaiting_params = Some(id.clone());
        Ok(())
    }

    pub fn move_icon(&mut self, id: &IconId, position: Point) -> Result<(), CanvasError> {
        let icon = self
            .icons
            .iter_mut()
            .find(|icon| &icon.id == id)
            .ok_or_else(|| CanvasError::UnknownIcon(id.clone()))?;
        icon.position = position;
        Ok(())
    }

    /// Feeds a click into the two-slot selection buffer. The second click
    /// creates a connection and empties the buffer.
    pub fn click_icon(&mut self, id: &IconId) -> Option<ConnectionId> {
        if self.icon(id).is_none() {
            debug!(icon = %id, "click on missing icon ignored");
            return None;
        }
        let Some(first) = self.pending_endpoint.take() else {
            self.pending_endpoint = Some(id.clone());
            return None;
        };

        if &first == id {
            warn!(icon = %id, "connection loops back onto the same icon");
        }
        if self.connections.iter().any(|conn| conn.joins(&first, id)) {
            warn!(from = %first, to = %id, "duplicate connection between icons");
        }

        self.record_snapshot();
        let conn_id = ConnectionId(self.next_connection_id);
        self.next_connection_id += 1;
        self.connections.push(Connection {
            id: conn_id,
            from: first.clone(),
            to: id.clone(),
            vertices: vec![],
        });
        info!(connection = %conn_id, from = %first, to = %id, "connected icons");
        Some(conn_id)
    }

    /// True when `id` is already the pending endpoint, so a second click on
    /// it is a repeat rather than the other end of a cable.
    pub fn is_repeat_click(&self, id: &IconId) -> bool {
        self.pending_endpoint.as_ref() == Some(id)
    }

    pub fn clear_selection(&mut self) {
        self.pending_endpoint = None;
    }

    /// Removes the icon and every connection touching it. Returns the number
    /// of connections dropped.
    pub fn delete_icon(&mut self, id: &IconId) -> Result<usize, CanvasError> {
        if self.icon(id).is_none() {
            return Err(CanvasError::UnknownIcon(id.clone()));
        }
        self.record_snapshot();
        self.icons.retain(|icon| &icon.id != id);
        let before = self.connections.len();
        self.connections.retain(|conn| !conn.touches(id));
        let removed = before - self.connections.len();

        if self.pending_endpoint.as_ref() == Some(id) {
            self.pending_endpoint = None;
        }
        if self.awaiting_params.as_ref() == Some(id) {
            self.awaiting_params = None;
        }
        info!(icon = %id, connections = removed, "deleted icon");
        Ok(removed)
    }

    pub fn delete_connection(&mut self, id: ConnectionId) -> Result<(), CanvasError> {
        if self.connection(id).is_none() {
            return Err(CanvasError::UnknownConnection(id));
        }
        self.record_snapshot();
        self.connections.retain(|conn| conn.id != id);
        info!(connection = %id, "deleted connection");
        Ok(())
    }

    /// Appends a bend vertex. Order follows insertion, not position along the
    /// line.
    pub fn insert_vertex(&mut self, id: ConnectionId, point: Point) -> Result<usize, CanvasError> {
        if self.connection(id).is_none() {
            return Err(CanvasError::UnknownConnection(id));
        }
        self.record_snapshot();
        let conn = self.connection_mut(id)?;
        conn.vertices.push(point);
        debug!(connection = %id, vertices = conn.vertices.len(), "inserted vertex");
        Ok(conn.vertices.len() - 1)
    }

    pub fn move_vertex(&mut self, id: ConnectionId, index: usize, point: Point) -> Result<(), CanvasError> {
        let conn = self.connection_mut(id)?;
        let vertex = conn
            .vertices
            .get_mut(index)
            .ok_or(CanvasError::UnknownVertex {
                connection: id,
                index,
            })?;
        *vertex = point;
        Ok(())
    }

    pub fn delete_vertex(&mut self, id: ConnectionId, index: usize) -> Result<Point, CanvasError> {
        let len = self.connection(id).map(|conn| conn.vertices.len());
        match len {
            None => return Err(CanvasError::UnknownConnection(id)),
            Some(len) if index >= len => {
                return Err(CanvasError::UnknownVertex {
                    connection: id,
                    index,
                })
            }
            Some(_) => {}
        }
        self.record_snapshot();
        let removed = self.connection_mut(id)?.vertices.remove(index);
        debug!(connection = %id, index, "deleted vertex");
        Ok(removed)
    }

    fn connection_mut(&mut self, id: ConnectionId) -> Result<&mut Connection, CanvasError> {
        self.connections
            .iter_mut()
            .find(|conn| conn.id == id)
            .ok_or(CanvasError::UnknownConnection(id))
    }

    /// Rendered geometry of a connection: first anchor, bends, second anchor.
    /// `None` when either endpoint no longer exists.
    pub fn polyline(&self, conn: &Connection) -> Option<Vec<Point>> {
        let from = self.icon(&conn.from)?.position;
        let to = self.icon(&conn.to)?.position;
        let mut points = Vec::with_capacity(conn.vertices.len() + 2);
        points.push(from);
        points.extend_from_slice(&conn.vertices);
        points.push(to);
        Some(points)
    }

    /// Topmost icon whose square of side `icon_size` contains `p`.
    pub fn hit_icon(&self, p: Point, icon_size: f32) -> Option<&IconId> {
        let half = icon_size / 2.0;
        self.icons
            .iter()
            .rev()
            .find(|icon| (p.x - icon.position.x).abs() <= half && (p.y - icon.position.y).abs() <= half)
            .map(|icon| &icon.id)
    }

    pub fn hit_vertex(&self, p: Point, tolerance: f32) -> Option<(ConnectionId, usize)> {
        self.connections.iter().rev().find_map(|conn| {
            conn.vertices
                .iter()
                .rposition(|v| v.distance(p) <= tolerance)
                .map(|index| (conn.id, index))
        })
    }

    pub fn hit_connection(&self, p: Point, tolerance: f32) -> Option<ConnectionId> {
        self.connections
            .iter()
            .rev()
            .find(|conn| {
                self.polyline(conn).is_some_and(|points| {
                    points
                        .iter()
                        .tuple_windows()
                        .any(|(a, b)| distance_to_segment(p, *a, *b) <= tolerance)
                })
            })
            .map(|conn| conn.id)
    }

    /// Snapshots icons and connections before an edit. Called once at the
    /// start of a drag so the whole gesture undoes in one step.
    pub fn begin_drag(&mut self) {
        self.record_snapshot();
    }

    fn record_snapshot(&mut self) {
        self.undo_stack
            .push((self.icons.clone(), self.connections.clone()));
        if self.undo_stack.len() > HISTORY_LIMIT {
            self.undo_stack.remove(0);
        }
        self.redo_stack.clear();
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo(&mut self) -> bool {
        let Some((icons, connections)) = self.undo_stack.pop() else {
            return false;
        };
        self.redo_stack.push((
            std::mem::replace(&mut self.icons, icons),
            std::mem::replace(&mut self.connections, connections),
        ));
        self.after_history_jump();
        true
    }

    pub fn redo(&mut self) -> bool {
        let Some((icons, connections)) = self.redo_stack.pop() else {
            return false;
        };
        self.undo_stack.push((
            std::mem::replace(&mut self.icons, icons),
            std::mem::replace(&mut self.connections, connections),
        ));
        self.after_history_jump();
        true
    }

    fn after_history_jump(&mut self) {
        self.pending_endpoint = None;
        if self
            .awaiting_params
            .as_ref()
            .is_some_and(|id| self.icon(id).is_none())
        {
            self.awaiting_params = None;
        }
        let max_id = self.connections.iter().map(|conn| conn.id.0 + 1).max().unwrap_or(0);
        self.next_connection_id = self.next_connection_id.max(max_id);
    }

    pub fn clear(&mut self) {
        self.record_snapshot();
        self.icons.clear();
        self.connections.clear();
        self.pending_endpoint = None;
        self.awaiting_params = None;
        info!("cleared canvas");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::{MainPanelParams, ParamForm};

    fn canvas_with(points: &[(ElementType, f32, f32)]) -> (CanvasState, Vec<IconId>) {
        let mut canvas = CanvasState::new();
        let ids = points
            .iter()
            .map(|&(element, x, y)| canvas.place_icon(element, Point::new(x, y)))
            .collect();
        canvas.dismiss_params();
        (canvas, ids)
    }

    fn connect(canvas: &mut CanvasState, a: &IconId, b: &IconId) -> ConnectionId {
        assert_eq!(canvas.click_icon(a), None);
        canvas.click_icon(b).expect("second click connects")
    }

    #[test]
    fn placing_opens_the_param_dialog() {
        let mut canvas = CanvasState::new();
        let id = canvas.place_icon(ElementType::MainPanel, Point::new(10.0, 20.0));
        assert_eq!(canvas.awaiting_params(), Some(&id));
        assert!(id.as_str().starts_with("mainPanel-"));

        let params = IconParams::MainPanel(MainPanelParams {
            name: "Panel".into(),
            ..Default::default()
        });
        canvas.commit_params(&id, params.clone()).unwrap();
        assert_eq!(canvas.awaiting_params(), None);
        assert_eq!(canvas.icon(&id).unwrap().params, Some(params));
    }

    #[test]
    fn ids_stay_unique_within_one_millisecond() {
        let (canvas, ids) = canvas_with(&[
            (ElementType::Bulb, 0.0, 0.0),
            (ElementType::Bulb, 0.0, 0.0),
            (ElementType::Bulb, 0.0, 0.0),
        ]);
        assert_eq!(canvas.icons().len(), 3);
        assert_ne!(ids[0], ids[1]);
        assert_ne!(ids[1], ids[2]);
        assert_ne!(ids[0], ids[2]);
    }

    #[test]
    fn commit_to_missing_icon_fails() {
        let mut canvas = CanvasState::new();
        let params = ParamForm::new(ElementType::Switch).validate().unwrap();
        let missing = IconId::from("switch-1");
        assert_eq!(
            canvas.commit_params(&missing, params),
            Err(CanvasError::UnknownIcon(missing.clone()))
        );
    }

    #[test]
    fn two_clicks_make_one_connection_and_reset() {
        let (mut canvas, ids) = canvas_with(&[
            (ElementType::Bulb, 0.0, 0.0),
            (ElementType::Switch, 50.0, 0.0),
            (ElementType::Sensor, 0.0, 50.0),
        ]);
        assert_eq!(canvas.click_icon(&ids[0]), None);
        assert_eq!(canvas.pending_endpoint(), Some(&ids[0]));
        let conn = canvas.click_icon(&ids[1]).unwrap();
        assert_eq!(canvas.pending_endpoint(), None);
        assert_eq!(canvas.connections().len(), 1);
        assert!(canvas.connection(conn).unwrap().joins(&ids[0], &ids[1]));

        assert_eq!(canvas.click_icon(&ids[2]), None);
        assert_eq!(canvas.pending_endpoint(), Some(&ids[2]));
        assert_eq!(canvas.connections().len(), 1);
    }

    #[test]
    fn clicking_missing_icon_keeps_selection() {
        let (mut canvas, ids) = canvas_with(&[(ElementType::Bulb, 0.0, 0.0)]);
        canvas.click_icon(&ids[0]);
        assert_eq!(canvas.click_icon(&IconId::from("bulb-0")), None);
        assert_eq!(canvas.pending_endpoint(), Some(&ids[0]));
    }

    #[test]
    fn duplicates_and_self_loops_are_kept() {
        let (mut canvas, ids) = canvas_with(&[
            (ElementType::Bulb, 0.0, 0.0),
            (ElementType::Switch, 50.0, 0.0),
        ]);
        connect(&mut canvas, &ids[0], &ids[1]);
        connect(&mut canvas, &ids[1], &ids[0]);
        connect(&mut canvas, &ids[0], &ids[0]);
        assert_eq!(canvas.connections().len(), 3);
    }

    #[test]
    fn delete_icon_cascades() {
        let (mut canvas, ids) = canvas_with(&[
            (ElementType::MainPanel, 0.0, 0.0),
            (ElementType::Bulb, 50.0, 0.0),
            (ElementType::Switch, 0.0, 50.0),
        ]);
        connect(&mut canvas, &ids[0], &ids[1]);
        connect(&mut canvas, &ids[2], &ids[0]);
        let keep = connect(&mut canvas, &ids[1], &ids[2]);
        canvas.click_icon(&ids[0]);

        assert_eq!(canvas.delete_icon(&ids[0]), Ok(2));
        assert_eq!(canvas.connections().len(), 1);
        assert_eq!(canvas.connections()[0].id, keep);
        assert_eq!(canvas.pending_endpoint(), None);
        assert!(canvas.icon(&ids[0]).is_none());
    }

    #[test]
    fn vertices_append_and_delete_per_connection() {
        let (mut canvas, ids) = canvas_with(&[
            (ElementType::Bulb, 0.0, 0.0),
            (ElementType::Switch, 100.0, 0.0),
        ]);
        let a = connect(&mut canvas, &ids[0], &ids[1]);
        let b = connect(&mut canvas, &ids[0], &ids[1]);

        assert_eq!(canvas.insert_vertex(a, Point::new(80.0, 10.0)), Ok(0));
        assert_eq!(canvas.insert_vertex(a, Point::new(20.0, 10.0)), Ok(1));
        assert_eq!(canvas.insert_vertex(b, Point::new(50.0, 50.0)), Ok(0));
        assert_eq!(
            canvas.connection(a).unwrap().vertices,
            vec![Point::new(80.0, 10.0), Point::new(20.0, 10.0)]
        );

        canvas.move_vertex(a, 1, Point::new(25.0, 15.0)).unwrap();
        assert_eq!(canvas.connection(a).unwrap().vertices[1], Point::new(25.0, 15.0));

        assert_eq!(canvas.delete_vertex(a, 0), Ok(Point::new(80.0, 10.0)));
        assert_eq!(canvas.connection(a).unwrap().vertices.len(), 1);
        assert_eq!(canvas.connection(b).unwrap().vertices.len(), 1);
        assert_eq!(
            canvas.delete_vertex(a, 5),
            Err(CanvasError::UnknownVertex {
                connection: a,
                index: 5
            })
        );
    }

    #[test]
    fn deleting_a_connection_keeps_other_vertices() {
        let (mut canvas, ids) = canvas_with(&[
            (ElementType::Bulb, 0.0, 0.0),
            (ElementType::Switch, 100.0, 0.0),
        ]);
        let a = connect(&mut canvas, &ids[0], &ids[1]);
        let b = connect(&mut canvas, &ids[1], &ids[0]);
        canvas.insert_vertex(b, Point::new(50.0, 40.0)).unwrap();

        canvas.delete_connection(a).unwrap();
        assert_eq!(canvas.connections().len(), 1);
        assert_eq!(canvas.connection(b).unwrap().vertices, vec![Point::new(50.0, 40.0)]);
        assert_eq!(canvas.delete_connection(a), Err(CanvasError::UnknownConnection(a)));
    }

    #[test]
    fn polyline_runs_through_bends() {
        let (mut canvas, ids) = canvas_with(&[
            (ElementType::Bulb, 0.0, 0.0),
            (ElementType::Switch, 100.0, 0.0),
        ]);
        let conn = connect(&mut canvas, &ids[0], &ids[1]);
        canvas.insert_vertex(conn, Point::new(50.0, 30.0)).unwrap();
        let points = canvas.polyline(canvas.connection(conn).unwrap()).unwrap();
        assert_eq!(
            points,
            vec![Point::new(0.0, 0.0), Point::new(50.0, 30.0), Point::new(100.0, 0.0)]
        );
    }

    #[test]
    fn hit_testing_prefers_topmost() {
        let (mut canvas, ids) = canvas_with(&[
            (ElementType::Bulb, 0.0, 0.0),
            (ElementType::Switch, 10.0, 0.0),
            (ElementType::Sensor, 200.0, 0.0),
        ]);
        assert_eq!(canvas.hit_icon(Point::new(6.0, 0.0), 32.0), Some(&ids[1]));
        assert_eq!(canvas.hit_icon(Point::new(100.0, 100.0), 32.0), None);

        let conn = connect(&mut canvas, &ids[0], &ids[2]);
        canvas.insert_vertex(conn, Point::new(100.0, 80.0)).unwrap();
        assert_eq!(canvas.hit_vertex(Point::new(102.0, 79.0), 6.0), Some((conn, 0)));
        assert_eq!(canvas.hit_connection(Point::new(50.0, 42.0), 5.0), Some(conn));
        assert_eq!(canvas.hit_connection(Point::new(100.0, 0.0), 5.0), None);
    }

    #[test]
    fn undo_and_redo_restore_edits() {
        let (mut canvas, ids) = canvas_with(&[
            (ElementType::Bulb, 0.0, 0.0),
            (ElementType::Switch, 100.0, 0.0),
        ]);
        connect(&mut canvas, &ids[0], &ids[1]);
        canvas.delete_icon(&ids[1]).unwrap();
        assert!(canvas.connections().is_empty());

        assert!(canvas.undo());
        assert_eq!(canvas.icons().len(), 2);
        assert_eq!(canvas.connections().len(), 1);

        assert!(canvas.redo());
        assert_eq!(canvas.icons().len(), 1);
        assert!(!canvas.can_redo());

        assert!(canvas.undo());
        let again = connect(&mut canvas, &ids[0], &ids[1]);
        assert!(!canvas.can_redo());
        assert_ne!(again, canvas.connections()[0].id);
    }

    fn grouped(element: ElementType, group: &str) -> IconParams {
        let mut form = ParamForm::new(element);
        form.group = group.to_string();
        form.validate().unwrap()
    }

    #[test]
    fn param_edits_are_their_own_undo_step() {
        let mut canvas = CanvasState::new();
        let a = canvas.place_icon(ElementType::Bulb, Point::new(0.0, 0.0));
        canvas.commit_params(&a, grouped(ElementType::Bulb, "A")).unwrap();
        let b = canvas.place_icon(ElementType::Bulb, Point::new(50.0, 0.0));
        canvas.dismiss_params();
        connect(&mut canvas, &a, &b);

        canvas.commit_params(&a, grouped(ElementType::Bulb, "B")).unwrap();
        assert_eq!(canvas.icon(&a).unwrap().group(), Some("B"));

        assert!(canvas.undo());
        assert_eq!(canvas.icon(&a).unwrap().group(), Some("A"));
        assert_eq!(canvas.connections().len(), 1);

        assert!(canvas.undo());
        assert_eq!(canvas.icon(&a).unwrap().group(), Some("A"));
        assert!(canvas.connections().is_empty());

        assert!(canvas.redo());
        assert!(canvas.redo());
        assert_eq!(canvas.icon(&a).unwrap().group(), Some("B"));
    }

    #[test]
    fn first_params_merge_into_the_placement_step() {
        let mut canvas = CanvasState::new();
        let id = canvas.place_icon(ElementType::Switch, Point::new(0.0, 0.0));
        canvas.commit_params(&id, grouped(ElementType::Switch, "K1")).unwrap();
        assert!(canvas.undo());
        assert!(canvas.icons().is_empty());
        assert!(!canvas.can_undo());

        assert!(canvas.redo());
        assert_eq!(canvas.icon(&id).unwrap().group(), Some("K1"));
    }

    #[test]
    fn unchanged_params_leave_history_alone() {
        let mut canvas = CanvasState::new();
        let id = canvas.place_icon(ElementType::Switch, Point::new(0.0, 0.0));
        canvas.commit_params(&id, grouped(ElementType::Switch, "K1")).unwrap();
        canvas.commit_params(&id, grouped(ElementType::Switch, "K1")).unwrap();
        assert!(canvas.undo());
        assert!(!canvas.can_undo());
    }

    #[test]
    fn quick_clicks_on_two_icons_are_not_a_repeat() {
        let (mut canvas, ids) = canvas_with(&[
            (ElementType::Bulb, 0.0, 0.0),
            (ElementType::Switch, 100.0, 0.0),
        ]);
        canvas.click_icon(&ids[0]);
        assert!(canvas.is_repeat_click(&ids[0]));
        assert!(!canvas.is_repeat_click(&ids[1]));
        assert!(canvas.click_icon(&ids[1]).is_some());
        assert!(!canvas.is_repeat_click(&ids[1]));
    }

    #[test]
    fn drag_undoes_in_one_step() {
        let (mut canvas, ids) = canvas_with(&[(ElementType::Bulb, 0.0, 0.0)]);
        canvas.begin_drag();
        for step in 1..=10 {
            canvas.move_icon(&ids[0], Point::new(step as f32, 0.0)).unwrap();
        }
        assert!(canvas.undo());
        assert_eq!(canvas.icon(&ids[0]).unwrap().position, Point::new(0.0, 0.0));
    }

    #[test]
    fn history_is_bounded() {
        let mut canvas = CanvasState::new();
        for _ in 0..(HISTORY_LIMIT + 10) {
            canvas.place_icon(ElementType::Bulb, Point::default());
        }
        let mut undone = 0;
        while canvas.undo() {
            undone += 1;
        }
        assert_eq!(undone, HISTORY_LIMIT);
        assert_eq!(canvas.icons().len(), 10);
    }
}
