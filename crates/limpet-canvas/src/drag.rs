//! Drag gestures. A gesture borrows the canvas for its whole lifetime; dropping it, on any
//! path, stops the auto-scroll timer.

use crate::autoscroll::AutoScroll;
use crate::canvas::Canvas;
use crate::error::{Error, Result};
use crate::event::{CanvasEvent, Update};
use limpet_core::{EdgeId, NodeId, NodeMetadata};
use limpet_geom::{IntPoint, IntVector, Vector2};
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragTarget {
    Node(NodeId),
    /// The tip of an edge, detached from its target while dragged.
    EdgeTip(EdgeId),
}

#[derive(Debug)]
pub struct DragGesture<'c> {
    canvas: &'c mut Canvas,
    target: DragTarget,
    /// Pointer position relative to the dragged node's top-left.
    grab: IntVector,
    /// Last pointer position, in current canvas pixels.
    pointer: IntPoint,
    finished: bool,
}

fn to_vector(p: IntPoint) -> Vector2 {
    Vector2::new(p.x as f64, p.y as f64)
}

impl Canvas {
    /// Starts dragging `target` with the pointer at `pointer`.
    pub fn begin_drag(&mut self, target: DragTarget, pointer: IntPoint) -> Result<DragGesture<'_>> {
        if self.drag_active {
            return Err(Error::DragInProgress);
        }
        let grab = match target {
            DragTarget::Node(id) => pointer - self.scene().try_node(id)?.bounds().origin,
            DragTarget::EdgeTip(id) => {
                self.scene().try_edge(id)?;
                self.edge_drag = Some((id, to_vector(pointer)));
                self.reroute(&[id]);
                IntVector::zero()
            }
        };
        self.drag_active = true;
        tracing::debug!(?target, x = pointer.x, y = pointer.y, "drag started");
        Ok(DragGesture {
            canvas: self,
            target,
            grab,
            pointer,
            finished: false,
        })
    }
}

impl DragGesture<'_> {
    pub fn canvas(&self) -> &Canvas {
        self.canvas
    }

    pub fn target(&self) -> DragTarget {
        self.target
    }

    pub fn pointer(&self) -> IntPoint {
        self.pointer
    }

    /// Follows the pointer. Leaving the viewport arms the auto-scroll timer; re-entering it
    /// stops the timer.
    pub fn drag_to(&mut self, pointer: IntPoint, now: Instant) -> Result<Update> {
        self.pointer = pointer;
        let update = self.follow_pointer()?;
        if self.canvas.viewport().contains(self.pointer) {
            self.canvas.autoscroll.stop();
        } else {
            self.canvas.autoscroll.start(now);
        }
        Ok(update)
    }

    /// Advances the auto-scroll timer. When it fires, nudges the viewport toward the pointer and
    /// replays the drag at the pointer's new canvas position.
    pub fn tick(&mut self, now: Instant) -> Result<Option<Update>> {
        if !self.canvas.autoscroll.poll(now) {
            return Ok(None);
        }
        let viewport = self.canvas.viewport();
        let nudge = AutoScroll::nudge(
            &viewport,
            self.pointer,
            self.canvas.config().autoscroll_max_step,
        );
        if nudge == IntVector::zero() {
            self.canvas.autoscroll.stop();
            return Ok(None);
        }

        let delta = self.canvas.shift_viewport(viewport.position + nudge);
        // The pointer has not moved on screen: the viewport slid under it, then the frame moved.
        self.pointer += nudge + delta;
        let mut update = Update {
            shift: delta,
            ..Default::default()
        };
        update.merge(self.follow_pointer()?);
        tracing::trace!(dx = nudge.x, dy = nudge.y, "auto-scroll step");
        Ok(Some(update))
    }

    /// Ends the drag and returns the metadata to persist.
    pub fn finish(mut self) -> Result<Vec<(NodeId, NodeMetadata)>> {
        self.finished = true;
        self.canvas.autoscroll.stop();
        match self.target {
            DragTarget::Node(id) => {
                self.canvas.commit_location(id)?;
                Ok(vec![(id, self.canvas.metadata(id)?)])
            }
            DragTarget::EdgeTip(_) => Ok(Vec::new()),
        }
    }

    fn follow_pointer(&mut self) -> Result<Update> {
        let update = match self.target {
            DragTarget::Node(node) => self.canvas.apply(CanvasEvent::NodeMoved {
                node,
                to: self.pointer - self.grab,
            })?,
            DragTarget::EdgeTip(id) => {
                self.canvas.edge_drag = Some((id, to_vector(self.pointer)));
                let rerouted = self.canvas.reroute(&[id]);
                let mut update = Update {
                    rerouted,
                    ..Default::default()
                };
                if self.canvas.is_layout_dirty() {
                    update.shift = self.canvas.layout_container();
                }
                update
            }
        };
        self.pointer += update.shift;
        Ok(update)
    }
}

impl Drop for DragGesture<'_> {
    fn drop(&mut self) {
        self.canvas.autoscroll.stop();
        self.canvas.drag_active = false;
        if let Some((id, _)) = self.canvas.edge_drag.take() {
            self.canvas.reroute(&[id]);
        }
        if !self.finished {
            tracing::debug!(target = ?self.target, "drag abandoned");
        }
    }
}
