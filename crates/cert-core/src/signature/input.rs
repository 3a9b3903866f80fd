//! Pointer and touch input normalization
//!
//! Pointer events already carry offsets relative to the surface. Touch events
//! carry viewport (client) coordinates and are shifted by the surface's
//! bounding rectangle. Either way the capability only ever sees
//! [`SurfacePoint`]s.

use serde::{Deserialize, Serialize};

use super::{SignatureCapture, SurfacePoint};

/// Position of the surface's top-left corner in client coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SurfaceBounds {
    pub left: f32,
    pub top: f32,
}

/// Pointer position relative to the surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerSample {
    pub offset_x: f32,
    pub offset_y: f32,
}

/// One finger, in client coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TouchPoint {
    pub client_x: f32,
    pub client_y: f32,
}

/// Raw input from either device family.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DeviceEvent {
    PointerDown(PointerSample),
    PointerMove(PointerSample),
    PointerUp,
    PointerLeave,
    TouchStart { touches: Vec<TouchPoint> },
    TouchMove { touches: Vec<TouchPoint> },
    TouchEnd,
}

/// Translates [`DeviceEvent`]s into calls on a [`SignatureCapture`].
#[derive(Debug, Clone, Copy, Default)]
pub struct InputAdapter {
    bounds: SurfaceBounds,
}

impl InputAdapter {
    pub fn new(bounds: SurfaceBounds) -> Self {
        Self { bounds }
    }

    /// Surface position of an event, if it carries one.
    pub fn locate(&self, event: &DeviceEvent) -> Option<SurfacePoint> {
        match event {
            DeviceEvent::PointerDown(p) | DeviceEvent::PointerMove(p) => {
                Some(SurfacePoint::new(p.offset_x, p.offset_y))
            }
            DeviceEvent::TouchStart { touches } | DeviceEvent::TouchMove { touches } => {
                touches.first().map(|t| {
                    SurfacePoint::new(t.client_x - self.bounds.left, t.client_y - self.bounds.top)
                })
            }
            DeviceEvent::PointerUp | DeviceEvent::PointerLeave | DeviceEvent::TouchEnd => None,
        }
    }

    pub fn dispatch<C>(&self, event: &DeviceEvent, target: &mut C)
    where
        C: SignatureCapture + ?Sized,
    {
        match event {
            DeviceEvent::PointerDown(_) | DeviceEvent::TouchStart { .. } => {
                if let Some(point) = self.locate(event) {
                    target.begin_stroke(point);
                }
            }
            DeviceEvent::PointerMove(_) | DeviceEvent::TouchMove { .. } => {
                if let Some(point) = self.locate(event) {
                    target.capture_stroke(point);
                }
            }
            DeviceEvent::PointerUp | DeviceEvent::PointerLeave | DeviceEvent::TouchEnd => {
                target.end_stroke();
            }
        }
    }

    pub fn replay<'a, C, I>(&self, events: I, target: &mut C)
    where
        C: SignatureCapture + ?Sized,
        I: IntoIterator<Item = &'a DeviceEvent>,
    {
        for event in events {
            self.dispatch(event, target);
        }
    }
}
