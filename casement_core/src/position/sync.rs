// Copyright 2026 the Casement Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-frame style writes and subscriber publication.

use alloc::format;
use alloc::string::ToString;

use kurbo::Size;

use super::{DimensionData, StoreShared};
use crate::changes::ChangeSet;
use crate::data::{Dimension, PositionData, TransformOrigin};
use crate::host::{Element, StyleProperty};
use crate::time::HostTime;
use crate::trace::ElementSyncEvent;

fn write_px(el: &dyn Element, property: StyleProperty, value: Option<f64>) {
    match value {
        Some(v) => el.set_style(property, &format!("{v}px")),
        None => el.remove_style(property),
    }
}

fn write_dimension(el: &dyn Element, property: StyleProperty, value: Option<Dimension>) {
    match value {
        Some(Dimension::Px(v)) => el.set_style(property, &format!("{v}px")),
        Some(Dimension::Auto) => el.set_style(property, "auto"),
        None => el.remove_style(property),
    }
}

impl StoreShared {
    /// The bound style sync registered with the runtime.
    pub(crate) fn sync(&self, now: HostTime) {
        let Some(el) = self.element() else {
            return;
        };
        if !el.is_connected() {
            return;
        }
        let (data, changes) = {
            let state = self.state.borrow();
            (state.data.clone(), state.changes)
        };
        if !changes.has_change() {
            return;
        }

        if !self.transforms.is_ortho() {
            if changes.left {
                write_px(&*el, StyleProperty::Left, data.left);
            }
            if changes.top {
                write_px(&*el, StyleProperty::Top, data.top);
            }
        }
        if changes.z_index {
            match data.z_index {
                Some(z) => el.set_style(StyleProperty::ZIndex, &z.to_string()),
                None => el.remove_style(StyleProperty::ZIndex),
            }
        }
        if changes.width {
            write_dimension(&*el, StyleProperty::Width, data.width);
        }
        if changes.height {
            write_dimension(&*el, StyleProperty::Height, data.height);
        }
        if changes.transform_origin {
            // `center` is the CSS default.
            match data.transform_origin {
                TransformOrigin::Center => el.remove_style(StyleProperty::TransformOrigin),
                origin => el.set_style(StyleProperty::TransformOrigin, origin.as_css()),
            }
        }
        if changes.transform {
            match self.transforms.css(&data) {
                Some(css) => el.set_style(StyleProperty::Transform, &css),
                None => el.remove_style(StyleProperty::Transform),
            }
        }

        self.state.borrow_mut().changes.reset();
        self.publish(&data, changes, Some(&*el));

        let frame_index = self.runtime.frame_index();
        self.runtime.trace(|t| {
            t.element_sync(&ElementSyncEvent {
                frame_index,
                store: self.id,
                element: el.id(),
                changes: changes.bits(),
            });
        });
        log::trace!("{:?} synced {:?} at {:?}", self.id, changes, now);
    }

    /// Box size used for the transform projection: pixel sizes win over
    /// the measured element size.
    pub(crate) fn box_size(&self, data: &PositionData, el: Option<&dyn Element>) -> Size {
        let measured = el
            .map(|el| el.offset_size())
            .or(self.state.borrow().size)
            .unwrap_or(Size::ZERO);
        Size::new(
            data.width.and_then(Dimension::px).unwrap_or(measured.width),
            data.height.and_then(Dimension::px).unwrap_or(measured.height),
        )
    }

    /// Notifies data subscribers and refreshes the derived projections.
    pub(crate) fn publish(&self, data: &PositionData, changes: ChangeSet, el: Option<&dyn Element>) {
        if self.calculate_transform || !self.transform_subs.is_empty() {
            let next = self.transforms.compute(data, self.box_size(data, el));
            let previous = self.state.borrow_mut().transform.replace(next);
            if previous != Some(next) {
                self.transform_subs.notify(&next);
            }
        }
        self.data_subs.notify(data);
        if changes.dimension_changed() {
            self.dimension_subs.notify(&DimensionData::of(data));
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::rc::Rc;

    use super::*;
    use crate::data::PositionPatch;
    use crate::position::PositionOptions;
    use crate::position::tests::{mounted, seeded};

    #[test]
    fn writes_every_flagged_property() {
        let (runtime, el, _parent, store) = mounted(PositionOptions::new().seed(seeded()));
        store
            .set(
                &PositionPatch::new()
                    .top(10.0)
                    .width_dimension(Some(Dimension::Auto))
                    .height(120.0)
                    .z_index(3)
                    .rotate_z(45.0)
                    .transform_origin(TransformOrigin::BottomRight),
            )
            .unwrap();
        runtime.tick(HostTime(1));
        assert_eq!(el.inline(StyleProperty::Left), None);
        assert_eq!(el.inline(StyleProperty::Top).as_deref(), Some("10px"));
        assert_eq!(el.inline(StyleProperty::Width).as_deref(), Some("auto"));
        assert_eq!(el.inline(StyleProperty::Height).as_deref(), Some("120px"));
        assert_eq!(el.inline(StyleProperty::ZIndex).as_deref(), Some("3"));
        assert_eq!(
            el.inline(StyleProperty::Transform).as_deref(),
            Some("rotateZ(45deg)")
        );
        assert_eq!(
            el.inline(StyleProperty::TransformOrigin).as_deref(),
            Some("bottom right")
        );
    }

    #[test]
    fn neutral_transform_and_center_origin_clear_styles() {
        let (runtime, el, _parent, store) = mounted(PositionOptions::new().seed(seeded()));
        store
            .set(
                &PositionPatch::new()
                    .scale(2.0)
                    .transform_origin(TransformOrigin::BottomLeft),
            )
            .unwrap();
        runtime.tick(HostTime(1));
        assert!(el.inline(StyleProperty::Transform).is_some());
        store
            .set(
                &PositionPatch::new()
                    .scale(1.0)
                    .transform_origin(TransformOrigin::Center),
            )
            .unwrap();
        runtime.tick(HostTime(2));
        assert_eq!(el.inline(StyleProperty::Transform), None);
        assert_eq!(el.inline(StyleProperty::TransformOrigin), None);
    }

    #[test]
    fn ortho_folds_offsets_into_transform() {
        let (runtime, el, _parent, store) =
            mounted(PositionOptions::new().ortho(true).seed(seeded()));
        store.set(&PositionPatch::new().left(30.0)).unwrap();
        assert!(store.pending_changes().transform);
        runtime.tick(HostTime(1));
        assert_eq!(el.inline(StyleProperty::Left), None);
        assert_eq!(
            el.inline(StyleProperty::Transform).as_deref(),
            Some("translate(30px, 50px)")
        );
    }

    #[test]
    fn disconnected_element_is_skipped() {
        let (runtime, el, _parent, store) = mounted(PositionOptions::new().seed(seeded()));
        let notified = Rc::new(core::cell::Cell::new(0));
        let n = Rc::clone(&notified);
        let _sub = store.subscribe(move |_| n.set(n.get() + 1));
        store.set(&PositionPatch::new().left(5.0)).unwrap();
        el.set_connected(false);
        let stats = runtime.tick(HostTime(1));
        assert_eq!(stats.element_syncs, 1);
        assert!(el.take_writes().is_empty());
        assert_eq!(notified.get(), 1);
    }

    #[test]
    fn subscribers_see_data_after_writes() {
        let (runtime, el, _parent, store) = mounted(PositionOptions::new().seed(seeded()));
        let el2 = Rc::clone(&el);
        let seen = Rc::new(core::cell::RefCell::new(None));
        let s = Rc::clone(&seen);
        let _sub = store.subscribe(move |d| {
            *s.borrow_mut() = Some((d.left, el2.inline(StyleProperty::Left)));
        });
        store.set(&PositionPatch::new().left(60.0)).unwrap();
        runtime.tick(HostTime(1));
        assert_eq!(
            *seen.borrow(),
            Some((Some(60.0), Some(alloc::string::String::from("60px"))))
        );
    }
}
