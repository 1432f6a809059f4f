// Copyright 2026 the Casement Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Read-only projections of a store: dimensions and transform data.

use super::PositionStore;
use crate::data::{Dimension, PositionData};
use crate::subscribe::Subscription;
use crate::transform::TransformData;

/// The `width`/`height` pair of a store.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DimensionData {
    /// Current width.
    pub width: Option<Dimension>,
    /// Current height.
    pub height: Option<Dimension>,
}

impl DimensionData {
    pub(crate) fn of(data: &PositionData) -> Self {
        Self {
            width: data.width,
            height: data.height,
        }
    }
}

impl PositionStore {
    /// Current dimensions.
    #[must_use]
    pub fn dimension(&self) -> DimensionData {
        DimensionData::of(&self.shared.state.borrow().data)
    }

    /// Subscribes to dimension changes; `handler` runs immediately.
    pub fn subscribe_dimension(&self, handler: impl Fn(&DimensionData) + 'static) -> Subscription {
        handler(&self.dimension());
        self.shared.dimension_subs.add(handler)
    }

    /// Computes the transform projection of the current data.
    ///
    /// This does not wait for a frame: the element is measured now when
    /// the data holds no pixel size.
    #[must_use]
    pub fn transform_data(&self) -> TransformData {
        let data = self.get();
        let el = self.shared.element();
        let size = self.shared.box_size(&data, el.as_deref());
        self.shared.transforms.compute(&data, size)
    }

    /// Subscribes to the transform projection; `handler` runs immediately.
    ///
    /// The projection is only recomputed on sync while it has at least one
    /// subscriber, unless the store was created with `calculate_transform`.
    pub fn subscribe_transform(&self, handler: impl Fn(&TransformData) + 'static) -> Subscription {
        let current = self.transform_data();
        self.shared.state.borrow_mut().transform = Some(current);
        handler(&current);
        self.shared.transform_subs.add(handler)
    }
}

#[cfg(test)]
mod tests {
    use alloc::rc::Rc;
    use alloc::vec::Vec;
    use core::cell::RefCell;

    use kurbo::Rect;

    use crate::data::PositionPatch;
    use crate::position::PositionOptions;
    use crate::position::tests::{mounted, seeded};
    use crate::time::HostTime;

    use super::*;

    #[test]
    fn dimension_subscribers_only_hear_size_changes() {
        let (runtime, _el, _parent, store) = mounted(PositionOptions::new().seed(seeded()));
        let seen = Rc::new(RefCell::new(Vec::new()));
        let s = Rc::clone(&seen);
        let _sub = store.subscribe_dimension(move |d| s.borrow_mut().push(d.width));

        store.set(&PositionPatch::new().left(10.0)).unwrap();
        runtime.tick(HostTime(1));
        store.set(&PositionPatch::new().width(300.0)).unwrap();
        runtime.tick(HostTime(2));
        assert_eq!(
            *seen.borrow(),
            [Some(Dimension::Px(200.0)), Some(Dimension::Px(300.0))]
        );
    }

    #[test]
    fn transform_projection_tracks_offsets() {
        let (runtime, _el, _parent, store) = mounted(PositionOptions::new().seed(seeded()));
        let seen = Rc::new(RefCell::new(Vec::new()));
        let s = Rc::clone(&seen);
        let _sub = store.subscribe_transform(move |t| s.borrow_mut().push(t.bounds));

        store.set(&PositionPatch::new().left(20.0)).unwrap();
        runtime.tick(HostTime(1));
        // Unchanged bounds are not republished.
        store.set(&PositionPatch::new().z_index(4)).unwrap();
        runtime.tick(HostTime(2));
        assert_eq!(
            *seen.borrow(),
            [
                Rect::new(100.0, 50.0, 300.0, 150.0),
                Rect::new(20.0, 50.0, 220.0, 150.0)
            ]
        );
    }

    #[test]
    fn transform_projection_without_subscribers_is_lazy() {
        let (runtime, _el, _parent, store) = mounted(PositionOptions::new().seed(seeded()));
        store.set(&PositionPatch::new().left(20.0)).unwrap();
        runtime.tick(HostTime(1));
        assert!(store.shared.state.borrow().transform.is_none());

        let (runtime, _el, _parent, store) =
            mounted(PositionOptions::new().calculate_transform(true).seed(seeded()));
        store.set(&PositionPatch::new().left(20.0)).unwrap();
        runtime.tick(HostTime(1));
        assert!(store.shared.state.borrow().transform.is_some());
    }
}
