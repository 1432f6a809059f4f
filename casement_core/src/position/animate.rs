// Copyright 2026 the Casement Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tweening a store's numeric fields.
//!
//! Each field can be driven by at most one animation at a time. A field
//! that is already animating is dropped from a new request, and the rest
//! of the request proceeds.

use alloc::rc::{Rc, Weak};
use alloc::vec::Vec;

use super::{PositionStore, StoreShared};
use crate::animation::{Animation, AnimationOptions, AnimationTarget, AnimationTask, Track};
use crate::data::{FieldSet, PositionPatch};
use crate::error::PositionError;

impl PositionStore {
    /// Animates from the current values to `to`.
    ///
    /// Fields that are unset (outside the transform components, which start
    /// from their neutral value), already at their destination, not
    /// numeric, or already animating are skipped. When nothing is left the
    /// returned handle is already resolved.
    ///
    /// # Errors
    ///
    /// [`PositionError::NonFinite`] for a non-finite destination and
    /// [`PositionError::InvalidDuration`] for a negative or non-finite
    /// duration.
    pub fn animate_to(
        &self,
        to: &PositionPatch,
        options: AnimationOptions,
    ) -> Result<Animation, PositionError> {
        self.animate_between(None, to, options)
    }

    /// Jumps to `from` and animates back to the current values.
    pub fn animate_from(
        &self,
        from: &PositionPatch,
        options: AnimationOptions,
    ) -> Result<Animation, PositionError> {
        let to = self.get().to_patch_filtered(from.fields());
        self.animate_between(Some(from), &to, options)
    }

    /// Animates from `from` to `to`; fields missing from `from` start at
    /// their current value.
    pub fn animate_from_to(
        &self,
        from: &PositionPatch,
        to: &PositionPatch,
        options: AnimationOptions,
    ) -> Result<Animation, PositionError> {
        self.animate_between(Some(from), to, options)
    }

    fn animate_between(
        &self,
        from: Option<&PositionPatch>,
        to: &PositionPatch,
        options: AnimationOptions,
    ) -> Result<Animation, PositionError> {
        to.check()?;
        if let Some(from) = from {
            from.check()?;
        }
        let duration = options.check()?;

        let current = self.get();
        let shared = &self.shared;
        let mut animating = shared.animating.get();
        let mut tracks = Vec::new();
        for field in to.fields().iter().filter(|f| f.is_animatable()) {
            let Some(destination) = to.numeric(field) else {
                continue;
            };
            let initial = match from.and_then(|f| f.numeric(field)) {
                Some(value) => value,
                None => current.numeric(field),
            };
            let (Some(start), Some(end)) = (
                initial.or(field.neutral()),
                destination.or(field.neutral()),
            ) else {
                log::debug!("{:?}: `{field}` has no numeric endpoint, not animated", shared.id);
                continue;
            };
            if start == end && current.numeric(field) == destination {
                continue;
            }
            if animating.contains(field) {
                log::debug!("{:?}: `{field}` is already animating", shared.id);
                continue;
            }
            animating.insert(field);
            tracks.push(Track {
                field,
                from: start,
                to: end,
                destination,
            });
        }
        if tracks.is_empty() {
            return Ok(Animation::resolved());
        }
        shared.animating.set(animating);

        let weak: Weak<StoreShared> = Rc::downgrade(shared);
        let target: Weak<dyn AnimationTarget> = weak;
        let runtime = &shared.runtime;
        let task = Rc::new(AnimationTask::new(
            runtime.next_task_id(),
            shared.id,
            target,
            tracks,
            duration,
            &options,
        ));
        runtime.schedule_animation(Rc::clone(&task));
        Ok(Animation::new(task, runtime.clone()))
    }

    /// Forces every animation of this store to its destination.
    pub fn cancel_animations(&self) -> usize {
        self.shared.runtime.cancel_animations_for(self.shared.id)
    }

    /// Whether any field is being animated.
    #[must_use]
    pub fn is_animating(&self) -> bool {
        !self.shared.animating.get().is_empty()
    }

    /// The fields currently owned by an animation.
    #[must_use]
    pub fn animating_keys(&self) -> FieldSet {
        self.shared.animating.get()
    }
}

#[cfg(test)]
mod tests {
    use alloc::rc::Rc;
    use core::cell::Cell;

    use futures::FutureExt;
    use futures::executor::LocalPool;
    use futures::task::LocalSpawnExt;

    use super::*;
    use crate::data::PositionField;
    use crate::position::tests::{mounted, seeded};
    use crate::position::PositionOptions;
    use crate::runtime::Runtime;
    use crate::testing::FakeParent;
    use crate::time::HostTime;

    const MS: u64 = 1_000;

    fn opts(ms: f64) -> AnimationOptions {
        AnimationOptions::new().duration(ms)
    }

    #[test]
    fn tween_passes_between_endpoints_and_lands_exactly() {
        let (runtime, _el, _parent, store) =
            mounted(PositionOptions::new().seed(seeded().left(0.0)));
        let animation = store
            .animate_to(&PositionPatch::new().left(300.0), opts(100.0))
            .unwrap();
        assert!(store.animating_keys().contains(PositionField::Left));

        runtime.tick(HostTime(1_000 * MS));
        runtime.tick(HostTime(1_000 * MS + 40 * MS));
        let mid = store.left().unwrap();
        assert!(mid > 0.0 && mid < 300.0);
        assert!(!animation.is_finished());

        runtime.tick(HostTime(1_000 * MS + 100 * MS));
        assert_eq!(store.left(), Some(300.0));
        assert!(animation.is_finished());
        assert!(!store.is_animating());
        assert_eq!(animation.clone().now_or_never(), Some(()));
    }

    #[test]
    fn zero_duration_lands_on_next_frame() {
        let (runtime, _el, _parent, store) = mounted(PositionOptions::new().seed(seeded()));
        let seen = Rc::new(core::cell::RefCell::new(alloc::vec::Vec::new()));
        let s = Rc::clone(&seen);
        let _sub = store.subscribe(move |d| s.borrow_mut().push(d.top));
        let animation = store
            .animate_to(&PositionPatch::new().top(400.0), opts(0.0))
            .unwrap();
        assert_eq!(store.top(), Some(50.0));
        runtime.tick(HostTime(5));
        assert_eq!(store.top(), Some(400.0));
        assert!(animation.is_finished());
        assert_eq!(*seen.borrow(), [Some(50.0), Some(400.0)]);
    }

    #[test]
    fn overlapping_field_is_dropped() {
        let (runtime, _el, _parent, store) = mounted(PositionOptions::new().seed(seeded()));
        let first = store
            .animate_to(&PositionPatch::new().rotate_z(90.0), opts(100.0))
            .unwrap();
        let second = store
            .animate_to(
                &PositionPatch::new().rotate_z(-45.0).left(0.0),
                opts(100.0),
            )
            .unwrap();
        assert_eq!(first.keys(), FieldSet::from_fields(&[PositionField::RotateZ]));
        assert_eq!(second.keys(), FieldSet::from_fields(&[PositionField::Left]));

        let repeat = store
            .animate_to(&PositionPatch::new().rotate_z(10.0), opts(100.0))
            .unwrap();
        assert!(repeat.is_finished());
        assert!(repeat.keys().is_empty());

        runtime.tick(HostTime(0));
        runtime.tick(HostTime(100 * MS));
        assert_eq!(store.numeric(PositionField::RotateZ), Some(90.0));
        assert_eq!(store.left(), Some(0.0));
        assert!(first.is_finished() && second.is_finished());
    }

    #[test]
    fn unset_transform_fields_start_from_neutral() {
        let (runtime, _el, _parent, store) = mounted(PositionOptions::new().seed(seeded()));
        store
            .animate_to(&PositionPatch::new().scale(3.0), opts(100.0))
            .unwrap();
        runtime.tick(HostTime(0));
        assert_eq!(store.numeric(PositionField::Scale), Some(1.0));
        runtime.tick(HostTime(50 * MS));
        assert_eq!(store.numeric(PositionField::Scale), Some(2.0));
    }

    #[test]
    fn unset_destination_restores_sentinel() {
        let (runtime, _el, _parent, store) =
            mounted(PositionOptions::new().seed(seeded().rotate_z(30.0)));
        store
            .animate_to(&PositionPatch::new().rotate_z(None), opts(100.0))
            .unwrap();
        runtime.tick(HostTime(0));
        runtime.tick(HostTime(50 * MS));
        assert_eq!(store.numeric(PositionField::RotateZ), Some(15.0));
        runtime.tick(HostTime(100 * MS));
        assert_eq!(store.numeric(PositionField::RotateZ), None);
    }

    #[test]
    fn unchanged_and_unset_fields_resolve_immediately() {
        let runtime = Runtime::new();
        let parent = FakeParent::detached();
        let store = PositionStore::new(&runtime, &parent, PositionOptions::new()).unwrap();
        let animation = store
            .animate_to(&PositionPatch::new().left(10.0), opts(100.0))
            .unwrap();
        assert!(animation.is_finished());
        assert!(!runtime.needs_frame());
    }

    #[test]
    fn invalid_arguments_are_errors() {
        let (_runtime, _el, _parent, store) = mounted(PositionOptions::new().seed(seeded()));
        assert_eq!(
            store
                .animate_to(&PositionPatch::new().left(1.0), opts(-5.0))
                .unwrap_err(),
            PositionError::InvalidDuration(-5.0)
        );
        assert!(store
            .animate_to(&PositionPatch::new().left(f64::INFINITY), opts(5.0))
            .is_err());
        assert!(!store.is_animating());
    }

    #[test]
    fn cancel_forces_destination() {
        let (runtime, _el, _parent, store) = mounted(PositionOptions::new().seed(seeded()));
        let animation = store
            .animate_to(&PositionPatch::new().left(700.0).top(10.0), opts(1_000.0))
            .unwrap();
        runtime.tick(HostTime(0));
        runtime.tick(HostTime(100 * MS));
        animation.cancel();
        assert!(animation.is_finished());
        assert_eq!(store.left(), Some(700.0));
        assert_eq!(store.top(), Some(10.0));
        assert!(!store.is_animating());
        runtime.tick(HostTime(200 * MS));
        assert!(!runtime.animations().is_animating(store.id()));
    }

    #[test]
    fn store_cancel_only_touches_own_tasks() {
        let runtime = Runtime::new();
        let parent = FakeParent::detached();
        let a = PositionStore::new(&runtime, &parent, PositionOptions::new().seed(seeded()))
            .unwrap();
        let b = PositionStore::new(&runtime, &parent, PositionOptions::new().seed(seeded()))
            .unwrap();
        let ta = a.animate_to(&PositionPatch::new().left(0.0), opts(500.0)).unwrap();
        let tb = b.animate_to(&PositionPatch::new().left(0.0), opts(500.0)).unwrap();
        assert_eq!(a.cancel_animations(), 1);
        assert!(ta.is_finished());
        assert!(!tb.is_finished());
        assert_eq!(a.left(), Some(0.0));
        assert_eq!(b.left(), Some(100.0));
    }

    #[test]
    fn disconnect_evicts_and_resolves() {
        let (runtime, el, _parent, store) = mounted(PositionOptions::new().seed(seeded()));
        let animation = store
            .animate_to(&PositionPatch::new().left(500.0), opts(100.0))
            .unwrap();
        runtime.tick(HostTime(0));
        runtime.tick(HostTime(50 * MS));
        let partial = store.left();
        el.set_connected(false);
        let stats = runtime.tick(HostTime(60 * MS));
        assert_eq!(stats.animations_evicted, 1);
        assert!(animation.is_finished());
        assert_eq!(store.left(), partial);
        assert!(!store.is_animating());
    }

    #[test]
    fn animate_from_returns_to_current() {
        let (runtime, _el, _parent, store) = mounted(PositionOptions::new().seed(seeded()));
        store
            .animate_from(&PositionPatch::new().top(450.0), opts(100.0))
            .unwrap();
        runtime.tick(HostTime(0));
        assert_eq!(store.top(), Some(450.0));
        runtime.tick(HostTime(100 * MS));
        assert_eq!(store.top(), Some(50.0));
    }

    #[test]
    fn awaiting_an_animation() {
        let (runtime, _el, _parent, store) = mounted(PositionOptions::new().seed(seeded()));
        let animation = store
            .animate_from_to(
                &PositionPatch::new().left(0.0),
                &PositionPatch::new().left(20.0),
                opts(32.0),
            )
            .unwrap();
        let done = Rc::new(Cell::new(false));
        let d = Rc::clone(&done);
        let mut pool = LocalPool::new();
        pool.spawner()
            .spawn_local(async move {
                animation.await;
                d.set(true);
            })
            .unwrap();
        let mut now = 0;
        while !done.get() {
            runtime.tick(HostTime(now));
            pool.run_until_stalled();
            now += 16 * MS;
        }
        assert_eq!(store.left(), Some(20.0));
        assert_eq!(runtime.frame_index(), 3);
    }
}
