// Copyright 2026 the Casement Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Named snapshots and reset to the default placement.

use alloc::string::String;

use super::PositionStore;
use crate::animation::{Animation, AnimationOptions};
use crate::data::{FieldSet, PositionData, PositionField};
use crate::error::PositionError;

/// How [`PositionStore::restore`] applies a snapshot.
#[derive(Clone, Copy, Debug, Default)]
pub enum RestoreMode {
    /// Apply through [`PositionStore::set`].
    #[default]
    Set,
    /// Assign directly, bypassing validators, style writes and
    /// subscribers.
    Silent,
    /// Animate to the snapshot.
    Animate(AnimationOptions),
}

/// Options for [`PositionStore::restore`].
#[derive(Clone, Copy, Debug, Default)]
pub struct RestoreOptions {
    /// Remove the snapshot after reading it.
    pub remove: bool,
    /// Restrict the restore to these fields; `None` restores all.
    pub properties: Option<FieldSet>,
    /// How to apply the snapshot.
    pub mode: RestoreMode,
}

/// What [`PositionStore::restore`] found and started.
#[derive(Clone, Debug)]
pub struct Restored {
    /// The snapshot that was applied.
    pub data: PositionData,
    /// The animation, in [`RestoreMode::Animate`].
    pub animation: Option<Animation>,
}

/// Options for [`PositionStore::reset`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResetOptions {
    /// Keep the current z-index instead of the default one.
    pub keep_z_index: bool,
    /// Apply through [`PositionStore::set`]; otherwise assign silently.
    pub invoke_set: bool,
}

impl Default for ResetOptions {
    fn default() -> Self {
        Self {
            keep_z_index: false,
            invoke_set: true,
        }
    }
}

impl PositionStore {
    /// Saves a copy of the current data under `name`, replacing any
    /// previous snapshot of that name.
    ///
    /// # Errors
    ///
    /// [`PositionError::EmptySnapshotName`] if `name` is empty.
    pub fn save(&self, name: &str) -> Result<PositionData, PositionError> {
        if name.is_empty() {
            return Err(PositionError::EmptySnapshotName);
        }
        let data = self.get();
        self.shared
            .state
            .borrow_mut()
            .saves
            .insert(String::from(name), data.clone());
        Ok(data)
    }

    /// Returns the snapshot saved under `name`.
    #[must_use]
    pub fn get_save(&self, name: &str) -> Option<PositionData> {
        self.shared.state.borrow().saves.get(name).cloned()
    }

    /// Removes and returns the snapshot saved under `name`.
    pub fn remove(&self, name: &str) -> Option<PositionData> {
        self.shared.state.borrow_mut().saves.remove(name)
    }

    /// Applies the snapshot saved under `name`.
    ///
    /// Returns `Ok(None)` when there is no such snapshot.
    pub fn restore(
        &self,
        name: &str,
        options: RestoreOptions,
    ) -> Result<Option<Restored>, PositionError> {
        let snapshot = if options.remove {
            self.remove(name)
        } else {
            self.get_save(name)
        };
        let Some(data) = snapshot else {
            return Ok(None);
        };

        let fields = options
            .properties
            .unwrap_or_else(|| FieldSet::from_fields(&PositionField::ALL));
        let patch = data.to_patch_filtered(fields);
        let animation = match options.mode {
            RestoreMode::Set => {
                self.set(&patch)?;
                None
            }
            RestoreMode::Silent => {
                self.shared.assign_silently(&patch);
                None
            }
            RestoreMode::Animate(animation) => Some(self.animate_to(&patch, animation)?),
        };
        Ok(Some(Restored { data, animation }))
    }

    /// The placement captured on the first update against a connected
    /// element.
    #[must_use]
    pub fn default_data(&self) -> Option<PositionData> {
        self.shared.state.borrow().default.clone()
    }

    /// Restores the default placement and clears every saved snapshot.
    ///
    /// Returns `false` when no default has been captured yet or a field is
    /// animating. A minimized parent is maximized first, without animation.
    pub fn reset(&self, options: ResetOptions) -> bool {
        let Some(mut data) = self.default_data() else {
            return false;
        };
        if self.is_animating() {
            return false;
        }
        if let Some(parent) = self.shared.parent.upgrade()
            && parent.is_minimized()
        {
            parent.maximize_instant();
        }
        if options.keep_z_index {
            data.z_index = self.z_index();
        }
        self.shared.state.borrow_mut().saves.clear();

        let patch = data.to_patch();
        if options.invoke_set {
            self.shared.update(&patch);
        } else {
            self.shared.assign_silently(&patch);
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::PositionPatch;
    use crate::position::PositionOptions;
    use crate::position::tests::{mounted, seeded};
    use crate::runtime::Runtime;
    use crate::testing::FakeParent;
    use crate::time::HostTime;

    #[test]
    fn save_mutate_restore() {
        let (runtime, _el, _parent, store) = mounted(PositionOptions::new().seed(seeded()));
        let saved = store.save("x").unwrap();
        store
            .set(&PositionPatch::new().left(10.0).top(20.0).z_index(9))
            .unwrap();
        let restored = store.restore("x", RestoreOptions::default()).unwrap().unwrap();
        assert_eq!(restored.data, saved);
        assert!(restored.animation.is_none());
        assert_eq!(store.get(), saved);
        runtime.tick(HostTime(1));
        assert!(store.get_save("x").is_some());
    }

    #[test]
    fn restore_selected_properties() {
        let (_runtime, _el, _parent, store) = mounted(PositionOptions::new().seed(seeded()));
        store.save("x").unwrap();
        store.set(&PositionPatch::new().left(10.0).top(20.0)).unwrap();
        store
            .restore(
                "x",
                RestoreOptions {
                    remove: true,
                    properties: Some(FieldSet::from_fields(&[PositionField::Left])),
                    mode: RestoreMode::Set,
                },
            )
            .unwrap();
        assert_eq!(store.left(), Some(100.0));
        assert_eq!(store.top(), Some(20.0));
        assert!(store.get_save("x").is_none());
    }

    #[test]
    fn silent_restore_skips_sync() {
        let (runtime, el, _parent, store) = mounted(PositionOptions::new().seed(seeded()));
        store.save("x").unwrap();
        store.set(&PositionPatch::new().left(10.0)).unwrap();
        runtime.tick(HostTime(1));
        el.take_writes();

        store
            .restore(
                "x",
                RestoreOptions {
                    mode: RestoreMode::Silent,
                    ..RestoreOptions::default()
                },
            )
            .unwrap();
        assert_eq!(store.left(), Some(100.0));
        assert!(!runtime.needs_frame());
        assert!(el.take_writes().is_empty());
    }

    #[test]
    fn animated_restore() {
        let (runtime, _el, _parent, store) = mounted(PositionOptions::new().seed(seeded()));
        store.save("x").unwrap();
        store.set(&PositionPatch::new().left(300.0)).unwrap();
        let restored = store
            .restore(
                "x",
                RestoreOptions {
                    mode: RestoreMode::Animate(AnimationOptions::new().duration(10.0)),
                    ..RestoreOptions::default()
                },
            )
            .unwrap()
            .unwrap();
        let animation = restored.animation.unwrap();
        assert!(animation.keys().contains(PositionField::Left));
        runtime.tick(HostTime(0));
        runtime.tick(HostTime(10_000));
        assert!(animation.is_finished());
        assert_eq!(store.left(), Some(100.0));
    }

    #[test]
    fn missing_and_empty_names() {
        let (_runtime, _el, _parent, store) = mounted(PositionOptions::new());
        assert_eq!(store.save(""), Err(PositionError::EmptySnapshotName));
        assert!(store.get_save("nope").is_none());
        assert!(store.remove("nope").is_none());
        assert!(store
            .restore("nope", RestoreOptions::default())
            .unwrap()
            .is_none());
    }

    #[test]
    fn reset_needs_a_captured_default() {
        let runtime = Runtime::new();
        let parent = FakeParent::detached();
        let store = PositionStore::new(&runtime, &parent, PositionOptions::new().seed(seeded()))
            .unwrap();
        store.set(&PositionPatch::new().left(1.0)).unwrap();
        assert!(!store.reset(ResetOptions::default()));
    }

    #[test]
    fn reset_restores_default_and_maximizes() {
        let (runtime, _el, parent, store) = mounted(PositionOptions::new().seed(seeded()));
        store.set(&PositionPatch::new().z_index(2)).unwrap();
        let default = store.default_data().unwrap();
        store
            .set(&PositionPatch::new().left(600.0).top(5.0).z_index(7))
            .unwrap();
        store.save("x").unwrap();
        parent.set_minimized(true);

        assert!(store.reset(ResetOptions {
            keep_z_index: true,
            invoke_set: true,
        }));
        assert_eq!(parent.maximize_calls(), 1);
        assert_eq!(store.left(), default.left);
        assert_eq!(store.top(), default.top);
        assert_eq!(store.z_index(), Some(7));
        assert!(store.get_save("x").is_none());
        assert!(runtime.needs_frame());
    }

    #[test]
    fn reset_refuses_while_animating() {
        let (_runtime, _el, _parent, store) = mounted(PositionOptions::new().seed(seeded()));
        store.set(&PositionPatch::new().left(1.0)).unwrap();
        store
            .animate_to(&PositionPatch::new().left(50.0), AnimationOptions::new())
            .unwrap();
        assert!(!store.reset(ResetOptions::default()));
        store.cancel_animations();
        assert!(store.reset(ResetOptions {
            keep_z_index: false,
            invoke_set: false,
        }));
        assert_eq!(store.left(), Some(1.0));
    }
}
