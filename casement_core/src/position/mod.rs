// Copyright 2026 the Casement Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The position store.
//!
//! A [`PositionStore`] owns the canonical [`PositionData`] of one window.
//! Every write goes through [`PositionStore::set`]:
//!
//! 1. the patch is merged into a copy of the current data;
//! 2. if the window has a connected element, sizes are resolved, unset
//!    offsets get a default placement, and the validator pipeline adjusts
//!    or vetoes the proposal;
//! 3. values are rounded and clamped, and each field that differs from the
//!    canonical value is written and flagged in the [`ChangeSet`];
//! 4. with an element, the store's style sync is registered with the
//!    runtime for the next frame; without one, subscribers are notified
//!    right away.
//!
//! The style sync runs at most once per frame per element. It writes only
//! the flagged properties, then publishes the data and the derived
//! projections to subscribers.

mod animate;
mod derived;
mod state;
mod sync;

pub use derived::DimensionData;
pub use state::{ResetOptions, RestoreMode, RestoreOptions, Restored};

use alloc::collections::BTreeMap;
use alloc::rc::{Rc, Weak};
use alloc::string::String;
use alloc::vec::Vec;
use core::cell::{Cell, RefCell};
use core::fmt;

use kurbo::{Point, Size};

use crate::animation::AnimationTarget;
use crate::changes::ChangeSet;
use crate::data::{Dimension, FieldSet, PositionData, PositionField, PositionPatch, TransformOrigin};
use crate::error::PositionError;
use crate::host::{Axis, Element, Parent};
use crate::placement::{Centered, InitialPlacement};
use crate::runtime::{Runtime, StoreId};
use crate::scheduler::SyncCallback;
use crate::signal::Signal;
use crate::style::StyleCache;
use crate::subscribe::{Subscribers, Subscription};
use crate::time::HostTime;
use crate::trace::ValidatorVetoEvent;
use crate::transform::{TransformData, Transforms};
use crate::validators::{
    DEFAULT_WEIGHT, TransformBounds, ValidationContext, ValidatorEntry, ValidatorPipeline, Verdict,
};

/// Construction options for a [`PositionStore`].
#[derive(Clone, Debug, Default)]
pub struct PositionOptions {
    /// Fold `left`/`top` into the transform instead of writing offsets.
    pub ortho: bool,
    /// Recompute the transform projection on every sync, even without
    /// subscribers.
    pub calculate_transform: bool,
    /// Default placement for unset `left`/`top`; `None` uses `0`.
    pub initial: Option<Rc<dyn InitialPlacement>>,
    /// Validators installed at construction.
    pub validators: Vec<ValidatorEntry>,
    /// Initial data, applied without validation or style writes.
    pub seed: PositionPatch,
}

impl PositionOptions {
    /// Plain options: absolute offsets, no placement helper, no validators.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Options for an application window: centered on first placement and
    /// kept inside the container by [`TransformBounds`].
    #[must_use]
    pub fn window() -> Self {
        Self {
            initial: Some(Rc::new(Centered)),
            validators: alloc::vec![ValidatorEntry {
                id: Some(String::from("transform-bounds")),
                validator: Rc::new(TransformBounds),
                weight: DEFAULT_WEIGHT,
            }],
            ..Self::default()
        }
    }

    /// Sets the initial data.
    #[must_use]
    pub fn seed(mut self, seed: PositionPatch) -> Self {
        self.seed = seed;
        self
    }

    /// Enables or disables orthographic mode.
    #[must_use]
    pub fn ortho(mut self, ortho: bool) -> Self {
        self.ortho = ortho;
        self
    }

    /// Enables or disables eager transform projection.
    #[must_use]
    pub fn calculate_transform(mut self, enabled: bool) -> Self {
        self.calculate_transform = enabled;
        self
    }
}

pub(crate) struct StoreState {
    pub(crate) data: PositionData,
    pub(crate) changes: ChangeSet,
    pub(crate) style: StyleCache,
    /// Resolved box size from the last validated update.
    pub(crate) size: Option<Size>,
    /// Captured on the first update against a connected element.
    pub(crate) default: Option<PositionData>,
    pub(crate) saves: BTreeMap<String, PositionData>,
    pub(crate) element_updated: Signal<HostTime>,
    pub(crate) transform: Option<TransformData>,
}

pub(crate) struct StoreShared {
    pub(crate) id: StoreId,
    pub(crate) runtime: Runtime,
    pub(crate) parent: Weak<dyn Parent>,
    pub(crate) transforms: Transforms,
    pub(crate) calculate_transform: bool,
    pub(crate) initial: Option<Rc<dyn InitialPlacement>>,
    pub(crate) state: RefCell<StoreState>,
    pub(crate) validators: ValidatorPipeline,
    pub(crate) data_subs: Subscribers<PositionData>,
    pub(crate) dimension_subs: Subscribers<DimensionData>,
    pub(crate) transform_subs: Subscribers<TransformData>,
    pub(crate) animating: Cell<FieldSet>,
    pub(crate) sync: SyncCallback,
    /// Revalidates when the pipeline changes; dropped with the store.
    _pipeline_sub: Subscription,
}

/// Reactive position state of one window.
///
/// Cloning yields another handle to the same store.
#[derive(Clone)]
pub struct PositionStore {
    pub(crate) shared: Rc<StoreShared>,
}

fn field_eq(a: &PositionData, b: &PositionData, field: PositionField) -> bool {
    match field {
        PositionField::Width => a.width == b.width,
        PositionField::Height => a.height == b.height,
        PositionField::TransformOrigin => a.transform_origin == b.transform_origin,
        PositionField::ZIndex => a.z_index == b.z_index,
        other => a.numeric(other) == b.numeric(other),
    }
}

impl PositionStore {
    /// Creates a store for `parent`, sharing `runtime`'s frame loop.
    ///
    /// The seed data is applied as-is (rounded and clamped) without running
    /// validators or touching the element.
    pub fn new<P: Parent + 'static>(
        runtime: &Runtime,
        parent: &Rc<P>,
        options: PositionOptions,
    ) -> Result<Self, PositionError> {
        options.seed.check()?;
        let validators = ValidatorPipeline::new();
        for entry in options.validators {
            validators.insert(entry)?;
        }

        let mut data = PositionData::default();
        options.seed.apply_to(&mut data);
        data.normalize(&PositionData::default());

        let parent: Weak<P> = Rc::downgrade(parent);
        let parent: Weak<dyn Parent> = parent;
        let shared = Rc::new_cyclic(|weak: &Weak<StoreShared>| {
            let sync_target = weak.clone();
            let sync: SyncCallback = Rc::new(move |now| {
                if let Some(shared) = sync_target.upgrade() {
                    shared.sync(now);
                }
            });
            let revalidate_target = weak.clone();
            let pipeline_sub = validators.on_change(move || {
                if let Some(shared) = revalidate_target.upgrade() {
                    shared.update(&PositionPatch::new());
                }
            });
            StoreShared {
                id: runtime.next_store_id(),
                runtime: runtime.clone(),
                parent,
                transforms: Transforms::new(options.ortho),
                calculate_transform: options.calculate_transform,
                initial: options.initial,
                state: RefCell::new(StoreState {
                    data,
                    changes: ChangeSet::new(),
                    style: StyleCache::new(),
                    size: None,
                    default: None,
                    saves: BTreeMap::new(),
                    element_updated: Signal::resolved(HostTime::default()),
                    transform: None,
                }),
                validators: validators.clone(),
                data_subs: Subscribers::new(),
                dimension_subs: Subscribers::new(),
                transform_subs: Subscribers::new(),
                animating: Cell::new(FieldSet::EMPTY),
                sync,
                _pipeline_sub: pipeline_sub,
            }
        });
        Ok(Self { shared })
    }

    /// Identifier of this store within its runtime.
    #[must_use]
    pub fn id(&self) -> StoreId {
        self.shared.id
    }

    /// Returns a copy of the canonical data.
    #[must_use]
    pub fn get(&self) -> PositionData {
        self.shared.state.borrow().data.clone()
    }

    /// Current `left` offset.
    #[must_use]
    pub fn left(&self) -> Option<f64> {
        self.shared.state.borrow().data.left
    }

    /// Current `top` offset.
    #[must_use]
    pub fn top(&self) -> Option<f64> {
        self.shared.state.borrow().data.top
    }

    /// Current width.
    #[must_use]
    pub fn width(&self) -> Option<Dimension> {
        self.shared.state.borrow().data.width
    }

    /// Current height.
    #[must_use]
    pub fn height(&self) -> Option<Dimension> {
        self.shared.state.borrow().data.height
    }

    /// Current z-index.
    #[must_use]
    pub fn z_index(&self) -> Option<i32> {
        self.shared.state.borrow().data.z_index
    }

    /// Current transform origin.
    #[must_use]
    pub fn transform_origin(&self) -> TransformOrigin {
        self.shared.state.borrow().data.transform_origin
    }

    /// Current numeric value of any field.
    #[must_use]
    pub fn numeric(&self, field: PositionField) -> Option<f64> {
        self.shared.state.borrow().data.numeric(field)
    }

    /// The transform composer this store was configured with.
    #[must_use]
    pub fn transforms(&self) -> Transforms {
        self.shared.transforms
    }

    /// Style flags waiting for the next sync.
    #[must_use]
    pub fn pending_changes(&self) -> ChangeSet {
        self.shared.state.borrow().changes
    }

    /// Resolves after the frame that applies the most recent update.
    ///
    /// Before the first element update, and for stores without an
    /// element, the returned signal is already resolved.
    #[must_use]
    pub fn element_updated(&self) -> Signal<HostTime> {
        self.shared.state.borrow().element_updated.clone()
    }

    /// The store's validator pipeline.
    #[must_use]
    pub fn validators(&self) -> ValidatorPipeline {
        self.shared.validators.clone()
    }

    /// Applies `patch`.
    ///
    /// Returns `Ok` without side effects when the parent is gone or not
    /// positionable, or when a validator vetoes the update.
    ///
    /// # Errors
    ///
    /// [`PositionError::NonFinite`] if the patch holds `NaN` or an infinity.
    pub fn set(&self, patch: &PositionPatch) -> Result<&Self, PositionError> {
        patch.check()?;
        self.shared.update(patch);
        Ok(self)
    }

    /// Runs the current data through the validators again.
    pub fn revalidate(&self) {
        self.shared.update(&PositionPatch::new());
    }

    /// Subscribes to canonical data; `handler` runs immediately and after
    /// every applied update.
    pub fn subscribe(&self, handler: impl Fn(&PositionData) + 'static) -> Subscription {
        handler(&self.get());
        self.shared.data_subs.add(handler)
    }

    /// Subscribes to one numeric field; `handler` runs immediately and
    /// whenever that field's value changes.
    pub fn subscribe_field(
        &self,
        field: PositionField,
        handler: impl Fn(Option<f64>) + 'static,
    ) -> Subscription {
        let initial = self.numeric(field);
        handler(initial);
        let last = Cell::new(initial);
        self.shared.data_subs.add(move |data| {
            let value = data.numeric(field);
            if last.replace(value) != value {
                handler(value);
            }
        })
    }
}

impl StoreShared {
    pub(crate) fn element(&self) -> Option<Rc<dyn Element>> {
        self.parent.upgrade()?.element_target()
    }

    /// The merge, validate, diff and schedule path behind `set()`.
    pub(crate) fn update(&self, patch: &PositionPatch) {
        let Some(parent) = self.parent.upgrade() else {
            return;
        };
        if !parent.is_positionable() {
            return;
        }
        let element = parent.element_target();

        let current = self.state.borrow().data.clone();
        let mut proposed = current.clone();
        patch.apply_to(&mut proposed);

        let connected = element.as_ref().filter(|el| el.is_connected());
        if let Some(el) = connected {
            match self.validate(&*parent, &**el, patch.fields(), proposed) {
                Some(validated) => proposed = validated,
                None => return,
            }
        }
        proposed.normalize(&current);

        let mut changed = FieldSet::EMPTY;
        let changes = {
            let mut state = self.state.borrow_mut();
            if connected.is_some() && state.default.is_none() {
                state.default = Some(proposed.clone());
            }
            let ortho = self.transforms.is_ortho();
            for field in PositionField::ALL {
                if !field_eq(&state.data, &proposed, field) {
                    changed.insert(field);
                    state.changes.mark(field, ortho);
                }
            }
            if changed.is_empty() {
                return;
            }
            state.data = proposed;
            state.changes
        };
        log::trace!("{:?} updated {:?}", self.id, changed);

        match element {
            Some(el) => {
                let signal = self.runtime.register_update(el.id(), Rc::clone(&self.sync));
                self.state.borrow_mut().element_updated = signal;
            }
            None => {
                let data = {
                    let mut state = self.state.borrow_mut();
                    state.changes.reset();
                    state.data.clone()
                };
                self.publish(&data, changes, None);
            }
        }
    }

    /// Resolves sizes and default offsets, then runs the pipeline.
    ///
    /// Returns `None` on a veto.
    fn validate(
        &self,
        parent: &dyn Parent,
        el: &dyn Element,
        touched: FieldSet,
        mut proposed: PositionData,
    ) -> Option<PositionData> {
        let (style, cached) = {
            let mut state = self.state.borrow_mut();
            (state.style.update(el), state.size)
        };
        let measured = el.offset_size();
        let resolve = |value: Option<Dimension>, field: PositionField, axis: Axis, pick: fn(Size) -> f64| {
            match value {
                Some(Dimension::Px(px)) => px,
                _ if touched.contains(field) || !el.has_inline_size(axis) => pick(measured),
                _ => pick(cached.unwrap_or(measured)),
            }
        };
        let width = resolve(proposed.width, PositionField::Width, Axis::Horizontal, |s: Size| {
            s.width
        });
        let height = resolve(proposed.height, PositionField::Height, Axis::Vertical, |s: Size| {
            s.height
        });
        let size = Size::new(width, height);
        self.state.borrow_mut().size = Some(size);

        let container = parent.container_size();
        if proposed.left.is_none() || proposed.top.is_none() {
            let at = self
                .initial
                .as_ref()
                .map_or(Point::ZERO, |initial| initial.place(container, size));
            proposed.left = proposed.left.or(Some(at.x));
            proposed.top = proposed.top.or(Some(at.y));
        }

        if !self.validators.is_enabled() || self.validators.is_empty() {
            return Some(proposed);
        }
        let ctx = ValidationContext {
            position: &proposed,
            element: el,
            style,
            width,
            height,
            min_width: proposed.min_width.or(style.min_width).unwrap_or(0.0),
            min_height: proposed.min_height.or(style.min_height).unwrap_or(0.0),
            max_width: proposed
                .max_width
                .or(style.max_width)
                .unwrap_or(container.width),
            max_height: proposed
                .max_height
                .or(style.max_height)
                .unwrap_or(container.height),
            container,
            transforms: self.transforms,
        };
        match self.validators.run(&ctx) {
            Verdict::Accept(validated) => Some(validated),
            Verdict::Veto(index) => {
                log::trace!("{:?}: validator {index} vetoed {:?}", self.id, touched);
                self.runtime.trace(|t| {
                    t.validator_veto(&ValidatorVetoEvent {
                        store: self.id,
                        index,
                        fields: touched,
                    });
                });
                None
            }
        }
    }

    /// Writes `patch` straight into canonical data, bypassing validators,
    /// style writes and subscribers.
    pub(crate) fn assign_silently(&self, patch: &PositionPatch) {
        let mut state = self.state.borrow_mut();
        let current = state.data.clone();
        patch.apply_to(&mut state.data);
        state.data.normalize(&current);
    }
}

impl AnimationTarget for StoreShared {
    fn apply(&self, patch: &PositionPatch) {
        self.update(patch);
    }

    fn release(&self, keys: FieldSet) {
        let mut animating = self.animating.get();
        animating.remove_all(keys);
        self.animating.set(animating);
    }

    fn is_detached(&self) -> bool {
        match self.parent.upgrade() {
            None => true,
            Some(parent) => parent
                .element_target()
                .is_some_and(|el| !el.is_connected()),
        }
    }
}

impl fmt::Debug for PositionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.shared.state.borrow();
        f.debug_struct("PositionStore")
            .field("id", &self.shared.id)
            .field("data", &state.data)
            .field("changes", &state.changes)
            .field("animating", &self.shared.animating.get())
            .finish_non_exhaustive()
    }
}
