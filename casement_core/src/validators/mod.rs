// Copyright 2026 the Casement Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Weighted validator pipeline.
//!
//! A [`Validator`] receives a [`ValidationContext`] describing a proposed
//! position and either returns an adjusted [`PositionData`] or `None` to veto
//! the whole update. The [`ValidatorPipeline`] keeps validators sorted by
//! ascending weight (insertion is a binary search, ties keep insertion
//! order) and runs each one on the previous one's output.
//!
//! Changing the pipeline notifies its change subscribers; a position store
//! subscribes and revalidates its current data.

mod bounds;

pub use bounds::{BasicBounds, TransformBounds};

use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;
use core::cell::{Cell, RefCell};
use core::fmt;

use kurbo::Size;

use crate::data::PositionData;
use crate::error::PositionError;
use crate::host::Element;
use crate::style::ComputedStyle;
use crate::subscribe::{Subscribers, Subscription};
use crate::transform::Transforms;

/// Weight of validators added without an explicit one; they run last.
pub const DEFAULT_WEIGHT: f32 = 1.0;

/// Everything a validator may consult about a proposed update.
#[derive(Clone, Copy)]
pub struct ValidationContext<'a> {
    /// The proposed position, as adjusted by earlier validators.
    pub position: &'a PositionData,
    /// The target element.
    pub element: &'a dyn Element,
    /// Cached computed style of the element.
    pub style: ComputedStyle,
    /// Effective width in pixels.
    pub width: f64,
    /// Effective height in pixels.
    pub height: f64,
    /// Resolved minimum width.
    pub min_width: f64,
    /// Resolved minimum height.
    pub min_height: f64,
    /// Resolved maximum width.
    pub max_width: f64,
    /// Resolved maximum height.
    pub max_height: f64,
    /// Size of the area the window lives in.
    pub container: Size,
    /// Transform composer configured like the store.
    pub transforms: Transforms,
}

impl fmt::Debug for ValidationContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidationContext")
            .field("position", self.position)
            .field("element", &self.element.id())
            .field("style", &self.style)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("min_width", &self.min_width)
            .field("min_height", &self.min_height)
            .field("max_width", &self.max_width)
            .field("max_height", &self.max_height)
            .field("container", &self.container)
            .field("transforms", &self.transforms)
            .finish()
    }
}

impl ValidationContext<'_> {
    /// Width clamped into the resolved `[min_width, max_width]` range.
    #[must_use]
    pub fn clamped_width(&self) -> f64 {
        self.width.min(self.max_width).max(self.min_width)
    }

    /// Height clamped into the resolved `[min_height, max_height]` range.
    #[must_use]
    pub fn clamped_height(&self) -> f64 {
        self.height.min(self.max_height).max(self.min_height)
    }
}

/// Adjusts or vetoes a proposed position.
pub trait Validator {
    /// Returns the adjusted position, or `None` to reject the update.
    fn validate(&self, ctx: &ValidationContext<'_>) -> Option<PositionData>;
}

impl<F> Validator for F
where
    F: Fn(&ValidationContext<'_>) -> Option<PositionData>,
{
    fn validate(&self, ctx: &ValidationContext<'_>) -> Option<PositionData> {
        self(ctx)
    }
}

/// One registered validator.
#[derive(Clone)]
pub struct ValidatorEntry {
    /// Optional identifier for [`ValidatorPipeline::remove_by_id`].
    pub id: Option<String>,
    /// The validator.
    pub validator: Rc<dyn Validator>,
    /// Ordering weight in `[0, 1]`.
    pub weight: f32,
}

impl fmt::Debug for ValidatorEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidatorEntry")
            .field("id", &self.id)
            .field("weight", &self.weight)
            .finish_non_exhaustive()
    }
}

/// Outcome of running the pipeline.
#[derive(Clone, Debug, PartialEq)]
pub enum Verdict {
    /// The (possibly adjusted) position.
    Accept(PositionData),
    /// The validator at this index in weight order vetoed the update.
    Veto(usize),
}

struct PipelineInner {
    entries: RefCell<Vec<ValidatorEntry>>,
    enabled: Cell<bool>,
    changed: Subscribers<()>,
}

/// An ordered, weighted collection of validators.
///
/// Cloning yields another handle to the same pipeline.
#[derive(Clone)]
pub struct ValidatorPipeline {
    inner: Rc<PipelineInner>,
}

impl ValidatorPipeline {
    /// Creates an empty, enabled pipeline.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Rc::new(PipelineInner {
                entries: RefCell::new(Vec::new()),
                enabled: Cell::new(true),
                changed: Subscribers::new(),
            }),
        }
    }

    /// Adds `validator` at `weight` (pass [`DEFAULT_WEIGHT`] to run last).
    pub fn add(&self, validator: Rc<dyn Validator>, weight: f32) -> Result<(), PositionError> {
        self.insert(ValidatorEntry {
            id: None,
            validator,
            weight,
        })
    }

    /// Adds `validator` under `id` at `weight`.
    pub fn add_with(
        &self,
        id: impl Into<String>,
        validator: Rc<dyn Validator>,
        weight: f32,
    ) -> Result<(), PositionError> {
        self.insert(ValidatorEntry {
            id: Some(id.into()),
            validator,
            weight,
        })
    }

    /// Inserts a prepared entry.
    pub fn insert(&self, entry: ValidatorEntry) -> Result<(), PositionError> {
        if !(0.0..=1.0).contains(&entry.weight) {
            return Err(PositionError::InvalidWeight(entry.weight));
        }
        {
            let mut entries = self.inner.entries.borrow_mut();
            let at = entries.partition_point(|e| e.weight <= entry.weight);
            entries.insert(at, entry);
        }
        self.invalidate();
        Ok(())
    }

    /// Removes every entry holding `validator`. Returns whether any was
    /// removed.
    pub fn remove(&self, validator: &Rc<dyn Validator>) -> bool {
        self.remove_where(|e| core::ptr::addr_eq(Rc::as_ptr(&e.validator), Rc::as_ptr(validator)))
            > 0
    }

    /// Removes every entry registered under `id`. Returns how many were
    /// removed.
    pub fn remove_by_id(&self, id: &str) -> usize {
        self.remove_where(|e| e.id.as_deref() == Some(id))
    }

    /// Removes every validator.
    pub fn clear(&self) {
        self.remove_where(|_| true);
    }

    fn remove_where(&self, matches: impl Fn(&ValidatorEntry) -> bool) -> usize {
        let removed = {
            let mut entries = self.inner.entries.borrow_mut();
            let before = entries.len();
            entries.retain(|e| !matches(e));
            before - entries.len()
        };
        if removed > 0 {
            self.invalidate();
        }
        removed
    }

    /// Number of registered validators.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.entries.borrow().len()
    }

    /// Whether no validator is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether the pipeline runs at all.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.inner.enabled.get()
    }

    /// Enables or disables the pipeline.
    pub fn set_enabled(&self, enabled: bool) {
        if self.inner.enabled.replace(enabled) != enabled {
            self.invalidate();
        }
    }

    /// Returns the entries in weight order.
    #[must_use]
    pub fn entries(&self) -> Vec<ValidatorEntry> {
        self.inner.entries.borrow().clone()
    }

    /// Notifies change subscribers, prompting stores to revalidate.
    ///
    /// Validators that depend on outside state call this when it changes.
    pub fn invalidate(&self) {
        self.inner.changed.notify(&());
    }

    /// Subscribes to pipeline changes.
    pub fn on_change(&self, handler: impl Fn() + 'static) -> Subscription {
        self.inner.changed.add(move |()| handler())
    }

    /// Runs every validator in weight order, feeding each the previous
    /// output.
    ///
    /// `ctx.position` is the starting proposal. A disabled or empty pipeline
    /// accepts it unchanged.
    #[must_use]
    pub fn run(&self, ctx: &ValidationContext<'_>) -> Verdict {
        if !self.is_enabled() {
            return Verdict::Accept(ctx.position.clone());
        }
        // Validators may touch the pipeline, so iterate a snapshot.
        let validators: Vec<Rc<dyn Validator>> = self
            .inner
            .entries
            .borrow()
            .iter()
            .map(|e| Rc::clone(&e.validator))
            .collect();
        let mut position = ctx.position.clone();
        for (index, validator) in validators.iter().enumerate() {
            let step = ValidationContext {
                position: &position,
                ..*ctx
            };
            match validator.validate(&step) {
                Some(next) => position = next,
                None => return Verdict::Veto(index),
            }
        }
        Verdict::Accept(position)
    }
}

impl Default for ValidatorPipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ValidatorPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidatorPipeline")
            .field("enabled", &self.is_enabled())
            .field("entries", &*self.inner.entries.borrow())
            .finish()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use alloc::vec;

    use super::*;
    use crate::testing::FakeElement;

    pub(crate) fn context<'a>(
        position: &'a PositionData,
        element: &'a FakeElement,
    ) -> ValidationContext<'a> {
        ValidationContext {
            position,
            element,
            style: ComputedStyle::default(),
            width: 200.0,
            height: 100.0,
            min_width: 0.0,
            min_height: 0.0,
            max_width: 1000.0,
            max_height: 800.0,
            container: Size::new(1000.0, 800.0),
            transforms: Transforms::new(false),
        }
    }

    fn shift(dx: f64) -> Rc<dyn Validator> {
        Rc::new(move |ctx: &ValidationContext<'_>| {
            let mut p = ctx.position.clone();
            p.left = Some(p.left.unwrap_or(0.0) + dx);
            Some(p)
        })
    }

    fn double() -> Rc<dyn Validator> {
        Rc::new(|ctx: &ValidationContext<'_>| {
            let mut p = ctx.position.clone();
            p.left = p.left.map(|l| l * 2.0);
            Some(p)
        })
    }

    #[test]
    fn runs_in_weight_order() {
        let pipeline = ValidatorPipeline::new();
        pipeline.add(double(), 0.8).unwrap();
        pipeline.add(shift(5.0), 0.2).unwrap();
        let el = FakeElement::new(1);
        let data = PositionData {
            left: Some(10.0),
            ..PositionData::default()
        };
        // (10 + 5) * 2
        match pipeline.run(&context(&data, &el)) {
            Verdict::Accept(p) => assert_eq!(p.left, Some(30.0)),
            Verdict::Veto(_) => panic!("unexpected veto"),
        }
    }

    #[test]
    fn equal_weights_keep_insertion_order() {
        let pipeline = ValidatorPipeline::new();
        pipeline.add_with("a", shift(1.0), 0.5).unwrap();
        pipeline.add_with("b", shift(2.0), 0.5).unwrap();
        pipeline.add_with("c", shift(3.0), 0.1).unwrap();
        let ids: Vec<_> = pipeline.entries().into_iter().map(|e| e.id).collect();
        assert_eq!(
            ids,
            vec![Some("c".into()), Some("a".into()), Some("b".into())]
        );
    }

    #[test]
    fn veto_reports_index() {
        let pipeline = ValidatorPipeline::new();
        pipeline.add(shift(1.0), DEFAULT_WEIGHT).unwrap();
        pipeline
            .add(Rc::new(|_: &ValidationContext<'_>| None), DEFAULT_WEIGHT)
            .unwrap();
        let el = FakeElement::new(1);
        let data = PositionData::default();
        assert_eq!(pipeline.run(&context(&data, &el)), Verdict::Veto(1));

        pipeline.set_enabled(false);
        assert_eq!(
            pipeline.run(&context(&data, &el)),
            Verdict::Accept(data.clone())
        );
    }

    #[test]
    fn rejects_out_of_range_weight() {
        let pipeline = ValidatorPipeline::new();
        assert_eq!(
            pipeline.add(shift(1.0), 1.5),
            Err(PositionError::InvalidWeight(1.5))
        );
        assert!(pipeline.add(shift(1.0), f32::NAN).is_err());
        assert!(pipeline.is_empty());
    }

    #[test]
    fn removal_and_change_notifications() {
        let pipeline = ValidatorPipeline::new();
        let changes = Rc::new(Cell::new(0));
        let c = Rc::clone(&changes);
        let _sub = pipeline.on_change(move || c.set(c.get() + 1));

        let v = shift(1.0);
        pipeline.add(Rc::clone(&v), 0.5).unwrap();
        pipeline.add_with("named", shift(2.0), 0.5).unwrap();
        assert_eq!(changes.get(), 2);

        assert!(pipeline.remove(&v));
        assert!(!pipeline.remove(&v));
        assert_eq!(pipeline.remove_by_id("named"), 1);
        assert_eq!(pipeline.remove_by_id("named"), 0);
        assert_eq!(changes.get(), 4);

        pipeline.set_enabled(false);
        pipeline.set_enabled(false);
        assert_eq!(changes.get(), 5);
    }
}
