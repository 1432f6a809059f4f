// Copyright 2026 the Casement Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Host doubles for unit tests.

use alloc::collections::BTreeMap;
use alloc::rc::Rc;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::cell::{Cell, RefCell};

use kurbo::Size;

use crate::host::{Axis, Element, ElementId, Parent, StyleProperty};
use crate::style::ComputedStyle;

/// One recorded inline style operation; `None` means removal.
pub(crate) type StyleWrite = (StyleProperty, Option<String>);

#[derive(Debug)]
pub(crate) struct FakeElement {
    id: ElementId,
    connected: Cell<bool>,
    size: Cell<Size>,
    style: Cell<ComputedStyle>,
    style_reads: Cell<usize>,
    inline: RefCell<BTreeMap<&'static str, String>>,
    writes: RefCell<Vec<StyleWrite>>,
}

impl FakeElement {
    pub(crate) fn new(id: u64) -> Rc<Self> {
        Rc::new(Self {
            id: ElementId(id),
            connected: Cell::new(true),
            size: Cell::new(Size::new(200.0, 100.0)),
            style: Cell::new(ComputedStyle::default()),
            style_reads: Cell::new(0),
            inline: RefCell::new(BTreeMap::new()),
            writes: RefCell::new(Vec::new()),
        })
    }

    pub(crate) fn set_connected(&self, connected: bool) {
        self.connected.set(connected);
    }

    pub(crate) fn set_size(&self, size: Size) {
        self.size.set(size);
    }

    pub(crate) fn set_computed_style(&self, style: ComputedStyle) {
        self.style.set(style);
    }

    pub(crate) fn computed_style_reads(&self) -> usize {
        self.style_reads.get()
    }

    pub(crate) fn inline(&self, property: StyleProperty) -> Option<String> {
        self.inline.borrow().get(property.as_css()).cloned()
    }

    /// Returns and clears the write log.
    pub(crate) fn take_writes(&self) -> Vec<StyleWrite> {
        core::mem::take(&mut *self.writes.borrow_mut())
    }
}

impl Element for FakeElement {
    fn id(&self) -> ElementId {
        self.id
    }

    fn is_connected(&self) -> bool {
        self.connected.get()
    }

    fn computed_style(&self) -> ComputedStyle {
        self.style_reads.set(self.style_reads.get() + 1);
        self.style.get()
    }

    fn offset_size(&self) -> Size {
        self.size.get()
    }

    fn has_inline_size(&self, axis: Axis) -> bool {
        let property = match axis {
            Axis::Horizontal => StyleProperty::Width,
            Axis::Vertical => StyleProperty::Height,
        };
        self.inline.borrow().contains_key(property.as_css())
    }

    fn set_style(&self, property: StyleProperty, value: &str) {
        self.inline
            .borrow_mut()
            .insert(property.as_css(), value.to_string());
        self.writes
            .borrow_mut()
            .push((property, Some(value.to_string())));
    }

    fn remove_style(&self, property: StyleProperty) {
        self.inline.borrow_mut().remove(property.as_css());
        self.writes.borrow_mut().push((property, None));
    }
}

#[derive(Debug)]
pub(crate) struct FakeParent {
    positionable: Cell<bool>,
    element: RefCell<Option<Rc<FakeElement>>>,
    minimized: Cell<bool>,
    maximize_calls: Cell<usize>,
    container: Cell<Size>,
}

impl FakeParent {
    /// A positionable parent with no element in a 1000×800 container.
    pub(crate) fn detached() -> Rc<Self> {
        Rc::new(Self {
            positionable: Cell::new(true),
            element: RefCell::new(None),
            minimized: Cell::new(false),
            maximize_calls: Cell::new(0),
            container: Cell::new(Size::new(1000.0, 800.0)),
        })
    }

    /// A positionable parent mounted on `element`.
    pub(crate) fn with_element(element: &Rc<FakeElement>) -> Rc<Self> {
        let parent = Self::detached();
        *parent.element.borrow_mut() = Some(Rc::clone(element));
        parent
    }

    pub(crate) fn set_positionable(&self, positionable: bool) {
        self.positionable.set(positionable);
    }

    pub(crate) fn set_element(&self, element: Option<Rc<FakeElement>>) {
        *self.element.borrow_mut() = element;
    }

    pub(crate) fn set_minimized(&self, minimized: bool) {
        self.minimized.set(minimized);
    }

    pub(crate) fn maximize_calls(&self) -> usize {
        self.maximize_calls.get()
    }

    pub(crate) fn set_container(&self, size: Size) {
        self.container.set(size);
    }
}

impl Parent for FakeParent {
    fn is_positionable(&self) -> bool {
        self.positionable.get()
    }

    fn element_target(&self) -> Option<Rc<dyn Element>> {
        self.element
            .borrow()
            .as_ref()
            .map(|el| Rc::clone(el) as Rc<dyn Element>)
    }

    fn is_minimized(&self) -> bool {
        self.minimized.get()
    }

    fn maximize_instant(&self) {
        self.maximize_calls.set(self.maximize_calls.get() + 1);
        self.minimized.set(false);
    }

    fn container_size(&self) -> Size {
        self.container.get()
    }
}
