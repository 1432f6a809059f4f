// Copyright 2026 the Casement Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Minimal host doubles for driving a runtime in tests.

use std::rc::Rc;

use casement_core::host::{Axis, Element, ElementId, Parent, StyleProperty};
use casement_core::style::ComputedStyle;
use kurbo::Size;

#[derive(Debug)]
pub(crate) struct TestElement {
    id: ElementId,
}

impl TestElement {
    pub(crate) fn new(id: u64) -> Rc<Self> {
        Rc::new(Self { id: ElementId(id) })
    }
}

impl Element for TestElement {
    fn id(&self) -> ElementId {
        self.id
    }

    fn is_connected(&self) -> bool {
        true
    }

    fn computed_style(&self) -> ComputedStyle {
        ComputedStyle::default()
    }

    fn offset_size(&self) -> Size {
        Size::new(100.0, 100.0)
    }

    fn has_inline_size(&self, _axis: Axis) -> bool {
        false
    }

    fn set_style(&self, _property: StyleProperty, _value: &str) {}

    fn remove_style(&self, _property: StyleProperty) {}
}

#[derive(Debug)]
pub(crate) struct TestParent {
    element: Rc<TestElement>,
}

impl TestParent {
    pub(crate) fn new(element: &Rc<TestElement>) -> Rc<Self> {
        Rc::new(Self {
            element: Rc::clone(element),
        })
    }
}

impl Parent for TestParent {
    fn element_target(&self) -> Option<Rc<dyn Element>> {
        Some(Rc::clone(&self.element) as Rc<dyn Element>)
    }

    fn container_size(&self) -> Size {
        Size::new(1000.0, 800.0)
    }
}
