// Copyright 2026 the Casement Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! DOM host types.

use alloc::rc::Rc;
use core::cell::{Cell, RefCell};
use core::sync::atomic::{AtomicU64, Ordering};

use casement_core::host::{Axis, Element, ElementId, Parent, StyleProperty};
use casement_core::style::ComputedStyle;
use kurbo::Size;
use web_sys::{CssStyleDeclaration, HtmlElement};

static NEXT_ELEMENT: AtomicU64 = AtomicU64::new(1);

/// Parses a CSS pixel length such as `"12.5px"`.
fn parse_px(value: &str) -> Option<f64> {
    value
        .trim()
        .strip_suffix("px")
        .and_then(|v| v.parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

/// `min-*`: `auto` and `0px` both mean no minimum.
fn parse_min(value: &str) -> Option<f64> {
    parse_px(value).filter(|v| *v > 0.0)
}

fn read_px(style: &CssStyleDeclaration, property: &str) -> Option<f64> {
    style
        .get_property_value(property)
        .ok()
        .and_then(|v| parse_px(&v))
}

fn read_computed(style: &CssStyleDeclaration) -> ComputedStyle {
    let min = |property: &str| {
        style
            .get_property_value(property)
            .ok()
            .and_then(|v| parse_min(&v))
    };
    ComputedStyle {
        margin_top: read_px(style, "margin-top").unwrap_or(0.0),
        margin_right: read_px(style, "margin-right").unwrap_or(0.0),
        margin_bottom: read_px(style, "margin-bottom").unwrap_or(0.0),
        margin_left: read_px(style, "margin-left").unwrap_or(0.0),
        min_width: min("min-width"),
        min_height: min("min-height"),
        // `none` fails to parse.
        max_width: read_px(style, "max-width"),
        max_height: read_px(style, "max-height"),
    }
}

/// An [`Element`] backed by an `HtmlElement`'s inline style.
pub struct DomElement {
    id: ElementId,
    element: HtmlElement,
}

impl DomElement {
    /// Wraps `element`, assigning it a fresh [`ElementId`].
    #[must_use]
    pub fn new(element: HtmlElement) -> Rc<Self> {
        Rc::new(Self {
            id: ElementId(NEXT_ELEMENT.fetch_add(1, Ordering::Relaxed)),
            element,
        })
    }

    /// Returns the wrapped element.
    #[must_use]
    pub fn element(&self) -> &HtmlElement {
        &self.element
    }
}

impl Element for DomElement {
    fn id(&self) -> ElementId {
        self.id
    }

    fn is_connected(&self) -> bool {
        self.element.is_connected()
    }

    fn computed_style(&self) -> ComputedStyle {
        web_sys::window()
            .and_then(|w| w.get_computed_style(&self.element).ok().flatten())
            .map(|style| read_computed(&style))
            .unwrap_or_default()
    }

    fn offset_size(&self) -> Size {
        Size::new(
            f64::from(self.element.offset_width()),
            f64::from(self.element.offset_height()),
        )
    }

    fn has_inline_size(&self, axis: Axis) -> bool {
        let property = match axis {
            Axis::Horizontal => StyleProperty::Width,
            Axis::Vertical => StyleProperty::Height,
        };
        self.element
            .style()
            .get_property_value(property.as_css())
            .is_ok_and(|v| !v.is_empty())
    }

    fn set_style(&self, property: StyleProperty, value: &str) {
        if let Err(err) = self.element.style().set_property(property.as_css(), value) {
            log::warn!("{:?}: setting {} failed: {err:?}", self.id, property.as_css());
        }
    }

    fn remove_style(&self, property: StyleProperty) {
        if let Err(err) = self.element.style().remove_property(property.as_css()) {
            log::warn!("{:?}: removing {} failed: {err:?}", self.id, property.as_css());
        }
    }
}

impl core::fmt::Debug for DomElement {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DomElement")
            .field("id", &self.id)
            .field("element", &"HtmlElement")
            .finish()
    }
}

/// A [`Parent`] for a window element positioned inside a container.
///
/// `container` is the area the window moves within; without one the viewport
/// is used.
pub struct DomParent {
    element: RefCell<Option<Rc<DomElement>>>,
    container: Option<HtmlElement>,
    positionable: Cell<bool>,
}

impl DomParent {
    /// Creates a parent mounted on `element` inside `container`.
    #[must_use]
    pub fn new(element: Rc<DomElement>, container: Option<HtmlElement>) -> Rc<Self> {
        Rc::new(Self {
            element: RefCell::new(Some(element)),
            container,
            positionable: Cell::new(true),
        })
    }

    /// Replaces or clears the mounted element.
    pub fn set_element(&self, element: Option<Rc<DomElement>>) {
        *self.element.borrow_mut() = element;
    }

    /// Enables or disables positioning.
    pub fn set_positionable(&self, positionable: bool) {
        self.positionable.set(positionable);
    }
}

impl Parent for DomParent {
    fn is_positionable(&self) -> bool {
        self.positionable.get()
    }

    fn element_target(&self) -> Option<Rc<dyn Element>> {
        self.element
            .borrow()
            .as_ref()
            .map(|el| Rc::clone(el) as Rc<dyn Element>)
    }

    fn container_size(&self) -> Size {
        if let Some(container) = &self.container {
            return Size::new(
                f64::from(container.client_width()),
                f64::from(container.client_height()),
            );
        }
        let Some(window) = web_sys::window() else {
            return Size::ZERO;
        };
        let read = |v: Result<wasm_bindgen::JsValue, wasm_bindgen::JsValue>| {
            v.ok().and_then(|v| v.as_f64()).unwrap_or(0.0)
        };
        Size::new(read(window.inner_width()), read(window.inner_height()))
    }
}

impl core::fmt::Debug for DomParent {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DomParent")
            .field("element", &self.element.borrow().as_ref().map(|el| el.id))
            .field("has_container", &self.container.is_some())
            .field("positionable", &self.positionable.get())
            .finish()
    }
}
