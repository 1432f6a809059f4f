// Copyright 2026 the Casement Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Memoized computed style for a store's target element.

use crate::host::{Element, ElementId};

/// The subset of an element's computed style the position engine reads.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ComputedStyle {
    /// Top margin in pixels.
    pub margin_top: f64,
    /// Right margin in pixels.
    pub margin_right: f64,
    /// Bottom margin in pixels.
    pub margin_bottom: f64,
    /// Left margin in pixels.
    pub margin_left: f64,
    /// `min-width`, or `None` for `auto`/`0`.
    pub min_width: Option<f64>,
    /// `min-height`, or `None` for `auto`/`0`.
    pub min_height: Option<f64>,
    /// `max-width`, or `None` for `none`.
    pub max_width: Option<f64>,
    /// `max-height`, or `None` for `none`.
    pub max_height: Option<f64>,
}

impl ComputedStyle {
    /// Sum of the horizontal margins.
    #[must_use]
    pub fn margin_x(&self) -> f64 {
        self.margin_left + self.margin_right
    }

    /// Sum of the vertical margins.
    #[must_use]
    pub fn margin_y(&self) -> f64 {
        self.margin_top + self.margin_bottom
    }
}

/// Caches one [`ComputedStyle`], keyed by element identity.
///
/// Reading computed style forces a style recalculation on most hosts, so the
/// snapshot is taken once per element and reused until the target changes.
#[derive(Clone, Debug, Default)]
pub struct StyleCache {
    entry: Option<(ElementId, ComputedStyle)>,
}

impl StyleCache {
    /// Creates an empty cache.
    #[must_use]
    pub const fn new() -> Self {
        Self { entry: None }
    }

    /// Whether the cache holds the style of `id`.
    #[must_use]
    pub fn is_cached_for(&self, id: ElementId) -> bool {
        self.entry.is_some_and(|(cached, _)| cached == id)
    }

    /// Returns the cached style for `element`, reading it first when the
    /// cache is empty or was filled for a different element.
    pub fn update(&mut self, element: &dyn Element) -> ComputedStyle {
        let id = element.id();
        match self.entry {
            Some((cached, style)) if cached == id => style,
            _ => {
                let style = element.computed_style();
                self.entry = Some((id, style));
                style
            }
        }
    }

    /// Returns the cached style, if any.
    #[must_use]
    pub fn get(&self) -> Option<ComputedStyle> {
        self.entry.map(|(_, style)| style)
    }

    /// Drops the cached style.
    pub fn clear(&mut self) {
        self.entry = None;
    }
}
