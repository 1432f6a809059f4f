// Copyright 2026 the Casement Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Frame-batched position state for windowed panels.
//!
//! `casement_core` owns the geometry of application windows (offsets, size,
//! rotation, scale, z-index) and keeps it in sync with host elements. It is
//! `no_std` compatible (with `alloc`) and single-threaded: shared state lives
//! behind `Rc` and `RefCell`, and everything runs on the host's frame loop.
//!
//! # Architecture
//!
//! Logical updates are decoupled from style writes. Any number of `set()`
//! calls between two frames collapse into one write pass per element:
//!
//! ```text
//!   PositionStore::set() ──► ValidatorPipeline ──► canonical data + ChangeSet
//!                                                        │
//!                 ┌──────────────────────────────────────┘
//!                 ▼
//!   Runtime (UpdateScheduler) ◄── AnimationCoordinator ◄── animate_to()
//!                 │
//!                 ▼  Runtime::tick(now)
//!   advance animations ──► flush element syncs ──► resolve frame signal
//!                                  │
//!                                  ▼
//!                    Element::set_style() + subscribers
//! ```
//!
//! **[`position`]** — [`PositionStore`](position::PositionStore): canonical
//! data, `set()`, style sync, animation entry points, named snapshots and
//! derived projections.
//!
//! **[`runtime`]** — The shared [`Runtime`](runtime::Runtime) service that
//! owns the [`scheduler`] and the animation coordinator and is ticked once
//! per display frame.
//!
//! **[`animation`]** — Tween tasks, their coordinator and the awaitable
//! [`Animation`](animation::Animation) handle.
//!
//! **[`validators`]** — Weighted validator pipeline and the built-in bounds
//! validators.
//!
//! **[`transform`]** — Transform composition to CSS and 4×4 matrices.
//!
//! **[`host`]** — The [`Element`](host::Element) and
//! [`Parent`](host::Parent) traits that host backends implement.
//!
//! **[`drag`]** — Throttled pointer drag on top of `set()`.
//!
//! **[`trace`]** — [`TraceSink`](trace::TraceSink) trait and event types for
//! frame-loop instrumentation, with zero-overhead [`Tracer`](trace::Tracer)
//! wrapper.
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies.
//! - `trace` (disabled by default): Enables `Tracer` method bodies (one branch
//!   per call site).
//! - `serde` (disabled by default): Derives `Serialize`/`Deserialize` for the
//!   position data types.

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

pub mod animation;
pub mod changes;
pub mod data;
pub mod drag;
pub mod error;
pub mod host;
pub mod placement;
pub mod position;
pub mod runtime;
pub mod scheduler;
pub mod signal;
pub mod style;
pub mod subscribe;
pub mod time;
pub mod trace;
pub mod transform;
pub mod validators;

#[cfg(test)]
mod testing;
