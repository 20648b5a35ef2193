// Copyright 2026 the Pergola Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Linear layout: distributing a container's extent among its children.
//!
//! [`distribute`] splits the primary axis; [`align`] places each child on the
//! cross axis. [`LinearLayout`] is a container widget built on both that
//! re-arranges its visible children whenever it is resized or a child
//! reports a size or visibility change.
//!
//! ## Distribution
//!
//! With `n` children, spacing `s` and preferred sizes `p_i`, let
//! `total = Σ p_i + s·(n-1)`. Then, for available space `A`:
//!
//! 1. `A == total`: every child gets `p_i`.
//! 2. `A > total`: fixed children get `p_i`; the rest of the room is split
//!    among expandable children in proportion to `p_i`.
//! 3. `A < total`: if `A - s·(n-1)` still covers the fixed children, only
//!    expandable children shrink (proportionally, possibly to zero);
//!    otherwise expandable children get zero and fixed children shrink
//!    proportionally.
//!
//! Whenever space is split, the last child of the group takes the rounding
//! remainder so the parts add up to the room exactly.

use alloc::vec::Vec;

use kurbo::{Insets, Point, Size};

use crate::view::{
    PositionUpdateRequest, SizeUpdateRequest, ViewCx, ViewId, ViewTree, VisibilityUpdateRequest,
};
use crate::widget::Widget;

/// The primary axis of a linear layout.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Orientation {
    /// Children run left to right.
    #[default]
    Horizontal,
    /// Children run top to bottom.
    Vertical,
}

/// Cross-axis placement of a child.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Alignment {
    /// Flush with the start edge at preferred extent.
    Start,
    /// Centered at preferred extent.
    Center,
    /// Flush with the end edge at preferred extent.
    End,
    /// Stretched over the whole cross extent.
    #[default]
    Fill,
}

/// One child's input to [`distribute`].
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LayoutItem {
    /// Preferred extent along the primary axis.
    pub preferred: f64,
    /// Whether the child takes part in sharing surplus or deficit space.
    pub expand: bool,
}

impl LayoutItem {
    /// A child that keeps its preferred extent whenever possible.
    #[must_use]
    pub const fn fixed(preferred: f64) -> Self {
        Self {
            preferred,
            expand: false,
        }
    }

    /// A child that grows and shrinks with the container.
    #[must_use]
    pub const fn expanding(preferred: f64) -> Self {
        Self {
            preferred,
            expand: true,
        }
    }
}

/// Splits `available` among `items` separated by `spacing`.
///
/// Returns one extent per item, in order. Pure and deterministic.
#[must_use]
pub fn distribute(items: &[LayoutItem], available: f64, spacing: f64) -> Vec<f64> {
    let n = items.len();
    if n == 0 {
        return Vec::new();
    }
    let gaps = spacing * (n - 1) as f64;
    let preferred_sum: f64 = items.iter().map(|i| i.preferred).sum();
    let fixed_sum: f64 = items.iter().filter(|i| !i.expand).map(|i| i.preferred).sum();
    let has_expanding = items.iter().any(|i| i.expand);
    let total = preferred_sum + gaps;

    let mut sizes: Vec<f64> = items.iter().map(|i| i.preferred).collect();
    if available == total || (available > total && !has_expanding) {
        return sizes;
    }

    let room = (available - gaps).max(0.0);
    if room >= fixed_sum && has_expanding {
        share(items, &mut sizes, room - fixed_sum, |i| i.expand);
    } else {
        for (size, item) in sizes.iter_mut().zip(items) {
            if item.expand {
                *size = 0.0;
            }
        }
        share(items, &mut sizes, room.min(fixed_sum), |i| !i.expand);
    }
    sizes
}

/// Splits `room` among the items selected by `member`, in proportion to
/// their preferred sizes (evenly if those are all zero).
fn share(
    items: &[LayoutItem],
    sizes: &mut [f64],
    room: f64,
    member: impl Fn(&LayoutItem) -> bool,
) {
    let members: Vec<usize> = (0..items.len()).filter(|&i| member(&items[i])).collect();
    let Some((&last, rest)) = members.split_last() else {
        return;
    };
    let weight: f64 = members.iter().map(|&i| items[i].preferred).sum();
    let count = members.len() as f64;
    let mut assigned = 0.0;
    for &i in rest {
        let part = if weight > 0.0 {
            room * items[i].preferred / weight
        } else {
            room / count
        };
        sizes[i] = part;
        assigned += part;
    }
    sizes[last] = (room - assigned).max(0.0);
}

/// Places a child of cross-axis extent `preferred` within `available`.
///
/// Returns `(offset, extent)`. Expanding children always fill.
#[must_use]
pub fn align(alignment: Alignment, preferred: f64, expand: bool, available: f64) -> (f64, f64) {
    let available = available.max(0.0);
    if expand || alignment == Alignment::Fill {
        return (0.0, available);
    }
    let extent = preferred.clamp(0.0, available);
    let offset = match alignment {
        Alignment::Start | Alignment::Fill => 0.0,
        Alignment::Center => (available - extent) / 2.0,
        Alignment::End => available - extent,
    };
    (offset, extent)
}

/// A container that lines its visible children up along one axis.
///
/// It owns its children's positions: a child cannot move itself, and any
/// child size or visibility change triggers a fresh arrangement.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LinearLayout {
    /// Primary axis.
    pub orientation: Orientation,
    /// Cross-axis placement of children.
    pub alignment: Alignment,
    /// Gap between consecutive children.
    pub spacing: f64,
    /// Space kept free around the children.
    pub margin: Insets,
    /// Whether the layout itself expands horizontally in its own container.
    pub expand_x: bool,
    /// Whether the layout itself expands vertically in its own container.
    pub expand_y: bool,
}

impl LinearLayout {
    /// Creates a layout along `orientation` with no spacing or margin.
    #[must_use]
    pub fn new(orientation: Orientation) -> Self {
        Self {
            orientation,
            ..Self::default()
        }
    }

    /// Sets the gap between children.
    #[must_use]
    pub fn with_spacing(mut self, spacing: f64) -> Self {
        self.spacing = spacing;
        self
    }

    /// Sets the margin.
    #[must_use]
    pub fn with_margin(mut self, margin: Insets) -> Self {
        self.margin = margin;
        self
    }

    /// Sets the cross-axis alignment.
    #[must_use]
    pub fn with_alignment(mut self, alignment: Alignment) -> Self {
        self.alignment = alignment;
        self
    }

    /// Sets whether the layout expands within its own container.
    #[must_use]
    pub fn with_expand(mut self, x: bool, y: bool) -> Self {
        self.expand_x = x;
        self.expand_y = y;
        self
    }

    /// Computes where each visible child of `id` goes, given `id`'s current
    /// size. Does not modify the tree.
    #[must_use]
    pub fn compute(&self, tree: &ViewTree, id: ViewId) -> Vec<(ViewId, Point, Size)> {
        let size = tree.size(id);
        let m = self.margin;
        let inner = Size::new(
            (size.width - m.x0 - m.x1).max(0.0),
            (size.height - m.y0 - m.y1).max(0.0),
        );
        let children: Vec<ViewId> = tree.children(id).filter(|&c| tree.is_visible(c)).collect();

        let horizontal = self.orientation == Orientation::Horizontal;
        let (main, cross) = if horizontal {
            (inner.width, inner.height)
        } else {
            (inner.height, inner.width)
        };

        let measured: Vec<(Size, (bool, bool))> = children
            .iter()
            .map(|&c| (tree.preferred_size(c), tree.expands(c)))
            .collect();
        let items: Vec<LayoutItem> = measured
            .iter()
            .map(|&(pref, (ex, ey))| LayoutItem {
                preferred: if horizontal { pref.width } else { pref.height },
                expand: if horizontal { ex } else { ey },
            })
            .collect();
        let extents = distribute(&items, main, self.spacing);

        let mut cursor = 0.0;
        let mut placed = Vec::with_capacity(children.len());
        for ((&child, &(pref, (ex, ey))), &extent) in children.iter().zip(&measured).zip(&extents) {
            let (offset, cross_extent) = if horizontal {
                align(self.alignment, pref.height, ey, cross)
            } else {
                align(self.alignment, pref.width, ex, cross)
            };
            let (position, size) = if horizontal {
                (
                    Point::new(m.x0 + cursor, m.y0 + offset),
                    Size::new(extent, cross_extent),
                )
            } else {
                (
                    Point::new(m.x0 + offset, m.y0 + cursor),
                    Size::new(cross_extent, extent),
                )
            };
            placed.push((child, position, size));
            cursor += extent + self.spacing;
        }
        placed
    }

    fn arrange(&self, cx: &mut ViewCx<'_>) {
        let id = cx.id();
        for (child, position, size) in self.compute(cx, id) {
            // An earlier child's hook may have detached or destroyed it.
            if cx.is_alive(child) && cx.parent(child) == Some(id) {
                cx.set_child_geometry(id, child, position, size);
            }
        }
    }
}

impl Widget for LinearLayout {
    fn preferred_size(&self, tree: &ViewTree, id: ViewId) -> Size {
        let horizontal = self.orientation == Orientation::Horizontal;
        let mut main = 0.0;
        let mut cross: f64 = 0.0;
        let mut count = 0;
        for child in tree.children(id).filter(|&c| tree.is_visible(c)) {
            let pref = tree.preferred_size(child);
            let (m, c) = if horizontal {
                (pref.width, pref.height)
            } else {
                (pref.height, pref.width)
            };
            main += m;
            cross = cross.max(c);
            count += 1;
        }
        if count > 1 {
            main += self.spacing * f64::from(count - 1);
        }
        let m = self.margin;
        if horizontal {
            Size::new(main + m.x0 + m.x1, cross + m.y0 + m.y1)
        } else {
            Size::new(cross + m.x0 + m.x1, main + m.y0 + m.y1)
        }
    }

    fn expand_x(&self) -> bool {
        self.expand_x
    }

    fn expand_y(&self) -> bool {
        self.expand_y
    }

    fn position_update_test(
        &self,
        _: &ViewTree,
        id: ViewId,
        request: &PositionUpdateRequest,
    ) -> bool {
        request.target == id
    }

    fn size_updated(&mut self, cx: &mut ViewCx<'_>, _: &SizeUpdateRequest) {
        self.arrange(cx);
    }

    fn report_size_update(&mut self, cx: &mut ViewCx<'_>, _: &SizeUpdateRequest) {
        self.arrange(cx);
    }

    fn report_visibility_update(&mut self, cx: &mut ViewCx<'_>, _: &VisibilityUpdateRequest) {
        self.arrange(cx);
    }
}

impl ViewTree {
    /// The size `id`'s widget asks for.
    ///
    /// Falls back to the current size while the widget is running a hook.
    #[must_use]
    pub fn preferred_size(&self, id: ViewId) -> Size {
        self.validate(id);
        match self.widget_ref(id.idx) {
            Some(w) => w.preferred_size(self, id),
            None => self.size[id.idx as usize],
        }
    }

    /// Whether `id`'s widget expands horizontally and vertically.
    #[must_use]
    pub fn expands(&self, id: ViewId) -> (bool, bool) {
        self.validate(id);
        self.widget_ref(id.idx)
            .map_or((false, false), |w| (w.expand_x(), w.expand_y()))
    }
}
