use crate::{
    assets::scan::ClipId,
    foundation::error::{SweepError, SweepResult},
    params::map::ParameterMap,
    params::space::ParameterSpace,
    params::value::ParameterValue,
};

/// Naming conventions that pin a parameter to an axis before the frequency ranking applies.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct AxisHints {
    /// A valid parameter whose name contains this string becomes the X axis.
    pub x_contains: String,
    /// A valid parameter whose name contains this string becomes the Y axis.
    pub y_contains: String,
    /// Row label used when only one parameter varies.
    pub single_row_label: String,
}

impl Default for AxisHints {
    fn default() -> Self {
        Self {
            x_contains: "strength_schedule".to_string(),
            y_contains: "cfg_scale_schedule".to_string(),
            single_row_label: "All Videos".to_string(),
        }
    }
}

/// Which parameters index the grid.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AxisChoice {
    /// Two varying parameters: X indexes columns, Y indexes rows.
    TwoAxis {
        /// Column parameter.
        x: String,
        /// Row parameter.
        y: String,
    },
    /// Exactly one varying parameter laid out as a single row.
    OneAxis {
        /// Column parameter.
        x: String,
    },
    /// Nothing varies; clips fill a near-square grid in discovery order.
    Fallback,
}

/// Shape family of a [`GridLayout`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutKind {
    /// See [`AxisChoice::TwoAxis`].
    TwoAxis,
    /// See [`AxisChoice::OneAxis`].
    OneAxis,
    /// See [`AxisChoice::Fallback`].
    Fallback,
}

/// One grid axis: the parameter behind it, its sorted domain, and the labels drawn for it.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct Axis {
    /// Indexing parameter; `None` for synthetic axes.
    pub param: Option<String>,
    /// Sorted value domain; empty for synthetic axes.
    pub values: Vec<ParameterValue>,
    /// Text drawn per column or row.
    pub labels: Vec<String>,
    /// Axis title; `None` when the axis has no meaningful name.
    pub title: Option<String>,
}

impl Axis {
    fn from_param(name: &str, space: &ParameterSpace) -> Self {
        let values = space.sorted_values(name);
        let labels = values.iter().map(ParameterValue::label).collect();
        Self {
            param: Some(name.to_string()),
            values,
            labels,
            title: Some(name.to_string()),
        }
    }

    fn synthetic(prefix: &str, len: usize, title: Option<&str>) -> Self {
        Self {
            param: None,
            values: Vec::new(),
            labels: (1..=len).map(|i| format!("{prefix} {i}")).collect(),
            title: title.map(str::to_string),
        }
    }

    fn fixed(label: &str) -> Self {
        Self {
            param: None,
            values: Vec::new(),
            labels: vec![label.to_string()],
            title: None,
        }
    }

    /// Number of columns or rows.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// `true` for an axis with no positions.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Index of `value` in the sorted domain.
    pub fn position(&self, value: &ParameterValue) -> Option<usize> {
        self.values.binary_search(value).ok()
    }
}

/// A clip that replaced an earlier clip at the same cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub struct Collision {
    /// Cell row.
    pub row: usize,
    /// Cell column.
    pub col: usize,
    /// Clip that lost the cell.
    pub replaced: ClipId,
    /// Clip that now holds it.
    pub by: ClipId,
}

/// Logical grid of clip references.
///
/// Every clip occupies at most one cell. Clips missing an axis value are listed in
/// [`GridLayout::dropped`]. When two clips share coordinates the later one keeps the cell and
/// the overwrite is listed in [`GridLayout::collisions`].
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct GridLayout {
    /// Shape family.
    pub kind: LayoutKind,
    /// Columns.
    pub x: Axis,
    /// Rows.
    pub y: Axis,
    cells: Vec<Vec<Option<ClipId>>>,
    /// Clips left out of the grid.
    pub dropped: Vec<ClipId>,
    /// Overwritten cells, in deposit order.
    pub collisions: Vec<Collision>,
}

impl GridLayout {
    /// Row count.
    pub fn rows(&self) -> usize {
        self.cells.len()
    }

    /// Column count.
    pub fn cols(&self) -> usize {
        self.cells.first().map_or(0, Vec::len)
    }

    /// Row-major cells.
    pub fn cells(&self) -> &[Vec<Option<ClipId>>] {
        &self.cells
    }

    /// Clip at `(row, col)`; `None` for empty or out-of-range cells.
    pub fn cell(&self, row: usize, col: usize) -> Option<ClipId> {
        self.cells.get(row).and_then(|r| r.get(col)).copied().flatten()
    }

    /// Clip at the given axis values. `y` is ignored for single-row layouts.
    pub fn clip_at(&self, x: &ParameterValue, y: Option<&ParameterValue>) -> Option<ClipId> {
        let col = self.x.position(x)?;
        let row = match self.kind {
            LayoutKind::TwoAxis => self.y.position(y?)?,
            LayoutKind::OneAxis => 0,
            LayoutKind::Fallback => return None,
        };
        self.cell(row, col)
    }

    /// `(row, col, clip)` for every filled cell, row-major.
    pub fn placed(&self) -> impl Iterator<Item = (usize, usize, ClipId)> + '_ {
        self.cells.iter().enumerate().flat_map(|(row, cells)| {
            cells
                .iter()
                .enumerate()
                .filter_map(move |(col, c)| c.map(|id| (row, col, id)))
        })
    }

    /// Filled cells.
    pub fn placed_count(&self) -> usize {
        self.placed().count()
    }

    /// Cells that will show the placeholder.
    pub fn empty_count(&self) -> usize {
        self.rows() * self.cols() - self.placed_count()
    }

    fn deposit(&mut self, row: usize, col: usize, id: ClipId) {
        if let Some(replaced) = self.cells[row][col].replace(id) {
            tracing::warn!(
                row,
                col,
                replaced = replaced.0,
                by = id.0,
                "two clips share grid coordinates; keeping the later one"
            );
            self.collisions.push(Collision {
                row,
                col,
                replaced,
                by: id,
            });
        }
    }

    fn drop_clip(&mut self, id: ClipId, missing: &str) {
        tracing::warn!(clip = id.0, param = missing, "clip lacks an axis value; dropped");
        self.dropped.push(id);
    }
}

/// Choose the axis parameters for `space`.
///
/// With two or more valid parameters the name hints are applied first (X, then Y), and any
/// unfilled axis takes the best-ranked parameter not already assigned.
pub fn select_axes(space: &ParameterSpace, hints: &AxisHints) -> AxisChoice {
    let valid: Vec<&str> = space.valid().map(|p| p.name.as_str()).collect();
    match valid.as_slice() {
        [] => return AxisChoice::Fallback,
        [only] => {
            return AxisChoice::OneAxis {
                x: only.to_string(),
            };
        }
        _ => {}
    }

    let mut x = valid
        .iter()
        .find(|name| name.contains(hints.x_contains.as_str()))
        .copied();
    let mut y = valid
        .iter()
        .find(|name| name.contains(hints.y_contains.as_str()) && Some(**name) != x)
        .copied();

    if x.is_none() {
        x = space
            .ranked()
            .into_iter()
            .map(|p| p.name.as_str())
            .find(|name| Some(*name) != y);
    }
    if y.is_none() {
        y = space
            .ranked()
            .into_iter()
            .map(|p| p.name.as_str())
            .find(|name| Some(*name) != x);
    }

    match (x, y) {
        (Some(x), Some(y)) => AxisChoice::TwoAxis {
            x: x.to_string(),
            y: y.to_string(),
        },
        (Some(only), None) | (None, Some(only)) => AxisChoice::OneAxis {
            x: only.to_string(),
        },
        (None, None) => AxisChoice::Fallback,
    }
}

/// Place every clip (`maps[i]` belongs to `ClipId(i)`) into a logical grid.
#[tracing::instrument(skip_all, fields(clips = maps.len()))]
pub fn build_layout(
    maps: &[ParameterMap],
    space: &ParameterSpace,
    hints: &AxisHints,
) -> SweepResult<GridLayout> {
    if maps.is_empty() {
        return Err(SweepError::input("cannot lay out an empty batch"));
    }

    let choice = select_axes(space, hints);
    let layout = match &choice {
        AxisChoice::TwoAxis { x, y } => two_axis(maps, space, x, y),
        AxisChoice::OneAxis { x } => one_axis(maps, space, x, hints),
        AxisChoice::Fallback => fallback(maps.len()),
    };
    tracing::info!(
        kind = ?layout.kind,
        x = layout.x.title.as_deref().unwrap_or("-"),
        y = layout.y.title.as_deref().unwrap_or("-"),
        rows = layout.rows(),
        cols = layout.cols(),
        placed = layout.placed_count(),
        dropped = layout.dropped.len(),
        "grid layout"
    );
    Ok(layout)
}

fn empty_layout(kind: LayoutKind, x: Axis, y: Axis) -> GridLayout {
    let cells = vec![vec![None; x.len()]; y.len()];
    GridLayout {
        kind,
        x,
        y,
        cells,
        dropped: Vec::new(),
        collisions: Vec::new(),
    }
}

fn two_axis(
    maps: &[ParameterMap],
    space: &ParameterSpace,
    x_param: &str,
    y_param: &str,
) -> GridLayout {
    let mut layout = empty_layout(
        LayoutKind::TwoAxis,
        Axis::from_param(x_param, space),
        Axis::from_param(y_param, space),
    );
    for (idx, map) in maps.iter().enumerate() {
        let id = ClipId(idx);
        let col = map.get(x_param).and_then(|v| layout.x.position(v));
        let row = map.get(y_param).and_then(|v| layout.y.position(v));
        match (row, col) {
            (Some(row), Some(col)) => layout.deposit(row, col, id),
            (_, None) => layout.drop_clip(id, x_param),
            (None, _) => layout.drop_clip(id, y_param),
        }
    }
    layout
}

fn one_axis(
    maps: &[ParameterMap],
    space: &ParameterSpace,
    x_param: &str,
    hints: &AxisHints,
) -> GridLayout {
    let mut layout = empty_layout(
        LayoutKind::OneAxis,
        Axis::from_param(x_param, space),
        Axis::fixed(&hints.single_row_label),
    );
    for (idx, map) in maps.iter().enumerate() {
        let id = ClipId(idx);
        match map.get(x_param).and_then(|v| layout.x.position(v)) {
            Some(col) => layout.deposit(0, col, id),
            None => layout.drop_clip(id, x_param),
        }
    }
    layout
}

fn fallback(clip_count: usize) -> GridLayout {
    let side = ceil_sqrt(clip_count);
    let mut layout = empty_layout(
        LayoutKind::Fallback,
        Axis::synthetic("Col", side, Some("Column")),
        Axis::synthetic("Row", side, Some("Row")),
    );
    for idx in 0..clip_count {
        layout.deposit(idx / side, idx % side, ClipId(idx));
    }
    layout
}

/// Smallest `s` with `s * s >= n`.
fn ceil_sqrt(n: usize) -> usize {
    let mut side = (n as f64).sqrt() as usize;
    while side * side < n {
        side += 1;
    }
    while side > 0 && (side - 1) * (side - 1) >= n {
        side -= 1;
    }
    side
}

#[cfg(test)]
#[path = "../../tests/unit/layout/grid.rs"]
mod tests;
