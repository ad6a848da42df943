use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::{
    assets::scan::{ClipId, ClipRecord},
    foundation::core::{Canvas, Fps, PixelRect},
    foundation::error::{SweepError, SweepResult},
    layout::grid::GridLayout,
};

/// Geometry and timing options for the composed grid.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct GridOpts {
    /// Square cell (thumbnail) side in pixels.
    pub cell_size: u32,
    /// Gap between neighbouring cells in pixels.
    pub padding: u32,
    /// Output frame rate.
    pub fps: Fps,
    /// Width reserved left of the grid for Y labels.
    pub left_margin: u32,
    /// X offset of the Y value labels inside the left margin.
    pub y_label_x: u32,
    /// Inset of the axis titles from the canvas edge, and of X value labels below the title row.
    pub label_inset: u32,
    /// Duration used when no placed clip reports one.
    pub fallback_duration_secs: f64,
}

impl Default for GridOpts {
    fn default() -> Self {
        Self {
            cell_size: 150,
            padding: 5,
            fps: Fps::default(),
            left_margin: 100,
            y_label_x: 50,
            label_inset: 5,
            fallback_duration_secs: 10.0,
        }
    }
}

impl GridOpts {
    /// Reject sizes and timings that cannot produce a grid.
    pub fn validate(&self) -> SweepResult<()> {
        if self.cell_size == 0 {
            return Err(SweepError::validation("cell_size must be > 0"));
        }
        Fps::new(self.fps.num, self.fps.den)?;
        if !(self.fallback_duration_secs.is_finite() && self.fallback_duration_secs > 0.0) {
            return Err(SweepError::validation(
                "fallback_duration_secs must be finite and > 0",
            ));
        }
        if self.left_margin > 0 && self.y_label_x >= self.left_margin {
            return Err(SweepError::validation(
                "y_label_x must lie inside the left margin",
            ));
        }
        if self.checked_top_margin().is_none() {
            return Err(SweepError::validation(
                "padding leaves no room in the u32 pixel range",
            ));
        }
        Ok(())
    }

    /// Base label font size, scaled with the cell.
    pub fn font_size(&self) -> u32 {
        (self.cell_size / 12).max(12)
    }

    /// Height of the axis-value label row.
    pub fn text_height(&self) -> u32 {
        self.font_size() + 15
    }

    /// Height of the parameter-name row.
    pub fn title_height(&self) -> u32 {
        self.font_size() + 5
    }

    /// Space above the first row: title row, value-label row, one padding.
    pub fn top_margin(&self) -> u32 {
        (self.text_height() + self.title_height()).saturating_add(self.padding)
    }

    fn checked_top_margin(&self) -> Option<u32> {
        (self.text_height() + self.title_height()).checked_add(self.padding)
    }
}

/// Pixels covered by `n` cells and the gaps between them.
fn span(n: usize, cell: u32, pad: u32) -> Option<u32> {
    let n = u32::try_from(n).ok()?;
    n.checked_mul(cell)?
        .checked_add(n.saturating_sub(1).checked_mul(pad)?)
}

/// What fills a cell.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CellSource {
    /// A discovered clip, by id and source path.
    Clip {
        /// Index into the scanned clips.
        id: ClipId,
        /// Source video to resize into the cell.
        path: PathBuf,
    },
    /// The shared blank clip described by [`CompositionPlan::placeholder`].
    Placeholder,
}

/// One cell's pixel placement on the canvas.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct CellPlacement {
    /// Grid row, top to bottom.
    pub row: usize,
    /// Grid column, left to right.
    pub col: usize,
    /// Pixel area on the canvas.
    pub rect: PixelRect,
    /// Clip or placeholder shown in the cell.
    pub source: CellSource,
}

/// What a label annotates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelRole {
    /// One X axis value, above its column.
    XValue,
    /// One Y axis value, left of its row.
    YValue,
    /// X parameter name, above the value row.
    XTitle,
    /// Y parameter name, in the left margin.
    YTitle,
}

/// Which point of the rendered text sits at `(x, y)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelAnchor {
    /// Text box top-left corner.
    TopLeft,
    /// Middle of the text box top edge.
    TopCenter,
    /// Middle of the text box left edge.
    MiddleLeft,
}

/// A text label drawn over the canvas.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct LabelPlacement {
    /// Unescaped label text.
    pub text: String,
    /// What the label annotates.
    pub role: LabelRole,
    /// Anchor point, canvas pixels.
    pub x: u32,
    /// Anchor point, canvas pixels.
    pub y: u32,
    /// Which point of the text sits at `(x, y)`.
    pub anchor: LabelAnchor,
    /// Font size in pixels.
    pub font_size: u32,
}

/// Blank clip substituted for empty or failed cells.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct PlaceholderSpec {
    /// Side in pixels; equals the cell size.
    pub size: u32,
    /// Equals the plan's common duration.
    pub duration_secs: f64,
    /// Equals the plan's frame rate.
    pub fps: Fps,
}

/// Where the common duration came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DurationSource {
    /// Longest probed clip.
    Probed,
    /// [`GridOpts::fallback_duration_secs`]; nothing could be probed.
    Fallback,
}

/// Fully resolved geometry and timing for one grid video.
///
/// Every grid cell has exactly one placement, so backends never see an empty cell.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct CompositionPlan {
    /// Output frame size, before rounding to even dimensions.
    pub canvas: Canvas,
    /// Cell side in pixels.
    pub cell_size: u32,
    /// Gap between cells in pixels.
    pub padding: u32,
    /// Output frame rate.
    pub fps: Fps,
    /// Space above the first row.
    pub top_margin: u32,
    /// Space left of the first column.
    pub left_margin: u32,
    /// Length every cell is trimmed or padded to.
    pub common_duration_secs: f64,
    /// Whether the duration was probed.
    pub duration_source: DurationSource,
    /// Clip shown in empty and failed cells.
    pub placeholder: PlaceholderSpec,
    /// Row-major.
    pub cells: Vec<CellPlacement>,
    /// Axis values and titles.
    pub labels: Vec<LabelPlacement>,
}

impl CompositionPlan {
    /// Cells with no clip at planning time.
    pub fn placeholder_count(&self) -> usize {
        self.cells
            .iter()
            .filter(|c| c.source == CellSource::Placeholder)
            .count()
    }

    /// Placement at `(row, col)`.
    pub fn cell(&self, row: usize, col: usize) -> Option<&CellPlacement> {
        self.cells.iter().find(|c| c.row == row && c.col == col)
    }
}

/// Longest positive finite duration among placed clips.
pub fn common_duration(
    layout: &GridLayout,
    durations: &BTreeMap<ClipId, f64>,
) -> Option<f64> {
    layout
        .placed()
        .filter_map(|(_, _, id)| durations.get(&id).copied())
        .filter(|d| d.is_finite() && *d > 0.0)
        .reduce(f64::max)
}

/// Turn a logical grid into a composition plan. Pure: no IO.
///
/// `clips[i]` is the record for `ClipId(i)`; `durations` holds whatever durations the probe
/// produced (missing entries mean unknown).
#[tracing::instrument(skip_all, fields(rows = layout.rows(), cols = layout.cols()))]
pub fn plan_composition(
    layout: &GridLayout,
    clips: &[ClipRecord],
    durations: &BTreeMap<ClipId, f64>,
    opts: &GridOpts,
) -> SweepResult<CompositionPlan> {
    opts.validate()?;
    let rows = layout.rows();
    let cols = layout.cols();
    if rows == 0 || cols == 0 {
        return Err(SweepError::validation("grid layout has no cells"));
    }

    let (common_duration_secs, duration_source) = match common_duration(layout, durations) {
        Some(d) => (d, DurationSource::Probed),
        None => (opts.fallback_duration_secs, DurationSource::Fallback),
    };

    let cell = opts.cell_size;
    let pad = opts.padding;
    let top_margin = opts.top_margin();
    let left_margin = opts.left_margin;
    let overflow = || SweepError::validation("grid canvas exceeds u32 pixel range");
    let grid_width = span(cols, cell, pad).ok_or_else(overflow)?;
    let grid_height = span(rows, cell, pad).ok_or_else(overflow)?;
    let canvas = Canvas {
        width: grid_width.checked_add(left_margin).ok_or_else(overflow)?,
        height: grid_height.checked_add(top_margin).ok_or_else(overflow)?,
    };
    // Every offset below is bounded by the canvas checked above.
    let cell_rect = |row: usize, col: usize| {
        let (row, col) = (row as u32, col as u32);
        PixelRect {
            x: left_margin + col * cell + col * pad,
            y: top_margin + row * cell + row * pad,
            width: cell,
            height: cell,
        }
    };

    let mut cells = Vec::with_capacity(rows * cols);
    for row in 0..rows {
        for col in 0..cols {
            let source = match layout.cell(row, col) {
                Some(id) => match clips.get(id.0) {
                    Some(record) => CellSource::Clip {
                        id,
                        path: record.path.clone(),
                    },
                    None => {
                        return Err(SweepError::validation(format!(
                            "layout references clip {} but only {} clips were given",
                            id.0,
                            clips.len()
                        )));
                    }
                },
                None => CellSource::Placeholder,
            };
            cells.push(CellPlacement {
                row,
                col,
                rect: cell_rect(row, col),
                source,
            });
        }
    }

    let font = opts.font_size();
    let mut labels = Vec::new();
    for (col, text) in layout.x.labels.iter().enumerate() {
        labels.push(LabelPlacement {
            text: text.clone(),
            role: LabelRole::XValue,
            x: cell_rect(0, col).center_x(),
            y: opts.text_height().saturating_add(opts.label_inset),
            anchor: LabelAnchor::TopCenter,
            font_size: font,
        });
    }
    for (row, text) in layout.y.labels.iter().enumerate() {
        labels.push(LabelPlacement {
            text: text.clone(),
            role: LabelRole::YValue,
            x: opts.y_label_x,
            y: cell_rect(row, 0).center_y(),
            anchor: LabelAnchor::MiddleLeft,
            font_size: font,
        });
    }
    if let Some(title) = &layout.x.title {
        labels.push(LabelPlacement {
            text: title.clone(),
            role: LabelRole::XTitle,
            x: left_margin + grid_width / 2,
            y: opts.label_inset,
            anchor: LabelAnchor::TopCenter,
            font_size: font + 2,
        });
    }
    // A single row has no meaningful Y parameter.
    if let Some(title) = &layout.y.title
        && rows > 1
    {
        labels.push(LabelPlacement {
            text: title.clone(),
            role: LabelRole::YTitle,
            x: opts.label_inset,
            y: (canvas.height / 2).saturating_sub(font),
            anchor: LabelAnchor::TopLeft,
            font_size: font + 2,
        });
    }

    let plan = CompositionPlan {
        canvas,
        cell_size: cell,
        padding: pad,
        fps: opts.fps,
        top_margin,
        left_margin,
        common_duration_secs,
        duration_source,
        placeholder: PlaceholderSpec {
            size: cell,
            duration_secs: common_duration_secs,
            fps: opts.fps,
        },
        cells,
        labels,
    };
    tracing::debug!(
        width = plan.canvas.width,
        height = plan.canvas.height,
        duration = plan.common_duration_secs,
        placeholders = plan.placeholder_count(),
        "composition plan"
    );
    Ok(plan)
}

#[cfg(test)]
#[path = "../../tests/unit/compile/plan.rs"]
mod tests;
