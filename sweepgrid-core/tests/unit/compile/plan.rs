use super::*;
use crate::layout::grid::{AxisHints, build_layout};
use crate::params::map::ParameterMap;
use crate::params::space::ParameterSpace;
use crate::params::value::ParameterValue;

fn clips(n: usize) -> Vec<ClipRecord> {
    (0..n)
        .map(|i| ClipRecord::new(format!("batch/c{i}/c{i}.mp4"), format!("c{i}")))
        .collect()
}

/// 2x2 schedule grid with the (0.6, 9) cell empty.
fn schedule_layout() -> GridLayout {
    let maps: Vec<ParameterMap> = [(0.4, 7i64), (0.6, 7), (0.4, 9)]
        .into_iter()
        .map(|(s, c)| {
            [
                ("strength_schedule", ParameterValue::Float(s)),
                ("cfg_scale_schedule", ParameterValue::Int(c)),
            ]
            .into_iter()
            .collect()
        })
        .collect();
    let space = ParameterSpace::analyze(&maps);
    build_layout(&maps, &space, &AxisHints::default()).unwrap()
}

fn fallback_layout(n: usize) -> GridLayout {
    let maps = vec![ParameterMap::new(); n];
    let space = ParameterSpace::analyze(&maps);
    build_layout(&maps, &space, &AxisHints::default()).unwrap()
}

#[test]
fn canvas_and_cell_geometry_follow_margins() {
    let layout = schedule_layout();
    let plan = plan_composition(&layout, &clips(3), &BTreeMap::new(), &GridOpts::default()).unwrap();

    assert_eq!(plan.top_margin, 49);
    assert_eq!(
        plan.canvas,
        Canvas {
            width: 405,
            height: 354
        }
    );
    let c = plan.cell(1, 1).unwrap();
    assert_eq!(
        c.rect,
        PixelRect {
            x: 255,
            y: 204,
            width: 150,
            height: 150
        }
    );
    assert_eq!(c.source, CellSource::Placeholder);
    assert_eq!(plan.placeholder_count(), 1);
    assert_eq!(
        plan.cell(0, 1).unwrap().source,
        CellSource::Clip {
            id: ClipId(1),
            path: PathBuf::from("batch/c1/c1.mp4"),
        }
    );
}

#[test]
fn labels_are_positioned_per_axis() {
    let layout = schedule_layout();
    let plan = plan_composition(&layout, &clips(3), &BTreeMap::new(), &GridOpts::default()).unwrap();
    let find = |role: LabelRole, text: &str| {
        plan.labels
            .iter()
            .find(|l| l.role == role && l.text == text)
            .cloned()
            .unwrap()
    };

    let x1 = find(LabelRole::XValue, "0.6");
    assert_eq!((x1.x, x1.y, x1.anchor), (330, 32, LabelAnchor::TopCenter));
    let y1 = find(LabelRole::YValue, "9");
    assert_eq!((y1.x, y1.y, y1.anchor), (50, 279, LabelAnchor::MiddleLeft));
    let xt = find(LabelRole::XTitle, "strength_schedule");
    assert_eq!((xt.x, xt.y, xt.font_size), (252, 5, 14));
    let yt = find(LabelRole::YTitle, "cfg_scale_schedule");
    assert_eq!((yt.x, yt.y), (5, 165));
    assert_eq!(plan.labels.len(), 6);
}

#[test]
fn single_row_plan_omits_y_title() {
    let maps: Vec<ParameterMap> = [1i64, 2, 3]
        .into_iter()
        .map(|v| [("steps", ParameterValue::Int(v))].into_iter().collect())
        .collect();
    let space = ParameterSpace::analyze(&maps);
    let layout = build_layout(&maps, &space, &AxisHints::default()).unwrap();
    let plan = plan_composition(&layout, &clips(3), &BTreeMap::new(), &GridOpts::default()).unwrap();

    assert!(plan.labels.iter().all(|l| l.role != LabelRole::YTitle));
    assert!(
        plan.labels
            .iter()
            .any(|l| l.role == LabelRole::YValue && l.text == "All Videos")
    );
    assert!(
        plan.labels
            .iter()
            .any(|l| l.role == LabelRole::XTitle && l.text == "steps")
    );
}

#[test]
fn common_duration_is_max_of_placed_clips() {
    let layout = schedule_layout();
    let durations = BTreeMap::from([
        (ClipId(0), 3.0),
        (ClipId(1), 4.5),
        (ClipId(2), f64::NAN),
        (ClipId(7), 99.0),
    ]);
    let plan = plan_composition(&layout, &clips(3), &durations, &GridOpts::default()).unwrap();
    assert_eq!(plan.common_duration_secs, 4.5);
    assert_eq!(plan.duration_source, DurationSource::Probed);
    assert_eq!(plan.placeholder.duration_secs, 4.5);
}

#[test]
fn unknown_durations_fall_back() {
    let layout = schedule_layout();
    let durations = BTreeMap::from([(ClipId(0), 0.0)]);
    let plan = plan_composition(&layout, &clips(3), &durations, &GridOpts::default()).unwrap();
    assert_eq!(plan.common_duration_secs, 10.0);
    assert_eq!(plan.duration_source, DurationSource::Fallback);
}

#[test]
fn cells_stay_inside_canvas_and_never_overlap() {
    for n in [1usize, 2, 3, 5, 9, 17] {
        for padding in [0u32, 5, 13] {
            let opts = GridOpts {
                padding,
                cell_size: 64,
                ..GridOpts::default()
            };
            let layout = fallback_layout(n);
            let plan = plan_composition(&layout, &clips(n), &BTreeMap::new(), &opts).unwrap();
            assert_eq!(plan.cells.len(), layout.rows() * layout.cols());
            for (i, a) in plan.cells.iter().enumerate() {
                assert!(a.rect.right() <= plan.canvas.width, "n={n} pad={padding}");
                assert!(a.rect.bottom() <= plan.canvas.height, "n={n} pad={padding}");
                assert!(a.rect.y >= plan.top_margin);
                assert!(a.rect.x >= plan.left_margin);
                for b in &plan.cells[i + 1..] {
                    assert!(!a.rect.overlaps(b.rect));
                }
            }
            let clip_cells = plan
                .cells
                .iter()
                .filter(|c| matches!(c.source, CellSource::Clip { .. }))
                .count();
            assert_eq!(clip_cells, n);
        }
    }
}

#[test]
fn planning_is_deterministic() {
    let layout = schedule_layout();
    let durations = BTreeMap::from([(ClipId(0), 2.0)]);
    let a = plan_composition(&layout, &clips(3), &durations, &GridOpts::default()).unwrap();
    let b = plan_composition(&layout, &clips(3), &durations, &GridOpts::default()).unwrap();
    assert_eq!(a, b);
}

#[test]
fn bad_options_are_rejected() {
    let layout = schedule_layout();
    for opts in [
        GridOpts {
            cell_size: 0,
            ..GridOpts::default()
        },
        GridOpts {
            fallback_duration_secs: 0.0,
            ..GridOpts::default()
        },
        GridOpts {
            y_label_x: 120,
            ..GridOpts::default()
        },
    ] {
        assert!(matches!(
            plan_composition(&layout, &clips(3), &BTreeMap::new(), &opts),
            Err(SweepError::Validation(_))
        ));
    }
}

#[test]
fn oversized_grids_are_rejected_instead_of_wrapping() {
    let layout = schedule_layout();
    let huge_cell = GridOpts {
        cell_size: 3_000_000_000,
        ..GridOpts::default()
    };
    assert!(huge_cell.validate().is_ok());
    let err = plan_composition(&layout, &clips(3), &BTreeMap::new(), &huge_cell).unwrap_err();
    assert!(matches!(err, SweepError::Validation(_)));
    assert!(err.to_string().contains("u32 pixel range"));

    let huge_margin = GridOpts {
        left_margin: u32::MAX - 100,
        ..GridOpts::default()
    };
    assert!(matches!(
        plan_composition(&layout, &clips(3), &BTreeMap::new(), &huge_margin),
        Err(SweepError::Validation(_))
    ));

    let huge_padding = GridOpts {
        padding: u32::MAX,
        ..GridOpts::default()
    };
    assert!(huge_padding.validate().is_err());
}

#[test]
fn largest_fitting_grid_is_planned() {
    let layout = schedule_layout();
    let opts = GridOpts {
        cell_size: 1_000_000_000,
        padding: 0,
        left_margin: 0,
        ..GridOpts::default()
    };
    let plan = plan_composition(&layout, &clips(3), &BTreeMap::new(), &opts).unwrap();
    assert_eq!(plan.canvas.width, 2_000_000_000);
    assert_eq!(plan.cell(1, 1).unwrap().rect.x, 1_000_000_000);
}

#[test]
fn missing_clip_records_are_rejected() {
    let layout = schedule_layout();
    assert!(plan_composition(&layout, &clips(1), &BTreeMap::new(), &GridOpts::default()).is_err());
}

#[test]
fn font_scales_with_cell_size() {
    let small = GridOpts::default();
    let large = GridOpts {
        cell_size: 300,
        ..GridOpts::default()
    };
    assert_eq!(small.font_size(), 12);
    assert_eq!(large.font_size(), 25);
    assert_eq!(large.top_margin(), 25 + 15 + 25 + 5 + 5);
}
