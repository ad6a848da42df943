use super::*;

#[test]
fn fps_rejects_zero_parts() {
    assert!(Fps::new(0, 1).is_err());
    assert!(Fps::new(24, 0).is_err());
    assert!(Fps::integer(30).is_ok());
}

#[test]
fn fps_ffmpeg_rate_formats() {
    assert_eq!(Fps::integer(24).unwrap().to_ffmpeg_rate(), "24");
    assert_eq!(Fps::new(30000, 1001).unwrap().to_ffmpeg_rate(), "30000/1001");
    assert!((Fps::new(30000, 1001).unwrap().as_f64() - 29.97).abs() < 0.01);
}

#[test]
fn canvas_even_rounds_up_odd_sides_only() {
    let c = Canvas {
        width: 415,
        height: 200,
    }
    .even();
    assert_eq!(
        c,
        Canvas {
            width: 416,
            height: 200
        }
    );
}

#[test]
fn pixel_rect_overlap_is_exclusive_at_edges() {
    let a = PixelRect {
        x: 0,
        y: 0,
        width: 10,
        height: 10,
    };
    let touching = PixelRect {
        x: 10,
        y: 0,
        width: 10,
        height: 10,
    };
    let inside = PixelRect {
        x: 5,
        y: 5,
        width: 2,
        height: 2,
    };
    assert!(!a.overlaps(touching));
    assert!(a.overlaps(inside));
    assert_eq!(a.center_x(), 5);
    assert_eq!(inside.bottom(), 7);
}
