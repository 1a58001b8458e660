use jigsnap_core::geom::{polygon_area, polygon_contains};
use jigsnap_core::random::edge_seed;
use jigsnap_core::{
    build, build_with, Assembly, ConnectorError, LayoutConfig, LayoutError, Side, TabPolarity, Vec2,
};
use rstest::rstest;

fn global_outline(assembly: &Assembly, id: usize) -> Vec<jigsnap_core::Vec2> {
    let piece = assembly.piece(id).unwrap();
    piece.outline().iter().map(|p| *p + piece.home()).collect()
}

#[rstest]
#[case(1, 1, 100, 80, TabPolarity::Outward)]
#[case(2, 1, 200, 100, TabPolarity::Outward)]
#[case(1, 3, 90, 300, TabPolarity::Outward)]
#[case(7, 5, 100, 73, TabPolarity::Outward)]
#[case(4, 3, 1200, 840, TabPolarity::Seeded)]
#[case(6, 6, 611, 487, TabPolarity::Seeded)]
fn outlines_tile_the_image(
    #[case] cols: u32,
    #[case] rows: u32,
    #[case] width: u32,
    #[case] height: u32,
    #[case] polarity: TabPolarity,
) {
    let grid = jigsnap_core::TileGrid::new(cols, rows, width, height).unwrap();
    let tab = grid.min_tile_side() as f32 * 0.3;
    let assembly = build_with(cols, rows, width, height, tab, polarity, 77).unwrap();
    assert_eq!(assembly.pieces().len(), (cols * rows) as usize);

    let mut total = 0.0f64;
    for id in 0..assembly.pieces().len() {
        let area = polygon_area(&global_outline(&assembly, id));
        assert!(area > 0.0, "piece {id} outline is not clockwise");
        total += area as f64;
    }
    let expected = (width * height) as f64;
    assert!(
        (total - expected).abs() <= expected * 1e-4,
        "outlines cover {total} px, image has {expected}"
    );
}

/// Points that must lie strictly inside `id`: the cell corners and centre
/// pulled inward, plus both apex corners of every tab the piece owns.
fn interior_samples(assembly: &Assembly, id: usize) -> Vec<Vec2> {
    let piece = assembly.piece(id).unwrap();
    let inner = piece.inner();
    let (x0, y0) = (inner.x as f32, inner.y as f32);
    let (x1, y1) = ((inner.x + inner.width) as f32, (inner.y + inner.height) as f32);
    let mut samples = vec![
        Vec2::new(x0 + 0.5, y0 + 0.5),
        Vec2::new(x1 - 0.5, y0 + 0.5),
        Vec2::new(x1 - 0.5, y1 - 0.5),
        Vec2::new(x0 + 0.5, y1 - 0.5),
        inner.mid(),
    ];
    for side in Side::ALL {
        let connector = assembly.piece_connector(id, side).unwrap();
        if connector.stickout() <= 1.0 {
            continue;
        }
        let inward = -connector.reference_line().normal();
        let points = connector.points();
        let (a, b) = (points[2], points[3]);
        samples.push(a + inward * 0.25 + (b - a).normalized() * 0.25);
        samples.push(b + inward * 0.25 + (a - b).normalized() * 0.25);
    }
    samples
}

#[rstest]
#[case(2, 2, 200, 200, TabPolarity::Outward)]
#[case(3, 3, 300, 300, TabPolarity::Seeded)]
#[case(4, 3, 400, 330, TabPolarity::Outward)]
#[case(5, 4, 517, 389, TabPolarity::Seeded)]
#[case(7, 5, 100, 73, TabPolarity::Outward)]
fn largest_tabs_never_overlap(
    #[case] cols: u32,
    #[case] rows: u32,
    #[case] width: u32,
    #[case] height: u32,
    #[case] polarity: TabPolarity,
) {
    let config = LayoutConfig {
        cols,
        rows,
        image_width: width,
        image_height: height,
        connector_ratio: 0.5,
        polarity,
        seed: 9,
    };
    let assembly = config.build().unwrap();
    let outlines: Vec<Vec<Vec2>> = (0..assembly.pieces().len())
        .map(|id| global_outline(&assembly, id))
        .collect();
    for (id, outline) in outlines.iter().enumerate() {
        for sample in interior_samples(&assembly, id) {
            assert!(
                polygon_contains(outline, sample),
                "{sample:?} should be inside piece {id}"
            );
            for (other, other_outline) in outlines.iter().enumerate() {
                if other != id {
                    assert!(
                        !polygon_contains(other_outline, sample),
                        "{sample:?} of piece {id} is also inside piece {other}"
                    );
                }
            }
        }
    }
}

#[test]
fn tabs_reaching_past_a_third_are_rejected() {
    assert!(matches!(
        build(2, 2, 200, 200, 40.0),
        Err(LayoutError::TabTooLarge { .. })
    ));
    assert!(build(2, 2, 200, 200, 100.0 / 3.0).is_ok());
}

#[test]
fn sibling_is_exact_reversal() {
    let assembly = build(3, 2, 300, 200, 20.0).unwrap();
    let mut interior = 0;
    for (id, connector) in assembly.connectors().iter() {
        let Some(sibling_id) = connector.sibling() else {
            continue;
        };
        interior += 1;
        let sibling = assembly.connector(sibling_id).unwrap();
        assert_eq!(sibling.sibling(), Some(id));
        assert_eq!(sibling.from_point(), connector.to_point());
        assert_eq!(sibling.to_point(), connector.from_point());

        let mut forward = connector.polyline();
        forward.reverse();
        assert_eq!(forward, sibling.polyline());
        let mut back = sibling.polyline();
        back.reverse();
        assert_eq!(back, connector.polyline());
    }
    // 2 vertical seams x 2 rows + 1 horizontal seam x 3 cols, counted from both sides.
    assert_eq!(interior, 2 * (2 * 2 + 3));
}

#[test]
fn neighbours_share_their_boundary() {
    let assembly = build(2, 2, 200, 200, 30.0).unwrap();
    let left = assembly.piece_connector(0, Side::Right).unwrap();
    let right = assembly.piece_connector(1, Side::Left).unwrap();
    let mut shared = left.polyline();
    shared.reverse();
    assert_eq!(shared, right.polyline());

    let upper = assembly.piece_connector(1, Side::Bottom).unwrap();
    let lower = assembly.piece_connector(3, Side::Top).unwrap();
    let mut shared = upper.polyline();
    shared.reverse();
    assert_eq!(shared, lower.polyline());
}

#[test]
fn second_sibling_is_rejected() {
    let mut arena = jigsnap_core::ConnectorArena::new();
    let id = arena.random_interior(
        jigsnap_core::Vec2::new(0.0, 0.0),
        jigsnap_core::Vec2::new(0.0, 90.0),
        10.0,
        TabPolarity::Outward,
        0,
    );
    let sibling = arena.sibling(id).unwrap();
    assert_eq!(arena.sibling(id), Err(ConnectorError::SiblingExists(id)));
    assert_eq!(arena.sibling(sibling), Err(ConnectorError::SiblingExists(sibling)));
}

#[test]
fn counter_pieces_are_wired_both_ways() {
    let cols = 4u32;
    let rows = 3u32;
    let assembly = build(cols, rows, 400, 300, 10.0).unwrap();
    for row in 0..rows {
        for col in 0..cols {
            let piece = assembly.piece_at_cell(col, row).unwrap();
            if col + 1 < cols {
                let right = assembly.piece_at_cell(col + 1, row).unwrap();
                assert_eq!(piece.counter_piece(Side::Right), Some(right.id()));
                assert_eq!(right.counter_piece(Side::Left), Some(piece.id()));
            } else {
                assert_eq!(piece.counter_piece(Side::Right), None);
            }
            if row + 1 < rows {
                let below = assembly.piece_at_cell(col, row + 1).unwrap();
                assert_eq!(piece.counter_piece(Side::Bottom), Some(below.id()));
                assert_eq!(below.counter_piece(Side::Top), Some(piece.id()));
            } else {
                assert_eq!(piece.counter_piece(Side::Bottom), None);
            }
        }
    }
    assert_eq!(assembly.piece(0).unwrap().counter_piece(Side::Top), None);
    assert_eq!(assembly.piece(0).unwrap().counter_piece(Side::Left), None);
}

#[test]
fn border_connectors_are_degenerate() {
    let assembly = build(3, 3, 300, 300, 25.0).unwrap();
    for piece in assembly.pieces() {
        for side in Side::ALL {
            let connector = assembly.piece_connector(piece.id(), side).unwrap();
            if piece.counter_piece(side).is_none() {
                assert_eq!(connector.points().len(), 1);
                assert_eq!(connector.stickout(), 0.0);
                assert_eq!(connector.stickin(), 0.0);
                assert!(connector.is_border());
            } else {
                assert_eq!(connector.points().len(), 5);
                assert!(connector.stickout() > 0.0 || connector.stickin() < 0.0);
            }
        }
    }
}

#[test]
fn outward_tabs_stick_out_of_right_and_bottom() {
    let assembly = build(2, 2, 200, 200, 30.0).unwrap();
    let piece = assembly.piece(0).unwrap();
    let right = assembly.piece_connector(0, Side::Right).unwrap();
    let bottom = assembly.piece_connector(0, Side::Bottom).unwrap();
    assert!((right.stickout() - 30.0).abs() < 1e-3);
    assert!((bottom.stickout() - 30.0).abs() < 1e-3);
    let left_of_next = assembly.piece_connector(1, Side::Left).unwrap();
    assert!((left_of_next.stickin() + 30.0).abs() < 1e-3);
    assert!(left_of_next.stickout() < 1e-3);

    let texture = piece.texture_rect();
    assert_eq!(texture.x, 0.0);
    assert!((texture.width - 130.0).abs() < 1e-3);
    assert!((texture.height - 130.0).abs() < 1e-3);
    assert!(piece.outline().iter().all(|p| p.x >= 0.0 && p.y >= 0.0));
}

#[test]
fn remainder_is_absorbed_by_last_column() {
    let assembly = build(7, 1, 100, 50, 3.0).unwrap();
    for col in 0..6 {
        assert_eq!(assembly.piece_at_cell(col, 0).unwrap().inner().width, 14);
    }
    let last = assembly.piece_at_cell(6, 0).unwrap().inner();
    assert_eq!(last.width, 16);
    assert_eq!(last.x + last.width, 100);
}

#[test]
fn single_row_has_no_horizontal_seams() {
    let assembly = build(5, 1, 500, 100, 20.0).unwrap();
    for piece in assembly.pieces() {
        assert_eq!(piece.counter_piece(Side::Top), None);
        assert_eq!(piece.counter_piece(Side::Bottom), None);
        assert!(assembly.piece_connector(piece.id(), Side::Top).unwrap().is_border());
        assert!(assembly.piece_connector(piece.id(), Side::Bottom).unwrap().is_border());
    }
}

#[test]
fn invalid_configuration_fails_before_building() {
    assert!(matches!(build(0, 2, 100, 100, 1.0), Err(LayoutError::EmptyGrid { .. })));
    assert!(matches!(build(2, 2, 100, 100, 25.0), Err(LayoutError::TabTooLarge { .. })));
    let config = LayoutConfig {
        connector_ratio: 0.51,
        ..LayoutConfig::default()
    };
    let err = config.build().unwrap_err();
    assert_eq!(
        err.to_string(),
        "connector ratio must be between 0 and 0.5, but 0.51 was provided"
    );
}

#[test]
fn seeded_polarity_is_reproducible() {
    let config = LayoutConfig {
        polarity: TabPolarity::Seeded,
        seed: 1234,
        ..LayoutConfig::default()
    };
    let first = config.build().unwrap();
    let second = config.build().unwrap();
    for (a, b) in first.pieces().iter().zip(second.pieces()) {
        assert_eq!(a.outline(), b.outline());
    }
    for piece in first.pieces() {
        if piece.counter_piece(Side::Right).is_none() {
            continue;
        }
        let (col, row) = piece.cell();
        let connector = first.piece_connector(piece.id(), Side::Right).unwrap();
        let blank = TabPolarity::Seeded.flips(edge_seed(config.seed, 1, col, row));
        if blank {
            assert!(connector.stickin() < -1.0);
            assert!(connector.stickout() < 1e-3);
        } else {
            assert!(connector.stickout() > 1.0);
            assert!(connector.stickin() > -1e-3);
        }
    }
}
