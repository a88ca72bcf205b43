use gridmatch::{partition, GridSpec, Rect};

fn cases() -> Vec<(usize, usize, GridSpec)> {
    let mut out = Vec::new();
    for &(width, height) in &[(32, 32), (31, 29), (100, 7), (1920, 1080), (5, 5)] {
        for cols in 1..=5 {
            for rows in 1..=4 {
                for &overlap in &[0, 1, 4, 50] {
                    if cols <= width && rows <= height {
                        out.push((width, height, GridSpec { cols, rows, overlap }));
                    }
                }
            }
        }
    }
    out
}

#[test]
fn cells_tile_the_frame_exactly() {
    for (width, height, spec) in cases() {
        let grid = partition(width, height, spec).unwrap();
        assert_eq!(grid.len(), spec.cols * spec.rows);

        let area: u64 = grid.tiles().iter().map(|t| t.cell.area()).sum();
        assert_eq!(area, (width * height) as u64, "{width}x{height} {spec:?}");

        // Disjoint cells with the right total area cover every pixel once.
        let tiles = grid.tiles();
        for (i, a) in tiles.iter().enumerate() {
            for b in &tiles[i + 1..] {
                let overlap_x = a.cell.x.max(b.cell.x) < a.cell.right().min(b.cell.right());
                let overlap_y = a.cell.y.max(b.cell.y) < a.cell.bottom().min(b.cell.bottom());
                assert!(!(overlap_x && overlap_y), "{a:?} overlaps {b:?}");
            }
        }
    }
}

#[test]
fn tiles_stay_inside_frame_and_contain_their_cell() {
    for (width, height, spec) in cases() {
        let frame = Rect::new(0, 0, width, height);
        let grid = partition(width, height, spec).unwrap();
        for tile in grid.tiles() {
            assert!(frame.contains(&tile.rect), "{tile:?} in {width}x{height}");
            assert!(tile.rect.contains(&tile.cell));
            assert_eq!(grid.tile(tile.row, tile.col), Some(tile));
        }
    }
}

#[test]
fn overlap_growth_only_on_interior_edges() {
    let spec = GridSpec {
        cols: 3,
        rows: 3,
        overlap: 4,
    };
    let grid = partition(90, 60, spec).unwrap();
    for tile in grid.tiles() {
        let grown_left = tile.cell.x - tile.rect.x;
        let grown_top = tile.cell.y - tile.rect.y;
        let grown_right = tile.rect.right() - tile.cell.right();
        let grown_bottom = tile.rect.bottom() - tile.cell.bottom();
        assert_eq!(grown_left, if tile.col == 0 { 0 } else { 4 });
        assert_eq!(grown_top, if tile.row == 0 { 0 } else { 4 });
        assert_eq!(grown_right, if tile.col == 2 { 0 } else { 4 });
        assert_eq!(grown_bottom, if tile.row == 2 { 0 } else { 4 });
    }
}

#[test]
fn uneven_frames_enlarge_last_row_and_column() {
    let grid = partition(
        31,
        29,
        GridSpec {
            cols: 3,
            rows: 3,
            overlap: 0,
        },
    )
    .unwrap();
    assert_eq!(grid.cell_size(), (10, 9));
    assert_eq!(grid.tile(0, 0).unwrap().cell, Rect::new(0, 0, 10, 9));
    assert_eq!(grid.tile(2, 2).unwrap().cell, Rect::new(20, 18, 11, 11));
}

#[test]
fn tile_views_read_frame_pixels() {
    let data: Vec<u8> = (0..64).map(|v| v as u8).collect();
    let frame = gridmatch::ImageView::from_slice(&data, 8, 8).unwrap();
    let grid = partition(
        8,
        8,
        GridSpec {
            cols: 2,
            rows: 2,
            overlap: 1,
        },
    )
    .unwrap();
    let tile = grid.tile(1, 1).unwrap();
    let view = grid.view(tile, frame).unwrap();
    assert_eq!((view.width(), view.height()), (5, 5));
    assert_eq!(view.get(0, 0).copied(), Some(27));

    let other = gridmatch::ImageView::from_slice(&data, 4, 16).unwrap();
    assert!(grid.view(tile, other).is_err());
}
