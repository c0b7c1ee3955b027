use std::cell::{Cell, RefCell};
use std::rc::Rc;

use pazuru::{
    render_to, BoardCore, BoardStatus, ErrorKind, FetchError, MemoryFetcher, RevealMode, SvgScene,
};
use pazuru_core::{BoardRules, PiecePose};
use proptest::prelude::*;

fn piece_svg(number: usize) -> String {
    format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="100" height="100" viewBox="0 0 100 100" data-cell-width="100" data-cell-height="100"><text>{number}</text></svg>"#
    )
}

/// Manifest for a `cols` x `rows` grid of 100-unit cells.
fn grid_fetcher(cols: usize, rows: usize) -> MemoryFetcher {
    let mut fetcher = MemoryFetcher::new();
    let mut entries = Vec::new();
    for row in 0..rows {
        for col in 0..cols {
            let number = row * cols + col + 1;
            let file = format!("piece{number}.svg");
            entries.push(format!(
                r#"{{"file":"{file}","x":{},"y":{}}}"#,
                col * 100 + 50,
                row * 100 + 50
            ));
            fetcher.insert(file, piece_svg(number));
        }
    }
    fetcher.insert("puzzle.json", format!("[{}]", entries.join(",")));
    fetcher
}

fn block_on<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::runtime::Builder::new_current_thread()
        .build()
        .expect("runtime")
        .block_on(future)
}

fn loaded_board(cols: usize, rows: usize, seed: u64) -> Rc<BoardCore> {
    let board = BoardCore::with_seed(BoardRules::default(), seed);
    block_on(board.load(&grid_fetcher(cols, rows))).expect("load");
    board
}

fn poses(board: &BoardCore) -> Vec<PiecePose> {
    (0..board.piece_count())
        .map(|id| board.pose(id).expect("pose"))
        .collect()
}

/// Drags every piece so it sits at `target + offset` with the given rotation.
fn arrange(board: &BoardCore, offset: (f32, f32), rotations: &[f32]) {
    let snapshot = board.snapshot();
    for (id, piece) in snapshot.pieces.iter().enumerate() {
        let goal = (piece.target.0 + offset.0, piece.target.1 + offset.1);
        board.begin_drag(id, (0.0, 0.0));
        board.drag_move((goal.0 - piece.pose.pos.0, goal.1 - piece.pose.pos.1));
        board.end_drag();
        let rotation = rotations[id % rotations.len()];
        board.rotate(id, rotation - piece.pose.rotation_deg);
    }
}

#[tokio::test]
async fn load_scrambles_pieces_in_manifest_order() {
    let board = BoardCore::with_seed(BoardRules::default(), 42);
    let count = board.load(&grid_fetcher(3, 2)).await.expect("load");
    assert_eq!(count, 6);
    assert_eq!(board.status(), BoardStatus::Loaded(6));
    assert_eq!(board.status_text(), "Puzzle loaded! 6 pieces");

    let snapshot = board.snapshot();
    assert_eq!(snapshot.pieces[0].file, "piece1.svg");
    assert_eq!(snapshot.pieces[5].target, (250.0, 150.0));
    assert_eq!(snapshot.z_order, vec![0, 1, 2, 3, 4, 5]);
    for piece in &snapshot.pieces {
        assert!(piece.pose.rotation_deg % 360.0 != 0.0);
        assert!((50.0..=450.0).contains(&piece.pose.pos.0));
    }
    assert!(!board.check_solved());
}

#[tokio::test]
async fn failing_second_asset_leaves_board_empty() {
    let mut fetcher = grid_fetcher(2, 2);
    fetcher.fail("piece2.svg", FetchError::NotFound);
    let board = BoardCore::with_seed(BoardRules::default(), 3);

    let err = board.load(&fetcher).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::AssetLoad);
    assert_eq!(err.file(), "piece2.svg");
    assert_eq!(err.status(), Some(404));
    assert_eq!(board.piece_count(), 0);
    assert_eq!(board.status_text(), "Error: Failed to load piece2.svg: 404");
}

#[tokio::test]
async fn failed_reload_keeps_previous_puzzle() {
    let board = BoardCore::with_seed(BoardRules::default(), 9);
    board.load(&grid_fetcher(2, 1)).await.expect("load");
    board.rotate(1, 15.0);
    let before = poses(&board);

    let err = board.load(&MemoryFetcher::new()).await.unwrap_err();
    assert_eq!(err.file(), "puzzle.json");
    assert_eq!(poses(&board), before);
    assert_eq!(board.selected(), Some(1));
}

#[tokio::test]
async fn empty_or_malformed_manifest_is_rejected() {
    let board = BoardCore::with_seed(BoardRules::default(), 1);
    let mut fetcher = MemoryFetcher::new();
    fetcher.insert("puzzle.json", "[]");
    let err = board.load(&fetcher).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Content);

    fetcher.insert("puzzle.json", "{ not json");
    let err = board.load(&fetcher).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Content);
    assert_eq!(err.status(), None);

    let mut fetcher = grid_fetcher(1, 1);
    fetcher.insert("piece1.svg", "<html/>");
    let err = board.load(&fetcher).await.unwrap_err();
    assert_eq!(err.file(), "piece1.svg");
}

#[test]
fn solved_under_common_offset_and_whole_turns() {
    let board = loaded_board(3, 2, 11);
    arrange(&board, (37.0, -12.0), &[0.0, 360.0, -720.0]);
    assert!(board.check_solved());
    assert_eq!(board.status_text(), "🎉 Puzzle Solved!");
}

#[test]
fn one_piece_off_by_tolerance_is_not_solved() {
    let board = loaded_board(3, 2, 12);
    arrange(&board, (37.0, -12.0), &[0.0]);
    assert!(board.check_solved());

    board.begin_drag(4, (0.0, 0.0));
    board.drag_move((10.0, 0.0));
    board.end_drag();
    assert!(!board.check_solved());
    assert_eq!(board.status(), BoardStatus::NotSolved);

    board.begin_drag(4, (0.0, 0.0));
    board.drag_move((-10.0, 0.0));
    board.end_drag();
    assert!(board.check_solved());

    board.rotate(2, 5.0);
    assert!(!board.check_solved());
}

#[test]
fn exact_reveal_is_solved_and_hint_is_not() {
    let board = loaded_board(2, 2, 5);
    assert_eq!(board.cycle_solution_reveal(), RevealMode::Hint);
    assert!(!board.check_solved());
    assert_eq!(board.cycle_solution_reveal(), RevealMode::Exact);
    assert!(board.check_solved());
}

#[test]
fn rotate_selects_and_rotate_selected_needs_selection() {
    let board = loaded_board(2, 1, 8);
    let before = poses(&board);
    board.rotate_selected(5.0);
    assert_eq!(poses(&board), before);

    board.rotate(1, -5.0);
    assert_eq!(board.selected(), Some(1));
    assert!(board.handle_key("e"));
    assert!(board.handle_key("ArrowRight"));
    let after = board.pose(1).expect("pose");
    assert_eq!(after.rotation_deg, before[1].rotation_deg + 5.0);
    assert!(!board.handle_key("z"));
}

#[test]
fn begin_drag_selects_raises_and_replaces_session() {
    let board = loaded_board(3, 1, 21);
    board.begin_drag(0, (10.0, 10.0));
    board.begin_drag(1, (10.0, 10.0));
    let snapshot = board.snapshot();
    assert_eq!(snapshot.selected, Some(1));
    assert_eq!(snapshot.dragging, Some(1));
    assert_eq!(snapshot.z_order, vec![2, 0, 1]);

    let piece0 = board.pose(0).expect("pose");
    board.drag_move((30.0, 10.0));
    assert_eq!(board.pose(0), Some(piece0));
    board.end_drag();
    assert_eq!(board.snapshot().dragging, None);
}

#[test]
fn reset_restores_load_time_scramble() {
    let board = loaded_board(2, 2, 13);
    let initial = poses(&board);
    arrange(&board, (0.0, 0.0), &[0.0]);
    board.cycle_solution_reveal();
    board.reset_to_initial();
    assert_eq!(poses(&board), initial);
    assert_eq!(board.reveal_mode(), RevealMode::Hidden);
}

#[test]
fn keyboard_zoom_clamps_to_rule_range() {
    let board = loaded_board(1, 1, 2);
    assert!(board.handle_key("+"));
    assert_eq!(board.zoom_percent(), 110);
    for _ in 0..200 {
        board.handle_key("-");
    }
    assert_eq!(board.zoom_percent(), 10);
    for _ in 0..200 {
        board.handle_key("=");
    }
    assert_eq!(board.zoom_percent(), 1000);
}

#[test]
fn subscribers_fire_until_dropped() {
    let board = loaded_board(2, 1, 4);
    let calls = Rc::new(Cell::new(0));
    let counter = Rc::clone(&calls);
    let subscription = board.subscribe(Rc::new(move || counter.set(counter.get() + 1)));

    board.select(0);
    board.zoom(0.5, Some((100.0, 100.0)));
    board.zoom(0.0, None);
    assert_eq!(calls.get(), 2);

    drop(subscription);
    board.select(1);
    assert_eq!(calls.get(), 2);
}

#[test]
fn subscriber_can_read_board_during_notify() {
    let board = loaded_board(2, 1, 4);
    let seen = Rc::new(RefCell::new(Vec::new()));
    let observer = Rc::clone(&board);
    let log = Rc::clone(&seen);
    let _subscription = board.subscribe(Rc::new(move || {
        log.borrow_mut().push(observer.status_text());
    }));
    board.check_solved();
    assert_eq!(
        seen.borrow().as_slice(),
        ["Puzzle not solved yet. Keep trying!".to_string()]
    );
}

#[test]
fn scene_draws_pieces_in_z_order() {
    let board = loaded_board(2, 1, 6);
    board.begin_drag(0, (0.0, 0.0));
    board.end_drag();
    let mut scene = SvgScene::new(500.0, 400.0);
    let frame = render_to(&board.snapshot(), &mut scene);
    assert_eq!(frame.sprites.len(), 2);
    assert_eq!(frame.sprites[1].id, 0);
    assert!(frame.sprites[1].selected);

    let svg = scene.finish();
    let first = svg.find(r#"data-piece="1""#).expect("piece 2");
    let second = svg.find(r#"data-piece="0""#).expect("piece 1");
    assert!(first < second);
    assert!(svg.contains("<text>1</text>"));
}

proptest! {
    #[test]
    fn anchored_zoom_keeps_logical_point_fixed(
        steps in prop::collection::vec((-0.5f32..0.5, 0.0f32..800.0, 0.0f32..600.0), 1..12),
    ) {
        let board = loaded_board(1, 1, 1);
        for (delta, ax, ay) in steps {
            let before = board.view();
            let logical = before.to_logical((ax, ay));
            board.zoom(delta, Some((ax, ay)));
            let after = board.view();
            let (dx, dy) = after.to_display(logical);
            prop_assert!((dx - ax).abs() < 1.0e-2, "x drifted: {} vs {}", dx, ax);
            prop_assert!((dy - ay).abs() < 1.0e-2, "y drifted: {} vs {}", dy, ay);
            prop_assert!(after.zoom >= 0.1 - 1.0e-6 && after.zoom <= 10.0 + 1.0e-6);
        }
    }

    #[test]
    fn three_reveal_cycles_restore_every_pose(
        seed in any::<u64>(),
        moves in prop::collection::vec((0usize..6, -50.0f32..50.0, -720.0f32..720.0), 0..8),
    ) {
        let board = loaded_board(3, 2, seed);
        for (id, shift, turn) in moves {
            board.begin_drag(id, (0.0, 0.0));
            board.drag_move((shift, -shift));
            board.end_drag();
            board.rotate(id, turn);
        }
        let before = poses(&board);
        for _ in 0..3 {
            board.cycle_solution_reveal();
        }
        prop_assert_eq!(board.reveal_mode(), RevealMode::Hidden);
        prop_assert_eq!(poses(&board), before);
    }

    #[test]
    fn drag_distance_scales_inverse_to_zoom(
        zoom_index in 0usize..4,
        dx in -300.0f32..300.0,
        dy in -300.0f32..300.0,
    ) {
        let zoom = [0.2f32, 1.0, 5.0, 10.0][zoom_index];
        let board = loaded_board(2, 1, 17);
        board.zoom(zoom - 1.0, None);
        let z = board.view().zoom;
        prop_assert!((z - zoom).abs() < 1.0e-5);

        let start = board.pose(1).expect("pose").pos;
        board.begin_drag(1, (120.0, 80.0));
        board.drag_move((120.0 + dx, 80.0 + dy));
        let end = board.pose(1).expect("pose").pos;
        prop_assert!((end.0 - start.0 - dx / z).abs() < 1.0e-2);
        prop_assert!((end.1 - start.1 - dy / z).abs() < 1.0e-2);
    }
}
