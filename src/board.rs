use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use pazuru_core::game::{is_solved, scramble_rotation};
use pazuru_core::manifest::decode_manifest;
use pazuru_core::{BoardRules, PiecePose, MANIFEST_FILE_NAME};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, warn};

use crate::error::BoardError;
use crate::fetch::AssetFetcher;
use crate::input::{action_for_key, BoardAction};
use crate::reveal::{RevealMode, RevealState};
use crate::scene::PieceAsset;
use crate::view::ViewTransform;

pub type BoardSubscriber = Rc<dyn Fn()>;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum BoardStatus {
    #[default]
    Empty,
    Loaded(usize),
    LoadFailed(String),
    Solved,
    NotSolved,
    SolutionHint,
    SolutionShown,
    SolutionHidden,
}

impl fmt::Display for BoardStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoardStatus::Empty => f.write_str("No pieces loaded"),
            BoardStatus::Loaded(count) => write!(f, "Puzzle loaded! {count} pieces"),
            BoardStatus::LoadFailed(message) => write!(f, "Error: {message}"),
            BoardStatus::Solved => f.write_str("🎉 Puzzle Solved!"),
            BoardStatus::NotSolved => f.write_str("Puzzle not solved yet. Keep trying!"),
            BoardStatus::SolutionHint => f.write_str("Solution hint - pieces spread out"),
            BoardStatus::SolutionShown => f.write_str("Solution shown - puzzle solved!"),
            BoardStatus::SolutionHidden => f.write_str("Solution hidden - continue playing!"),
        }
    }
}

#[derive(Debug, Clone)]
struct Piece {
    file: String,
    target: (f32, f32),
    asset: Rc<PieceAsset>,
}

#[derive(Debug, Clone, Copy)]
struct DragSession {
    piece: usize,
    pointer_start: (f32, f32),
    origin: (f32, f32),
}

#[derive(Debug, Default)]
struct BoardState {
    pieces: Vec<Piece>,
    poses: Vec<PiecePose>,
    initial: Vec<PiecePose>,
    z_order: Vec<usize>,
    selected: Option<usize>,
    drag: Option<DragSession>,
    view: ViewTransform,
    reveal: RevealState,
    status: BoardStatus,
}

impl BoardState {
    fn targets(&self) -> Vec<(f32, f32)> {
        self.pieces.iter().map(|piece| piece.target).collect()
    }

    fn solved(&self, rules: &BoardRules) -> bool {
        let positions: Vec<(f32, f32)> = self.poses.iter().map(|pose| pose.pos).collect();
        let rotations: Vec<f32> = self.poses.iter().map(|pose| pose.rotation_deg).collect();
        is_solved(
            &positions,
            &rotations,
            &self.targets(),
            rules.solve_reference_index,
            rules.solve_tolerance_px,
        )
    }
}

/// Read-only copy of one piece for rendering and inspection.
#[derive(Debug, Clone)]
pub struct PieceSnapshot {
    pub file: String,
    pub target: (f32, f32),
    pub pose: PiecePose,
    pub asset: Rc<PieceAsset>,
}

#[derive(Debug, Clone)]
pub struct BoardSnapshot {
    pub pieces: Vec<PieceSnapshot>,
    pub z_order: Vec<usize>,
    pub selected: Option<usize>,
    pub dragging: Option<usize>,
    pub view: ViewTransform,
    pub reveal: RevealMode,
    pub status: BoardStatus,
}

/// Single-threaded board view-model. Every operation borrows the state,
/// mutates it, releases it and then notifies subscribers.
pub struct BoardCore {
    rules: BoardRules,
    state: RefCell<BoardState>,
    rng: RefCell<StdRng>,
    subscribers: Rc<RefCell<Vec<BoardSubscriber>>>,
}

impl BoardCore {
    pub fn new(rules: BoardRules) -> Rc<Self> {
        Self::with_rng(rules, StdRng::from_os_rng())
    }

    pub fn with_seed(rules: BoardRules, seed: u64) -> Rc<Self> {
        Self::with_rng(rules, StdRng::seed_from_u64(seed))
    }

    pub fn with_rng(rules: BoardRules, rng: StdRng) -> Rc<Self> {
        Rc::new(Self {
            rules,
            state: RefCell::new(BoardState::default()),
            rng: RefCell::new(rng),
            subscribers: Rc::new(RefCell::new(Vec::new())),
        })
    }

    pub fn subscribe(&self, subscriber: BoardSubscriber) -> BoardSubscription {
        self.subscribers.borrow_mut().push(subscriber.clone());
        BoardSubscription {
            subscriber,
            subscribers: Rc::clone(&self.subscribers),
        }
    }

    fn notify(&self) {
        let subscribers = self.subscribers.borrow().clone();
        for subscriber in subscribers {
            (subscriber)();
        }
    }

    /// Fetches the manifest and then every piece asset, one at a time and
    /// in manifest order. Nothing is committed unless every fetch succeeds.
    pub async fn load<F: AssetFetcher>(&self, fetcher: &F) -> Result<usize, BoardError> {
        match fetch_pieces(fetcher).await {
            Ok(pieces) => {
                let count = pieces.len();
                self.commit(pieces);
                info!(pieces = count, "puzzle loaded");
                Ok(count)
            }
            Err(err) => {
                warn!(file = err.file(), error = %err, "puzzle load aborted");
                let mut state = self.state.borrow_mut();
                state.status = BoardStatus::LoadFailed(err.to_string());
                drop(state);
                self.notify();
                Err(err)
            }
        }
    }

    fn commit(&self, pieces: Vec<Piece>) {
        let poses = {
            let mut rng = self.rng.borrow_mut();
            scramble(&self.rules, &mut rng, pieces.len())
        };
        let mut state = self.state.borrow_mut();
        let count = pieces.len();
        state.pieces = pieces;
        state.initial = poses.clone();
        state.poses = poses;
        state.z_order = (0..count).collect();
        state.selected = None;
        state.drag = None;
        state.reveal.reset();
        state.status = BoardStatus::Loaded(count);
        drop(state);
        self.notify();
    }

    pub fn select(&self, piece_id: usize) {
        let mut state = self.state.borrow_mut();
        if piece_id >= state.pieces.len() || state.selected == Some(piece_id) {
            return;
        }
        state.selected = Some(piece_id);
        drop(state);
        self.notify();
    }

    /// Starts dragging `piece_id` from display-space `pointer`. Replaces
    /// any session already in progress.
    pub fn begin_drag(&self, piece_id: usize, pointer: (f32, f32)) {
        let mut state = self.state.borrow_mut();
        let Some(pose) = state.poses.get(piece_id).copied() else {
            return;
        };
        if let Some(previous) = state.drag.take() {
            debug!(piece = previous.piece, "drag superseded");
        }
        state.selected = Some(piece_id);
        state.drag = Some(DragSession {
            piece: piece_id,
            pointer_start: pointer,
            origin: pose.pos,
        });
        bring_to_front(&mut state.z_order, piece_id);
        drop(state);
        self.notify();
    }

    pub fn drag_move(&self, pointer: (f32, f32)) {
        let mut state = self.state.borrow_mut();
        let Some(drag) = state.drag.take() else {
            return;
        };
        let (dx, dy) = state.view.drag_delta(
            pointer.0 - drag.pointer_start.0,
            pointer.1 - drag.pointer_start.1,
        );
        if let Some(pose) = state.poses.get_mut(drag.piece) {
            pose.pos = (drag.origin.0 + dx, drag.origin.1 + dy);
        }
        state.drag = Some(drag);
        drop(state);
        self.notify();
    }

    pub fn end_drag(&self) {
        let mut state = self.state.borrow_mut();
        if state.drag.take().is_none() {
            return;
        }
        drop(state);
        self.notify();
    }

    /// Rotates `piece_id` by `delta_deg` and selects it.
    pub fn rotate(&self, piece_id: usize, delta_deg: f32) {
        let mut state = self.state.borrow_mut();
        let Some(pose) = state.poses.get_mut(piece_id) else {
            return;
        };
        pose.rotation_deg += delta_deg;
        state.selected = Some(piece_id);
        drop(state);
        self.notify();
    }

    pub fn rotate_selected(&self, delta_deg: f32) {
        let selected = self.state.borrow().selected;
        if let Some(piece_id) = selected {
            self.rotate(piece_id, delta_deg);
        }
    }

    /// Adds `delta` to the zoom, clamped to the rule range. With an anchor
    /// the logical point under it stays put.
    pub fn zoom(&self, delta: f32, anchor: Option<(f32, f32)>) {
        let mut state = self.state.borrow_mut();
        let new_zoom = self.rules.clamp_zoom(state.view.zoom + delta);
        if !state.view.zoom_about(new_zoom, anchor) {
            return;
        }
        drop(state);
        self.notify();
    }

    /// Hidden -> Hint -> Exact -> Hidden. Returns the mode entered.
    pub fn cycle_solution_reveal(&self) -> RevealMode {
        let mut state = self.state.borrow_mut();
        if state.pieces.is_empty() {
            return state.reveal.mode();
        }
        let targets = state.targets();
        let BoardState { poses, reveal, .. } = &mut *state;
        reveal.advance(poses, &targets, self.rules.hint_spread);
        let mode = reveal.mode();
        state.drag = None;
        state.status = match mode {
            RevealMode::Hint => BoardStatus::SolutionHint,
            RevealMode::Exact => BoardStatus::SolutionShown,
            RevealMode::Hidden => BoardStatus::SolutionHidden,
        };
        drop(state);
        info!(mode = mode.label(), "solution reveal");
        self.notify();
        mode
    }

    /// Translation-invariant solve check; updates the status line.
    pub fn check_solved(&self) -> bool {
        let mut state = self.state.borrow_mut();
        let solved = !state.pieces.is_empty() && state.solved(&self.rules);
        state.status = if state.pieces.is_empty() {
            BoardStatus::Empty
        } else if solved {
            BoardStatus::Solved
        } else {
            BoardStatus::NotSolved
        };
        drop(state);
        info!(solved, "solution checked");
        self.notify();
        solved
    }

    /// Restores the scrambled poses captured at load time.
    pub fn reset_to_initial(&self) {
        let mut state = self.state.borrow_mut();
        if state.pieces.is_empty() {
            return;
        }
        state.poses = state.initial.clone();
        state.reveal.reset();
        state.drag = None;
        state.status = BoardStatus::Loaded(state.pieces.len());
        drop(state);
        self.notify();
    }

    pub fn apply_action(&self, action: BoardAction) {
        match action {
            BoardAction::Select { piece_id } => self.select(piece_id),
            BoardAction::BeginDrag { piece_id, x, y } => self.begin_drag(piece_id, (x, y)),
            BoardAction::DragMove { x, y } => self.drag_move((x, y)),
            BoardAction::DragEnd => self.end_drag(),
            BoardAction::Rotate {
                piece_id,
                delta_deg,
            } => self.rotate(piece_id, delta_deg),
            BoardAction::RotateSelected { delta_deg } => self.rotate_selected(delta_deg),
            BoardAction::Zoom { delta, anchor } => self.zoom(delta, anchor),
            BoardAction::CycleReveal => {
                self.cycle_solution_reveal();
            }
            BoardAction::CheckSolved => {
                self.check_solved();
            }
            BoardAction::Reset => self.reset_to_initial(),
        }
    }

    /// Dispatches a keyboard shortcut. Returns false for unbound keys.
    pub fn handle_key(&self, key: &str) -> bool {
        match action_for_key(key, &self.rules) {
            Some(action) => {
                self.apply_action(action);
                true
            }
            None => false,
        }
    }

    pub fn piece_count(&self) -> usize {
        self.state.borrow().pieces.len()
    }

    pub fn pose(&self, piece_id: usize) -> Option<PiecePose> {
        self.state.borrow().poses.get(piece_id).copied()
    }

    pub fn selected(&self) -> Option<usize> {
        self.state.borrow().selected
    }

    pub fn view(&self) -> ViewTransform {
        self.state.borrow().view
    }

    pub fn reveal_mode(&self) -> RevealMode {
        self.state.borrow().reveal.mode()
    }

    pub fn status(&self) -> BoardStatus {
        self.state.borrow().status.clone()
    }

    pub fn status_text(&self) -> String {
        self.state.borrow().status.to_string()
    }

    pub fn zoom_percent(&self) -> u32 {
        (self.state.borrow().view.zoom * 100.0).round() as u32
    }

    pub fn snapshot(&self) -> BoardSnapshot {
        let state = self.state.borrow();
        BoardSnapshot {
            pieces: state
                .pieces
                .iter()
                .zip(&state.poses)
                .map(|(piece, pose)| PieceSnapshot {
                    file: piece.file.clone(),
                    target: piece.target,
                    pose: *pose,
                    asset: Rc::clone(&piece.asset),
                })
                .collect(),
            z_order: state.z_order.clone(),
            selected: state.selected,
            dragging: state.drag.map(|drag| drag.piece),
            view: state.view,
            reveal: state.reveal.mode(),
            status: state.status.clone(),
        }
    }
}

pub struct BoardSubscription {
    subscriber: BoardSubscriber,
    subscribers: Rc<RefCell<Vec<BoardSubscriber>>>,
}

impl Drop for BoardSubscription {
    fn drop(&mut self) {
        let mut subscribers = self.subscribers.borrow_mut();
        subscribers.retain(|item| !Rc::ptr_eq(item, &self.subscriber));
    }
}

async fn fetch_pieces<F: AssetFetcher>(fetcher: &F) -> Result<Vec<Piece>, BoardError> {
    let text = fetcher
        .fetch(MANIFEST_FILE_NAME)
        .await
        .map_err(|source| BoardError::asset(MANIFEST_FILE_NAME, source))?;
    let entries = decode_manifest(&text).map_err(|err| BoardError::Manifest {
        file: MANIFEST_FILE_NAME.to_string(),
        reason: err.to_string(),
    })?;
    if entries.is_empty() {
        return Err(BoardError::Manifest {
            file: MANIFEST_FILE_NAME.to_string(),
            reason: "no pieces listed".to_string(),
        });
    }
    let mut pieces = Vec::with_capacity(entries.len());
    for (index, entry) in entries.iter().enumerate() {
        let content = fetcher
            .fetch(&entry.file)
            .await
            .map_err(|source| BoardError::asset(&entry.file, source))?;
        let asset = PieceAsset::new(&content).map_err(|reason| BoardError::InvalidAsset {
            file: entry.file.clone(),
            reason,
        })?;
        debug!(
            piece = index + 1,
            total = entries.len(),
            file = %entry.file,
            bytes = content.len(),
            "loaded piece asset"
        );
        pieces.push(Piece {
            file: entry.file.clone(),
            target: entry.target(),
            asset: Rc::new(asset),
        });
    }
    Ok(pieces)
}

fn scramble(rules: &BoardRules, rng: &mut StdRng, count: usize) -> Vec<PiecePose> {
    let steps = rules.scramble_rotation_steps.max(1);
    (0..count)
        .map(|_| {
            let pos = rules
                .placement
                .point_at(rng.random::<f32>(), rng.random::<f32>());
            let step = rng.random_range(0..steps);
            PiecePose {
                pos,
                rotation_deg: scramble_rotation(step, rules.scramble_rotation_step_deg),
            }
        })
        .collect()
}

fn bring_to_front(order: &mut Vec<usize>, piece_id: usize) {
    if let Some(index) = order.iter().position(|&id| id == piece_id) {
        order.remove(index);
    }
    order.push(piece_id);
}

#[cfg(test)]
mod tests {
    use super::*;
    use pazuru_core::game::is_upright;

    #[test]
    fn scramble_stays_in_region_and_never_upright() {
        let rules = BoardRules::default();
        let mut rng = StdRng::seed_from_u64(7);
        for pose in scramble(&rules, &mut rng, 200) {
            assert!((50.0..=450.0).contains(&pose.pos.0));
            assert!((50.0..=350.0).contains(&pose.pos.1));
            assert_eq!(pose.pos.0.fract(), 0.0);
            assert!(!is_upright(pose.rotation_deg));
            assert!((5.0..=40.0).contains(&pose.rotation_deg));
        }
    }

    #[test]
    fn bring_to_front_moves_piece_last() {
        let mut order = vec![0, 1, 2, 3];
        bring_to_front(&mut order, 1);
        assert_eq!(order, vec![0, 2, 3, 1]);
        bring_to_front(&mut order, 1);
        assert_eq!(order, vec![0, 2, 3, 1]);
    }

    #[test]
    fn status_text_matches_board_messages() {
        assert_eq!(BoardStatus::Loaded(6).to_string(), "Puzzle loaded! 6 pieces");
        assert_eq!(BoardStatus::Empty.to_string(), "No pieces loaded");
        assert_eq!(
            BoardStatus::LoadFailed("Failed to load piece2.svg: 404".to_string()).to_string(),
            "Error: Failed to load piece2.svg: 404"
        );
    }

    #[test]
    fn empty_board_operations_are_noops() {
        let board = BoardCore::with_seed(BoardRules::default(), 1);
        board.select(0);
        board.rotate(0, 5.0);
        board.begin_drag(0, (1.0, 1.0));
        board.drag_move((5.0, 5.0));
        assert_eq!(board.selected(), None);
        assert_eq!(board.cycle_solution_reveal(), RevealMode::Hidden);
        assert!(!board.check_solved());
        assert_eq!(board.status_text(), "No pieces loaded");
        assert_eq!(board.zoom_percent(), 100);
    }
}
