//! Board view-model for a generated jigsaw puzzle: loading, piece state,
//! view transform, reveal cycle and solve detection.

pub mod board;
pub mod error;
pub mod fetch;
pub mod input;
pub mod render;
pub mod reveal;
pub mod scene;
pub mod view;

pub use board::{BoardCore, BoardSnapshot, BoardStatus, BoardSubscriber, BoardSubscription, PieceSnapshot};
pub use error::{BoardError, ErrorKind};
pub use fetch::{AssetFetcher, DirFetcher, FetchError, MemoryFetcher};
pub use input::{action_for_key, BoardAction};
pub use render::{render_to, PieceSprite, PieceSurface, RenderFrame};
pub use reveal::{RevealMode, RevealState};
pub use scene::{PieceAsset, SvgScene};
pub use view::ViewTransform;
