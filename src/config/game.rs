//! ゲーム進行まわりの定数だよ。履歴の長さ、保存の有効期限、ドラッグのタイミングなど。

/// 履歴に残すスナップショットの最大数。
pub const MAX_HISTORY: usize = 50;
/// localStorage に保存する履歴の数 (最新から)。
pub const PERSISTED_HISTORY: usize = 10;
/// 保存したゲームの有効期限 (24 時間)。
pub const SAVE_EXPIRY_MS: f64 = 24.0 * 60.0 * 60.0 * 1000.0;

// --- localStorage のキー ---
pub const SETTINGS_KEY: &str = "klondike-settings";
pub const STATS_KEY: &str = "klondike-stats";
pub const GAME_STATE_KEY: &str = "klondike-game-state";

// --- ドラッグ & ドロップ ---
pub const SNAP_BACK_DURATION_MS: u32 = 300;
/// ドロップ先の当たり判定は 60fps 程度に間引く。
pub const HIT_TEST_INTERVAL_MS: f64 = 16.0;

// --- アニメーション ---
pub const DEFAULT_ANIMATION_DURATION_MS: u32 = 300;
/// これより短い移動は「動いていない」扱い。
pub const MIN_ANIMATION_DISTANCE_PX: f64 = 1.0;

// --- スコア ---
pub const FOUNDATION_MOVE_POINTS: i32 = 10;
pub const WASTE_TO_TABLEAU_POINTS: i32 = 5;

/// 自動移動を一回の手の後に連続で行う上限 (52 枚を超えることはない)。
pub const AUTO_MOVE_SWEEP_LIMIT: usize = 52;
