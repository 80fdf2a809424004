//! 画面レイアウトと DOM 位置検出に関する定数を定義するよ！
//! カードの大きさは CSS 変数が決めるので、ここにあるのは「測れなかった時」の値とリトライの設定。

// --- 何も測れなかった時の固定位置 ---
pub const FALLBACK_X: f64 = 100.0;
pub const FALLBACK_Y: f64 = 100.0;
pub const FALLBACK_WIDTH: f64 = 52.0; // カードの最小幅くらい
pub const FALLBACK_HEIGHT: f64 = 72.0;

// --- カードの大きさを決めるグローバル CSS 変数 ---
pub const CARD_WIDTH_VAR: &str = "--card-width";
pub const CARD_HEIGHT_VAR: &str = "--card-height";

// --- 位置検出のリトライ設定 ---
pub const MAX_POSITION_ATTEMPTS: u32 = 10;
/// 試行の間の待ち時間。試行回数に比例して伸ばす。
pub const RETRY_BASE_DELAY_MS: u32 = 10;

pub const ATTACH_POLL_LIMIT: u32 = 5;
pub const ATTACH_POLL_DELAY_MS: u32 = 16;

pub const CSS_VAR_POLL_LIMIT: u32 = 10;
pub const CSS_VAR_POLL_DELAY_MS: u32 = 16;

pub const STABILITY_POLL_LIMIT: u32 = 6;
pub const STABILITY_POLL_DELAY_MS: u32 = 16;
/// 連続で同じ矩形が読めたら「安定した」とみなす回数。
pub const STABLE_READS_REQUIRED: u32 = 2;

/// 矩形が 0 の時に強制リフローする回数。
pub const FORCED_REFLOW_PASSES: u32 = 3;

/// 位置がビューポートの何倍まで外れていたら「おかしい」とみなすか。かなり甘め。
pub const VIEWPORT_BOUND_FACTOR: f64 = 3.0;

// --- アニメーション用オーバーレイ ---
pub const OVERLAY_Z_INDEX: &str = "10000";
