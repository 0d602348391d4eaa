use clap::{Parser, Subcommand};
use shopper_match_common::ZeroScorePolicy;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "shopper-match")]
#[command(about = "Find similar products for a clothing image", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// 上流サービスのURL（設定ファイル・環境変数より優先）
    #[arg(long, global = true)]
    pub endpoint: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 画像1枚で類似商品を検索
    Match {
        /// 画像ファイルのパス
        #[arg(required = true)]
        image: PathBuf,

        /// 結果JSONの出力先
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// スコア0の扱い (fallback/keep)
        #[arg(long)]
        zero_score: Option<ZeroScorePolicy>,
    },

    /// フォルダ内の画像をまとめて検索
    Batch {
        /// 画像フォルダのパス
        #[arg(required = true)]
        folder: PathBuf,

        /// レポートJSONの出力先（デフォルト: 入力フォルダ/matches.json）
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// サブフォルダも再帰的にスキャン
        #[arg(short = 'r', long)]
        recursive: bool,

        /// スコア0の扱い (fallback/keep)
        #[arg(long)]
        zero_score: Option<ZeroScorePolicy>,
    },

    /// 上流サービスの状態を確認
    Health,

    /// 設定を表示/編集
    Config {
        /// エンドポイントを設定
        #[arg(long)]
        set_endpoint: Option<String>,

        /// スコア0の扱いを設定 (fallback/keep)
        #[arg(long)]
        set_zero_score: Option<ZeroScorePolicy>,

        /// 設定を表示
        #[arg(long)]
        show: bool,
    },
}
