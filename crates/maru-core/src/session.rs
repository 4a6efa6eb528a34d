//! 実行コンテキスト
//!
//! プロンプトとユーザー向け出力をまとめ、各コンポーネントに明示的に渡します。

use crate::prompt::Confirmer;
use colored::Colorize;

/// ユーザー向けメッセージの出力先
pub trait Reporter {
    /// 付随情報（ビルド対象など）
    fn info(&self, message: &str);
    /// 処理ステップの開始
    fn step(&self, message: &str);
    fn success(&self, message: &str);
    fn warn(&self, message: &str);
}

/// 色付きで標準出力に表示する
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleReporter;

impl Reporter for ConsoleReporter {
    fn info(&self, message: &str) {
        println!("{} {}", "ℹ".blue(), message);
    }

    fn step(&self, message: &str) {
        println!("{} {}", "→".cyan(), message);
    }

    fn success(&self, message: &str) {
        println!("{} {}", "✓".green().bold(), message.green());
    }

    fn warn(&self, message: &str) {
        eprintln!("{} {}", "⚠".yellow(), message.yellow());
    }
}

/// 1回の実行で共有するプロンプトと出力
pub struct Session<'a> {
    pub confirmer: &'a dyn Confirmer,
    pub reporter: &'a dyn Reporter,
}

impl<'a> Session<'a> {
    pub fn new(confirmer: &'a dyn Confirmer, reporter: &'a dyn Reporter) -> Self {
        Self {
            confirmer,
            reporter,
        }
    }
}
