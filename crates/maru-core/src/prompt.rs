//! 対話的な確認プロンプト

use crate::error::{ConfigError, Result};
use colored::Colorize;
use std::io::{BufRead, IsTerminal, Write};
use tracing::warn;

/// yes/no の確認を行う
pub trait Confirmer {
    /// 質問を表示して回答を得る。入力が空なら `default` を返す。
    fn ask(&self, question: &str, default: bool) -> Result<bool>;
}

/// 常に同じ回答を返す（`--assume` やテスト用）
#[derive(Debug, Clone, Copy)]
pub struct FixedConfirmer {
    answer: bool,
}

impl FixedConfirmer {
    pub fn new(answer: bool) -> Self {
        Self { answer }
    }

    pub fn yes() -> Self {
        Self::new(true)
    }

    pub fn no() -> Self {
        Self::new(false)
    }
}

impl Confirmer for FixedConfirmer {
    fn ask(&self, question: &str, _default: bool) -> Result<bool> {
        tracing::debug!(question, answer = self.answer, "Answered prompt non-interactively");
        Ok(self.answer)
    }
}

/// 標準入力から回答を読む
///
/// 標準入力が端末でない場合や EOF の場合は質問ごとの既定値を返す。
#[derive(Debug, Default)]
pub struct TerminalConfirmer;

impl TerminalConfirmer {
    pub fn new() -> Self {
        Self
    }
}

impl Confirmer for TerminalConfirmer {
    fn ask(&self, question: &str, default: bool) -> Result<bool> {
        let stdin = std::io::stdin();
        if !stdin.is_terminal() {
            warn!(question, default, "stdin is not a terminal, using the default answer");
            return Ok(default);
        }

        let hint = if default { "[Y/n]" } else { "[y/N]" };
        let mut stdout = std::io::stdout();
        loop {
            print!("{} {} ", question.bold(), hint.dimmed());
            stdout.flush().map_err(ConfigError::Prompt)?;

            let mut input = String::new();
            let read = stdin
                .lock()
                .read_line(&mut input)
                .map_err(ConfigError::Prompt)?;
            if read == 0 {
                println!();
                return Ok(default);
            }

            match parse_answer(&input, default) {
                Some(answer) => return Ok(answer),
                None => println!("{}", "Please answer y or n.".yellow()),
            }
        }
    }
}

/// 入力文字列を回答として解釈する（解釈できなければ `None`）
pub fn parse_answer(input: &str, default: bool) -> Option<bool> {
    match input.trim().to_ascii_lowercase().as_str() {
        "" => Some(default),
        "y" | "yes" => Some(true),
        "n" | "no" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_answer() {
        assert_eq!(parse_answer("\n", true), Some(true));
        assert_eq!(parse_answer("", false), Some(false));
        assert_eq!(parse_answer("y\n", false), Some(true));
        assert_eq!(parse_answer("  YES ", false), Some(true));
        assert_eq!(parse_answer("n", true), Some(false));
        assert_eq!(parse_answer("No\n", true), Some(false));
        assert_eq!(parse_answer("maybe", true), None);
    }

    #[test]
    fn test_fixed_confirmer_ignores_default() {
        assert!(FixedConfirmer::yes().ask("continue?", false).unwrap());
        assert!(!FixedConfirmer::no().ask("continue?", true).unwrap());
    }
}
