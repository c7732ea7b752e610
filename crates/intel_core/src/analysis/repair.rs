//! モデル出力テキストの整形・JSON候補の切り出し・括弧の補完
//!
//! 文字列リテラルとエスケープを追跡するので、`"{test}"` のような値の中の括弧は数えない。
//! 構文解析器ではない: 途中で切れた出力を閉じるだけで、壊れた構文そのものは直さない。

/// 文字列リテラルの内外を追う走査状態
#[derive(Debug, Default)]
struct Scanner {
    in_string: bool,
    escaped: bool,
}

impl Scanner {
    /// 文字列の外にある文字だけ返す（引用符自体も返さない）
    fn feed(&mut self, c: char) -> Option<char> {
        if self.in_string {
            if self.escaped {
                self.escaped = false;
            } else if c == '\\' {
                self.escaped = true;
            } else if c == '"' {
                self.in_string = false;
            }
            return None;
        }
        if c == '"' {
            self.in_string = true;
            return None;
        }
        Some(c)
    }
}

/// ```` ```json ```` と ```` ``` ```` のマーカーを取り除く
pub fn strip_code_fences(text: &str) -> String {
    text.replace("```json", "").replace("```", "")
}

/// 制御文字 (0x00–0x1F, 0x7F–0x9F) を取り除く
pub fn strip_control_chars(text: &str) -> String {
    text.chars()
        .filter(|c| !matches!(c, '\u{00}'..='\u{1f}' | '\u{7f}'..='\u{9f}'))
        .collect()
}

/// フェンスと制御文字を除去し、前後の空白を落とす
pub fn clean_completion(raw: &str) -> String {
    let unfenced = strip_code_fences(raw.trim());
    strip_control_chars(&unfenced).trim().to_string()
}

/// 最初の `{` から、深さが0に戻る `}` までを切り出す。
///
/// 対応する `}` が無ければ `{` から末尾までを返す。`{` が無ければ `None`。
pub fn extract_candidate(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut scanner = Scanner::default();
    let mut depth = 0usize;

    for (offset, c) in text[start..].char_indices() {
        match scanner.feed(c) {
            Some('{') => depth += 1,
            Some('}') => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }
    Some(&text[start..])
}

/// 閉じられていない文字列・配列・オブジェクトを、入れ子の逆順に閉じる。
///
/// 釣り合っている入力はそのまま返す。
pub fn close_unbalanced(candidate: &str) -> String {
    let mut scanner = Scanner::default();
    let mut pending: Vec<char> = Vec::new();

    for c in candidate.chars() {
        match scanner.feed(c) {
            Some('{') => pending.push('}'),
            Some('[') => pending.push(']'),
            Some(closer @ ('}' | ']')) => {
                if pending.last() == Some(&closer) {
                    pending.pop();
                }
            }
            _ => {}
        }
    }

    if pending.is_empty() && !scanner.in_string {
        return candidate.to_string();
    }

    let mut repaired = candidate.to_string();
    if scanner.in_string {
        // 切れた位置にある単独のバックスラッシュは閉じ引用符を無効にしてしまう
        if scanner.escaped {
            repaired.pop();
        }
        repaired.push('"');
    } else {
        let keep = {
            let tail = repaired.trim_end();
            tail.strip_suffix(',').unwrap_or(tail).len()
        };
        repaired.truncate(keep);
    }

    while let Some(closer) = pending.pop() {
        repaired.push(closer);
    }
    repaired
}
