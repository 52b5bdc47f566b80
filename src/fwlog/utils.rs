use chrono::NaiveDateTime;
use regex::Regex;

/// 按“前置边界 + 锚定模式”从左到右扫描参数串，提取 (键, 值) 对
///
/// `regex` 不支持后行断言，这里以逐字符扫描代替：对每个字符边界，
/// 若其前文满足 `boundary`，则在后缀上尝试 `^` 锚定的 `pattern`（捕获组 1 为键，
/// 2 为值）。匹配成功后从匹配末尾继续扫描，否则前进一个字符。
pub(crate) fn scan_pairs<'t, B>(
    text: &'t str,
    pattern: &Regex,
    boundary: B,
) -> Vec<(&'t str, &'t str)>
where
    B: Fn(&str) -> bool,
{
    let mut pairs = Vec::new();
    let mut pos = 0usize;

    while pos <= text.len() {
        if boundary(&text[..pos]) {
            if let Some(caps) = pattern.captures(&text[pos..]) {
                let key = caps.get(1).map_or("", |m| m.as_str());
                let value = caps.get(2).map_or("", |m| m.as_str());
                pairs.push((key, value));

                let consumed = caps.get(0).map_or(0, |m| m.end());
                if consumed > 0 {
                    pos += consumed;
                    continue;
                }
            }
        }

        match text[pos..].chars().next() {
            Some(c) => pos += c.len_utf8(),
            None => break,
        }
    }

    pairs
}

/// 将不含年份的信封时间（如 `Sep  9 11:56:41`）与默认年份组合并规范化
///
/// 返回 `(紧凑时间戳 %Y%m%d%H%M%S, 日期时间 %Y-%m-%d %H:%M:%S)`；
/// 不构成合法日历日期时返回 `None`。
pub(crate) fn normalize_timestamp(
    base: &str,
    fallback_year: i32,
) -> Option<(String, String)> {
    let compact = base.split_whitespace().collect::<Vec<_>>().join(" ");
    let dt = NaiveDateTime::parse_from_str(
        &format!("{fallback_year} {compact}"),
        "%Y %b %d %H:%M:%S",
    )
    .ok()?;

    Some((
        dt.format("%Y%m%d%H%M%S").to_string(),
        dt.format("%Y-%m-%d %H:%M:%S").to_string(),
    ))
}

/// 去除行尾的 `\n` / `\r\n`
pub fn strip_line_ending(line: &str) -> &str {
    let line = line.strip_suffix('\n').unwrap_or(line);
    line.strip_suffix('\r').unwrap_or(line)
}
