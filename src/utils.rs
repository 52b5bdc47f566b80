//! 通用工具函数

use std::time::Duration;

/// 将耗时格式化为便于阅读的字符串
///
/// 依次为 `1h 2m 3s`、`2m 3s`、`3s`、`250ms`、`<1ms`，秒以下取整舍去。
pub fn format_wall_time(elapsed: Duration) -> String {
    let total_secs = elapsed.as_secs();
    let (hours, rest) = (total_secs / 3600, total_secs % 3600);
    let (minutes, seconds) = (rest / 60, rest % 60);

    if hours > 0 {
        format!("{hours}h {minutes}m {seconds}s")
    } else if minutes > 0 {
        format!("{minutes}m {seconds}s")
    } else if seconds >= 1 {
        format!("{seconds}s")
    } else {
        let ms = (elapsed.as_secs_f64() * 1000.0).round() as u64;
        if elapsed.as_secs_f64() * 1000.0 >= 1.0 {
            format!("{ms}ms")
        } else {
            "<1ms".to_string()
        }
    }
}
