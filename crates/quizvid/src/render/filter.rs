//! Escaping and formatting helpers for FFmpeg filter graphs.

/// Escape a value for use as a filter option (`key=value`).
///
/// FFmpeg parses a filter graph in two passes: the graph parser splits on
/// `[ ] , ;` and the filter parser splits options on `:`. Values need one
/// level of escaping per pass.
#[must_use]
pub fn escape_filter_value(value: &str) -> String {
    escape_graph(&escape_option(value))
}

fn escape_option(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '\\' | '\'' | ':') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

fn escape_graph(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '\\' | '\'' | '[' | ']' | ',' | ';') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// `#rrggbb` to FFmpeg's `0xrrggbb`
#[must_use]
pub fn ffmpeg_color(hex: &str) -> String {
    hex.strip_prefix('#')
        .map_or_else(|| hex.to_string(), |rgb| format!("0x{rgb}"))
}

/// Seconds with millisecond precision, as FFmpeg expects in options
#[must_use]
pub fn secs(value: f64) -> String {
    format!("{value:.3}")
}

/// `enable` expression active for `[start, end)` of the segment's own clock
#[must_use]
pub fn enable_between(start: f64, end: f64) -> String {
    format!("'between(t,{},{})'", secs(start), secs(end))
}
