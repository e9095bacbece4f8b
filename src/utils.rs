// SPDX-License-Identifier: MPL-2.0

//! Small parsing helpers shared by the CLI and configuration

/// Parse a size string in format "WIDTHxHEIGHT"
///
/// Zero on either axis is rejected since no layout can be built from it.
pub fn parse_size(size_str: &str) -> Option<(u32, u32)> {
    let (w, h) = size_str.trim().split_once(['x', 'X'])?;
    let width = w.trim().parse::<u32>().ok()?;
    let height = h.trim().parse::<u32>().ok()?;
    if width == 0 || height == 0 {
        return None;
    }
    Some((width, height))
}

/// Parse a size for use as a clap value parser
pub fn size_arg(size_str: &str) -> Result<(u32, u32), String> {
    parse_size(size_str).ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{}'", size_str))
}
