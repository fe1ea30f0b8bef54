/// Series colours, assigned in input order and reused cyclically.
pub const PALETTE: [&str; 9] = [
    "#009EFF", "#FF5733", "#6A00FF", "#00C853", "#FFC400", "#E91E63", "#9C27B0", "#3F51B5",
    "#FF9800",
];

/// Colour of the series at position `index`.
pub fn color_for(index: usize) -> &'static str {
    PALETTE[index % PALETTE.len()]
}

/// Parses a `#RRGGBB` palette entry into its channels.
pub fn rgb(color: &str) -> Option<(u8, u8, u8)> {
    let hex = color.strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }
    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(hex.get(range)?, 16).ok();
    Some((channel(0..2)?, channel(2..4)?, channel(4..6)?))
}
