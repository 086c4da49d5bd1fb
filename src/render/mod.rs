pub mod report;
pub mod table;

// ---------------------------------------------------------------------------
// ReST primitives
// ---------------------------------------------------------------------------

/// Decoration cell used for table borders; matches the 7-wide columns.
pub(crate) const FMT_DECO: &str = "=======";

const TITLE_DECOS: [char; 4] = ['=', '=', '-', '~'];

/// Return a ReST title block for nesting levels 0 to 3.
///
/// Level 0 adds a top decoration line; every level underlines the title
/// with a decoration matching its character length. Levels outside 0..=3
/// are a caller contract violation and panic.
pub fn rst_title(title: &str, level: usize) -> String {
    let deco: String = std::iter::repeat(TITLE_DECOS[level])
        .take(title.chars().count())
        .collect();
    let mut rst = Vec::new();
    if level == 0 {
        rst.push(deco.clone());
    } else {
        rst.push(String::new());
    }
    rst.push(title.to_string());
    rst.push(deco);
    rst.push(String::new());
    rst.join("\n")
}

// ---------------------------------------------------------------------------
// Fixed-width number formatting
// ---------------------------------------------------------------------------

pub(crate) fn fmt_int(value: u64) -> String {
    format!("{value:7}")
}

pub(crate) fn fmt_float(value: f64) -> String {
    format!("{value:7.3}")
}

pub(crate) fn fmt_percent(value: f64) -> String {
    format!("{value:6.2}%")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
