//! The `-l`/`--label` symbol report: a banner, then one `NAME= $hex ;(dec)`
//! line per user-defined symbol, source order left to the caller (the
//! symbol table itself doesn't preserve definition order, so this module
//! takes an already-sorted/filtered iterator).

use crate::value::Value;

const BANNER_WIDTH: usize = 77;

pub fn report<'a>(symbols: impl Iterator<Item = (&'a str, Value)>) -> String {
    let mut out = String::new();
    out.push_str(&";".repeat(BANNER_WIDTH));
    out.push('\n');
    out.push_str(&format!(";;{:width$};;\n", "", width = BANNER_WIDTH - 4));
    out.push_str(&format!(";; {:<28}{:<44};;\n", "SYMBOL", "VALUE"));
    out.push_str(&format!(";;{:width$};;\n", "", width = BANNER_WIDTH - 4));
    out.push_str(&";".repeat(BANNER_WIDTH));
    out.push('\n');

    let mut entries: Vec<(&str, Value)> = symbols.filter(|(name, _)| *name != "CURRENT_PASS").collect();
    entries.sort_by(|a, b| a.0.cmp(b.0));
    for (name, value) in entries {
        out.push_str(&format!("{:<32}= ${:x} ;({})\n", name, value, value));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_lists_symbols_sorted_and_skips_current_pass() {
        let symbols = vec![("loop", 0x0800i64), ("CURRENT_PASS", 2), ("apple", 3)];
        let text = report(symbols.into_iter());
        let loop_pos = text.find("loop").unwrap();
        let apple_pos = text.find("apple").unwrap();
        assert!(apple_pos < loop_pos);
        assert!(!text.contains("CURRENT_PASS="));
        assert!(text.contains("$800"));
    }
}
