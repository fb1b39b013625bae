use crate::Statement;

/// Writes each value through `f`, with `separator` between consecutive ones.
pub fn separated_by<T, F>(
    out: &mut Statement,
    values: impl IntoIterator<Item = T>,
    mut f: F,
    separator: &str,
) where
    F: FnMut(&mut Statement, T),
{
    for (i, v) in values.into_iter().enumerate() {
        if i > 0 {
            out.sql.push_str(separator);
        }
        f(out, v);
    }
}

/// Longest prefix of `value` that fits in `max` bytes without splitting a character.
pub fn truncated(value: &str, max: usize) -> &str {
    if value.len() <= max {
        return value;
    }
    let mut end = max;
    while !value.is_char_boundary(end) {
        end -= 1;
    }
    &value[..end]
}

#[macro_export]
macro_rules! truncate_long {
    ($query:expr) => {{
        let query = &$query;
        let query: &str = ::std::convert::AsRef::<str>::as_ref(query);
        format!(
            "{}{}",
            $crate::truncated(query, 497).trim_end(),
            if query.len() > 497 { "..." } else { "" },
        )
    }};
}
