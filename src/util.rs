//! Small utility helpers used across modules.

/// Very small and safe string templating.
/// Replaces occurrences of `{key}` in the template with provided values.
/// Values are inserted verbatim; a value containing `{other}` is not expanded again
/// because each key is replaced in a single left-to-right pass over the template.
pub fn fill_template(tpl: &str, pairs: &[(&str, &str)]) -> String {
  let mut out = String::with_capacity(tpl.len());
  let mut rest = tpl;
  'scan: while let Some(open) = rest.find('{') {
    out.push_str(&rest[..open]);
    let after = &rest[open..];
    for (k, v) in pairs {
      let needle = format!("{{{}}}", k);
      if after.starts_with(&needle) {
        out.push_str(v);
        rest = &after[needle.len()..];
        continue 'scan;
      }
    }
    out.push('{');
    rest = &after[1..];
  }
  out.push_str(rest);
  out
}

/// True if unicode char belongs to CJK ideograph ranges.
/// This is the "disallowed script" when the presentation language is English.
pub fn is_cjk(ch: char) -> bool {
  (ch >= '\u{4E00}' && ch <= '\u{9FFF}')
    || (ch >= '\u{3400}' && ch <= '\u{4DBF}')
    || (ch >= '\u{20000}' && ch <= '\u{2A6DF}')
    || (ch >= '\u{2A700}' && ch <= '\u{2B73F}')
    || (ch >= '\u{2B740}' && ch <= '\u{2B81F}')
    || (ch >= '\u{2B820}' && ch <= '\u{2CEAF}')
    || (ch >= '\u{F900}' && ch <= '\u{FAFF}')
}

pub fn contains_cjk(s: &str) -> bool {
  s.chars().any(is_cjk)
}

/// Log-safe truncation for large strings.
/// Avoids spamming logs with huge request/response payloads.
pub fn trunc_for_log(s: &str, max: usize) -> String {
  if s.chars().count() <= max {
    s.to_string()
  } else {
    let head: String = s.chars().take(max).collect();
    format!("{}… ({} bytes total)", head, s.len())
  }
}
