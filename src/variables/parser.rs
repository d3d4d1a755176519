/// A piece of a template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    /// Text copied to the output unchanged.
    Literal(&'a str),
    /// `$NAME` or `${NAME}`; `raw` is the exact source text, used when the
    /// name has no value.
    Placeholder { name: &'a str, raw: &'a str },
}

/// Split a template into literals and placeholders.
///
/// `$$` in front of a placeholder escapes it: the first `$` is dropped and
/// the placeholder text is kept as a literal. A `$` that starts no
/// placeholder is literal, as is an unterminated `${`.
pub fn parse(template: &str) -> Vec<Segment<'_>> {
    let bytes = template.as_bytes();
    let mut segments = Vec::new();
    let mut literal_start = 0;
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] != b'$' {
            i += 1;
            continue;
        }

        if bytes.get(i + 1) == Some(&b'$') {
            if let Some((_, end)) = scan_placeholder(template, i + 1) {
                push_literal(&mut segments, &template[literal_start..i]);
                literal_start = i + 1;
                i = end;
            } else {
                i += 1;
            }
            continue;
        }

        match scan_placeholder(template, i) {
            Some((name, end)) => {
                push_literal(&mut segments, &template[literal_start..i]);
                segments.push(Segment::Placeholder {
                    name,
                    raw: &template[i..end],
                });
                literal_start = end;
                i = end;
            }
            None => i += 1,
        }
    }

    push_literal(&mut segments, &template[literal_start..]);
    segments
}

/// Names of all placeholders in the template, in order of appearance.
pub fn placeholders(template: &str) -> impl Iterator<Item = &str> {
    parse(template).into_iter().filter_map(|segment| match segment {
        Segment::Placeholder { name, .. } => Some(name),
        Segment::Literal(_) => None,
    })
}

/// Whether the template references `name` in either placeholder form.
pub fn references(template: &str, name: &str) -> bool {
    placeholders(template).any(|found| found == name)
}

fn push_literal<'a>(segments: &mut Vec<Segment<'a>>, text: &'a str) {
    if !text.is_empty() {
        segments.push(Segment::Literal(text));
    }
}

/// Scan a placeholder starting at the `$` at `start`. Returns the name and
/// the byte offset just past the placeholder.
fn scan_placeholder(template: &str, start: usize) -> Option<(&str, usize)> {
    let bytes = template.as_bytes();
    match bytes.get(start + 1)? {
        b'{' => {
            let body_start = start + 2;
            let close = template[body_start..].find('}')? + body_start;
            let name = &template[body_start..close];
            if name.is_empty() || name.contains(['$', '{']) {
                return None;
            }
            Some((name, close + 1))
        }
        c if c.is_ascii_alphabetic() || *c == b'_' => {
            let name_start = start + 1;
            let end = bytes[name_start..]
                .iter()
                .position(|b| !(b.is_ascii_alphanumeric() || *b == b'_'))
                .map_or(bytes.len(), |offset| name_start + offset);
            Some((&template[name_start..end], end))
        }
        _ => None,
    }
}
