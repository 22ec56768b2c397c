//! KML parsing.
//!
//! The actual parser lives in [`cooked`], this module provides helpers for decoding attribute and
//! text values.

prelude! {}

pub mod cooked;

pub mod helpers {
    use super::*;

    /// Parses an XML schema boolean.
    pub fn bool(s: impl AsRef<str>) -> Option<bool> {
        match s.as_ref().trim() {
            "1" | "true" => Some(true),
            "0" | "false" => Some(false),
            _ => None,
        }
    }

    /// Decodes the predefined XML entities and character references of `s`.
    ///
    /// Unknown entities are kept verbatim. Does not allocate if `s` contains no `&`.
    pub fn unescape(s: &str) -> Cow<'_, str> {
        if !s.contains('&') {
            return Cow::Borrowed(s);
        }
        let mut res = String::with_capacity(s.len());
        let mut tail = s;
        while let Some(start) = tail.find('&') {
            res.push_str(&tail[..start]);
            tail = &tail[start..];
            let decoded = tail
                .find(';')
                .and_then(|end| decode_entity(&tail[1..end]).map(|c| (c, end)));
            match decoded {
                Some((c, end)) => {
                    res.push(c);
                    tail = &tail[end + 1..];
                }
                None => {
                    log::debug!("keeping unknown entity in `{}`", s);
                    res.push('&');
                    tail = &tail[1..];
                }
            }
        }
        res.push_str(tail);
        Cow::Owned(res)
    }

    /// Decodes the inside of an entity, *i.e.* without `&` and `;`.
    fn decode_entity(entity: &str) -> Option<char> {
        match entity {
            "amp" => Some('&'),
            "lt" => Some('<'),
            "gt" => Some('>'),
            "quot" => Some('"'),
            "apos" => Some('\''),
            _ => {
                let code = if let Some(hex) = entity
                    .strip_prefix("#x")
                    .or_else(|| entity.strip_prefix("#X"))
                {
                    u32::from_str_radix(hex, 16).ok()?
                } else if let Some(dec) = entity.strip_prefix('#') {
                    dec.parse().ok()?
                } else {
                    return None;
                };
                char::from_u32(code)
            }
        }
    }

}
